//! Region shapes, containment tests and the traversable-region predicate.
//!
//! A [`Region`] is the compiled form of a [`RegionShape`]: polygon vertices are
//! transformed into world space once, and the bounding box is cached so that
//! sampling and containment never redo that work.

use pigeon_data::Position;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    #[must_use]
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }

    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(
            f64::midpoint(self.min_x, self.max_x),
            f64::midpoint(self.min_y, self.max_y),
        )
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        (self.max_x - self.min_x).max(0.0)
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        (self.max_y - self.min_y).max(0.0)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Clamps `p` onto the box.
    #[must_use]
    pub fn clamp(&self, p: &Position) -> Position {
        Position::new(
            p.x.clamp(self.min_x, self.max_x.max(self.min_x)),
            p.y.clamp(self.min_y, self.max_y.max(self.min_y)),
        )
    }
}

fn default_scale() -> f64 {
    1.0
}

/// Declarative region description as it appears in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegionShape {
    Rect {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
    },
    /// Polygon in local coordinates. World vertex = origin + rotate(scale * v).
    Polygon {
        #[serde(default)]
        origin: [f64; 2],
        #[serde(default = "default_scale")]
        scale: f64,
        /// Radians, counter-clockwise.
        #[serde(default)]
        rotation: f64,
        vertices: Vec<[f64; 2]>,
    },
}

/// A containment-testable 2D area.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    shape: RegionShape,
    world_vertices: Vec<Position>,
    bounds: Bounds,
}

impl Region {
    #[must_use]
    pub fn new(shape: RegionShape) -> Self {
        let world_vertices = match &shape {
            RegionShape::Polygon {
                origin,
                scale,
                rotation,
                vertices,
            } => {
                let (sin, cos) = rotation.sin_cos();
                vertices
                    .iter()
                    .map(|[vx, vy]| {
                        let lx = vx * scale;
                        let ly = vy * scale;
                        Position::new(origin[0] + lx * cos - ly * sin, origin[1] + lx * sin + ly * cos)
                    })
                    .collect()
            }
            _ => Vec::new(),
        };

        let bounds = match &shape {
            RegionShape::Rect {
                min_x,
                min_y,
                max_x,
                max_y,
            } => Bounds {
                min_x: min_x.min(*max_x),
                min_y: min_y.min(*max_y),
                max_x: max_x.max(*min_x),
                max_y: max_y.max(*min_y),
            },
            RegionShape::Circle { x, y, radius } => {
                let r = radius.abs();
                Bounds {
                    min_x: x - r,
                    min_y: y - r,
                    max_x: x + r,
                    max_y: y + r,
                }
            }
            RegionShape::Polygon { origin, .. } => polygon_bounds(&world_vertices)
                .unwrap_or(Bounds {
                    min_x: origin[0],
                    min_y: origin[1],
                    max_x: origin[0],
                    max_y: origin[1],
                }),
        };

        Self {
            shape,
            world_vertices,
            bounds,
        }
    }

    #[must_use]
    pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self::new(RegionShape::Rect {
            min_x,
            min_y,
            max_x,
            max_y,
        })
    }

    #[must_use]
    pub fn circle(x: f64, y: f64, radius: f64) -> Self {
        Self::new(RegionShape::Circle { x, y, radius })
    }

    #[must_use]
    pub fn polygon(vertices: Vec<[f64; 2]>) -> Self {
        Self::new(RegionShape::Polygon {
            origin: [0.0, 0.0],
            scale: 1.0,
            rotation: 0.0,
            vertices,
        })
    }

    #[must_use]
    pub fn shape(&self) -> &RegionShape {
        &self.shape
    }

    #[must_use]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    #[must_use]
    pub fn world_vertices(&self) -> &[Position] {
        &self.world_vertices
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.bounds.area()
    }

    #[must_use]
    pub fn contains(&self, p: &Position) -> bool {
        if !p.is_finite() {
            return false;
        }
        match &self.shape {
            RegionShape::Rect { .. } => self.bounds.contains(p),
            RegionShape::Circle { x, y, radius } => {
                p.distance_sq(&Position::new(*x, *y)) <= radius * radius
            }
            RegionShape::Polygon { .. } => {
                self.bounds.contains(p) && point_in_polygon(p, &self.world_vertices)
            }
        }
    }
}

fn polygon_bounds(vertices: &[Position]) -> Option<Bounds> {
    let first = vertices.first()?;
    let mut b = Bounds {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    for v in &vertices[1..] {
        b.min_x = b.min_x.min(v.x);
        b.min_y = b.min_y.min(v.y);
        b.max_x = b.max_x.max(v.x);
        b.max_y = b.max_y.max(v.y);
    }
    Some(b)
}

/// Even-odd ray casting: counts crossings of a horizontal ray from `p`.
#[must_use]
pub fn point_in_polygon(p: &Position, polygon: &[Position]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].x, polygon[i].y);
        let (xj, yj) = (polygon[j].x, polygon[j].y);
        let crosses = ((yi > p.y) != (yj > p.y)) && (p.x < (xj - xi) * (p.y - yi) / (yj - yi) + xi);
        if crosses {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Externally supplied walkability test used to clamp Normal and BackOff motion.
pub trait Traversable {
    fn is_traversable(&self, p: &Position) -> bool;
}

impl Traversable for Region {
    fn is_traversable(&self, p: &Position) -> bool {
        self.contains(p)
    }
}

impl<F> Traversable for F
where
    F: Fn(&Position) -> bool,
{
    fn is_traversable(&self, p: &Position) -> bool {
        self(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l_shape() -> Region {
        Region::polygon(vec![
            [0.0, 0.0],
            [4.0, 0.0],
            [4.0, 1.0],
            [1.0, 1.0],
            [1.0, 4.0],
            [0.0, 4.0],
        ])
    }

    #[test]
    fn test_rect_contains_edges() {
        let r = Region::rect(0.0, 0.0, 2.0, 2.0);
        assert!(r.contains(&Position::new(0.0, 0.0)));
        assert!(r.contains(&Position::new(2.0, 2.0)));
        assert!(!r.contains(&Position::new(2.1, 1.0)));
    }

    #[test]
    fn test_circle_excludes_bounding_box_corners() {
        let r = Region::circle(0.0, 0.0, 1.0);
        assert!(r.contains(&Position::new(0.5, 0.5)));
        assert!(!r.contains(&Position::new(0.9, 0.9)));
        assert!(r.bounds().contains(&Position::new(0.9, 0.9)));
    }

    #[test]
    fn test_concave_polygon_notch_is_outside() {
        let r = l_shape();
        assert!(r.contains(&Position::new(0.5, 3.0)));
        assert!(r.contains(&Position::new(3.0, 0.5)));
        assert!(!r.contains(&Position::new(3.0, 3.0)));
    }

    #[test]
    fn test_polygon_vertices_move_to_world_space() {
        let r = Region::new(RegionShape::Polygon {
            origin: [10.0, 10.0],
            scale: 2.0,
            rotation: 0.0,
            vertices: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        });
        assert!(r.contains(&Position::new(11.0, 11.0)));
        assert!(!r.contains(&Position::new(0.5, 0.5)));
        assert_eq!(r.bounds().max_x, 12.0);
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let r = Region::polygon(vec![[0.0, 0.0], [1.0, 1.0]]);
        assert!(!r.contains(&Position::new(0.5, 0.5)));
    }

    #[test]
    fn test_non_finite_point_is_outside() {
        let r = Region::rect(0.0, 0.0, 2.0, 2.0);
        assert!(!r.contains(&Position::new(f64::NAN, 1.0)));
    }

    #[test]
    fn test_closure_is_traversable() {
        let left_half = |p: &Position| p.x < 5.0;
        assert!(left_half.is_traversable(&Position::new(1.0, 0.0)));
        assert!(!left_half.is_traversable(&Position::new(6.0, 0.0)));
    }
}
