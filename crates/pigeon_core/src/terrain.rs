//! Terrain tag lookup used to resolve a station's ground type.

pub use pigeon_data::TerrainType;
use pigeon_data::Position;
use serde::{Deserialize, Serialize};

use crate::config::TerrainPatchConfig;
use crate::region::Region;

/// Resolves the terrain tag under a world point.
pub trait TerrainLookup {
    fn terrain_at(&self, p: &Position) -> TerrainType;
}

/// Coarse cell grid of terrain tags. Points outside the grid read as the
/// default tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerrainGrid {
    pub cell_size: f64,
    pub cols: usize,
    pub rows: usize,
    pub default_type: TerrainType,
    pub cells: Vec<TerrainType>,
}

impl TerrainGrid {
    #[must_use]
    pub fn new(width: f64, height: f64, cell_size: f64) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let cols = (width.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let rows = (height.max(0.0) / cell_size).ceil().max(1.0) as usize;
        let default_type = TerrainType::default();
        Self {
            cell_size,
            cols,
            rows,
            default_type,
            cells: vec![default_type; cols * rows],
        }
    }

    /// Builds a grid and paints `patches` in order, later patches on top.
    #[must_use]
    pub fn from_patches(
        width: f64,
        height: f64,
        cell_size: f64,
        patches: &[TerrainPatchConfig],
    ) -> Self {
        let mut grid = Self::new(width, height, cell_size);
        for patch in patches {
            grid.paint(&Region::new(patch.shape.clone()), patch.terrain);
        }
        grid
    }

    fn index(&self, p: &Position) -> Option<usize> {
        if !p.is_finite() || p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let cx = (p.x / self.cell_size) as usize;
        let cy = (p.y / self.cell_size) as usize;
        if cx >= self.cols || cy >= self.rows {
            None
        } else {
            Some(cy * self.cols + cx)
        }
    }

    fn cell_center(&self, idx: usize) -> Position {
        let cx = (idx % self.cols) as f64;
        let cy = (idx / self.cols) as f64;
        Position::new((cx + 0.5) * self.cell_size, (cy + 0.5) * self.cell_size)
    }

    /// Sets every cell whose centre lies inside `region`.
    pub fn paint(&mut self, region: &Region, terrain: TerrainType) {
        for idx in 0..self.cells.len() {
            if region.contains(&self.cell_center(idx)) {
                self.cells[idx] = terrain;
            }
        }
    }

    pub fn set(&mut self, p: &Position, terrain: TerrainType) {
        if let Some(idx) = self.index(p) {
            self.cells[idx] = terrain;
        }
    }
}

impl TerrainLookup for TerrainGrid {
    fn terrain_at(&self, p: &Position) -> TerrainType {
        self.index(p)
            .map_or(self.default_type, |idx| self.cells[idx])
    }
}
