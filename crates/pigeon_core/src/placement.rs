//! Rejection sampling of uniformly distributed points inside a [`Region`].

use crate::config::PopulationConfig;
use crate::region::Region;
use pigeon_data::Position;
use rand::Rng;

/// Retry budget for a region: small for patches, larger for world-scale areas.
#[must_use]
pub fn attempts_for(region: &Region, config: &PopulationConfig) -> usize {
    if region.area() > config.world_area_threshold {
        config.world_area_attempts
    } else {
        config.small_area_attempts
    }
}

/// Draws up to `attempts` points in the bounding box and returns the first
/// one the region contains.
pub fn try_sample_in_region<R: Rng>(region: &Region, attempts: usize, rng: &mut R) -> Option<Position> {
    let b = region.bounds();
    if !(b.min_x.is_finite() && b.max_x.is_finite() && b.min_y.is_finite() && b.max_y.is_finite()) {
        return None;
    }
    for _ in 0..attempts {
        let p = Position::new(
            rng.gen_range(b.min_x..=b.max_x),
            rng.gen_range(b.min_y..=b.max_y),
        );
        if region.contains(&p) {
            return Some(p);
        }
    }
    None
}

/// Like [`try_sample_in_region`], but falls back to the bounding-box centre,
/// which can lie outside a concave region.
pub fn sample_in_region<R: Rng>(region: &Region, attempts: usize, rng: &mut R) -> Position {
    try_sample_in_region(region, attempts, rng).unwrap_or_else(|| {
        let center = region.bounds().center();
        tracing::debug!(x = center.x, y = center.y, "Placement fell back to bounds centre");
        center
    })
}
