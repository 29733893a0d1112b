//! Preference-weighted species selection for replenishment spawns.
//!
//! Each species' base weight is multiplied by a bonus that grows with the
//! number of active stations matching its favourite trap, its favourite
//! terrain, or both:
//!
//! ```text
//! bonus  = 1 + 2·trap_matches + 2·terrain_matches + 3·perfect_matches
//! weight = base_weight × bonus
//! ```

use crate::config::SpeciesConfig;
use pigeon_data::{TerrainType, TrapType};
use rand::Rng;

/// Preference tags of one active station, terrain resolved at placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationTags {
    pub trap: TrapType,
    pub terrain: TerrainType,
}

#[must_use]
pub fn preference_bonus(species: &SpeciesConfig, active: &[StationTags]) -> f64 {
    let mut trap_matches = 0u32;
    let mut terrain_matches = 0u32;
    let mut perfect_matches = 0u32;
    for tags in active {
        let trap_hit = species.favorite_trap == Some(tags.trap);
        let terrain_hit = species.favorite_terrain == Some(tags.terrain);
        if trap_hit {
            trap_matches += 1;
        }
        if terrain_hit {
            terrain_matches += 1;
        }
        if trap_hit && terrain_hit {
            perfect_matches += 1;
        }
    }
    1.0 + 2.0 * f64::from(trap_matches)
        + 2.0 * f64::from(terrain_matches)
        + 3.0 * f64::from(perfect_matches)
}

#[must_use]
pub fn species_weights(species: &[SpeciesConfig], active: &[StationTags]) -> Vec<f64> {
    species
        .iter()
        .map(|s| s.base_weight.max(0.0) * preference_bonus(s, active))
        .collect()
}

/// Cumulative-weight sampling. Falls back to a uniform pick when the total
/// weight is zero or not finite. Returns `None` only for an empty slice.
pub fn pick_weighted<R: Rng>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();
    if total <= 0.0 || !total.is_finite() {
        return Some(rng.gen_range(0..weights.len()));
    }

    // (0, total], so a zero-weight leading entry can never win.
    let draw = total * (1.0 - rng.gen::<f64>());
    let mut cumulative = 0.0;
    for (i, w) in weights.iter().enumerate() {
        cumulative += w.max(0.0);
        if cumulative >= draw {
            return Some(i);
        }
    }
    // Float rounding can leave `cumulative` a hair below `draw`.
    weights.iter().rposition(|w| *w > 0.0)
}

pub fn select_species<'a, R: Rng>(
    species: &'a [SpeciesConfig],
    active: &[StationTags],
    rng: &mut R,
) -> Option<&'a SpeciesConfig> {
    let weights = species_weights(species, active);
    pick_weighted(&weights, rng).map(|i| &species[i])
}

pub fn select_uniform<'a, R: Rng>(species: &'a [SpeciesConfig], rng: &mut R) -> Option<&'a SpeciesConfig> {
    if species.is_empty() {
        None
    } else {
        Some(&species[rng.gen_range(0..species.len())])
    }
}
