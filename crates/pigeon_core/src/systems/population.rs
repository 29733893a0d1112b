//! Region rosters: initial fill, replenishment, attrition and flee timeout.

use crate::config::{AppConfig, RegionConfig, SpeciesConfig};
use crate::lifecycle::{create_pigeon_with_rng, spawn_pigeon};
use crate::placement::{attempts_for, sample_in_region};
use crate::region::Region;
use crate::selection::{select_species, select_uniform, StationTags};
use crate::stress::StressLogic;
use hecs::Entity;
use pigeon_data::{RegionTag, Stress};
use rand::Rng;

#[derive(Debug, Clone, PartialEq)]
pub enum PopulationEvent {
    Spawned {
        entity: Entity,
        region: RegionTag,
        species: String,
    },
    ForcedFlee {
        entity: Entity,
    },
    Despawned {
        entity: Entity,
        region: RegionTag,
    },
}

/// Agents owned by one spawn region.
#[derive(Debug, Clone)]
pub struct RegionRoster {
    pub id: String,
    pub region: Region,
    pub target_count: usize,
    pub members: Vec<Entity>,
    check_timer: f64,
}

impl RegionRoster {
    #[must_use]
    pub fn new(id: &str, region: Region, target_count: usize) -> Self {
        Self {
            id: id.to_string(),
            region,
            target_count,
            members: Vec::new(),
            check_timer: 0.0,
        }
    }

    #[must_use]
    pub fn from_config(config: &RegionConfig) -> Self {
        Self::new(&config.id, Region::new(config.shape.clone()), config.target_count)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn prune(&mut self, world: &hecs::World) {
        self.members.retain(|e| world.contains(*e));
    }
}

/// Mutable state a population pass needs from the driver.
pub struct PopulationContext<'a, R: Rng> {
    pub world: &'a mut hecs::World,
    pub config: &'a AppConfig,
    pub active_stations: &'a [StationTags],
    pub rng: &'a mut R,
    pub now: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PopulationController {
    pub rosters: Vec<RegionRoster>,
}

impl PopulationController {
    #[must_use]
    pub fn new(rosters: Vec<RegionRoster>) -> Self {
        Self { rosters }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.regions.iter().map(RegionRoster::from_config).collect())
    }

    #[must_use]
    pub fn total_population(&self) -> usize {
        self.rosters.iter().map(RegionRoster::len).sum()
    }

    #[must_use]
    pub fn region(&self, tag: RegionTag) -> Option<&Region> {
        self.rosters.get(tag.0).map(|r| &r.region)
    }

    /// Fills every roster to its target with uniformly chosen species.
    pub fn fill_initial<R: Rng>(&mut self, ctx: &mut PopulationContext<'_, R>) -> Vec<PopulationEvent> {
        let mut events = Vec::new();
        let config = ctx.config;
        for idx in 0..self.rosters.len() {
            while self.rosters[idx].len() < self.rosters[idx].target_count {
                let Some(species) = select_uniform(&config.species, ctx.rng) else {
                    return events;
                };
                let species = species.clone();
                events.push(self.spawn_into(idx, &species, ctx));
            }
        }
        events
    }

    /// Spawns one agent of `species` inside the region of `tag`. Returns
    /// `None` for an unknown region.
    pub fn spawn<R: Rng>(
        &mut self,
        tag: RegionTag,
        species: &SpeciesConfig,
        ctx: &mut PopulationContext<'_, R>,
    ) -> Option<PopulationEvent> {
        if tag.0 >= self.rosters.len() {
            return None;
        }
        Some(self.spawn_into(tag.0, species, ctx))
    }

    /// Drops `entity` from whichever roster holds it.
    pub fn forget(&mut self, entity: Entity) {
        for roster in &mut self.rosters {
            roster.members.retain(|e| *e != entity);
        }
    }

    /// One frame of roster upkeep.
    pub fn tick<R: Rng>(&mut self, dt: f64, ctx: &mut PopulationContext<'_, R>) -> Vec<PopulationEvent> {
        let mut events = Vec::new();
        let config = ctx.config;
        let pop = &config.population;
        let attrition = (pop.despawn_chance * dt).clamp(0.0, 1.0);

        for idx in 0..self.rosters.len() {
            let tag = RegionTag(idx);

            // Attrition and flee timeout run every frame.
            let mut expired = Vec::new();
            for &e in &self.rosters[idx].members {
                let Ok(stress) = ctx.world.query_one_mut::<&mut Stress>(e) else {
                    continue;
                };
                if let Some(elapsed) = stress.flee_elapsed(ctx.now) {
                    if elapsed >= pop.flee_timeout {
                        expired.push(e);
                    }
                } else if ctx.rng.gen_bool(attrition) {
                    stress.force_flee(ctx.now);
                    tracing::debug!(id = e.id(), "Pigeon sent away");
                    events.push(PopulationEvent::ForcedFlee { entity: e });
                }
            }
            for e in expired {
                if ctx.world.despawn(e).is_ok() {
                    tracing::debug!(id = e.id(), "Fled pigeon removed");
                    events.push(PopulationEvent::Despawned {
                        entity: e,
                        region: tag,
                    });
                }
            }

            let roster = &mut self.rosters[idx];
            roster.prune(ctx.world);
            roster.check_timer += dt;
            if roster.check_timer < pop.check_interval {
                continue;
            }
            roster.check_timer = 0.0;

            if roster.len() < roster.target_count && ctx.rng.gen_bool(pop.spawn_chance.clamp(0.0, 1.0)) {
                if let Some(species) = select_species(&config.species, ctx.active_stations, ctx.rng) {
                    let species = species.clone();
                    events.push(self.spawn_into(idx, &species, ctx));
                }
            }
        }
        events
    }

    fn spawn_into<R: Rng>(
        &mut self,
        idx: usize,
        species: &SpeciesConfig,
        ctx: &mut PopulationContext<'_, R>,
    ) -> PopulationEvent {
        let roster = &mut self.rosters[idx];
        let attempts = attempts_for(&roster.region, &ctx.config.population);
        let position = sample_in_region(&roster.region, attempts, ctx.rng);
        let tag = RegionTag(idx);
        let bundle = create_pigeon_with_rng(species, ctx.config, position, tag, ctx.rng);
        let entity = spawn_pigeon(ctx.world, bundle);
        roster.members.push(entity);
        PopulationEvent::Spawned {
            entity,
            region: tag,
            species: species.id.clone(),
        }
    }
}
