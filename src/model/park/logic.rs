use crate::model::park::Park;
use crate::model::selection::StationTags;
use crate::model::snapshot::{
    AgentSnapshot, ParkSnapshot, RegionSnapshot, StateHistogram, StationSnapshot,
};
use crate::model::station::{FeedingStation, StationId};
use crate::model::systems::population::{PopulationContext, PopulationEvent};
use hecs::Entity;
use pigeon_data::{CapturedPigeon, Identity, Position, RegionTag, Species, Stress, TrapType};

impl Park {
    /// Places a station. `max_feed` falls back to the configured default.
    pub fn place_station(&mut self, trap: TrapType, position: Position, max_feed: Option<i32>) -> StationId {
        let id = StationId(self.next_station_id);
        self.next_station_id += 1;
        let max_feed = max_feed
            .filter(|m| *m > 0)
            .unwrap_or(self.config.feeding.default_max_feed);
        if !self.config.world.bounds().contains(&position) {
            tracing::warn!(
                station = %id,
                x = position.x,
                y = position.y,
                "Station placed outside the world, no pigeon can reach it"
            );
        }
        let station = FeedingStation::new(id, trap, position, max_feed).on_terrain(&self.terrain);
        tracing::info!(
            station = %id,
            trap = ?trap,
            terrain = ?station.terrain,
            x = position.x,
            y = position.y,
            "Station placed"
        );
        self.stations.push(station);
        id
    }

    /// Removes a station, returning it with any uncollected payload.
    pub fn remove_station(&mut self, id: StationId) -> Option<FeedingStation> {
        let idx = self.stations.iter().position(|s| s.id == id)?;
        Some(self.stations.remove(idx))
    }

    #[must_use]
    pub fn station(&self, id: StationId) -> Option<&FeedingStation> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut FeedingStation> {
        self.stations.iter_mut().find(|s| s.id == id)
    }

    /// Takes the captured payload out of a station and refills it.
    pub fn collect_capture(&mut self, id: StationId) -> Option<CapturedPigeon> {
        self.station_mut(id)?.collect()
    }

    /// Tags of every station that is neither captured nor depleted.
    #[must_use]
    pub fn active_station_tags(&self) -> Vec<StationTags> {
        self.stations
            .iter()
            .filter(|s| s.is_active())
            .map(|s| StationTags {
                trap: s.trap,
                terrain: s.terrain,
            })
            .collect()
    }

    #[must_use]
    pub fn population_count(&self) -> usize {
        self.population.total_population()
    }

    pub fn set_viewport_center(&mut self, center: Option<Position>) {
        self.viewport_center = center;
    }

    /// Spawns a specific species into a region outside the replenishment
    /// cycle, e.g. for an exhibit. Returns `None` for an unknown species or
    /// region.
    pub fn spawn_species(&mut self, region: RegionTag, species_id: &str) -> Option<Entity> {
        let species = self.config.species(species_id)?.clone();
        let mut ctx = PopulationContext {
            world: &mut self.ecs,
            config: &self.config,
            active_stations: &[],
            rng: &mut self.rng,
            now: self.time,
        };
        match self.population.spawn(region, &species, &mut ctx)? {
            PopulationEvent::Spawned { entity, .. } => {
                self.metrics.record_spawn();
                Some(entity)
            }
            _ => None,
        }
    }

    /// Serializable report of the current frame.
    #[must_use]
    pub fn snapshot(&self) -> ParkSnapshot {
        let regions = self
            .population
            .rosters
            .iter()
            .map(|roster| {
                let mut states = StateHistogram::default();
                for &e in &roster.members {
                    if let Ok(stress) = self.ecs.get::<&Stress>(e) {
                        states.record(stress.state);
                    }
                }
                RegionSnapshot {
                    id: roster.id.clone(),
                    target_count: roster.target_count,
                    population: states.total(),
                    states,
                }
            })
            .collect();

        let stations = self
            .stations
            .iter()
            .map(|s| StationSnapshot {
                id: s.id.0,
                trap: s.trap,
                terrain: s.terrain,
                x: s.position.x,
                y: s.position.y,
                remaining_feed: s.remaining_feed(),
                max_feed: s.max_feed,
                captured: s.captured().map(|c| c.name.clone()),
                eating: s.eating_agents().count(),
            })
            .collect();

        let mut agents: Vec<AgentSnapshot> = self
            .ecs
            .query::<(&Identity, &Species, &Position, &Stress, &RegionTag)>()
            .iter()
            .map(|(_, (identity, species, pos, stress, region))| AgentSnapshot {
                name: identity.name.clone(),
                species: species.as_str().to_string(),
                region: region.0,
                x: pos.x,
                y: pos.y,
                alert: stress.alert,
                state: stress.state,
            })
            .collect();
        agents.sort_by(|a, b| a.name.cmp(&b.name));

        ParkSnapshot {
            frame: self.frame,
            time: self.time,
            regions,
            stations,
            agents,
        }
    }
}
