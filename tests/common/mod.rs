pub mod macros;

use hecs::Entity;
use pigeon_data::{AgentProfile, Position, RegionTag, TrapType};
use pigeon_park_lib::model::config::{AppConfig, RegionConfig};
use pigeon_park_lib::model::park::Park;
use pigeon_park_lib::model::region::RegionShape;

/// Profile that eats on every trial, once per second, five units a bite.
#[allow(dead_code)]
pub fn sure_eater() -> AgentProfile {
    AgentProfile {
        bite_power: 5,
        eat_chance: 1.0,
        eat_interval: 1.0,
        eat_radius: 0.8,
        ..AgentProfile::default()
    }
}

struct PendingPigeon {
    species: String,
    region: usize,
    at: Position,
    profile: Option<AgentProfile>,
}

struct PendingStation {
    trap: TrapType,
    at: Position,
    max_feed: Option<i32>,
}

/// Builds a quiet park: one region covering the whole park, no initial
/// population, no replenishment and no attrition unless configured.
#[allow(dead_code)]
pub struct ParkBuilder {
    config: AppConfig,
    pigeons: Vec<PendingPigeon>,
    stations: Vec<PendingStation>,
}

#[allow(dead_code)]
impl ParkBuilder {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.world.seed = Some(42);
        config.population.spawn_chance = 0.0;
        config.population.despawn_chance = 0.0;
        config.regions = vec![RegionConfig {
            id: "park".to_string(),
            shape: RegionShape::Rect {
                min_x: 0.0,
                min_y: 0.0,
                max_x: config.world.width,
                max_y: config.world.height,
            },
            target_count: 0,
        }];
        Self {
            config,
            pigeons: Vec::new(),
            stations: Vec::new(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.world.seed = Some(seed);
        self
    }

    pub fn with_config<F>(mut self, modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        modifier(&mut self.config);
        self
    }

    pub fn with_region(mut self, id: &str, shape: RegionShape, target_count: usize) -> Self {
        self.config.regions.push(RegionConfig {
            id: id.to_string(),
            shape,
            target_count,
        });
        self
    }

    /// Replaces the default whole-park region.
    pub fn only_region(mut self, id: &str, shape: RegionShape, target_count: usize) -> Self {
        self.config.regions.clear();
        self.with_region(id, shape, target_count)
    }

    pub fn with_station(mut self, trap: TrapType, x: f64, y: f64, max_feed: Option<i32>) -> Self {
        self.stations.push(PendingStation {
            trap,
            at: Position::new(x, y),
            max_feed,
        });
        self
    }

    pub fn with_pigeon(mut self, species: &str, x: f64, y: f64) -> Self {
        self.pigeons.push(PendingPigeon {
            species: species.to_string(),
            region: 0,
            at: Position::new(x, y),
            profile: None,
        });
        self
    }

    pub fn with_pigeon_profile(mut self, species: &str, x: f64, y: f64, profile: AgentProfile) -> Self {
        self.pigeons.push(PendingPigeon {
            species: species.to_string(),
            region: 0,
            at: Position::new(x, y),
            profile: Some(profile),
        });
        self
    }

    pub fn build(self) -> Park {
        self.build_with_handles().0
    }

    /// Builds the park and returns the hand-placed pigeons in insertion order.
    pub fn build_with_handles(self) -> (Park, Vec<Entity>) {
        let mut park = Park::new(self.config).expect("Failed to create park in test builder");
        for st in self.stations {
            park.place_station(st.trap, st.at, st.max_feed);
        }
        let mut handles = Vec::new();
        for pending in self.pigeons {
            let e = park
                .spawn_species(RegionTag(pending.region), &pending.species)
                .expect("unknown species or region in test builder");
            *park.ecs.get::<&mut Position>(e).expect("spawned pigeon") = pending.at;
            if let Some(profile) = pending.profile {
                *park.ecs.get::<&mut AgentProfile>(e).expect("spawned pigeon") = profile;
            }
            handles.push(e);
        }
        park.index.rebuild(&park.ecs);
        (park, handles)
    }
}

/// Runs `frames` frames of `dt` seconds and returns every event.
#[allow(dead_code)]
pub fn run_frames(
    park: &mut Park,
    frames: usize,
    dt: f64,
    threat: Option<Position>,
) -> Vec<pigeon_park_lib::model::park::ParkEvent> {
    let mut events = Vec::new();
    for _ in 0..frames {
        events.extend(park.update(dt, threat));
    }
    events
}
