use crate::model::config::{AppConfig, ConfigError};
use crate::model::metrics::Metrics;
use crate::model::park::Park;
use crate::model::snapshot::AgentIndex;
use crate::model::systems::population::{PopulationContext, PopulationController};
use crate::model::terrain::TerrainGrid;
use pigeon_data::Position;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Terrain resolution in world units.
const TERRAIN_CELL_SIZE: f64 = 1.0;

impl Park {
    /// Builds a park from a validated config, places the configured stations
    /// and fills every region to its target with uniformly chosen species.
    pub fn new(config: AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = if let Some(seed) = config.world.seed {
            ChaCha8Rng::seed_from_u64(seed)
        } else {
            ChaCha8Rng::from_entropy()
        };

        let w = &config.world;
        let terrain = TerrainGrid::from_patches(w.width, w.height, TERRAIN_CELL_SIZE, &config.terrain);
        let index = AgentIndex::new(w.spatial_cell_size, w.width, w.height);
        let viewport_center = Some(Position::new(w.width / 2.0, w.height / 2.0));

        let mut park = Self {
            population: PopulationController::from_config(&config),
            ecs: hecs::World::new(),
            stations: Vec::new(),
            terrain,
            index,
            rng,
            metrics: Metrics::new(),
            time: 0.0,
            frame: 0,
            viewport_center,
            next_station_id: 0,
            step_accumulator: 0.0,
            config,
        };

        let preset = park.config.stations.clone();
        for st in preset {
            park.place_station(st.trap, Position::new(st.x, st.y), st.max_feed);
        }

        let spawned = {
            let mut ctx = PopulationContext {
                world: &mut park.ecs,
                config: &park.config,
                active_stations: &[],
                rng: &mut park.rng,
                now: 0.0,
            };
            park.population.fill_initial(&mut ctx).len()
        };
        for _ in 0..spawned {
            park.metrics.record_spawn();
        }
        park.index.rebuild(&park.ecs);

        tracing::info!(
            agents = spawned,
            regions = park.population.rosters.len(),
            stations = park.stations.len(),
            fingerprint = %park.config.fingerprint(),
            "Park initialised"
        );
        Ok(park)
    }

    /// Like [`Park::new`] with the seed overridden.
    pub fn with_seed(mut config: AppConfig, seed: u64) -> Result<Self, ConfigError> {
        config.world.seed = Some(seed);
        Self::new(config)
    }
}
