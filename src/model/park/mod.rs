use crate::model::config::AppConfig;
use crate::model::metrics::Metrics;
use crate::model::snapshot::AgentIndex;
use crate::model::station::FeedingStation;
use crate::model::systems::feeding::CaptureEvent;
use crate::model::systems::population::{PopulationController, PopulationEvent};
use crate::model::terrain::TerrainGrid;
use pigeon_data::Position;
use rand_chacha::ChaCha8Rng;

pub mod init;
pub mod logic;
pub mod update;

/// Upper bound on movement sub-steps per frame. A longer frame drops the
/// remainder instead of spiralling.
pub const MAX_SUBSTEPS: u32 = 64;

/// Something the caller may want to react to, in the order it happened.
#[derive(Debug, Clone, PartialEq)]
pub enum ParkEvent {
    Population(PopulationEvent),
    Captured(CaptureEvent),
}

/// The whole simulation: agents, rosters, stations and the clock.
pub struct Park {
    pub config: AppConfig,
    pub ecs: hecs::World,
    pub population: PopulationController,
    pub stations: Vec<FeedingStation>,
    pub terrain: TerrainGrid,
    pub index: AgentIndex,
    pub rng: ChaCha8Rng,
    pub metrics: Metrics,
    /// Simulation seconds since construction.
    pub time: f64,
    pub frame: u64,
    /// Fallback flee target when no threat is present.
    pub viewport_center: Option<Position>,
    pub(crate) next_station_id: u32,
    pub(crate) step_accumulator: f64,
}

impl std::fmt::Debug for Park {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Park")
            .field("frame", &self.frame)
            .field("time", &self.time)
            .field("agents", &self.ecs.len())
            .field("stations", &self.stations.len())
            .finish()
    }
}
