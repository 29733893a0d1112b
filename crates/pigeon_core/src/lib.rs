//! # Pigeon Core
//!
//! Simulation logic for a park full of skittish pigeons and the bait
//! stations that lure them in.
//!
//! This crate contains:
//! - The per-agent alert accumulator and four-state stress machine
//! - Movement planning (wander, forage, back off, flee) on a fixed sub-step
//! - Depletable feeding stations that capture their last diner
//! - Region rosters with replenishment, attrition and preference-weighted species choice
//! - Region geometry, placement sampling and spatial indexing
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! Agents are `hecs` entities. Plain data lives in `pigeon_data`; behaviour is
//! attached through logic traits ([`StressLogic`], [`FeedingLogic`]) so the
//! data crate stays free of simulation code. All randomness flows through a
//! caller-supplied RNG, so a seeded `ChaCha8Rng` reproduces a run exactly.
//!
//! ## Example
//!
//! ```
//! use pigeon_core::config::StressConfig;
//! use pigeon_core::StressLogic;
//! use pigeon_data::{AgentProfile, AlertState, Stress};
//!
//! let config = StressConfig::default();
//! let mut stress = Stress::new(config.thresholds());
//! for _ in 0..25 {
//!     stress.accumulate_player_alert(&AgentProfile::default(), &config, 1.0, 0.1);
//! }
//! assert_eq!(stress.reevaluate(2.5), AlertState::Cautious);
//! ```

/// Configuration management for park parameters
pub mod config;
/// Agent spawning, naming and capture snapshots
pub mod lifecycle;
/// Frame counters and logging setup
pub mod metrics;
/// Uniform point sampling inside regions
pub mod placement;
/// Rect, circle and polygon regions with containment tests
pub mod region;
/// Preference-weighted species selection
pub mod selection;
/// Generation-checked per-agent side tables
pub mod slot_table;
/// Per-frame agent index and serializable park reports
pub mod snapshot;
/// Spatial hashing for proximity queries
pub mod spatial_hash;
/// Feeding stations
pub mod station;
/// Alert accumulation and the stress state machine
pub mod stress;
/// Movement, feeding and population systems
pub mod systems;
/// Terrain tag grid
pub mod terrain;

pub use metrics::{init_logging, Metrics};
pub use region::{Region, Traversable};
pub use snapshot::AgentIndex;
pub use station::{FeedingStation, StationId};
pub use stress::StressLogic;
pub use systems::feeding::{CaptureEvent, FeedingLogic, TickResult};
pub use terrain::{TerrainGrid, TerrainLookup};
