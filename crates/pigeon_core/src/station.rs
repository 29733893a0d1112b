//! Depletable feeding stations.
//!
//! A station holds `remaining_feed` units of bait. Agents inside their own eat
//! radius take bites until the feed runs out, at which point the station
//! consumes the last diner and keeps it as a payload until collected.
//! Per-frame behaviour lives in [`crate::systems::feeding`].

use crate::slot_table::SlotTable;
use crate::terrain::TerrainLookup;
use hecs::Entity;
use pigeon_data::{CapturedPigeon, Position, TerrainType, TrapType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StationId(pub u32);

impl std::fmt::Display for StationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "station-{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct FeedingStation {
    pub id: StationId,
    pub trap: TrapType,
    /// Resolved once at placement.
    pub terrain: TerrainType,
    pub position: Position,
    pub max_feed: i32,
    pub(crate) remaining_feed: i32,
    pub(crate) captured: Option<CapturedPigeon>,
    /// Seconds accumulated towards each diner's next eat trial.
    pub(crate) eat_timers: SlotTable<f64>,
    /// Remaining seconds of each diner's "currently eating" flag.
    pub(crate) eating: SlotTable<f64>,
    pub(crate) in_range: Vec<Entity>,
}

impl FeedingStation {
    #[must_use]
    pub fn new(id: StationId, trap: TrapType, position: Position, max_feed: i32) -> Self {
        Self {
            id,
            trap,
            terrain: TerrainType::default(),
            position,
            max_feed,
            remaining_feed: max_feed,
            captured: None,
            eat_timers: SlotTable::new(),
            eating: SlotTable::new(),
            in_range: Vec::new(),
        }
    }

    /// Reads the terrain tag under the station.
    #[must_use]
    pub fn on_terrain(mut self, terrain: &impl TerrainLookup) -> Self {
        self.terrain = terrain.terrain_at(&self.position);
        self
    }

    #[must_use]
    pub fn remaining_feed(&self) -> i32 {
        self.remaining_feed
    }

    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured.is_some()
    }

    #[must_use]
    pub fn captured(&self) -> Option<&CapturedPigeon> {
        self.captured.as_ref()
    }

    /// Neither captured nor depleted.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.captured.is_none() && self.remaining_feed > 0
    }

    #[must_use]
    pub fn fill_ratio(&self) -> f64 {
        if self.max_feed <= 0 {
            return 0.0;
        }
        (f64::from(self.remaining_feed) / f64::from(self.max_feed)).clamp(0.0, 1.0)
    }

    /// Agents whose eating display flag is still set.
    pub fn eating_agents(&self) -> impl Iterator<Item = Entity> + '_ {
        self.eating.iter().map(|(e, _)| e)
    }

    #[must_use]
    pub fn is_eating(&self, entity: Entity) -> bool {
        self.eating.contains(entity)
    }

    /// Agents found in range by the latest tick.
    #[must_use]
    pub fn in_range(&self) -> &[Entity] {
        &self.in_range
    }

    #[must_use]
    pub fn eat_progress(&self, entity: Entity) -> Option<f64> {
        self.eat_timers.get(entity).copied()
    }

    /// Hands out the captured payload and refills the station. Returns `None`
    /// and leaves the station untouched when nothing was captured.
    pub fn collect(&mut self) -> Option<CapturedPigeon> {
        let payload = self.captured.take()?;
        self.reset();
        tracing::info!(station = %self.id, pigeon = %payload.name, "Capture collected");
        Some(payload)
    }

    /// Refills the feed and clears all per-agent state.
    pub fn reset(&mut self) {
        self.remaining_feed = self.max_feed;
        self.captured = None;
        self.eat_timers.clear();
        self.eating.clear();
        self.in_range.clear();
    }
}
