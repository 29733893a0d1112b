use crate::spatial_hash::SpatialHash;
use hecs::Entity;
use pigeon_data::{AgentProfile, AlertState, Position, TerrainType, TrapType};
use serde::{Deserialize, Serialize};

/// Position and eat radius of one agent, captured when the index is rebuilt.
#[derive(Debug, Clone, Copy)]
pub struct IndexedAgent {
    pub entity: Entity,
    pub position: Position,
    pub eat_radius: f64,
}

/// Per-frame positional snapshot of every agent, shared by all station ticks.
///
/// Rebuilt once per frame after movement, so stations never query the ECS
/// for positions and never hold a reference to an agent across frames.
#[derive(Debug, Clone)]
pub struct AgentIndex {
    hash: SpatialHash,
    agents: Vec<IndexedAgent>,
    positions: Vec<(f64, f64)>,
    max_eat_radius: f64,
}

impl AgentIndex {
    #[must_use]
    pub fn new(cell_size: f64, width: f64, height: f64) -> Self {
        Self {
            hash: SpatialHash::new(cell_size, width, height),
            agents: Vec::new(),
            positions: Vec::new(),
            max_eat_radius: 0.0,
        }
    }

    pub fn rebuild(&mut self, world: &hecs::World) {
        self.agents.clear();
        self.positions.clear();
        self.max_eat_radius = 0.0;
        for (entity, (pos, profile)) in world.query::<(&Position, &AgentProfile)>().iter() {
            self.agents.push(IndexedAgent {
                entity,
                position: *pos,
                eat_radius: profile.eat_radius,
            });
            self.positions.push((pos.x, pos.y));
            self.max_eat_radius = self.max_eat_radius.max(profile.eat_radius);
        }
        self.hash.build_parallel(&self.positions);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[must_use]
    pub fn max_eat_radius(&self) -> f64 {
        self.max_eat_radius
    }

    /// Agents whose own eat radius reaches `center`, in index order.
    pub fn within_eat_radius(&self, center: &Position, out: &mut Vec<Entity>) {
        out.clear();
        self.hash
            .query_callback(center.x, center.y, self.max_eat_radius, |idx| {
                let agent = &self.agents[idx];
                if agent.position.distance_sq(center) <= agent.eat_radius * agent.eat_radius {
                    out.push(agent.entity);
                }
            });
    }
}

/// Serializable per-agent report row.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct AgentSnapshot {
    pub name: String,
    pub species: String,
    pub region: usize,
    pub x: f64,
    pub y: f64,
    pub alert: f64,
    pub state: AlertState,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct StationSnapshot {
    pub id: u32,
    pub trap: TrapType,
    pub terrain: TerrainType,
    pub x: f64,
    pub y: f64,
    pub remaining_feed: i32,
    pub max_feed: i32,
    pub captured: Option<String>,
    pub eating: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct StateHistogram {
    pub normal: usize,
    pub cautious: usize,
    pub backoff: usize,
    pub flee: usize,
}

impl StateHistogram {
    pub fn record(&mut self, state: AlertState) {
        match state {
            AlertState::Normal => self.normal += 1,
            AlertState::Cautious => self.cautious += 1,
            AlertState::BackOff => self.backoff += 1,
            AlertState::Flee => self.flee += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.normal + self.cautious + self.backoff + self.flee
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RegionSnapshot {
    pub id: String,
    pub target_count: usize,
    pub population: usize,
    pub states: StateHistogram,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ParkSnapshot {
    pub frame: u64,
    pub time: f64,
    pub regions: Vec<RegionSnapshot>,
    pub stations: Vec<StationSnapshot>,
    pub agents: Vec<AgentSnapshot>,
}
