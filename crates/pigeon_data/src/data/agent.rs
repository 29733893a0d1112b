use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// World position in park units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance_sq(&self, other: &Position) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    #[must_use]
    pub fn distance(&self, other: &Position) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// Unit vector pointing from `self` towards `other`, or `None` when the
    /// two points coincide.
    #[must_use]
    pub fn direction_to(&self, other: &Position) -> Option<(f64, f64)> {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f64::EPSILON || !len.is_finite() {
            None
        } else {
            Some((dx / len, dy / len))
        }
    }

    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Unique identification of an agent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
}

/// Cosmetic face variant. Has no influence on behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FaceTag {
    #[default]
    Plain,
    Grumpy,
    Sleepy,
    Startled,
    Smug,
}

impl FaceTag {
    pub const ALL: [FaceTag; 5] = [
        FaceTag::Plain,
        FaceTag::Grumpy,
        FaceTag::Sleepy,
        FaceTag::Startled,
        FaceTag::Smug,
    ];
}

/// Visual appearance of an agent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Appearance {
    pub face: FaceTag,
}

/// Species identifier, matching `SpeciesConfig::id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Species(pub String);

impl Species {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rarity tier; selects the behavioural profile of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Fixed per-tier behaviour constants of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    /// Feed units removed from a station per successful bite.
    pub bite_power: i32,
    /// Probability in [0, 1] that an eat trial succeeds.
    pub eat_chance: f64,
    /// Seconds between eat trials.
    pub eat_interval: f64,
    pub player_alert_per_sec: f64,
    pub crowd_alert_per_neighbor_per_sec: f64,
    pub price: u32,
    /// Distance within which a station picks this agent up as a diner.
    pub eat_radius: f64,
}

impl Default for AgentProfile {
    fn default() -> Self {
        Self {
            bite_power: 5,
            eat_chance: 0.8,
            eat_interval: 1.0,
            player_alert_per_sec: 20.0,
            crowd_alert_per_neighbor_per_sec: 6.0,
            price: 10,
            eat_radius: 0.8,
        }
    }
}

/// Index of the region roster owning an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegionTag(pub usize);

/// Stats cloned out of an agent at the moment a station captures it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPigeon {
    pub id: Uuid,
    pub name: String,
    pub species: Species,
    pub face: FaceTag,
    pub tier: Tier,
    pub profile: AgentProfile,
}

impl CapturedPigeon {
    #[must_use]
    pub fn price(&self) -> u32 {
        self.profile.price
    }
}
