use serde::{Deserialize, Serialize};

/// Behavioural state derived from an agent's accumulated alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AlertState {
    #[default]
    Normal,
    Cautious,
    BackOff,
    /// Terminal. Never left once entered.
    Flee,
}

/// Ascending alert thresholds, `warn < backoff < flee`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub warn: f64,
    pub backoff: f64,
    pub flee: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warn: 45.0,
            backoff: 70.0,
            flee: 100.0,
        }
    }
}

/// Alert accumulator and state of a single agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stress {
    /// Non-negative, unbounded above.
    pub alert: f64,
    pub state: AlertState,
    pub thresholds: Thresholds,
    /// Simulation time at which the agent entered `Flee`.
    pub flee_entered_at: Option<f64>,
}

impl Stress {
    #[must_use]
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            alert: 0.0,
            state: AlertState::Normal,
            thresholds,
            flee_entered_at: None,
        }
    }

    #[must_use]
    pub fn is_fleeing(&self) -> bool {
        self.state == AlertState::Flee
    }
}

impl Default for Stress {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}
