//! Per-agent alert accumulation and the four-state stress machine.
//!
//! Alert rises from player proximity and from crowding at a station, decays at
//! a fixed rate, and is compared against three ascending thresholds. `Flee` is
//! terminal: once entered, nothing here touches `alert` or `state` again.
//!
//! Within a frame the driver must call [`StressLogic::decay`] and then
//! [`StressLogic::reevaluate`] before movement or feeding read the state.

use crate::config::StressConfig;
use pigeon_data::{AgentProfile, AlertState, Stress, Thresholds};

/// Classifies an alert value against the thresholds, highest match wins.
#[must_use]
pub fn classify(alert: f64, thresholds: &Thresholds) -> AlertState {
    if alert >= thresholds.flee {
        AlertState::Flee
    } else if alert >= thresholds.backoff {
        AlertState::BackOff
    } else if alert >= thresholds.warn {
        AlertState::Cautious
    } else {
        AlertState::Normal
    }
}

/// `clamp01(1 - distance / detection_radius)`, or `None` outside the radius.
#[must_use]
pub fn distance_factor(distance: f64, detection_radius: f64) -> Option<f64> {
    if detection_radius <= 0.0 || !distance.is_finite() || distance > detection_radius {
        None
    } else {
        Some((1.0 - distance / detection_radius).clamp(0.0, 1.0))
    }
}

pub trait StressLogic {
    fn accumulate_player_alert(
        &mut self,
        profile: &AgentProfile,
        config: &StressConfig,
        distance_factor: f64,
        dt: f64,
    );
    fn accumulate_crowd_alert(
        &mut self,
        profile: &AgentProfile,
        config: &StressConfig,
        competitor_count: usize,
        dt: f64,
    );
    fn decay(&mut self, config: &StressConfig, dt: f64);
    /// Moves to the highest threshold met. Returns the resulting state.
    fn reevaluate(&mut self, now: f64) -> AlertState;
    fn force_flee(&mut self, now: f64);
    fn can_eat(&self) -> bool;
    fn effective_eat_chance(&self, profile: &AgentProfile, config: &StressConfig) -> f64;
    fn effective_eat_interval(&self, profile: &AgentProfile, config: &StressConfig) -> f64;
    /// Seconds spent in `Flee`, or `None` when not fleeing.
    fn flee_elapsed(&self, now: f64) -> Option<f64>;
}

impl StressLogic for Stress {
    fn accumulate_player_alert(
        &mut self,
        profile: &AgentProfile,
        config: &StressConfig,
        distance_factor: f64,
        dt: f64,
    ) {
        if self.is_fleeing() {
            return;
        }
        let gain = profile.player_alert_per_sec
            * config.alert_weight
            * distance_factor.clamp(0.0, 1.0)
            * dt.max(0.0);
        self.alert += gain;
    }

    fn accumulate_crowd_alert(
        &mut self,
        profile: &AgentProfile,
        config: &StressConfig,
        competitor_count: usize,
        dt: f64,
    ) {
        if self.is_fleeing() {
            return;
        }
        let gain = profile.crowd_alert_per_neighbor_per_sec
            * config.alert_weight
            * competitor_count as f64
            * dt.max(0.0);
        self.alert += gain;
    }

    fn decay(&mut self, config: &StressConfig, dt: f64) {
        if self.is_fleeing() {
            return;
        }
        self.alert = (self.alert - config.decay_rate * dt.max(0.0)).max(0.0);
    }

    fn reevaluate(&mut self, now: f64) -> AlertState {
        if self.is_fleeing() {
            return AlertState::Flee;
        }
        let next = classify(self.alert, &self.thresholds);
        if next == AlertState::Flee {
            self.force_flee(now);
        } else {
            self.state = next;
        }
        self.state
    }

    fn force_flee(&mut self, now: f64) {
        if !self.is_fleeing() {
            self.state = AlertState::Flee;
            self.flee_entered_at = Some(now);
        }
    }

    fn can_eat(&self) -> bool {
        !matches!(self.state, AlertState::BackOff | AlertState::Flee)
    }

    fn effective_eat_chance(&self, profile: &AgentProfile, config: &StressConfig) -> f64 {
        if self.state == AlertState::Cautious && config.stress_modifier_enabled {
            (profile.eat_chance * config.cautious_eat_chance_multiplier).clamp(0.0, 1.0)
        } else {
            profile.eat_chance
        }
    }

    fn effective_eat_interval(&self, profile: &AgentProfile, config: &StressConfig) -> f64 {
        if self.state == AlertState::Cautious && config.stress_modifier_enabled {
            profile.eat_interval * config.cautious_eat_interval_multiplier
        } else {
            profile.eat_interval
        }
    }

    fn flee_elapsed(&self, now: f64) -> Option<f64> {
        if !self.is_fleeing() {
            return None;
        }
        Some(self.flee_entered_at.map_or(0.0, |t| (now - t).max(0.0)))
    }
}
