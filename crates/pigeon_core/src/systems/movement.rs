//! Turns an agent's stress state into a target and a speed, and integrates
//! position on the fixed sub-step.
//!
//! Planning runs once per frame, after the stress machine has decayed and
//! re-evaluated, in this priority order:
//!
//! 1. `Flee` state: leave the area, ignoring the traversable region.
//! 2. An unfinished BackOff target: keep going.
//! 3. Threat inside the detection radius: back off directly away from it.
//! 4. `BackOff` state from crowding: back off in a random direction.
//! 5. Otherwise wander, or forage towards the nearest active station.

use crate::config::{MovementConfig, StressConfig};
use crate::region::Traversable;
use crate::stress::{distance_factor, StressLogic};
use pigeon_data::{AgentProfile, AlertState, Position, Stress};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// What the agent is doing this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MovementMode {
    #[default]
    Wander,
    Forage,
    BackOff,
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackOffCause {
    /// Threat inside the detection radius.
    Proximity,
    /// Alert-driven jostling at a crowded station.
    Crowd,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackOffTarget {
    pub target: Position,
    pub cause: BackOffCause,
}

/// Per-agent movement state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub mode: MovementMode,
    pub target: Option<Position>,
    pub speed: f64,
    pub wander_timer: f64,
    pub wander_target: Option<Position>,
    pub backoff: Option<BackOffTarget>,
    pub last_backoff_at: Option<f64>,
    pub last_direction: (f64, f64),
    pub flee_direction: Option<(f64, f64)>,
}

impl Default for Movement {
    fn default() -> Self {
        Self {
            mode: MovementMode::Wander,
            target: None,
            speed: 0.0,
            wander_timer: 0.0,
            wander_target: None,
            backoff: None,
            last_backoff_at: None,
            last_direction: (1.0, 0.0),
            flee_direction: None,
        }
    }
}

/// Read-only inputs to movement planning for one frame.
pub struct MovementContext<'a> {
    pub config: &'a MovementConfig,
    pub stress_config: &'a StressConfig,
    pub threat: Option<Position>,
    pub viewport_center: Option<Position>,
    /// Positions of stations that are neither captured nor depleted.
    pub stations: &'a [Position],
    pub traversable: &'a dyn Traversable,
    pub now: f64,
    pub dt: f64,
}

fn random_unit<R: Rng>(rng: &mut R) -> (f64, f64) {
    let angle = rng.gen_range(0.0..TAU);
    (angle.cos(), angle.sin())
}

/// Walks from `from` towards `to` and returns the furthest traversable point
/// found by bisection. Returns `from` when `from` itself is blocked.
pub fn clamp_to_traversable(from: &Position, to: &Position, traversable: &dyn Traversable) -> Position {
    if traversable.is_traversable(to) {
        return *to;
    }
    if !traversable.is_traversable(from) {
        return *from;
    }
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    for _ in 0..16 {
        let mid = f64::midpoint(lo, hi);
        let p = Position::new(from.x + (to.x - from.x) * mid, from.y + (to.y - from.y) * mid);
        if traversable.is_traversable(&p) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Position::new(from.x + (to.x - from.x) * lo, from.y + (to.y - from.y) * lo)
}

impl Movement {
    #[must_use]
    pub fn is_backing_off(&self) -> bool {
        self.backoff.is_some()
    }

    /// Decides this frame's behaviour. Also feeds player proximity into the
    /// stress accumulator, which takes effect on the next re-evaluation.
    pub fn plan<R: Rng>(
        &mut self,
        position: &Position,
        stress: &mut Stress,
        profile: &AgentProfile,
        ctx: &MovementContext,
        rng: &mut R,
    ) -> MovementMode {
        let cfg = ctx.config;
        let threat_in_range = ctx.threat.and_then(|t| {
            let d = position.distance(&t);
            distance_factor(d, cfg.detection_radius).map(|f| (t, f))
        });

        if let Some((_, factor)) = threat_in_range {
            stress.accumulate_player_alert(profile, ctx.stress_config, factor, ctx.dt);
        }

        // 1. Terminal flee.
        if stress.state == AlertState::Flee {
            self.plan_flee(position, ctx, rng);
            return self.mode;
        }

        // 2. Unfinished BackOff.
        if let Some(backoff) = self.backoff {
            if position.distance_sq(&backoff.target) >= cfg.arrival_radius_sq {
                self.set_backoff(backoff, ctx.now, cfg);
                return self.mode;
            }
            self.backoff = None;
        }

        // 3. Threat proximity overrides Normal/Cautious.
        if let Some((threat, _)) = threat_in_range {
            let dir = threat
                .direction_to(position)
                .unwrap_or_else(|| random_unit(rng));
            self.enter_backoff(position, dir, cfg.detection_radius, BackOffCause::Proximity, ctx);
            return self.mode;
        }

        // 4. Crowd-driven BackOff.
        if stress.state == AlertState::BackOff {
            let dir = random_unit(rng);
            self.enter_backoff(
                position,
                dir,
                2.0 * cfg.detection_radius,
                BackOffCause::Crowd,
                ctx,
            );
            return self.mode;
        }

        // 5. Wander or forage.
        self.plan_normal(position, ctx, rng);
        self.mode
    }

    /// The forage cooldown runs from the last frame spent backing off.
    fn set_backoff(&mut self, backoff: BackOffTarget, now: f64, cfg: &MovementConfig) {
        self.last_backoff_at = Some(now);
        self.mode = MovementMode::BackOff;
        self.target = Some(backoff.target);
        self.speed = cfg.speed;
        self.backoff = Some(backoff);
    }

    fn enter_backoff(
        &mut self,
        position: &Position,
        dir: (f64, f64),
        distance: f64,
        cause: BackOffCause,
        ctx: &MovementContext,
    ) {
        let raw = position.offset(dir.0 * distance, dir.1 * distance);
        let target = clamp_to_traversable(position, &raw, ctx.traversable);
        self.wander_target = None;
        self.set_backoff(BackOffTarget { target, cause }, ctx.now, ctx.config);
    }

    fn plan_flee<R: Rng>(&mut self, position: &Position, ctx: &MovementContext, rng: &mut R) {
        let dir = if let Some(threat) = ctx.threat {
            threat.direction_to(position)
        } else if let Some(center) = ctx.viewport_center {
            self.flee_direction.or_else(|| position.direction_to(&center))
        } else {
            self.flee_direction
        };
        let dir = dir.unwrap_or_else(|| random_unit(rng));

        self.mode = MovementMode::Flee;
        self.flee_direction = Some(dir);
        self.backoff = None;
        self.target = None;
        self.speed = ctx.config.flee_speed;
    }

    fn plan_normal<R: Rng>(&mut self, position: &Position, ctx: &MovementContext, rng: &mut R) {
        let cfg = ctx.config;
        self.speed = cfg.speed;
        self.wander_timer -= ctx.dt;

        if self.wander_timer <= 0.0 || self.wander_target.is_none() {
            self.wander_timer = cfg.wander_interval;
            let (dx, dy) = random_unit(rng);
            let r = cfg.wander_radius * rng.gen::<f64>().sqrt();
            self.wander_target = Some(position.offset(dx * r, dy * r));
        }

        let cooled_down = self
            .last_backoff_at
            .is_none_or(|t| ctx.now - t >= cfg.backoff_cooldown);
        let station = if cooled_down {
            nearest_within(position, ctx.stations, cfg.detection_radius)
        } else {
            None
        };

        match station {
            Some(s) => {
                self.mode = MovementMode::Forage;
                self.target = Some(s);
            }
            None => {
                self.mode = MovementMode::Wander;
                self.target = self.wander_target;
            }
        }
    }

    /// Advances `position` by one fixed sub-step.
    pub fn integrate(&mut self, position: &mut Position, traversable: &dyn Traversable, dt: f64) {
        if self.mode == MovementMode::Flee {
            if let Some((dx, dy)) = self.flee_direction {
                let step = self.speed * dt;
                *position = position.offset(dx * step, dy * step);
                self.last_direction = (dx, dy);
            }
            return;
        }

        let Some(target) = self.target else {
            return;
        };
        let Some(dir) = position.direction_to(&target) else {
            return;
        };
        let step = (self.speed * dt).min(position.distance(&target));
        let next = position.offset(dir.0 * step, dir.1 * step);
        if traversable.is_traversable(&next) {
            *position = next;
            self.last_direction = dir;
        }
    }
}

fn nearest_within(position: &Position, stations: &[Position], radius: f64) -> Option<Position> {
    let r2 = radius * radius;
    stations
        .iter()
        .map(|s| (s, position.distance_sq(s)))
        .filter(|(_, d2)| *d2 <= r2)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| *s)
}
