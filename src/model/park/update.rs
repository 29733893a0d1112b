use crate::model::park::{Park, ParkEvent, MAX_SUBSTEPS};
use crate::model::region::Traversable;
use crate::model::systems::feeding::{FeedingLogic, TickResult};
use crate::model::systems::movement::{Movement, MovementContext};
use crate::model::systems::population::{PopulationContext, PopulationEvent};
use crate::model::StressLogic;
use pigeon_data::{AgentProfile, Position, RegionTag, Stress};
use rand::SeedableRng;
use std::time::Instant;

/// Used when an agent's region tag no longer resolves.
fn anywhere(_: &Position) -> bool {
    true
}

impl Park {
    /// Advances the park by one variable-length frame.
    ///
    /// Phases run in a fixed order so every consumer of an agent's alert state
    /// sees the value re-evaluated this frame:
    /// 1. roster upkeep (attrition, flee timeout, replenishment)
    /// 2. alert decay and re-evaluation
    /// 3. movement planning, which also feeds player proximity into alert
    /// 4. fixed-timestep position integration
    /// 5. agent index rebuild
    /// 6. station ticks
    ///
    /// # Arguments
    /// * `frame_dt` - Seconds since the previous frame. Negative or non-finite values count as zero.
    /// * `threat` - Position of the player, if present.
    pub fn update(&mut self, frame_dt: f64, threat: Option<Position>) -> Vec<ParkEvent> {
        let start = Instant::now();
        let dt = if frame_dt.is_finite() { frame_dt.max(0.0) } else { 0.0 };
        let threat = threat.filter(Position::is_finite);

        self.frame += 1;
        self.time += dt;

        if self.config.world.deterministic {
            let seed = self
                .config
                .world
                .seed
                .unwrap_or(0)
                .wrapping_add(self.frame)
                .wrapping_add(0x5EED);
            self.rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        }

        let mut events = Vec::new();
        self.pass_population(dt, &mut events);
        self.pass_stress(dt);
        self.pass_movement_plan(dt, threat);
        self.pass_integration(dt);
        self.index.rebuild(&self.ecs);
        self.pass_stations(dt, &mut events);

        let active = self.stations.iter().filter(|s| s.is_active()).count();
        self.metrics
            .record_frame(start.elapsed(), self.population.total_population(), active);
        events
    }

    fn pass_population(&mut self, dt: f64, events: &mut Vec<ParkEvent>) {
        let active = self.active_station_tags();
        let mut ctx = PopulationContext {
            world: &mut self.ecs,
            config: &self.config,
            active_stations: &active,
            rng: &mut self.rng,
            now: self.time,
        };
        for event in self.population.tick(dt, &mut ctx) {
            match event {
                PopulationEvent::Spawned { .. } => self.metrics.record_spawn(),
                PopulationEvent::ForcedFlee { .. } => self.metrics.record_forced_flee(),
                PopulationEvent::Despawned { .. } => self.metrics.record_despawn(),
            }
            events.push(ParkEvent::Population(event));
        }
    }

    fn pass_stress(&mut self, dt: f64) {
        let now = self.time;
        let config = &self.config.stress;
        for (_handle, stress) in self.ecs.query_mut::<&mut Stress>() {
            stress.decay(config, dt);
            stress.reevaluate(now);
        }
    }

    fn pass_movement_plan(&mut self, dt: f64, threat: Option<Position>) {
        let stations: Vec<Position> = self
            .stations
            .iter()
            .filter(|s| s.is_active())
            .map(|s| s.position)
            .collect();
        let rosters = &self.population.rosters;
        let config = &self.config;
        let rng = &mut self.rng;
        let viewport_center = self.viewport_center;
        let now = self.time;

        for (_handle, (pos, stress, profile, movement, region)) in self.ecs.query_mut::<(
            &Position,
            &mut Stress,
            &AgentProfile,
            &mut Movement,
            &RegionTag,
        )>() {
            let traversable: &dyn Traversable = match rosters.get(region.0) {
                Some(roster) => &roster.region,
                None => &anywhere,
            };
            let ctx = MovementContext {
                config: &config.movement,
                stress_config: &config.stress,
                threat,
                viewport_center,
                stations: &stations,
                traversable,
                now,
                dt,
            };
            movement.plan(pos, stress, profile, &ctx, rng);
        }
    }

    fn pass_integration(&mut self, dt: f64) {
        let step = self.config.world.fixed_timestep;
        self.step_accumulator += dt;

        let mut steps = 0;
        while self.step_accumulator >= step && steps < MAX_SUBSTEPS {
            let rosters = &self.population.rosters;
            for (_handle, (pos, movement, region)) in
                self.ecs
                    .query_mut::<(&mut Position, &mut Movement, &RegionTag)>()
            {
                let traversable: &dyn Traversable = match rosters.get(region.0) {
                    Some(roster) => &roster.region,
                    None => &anywhere,
                };
                movement.integrate(pos, traversable, step);
            }
            self.step_accumulator -= step;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS && self.step_accumulator >= step {
            tracing::warn!(dropped = self.step_accumulator, "Frame too long, movement time dropped");
            self.step_accumulator = 0.0;
        }
    }

    fn pass_stations(&mut self, dt: f64, events: &mut Vec<ParkEvent>) {
        for station in &mut self.stations {
            let result = station.tick(dt, &mut self.ecs, &self.index, &self.config, &mut self.rng);
            if let TickResult::Captured(event) = result {
                self.population.forget(event.agent);
                self.metrics.record_capture();
                events.push(ParkEvent::Captured(event));
            }
        }
    }
}
