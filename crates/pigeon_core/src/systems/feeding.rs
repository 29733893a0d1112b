//! Per-frame station tick: scan, crowd alert, eat timers, eat trials, capture.

use crate::config::AppConfig;
use crate::lifecycle::capture_snapshot;
use crate::snapshot::AgentIndex;
use crate::station::{FeedingStation, StationId};
use crate::stress::StressLogic;
use hecs::Entity;
use pigeon_data::{AgentProfile, CapturedPigeon, Stress};
use rand::Rng;

/// A station consumed its last diner this tick.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureEvent {
    pub station: StationId,
    pub agent: Entity,
    pub payload: CapturedPigeon,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickResult {
    /// Captured or depleted; nothing was scanned.
    Inactive,
    Idle,
    Fed { bites: u32 },
    Captured(CaptureEvent),
}

pub trait FeedingLogic {
    /// Runs one tick against the frame's agent index. A capture despawns the
    /// agent from `world` before returning.
    fn tick<R: Rng>(
        &mut self,
        dt: f64,
        world: &mut hecs::World,
        index: &AgentIndex,
        config: &AppConfig,
        rng: &mut R,
    ) -> TickResult;
}

impl FeedingLogic for FeedingStation {
    fn tick<R: Rng>(
        &mut self,
        dt: f64,
        world: &mut hecs::World,
        index: &AgentIndex,
        config: &AppConfig,
        rng: &mut R,
    ) -> TickResult {
        if !self.is_active() {
            return TickResult::Inactive;
        }

        self.eating.retain(|_, remaining| {
            *remaining -= dt;
            *remaining > 0.0
        });

        // 1. Rescan
        index.within_eat_radius(&self.position, &mut self.in_range);

        let mut competitors: Vec<Entity> = Vec::with_capacity(self.in_range.len());
        for &e in &self.in_range {
            if let Ok(stress) = world.query_one_mut::<&Stress>(e) {
                if stress.can_eat() {
                    competitors.push(e);
                }
            }
        }

        // Partial progress is not kept across an ineligibility gap.
        self.eat_timers.retain(|e, _| competitors.contains(&e));

        // 2. Crowd alert
        if competitors.len() >= 2 {
            let others = competitors.len() - 1;
            for &e in &competitors {
                if let Ok((stress, profile)) =
                    world.query_one_mut::<(&mut Stress, &AgentProfile)>(e)
                {
                    stress.accumulate_crowd_alert(profile, &config.stress, others, dt);
                }
            }
        }

        // 3-4. Eat timers and trials
        let mut bites = 0u32;
        for &e in &competitors {
            let Ok((stress, profile)) = world.query_one_mut::<(&Stress, &AgentProfile)>(e) else {
                continue;
            };
            let interval = stress.effective_eat_interval(profile, &config.stress);
            let chance = stress.effective_eat_chance(profile, &config.stress);
            let bite_power = profile.bite_power;

            let timer = self.eat_timers.get_or_insert_with(e, || 0.0);
            *timer += dt;
            if *timer < interval {
                continue;
            }
            *timer = 0.0;

            let draw: f64 = rng.gen();
            if draw > chance {
                continue;
            }

            if self.remaining_feed - bite_power <= 0 {
                // The finishing bite only lands on an agent that can be captured.
                let Some(payload) = capture_snapshot(world, e) else {
                    tracing::warn!(station = %self.id, agent = ?e, "Finishing bite skipped, agent has no capture record");
                    continue;
                };
                self.remaining_feed -= bite_power;
                return self.capture(e, payload, world);
            }

            self.eating.insert(e, config.feeding.eating_display_window);
            self.remaining_feed -= bite_power;
            bites += 1;
        }

        if bites > 0 {
            TickResult::Fed { bites }
        } else {
            TickResult::Idle
        }
    }
}

impl FeedingStation {
    fn capture(&mut self, agent: Entity, payload: CapturedPigeon, world: &mut hecs::World) -> TickResult {
        let _ = world.despawn(agent);

        self.captured = Some(payload.clone());
        self.eat_timers.clear();
        self.eating.clear();
        self.in_range.clear();

        tracing::info!(
            station = %self.id,
            pigeon = %payload.name,
            species = payload.species.as_str(),
            "Pigeon captured"
        );
        TickResult::Captured(CaptureEvent {
            station: self.id,
            agent,
            payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{create_pigeon_with_rng, spawn_pigeon};
    use pigeon_data::{AlertState, Position, RegionTag, TrapType};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sure_eater() -> AgentProfile {
        AgentProfile {
            bite_power: 5,
            eat_chance: 1.0,
            eat_interval: 1.0,
            eat_radius: 1.0,
            ..AgentProfile::default()
        }
    }

    fn spawn_at(world: &mut hecs::World, config: &AppConfig, pos: Position, profile: AgentProfile) -> Entity {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut bundle = create_pigeon_with_rng(&config.species[0], config, pos, RegionTag(0), &mut rng);
        bundle.profile = profile;
        spawn_pigeon(world, bundle)
    }

    fn setup() -> (AppConfig, hecs::World, AgentIndex, FeedingStation) {
        let config = AppConfig::default();
        let world = hecs::World::new();
        let index = AgentIndex::new(2.0, 20.0, 20.0);
        let station = FeedingStation::new(StationId(1), TrapType::Seeds, Position::new(10.0, 10.0), 20);
        (config, world, index, station)
    }

    #[test]
    fn test_four_bites_capture_then_inactive() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let agent = spawn_at(&mut world, &config, Position::new(10.3, 10.0), sure_eater());
        index.rebuild(&world);

        for expected in [15, 10, 5] {
            assert_eq!(
                station.tick(1.0, &mut world, &index, &config, &mut rng),
                TickResult::Fed { bites: 1 }
            );
            assert_eq!(station.remaining_feed(), expected);
        }
        match station.tick(1.0, &mut world, &index, &config, &mut rng) {
            TickResult::Captured(event) => {
                assert_eq!(event.agent, agent);
                assert_eq!(event.station, StationId(1));
            }
            other => panic!("expected capture, got {other:?}"),
        }
        assert_eq!(station.remaining_feed(), 0);
        assert!(station.is_captured());
        assert!(!world.contains(agent));

        assert_eq!(
            station.tick(1.0, &mut world, &index, &config, &mut rng),
            TickResult::Inactive
        );
        assert_eq!(station.remaining_feed(), 0);
    }

    #[test]
    fn test_collect_resumes_scanning() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);
        for _ in 0..4 {
            station.tick(1.0, &mut world, &index, &config, &mut rng);
        }
        assert!(station.is_captured());

        let payload = station.collect().expect("payload");
        assert_eq!(payload.profile.bite_power, 5);
        assert_eq!(station.remaining_feed(), 20);
        assert!(!station.is_captured());
        assert!(station.collect().is_none());

        spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);
        assert_eq!(
            station.tick(1.0, &mut world, &index, &config, &mut rng),
            TickResult::Fed { bites: 1 }
        );
    }

    #[test]
    fn test_eat_radius_is_per_agent() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let short = AgentProfile {
            eat_radius: 0.2,
            ..sure_eater()
        };
        spawn_at(&mut world, &config, Position::new(10.5, 10.0), short);
        index.rebuild(&world);
        assert_eq!(
            station.tick(1.0, &mut world, &index, &config, &mut rng),
            TickResult::Idle
        );
        assert!(station.in_range().is_empty());
    }

    #[test]
    fn test_crowd_alert_counts_others() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let slow = AgentProfile {
            eat_interval: 100.0,
            crowd_alert_per_neighbor_per_sec: 6.0,
            ..sure_eater()
        };
        let a = spawn_at(&mut world, &config, Position::new(10.1, 10.0), slow);
        let b = spawn_at(&mut world, &config, Position::new(9.9, 10.0), slow);
        let c = spawn_at(&mut world, &config, Position::new(10.0, 10.1), slow);
        index.rebuild(&world);

        station.tick(0.5, &mut world, &index, &config, &mut rng);
        for e in [a, b, c] {
            let stress = world.get::<&Stress>(e).unwrap();
            assert!((stress.alert - 6.0 * 2.0 * 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn test_single_diner_gets_no_crowd_alert() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let a = spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);
        station.tick(0.5, &mut world, &index, &config, &mut rng);
        assert_eq!(world.get::<&Stress>(a).unwrap().alert, 0.0);
    }

    #[test]
    fn test_ineligible_agent_loses_timer_progress() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let a = spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);

        station.tick(0.6, &mut world, &index, &config, &mut rng);
        assert_eq!(station.eat_progress(a), Some(0.6));

        world.get::<&mut Stress>(a).unwrap().state = AlertState::BackOff;
        station.tick(0.6, &mut world, &index, &config, &mut rng);
        assert_eq!(station.eat_progress(a), None);

        world.get::<&mut Stress>(a).unwrap().state = AlertState::Normal;
        assert_eq!(
            station.tick(0.6, &mut world, &index, &config, &mut rng),
            TickResult::Idle
        );
        assert_eq!(station.eat_progress(a), Some(0.6));
    }

    #[test]
    fn test_eating_flag_expires() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let a = spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);

        station.tick(1.0, &mut world, &index, &config, &mut rng);
        assert!(station.is_eating(a));
        station.tick(0.3, &mut world, &index, &config, &mut rng);
        assert!(station.is_eating(a));
        station.tick(0.3, &mut world, &index, &config, &mut rng);
        assert!(!station.is_eating(a));
    }

    #[test]
    fn test_finishing_bite_needs_a_capturable_agent() {
        let (config, mut world, mut index, _) = setup();
        let mut station = FeedingStation::new(StationId(2), TrapType::Seeds, Position::new(10.0, 10.0), 5);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let bare = world.spawn((Position::new(10.0, 10.0), sure_eater(), Stress::default()));
        index.rebuild(&world);

        assert_eq!(
            station.tick(1.0, &mut world, &index, &config, &mut rng),
            TickResult::Idle
        );
        assert_eq!(station.remaining_feed(), 5);
        assert!(station.is_active());
        assert!(!station.is_captured());
        assert!(world.contains(bare));

        let full = spawn_at(&mut world, &config, Position::new(10.2, 10.0), sure_eater());
        index.rebuild(&world);
        match station.tick(1.0, &mut world, &index, &config, &mut rng) {
            TickResult::Captured(event) => assert_eq!(event.agent, full),
            other => panic!("expected capture, got {other:?}"),
        }
        assert!(world.contains(bare));
    }

    #[test]
    fn test_despawned_agent_in_stale_index_is_skipped() {
        let (config, mut world, mut index, mut station) = setup();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let a = spawn_at(&mut world, &config, Position::new(10.0, 10.0), sure_eater());
        index.rebuild(&world);
        world.despawn(a).unwrap();
        assert_eq!(
            station.tick(1.0, &mut world, &index, &config, &mut rng),
            TickResult::Idle
        );
    }
}
