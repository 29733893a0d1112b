mod common;

use common::{run_frames, ParkBuilder};
use pigeon_data::{AlertState, Position, RegionTag, Stress};
use pigeon_park_lib::model::park::ParkEvent;
use pigeon_park_lib::model::region::RegionShape;
use pigeon_park_lib::model::systems::population::PopulationEvent;

fn lawn() -> RegionShape {
    RegionShape::Circle {
        x: 10.0,
        y: 10.0,
        radius: 4.0,
    }
}

fn count_events(events: &[ParkEvent], pred: impl Fn(&PopulationEvent) -> bool) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ParkEvent::Population(p) if pred(p)))
        .count()
}

#[test]
fn test_initial_fill_places_pigeons_inside_their_regions() {
    let park = ParkBuilder::new()
        .only_region("lawn", lawn(), 8)
        .with_region(
            "pond",
            RegionShape::Polygon {
                origin: [30.0, 12.0],
                scale: 2.0,
                rotation: std::f64::consts::FRAC_PI_4,
                vertices: vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]],
            },
            5,
        )
        .build();

    assert_population!(park, 13);
    assert_eq!(park.metrics.spawns(), 13);
    for (idx, roster) in park.population.rosters.iter().enumerate() {
        assert_eq!(roster.len(), roster.target_count);
        for &e in &roster.members {
            let pos = park.ecs.get::<&Position>(e).unwrap();
            let tag = park.ecs.get::<&RegionTag>(e).unwrap();
            assert_eq!(tag.0, idx);
            assert!(roster.region.contains(&pos), "{} outside {}", idx, roster.id);
        }
    }
}

#[test]
fn test_replenishment_refills_one_per_check() {
    let mut park = ParkBuilder::new()
        .only_region("lawn", lawn(), 5)
        .with_config(|c| {
            c.population.spawn_chance = 1.0;
            c.population.check_interval = 2.0;
        })
        .build();
    assert_population!(park, 5);

    let victims: Vec<_> = park.population.rosters[0].members[..2].to_vec();
    for v in victims {
        park.ecs.despawn(v).unwrap();
    }

    // Pruned on the next frame; the first check is due at t = 2.0.
    let events = run_frames(&mut park, 3, 0.5, None);
    assert_eq!(count_events(&events, |p| matches!(p, PopulationEvent::Spawned { .. })), 0);
    assert_population!(park, 3);

    run_frames(&mut park, 1, 0.5, None);
    assert_population!(park, 4);

    run_frames(&mut park, 4, 0.5, None);
    assert_population!(park, 5);

    // Full rosters stay put.
    let events = run_frames(&mut park, 8, 0.5, None);
    assert_eq!(count_events(&events, |p| matches!(p, PopulationEvent::Spawned { .. })), 0);
}

#[test]
fn test_attrition_sends_calm_pigeons_away_then_removes_them() {
    let mut park = ParkBuilder::new()
        .only_region("lawn", lawn(), 6)
        .with_config(|c| {
            c.population.despawn_chance = 1.0;
            c.population.flee_timeout = 3.0;
        })
        .build();

    let events = run_frames(&mut park, 1, 1.0, None);
    assert_eq!(count_events(&events, |p| matches!(p, PopulationEvent::ForcedFlee { .. })), 6);
    for (_, stress) in park.ecs.query::<&Stress>().iter() {
        assert_eq!(stress.state, AlertState::Flee);
    }
    assert_population!(park, 6);

    // Entered Flee at t = 1.0, so the timeout expires at t = 4.0.
    let events = run_frames(&mut park, 2, 1.0, None);
    assert_eq!(count_events(&events, |_| true), 0);

    let events = run_frames(&mut park, 1, 1.0, None);
    assert_eq!(count_events(&events, |p| matches!(p, PopulationEvent::Despawned { .. })), 6);
    assert_population!(park, 0);
    assert_eq!(park.metrics.forced_flees(), 6);
    assert_eq!(park.metrics.despawns(), 6);
}

#[test]
fn test_spawn_species_rejects_unknown_inputs() {
    let mut park = ParkBuilder::new().build();
    assert!(park.spawn_species(RegionTag(0), "dodo").is_none());
    assert!(park.spawn_species(RegionTag(3), "rock_pigeon").is_none());
    assert!(park.spawn_species(RegionTag(0), "golden_pigeon").is_some());
    assert_population!(park, 1);
}
