/// Asserts the total roster population of a park.
#[macro_export]
macro_rules! assert_population {
    ($park:expr, $count:expr) => {
        assert_eq!(
            $park.population_count(),
            $count,
            "Population count mismatch"
        );
    };
}

/// Asserts that a pigeon handle no longer resolves in the park.
#[macro_export]
macro_rules! assert_pigeon_gone {
    ($park:expr, $entity:expr) => {
        assert!(
            !$park.ecs.contains($entity),
            "Pigeon {:?} should be gone but is still in the park",
            $entity
        );
    };
}

/// Asserts a pigeon's current alert state.
#[macro_export]
macro_rules! assert_alert_state {
    ($park:expr, $entity:expr, $state:expr) => {{
        let stress = $park
            .ecs
            .get::<&pigeon_data::Stress>($entity)
            .expect("Pigeon not found in park");
        assert_eq!(stress.state, $state, "Unexpected alert state");
    }};
}
