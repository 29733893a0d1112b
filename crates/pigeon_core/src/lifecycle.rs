use crate::config::{AppConfig, SpeciesConfig};
use crate::systems::movement::Movement;
use hecs::Entity;
use pigeon_data::{
    AgentProfile, Appearance, CapturedPigeon, FaceTag, Identity, Position, RegionTag, Species,
    Stress, Tier,
};
use rand::Rng;
use uuid::Uuid;

pub fn get_name_components(id: &Uuid, species: &str) -> String {
    let id_str = id.to_string();
    let bytes = id_str.as_bytes();
    let syllables = [
        "bo", "ca", "di", "fe", "gu", "ho", "ki", "lo", "mu", "no", "pi", "ro", "su", "to", "wi",
    ];
    let prefix = [
        "Bart", "Coo", "Dusty", "Feath", "Gus", "Hob", "Kip", "Lou", "Mabel", "Nib", "Pip",
        "Rud", "Sq", "Tilly", "Wob",
    ];
    let p_idx = (bytes[0] as usize) % prefix.len();
    let s1_idx = (bytes[1] as usize) % syllables.len();
    let s2_idx = (bytes[2] as usize) % syllables.len();
    let tag: String = species
        .split('_')
        .filter_map(|part| part.chars().next())
        .collect::<String>()
        .to_uppercase();
    format!(
        "{}{}{}-{}",
        prefix[p_idx], syllables[s1_idx], syllables[s2_idx], tag
    )
}

/// Component bundle of a freshly spawned agent.
pub struct PigeonBundle {
    pub identity: Identity,
    pub appearance: Appearance,
    pub species: Species,
    pub tier: Tier,
    pub profile: AgentProfile,
    pub stress: Stress,
    pub movement: Movement,
    pub position: Position,
    pub region: RegionTag,
}

pub fn create_pigeon_with_rng<R: Rng>(
    species: &SpeciesConfig,
    config: &AppConfig,
    position: Position,
    region: RegionTag,
    rng: &mut R,
) -> PigeonBundle {
    let id = Uuid::from_u128(rng.gen::<u128>());
    let face = FaceTag::ALL[rng.gen_range(0..FaceTag::ALL.len())];
    // Stagger the first wander pick so a fresh flock does not move in lockstep.
    let wander_timer = rng.gen::<f64>() * config.movement.wander_interval;
    PigeonBundle {
        identity: Identity {
            id,
            name: get_name_components(&id, &species.id),
        },
        appearance: Appearance { face },
        species: Species(species.id.clone()),
        tier: species.tier,
        profile: *config.tiers.get(species.tier),
        stress: Stress::new(config.stress.thresholds()),
        movement: Movement {
            wander_timer,
            ..Movement::default()
        },
        position,
        region,
    }
}

pub fn spawn_pigeon(world: &mut hecs::World, bundle: PigeonBundle) -> Entity {
    let entity = world.spawn((
        bundle.identity,
        bundle.appearance,
        bundle.species,
        bundle.tier,
        bundle.profile,
        bundle.stress,
        bundle.movement,
        bundle.position,
        bundle.region,
    ));
    tracing::debug!(id = entity.id(), "Pigeon spawned");
    entity
}

/// Clones the stats a station keeps after consuming an agent.
#[must_use]
pub fn capture_snapshot(world: &hecs::World, entity: Entity) -> Option<CapturedPigeon> {
    let mut query = world
        .query_one::<(&Identity, &Species, &Appearance, &Tier, &AgentProfile)>(entity)
        .ok()?;
    let (identity, species, appearance, tier, profile) = query.get()?;
    Some(CapturedPigeon {
        id: identity.id,
        name: identity.name.clone(),
        species: species.clone(),
        face: appearance.face,
        tier: *tier,
        profile: *profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_name_is_stable_per_id() {
        let id = Uuid::from_u128(0x1234_5678_9abc_def0_1234_5678_9abc_def0);
        let a = get_name_components(&id, "rock_pigeon");
        let b = get_name_components(&id, "rock_pigeon");
        assert_eq!(a, b);
        assert!(a.ends_with("-RP"));
    }

    #[test]
    fn test_bundle_takes_tier_profile() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let species = config.species("golden_pigeon").unwrap().clone();
        let bundle = create_pigeon_with_rng(
            &species,
            &config,
            Position::new(1.0, 2.0),
            RegionTag(0),
            &mut rng,
        );
        assert_eq!(bundle.tier, Tier::Legendary);
        assert_eq!(bundle.profile, config.tiers.legendary);
        assert_eq!(bundle.stress.alert, 0.0);
        assert!(bundle.movement.wander_timer < config.movement.wander_interval);
    }

    #[test]
    fn test_capture_snapshot_of_despawned_is_none() {
        let config = AppConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(10);
        let mut world = hecs::World::new();
        let bundle = create_pigeon_with_rng(
            &config.species[0],
            &config,
            Position::default(),
            RegionTag(0),
            &mut rng,
        );
        let name = bundle.identity.name.clone();
        let e = spawn_pigeon(&mut world, bundle);

        let snap = capture_snapshot(&world, e).expect("live agent");
        assert_eq!(snap.name, name);
        assert_eq!(snap.species.as_str(), "rock_pigeon");

        world.despawn(e).unwrap();
        assert!(capture_snapshot(&world, e).is_none());
    }
}
