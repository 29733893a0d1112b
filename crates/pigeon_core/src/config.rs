//! Configuration management for park simulation parameters.
//!
//! Strongly-typed configuration structures that map to `config.toml`. Every
//! section has defaults, so a config file only needs to name what it changes.
//!
//! ## Example `config.toml`
//!
//! ```toml
//! [world]
//! width = 40.0
//! height = 24.0
//! seed = 7
//!
//! [stress]
//! warn = 45.0
//! backoff = 70.0
//! flee = 100.0
//!
//! [[species]]
//! id = "rock_pigeon"
//! tier = "common"
//! base_weight = 10.0
//! favorite_trap = "breadcrumbs"
//! favorite_terrain = "plaza"
//!
//! [[regions]]
//! id = "plaza"
//! target_count = 12
//! shape = { kind = "rect", min_x = 2.0, min_y = 2.0, max_x = 38.0, max_y = 22.0 }
//! ```

use crate::region::{Bounds, Region, RegionShape};
use pigeon_data::{AgentProfile, Position, TerrainType, Thresholds, Tier, TrapType};
use serde::de::{DeserializeOwned, IntoDeserializer};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use thiserror::Error;

/// Failure to load or validate a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn ensure(cond: bool, msg: &str) -> Result<(), ConfigError> {
    if cond {
        Ok(())
    } else {
        Err(ConfigError::Invalid(msg.to_string()))
    }
}

/// Parses a snake_case tag, warning and returning `None` when it is unknown.
fn parse_tag<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let de: serde::de::value::StrDeserializer<'_, serde::de::value::Error> =
        raw.into_deserializer();
    match T::deserialize(de) {
        Ok(tag) => Some(tag),
        Err(_) => {
            tracing::warn!(value = raw, "Unknown tag in config, ignoring it");
            None
        }
    }
}

/// Optional tag: unknown values read as absent.
fn lenient_favorite<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| parse_tag(&s)))
}

/// Required tag: unknown values read as the type's default.
fn lenient_tag<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = String::deserialize(deserializer)?;
    Ok(parse_tag(&raw).unwrap_or_default())
}

/// Park dimensions and scheduling.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    pub seed: Option<u64>,
    pub deterministic: bool,
    pub spatial_cell_size: f64,
    /// Seconds per movement integration sub-step.
    pub fixed_timestep: f64,
    pub target_fps: u64,
}

impl WorldConfig {
    /// The park rectangle `[0, width] × [0, height]`.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: self.width,
            max_y: self.height,
        }
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 40.0,
            height: 24.0,
            seed: None,
            deterministic: false,
            spatial_cell_size: 2.0,
            fixed_timestep: 0.02,
            target_fps: 30,
        }
    }
}

/// Alert accumulation and state thresholds, shared by every tier.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StressConfig {
    pub warn: f64,
    pub backoff: f64,
    pub flee: f64,
    /// Alert units shed per second while not fleeing.
    pub decay_rate: f64,
    pub alert_weight: f64,
    /// When set, `Cautious` agents eat less reliably and less often.
    pub stress_modifier_enabled: bool,
    pub cautious_eat_chance_multiplier: f64,
    pub cautious_eat_interval_multiplier: f64,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            warn: 45.0,
            backoff: 70.0,
            flee: 100.0,
            decay_rate: 10.0,
            alert_weight: 1.0,
            stress_modifier_enabled: true,
            cautious_eat_chance_multiplier: 0.7,
            cautious_eat_interval_multiplier: 1.5,
        }
    }
}

impl StressConfig {
    #[must_use]
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            warn: self.warn,
            backoff: self.backoff,
            flee: self.flee,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct MovementConfig {
    pub detection_radius: f64,
    pub wander_interval: f64,
    pub wander_radius: f64,
    pub speed: f64,
    pub flee_speed: f64,
    /// Squared distance at which a BackOff target counts as reached.
    pub arrival_radius_sq: f64,
    /// Seconds after the last BackOff frame before stations attract the agent again.
    pub backoff_cooldown: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            detection_radius: 3.0,
            wander_interval: 2.5,
            wander_radius: 2.0,
            speed: 1.2,
            flee_speed: 4.0,
            arrival_radius_sq: 0.04,
            backoff_cooldown: 3.0,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FeedingConfig {
    /// Seconds an agent stays flagged as eating after a successful bite.
    pub eating_display_window: f64,
    pub default_max_feed: i32,
}

impl Default for FeedingConfig {
    fn default() -> Self {
        Self {
            eating_display_window: 0.5,
            default_max_feed: 20,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PopulationConfig {
    /// Seconds between roster deficit checks.
    pub check_interval: f64,
    /// Probability of spawning one replacement per check when under target.
    pub spawn_chance: f64,
    /// Per-second probability of a calm agent being sent away.
    pub despawn_chance: f64,
    /// Seconds an agent may spend fleeing before it is removed.
    pub flee_timeout: f64,
    pub small_area_attempts: usize,
    pub world_area_attempts: usize,
    /// Bounding-box area above which `world_area_attempts` is used.
    pub world_area_threshold: f64,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            check_interval: 2.0,
            spawn_chance: 0.5,
            despawn_chance: 0.005,
            flee_timeout: 8.0,
            small_area_attempts: 20,
            world_area_attempts: 100,
            world_area_threshold: 400.0,
        }
    }
}

/// Behaviour profile per rarity tier.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TierProfiles {
    pub common: AgentProfile,
    pub uncommon: AgentProfile,
    pub rare: AgentProfile,
    pub legendary: AgentProfile,
}

impl Default for TierProfiles {
    fn default() -> Self {
        Self {
            common: AgentProfile::default(),
            uncommon: AgentProfile {
                bite_power: 4,
                eat_chance: 0.7,
                eat_interval: 1.2,
                player_alert_per_sec: 25.0,
                crowd_alert_per_neighbor_per_sec: 8.0,
                price: 25,
                eat_radius: 0.8,
            },
            rare: AgentProfile {
                bite_power: 3,
                eat_chance: 0.6,
                eat_interval: 1.5,
                player_alert_per_sec: 32.0,
                crowd_alert_per_neighbor_per_sec: 10.0,
                price: 60,
                eat_radius: 0.7,
            },
            legendary: AgentProfile {
                bite_power: 2,
                eat_chance: 0.5,
                eat_interval: 2.0,
                player_alert_per_sec: 40.0,
                crowd_alert_per_neighbor_per_sec: 12.0,
                price: 200,
                eat_radius: 0.6,
            },
        }
    }
}

impl TierProfiles {
    #[must_use]
    pub fn get(&self, tier: Tier) -> &AgentProfile {
        match tier {
            Tier::Common => &self.common,
            Tier::Uncommon => &self.uncommon,
            Tier::Rare => &self.rare,
            Tier::Legendary => &self.legendary,
        }
    }

    #[must_use]
    pub fn max_eat_radius(&self) -> f64 {
        [&self.common, &self.uncommon, &self.rare, &self.legendary]
            .iter()
            .map(|p| p.eat_radius)
            .fold(0.0, f64::max)
    }
}

/// Static description of a spawnable species.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpeciesConfig {
    pub id: String,
    #[serde(default)]
    pub tier: Tier,
    pub base_weight: f64,
    #[serde(default, deserialize_with = "lenient_favorite")]
    pub favorite_trap: Option<TrapType>,
    #[serde(default, deserialize_with = "lenient_favorite")]
    pub favorite_terrain: Option<TerrainType>,
}

impl SpeciesConfig {
    #[must_use]
    pub fn new(id: &str, tier: Tier, base_weight: f64) -> Self {
        Self {
            id: id.to_string(),
            tier,
            base_weight,
            favorite_trap: None,
            favorite_terrain: None,
        }
    }

    #[must_use]
    pub fn with_favorites(mut self, trap: TrapType, terrain: TerrainType) -> Self {
        self.favorite_trap = Some(trap);
        self.favorite_terrain = Some(terrain);
        self
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RegionConfig {
    pub id: String,
    pub shape: RegionShape,
    pub target_count: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StationConfig {
    #[serde(deserialize_with = "lenient_tag")]
    pub trap: TrapType,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub max_feed: Option<i32>,
}

/// A patch of terrain painted over the default ground tag.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TerrainPatchConfig {
    #[serde(deserialize_with = "lenient_tag")]
    pub terrain: TerrainType,
    pub shape: RegionShape,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub world: WorldConfig,
    pub stress: StressConfig,
    pub movement: MovementConfig,
    pub feeding: FeedingConfig,
    pub population: PopulationConfig,
    pub tiers: TierProfiles,
    pub species: Vec<SpeciesConfig>,
    pub regions: Vec<RegionConfig>,
    pub stations: Vec<StationConfig>,
    pub terrain: Vec<TerrainPatchConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            stress: StressConfig::default(),
            movement: MovementConfig::default(),
            feeding: FeedingConfig::default(),
            population: PopulationConfig::default(),
            tiers: TierProfiles::default(),
            species: vec![
                SpeciesConfig::new("rock_pigeon", Tier::Common, 10.0)
                    .with_favorites(TrapType::Breadcrumbs, TerrainType::Plaza),
                SpeciesConfig::new("feral_pigeon", Tier::Common, 8.0)
                    .with_favorites(TrapType::Fries, TerrainType::Street),
                SpeciesConfig::new("wood_pigeon", Tier::Common, 6.0)
                    .with_favorites(TrapType::Seeds, TerrainType::Grass),
                SpeciesConfig::new("crowned_pigeon", Tier::Uncommon, 3.0)
                    .with_favorites(TrapType::Corn, TerrainType::Fountain),
                SpeciesConfig::new("fantail", Tier::Rare, 1.5)
                    .with_favorites(TrapType::Seeds, TerrainType::Fountain),
                SpeciesConfig::new("pouter", Tier::Rare, 1.0)
                    .with_favorites(TrapType::Pretzel, TerrainType::Gravel),
                SpeciesConfig::new("golden_pigeon", Tier::Legendary, 0.3)
                    .with_favorites(TrapType::Pretzel, TerrainType::Fountain),
            ],
            regions: vec![RegionConfig {
                id: "plaza".to_string(),
                shape: RegionShape::Rect {
                    min_x: 2.0,
                    min_y: 2.0,
                    max_x: 38.0,
                    max_y: 22.0,
                },
                target_count: 12,
            }],
            stations: Vec::new(),
            terrain: vec![
                TerrainPatchConfig {
                    terrain: TerrainType::Grass,
                    shape: RegionShape::Rect {
                        min_x: 0.0,
                        min_y: 0.0,
                        max_x: 12.0,
                        max_y: 24.0,
                    },
                },
                TerrainPatchConfig {
                    terrain: TerrainType::Fountain,
                    shape: RegionShape::Circle {
                        x: 28.0,
                        y: 12.0,
                        radius: 3.0,
                    },
                },
            ],
        }
    }
}

impl AppConfig {
    /// Validates all configuration parameters.
    ///
    /// Returns the first violated rule as [`ConfigError::Invalid`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.world.width > 0.0, "World width must be positive")?;
        ensure(self.world.height > 0.0, "World height must be positive")?;
        ensure(
            self.world.spatial_cell_size > 0.0,
            "Spatial cell size must be positive",
        )?;
        ensure(
            self.world.fixed_timestep > 0.0,
            "Fixed timestep must be positive",
        )?;
        ensure(self.world.target_fps > 0, "Target FPS must be positive")?;
        ensure(self.world.target_fps <= 240, "Target FPS too high (max 240)")?;

        ensure(self.stress.warn >= 0.0, "Warn threshold must be non-negative")?;
        ensure(
            self.stress.warn < self.stress.backoff && self.stress.backoff < self.stress.flee,
            "Thresholds must satisfy warn < backoff < flee",
        )?;
        ensure(self.stress.decay_rate >= 0.0, "Decay rate must be non-negative")?;
        ensure(self.stress.alert_weight >= 0.0, "Alert weight must be non-negative")?;
        ensure(
            self.stress.cautious_eat_chance_multiplier >= 0.0,
            "Cautious eat chance multiplier must be non-negative",
        )?;
        ensure(
            self.stress.cautious_eat_interval_multiplier > 0.0,
            "Cautious eat interval multiplier must be positive",
        )?;

        ensure(
            self.movement.detection_radius > 0.0,
            "Detection radius must be positive",
        )?;
        ensure(
            self.movement.wander_interval > 0.0,
            "Wander interval must be positive",
        )?;
        ensure(self.movement.speed >= 0.0, "Speed must be non-negative")?;
        ensure(self.movement.flee_speed >= 0.0, "Flee speed must be non-negative")?;
        ensure(
            self.movement.arrival_radius_sq > 0.0,
            "Arrival radius must be positive",
        )?;

        ensure(
            self.feeding.eating_display_window >= 0.0,
            "Eating display window must be non-negative",
        )?;
        ensure(
            self.feeding.default_max_feed > 0,
            "Default max feed must be positive",
        )?;

        ensure(
            self.population.check_interval > 0.0,
            "Population check interval must be positive",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.population.spawn_chance),
            "Spawn chance must be in [0.0, 1.0]",
        )?;
        ensure(
            (0.0..=1.0).contains(&self.population.despawn_chance),
            "Despawn chance must be in [0.0, 1.0]",
        )?;
        ensure(
            self.population.flee_timeout >= 0.0,
            "Flee timeout must be non-negative",
        )?;
        ensure(
            self.population.small_area_attempts > 0 && self.population.world_area_attempts > 0,
            "Placement attempts must be positive",
        )?;

        for tier in [Tier::Common, Tier::Uncommon, Tier::Rare, Tier::Legendary] {
            let p = self.tiers.get(tier);
            ensure(p.bite_power > 0, "Bite power must be positive")?;
            ensure(
                (0.0..=1.0).contains(&p.eat_chance),
                "Eat chance must be in [0.0, 1.0]",
            )?;
            ensure(p.eat_interval > 0.0, "Eat interval must be positive")?;
            ensure(p.eat_radius >= 0.0, "Eat radius must be non-negative")?;
            ensure(
                p.player_alert_per_sec >= 0.0 && p.crowd_alert_per_neighbor_per_sec >= 0.0,
                "Alert rates must be non-negative",
            )?;
        }

        ensure(!self.species.is_empty(), "At least one species is required")?;
        for s in &self.species {
            ensure(s.base_weight >= 0.0, "Species base weight must be non-negative")?;
        }
        let park = self.world.bounds();
        for st in &self.stations {
            ensure(
                st.max_feed.is_none_or(|m| m > 0),
                "Station max feed must be positive",
            )?;
            if !park.contains(&Position::new(st.x, st.y)) {
                return Err(ConfigError::Invalid(format!(
                    "Station at ({}, {}) lies outside the world",
                    st.x, st.y
                )));
            }
        }
        for r in &self.regions {
            let b = Region::new(r.shape.clone()).bounds();
            let inside = park.contains(&Position::new(b.min_x, b.min_y))
                && park.contains(&Position::new(b.max_x, b.max_y));
            if !inside {
                return Err(ConfigError::Invalid(format!(
                    "Region '{}' extends outside the world",
                    r.id
                )));
            }
        }

        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[must_use]
    pub fn species(&self, id: &str) -> Option<&SpeciesConfig> {
        self.species.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(format!("{:?}", self.stress).as_bytes());
        hasher.update(format!("{:?}", self.movement).as_bytes());
        hasher.update(format!("{:?}", self.feeding).as_bytes());
        hasher.update(format!("{:?}", self.population).as_bytes());
        hasher.update(format!("{:?}", self.tiers).as_bytes());
        hasher.update(format!("{:?}", self.species).as_bytes());
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thresholds_must_ascend() {
        let config = AppConfig {
            stress: StressConfig {
                backoff: 40.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_invalid_spawn_chance() {
        let config = AppConfig {
            population: PopulationConfig {
                spawn_chance: 1.5,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_species_rejected() {
        let config = AppConfig {
            species: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [stress]
            flee = 120.0

            [[regions]]
            id = "lawn"
            target_count = 3
            shape = { kind = "circle", x = 5.0, y = 5.0, radius = 2.0 }
            "#,
        )
        .expect("valid config");
        assert_eq!(config.stress.flee, 120.0);
        assert_eq!(config.stress.warn, 45.0);
        assert_eq!(config.regions.len(), 1);
        assert_eq!(config.regions[0].target_count, 3);
        assert!(!config.species.is_empty());
    }

    #[test]
    fn test_unknown_tags_fall_back() {
        let config = AppConfig::from_toml(
            r#"
            [[species]]
            id = "moon_pigeon"
            base_weight = 1.0
            favorite_trap = "caviar"
            favorite_terrain = "moon"

            [[species]]
            id = "rock_pigeon"
            base_weight = 2.0
            favorite_trap = "seeds"

            [[stations]]
            trap = "caviar"
            x = 1.0
            y = 1.0

            [[terrain]]
            terrain = "lava"
            shape = { kind = "circle", x = 5.0, y = 5.0, radius = 1.0 }
            "#,
        )
        .expect("unknown tags are not fatal");
        assert_eq!(config.stations[0].trap, TrapType::Breadcrumbs);
        assert_eq!(config.terrain[0].terrain, TerrainType::Plaza);
        let moon = config.species("moon_pigeon").expect("species kept");
        assert_eq!(moon.favorite_trap, None);
        assert_eq!(moon.favorite_terrain, None);
        let rock = config.species("rock_pigeon").expect("species kept");
        assert_eq!(rock.favorite_trap, Some(TrapType::Seeds));
        assert_eq!(rock.favorite_terrain, None);
    }

    #[test]
    fn test_region_outside_world_rejected() {
        let config = AppConfig {
            regions: vec![RegionConfig {
                id: "offside".to_string(),
                shape: RegionShape::Circle {
                    x: -5.0,
                    y: 5.0,
                    radius: 2.0,
                },
                target_count: 1,
            }],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_station_outside_world_rejected() {
        let mut config = AppConfig::default();
        config.stations.push(StationConfig {
            trap: TrapType::Seeds,
            x: -5.0,
            y: 5.0,
            max_feed: None,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.stations[0].x = config.world.width;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_species_lookup() {
        let config = AppConfig::default();
        assert!(config.species("rock_pigeon").is_some());
        assert!(config.species("dodo").is_none());
    }

    #[test]
    fn test_fingerprint_consistency() {
        let a = AppConfig::default();
        let b = AppConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        let c = AppConfig {
            stress: StressConfig {
                decay_rate: 5.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_ne!(a.fingerprint(), c.fingerprint());
    }
}
