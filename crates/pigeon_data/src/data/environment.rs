use serde::{Deserialize, Serialize};

/// Bait type of a feeding station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrapType {
    /// Cheap crumbs every pigeon tolerates.
    #[default]
    Breadcrumbs,
    /// Mixed bird seed.
    Seeds,
    /// Dried corn kernels.
    Corn,
    /// Leftover fries.
    Fries,
    /// Crushed pretzel, attracts the picky ones.
    Pretzel,
}

/// Terrain tag of the ground under a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerrainType {
    /// Paved open square.
    #[default]
    Plaza,
    /// Lawn.
    Grass,
    /// Stone rim around water.
    Fountain,
    /// Road and pavement.
    Street,
    /// Sand or gravel path.
    Gravel,
}
