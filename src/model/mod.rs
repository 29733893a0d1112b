pub use pigeon_core::{FeedingLogic, StressLogic, TerrainLookup};
pub mod config {
    pub use pigeon_core::config::*;
}
pub mod lifecycle {
    pub use pigeon_core::lifecycle::*;
}
pub mod metrics {
    pub use pigeon_core::metrics::*;
}
pub mod placement {
    pub use pigeon_core::placement::*;
}
pub mod region {
    pub use pigeon_core::region::*;
}
pub mod selection {
    pub use pigeon_core::selection::*;
}
pub mod snapshot {
    pub use pigeon_core::snapshot::*;
}
pub mod station {
    pub use pigeon_core::station::*;
}
pub mod systems {
    pub use pigeon_core::systems::*;
}
pub mod terrain {
    pub use pigeon_core::terrain::*;
}

pub mod park;

pub mod state {
    pub use pigeon_data::*;
}
