//! Per-frame agent systems.

pub mod feeding;
pub mod movement;
pub mod population;
