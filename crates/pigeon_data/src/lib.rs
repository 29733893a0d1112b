//! Plain data types shared by the pigeon park simulation crates.
//!
//! Everything here is inert: behaviour lives in `pigeon_core`, which extends
//! these types through logic traits.

pub mod data;

pub use data::agent::*;
pub use data::environment::*;
pub use data::stress::*;
