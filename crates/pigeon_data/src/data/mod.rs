//! Core data structures for the pigeon park simulation.

pub mod agent;
pub mod environment;
pub mod stress;
