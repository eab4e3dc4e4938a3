//! Durable per-player progress mutated by draws.

pub mod persistence;
pub mod types;

pub use types::*;
