//! TerraForge - seeded planet, society and history generation
//!
//! A world is fully determined by its [`WorldConfig`]: the same seed yields a
//! byte-identical [`WorldBundle`]. After generation the bundle is immutable and
//! [`WorldIndexes`] answer time-range, full-text and per-polity queries on it.

pub mod core;
pub mod history;
pub mod indexes;
pub mod spatial;
pub mod timeline;
pub mod worldgen;

pub use crate::core::{ForgeError, Prng, Result, WorldConfig};
pub use crate::history::{generate_world, simulate_timeline, WorldBundle};
pub use crate::indexes::WorldIndexes;
