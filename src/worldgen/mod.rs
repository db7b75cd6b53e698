//! Seeding: terrain, resources and the initial polity roster
//!
//! Everything here draws from forks of the root stream handed in by
//! [`crate::history::generate_world`], so a seed fully determines the map.

pub mod naming;
pub mod polities;
pub mod terrain;

pub use polities::{power_score, seed_polities, SeededPolities};
pub use terrain::generate_cells;
