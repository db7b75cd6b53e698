//! Yearly simulation systems

mod growth;
mod warfare;

pub use growth::{apply_growth, grow_stats, GrowthRoll};
pub use warfare::{declare_war, resolve_wars, WarYear};
