//! History engine: the seeded, year-by-year geopolitical simulation
//!
//! The loop owns one [`HistoryWorld`] and runs, per year: growth, war
//! declaration, battles, settlement, snapshotting and delta recording.
//! Its results are packed into an immutable [`WorldBundle`].

pub mod events;
pub mod output;
pub mod polity;
pub mod simulation;
pub mod systems;
pub mod war;
pub mod world;

pub use events::{EventKind, HistoryLog, TimelineEvent};
pub use output::{SimulationOutput, WorldBundle, WorldMeta};
pub use polity::{PolityState, PolityStats, PolityType, StatsDelta};
pub use simulation::{generate_world, simulate_timeline, SimulationConfig};
pub use war::{Battle, ChangeType, TerritorialChange, Treaty, War, WarOutcome};
pub use world::HistoryWorld;
