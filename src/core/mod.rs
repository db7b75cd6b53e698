pub mod config;
pub mod error;
pub mod hashing;
pub mod rng;
pub mod types;

pub use config::{SimTunables, WorldConfig};
pub use error::{ForgeError, Result};
pub use rng::Prng;
