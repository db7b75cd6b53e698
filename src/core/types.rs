//! Core type definitions used throughout the codebase

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::core::error::ForgeError;

/// Simulation year (may be negative for worlds that start "before" year zero)
pub type Year = i32;

/// Row-major index into the `width × height` cell grid
pub type CellId = u32;

/// Ids travel as their display text, so every kind has the same wire form
macro_rules! id_as_text {
    ($name:ident) => {
        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let text = String::deserialize(deserializer)?;
                text.parse().map_err(de::Error::custom)
            }
        }
    };
}

/// Declares a sequential record id that displays with a fixed prefix,
/// e.g. `PolityId(3)` displays as `polity-3`.
macro_rules! record_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u32);

        id_as_text!($name);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "-{}"), self.0)
            }
        }

        /// Accepts both `polity-3` and bare `3` forms
        impl FromStr for $name {
            type Err = ForgeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let digits = s.strip_prefix(concat!($prefix, "-")).unwrap_or(s);
                digits
                    .parse()
                    .map($name)
                    .map_err(|_| ForgeError::not_found($prefix, s))
            }
        }
    };
}

record_id!(PolityId, "polity");
record_id!(WarId, "war");
record_id!(TreatyId, "treaty");
record_id!(ChangeId, "change");
record_id!(EventId, "event");

/// Battle ids are scoped to their war: `war-3-battle-2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BattleId {
    pub war: WarId,
    pub seq: u32,
}

id_as_text!(BattleId);

impl fmt::Display for BattleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-battle-{}", self.war, self.seq)
    }
}

impl FromStr for BattleId {
    type Err = ForgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (war, seq) = s
            .rsplit_once("-battle-")
            .ok_or_else(|| ForgeError::not_found("battle", s))?;
        let seq = seq.parse().map_err(|_| ForgeError::not_found("battle", s))?;
        Ok(BattleId { war: war.parse()?, seq })
    }
}

/// Monotonic id counters, one per record kind. Every kind starts at 1.
#[derive(Debug, Clone)]
pub struct IdCounters {
    war: u32,
    treaty: u32,
    change: u32,
    event: u32,
}

impl IdCounters {
    pub fn new() -> Self {
        Self {
            war: 1,
            treaty: 1,
            change: 1,
            event: 1,
        }
    }

    pub fn next_war(&mut self) -> WarId {
        let id = WarId(self.war);
        self.war += 1;
        id
    }

    pub fn next_treaty(&mut self) -> TreatyId {
        let id = TreatyId(self.treaty);
        self.treaty += 1;
        id
    }

    pub fn next_change(&mut self) -> ChangeId {
        let id = ChangeId(self.change);
        self.change += 1;
        id
    }

    pub fn next_event(&mut self) -> EventId {
        let id = EventId(self.event);
        self.event += 1;
        id
    }
}

impl Default for IdCounters {
    fn default() -> Self {
        Self::new()
    }
}
