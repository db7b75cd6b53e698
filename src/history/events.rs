//! Timeline events and the narrative ledger

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, ChangeId, EventId, PolityId, TreatyId, WarId, Year};

/// A historical event; immutable once recorded
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEvent {
    pub id: EventId,
    pub year: Year,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub title: String,
    pub actors: Actors,
    pub causes: Vec<Cause>,
    pub effects: Vec<String>,
    pub explanation: Vec<String>,
    pub refs: EventRefs,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    WarDeclared,
    WarEnded,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::WarDeclared => "WAR_DECLARED",
            EventKind::WarEnded => "WAR_ENDED",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Actors {
    pub primary: Vec<PolityId>,
    #[serde(default)]
    pub secondary: Vec<PolityId>,
}

impl Actors {
    /// Primary actors first, then secondary
    pub fn all(&self) -> impl Iterator<Item = PolityId> + '_ {
        self.primary.iter().chain(self.secondary.iter()).copied()
    }
}

/// Weighted cause of an event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cause {
    pub key: String,
    pub weight: f64,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Cause {
    pub fn new(key: &str, weight: f64) -> Self {
        Self {
            key: key.to_string(),
            weight,
            reference: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRefs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub war_id: Option<WarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treaty_id: Option<TreatyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_id: Option<ChangeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battle_id: Option<BattleId>,
}

/// Append-only event ledger for one simulation run
#[derive(Clone, Debug, Default)]
pub struct HistoryLog {
    pub events: Vec<TimelineEvent>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: TimelineEvent) -> EventId {
        let id = event.id;
        self.events.push(event);
        id
    }

    pub fn into_events(self) -> Vec<TimelineEvent> {
        self.events
    }
}
