//! Wars, battles, treaties and territorial changes

use serde::{Deserialize, Serialize};

use crate::core::types::{BattleId, CellId, ChangeId, PolityId, TreatyId, WarId, Year};
use crate::spatial::RangeSet;

/// A war between two sides
///
/// Created on declaration with outcome `Draw` and no end year, mutated by
/// battle resolution and settlement, terminal once `end_year` is set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct War {
    pub id: WarId,
    pub name: String,
    pub start_year: Year,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_year: Option<Year>,
    pub sides: WarSides,
    pub battles: Vec<Battle>,
    pub outcome: WarOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treaty_id: Option<TreatyId>,
    pub territorial_changes: Vec<ChangeId>,
    pub explanation: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WarSides {
    #[serde(rename = "A")]
    pub a: Vec<PolityId>,
    #[serde(rename = "B")]
    pub b: Vec<PolityId>,
}

impl WarSides {
    /// Primary polity of side A
    pub fn lead_a(&self) -> Option<PolityId> {
        self.a.first().copied()
    }

    /// Primary polity of side B
    pub fn lead_b(&self) -> Option<PolityId> {
        self.b.first().copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarOutcome {
    AWin,
    BWin,
    Draw,
    WhitePeace,
}

impl War {
    pub fn is_active(&self) -> bool {
        self.end_year.is_none()
    }

    /// Winner and loser implied by the outcome, if the war was decided
    pub fn victor_and_loser(&self) -> Option<(PolityId, PolityId)> {
        match self.outcome {
            WarOutcome::AWin => Some((self.sides.lead_a()?, self.sides.lead_b()?)),
            WarOutcome::BWin => Some((self.sides.lead_b()?, self.sides.lead_a()?)),
            WarOutcome::Draw | WarOutcome::WhitePeace => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    pub id: BattleId,
    pub year: Year,
    pub location_cell_id: CellId,
    #[serde(rename = "type")]
    pub battle_type: BattleType,
    pub result: BattleResult,
    pub casualties_estimate: Casualties,
    pub factors: Vec<String>,
    pub explanation: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Casualties {
    #[serde(rename = "A")]
    pub a: u32,
    #[serde(rename = "B")]
    pub b: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleType {
    Field,
    Siege,
    Naval,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BattleResult {
    AVictory,
    BVictory,
    Indecisive,
}

/// Peace treaty; only ever created by war settlement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treaty {
    pub id: TreatyId,
    pub name: String,
    pub year: Year,
    pub participants: Vec<PolityId>,
    pub terms: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerritorialChange {
    pub id: ChangeId,
    pub year: Year,
    #[serde(rename = "type")]
    pub change_type: ChangeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_polity_id: Option<PolityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_polity_id: Option<PolityId>,
    #[serde(rename = "regionsTransferredCompressed")]
    pub regions_transferred: RangeSet,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_war_id: Option<WarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treaty_id: Option<TreatyId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    AnnexationPartial,
    AbsorbedFull,
    Vassalized,
    Secession,
    Colonization,
    Union,
}

impl ChangeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::AnnexationPartial => "ANNEXATION_PARTIAL",
            ChangeType::AbsorbedFull => "ABSORBED_FULL",
            ChangeType::Vassalized => "VASSALIZED",
            ChangeType::Secession => "SECESSION",
            ChangeType::Colonization => "COLONIZATION",
            ChangeType::Union => "UNION",
        }
    }

    /// Counts toward the annexation total in world summaries
    pub fn is_annexation(&self) -> bool {
        matches!(self, ChangeType::AnnexationPartial | ChangeType::AbsorbedFull)
    }
}
