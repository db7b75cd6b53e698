//! Polity state, stats and stat deltas

use serde::{Deserialize, Serialize};

use crate::core::types::{CellId, PolityId};
use crate::spatial::RangeSet;

/// A polity (kingdom, republic, ...) as tracked by the history engine
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolityState {
    pub id: PolityId,
    pub name: String,
    #[serde(rename = "type")]
    pub polity_type: PolityType,
    pub capital_cell_id: CellId,
    pub culture_group_ids: Vec<String>,
    pub stats: PolityStats,
    /// Owned cells; must agree with the owner map
    pub territory: RangeSet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolityType {
    Kingdom,
    Republic,
    Empire,
    CityState,
    Tribal,
    Federation,
}

impl PolityType {
    pub const ALL: [PolityType; 6] = [
        PolityType::Kingdom,
        PolityType::Republic,
        PolityType::Empire,
        PolityType::CityState,
        PolityType::Tribal,
        PolityType::Federation,
    ];
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolityStats {
    pub population: f64,
    pub gdp: f64,
    /// 0.0 to 1.0
    pub tech_level: f64,
    pub industrial_capacity: f64,
    pub resource_security: f64,
    pub military: f64,
    pub naval_projection: f64,
    pub stability: f64,
    pub legitimacy: f64,
    pub logistics: f64,
    /// 0.0 to the configured cap
    pub power_score: f64,
}

/// Signed per-field increments; absent fields did not change
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub population: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tech_level: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industrial_capacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_security: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub military: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub naval_projection: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legitimacy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logistics: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power_score: Option<f64>,
}

/// Pairs each `PolityStats` field with the matching `StatsDelta` field
macro_rules! each_stat {
    ($body:ident) => {
        $body!(
            population,
            gdp,
            tech_level,
            industrial_capacity,
            resource_security,
            military,
            naval_projection,
            stability,
            legitimacy,
            logistics,
            power_score
        )
    };
}

fn changed(before: f64, after: f64) -> Option<f64> {
    (after != before).then(|| after - before)
}

impl StatsDelta {
    /// Fields that differ between `before` and `after`, as `after - before`
    pub fn between(before: &PolityStats, after: &PolityStats) -> Self {
        macro_rules! diff {
            ($($field:ident),*) => {
                StatsDelta {
                    $($field: changed(before.$field, after.$field),)*
                }
            };
        }
        each_stat!(diff)
    }

    /// Add every present increment onto `stats`
    pub fn apply(&self, stats: &mut PolityStats) {
        macro_rules! add {
            ($($field:ident),*) => {
                $(
                    if let Some(delta) = self.$field {
                        stats.$field += delta;
                    }
                )*
            };
        }
        each_stat!(add);
    }

    pub fn is_empty(&self) -> bool {
        macro_rules! none {
            ($($field:ident),*) => {
                true $(&& self.$field.is_none())*
            };
        }
        each_stat!(none)
    }
}

/// Reduced stat record used by time series
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSummary {
    pub power_score: f64,
    pub population: f64,
    pub gdp: f64,
    pub tech_level: f64,
    pub stability: f64,
    pub military: f64,
}

impl PolityStats {
    pub fn summary(&self) -> StatSummary {
        StatSummary {
            power_score: self.power_score,
            population: self.population,
            gdp: self.gdp,
            tech_level: self.tech_level,
            stability: self.stability,
            military: self.military,
        }
    }
}
