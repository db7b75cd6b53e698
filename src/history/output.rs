//! Simulation output and the serialized world bundle

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::config::WorldConfig;
use crate::core::error::Result;
use crate::core::hashing::{canonical_json, hash_value};
use crate::core::types::{PolityId, Year};
use crate::history::events::TimelineEvent;
use crate::history::polity::PolityState;
use crate::history::war::{ChangeType, TerritorialChange, Treaty, War};
use crate::history::world::HistoryWorld;
use crate::spatial::{Cell, GridDims};
use crate::timeline::snapshot::TimelineIndex;

/// Fixed creation stamp; bundles never carry wall-clock time
pub const CREATED_AT_ISO: &str = "1970-01-01T00:00:00.000Z";

/// Everything the yearly loop produced
#[derive(Clone, Debug)]
pub struct SimulationOutput {
    pub polities_initial: Vec<PolityState>,
    pub timeline_index: TimelineIndex,
    pub events: Vec<TimelineEvent>,
    pub wars: Vec<War>,
    pub treaties: Vec<Treaty>,
    pub territorial_changes: Vec<TerritorialChange>,
}

impl SimulationOutput {
    pub fn new(polities_initial: Vec<PolityState>, world: HistoryWorld) -> Self {
        Self {
            polities_initial,
            timeline_index: TimelineIndex {
                snapshots: world.snapshots,
                deltas: world.deltas,
            },
            events: world.history.into_events(),
            wars: world.wars,
            treaties: world.treaties,
            territorial_changes: world.changes,
        }
    }

    pub fn battle_count(&self) -> usize {
        self.wars.iter().map(|w| w.battles.len()).sum()
    }
}

/// Immutable generated world
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldBundle {
    pub meta: WorldMeta,
    pub planet: PlanetSummary,
    pub cells: Vec<Cell>,
    pub polities_initial: Vec<PolityState>,
    pub timeline_index: TimelineIndex,
    pub events: Vec<TimelineEvent>,
    pub wars: Vec<War>,
    pub treaties: Vec<Treaty>,
    pub territorial_changes: Vec<TerritorialChange>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldMeta {
    pub seed: u64,
    pub config_hash: String,
    pub created_at_iso: String,
    pub start_year: Year,
    pub end_year: Year,
    pub tick: String,
    pub version: String,
    pub summary: WorldSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetSummary {
    pub radius_km: f64,
    pub ocean_coverage: f64,
    pub map_width: u32,
    pub map_height: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSummary {
    pub top_powers_by_decade: Vec<DecadePowers>,
    pub totals: Totals,
    pub eras: Vec<Era>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecadePowers {
    pub decade: Year,
    pub top: Vec<PowerRank>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerRank {
    pub id: PolityId,
    pub power_score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub wars: usize,
    pub battles: usize,
    pub annexations: usize,
    pub secessions: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Era {
    pub name: String,
    pub start: Year,
    pub end: Year,
    pub reason: String,
}

const TOP_POWERS: usize = 10;

impl WorldSummary {
    pub fn from_output(sim: &SimulationOutput) -> Self {
        let snapshots = &sim.timeline_index.snapshots;

        let top_powers_by_decade = snapshots
            .iter()
            .map(|snapshot| {
                let mut ranked: Vec<&PolityState> = snapshot.polity_states.iter().collect();
                ranked.sort_by(|a, b| b.stats.power_score.total_cmp(&a.stats.power_score));
                DecadePowers {
                    decade: snapshot.year.div_euclid(10) * 10,
                    top: ranked
                        .into_iter()
                        .take(TOP_POWERS)
                        .map(|p| PowerRank {
                            id: p.id,
                            power_score: p.stats.power_score,
                        })
                        .collect(),
                }
            })
            .collect();

        let totals = Totals {
            wars: sim.wars.len(),
            battles: sim.battle_count(),
            annexations: sim
                .territorial_changes
                .iter()
                .filter(|c| c.change_type.is_annexation())
                .count(),
            secessions: sim
                .territorial_changes
                .iter()
                .filter(|c| c.change_type == ChangeType::Secession)
                .count(),
        };

        let eras = vec![Era {
            name: "Expansion".into(),
            start: snapshots.first().map(|s| s.year).unwrap_or(0),
            end: snapshots.last().map(|s| s.year).unwrap_or(0),
            reason: "Rising power scores and frequent wars.".into(),
        }];

        Self {
            top_powers_by_decade,
            totals,
            eras,
        }
    }
}

impl WorldBundle {
    pub fn assemble(config: &WorldConfig, cells: Vec<Cell>, sim: SimulationOutput) -> Result<Self> {
        let meta = WorldMeta {
            seed: config.seed,
            config_hash: hash_value(config)?,
            created_at_iso: CREATED_AT_ISO.to_string(),
            start_year: config.societies.starting_year,
            end_year: config.societies.ending_year,
            tick: "year".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            summary: WorldSummary::from_output(&sim),
        };

        Ok(Self {
            meta,
            planet: PlanetSummary {
                radius_km: config.planet.radius_km,
                ocean_coverage: config.planet.ocean_coverage,
                map_width: config.planet.map_width,
                map_height: config.planet.map_height,
            },
            cells,
            polities_initial: sim.polities_initial,
            timeline_index: sim.timeline_index,
            events: sim.events,
            wars: sim.wars,
            treaties: sim.treaties,
            territorial_changes: sim.territorial_changes,
        })
    }

    pub fn dims(&self) -> GridDims {
        GridDims::new(self.planet.map_width, self.planet.map_height)
    }

    /// Sorted-key serialization; the basis of [`WorldBundle::hash`]
    pub fn canonical_json(&self) -> Result<String> {
        canonical_json(self)
    }

    pub fn hash(&self) -> Result<String> {
        hash_value(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_json(&contents)
    }

    pub fn summary(&self) -> String {
        let totals = &self.meta.summary.totals;
        let leader = self
            .meta
            .summary
            .top_powers_by_decade
            .last()
            .and_then(|d| d.top.first())
            .and_then(|rank| self.polities_initial.iter().find(|p| p.id == rank.id))
            .map(|p| p.name.as_str())
            .unwrap_or("nobody");

        format!(
            "Seed {} over years {}..={}: {} polities on {} cells, {} events, {} wars ({} battles), {} annexations; {} leads at the end",
            self.meta.seed,
            self.meta.start_year,
            self.meta.end_year,
            self.polities_initial.len(),
            self.cells.len(),
            self.events.len(),
            totals.wars,
            totals.battles,
            totals.annexations,
            leader,
        )
    }
}
