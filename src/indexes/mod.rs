//! Derived, rebuildable lookups over a finished world
//!
//! [`WorldIndexes::build`] is a pure function of the bundle: building twice
//! gives the same content, and the indexes only ever borrow the bundle.

pub mod search;
pub mod series;

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;

use crate::core::error::{ForgeError, Result};
use crate::core::types::{ChangeId, EventId, PolityId, TreatyId, WarId, Year};
use crate::history::events::{EventKind, TimelineEvent};
use crate::history::output::WorldBundle;
use crate::history::polity::PolityState;
use crate::history::war::{TerritorialChange, Treaty, War};
use crate::timeline::reconstruction::reconstruct;
use crate::timeline::snapshot::{owner_layer_at, OwnerRanges, Snapshot};

pub use search::{result_order, tokenize, SearchIndex, SearchKind, SearchResult};
pub use series::{build_stat_series, SeriesPoint};

/// Default result cap for [`WorldIndexes::search`] callers
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Per-year activity counts
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearSummary {
    pub year: Year,
    pub events: usize,
    pub changes: usize,
    pub wars_declared: usize,
    pub wars_ended: usize,
}

/// Everything recorded about one polity inside a year range
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolityHistory<'w> {
    pub polity: &'w PolityState,
    pub events: Vec<&'w TimelineEvent>,
    pub changes: Vec<&'w TerritorialChange>,
    pub series: Vec<SeriesPoint>,
}

/// Reconstructed world state at the end of a year
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldState {
    pub year: Year,
    pub polities: Vec<PolityState>,
    #[serde(rename = "politicalOwnersRLE")]
    pub political_owners: Vec<OwnerRanges>,
}

pub struct WorldIndexes<'w> {
    world: &'w WorldBundle,
    events_by_year: BTreeMap<Year, Vec<usize>>,
    changes_by_year: BTreeMap<Year, Vec<usize>>,
    events_by_polity: AHashMap<PolityId, Vec<usize>>,
    changes_by_polity: AHashMap<PolityId, Vec<usize>>,
    events_by_id: AHashMap<EventId, usize>,
    changes_by_id: AHashMap<ChangeId, usize>,
    wars_by_id: AHashMap<WarId, usize>,
    treaties_by_id: AHashMap<TreatyId, usize>,
    polities_by_id: AHashMap<PolityId, usize>,
    search: SearchIndex,
    series: AHashMap<PolityId, Vec<SeriesPoint>>,
}

impl<'w> WorldIndexes<'w> {
    pub fn build(world: &'w WorldBundle) -> Self {
        let mut events_by_year: BTreeMap<Year, Vec<usize>> = BTreeMap::new();
        let mut events_by_polity: AHashMap<PolityId, Vec<usize>> = AHashMap::new();
        for (i, event) in world.events.iter().enumerate() {
            events_by_year.entry(event.year).or_default().push(i);
            for polity in event.actors.all() {
                events_by_polity.entry(polity).or_default().push(i);
            }
        }

        let mut changes_by_year: BTreeMap<Year, Vec<usize>> = BTreeMap::new();
        let mut changes_by_polity: AHashMap<PolityId, Vec<usize>> = AHashMap::new();
        for (i, change) in world.territorial_changes.iter().enumerate() {
            changes_by_year.entry(change.year).or_default().push(i);
            for polity in [change.winner_polity_id, change.loser_polity_id].into_iter().flatten() {
                changes_by_polity.entry(polity).or_default().push(i);
            }
        }

        let indexes = Self {
            world,
            events_by_year,
            changes_by_year,
            events_by_polity,
            changes_by_polity,
            events_by_id: world.events.iter().enumerate().map(|(i, e)| (e.id, i)).collect(),
            changes_by_id: world.territorial_changes.iter().enumerate().map(|(i, c)| (c.id, i)).collect(),
            wars_by_id: world.wars.iter().enumerate().map(|(i, w)| (w.id, i)).collect(),
            treaties_by_id: world.treaties.iter().enumerate().map(|(i, t)| (t.id, i)).collect(),
            polities_by_id: world.polities_initial.iter().enumerate().map(|(i, p)| (p.id, i)).collect(),
            search: SearchIndex::build(world),
            series: build_stat_series(world),
        };
        tracing::debug!(
            events = world.events.len(),
            search_entries = indexes.search.len(),
            "built world indexes"
        );
        indexes
    }

    pub fn world(&self) -> &'w WorldBundle {
        self.world
    }

    // === BY ID ===

    pub fn event(&self, id: EventId) -> Result<&'w TimelineEvent> {
        self.events_by_id
            .get(&id)
            .map(|&i| &self.world.events[i])
            .ok_or_else(|| ForgeError::not_found("event", id))
    }

    pub fn war(&self, id: WarId) -> Result<&'w War> {
        self.wars_by_id
            .get(&id)
            .map(|&i| &self.world.wars[i])
            .ok_or_else(|| ForgeError::not_found("war", id))
    }

    pub fn change(&self, id: ChangeId) -> Result<&'w TerritorialChange> {
        self.changes_by_id
            .get(&id)
            .map(|&i| &self.world.territorial_changes[i])
            .ok_or_else(|| ForgeError::not_found("change", id))
    }

    pub fn treaty(&self, id: TreatyId) -> Result<&'w Treaty> {
        self.treaties_by_id
            .get(&id)
            .map(|&i| &self.world.treaties[i])
            .ok_or_else(|| ForgeError::not_found("treaty", id))
    }

    /// Polity as it stood before the first simulated year
    pub fn polity(&self, id: PolityId) -> Result<&'w PolityState> {
        self.polities_by_id
            .get(&id)
            .map(|&i| &self.world.polities_initial[i])
            .ok_or_else(|| ForgeError::not_found("polity", id))
    }

    // === BY YEAR / POLITY ===

    pub fn events_for_year(&self, year: Year) -> Vec<&'w TimelineEvent> {
        self.resolve_events(self.events_by_year.get(&year))
    }

    pub fn events_for_polity(&self, id: PolityId) -> Vec<&'w TimelineEvent> {
        self.resolve_events(self.events_by_polity.get(&id))
    }

    pub fn changes_for_year(&self, year: Year) -> Vec<&'w TerritorialChange> {
        self.resolve_changes(self.changes_by_year.get(&year))
    }

    pub fn changes_for_polity(&self, id: PolityId) -> Vec<&'w TerritorialChange> {
        self.resolve_changes(self.changes_by_polity.get(&id))
    }

    /// Events in `[from, to]`, chronological, optionally of one kind
    pub fn events_in_range(&self, from: Year, to: Year, kind: Option<EventKind>) -> Vec<&'w TimelineEvent> {
        if from > to {
            return Vec::new();
        }
        let world = self.world;
        self.events_by_year
            .range(from..=to)
            .flat_map(|(_, ids)| ids.iter().map(move |&i| &world.events[i]))
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .collect()
    }

    pub fn changes_in_range(&self, from: Year, to: Year) -> Vec<&'w TerritorialChange> {
        if from > to {
            return Vec::new();
        }
        let world = self.world;
        self.changes_by_year
            .range(from..=to)
            .flat_map(|(_, ids)| ids.iter().map(move |&i| &world.territorial_changes[i]))
            .collect()
    }

    /// One summary per simulated year inside `[from, to]`
    pub fn year_summaries(&self, from: Year, to: Year) -> Vec<YearSummary> {
        let from = from.max(self.world.meta.start_year);
        let to = to.min(self.world.meta.end_year);
        (from..=to)
            .map(|year| {
                let events = self.events_for_year(year);
                YearSummary {
                    year,
                    events: events.len(),
                    changes: self.changes_by_year.get(&year).map_or(0, Vec::len),
                    wars_declared: events.iter().filter(|e| e.kind == EventKind::WarDeclared).count(),
                    wars_ended: events.iter().filter(|e| e.kind == EventKind::WarEnded).count(),
                }
            })
            .collect()
    }

    pub fn polity_history(&self, id: PolityId, from: Year, to: Year) -> Result<PolityHistory<'w>> {
        let polity = self.polity(id)?;
        let in_range = |year: Year| year >= from && year <= to;

        Ok(PolityHistory {
            polity,
            events: self
                .events_for_polity(id)
                .into_iter()
                .filter(|e| in_range(e.year))
                .collect(),
            changes: self
                .changes_for_polity(id)
                .into_iter()
                .filter(|c| in_range(c.year))
                .collect(),
            series: self
                .stat_series(id)?
                .iter()
                .filter(|p| in_range(p.year))
                .cloned()
                .collect(),
        })
    }

    pub fn stat_series(&self, id: PolityId) -> Result<&[SeriesPoint]> {
        self.series
            .get(&id)
            .map(Vec::as_slice)
            .ok_or_else(|| ForgeError::not_found("polity", id))
    }

    // === TIMELINE ===

    pub fn snapshot_at(&self, year: Year) -> Result<&'w Snapshot> {
        self.world
            .timeline_index
            .snapshot_at(year)
            .ok_or(ForgeError::EmptyTimeline)
    }

    pub fn state_at(&self, year: Year) -> Result<WorldState> {
        let timeline = &self.world.timeline_index;
        let polities = reconstruct(
            &timeline.snapshots,
            &timeline.deltas,
            &self.world.territorial_changes,
            year,
        )?;
        Ok(WorldState {
            year,
            political_owners: owner_layer_at(&polities),
            polities,
        })
    }

    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchResult> {
        self.search.search(query, limit)
    }

    fn resolve_events(&self, ids: Option<&Vec<usize>>) -> Vec<&'w TimelineEvent> {
        let world = self.world;
        ids.map(|ids| ids.iter().map(|&i| &world.events[i]).collect())
            .unwrap_or_default()
    }

    fn resolve_changes(&self, ids: Option<&Vec<usize>>) -> Vec<&'w TerritorialChange> {
        let world = self.world;
        ids.map(|ids| ids.iter().map(|&i| &world.territorial_changes[i]).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::WorldConfig;
    use crate::history::generate_world;

    fn small_world() -> WorldBundle {
        let mut config = WorldConfig::with_seed(2024);
        config.planet.map_width = 48;
        config.planet.map_height = 24;
        config.planet.num_continents = 3;
        config.societies.num_polities = 10;
        config.societies.ending_year = 150;
        generate_world(&config).unwrap()
    }

    #[test]
    fn test_by_id_lookups_and_misses() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);

        for event in &world.events {
            assert_eq!(idx.event(event.id).unwrap().id, event.id);
        }
        for war in &world.wars {
            assert_eq!(idx.war(war.id).unwrap().name, war.name);
        }
        assert!(matches!(idx.event(EventId(999_999)), Err(ForgeError::NotFound { kind: "event", .. })));
        assert!(matches!(idx.war(WarId(999_999)), Err(ForgeError::NotFound { kind: "war", .. })));
        assert!(matches!(idx.change(ChangeId(999_999)), Err(ForgeError::NotFound { .. })));
        assert!(matches!(idx.treaty(TreatyId(999_999)), Err(ForgeError::NotFound { .. })));
        assert!(matches!(idx.polity(PolityId(999_999)), Err(ForgeError::NotFound { .. })));
        assert!(idx.polity_history(PolityId(999_999), 0, 10).is_err());
    }

    #[test]
    fn test_year_maps_are_chronological() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);

        let all = idx.events_in_range(i32::MIN, i32::MAX, None);
        assert_eq!(all.len(), world.events.len());
        assert!(all.windows(2).all(|w| w[0].year <= w[1].year));

        let declared = idx.events_in_range(0, 150, Some(EventKind::WarDeclared));
        assert!(declared.iter().all(|e| e.kind == EventKind::WarDeclared));
        assert!(idx.events_in_range(10, 5, None).is_empty());

        let summaries = idx.year_summaries(-50, 500);
        assert_eq!(summaries.len(), 151);
        let total: usize = summaries.iter().map(|s| s.events).sum();
        assert_eq!(total, world.events.len());
        let changes: usize = summaries.iter().map(|s| s.changes).sum();
        assert_eq!(changes, world.territorial_changes.len());
    }

    #[test]
    fn test_polity_maps_cover_actors() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);
        for event in &world.events {
            for actor in event.actors.all() {
                assert!(idx.events_for_polity(actor).iter().any(|e| e.id == event.id));
            }
        }
        for change in &world.territorial_changes {
            let winner = change.winner_polity_id.unwrap();
            assert!(idx.changes_for_polity(winner).iter().any(|c| c.id == change.id));
        }
    }

    #[test]
    fn test_series_has_one_point_per_year() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);
        for polity in &world.polities_initial {
            let series = idx.stat_series(polity.id).unwrap();
            assert_eq!(series.len(), 151);
            assert_eq!(series.first().map(|p| p.year), Some(0));
            assert_eq!(series.last().map(|p| p.year), Some(150));
        }
        let history = idx.polity_history(world.polities_initial[0].id, 10, 19).unwrap();
        assert_eq!(history.series.len(), 10);
    }

    #[test]
    fn test_empty_query_returns_nothing() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);
        assert!(idx.search("", 10).is_empty());
        assert!(idx.search(" -- ", 10).is_empty());
    }

    #[test]
    fn test_search_finds_polities_by_id() {
        let world = small_world();
        let idx = WorldIndexes::build(&world);
        let target = &world.polities_initial[0];
        let hits = idx.search(&target.id.to_string(), 50);
        assert!(hits.iter().any(|h| h.kind == SearchKind::Polity && h.id == target.id.to_string()));
    }
}
