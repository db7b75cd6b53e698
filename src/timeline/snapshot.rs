//! Snapshots, deltas and the owner map layer

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{CellId, ChangeId, EventId, PolityId, Year};
use crate::history::polity::{PolityState, StatsDelta};
use crate::spatial::{compress, RangeSet};

/// Full copy of simulation state at the end of one year
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub year: Year,
    pub polity_states: Vec<PolityState>,
    #[serde(rename = "politicalOwnersRLE")]
    pub political_owners: Vec<OwnerRanges>,
    pub alliances: Vec<Vec<PolityId>>,
}

/// All cells held by one owner
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerRanges {
    pub owner: PolityId,
    pub ranges: RangeSet,
}

/// Year-over-year difference: stat increments plus the ids produced that year
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    pub year: Year,
    pub polity_updates: Vec<PolityUpdate>,
    pub territorial_change_ids: Vec<ChangeId>,
    pub events: Vec<EventId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolityUpdate {
    pub polity_id: PolityId,
    pub stats_delta: StatsDelta,
}

/// Periodic snapshots plus one delta per simulated year
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineIndex {
    pub snapshots: Vec<Snapshot>,
    #[serde(rename = "deltasBetweenSnapshots")]
    pub deltas: Vec<Delta>,
}

/// Group cells by owner and compress each group.
///
/// Owners appear in order of their first cell.
pub fn build_owner_layer(owner_by_cell: &[Option<PolityId>]) -> Vec<OwnerRanges> {
    let mut order: Vec<PolityId> = Vec::new();
    let mut cells: AHashMap<PolityId, Vec<CellId>> = AHashMap::new();

    for (idx, owner) in owner_by_cell.iter().enumerate() {
        let Some(owner) = owner else { continue };
        cells
            .entry(*owner)
            .or_insert_with(|| {
                order.push(*owner);
                Vec::new()
            })
            .push(idx as CellId);
    }

    order
        .into_iter()
        .map(|owner| OwnerRanges {
            owner,
            ranges: compress(cells.get(&owner).map(Vec::as_slice).unwrap_or(&[])),
        })
        .collect()
}

/// Owner layer derived from polity territories instead of a cell array.
///
/// Produces the same layer as [`build_owner_layer`] when territories
/// partition the owner map.
pub fn owner_layer_at(polities: &[PolityState]) -> Vec<OwnerRanges> {
    let mut layer: Vec<OwnerRanges> = polities
        .iter()
        .filter(|p| !p.territory.is_empty())
        .map(|p| OwnerRanges {
            owner: p.id,
            ranges: p.territory.clone(),
        })
        .collect();
    layer.sort_by_key(|o| o.ranges.ranges().first().map(|r| r.start));
    layer
}

impl Snapshot {
    pub fn capture(
        year: Year,
        polities: &[PolityState],
        owner_by_cell: &[Option<PolityId>],
        alliances: &[Vec<PolityId>],
    ) -> Self {
        Self {
            year,
            polity_states: polities.to_vec(),
            political_owners: build_owner_layer(owner_by_cell),
            alliances: alliances.to_vec(),
        }
    }
}

impl TimelineIndex {
    /// Latest snapshot at or before `year`, else the earliest one
    pub fn snapshot_at(&self, year: Year) -> Option<&Snapshot> {
        latest_snapshot(&self.snapshots, year)
    }
}

pub fn latest_snapshot(snapshots: &[Snapshot], year: Year) -> Option<&Snapshot> {
    snapshots
        .iter()
        .filter(|s| s.year <= year)
        .max_by_key(|s| s.year)
        .or_else(|| snapshots.iter().min_by_key(|s| s.year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::Range;

    #[test]
    fn test_owner_layer_groups_by_first_appearance() {
        let a = Some(PolityId(2));
        let b = Some(PolityId(1));
        let owners = vec![None, a, a, b, None, a, b, b];

        let layer = build_owner_layer(&owners);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer[0].owner, PolityId(2));
        assert_eq!(
            layer[0].ranges.ranges(),
            &[Range::new(1, 2), Range::new(5, 5)]
        );
        assert_eq!(layer[1].owner, PolityId(1));
        assert_eq!(
            layer[1].ranges.ranges(),
            &[Range::new(3, 3), Range::new(6, 7)]
        );
    }

    #[test]
    fn test_empty_owner_map_has_empty_layer() {
        assert!(build_owner_layer(&[None, None]).is_empty());
    }

    #[test]
    fn test_snapshot_at_falls_back_to_earliest() {
        let snap = |year| Snapshot {
            year,
            polity_states: Vec::new(),
            political_owners: Vec::new(),
            alliances: Vec::new(),
        };
        let index = TimelineIndex {
            snapshots: vec![snap(0), snap(10), snap(20)],
            deltas: Vec::new(),
        };
        assert_eq!(index.snapshot_at(15).map(|s| s.year), Some(10));
        assert_eq!(index.snapshot_at(20).map(|s| s.year), Some(20));
        assert_eq!(index.snapshot_at(99).map(|s| s.year), Some(20));
        assert_eq!(index.snapshot_at(-5).map(|s| s.year), Some(0));
        assert!(TimelineIndex::default().snapshot_at(0).is_none());
    }
}
