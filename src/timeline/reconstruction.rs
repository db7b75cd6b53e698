//! Rebuild polity state at any year from a snapshot plus replayed deltas

use ahash::AHashMap;

use crate::core::error::{ForgeError, Result};
use crate::core::types::{ChangeId, PolityId, Year};
use crate::history::polity::PolityState;
use crate::history::war::TerritorialChange;
use crate::timeline::snapshot::{latest_snapshot, Delta, Snapshot};

/// Replays deltas on top of a set of polity states
///
/// Stat increments are added field by field. Territorial changes referenced
/// by a delta move the transferred cells from the loser to the winner.
pub struct Replayer<'a> {
    states: Vec<PolityState>,
    by_id: AHashMap<PolityId, usize>,
    changes: AHashMap<ChangeId, &'a TerritorialChange>,
}

impl<'a> Replayer<'a> {
    pub fn new(states: Vec<PolityState>, changes: &'a [TerritorialChange]) -> Self {
        let by_id = states.iter().enumerate().map(|(i, p)| (p.id, i)).collect();
        let changes = changes.iter().map(|c| (c.id, c)).collect();
        Self {
            states,
            by_id,
            changes,
        }
    }

    pub fn apply(&mut self, delta: &Delta) {
        for update in &delta.polity_updates {
            if let Some(&idx) = self.by_id.get(&update.polity_id) {
                update.stats_delta.apply(&mut self.states[idx].stats);
            }
        }

        for change_id in &delta.territorial_change_ids {
            let Some(change) = self.changes.get(change_id).copied() else {
                tracing::warn!(change = %change_id, year = delta.year, "delta references unknown change");
                continue;
            };
            if let Some(idx) = change.winner_polity_id.and_then(|id| self.by_id.get(&id)) {
                let state = &mut self.states[*idx];
                state.territory = state.territory.union(&change.regions_transferred);
            }
            if let Some(idx) = change.loser_polity_id.and_then(|id| self.by_id.get(&id)) {
                let state = &mut self.states[*idx];
                state.territory = state.territory.difference(&change.regions_transferred);
            }
        }
    }

    pub fn states(&self) -> &[PolityState] {
        &self.states
    }

    pub fn into_states(self) -> Vec<PolityState> {
        self.states
    }
}

/// Polity states at the end of `target`
///
/// Starts from the latest snapshot at or before `target` (the earliest one if
/// none qualifies) and replays every delta with
/// `snapshot.year < delta.year <= target` in ascending year order.
pub fn reconstruct(
    snapshots: &[Snapshot],
    deltas: &[Delta],
    changes: &[TerritorialChange],
    target: Year,
) -> Result<Vec<PolityState>> {
    let base = latest_snapshot(snapshots, target).ok_or(ForgeError::EmptyTimeline)?;

    let mut pending: Vec<&Delta> = deltas
        .iter()
        .filter(|d| d.year > base.year && d.year <= target)
        .collect();
    pending.sort_by_key(|d| d.year);

    let mut replayer = Replayer::new(base.polity_states.clone(), changes);
    for delta in pending {
        replayer.apply(delta);
    }
    Ok(replayer.into_states())
}
