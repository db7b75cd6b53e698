//! HistoryWorld - the world-in-progress owned by the yearly loop

use ahash::{AHashMap, AHashSet};

use crate::core::error::{ForgeError, Result};
use crate::core::rng::Prng;
use crate::core::types::{CellId, IdCounters, PolityId};
use crate::history::events::HistoryLog;
use crate::history::polity::PolityState;
use crate::history::war::{TerritorialChange, Treaty, War};
use crate::spatial::{compress, RangeSet};
use crate::timeline::snapshot::{Delta, Snapshot};

/// Mutable simulation state for one run
///
/// Wars are stored in declaration order; `active_wars` holds indices into
/// `wars` for the ones that have not ended yet.
pub struct HistoryWorld {
    /// Roster, in the order growth visits it
    pub polities: Vec<PolityState>,
    /// Owner per cell; the source of truth for territory
    pub owner_by_cell: Vec<Option<PolityId>>,
    pub wars: Vec<War>,
    pub active_wars: Vec<usize>,
    pub treaties: Vec<Treaty>,
    pub changes: Vec<TerritorialChange>,
    pub history: HistoryLog,
    pub deltas: Vec<Delta>,
    pub snapshots: Vec<Snapshot>,
    pub prng: Prng,
    pub ids: IdCounters,
    polity_index: AHashMap<PolityId, usize>,
}

impl HistoryWorld {
    /// Validates the initial state and takes ownership of it
    pub fn new(
        polities: Vec<PolityState>,
        owner_by_cell: Vec<Option<PolityId>>,
        prng: Prng,
    ) -> Result<Self> {
        let polity_index = validate_initial_state(&polities, &owner_by_cell)?;

        Ok(Self {
            polities,
            owner_by_cell,
            wars: Vec::new(),
            active_wars: Vec::new(),
            treaties: Vec::new(),
            changes: Vec::new(),
            history: HistoryLog::new(),
            deltas: Vec::new(),
            snapshots: Vec::new(),
            prng,
            ids: IdCounters::new(),
            polity_index,
        })
    }

    pub fn cell_count(&self) -> usize {
        self.owner_by_cell.len()
    }

    pub fn polity(&self, id: PolityId) -> Option<&PolityState> {
        self.polity_index.get(&id).map(|&i| &self.polities[i])
    }

    pub fn polity_mut(&mut self, id: PolityId) -> Option<&mut PolityState> {
        let idx = *self.polity_index.get(&id)?;
        self.polities.get_mut(idx)
    }

    /// Move one cell from `loser` to `winner`, keeping the owner map and
    /// both territories in agreement
    pub fn transfer_cell(&mut self, cell: CellId, winner: PolityId, loser: PolityId) {
        if let Some(slot) = self.owner_by_cell.get_mut(cell as usize) {
            *slot = Some(winner);
        }
        if let Some(state) = self.polity_mut(winner) {
            state.territory = state.territory.with_cell(cell);
        }
        if let Some(state) = self.polity_mut(loser) {
            state.territory = state.territory.without_cell(cell);
        }
    }

    /// Drop wars that ended this year from the active list
    pub fn retire_ended_wars(&mut self) {
        let wars = &self.wars;
        self.active_wars.retain(|&i| wars[i].is_active());
    }
}

/// Reject initial states the yearly loop cannot run on
///
/// Returns the id -> roster index map on success.
pub fn validate_initial_state(
    polities: &[PolityState],
    owner_by_cell: &[Option<PolityId>],
) -> Result<AHashMap<PolityId, usize>> {
    if polities.is_empty() {
        return Err(ForgeError::InvalidInitialState("polity roster is empty".into()));
    }
    if owner_by_cell.is_empty() {
        return Err(ForgeError::InvalidInitialState("owner map is empty".into()));
    }

    let mut index = AHashMap::with_capacity(polities.len());
    for (i, polity) in polities.iter().enumerate() {
        if index.insert(polity.id, i).is_some() {
            return Err(ForgeError::InvalidInitialState(format!(
                "duplicate polity id {}",
                polity.id
            )));
        }
    }

    let mut owned: AHashMap<PolityId, Vec<CellId>> = AHashMap::new();
    let mut unknown: AHashSet<PolityId> = AHashSet::new();
    for (cell, owner) in owner_by_cell.iter().enumerate() {
        let Some(owner) = owner else { continue };
        if !index.contains_key(owner) {
            unknown.insert(*owner);
            continue;
        }
        owned.entry(*owner).or_default().push(cell as CellId);
    }
    if let Some(owner) = unknown.iter().min() {
        return Err(ForgeError::InvalidInitialState(format!(
            "cell owner {} is not in the roster",
            owner
        )));
    }

    let empty = RangeSet::new();
    for polity in polities {
        let expected = owned.get(&polity.id).map(|cells| compress(cells));
        let expected = expected.as_ref().unwrap_or(&empty);
        if &polity.territory != expected {
            return Err(ForgeError::InvalidInitialState(format!(
                "territory of {} ({} cells) disagrees with the owner map ({} cells)",
                polity.id,
                polity.territory.len(),
                expected.len()
            )));
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::polity::{PolityStats, PolityType};

    fn polity(id: u32, cells: &[CellId]) -> PolityState {
        PolityState {
            id: PolityId(id),
            name: format!("Realm {}", id),
            polity_type: PolityType::Tribal,
            capital_cell_id: cells.first().copied().unwrap_or(0),
            culture_group_ids: Vec::new(),
            stats: PolityStats::default(),
            territory: compress(cells),
        }
    }

    fn owners(layout: &[Option<u32>]) -> Vec<Option<PolityId>> {
        layout.iter().map(|o| o.map(PolityId)).collect()
    }

    #[test]
    fn test_valid_state_accepted() {
        let roster = vec![polity(1, &[0, 1]), polity(2, &[3]), polity(3, &[])];
        let map = owners(&[Some(1), Some(1), None, Some(2)]);
        let world = HistoryWorld::new(roster, map, Prng::new(1)).unwrap();
        assert_eq!(world.cell_count(), 4);
        assert_eq!(world.polity(PolityId(2)).map(|p| p.territory.len()), Some(1));
    }

    #[test]
    fn test_rejects_empty_roster_and_map() {
        assert!(matches!(
            validate_initial_state(&[], &owners(&[None])),
            Err(ForgeError::InvalidInitialState(_))
        ));
        assert!(matches!(
            validate_initial_state(&[polity(1, &[])], &[]),
            Err(ForgeError::InvalidInitialState(_))
        ));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let roster = vec![polity(1, &[0]), polity(1, &[1])];
        let result = validate_initial_state(&roster, &owners(&[Some(1), Some(1)]));
        assert!(matches!(result, Err(ForgeError::InvalidInitialState(_))));
    }

    #[test]
    fn test_rejects_unknown_owner() {
        let roster = vec![polity(1, &[0])];
        let result = validate_initial_state(&roster, &owners(&[Some(1), Some(7)]));
        let Err(ForgeError::InvalidInitialState(msg)) = result else {
            panic!("expected InvalidInitialState");
        };
        assert!(msg.contains("polity-7"));
    }

    #[test]
    fn test_rejects_territory_mismatch() {
        let roster = vec![polity(1, &[0]), polity(2, &[1, 2])];
        let result = validate_initial_state(&roster, &owners(&[Some(1), Some(2), Some(1)]));
        assert!(matches!(result, Err(ForgeError::InvalidInitialState(_))));
    }

    #[test]
    fn test_transfer_cell_updates_both_sides() {
        let roster = vec![polity(1, &[0, 1]), polity(2, &[2, 3])];
        let map = owners(&[Some(1), Some(1), Some(2), Some(2)]);
        let mut world = HistoryWorld::new(roster, map, Prng::new(1)).unwrap();

        world.transfer_cell(2, PolityId(1), PolityId(2));
        assert_eq!(world.owner_by_cell[2], Some(PolityId(1)));
        assert_eq!(world.polities[0].territory, compress(&[0, 1, 2]));
        assert_eq!(world.polities[1].territory, compress(&[3]));
        assert!(validate_initial_state(&world.polities, &world.owner_by_cell).is_ok());
    }
}
