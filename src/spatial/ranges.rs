//! Range codec for sets of cell ids
//!
//! A `RangeSet` stores a set of cell ids as sorted, closed intervals. In
//! canonical form ranges never overlap and never touch (`end + 1 < next.start`).
//! Territories and the per-owner map layers are stored this way.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::types::CellId;

/// Closed interval `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: CellId,
    pub end: CellId,
}

impl Range {
    pub fn new(start: CellId, end: CellId) -> Self {
        Self { start, end }
    }

    pub fn single(cell: CellId) -> Self {
        Self::new(cell, cell)
    }

    #[inline]
    pub fn len(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    #[inline]
    pub fn contains(&self, cell: CellId) -> bool {
        self.start <= cell && cell <= self.end
    }
}

/// Sorted, canonical list of ranges
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RangeSet(Vec<Range>);

/// Sort unique ids and merge consecutive runs into ranges
pub fn compress(ids: &[CellId]) -> RangeSet {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges = Vec::new();
    let mut iter = sorted.into_iter();
    let Some(first) = iter.next() else {
        return RangeSet::default();
    };

    let mut current = Range::single(first);
    for id in iter {
        if id == current.end + 1 {
            current.end = id;
        } else {
            ranges.push(current);
            current = Range::single(id);
        }
    }
    ranges.push(current);
    RangeSet(ranges)
}

/// Every covered id, ascending
pub fn expand(set: &RangeSet) -> Vec<CellId> {
    set.iter().collect()
}

/// Union of several sets; overlapping or adjacent ranges are merged
pub fn merge<'a>(sets: impl IntoIterator<Item = &'a RangeSet>) -> RangeSet {
    let mut all: Vec<Range> = sets.into_iter().flat_map(|s| s.0.iter().copied()).collect();
    merge_ranges(&mut all)
}

fn merge_ranges(ranges: &mut [Range]) -> RangeSet {
    ranges.sort_by_key(|r| (r.start, r.end));

    let mut merged: Vec<Range> = Vec::with_capacity(ranges.len());
    for &range in ranges.iter() {
        match merged.last_mut() {
            // u64 so that `end + 1` cannot overflow at CellId::MAX
            Some(last) if range.start as u64 <= last.end as u64 + 1 => {
                last.end = last.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    RangeSet(merged)
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ranges(&self) -> &[Range] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of covered ids
    pub fn len(&self) -> usize {
        self.0.iter().map(Range::len).sum()
    }

    pub fn contains(&self, cell: CellId) -> bool {
        self.0
            .binary_search_by(|r| {
                if r.end < cell {
                    std::cmp::Ordering::Less
                } else if r.start > cell {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// The `index`-th covered id in ascending order, without expanding
    pub fn nth(&self, mut index: usize) -> Option<CellId> {
        for range in &self.0 {
            let len = range.len();
            if index < len {
                return Some(range.start + index as CellId);
            }
            index -= len;
        }
        None
    }

    /// Ascending iterator over covered ids
    pub fn iter(&self) -> impl Iterator<Item = CellId> + '_ {
        self.0.iter().flat_map(|r| r.start..=r.end)
    }

    pub fn union(&self, other: &RangeSet) -> RangeSet {
        merge([self, other])
    }

    /// Ids in `self` that are not in `other`
    pub fn difference(&self, other: &RangeSet) -> RangeSet {
        if other.is_empty() {
            return self.clone();
        }
        let removed: BTreeSet<CellId> = other.iter().collect();
        let remaining: Vec<CellId> = self.iter().filter(|id| !removed.contains(id)).collect();
        compress(&remaining)
    }

    pub fn with_cell(&self, cell: CellId) -> RangeSet {
        self.union(&RangeSet(vec![Range::single(cell)]))
    }

    pub fn without_cell(&self, cell: CellId) -> RangeSet {
        let mut ranges = Vec::with_capacity(self.0.len() + 1);
        for &range in &self.0 {
            if !range.contains(cell) {
                ranges.push(range);
                continue;
            }
            if range.start < cell {
                ranges.push(Range::new(range.start, cell - 1));
            }
            if cell < range.end {
                ranges.push(Range::new(cell + 1, range.end));
            }
        }
        RangeSet(ranges)
    }

    /// True when ranges are sorted, non-overlapping and non-adjacent
    pub fn is_canonical(&self) -> bool {
        self.0.iter().all(|r| r.start <= r.end)
            && self
                .0
                .windows(2)
                .all(|w| (w[0].end as u64) + 1 < w[1].start as u64)
    }
}

impl FromIterator<CellId> for RangeSet {
    fn from_iter<I: IntoIterator<Item = CellId>>(iter: I) -> Self {
        let ids: Vec<CellId> = iter.into_iter().collect();
        compress(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn set(pairs: &[(CellId, CellId)]) -> RangeSet {
        RangeSet(pairs.iter().map(|&(s, e)| Range::new(s, e)).collect())
    }

    #[test]
    fn test_compress_merges_runs() {
        assert_eq!(compress(&[5, 1, 2, 3, 9, 10, 3]), set(&[(1, 3), (5, 5), (9, 10)]));
        assert!(compress(&[]).is_empty());
    }

    #[test]
    fn test_expand_lists_every_id() {
        assert_eq!(expand(&set(&[(1, 3), (7, 8)])), vec![1, 2, 3, 7, 8]);
    }

    #[test]
    fn test_merge_joins_adjacent_and_overlapping() {
        let a = set(&[(0, 4), (10, 12)]);
        let b = set(&[(5, 6), (11, 20)]);
        assert_eq!(merge([&a, &b]), set(&[(0, 6), (10, 20)]));
    }

    #[test]
    fn test_merge_keeps_gaps() {
        let a = set(&[(0, 4)]);
        let b = set(&[(6, 7)]);
        assert_eq!(merge([&a, &b]), set(&[(0, 4), (6, 7)]));
    }

    #[test]
    fn test_nth_and_contains() {
        let s = set(&[(2, 4), (10, 11)]);
        assert_eq!(s.len(), 5);
        assert_eq!(s.nth(0), Some(2));
        assert_eq!(s.nth(3), Some(10));
        assert_eq!(s.nth(4), Some(11));
        assert_eq!(s.nth(5), None);
        assert!(s.contains(3));
        assert!(!s.contains(5));
        assert!(s.contains(11));
    }

    #[test]
    fn test_single_cell_transfer() {
        let s = set(&[(2, 6)]);
        assert_eq!(s.without_cell(4), set(&[(2, 3), (5, 6)]));
        assert_eq!(s.without_cell(2), set(&[(3, 6)]));
        assert_eq!(s.without_cell(9), s);
        assert_eq!(set(&[(4, 4)]).without_cell(4), RangeSet::new());

        assert_eq!(s.with_cell(7), set(&[(2, 7)]));
        assert_eq!(s.with_cell(9), set(&[(2, 6), (9, 9)]));
        assert_eq!(s.with_cell(4), s);
    }

    #[test]
    fn test_difference() {
        let a = set(&[(0, 9)]);
        let b = set(&[(3, 4), (9, 12)]);
        assert_eq!(a.difference(&b), set(&[(0, 2), (5, 8)]));
    }

    #[test]
    fn test_serializes_as_plain_list() {
        let json = serde_json::to_string(&set(&[(1, 2)])).unwrap();
        assert_eq!(json, r#"[{"start":1,"end":2}]"#);
    }

    proptest! {
        #[test]
        fn prop_expand_compress_is_sorted_unique(ids in prop::collection::vec(0u32..5_000, 0..300)) {
            let mut expected = ids.clone();
            expected.sort_unstable();
            expected.dedup();
            let compressed = compress(&ids);
            prop_assert!(compressed.is_canonical());
            prop_assert_eq!(expand(&compressed), expected);
        }

        #[test]
        fn prop_compress_expand_is_identity(ids in prop::collection::vec(0u32..5_000, 0..300)) {
            let canonical = compress(&ids);
            prop_assert_eq!(compress(&expand(&canonical)), canonical);
        }

        #[test]
        fn prop_merge_equals_set_union(
            a in prop::collection::vec(0u32..2_000, 0..100),
            b in prop::collection::vec(0u32..2_000, 0..100),
        ) {
            let merged = merge([&compress(&a), &compress(&b)]);
            let mut all = a.clone();
            all.extend(&b);
            prop_assert_eq!(merged, compress(&all));
        }

        #[test]
        fn prop_move_cell_keeps_partition(
            ids in prop::collection::vec(0u32..500, 1..100),
            pick in any::<prop::sample::Index>(),
        ) {
            let from = compress(&ids);
            let to = RangeSet::new();
            let cell = from.nth(pick.index(from.len())).unwrap();
            let from_after = from.without_cell(cell);
            let to_after = to.with_cell(cell);
            prop_assert_eq!(from_after.len() + to_after.len(), from.len());
            prop_assert!(!from_after.contains(cell));
            prop_assert!(from_after.is_canonical());
            prop_assert_eq!(merge([&from_after, &to_after]), from);
        }
    }
}
