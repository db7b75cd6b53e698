//! Per-polity stat time series

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::types::{PolityId, Year};
use crate::history::output::WorldBundle;
use crate::history::polity::StatSummary;
use crate::timeline::reconstruction::Replayer;
use crate::timeline::snapshot::Delta;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub year: Year,
    pub stats: StatSummary,
}

/// One point per polity per simulated year, end-of-year values
///
/// Replays every delta from the initial roster rather than starting at
/// snapshots, so the series is continuous across snapshot boundaries.
pub fn build_stat_series(world: &WorldBundle) -> AHashMap<PolityId, Vec<SeriesPoint>> {
    let deltas_by_year: AHashMap<Year, &Delta> = world
        .timeline_index
        .deltas
        .iter()
        .map(|d| (d.year, d))
        .collect();

    let years = (world.meta.end_year as i64 - world.meta.start_year as i64 + 1).max(0) as usize;
    let mut series: AHashMap<PolityId, Vec<SeriesPoint>> = world
        .polities_initial
        .iter()
        .map(|p| (p.id, Vec::with_capacity(years)))
        .collect();

    let mut replayer = Replayer::new(world.polities_initial.clone(), &world.territorial_changes);
    for year in world.meta.start_year..=world.meta.end_year {
        if let Some(delta) = deltas_by_year.get(&year) {
            replayer.apply(delta);
        }
        for polity in replayer.states() {
            if let Some(points) = series.get_mut(&polity.id) {
                points.push(SeriesPoint {
                    year,
                    stats: polity.stats.summary(),
                });
            }
        }
    }
    series
}
