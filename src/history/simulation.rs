//! Main simulation loop and end-to-end world generation

use std::time::Instant;

use crate::core::config::{SimTunables, WorldConfig};
use crate::core::error::{ForgeError, Result};
use crate::core::rng::Prng;
use crate::core::types::{PolityId, Year};
use crate::history::output::{SimulationOutput, WorldBundle};
use crate::history::polity::{PolityState, PolityStats};
use crate::history::systems::{self, WarYear};
use crate::history::world::HistoryWorld;
use crate::timeline::snapshot::{Delta, Snapshot};
use crate::worldgen;

/// Year span, snapshot cadence and tunables for one run
#[derive(Clone, Debug)]
pub struct SimulationConfig {
    pub start_year: Year,
    /// Inclusive
    pub end_year: Year,
    pub snapshots_every_years: u32,
    pub tunables: SimTunables,
}

impl SimulationConfig {
    pub fn from_world_config(config: &WorldConfig) -> Self {
        Self {
            start_year: config.societies.starting_year,
            end_year: config.societies.ending_year,
            snapshots_every_years: config.output.snapshots_every_years,
            tunables: config.simulation.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.end_year < self.start_year {
            return Err(ForgeError::InvalidConfig(format!(
                "end year {} is before start year {}",
                self.end_year, self.start_year
            )));
        }
        if self.snapshots_every_years == 0 {
            return Err(ForgeError::InvalidConfig(
                "snapshot interval must be at least 1".into(),
            ));
        }
        self.tunables.validate()
    }

    /// Start year, every interval after it, and the final year
    pub fn is_snapshot_year(&self, year: Year) -> bool {
        let elapsed = year as i64 - self.start_year as i64;
        elapsed % self.snapshots_every_years as i64 == 0 || year == self.end_year
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::from_world_config(&WorldConfig::with_seed(0))
    }
}

/// Run the yearly loop over `[start_year, end_year]`
///
/// The initial state is validated up front; once the loop starts nothing
/// can fail. `polities_initial` in the output is the roster as passed in.
pub fn simulate_timeline(
    prng: Prng,
    polities: Vec<PolityState>,
    owner_by_cell: Vec<Option<PolityId>>,
    cell_count: usize,
    config: &SimulationConfig,
) -> Result<SimulationOutput> {
    config.validate()?;
    if owner_by_cell.len() != cell_count {
        return Err(ForgeError::InvalidInitialState(format!(
            "owner map covers {} cells, grid has {}",
            owner_by_cell.len(),
            cell_count
        )));
    }

    check_growth_headroom(&polities, config)?;

    let polities_initial = polities.clone();
    let mut world = HistoryWorld::new(polities, owner_by_cell, prng)?;
    let tunables = &config.tunables;

    let started = Instant::now();
    tracing::info!(
        polities = world.polities.len(),
        cells = cell_count,
        start = config.start_year,
        end = config.end_year,
        "simulating history"
    );

    for year in config.start_year..=config.end_year {
        // 1. Growth
        let polity_updates = systems::apply_growth(&mut world, tunables);

        // 2-4. Declaration, battles, settlement
        let mut war_year = WarYear::default();
        systems::declare_war(&mut world, year, tunables, &mut war_year);
        systems::resolve_wars(&mut world, year, tunables, &mut war_year);

        // 5. End-of-year snapshot
        if config.is_snapshot_year(year) {
            let snapshot = Snapshot::capture(year, &world.polities, &world.owner_by_cell, &[]);
            world.snapshots.push(snapshot);
        }

        // 6. Delta
        world.deltas.push(Delta {
            year,
            polity_updates,
            territorial_change_ids: war_year.changes,
            events: war_year.events,
        });
    }

    let output = SimulationOutput::new(polities_initial, world);
    tracing::info!(
        events = output.events.len(),
        wars = output.wars.len(),
        battles = output.battle_count(),
        snapshots = output.timeline_index.snapshots.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "history complete"
    );
    Ok(output)
}

/// Reject runs whose fastest possible compounding overflows `f64`
///
/// Population and gdp grow by at most `base + variance` per year. A
/// non-finite stat would serialize as `null`.
fn check_growth_headroom(polities: &[PolityState], config: &SimulationConfig) -> Result<()> {
    let tunables = &config.tunables;
    let years = (config.end_year as i64 - config.start_year as i64 + 1) as f64;
    let ceiling = f64::MAX.ln();

    let channels: [(&str, f64, fn(&PolityStats) -> f64); 2] = [
        ("population", tunables.pop_growth_base + tunables.pop_growth_variance, |s| s.population),
        ("gdp", tunables.gdp_growth_base + tunables.gdp_growth_variance, |s| s.gdp),
    ];
    for (stat, max_rate, read) in channels {
        let per_year = max_rate.ln_1p();
        for polity in polities {
            let start = read(&polity.stats);
            if start <= 0.0 {
                continue;
            }
            if start.ln() + per_year * years >= ceiling {
                return Err(ForgeError::InvalidConfig(format!(
                    "{} of {} can overflow within {} years at growth up to {}",
                    stat, polity.id, years, max_rate
                )));
            }
        }
    }
    Ok(())
}

/// Generate a complete world from a config
///
/// The root stream forks `elevation`, `resources`, `polities` and `sim`, in
/// that order.
pub fn generate_world(config: &WorldConfig) -> Result<WorldBundle> {
    config.validate()?;

    let mut root = Prng::new(config.seed);
    let elevation_rng = root.fork("elevation");
    let resource_rng = root.fork("resources");
    let polity_rng = root.fork("polities");
    let sim_rng = root.fork("sim");

    let cells = worldgen::generate_cells(&config.planet, elevation_rng, resource_rng);
    let seeded = worldgen::seed_polities(&cells, &config.planet, &config.societies, polity_rng)?;

    let sim = simulate_timeline(
        sim_rng,
        seeded.polities,
        seeded.owner_by_cell,
        cells.len(),
        &SimulationConfig::from_world_config(config),
    )?;

    WorldBundle::assemble(config, cells, sim)
}
