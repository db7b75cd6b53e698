//! World configuration with documented tunables
//!
//! Everything the generator and the yearly history loop read is collected
//! here. Configs are loaded from TOML; every section is optional and falls
//! back to the defaults below. Out-of-range values are rejected by
//! [`WorldConfig::validate`], never clamped.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{ForgeError, Result};
use crate::core::types::Year;

/// Largest grid we accept (cells are addressed with `u32`)
pub const MAX_CELLS: u64 = 1 << 24;

/// Complete configuration for one generated world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// Root seed; every random draw in the world derives from it
    pub seed: u64,
    #[serde(default)]
    pub planet: PlanetConfig,
    #[serde(default)]
    pub societies: SocietyConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub simulation: SimTunables,
}

/// Grid and terrain shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanetConfig {
    /// Cosmetic; carried into the bundle for renderers
    pub radius_km: f64,
    /// Fraction of cells that become ocean (lowest elevations first)
    pub ocean_coverage: f64,
    /// Number of land masses seeded in the elevation field
    pub num_continents: u32,
    pub map_width: u32,
    pub map_height: u32,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            radius_km: 6371.0,
            ocean_coverage: 0.68,
            num_continents: 5,
            map_width: 240,
            map_height: 120,
        }
    }
}

/// Initial society roster and the simulated year span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocietyConfig {
    /// Target roster size; capped by the number of habitable cells
    pub num_polities: u32,
    /// Culture groups referenced by polities (round-robin assignment)
    pub num_culture_groups: u32,
    pub starting_year: Year,
    /// Inclusive
    pub ending_year: Year,
}

impl Default for SocietyConfig {
    fn default() -> Self {
        Self {
            num_polities: 120,
            num_culture_groups: 40,
            starting_year: 0,
            ending_year: 1500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Full-state snapshot cadence in years
    ///
    /// Smaller = faster reconstruction, larger bundles.
    /// The start and end year are always snapshotted regardless.
    pub snapshots_every_years: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            snapshots_every_years: 10,
        }
    }
}

/// Growth and war-timing constants consumed by the yearly loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimTunables {
    // === GROWTH PHASE ===
    /// Minimum yearly population growth (multiplicative, 0.01 = 1%)
    pub pop_growth_base: f64,
    /// Uniform extra on top of the base; drawn once per polity per year
    pub pop_growth_variance: f64,
    pub gdp_growth_base: f64,
    pub gdp_growth_variance: f64,
    /// Additive tech gain per year; tech is capped at 1.0
    pub tech_growth_base: f64,
    pub tech_growth_variance: f64,
    /// Width of the symmetric stability shift window
    ///
    /// The shift is drawn from `[-range/2, range/2)`. Legitimacy moves by
    /// half of the same shift.
    pub stability_shift_range: f64,
    /// Lower clamp for stability, legitimacy, logistics and military
    pub stat_floor: f64,
    /// Upper clamp for power score
    pub power_score_cap: f64,

    // === WAR PHASE ===
    /// A war is considered every `war_interval_years` (year mod interval == 0)
    pub war_interval_years: u32,
    /// Chance an eligible war settles in a given year
    pub war_end_chance: f64,
    /// A war must be strictly older than this before it can settle
    pub war_min_duration_years: u32,
    pub battles_per_year_min: u32,
    pub battles_per_year_max: u32,
    pub casualty_min: u32,
    pub casualty_max: u32,
    /// Chance a battle is a siege rather than a field battle
    pub siege_chance: f64,
}

impl Default for SimTunables {
    fn default() -> Self {
        Self {
            pop_growth_base: 0.01,
            pop_growth_variance: 0.01,
            gdp_growth_base: 0.015,
            gdp_growth_variance: 0.02,
            tech_growth_base: 0.001,
            tech_growth_variance: 0.0015,
            stability_shift_range: 0.01,
            stat_floor: 0.1,
            power_score_cap: 100.0,

            war_interval_years: 7,
            war_end_chance: 0.3,
            war_min_duration_years: 3,
            battles_per_year_min: 1,
            battles_per_year_max: 3,
            casualty_min: 200,
            casualty_max: 2_000,
            siege_chance: 0.2,
        }
    }
}

impl WorldConfig {
    /// Default configuration for the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            planet: PlanetConfig::default(),
            societies: SocietyConfig::default(),
            output: OutputConfig::default(),
            simulation: SimTunables::default(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: WorldConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&contents)
    }

    /// Validate configuration before any generation happens
    pub fn validate(&self) -> Result<()> {
        let planet = &self.planet;
        if planet.map_width < 2 || planet.map_height < 2 {
            return Err(invalid(format!(
                "map must be at least 2x2, got {}x{}",
                planet.map_width, planet.map_height
            )));
        }
        let cells = planet.map_width as u64 * planet.map_height as u64;
        if cells > MAX_CELLS {
            return Err(invalid(format!(
                "map has {} cells, limit is {}",
                cells, MAX_CELLS
            )));
        }
        if !(0.0..0.95).contains(&planet.ocean_coverage) {
            return Err(invalid(format!(
                "ocean_coverage ({}) must be in [0, 0.95)",
                planet.ocean_coverage
            )));
        }
        if planet.num_continents == 0 {
            return Err(invalid("num_continents must be at least 1".into()));
        }
        if planet.radius_km <= 0.0 {
            return Err(invalid("radius_km must be positive".into()));
        }

        let societies = &self.societies;
        if societies.num_polities == 0 {
            return Err(invalid("num_polities must be at least 1".into()));
        }
        if societies.num_culture_groups == 0 {
            return Err(invalid("num_culture_groups must be at least 1".into()));
        }
        if societies.ending_year < societies.starting_year {
            return Err(invalid(format!(
                "ending_year ({}) is before starting_year ({})",
                societies.ending_year, societies.starting_year
            )));
        }

        if self.output.snapshots_every_years == 0 {
            return Err(invalid("snapshots_every_years must be at least 1".into()));
        }

        self.simulation.validate()
    }
}

impl SimTunables {
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("pop_growth_base", self.pop_growth_base),
            ("pop_growth_variance", self.pop_growth_variance),
            ("gdp_growth_base", self.gdp_growth_base),
            ("gdp_growth_variance", self.gdp_growth_variance),
            ("tech_growth_base", self.tech_growth_base),
            ("tech_growth_variance", self.tech_growth_variance),
            ("stability_shift_range", self.stability_shift_range),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(invalid(format!("{} ({}) must be finite and >= 0", name, value)));
            }
        }

        let rates = [
            ("pop_growth", self.pop_growth_base + self.pop_growth_variance),
            ("gdp_growth", self.gdp_growth_base + self.gdp_growth_variance),
            ("tech_growth", self.tech_growth_base + self.tech_growth_variance),
        ];
        for (name, worst) in rates {
            if worst >= 1.0 {
                return Err(invalid(format!(
                    "{}_base + {}_variance ({}) must be below 1",
                    name, name, worst
                )));
            }
        }

        let probabilities = [
            ("war_end_chance", self.war_end_chance),
            ("siege_chance", self.siege_chance),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{} ({}) must be in [0, 1]", name, value)));
            }
        }

        if !(0.0..1.0).contains(&self.stat_floor) {
            return Err(invalid(format!(
                "stat_floor ({}) must be in [0, 1)",
                self.stat_floor
            )));
        }
        if !(self.power_score_cap > 0.0) {
            return Err(invalid("power_score_cap must be positive".into()));
        }
        if self.war_interval_years == 0 {
            return Err(invalid("war_interval_years must be at least 1".into()));
        }
        if self.battles_per_year_min > self.battles_per_year_max {
            return Err(invalid(format!(
                "battles_per_year_min ({}) exceeds battles_per_year_max ({})",
                self.battles_per_year_min, self.battles_per_year_max
            )));
        }
        if self.casualty_min > self.casualty_max {
            return Err(invalid(format!(
                "casualty_min ({}) exceeds casualty_max ({})",
                self.casualty_min, self.casualty_max
            )));
        }
        Ok(())
    }
}

fn invalid(message: String) -> ForgeError {
    ForgeError::InvalidConfig(message)
}
