//! Yearly population, economy and technology growth

use crate::core::config::SimTunables;
use crate::history::polity::{PolityStats, StatsDelta};
use crate::history::world::HistoryWorld;
use crate::timeline::snapshot::PolityUpdate;

/// The four draws taken for one polity in one year
#[derive(Clone, Copy, Debug)]
pub struct GrowthRoll {
    pub growth: f64,
    pub gdp_growth: f64,
    pub tech_growth: f64,
    pub stability_shift: f64,
}

/// Grow every polity in roster order and return the recorded stat deltas
pub fn apply_growth(world: &mut HistoryWorld, tunables: &SimTunables) -> Vec<PolityUpdate> {
    let mut updates = Vec::with_capacity(world.polities.len());

    for polity in world.polities.iter_mut() {
        let roll = GrowthRoll {
            growth: tunables.pop_growth_base + world.prng.next_float01() * tunables.pop_growth_variance,
            gdp_growth: tunables.gdp_growth_base + world.prng.next_float01() * tunables.gdp_growth_variance,
            tech_growth: tunables.tech_growth_base
                + world.prng.next_float01() * tunables.tech_growth_variance,
            stability_shift: (world.prng.next_float01() - 0.5) * tunables.stability_shift_range,
        };

        let before = polity.stats.clone();
        grow_stats(&mut polity.stats, &roll, tunables);

        updates.push(PolityUpdate {
            polity_id: polity.id,
            stats_delta: StatsDelta::between(&before, &polity.stats),
        });
    }

    updates
}

/// Apply one year's roll to a stat block
pub fn grow_stats(stats: &mut PolityStats, roll: &GrowthRoll, tunables: &SimTunables) {
    let floor = tunables.stat_floor;

    stats.population *= 1.0 + roll.growth;
    stats.gdp *= 1.0 + roll.gdp_growth;
    stats.tech_level = (stats.tech_level + roll.tech_growth).min(1.0);
    stats.stability = (stats.stability + roll.stability_shift).clamp(floor, 1.0);
    stats.legitimacy = (stats.legitimacy + roll.stability_shift * 0.5).clamp(floor, 1.0);
    stats.logistics = (stats.logistics + roll.tech_growth * 2.0).clamp(floor, 1.0);
    stats.military = (stats.military + roll.tech_growth * 1.5).clamp(floor, 1.0);
    stats.power_score = (stats.power_score + roll.gdp_growth * 2.0 + roll.tech_growth * 10.0)
        .min(tunables.power_score_cap);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> PolityStats {
        PolityStats {
            population: 10_000.0,
            gdp: 40_000.0,
            tech_level: 0.5,
            industrial_capacity: 0.3,
            resource_security: 0.5,
            military: 0.5,
            naval_projection: 0.2,
            stability: 0.5,
            legitimacy: 0.5,
            logistics: 0.5,
            power_score: 50.0,
        }
    }

    fn roll() -> GrowthRoll {
        GrowthRoll {
            growth: 0.01,
            gdp_growth: 0.02,
            tech_growth: 0.002,
            stability_shift: -0.004,
        }
    }

    #[test]
    fn test_grow_stats_formulas() {
        let tunables = SimTunables::default();
        let mut s = stats();
        grow_stats(&mut s, &roll(), &tunables);

        assert!((s.population - 10_100.0).abs() < 1e-9);
        assert!((s.gdp - 40_800.0).abs() < 1e-9);
        assert!((s.tech_level - 0.502).abs() < 1e-12);
        assert!((s.stability - 0.496).abs() < 1e-12);
        assert!((s.legitimacy - 0.498).abs() < 1e-12);
        assert!((s.logistics - 0.504).abs() < 1e-12);
        assert!((s.military - 0.503).abs() < 1e-12);
        assert!((s.power_score - 50.06).abs() < 1e-9);
        assert_eq!(s.industrial_capacity, 0.3);
        assert_eq!(s.naval_projection, 0.2);
    }

    #[test]
    fn test_grow_stats_respects_bounds() {
        let tunables = SimTunables::default();
        let mut s = PolityStats {
            tech_level: 0.9995,
            stability: 0.1,
            legitimacy: 0.1,
            logistics: 0.9995,
            military: 1.0,
            power_score: 99.99,
            ..stats()
        };
        grow_stats(&mut s, &roll(), &tunables);

        assert_eq!(s.tech_level, 1.0);
        assert_eq!(s.stability, tunables.stat_floor);
        assert_eq!(s.legitimacy, tunables.stat_floor);
        assert_eq!(s.logistics, 1.0);
        assert_eq!(s.military, 1.0);
        assert_eq!(s.power_score, tunables.power_score_cap);
    }

    #[test]
    fn test_capped_fields_are_absent_from_delta() {
        let tunables = SimTunables::default();
        let before = PolityStats {
            tech_level: 1.0,
            military: 1.0,
            ..stats()
        };
        let mut after = before.clone();
        grow_stats(&mut after, &roll(), &tunables);

        let delta = StatsDelta::between(&before, &after);
        assert!(delta.tech_level.is_none());
        assert!(delta.military.is_none());
        assert!(delta.population.is_some());
        assert!(delta.industrial_capacity.is_none());
    }
}
