//! Initial polity roster and owner map

use crate::core::config::{PlanetConfig, SocietyConfig};
use crate::core::error::{ForgeError, Result};
use crate::core::rng::Prng;
use crate::core::types::{CellId, PolityId};
use crate::history::polity::{PolityState, PolityStats, PolityType};
use crate::spatial::{compress, Cell, GridDims};
use crate::worldgen::naming::{format_polity_name, NameRegistry, Syllables, AGRARIAN, MARTIAL, SEAFARING, TRADE};

const POP_DENSITY_MIN: i64 = 200;
const POP_DENSITY_MAX: i64 = 700;
const GDP_PER_CAPITA_MIN: i64 = 2;
const GDP_PER_CAPITA_MAX: i64 = 6;
const TECH_LEVEL_MIN: f64 = 0.2;
const TECH_LEVEL_RANGE: f64 = 0.6;
const POWER_SCORE_CAP: f64 = 100.0;
/// Distance multiplier for mountainous (mineral) cells
const MINERAL_ROUGHNESS: f64 = 1.1;

/// Naming style per culture group, round-robin
const STYLES: [&Syllables; 4] = [&TRADE, &AGRARIAN, &SEAFARING, &MARTIAL];

/// Seeded roster plus the owner of every cell
#[derive(Clone, Debug)]
pub struct SeededPolities {
    pub polities: Vec<PolityState>,
    pub owner_by_cell: Vec<Option<PolityId>>,
}

/// Place capitals, carve territories and roll starting stats
///
/// Capitals are a shuffled prefix of the habitable land cells (any land if
/// nothing is habitable). Every land cell joins the capital with the lowest
/// weighted distance; ocean stays unowned.
pub fn seed_polities(
    cells: &[Cell],
    planet: &PlanetConfig,
    societies: &SocietyConfig,
    mut prng: Prng,
) -> Result<SeededPolities> {
    let dims = GridDims::new(planet.map_width, planet.map_height);
    if cells.len() != dims.cell_count() {
        return Err(ForgeError::InvalidInitialState(format!(
            "{} cells do not fill a {}x{} grid",
            cells.len(),
            dims.width,
            dims.height
        )));
    }

    let land: Vec<CellId> = cells.iter().filter(|c| !c.is_ocean).map(|c| c.id).collect();
    if land.is_empty() {
        return Err(ForgeError::InvalidInitialState("world has no land cells".into()));
    }

    let mut candidates: Vec<CellId> = land
        .iter()
        .copied()
        .filter(|&id| is_habitable(&cells[id as usize]))
        .collect();
    if candidates.is_empty() {
        candidates = land.clone();
    }
    prng.shuffle(&mut candidates);
    candidates.truncate(societies.num_polities as usize);
    let capitals = candidates;

    let owner_slot = assign_territories(cells, dims, &land, &capitals);

    let mut territories: Vec<Vec<CellId>> = vec![Vec::new(); capitals.len()];
    for (cell, slot) in owner_slot.iter().enumerate() {
        if let Some(slot) = slot {
            territories[*slot].push(cell as CellId);
        }
    }

    let mut names = NameRegistry::new();
    let mut polities = Vec::with_capacity(capitals.len());
    for (index, &capital) in capitals.iter().enumerate() {
        let culture = index % societies.num_culture_groups as usize;
        let polity_type = PolityType::ALL[index % PolityType::ALL.len()];
        let base = names.polity_base(&mut prng, STYLES[culture % STYLES.len()]);
        let stats = roll_stats(&mut prng, cells, dims, capital, territories[index].len());

        polities.push(PolityState {
            id: PolityId(index as u32 + 1),
            name: format_polity_name(&base, polity_type),
            polity_type,
            capital_cell_id: capital,
            culture_group_ids: vec![format!("cult-{}", culture + 1)],
            stats,
            territory: compress(&territories[index]),
        });
    }

    let owner_by_cell = owner_slot
        .into_iter()
        .map(|slot| slot.map(|i| PolityId(i as u32 + 1)))
        .collect();

    tracing::debug!(polities = polities.len(), land = land.len(), "seeded polities");
    Ok(SeededPolities {
        polities,
        owner_by_cell,
    })
}

fn is_habitable(cell: &Cell) -> bool {
    !cell.is_ocean && cell.biome_id != "desert" && cell.biome_id != "tundra"
}

/// Roster slot owning each cell; first capital wins ties
fn assign_territories(cells: &[Cell], dims: GridDims, land: &[CellId], capitals: &[CellId]) -> Vec<Option<usize>> {
    let mut owner = vec![None; cells.len()];
    for &cell in land {
        let roughness = if cells[cell as usize].has_tag("minerals") {
            MINERAL_ROUGHNESS
        } else {
            1.0
        };
        let mut best: Option<(usize, f64)> = None;
        for (slot, &capital) in capitals.iter().enumerate() {
            let score = dims.distance(cell, capital) * roughness;
            if best.map_or(true, |(_, s)| score < s) {
                best = Some((slot, score));
            }
        }
        owner[cell as usize] = best.map(|(slot, _)| slot);
    }
    owner
}

/// Starting stats; draws population, gdp, tech, stability, legitimacy
fn roll_stats(prng: &mut Prng, cells: &[Cell], dims: GridDims, capital: CellId, cell_count: usize) -> PolityStats {
    let population = cell_count as f64 * prng.next_int(POP_DENSITY_MIN, POP_DENSITY_MAX) as f64;
    let gdp = population * prng.next_int(GDP_PER_CAPITA_MIN, GDP_PER_CAPITA_MAX) as f64;
    let tech_level = prng.next_float01() * TECH_LEVEL_RANGE + TECH_LEVEL_MIN;
    let capital_tags = cells[capital as usize].resource_tags.len() as f64;

    let mut stats = PolityStats {
        population,
        gdp,
        tech_level,
        industrial_capacity: tech_level * 0.8,
        resource_security: (capital_tags / 3.0 + 0.3).min(1.0),
        military: (0.3 + tech_level * 0.5).min(1.0),
        naval_projection: if is_coastal(cells, dims, capital) {
            0.4 + tech_level * 0.4
        } else {
            0.1
        },
        stability: 0.55 + prng.next_float01() * 0.2,
        legitimacy: 0.5 + prng.next_float01() * 0.3,
        logistics: 0.4 + tech_level * 0.5,
        power_score: 0.0,
    };
    stats.power_score = power_score(&stats);
    stats
}

fn is_coastal(cells: &[Cell], dims: GridDims, cell: CellId) -> bool {
    let (x, y) = dims.coords(cell);
    let mut neighbours = Vec::with_capacity(4);
    if x > 0 {
        neighbours.push(dims.index(x - 1, y));
    }
    if x + 1 < dims.width {
        neighbours.push(dims.index(x + 1, y));
    }
    if y > 0 {
        neighbours.push(dims.index(x, y - 1));
    }
    if y + 1 < dims.height {
        neighbours.push(dims.index(x, y + 1));
    }
    neighbours.into_iter().any(|n| cells[n as usize].is_ocean)
}

/// Log-weighted size term plus weighted capability modifiers, capped
pub fn power_score(stats: &PolityStats) -> f64 {
    let base = (stats.population + 1.0).log10() * 10.0 + (stats.gdp + 1.0).log10() * 8.0;
    let modifiers = stats.tech_level * 15.0
        + stats.industrial_capacity * 10.0
        + stats.resource_security * 8.0
        + stats.military * 12.0
        + stats.naval_projection * 4.0
        + stats.stability * 6.0
        + stats.legitimacy * 4.0
        + stats.logistics * 6.0;
    (base + modifiers).min(POWER_SCORE_CAP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worldgen::terrain::generate_cells;

    fn planet() -> PlanetConfig {
        PlanetConfig {
            map_width: 40,
            map_height: 20,
            num_continents: 3,
            ocean_coverage: 0.6,
            ..PlanetConfig::default()
        }
    }

    fn societies(count: u32) -> SocietyConfig {
        SocietyConfig {
            num_polities: count,
            num_culture_groups: 4,
            ..SocietyConfig::default()
        }
    }

    #[test]
    fn test_land_is_partitioned() {
        let planet = planet();
        let cells = generate_cells(&planet, Prng::new(1), Prng::new(2));
        let seeded = seed_polities(&cells, &planet, &societies(12), Prng::new(3)).unwrap();

        assert_eq!(seeded.polities.len(), 12);
        for (cell, owner) in cells.iter().zip(&seeded.owner_by_cell) {
            assert_eq!(owner.is_some(), !cell.is_ocean);
        }
        let owned: usize = seeded.polities.iter().map(|p| p.territory.len()).sum();
        assert_eq!(owned, cells.iter().filter(|c| !c.is_ocean).count());
        for polity in &seeded.polities {
            assert!(polity.territory.contains(polity.capital_cell_id));
            assert_eq!(seeded.owner_by_cell[polity.capital_cell_id as usize], Some(polity.id));
        }
    }

    #[test]
    fn test_roster_capped_by_candidates() {
        let planet = planet();
        let cells = generate_cells(&planet, Prng::new(1), Prng::new(2));
        let seeded = seed_polities(&cells, &planet, &societies(5_000), Prng::new(3)).unwrap();
        assert!(seeded.polities.len() < 5_000);
        let names: ahash::AHashSet<&str> = seeded.polities.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), seeded.polities.len());
    }

    #[test]
    fn test_stats_in_expected_ranges() {
        let planet = planet();
        let cells = generate_cells(&planet, Prng::new(7), Prng::new(8));
        let seeded = seed_polities(&cells, &planet, &societies(10), Prng::new(9)).unwrap();
        for polity in &seeded.polities {
            let s = &polity.stats;
            let cells = polity.territory.len() as f64;
            assert!(s.population >= cells * 200.0 && s.population <= cells * 700.0);
            assert!((0.2..0.8).contains(&s.tech_level));
            assert!(s.power_score > 0.0 && s.power_score <= 100.0);
            assert_eq!(s.power_score, power_score(s));
        }
    }

    #[test]
    fn test_no_land_is_rejected() {
        let planet = planet();
        let mut cells = generate_cells(&planet, Prng::new(1), Prng::new(2));
        for cell in &mut cells {
            cell.is_ocean = true;
        }
        let result = seed_polities(&cells, &planet, &societies(3), Prng::new(3));
        assert!(matches!(result, Err(ForgeError::InvalidInitialState(_))));
    }

    #[test]
    fn test_power_score_is_capped() {
        let stats = PolityStats {
            population: 1e12,
            gdp: 1e13,
            tech_level: 1.0,
            ..Default::default()
        };
        assert_eq!(power_score(&stats), 100.0);
    }
}
