//! Elevation, ocean, biome and resource layers for the cell grid

use crate::core::config::PlanetConfig;
use crate::core::rng::Prng;
use crate::core::types::CellId;
use crate::spatial::{Cell, GridDims};

const NOISE_OCTAVES: u32 = 3;
const NOISE_BASE_PERIOD: f64 = 16.0;
const NOISE_WEIGHT: f64 = 0.5;

const ELEVATION_TEMP_WEIGHT: f64 = 0.4;
const BASE_HUMIDITY: f64 = 0.6;
const LATITUDE_HUMIDITY_DIVISOR: f64 = 120.0;

const MINERAL_ELEVATION: f64 = 0.5;
const FERTILE_ELEVATION: f64 = 0.2;
const ENERGY_CHANCE: f64 = 0.08;
const TIMBER_CHANCE: f64 = 0.10;

/// Build every cell of the grid
///
/// Elevation in the result is relative to sea level: land in `[0, 1]`,
/// ocean in `[-1, 0)`.
pub fn generate_cells(planet: &PlanetConfig, mut elevation_rng: Prng, mut resource_rng: Prng) -> Vec<Cell> {
    let dims = GridDims::new(planet.map_width, planet.map_height);
    let raw = elevation_field(dims, planet.num_continents, &mut elevation_rng);
    let is_ocean = ocean_mask(&raw, planet.ocean_coverage);
    let relative = relative_to_sea_level(&raw, &is_ocean);

    let mut cells = Vec::with_capacity(dims.cell_count());
    for y in 0..dims.height {
        for x in 0..dims.width {
            let id = dims.index(x, y);
            let idx = id as usize;
            let (lat, lon) = dims.lat_lon(x, y);
            let elevation = relative[idx];
            let ocean = is_ocean[idx];

            cells.push(Cell {
                id,
                x,
                y,
                lat,
                lon,
                elevation,
                is_ocean: ocean,
                biome_id: pick_biome(lat, elevation, ocean).to_string(),
                resource_tags: resource_tags(elevation, ocean, &mut resource_rng),
            });
        }
    }
    cells
}

/// Continent bumps plus hashed value noise
fn elevation_field(dims: GridDims, continents: u32, rng: &mut Prng) -> Vec<f64> {
    let width = dims.width as f64;
    let height = dims.height as f64;
    let span = width.min(height);

    let centres: Vec<(f64, f64, f64)> = (0..continents)
        .map(|_| {
            let cx = rng.next_float01() * width;
            let cy = (0.2 + rng.next_float01() * 0.6) * height;
            let radius = (0.15 + rng.next_float01() * 0.15) * span;
            (cx, cy, radius)
        })
        .collect();
    let noise_seed = rng.next_u64();

    let mut field = Vec::with_capacity(dims.cell_count());
    for y in 0..dims.height {
        for x in 0..dims.width {
            let (fx, fy) = (x as f64, y as f64);
            let bump = centres
                .iter()
                .map(|&(cx, cy, r)| {
                    let d = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
                    (1.0 - d / r).max(0.0)
                })
                .fold(0.0, f64::max);
            field.push(bump + NOISE_WEIGHT * fractal_noise(fx, fy, noise_seed));
        }
    }
    field
}

/// The lowest `coverage` fraction of cells (ties broken by id) become ocean
fn ocean_mask(elevation: &[f64], coverage: f64) -> Vec<bool> {
    let mut order: Vec<CellId> = (0..elevation.len() as CellId).collect();
    order.sort_by(|&a, &b| {
        elevation[a as usize]
            .total_cmp(&elevation[b as usize])
            .then(a.cmp(&b))
    });

    let ocean_count = (elevation.len() as f64 * coverage).floor() as usize;
    let mut mask = vec![false; elevation.len()];
    for &id in order.iter().take(ocean_count) {
        mask[id as usize] = true;
    }
    mask
}

fn relative_to_sea_level(raw: &[f64], is_ocean: &[bool]) -> Vec<f64> {
    let sea = raw
        .iter()
        .zip(is_ocean)
        .filter(|(_, ocean)| **ocean)
        .map(|(&e, _)| e)
        .fold(f64::NEG_INFINITY, f64::max);
    let lowest = raw.iter().copied().fold(f64::INFINITY, f64::min);
    let highest = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // No ocean at all: the lowest cell sits at sea level
    let sea = if sea.is_finite() { sea } else { lowest };

    raw.iter()
        .zip(is_ocean)
        .map(|(&e, &ocean)| {
            if ocean {
                ((e - sea) / (sea - lowest).max(1e-9)).max(-1.0)
            } else {
                ((e - sea) / (highest - sea).max(1e-9)).clamp(0.0, 1.0)
            }
        })
        .collect()
}

fn pick_biome(lat: f64, elevation: f64, is_ocean: bool) -> &'static str {
    if is_ocean {
        return "ocean";
    }
    let temp = 1.0 - lat.abs() / 90.0 - elevation.max(0.0) * ELEVATION_TEMP_WEIGHT;
    let humidity = BASE_HUMIDITY - lat.abs() / LATITUDE_HUMIDITY_DIVISOR;

    if temp < 0.2 {
        if humidity < 0.35 { "tundra" } else { "taiga" }
    } else if temp < 0.4 {
        if humidity < 0.3 { "steppe" } else { "temperate" }
    } else if temp < 0.7 {
        if humidity < 0.3 {
            "desert"
        } else if humidity < 0.6 {
            "mediterranean"
        } else {
            "temperate"
        }
    } else if humidity < 0.35 {
        "desert"
    } else if humidity < 0.6 {
        "savanna"
    } else {
        "tropical"
    }
}

/// Ocean cells draw nothing; land cells always draw twice
fn resource_tags(elevation: f64, is_ocean: bool, rng: &mut Prng) -> Vec<String> {
    if is_ocean {
        return Vec::new();
    }
    let mut tags = Vec::new();
    if elevation > MINERAL_ELEVATION {
        tags.push("minerals".to_string());
    }
    if elevation < FERTILE_ELEVATION {
        tags.push("fertile".to_string());
    }
    if rng.next_float01() > 1.0 - ENERGY_CHANCE {
        tags.push("energy".to_string());
    }
    if rng.next_float01() > 1.0 - TIMBER_CHANCE {
        tags.push("timber".to_string());
    }
    tags
}

fn fractal_noise(x: f64, y: f64, seed: u64) -> f64 {
    let mut total = 0.0;
    let mut norm = 0.0;
    for octave in 0..NOISE_OCTAVES {
        let period = NOISE_BASE_PERIOD / (1u32 << octave) as f64;
        let amplitude = 1.0 / (octave + 1) as f64;
        total += value_noise(x / period, y / period, seed.wrapping_add(octave as u64)) * amplitude;
        norm += amplitude;
    }
    total / norm
}

/// Smoothly interpolated lattice noise in `[0, 1)`
fn value_noise(x: f64, y: f64, seed: u64) -> f64 {
    let (x0, y0) = (x.floor(), y.floor());
    let (sx, sy) = (smooth(x - x0), smooth(y - y0));
    let (ix, iy) = (x0 as i64, y0 as i64);

    let top = lerp(lattice(ix, iy, seed), lattice(ix + 1, iy, seed), sx);
    let bottom = lerp(lattice(ix, iy + 1, seed), lattice(ix + 1, iy + 1, seed), sx);
    lerp(top, bottom, sy)
}

fn lattice(ix: i64, iy: i64, seed: u64) -> f64 {
    let n = (ix as u64)
        .wrapping_mul(374761393)
        .wrapping_add((iy as u64).wrapping_mul(668265263))
        .wrapping_add(seed);
    let n = (n ^ (n >> 13)).wrapping_mul(1274126177);
    let n = n ^ (n >> 16);
    (n >> 11) as f64 / (1u64 << 53) as f64
}

#[inline]
fn smooth(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn planet(width: u32, height: u32, coverage: f64) -> PlanetConfig {
        PlanetConfig {
            ocean_coverage: coverage,
            num_continents: 3,
            map_width: width,
            map_height: height,
            ..PlanetConfig::default()
        }
    }

    #[test]
    fn test_cells_are_row_major() {
        let cells = generate_cells(&planet(20, 10, 0.5), Prng::new(1), Prng::new(2));
        assert_eq!(cells.len(), 200);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.id as usize, i);
            assert_eq!(cell.id, cell.y * 20 + cell.x);
        }
    }

    #[test]
    fn test_ocean_fraction_is_exact() {
        let cells = generate_cells(&planet(40, 20, 0.68), Prng::new(5), Prng::new(6));
        let ocean = cells.iter().filter(|c| c.is_ocean).count();
        assert_eq!(ocean, (800.0_f64 * 0.68).floor() as usize);
        assert!(cells.iter().filter(|c| c.is_ocean).all(|c| c.biome_id == "ocean" && c.resource_tags.is_empty()));
        assert!(cells.iter().filter(|c| !c.is_ocean).all(|c| (0.0..=1.0).contains(&c.elevation)));
    }

    #[test]
    fn test_no_ocean_when_coverage_zero() {
        let cells = generate_cells(&planet(10, 10, 0.0), Prng::new(5), Prng::new(6));
        assert!(cells.iter().all(|c| !c.is_ocean));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_cells(&planet(30, 15, 0.6), Prng::new(42), Prng::new(43));
        let b = generate_cells(&planet(30, 15, 0.6), Prng::new(42), Prng::new(43));
        assert_eq!(a, b);
    }

    #[test]
    fn test_mineral_tags_follow_elevation() {
        let cells = generate_cells(&planet(40, 20, 0.5), Prng::new(9), Prng::new(10));
        for cell in cells.iter().filter(|c| !c.is_ocean) {
            assert_eq!(cell.has_tag("minerals"), cell.elevation > MINERAL_ELEVATION);
            assert_eq!(cell.has_tag("fertile"), cell.elevation < FERTILE_ELEVATION);
        }
    }

    #[test]
    fn test_noise_range() {
        for i in 0..500 {
            let v = value_noise(i as f64 * 0.37, i as f64 * 0.11, 77);
            assert!((0.0..1.0).contains(&v));
        }
    }
}
