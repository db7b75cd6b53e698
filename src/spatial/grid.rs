//! Row-major cell grid

use serde::{Deserialize, Serialize};

use crate::core::types::CellId;

/// One grid cell as handed to the history engine by the terrain stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    pub id: CellId,
    pub x: u32,
    pub y: u32,
    pub lat: f64,
    pub lon: f64,
    pub elevation: f64,
    pub is_ocean: bool,
    pub biome_id: String,
    pub resource_tags: Vec<String>,
}

impl Cell {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.resource_tags.iter().any(|t| t == tag)
    }
}

/// Grid dimensions and id <-> coordinate conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: u32,
    pub height: u32,
}

impl GridDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    #[inline]
    pub fn index(&self, x: u32, y: u32) -> CellId {
        y * self.width + x
    }

    #[inline]
    pub fn coords(&self, id: CellId) -> (u32, u32) {
        (id % self.width, id / self.width)
    }

    /// Latitude in [-90, 90] and longitude in [-180, 180] of a cell
    pub fn lat_lon(&self, x: u32, y: u32) -> (f64, f64) {
        let lat = (y as f64 / (self.height - 1).max(1) as f64) * 180.0 - 90.0;
        let lon = (x as f64 / (self.width - 1).max(1) as f64) * 360.0 - 180.0;
        (lat, lon)
    }

    /// Euclidean distance between two cells in grid units
    pub fn distance(&self, a: CellId, b: CellId) -> f64 {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        let dx = ax as f64 - bx as f64;
        let dy = ay as f64 - by as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let dims = GridDims::new(80, 40);
        let id = dims.index(13, 7);
        assert_eq!(id, 7 * 80 + 13);
        assert_eq!(dims.coords(id), (13, 7));
        assert_eq!(dims.cell_count(), 3200);
    }

    #[test]
    fn test_lat_lon_corners() {
        let dims = GridDims::new(5, 3);
        assert_eq!(dims.lat_lon(0, 0), (-90.0, -180.0));
        assert_eq!(dims.lat_lon(4, 2), (90.0, 180.0));
        assert_eq!(dims.lat_lon(2, 1), (0.0, 0.0));
    }

    #[test]
    fn test_distance() {
        let dims = GridDims::new(10, 10);
        assert_eq!(dims.distance(dims.index(0, 0), dims.index(3, 4)), 5.0);
    }
}
