//! Geographic grid indexer: maps coordinates to cells and cells to polygons.
//!
//! The grid is axis aligned and anchored at (0°, 0°), not at the viewport, so
//! cell boundaries stay put while panning at a fixed density. Cells straddling
//! the antimeridian or the poles are not special-cased.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A closed polygon ring in geographic coordinates (`[lon, lat]` pairs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub ring: Vec<[f64; 2]>,
}

impl GeoPolygon {
    /// The points without the closing duplicate of the first one.
    pub fn vertices(&self) -> &[[f64; 2]] {
        match self.ring.len() {
            0 => &self.ring,
            n if self.ring.first() == self.ring.last() => &self.ring[..n - 1],
            _ => &self.ring,
        }
    }
}

/// The cell containing (`lon`, `lat`) at `cells_per_degree`.
///
/// Coordinates are not validated; NaN and out-of-range input produce cells
/// with unexpected (saturated) indices.
pub fn cell_at(lon: f64, lat: f64, cells_per_degree: u32) -> Cell {
    let cpd = cells_per_degree as f64;
    let x = (lon * cpd).floor() as i64;
    let y = (lat * cpd).floor() as i64;
    Cell::new(x, y, cells_per_degree)
}

/// Bounding ring of `cell`, closed back onto its south-west corner.
pub fn bounds_of(cell: &Cell) -> GeoPolygon {
    let (lon, lat, size) = (cell.lon(), cell.lat(), cell.size());
    GeoPolygon {
        ring: vec![
            [lon, lat],
            [lon, lat + size],
            [lon + size, lat + size],
            [lon + size, lat],
            [lon, lat],
        ],
    }
}
