//! Grid cell value type and its canonical string form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One grid square at a specific density.
///
/// A cell is identified by its integer grid indices together with the density
/// (cells per degree) it was created at. Two cells are equal only when all
/// three match, so cells from different densities never compare equal even
/// when they cover the same ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    x: i64,
    y: i64,
    cells_per_degree: u32,
}

impl Cell {
    /// Build a cell from grid indices.
    ///
    /// # Panics
    /// Panics if `cells_per_degree` is zero.
    pub fn new(x: i64, y: i64, cells_per_degree: u32) -> Self {
        assert!(cells_per_degree > 0, "cell density must be positive");
        Self {
            x,
            y,
            cells_per_degree,
        }
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    pub fn y(&self) -> i64 {
        self.y
    }

    pub fn cells_per_degree(&self) -> u32 {
        self.cells_per_degree
    }

    /// Longitude of the west edge.
    pub fn lon(&self) -> f64 {
        self.x as f64 / self.cells_per_degree as f64
    }

    /// Latitude of the south edge.
    pub fn lat(&self) -> f64 {
        self.y as f64 / self.cells_per_degree as f64
    }

    /// Edge length in degrees.
    pub fn size(&self) -> f64 {
        1.0 / self.cells_per_degree as f64
    }

    /// Human readable summary: `"{lon}, {lat}, {size} ({cpd})."`.
    pub fn description(&self) -> String {
        format!(
            "{}, {}, {} ({}).",
            self.lon(),
            self.lat(),
            self.size(),
            self.cells_per_degree
        )
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "X{}Y{}C{}", self.x, self.y, self.cells_per_degree)
    }
}

impl FromStr for Cell {
    type Err = Error;

    /// Parse the canonical `X{x}Y{y}C{cpd}` form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || Error::MalformedCell(s.to_string());

        let rest = s.strip_prefix('X').ok_or_else(malformed)?;
        let (x, rest) = rest.split_once('Y').ok_or_else(malformed)?;
        let (y, cpd) = rest.split_once('C').ok_or_else(malformed)?;

        let index = |part: &str| -> Result<i64, Error> {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit() || c == '-') {
                return Err(malformed());
            }
            part.parse().map_err(|_| malformed())
        };
        let x = index(x)?;
        let y = index(y)?;

        if cpd.is_empty() || !cpd.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let cells_per_degree: u32 = cpd.parse().map_err(|_| malformed())?;
        if cells_per_degree == 0 {
            return Err(malformed());
        }

        Ok(Self::new(x, y, cells_per_degree))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_uses_plain_integers() {
        assert_eq!(Cell::new(41, -165, 4).to_string(), "X41Y-165C4");
        assert_eq!(Cell::new(0, 0, 1).to_string(), "X0Y0C1");
    }

    #[test]
    fn derived_geometry() {
        let c = Cell::new(41, -165, 4);
        assert_eq!(c.lon(), 10.25);
        assert_eq!(c.lat(), -41.25);
        assert_eq!(c.size(), 0.25);
        assert_eq!(c.description(), "10.25, -41.25, 0.25 (4).");
    }

    #[test]
    fn parses_canonical_form() {
        let c: Cell = "X41Y-165C4".parse().unwrap();
        assert_eq!(c, Cell::new(41, -165, 4));
    }

    #[test]
    fn rejects_malformed_forms() {
        for bad in ["", "X1Y2", "Y1X2C3", "X1Y2C0", "X1Y2C-4", "X+1Y2C4", "XaY2C4", "X1Y2C4 ", "X1-2Y2C4"] {
            assert!(bad.parse::<Cell>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn densities_partition_identity() {
        assert_ne!(Cell::new(1, 1, 4), Cell::new(4, 4, 16));
    }
}
