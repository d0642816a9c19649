//! The ordered toggle-selection of cells and its token form.

use std::fmt;

use super::cell::Cell;
use super::grid::{bounds_of, GeoPolygon};
use crate::error::{Error, Result};

/// Separator between canonical cell forms inside a token.
pub const TOKEN_SEPARATOR: char = '_';

/// What [`SelectionSet::toggle`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
}

/// Ordered, duplicate-free collection of cells.
///
/// Insertion order is the click order; it drives rendering order and the
/// order of cells inside the serialized token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    cells: Vec<Cell>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of `cell`, if selected. Linear scan.
    pub fn contains(&self, cell: &Cell) -> Option<usize> {
        self.cells.iter().position(|c| c == cell)
    }

    /// Append `cell` if absent, otherwise remove it.
    pub fn toggle(&mut self, cell: Cell) -> Toggle {
        match self.contains(&cell) {
            Some(idx) => {
                self.cells.remove(idx);
                Toggle::Removed
            }
            None => {
                self.cells.push(cell);
                Toggle::Added
            }
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    pub fn as_slice(&self) -> &[Cell] {
        &self.cells
    }

    /// Density shared by the selected cells, `None` when empty.
    pub fn density(&self) -> Option<u32> {
        self.cells.first().map(Cell::cells_per_degree)
    }

    /// Canonical forms joined by `_`; empty string for an empty selection.
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// Inverse of [`serialize`](Self::serialize).
    ///
    /// An empty token is an empty selection. Every part must be a canonical
    /// cell; duplicates and mixed densities are rejected.
    pub fn parse(token: &str) -> Result<Self> {
        let mut set = Self::new();
        if token.is_empty() {
            return Ok(set);
        }
        for part in token.split(TOKEN_SEPARATOR) {
            let cell: Cell = part.parse()?;
            if let Some(first) = set.density() {
                if first != cell.cells_per_degree() {
                    return Err(Error::MixedDensity {
                        first,
                        other: cell.cells_per_degree(),
                    });
                }
            }
            if set.contains(&cell).is_some() {
                return Err(Error::DuplicateCell(cell));
            }
            set.cells.push(cell);
        }
        Ok(set)
    }

    /// Bounding polygons of every selected cell, in selection order.
    pub fn geometries(&self) -> Vec<GeoPolygon> {
        self.cells.iter().map(bounds_of).collect()
    }

    /// Count message shown next to the form.
    pub fn status_message(&self) -> String {
        match self.cells.len() {
            0 => "Select at least one cell from the map.".to_string(),
            1 => "1 cell selected.".to_string(),
            n => format!("{n} cells selected."),
        }
    }
}

impl fmt::Display for SelectionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, "{TOKEN_SEPARATOR}")?;
            }
            write!(f, "{cell}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SelectionSet {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}
