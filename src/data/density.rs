//! Viewport bounds and the grid density policy.

use serde::{Deserialize, Serialize};

/// Largest density handed out, an even power of two so the factor-of-four
/// stepping still holds right up to the cap.
pub const MAX_CELLS_PER_DEGREE: u32 = 1 << 30;

/// Visible geographic extent in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Build from `[west, south, east, north]`, the ordering used by bbox arrays.
    pub fn from_bbox(bbox: [f64; 4]) -> Self {
        Self::new(bbox[1], bbox[0], bbox[3], bbox[2])
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// The smaller of width and height.
    pub fn min_span(&self) -> f64 {
        self.height().min(self.width())
    }

    pub fn center(&self) -> [f64; 2] {
        [
            (self.west + self.east) / 2.0,
            (self.south + self.north) / 2.0,
        ]
    }
}

/// Picks the cells-per-degree for a viewport.
///
/// The target is at least `min_cells_across` cells along the smaller viewport
/// dimension, rounded up to the next *even* power of two. Densities therefore
/// move in factor-of-four steps, so small zoom jitters do not flip the grid
/// (and wipe the selection).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityPolicy {
    pub min_cells_across: f64,
}

impl Default for DensityPolicy {
    fn default() -> Self {
        Self {
            min_cells_across: 4.0,
        }
    }
}

impl DensityPolicy {
    pub fn new(min_cells_across: f64) -> Self {
        Self { min_cells_across }
    }

    /// Density for `bounds`. Pure: identical input gives identical output.
    ///
    /// Degenerate viewports (zero, negative or non-finite span) get
    /// [`MAX_CELLS_PER_DEGREE`].
    pub fn compute_density(&self, bounds: &GeoBounds) -> u32 {
        let min_span = bounds.min_span();
        if !(min_span > 0.0 && min_span.is_finite()) {
            return MAX_CELLS_PER_DEGREE;
        }
        let target = self.min_cells_across / min_span;
        let power = target.log2();
        if power.is_nan() {
            return 1;
        }
        let rounded = (power / 2.0).ceil() * 2.0;
        if rounded <= 0.0 {
            1
        } else if rounded >= MAX_CELLS_PER_DEGREE.trailing_zeros() as f64 {
            MAX_CELLS_PER_DEGREE
        } else {
            1u32 << (rounded as u32)
        }
    }
}

/// [`DensityPolicy::compute_density`] with the default four-cell target.
pub fn compute_density(bounds: &GeoBounds) -> u32 {
    DensityPolicy::default().compute_density(bounds)
}
