//! Viewport adapter contract between the map widget and the selection engine.
//!
//! The engine only ever *reads* the viewport: the visible bounds and the
//! geographic position under a pointer pixel.

use crate::data::density::GeoBounds;

/// Pixel coordinates in the map widget's coordinate space, y growing downwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPos {
    pub lon: f64,
    pub lat: f64,
}

/// Supplies visible bounds and pixel → geographic conversion.
pub trait Viewport {
    fn visible_bounds(&self) -> GeoBounds;
    fn pixel_to_geographic(&self, pixel: ScreenPos) -> GeoPos;
}

/// A viewport with fixed bounds mapped linearly onto a pixel rectangle.
///
/// Used for headless replay and tests; the map view has its own adapter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedViewport {
    pub bounds: GeoBounds,
    /// Widget size in pixels (`[width, height]`).
    pub size_px: [f32; 2],
}

impl FixedViewport {
    pub fn new(bounds: GeoBounds, size_px: [f32; 2]) -> Self {
        Self { bounds, size_px }
    }

    /// Pixel position of a geographic coordinate (inverse of the adapter).
    pub fn geographic_to_pixel(&self, pos: GeoPos) -> ScreenPos {
        let b = &self.bounds;
        let fx = (pos.lon - b.west) / b.width();
        let fy = (b.north - pos.lat) / b.height();
        ScreenPos {
            x: (fx * self.size_px[0] as f64) as f32,
            y: (fy * self.size_px[1] as f64) as f32,
        }
    }
}

impl Viewport for FixedViewport {
    fn visible_bounds(&self) -> GeoBounds {
        self.bounds
    }

    fn pixel_to_geographic(&self, pixel: ScreenPos) -> GeoPos {
        let b = &self.bounds;
        let fx = pixel.x as f64 / self.size_px[0] as f64;
        let fy = pixel.y as f64 / self.size_px[1] as f64;
        GeoPos {
            lon: b.west + fx * b.width(),
            lat: b.north - fy * b.height(),
        }
    }
}
