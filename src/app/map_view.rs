//! The map widget: an egui_plot in lon/lat space acting as the viewport
//! adapter, plus the bookkeeping that turns raw pointer/bounds changes into
//! [`MapInput`]s (click, hover pause, zoom end, move end).

use egui::Color32;
use egui_plot::{Plot, PlotTransform, Polygon};

use crate::data::density::GeoBounds;
use crate::data::grid::GeoPolygon;
use crate::events::MapInput;
use crate::viewport::{GeoPos, ScreenPos, Viewport};

use super::CellPickApp;

const SELECTION_FILL: Color32 = Color32::from_rgba_premultiplied(128, 60, 0, 128);
const HOVER_STROKE: Color32 = Color32::from_rgb(0xff, 0x77, 0x00);

// ─────────────────────────────────────────────────────────────────────────────
// Viewport adapter
// ─────────────────────────────────────────────────────────────────────────────

/// Viewport backed by the plot transform of the last rendered frame.
/// Pixels are egui screen coordinates.
#[derive(Clone, Copy)]
pub struct PlotViewport {
    transform: PlotTransform,
}

impl PlotViewport {
    pub fn new(transform: PlotTransform) -> Self {
        Self { transform }
    }
}

impl Viewport for PlotViewport {
    fn visible_bounds(&self) -> GeoBounds {
        let bounds = self.transform.bounds();
        let rx = bounds.range_x();
        let ry = bounds.range_y();
        GeoBounds::new(*ry.start(), *rx.start(), *ry.end(), *rx.end())
    }

    fn pixel_to_geographic(&self, pixel: ScreenPos) -> GeoPos {
        let p = self.transform.value_from_position(egui::pos2(pixel.x, pixel.y));
        GeoPos { lon: p.x, lat: p.y }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Input trackers
// ─────────────────────────────────────────────────────────────────────────────

/// Detects the end of zoom and pan gestures from per-frame bounds.
///
/// Bounds are "settled" once they are unchanged for a frame with no pointer
/// interaction. A settled change of size is a zoom end, a settled change of
/// position only is a move end. The first settled bounds count as a move end
/// so the deep link is published on startup.
#[derive(Debug, Default)]
pub struct ViewTracker {
    last_frame: Option<GeoBounds>,
    settled: Option<GeoBounds>,
}

impl ViewTracker {
    pub fn observe(&mut self, bounds: GeoBounds, interacting: bool) -> Option<MapInput> {
        let stable = self.last_frame == Some(bounds);
        self.last_frame = Some(bounds);
        if interacting || !stable || self.settled == Some(bounds) {
            return None;
        }
        let previous = self.settled.replace(bounds);
        match previous {
            Some(prev) if !same_size(&prev, &bounds) => Some(MapInput::ZoomEnd),
            _ => Some(MapInput::MoveEnd),
        }
    }
}

fn same_size(a: &GeoBounds, b: &GeoBounds) -> bool {
    let close = |x: f64, y: f64| (x - y).abs() <= 1e-9 * x.abs().max(y.abs()).max(1.0);
    close(a.width(), b.width()) && close(a.height(), b.height())
}

/// Emits a single `Pause` once the pointer has rested for `delay_secs`.
#[derive(Debug)]
pub struct HoverTracker {
    delay_secs: f64,
    last: Option<(ScreenPos, f64)>,
    fired: bool,
}

impl HoverTracker {
    pub fn new(delay_secs: f64) -> Self {
        Self {
            delay_secs,
            last: None,
            fired: false,
        }
    }

    /// Feed the hover position (if any) at time `now` (seconds).
    pub fn observe(&mut self, pos: Option<ScreenPos>, now: f64) -> Option<MapInput> {
        let Some(pos) = pos else {
            self.last = None;
            return None;
        };
        match self.last {
            Some((prev, since)) if (prev.x - pos.x).abs() < 0.5 && (prev.y - pos.y).abs() < 0.5 => {
                if !self.fired && now - since >= self.delay_secs {
                    self.fired = true;
                    return Some(MapInput::Pause(pos));
                }
                None
            }
            _ => {
                self.last = Some((pos, now));
                self.fired = false;
                None
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────────────────────────────────────

fn polygon_points(poly: &GeoPolygon) -> Vec<[f64; 2]> {
    poly.vertices().to_vec()
}

impl CellPickApp {
    /// Draw the map, then turn this frame's pointer activity into inputs.
    pub(super) fn render_map(&mut self, ui: &mut egui::Ui) -> Vec<MapInput> {
        let pending_bounds = self.pending_bounds.take();
        let selection = self.selection_layer.geometries.clone();
        let hover = self.hover_layer.geometries.clone();

        let plot = Plot::new("cellpick_map")
            .data_aspect(1.0)
            .allow_double_click_reset(false)
            .x_axis_label("longitude")
            .y_axis_label("latitude");

        let resp = plot.show(ui, |plot_ui| {
            if let Some(b) = pending_bounds {
                plot_ui.set_plot_bounds_x(b.west..=b.east);
                plot_ui.set_plot_bounds_y(b.south..=b.north);
            }
            for (i, poly) in selection.iter().enumerate() {
                plot_ui.polygon(
                    Polygon::new(format!("selected_{i}"), polygon_points(poly))
                        .fill_color(SELECTION_FILL)
                        .stroke(egui::Stroke::NONE),
                );
            }
            for poly in &hover {
                plot_ui.polygon(
                    Polygon::new("hover", polygon_points(poly))
                        .fill_color(Color32::TRANSPARENT)
                        .stroke(egui::Stroke::new(2.0, HOVER_STROKE)),
                );
            }
        });

        self.viewport = Some(PlotViewport::new(resp.transform));
        let mut inputs = Vec::new();

        let interacting = resp.response.dragged()
            || ui.ctx().input(|i| {
                i.pointer.any_down() || i.raw_scroll_delta != egui::Vec2::ZERO
            });
        let bounds = PlotViewport::new(resp.transform).visible_bounds();
        if let Some(input) = self.view_tracker.observe(bounds, interacting) {
            inputs.push(input);
        }

        if resp.response.clicked() {
            if let Some(p) = resp.response.interact_pointer_pos() {
                inputs.push(MapInput::Click(ScreenPos { x: p.x, y: p.y }));
            }
        }

        let now = ui.ctx().input(|i| i.time);
        let hover_pos = resp
            .response
            .hover_pos()
            .map(|p| ScreenPos { x: p.x, y: p.y });
        if let Some(input) = self.hover_tracker.observe(hover_pos, now) {
            inputs.push(input);
        }

        inputs
    }
}
