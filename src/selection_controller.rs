//! The selection session state machine.
//!
//! ```text
//!            start                     click   -> toggle cell
//!   Idle ────────────▶ Selecting ◀──┐  pause   -> move hover highlight
//!     ▲                   │   │      │  zoomend -> recompute density,
//!     └──── cancel ───────┘   └ reset┘            clear on change
//! ```
//!
//! All session state lives on the [`SelectionController`] instance; it owns
//! the [`SelectionSet`] and both geometry layers exclusively. Every mutation
//! synchronously redraws the selection layer, rewrites the form token and
//! count message, invalidates the previous feature count and (when the
//! selection is non-empty) requests a new one.

use crate::config::SelectionConfig;
use crate::controllers::FeatureCountController;
use crate::data::cell::Cell;
use crate::data::deep_link::deep_link;
use crate::data::density::DensityPolicy;
use crate::data::grid::{bounds_of, cell_at};
use crate::data::selection::{SelectionSet, Toggle};
use crate::error::{Error, Result};
use crate::events::{EventController, EventKind, MapInput, SelectionEvent};
use crate::sink::{GeometryLayer, HostForm, PanelMode};
use crate::viewport::{ScreenPos, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    Idle,
    Selecting,
}

pub struct SelectionController {
    mode: SelectionMode,
    density: u32,
    policy: DensityPolicy,
    deep_link_base: String,
    cells: SelectionSet,
    highlighted: Option<Cell>,
    click_armed: bool,
    hover_armed: bool,
    selection_layer: Box<dyn GeometryLayer>,
    hover_layer: Box<dyn GeometryLayer>,
    form: Box<dyn HostForm>,
    feature_counts: FeatureCountController,
    events: Option<EventController>,
}

impl SelectionController {
    pub fn new(
        config: &SelectionConfig,
        selection_layer: impl GeometryLayer + 'static,
        hover_layer: impl GeometryLayer + 'static,
        form: impl HostForm + 'static,
    ) -> Self {
        Self {
            mode: SelectionMode::Idle,
            density: config.initial_density.max(1),
            policy: config.density_policy(),
            deep_link_base: config.deep_link_base.clone(),
            cells: SelectionSet::new(),
            highlighted: None,
            click_armed: false,
            hover_armed: false,
            selection_layer: Box::new(selection_layer),
            hover_layer: Box::new(hover_layer),
            form: Box::new(form),
            feature_counts: FeatureCountController::new(),
            events: None,
        }
    }

    /// Use a shared feature count handle instead of a private one.
    pub fn with_feature_counts(mut self, feature_counts: FeatureCountController) -> Self {
        self.feature_counts = feature_counts;
        self
    }

    /// Emit [`SelectionEvent`]s to `events`.
    pub fn with_events(mut self, events: EventController) -> Self {
        self.events = Some(events);
        self
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selecting(&self) -> bool {
        self.mode == SelectionMode::Selecting
    }

    /// Current cells-per-degree.
    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn cells(&self) -> &SelectionSet {
        &self.cells
    }

    pub fn token(&self) -> String {
        self.cells.serialize()
    }

    pub fn highlighted(&self) -> Option<Cell> {
        self.highlighted
    }

    /// Whether pointer clicks toggle cells.
    ///
    /// Cancelling a session disarms hover but leaves clicks armed, so clicks
    /// after a cancel still mutate the (cleared) selection. This mirrors the
    /// long-standing behavior of the selection form and is kept deliberately;
    /// see DESIGN.md.
    pub fn is_click_armed(&self) -> bool {
        self.click_armed
    }

    pub fn is_hover_armed(&self) -> bool {
        self.hover_armed
    }

    pub fn feature_counts(&self) -> &FeatureCountController {
        &self.feature_counts
    }

    /// Dispatch a map input.
    pub fn handle(&mut self, input: MapInput, viewport: &dyn Viewport) {
        match input {
            MapInput::Click(pixel) => {
                self.on_click(viewport, pixel);
            }
            MapInput::Pause(pixel) => self.on_pause(viewport, pixel),
            MapInput::ZoomEnd => self.on_zoom_end(viewport),
            MapInput::MoveEnd => self.on_move_end(viewport),
            MapInput::Start => self.start_selecting(viewport),
            MapInput::Cancel => self.stop_selecting(),
            MapInput::Reset => self.reset(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session transitions
    // ─────────────────────────────────────────────────────────────────────

    /// Enter selection mode: empty the selection, pick the density for the
    /// current viewport and arm click and hover handling.
    pub fn start_selecting(&mut self, viewport: &dyn Viewport) {
        self.mode = SelectionMode::Selecting;
        self.clear_selection();
        let mut kinds = EventKind::MODE_STARTED | EventKind::SELECTION_CLEARED;
        if self.update_density(viewport) {
            kinds |= EventKind::DENSITY_CHANGED;
        }
        self.click_armed = true;
        self.hover_armed = true;
        self.form.set_panel_mode(PanelMode::Select);
        tracing::info!(density = self.density, "cell selection started");
        self.emit(SelectionEvent::new(kinds, self.token(), self.density));
    }

    /// Leave selection mode (cancel).
    pub fn stop_selecting(&mut self) {
        self.mode = SelectionMode::Idle;
        self.hover_armed = false;
        self.hover_layer.clear();
        self.highlighted = None;
        self.clear_selection();
        self.form.set_panel_mode(PanelMode::View);
        tracing::info!("cell selection cancelled");
        self.emit(SelectionEvent::new(
            EventKind::MODE_STOPPED | EventKind::SELECTION_CLEARED,
            self.token(),
            self.density,
        ));
    }

    /// Empty the selection, keeping mode and density.
    pub fn reset(&mut self) {
        self.clear_selection();
        tracing::debug!("cell selection reset");
        self.emit(SelectionEvent::new(
            EventKind::SELECTION_CLEARED,
            self.token(),
            self.density,
        ));
    }

    /// Replace the selection with the cells of a saved token.
    ///
    /// Only valid while selecting, and only for tokens at the current density:
    /// cells at another density have no mapping onto the current grid.
    pub fn restore(&mut self, token: &str) -> Result<()> {
        if !self.is_selecting() {
            return Err(Error::NotSelecting);
        }
        let restored = SelectionSet::parse(token)?;
        if let Some(density) = restored.density() {
            if density != self.density {
                tracing::warn!(
                    token_density = density,
                    current = self.density,
                    "refusing to restore selection at another density"
                );
                return Err(Error::DensityMismatch {
                    token: density,
                    current: self.density,
                });
            }
        }
        self.cells = restored;
        self.publish_selection();
        tracing::info!(cells = self.cells.len(), "cell selection restored");
        let mut kinds = EventKind::SELECTION_RESTORED;
        if !self.cells.is_empty() {
            kinds |= EventKind::FEATURE_COUNT_REQUESTED;
        }
        self.emit(SelectionEvent::new(kinds, self.token(), self.density));
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Map events
    // ─────────────────────────────────────────────────────────────────────

    pub fn on_zoom_end(&mut self, viewport: &dyn Viewport) {
        if self.is_selecting() {
            let had_cells = !self.cells.is_empty();
            if self.update_density(viewport) {
                let mut kinds = EventKind::DENSITY_CHANGED;
                if had_cells {
                    kinds |= EventKind::SELECTION_CLEARED;
                }
                self.emit(SelectionEvent::new(kinds, self.token(), self.density));
            }
        }
        self.publish_deep_link(viewport);
    }

    pub fn on_move_end(&mut self, viewport: &dyn Viewport) {
        self.publish_deep_link(viewport);
    }

    /// Toggle the cell under `pixel`. Returns what happened, or `None` when
    /// click handling is not armed.
    pub fn on_click(&mut self, viewport: &dyn Viewport, pixel: ScreenPos) -> Option<Toggle> {
        if !self.click_armed {
            return None;
        }
        let pos = viewport.pixel_to_geographic(pixel);
        let cell = cell_at(pos.lon, pos.lat, self.density);
        let op = self.cells.toggle(cell);
        tracing::debug!(%cell, ?op, selected = self.cells.len(), "cell toggled");
        self.publish_selection();

        let mut kinds = match op {
            Toggle::Added => EventKind::CELL_ADDED,
            Toggle::Removed => EventKind::CELL_REMOVED,
        };
        if !self.cells.is_empty() {
            kinds |= EventKind::FEATURE_COUNT_REQUESTED;
        }
        self.emit(SelectionEvent::new(kinds, self.token(), self.density).with_cell(cell));
        Some(op)
    }

    /// Move the hover highlight to the cell under `pixel`.
    pub fn on_pause(&mut self, viewport: &dyn Viewport, pixel: ScreenPos) {
        if !self.hover_armed {
            return;
        }
        let pos = viewport.pixel_to_geographic(pixel);
        let cell = cell_at(pos.lon, pos.lat, self.density);
        if self.highlighted != Some(cell) {
            self.hover_layer.show_geometries(vec![bounds_of(&cell)]);
            self.highlighted = Some(cell);
            self.emit(
                SelectionEvent::new(EventKind::HOVER_CHANGED, self.token(), self.density)
                    .with_cell(cell),
            );
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────

    /// Recompute the density; clears the selection when it changed.
    fn update_density(&mut self, viewport: &dyn Viewport) -> bool {
        let bounds = viewport.visible_bounds();
        let density = self.policy.compute_density(&bounds);
        let changed = density != self.density;
        if changed {
            tracing::info!(from = self.density, to = density, "cell density changed");
            self.clear_selection();
        }
        self.density = density;
        changed
    }

    fn clear_selection(&mut self) {
        self.cells.clear();
        self.publish_selection();
    }

    /// Push the selection to the layer and the form.
    fn publish_selection(&mut self) {
        if self.cells.is_empty() {
            self.selection_layer.clear();
        } else {
            self.selection_layer.show_geometries(self.cells.geometries());
        }
        let token = self.cells.serialize();
        self.form.set_token(&token);
        self.form.set_status(&self.cells.status_message());
        self.feature_counts.invalidate();
        if !self.cells.is_empty() {
            self.feature_counts.request(&token);
        }
    }

    fn publish_deep_link(&mut self, viewport: &dyn Viewport) {
        let url = deep_link(&self.deep_link_base, &viewport.visible_bounds());
        self.form.set_deep_link(&url);
        if let Some(events) = &self.events {
            let mut evt = SelectionEvent::new(EventKind::VIEW_CHANGED, self.token(), self.density);
            evt.deep_link = Some(url);
            events.emit(evt);
        }
    }

    fn emit(&self, event: SelectionEvent) {
        if let Some(events) = &self.events {
            events.emit(event);
        }
    }
}
