//! Native map application for cell selection.
//!
//! | Sub-module     | Responsibility |
//! | -------------- | -------------- |
//! | [`map_view`]   | Plot-backed viewport adapter, gesture tracking, polygon rendering |
//! | [`layout`]     | Top form panel: mode buttons, token, count message, deep link, sessions |
//! | [`coverage`]   | Local feature-count responder used by the standalone binary |
//! | [`run`]        | [`run_cellpick()`] entry point |

pub mod coverage;
mod layout;
pub mod map_view;
mod run;

pub use run::run_cellpick;

use std::sync::mpsc::Receiver;
use std::time::Duration;

use eframe::egui;

use crate::config::CellPickConfig;
use crate::controllers::FeatureCountController;
use crate::data::density::GeoBounds;
use crate::events::MapInput;
use crate::persistence::SessionStateSerde;
use crate::selection_controller::SelectionController;
use crate::sink::{
    channel_form, channel_layer, FormCommand, FormState, LayerCommand, LayerState,
};

use map_view::{HoverTracker, PlotViewport, ViewTracker};

/// eframe application hosting the map and the selection form.
pub struct CellPickApp {
    controller: SelectionController,
    feature_counts: FeatureCountController,

    selection_rx: Receiver<LayerCommand>,
    hover_rx: Receiver<LayerCommand>,
    form_rx: Receiver<FormCommand>,
    selection_layer: LayerState,
    hover_layer: LayerState,
    form: FormState,

    /// Inputs raised by the form this frame, handled after the map is drawn.
    pending_inputs: Vec<MapInput>,
    /// Bounds to apply to the plot on the next frame.
    pending_bounds: Option<GeoBounds>,
    /// Session to restore once the map has settled.
    pending_restore: Option<SessionStateSerde>,

    viewport: Option<PlotViewport>,
    view_tracker: ViewTracker,
    hover_tracker: HoverTracker,
    hover_pause: Duration,
    /// Last error or confirmation shown under the form.
    notice: Option<String>,
}

impl CellPickApp {
    pub fn new(mut cfg: CellPickConfig) -> Self {
        let (selection_sink, selection_rx) = channel_layer();
        let (hover_sink, hover_rx) = channel_layer();
        let (form_sink, form_rx) = channel_form();
        let feature_counts = cfg.feature_count_controller.take().unwrap_or_default();

        let mut controller =
            SelectionController::new(&cfg.selection, selection_sink, hover_sink, form_sink)
                .with_feature_counts(feature_counts.clone());
        if let Some(events) = cfg.event_controller.take() {
            controller = controller.with_events(events);
        }

        let hover_pause = Duration::from_millis(cfg.selection.hover_pause_ms);
        Self {
            controller,
            feature_counts,
            selection_rx,
            hover_rx,
            form_rx,
            selection_layer: LayerState::default(),
            hover_layer: LayerState::default(),
            form: FormState::default(),
            pending_inputs: Vec::new(),
            pending_bounds: Some(
                cfg.initial_session
                    .as_ref()
                    .map_or_else(|| cfg.selection.bounds(), |s| s.bounds),
            ),
            pending_restore: cfg.initial_session.take(),
            viewport: None,
            view_tracker: ViewTracker::default(),
            hover_tracker: HoverTracker::new(hover_pause.as_secs_f64()),
            hover_pause,
            notice: None,
        }
    }

    pub fn controller(&self) -> &SelectionController {
        &self.controller
    }

    /// Bring the map back to the session's bounds and restore its selection
    /// once it settles.
    pub(crate) fn schedule_restore(&mut self, session: SessionStateSerde) {
        self.pending_bounds = Some(session.bounds);
        self.pending_restore = Some(session);
        self.view_tracker = ViewTracker::default();
    }

    /// Pull everything the controller published into the render state.
    /// Returns true when something changed.
    fn drain_sinks(&mut self) -> bool {
        let a = self.selection_layer.drain(&self.selection_rx);
        let b = self.hover_layer.drain(&self.hover_rx);
        let c = self.form.drain(&self.form_rx);
        a || b || c
    }

    fn dispatch(&mut self, inputs: Vec<MapInput>) {
        let Some(viewport) = self.viewport else {
            return;
        };
        let settled = inputs
            .iter()
            .any(|i| matches!(i, MapInput::ZoomEnd | MapInput::MoveEnd));
        for input in inputs {
            self.controller.handle(input, &viewport);
        }
        if settled && self.pending_bounds.is_none() {
            if let Some(session) = self.pending_restore.take() {
                self.apply_restore(&viewport, &session);
            }
        }
    }

    /// Restarting picks the density for the restored bounds.
    fn apply_restore(&mut self, viewport: &PlotViewport, session: &SessionStateSerde) {
        self.controller.start_selecting(viewport);
        match session.restore_into(&mut self.controller) {
            Ok(()) => self.notice = None,
            Err(err) => {
                tracing::error!(%err, "failed to restore selection");
                self.notice = Some(format!("Could not restore selection: {err}"));
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// eframe integration
// ─────────────────────────────────────────────────────────────────────────────

impl eframe::App for CellPickApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_sinks();

        egui::TopBottomPanel::top("cellpick_form").show(ctx, |ui| {
            self.render_form(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let mut inputs = std::mem::take(&mut self.pending_inputs);
            inputs.extend(self.render_map(ui));
            self.dispatch(inputs);
        });

        if self.drain_sinks() {
            ctx.request_repaint();
        }
        // Keep frames coming so hover pauses and settled bounds are noticed.
        ctx.request_repaint_after(self.hover_pause.max(Duration::from_millis(16)));
    }
}
