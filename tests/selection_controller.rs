use std::sync::mpsc::Receiver;

use cellpick::events::{EventController, EventKind, MapInput};
use cellpick::sink::{FormCommand, LayerCommand};
use cellpick::{
    bounds_of, channel_form, channel_layer, Cell, Error, FixedViewport, FormState, GeoBounds,
    LayerState, PanelMode, ScreenPos, SelectionConfig, SelectionController, SelectionMode, Toggle,
};

/// Controller wired to channel sinks, with the receiving side mirrored into
/// plain state after every step.
struct Harness {
    ctrl: SelectionController,
    selection_rx: Receiver<LayerCommand>,
    hover_rx: Receiver<LayerCommand>,
    form_rx: Receiver<FormCommand>,
    selection: LayerState,
    hover: LayerState,
    form: FormState,
}

impl Harness {
    fn new() -> Self {
        let (sel, selection_rx) = channel_layer();
        let (hov, hover_rx) = channel_layer();
        let (form, form_rx) = channel_form();
        Self {
            ctrl: SelectionController::new(&SelectionConfig::default(), sel, hov, form),
            selection_rx,
            hover_rx,
            form_rx,
            selection: LayerState::default(),
            hover: LayerState::default(),
            form: FormState::default(),
        }
    }

    fn handle(&mut self, input: MapInput, viewport: &FixedViewport) {
        self.ctrl.handle(input, viewport);
        self.sync();
    }

    fn sync(&mut self) {
        self.selection.drain(&self.selection_rx);
        self.hover.drain(&self.hover_rx);
        self.form.drain(&self.form_rx);
    }
}

/// One degree square, 100×100 px.
fn one_degree_view() -> FixedViewport {
    FixedViewport::new(GeoBounds::new(-42.0, 10.0, -41.0, 11.0), [100.0, 100.0])
}

fn px(x: f32, y: f32) -> ScreenPos {
    ScreenPos { x, y }
}

#[test]
fn click_toggles_cell_and_publishes_token() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    assert_eq!(h.ctrl.mode(), SelectionMode::Selecting);
    assert_eq!(h.ctrl.density(), 4);
    assert_eq!(h.form.panel, PanelMode::Select);

    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    assert_eq!(h.form.token, "X41Y-165C4");
    assert_eq!(h.form.status, "1 cell selected.");
    assert_eq!(h.selection.geometries, vec![bounds_of(&Cell::new(41, -165, 4))]);

    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    assert_eq!(h.form.token, "");
    assert_eq!(h.form.status, "Select at least one cell from the map.");
    assert!(h.selection.geometries.is_empty());
}

#[test]
fn token_keeps_click_order() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(80.0, 80.0)), &view);
    h.handle(MapInput::Click(px(10.0, 10.0)), &view);
    h.handle(MapInput::Click(px(80.0, 10.0)), &view);
    assert_eq!(h.form.token, "X43Y-168C4_X40Y-165C4_X43Y-165C4");
    assert_eq!(h.form.status, "3 cells selected.");

    h.handle(MapInput::Click(px(10.0, 10.0)), &view);
    assert_eq!(h.form.token, "X43Y-168C4_X43Y-165C4");
    assert_eq!(h.selection.geometries.len(), 2);
}

#[test]
fn clicks_before_start_are_ignored() {
    let view = one_degree_view();
    let mut h = Harness::new();
    assert_eq!(h.ctrl.on_click(&view, px(25.0, 10.0)), None);
    assert!(h.ctrl.cells().is_empty());
}

#[test]
fn density_change_on_zoom_clears_selection() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    assert_eq!(h.ctrl.cells().len(), 1);

    let zoomed = FixedViewport::new(GeoBounds::new(-41.5, 10.0, -41.0, 10.5), [100.0, 100.0]);
    h.handle(MapInput::ZoomEnd, &zoomed);
    assert_eq!(h.ctrl.density(), 16);
    assert!(h.ctrl.cells().is_empty());
    assert_eq!(h.form.token, "");
    assert!(h.selection.geometries.is_empty());
}

#[test]
fn zoom_within_the_same_density_keeps_selection() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(25.0, 10.0)), &view);

    let wider = FixedViewport::new(GeoBounds::new(-42.5, 9.5, -41.0, 11.0), [100.0, 100.0]);
    h.handle(MapInput::ZoomEnd, &wider);
    assert_eq!(h.ctrl.density(), 4);
    assert_eq!(h.form.token, "X41Y-165C4");
}

#[test]
fn zoom_while_idle_does_not_touch_density() {
    let mut h = Harness::new();
    let zoomed = FixedViewport::new(GeoBounds::new(-41.5, 10.0, -41.0, 10.5), [100.0, 100.0]);
    h.handle(MapInput::ZoomEnd, &zoomed);
    assert_eq!(h.ctrl.density(), SelectionConfig::default().initial_density);
    assert!(h.form.deep_link.is_some());
}

#[test]
fn cancel_leaves_clicks_armed() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    h.handle(MapInput::Cancel, &view);

    assert_eq!(h.ctrl.mode(), SelectionMode::Idle);
    assert_eq!(h.form.panel, PanelMode::View);
    assert_eq!(h.form.token, "");
    assert!(!h.ctrl.is_hover_armed());
    assert!(h.ctrl.is_click_armed());

    // Clicks keep mutating the (cleared) selection after a cancel.
    assert_eq!(h.ctrl.on_click(&view, px(25.0, 10.0)), Some(Toggle::Added));
    h.sync();
    assert_eq!(h.form.token, "X41Y-165C4");
}

#[test]
fn reset_keeps_mode_and_density() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    h.handle(MapInput::Click(px(60.0, 10.0)), &view);
    h.handle(MapInput::Reset, &view);

    assert!(h.ctrl.is_selecting());
    assert_eq!(h.ctrl.density(), 4);
    assert_eq!(h.form.token, "");
    assert!(h.selection.geometries.is_empty());
}

#[test]
fn restart_clears_previous_selection() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    h.handle(MapInput::Start, &view);
    assert!(h.ctrl.cells().is_empty());
    assert_eq!(h.form.token, "");
}

#[test]
fn hover_highlights_one_cell() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Pause(px(25.0, 10.0)), &view);
    assert!(h.hover.geometries.is_empty(), "hover is inert before start");

    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Pause(px(25.0, 10.0)), &view);
    let cell = Cell::new(41, -165, 4);
    assert_eq!(h.ctrl.highlighted(), Some(cell));
    assert_eq!(h.hover.geometries, vec![bounds_of(&cell)]);

    h.ctrl.handle(MapInput::Pause(px(26.0, 11.0)), &view);
    assert!(h.hover_rx.try_recv().is_err(), "same cell is not redrawn");

    h.handle(MapInput::Pause(px(60.0, 10.0)), &view);
    assert_eq!(h.hover.geometries, vec![bounds_of(&Cell::new(42, -165, 4))]);

    h.handle(MapInput::Cancel, &view);
    assert!(h.hover.geometries.is_empty());
    assert_eq!(h.ctrl.highlighted(), None);
}

#[test]
fn hover_redraws_after_restart() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Pause(px(25.0, 10.0)), &view);
    h.handle(MapInput::Cancel, &view);
    h.handle(MapInput::Start, &view);
    h.handle(MapInput::Pause(px(25.0, 10.0)), &view);
    assert_eq!(h.hover.geometries, vec![bounds_of(&Cell::new(41, -165, 4))]);
}

#[test]
fn move_end_publishes_deep_link() {
    let view = one_degree_view();
    let mut h = Harness::new();
    h.handle(MapInput::MoveEnd, &view);
    assert_eq!(
        h.form.deep_link.as_deref(),
        Some("http://www.openstreetmap.org/index.html?minlon=10&maxlon=11&minlat=-42&maxlat=-41&box=yes")
    );
}

#[test]
fn every_mutation_requests_a_fresh_feature_count() {
    let view = one_degree_view();
    let mut h = Harness::new();
    let requests = h.ctrl.feature_counts().subscribe();

    h.handle(MapInput::Start, &view);
    assert!(requests.try_recv().is_err(), "empty selection is not counted");

    h.handle(MapInput::Click(px(25.0, 10.0)), &view);
    let first = requests.try_recv().unwrap();
    assert_eq!(first.token, "X41Y-165C4");

    h.handle(MapInput::Click(px(60.0, 10.0)), &view);
    let second = requests.try_recv().unwrap();
    assert_eq!(second.token, "X41Y-165C4_X42Y-165C4");

    let counts = h.ctrl.feature_counts().clone();
    assert!(!counts.respond(first.id, Ok("3 features".into())));
    assert!(counts.respond(second.id, Ok("7 features".into())));
    assert_eq!(counts.info().info.as_deref(), Some("7 features"));

    h.handle(MapInput::Reset, &view);
    assert_eq!(counts.info().info, None);
    assert!(!counts.is_pending());
    assert!(requests.try_recv().is_err());
}

#[test]
fn restore_requires_selecting_and_matching_density() {
    let view = one_degree_view();
    let mut h = Harness::new();
    assert!(matches!(h.ctrl.restore("X41Y-165C4"), Err(Error::NotSelecting)));

    h.handle(MapInput::Start, &view);
    assert!(matches!(
        h.ctrl.restore("X164Y-660C16"),
        Err(Error::DensityMismatch { token: 16, current: 4 })
    ));
    assert!(matches!(h.ctrl.restore("X1Y2"), Err(Error::MalformedCell(_))));

    h.ctrl.restore("X41Y-165C4_X42Y-165C4").unwrap();
    h.sync();
    assert_eq!(h.form.token, "X41Y-165C4_X42Y-165C4");
    assert_eq!(h.form.status, "2 cells selected.");
    assert_eq!(h.selection.geometries.len(), 2);
}

#[test]
fn events_describe_each_step() {
    let view = one_degree_view();
    let events = EventController::new();
    let rx = events.subscribe_all();
    let (sel, _a) = channel_layer();
    let (hov, _b) = channel_layer();
    let (form, _c) = channel_form();
    let mut ctrl =
        SelectionController::new(&SelectionConfig::default(), sel, hov, form).with_events(events);

    ctrl.handle(MapInput::Start, &view);
    let started = rx.try_recv().unwrap();
    assert!(started.kinds.contains(EventKind::MODE_STARTED | EventKind::DENSITY_CHANGED));
    assert_eq!(started.density, 4);

    ctrl.handle(MapInput::Click(px(25.0, 10.0)), &view);
    let added = rx.try_recv().unwrap();
    assert!(added.kinds.contains(EventKind::CELL_ADDED | EventKind::FEATURE_COUNT_REQUESTED));
    assert_eq!(added.cell, Some(Cell::new(41, -165, 4)));
    assert_eq!(added.token, "X41Y-165C4");

    ctrl.handle(MapInput::MoveEnd, &view);
    let moved = rx.try_recv().unwrap();
    assert_eq!(moved.kinds, EventKind::VIEW_CHANGED);
    assert!(moved.deep_link.is_some());

    ctrl.handle(MapInput::Cancel, &view);
    let stopped = rx.try_recv().unwrap();
    assert!(stopped.kinds.contains(EventKind::MODE_STOPPED));
    assert_eq!(stopped.token, "");
}
