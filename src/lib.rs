//! Cellpick crate root: re-exports and module wiring.
//!
//! An interactive grid-cell selector over a lon/lat map, built on
//! egui/eframe. The engine is independent of the UI:
//! - `data`: cells, grid geometry, density policy, the selection set, deep links
//! - `selection_controller`: the Idle/Selecting session state machine
//! - `viewport`: the read-only viewport contract the engine consumes
//! - `sink`: geometry layer and host form contracts, with channel-backed sinks
//! - `controllers`: feature count requests with stale-response suppression
//! - `events`: observable selection events
//! - `config`: YAML/JSON engine settings and window configuration
//! - `persistence`: JSON session files
//! - `app`: the eframe map application and `run_cellpick`

pub mod app;
pub mod config;
pub mod controllers;
pub mod data;
pub mod error;
pub mod events;
pub mod persistence;
pub mod selection_controller;
pub mod sink;
pub mod viewport;

// Public re-exports for a compact external API
pub use app::{run_cellpick, CellPickApp};
pub use config::{CellPickConfig, SelectionConfig};
pub use controllers::{FeatureCountController, FeatureCountInfo, FeatureCountRequest};
pub use data::cell::Cell;
pub use data::deep_link::deep_link;
pub use data::density::{compute_density, DensityPolicy, GeoBounds, MAX_CELLS_PER_DEGREE};
pub use data::grid::{bounds_of, cell_at, GeoPolygon};
pub use data::selection::{SelectionSet, Toggle};
pub use error::{Error, Result};
pub use events::{EventController, EventFilter, EventKind, MapInput, SelectionEvent};
pub use selection_controller::{SelectionController, SelectionMode};
pub use sink::{channel_form, channel_layer, FormState, GeometryLayer, HostForm, LayerState, PanelMode};
pub use viewport::{FixedViewport, GeoPos, ScreenPos, Viewport};
