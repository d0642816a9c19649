//! Configuration for the selection engine and the map view.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controllers::FeatureCountController;
use crate::data::deep_link::DEFAULT_DEEP_LINK_BASE;
use crate::data::density::{DensityPolicy, GeoBounds};
use crate::error::Result;
use crate::events::EventController;
use crate::persistence::SessionStateSerde;

// ─────────────────────────────────────────────────────────────────────────────
// Engine settings
// ─────────────────────────────────────────────────────────────────────────────

/// Engine knobs, loadable from YAML or JSON. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Density used before the first recalculation.
    pub initial_density: u32,
    /// Minimum number of cells across the smaller viewport dimension.
    pub min_cells_across: f64,
    /// Base URL of the "view in OpenStreetMap" link.
    pub deep_link_base: String,
    /// How long the pointer must rest before the hover highlight moves.
    pub hover_pause_ms: u64,
    /// Extent the map opens on (`[west, south, east, north]`).
    pub initial_bounds: [f64; 4],
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            initial_density: 128,
            min_cells_across: 4.0,
            deep_link_base: DEFAULT_DEEP_LINK_BASE.to_string(),
            hover_pause_ms: 2,
            // New Zealand mainland and near islands.
            initial_bounds: [166.0, -47.5, 179.0, -34.0],
        }
    }
}

impl SelectionConfig {
    pub fn density_policy(&self) -> DensityPolicy {
        DensityPolicy::new(self.min_cells_across)
    }

    pub fn bounds(&self) -> GeoBounds {
        GeoBounds::from_bbox(self.initial_bounds)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load from a file; `.json` is read as JSON, anything else as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&text)
        } else {
            Self::from_yaml(&text)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Map view configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Top-level configuration for [`run_cellpick`](crate::run_cellpick).
pub struct CellPickConfig {
    /// Window title.
    pub title: String,
    pub selection: SelectionConfig,
    /// Session to frame and restore once the map has settled.
    pub initial_session: Option<SessionStateSerde>,
    /// Optional observer of selection events.
    pub event_controller: Option<EventController>,
    /// Feature count handle; a fresh one is created when `None`.
    pub feature_count_controller: Option<FeatureCountController>,
    /// Optional eframe window options.
    pub native_options: Option<eframe::NativeOptions>,
}

impl Default for CellPickConfig {
    fn default() -> Self {
        Self {
            title: "Cell selection".to_string(),
            selection: SelectionConfig::default(),
            initial_session: None,
            event_controller: None,
            feature_count_controller: None,
            native_options: None,
        }
    }
}
