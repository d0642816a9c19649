//! Session persistence: save and load a selection session to/from JSON files.
//!
//! A session records the viewport it was made in alongside the token, so a
//! restore can first bring the map back to the same density.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::density::GeoBounds;
use crate::data::selection::SelectionSet;
use crate::error::{Error, Result};
use crate::selection_controller::SelectionController;

/// Current on-disk format version.
pub const SESSION_VERSION: u32 = 1;

/// Serializable snapshot of a selection session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStateSerde {
    pub version: u32,
    /// RFC 3339 timestamp of the save.
    pub saved_at: String,
    pub bounds: GeoBounds,
    pub density: u32,
    pub token: String,
}

impl SessionStateSerde {
    /// Capture the controller's selection in the viewport `bounds`.
    pub fn capture(controller: &SelectionController, bounds: GeoBounds) -> Self {
        Self {
            version: SESSION_VERSION,
            saved_at: chrono::Utc::now().to_rfc3339(),
            bounds,
            density: controller.density(),
            token: controller.token(),
        }
    }

    /// Parse the stored token.
    pub fn selection(&self) -> Result<SelectionSet> {
        SelectionSet::parse(&self.token)
    }

    /// Restore the saved selection into a selecting `controller`.
    ///
    /// The controller must already be at the saved density; re-framing the
    /// saved bounds in a window of another shape can land on a neighbouring
    /// density, which is reported as [`Error::SessionDensity`].
    pub fn restore_into(&self, controller: &mut SelectionController) -> Result<()> {
        if controller.density() != self.density {
            tracing::warn!(
                saved = self.density,
                current = controller.density(),
                "session density differs from the restored view"
            );
            return Err(Error::SessionDensity {
                saved: self.density,
                current: controller.density(),
            });
        }
        controller.restore(&self.token)
    }
}

pub fn session_to_json(state: &SessionStateSerde) -> Result<String> {
    Ok(serde_json::to_string_pretty(state)?)
}

pub fn session_from_json(json: &str) -> Result<SessionStateSerde> {
    Ok(serde_json::from_str(json)?)
}

pub fn save_session_to_path(state: &SessionStateSerde, path: &Path) -> Result<()> {
    let json = session_to_json(state)?;
    std::fs::write(path, json)?;
    tracing::info!(path = %path.display(), "selection session saved");
    Ok(())
}

pub fn load_session_from_path(path: &Path) -> Result<SessionStateSerde> {
    let text = std::fs::read_to_string(path)?;
    let state = session_from_json(&text)?;
    state.selection()?;
    Ok(state)
}
