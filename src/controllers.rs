//! Controllers for interacting with the selection from external code.
//!
//! [`FeatureCountController`] is the handle between the selection controller
//! (which asks for a feature count after every mutation) and whatever
//! actually answers the question (a worker thread, an HTTP client, a test).
//! Requests are published to subscribers; answers come back through
//! [`FeatureCountController::respond`].

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Shown when a count request fails. No structured error is kept.
pub const FEATURE_COUNT_FAILED: &str = "Unable to count features in the selection.";

/// A feature count request for a serialized selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureCountRequest {
    /// Monotonic request id; only the latest id's answer is displayed.
    pub id: u64,
    pub token: String,
}

/// Snapshot of the feature-count panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureCountInfo {
    /// A request is outstanding (the "ajax indicator").
    pub pending: bool,
    /// Text to show, `None` when invalidated.
    pub info: Option<String>,
}

/// Handle for issuing and answering feature-count requests.
#[derive(Clone)]
pub struct FeatureCountController {
    inner: Arc<Mutex<FeatureCountInner>>,
}

struct FeatureCountInner {
    next_id: u64,
    /// Id whose answer is still wanted; `None` after invalidation.
    awaiting: Option<u64>,
    info: FeatureCountInfo,
    listeners: Vec<Sender<FeatureCountRequest>>,
}

impl FeatureCountController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FeatureCountInner {
                next_id: 1,
                awaiting: None,
                info: FeatureCountInfo::default(),
                listeners: Vec::new(),
            })),
        }
    }

    /// Subscribe to outgoing requests.
    pub fn subscribe(&self) -> Receiver<FeatureCountRequest> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.listeners.push(tx);
        rx
    }

    /// Issue a request for `token`, superseding any outstanding one.
    pub fn request(&self, token: &str) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.awaiting = Some(id);
        inner.info = FeatureCountInfo {
            pending: true,
            info: None,
        };
        let req = FeatureCountRequest {
            id,
            token: token.to_string(),
        };
        inner.listeners.retain(|l| l.send(req.clone()).is_ok());
        id
    }

    /// Drop the displayed annotation and forget any outstanding request.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.awaiting = None;
        inner.info = FeatureCountInfo::default();
    }

    /// Deliver an answer. Returns `false` (and changes nothing) when `id` is
    /// not the latest outstanding request.
    pub fn respond(&self, id: u64, result: Result<String, String>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.awaiting != Some(id) {
            tracing::debug!(id, "discarding stale feature count response");
            return false;
        }
        inner.awaiting = None;
        let info = match result {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(id, %err, "feature count request failed");
                FEATURE_COUNT_FAILED.to_string()
            }
        };
        inner.info = FeatureCountInfo {
            pending: false,
            info: Some(info),
        };
        true
    }

    pub fn info(&self) -> FeatureCountInfo {
        self.inner.lock().unwrap().info.clone()
    }

    pub fn is_pending(&self) -> bool {
        self.inner.lock().unwrap().info.pending
    }
}

impl Default for FeatureCountController {
    fn default() -> Self {
        Self::new()
    }
}
