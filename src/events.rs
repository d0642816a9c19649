//! Map input events and the selection event stream.
//!
//! Two directions:
//! - [`MapInput`]: what the map view feeds *into* the
//!   [`SelectionController`](crate::selection_controller::SelectionController)
//!   (pointer clicks and pauses, zoom/move ends, session buttons).
//! - [`SelectionEvent`]: what the controller reports *out* to observers that
//!   subscribed on an [`EventController`]. Each event carries a set of
//!   [`EventKind`] flags so one occurrence can match several categories (a
//!   density change that wiped the selection is both `DENSITY_CHANGED` and
//!   `SELECTION_CLEARED`).

use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::data::cell::Cell;
use crate::viewport::ScreenPos;

// ─────────────────────────────────────────────────────────────────────────────
// MapInput – typed input contract
// ─────────────────────────────────────────────────────────────────────────────

/// Input delivered by the map view. Zoom and move ends carry no payload; the
/// controller re-reads the viewport when it needs bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapInput {
    /// Single primary click at a pixel.
    Click(ScreenPos),
    /// The pointer rested at a pixel for the hover delay.
    Pause(ScreenPos),
    ZoomEnd,
    MoveEnd,
    /// "Grab some data" button.
    Start,
    /// "Cancel" button.
    Cancel,
    /// "Reset" button.
    Reset,
}

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the categories a [`SelectionEvent`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u32);

impl EventKind {
    /// A cell was appended to the selection.
    pub const CELL_ADDED: Self = Self(1 << 0);
    /// A cell was removed from the selection.
    pub const CELL_REMOVED: Self = Self(1 << 1);
    /// The selection was emptied (reset, cancel, start, density change).
    pub const SELECTION_CLEARED: Self = Self(1 << 2);
    /// The grid density changed.
    pub const DENSITY_CHANGED: Self = Self(1 << 3);
    /// The hover highlight moved to another cell.
    pub const HOVER_CHANGED: Self = Self(1 << 4);
    /// Selection mode was entered.
    pub const MODE_STARTED: Self = Self(1 << 5);
    /// Selection mode was left.
    pub const MODE_STOPPED: Self = Self(1 << 6);
    /// The visible bounds changed and a new deep link was published.
    pub const VIEW_CHANGED: Self = Self(1 << 7);
    /// A feature count was requested for the current token.
    pub const FEATURE_COUNT_REQUESTED: Self = Self(1 << 8);
    /// The selection was replaced from a saved token.
    pub const SELECTION_RESTORED: Self = Self(1 << 9);

    /// Wildcard: matches every kind.
    pub const ALL: Self = Self(u32::MAX);

    /// Whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Whether `self` and `other` share at least one bit.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

}

const KIND_NAMES: [(EventKind, &str); 10] = [
    (EventKind::CELL_ADDED, "CELL_ADDED"),
    (EventKind::CELL_REMOVED, "CELL_REMOVED"),
    (EventKind::SELECTION_CLEARED, "SELECTION_CLEARED"),
    (EventKind::DENSITY_CHANGED, "DENSITY_CHANGED"),
    (EventKind::HOVER_CHANGED, "HOVER_CHANGED"),
    (EventKind::MODE_STARTED, "MODE_STARTED"),
    (EventKind::MODE_STOPPED, "MODE_STOPPED"),
    (EventKind::VIEW_CHANGED, "VIEW_CHANGED"),
    (EventKind::FEATURE_COUNT_REQUESTED, "FEATURE_COUNT_REQUESTED"),
    (EventKind::SELECTION_RESTORED, "SELECTION_RESTORED"),
];

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Names of the set flags joined with `|`, e.g. `SELECTION_CLEARED|DENSITY_CHANGED`.
impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == EventKind::ALL {
            return f.write_str("ALL");
        }
        let mut sep = "";
        for (_, name) in KIND_NAMES.iter().filter(|(k, _)| self.contains(*k)) {
            write!(f, "{sep}{name}")?;
            sep = "|";
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SelectionEvent
// ─────────────────────────────────────────────────────────────────────────────

/// A notification emitted by the selection controller.
#[derive(Debug, Clone)]
pub struct SelectionEvent {
    pub kinds: EventKind,
    /// Seconds since the [`EventController`] was created.
    pub timestamp: f64,
    /// Cell that was added, removed or hovered.
    pub cell: Option<Cell>,
    /// Token after the change.
    pub token: String,
    /// Density after the change.
    pub density: u32,
    /// Deep link, for `VIEW_CHANGED`.
    pub deep_link: Option<String>,
}

impl SelectionEvent {
    pub fn new(kinds: EventKind, token: String, density: u32) -> Self {
        Self {
            kinds,
            timestamp: 0.0, // set by the controller on emit
            cell: None,
            token,
            density,
            deep_link: None,
        }
    }

    pub fn with_cell(mut self, cell: Cell) -> Self {
        self.cell = Some(cell);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// OR-mask: an event is delivered when `event.kinds.intersects(mask)`.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &SelectionEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<SelectionEvent>,
}

/// Distributes [`SelectionEvent`]s to subscribers over `mpsc` channels.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Receive events whose kinds intersect the filter mask.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<SelectionEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap();
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    pub fn subscribe_all(&self) -> Receiver<SelectionEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Stamp and deliver `event` to matching subscribers. Subscribers whose
    /// receiver was dropped are pruned when a matching event fails to send.
    pub fn emit(&self, mut event: SelectionEvent) {
        let mut inner = self.inner.lock().unwrap();
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        inner
            .subscribers
            .retain(|sub| !sub.filter.matches(&event) || sub.sender.send(event.clone()).is_ok());
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combined_kinds_contain_and_intersect() {
        let combined = EventKind::CELL_ADDED | EventKind::FEATURE_COUNT_REQUESTED;
        assert!(combined.contains(EventKind::CELL_ADDED));
        assert!(combined.intersects(EventKind::FEATURE_COUNT_REQUESTED));
        assert!(!EventKind::HOVER_CHANGED.intersects(combined));
    }

    #[test]
    fn filter_delivers_only_matching_kinds() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_density = ctrl.subscribe(EventFilter::only(EventKind::DENSITY_CHANGED));

        ctrl.emit(SelectionEvent::new(EventKind::CELL_ADDED, "X0Y0C1".into(), 1));

        assert!(rx_all.try_recv().is_ok());
        assert!(rx_density.try_recv().is_err());

        ctrl.emit(SelectionEvent::new(
            EventKind::DENSITY_CHANGED | EventKind::SELECTION_CLEARED,
            String::new(),
            16,
        ));
        let evt = rx_density.try_recv().unwrap();
        assert_eq!(evt.density, 16);
        assert!(evt.kinds.contains(EventKind::SELECTION_CLEARED));
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let ctrl = EventController::new();
        let rx1 = ctrl.subscribe_all();
        let rx2 = ctrl.subscribe_all();
        drop(rx1);

        ctrl.emit(SelectionEvent::new(EventKind::MODE_STARTED, String::new(), 4));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(ctrl.inner.lock().unwrap().subscribers.len(), 1);
    }

    #[test]
    fn display_joins_names() {
        assert_eq!(format!("{}", EventKind::CELL_ADDED), "CELL_ADDED");
        assert_eq!(
            format!("{}", EventKind::DENSITY_CHANGED | EventKind::SELECTION_CLEARED),
            "SELECTION_CLEARED|DENSITY_CHANGED"
        );
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert_eq!(format!("{}", EventKind(0)), "");
    }

    #[test]
    fn event_kinds_do_not_overlap() {
        let all_kinds = [
            EventKind::CELL_ADDED,
            EventKind::CELL_REMOVED,
            EventKind::SELECTION_CLEARED,
            EventKind::DENSITY_CHANGED,
            EventKind::HOVER_CHANGED,
            EventKind::MODE_STARTED,
            EventKind::MODE_STOPPED,
            EventKind::VIEW_CHANGED,
            EventKind::FEATURE_COUNT_REQUESTED,
            EventKind::SELECTION_RESTORED,
        ];
        for (i, a) in all_kinds.iter().enumerate() {
            for (j, b) in all_kinds.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b), "kinds {i} and {j} overlap");
                }
            }
        }
    }
}
