//! Pointer drag tracking for one handle.
//!
//! # Responsibility
//! - Record a gesture origin on pointer-down.
//! - Stream cumulative deltas to a handler until pointer-up.
//!
//! # Invariants
//! - At most one active gesture per tracker; a second pointer-down while
//!   active is ignored.
//! - Deltas are measured from the gesture origin, never from the previous
//!   move.
//! - `on_move` is forwarded whenever a gesture is active, whether or not the
//!   handler overrides `on_end`.
//!
//! Once active, the host routes document-level move/up events here so a drag
//! keeps going after the pointer leaves the handle. Origin state lives on the
//! tracker instance; a page that feeds two simultaneous pointer streams into
//! the same tracker is outside this model.

use crate::model::geometry::{Delta, Point};

/// Callbacks for one gesture. `on_start` and `on_end` are optional.
pub trait GestureHandler {
    /// Called on pointer-down, before the origin is recorded.
    fn on_start(&mut self) {}

    /// Called for every pointer-move with the delta from the origin.
    fn on_move(&mut self, delta: Delta);

    /// Called on pointer-up, after which the tracker is idle again.
    fn on_end(&mut self) {}
}

/// Plain closures act as move-only handlers.
impl<F: FnMut(Delta)> GestureHandler for F {
    fn on_move(&mut self, delta: Delta) {
        self(delta)
    }
}

/// Per-handle gesture state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GestureTracker {
    origin: Option<Point>,
}

impl GestureTracker {
    /// Creates an idle tracker for one handle.
    pub fn track() -> Self {
        Self::default()
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.origin.is_some()
    }

    /// Origin of the active gesture.
    pub fn origin(&self) -> Option<Point> {
        self.origin
    }

    /// Starts a gesture at `at`. Returns `false` when one is already active.
    pub fn pointer_down<H: GestureHandler + ?Sized>(&mut self, at: Point, handler: &mut H) -> bool {
        if self.origin.is_some() {
            return false;
        }
        handler.on_start();
        self.origin = Some(at);
        true
    }

    /// Forwards the cumulative delta for `at`. Returns `false` when idle.
    pub fn pointer_move<H: GestureHandler + ?Sized>(&mut self, at: Point, handler: &mut H) -> bool {
        let Some(origin) = self.origin else {
            return false;
        };
        handler.on_move(at.delta_from(origin));
        true
    }

    /// Ends the active gesture. Returns `false` when idle.
    pub fn pointer_up<H: GestureHandler + ?Sized>(&mut self, handler: &mut H) -> bool {
        if self.origin.is_none() {
            return false;
        }
        handler.on_end();
        self.origin = None;
        true
    }
}
