//! Interactive note state machine.
//!
//! # Responsibility
//! - Own one note's committed data and its displayed (provisional) geometry.
//! - Drive the move and resize handles through two gesture trackers.
//! - Report `Activate`, `Changed` and `Close` signals to the owning
//!   collection instead of reaching into it.
//!
//! # Invariants
//! - Committed position changes only at a valid drag end; committed size only
//!   at resize end; committed text on every key-up but reported only on blur.
//! - A rejected drag restores the committed position and reports nothing.
//! - At most one gesture per note is active at a time.
//!
//! State transitions:
//! - `Idle -> Dragging` on move-handle pointer-down, back on pointer-up.
//! - `Idle -> Resizing` on resize-handle pointer-down, back on pointer-up.
//! - `* -> Editing` on text focus, `Editing -> Idle` on blur.

use crate::gesture::{GestureHandler, GestureTracker};
use crate::model::geometry::{Delta, Point, Size};
use crate::model::note::{NoteId, NoteRecord};
use crate::surface::Surface;
use crate::widget::placement::{is_out_of_bounds, ROLLBACK_DURATION};
use log::debug;

/// Interaction state of one note.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NoteState {
    #[default]
    Idle,
    Dragging,
    Resizing,
    Editing,
}

/// Draggable control inside a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteHandle {
    /// Header bar; moves the note.
    Move,
    /// Corner button; resizes the text region.
    Resize,
}

/// Notification a note raises for its owning collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteSignal {
    /// Make this the only active note of the collection.
    Activate,
    /// Persisted data changed; the collection should notify.
    Changed,
    /// Remove this note from the collection and the surface.
    Close,
}

/// One sticky note bound to a surface element.
#[derive(Debug, Clone)]
pub struct Note {
    record: NoteRecord,
    shown_position: Point,
    shown_size: Size,
    state: NoteState,
    active: bool,
    move_tracker: GestureTracker,
    resize_tracker: GestureTracker,
}

impl Note {
    /// Wraps committed data. The caller attaches the element to the surface.
    pub fn new(record: NoteRecord) -> Self {
        Self {
            shown_position: record.position,
            shown_size: record.size(),
            record,
            state: NoteState::Idle,
            active: false,
            move_tracker: GestureTracker::track(),
            resize_tracker: GestureTracker::track(),
        }
    }

    pub fn id(&self) -> &NoteId {
        &self.record.identifier
    }

    /// Committed position.
    pub fn position(&self) -> Point {
        self.record.position
    }

    /// Committed size.
    pub fn size(&self) -> Size {
        self.record.size()
    }

    pub fn text(&self) -> &str {
        &self.record.text
    }

    /// Position currently shown on the surface, provisional during a drag.
    pub fn displayed_position(&self) -> Point {
        self.shown_position
    }

    /// Size currently shown on the surface, provisional during a resize.
    pub fn displayed_size(&self) -> Size {
        self.shown_size
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Whether a move or resize gesture is in progress.
    pub fn is_tracking(&self) -> bool {
        self.move_tracker.is_active() || self.resize_tracker.is_active()
    }

    /// Persisted snapshot of the committed data.
    pub fn record(&self) -> NoteRecord {
        self.record.clone()
    }

    pub(crate) fn set_active(&mut self, active: bool, surface: &mut dyn Surface) {
        self.active = active;
        surface.set_active(&self.record.identifier, active);
    }

    /// Pointer-down on one of the note's handles.
    ///
    /// Ignored (returns `None`) while another gesture on this note is active.
    pub fn pointer_down(
        &mut self,
        handle: NoteHandle,
        at: Point,
        surface: &mut dyn Surface,
    ) -> Option<NoteSignal> {
        if self.is_tracking() {
            return None;
        }
        match handle {
            NoteHandle::Move => {
                let mut gesture = MoveGesture {
                    id: &self.record.identifier,
                    committed: &mut self.record.position,
                    shown: &mut self.shown_position,
                    width: self.record.width,
                    state: &mut self.state,
                    surface,
                    signal: None,
                };
                self.move_tracker.pointer_down(at, &mut gesture);
                gesture.signal
            }
            NoteHandle::Resize => {
                let mut gesture = ResizeGesture {
                    id: &self.record.identifier,
                    width: &mut self.record.width,
                    height: &mut self.record.height,
                    shown: &mut self.shown_size,
                    state: &mut self.state,
                    surface,
                    signal: None,
                };
                self.resize_tracker.pointer_down(at, &mut gesture);
                gesture.signal
            }
        }
    }

    /// Document-level pointer-move; forwarded to whichever tracker is active.
    pub fn pointer_move(&mut self, at: Point, surface: &mut dyn Surface) {
        if self.move_tracker.is_active() {
            let mut gesture = MoveGesture {
                id: &self.record.identifier,
                committed: &mut self.record.position,
                shown: &mut self.shown_position,
                width: self.record.width,
                state: &mut self.state,
                surface,
                signal: None,
            };
            self.move_tracker.pointer_move(at, &mut gesture);
        } else if self.resize_tracker.is_active() {
            let mut gesture = ResizeGesture {
                id: &self.record.identifier,
                width: &mut self.record.width,
                height: &mut self.record.height,
                shown: &mut self.shown_size,
                state: &mut self.state,
                surface,
                signal: None,
            };
            self.resize_tracker.pointer_move(at, &mut gesture);
        }
    }

    /// Document-level pointer-up; ends the active gesture.
    pub fn pointer_up(&mut self, surface: &mut dyn Surface) -> Option<NoteSignal> {
        if self.move_tracker.is_active() {
            let mut gesture = MoveGesture {
                id: &self.record.identifier,
                committed: &mut self.record.position,
                shown: &mut self.shown_position,
                width: self.record.width,
                state: &mut self.state,
                surface,
                signal: None,
            };
            self.move_tracker.pointer_up(&mut gesture);
            gesture.signal
        } else if self.resize_tracker.is_active() {
            let mut gesture = ResizeGesture {
                id: &self.record.identifier,
                width: &mut self.record.width,
                height: &mut self.record.height,
                shown: &mut self.shown_size,
                state: &mut self.state,
                surface,
                signal: None,
            };
            self.resize_tracker.pointer_up(&mut gesture);
            gesture.signal
        } else {
            None
        }
    }

    /// Click anywhere inside the note.
    pub fn click(&self) -> NoteSignal {
        NoteSignal::Activate
    }

    /// Focus on the text region.
    pub fn focus_text(&mut self) -> NoteSignal {
        self.state = NoteState::Editing;
        NoteSignal::Activate
    }

    /// Key-up in the text region; keeps the text in memory only.
    pub fn key_up(&mut self, text: impl Into<String>) {
        self.record.text = text.into();
    }

    /// Text region lost focus; this is where text edits get persisted.
    pub fn blur_text(&mut self) -> NoteSignal {
        if self.state == NoteState::Editing {
            self.state = NoteState::Idle;
        }
        NoteSignal::Changed
    }

    /// Close button.
    pub fn close(&self) -> NoteSignal {
        NoteSignal::Close
    }
}

struct MoveGesture<'a> {
    id: &'a NoteId,
    committed: &'a mut Point,
    shown: &'a mut Point,
    width: u32,
    state: &'a mut NoteState,
    surface: &'a mut dyn Surface,
    signal: Option<NoteSignal>,
}

impl GestureHandler for MoveGesture<'_> {
    fn on_start(&mut self) {
        *self.state = NoteState::Dragging;
        self.signal = Some(NoteSignal::Activate);
    }

    fn on_move(&mut self, delta: Delta) {
        *self.shown = self.committed.offset(delta);
        self.surface.clear_selection();
        self.surface.place(self.id, *self.shown);
    }

    fn on_end(&mut self) {
        *self.state = NoteState::Idle;
        if is_out_of_bounds(*self.shown, self.width, self.surface.size()) {
            debug!(
                "event=note_move module=widget status=rejected note_id={} x={} y={}",
                self.id, self.shown.x, self.shown.y
            );
            *self.shown = *self.committed;
            self.surface.place(self.id, *self.committed);
            self.surface.play_rollback(self.id, ROLLBACK_DURATION);
            return;
        }
        *self.committed = *self.shown;
        self.signal = Some(NoteSignal::Changed);
    }
}

struct ResizeGesture<'a> {
    id: &'a NoteId,
    width: &'a mut u32,
    height: &'a mut u32,
    shown: &'a mut Size,
    state: &'a mut NoteState,
    surface: &'a mut dyn Surface,
    signal: Option<NoteSignal>,
}

impl GestureHandler for ResizeGesture<'_> {
    fn on_start(&mut self) {
        *self.state = NoteState::Resizing;
        self.signal = Some(NoteSignal::Activate);
    }

    fn on_move(&mut self, delta: Delta) {
        *self.shown = Size::new(*self.width, *self.height).grow(delta);
        self.surface.clear_selection();
        self.surface.resize(self.id, *self.shown);
    }

    fn on_end(&mut self) {
        *self.state = NoteState::Idle;
        *self.width = self.shown.width;
        *self.height = self.shown.height;
        self.signal = Some(NoteSignal::Changed);
    }
}
