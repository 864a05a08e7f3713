//! Per-note interaction behavior.
//!
//! # Responsibility
//! - Translate handle gestures and text-region events into committed note
//!   data plus signals for the owning collection.
//! - Apply the drag-end placement rules.

pub mod note;
pub mod placement;

pub use note::{Note, NoteHandle, NoteSignal, NoteState};
