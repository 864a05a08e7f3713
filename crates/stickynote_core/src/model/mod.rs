//! Note data model shared by the widget, service and storage layers.
//!
//! # Responsibility
//! - Define pixel geometry and the persisted note record shape.
//! - Keep runtime widget state out of the persisted shape.
//!
//! # Invariants
//! - Every note is identified by a stable, non-blank `NoteId`.

pub mod geometry;
pub mod note;
