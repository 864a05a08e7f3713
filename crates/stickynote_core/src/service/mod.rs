//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate notes, surface and persistence hook for one surface.
//! - Keep host/CLI layers decoupled from widget internals.

pub mod note_service;

pub use note_service::{
    derive_text_preview, ContextMenuTarget, NoteService, NoteServiceError, NoteServiceResult,
    PersistenceHook,
};
