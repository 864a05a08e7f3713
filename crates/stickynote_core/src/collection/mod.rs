//! Observable collections backing a surface's notes.
//!
//! # See also
//! - `service::note_service` for the persistence hook wiring.

pub mod observable_map;
