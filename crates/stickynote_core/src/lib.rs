//! Core logic for StickyNote surfaces.
//! This crate owns note behavior, collection notification and persistence
//! wiring; hosts provide the surface and storage.

pub mod collection;
pub mod config;
pub mod db;
pub mod gesture;
pub mod host;
pub mod logging;
pub mod model;
pub mod service;
pub mod storage;
pub mod surface;
pub mod widget;

pub use collection::observable_map::{Entries, ObservableMap};
pub use config::{ConfigError, WidgetConfig};
pub use gesture::{GestureHandler, GestureTracker};
pub use host::NoteServiceHandle;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::geometry::{Delta, Point, Size};
pub use model::note::{
    decode_records, encode_records, NoteId, NoteRecord, RecordCodecError, RecordValidationError,
};
pub use service::{
    derive_text_preview, ContextMenuTarget, NoteService, NoteServiceError, NoteServiceResult,
};
pub use storage::{MemoryStorage, SharedStorage, SqliteStorage, Storage, StorageError};
pub use surface::{SharedSurface, Surface, SurfaceError, VirtualSurface};
pub use widget::{Note, NoteHandle, NoteSignal, NoteState};
