//! Surface collaborator contract.
//!
//! # Responsibility
//! - Abstract the container that hosts note elements (a DOM node in a
//!   browser host, an in-memory model in tests and the CLI).
//! - Expose only what note behavior needs: dimensions, child attach/detach,
//!   element placement, and cosmetic cues.
//!
//! # Invariants
//! - Implementations must not call back into the note service; every method
//!   runs to completion inside the caller's event handler.

use crate::model::geometry::{Point, Size};
use crate::model::note::{NoteId, NoteRecord};
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;
use std::time::Duration;

mod virtual_surface;

pub use virtual_surface::{ElementState, VirtualSurface};

/// Shared surface handle used by one service and all of its notes.
pub type SharedSurface = Rc<RefCell<dyn Surface>>;

pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Host container for note elements.
pub trait Surface {
    /// Current inner dimensions.
    fn size(&self) -> Size;

    /// Top-left corner in page coordinates, used to turn page clicks into
    /// surface-relative positions.
    fn page_offset(&self) -> Point;

    /// Renders a new note element from its record.
    fn attach(&mut self, record: &NoteRecord) -> SurfaceResult<()>;

    /// Removes a note element.
    fn detach(&mut self, id: &NoteId) -> SurfaceResult<()>;

    /// Moves an element. Unknown ids are ignored.
    fn place(&mut self, id: &NoteId, position: Point);

    /// Resizes an element's text region. Unknown ids are ignored.
    fn resize(&mut self, id: &NoteId, size: Size);

    /// Toggles the active highlight. Unknown ids are ignored.
    fn set_active(&mut self, id: &NoteId, active: bool);

    /// Shows the rejected-move cue; the surface clears it after `duration`.
    fn play_rollback(&mut self, id: &NoteId, duration: Duration);

    /// Drops any document text selection.
    fn clear_selection(&mut self);
}

/// Surface-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// An element with this id is already attached.
    AlreadyAttached(NoteId),
    /// No element with this id is attached.
    NotAttached(NoteId),
}

impl Display for SurfaceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyAttached(id) => write!(f, "note element already attached: {id}"),
            Self::NotAttached(id) => write!(f, "note element not attached: {id}"),
        }
    }
}

impl Error for SurfaceError {}
