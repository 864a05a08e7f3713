//! Note use-case service for one surface.
//!
//! # Responsibility
//! - Own the observable note collection and wire its change hook to an
//!   externally injected persistence hook.
//! - Create, rehydrate, save and tear down notes.
//! - Dispatch host events (context menu, pointer, text, close) to notes and
//!   apply the signals they raise.
//!
//! # Invariants
//! - Every note in the collection has an element attached to the surface.
//! - At most one note per service is active.
//! - A full reload is one `assign`, so one change notification.
//! - The persistence hook only sees flattened records and must not re-enter
//!   the service.
//!
//! # See also
//! - `collection::observable_map` for notification semantics.

use crate::collection::observable_map::{Entries, ObservableMap};
use crate::config::WidgetConfig;
use crate::model::geometry::{Point, Size};
use crate::model::note::{NoteId, NoteRecord, RecordValidationError};
use crate::surface::{SharedSurface, SurfaceError};
use crate::widget::{Note, NoteHandle, NoteSignal};
use log::{debug, error, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

static MARKUP_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

const PREVIEW_MAX_CHARS: usize = 100;

/// Hook that receives the flattened collection on every save.
pub type PersistenceHook = Box<dyn FnMut(&[NoteRecord])>;

type PersistenceSlot = Rc<RefCell<Option<PersistenceHook>>>;

/// Element a context-menu event was dispatched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextMenuTarget {
    /// The surface itself (empty area).
    Surface,
    /// Any descendant, such as an existing note.
    Descendant,
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Target note does not exist in this collection.
    NoteNotFound(NoteId),
    /// A note with this identifier already exists.
    DuplicateNote(NoteId),
    /// Record data failed validation.
    InvalidRecord(RecordValidationError),
    /// Surface refused the element operation.
    Surface(SurfaceError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoteNotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateNote(id) => write!(f, "note already exists: {id}"),
            Self::InvalidRecord(err) => write!(f, "{err}"),
            Self::Surface(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidRecord(err) => Some(err),
            Self::Surface(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RecordValidationError> for NoteServiceError {
    fn from(value: RecordValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

impl From<SurfaceError> for NoteServiceError {
    fn from(value: SurfaceError) -> Self {
        Self::Surface(value)
    }
}

pub type NoteServiceResult<T> = Result<T, NoteServiceError>;

/// Notes of one surface plus their persistence wiring.
pub struct NoteService {
    config: WidgetConfig,
    surface: SharedSurface,
    notes: ObservableMap<NoteId, Note>,
    persistence: PersistenceSlot,
}

impl NoteService {
    /// Creates an empty service. Nothing is persisted until a hook is set.
    pub fn new(surface: SharedSurface, config: WidgetConfig) -> Self {
        let persistence: PersistenceSlot = Rc::new(RefCell::new(None));
        let hook_slot = Rc::clone(&persistence);
        let notes: ObservableMap<NoteId, Note> =
            ObservableMap::new(move |entries| flush(entries, &hook_slot));

        Self {
            config,
            surface,
            notes,
            persistence,
        }
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn surface(&self) -> SharedSurface {
        Rc::clone(&self.surface)
    }

    /// Bulk list getter.
    pub fn notes(&self) -> &ObservableMap<NoteId, Note> {
        &self.notes
    }

    /// Bulk list setter; same as [`NoteService::load_notes`].
    pub fn set_notes(&mut self, records: Vec<NoteRecord>) -> usize {
        self.load_notes(records)
    }

    pub fn note(&self, id: &NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Flattened records in insertion order.
    pub fn records(&self) -> Vec<NoteRecord> {
        self.notes.entries().map(|(_, note)| note.record()).collect()
    }

    /// Installs the persistence hook, replacing any previous one.
    pub fn set_persistence(&mut self, hook: impl FnMut(&[NoteRecord]) + 'static) {
        *self.persistence.borrow_mut() = Some(Box::new(hook));
    }

    pub fn clear_persistence(&mut self) {
        *self.persistence.borrow_mut() = None;
    }

    pub fn has_persistence(&self) -> bool {
        self.persistence.borrow().is_some()
    }

    /// Creates a note with a fresh identifier at `position`.
    pub fn create_note(&mut self, position: Point) -> NoteServiceResult<NoteId> {
        self.create_note_with_id(NoteId::generate(), position)
    }

    /// Creates a note with config defaults, attaches it, inserts it (one
    /// save) and activates it.
    ///
    /// The new note ends up active; it is not left deactivated by the sweep.
    pub fn create_note_with_id(
        &mut self,
        id: NoteId,
        position: Point,
    ) -> NoteServiceResult<NoteId> {
        if self.notes.contains_key(&id) {
            return Err(NoteServiceError::DuplicateNote(id));
        }
        let record = NoteRecord::new(
            id.clone(),
            Size::new(self.config.width, self.config.height),
            position,
            self.config.text.clone(),
        )?;
        self.surface.borrow_mut().attach(&record)?;
        self.notes.set(id.clone(), Note::new(record));
        self.activate(&id)?;

        info!(
            "event=note_create module=service status=ok note_id={} x={} y={}",
            id, position.x, position.y
        );
        Ok(id)
    }

    /// Rehydrates persisted records with one bulk insert.
    ///
    /// Invalid records, duplicates inside `records` (first wins) and records
    /// whose element cannot be attached are skipped with a warning. A record
    /// whose identifier is already present replaces that note; if the new
    /// element cannot be attached the old one is restored, or the note is
    /// dropped when that fails too. Loaded notes start inactive. Returns the
    /// number of notes inserted.
    pub fn load_notes(&mut self, records: Vec<NoteRecord>) -> usize {
        let total = records.len();
        let mut seen = HashSet::new();
        let mut batch = Vec::with_capacity(total);
        let mut stale = Vec::new();
        {
            let mut surface = self.surface.borrow_mut();
            for record in records {
                if let Err(err) = record.validate() {
                    warn!("event=notes_load module=service status=skipped reason=invalid error={err}");
                    continue;
                }
                if !seen.insert(record.identifier.clone()) {
                    warn!(
                        "event=notes_load module=service status=skipped reason=duplicate note_id={}",
                        record.identifier
                    );
                    continue;
                }
                if self.notes.contains_key(&record.identifier) {
                    if let Err(err) = surface.detach(&record.identifier) {
                        warn!("event=notes_load module=service status=detach_failed error={err}");
                    }
                }
                if let Err(err) = surface.attach(&record) {
                    error!("event=notes_load module=service status=skipped reason=attach_failed error={err}");
                    if let Some(existing) = self.notes.get(&record.identifier) {
                        match surface.attach(&existing.record()) {
                            Ok(()) => surface.set_active(existing.id(), existing.is_active()),
                            Err(err) => {
                                error!(
                                    "event=notes_load module=service status=dropped note_id={} error={err}",
                                    record.identifier
                                );
                                stale.push(record.identifier);
                            }
                        }
                    }
                    continue;
                }
                batch.push((record.identifier.clone(), Note::new(record)));
            }
        }

        for id in &stale {
            self.notes.remove_silently(id);
        }
        let loaded = batch.len();
        self.notes.assign(batch);
        info!("event=notes_load module=service status=ok loaded={loaded} total={total}");
        loaded
    }

    /// Flattens the collection and hands it to the persistence hook.
    pub fn save(&self) {
        flush(self.notes.entries(), &self.persistence);
    }

    /// Context menu on the surface. Only clicks on the surface itself create
    /// a note, positioned relative to the surface's top-left corner.
    pub fn on_context_menu(
        &mut self,
        target: ContextMenuTarget,
        page: Point,
    ) -> NoteServiceResult<Option<NoteId>> {
        if target != ContextMenuTarget::Surface {
            return Ok(None);
        }
        let offset = self.surface.borrow().page_offset();
        let position = Point::new(
            page.x.saturating_sub(offset.x),
            page.y.saturating_sub(offset.y),
        );
        self.create_note(position).map(Some)
    }

    /// Page is about to be discarded: best-effort final flush.
    pub fn on_before_unload(&self) {
        debug!("event=before_unload module=service status=flush");
        self.save();
    }

    /// Pointer-down on a note handle. Returns whether a gesture started.
    pub fn pointer_down(
        &mut self,
        id: &NoteId,
        handle: NoteHandle,
        at: Point,
    ) -> NoteServiceResult<bool> {
        let signal = {
            let note = self
                .notes
                .get_mut(id)
                .ok_or_else(|| NoteServiceError::NoteNotFound(id.clone()))?;
            let mut surface = self.surface.borrow_mut();
            note.pointer_down(handle, at, &mut *surface)
        };
        let started = signal.is_some();
        if let Some(signal) = signal {
            self.apply(id, signal)?;
        }
        Ok(started)
    }

    /// Document-level pointer-move, routed to every note with a live gesture.
    pub fn pointer_move(&mut self, at: Point) {
        let mut surface = self.surface.borrow_mut();
        for note in self.notes.values_mut().filter(|note| note.is_tracking()) {
            note.pointer_move(at, &mut *surface);
        }
    }

    /// Document-level pointer-up; ends live gestures and applies results.
    pub fn pointer_up(&mut self) -> NoteServiceResult<()> {
        let signals: Vec<(NoteId, NoteSignal)> = {
            let mut surface = self.surface.borrow_mut();
            let ended = self
                .notes
                .values_mut()
                .filter(|note| note.is_tracking())
                .filter_map(|note| {
                    let id = note.id().clone();
                    note.pointer_up(&mut *surface).map(|signal| (id, signal))
                })
                .collect();
            ended
        };
        for (id, signal) in signals {
            self.apply(&id, signal)?;
        }
        Ok(())
    }

    pub fn click(&mut self, id: &NoteId) -> NoteServiceResult<()> {
        let signal = self.note_mut(id)?.click();
        self.apply(id, signal)
    }

    pub fn focus_text(&mut self, id: &NoteId) -> NoteServiceResult<()> {
        let signal = self.note_mut(id)?.focus_text();
        self.apply(id, signal)
    }

    /// Keystroke in a note's text region; no save until blur.
    pub fn key_up(&mut self, id: &NoteId, text: impl Into<String>) -> NoteServiceResult<()> {
        self.note_mut(id)?.key_up(text);
        Ok(())
    }

    pub fn blur_text(&mut self, id: &NoteId) -> NoteServiceResult<()> {
        let signal = self.note_mut(id)?.blur_text();
        self.apply(id, signal)
    }

    /// Close button: removes the note (one save) and detaches its element.
    pub fn close(&mut self, id: &NoteId) -> NoteServiceResult<()> {
        let signal = self.note_mut(id)?.close();
        self.apply(id, signal)
    }

    /// Marks `id` as the only active note.
    pub fn activate(&mut self, id: &NoteId) -> NoteServiceResult<()> {
        if !self.notes.contains_key(id) {
            return Err(NoteServiceError::NoteNotFound(id.clone()));
        }
        let mut surface = self.surface.borrow_mut();
        for note in self.notes.values_mut() {
            note.set_active(false, &mut *surface);
        }
        if let Some(note) = self.notes.get_mut(id) {
            note.set_active(true, &mut *surface);
        }
        Ok(())
    }

    /// Detaches every element and empties the collection with one save.
    ///
    /// Detach failures are logged and do not stop the sweep.
    pub fn remove_all(&mut self) {
        {
            let mut surface = self.surface.borrow_mut();
            for id in self.notes.keys() {
                if let Err(err) = surface.detach(id) {
                    warn!("event=notes_remove_all module=service status=detach_failed error={err}");
                }
            }
        }
        let removed = self.notes.len();
        self.notes.clear();
        info!("event=notes_remove_all module=service status=ok removed={removed}");
    }

    fn note_mut(&mut self, id: &NoteId) -> NoteServiceResult<&mut Note> {
        self.notes
            .get_mut(id)
            .ok_or_else(|| NoteServiceError::NoteNotFound(id.clone()))
    }

    fn apply(&mut self, id: &NoteId, signal: NoteSignal) -> NoteServiceResult<()> {
        match signal {
            NoteSignal::Activate => self.activate(id),
            NoteSignal::Changed => {
                self.notes.notify();
                Ok(())
            }
            NoteSignal::Close => {
                self.notes.remove(id);
                if let Err(err) = self.surface.borrow_mut().detach(id) {
                    warn!("event=note_close module=service status=detach_failed note_id={id} error={err}");
                }
                info!("event=note_close module=service status=ok note_id={id}");
                Ok(())
            }
        }
    }
}

fn flush(entries: Entries<'_, NoteId, Note>, slot: &PersistenceSlot) {
    let records: Vec<NoteRecord> = entries.map(|(_, note)| note.record()).collect();
    let Ok(mut hook) = slot.try_borrow_mut() else {
        warn!("event=notes_save module=service status=skipped reason=reentrant");
        return;
    };
    if let Some(hook) = hook.as_mut() {
        hook(&records);
        debug!(
            "event=notes_save module=service status=ok count={}",
            records.len()
        );
    }
}

/// Derives a one-line plain-text preview from editor content.
///
/// Rules:
/// - Every markup tag is replaced by a space, so `<br>`/`<div>` breaks
///   separate words.
/// - `&nbsp;`, `&lt;`, `&gt;` and `&amp;` are decoded.
/// - Whitespace is collapsed and the first 100 chars are kept.
pub fn derive_text_preview(text: &str) -> Option<String> {
    let without_tags = MARKUP_TAG_RE.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    let normalized = WHITESPACE_RE.replace_all(&decoded, " ");
    let trimmed = normalized.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(PREVIEW_MAX_CHARS).collect())
}
