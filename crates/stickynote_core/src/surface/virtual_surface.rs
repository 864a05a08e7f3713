//! In-memory surface that records element state instead of rendering.

use super::{Surface, SurfaceError, SurfaceResult};
use crate::model::geometry::{Point, Size};
use crate::model::note::{NoteId, NoteRecord};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Rendered state of one note element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementState {
    pub position: Point,
    pub size: Size,
    pub text: String,
    pub active: bool,
    /// Deadline of the rollback cue, if one was played.
    pub rollback_until: Option<Instant>,
}

impl ElementState {
    /// Whether the rollback cue is still showing at `now`.
    pub fn is_rolling_back(&self, now: Instant) -> bool {
        self.rollback_until.is_some_and(|deadline| now < deadline)
    }
}

/// Headless [`Surface`] implementation.
#[derive(Debug, Clone)]
pub struct VirtualSurface {
    size: Size,
    page_offset: Point,
    elements: HashMap<NoteId, ElementState>,
    selection_clears: usize,
}

impl VirtualSurface {
    pub fn new(size: Size) -> Self {
        Self::with_offset(size, Point::default())
    }

    pub fn with_offset(size: Size, page_offset: Point) -> Self {
        Self {
            size,
            page_offset,
            elements: HashMap::new(),
            selection_clears: 0,
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    pub fn element(&self, id: &NoteId) -> Option<&ElementState> {
        self.elements.get(id)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Ids of elements currently showing the active highlight.
    pub fn active_ids(&self) -> Vec<NoteId> {
        let mut ids: Vec<NoteId> = self
            .elements
            .iter()
            .filter(|(_, element)| element.active)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// How many times a gesture asked to drop the text selection.
    pub fn selection_clears(&self) -> usize {
        self.selection_clears
    }
}

impl Surface for VirtualSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn page_offset(&self) -> Point {
        self.page_offset
    }

    fn attach(&mut self, record: &NoteRecord) -> SurfaceResult<()> {
        if self.elements.contains_key(&record.identifier) {
            return Err(SurfaceError::AlreadyAttached(record.identifier.clone()));
        }
        self.elements.insert(
            record.identifier.clone(),
            ElementState {
                position: record.position,
                size: record.size(),
                text: record.text.clone(),
                active: false,
                rollback_until: None,
            },
        );
        Ok(())
    }

    fn detach(&mut self, id: &NoteId) -> SurfaceResult<()> {
        self.elements
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::NotAttached(id.clone()))
    }

    fn place(&mut self, id: &NoteId, position: Point) {
        if let Some(element) = self.elements.get_mut(id) {
            element.position = position;
        }
    }

    fn resize(&mut self, id: &NoteId, size: Size) {
        if let Some(element) = self.elements.get_mut(id) {
            element.size = size;
        }
    }

    fn set_active(&mut self, id: &NoteId, active: bool) {
        if let Some(element) = self.elements.get_mut(id) {
            element.active = active;
        }
    }

    fn play_rollback(&mut self, id: &NoteId, duration: Duration) {
        if let Some(element) = self.elements.get_mut(id) {
            element.rollback_until = Some(Instant::now() + duration);
        }
    }

    fn clear_selection(&mut self) {
        self.selection_clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::VirtualSurface;
    use crate::model::geometry::{Point, Size};
    use crate::model::note::{NoteId, NoteRecord};
    use crate::surface::{Surface, SurfaceError};
    use std::time::{Duration, Instant};

    fn record(id: &str) -> NoteRecord {
        NoteRecord::new(NoteId::from(id), Size::new(10, 10), Point::new(1, 2), "x")
            .expect("valid record")
    }

    #[test]
    fn attach_twice_is_rejected_and_detach_missing_fails() {
        let mut surface = VirtualSurface::new(Size::new(100, 100));
        surface.attach(&record("a")).expect("first attach");
        assert_eq!(
            surface.attach(&record("a")),
            Err(SurfaceError::AlreadyAttached(NoteId::from("a")))
        );
        surface.detach(&NoteId::from("a")).expect("detach");
        assert_eq!(
            surface.detach(&NoteId::from("a")),
            Err(SurfaceError::NotAttached(NoteId::from("a")))
        );
    }

    #[test]
    fn rollback_cue_expires() {
        let mut surface = VirtualSurface::new(Size::new(100, 100));
        surface.attach(&record("a")).expect("attach");
        surface.play_rollback(&NoteId::from("a"), Duration::from_millis(320));

        let element = surface.element(&NoteId::from("a")).expect("element");
        assert!(element.is_rolling_back(Instant::now()));
        assert!(!element.is_rolling_back(Instant::now() + Duration::from_secs(1)));
    }
}
