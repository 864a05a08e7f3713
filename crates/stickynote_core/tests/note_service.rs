use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use stickynote_core::surface::SurfaceResult;
use stickynote_core::{
    ContextMenuTarget, NoteHandle, NoteId, NoteRecord, NoteService, NoteServiceError, NoteState,
    Point, SharedSurface, Size, Surface, SurfaceError, VirtualSurface, WidgetConfig,
};

const SURFACE_SIZE: Size = Size::new(800, 600);

type Saves = Rc<RefCell<Vec<Vec<NoteRecord>>>>;

struct Fixture {
    service: NoteService,
    surface: Rc<RefCell<VirtualSurface>>,
    saves: Saves,
}

fn fixture() -> Fixture {
    fixture_with_offset(Point::default())
}

fn fixture_with_offset(offset: Point) -> Fixture {
    let surface = Rc::new(RefCell::new(VirtualSurface::with_offset(SURFACE_SIZE, offset)));
    let shared: SharedSurface = surface.clone();
    let mut service = NoteService::new(shared, WidgetConfig::default());
    let saves: Saves = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saves);
    service.set_persistence(move |records: &[NoteRecord]| sink.borrow_mut().push(records.to_vec()));
    Fixture {
        service,
        surface,
        saves,
    }
}

fn id(value: &str) -> NoteId {
    NoteId::from(value)
}

fn record(identifier: &str, x: i32, y: i32) -> NoteRecord {
    NoteRecord::new(
        id(identifier),
        Size::new(180 + x as u32, 90),
        Point::new(x, y),
        format!("note {identifier} <b>bold</b>"),
    )
    .unwrap()
}

fn save_count(saves: &Saves) -> usize {
    saves.borrow().len()
}

#[test]
fn create_two_then_close_one_saves_once_per_mutation() {
    let mut fx = fixture();

    fx.service.create_note_with_id(id("a"), Point::new(10, 10)).unwrap();
    fx.service.create_note_with_id(id("b"), Point::new(40, 40)).unwrap();
    assert_eq!(fx.service.notes().len(), 2);
    assert_eq!(save_count(&fx.saves), 2);

    fx.service.close(&id("a")).unwrap();
    assert_eq!(fx.service.notes().len(), 1);
    assert!(fx.service.note(&id("b")).is_some());
    assert_eq!(save_count(&fx.saves), 3);

    let last = fx.saves.borrow().last().cloned().unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].identifier, id("b"));
    assert!(fx.surface.borrow().element(&id("a")).is_none());
}

#[test]
fn created_note_uses_config_defaults_and_becomes_active() {
    let mut fx = fixture();
    let created = fx.service.create_note(Point::new(5, 6)).unwrap();

    let note = fx.service.note(&created).unwrap();
    assert_eq!(note.size(), Size::new(200, 100));
    assert_eq!(note.text(), "Enter a note.");
    assert!(note.is_active());
    assert_eq!(fx.surface.borrow().active_ids(), vec![created]);
}

#[test]
fn activation_is_exclusive_within_collection() {
    let mut fx = fixture();
    for name in ["a", "b", "c"] {
        fx.service.create_note_with_id(id(name), Point::new(0, 0)).unwrap();
    }
    fx.service.activate(&id("a")).unwrap();
    assert!(fx.service.note(&id("a")).unwrap().is_active());

    fx.service.click(&id("b")).unwrap();

    let active: Vec<_> = fx
        .service
        .notes()
        .entries()
        .filter(|(_, note)| note.is_active())
        .map(|(key, _)| key.clone())
        .collect();
    assert_eq!(active, vec![id("b")]);
    assert_eq!(fx.surface.borrow().active_ids(), vec![id("b")]);
}

#[test]
fn load_then_save_round_trips_records() {
    for count in [0_usize, 1, 5] {
        let mut fx = fixture();
        let records: Vec<NoteRecord> = (0..count)
            .map(|index| record(&format!("n{index}"), index as i32 * 10, 20))
            .collect();

        assert_eq!(fx.service.load_notes(records.clone()), count);
        assert_eq!(save_count(&fx.saves), 1);

        fx.service.save();
        let saved = fx.saves.borrow().last().cloned().unwrap();
        assert_eq!(saved, records);
        assert_eq!(fx.service.records(), records);
        assert_eq!(fx.surface.borrow().element_count(), count);
    }
}

#[test]
fn loaded_notes_start_inactive_and_keep_first_duplicate() {
    let mut fx = fixture();
    let first = record("dup", 1, 1);
    let mut second = record("dup", 2, 2);
    second.text = "later".to_string();

    assert_eq!(fx.service.load_notes(vec![first.clone(), second]), 1);
    let note = fx.service.note(&id("dup")).unwrap();
    assert_eq!(note.record(), first);
    assert!(!note.is_active());
}

#[test]
fn reloading_an_existing_identifier_replaces_its_element() {
    let mut fx = fixture();
    fx.service.load_notes(vec![record("a", 1, 1)]);
    fx.service.load_notes(vec![record("a", 30, 40)]);

    assert_eq!(fx.service.notes().len(), 1);
    let surface = fx.surface.borrow();
    assert_eq!(surface.element_count(), 1);
    assert_eq!(surface.element(&id("a")).unwrap().position, Point::new(30, 40));
}

#[test]
fn drag_out_of_bounds_is_rejected_and_restored() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    let saves_before = save_count(&fx.saves);

    assert!(fx
        .service
        .pointer_down(&id("n"), NoteHandle::Move, Point::new(0, 0))
        .unwrap());
    // Left edge ends 10px short of the surface's right edge.
    let target_left = SURFACE_SIZE.width as i32 - 10;
    fx.service.pointer_move(Point::new(target_left - 10, 0));
    assert_eq!(
        fx.surface.borrow().element(&id("n")).unwrap().position,
        Point::new(target_left, 10)
    );
    fx.service.pointer_up().unwrap();

    let note = fx.service.note(&id("n")).unwrap();
    assert_eq!(note.position(), Point::new(10, 10));
    assert_eq!(note.displayed_position(), Point::new(10, 10));
    assert_eq!(note.state(), NoteState::Idle);
    let surface = fx.surface.borrow();
    let element = surface.element(&id("n")).unwrap();
    assert_eq!(element.position, Point::new(10, 10));
    assert!(element.rollback_until.is_some());
    assert_eq!(save_count(&fx.saves), saves_before);
}

#[test]
fn valid_drag_commits_and_saves() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    let saves_before = save_count(&fx.saves);

    fx.service
        .pointer_down(&id("n"), NoteHandle::Move, Point::new(100, 100))
        .unwrap();
    fx.service.pointer_move(Point::new(130, 80));
    fx.service.pointer_move(Point::new(150, 160));
    fx.service.pointer_up().unwrap();

    assert_eq!(fx.service.note(&id("n")).unwrap().position(), Point::new(60, 70));
    assert_eq!(save_count(&fx.saves), saves_before + 1);
    let saved = fx.saves.borrow().last().cloned().unwrap();
    assert_eq!(saved[0].position, Point::new(60, 70));
    assert_eq!(fx.surface.borrow().selection_clears(), 2);
}

#[test]
fn resize_commits_without_bounds_check() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();

    fx.service
        .pointer_down(&id("n"), NoteHandle::Resize, Point::new(0, 0))
        .unwrap();
    fx.service.pointer_move(Point::new(5000, 40));
    fx.service.pointer_up().unwrap();

    let saved = fx.saves.borrow().last().cloned().unwrap();
    assert_eq!(saved[0].width, 5200);
    assert_eq!(saved[0].height, 140);
    assert_eq!(
        fx.surface.borrow().element(&id("n")).unwrap().size,
        Size::new(5200, 140)
    );
}

#[test]
fn pointer_move_without_gesture_changes_nothing() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    let saves_before = save_count(&fx.saves);

    fx.service.pointer_move(Point::new(300, 300));
    fx.service.pointer_up().unwrap();

    assert_eq!(fx.service.note(&id("n")).unwrap().displayed_position(), Point::new(10, 10));
    assert_eq!(save_count(&fx.saves), saves_before);
}

#[test]
fn text_is_saved_on_blur_only() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    let saves_before = save_count(&fx.saves);

    fx.service.focus_text(&id("n")).unwrap();
    assert_eq!(fx.service.note(&id("n")).unwrap().state(), NoteState::Editing);
    fx.service.key_up(&id("n"), "buy").unwrap();
    fx.service.key_up(&id("n"), "buy <b>milk</b>").unwrap();
    assert_eq!(save_count(&fx.saves), saves_before);

    fx.service.blur_text(&id("n")).unwrap();
    assert_eq!(save_count(&fx.saves), saves_before + 1);
    let saved = fx.saves.borrow().last().cloned().unwrap();
    assert_eq!(saved[0].text, "buy <b>milk</b>");
}

#[test]
fn context_menu_creates_note_relative_to_surface() {
    let mut fx = fixture_with_offset(Point::new(20, 30));

    let created = fx
        .service
        .on_context_menu(ContextMenuTarget::Surface, Point::new(120, 130))
        .unwrap()
        .unwrap();
    assert_eq!(fx.service.note(&created).unwrap().position(), Point::new(100, 100));

    let ignored = fx
        .service
        .on_context_menu(ContextMenuTarget::Descendant, Point::new(120, 130))
        .unwrap();
    assert_eq!(ignored, None);
    assert_eq!(fx.service.notes().len(), 1);
}

#[test]
fn before_unload_flushes_current_state() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    fx.service.key_up(&id("n"), "unsaved").unwrap();

    fx.service.on_before_unload();

    let saved = fx.saves.borrow().last().cloned().unwrap();
    assert_eq!(saved[0].text, "unsaved");
}

#[test]
fn remove_all_detaches_everything_with_one_save() {
    let mut fx = fixture();
    fx.service
        .load_notes(vec![record("a", 1, 1), record("b", 2, 2), record("c", 3, 3)]);
    let saves_before = save_count(&fx.saves);

    fx.service.remove_all();

    assert!(fx.service.notes().is_empty());
    assert_eq!(fx.surface.borrow().element_count(), 0);
    assert_eq!(save_count(&fx.saves), saves_before + 1);
    assert!(fx.saves.borrow().last().unwrap().is_empty());
}

#[test]
fn save_without_persistence_is_a_no_op() {
    let mut fx = fixture();
    fx.service.clear_persistence();
    assert!(!fx.service.has_persistence());

    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    fx.service.save();
    assert_eq!(save_count(&fx.saves), 0);
}

#[test]
fn unknown_and_duplicate_ids_are_reported() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();

    let err = fx
        .service
        .create_note_with_id(id("n"), Point::new(0, 0))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::DuplicateNote(_)));

    let err = fx.service.close(&id("missing")).unwrap_err();
    assert!(matches!(err, NoteServiceError::NoteNotFound(_)));

    let err = fx
        .service
        .pointer_down(&id("missing"), NoteHandle::Move, Point::new(0, 0))
        .unwrap_err();
    assert!(err.to_string().contains("missing"));

    let err = fx
        .service
        .create_note_with_id(id(" "), Point::new(0, 0))
        .unwrap_err();
    assert!(matches!(err, NoteServiceError::InvalidRecord(_)));
}

#[test]
fn remove_all_continues_past_already_detached_elements() {
    let mut fx = fixture();
    fx.service
        .load_notes(vec![record("a", 1, 1), record("b", 2, 2), record("c", 3, 3)]);
    fx.surface.borrow_mut().detach(&id("a")).unwrap();

    fx.service.remove_all();

    assert!(fx.service.notes().is_empty());
    assert_eq!(fx.surface.borrow().element_count(), 0);
}

#[test]
fn close_succeeds_when_element_is_already_gone() {
    let mut fx = fixture();
    fx.service.create_note_with_id(id("n"), Point::new(10, 10)).unwrap();
    fx.surface.borrow_mut().detach(&id("n")).unwrap();
    let saves_before = save_count(&fx.saves);

    fx.service.close(&id("n")).unwrap();

    assert!(fx.service.note(&id("n")).is_none());
    assert_eq!(save_count(&fx.saves), saves_before + 1);
}

/// Virtual surface whose next `failing_attaches` attach calls are refused.
struct FlakySurface {
    inner: VirtualSurface,
    failing_attaches: usize,
}

impl Surface for FlakySurface {
    fn size(&self) -> Size {
        self.inner.size()
    }

    fn page_offset(&self) -> Point {
        self.inner.page_offset()
    }

    fn attach(&mut self, record: &NoteRecord) -> SurfaceResult<()> {
        if self.failing_attaches > 0 {
            self.failing_attaches -= 1;
            return Err(SurfaceError::AlreadyAttached(record.identifier.clone()));
        }
        self.inner.attach(record)
    }

    fn detach(&mut self, id: &NoteId) -> SurfaceResult<()> {
        self.inner.detach(id)
    }

    fn place(&mut self, id: &NoteId, position: Point) {
        self.inner.place(id, position)
    }

    fn resize(&mut self, id: &NoteId, size: Size) {
        self.inner.resize(id, size)
    }

    fn set_active(&mut self, id: &NoteId, active: bool) {
        self.inner.set_active(id, active)
    }

    fn play_rollback(&mut self, id: &NoteId, duration: Duration) {
        self.inner.play_rollback(id, duration)
    }

    fn clear_selection(&mut self) {
        self.inner.clear_selection()
    }
}

fn flaky_service() -> (NoteService, Rc<RefCell<FlakySurface>>, Saves) {
    let surface = Rc::new(RefCell::new(FlakySurface {
        inner: VirtualSurface::new(SURFACE_SIZE),
        failing_attaches: 0,
    }));
    let shared: SharedSurface = surface.clone();
    let mut service = NoteService::new(shared, WidgetConfig::default());
    let saves: Saves = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&saves);
    service.set_persistence(move |records: &[NoteRecord]| sink.borrow_mut().push(records.to_vec()));
    (service, surface, saves)
}

#[test]
fn reload_restores_previous_element_when_attach_fails() {
    let (mut service, surface, _saves) = flaky_service();
    service.load_notes(vec![record("a", 1, 1)]);

    surface.borrow_mut().failing_attaches = 1;
    assert_eq!(service.load_notes(vec![record("a", 30, 40)]), 0);

    assert_eq!(service.note(&id("a")).unwrap().position(), Point::new(1, 1));
    let surface = surface.borrow();
    assert_eq!(surface.inner.element(&id("a")).unwrap().position, Point::new(1, 1));
}

#[test]
fn reload_drops_note_whose_element_cannot_be_restored() {
    let (mut service, surface, saves) = flaky_service();
    service.load_notes(vec![record("a", 1, 1), record("b", 2, 2)]);

    surface.borrow_mut().failing_attaches = 2;
    assert_eq!(service.load_notes(vec![record("a", 30, 40)]), 0);

    assert!(service.note(&id("a")).is_none());
    assert_eq!(surface.borrow().inner.element_count(), 1);
    assert_eq!(save_count(&saves), 2);
    let saved = saves.borrow().last().cloned().unwrap();
    assert_eq!(saved, vec![record("b", 2, 2)]);
}
