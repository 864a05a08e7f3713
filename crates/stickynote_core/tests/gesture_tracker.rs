use stickynote_core::{Delta, GestureHandler, GestureTracker, Point};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Start,
    Move(Delta),
    End,
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl GestureHandler for Recorder {
    fn on_start(&mut self) {
        self.calls.push(Call::Start);
    }

    fn on_move(&mut self, delta: Delta) {
        self.calls.push(Call::Move(delta));
    }

    fn on_end(&mut self) {
        self.calls.push(Call::End);
    }
}

/// Overrides `on_move` only.
#[derive(Default)]
struct MoveOnly {
    deltas: Vec<Delta>,
}

impl GestureHandler for MoveOnly {
    fn on_move(&mut self, delta: Delta) {
        self.deltas.push(delta);
    }
}

#[test]
fn deltas_are_cumulative_from_origin() {
    let mut tracker = GestureTracker::track();
    let mut recorder = Recorder::default();

    assert!(tracker.pointer_down(Point::new(100, 100), &mut recorder));
    tracker.pointer_move(Point::new(130, 80), &mut recorder);
    tracker.pointer_move(Point::new(150, 60), &mut recorder);
    tracker.pointer_up(&mut recorder);

    assert_eq!(
        recorder.calls,
        vec![
            Call::Start,
            Call::Move(Delta::new(30, -20)),
            Call::Move(Delta::new(50, -40)),
            Call::End,
        ]
    );
    assert!(!tracker.is_active());
}

#[test]
fn moves_are_forwarded_without_an_end_handler() {
    let mut tracker = GestureTracker::track();
    let mut handler = MoveOnly::default();

    tracker.pointer_down(Point::new(0, 0), &mut handler);
    tracker.pointer_move(Point::new(3, 4), &mut handler);
    tracker.pointer_up(&mut handler);

    assert_eq!(handler.deltas, vec![Delta::new(3, 4)]);
}

#[test]
fn second_pointer_down_is_ignored_while_active() {
    let mut tracker = GestureTracker::track();
    let mut recorder = Recorder::default();

    assert!(tracker.pointer_down(Point::new(10, 10), &mut recorder));
    assert!(!tracker.pointer_down(Point::new(50, 50), &mut recorder));
    assert_eq!(tracker.origin(), Some(Point::new(10, 10)));

    tracker.pointer_move(Point::new(20, 20), &mut recorder);
    assert_eq!(
        recorder.calls,
        vec![Call::Start, Call::Move(Delta::new(10, 10))]
    );
}

#[test]
fn tracker_can_run_consecutive_gestures() {
    let mut tracker = GestureTracker::track();
    let mut recorder = Recorder::default();

    tracker.pointer_down(Point::new(0, 0), &mut recorder);
    tracker.pointer_up(&mut recorder);
    tracker.pointer_down(Point::new(5, 5), &mut recorder);
    tracker.pointer_move(Point::new(6, 5), &mut recorder);

    assert_eq!(recorder.calls.last(), Some(&Call::Move(Delta::new(1, 0))));
}

#[test]
fn separate_trackers_keep_separate_origins() {
    let mut first = GestureTracker::track();
    let mut second = GestureTracker::track();
    let mut recorder = Recorder::default();

    first.pointer_down(Point::new(0, 0), &mut recorder);
    second.pointer_down(Point::new(100, 100), &mut recorder);

    assert_eq!(first.origin(), Some(Point::new(0, 0)));
    assert_eq!(second.origin(), Some(Point::new(100, 100)));
}
