use drip_paint::paint::history::StrokeHistory;
use drip_paint::paint::settings_store::MemoryStore;
use drip_paint::paint::{
    Color, PaintEvent, PaintSession, PaintSettings, Point, PointerEvent, PointerKind,
};
use std::time::{Duration, Instant};

fn steady_session() -> PaintSession<MemoryStore> {
    let settings = PaintSettings {
        min_random_multiplier: 1.0,
        max_random_multiplier: 1.0,
        ..PaintSettings::default()
    };
    PaintSession::from_parts(MemoryStore::new(), settings, StrokeHistory::default(), (160, 40))
}

fn pointer(kind: PointerKind, x: f64, y: f64, at: Instant) -> PaintEvent {
    PointerEvent::new(kind, Point::new(x, y), kind != PointerKind::Up, at).into()
}

#[test]
fn horizontal_drag_produces_one_committed_stroke() {
    let mut session = steady_session();
    let t0 = Instant::now();

    session.handle_event(pointer(PointerKind::Down, 0.0, 0.0, t0)).unwrap();
    for step in 1..=10u64 {
        let at = t0 + Duration::from_millis(step * 5);
        session
            .handle_event(pointer(PointerKind::Move, step as f64 * 10.0, 0.0, at))
            .unwrap();
        session.handle_event(PaintEvent::Tick(at)).unwrap();
    }
    session
        .handle_event(pointer(PointerKind::Up, 100.0, 0.0, t0 + Duration::from_millis(50)))
        .unwrap();

    let history = session.history();
    assert_eq!(history.len(), 1);
    assert_eq!(history.step(), 1);

    let entry = &history.entries()[0];
    assert!(entry.points.len() >= 2);
    assert_eq!(entry.points.len(), entry.sizes.len());
    assert_eq!(entry.points.first(), Some(&Point::new(0.0, 0.0)));
    assert_eq!(entry.points.last(), Some(&Point::new(100.0, 0.0)));
    let settings = session.settings();
    assert!(entry
        .sizes
        .iter()
        .all(|s| (settings.min_thickness..=settings.max_thickness).contains(s)));
    assert_eq!(entry.color, Color::BLACK);

    for x in [0, 25, 50, 75, 90] {
        assert_eq!(session.canvas().pixel(x, 0), Some(Color::BLACK), "x = {x}");
    }
    assert_eq!(session.canvas().pixel(150, 30), Some(Color::WHITE));
}

#[test]
fn slow_pointer_paints_thicker_than_fast_pointer() {
    let mut session = steady_session();
    let t0 = Instant::now();

    session.pointer_down(Point::new(0.0, 0.0), t0);
    session.pointer_move(Point::new(5.0, 0.0), t0 + Duration::from_millis(50));
    session
        .pointer_up(Point::new(10.0, 0.0), t0 + Duration::from_millis(100))
        .unwrap();

    let t1 = t0 + Duration::from_secs(1);
    session.pointer_down(Point::new(0.0, 20.0), t1);
    session.pointer_move(Point::new(60.0, 20.0), t1 + Duration::from_millis(10));
    session
        .pointer_up(Point::new(120.0, 20.0), t1 + Duration::from_millis(20))
        .unwrap();

    let entries = session.history().entries();
    let slow = entries[0].sizes.last().copied().unwrap();
    let fast = entries[1].sizes.last().copied().unwrap();
    assert!(slow > fast, "slow {slow} should exceed fast {fast}");
    assert_eq!(fast, session.settings().min_thickness);
}

#[test]
fn pause_at_end_of_stroke_thickens_trailing_point() {
    let mut session = steady_session();
    let t0 = Instant::now();
    session.pointer_down(Point::new(0.0, 10.0), t0);
    session.pointer_move(Point::new(40.0, 10.0), t0 + Duration::from_millis(10));
    let before = session.active_stroke().unwrap().last_size().unwrap();

    for ms in (20..=200).step_by(10) {
        session.tick(t0 + Duration::from_millis(ms));
    }
    let after = session.active_stroke().unwrap().last_size().unwrap();
    assert!(after > before);
    assert_eq!(after, session.settings().max_thickness);
}

#[test]
fn undo_then_new_stroke_drops_redo_branch() {
    let mut session = steady_session();
    let t0 = Instant::now();
    for row in 0..3u64 {
        let y = 5.0 + row as f64 * 10.0;
        let at = t0 + Duration::from_secs(row);
        session.pointer_down(Point::new(10.0, y), at);
        session
            .pointer_up(Point::new(50.0, y), at + Duration::from_millis(30))
            .unwrap();
    }
    assert_eq!(session.history().len(), 3);

    assert!(session.undo().unwrap());
    assert!(session.undo().unwrap());
    let at = t0 + Duration::from_secs(10);
    session.pointer_down(Point::new(80.0, 5.0), at);
    session
        .pointer_up(Point::new(120.0, 5.0), at + Duration::from_millis(30))
        .unwrap();

    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().step(), 2);
    assert!(!session.redo().unwrap());
}
