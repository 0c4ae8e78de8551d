use crate::paint::{Point, PointerEvent, PointerKind};
use std::time::Instant;

/// Turns per-frame pointer snapshots into discrete canvas pointer events.
///
/// egui reports state (position, button held, hover) rather than DOM-style
/// events, so transitions are derived by comparing against the previous frame.
#[derive(Debug, Default, Clone)]
pub struct PointerTracker {
    inside: bool,
    pressed: bool,
    last_position: Option<Point>,
}

impl PointerTracker {
    /// `position` is in canvas coordinates; `inside` tells whether it lies
    /// over the canvas this frame.
    pub fn update(
        &mut self,
        position: Option<Point>,
        inside: bool,
        primary_down: bool,
        at: Instant,
    ) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let position = position.or(self.last_position);
        let Some(pos) = position else {
            self.pressed = primary_down;
            return events;
        };

        let entered = inside && !self.inside;
        if entered {
            events.push(PointerEvent::new(PointerKind::Enter, pos, primary_down, at));
        } else if !inside && self.inside {
            events.push(PointerEvent::new(PointerKind::Leave, pos, primary_down, at));
        } else if inside {
            match (self.pressed, primary_down) {
                (false, true) => {
                    events.push(PointerEvent::new(PointerKind::Down, pos, true, at));
                }
                (true, true) => {
                    if self.last_position != Some(pos) {
                        events.push(PointerEvent::new(PointerKind::Move, pos, true, at));
                    }
                }
                (true, false) => {
                    events.push(PointerEvent::new(PointerKind::Up, pos, false, at));
                }
                (false, false) => {}
            }
        }

        self.inside = inside;
        self.pressed = primary_down;
        self.last_position = Some(pos);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(events: &[PointerEvent]) -> Vec<(PointerKind, bool)> {
        events.iter().map(|e| (e.kind, e.buttons_held)).collect()
    }

    #[test]
    fn press_drag_release_inside_canvas() {
        let mut tracker = PointerTracker::default();
        let t = Instant::now();
        let p = |x: f64| Some(Point::new(x, 5.0));

        assert_eq!(kinds(&tracker.update(p(1.0), true, false, t)), vec![(PointerKind::Enter, false)]);
        assert_eq!(kinds(&tracker.update(p(1.0), true, true, t)), vec![(PointerKind::Down, true)]);
        assert_eq!(kinds(&tracker.update(p(4.0), true, true, t)), vec![(PointerKind::Move, true)]);
        assert!(tracker.update(p(4.0), true, true, t).is_empty());
        assert_eq!(kinds(&tracker.update(p(4.0), true, false, t)), vec![(PointerKind::Up, false)]);
        assert!(tracker.update(p(6.0), true, false, t).is_empty());
    }

    #[test]
    fn leaving_and_reentering_with_button_held() {
        let mut tracker = PointerTracker::default();
        let t = Instant::now();
        tracker.update(Some(Point::new(1.0, 1.0)), true, false, t);
        tracker.update(Some(Point::new(1.0, 1.0)), true, true, t);

        let leave = tracker.update(Some(Point::new(-3.0, 1.0)), false, true, t);
        assert_eq!(kinds(&leave), vec![(PointerKind::Leave, true)]);
        assert_eq!(leave[0].position, Point::new(-3.0, 1.0));
        assert!(tracker.update(Some(Point::new(-9.0, 1.0)), false, true, t).is_empty());

        let enter = tracker.update(Some(Point::new(2.0, 1.0)), true, true, t);
        assert_eq!(kinds(&enter), vec![(PointerKind::Enter, true)]);
    }

    #[test]
    fn missing_position_reuses_last_known() {
        let mut tracker = PointerTracker::default();
        let t = Instant::now();
        assert!(tracker.update(None, false, false, t).is_empty());
        tracker.update(Some(Point::new(3.0, 3.0)), true, true, t);
        let events = tracker.update(None, false, false, t);
        assert_eq!(kinds(&events), vec![(PointerKind::Leave, false)]);
        assert_eq!(events[0].position, Point::new(3.0, 3.0));
    }
}
