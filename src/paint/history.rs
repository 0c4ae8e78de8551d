use crate::paint::model::{Color, Point};
use crate::paint::raster::Canvas;
use crate::paint::stroke::Stroke;
use serde::{Deserialize, Serialize};

/// A finished stroke together with the brush color it was painted with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub color: Color,
    #[serde(rename = "pts", alias = "points")]
    pub points: Vec<Point>,
    pub sizes: Vec<f64>,
}

impl HistoryEntry {
    pub fn new(stroke: Stroke, color: Color) -> Self {
        let (points, sizes) = stroke.into_parts();
        Self {
            color,
            points,
            sizes,
        }
    }

    pub fn to_stroke(&self) -> Stroke {
        Stroke::from_parts(self.points.clone(), self.sizes.clone())
    }
}

/// Linear undo history: committed strokes plus the number of them that are
/// currently visible. Entries at or past `step` are redoable until the next
/// commit discards them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StrokeHistory {
    entries: Vec<HistoryEntry>,
    step: usize,
}

impl StrokeHistory {
    /// Restores persisted history. A stored cursor past the end is clamped.
    pub fn from_entries(entries: Vec<HistoryEntry>, step: usize) -> Self {
        let step = step.min(entries.len());
        Self { entries, step }
    }

    pub fn commit(&mut self, stroke: Stroke, color: Color) {
        self.entries.truncate(self.step);
        self.entries.push(HistoryEntry::new(stroke, color));
        self.step = self.entries.len();
    }

    pub fn undo(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        if self.step >= self.entries.len() {
            return false;
        }
        self.step += 1;
        true
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.step = 0;
    }

    pub fn can_undo(&self) -> bool {
        self.step > 0
    }

    pub fn can_redo(&self) -> bool {
        self.step < self.entries.len()
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn visible(&self) -> &[HistoryEntry] {
        &self.entries[..self.step]
    }

    /// Repaints the canvas from scratch: background first, then every visible
    /// stroke in its own color. The canvas fill color is left at the last
    /// stroke's color; callers restore the brush color afterwards.
    pub fn full_redraw(&self, canvas: &mut dyn Canvas, background: Color) {
        canvas.set_fill_color(background);
        canvas.fill_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
        for entry in self.visible() {
            canvas.set_fill_color(entry.color);
            entry.to_stroke().draw_all_segments(canvas);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::raster::tests::RecordingCanvas;

    fn sample_stroke(id: u8) -> Stroke {
        let mut stroke = Stroke::new();
        stroke.push(Point::new(f64::from(id), 0.0), 2.0);
        stroke
    }

    fn history_with(count: u8) -> StrokeHistory {
        let mut history = StrokeHistory::default();
        for id in 0..count {
            history.commit(sample_stroke(id), Color::rgb(id, 0, 0));
        }
        history
    }

    #[test]
    fn commit_after_undo_discards_redo_branch() {
        let mut history = history_with(3);
        assert_eq!(history.step(), 3);
        assert!(history.undo());
        assert!(history.undo());
        assert_eq!(history.step(), 1);

        history.commit(sample_stroke(9), Color::WHITE);
        assert_eq!(history.len(), 2);
        assert_eq!(history.step(), 2);
        assert!(!history.redo());
        assert_eq!(history.entries()[1].color, Color::WHITE);
        assert_eq!(history.entries()[0].color, Color::rgb(0, 0, 0));
    }

    #[test]
    fn undo_and_redo_stop_at_bounds() {
        let mut history = StrokeHistory::default();
        assert!(!history.undo());
        assert!(!history.redo());

        let mut history = history_with(2);
        assert!(!history.redo());
        assert!(history.undo());
        assert!(history.undo());
        assert!(!history.undo());
        assert_eq!(history.step(), 0);
        assert!(history.redo());
        assert_eq!(history.step(), 1);
    }

    #[test]
    fn clear_resets_cursor() {
        let mut history = history_with(3);
        history.undo();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.step(), 0);
        assert!(!history.can_redo());
    }

    #[test]
    fn full_redraw_paints_background_then_visible_entries_only() {
        let mut history = history_with(3);
        history.undo();
        let mut canvas = RecordingCanvas::default();
        history.full_redraw(&mut canvas, Color::WHITE);

        assert_eq!(canvas.rects, vec![(0.0, 0.0, 100.0, 100.0, Color::WHITE)]);
        let colors: Vec<Color> = canvas.dots.iter().map(|(_, _, c)| *c).collect();
        assert_eq!(colors, vec![Color::rgb(0, 0, 0), Color::rgb(1, 0, 0)]);
    }

    #[test]
    fn from_entries_clamps_cursor() {
        let entries = history_with(2).entries().to_vec();
        let history = StrokeHistory::from_entries(entries, 10);
        assert_eq!(history.step(), 2);
    }

    #[test]
    fn entry_serializes_with_pts_key() {
        let entry = HistoryEntry::new(sample_stroke(4), Color::rgb(0, 0, 255));
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r##"{"color":"#0000ff","pts":[[4.0,0.0]],"sizes":[2.0]}"##);

        let parsed: HistoryEntry =
            serde_json::from_str(r##"{"color":"#0000ff","points":[[4,0]],"sizes":[2]}"##).unwrap();
        assert_eq!(parsed, entry);
    }
}
