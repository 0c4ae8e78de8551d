use crate::paint::geometry::distance;
use crate::paint::model::Point;
use crate::paint::raster::{curve_step_count, draw_curve_span, draw_dot, draw_segment, Canvas};

/// Spans whose inner points are closer than this are stamped as a dot
/// instead of being fed to the spline.
const MIN_SPAN_LENGTH: f64 = 1.0;

/// One painted gesture: sample points and the thickness recorded for each.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stroke {
    points: Vec<Point>,
    sizes: Vec<f64>,
}

impl Stroke {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a stroke from stored parallel arrays. Extra entries on the
    /// longer side are dropped so the two sequences stay the same length.
    pub fn from_parts(mut points: Vec<Point>, mut sizes: Vec<f64>) -> Self {
        let len = points.len().min(sizes.len());
        points.truncate(len);
        sizes.truncate(len);
        Self { points, sizes }
    }

    pub fn into_parts(self) -> (Vec<Point>, Vec<f64>) {
        (self.points, self.sizes)
    }

    pub fn push(&mut self, point: Point, size: f64) {
        self.points.push(point);
        self.sizes.push(size);
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn last_size(&self) -> Option<f64> {
        self.sizes.last().copied()
    }

    pub fn set_last_size(&mut self, size: f64) {
        if let Some(last) = self.sizes.last_mut() {
            *last = size;
        }
    }

    /// Renders the geometry that appeared when the `i`-th point was added.
    ///
    /// A spline span needs four points and lags one point behind the input:
    /// appending point `i` smooths the span between `points[i-3]` and
    /// `points[i-2]`.
    pub fn draw_segment_at(&self, canvas: &mut dyn Canvas, i: usize) {
        if i == 0 || i > self.points.len() {
            return;
        }
        let p = &self.points;
        let s = &self.sizes;
        match i {
            1 => draw_dot(canvas, p[0], s[0]),
            2 => draw_segment(canvas, p[0], p[1], s[1]),
            // Bridges p1..p2 until the fourth point allows a spline over it.
            3 => draw_segment(canvas, p[1], p[2], s[2]),
            _ => {
                let d = distance(p[i - 3], p[i - 2]);
                if d < MIN_SPAN_LENGTH {
                    draw_dot(canvas, p[i - 2], s[i - 1]);
                } else {
                    draw_curve_span(
                        canvas,
                        [p[i - 4], p[i - 3], p[i - 2], p[i - 1]],
                        s[i - 2],
                        s[i - 1],
                        curve_step_count(d),
                    );
                }
            }
        }
    }

    pub fn draw_last_segment(&self, canvas: &mut dyn Canvas) {
        self.draw_segment_at(canvas, self.points.len());
    }

    pub fn draw_all_segments(&self, canvas: &mut dyn Canvas) {
        for i in 0..=self.points.len() {
            self.draw_segment_at(canvas, i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Stroke;
    use crate::paint::model::Point;
    use crate::paint::raster::tests::RecordingCanvas;

    fn stroke(points: &[(f64, f64)], size: f64) -> Stroke {
        let mut stroke = Stroke::new();
        for &(x, y) in points {
            stroke.push(Point::new(x, y), size);
        }
        stroke
    }

    #[test]
    fn empty_stroke_draws_nothing() {
        let mut canvas = RecordingCanvas::default();
        Stroke::new().draw_all_segments(&mut canvas);
        Stroke::new().draw_last_segment(&mut canvas);
        assert!(canvas.dots.is_empty());
    }

    #[test]
    fn single_point_draws_one_dot() {
        let mut canvas = RecordingCanvas::default();
        let stroke = stroke(&[(4.0, 4.0)], 3.0);
        stroke.draw_last_segment(&mut canvas);
        assert_eq!(canvas.dots, vec![(Point::new(4.0, 4.0), 3.0, canvas.fill)]);
    }

    #[test]
    fn second_point_draws_straight_segment_with_its_size() {
        let mut canvas = RecordingCanvas::default();
        let mut stroke = stroke(&[(0.0, 0.0)], 2.0);
        stroke.push(Point::new(5.0, 0.0), 7.0);
        stroke.draw_last_segment(&mut canvas);
        assert_eq!(canvas.dots.len(), 5);
        assert!(canvas.dots.iter().all(|(_, r, _)| *r == 7.0));
    }

    #[test]
    fn third_point_bridges_the_middle_pair() {
        let mut canvas = RecordingCanvas::default();
        let mut stroke = stroke(&[(0.0, 0.0), (0.0, 4.0)], 2.0);
        stroke.push(Point::new(0.0, 10.0), 5.0);
        stroke.draw_last_segment(&mut canvas);
        let ys: Vec<f64> = canvas.dots.iter().map(|(p, _, _)| p.y).collect();
        assert_eq!(ys, vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert!(canvas.dots.iter().all(|(_, r, _)| *r == 5.0));
    }

    #[test]
    fn fourth_point_smooths_previous_span() {
        let mut canvas = RecordingCanvas::default();
        let mut stroke = stroke(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)], 2.0);
        stroke.push(Point::new(30.0, 0.0), 4.0);
        stroke.draw_last_segment(&mut canvas);
        assert!(!canvas.dots.is_empty());
        assert!(canvas
            .dots
            .iter()
            .all(|(p, _, _)| p.x > 10.0 && p.x <= 20.0 + 1e-9 && p.y.abs() < 1e-9));
    }

    #[test]
    fn short_span_is_stamped_as_a_dot() {
        let mut canvas = RecordingCanvas::default();
        let mut stroke = stroke(&[(0.0, 0.0), (10.0, 0.0), (10.5, 0.0)], 2.0);
        stroke.push(Point::new(20.0, 0.0), 6.0);
        stroke.draw_last_segment(&mut canvas);
        assert_eq!(canvas.dots, vec![(Point::new(10.5, 0.0), 6.0, canvas.fill)]);
    }

    #[test]
    fn replay_visits_every_index() {
        let stroke = stroke(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0)], 2.0);
        let mut replay = RecordingCanvas::default();
        stroke.draw_all_segments(&mut replay);

        let mut incremental = RecordingCanvas::default();
        for i in 0..=stroke.len() {
            stroke.draw_segment_at(&mut incremental, i);
        }
        assert_eq!(replay.dots, incremental.dots);
        assert!(!replay.dots.is_empty());
    }

    #[test]
    fn from_parts_keeps_arrays_parallel() {
        let stroke = Stroke::from_parts(
            vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
            vec![1.0, 2.0, 3.0],
        );
        assert_eq!(stroke.points().len(), stroke.sizes().len());
        assert_eq!(stroke.len(), 2);
    }
}
