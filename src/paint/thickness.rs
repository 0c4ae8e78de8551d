//! Speed-driven brush thickness.
//!
//! Pointer speed is measured over a short sliding time window and mapped to a
//! thickness through a user-editable piecewise-linear curve, then scaled by a
//! per-stroke random multiplier.

use crate::paint::geometry::{clamp, distance, lerp, lerp_intervals};
use crate::paint::model::Point;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

pub const DEFAULT_CURVE_SPEEDS: [f64; 3] = [0.0, 1.0, 1.5];
pub const DEFAULT_CURVE_THICKNESSES: [f64; 3] = [20.0, 10.0, 1.0];

/// Piecewise-linear speed → thickness mapping.
///
/// Serialized as `[[speed, ...], [thickness, ...]]`. Always holds at least two
/// control points sorted by speed; invalid stored curves load as the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Vec<f64>, Vec<f64>)", into = "(Vec<f64>, Vec<f64>)")]
pub struct ThicknessCurve {
    speeds: Vec<f64>,
    thicknesses: Vec<f64>,
}

impl Default for ThicknessCurve {
    fn default() -> Self {
        Self {
            speeds: DEFAULT_CURVE_SPEEDS.to_vec(),
            thicknesses: DEFAULT_CURVE_THICKNESSES.to_vec(),
        }
    }
}

impl From<(Vec<f64>, Vec<f64>)> for ThicknessCurve {
    fn from((speeds, thicknesses): (Vec<f64>, Vec<f64>)) -> Self {
        Self::new(speeds, thicknesses).unwrap_or_else(|| {
            tracing::warn!("stored thickness curve is malformed; using the default curve");
            Self::default()
        })
    }
}

impl From<ThicknessCurve> for (Vec<f64>, Vec<f64>) {
    fn from(curve: ThicknessCurve) -> Self {
        (curve.speeds, curve.thicknesses)
    }
}

impl ThicknessCurve {
    /// Builds a curve from parallel breakpoint arrays. Returns `None` unless
    /// both arrays have the same length of at least two and finite values.
    pub fn new(speeds: Vec<f64>, thicknesses: Vec<f64>) -> Option<Self> {
        if speeds.len() < 2 || speeds.len() != thicknesses.len() {
            return None;
        }
        if speeds.iter().chain(&thicknesses).any(|v| !v.is_finite()) {
            return None;
        }
        let mut pairs: Vec<(f64, f64)> = speeds.into_iter().zip(thicknesses).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (speeds, thicknesses) = pairs.into_iter().unzip();
        Some(Self {
            speeds,
            thicknesses,
        })
    }

    pub fn speeds(&self) -> &[f64] {
        &self.speeds
    }

    pub fn thicknesses(&self) -> &[f64] {
        &self.thicknesses
    }

    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    pub fn point(&self, idx: usize) -> Option<(f64, f64)> {
        Some((*self.speeds.get(idx)?, *self.thicknesses.get(idx)?))
    }

    pub fn evaluate(&self, speed: f64) -> f64 {
        lerp_intervals(speed, &self.speeds, &self.thicknesses)
            .or_else(|| self.thicknesses.first().copied())
            .unwrap_or(0.0)
    }

    /// Adds a control point, keeping speeds ordered. Returns its index.
    pub fn insert_point(&mut self, speed: f64, thickness: f64) -> usize {
        let idx = self.speeds.partition_point(|&s| s <= speed);
        self.speeds.insert(idx, speed);
        self.thicknesses.insert(idx, thickness);
        idx
    }

    /// Removes an interior control point. The two endpoints anchor the curve
    /// and are never removed.
    pub fn remove_point(&mut self, idx: usize) -> bool {
        if idx == 0 || idx + 1 >= self.speeds.len() {
            return false;
        }
        self.speeds.remove(idx);
        self.thicknesses.remove(idx);
        true
    }

    /// Drags a control point. Endpoints only move vertically; interior points
    /// move horizontally only while staying between their neighbours.
    pub fn move_point(&mut self, idx: usize, speed: f64, thickness: f64) {
        let len = self.speeds.len();
        if idx >= len {
            return;
        }
        self.thicknesses[idx] = thickness;
        if idx == 0 || idx == len - 1 {
            return;
        }
        if self.speeds[idx - 1] <= speed && speed <= self.speeds[idx + 1] {
            self.speeds[idx] = speed;
        }
    }

    /// Expresses the curve relative to the given axes, with both axes mapped
    /// onto `0..1`. Returns `None` when either axis has zero length.
    pub fn normalized(&self, speed_axis: (f64, f64), thickness_axis: (f64, f64)) -> Option<Self> {
        let degenerate = |(lo, hi): (f64, f64)| !(hi - lo).is_finite() || hi == lo;
        if degenerate(speed_axis) || degenerate(thickness_axis) {
            return None;
        }
        Some(self.remapped(
            |speed| lerp(speed, speed_axis, (0.0, 1.0)),
            |thickness| lerp(thickness, thickness_axis, (0.0, 1.0)),
        ))
    }

    /// Inverse of [`ThicknessCurve::normalized`]: places a `0..1` shape onto
    /// the given axes. A zero-length axis collapses that coordinate.
    pub fn mapped(&self, speed_axis: (f64, f64), thickness_axis: (f64, f64)) -> Self {
        self.remapped(
            |speed| lerp(speed, (0.0, 1.0), speed_axis),
            |thickness| lerp(thickness, (0.0, 1.0), thickness_axis),
        )
    }

    fn remapped(&self, speed: impl Fn(f64) -> f64, thickness: impl Fn(f64) -> f64) -> Self {
        Self {
            speeds: self.speeds.iter().map(|&s| speed(s)).collect(),
            thicknesses: self.thicknesses.iter().map(|&t| thickness(t)).collect(),
        }
    }
}

/// Parameters of the speed → thickness mapping for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct ThicknessModel<'a> {
    pub curve: &'a ThicknessCurve,
    pub min_thickness: f64,
    pub max_thickness: f64,
    pub sample_window: Duration,
}

impl ThicknessModel<'_> {
    pub fn size_for_speed(&self, speed: f64, multiplier: f64) -> f64 {
        let size = self.curve.evaluate(speed);
        clamp(size, self.min_thickness, self.max_thickness) * multiplier
    }

    /// Thickness for the newest point of a stroke sampled at `times`.
    pub fn size_at(&self, points: &[Point], times: &[Instant], now: Instant, multiplier: f64) -> f64 {
        let speed = estimate_speed(points, times, now, self.sample_window);
        self.size_for_speed(speed, multiplier)
    }
}

/// Average pointer speed in pixels per millisecond over the samples taken
/// within `window` of `now`.
///
/// Walks back from the second-to-last sample, summing the distance to each
/// following sample; the duration is measured to the oldest sample still in
/// the window and floored at one millisecond.
pub fn estimate_speed(points: &[Point], times: &[Instant], now: Instant, window: Duration) -> f64 {
    let n = points.len().min(times.len());
    let window_ms = duration_ms(window);
    let mut distance_sum = 0.0;
    let mut duration = 1.0;
    let mut i = n.checked_sub(2);
    while let Some(idx) = i {
        let elapsed = duration_ms(now.saturating_duration_since(times[idx]));
        if elapsed >= window_ms {
            break;
        }
        duration = elapsed;
        distance_sum += distance(points[idx], points[idx + 1]);
        i = idx.checked_sub(1);
    }
    distance_sum / duration.max(1.0)
}

/// Draws the per-stroke thickness multiplier uniformly from `min..max`.
/// An inverted range is sampled as-is rather than rejected.
pub fn random_multiplier<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    lerp(rng.gen::<f64>(), (0.0, 1.0), (min, max))
}

fn duration_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn model(curve: &ThicknessCurve) -> ThicknessModel<'_> {
        ThicknessModel {
            curve,
            min_thickness: 1.0,
            max_thickness: 20.0,
            sample_window: Duration::from_millis(100),
        }
    }

    #[test]
    fn default_curve_hits_each_breakpoint() {
        let curve = ThicknessCurve::default();
        for (speed, thickness) in DEFAULT_CURVE_SPEEDS.iter().zip(DEFAULT_CURVE_THICKNESSES) {
            assert_eq!(curve.evaluate(*speed), thickness);
        }
    }

    #[test]
    fn size_is_clamped_then_scaled() {
        let curve = ThicknessCurve::default();
        let model = model(&curve);
        assert_eq!(model.size_for_speed(0.0, 1.0), 20.0);
        // Extrapolated past the last breakpoint, clamped to the minimum.
        assert_eq!(model.size_for_speed(10.0, 1.0), 1.0);
        assert_eq!(model.size_for_speed(-5.0, 0.5), 10.0);
    }

    #[test]
    fn speed_uses_only_samples_inside_window() {
        let t0 = Instant::now();
        let points = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(110.0, 0.0),
            Point::new(120.0, 0.0),
        ];
        let times = [
            t0,
            t0 + Duration::from_millis(150),
            t0 + Duration::from_millis(180),
            t0 + Duration::from_millis(200),
        ];
        let now = t0 + Duration::from_millis(200);
        // Samples at 150ms and 180ms are inside the 100ms window; 0ms is not.
        let speed = estimate_speed(&points, &times, now, Duration::from_millis(100));
        assert!((speed - 20.0 / 50.0).abs() < 1e-9);
    }

    #[test]
    fn speed_of_single_sample_is_zero() {
        let t0 = Instant::now();
        let speed = estimate_speed(&[Point::new(1.0, 1.0)], &[t0], t0, Duration::from_millis(100));
        assert_eq!(speed, 0.0);
        assert_eq!(estimate_speed(&[], &[], t0, Duration::from_millis(100)), 0.0);
    }

    #[test]
    fn speed_duration_is_floored_at_one_millisecond() {
        let t0 = Instant::now();
        let points = [Point::new(0.0, 0.0), Point::new(6.0, 8.0)];
        let times = [t0, t0];
        let speed = estimate_speed(&points, &times, t0, Duration::from_millis(100));
        assert_eq!(speed, 10.0);
    }

    #[test]
    fn insert_keeps_speeds_sorted() {
        let mut curve = ThicknessCurve::default();
        let idx = curve.insert_point(0.5, 12.0);
        assert_eq!(idx, 1);
        assert_eq!(curve.speeds(), &[0.0, 0.5, 1.0, 1.5]);
        assert_eq!(curve.thicknesses(), &[20.0, 12.0, 10.0, 1.0]);
    }

    #[test]
    fn endpoints_cannot_be_removed() {
        let mut curve = ThicknessCurve::default();
        assert!(!curve.remove_point(0));
        assert!(!curve.remove_point(2));
        assert!(curve.remove_point(1));
        assert!(!curve.remove_point(1));
        assert_eq!(curve.len(), 2);
    }

    #[test]
    fn endpoints_move_vertically_only() {
        let mut curve = ThicknessCurve::default();
        curve.move_point(0, 0.7, 15.0);
        assert_eq!(curve.point(0), Some((0.0, 15.0)));
        curve.move_point(2, 0.2, 3.0);
        assert_eq!(curve.point(2), Some((1.5, 3.0)));
    }

    #[test]
    fn interior_point_cannot_cross_neighbours() {
        let mut curve = ThicknessCurve::default();
        curve.move_point(1, 1.2, 8.0);
        assert_eq!(curve.point(1), Some((1.2, 8.0)));
        curve.move_point(1, 1.8, 6.0);
        assert_eq!(curve.point(1), Some((1.2, 6.0)));
    }

    #[test]
    fn mapping_onto_new_axes_preserves_relative_shape() {
        let shape = ThicknessCurve::default()
            .normalized((0.0, 1.5), (1.0, 20.0))
            .unwrap();
        let curve = shape.mapped((0.0, 3.0), (1.0, 39.0));
        let expected = [(0.0, 39.0), (2.0, 19.0), (3.0, 1.0)];
        for (idx, (speed, thickness)) in expected.into_iter().enumerate() {
            let (s, t) = curve.point(idx).unwrap();
            assert!((s - speed).abs() < 1e-9, "speed {idx}: {s}");
            assert!((t - thickness).abs() < 1e-9, "thickness {idx}: {t}");
        }
    }

    #[test]
    fn zero_length_axis_cannot_be_normalized_but_can_be_mapped() {
        let curve = ThicknessCurve::default();
        assert!(curve.normalized((0.0, 1.5), (5.0, 5.0)).is_none());
        assert!(curve.normalized((0.0, 0.0), (1.0, 20.0)).is_none());

        let shape = curve.normalized((0.0, 1.5), (1.0, 20.0)).unwrap();
        let flat = shape.mapped((0.0, 1.5), (5.0, 5.0));
        assert_eq!(flat.thicknesses(), &[5.0, 5.0, 5.0]);
        let back = shape.mapped((0.0, 1.5), (1.0, 20.0));
        for (a, b) in back.thicknesses().iter().zip(curve.thicknesses()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn malformed_curve_deserializes_to_default() {
        let curve: ThicknessCurve = serde_json::from_str("[[0.0],[1.0]]").unwrap();
        assert_eq!(curve, ThicknessCurve::default());
        let curve: ThicknessCurve = serde_json::from_str("[[0,1],[5,6,7]]").unwrap();
        assert_eq!(curve, ThicknessCurve::default());
    }

    #[test]
    fn curve_serializes_as_two_arrays() {
        let json = serde_json::to_string(&ThicknessCurve::default()).unwrap();
        assert_eq!(json, "[[0.0,1.0,1.5],[20.0,10.0,1.0]]");
    }

    #[test]
    fn random_multiplier_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let m = random_multiplier(&mut rng, 0.5, 1.5);
            assert!((0.5..1.5).contains(&m));
        }
        assert_eq!(random_multiplier(&mut rng, 1.0, 1.0), 1.0);
    }
}
