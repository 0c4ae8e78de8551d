use crate::paint::model::Point;

pub fn distance(a: Point, b: Point) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    // min/max instead of f64::clamp: user-entered bounds may be inverted.
    value.max(min).min(max)
}

/// Maps `value` from the range `a0..a1` onto `b0..b1` without clamping.
pub fn lerp(value: f64, (a0, a1): (f64, f64), (b0, b1): (f64, f64)) -> f64 {
    (value - a0) / (a1 - a0) * (b1 - b0) + b0
}

/// Piecewise-linear remap through the breakpoints `(xs[i], ys[i])`.
///
/// Picks the first interval whose upper breakpoint exceeds `value` (or the
/// last interval) and interpolates inside it, so values outside the
/// breakpoints extrapolate along the nearest end segment. Returns `None` when
/// fewer than two breakpoints are available.
pub fn lerp_intervals(value: f64, xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return None;
    }
    let i = (1..n).find(|&i| value < xs[i] || i == n - 1)?;
    Some(lerp(value, (xs[i - 1], xs[i]), (ys[i - 1], ys[i])))
}
