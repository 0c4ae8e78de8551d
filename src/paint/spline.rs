//! Centripetal Catmull-Rom segments used to smooth stroke spans.

use crate::paint::geometry::distance;
use crate::paint::model::Point;

/// Knot spacing exponent. 0.5 gives the centripetal parameterization, which
/// avoids cusps and self-intersections on unevenly spaced samples.
pub const CENTRIPETAL_ALPHA: f64 = 0.5;
pub const DEFAULT_TENSION: f64 = 0.0;

/// Cubic segment between the two inner points of a four-point window.
///
/// The segment is stored as Hermite-derived power-basis coefficients so that
/// `point_at(0.0)` is `p1` and `point_at(1.0)` is `p2`.
///
/// Coincident neighbouring control points produce a zero knot interval and
/// therefore non-finite coefficients; callers are expected to route such
/// windows to the dot/segment paths instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatmullRom {
    a: Point,
    b: Point,
    c: Point,
    d: Point,
}

impl CatmullRom {
    pub fn centripetal(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self::new(p0, p1, p2, p3, CENTRIPETAL_ALPHA, DEFAULT_TENSION)
    }

    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point, alpha: f64, tension: f64) -> Self {
        let t0 = 0.0;
        let t1 = t0 + distance(p0, p1).powf(alpha);
        let t2 = t1 + distance(p1, p2).powf(alpha);
        let t3 = t2 + distance(p2, p3).powf(alpha);

        let scale = (1.0 - tension) * (t2 - t1);
        let m1_axis = |v0: f64, v1: f64, v2: f64| {
            scale * ((v1 - v0) / (t1 - t0) - (v2 - v0) / (t2 - t0) + (v2 - v1) / (t2 - t1))
        };
        let m2_axis = |v1: f64, v2: f64, v3: f64| {
            scale * ((v2 - v1) / (t2 - t1) - (v3 - v1) / (t3 - t1) + (v3 - v2) / (t3 - t2))
        };

        let m1 = Point::new(m1_axis(p0.x, p1.x, p2.x), m1_axis(p0.y, p1.y, p2.y));
        let m2 = Point::new(m2_axis(p1.x, p2.x, p3.x), m2_axis(p1.y, p2.y, p3.y));

        let a = Point::new(
            2.0 * (p1.x - p2.x) + m1.x + m2.x,
            2.0 * (p1.y - p2.y) + m1.y + m2.y,
        );
        let b = Point::new(
            -3.0 * (p1.x - p2.x) - 2.0 * m1.x - m2.x,
            -3.0 * (p1.y - p2.y) - 2.0 * m1.y - m2.y,
        );

        Self { a, b, c: m1, d: p1 }
    }

    pub fn point_at(&self, t: f64) -> Point {
        let t2 = t * t;
        let t3 = t2 * t;
        Point::new(
            self.a.x * t3 + self.b.x * t2 + self.c.x * t + self.d.x,
            self.a.y * t3 + self.b.y * t2 + self.c.y * t + self.d.y,
        )
    }
}
