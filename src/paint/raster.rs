use crate::paint::geometry::lerp;
use crate::paint::model::{Color, Point};
use crate::paint::spline::CatmullRom;

/// Distance under which two points on both axes are treated as the same spot.
const SAME_SPOT_EPSILON: f64 = 0.1;

/// Immediate-mode raster target.
///
/// Mirrors a 2D canvas context: a current fill color plus disc and rectangle
/// fills at floating-point coordinates.
pub trait Canvas {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn fill_color(&self) -> Color;
    fn set_fill_color(&mut self, color: Color);
    fn fill_disc(&mut self, center: Point, radius: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
}

/// RGBA8 pixel surface, row-major, no blending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelCanvas {
    width: u32,
    height: u32,
    fill: Color,
    pixels: Vec<u8>,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4);
        let mut canvas = Self {
            width,
            height,
            fill: Color::BLACK,
            pixels: vec![0; len],
        };
        canvas.clear(background);
        canvas
    }

    /// Reallocates the surface. Previous content is discarded.
    pub fn resize(&mut self, width: u32, height: u32, background: Color) {
        if self.width == width && self.height == height {
            return;
        }
        let fill = self.fill;
        *self = Self::new(width, height, background);
        self.fill = fill;
    }

    pub fn clear(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_rgba_array());
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::rgba(px[0], px[1], px[2], px[3]))
    }

    pub fn rgba_pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_pixel(&mut self, x: i64, y: i64) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let idx = ((y as usize) * (self.width as usize) + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&self.fill.to_rgba_array());
    }
}

impl Canvas for PixelCanvas {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fill_color(&self) -> Color {
        self.fill
    }

    fn set_fill_color(&mut self, color: Color) {
        self.fill = color;
    }

    fn fill_disc(&mut self, center: Point, radius: f64) {
        if radius.is_nan() || radius <= 0.0 || !center.x.is_finite() || !center.y.is_finite() {
            return;
        }
        let radius_sq = radius * radius;
        let min_x = (center.x - radius).floor().max(0.0) as i64;
        let max_x = (center.x + radius).ceil().min(self.width as f64 - 1.0) as i64;
        let min_y = (center.y - radius).floor().max(0.0) as i64;
        let max_y = (center.y + radius).ceil().min(self.height as f64 - 1.0) as i64;
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let dx = x as f64 + 0.5 - center.x;
                let dy = y as f64 + 0.5 - center.y;
                if dx * dx + dy * dy <= radius_sq {
                    self.set_pixel(x, y);
                }
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let x0 = x.floor().max(0.0) as i64;
        let y0 = y.floor().max(0.0) as i64;
        let x1 = (x + width).ceil().min(self.width as f64) as i64;
        let y1 = (y + height).ceil().min(self.height as f64) as i64;
        for py in y0..y1 {
            for px in x0..x1 {
                self.set_pixel(px, py);
            }
        }
    }
}

pub fn draw_dot(canvas: &mut dyn Canvas, center: Point, radius: f64) {
    canvas.fill_disc(center, radius);
}

/// Stamps dots of a fixed `thickness` from `a` towards `b`, one unit of the
/// dominant axis per step. The first stamp lands one step past `a`; the walk
/// stops once another step would not bring it closer to `b`.
pub fn draw_segment(canvas: &mut dyn Canvas, a: Point, b: Point, thickness: f64) {
    if (a.x - b.x).abs() <= SAME_SPOT_EPSILON && (a.y - b.y).abs() <= SAME_SPOT_EPSILON {
        draw_dot(canvas, a, thickness);
        return;
    }

    if (a.x - b.x).abs() > (a.y - b.y).abs() {
        let slope = (b.y - a.y) / (b.x - a.x);
        let step = if a.x > b.x { -1.0 } else { 1.0 };
        let mut p = a;
        while (p.x - b.x).abs() > (p.x + step - b.x).abs() {
            p.x += step;
            p.y += step * slope;
            draw_dot(canvas, p, thickness);
        }
    } else {
        let inv_slope = (b.x - a.x) / (b.y - a.y);
        let step = if a.y > b.y { -1.0 } else { 1.0 };
        let mut p = a;
        while (p.y - b.y).abs() > (p.y + step - b.y).abs() {
            p.x += step * inv_slope;
            p.y += step;
            draw_dot(canvas, p, thickness);
        }
    }
}

/// Number of sub-segments used for a curve span whose inner points are
/// `inner_distance` apart: roughly one per unit of length, at least one.
pub fn curve_step_count(inner_distance: f64) -> usize {
    if inner_distance.is_finite() && inner_distance >= 1.0 {
        inner_distance.floor() as usize
    } else {
        1
    }
}

/// Draws the smoothed span between `p1` and `p2`, tapering the thickness
/// linearly from `start_thickness` to `end_thickness`.
pub fn draw_curve_span(
    canvas: &mut dyn Canvas,
    [p0, p1, p2, p3]: [Point; 4],
    start_thickness: f64,
    end_thickness: f64,
    step_count: usize,
) {
    let spline = CatmullRom::centripetal(p0, p1, p2, p3);
    let steps = step_count.max(1);
    let mut from = spline.point_at(0.0);
    for k in 0..steps {
        let t = k as f64 / steps as f64;
        let next_t = (k + 1) as f64 / steps as f64;
        let to = spline.point_at(next_t);
        let thickness = lerp(t, (0.0, 1.0), (start_thickness, end_thickness));
        draw_segment(canvas, from, to, thickness);
        from = to;
    }
}
