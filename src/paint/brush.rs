use crate::paint::geometry::distance;
use crate::paint::model::Point;
use crate::paint::raster::Canvas;
use crate::paint::stroke::Stroke;
use crate::paint::thickness::{random_multiplier, ThicknessModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Minimum travel, in pixels, before a new sample is accepted.
pub const MIN_POINT_SPACING: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveStroke {
    stroke: Stroke,
    times: Vec<Instant>,
    multiplier: f64,
}

impl ActiveStroke {
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    fn current_size(&self, model: &ThicknessModel<'_>, now: Instant) -> f64 {
        model.size_at(self.stroke.points(), &self.times, now, self.multiplier)
    }

    /// Re-evaluates the trailing thickness. The stored value only ever grows,
    /// so a pause at the end of a stroke never pinches it.
    fn hold_max_size(&mut self, model: &ThicknessModel<'_>, now: Instant) -> bool {
        let Some(stored) = self.stroke.last_size() else {
            return false;
        };
        let size = self.current_size(model, now).max(stored);
        self.stroke.set_last_size(size);
        true
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum BrushState {
    #[default]
    Idle,
    StrokeActive(ActiveStroke),
}

impl BrushState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::StrokeActive(_))
    }
}

/// Drives one stroke at a time from pointer samples.
#[derive(Debug)]
pub struct Brush<R = StdRng> {
    state: BrushState,
    rng: R,
}

impl Default for Brush<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl Brush<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Brush<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            state: BrushState::Idle,
            rng,
        }
    }

    pub fn state(&self) -> &BrushState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            BrushState::StrokeActive(active) => Some(active.stroke()),
            BrushState::Idle => None,
        }
    }

    /// Starts a fresh stroke with a new random thickness multiplier drawn
    /// from `multiplier_range`. A stroke already in progress is discarded.
    pub fn begin_stroke(&mut self, multiplier_range: (f64, f64)) {
        let multiplier = random_multiplier(&mut self.rng, multiplier_range.0, multiplier_range.1);
        self.state = BrushState::StrokeActive(ActiveStroke {
            stroke: Stroke::new(),
            times: Vec::new(),
            multiplier,
        });
    }

    /// Appends `point` when it moved more than [`MIN_POINT_SPACING`] from the
    /// previous sample, then paints the segment it completes. Returns whether
    /// the point was accepted.
    pub fn extend_to(
        &mut self,
        point: Point,
        now: Instant,
        model: &ThicknessModel<'_>,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let BrushState::StrokeActive(active) = &mut self.state else {
            return false;
        };
        if let Some(last) = active.stroke.last_point() {
            if distance(last, point) <= MIN_POINT_SPACING {
                return false;
            }
        }
        active.times.push(now);
        // The size is computed with the new point already in place; the
        // placeholder keeps points and sizes parallel meanwhile.
        active.stroke.push(point, 0.0);
        let size = active.current_size(model, now);
        active.stroke.set_last_size(size);
        active.stroke.draw_last_segment(canvas);
        true
    }

    /// Timer hook: grows the trailing thickness if the pointer slowed down
    /// since the last sample, then repaints the trailing segment.
    pub fn periodic_refresh(
        &mut self,
        now: Instant,
        model: &ThicknessModel<'_>,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let BrushState::StrokeActive(active) = &mut self.state else {
            return false;
        };
        if !active.hold_max_size(model, now) {
            return false;
        }
        active.stroke.draw_last_segment(canvas);
        true
    }

    /// Finalizes the trailing thickness and hands the stroke back to the
    /// caller. Returns `None` when no stroke was active.
    pub fn end_stroke(&mut self, now: Instant, model: &ThicknessModel<'_>) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            BrushState::StrokeActive(mut active) => {
                active.hold_max_size(model, now);
                Some(active.stroke)
            }
            BrushState::Idle => None,
        }
    }
}
