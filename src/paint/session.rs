use crate::paint::brush::Brush;
use crate::paint::history::StrokeHistory;
use crate::paint::messages::{PaintCommand, PaintEvent, PointerEvent, PointerKind};
use crate::paint::model::{Color, Point};
use crate::paint::raster::{Canvas, PixelCanvas};
use crate::paint::save;
use crate::paint::settings::PaintSettings;
use crate::paint::settings_store::{self, StateStore};
use crate::paint::stroke::Stroke;
use crate::paint::thickness::ThicknessCurve;
use anyhow::Result;
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything one painting window owns: configuration, the live brush, the
/// committed history, the pixel surface and the backing store.
///
/// All mutation goes through `&mut self`, so events are applied one at a time
/// in the order the caller delivers them.
pub struct PaintSession<S> {
    settings: PaintSettings,
    brush: Brush,
    history: StrokeHistory,
    canvas: PixelCanvas,
    store: S,
    /// The thickness curve in `0..1` plot space. Axis changes re-derive the
    /// stored curve from it, so collapsing an axis and widening it again
    /// brings the shape back.
    curve_shape: ThicknessCurve,
}

impl<S: StateStore> PaintSession<S> {
    /// Restores persisted state from `store`. With fit-to-window enabled the
    /// canvas takes `window` as its size, otherwise the stored size.
    pub fn load(store: S, window: (u32, u32)) -> Self {
        let settings = settings_store::load_settings(&store);
        let history = settings_store::load_history(&store, settings.history_step);
        tracing::info!(
            strokes = history.len(),
            step = history.step(),
            fit_to_window = settings.fit_to_window,
            "loaded painting state"
        );
        Self::from_parts(store, settings, history, window)
    }

    pub fn from_parts(
        store: S,
        mut settings: PaintSettings,
        history: StrokeHistory,
        window: (u32, u32),
    ) -> Self {
        let (width, height) = if settings.fit_to_window {
            window
        } else {
            (settings.width, settings.height)
        };
        let (width, height) = (width.max(1), height.max(1));
        settings.width = width;
        settings.height = height;
        settings.history_step = history.step();
        let canvas = PixelCanvas::new(width, height, settings.bg_color);
        let curve_shape = curve_shape_of(&settings).unwrap_or_else(|| {
            curve_shape_of(&PaintSettings::default()).unwrap_or_default()
        });
        let mut session = Self {
            settings,
            brush: Brush::new(),
            history,
            canvas,
            store,
            curve_shape,
        };
        session.redraw();
        session
    }

    /// Replaces the brush, e.g. with a seeded one for reproducible strokes.
    pub fn with_brush(mut self, brush: Brush) -> Self {
        self.brush = brush;
        self
    }

    pub fn settings(&self) -> &PaintSettings {
        &self.settings
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn canvas(&self) -> &PixelCanvas {
        &self.canvas
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_painting(&self) -> bool {
        self.brush.is_active()
    }

    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.brush.active_stroke()
    }

    pub fn handle_event(&mut self, event: PaintEvent) -> Result<()> {
        match event {
            PaintEvent::Pointer(pointer) => self.handle_pointer(pointer),
            PaintEvent::Tick(now) => {
                self.tick(now);
                Ok(())
            }
            PaintEvent::Command(command) => self.apply_command(command),
        }
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> Result<()> {
        let PointerEvent {
            kind,
            position,
            buttons_held,
            at,
        } = event;
        match kind {
            PointerKind::Down => self.pointer_down(position, at),
            PointerKind::Move => {
                self.pointer_move(position, at);
            }
            PointerKind::Enter => {
                if buttons_held {
                    self.pointer_down(position, at);
                }
            }
            PointerKind::Up | PointerKind::Leave => {
                self.pointer_up(position, at)?;
            }
        }
        Ok(())
    }

    pub fn apply_command(&mut self, command: PaintCommand) -> Result<()> {
        match command {
            PaintCommand::Undo => self.undo().map(|_| ()),
            PaintCommand::Redo => self.redo().map(|_| ()),
            PaintCommand::Clear => self.clear(|| true).map(|_| ()),
            PaintCommand::SetBrushColor(color) => self.set_brush_color(color),
            PaintCommand::SetBackgroundColor(color) => self.set_background_color(color),
            PaintCommand::SetMinThickness(value) => self.set_min_thickness(value),
            PaintCommand::SetMaxThickness(value) => self.set_max_thickness(value),
            PaintCommand::SetSpeedThreshold(value) => self.set_speed_threshold(value),
            PaintCommand::SetSpeedSampleTime(ms) => self.set_speed_sample_time(ms),
            PaintCommand::SetMinRandomMultiplier(value) => self.set_min_random_multiplier(value),
            PaintCommand::SetMaxRandomMultiplier(value) => self.set_max_random_multiplier(value),
            PaintCommand::SetThicknessCurve(curve) => self.set_thickness_curve(curve),
            PaintCommand::ResetBrushParameters => self.reset_brush_parameters(),
            PaintCommand::SetFitToWindow { enabled, window } => {
                self.set_fit_to_window(enabled, window)
            }
            PaintCommand::SetCanvasSize { width, height } => self.set_canvas_size(width, height),
            PaintCommand::WindowResized { width, height } => {
                self.resize_window(width, height).map(|_| ())
            }
        }
    }

    /// Starts a stroke and stamps its first point. A stroke already in
    /// progress is abandoned without being committed.
    pub fn pointer_down(&mut self, position: Point, now: Instant) {
        self.brush.begin_stroke(self.settings.multiplier_range());
        self.pointer_move(position, now);
    }

    pub fn pointer_move(&mut self, position: Point, now: Instant) -> bool {
        let model = self.settings.thickness_model();
        self.brush
            .extend_to(position, now, &model, &mut self.canvas)
    }

    /// Feeds the release position, ends the stroke and commits it. Returns
    /// whether a stroke was committed; the history is persisted either way
    /// before any storage error is reported.
    pub fn pointer_up(&mut self, position: Point, now: Instant) -> Result<bool> {
        if !self.brush.is_active() {
            return Ok(false);
        }
        self.pointer_move(position, now);
        let model = self.settings.thickness_model();
        let Some(stroke) = self.brush.end_stroke(now, &model) else {
            return Ok(false);
        };
        if stroke.is_empty() {
            return Ok(false);
        }
        let points = stroke.len();
        self.history.commit(stroke, self.settings.brush_color);
        self.settings.history_step = self.history.step();
        tracing::debug!(points, step = self.history.step(), "committed stroke");
        self.persist_all()?;
        Ok(true)
    }

    /// Timer hook: thickens the trailing point of an idle pointer.
    pub fn tick(&mut self, now: Instant) -> bool {
        let model = self.settings.thickness_model();
        self.brush.periodic_refresh(now, &model, &mut self.canvas)
    }

    pub fn undo(&mut self) -> Result<bool> {
        if !self.history.undo() {
            return Ok(false);
        }
        tracing::debug!(step = self.history.step(), "undo");
        self.after_history_move()?;
        Ok(true)
    }

    pub fn redo(&mut self) -> Result<bool> {
        if !self.history.redo() {
            return Ok(false);
        }
        tracing::debug!(step = self.history.step(), "redo");
        self.after_history_move()?;
        Ok(true)
    }

    /// Drops every stroke. `confirm` is consulted only when there is something
    /// to lose; declining leaves the session untouched.
    pub fn clear(&mut self, confirm: impl FnOnce() -> bool) -> Result<bool> {
        if !self.history.is_empty() && !confirm() {
            return Ok(false);
        }
        tracing::info!(strokes = self.history.len(), "clearing painting");
        self.history.clear();
        self.settings.history_step = 0;
        self.redraw();
        self.persist_all()?;
        Ok(true)
    }

    pub fn set_brush_color(&mut self, color: Color) -> Result<()> {
        self.settings.brush_color = color;
        self.canvas.set_fill_color(color);
        self.persist_settings()
    }

    pub fn set_background_color(&mut self, color: Color) -> Result<()> {
        self.settings.bg_color = color;
        self.redraw();
        self.persist_settings()
    }

    pub fn set_min_thickness(&mut self, value: f64) -> Result<()> {
        self.settings.min_thickness = value;
        self.apply_curve_shape();
        self.persist_settings()
    }

    pub fn set_max_thickness(&mut self, value: f64) -> Result<()> {
        self.settings.max_thickness = value;
        self.apply_curve_shape();
        self.persist_settings()
    }

    pub fn set_speed_threshold(&mut self, value: f64) -> Result<()> {
        self.settings.speed_threshold = value;
        self.apply_curve_shape();
        self.persist_settings()
    }

    pub fn set_speed_sample_time(&mut self, ms: f64) -> Result<()> {
        self.settings.speed_sample_time = ms;
        self.persist_settings()
    }

    pub fn set_min_random_multiplier(&mut self, value: f64) -> Result<()> {
        self.settings.min_random_multiplier = value;
        self.persist_settings()
    }

    pub fn set_max_random_multiplier(&mut self, value: f64) -> Result<()> {
        self.settings.max_random_multiplier = value;
        self.persist_settings()
    }

    pub fn set_thickness_curve(&mut self, curve: ThicknessCurve) -> Result<()> {
        self.settings.brush_lerp_spline = curve;
        if let Some(shape) = curve_shape_of(&self.settings) {
            self.curve_shape = shape;
        }
        self.persist_settings()
    }

    pub fn reset_brush_parameters(&mut self) -> Result<()> {
        self.settings.reset_brush_parameters();
        if let Some(shape) = curve_shape_of(&self.settings) {
            self.curve_shape = shape;
        }
        self.persist_settings()
    }

    /// Follows the window size while fit-to-window is on. Returns whether the
    /// canvas was reallocated.
    pub fn resize_window(&mut self, width: u32, height: u32) -> Result<bool> {
        if !self.settings.fit_to_window || self.canvas.size() == (width.max(1), height.max(1)) {
            return Ok(false);
        }
        self.resize_canvas(width, height);
        self.persist_settings()?;
        Ok(true)
    }

    pub fn set_fit_to_window(&mut self, enabled: bool, window: (u32, u32)) -> Result<()> {
        self.settings.fit_to_window = enabled;
        if enabled {
            self.resize_canvas(window.0, window.1);
        }
        self.persist_settings()
    }

    /// Sets an explicit canvas size, which turns fit-to-window off.
    pub fn set_canvas_size(&mut self, width: u32, height: u32) -> Result<()> {
        self.settings.fit_to_window = false;
        self.resize_canvas(width, height);
        self.persist_settings()
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        save::encode_png(&self.canvas)
    }

    pub fn export_png(&self, dir: &Path, now: DateTime<Local>) -> Result<PathBuf> {
        save::export_png(&self.canvas, dir, now)
    }

    /// Repaints the surface from history and restores the brush fill color.
    pub fn redraw(&mut self) {
        self.history
            .full_redraw(&mut self.canvas, self.settings.bg_color);
        self.canvas.set_fill_color(self.settings.brush_color);
    }

    pub fn persist_settings(&mut self) -> Result<()> {
        settings_store::save_settings(&mut self.store, &self.settings)
    }

    pub fn persist_all(&mut self) -> Result<()> {
        settings_store::save_settings(&mut self.store, &self.settings)?;
        settings_store::save_history(&mut self.store, &self.history)
    }

    fn after_history_move(&mut self) -> Result<()> {
        self.settings.history_step = self.history.step();
        self.redraw();
        self.persist_settings()
    }

    fn resize_canvas(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        self.settings.width = width;
        self.settings.height = height;
        self.canvas.resize(width, height, self.settings.bg_color);
        self.redraw();
    }

    fn apply_curve_shape(&mut self) {
        self.settings.brush_lerp_spline = self
            .curve_shape
            .mapped(self.settings.speed_axis(), self.settings.thickness_axis());
    }
}

fn curve_shape_of(settings: &PaintSettings) -> Option<ThicknessCurve> {
    settings
        .brush_lerp_spline
        .normalized(settings.speed_axis(), settings.thickness_axis())
}
