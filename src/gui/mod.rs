mod confirmation_modal;
mod curve_editor;
mod pointer;

pub use confirmation_modal::{ConfirmationModal, ConfirmationResult};
pub use curve_editor::{CurveEditor, CurvePlot};
pub use pointer::PointerTracker;

use crate::paint::save;
use crate::paint::settings_store::StateStore;
use crate::paint::{
    Color, PaintCommand, PaintController, PaintSession, Point, Ticker, TICK_INTERVAL,
};
use chrono::Local;
use eframe::egui::{self, Color32, Rect, Sense, TextureHandle, TextureOptions};
use std::collections::HashMap;
use std::time::Instant;

pub const BRUSH_PALETTE: [Color; 10] = [
    Color::rgb(0, 0, 0),
    Color::rgb(255, 255, 255),
    Color::rgb(230, 25, 75),
    Color::rgb(60, 180, 75),
    Color::rgb(255, 225, 25),
    Color::rgb(67, 99, 216),
    Color::rgb(245, 130, 49),
    Color::rgb(145, 30, 180),
    Color::rgb(70, 240, 240),
    Color::rgb(240, 50, 230),
];

pub const BACKGROUND_PALETTE: [Color; 6] = [
    Color::rgb(255, 255, 255),
    Color::rgb(245, 240, 225),
    Color::rgb(230, 230, 230),
    Color::rgb(40, 40, 40),
    Color::rgb(0, 0, 0),
    Color::rgb(20, 30, 60),
];

pub fn to_color32(color: Color) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.a)
}

pub fn from_color32(color: Color32) -> Color {
    let [r, g, b, a] = color.to_srgba_unmultiplied();
    Color::rgba(r, g, b, a)
}

/// Painting window: control panel on the left, canvas filling the rest.
pub struct PaintApp {
    session: PaintSession<Box<dyn StateStore>>,
    controller: PaintController,
    ticker: Ticker,
    pointer: PointerTracker,
    texture: Option<TextureHandle>,
    texture_stale: bool,
    curve_editor: CurveEditor,
    confirm_clear: ConfirmationModal,
    size_input: (u32, u32),
    canvas_area: (u32, u32),
    pending: PendingEdits,
    last_error: Option<String>,
    last_status: Option<String>,
}

impl PaintApp {
    pub fn new(cc: &eframe::CreationContext<'_>, session: PaintSession<Box<dyn StateStore>>) -> Self {
        let controller = PaintController::new();
        let ctx = cc.egui_ctx.clone();
        let ticker = Ticker::spawn_with_waker(controller.sender(), TICK_INTERVAL, move || {
            ctx.request_repaint();
        });
        ticker.set_armed(false);
        let size_input = session.canvas().size();
        Self {
            session,
            controller,
            ticker,
            pointer: PointerTracker::default(),
            texture: None,
            texture_stale: true,
            curve_editor: CurveEditor::default(),
            confirm_clear: ConfirmationModal::default(),
            size_input,
            canvas_area: size_input,
            pending: PendingEdits::default(),
            last_error: None,
            last_status: None,
        }
    }

    fn send(&self, command: PaintCommand) {
        self.controller.send(command);
    }

    fn request_clear(&mut self) {
        if self.session.history().is_empty() {
            self.send(PaintCommand::Clear);
        } else {
            self.confirm_clear.open();
        }
    }

    fn export(&mut self) {
        let result = save::ensure_export_folder()
            .and_then(|dir| self.session.export_png(&dir, Local::now()));
        match result {
            Ok(path) => {
                self.last_error = None;
                self.last_status = Some(format!("Saved {}", path.display()));
            }
            Err(e) => {
                tracing::error!(error = ?e, "failed to export painting");
                self.last_error = Some(format!("Failed to save image: {e:#}"));
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (undo, redo) = ctx.input(|i| {
            let ctrl = i.modifiers.ctrl || i.modifiers.command;
            let undo = ctrl && !i.modifiers.shift && i.key_pressed(egui::Key::Z);
            let redo = ctrl
                && (i.key_pressed(egui::Key::Y) || (i.modifiers.shift && i.key_pressed(egui::Key::Z)));
            (undo, redo)
        });
        if undo {
            self.send(PaintCommand::Undo);
        }
        if redo {
            self.send(PaintCommand::Redo);
        }
    }

    fn controls_ui(&mut self, ui: &mut egui::Ui) {
        let settings = self.session.settings().clone();

        ui.heading("Drip Paint");
        ui.horizontal(|ui| {
            if ui
                .add_enabled(self.session.history().can_undo(), egui::Button::new("Undo"))
                .clicked()
            {
                self.send(PaintCommand::Undo);
            }
            if ui
                .add_enabled(self.session.history().can_redo(), egui::Button::new("Redo"))
                .clicked()
            {
                self.send(PaintCommand::Redo);
            }
            if ui.button("Clear").clicked() {
                self.request_clear();
            }
            if ui.button("Save PNG").clicked() {
                self.export();
            }
        });
        ui.separator();

        ui.label("Brush color");
        ui.horizontal(|ui| {
            if let Some(color) = color_button(ui, &mut self.pending, "brush", settings.brush_color) {
                self.controller.send(PaintCommand::SetBrushColor(color));
            }
            for color in BRUSH_PALETTE {
                if swatch(ui, color).clicked() {
                    self.controller.send(PaintCommand::SetBrushColor(color));
                }
            }
        });
        ui.label("Background");
        ui.horizontal(|ui| {
            if let Some(color) = color_button(ui, &mut self.pending, "background", settings.bg_color)
            {
                self.controller.send(PaintCommand::SetBackgroundColor(color));
            }
            for color in BACKGROUND_PALETTE {
                if swatch(ui, color).clicked() {
                    self.controller.send(PaintCommand::SetBackgroundColor(color));
                }
            }
        });
        ui.separator();

        let mut fit = settings.fit_to_window;
        if ui.checkbox(&mut fit, "Fit to window").changed() {
            self.send(PaintCommand::SetFitToWindow {
                enabled: fit,
                window: self.canvas_area,
            });
        }
        ui.horizontal(|ui| {
            ui.add(egui::DragValue::new(&mut self.size_input.0).clamp_range(1..=8192));
            ui.label("×");
            ui.add(egui::DragValue::new(&mut self.size_input.1).clamp_range(1..=8192));
            if ui.button("Set size").clicked() {
                self.send(PaintCommand::SetCanvasSize {
                    width: self.size_input.0,
                    height: self.size_input.1,
                });
            }
        });
        ui.separator();

        egui::Grid::new("brush_parameters")
            .num_columns(2)
            .show(ui, |ui| {
                let pending = &mut self.pending;
                let rows: [(&'static str, f64, f64, fn(f64) -> PaintCommand); 6] = [
                    ("Min thickness", settings.min_thickness, 0.1, PaintCommand::SetMinThickness),
                    ("Max thickness", settings.max_thickness, 0.1, PaintCommand::SetMaxThickness),
                    (
                        "Speed threshold",
                        settings.speed_threshold,
                        0.01,
                        PaintCommand::SetSpeedThreshold,
                    ),
                    (
                        "Speed sample (ms)",
                        settings.speed_sample_time,
                        1.0,
                        PaintCommand::SetSpeedSampleTime,
                    ),
                    (
                        "Min multiplier",
                        settings.min_random_multiplier,
                        0.01,
                        PaintCommand::SetMinRandomMultiplier,
                    ),
                    (
                        "Max multiplier",
                        settings.max_random_multiplier,
                        0.01,
                        PaintCommand::SetMaxRandomMultiplier,
                    ),
                ];
                for (label, value, speed, command) in rows {
                    if let Some(v) = number_row(ui, pending, label, value, speed) {
                        self.controller.send(command(v));
                    }
                }
            });

        ui.label("Thickness by speed");
        if let Some(curve) = self.curve_editor.ui(
            ui,
            &settings.brush_lerp_spline,
            settings.speed_axis(),
            settings.thickness_axis(),
        ) {
            self.send(PaintCommand::SetThicknessCurve(curve));
        }
        if ui.button("Reset brush parameters").clicked() {
            self.send(PaintCommand::ResetBrushParameters);
        }

        if let Some(err) = &self.last_error {
            ui.separator();
            ui.colored_label(Color32::RED, err);
        } else if let Some(status) = &self.last_status {
            ui.separator();
            ui.label(status);
        }
    }

    fn canvas_ui(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        self.canvas_area = (
            available.x.max(1.0).floor() as u32,
            available.y.max(1.0).floor() as u32,
        );
        if self.session.settings().fit_to_window && self.session.canvas().size() != self.canvas_area {
            self.send(PaintCommand::WindowResized {
                width: self.canvas_area.0,
                height: self.canvas_area.1,
            });
        }

        let (width, height) = self.session.canvas().size();
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width as f32, height as f32), Sense::drag());
        let rect = response.rect;

        let (latest, primary_down) =
            ui.input(|i| (i.pointer.latest_pos(), i.pointer.primary_down()));
        let inside = !self.confirm_clear.is_open() && ui.rect_contains_pointer(rect);
        let position = latest.map(|pos| {
            let local = pos - rect.min;
            Point::new(local.x as f64, local.y as f64)
        });
        for event in self.pointer.update(position, inside, primary_down, Instant::now()) {
            self.controller.send(event);
        }

        let report = self.controller.pump(&mut self.session);
        if let Some(err) = report.errors.last() {
            self.last_error = Some(err.clone());
        }
        if report.handled > 0 {
            self.texture_stale = true;
        }
        self.ticker.set_armed(self.session.is_painting());
        if self.session.settings().fit_to_window {
            self.size_input = self.session.canvas().size();
        }

        let texture = self.upload_texture(ui.ctx());
        let shown = Rect::from_min_size(rect.min, texture.size_vec2());
        painter.image(
            texture.id(),
            shown,
            Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            Color32::WHITE,
        );
    }

    fn upload_texture(&mut self, ctx: &egui::Context) -> TextureHandle {
        let canvas = self.session.canvas();
        let (width, height) = canvas.size();
        let size = [width as usize, height as usize];
        if let Some(tex) = &self.texture {
            if !self.texture_stale && tex.size() == size {
                return tex.clone();
            }
        }
        let image = egui::ColorImage::from_rgba_unmultiplied(size, canvas.rgba_pixels());
        self.texture_stale = false;
        match &mut self.texture {
            Some(tex) => {
                tex.set(image, TextureOptions::NEAREST);
                tex.clone()
            }
            None => {
                let tex = ctx.load_texture("painting", image, TextureOptions::NEAREST);
                self.texture = Some(tex.clone());
                tex
            }
        }
    }
}

impl eframe::App for PaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.confirm_clear.is_open() {
            self.handle_shortcuts(ctx);
        }

        egui::SidePanel::left("controls")
            .resizable(false)
            .default_width(280.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| self.controls_ui(ui));
            });

        if self.confirm_clear.ui(ctx) == ConfirmationResult::Confirmed {
            self.send(PaintCommand::Clear);
        }

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| self.canvas_ui(ui));

        if self.session.is_painting() {
            ctx.request_repaint_after(TICK_INTERVAL);
        }
    }
}

fn swatch(ui: &mut egui::Ui, color: Color) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(egui::vec2(16.0, 16.0), Sense::click());
    ui.painter().rect_filled(rect, 2.0, to_color32(color));
    ui.painter()
        .rect_stroke(rect, 2.0, egui::Stroke::new(1.0, Color32::from_gray(120)));
    response.on_hover_text(color.to_string())
}

fn number_row(
    ui: &mut egui::Ui,
    pending: &mut PendingEdits,
    label: &'static str,
    value: f64,
    speed: f64,
) -> Option<f64> {
    ui.label(label);
    let mut edited = pending.numbers.get(label).copied().unwrap_or(value);
    let response = ui.add(egui::DragValue::new(&mut edited).speed(speed));
    ui.end_row();
    let settled = !response.dragged() && !response.has_focus();
    settle_edit(&mut pending.numbers, label, edited, response.changed(), settled, value)
}

fn color_button(
    ui: &mut egui::Ui,
    pending: &mut PendingEdits,
    key: &'static str,
    current: Color,
) -> Option<Color> {
    let current = to_color32(current);
    let mut edited = pending.colors.get(key).copied().unwrap_or(current);
    let changed = ui.color_edit_button_srgba(&mut edited).changed();
    let settled = !ui.memory(|mem| mem.any_popup_open());
    settle_edit(&mut pending.colors, key, edited, changed, settled, current).map(from_color32)
}

/// Widget values still being edited. Drags and open pickers report a change
/// every frame; the value is sent once the widget settles.
#[derive(Debug, Default)]
struct PendingEdits {
    numbers: HashMap<&'static str, f64>,
    colors: HashMap<&'static str, Color32>,
}

/// Records `edited` while the widget is busy and hands back the final value
/// once it settles, unless it ended up where it started.
fn settle_edit<T: Copy + PartialEq>(
    pending: &mut HashMap<&'static str, T>,
    key: &'static str,
    edited: T,
    changed: bool,
    settled: bool,
    current: T,
) -> Option<T> {
    if changed {
        pending.insert(key, edited);
    }
    if !settled {
        return None;
    }
    pending.remove(key).filter(|value| *value != current)
}
