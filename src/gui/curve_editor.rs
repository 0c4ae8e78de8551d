use crate::paint::geometry::{distance, lerp};
use crate::paint::thickness::ThicknessCurve;
use crate::paint::Point;
use eframe::egui::{self, Color32, PointerButton, Pos2, Rect, Sense, Stroke, Vec2};

const HANDLE_RADIUS: f32 = 5.0;
const AXIS_COLOR: Color32 = Color32::from_gray(136);
const CURVE_COLOR: Color32 = Color32::from_gray(102);

/// Maps control points between curve space (speed, thickness) and the plot
/// area on screen. Speed grows to the right, thickness grows upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePlot {
    pub area: Rect,
    pub speed_axis: (f64, f64),
    pub thickness_axis: (f64, f64),
}

impl CurvePlot {
    pub fn to_screen(&self, speed: f64, thickness: f64) -> Pos2 {
        let x = lerp(
            speed,
            self.speed_axis,
            (self.area.left() as f64, self.area.right() as f64),
        );
        let y = lerp(
            thickness,
            self.thickness_axis,
            (self.area.bottom() as f64, self.area.top() as f64),
        );
        Pos2::new(x as f32, y as f32)
    }

    pub fn from_screen(&self, pos: Pos2) -> (f64, f64) {
        let speed = lerp(
            pos.x as f64,
            (self.area.left() as f64, self.area.right() as f64),
            self.speed_axis,
        );
        let thickness = lerp(
            pos.y as f64,
            (self.area.bottom() as f64, self.area.top() as f64),
            self.thickness_axis,
        );
        (speed, thickness)
    }

    /// First control point whose handle covers `pos`.
    pub fn hit_test(&self, curve: &ThicknessCurve, pos: Pos2) -> Option<usize> {
        let target = Point::new(pos.x as f64, pos.y as f64);
        (0..curve.len()).find(|&idx| {
            curve.point(idx).is_some_and(|(speed, thickness)| {
                let handle = self.to_screen(speed, thickness);
                distance(Point::new(handle.x as f64, handle.y as f64), target)
                    <= HANDLE_RADIUS as f64
            })
        })
    }
}

/// Interactive editor for the speed → thickness curve.
///
/// Drag a handle to move it, double-click empty space to add a point and
/// right-click an interior point to remove it.
#[derive(Debug, Default)]
pub struct CurveEditor {
    dragging: Option<usize>,
    draft: Option<ThicknessCurve>,
}

impl CurveEditor {
    /// Draws the editor and returns the edited curve once an edit completes.
    pub fn ui(
        &mut self,
        ui: &mut egui::Ui,
        curve: &ThicknessCurve,
        speed_axis: (f64, f64),
        thickness_axis: (f64, f64),
    ) -> Option<ThicknessCurve> {
        let desired = Vec2::new(ui.available_width().min(260.0), 150.0);
        let (response, painter) = ui.allocate_painter(desired, Sense::click_and_drag());
        let area = Rect::from_min_max(
            response.rect.min + Vec2::new(30.0, 10.0),
            response.rect.max - Vec2::new(10.0, 25.0),
        );
        let plot = CurvePlot {
            area,
            speed_axis,
            thickness_axis,
        };
        let mut committed = None;

        if response.drag_started_by(PointerButton::Primary) {
            if let Some(pos) = response.interact_pointer_pos() {
                self.dragging = plot.hit_test(curve, pos);
                self.draft = self.dragging.map(|_| curve.clone());
            }
        }
        if response.dragged_by(PointerButton::Primary) {
            if let (Some(idx), Some(draft), Some(pos)) = (
                self.dragging,
                self.draft.as_mut(),
                response.interact_pointer_pos(),
            ) {
                if area.contains(pos) {
                    let (speed, thickness) = plot.from_screen(pos);
                    draft.move_point(idx, speed, thickness);
                }
            }
        }
        if response.drag_stopped_by(PointerButton::Primary) {
            self.dragging = None;
            committed = self.draft.take();
        }

        if response.double_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if area.contains(pos) && plot.hit_test(curve, pos).is_none() {
                    let (speed, thickness) = plot.from_screen(pos);
                    let mut edited = curve.clone();
                    edited.insert_point(speed, thickness);
                    committed = Some(edited);
                }
            }
        }
        if response.secondary_clicked() {
            if let Some(pos) = response.interact_pointer_pos() {
                if let Some(idx) = plot.hit_test(curve, pos) {
                    let mut edited = curve.clone();
                    if edited.remove_point(idx) {
                        committed = Some(edited);
                    }
                }
            }
        }

        let shown = self.draft.as_ref().or(committed.as_ref()).unwrap_or(curve);
        paint_plot(&painter, &plot, shown);
        committed
    }
}

fn paint_plot(painter: &egui::Painter, plot: &CurvePlot, curve: &ThicknessCurve) {
    let area = plot.area;
    let axis = Stroke::new(1.0, AXIS_COLOR);
    painter.line_segment([area.left_top(), area.left_bottom()], axis);
    painter.line_segment([area.left_bottom(), area.right_bottom()], axis);

    let font = egui::FontId::proportional(11.0);
    painter.text(
        area.left_bottom() - Vec2::new(6.0, 0.0),
        egui::Align2::RIGHT_BOTTOM,
        format_axis_value(plot.thickness_axis.0),
        font.clone(),
        AXIS_COLOR,
    );
    painter.text(
        area.left_top() - Vec2::new(6.0, 0.0),
        egui::Align2::RIGHT_TOP,
        format_axis_value(plot.thickness_axis.1),
        font.clone(),
        AXIS_COLOR,
    );
    painter.text(
        area.left_bottom() + Vec2::new(0.0, 6.0),
        egui::Align2::LEFT_TOP,
        format_axis_value(plot.speed_axis.0),
        font.clone(),
        AXIS_COLOR,
    );
    painter.text(
        area.right_bottom() + Vec2::new(0.0, 6.0),
        egui::Align2::RIGHT_TOP,
        format_axis_value(plot.speed_axis.1),
        font,
        AXIS_COLOR,
    );

    let handles: Vec<Pos2> = (0..curve.len())
        .filter_map(|idx| curve.point(idx))
        .map(|(speed, thickness)| plot.to_screen(speed, thickness))
        .collect();
    for pair in handles.windows(2) {
        painter.line_segment([pair[0], pair[1]], Stroke::new(1.0, CURVE_COLOR));
    }
    for handle in handles {
        painter.circle_filled(handle, HANDLE_RADIUS, CURVE_COLOR);
    }
}

fn format_axis_value(value: f64) -> String {
    let rounded = (value * 100.0).round() / 100.0;
    rounded.to_string()
}
