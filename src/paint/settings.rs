use crate::paint::model::Color;
use crate::paint::thickness::{ThicknessCurve, ThicknessModel};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_CANVAS_WIDTH: u32 = 800;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Persisted painting configuration (`statev2`).
///
/// Fields are read one by one, each with its own fallback, so a record with a
/// single bad value (or numbers stored as strings) keeps everything else.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaintSettings {
    pub history_step: usize,
    pub fit_to_window: bool,
    pub brush_color: Color,
    pub bg_color: Color,
    pub width: u32,
    pub height: u32,
    pub min_thickness: f64,
    pub max_thickness: f64,
    pub speed_threshold: f64,
    /// Width of the speed sampling window in milliseconds.
    pub speed_sample_time: f64,
    pub brush_lerp_spline: ThicknessCurve,
    pub min_random_multiplier: f64,
    pub max_random_multiplier: f64,
}

impl<'de> Deserialize<'de> for PaintSettings {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = Value::deserialize(deserializer)?;
        let defaults = Self::default();
        Ok(Self {
            history_step: read_field(&record, "historyStep", defaults.history_step),
            fit_to_window: read_field(&record, "fitToWindow", defaults.fit_to_window),
            brush_color: read_field(&record, "brushColor", defaults.brush_color),
            bg_color: read_field(&record, "bgColor", defaults.bg_color),
            width: read_field(&record, "width", defaults.width),
            height: read_field(&record, "height", defaults.height),
            min_thickness: read_field(&record, "minThickness", defaults.min_thickness),
            max_thickness: read_field(&record, "maxThickness", defaults.max_thickness),
            speed_threshold: read_field(&record, "speedThreshold", defaults.speed_threshold),
            speed_sample_time: read_field(&record, "speedSampleTime", defaults.speed_sample_time),
            brush_lerp_spline: read_curve(&record, defaults.brush_lerp_spline),
            min_random_multiplier: read_field(
                &record,
                "minRandomMultiplier",
                defaults.min_random_multiplier,
            ),
            max_random_multiplier: read_field(
                &record,
                "maxRandomMultiplier",
                defaults.max_random_multiplier,
            ),
        })
    }
}

/// Reads `key` as `T`, also accepting a string holding `T` (form inputs
/// store numbers as text). Anything else falls back to `default`.
fn read_field<T>(record: &Value, key: &str, default: T) -> T
where
    T: DeserializeOwned + FromStr,
{
    let Some(value) = record.get(key).filter(|v| !v.is_null()) else {
        return default;
    };
    if let Ok(parsed) = T::deserialize(value) {
        return parsed;
    }
    if let Some(parsed) = value.as_str().and_then(|text| text.trim().parse().ok()) {
        return parsed;
    }
    tracing::warn!(key, value = %value, "ignoring unreadable setting");
    default
}

fn read_curve(record: &Value, default: ThicknessCurve) -> ThicknessCurve {
    match record.get("brushLerpSpline").filter(|v| !v.is_null()) {
        Some(value) => ThicknessCurve::deserialize(value).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring unreadable thickness curve");
            default
        }),
        None => default,
    }
}

impl Default for PaintSettings {
    fn default() -> Self {
        Self {
            history_step: 0,
            fit_to_window: default_fit_to_window(),
            brush_color: default_brush_color(),
            bg_color: default_bg_color(),
            width: default_width(),
            height: default_height(),
            min_thickness: default_min_thickness(),
            max_thickness: default_max_thickness(),
            speed_threshold: default_speed_threshold(),
            speed_sample_time: default_speed_sample_time(),
            brush_lerp_spline: ThicknessCurve::default(),
            min_random_multiplier: default_min_random_multiplier(),
            max_random_multiplier: default_max_random_multiplier(),
        }
    }
}

impl PaintSettings {
    pub fn thickness_model(&self) -> ThicknessModel<'_> {
        ThicknessModel {
            curve: &self.brush_lerp_spline,
            min_thickness: self.min_thickness,
            max_thickness: self.max_thickness,
            sample_window: self.sample_window(),
        }
    }

    pub fn sample_window(&self) -> Duration {
        if self.speed_sample_time.is_finite() && self.speed_sample_time > 0.0 {
            Duration::from_secs_f64(self.speed_sample_time / 1000.0)
        } else {
            Duration::ZERO
        }
    }

    pub fn multiplier_range(&self) -> (f64, f64) {
        (self.min_random_multiplier, self.max_random_multiplier)
    }

    pub fn speed_axis(&self) -> (f64, f64) {
        (0.0, self.speed_threshold)
    }

    pub fn thickness_axis(&self) -> (f64, f64) {
        (self.min_thickness, self.max_thickness)
    }

    /// Restores every brush tuning parameter. Colors, canvas size and history
    /// are left alone.
    pub fn reset_brush_parameters(&mut self) {
        let defaults = Self::default();
        self.min_thickness = defaults.min_thickness;
        self.max_thickness = defaults.max_thickness;
        self.speed_threshold = defaults.speed_threshold;
        self.speed_sample_time = defaults.speed_sample_time;
        self.brush_lerp_spline = defaults.brush_lerp_spline;
        self.min_random_multiplier = defaults.min_random_multiplier;
        self.max_random_multiplier = defaults.max_random_multiplier;
    }
}

fn default_fit_to_window() -> bool {
    true
}

fn default_brush_color() -> Color {
    Color::BLACK
}

fn default_bg_color() -> Color {
    Color::WHITE
}

fn default_width() -> u32 {
    DEFAULT_CANVAS_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_CANVAS_HEIGHT
}

fn default_min_thickness() -> f64 {
    1.0
}

fn default_max_thickness() -> f64 {
    20.0
}

fn default_speed_threshold() -> f64 {
    1.5
}

fn default_speed_sample_time() -> f64 {
    100.0
}

fn default_min_random_multiplier() -> f64 {
    0.5
}

fn default_max_random_multiplier() -> f64 {
    1.5
}
