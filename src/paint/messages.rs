use crate::paint::model::{Color, Point};
use crate::paint::thickness::ThicknessCurve;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Enter,
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub position: Point,
    /// Whether the primary button is held while the event fires.
    pub buttons_held: bool,
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(kind: PointerKind, position: Point, buttons_held: bool, at: Instant) -> Self {
        Self {
            kind,
            position,
            buttons_held,
            at,
        }
    }
}

/// User-facing controls, applied in the same queue as pointer input.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    Undo,
    Redo,
    /// Clears the painting. The front-end asks for confirmation before sending it.
    Clear,
    SetBrushColor(Color),
    SetBackgroundColor(Color),
    SetMinThickness(f64),
    SetMaxThickness(f64),
    SetSpeedThreshold(f64),
    SetSpeedSampleTime(f64),
    SetMinRandomMultiplier(f64),
    SetMaxRandomMultiplier(f64),
    SetThicknessCurve(ThicknessCurve),
    ResetBrushParameters,
    SetFitToWindow { enabled: bool, window: (u32, u32) },
    SetCanvasSize { width: u32, height: u32 },
    WindowResized { width: u32, height: u32 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintEvent {
    Pointer(PointerEvent),
    Tick(Instant),
    Command(PaintCommand),
}

impl From<PointerEvent> for PaintEvent {
    fn from(event: PointerEvent) -> Self {
        Self::Pointer(event)
    }
}

impl From<PaintCommand> for PaintEvent {
    fn from(command: PaintCommand) -> Self {
        Self::Command(command)
    }
}
