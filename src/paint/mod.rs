pub mod brush;
pub mod controller;
pub mod geometry;
pub mod history;
pub mod messages;
pub mod model;
pub mod raster;
pub mod save;
pub mod session;
pub mod settings;
pub mod settings_store;
pub mod spline;
pub mod stroke;
pub mod thickness;

pub use controller::{PaintController, PumpReport, Ticker, TICK_INTERVAL};
pub use messages::{PaintCommand, PaintEvent, PointerEvent, PointerKind};
pub use model::{Color, Point};
pub use session::PaintSession;
pub use settings::PaintSettings;
