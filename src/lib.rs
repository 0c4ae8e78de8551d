pub mod gui;
pub mod logging;
pub mod paint;
