//! UI layer: the broadcast screen and its tile painter.

pub mod app;
pub mod grid;

pub use app::LiveViewApp;
