//! UI layer for the map panel: controls sidebar, layer stack view, error popup.

pub mod app;

pub use app::{MapPanelApp, StartupConfig};
