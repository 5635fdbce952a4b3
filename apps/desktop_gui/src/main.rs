mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::config::load_settings;
use crossbeam_channel::bounded;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{MapPanelApp, StartupConfig};

const DEFAULT_SERVER_URL: &str = "http://localhost:8080/geoserver";

#[derive(Parser, Debug)]
struct Args {
    /// Server address pre-filled in the panel
    #[arg(long)]
    server_url: Option<String>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let settings = load_settings();

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings.request_timeout());

    let startup = StartupConfig {
        server_url: args
            .server_url
            .or_else(|| settings.server_url.clone())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string()),
        map_view: settings.map_view(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Map Layer Panel")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Map Layer Panel",
        options,
        Box::new(move |_cc| Ok(Box::new(MapPanelApp::new(cmd_tx, ui_rx, startup)))),
    )
}
