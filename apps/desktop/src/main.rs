use std::fmt::Write as _;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    config::load_settings, CapabilitiesSource, DiscoveryOutcome, HttpCapabilitiesSource,
    LayerListing, PanelController, ToggleOutcome,
};
use map_surface::{BaseLayer, LayerStack, RenderSurface, SurfaceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Discover the layers a WMS server exposes and switch some of them on.
#[derive(Parser, Debug)]
struct Args {
    /// Server base address, e.g. http://localhost:8080/geoserver
    #[arg(long)]
    server_url: Option<String>,
    /// Workspace to list; empty lists the available workspaces
    #[arg(long, default_value = "")]
    workspace: String,
    /// Layer to switch on, as workspace:layer (repeatable)
    #[arg(long = "enable", value_name = "LAYER")]
    enable: Vec<String>,
    /// Print the resulting layer stack as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();
    let settings = load_settings();

    let server_url = args
        .server_url
        .or_else(|| settings.server_url.clone())
        .context("no server address; pass --server-url or set APP__SERVER_URL")?;

    let source = HttpCapabilitiesSource::new(settings.request_timeout())?;
    let surface = LayerStack::new(BaseLayer::default(), settings.map_view());
    let mut panel = PanelController::new(source, surface);

    match panel.load_capabilities(&server_url).await? {
        DiscoveryOutcome::Committed(summary) => {
            info!(server_url = %summary.server_url, "capabilities loaded");
            println!(
                "Found {} workspaces and {} layers on {}",
                summary.workspaces.len(),
                summary.layer_count,
                summary.server_url
            );
        }
        DiscoveryOutcome::Superseded => anyhow::bail!("capability discovery was superseded"),
    }

    enable_layers(&mut panel, &args.enable);

    let listing = panel.select_workspace(&args.workspace);
    let session = panel.session();
    print!(
        "{}",
        render_listing(&listing, |name| session.is_layer_active(name))
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(panel.surface().layers())?);
    } else {
        print!("{}", render_stack(panel.surface().layers()));
    }

    Ok(())
}

/// Switches on each requested layer and returns the names the catalog lacks.
fn enable_layers<S: CapabilitiesSource, R: RenderSurface>(
    panel: &mut PanelController<S, R>,
    names: &[String],
) -> Vec<String> {
    let mut unknown = Vec::new();
    for layer in names {
        if panel.toggle_layer(layer, true) == ToggleOutcome::UnknownLayer {
            warn!(layer = %layer, "unknown layer; not enabled");
            unknown.push(layer.clone());
        }
    }
    unknown
}

fn render_listing(listing: &LayerListing, is_active: impl Fn(&str) -> bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", listing.heading());
    if let Some(message) = listing.message() {
        let _ = writeln!(out, "{message}");
    }
    match listing {
        LayerListing::NoSelection { workspaces } => {
            for workspace in workspaces {
                let _ = writeln!(out, "  - {workspace}");
            }
        }
        LayerListing::Workspace { layers, .. } => {
            for layer in layers {
                let mark = if is_active(layer.full_name.as_str()) { 'x' } else { ' ' };
                let _ = writeln!(out, "  [{mark}] {}  {}", layer.full_name, layer.label());
            }
        }
    }
    out
}

fn render_stack(layers: &[SurfaceLayer]) -> String {
    let mut out = String::from("Map layers (bottom to top):\n");
    for layer in layers {
        let _ = match layer {
            SurfaceLayer::Base { base, .. } => writeln!(out, "  {} (base)", base.label()),
            SurfaceLayer::Tile { source, .. } => {
                writeln!(out, "  {} <- {}", source.layer_identifier, source.base_url)
            }
        };
    }
    out
}
