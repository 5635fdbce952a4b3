use map_surface::{LayerHandle, RenderSurface};
use shared::{domain::LayerName, error::DiscoveryError};
use tokio::sync::broadcast;
use tracing::{error, warn};

pub mod capabilities;
pub mod catalog;
pub mod config;
pub mod endpoint;
pub mod layers;
pub mod session;
pub mod transport;

pub use capabilities::parse_capabilities;
pub use catalog::{Catalog, LayerListing};
pub use endpoint::ServerUrl;
pub use layers::{ActiveLayerEntry, ActiveLayers, ToggleOutcome};
pub use session::{DiscoveryOutcome, DiscoverySummary, DiscoveryTicket, PanelSession};
pub use transport::{CapabilitiesSource, HttpCapabilitiesSource};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum PanelEvent {
    CatalogLoaded {
        server_url: String,
        workspaces: Vec<String>,
        layer_count: usize,
    },
    DiscoveryFailed(DiscoveryError),
    LayerAdded {
        name: LayerName,
        handle: LayerHandle,
    },
    LayerRemoved {
        name: LayerName,
        handle: LayerHandle,
    },
}

/// Drives a [`PanelSession`] against a capabilities source and a render
/// surface, publishing every state change as a [`PanelEvent`].
pub struct PanelController<S, R> {
    source: S,
    surface: R,
    session: PanelSession,
    events: broadcast::Sender<PanelEvent>,
}

impl<S: CapabilitiesSource, R: RenderSurface> PanelController<S, R> {
    pub fn new(source: S, surface: R) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            source,
            surface,
            session: PanelSession::new(),
            events,
        }
    }

    pub fn session(&self) -> &PanelSession {
        &self.session
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub async fn load_capabilities(
        &mut self,
        raw_url: &str,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let result = self.discover(raw_url).await;
        match &result {
            Ok(DiscoveryOutcome::Committed(summary)) => {
                for entry in &summary.released {
                    let _ = self.events.send(PanelEvent::LayerRemoved {
                        name: entry.name.clone(),
                        handle: entry.layer,
                    });
                }
                let _ = self.events.send(PanelEvent::CatalogLoaded {
                    server_url: summary.server_url.to_string(),
                    workspaces: summary.workspaces.clone(),
                    layer_count: summary.layer_count,
                });
            }
            Ok(DiscoveryOutcome::Superseded) => {}
            Err(err) => {
                error!("error loading capabilities: {err}");
                let _ = self.events.send(PanelEvent::DiscoveryFailed(err.clone()));
            }
        }
        result
    }

    async fn discover(&mut self, raw_url: &str) -> Result<DiscoveryOutcome, DiscoveryError> {
        let ticket = self.session.begin_discovery(raw_url)?;
        let fetched = self.source.fetch_capabilities(ticket.server_url()).await;
        self.session
            .complete_discovery(ticket, fetched, &mut self.surface)
    }

    pub fn select_workspace(&mut self, workspace: &str) -> LayerListing {
        self.session.on_workspace_selected(workspace)
    }

    pub fn toggle_layer(&mut self, full_name: &str, turn_on: bool) -> ToggleOutcome {
        let outcome = self
            .session
            .on_layer_toggled(full_name, turn_on, &mut self.surface);
        let Ok(name) = LayerName::parse(full_name) else {
            return outcome;
        };
        match outcome {
            ToggleOutcome::Added(handle) => {
                let _ = self.events.send(PanelEvent::LayerAdded { name, handle });
            }
            ToggleOutcome::Removed(handle) => {
                let _ = self.events.send(PanelEvent::LayerRemoved { name, handle });
            }
            ToggleOutcome::UnknownLayer => warn!(layer = %name, "toggle rejected"),
            ToggleOutcome::AlreadyActive | ToggleOutcome::NotActive => {}
        }
        outcome
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
