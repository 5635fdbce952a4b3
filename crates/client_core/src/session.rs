//! Panel session: the one owner of discovery results and layer toggles.
//!
//! Discovery is split into [`PanelSession::begin_discovery`] and
//! [`PanelSession::complete_discovery`] so the fetch can run elsewhere. Every
//! begin issues a newer ticket; responses carrying an older ticket are
//! discarded, so the most recently requested server always wins.

use map_surface::RenderSurface;
use shared::{domain::LayerName, error::DiscoveryError};
use tracing::{info, warn};

use crate::{
    capabilities::parse_capabilities,
    catalog::{Catalog, LayerListing},
    endpoint::ServerUrl,
    layers::{ActiveLayerEntry, ActiveLayers, ToggleOutcome},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryTicket {
    generation: u64,
    server_url: ServerUrl,
}

impl DiscoveryTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn server_url(&self) -> &ServerUrl {
        &self.server_url
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverySummary {
    pub server_url: ServerUrl,
    pub workspaces: Vec<String>,
    pub layer_count: usize,
    /// Active layers taken off the surface because they no longer apply.
    pub released: Vec<ActiveLayerEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscoveryOutcome {
    Committed(DiscoverySummary),
    /// A newer discovery was started before this one finished.
    Superseded,
}

#[derive(Debug, Default)]
pub struct PanelSession {
    server_url: Option<ServerUrl>,
    catalog: Catalog,
    active: ActiveLayers,
    selected_workspace: String,
    generation: u64,
}

impl PanelSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn server_url(&self) -> Option<&ServerUrl> {
        self.server_url.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn active_layers(&self) -> &ActiveLayers {
        &self.active
    }

    pub fn selected_workspace(&self) -> &str {
        &self.selected_workspace
    }

    pub fn begin_discovery(&mut self, raw_url: &str) -> Result<DiscoveryTicket, DiscoveryError> {
        let server_url = ServerUrl::parse(raw_url)?;
        self.generation += 1;
        Ok(DiscoveryTicket {
            generation: self.generation,
            server_url,
        })
    }

    /// Applies a fetched capabilities body. Nothing is modified unless the
    /// ticket is current and the body parses.
    pub fn complete_discovery(
        &mut self,
        ticket: DiscoveryTicket,
        fetched: Result<String, DiscoveryError>,
        surface: &mut dyn RenderSurface,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        if ticket.generation != self.generation {
            warn!(
                server_url = %ticket.server_url,
                generation = ticket.generation,
                current = self.generation,
                "discarding superseded capabilities response"
            );
            return Ok(DiscoveryOutcome::Superseded);
        }

        let body = fetched?;
        let catalog = parse_capabilities(&body)?;

        let released = if self.server_url.as_ref() == Some(&ticket.server_url) {
            self.active.retain_known(&catalog, surface)
        } else {
            self.active.clear(surface)
        };

        let summary = DiscoverySummary {
            server_url: ticket.server_url.clone(),
            workspaces: catalog.workspaces().to_sorted_vec(),
            layer_count: catalog.len(),
            released,
        };
        info!(
            server_url = %ticket.server_url,
            workspaces = summary.workspaces.len(),
            layers = summary.layer_count,
            "found {} workspaces and {} layers",
            summary.workspaces.len(),
            summary.layer_count
        );

        self.server_url = Some(ticket.server_url);
        self.catalog = catalog;
        self.selected_workspace.clear();
        Ok(DiscoveryOutcome::Committed(summary))
    }

    pub fn on_workspace_selected(&mut self, workspace: &str) -> LayerListing {
        self.selected_workspace = workspace.trim().to_string();
        self.catalog.select_workspace(&self.selected_workspace)
    }

    /// Listing for the current selection without changing it.
    pub fn current_listing(&self) -> LayerListing {
        self.catalog.select_workspace(&self.selected_workspace)
    }

    pub fn on_layer_toggled(
        &mut self,
        full_name: &str,
        turn_on: bool,
        surface: &mut dyn RenderSurface,
    ) -> ToggleOutcome {
        let Ok(name) = LayerName::parse(full_name) else {
            warn!(layer = full_name, "ignoring toggle for malformed layer name");
            return ToggleOutcome::UnknownLayer;
        };

        if !turn_on {
            return match &self.server_url {
                Some(server_url) => self.active.toggle(&name, server_url, false, surface),
                None => ToggleOutcome::NotActive,
            };
        }

        let (Some(server_url), true) = (&self.server_url, self.catalog.contains(&name)) else {
            warn!(layer = %name, "ignoring toggle for layer outside the current catalog");
            return ToggleOutcome::UnknownLayer;
        };
        self.active.toggle(&name, server_url, true, surface)
    }

    pub fn is_layer_active(&self, full_name: &str) -> bool {
        LayerName::parse(full_name)
            .map(|name| self.active.is_active(&name))
            .unwrap_or(false)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
