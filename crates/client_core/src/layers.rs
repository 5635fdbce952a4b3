use map_surface::{LayerHandle, RenderSurface, TileSourceConfig};
use shared::domain::LayerName;
use tracing::info;

use crate::{catalog::Catalog, endpoint::ServerUrl};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLayerEntry {
    pub name: LayerName,
    pub layer: LayerHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added(LayerHandle),
    Removed(LayerHandle),
    /// Turn-on for a layer that is already rendered; nothing changed.
    AlreadyActive,
    /// Turn-off for a layer that is not rendered; nothing changed.
    NotActive,
    /// The name does not belong to the current catalog; nothing changed.
    UnknownLayer,
}

/// Layers currently rendered on the surface, at most one entry per name.
#[derive(Debug, Clone, Default)]
pub struct ActiveLayers {
    entries: Vec<ActiveLayerEntry>,
}

impl ActiveLayers {
    pub fn toggle(
        &mut self,
        name: &LayerName,
        server_url: &ServerUrl,
        turn_on: bool,
        surface: &mut dyn RenderSurface,
    ) -> ToggleOutcome {
        let position = self.entries.iter().position(|entry| &entry.name == name);

        match (turn_on, position) {
            (true, Some(_)) => ToggleOutcome::AlreadyActive,
            (true, None) => {
                let layer = surface.add_layer(TileSourceConfig::for_layer(server_url.as_str(), name));
                self.entries.push(ActiveLayerEntry {
                    name: name.clone(),
                    layer,
                });
                info!(layer = %name, server_url = %server_url, "added layer");
                ToggleOutcome::Added(layer)
            }
            (false, Some(index)) => {
                let entry = self.entries.remove(index);
                surface.remove_layer(entry.layer);
                info!(layer = %name, "removed layer");
                ToggleOutcome::Removed(entry.layer)
            }
            (false, None) => ToggleOutcome::NotActive,
        }
    }

    pub fn is_active(&self, name: &LayerName) -> bool {
        self.entries.iter().any(|entry| &entry.name == name)
    }

    pub fn entries(&self) -> &[ActiveLayerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every active layer from the surface.
    pub fn clear(&mut self, surface: &mut dyn RenderSurface) -> Vec<ActiveLayerEntry> {
        let released = std::mem::take(&mut self.entries);
        for entry in &released {
            surface.remove_layer(entry.layer);
        }
        released
    }

    /// Removes active layers that `catalog` no longer lists.
    pub fn retain_known(
        &mut self,
        catalog: &Catalog,
        surface: &mut dyn RenderSurface,
    ) -> Vec<ActiveLayerEntry> {
        let (kept, released): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| catalog.contains(&entry.name));
        for entry in &released {
            surface.remove_layer(entry.layer);
        }
        self.entries = kept;
        released
    }
}

#[cfg(test)]
#[path = "tests/layers_tests.rs"]
mod tests;
