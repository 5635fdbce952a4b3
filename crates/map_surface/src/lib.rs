//! Boundary to the map rendering surface.
//!
//! Tile fetching, projection and compositing belong to the rendering library
//! behind [`RenderSurface`]; this crate only describes what to draw.

use serde::{Deserialize, Serialize};
use shared::{
    domain::LayerName,
    protocol::{ServerType, GET_MAP, WMS_PATH, WMS_SERVICE, WMS_VERSION},
};
use tracing::debug;

pub const DEFAULT_TILE_FORMAT: &str = "image/png";
pub const DEFAULT_TILE_SIZE: u32 = 256;
pub const DEFAULT_CRS: &str = "EPSG:3857";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerHandle(pub u64);

/// Tile source parameters for one WMS layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSourceConfig {
    pub base_url: String,
    pub layer_identifier: LayerName,
    pub tiled: bool,
    pub server_type: ServerType,
}

impl TileSourceConfig {
    pub fn for_layer(server_base_url: &str, layer: &LayerName) -> Self {
        Self {
            base_url: format!("{}/{WMS_PATH}", server_base_url.trim_end_matches('/')),
            layer_identifier: layer.clone(),
            tiled: true,
            server_type: ServerType::Geoserver,
        }
    }

    /// Layer-specific request parameters merged into every tile request.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("LAYERS", self.layer_identifier.to_string()),
            ("TILED", self.tiled.to_string()),
        ]
    }

    /// GetMap request with a `{bbox}` placeholder for the tile extent.
    pub fn get_map_template(&self) -> String {
        let mut query = vec![
            ("SERVICE", WMS_SERVICE.to_string()),
            ("VERSION", WMS_VERSION.to_string()),
            ("REQUEST", GET_MAP.to_string()),
            ("FORMAT", DEFAULT_TILE_FORMAT.to_string()),
            ("TRANSPARENT", "true".to_string()),
        ];
        query.extend(self.params());
        query.extend([
            ("CRS", DEFAULT_CRS.to_string()),
            ("WIDTH", DEFAULT_TILE_SIZE.to_string()),
            ("HEIGHT", DEFAULT_TILE_SIZE.to_string()),
            ("BBOX", "{bbox}".to_string()),
        ]);
        let query = query
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{query}", self.base_url)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseLayer {
    #[default]
    OpenStreetMap,
}

impl BaseLayer {
    pub fn label(self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center_lon: f64,
    pub center_lat: f64,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center_lon: 0.0,
            center_lat: 0.0,
            zoom: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceLayer {
    Base {
        handle: LayerHandle,
        base: BaseLayer,
    },
    Tile {
        handle: LayerHandle,
        source: TileSourceConfig,
    },
}

impl SurfaceLayer {
    pub fn handle(&self) -> LayerHandle {
        match self {
            Self::Base { handle, .. } | Self::Tile { handle, .. } => *handle,
        }
    }
}

pub trait RenderSurface {
    /// Appends a tile layer on top of the stack.
    fn add_layer(&mut self, source: TileSourceConfig) -> LayerHandle;
    /// Removes exactly the layer behind `handle`; returns false if it was absent.
    fn remove_layer(&mut self, handle: LayerHandle) -> bool;
    fn layers(&self) -> &[SurfaceLayer];
}

/// In-process layer stack used when no external map widget is attached.
#[derive(Debug, Clone)]
pub struct LayerStack {
    view: MapView,
    layers: Vec<SurfaceLayer>,
    next_handle: u64,
}

impl LayerStack {
    pub fn new(base: BaseLayer, view: MapView) -> Self {
        let mut stack = Self {
            view,
            layers: Vec::new(),
            next_handle: 0,
        };
        let handle = stack.allocate_handle();
        stack.layers.push(SurfaceLayer::Base { handle, base });
        stack
    }

    pub fn view(&self) -> MapView {
        self.view
    }

    pub fn tile_sources(&self) -> impl Iterator<Item = &TileSourceConfig> {
        self.layers.iter().filter_map(|layer| match layer {
            SurfaceLayer::Tile { source, .. } => Some(source),
            SurfaceLayer::Base { .. } => None,
        })
    }

    fn allocate_handle(&mut self) -> LayerHandle {
        let handle = LayerHandle(self.next_handle);
        self.next_handle += 1;
        handle
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new(BaseLayer::default(), MapView::default())
    }
}

impl RenderSurface for LayerStack {
    fn add_layer(&mut self, source: TileSourceConfig) -> LayerHandle {
        let handle = self.allocate_handle();
        debug!(layer = %source.layer_identifier, handle = handle.0, "surface add layer");
        self.layers.push(SurfaceLayer::Tile { handle, source });
        handle
    }

    fn remove_layer(&mut self, handle: LayerHandle) -> bool {
        let Some(index) = self
            .layers
            .iter()
            .position(|layer| matches!(layer, SurfaceLayer::Tile { .. }) && layer.handle() == handle)
        else {
            return false;
        };
        self.layers.remove(index);
        debug!(handle = handle.0, "surface remove layer");
        true
    }

    fn layers(&self) -> &[SurfaceLayer] {
        &self.layers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roads() -> LayerName {
        LayerName::parse("ws1:roads").expect("valid name")
    }

    #[test]
    fn tile_source_targets_wms_endpoint_with_tiling() {
        let source = TileSourceConfig::for_layer("http://maps.local/geoserver/", &roads());
        assert_eq!(source.base_url, "http://maps.local/geoserver/wms");
        assert!(source.tiled);
        assert_eq!(source.server_type, ServerType::Geoserver);
        assert_eq!(
            source.params(),
            vec![("LAYERS", "ws1:roads".to_string()), ("TILED", "true".to_string())]
        );
    }

    #[test]
    fn get_map_template_carries_layer_and_bbox_placeholder() {
        let source = TileSourceConfig::for_layer("http://maps.local/geoserver", &roads());
        let template = source.get_map_template();
        assert!(template.starts_with("http://maps.local/geoserver/wms?SERVICE=WMS&VERSION=1.3.0&REQUEST=GetMap"));
        assert!(template.contains("LAYERS=ws1:roads"));
        assert!(template.contains("TILED=true"));
        assert!(template.ends_with("BBOX={bbox}"));
    }

    #[test]
    fn stack_starts_with_base_layer() {
        let stack = LayerStack::default();
        assert_eq!(stack.layers().len(), 1);
        assert!(matches!(
            stack.layers()[0],
            SurfaceLayer::Base {
                base: BaseLayer::OpenStreetMap,
                ..
            }
        ));
        assert_eq!(stack.view(), MapView::default());
    }

    #[test]
    fn remove_layer_only_drops_matching_tile_layer() {
        let mut stack = LayerStack::default();
        let base_handle = stack.layers()[0].handle();
        let first = stack.add_layer(TileSourceConfig::for_layer("http://a", &roads()));
        let second = stack.add_layer(TileSourceConfig::for_layer("http://a", &roads()));
        assert_ne!(first, second);

        assert!(!stack.remove_layer(base_handle));
        assert!(stack.remove_layer(first));
        assert!(!stack.remove_layer(first));
        assert_eq!(stack.layers().len(), 2);
        assert_eq!(stack.layers()[1].handle(), second);
    }

    #[test]
    fn surface_layers_serialize_with_kind_tag() {
        let mut stack = LayerStack::default();
        stack.add_layer(TileSourceConfig::for_layer("http://a", &roads()));
        let json = serde_json::to_value(stack.layers()).expect("serialize");
        assert_eq!(json[0]["kind"], "base");
        assert_eq!(json[1]["kind"], "tile");
        assert_eq!(json[1]["source"]["layer_identifier"], "ws1:roads");
        assert_eq!(json[1]["source"]["server_type"], "geoserver");
    }
}
