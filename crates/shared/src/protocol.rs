//! WMS wire constants shared by the capability client and the tile sources.

use serde::{Deserialize, Serialize};

pub const WMS_PATH: &str = "wms";
pub const WMS_SERVICE: &str = "WMS";
pub const WMS_VERSION: &str = "1.3.0";
pub const GET_CAPABILITIES: &str = "GetCapabilities";
pub const GET_MAP: &str = "GetMap";

/// Query parameters of a GetCapabilities request, in wire order.
pub fn capabilities_query() -> [(&'static str, &'static str); 3] {
    [
        ("service", WMS_SERVICE),
        ("version", WMS_VERSION),
        ("request", GET_CAPABILITIES),
    ]
}

/// Vendor hint passed to tile sources so they can use server-specific
/// extensions such as HiDPI tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerType {
    #[default]
    Geoserver,
}

impl ServerType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Geoserver => "geoserver",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_query_targets_wms_1_3_0() {
        let query = capabilities_query();
        assert_eq!(query[0], ("service", "WMS"));
        assert_eq!(query[1], ("version", "1.3.0"));
        assert_eq!(query[2], ("request", "GetCapabilities"));
    }

    #[test]
    fn server_type_wire_names() {
        assert_eq!(ServerType::default().as_str(), "geoserver");
        assert_eq!(
            serde_json::to_string(&ServerType::Geoserver).expect("serialize"),
            "\"geoserver\""
        );
    }
}
