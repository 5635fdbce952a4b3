use std::fmt;

use shared::{error::DiscoveryError, protocol::WMS_PATH};
use url::Url;

/// Normalized map-server base address, without trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerUrl(String);

impl ServerUrl {
    pub fn parse(raw: &str) -> Result<Self, DiscoveryError> {
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(DiscoveryError::connection("server address is empty"));
        }

        let parsed = Url::parse(trimmed).map_err(|err| {
            DiscoveryError::connection(format!("invalid server address '{trimmed}': {err}"))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(DiscoveryError::connection(format!(
                "unsupported scheme '{}' in server address '{trimmed}'",
                parsed.scheme()
            )));
        }
        if parsed.host_str().is_none() {
            return Err(DiscoveryError::connection(format!(
                "server address '{trimmed}' has no host"
            )));
        }
        // The WMS path is appended to the address, so it must end at the path.
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(DiscoveryError::connection(format!(
                "server address '{trimmed}' must not carry a query or fragment"
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn wms_endpoint(&self) -> String {
        format!("{}/{WMS_PATH}", self.0)
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
