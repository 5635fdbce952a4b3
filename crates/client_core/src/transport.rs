use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use shared::{error::DiscoveryError, protocol::capabilities_query};
use tracing::{debug, error};

use crate::endpoint::ServerUrl;

#[async_trait]
pub trait CapabilitiesSource: Send + Sync {
    /// Returns the raw GetCapabilities body for `server_url`.
    async fn fetch_capabilities(&self, server_url: &ServerUrl) -> Result<String, DiscoveryError>;
}

#[derive(Debug, Clone)]
pub struct HttpCapabilitiesSource {
    http: Client,
}

impl HttpCapabilitiesSource {
    pub fn new(timeout: Duration) -> Result<Self, DiscoveryError> {
        let http = Client::builder().timeout(timeout).build().map_err(|err| {
            DiscoveryError::connection(format!("failed to build HTTP client: {err}"))
        })?;
        Ok(Self { http })
    }
}

#[async_trait]
impl CapabilitiesSource for HttpCapabilitiesSource {
    async fn fetch_capabilities(&self, server_url: &ServerUrl) -> Result<String, DiscoveryError> {
        let endpoint = server_url.wms_endpoint();
        debug!(endpoint = %endpoint, "requesting capabilities");

        let response = self
            .http
            .get(&endpoint)
            .query(&capabilities_query()[..])
            .send()
            .await
            .map_err(|err| {
                error!(endpoint = %endpoint, "capabilities request failed: {err}");
                DiscoveryError::connection(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(endpoint = %endpoint, status = status.as_u16(), "capabilities request rejected");
            return Err(DiscoveryError::connection(format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unexpected status")
            )));
        }

        response
            .text()
            .await
            .map_err(|err| DiscoveryError::connection(format!("failed to read response body: {err}")))
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
