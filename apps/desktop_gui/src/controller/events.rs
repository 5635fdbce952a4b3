//! UI/backend events and error modeling for the panel controller.

use client_core::DiscoveryTicket;
use shared::error::{DiscoveryError, DiscoveryErrorKind};

pub enum UiEvent {
    Info(String),
    CapabilitiesFetched {
        ticket: DiscoveryTicket,
        result: Result<String, DiscoveryError>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Connection,
    Parse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Discovery,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_discovery(err: &DiscoveryError) -> Self {
        let category = match err.kind() {
            DiscoveryErrorKind::Connection => UiErrorCategory::Connection,
            DiscoveryErrorKind::Parse => UiErrorCategory::Parse,
        };
        Self {
            category,
            context: UiErrorContext::Discovery,
            message: err.to_string(),
        }
    }

    /// The backend worker could not start, so no request can reach a server.
    pub fn backend_startup(message: impl Into<String>) -> Self {
        Self {
            category: UiErrorCategory::Connection,
            context: UiErrorContext::BackendStartup,
            message: message.into(),
        }
    }

    pub fn title(&self) -> &'static str {
        match (self.context, self.category) {
            (UiErrorContext::BackendStartup, _) => "Backend unavailable",
            (_, UiErrorCategory::Connection) => "Connection failed",
            (_, UiErrorCategory::Parse) => "Invalid capabilities",
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
