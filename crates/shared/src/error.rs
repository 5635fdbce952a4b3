use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryErrorKind {
    Connection,
    Parse,
}

/// Failure of one capability discovery attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("Failed to connect to map server: {message}")]
    Connection { message: String },
    #[error("Failed to parse capabilities document: {message}")]
    Parse { message: String },
}

impl DiscoveryError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> DiscoveryErrorKind {
        match self {
            Self::Connection { .. } => DiscoveryErrorKind::Connection,
            Self::Parse { .. } => DiscoveryErrorKind::Parse,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Connection { message } | Self::Parse { message } => message,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerNameError {
    #[error("layer name is empty")]
    Empty,
    #[error("layer name '{0}' has no workspace prefix")]
    MissingWorkspace(String),
    #[error("layer name '{0}' has an empty workspace")]
    EmptyWorkspace(String),
    #[error("layer name '{0}' has an empty layer part")]
    EmptyLayer(String),
}
