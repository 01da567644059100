//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Route could not be built from its configuration
    #[error("failed to create route '{route}': {message}")]
    RouteCreation { route: String, message: String },

    /// Discard ratio below zero
    #[error("discard ratio must be >= 0, got {ratio}")]
    InvalidDiscardRatio { ratio: i64 },

    /// The message source can no longer deliver records
    #[error("source '{source_name}' failed: {message}")]
    SourceFatal {
        source_name: String,
        message: String,
    },

    /// Contract error
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    /// Create a route creation error
    pub fn route_creation(route: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RouteCreation {
            route: route.into(),
            message: message.into(),
        }
    }

    /// Create a fatal source error
    pub fn source_fatal(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceFatal {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Whether this error comes from configuration rather than runtime
    pub fn is_config(&self) -> bool {
        match self {
            Self::RouteCreation { .. } | Self::InvalidDiscardRatio { .. } => true,
            Self::Contract(e) => e.is_config(),
            Self::SourceFatal { .. } => false,
        }
    }
}
