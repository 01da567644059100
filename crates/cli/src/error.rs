//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration could not be loaded or is invalid
    #[error("Invalid configuration: {0}")]
    Config(#[from] contracts::ContractError),

    /// HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Delivery(#[from] delivery::DeliveryError),

    /// Message source could not be created
    #[error("Failed to create message source: {0}")]
    Source(#[from] ingestion::IngestionError),

    /// Dispatcher setup or run failed
    #[error("Relay failed: {0}")]
    Dispatch(#[from] dispatcher::DispatcherError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }
}

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
