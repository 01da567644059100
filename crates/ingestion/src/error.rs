//! Ingestion error types

use thiserror::Error;

/// Ingestion error
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Source kind not available in this build
    #[error("source '{kind}' is not available: {message}")]
    Unavailable {
        /// Source kind
        kind: String,
        /// Error message
        message: String,
    },

    /// Source failed to connect or subscribe
    #[error(transparent)]
    Contract(#[from] contracts::ContractError),
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
