//! Error types for delivery operations.
//!
//! Separates transport failures (worth rotating to another endpoint) from
//! application rejections (the payload is the problem, so no endpoint would
//! accept it) and from configuration errors found at construction.

use std::fmt;

use thiserror::Error;

/// Result type alias for delivery operations.
pub type Result<T> = std::result::Result<T, DeliveryError>;

/// Error types for delivery operations.
#[derive(Debug, Clone, Error)]
pub enum DeliveryError {
    /// Network-level failure reaching one endpoint.
    #[error("network error on {endpoint}: {message}")]
    NetworkError {
        /// Endpoint the attempt targeted
        endpoint: String,
        /// Error message describing the network failure
        message: String,
    },

    /// Request timed out against one endpoint.
    #[error("request to {endpoint} timed out after {timeout_seconds}s")]
    Timeout {
        /// Endpoint the attempt targeted
        endpoint: String,
        /// Configured request timeout
        timeout_seconds: u64,
    },

    /// Response status not acceptable for the destination.
    #[error("rejected by {endpoint}: HTTP {status_code}")]
    Rejected {
        /// Endpoint that answered
        endpoint: String,
        /// HTTP status code
        status_code: u16,
        /// Response body excerpt
        body: String,
    },

    /// Every endpoint failed at transport level.
    #[error("all {attempts} endpoints unreachable, last error: {last_error}")]
    Exhausted {
        /// Number of attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: Box<DeliveryError>,
    },

    /// Invalid destination configuration.
    #[error("invalid destination configuration: {message}")]
    ConfigurationError {
        /// Configuration error message
        message: String,
    },
}

impl DeliveryError {
    /// Creates a network error for an endpoint.
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkError {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Creates a timeout error for an endpoint.
    pub fn timeout(endpoint: impl Into<String>, timeout_seconds: u64) -> Self {
        Self::Timeout {
            endpoint: endpoint.into(),
            timeout_seconds,
        }
    }

    /// Creates a rejection from an HTTP response.
    pub fn rejected(
        endpoint: impl Into<String>,
        status_code: u16,
        body: impl Into<String>,
    ) -> Self {
        Self::Rejected {
            endpoint: endpoint.into(),
            status_code,
            body: body.into(),
        }
    }

    /// Creates an exhaustion error wrapping the final transport failure.
    pub fn exhausted(attempts: u32, last_error: DeliveryError) -> Self {
        Self::Exhausted {
            attempts,
            last_error: Box::new(last_error),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Whether this is a single-attempt transport failure.
    ///
    /// Only these cause the engine to rotate to the next endpoint.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::NetworkError { .. } | Self::Timeout { .. })
    }

    /// HTTP status of a rejection, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Rejected { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Category of delivery error for metrics and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Single endpoint unreachable.
    Transport,
    /// Non-acceptable HTTP status.
    Rejected,
    /// All endpoints unreachable.
    Exhausted,
    /// Configuration problems.
    Configuration,
}

impl From<&DeliveryError> for ErrorCategory {
    fn from(error: &DeliveryError) -> Self {
        match error {
            DeliveryError::NetworkError { .. } | DeliveryError::Timeout { .. } => Self::Transport,
            DeliveryError::Rejected { .. } => Self::Rejected,
            DeliveryError::Exhausted { .. } => Self::Exhausted,
            DeliveryError::ConfigurationError { .. } => Self::Configuration,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "transport"),
            Self::Rejected => write!(f, "rejected"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}
