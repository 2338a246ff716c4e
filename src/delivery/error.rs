//! Delivery error definitions.

use thiserror::Error;

/// Failure of a single attempt before any response status was received.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

/// Errors that end a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Record could not be encoded; the delivery is abandoned.
    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// Every attempt failed with a transport error or 5xx.
    #[error("delivery failed after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: AttemptFailure },
}

/// Why the final attempt of an exhausted delivery failed.
#[derive(Debug, Clone, Error)]
pub enum AttemptFailure {
    #[error("{0}")]
    Transport(#[from] TransportError),

    #[error("backend returned status {0}")]
    Status(u16),
}

/// Result type for delivery operations.
pub type DeliveryResult<T> = Result<T, DeliveryError>;
