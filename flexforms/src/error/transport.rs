//! Transport error types

use std::time::Duration;

use serde::{Serialize, Serializer};

/// Errors a [`Transport`](crate::Transport) can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Connection or protocol failure.
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The request body could not be encoded.
    #[error("Encode error: {0}")]
    Encode(String),
}

impl TransportError {
    /// Returns `true` if resending the same request could succeed.
    ///
    /// Forms never retry on their own; this is for hooks and callers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Timeout(_))
    }
}

impl Serialize for TransportError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}
