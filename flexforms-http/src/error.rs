//! Transport construction errors

use flexforms::TransportError;

/// Errors that can occur while building a [`ReqwestTransport`](crate::ReqwestTransport).
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The underlying HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    /// The base URL does not parse.
    #[error("Invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),

    /// A default header has an invalid name or value.
    #[error("Invalid header {0:?}")]
    Header(String),
}

/// Map a `reqwest` failure onto the transport error the form sees.
pub(crate) fn transport_error(error: reqwest::Error, timeout: Option<std::time::Duration>) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(timeout.unwrap_or_default())
    } else if error.is_builder() {
        TransportError::InvalidUrl(error.to_string())
    } else {
        TransportError::Network(error.to_string())
    }
}
