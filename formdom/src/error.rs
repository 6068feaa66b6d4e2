//! Document error types

/// Errors raised by [`Document`](crate::Document) operations.
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// No element carries the given id.
    #[error("element not found: {0}")]
    NotFound(String),

    /// Markup could not be parsed into an element tree.
    #[error("invalid markup: {0}")]
    Markup(#[from] serde_json::Error),
}
