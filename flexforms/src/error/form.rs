//! Form controller errors

use formdom::Tag;

/// Errors raised by the form controller.
///
/// These are configuration errors: they describe a misuse of the API, not a
/// field failing validation. Validation failures are reported through
/// [`ValidationPassResult`](crate::ValidationPassResult).
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// A validator was requested by name but never registered.
    #[error("validator not found: {0}")]
    ValidatorNotFound(String),

    /// The element a form was bound to is not a `<form>`.
    #[error("cannot bind a form to a <{tag}> element")]
    NotAForm {
        /// Tag of the element that was passed.
        tag: Tag,
    },

    /// The referenced element does not exist in the document.
    #[error("unknown element: {0}")]
    UnknownElement(String),

    /// A remote submission was attempted without a transport.
    #[error("form has data-remote but no transport is configured")]
    MissingTransport,

    /// The form was bound outside a tokio runtime.
    #[error("forms must be bound inside a tokio runtime")]
    NoRuntime,
}

impl From<formdom::DomError> for FormError {
    fn from(err: formdom::DomError) -> Self {
        match err {
            formdom::DomError::NotFound(id) => Self::UnknownElement(id),
            other => Self::UnknownElement(other.to_string()),
        }
    }
}
