//! Class and attribute names the form reads and writes.

/// Class of inline error nodes inserted next to a field.
pub const ERROR_NODE_CLASS: &str = "form-error";
/// Class put on a field whose saved validity is invalid.
pub const INVALID_CLASS: &str = "invalid";
/// Class put on a field while its validator runs, and on the form while submitting.
pub const LOADING_CLASS: &str = "loading";
/// Class of the tooltip container.
pub const TOOLTIP_CLASS: &str = "error-tooltip";

pub const ARIA_INVALID: &str = "aria-invalid";

/// Remote submit mode. `json` sends a JSON body, anything else form data.
pub const ATTR_REMOTE: &str = "data-remote";
/// Target URL for remote submission.
pub const ATTR_REMOTE_ACTION: &str = "data-remote-action";
pub const ATTR_DISABLE_INLINE: &str = "data-disable-inline-validation";
/// Name of the custom validator for a field.
pub const ATTR_VALIDATE: &str = "data-validate";
pub const ATTR_VALIDATION_MESSAGE: &str = "data-validation-message";
/// Links an inline error node to the field it describes.
pub const ATTR_ERROR_FOR: &str = "data-error-for";

/// Custom validity message used when a validator fails without setting one.
pub const DEFAULT_VALIDATION_MESSAGE: &str = "Please correct this field.";
