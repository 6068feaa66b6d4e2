//! Form options.

use formdom::Element;
use serde::{Deserialize, Serialize};

pub const ATTR_CREATE_TOOLTIPS: &str = "data-create-tooltips";
pub const ATTR_APPEND_ERROR: &str = "data-append-error";
pub const ATTR_AJAX_SUBMIT_TYPE: &str = "data-ajax-submit-type";
pub const ATTR_AJAX_JSON_CONTENT_TYPE: &str = "data-ajax-json-content-type";
pub const ATTR_INLINE_VALIDATION: &str = "data-inline-validation";

/// Behaviour switches for a bound form.
///
/// Options are merged from three sources, later ones winning:
/// [`FormOptions::default`], the options passed to the builder, and the
/// `data-*` attributes on the form element itself
/// ([`apply_attributes`](Self::apply_attributes)).
///
/// # Example
///
/// ```
/// use flexforms::FormOptions;
///
/// let options = FormOptions::default()
///     .create_tooltips(false)
///     .append_error(true);
/// assert_eq!(options.ajax_submit_type, "POST");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormOptions {
    /// Show error tooltips next to invalid fields.
    pub create_tooltips: bool,
    /// Insert an inline error node next to invalid fields.
    pub append_error: bool,
    /// HTTP method for remote submission.
    pub ajax_submit_type: String,
    /// `Content-Type` sent with JSON remote submissions.
    pub ajax_json_content_type: String,
    /// Validate fields on blur and show their errors on focus.
    pub inline_validation: bool,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            create_tooltips: true,
            append_error: false,
            ajax_submit_type: "POST".to_string(),
            ajax_json_content_type: "application/json; charset=utf-8".to_string(),
            inline_validation: true,
        }
    }
}

impl FormOptions {
    pub fn create_tooltips(mut self, enabled: bool) -> Self {
        self.create_tooltips = enabled;
        self
    }

    pub fn append_error(mut self, enabled: bool) -> Self {
        self.append_error = enabled;
        self
    }

    pub fn ajax_submit_type(mut self, method: impl Into<String>) -> Self {
        self.ajax_submit_type = method.into();
        self
    }

    pub fn ajax_json_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.ajax_json_content_type = content_type.into();
        self
    }

    pub fn inline_validation(mut self, enabled: bool) -> Self {
        self.inline_validation = enabled;
        self
    }

    /// Override options with the `data-*` attributes declared on `form`.
    pub fn apply_attributes(mut self, form: &Element) -> Self {
        if let Some(flag) = flag_attribute(form, ATTR_CREATE_TOOLTIPS) {
            self.create_tooltips = flag;
        }
        if let Some(flag) = flag_attribute(form, ATTR_APPEND_ERROR) {
            self.append_error = flag;
        }
        if let Some(flag) = flag_attribute(form, ATTR_INLINE_VALIDATION) {
            self.inline_validation = flag;
        }
        if let Some(method) = form.attribute(ATTR_AJAX_SUBMIT_TYPE).filter(|m| !m.is_empty()) {
            self.ajax_submit_type = method.to_ascii_uppercase();
        }
        if let Some(content_type) = form
            .attribute(ATTR_AJAX_JSON_CONTENT_TYPE)
            .filter(|c| !c.is_empty())
        {
            self.ajax_json_content_type = content_type.to_string();
        }
        self
    }
}

fn flag_attribute(form: &Element, name: &str) -> Option<bool> {
    let raw = form.attribute(name)?;
    let parsed = parse_flag(raw);
    if parsed.is_none() {
        log::warn!("[flexforms] ignoring {}={:?} on form {}", name, raw, form.id);
    }
    parsed
}

/// Parse a boolean attribute. A present but empty attribute means `true`.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
