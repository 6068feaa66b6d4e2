//! Native constraint validation.
//!
//! Computes the browser's `ValidityState` for a control from its markup:
//! `required`, `type` (email, url, number), `pattern`, `minlength`,
//! `maxlength`, `min`, `max` and the custom validity message.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::element::{Element, Tag};

/// Validity state for a form control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidityState {
    /// Required but empty (or an unchecked required checkbox / radio group)
    pub value_missing: bool,
    /// Value does not parse as the input type (email, url)
    pub type_mismatch: bool,
    /// Value does not match the `pattern` attribute
    pub pattern_mismatch: bool,
    /// Value is longer than `maxlength`
    pub too_long: bool,
    /// Value is shorter than `minlength`
    pub too_short: bool,
    /// Value is below `min`
    pub range_underflow: bool,
    /// Value is above `max`
    pub range_overflow: bool,
    /// Number input holds something that is not a number
    pub bad_input: bool,
    /// A custom validity message is set
    pub custom_error: bool,
}

impl ValidityState {
    /// Check if all constraints are satisfied
    pub fn valid(&self) -> bool {
        !self.value_missing
            && !self.type_mismatch
            && !self.pattern_mismatch
            && !self.too_long
            && !self.too_short
            && !self.range_underflow
            && !self.range_overflow
            && !self.bad_input
            && !self.custom_error
    }
}

/// Compute the validity of `element`. `root` is the tree it lives in, needed
/// for radio groups.
pub fn compute(root: &Element, element: &Element) -> ValidityState {
    let mut state = ValidityState {
        custom_error: !element.custom_validity.is_empty(),
        ..Default::default()
    };
    if !element.is_validation_candidate() {
        // Barred controls never report custom errors either.
        state.custom_error = false;
        return state;
    }

    let kind = element.input_type();
    let value = element.value.as_str();

    if element.has_attribute("required") {
        state.value_missing = match kind.as_str() {
            "checkbox" => !element.checked,
            "radio" => !radio_group_checked(root, element),
            _ => value.is_empty(),
        };
    }

    if value.is_empty() || element.tag != Tag::Input {
        if element.tag == Tag::Textarea {
            check_length(element, value, &mut state);
        }
        return state;
    }

    match kind.as_str() {
        "email" => state.type_mismatch = !email_address::EmailAddress::is_valid(value),
        "url" => state.type_mismatch = url::Url::parse(value).is_err(),
        "number" => check_range(element, value, &mut state),
        _ => {}
    }

    if let Some(pattern) = element.attribute("pattern") {
        match Regex::new(&format!("^(?:{pattern})$")) {
            Ok(re) => state.pattern_mismatch = !re.is_match(value),
            Err(e) => log::debug!("[validity] ignoring invalid pattern on {}: {}", element.id, e),
        }
    }

    check_length(element, value, &mut state);
    state
}

/// Browser-style message for the first failing constraint.
pub fn message(element: &Element, state: &ValidityState) -> String {
    if state.custom_error {
        return element.custom_validity.clone();
    }
    if state.value_missing {
        let msg = match (element.tag, element.input_type().as_str()) {
            (Tag::Input, "checkbox") => "Please check this box if you want to proceed.",
            (Tag::Input, "radio") => "Please select one of these options.",
            (Tag::Select, _) => "Please select an item in the list.",
            _ => "Please fill out this field.",
        };
        return msg.to_string();
    }
    if state.type_mismatch {
        return match element.input_type().as_str() {
            "email" => "Please enter an email address.".to_string(),
            "url" => "Please enter a URL.".to_string(),
            _ => "Please enter a valid value.".to_string(),
        };
    }
    if state.bad_input {
        return "Please enter a number.".to_string();
    }
    if state.pattern_mismatch {
        return match element.attribute("title") {
            Some(title) if !title.is_empty() => {
                format!("Please match the requested format: {title}.")
            }
            _ => "Please match the requested format.".to_string(),
        };
    }
    if state.too_long {
        let max = element.attribute("maxlength").unwrap_or_default();
        return format!("Please shorten this text to {max} characters or less.");
    }
    if state.too_short {
        let min = element.attribute("minlength").unwrap_or_default();
        return format!("Please lengthen this text to {min} characters or more.");
    }
    if state.range_underflow {
        let min = element.attribute("min").unwrap_or_default();
        return format!("Value must be greater than or equal to {min}.");
    }
    if state.range_overflow {
        let max = element.attribute("max").unwrap_or_default();
        return format!("Value must be less than or equal to {max}.");
    }
    String::new()
}

fn radio_group_checked(root: &Element, radio: &Element) -> bool {
    let Some(name) = radio.name_attr() else {
        return radio.checked;
    };
    root.walk()
        .into_iter()
        .any(|el| el.is_radio() && el.name_attr() == Some(name) && el.checked)
}

fn check_length(element: &Element, value: &str, state: &mut ValidityState) {
    if value.is_empty() {
        return;
    }
    let len = value.chars().count();
    if let Some(max) = parse_attr::<usize>(element, "maxlength") {
        state.too_long = len > max;
    }
    if let Some(min) = parse_attr::<usize>(element, "minlength") {
        state.too_short = len < min;
    }
}

fn check_range(element: &Element, value: &str, state: &mut ValidityState) {
    let Ok(number) = value.trim().parse::<f64>() else {
        state.bad_input = true;
        return;
    };
    if let Some(min) = parse_attr::<f64>(element, "min") {
        state.range_underflow = number < min;
    }
    if let Some(max) = parse_attr::<f64>(element, "max") {
        state.range_overflow = number > max;
    }
}

fn parse_attr<T: std::str::FromStr>(element: &Element, name: &str) -> Option<T> {
    element.attribute(name)?.trim().parse().ok()
}
