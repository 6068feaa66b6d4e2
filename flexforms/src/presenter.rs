//! Turns validity snapshots into error markers and tooltips.

use formdom::{Element, ValidityState};
use serde::Serialize;

use crate::form::Form;
use crate::markers::{ARIA_INVALID, ATTR_ERROR_FOR, ERROR_NODE_CLASS, INVALID_CLASS};

/// Validity of a field as it was when results were last applied to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SavedValidity {
    pub validity: ValidityState,
    /// Validation message shown for the field. Empty when valid.
    pub message: String,
}

impl SavedValidity {
    pub fn is_valid(&self) -> bool {
        self.validity.valid()
    }
}

/// Tooltip markup for an error message.
pub fn format_error_tooltip(message: &str) -> String {
    format!("<i class=\"icon-attention\"></i> {message}")
}

impl Form {
    /// Snapshot the validity of `fields` and update their error markers.
    ///
    /// With `remove_all_errors_first`, every marker under the form is
    /// cleared before the fields are processed. Custom validity messages
    /// are reset afterwards so the next native check starts clean.
    pub fn apply_results(&self, fields: &[String], remove_all_errors_first: bool) {
        let doc = self.document();
        if remove_all_errors_first {
            self.remove_errors();
        }
        let error_message = self.inner.hooks.error_message_handler();

        for id in fields {
            let Some(validity) = doc.validity(id) else {
                log::debug!("[presenter] {} is gone, skipping", id);
                continue;
            };
            let container = doc.parent_id(id).unwrap_or_else(|| self.id().to_string());

            let saved = if validity.valid() {
                self.remove_field_errors(&container, id);
                doc.remove_class(id, INVALID_CLASS);
                doc.set_attribute(id, ARIA_INVALID, "false");
                SavedValidity {
                    validity,
                    message: String::new(),
                }
            } else {
                if !remove_all_errors_first {
                    self.remove_field_errors(&container, id);
                }
                error_message(doc, id.as_str(), &validity);
                let message = doc.validation_message(id);

                doc.add_class(id, INVALID_CLASS);
                doc.set_attribute(id, ARIA_INVALID, "true");
                if self.options().append_error {
                    let node = Element::div()
                        .class(ERROR_NODE_CLASS)
                        .attr(ATTR_ERROR_FOR, id.as_str())
                        .text(message.clone());
                    if let Err(e) = doc.append_child(&container, node) {
                        log::warn!("[presenter] could not append error for {}: {}", id, e);
                    }
                }
                SavedValidity { validity, message }
            };

            log::debug!("[presenter] {} valid={} {:?}", id, saved.is_valid(), saved.message);
            self.state().saved.insert(id.clone(), saved);
            doc.set_custom_validity(id, "");
        }
    }

    /// Remove every error marker and tooltip under the form.
    pub fn remove_errors(&self) {
        self.remove_element_errors(self.id());
    }

    /// Remove error nodes and error classes under `scope`.
    pub fn remove_element_errors(&self, scope: &str) {
        let doc = self.document();
        doc.remove_where(scope, |el| el.has_class(ERROR_NODE_CLASS));
        for id in doc.query(scope, |el| el.has_class(INVALID_CLASS)) {
            doc.remove_class(&id, INVALID_CLASS);
            doc.set_attribute(&id, ARIA_INVALID, "false");
            self.remove_tooltip(&id);
        }
    }

    /// Clear the markers one field left in its container.
    fn remove_field_errors(&self, container: &str, field: &str) {
        let doc = self.document();
        doc.remove_where(container, |el| {
            el.has_class(ERROR_NODE_CLASS) && el.attribute(ATTR_ERROR_FOR) == Some(field)
        });
        if doc.has_class(field, INVALID_CLASS) {
            doc.remove_class(field, INVALID_CLASS);
            self.remove_tooltip(field);
        }
    }

    pub(crate) fn remove_tooltip(&self, target: &str) {
        if let Some(tooltips) = self.state().tooltips.as_mut() {
            tooltips.remove_tooltip(target);
        }
    }

    /// Show the saved error of `target` in a tooltip once pending DOM
    /// updates have settled.
    ///
    /// Creates the tooltip widget on first use. If the field turns out valid
    /// and `remove_if_valid` is set, its tooltip is removed instead.
    pub fn show_or_create_tooltip(&self, target: &str, remove_if_valid: bool) {
        if !self.options().create_tooltips {
            return;
        }
        {
            let mut state = self.state();
            if state.tooltips.is_none() {
                state.tooltips = Some((self.inner.tooltip_factory)(self.document(), self.id()));
            }
        }

        let form = self.clone();
        let target = target.to_string();
        self.spawn(async move {
            tokio::task::yield_now().await;
            form.reconcile_tooltip(&target, remove_if_valid);
        });
    }

    fn reconcile_tooltip(&self, target: &str, remove_if_valid: bool) {
        let Some(saved) = self.saved_validity(target) else {
            return;
        };
        let flagged = self.document().has_class(target, INVALID_CLASS);

        let mut state = self.state();
        let Some(tooltips) = state.tooltips.as_mut() else {
            return;
        };
        if !saved.is_valid() && flagged {
            tooltips.create_tooltip(target, &format_error_tooltip(&saved.message), false);
        } else if remove_if_valid {
            tooltips.remove_tooltip(target);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_tooltip() {
        assert_eq!(
            format_error_tooltip("Required"),
            "<i class=\"icon-attention\"></i> Required"
        );
    }
}
