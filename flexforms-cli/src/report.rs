//! JSON report of a replayed scenario.

use std::collections::BTreeMap;

use flexforms::{AjaxRequest, Form, OverlayTooltips, Phase, Tooltip};
use formdom::Submission;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub phase: Phase,
    pub loading: bool,
    pub focused: Option<String>,
    pub fields: BTreeMap<String, FieldReport>,
    pub inline_errors: Vec<InlineError>,
    pub tooltips: Vec<Tooltip>,
    pub submissions: Vec<Submission>,
    pub requests: Vec<AjaxRequest>,
    pub notifications: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReport {
    pub value: String,
    pub classes: Vec<String>,
    pub aria_invalid: Option<String>,
    /// Message recorded the last time the field's errors were shown.
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineError {
    pub field: Option<String>,
    pub text: String,
}

impl Report {
    pub fn collect(
        form: &Form,
        tooltips: &OverlayTooltips,
        requests: Vec<AjaxRequest>,
        notifications: Vec<String>,
    ) -> Self {
        let doc = form.document();

        let fields = doc
            .select(form.id(), |el| el.tag.is_field())
            .into_iter()
            .map(|el| {
                let saved = form.saved_validity(&el.id);
                let report = FieldReport {
                    aria_invalid: el.attribute("aria-invalid").map(str::to_string),
                    message: saved.map(|s| s.message).filter(|m| !m.is_empty()),
                    classes: el.classes,
                    value: el.value,
                };
                (el.id, report)
            })
            .collect();

        let inline_errors = doc
            .select(form.id(), |el| el.has_class(flexforms::markers::ERROR_NODE_CLASS))
            .into_iter()
            .map(|el| InlineError {
                field: el
                    .attribute(flexforms::markers::ATTR_ERROR_FOR)
                    .map(str::to_string),
                text: el.text,
            })
            .collect();

        let mut tooltips = tooltips.live();
        tooltips.sort_by(|a, b| a.target.cmp(&b.target));

        Self {
            phase: form.phase(),
            loading: form.is_loading(),
            focused: doc.focused(),
            fields,
            inline_errors,
            tooltips,
            submissions: doc.submissions(),
            requests,
            notifications,
        }
    }
}
