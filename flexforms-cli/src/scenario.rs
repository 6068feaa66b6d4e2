//! Scenario files: markup, options, validators and the events to replay.

use std::collections::BTreeMap;
use std::path::Path;

use flexforms::FormOptions;
use formdom::{Element, Tag};
use serde::Deserialize;

use crate::error::CliError;

fn default_url() -> String {
    "http://localhost/".to_string()
}

fn default_status() -> u16 {
    200
}

fn default_checked() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Scenario {
    /// Document URL; forms without an action submit here.
    #[serde(default = "default_url")]
    pub url: String,
    pub form: Element,
    #[serde(default)]
    pub options: FormOptions,
    #[serde(default)]
    pub validators: BTreeMap<String, ValidatorSpec>,
    /// Scripted answer to remote submissions.
    #[serde(default)]
    pub remote: Option<RemoteReply>,
    #[serde(default)]
    pub events: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSpec {
    #[serde(flatten)]
    pub rule: Rule,
    /// Custom validity message set when the rule fails.
    #[serde(default)]
    pub message: Option<String>,
    /// Answer only after this many milliseconds.
    #[serde(default)]
    pub delay_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "rule", rename_all = "camelCase")]
pub enum Rule {
    Required,
    Email,
    Pattern { pattern: String },
    MinLength { min: usize },
    EqualsField { field: String },
    OneOf { values: Vec<String> },
    Always { valid: bool },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RemoteReply {
    #[serde(default = "default_status")]
    pub status: u16,
    #[serde(default)]
    pub body: serde_json::Value,
    /// Fail the request with a network error carrying this message.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Step {
    Focus { target: String },
    Blur { target: String },
    Change { target: String },
    Click { target: String },
    Submit,
    SetValue { target: String, value: String },
    Check {
        target: String,
        #[serde(default = "default_checked")]
        checked: bool,
    },
    /// Wait for everything in flight.
    Settle,
}

impl Step {
    pub fn target(&self) -> Option<&str> {
        match self {
            Step::Focus { target }
            | Step::Blur { target }
            | Step::Change { target }
            | Step::Click { target }
            | Step::SetValue { target, .. }
            | Step::Check { target, .. } => Some(target),
            Step::Submit | Step::Settle => None,
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Id of the form element the scenario drives.
    pub fn form_id(&self) -> Option<String> {
        if self.form.tag == Tag::Form {
            return Some(self.form.id.clone());
        }
        self.form
            .descendants()
            .into_iter()
            .find(|el| el.tag == Tag::Form)
            .map(|el| el.id.clone())
    }

    /// Check that the scenario can be replayed.
    ///
    /// Fields that name an unregistered validator are only logged, as
    /// binding such a form is legal.
    pub fn check(&self) -> Result<(), CliError> {
        if self.form_id().is_none() {
            return Err(CliError::Check("markup contains no form".to_string()));
        }

        for (index, step) in self.events.iter().enumerate() {
            if let Some(target) = step.target() {
                if self.form.find(target).is_none() {
                    return Err(CliError::Check(format!(
                        "event {index} targets unknown element {target:?}"
                    )));
                }
            }
        }

        for (name, spec) in &self.validators {
            match &spec.rule {
                Rule::Pattern { pattern } => {
                    regex::Regex::new(pattern).map_err(|e| {
                        CliError::Check(format!("validator {name:?} has a bad pattern: {e}"))
                    })?;
                }
                Rule::EqualsField { field } if self.form.find(field).is_none() => {
                    return Err(CliError::Check(format!(
                        "validator {name:?} compares against unknown field {field:?}"
                    )));
                }
                _ => {}
            }
        }

        for el in self.form.walk() {
            if let Some(name) = el.attribute("data-validate") {
                if !self.validators.contains_key(name) {
                    log::warn!("[scenario] {} uses unregistered validator {:?}", el.id, name);
                }
            }
        }
        Ok(())
    }
}
