//! Turns scenario validator rules into registered validators.

use std::time::Duration;

use email_address::EmailAddress;
use flexforms::{FieldRef, ValidatorRegistry};
use formdom::Document;
use regex::Regex;

use crate::error::CliError;
use crate::scenario::{Rule, ValidatorSpec};

/// A rule ready to run: patterns are compiled once.
#[derive(Debug, Clone)]
pub struct RuleValidator {
    rule: Rule,
    pattern: Option<Regex>,
    message: Option<String>,
    delay: Duration,
}

impl RuleValidator {
    pub fn new(spec: &ValidatorSpec) -> Result<Self, CliError> {
        let pattern = match &spec.rule {
            Rule::Pattern { pattern } => Some(
                Regex::new(&format!("^(?:{pattern})$"))
                    .map_err(|e| CliError::Check(format!("bad pattern {pattern:?}: {e}")))?,
            ),
            _ => None,
        };
        Ok(Self {
            rule: spec.rule.clone(),
            pattern,
            message: spec.message.clone(),
            delay: Duration::from_millis(spec.delay_ms),
        })
    }

    /// Whether `field` satisfies the rule. Empty values only fail `required`.
    pub fn accepts(&self, field: &FieldRef, doc: &Document) -> bool {
        let value = field.value.as_str();
        if let Rule::Required = self.rule {
            return match field.input_type.as_str() {
                "checkbox" => field.checked,
                "radio" => match &field.name {
                    Some(name) => doc
                        .named(&doc.root_id(), name)
                        .iter()
                        .any(|id| doc.is_checked(id)),
                    None => field.checked,
                },
                _ => !value.trim().is_empty(),
            };
        }
        if value.is_empty() {
            return true;
        }

        match &self.rule {
            Rule::Required => true,
            Rule::Email => EmailAddress::is_valid(value),
            Rule::Pattern { .. } => self.pattern.as_ref().is_some_and(|re| re.is_match(value)),
            Rule::MinLength { min } => value.chars().count() >= *min,
            Rule::EqualsField { field: other } => doc.value(other).as_deref() == Some(value),
            Rule::OneOf { values } => values.iter().any(|v| v == value),
            Rule::Always { valid } => *valid,
        }
    }

    pub fn register(self, registry: &ValidatorRegistry, name: &str) {
        registry.register(name, move |field: FieldRef, doc: Document| {
            let validator = self.clone();
            async move {
                if !validator.delay.is_zero() {
                    tokio::time::sleep(validator.delay).await;
                }
                let valid = validator.accepts(&field, &doc);
                if !valid {
                    if let Some(message) = &validator.message {
                        doc.set_custom_validity(&field.id, message.clone());
                    }
                }
                log::debug!("[rules] {} -> {}", field.id, valid);
                valid
            }
        });
    }
}

/// Registry holding every validator a scenario declares.
pub fn registry_for(
    validators: &std::collections::BTreeMap<String, ValidatorSpec>,
) -> Result<ValidatorRegistry, CliError> {
    let registry = ValidatorRegistry::new();
    for (name, spec) in validators {
        RuleValidator::new(spec)?.register(&registry, name);
    }
    Ok(registry)
}
