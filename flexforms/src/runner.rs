//! Runs fields through their custom validators.

use futures::future::{join_all, Shared};
use serde::Serialize;

use crate::error::FormError;
use crate::form::Form;
use crate::markers::{
    ATTR_VALIDATE, ATTR_VALIDATION_MESSAGE, DEFAULT_VALIDATION_MESSAGE, LOADING_CLASS,
};
use crate::registry::{BoxFuture, FieldRef};

/// Aggregate result of one validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationPassResult {
    /// Fields whose validator ran, in the order they were given.
    pub checked_fields: Vec<String>,
    /// At least one validator resolved `false`.
    pub found_any_error: bool,
}

/// A pass whose validators have been started but not yet aggregated.
pub type PendingPass = BoxFuture<'static, ValidationPassResult>;

/// A pass that several parties can await.
pub type SharedPass = Shared<PendingPass>;

impl Form {
    /// Run every field of the form that declares `data-validate`.
    pub fn validate_custom_fields(&self) -> PendingPass {
        let fields = self
            .document()
            .query(self.id(), |el| el.has_attribute(ATTR_VALIDATE));
        self.run_many(&fields)
    }

    /// Start a validation pass over `fields`.
    ///
    /// Fields without a registered validator are skipped, as are fields that
    /// native validation already rejected (unless they carry a custom error).
    /// Every other field has its validator started right away; the returned
    /// future resolves once all of them have settled.
    pub fn run_many(&self, fields: &[String]) -> PendingPass {
        let doc = self.document();
        let mut checked = Vec::new();
        let mut futures = Vec::new();

        for id in fields {
            let Some(name) = doc.attribute(id, ATTR_VALIDATE).filter(|n| !n.is_empty()) else {
                continue;
            };
            let Some(validity) = doc.validity(id) else {
                continue;
            };
            if !validity.valid() && !validity.custom_error {
                continue;
            }

            match self.run_validation(&name, id) {
                Ok(future) => {
                    checked.push(id.clone());
                    futures.push(future);
                }
                Err(FormError::ValidatorNotFound(name)) => {
                    log::warn!("[runner] {} declares data-validate={:?} but no validator is registered", id, name);
                }
                Err(e) => log::warn!("[runner] skipping {}: {}", id, e),
            }
        }

        log::debug!("[runner] pass started for {:?}", checked);
        Box::pin(async move {
            let results = join_all(futures).await;
            let result = ValidationPassResult {
                found_any_error: results.iter().any(|valid| !valid),
                checked_fields: checked,
            };
            log::debug!("[runner] pass settled: {:?}", result);
            result
        })
    }

    /// Run the validator registered as `name` on `field`.
    ///
    /// The validator is invoked before this returns and the field carries
    /// the loading class until the returned future resolves. A field that
    /// fails without having set a custom validity message gets its
    /// `data-validation-message`, or a generic one.
    pub fn run_validation(&self, name: &str, field: &str) -> Result<BoxFuture<'static, bool>, FormError> {
        let validator = self
            .registry()
            .lookup(name)
            .ok_or_else(|| FormError::ValidatorNotFound(name.to_string()))?;
        let element = self
            .document()
            .element(field)
            .ok_or_else(|| FormError::UnknownElement(field.to_string()))?;

        let doc = self.document().clone();
        let future = validator(FieldRef::from_element(&element), doc.clone());
        doc.add_class(field, LOADING_CLASS);

        let field = field.to_string();
        Ok(Box::pin(async move {
            let valid = future.await;
            doc.remove_class(&field, LOADING_CLASS);
            if !valid && doc.validity(&field).is_some_and(|v| !v.custom_error) {
                let message = doc
                    .attribute(&field, ATTR_VALIDATION_MESSAGE)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| DEFAULT_VALIDATION_MESSAGE.to_string());
                doc.set_custom_validity(&field, message);
            }
            valid
        }))
    }
}
