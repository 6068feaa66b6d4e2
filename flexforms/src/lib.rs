//! Asynchronous form validation on top of native constraint validation.
//!
//! A [`Form`] binds to a `<form>` element of a [`formdom::Document`] and
//! reacts to its events: it runs pluggable async validators from a
//! [`ValidatorRegistry`], keeps error markers and tooltips in sync with each
//! field's validity, and only lets a submission through (natively or as an
//! AJAX request over a [`Transport`]) once every validator has agreed.

pub mod error;
pub mod hooks;
pub mod machine;
pub mod markers;
pub mod notify;
pub mod options;
pub mod registry;
pub mod toggle;
pub mod tooltip;
pub mod transport;

mod form;
mod presenter;
mod runner;
mod serialize;
mod submit;
mod tasks;

use std::future::Future;

use formdom::{Document, Tag};

pub use error::{FormError, TransportError};
pub use form::{EventOutcome, Form, FormBuilder};
pub use hooks::{ErrorMessageHook, Hooks, RemoteValidationHook};
pub use machine::{Phase, SubmissionState};
pub use notify::{Notification, NotificationKind};
pub use options::FormOptions;
pub use presenter::{format_error_tooltip, SavedValidity};
pub use registry::{BoxFuture, FieldRef, ValidatorFn, ValidatorRegistry};
pub use runner::{PendingPass, SharedPass, ValidationPassResult};
pub use serialize::serialize;
pub use toggle::Toggleable;
pub use tooltip::{OverlayTooltips, Tooltip, TooltipFactory, Tooltips};
pub use transport::{AjaxOutcome, AjaxRequest, AjaxResponse, RequestBody, Transport};

/// Bind every `<form>` in `document` with the global registry and hooks.
pub fn init(document: &Document, options: FormOptions) -> Result<Vec<Form>, FormError> {
    let root = document.root_id();
    let mut ids = Vec::new();
    if document.tag(&root) == Some(Tag::Form) {
        ids.push(root.clone());
    }
    ids.extend(document.query(&root, |el| el.tag == Tag::Form));

    ids.into_iter()
        .map(|id| {
            Form::builder(document)
                .root(id)
                .options(options.clone())
                .bind()
        })
        .collect()
}

/// Register a validator in the global registry.
pub fn register_validator<F, Fut>(name: impl Into<String>, validator: F)
where
    F: Fn(FieldRef, Document) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = bool> + Send + 'static,
{
    ValidatorRegistry::global().register(name, validator);
}

/// Replace the global error-message hook.
pub fn register_error_message_handler(
    hook: impl Fn(&Document, &str, &formdom::ValidityState) + Send + Sync + 'static,
) {
    Hooks::global().set_error_message_handler(std::sync::Arc::new(hook));
}

/// Replace the global remote-validation hook.
pub fn register_global_remote_validation(hook: impl Fn(&Form, &AjaxOutcome) + Send + Sync + 'static) {
    Hooks::global().set_remote_validation(std::sync::Arc::new(hook));
}
