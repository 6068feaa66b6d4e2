//! Caller-supplied hooks for error messages and remote validation.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use formdom::{Document, ValidityState};

use crate::form::Form;
use crate::markers::ATTR_VALIDATION_MESSAGE;
use crate::transport::AjaxOutcome;

/// Called for every invalid field before its error is shown. May set a
/// custom validity message on the field.
pub type ErrorMessageHook = Arc<dyn Fn(&Document, &str, &ValidityState) + Send + Sync>;

/// Called after a remote submission resolves. May flag fields as invalid
/// based on the server's answer.
pub type RemoteValidationHook = Arc<dyn Fn(&Form, &AjaxOutcome) + Send + Sync>;

struct HookSet {
    error_message: ErrorMessageHook,
    remote_validation: RemoteValidationHook,
}

static GLOBAL: LazyLock<Hooks> = LazyLock::new(Hooks::new);

/// Global override points shared by forms.
///
/// Like [`ValidatorRegistry`](crate::ValidatorRegistry), `Hooks` is a shared
/// handle. Forms use [`Hooks::global`] unless another set is injected.
#[derive(Clone)]
pub struct Hooks {
    inner: Arc<RwLock<HookSet>>,
}

impl Default for Hooks {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

impl Hooks {
    /// A fresh hook set with the default handlers.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HookSet {
                error_message: Arc::new(default_error_message_handler),
                remote_validation: Arc::new(|_, _| {}),
            })),
        }
    }

    pub fn global() -> Self {
        GLOBAL.clone()
    }

    pub fn set_error_message_handler(&self, hook: ErrorMessageHook) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .error_message = hook;
    }

    pub fn set_remote_validation(&self, hook: RemoteValidationHook) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remote_validation = hook;
    }

    pub fn error_message_handler(&self) -> ErrorMessageHook {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .error_message
            .clone()
    }

    pub fn remote_validation(&self) -> RemoteValidationHook {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .remote_validation
            .clone()
    }
}

/// Use the field's `data-validation-message` as its custom validity, unless
/// a custom message is already set.
pub fn default_error_message_handler(document: &Document, field: &str, validity: &ValidityState) {
    if validity.custom_error {
        return;
    }
    if let Some(message) = document
        .attribute(field, ATTR_VALIDATION_MESSAGE)
        .filter(|m| !m.is_empty())
    {
        document.set_custom_validity(field, message);
    }
}
