//! Dispatching a validated submission.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::FormError;
use crate::form::Form;
use crate::machine::Signal;
use crate::markers::{ATTR_REMOTE, ATTR_REMOTE_ACTION};
use crate::notify::{Notification, NotificationKind};
use crate::transport::{AjaxRequest, RequestBody};

impl Form {
    /// Submit after validation passed: native submit, or a remote request
    /// when the form declares `data-remote`.
    pub(crate) async fn dispatch_submission(&self) {
        let doc = self.document();
        let submit = self.notify(Notification::new(NotificationKind::Submit, self.id()));
        if submit.default_prevented() {
            log::info!("[submit] {}: submit notification canceled", self.id());
            self.signal(Signal::SubmitCanceled);
            return;
        }

        let Some(mode) = doc.attribute(self.id(), ATTR_REMOTE) else {
            if let Err(e) = doc.submit(self.id()) {
                log::error!("[submit] {}: native submit failed: {}", self.id(), e);
            }
            self.signal(Signal::DispatchFinished);
            return;
        };

        let Some(transport) = self.inner.transport.clone() else {
            log::error!("[submit] {}: {}", self.id(), FormError::MissingTransport);
            self.signal(Signal::DispatchFinished);
            return;
        };

        let request = self.remote_request(&mode);
        log::info!("[submit] {} {} {}", self.id(), request.method, request.url);
        let response = transport.send(request);
        self.notify(Notification::new(NotificationKind::AfterAjaxSubmit, self.id()));

        let outcome = response.await;
        match &outcome {
            Ok(response) => log::debug!("[submit] {}: HTTP {}", self.id(), response.status),
            Err(e) => log::warn!("[submit] {}: {}", self.id(), e),
        }

        let hook = self
            .state()
            .remote_validation
            .clone()
            .unwrap_or_else(|| self.inner.hooks.remote_validation());
        hook(self, &outcome);

        self.notify(Notification::new(NotificationKind::AjaxCompleted, self.id()).with_detail(outcome));
        self.signal(Signal::DispatchFinished);
    }

    /// Build the request for remote submit mode `mode`.
    pub fn remote_request(&self, mode: &str) -> AjaxRequest {
        let doc = self.document();
        let url = doc
            .attribute(self.id(), ATTR_REMOTE_ACTION)
            .filter(|u| !u.is_empty())
            .or_else(|| doc.attribute(self.id(), "action").filter(|u| !u.is_empty()))
            .unwrap_or_else(|| doc.url());

        let mut headers = BTreeMap::new();
        let body = if mode == "json" {
            headers.insert(
                "Content-Type".to_string(),
                self.options().ajax_json_content_type.clone(),
            );
            RequestBody::Json(Value::Object(self.serialize()))
        } else {
            RequestBody::FormData(self.form_data())
        };

        AjaxRequest {
            url,
            method: self.options().ajax_submit_type.clone(),
            headers,
            body,
        }
    }
}
