//! AJAX transport contract.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::TransportError;

/// Body of a remote submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "camelCase")]
pub enum RequestBody {
    /// Serialized field map, sent as JSON.
    Json(serde_json::Value),
    /// Ordered form entries, sent as multipart form data.
    FormData(Vec<(String, String)>),
}

/// A remote submission request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AjaxRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: RequestBody,
}

impl AjaxRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response to a remote submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AjaxResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl AjaxResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON.
    pub fn json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// What a remote submission resolved to.
///
/// Transport failures are not errors for the form: they are handed to the
/// remote-validation hook and the `ajaxCompleted` notification like any
/// response.
pub type AjaxOutcome = Result<AjaxResponse, TransportError>;

/// Sends remote submissions.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use flexforms::{AjaxRequest, AjaxResponse, Transport, TransportError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Transport for Echo {
///     async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
///         Ok(AjaxResponse::new(200, request.url))
///     }
/// }
/// ```
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError>;
}
