//! Transports used while replaying a scenario.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use flexforms::{AjaxRequest, AjaxResponse, Transport, TransportError};

use crate::scenario::RemoteReply;

/// Answers every request with the scenario's scripted reply.
#[derive(Debug, Clone)]
pub struct ScriptedTransport {
    reply: RemoteReply,
}

impl ScriptedTransport {
    pub fn new(reply: RemoteReply) -> Self {
        Self { reply }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, _request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        if let Some(error) = &self.reply.error {
            return Err(TransportError::Network(error.clone()));
        }
        let body = match &self.reply.body {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Ok(AjaxResponse::new(self.reply.status, body))
    }
}

/// Keeps a copy of every request before handing it on.
#[derive(Clone)]
pub struct Recording {
    inner: Arc<dyn Transport>,
    requests: Arc<Mutex<Vec<AjaxRequest>>>,
}

impl Recording {
    pub fn new(inner: Arc<dyn Transport>) -> Self {
        Self {
            inner,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn requests(&self) -> Vec<AjaxRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Transport for Recording {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        self.inner.send(request).await
    }
}
