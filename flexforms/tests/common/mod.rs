#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use flexforms::{
    AjaxRequest, AjaxResponse, Form, FormOptions, Hooks, NotificationKind, OverlayTooltips,
    Transport, TransportError, ValidatorRegistry,
};
use formdom::{Document, Element};

/// Registry with an `email` validator accepting values that contain `@`,
/// and a `slow-email` variant that answers after a delay.
pub fn registry() -> ValidatorRegistry {
    let registry = ValidatorRegistry::new();
    registry.register("email", |field, _doc| async move { field.value.contains('@') });
    registry.register("slow-email", |field, _doc| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        field.value.contains('@')
    });
    registry
}

pub fn email_field(id: &str, validator: &str) -> Element {
    Element::input("text")
        .id(id)
        .name(id)
        .attr("data-validate", validator)
}

pub struct Harness {
    pub doc: Document,
    pub form: Form,
    pub tooltips: OverlayTooltips,
    pub notifications: Arc<Mutex<Vec<&'static str>>>,
}

impl Harness {
    pub fn bind(doc: Document, options: FormOptions) -> Self {
        Self::bind_with(doc, options, None)
    }

    pub fn bind_with(
        doc: Document,
        options: FormOptions,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        let tooltips = OverlayTooltips::new();
        let notifications = Arc::new(Mutex::new(Vec::new()));

        let mut builder = Form::builder(&doc)
            .options(options)
            .registry(registry())
            .hooks(Hooks::new())
            .tooltips(tooltips.factory());
        for kind in [
            NotificationKind::Ready,
            NotificationKind::Submit,
            NotificationKind::AfterAjaxSubmit,
            NotificationKind::AjaxCompleted,
        ] {
            let sink = notifications.clone();
            builder = builder.on(kind, move |n| sink.lock().unwrap().push(n.kind.name()));
        }
        if let Some(transport) = transport {
            builder = builder.shared_transport(transport);
        }

        Self {
            form: builder.bind().unwrap(),
            doc,
            tooltips,
            notifications,
        }
    }

    pub fn notifications(&self) -> Vec<&'static str> {
        self.notifications.lock().unwrap().clone()
    }

    pub fn aria(&self, id: &str) -> Option<String> {
        self.doc.attribute(id, "aria-invalid")
    }

    pub fn is_flagged(&self, id: &str) -> bool {
        self.doc.has_class(id, "invalid")
    }
}

/// Transport that records requests and answers with a fixed outcome.
#[derive(Clone)]
pub struct RecordingTransport {
    pub requests: Arc<Mutex<Vec<AjaxRequest>>>,
    reply: Result<AjaxResponse, TransportError>,
}

impl RecordingTransport {
    pub fn replying(reply: Result<AjaxResponse, TransportError>) -> Self {
        Self {
            requests: Arc::new(Mutex::new(Vec::new())),
            reply,
        }
    }

    pub fn ok(status: u16, body: &str) -> Self {
        Self::replying(Ok(AjaxResponse::new(status, body)))
    }

    pub fn requests(&self) -> Vec<AjaxRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(&self, request: AjaxRequest) -> Result<AjaxResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        tokio::task::yield_now().await;
        self.reply.clone()
    }
}
