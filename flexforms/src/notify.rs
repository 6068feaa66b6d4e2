//! Lifecycle notifications fired on form and toggle elements.

use std::sync::{Arc, Mutex, PoisonError};

use crate::transport::AjaxOutcome;

/// Kinds of lifecycle notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    /// A form was bound.
    Ready,
    /// Validation passed and the form is about to submit. Cancelable.
    Submit,
    /// A remote submission request was started.
    AfterAjaxSubmit,
    /// A remote submission resolved; carries the outcome.
    AjaxCompleted,
    /// A toggle target was opened.
    TabOpened,
    /// A toggle target was closed because another member of its list opened.
    TabClosed,
}

impl NotificationKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "flexcss.form.ready",
            Self::Submit => "flexcss.form.submit",
            Self::AfterAjaxSubmit => "flexcss.form.afterAjaxSubmit",
            Self::AjaxCompleted => "flexcss.form.ajaxCompleted",
            Self::TabOpened => "flexcss.tab.opened",
            Self::TabClosed => "flexcss.tab.closed",
        }
    }

    pub fn is_cancelable(self) -> bool {
        matches!(self, Self::Submit)
    }
}

/// A notification being delivered to listeners.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Id of the element the notification is fired on.
    pub target: String,
    pub detail: Option<AjaxOutcome>,
    default_prevented: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, target: impl Into<String>) -> Self {
        Self {
            kind,
            target: target.into(),
            detail: None,
            default_prevented: false,
        }
    }

    pub fn with_detail(mut self, detail: AjaxOutcome) -> Self {
        self.detail = Some(detail);
        self
    }

    /// Cancel the default action. Ignored for non-cancelable kinds.
    pub fn prevent_default(&mut self) {
        if self.kind.is_cancelable() {
            self.default_prevented = true;
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

pub type Listener = Arc<dyn Fn(&mut Notification) + Send + Sync>;

/// Listener list for one notification target.
#[derive(Clone, Default)]
pub struct Notifier {
    listeners: Arc<Mutex<Vec<(NotificationKind, Listener)>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(&self, kind: NotificationKind, listener: Listener) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, listener));
    }

    /// Deliver `notification` to every listener for its kind, in
    /// registration order. Returns it so callers can read `default_prevented`.
    pub fn fire(&self, mut notification: Notification) -> Notification {
        // Snapshot so listeners may register further listeners.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(kind, _)| *kind == notification.kind)
            .map(|(_, listener)| listener.clone())
            .collect();

        log::debug!(
            "[notify] {} on {} ({} listeners)",
            notification.kind.name(),
            notification.target,
            listeners.len()
        );
        for listener in listeners {
            listener(&mut notification);
        }
        notification
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("Notifier").field("listeners", &count).finish()
    }
}
