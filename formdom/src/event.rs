/// Document events delivered to form controllers.
///
/// Targets are element ids. `Submit` always targets the form the controller
/// is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Element gained focus
    Focus { target: String },
    /// Element lost focus
    Blur { target: String },
    /// Committed value change (checkboxes, radios, selects, text on commit)
    Change { target: String },
    /// Native constraint validation failed for the target
    Invalid { target: String },
    /// Form submission was requested
    Submit,
    /// Element was activated
    Click { target: String },
}

impl Event {
    pub fn focus(target: impl Into<String>) -> Self {
        Self::Focus {
            target: target.into(),
        }
    }

    pub fn blur(target: impl Into<String>) -> Self {
        Self::Blur {
            target: target.into(),
        }
    }

    pub fn change(target: impl Into<String>) -> Self {
        Self::Change {
            target: target.into(),
        }
    }

    pub fn invalid(target: impl Into<String>) -> Self {
        Self::Invalid {
            target: target.into(),
        }
    }

    pub fn click(target: impl Into<String>) -> Self {
        Self::Click {
            target: target.into(),
        }
    }

    /// The targeted element id, if the event has one.
    pub fn target(&self) -> Option<&str> {
        match self {
            Event::Focus { target }
            | Event::Blur { target }
            | Event::Change { target }
            | Event::Invalid { target }
            | Event::Click { target } => Some(target),
            Event::Submit => None,
        }
    }

    /// DOM event type name.
    pub fn name(&self) -> &'static str {
        match self {
            Event::Focus { .. } => "focus",
            Event::Blur { .. } => "blur",
            Event::Change { .. } => "change",
            Event::Invalid { .. } => "invalid",
            Event::Submit => "submit",
            Event::Click { .. } => "click",
        }
    }
}
