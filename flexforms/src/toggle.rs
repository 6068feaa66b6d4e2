//! Tabs and single toggles driven by `data-toggle`.

use formdom::Document;

use crate::error::FormError;
use crate::form::EventOutcome;
use crate::markers::LOADING_CLASS;
use crate::notify::{Notification, NotificationKind, Notifier};

/// Names the id of the element a trigger opens.
pub const ATTR_TOGGLE: &str = "data-toggle";
/// Marks a container whose children are mutually exclusive tabs.
pub const ATTR_TOGGLE_LIST: &str = "data-toggle-list";
pub const ACTIVE_CLASS: &str = "active";

/// Handles clicks on toggle triggers inside one container.
///
/// A trigger carries `data-toggle="<target id>"`. Clicking it toggles the
/// `active` class on the target. Inside a `data-toggle-list`, opening one
/// member closes the others.
#[derive(Debug)]
pub struct Toggleable {
    document: Document,
    container: String,
    notifier: Notifier,
    loading: bool,
}

impl Toggleable {
    pub fn new(document: &Document, container: impl Into<String>) -> Result<Self, FormError> {
        let container = container.into();
        if !document.contains(&container) {
            return Err(FormError::UnknownElement(container));
        }
        Ok(Self {
            document: document.clone(),
            container,
            notifier: Notifier::new(),
            loading: false,
        })
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Handle a click on `target`. Clicks on a direct child of a trigger
    /// count as clicks on the trigger.
    pub fn handle_click(&mut self, target: &str) -> EventOutcome {
        let doc = &self.document;
        if !doc.is_within(&self.container, target) {
            return EventOutcome::default();
        }

        let trigger = if doc.has_attribute(target, ATTR_TOGGLE) {
            target.to_string()
        } else {
            match doc.parent_id(target) {
                Some(parent) if doc.has_attribute(&parent, ATTR_TOGGLE) => parent,
                _ => return EventOutcome::default(),
            }
        };
        let reference = doc.attribute(&trigger, ATTR_TOGGLE).unwrap_or_default();

        if !self.loading {
            self.toggle_target(Some(&reference), Some(&trigger));
        }
        EventOutcome {
            default_prevented: true,
        }
    }

    /// Toggle the element `reference`, triggered by `trigger`. Either may be
    /// omitted; a missing trigger is looked up by its `data-toggle`.
    pub fn toggle_target(&mut self, reference: Option<&str>, trigger: Option<&str>) {
        let doc = self.document.clone();
        let trigger = match (trigger, reference) {
            (Some(trigger), _) => trigger.to_string(),
            (None, Some(reference)) => {
                let found = doc
                    .query(&doc.root_id(), |el| el.attribute(ATTR_TOGGLE) == Some(reference))
                    .into_iter()
                    .next();
                match found {
                    Some(trigger) => trigger,
                    None => {
                        log::warn!("[toggle] no trigger points at {}", reference);
                        return;
                    }
                }
            }
            (None, None) => return,
        };

        if let Some(parent) = doc.parent_id(&trigger) {
            let list = doc.closest(&parent, |el| el.has_attribute(ATTR_TOGGLE_LIST));
            if let Some(list) = list {
                // Already the open tab.
                if doc.has_class(&parent, ACTIVE_CLASS) {
                    return;
                }
                doc.toggle_class(&parent, ACTIVE_CLASS);
                doc.add_class(&parent, LOADING_CLASS);
                self.close_siblings(&list, &parent);
            }
        }

        doc.toggle_class(&trigger, ACTIVE_CLASS);
        doc.add_class(&trigger, LOADING_CLASS);
        self.loading = true;

        match reference.filter(|id| doc.contains(id)) {
            Some(panel) => {
                self.notifier
                    .fire(Notification::new(NotificationKind::TabOpened, panel));
                self.loaded(&trigger);
                doc.toggle_class(panel, ACTIVE_CLASS);
            }
            None => {
                log::warn!("[toggle] target {:?} not found", reference);
                self.loaded(&trigger);
            }
        }
        self.loading = false;
    }

    fn close_siblings(&self, list: &str, open: &str) {
        let doc = &self.document;
        for member in doc.children_ids(list) {
            if member == open {
                continue;
            }
            doc.remove_class(&member, ACTIVE_CLASS);

            let Some(trigger) = doc.children_ids(&member).into_iter().next() else {
                continue;
            };
            let Some(panel) = doc
                .attribute(&trigger, ATTR_TOGGLE)
                .filter(|id| doc.contains(id))
            else {
                continue;
            };
            self.notifier
                .fire(Notification::new(NotificationKind::TabClosed, panel.as_str()));
            doc.remove_class(&panel, ACTIVE_CLASS);
            doc.remove_class(&trigger, ACTIVE_CLASS);
        }
    }

    fn loaded(&self, trigger: &str) {
        self.document.remove_class(trigger, LOADING_CLASS);
        if let Some(parent) = self.document.parent_id(trigger) {
            self.document.remove_class(&parent, LOADING_CLASS);
        }
    }
}
