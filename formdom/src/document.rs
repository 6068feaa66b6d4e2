use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::element::{Element, Tag};
use crate::error::DomError;
use crate::validity::{self, ValidityState};

/// A native form submission recorded by [`Document::submit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub form: String,
    pub action: String,
    pub method: String,
    pub entries: Vec<(String, String)>,
}

struct Inner {
    root: Element,
    url: String,
    focused: Option<String>,
    submissions: Vec<Submission>,
}

/// Shared handle to an in-memory document.
///
/// Cloning is cheap; all clones see the same tree. Every method takes the
/// lock for the duration of the call only, so a `Document` can be used from
/// async continuations without holding a guard across `.await`.
#[derive(Clone)]
pub struct Document {
    inner: Arc<Mutex<Inner>>,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Document")
            .field("root", &inner.root.id)
            .field("url", &inner.url)
            .field("focused", &inner.focused)
            .finish()
    }
}

impl Document {
    pub fn new(root: Element) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                root,
                url: String::new(),
                focused: None,
                submissions: Vec::new(),
            })),
        }
    }

    /// Parse a document from JSON markup.
    pub fn from_json(markup: &str) -> Result<Self, DomError> {
        let root: Element = serde_json::from_str(markup)?;
        Ok(Self::new(root))
    }

    /// Set the document URL (builder style).
    pub fn with_url(self, url: impl Into<String>) -> Self {
        self.lock().url = url.into();
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<T>(&self, id: &str, f: impl FnOnce(&Element) -> T) -> Option<T> {
        let inner = self.lock();
        inner.root.find(id).map(f)
    }

    fn write<T>(&self, id: &str, f: impl FnOnce(&mut Element) -> T) -> Option<T> {
        let mut inner = self.lock();
        inner.root.find_mut(id).map(f)
    }

    // =========================================================================
    // Tree access
    // =========================================================================

    pub fn url(&self) -> String {
        self.lock().url.clone()
    }

    pub fn root_id(&self) -> String {
        self.lock().root.id.clone()
    }

    /// Snapshot of an element and its subtree.
    pub fn element(&self, id: &str) -> Option<Element> {
        self.read(id, Element::clone)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read(id, |_| ()).is_some()
    }

    /// Whether `id` is `ancestor` or lies inside it.
    pub fn is_within(&self, ancestor: &str, id: &str) -> bool {
        self.read(ancestor, |el| el.find(id).is_some())
            .unwrap_or(false)
    }

    pub fn tag(&self, id: &str) -> Option<Tag> {
        self.read(id, |el| el.tag)
    }

    pub fn parent_id(&self, id: &str) -> Option<String> {
        let inner = self.lock();
        inner
            .root
            .ancestors_of(id)?
            .last()
            .map(|parent| parent.id.clone())
    }

    pub fn children_ids(&self, id: &str) -> Vec<String> {
        self.read(id, |el| el.children.iter().map(|c| c.id.clone()).collect())
            .unwrap_or_default()
    }

    /// Nearest element, starting at `id` itself and walking up, that matches.
    pub fn closest(&self, id: &str, predicate: impl Fn(&Element) -> bool) -> Option<String> {
        let inner = self.lock();
        let element = inner.root.find(id)?;
        if predicate(element) {
            return Some(element.id.clone());
        }
        inner
            .root
            .ancestors_of(id)?
            .into_iter()
            .rev()
            .find(|el| predicate(*el))
            .map(|el| el.id.clone())
    }

    /// Ids of descendants of `scope` matching `predicate`, in document order.
    pub fn query(&self, scope: &str, predicate: impl Fn(&Element) -> bool) -> Vec<String> {
        self.read(scope, |el| {
            el.descendants()
                .into_iter()
                .filter(|el| predicate(*el))
                .map(|el| el.id.clone())
                .collect()
        })
        .unwrap_or_default()
    }

    /// Like [`query`](Self::query) but returns element snapshots.
    pub fn select(&self, scope: &str, predicate: impl Fn(&Element) -> bool) -> Vec<Element> {
        self.read(scope, |el| {
            el.descendants()
                .into_iter()
                .filter(|el| predicate(*el))
                .cloned()
                .collect()
        })
        .unwrap_or_default()
    }

    /// Fields inside `scope` whose `name` attribute equals `name`.
    pub fn named(&self, scope: &str, name: &str) -> Vec<String> {
        self.query(scope, |el| el.tag.is_field() && el.name_attr() == Some(name))
    }

    // =========================================================================
    // Attributes and classes
    // =========================================================================

    pub fn attribute(&self, id: &str, name: &str) -> Option<String> {
        self.read(id, |el| el.attribute(name).map(str::to_string))
            .flatten()
    }

    pub fn has_attribute(&self, id: &str, name: &str) -> bool {
        self.read(id, |el| el.has_attribute(name)).unwrap_or(false)
    }

    /// Returns `false` if the element does not exist.
    pub fn set_attribute(&self, id: &str, name: &str, value: &str) -> bool {
        self.write(id, |el| {
            el.attributes.insert(name.to_string(), value.to_string());
        })
        .is_some()
    }

    pub fn remove_attribute(&self, id: &str, name: &str) -> bool {
        self.write(id, |el| {
            el.attributes.remove(name);
        })
        .is_some()
    }

    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.read(id, |el| el.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&self, id: &str, class: &str) -> bool {
        self.write(id, |el| el.add_class(class)).is_some()
    }

    pub fn remove_class(&self, id: &str, class: &str) -> bool {
        self.write(id, |el| el.remove_class(class)).is_some()
    }

    /// Toggle `class`, returning whether it is now present.
    pub fn toggle_class(&self, id: &str, class: &str) -> bool {
        self.write(id, |el| {
            if el.has_class(class) {
                el.remove_class(class);
                false
            } else {
                el.add_class(class);
                true
            }
        })
        .unwrap_or(false)
    }

    pub fn classes(&self, id: &str) -> Vec<String> {
        self.read(id, |el| el.classes.clone()).unwrap_or_default()
    }

    // =========================================================================
    // Control state
    // =========================================================================

    pub fn value(&self, id: &str) -> Option<String> {
        self.read(id, |el| el.value.clone())
    }

    pub fn set_value(&self, id: &str, value: impl Into<String>) -> Result<(), DomError> {
        let value = value.into();
        self.write(id, |el| el.value = value)
            .ok_or_else(|| DomError::NotFound(id.to_string()))
    }

    pub fn is_checked(&self, id: &str) -> bool {
        self.read(id, |el| el.checked).unwrap_or(false)
    }

    /// Check or uncheck a control. Checking a radio unchecks the other
    /// members of its group.
    pub fn set_checked(&self, id: &str, checked: bool) -> Result<(), DomError> {
        let mut inner = self.lock();
        let (is_radio, name) = inner
            .root
            .find(id)
            .map(|el| (el.is_radio(), el.name_attr().map(str::to_string)))
            .ok_or_else(|| DomError::NotFound(id.to_string()))?;

        if checked && is_radio {
            if let Some(name) = name {
                uncheck_group(&mut inner.root, &name);
            }
        }
        if let Some(el) = inner.root.find_mut(id) {
            el.checked = checked;
        }
        Ok(())
    }

    pub fn text(&self, id: &str) -> Option<String> {
        self.read(id, |el| el.text.clone())
    }

    // =========================================================================
    // Constraint validation
    // =========================================================================

    /// Equivalent of `setCustomValidity`. An empty message clears the custom error.
    pub fn set_custom_validity(&self, id: &str, message: impl Into<String>) -> bool {
        let message = message.into();
        self.write(id, |el| el.custom_validity = message).is_some()
    }

    pub fn validity(&self, id: &str) -> Option<ValidityState> {
        let inner = self.lock();
        let element = inner.root.find(id)?;
        Some(validity::compute(&inner.root, element))
    }

    pub fn validation_message(&self, id: &str) -> String {
        let inner = self.lock();
        match inner.root.find(id) {
            Some(element) => {
                let state = validity::compute(&inner.root, element);
                validity::message(element, &state)
            }
            None => String::new(),
        }
    }

    /// `checkValidity()` over every control inside `scope`.
    pub fn check_validity(&self, scope: &str) -> bool {
        self.invalid_elements(scope).is_empty()
    }

    /// Invalid elements inside `scope` in document order.
    ///
    /// Like some browsers, a fieldset containing an invalid control is
    /// reported as invalid too.
    pub fn invalid_elements(&self, scope: &str) -> Vec<String> {
        let inner = self.lock();
        let Some(scope) = inner.root.find(scope) else {
            return Vec::new();
        };
        let is_invalid = |el: &Element| !validity::compute(&inner.root, el).valid();

        scope
            .descendants()
            .into_iter()
            .filter(|el| match el.tag {
                Tag::Fieldset => el.descendants().into_iter().any(is_invalid),
                _ => is_invalid(*el),
            })
            .map(|el| el.id.clone())
            .collect()
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Append `child` to `parent`, returning the child's id.
    pub fn append_child(&self, parent: &str, child: Element) -> Result<String, DomError> {
        let id = child.id.clone();
        self.write(parent, |el| el.children.push(child))
            .ok_or_else(|| DomError::NotFound(parent.to_string()))?;
        Ok(id)
    }

    /// Remove descendants of `scope` matching `predicate`.
    pub fn remove_where(&self, scope: &str, predicate: impl Fn(&Element) -> bool) -> usize {
        let mut inner = self.lock();
        let removed = match inner.root.find_mut(scope) {
            Some(el) => el.remove_where(&predicate),
            None => 0,
        };
        if let Some(focused) = inner.focused.clone() {
            if inner.root.find(&focused).is_none() {
                inner.focused = None;
            }
        }
        removed
    }

    // =========================================================================
    // Focus
    // =========================================================================

    pub fn focus(&self, id: &str) -> Result<(), DomError> {
        let mut inner = self.lock();
        if inner.root.find(id).is_none() {
            return Err(DomError::NotFound(id.to_string()));
        }
        log::debug!("[formdom] focus -> {}", id);
        inner.focused = Some(id.to_string());
        Ok(())
    }

    pub fn focused(&self) -> Option<String> {
        self.lock().focused.clone()
    }

    // =========================================================================
    // Submission
    // =========================================================================

    /// Entry list a native submission of `form` would send.
    pub fn form_entries(&self, form: &str) -> Vec<(String, String)> {
        self.read(form, |el| {
            el.descendants()
                .into_iter()
                .filter(|el| is_successful_control(*el))
                .filter_map(|el| {
                    el.name_attr()
                        .map(|name| (name.to_string(), el.value.clone()))
                })
                .collect()
        })
        .unwrap_or_default()
    }

    /// Native `form.submit()`: records the submission without validating.
    pub fn submit(&self, form: &str) -> Result<(), DomError> {
        let entries = self.form_entries(form);
        let mut inner = self.lock();
        let element = inner
            .root
            .find(form)
            .ok_or_else(|| DomError::NotFound(form.to_string()))?;

        let action = element
            .attribute("action")
            .map(str::to_string)
            .unwrap_or_else(|| inner.url.clone());
        let method = element
            .attribute("method")
            .unwrap_or("get")
            .to_ascii_lowercase();

        log::info!("[formdom] native submit of {} to {:?}", form, action);
        let submission = Submission {
            form: form.to_string(),
            action,
            method,
            entries,
        };
        inner.submissions.push(submission);
        Ok(())
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.lock().submissions.clone()
    }
}

fn uncheck_group(root: &mut Element, name: &str) {
    if root.is_radio() && root.name_attr() == Some(name) {
        root.checked = false;
    }
    for child in &mut root.children {
        uncheck_group(child, name);
    }
}

fn is_successful_control(el: &Element) -> bool {
    if el.disabled || !el.tag.is_field() {
        return false;
    }
    match el.input_type().as_str() {
        "checkbox" | "radio" => el.checked,
        "button" | "submit" | "reset" | "image" => false,
        _ => true,
    }
}
