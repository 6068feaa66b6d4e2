use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

fn generate_id(prefix: &str) -> String {
    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id}")
}

/// Element kinds the document understands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tag {
    Form,
    Input,
    Select,
    Textarea,
    Fieldset,
    Button,
    Option,
    #[default]
    Div,
    Span,
    Label,
    A,
    Section,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Form => "form",
            Tag::Input => "input",
            Tag::Select => "select",
            Tag::Textarea => "textarea",
            Tag::Fieldset => "fieldset",
            Tag::Button => "button",
            Tag::Option => "option",
            Tag::Div => "div",
            Tag::Span => "span",
            Tag::Label => "label",
            Tag::A => "a",
            Tag::Section => "section",
        }
    }

    /// Whether elements of this kind hold a user-editable value.
    pub fn is_field(self) -> bool {
        matches!(self, Tag::Input | Tag::Select | Tag::Textarea)
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Element {
    // Identity
    pub id: String,
    pub tag: Tag,

    // Markup
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub text: String,

    // Control state
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    /// Message set through `setCustomValidity`. Empty means no custom error.
    #[serde(skip)]
    pub custom_validity: String,

    pub children: Vec<Element>,
}

impl Default for Element {
    fn default() -> Self {
        Self {
            id: generate_id("el"),
            tag: Tag::Div,
            attributes: BTreeMap::new(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            checked: false,
            disabled: false,
            custom_validity: String::new(),
            children: Vec::new(),
        }
    }
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            id: generate_id(tag.as_str()),
            tag,
            ..Default::default()
        }
    }

    pub fn form() -> Self {
        Self::new(Tag::Form)
    }

    /// Create an `<input>` of the given type.
    pub fn input(input_type: &str) -> Self {
        Self::new(Tag::Input).attr("type", input_type)
    }

    pub fn select() -> Self {
        Self::new(Tag::Select)
    }

    pub fn textarea() -> Self {
        Self::new(Tag::Textarea)
    }

    pub fn fieldset() -> Self {
        Self::new(Tag::Fieldset)
    }

    pub fn button() -> Self {
        Self::new(Tag::Button)
    }

    pub fn option(value: impl Into<String>) -> Self {
        Self::new(Tag::Option).value(value)
    }

    pub fn div() -> Self {
        Self::new(Tag::Div)
    }

    pub fn span() -> Self {
        Self::new(Tag::Span)
    }

    // Builder methods

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.attr("name", name)
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        let class = class.into();
        if !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn checked(mut self, checked: bool) -> Self {
        self.checked = checked;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn required(self) -> Self {
        self.attr("required", "")
    }

    pub fn pattern(self, pattern: impl Into<String>) -> Self {
        self.attr("pattern", pattern)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    // Accessors

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn name_attr(&self) -> Option<&str> {
        self.attribute("name").filter(|name| !name.is_empty())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Lowercased `type` attribute. Inputs without one are text inputs.
    pub fn input_type(&self) -> String {
        match self.attribute("type") {
            Some(kind) if !kind.is_empty() => kind.to_ascii_lowercase(),
            _ if self.tag == Tag::Input => "text".to_string(),
            _ => String::new(),
        }
    }

    pub fn is_radio(&self) -> bool {
        self.tag == Tag::Input && self.input_type() == "radio"
    }

    pub fn is_checkbox(&self) -> bool {
        self.tag == Tag::Input && self.input_type() == "checkbox"
    }

    /// Whether this element takes part in native constraint validation.
    pub fn is_validation_candidate(&self) -> bool {
        if self.disabled || !self.tag.is_field() {
            return false;
        }
        !matches!(
            self.input_type().as_str(),
            "hidden" | "button" | "submit" | "reset" | "image"
        )
    }

    // Tree traversal

    /// Pre-order list of this element and every descendant.
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Element>) {
        out.push(self);
        for child in &self.children {
            child.collect(out);
        }
    }

    /// Pre-order list of descendants, excluding `self`.
    pub fn descendants(&self) -> Vec<&Element> {
        let mut all = self.walk();
        all.remove(0);
        all
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Element> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Chain of ancestors of `id`, outermost first. `None` if `id` is absent.
    pub fn ancestors_of(&self, id: &str) -> Option<Vec<&Element>> {
        if self.id == id {
            return Some(Vec::new());
        }
        for child in &self.children {
            if let Some(mut chain) = child.ancestors_of(id) {
                chain.insert(0, self);
                return Some(chain);
            }
        }
        None
    }

    /// Remove every descendant matching `predicate`. Returns the number removed.
    pub fn remove_where(&mut self, predicate: &dyn Fn(&Element) -> bool) -> usize {
        let before = self.children.len();
        self.children.retain(|child| !predicate(child));
        let mut removed = before - self.children.len();
        for child in &mut self.children {
            removed += child.remove_where(predicate);
        }
        removed
    }
}
