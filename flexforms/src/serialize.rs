//! Form values as plain data.

use formdom::{Document, Element, Tag};
use serde_json::{Map, Value};

use crate::form::Form;

/// Field values of `form` keyed by name.
///
/// Takes enabled, named inputs, selects and textareas, skipping unchecked
/// radios. A name seen more than once collects its values into an array in
/// document order.
pub fn serialize(document: &Document, form: &str) -> Map<String, Value> {
    let mut result = Map::new();
    for element in document.select(form, is_serialized) {
        let Some(name) = element.name_attr() else {
            continue;
        };
        let value = Value::String(element.value.clone());
        match result.get_mut(name) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                result.insert(name.to_string(), value);
            }
        }
    }
    result
}

fn is_serialized(element: &Element) -> bool {
    if element.disabled || element.name_attr().is_none() {
        return false;
    }
    match element.tag {
        Tag::Input if element.is_radio() => element.checked,
        Tag::Input | Tag::Select | Tag::Textarea => true,
        _ => false,
    }
}

impl Form {
    /// See [`serialize`].
    pub fn serialize(&self) -> Map<String, Value> {
        serialize(self.document(), self.id())
    }

    /// Entries a multipart submission of this form sends.
    pub fn form_data(&self) -> Vec<(String, String)> {
        self.document().form_entries(self.id())
    }
}
