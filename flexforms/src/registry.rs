//! Named custom validators.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use formdom::{Document, Element};

/// Type alias for boxed futures used by validators and passes.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A registered validator: resolves `true` when the field is valid.
pub type ValidatorFn = Arc<dyn Fn(FieldRef, Document) -> BoxFuture<'static, bool> + Send + Sync>;

/// Snapshot of the field being validated, taken when its validator starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub id: String,
    pub name: Option<String>,
    pub value: String,
    pub checked: bool,
    pub input_type: String,
}

impl FieldRef {
    pub fn from_element(element: &Element) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name_attr().map(str::to_string),
            value: element.value.clone(),
            checked: element.checked,
            input_type: element.input_type(),
        }
    }
}

static GLOBAL: LazyLock<ValidatorRegistry> = LazyLock::new(ValidatorRegistry::new);

/// Mapping from validator name to validator.
///
/// The registry is a shared handle: clones refer to the same map. Forms use
/// [`ValidatorRegistry::global`] unless a different registry is injected, so
/// a validator registered on one form is visible to every other form sharing
/// the same map.
///
/// # Example
///
/// ```
/// use flexforms::ValidatorRegistry;
///
/// let registry = ValidatorRegistry::new();
/// registry.register("never-empty", |field, _doc| async move { !field.value.is_empty() });
/// assert!(registry.contains("never-empty"));
/// ```
#[derive(Clone, Default)]
pub struct ValidatorRegistry {
    validators: Arc<RwLock<HashMap<String, ValidatorFn>>>,
}

impl std::fmt::Debug for ValidatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ValidatorRegistry {
    /// Creates an empty registry, isolated from the global one.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn global() -> Self {
        GLOBAL.clone()
    }

    /// Register `validator` under `name`. An existing entry is replaced.
    pub fn register<F, Fut>(&self, name: impl Into<String>, validator: F)
    where
        F: Fn(FieldRef, Document) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let boxed: ValidatorFn =
            Arc::new(move |field: FieldRef, doc: Document| -> BoxFuture<'static, bool> {
                Box::pin(validator(field, doc))
            });
        self.register_boxed(name, boxed);
    }

    pub fn register_boxed(&self, name: impl Into<String>, validator: ValidatorFn) {
        let name = name.into();
        let mut map = self
            .validators
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if map.insert(name.clone(), validator).is_some() {
            log::debug!("[registry] replaced validator {:?}", name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<ValidatorFn> {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let map = self
            .validators
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = map.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.validators
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles refer to the same map.
    pub fn same_as(&self, other: &ValidatorRegistry) -> bool {
        Arc::ptr_eq(&self.validators, &other.validators)
    }
}
