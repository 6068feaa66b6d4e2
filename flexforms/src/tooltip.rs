//! Tooltip collaborator contract and an in-memory implementation.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use formdom::Document;
use serde::Serialize;

use crate::markers::TOOLTIP_CLASS;

/// A tooltip widget shared by every field of one form.
pub trait Tooltips: Send {
    /// Show `html` next to `target`, replacing any tooltip it already has.
    fn create_tooltip(&mut self, target: &str, html: &str, remove_title: bool);

    /// Hide the tooltip of `target`, if any.
    fn remove_tooltip(&mut self, target: &str);
}

/// Creates the tooltip widget of a form on first use. Receives the document
/// and the form id.
pub type TooltipFactory = Arc<dyn Fn(&Document, &str) -> Box<dyn Tooltips> + Send + Sync>;

/// An open tooltip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tooltip {
    pub target: String,
    pub html: String,
    pub container_class: String,
}

/// Tooltip widget that keeps open tooltips in memory.
///
/// Clones share the same tooltip set, so a test can keep one handle and hand
/// [`factory`](Self::factory) to the form builder.
#[derive(Debug, Clone, Default)]
pub struct OverlayTooltips {
    open: Arc<Mutex<BTreeMap<String, Tooltip>>>,
    created: Arc<Mutex<u32>>,
}

impl OverlayTooltips {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open tooltips ordered by target id.
    pub fn live(&self) -> Vec<Tooltip> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    pub fn get(&self, target: &str) -> Option<Tooltip> {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(target)
            .cloned()
    }

    pub fn is_open(&self, target: &str) -> bool {
        self.get(target).is_some()
    }

    /// How many widgets the factory has handed out.
    pub fn instances(&self) -> u32 {
        *self.created.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A factory handing out handles to this tooltip set.
    pub fn factory(&self) -> TooltipFactory {
        let shared = self.clone();
        Arc::new(move |_doc: &Document, form: &str| -> Box<dyn Tooltips> {
            *shared.created.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            log::debug!("[tooltip] widget created for form {}", form);
            Box::new(shared.clone())
        })
    }
}

impl Tooltips for OverlayTooltips {
    fn create_tooltip(&mut self, target: &str, html: &str, _remove_title: bool) {
        let tooltip = Tooltip {
            target: target.to_string(),
            html: html.to_string(),
            container_class: TOOLTIP_CLASS.to_string(),
        };
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(target.to_string(), tooltip);
    }

    fn remove_tooltip(&mut self, target: &str) {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(target);
    }
}
