//! The form controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use formdom::{Document, Event, Tag};
use futures::FutureExt;
use tokio::runtime::Handle;

use crate::error::FormError;
use crate::hooks::{Hooks, RemoteValidationHook};
use crate::machine::{self, Effect, Phase, Signal, SubmissionState};
use crate::markers::{ATTR_DISABLE_INLINE, ATTR_VALIDATE, INVALID_CLASS, LOADING_CLASS};
use crate::notify::{Listener, Notification, NotificationKind, Notifier};
use crate::options::FormOptions;
use crate::presenter::SavedValidity;
use crate::registry::{FieldRef, ValidatorRegistry};
use crate::runner::SharedPass;
use crate::tasks::TaskSet;
use crate::tooltip::{OverlayTooltips, TooltipFactory, Tooltips};
use crate::transport::Transport;

/// Result of dispatching an event to a form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The default action of the event must not run.
    pub default_prevented: bool,
}

impl EventOutcome {
    fn prevented() -> Self {
        Self {
            default_prevented: true,
        }
    }

    fn merge(self, other: EventOutcome) -> Self {
        Self {
            default_prevented: self.default_prevented || other.default_prevented,
        }
    }
}

pub(crate) struct ControllerState {
    pub(crate) submission: SubmissionState,
    pub(crate) tooltips: Option<Box<dyn Tooltips>>,
    pub(crate) saved: HashMap<String, SavedValidity>,
    pub(crate) current_validation: Option<SharedPass>,
    pub(crate) remote_validation: Option<RemoteValidationHook>,
}

pub(crate) struct FormInner {
    pub(crate) document: Document,
    pub(crate) root: String,
    pub(crate) options: FormOptions,
    pub(crate) registry: ValidatorRegistry,
    pub(crate) hooks: Hooks,
    pub(crate) transport: Option<Arc<dyn Transport>>,
    pub(crate) tooltip_factory: TooltipFactory,
    pub(crate) notifier: Notifier,
    pub(crate) tasks: TaskSet,
    pub(crate) state: Mutex<ControllerState>,
}

/// A validating controller bound to one `<form>` element.
///
/// `Form` is a cheap-clone handle. Event handlers run their synchronous part
/// inside [`dispatch`](Self::dispatch) and spawn the rest (validator passes,
/// deferred tooltips, submission) on the tokio runtime the form was bound in.
/// Use [`settle`](Self::settle) to wait for all of it.
///
/// # Example
///
/// ```ignore
/// use flexforms::{Form, FormOptions};
/// use formdom::{Document, Element, Event};
///
/// let doc = Document::new(
///     Element::form().id("signup").child(
///         Element::input("email").id("mail").name("mail").attr("data-validate", "mail"),
///     ),
/// );
///
/// let form = Form::builder(&doc).options(FormOptions::default()).bind()?;
/// form.register_validator("mail", |field, _doc| async move { field.value.contains('@') });
///
/// doc.set_value("mail", "nope")?;
/// form.dispatch(Event::Submit);
/// form.settle().await;
/// assert!(doc.has_class("mail", "invalid"));
/// ```
#[derive(Clone)]
pub struct Form {
    pub(crate) inner: Arc<FormInner>,
}

impl std::fmt::Debug for Form {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("root", &self.inner.root)
            .field("options", &self.inner.options)
            .field("state", &self.submission_state())
            .finish()
    }
}

/// Builder for [`Form`].
pub struct FormBuilder {
    document: Document,
    root: Option<String>,
    options: FormOptions,
    registry: Option<ValidatorRegistry>,
    hooks: Option<Hooks>,
    transport: Option<Arc<dyn Transport>>,
    tooltips: Option<TooltipFactory>,
    listeners: Vec<(NotificationKind, Listener)>,
}

impl FormBuilder {
    /// Bind to this element instead of the document root.
    pub fn root(mut self, id: impl Into<String>) -> Self {
        self.root = Some(id.into());
        self
    }

    /// Options to merge over the defaults. Form attributes still win.
    pub fn options(mut self, options: FormOptions) -> Self {
        self.options = options;
        self
    }

    /// Use `registry` instead of the global validator registry.
    pub fn registry(mut self, registry: ValidatorRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use `hooks` instead of the global hooks.
    pub fn hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = Some(hooks);
        self
    }

    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Factory for the tooltip widget, called once on first use.
    pub fn tooltips(mut self, factory: TooltipFactory) -> Self {
        self.tooltips = Some(factory);
        self
    }

    /// Listen for a lifecycle notification. Listeners registered here also
    /// see `ready`.
    pub fn on(
        mut self,
        kind: NotificationKind,
        listener: impl Fn(&mut Notification) + Send + Sync + 'static,
    ) -> Self {
        self.listeners.push((kind, Arc::new(listener)));
        self
    }

    /// Bind the form. Must be called inside a tokio runtime.
    pub fn bind(self) -> Result<Form, FormError> {
        let root = self.root.unwrap_or_else(|| self.document.root_id());
        let element = self
            .document
            .element(&root)
            .ok_or_else(|| FormError::UnknownElement(root.clone()))?;
        if element.tag != Tag::Form {
            return Err(FormError::NotAForm { tag: element.tag });
        }
        let handle = Handle::try_current().map_err(|_| FormError::NoRuntime)?;

        let options = self.options.apply_attributes(&element);
        let notifier = Notifier::new();
        for (kind, listener) in self.listeners {
            notifier.on(kind, listener);
        }

        log::debug!("[form] binding {} with {:?}", root, options);
        let form = Form {
            inner: Arc::new(FormInner {
                document: self.document,
                root,
                options,
                registry: self.registry.unwrap_or_else(ValidatorRegistry::global),
                hooks: self.hooks.unwrap_or_else(Hooks::global),
                transport: self.transport,
                tooltip_factory: self
                    .tooltips
                    .unwrap_or_else(|| OverlayTooltips::new().factory()),
                notifier,
                tasks: TaskSet::new(handle),
                state: Mutex::new(ControllerState {
                    submission: SubmissionState::default(),
                    tooltips: None,
                    saved: HashMap::new(),
                    current_validation: None,
                    remote_validation: None,
                }),
            }),
        };

        form.notify(Notification::new(NotificationKind::Ready, form.id()));
        Ok(form)
    }
}

impl Form {
    pub fn builder(document: &Document) -> FormBuilder {
        FormBuilder {
            document: document.clone(),
            root: None,
            options: FormOptions::default(),
            registry: None,
            hooks: None,
            transport: None,
            tooltips: None,
            listeners: Vec::new(),
        }
    }

    /// Id of the form element.
    pub fn id(&self) -> &str {
        &self.inner.root
    }

    pub fn document(&self) -> &Document {
        &self.inner.document
    }

    /// Effective options after attribute merging.
    pub fn options(&self) -> &FormOptions {
        &self.inner.options
    }

    pub fn registry(&self) -> &ValidatorRegistry {
        &self.inner.registry
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, ControllerState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Register a validator on this form's registry.
    pub fn register_validator<F, Fut>(&self, name: impl Into<String>, validator: F) -> &Self
    where
        F: Fn(FieldRef, formdom::Document) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = bool> + Send + 'static,
    {
        self.inner.registry.register(name, validator);
        self
    }

    /// Override the remote-validation hook for this form only.
    pub fn register_remote_validation(
        &self,
        hook: impl Fn(&Form, &crate::AjaxOutcome) + Send + Sync + 'static,
    ) -> &Self {
        self.state().remote_validation = Some(Arc::new(hook));
        self
    }

    /// Listen for a lifecycle notification fired on this form.
    pub fn on(
        &self,
        kind: NotificationKind,
        listener: impl Fn(&mut Notification) + Send + Sync + 'static,
    ) -> &Self {
        self.inner.notifier.on(kind, Arc::new(listener));
        self
    }

    pub(crate) fn notify(&self, notification: Notification) -> Notification {
        self.inner.notifier.fire(notification)
    }

    // =========================================================================
    // State
    // =========================================================================

    pub fn submission_state(&self) -> SubmissionState {
        self.state().submission
    }

    pub fn phase(&self) -> Phase {
        self.submission_state().phase
    }

    /// The re-entrancy guard: `true` while a submit attempt is running.
    pub fn is_loading(&self) -> bool {
        self.submission_state().loading
    }

    /// The most recent top-level validation pass (from submit or invalid).
    pub fn current_validation(&self) -> Option<SharedPass> {
        self.state().current_validation.clone()
    }

    /// Validity snapshot taken the last time results were applied to `field`.
    pub fn saved_validity(&self, field: &str) -> Option<SavedValidity> {
        self.state().saved.get(field).cloned()
    }

    /// Whether the tooltip widget has been created.
    pub fn tooltips_created(&self) -> bool {
        self.state().tooltips.is_some()
    }

    /// Wait until every continuation spawned by this form has finished.
    pub async fn settle(&self) {
        self.inner.tasks.settle().await;
    }

    pub(crate) fn spawn<F>(&self, future: F)
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.inner.tasks.spawn(future);
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Deliver a DOM event. Events targeting elements outside the form are
    /// ignored.
    pub fn dispatch(&self, event: Event) -> EventOutcome {
        if let Some(target) = event.target() {
            if !self.inner.document.is_within(&self.inner.root, target) {
                return EventOutcome::default();
            }
        }
        log::debug!("[form] {} event on {:?}", event.name(), event.target());

        match event {
            Event::Invalid { target } => self.on_invalid(&target),
            Event::Blur { target } => self.on_blur(&target),
            Event::Focus { target } => self.on_focus(&target),
            Event::Change { target } => self.on_change(&target),
            Event::Submit => self.on_submit(),
            Event::Click { .. } => EventOutcome::default(),
        }
    }

    fn on_invalid(&self, target: &str) -> EventOutcome {
        let doc = &self.inner.document;
        let invalid: Vec<String> = doc
            .invalid_elements(&self.inner.root)
            .into_iter()
            .filter(|id| doc.tag(id) != Some(Tag::Fieldset))
            .collect();

        // One invalid event fires per control; the first one does the work.
        if invalid.iter().position(|id| id == target).is_some_and(|i| i > 0) {
            return EventOutcome::prevented();
        }

        if let Some(first) = invalid.first().cloned() {
            let form = self.clone();
            self.spawn(async move {
                tokio::task::yield_now().await;
                if let Err(e) = form.inner.document.focus(&first) {
                    log::debug!("[form] could not focus {}: {}", first, e);
                }
                form.show_or_create_tooltip(&first, false);
            });
        }

        let custom: Vec<String> = invalid
            .iter()
            .filter(|id| doc.has_attribute(id, ATTR_VALIDATE))
            .cloned()
            .collect();
        let pending = self.run_many(&custom);
        self.apply_results(&invalid, true);

        let form = self.clone();
        let pass = async move {
            let result = pending.await;
            form.apply_results(&result.checked_fields, false);
            result
        }
        .boxed()
        .shared();
        self.track_pass(pass);
        EventOutcome::prevented()
    }

    fn on_blur(&self, target: &str) -> EventOutcome {
        self.remove_tooltip(target);
        if !self.is_inline_candidate(target) {
            return EventOutcome::default();
        }

        let had_error = self.inner.document.has_class(target, INVALID_CLASS);
        let fields = vec![target.to_string()];
        let pending = self.run_many(&fields);
        let form = self.clone();
        self.spawn(async move {
            pending.await;
            form.apply_results(&fields, false);
            if !had_error {
                form.show_or_create_tooltip(&fields[0], false);
            }
        });
        EventOutcome::default()
    }

    fn on_focus(&self, target: &str) -> EventOutcome {
        if self.is_inline_candidate(target) {
            self.show_or_create_tooltip(target, false);
        }
        EventOutcome::default()
    }

    fn on_change(&self, target: &str) -> EventOutcome {
        let Some(name) = self.inner.document.attribute(target, "name").filter(|n| !n.is_empty())
        else {
            return EventOutcome::default();
        };

        let group = self.inner.document.named(&self.inner.root, &name);
        let pending = self.run_many(&group);
        let form = self.clone();
        let target = target.to_string();
        self.spawn(async move {
            pending.await;
            form.apply_results(&group, false);
            form.show_or_create_tooltip(&target, true);
        });
        EventOutcome::default()
    }

    fn on_submit(&self) -> EventOutcome {
        let effects = self.transition(Signal::Submit);
        self.run_effects(effects)
    }

    /// Text-like controls that take part in blur and focus validation.
    fn is_inline_candidate(&self, id: &str) -> bool {
        if !self.inner.options.inline_validation {
            return false;
        }
        let Some(element) = self.inner.document.element(id) else {
            return false;
        };
        if element.has_attribute(ATTR_DISABLE_INLINE) || !element.tag.is_field() {
            return false;
        }
        !matches!(
            element.input_type().as_str(),
            "checkbox" | "radio" | "option" | "submit" | "button" | "reset"
        )
    }

    // =========================================================================
    // Submission state machine
    // =========================================================================

    pub(crate) fn transition(&self, signal: Signal) -> Vec<Effect> {
        let (next, effects) = {
            let mut state = self.state();
            let (next, effects) = machine::step(state.submission, signal);
            state.submission = next;
            (next, effects)
        };
        log::debug!("[form] {}: {:?} -> {:?} {:?}", self.id(), signal, next, effects);

        if next.loading {
            self.inner.document.add_class(&self.inner.root, LOADING_CLASS);
        } else {
            self.inner.document.remove_class(&self.inner.root, LOADING_CLASS);
        }
        effects
    }

    pub(crate) fn signal(&self, signal: Signal) {
        let effects = self.transition(signal);
        self.run_effects(effects);
    }

    fn run_effects(&self, effects: Vec<Effect>) -> EventOutcome {
        let mut outcome = EventOutcome::default();
        for effect in effects {
            match effect {
                Effect::PreventDefault => outcome = outcome.merge(EventOutcome::prevented()),
                Effect::ClearErrors => self.remove_errors(),
                Effect::CheckNativeValidity => {
                    let valid = self.inner.document.check_validity(&self.inner.root);
                    let next = self.transition(Signal::NativeChecked { valid });
                    outcome = outcome.merge(self.run_effects(next));
                }
                Effect::RunFullPass => self.start_submit_pass(),
                Effect::SurfaceNativeErrors => self.fire_invalid_events(),
                Effect::Dispatch => {
                    let form = self.clone();
                    self.spawn(async move { form.dispatch_submission().await });
                }
            }
        }
        outcome
    }

    /// `checkValidity()` fires `invalid` at every invalid control. The batch
    /// is computed once: the first control's event does the work and resets
    /// custom errors, so the rest are only prevented.
    fn fire_invalid_events(&self) {
        let doc = &self.inner.document;
        let mut controls = doc
            .invalid_elements(&self.inner.root)
            .into_iter()
            .filter(|id| doc.tag(id) != Some(Tag::Fieldset));
        let Some(first) = controls.next() else {
            return;
        };
        self.dispatch(Event::invalid(first));
        for id in controls {
            log::debug!("[form] invalid event for {} prevented", id);
        }
    }

    fn start_submit_pass(&self) {
        let pending = self.validate_custom_fields();
        let form = self.clone();
        let pass = async move {
            let result = pending.await;
            let doc = form.document();
            let first_invalid = result
                .checked_fields
                .iter()
                .find(|id| doc.validity(id).is_some_and(|v| !v.valid()));
            if let Some(first) = first_invalid {
                form.show_or_create_tooltip(first, true);
                if let Err(e) = doc.focus(first) {
                    log::debug!("[form] could not focus {}: {}", first, e);
                }
            }
            form.apply_results(&result.checked_fields, false);
            result
        }
        .boxed()
        .shared();
        self.track_pass(pass.clone());

        let form = self.clone();
        self.spawn(async move {
            let result = pass.await;
            log::debug!(
                "[form] {}: submit pass checked {:?}, errors: {}",
                form.id(),
                result.checked_fields,
                result.found_any_error
            );
            form.signal(Signal::PassResolved {
                found_any_error: result.found_any_error,
            });
        });
    }

    /// Make `pass` the current validation and drive it to completion.
    fn track_pass(&self, pass: SharedPass) {
        self.state().current_validation = Some(pass.clone());
        self.spawn(async move {
            pass.await;
        });
    }
}
