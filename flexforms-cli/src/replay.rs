//! Replays a scenario against a bound form.

use std::sync::{Arc, Mutex, PoisonError};

use flexforms::{Form, Hooks, NotificationKind, OverlayTooltips, Toggleable, Transport};
use flexforms_http::ReqwestTransport;
use formdom::{Document, Event};

use crate::error::CliError;
use crate::report::Report;
use crate::rules::registry_for;
use crate::scenario::{Scenario, Step};
use crate::transport::{Recording, ScriptedTransport};

const FORM_NOTIFICATIONS: [NotificationKind; 4] = [
    NotificationKind::Ready,
    NotificationKind::Submit,
    NotificationKind::AfterAjaxSubmit,
    NotificationKind::AjaxCompleted,
];

/// Where remote submissions go.
pub enum Remote {
    /// The scenario's scripted reply, if it has one.
    Scripted,
    /// Real HTTP requests, relative URLs resolved against the scenario URL.
    Live,
}

pub async fn replay(scenario: Scenario, remote: Remote) -> Result<Report, CliError> {
    scenario.check()?;
    let form_id = scenario
        .form_id()
        .ok_or_else(|| CliError::Check("markup contains no form".to_string()))?;

    let doc = Document::new(scenario.form.clone()).with_url(scenario.url.clone());
    let tooltips = OverlayTooltips::new();
    let notifications = Arc::new(Mutex::new(Vec::<String>::new()));

    let backend: Option<Arc<dyn Transport>> = match remote {
        Remote::Live => Some(Arc::new(
            ReqwestTransport::builder().base_url(&scenario.url).build()?,
        )),
        Remote::Scripted => scenario
            .remote
            .clone()
            .map(|reply| Arc::new(ScriptedTransport::new(reply)) as Arc<dyn Transport>),
    };
    let recording = backend.map(Recording::new);

    let mut builder = Form::builder(&doc)
        .root(form_id)
        .options(scenario.options.clone())
        .registry(registry_for(&scenario.validators)?)
        .hooks(Hooks::new())
        .tooltips(tooltips.factory());
    for kind in FORM_NOTIFICATIONS {
        let sink = notifications.clone();
        builder = builder.on(kind, move |n| {
            sink.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(format!("{} {}", n.kind.name(), n.target));
        });
    }
    if let Some(recording) = &recording {
        builder = builder.transport(recording.clone());
    }
    let form = builder.bind()?;

    let mut toggles = Toggleable::new(&doc, doc.root_id())?;
    for kind in [NotificationKind::TabOpened, NotificationKind::TabClosed] {
        let sink = notifications.clone();
        toggles.notifier().on(
            kind,
            Arc::new(move |n| {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(format!("{} {}", n.kind.name(), n.target));
            }),
        );
    }

    for step in scenario.events {
        log::debug!("[replay] {:?}", step);
        match step {
            Step::Focus { target } => {
                doc.focus(&target)?;
                form.dispatch(Event::focus(target));
            }
            Step::Blur { target } => {
                form.dispatch(Event::blur(target));
            }
            Step::Change { target } => {
                form.dispatch(Event::change(target));
            }
            Step::Click { target } => {
                toggles.handle_click(&target);
                form.dispatch(Event::click(target));
            }
            Step::Submit => {
                form.dispatch(Event::Submit);
            }
            Step::SetValue { target, value } => doc.set_value(&target, value)?,
            Step::Check { target, checked } => doc.set_checked(&target, checked)?,
            Step::Settle => form.settle().await,
        }
    }
    form.settle().await;

    let requests = recording.map(|r| r.requests()).unwrap_or_default();
    let notifications = notifications
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    Ok(Report::collect(&form, &tooltips, requests, notifications))
}
