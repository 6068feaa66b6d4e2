mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use common::{email_field, Harness};
use flexforms::FormOptions;
use formdom::{Document, Element, Event};

fn profile_form() -> Document {
    Document::new(
        Element::form().id("profile").children([
            Element::div().id("row").child(email_field("mail", "email")),
            Element::input("text").id("name").name("name").required(),
            Element::input("checkbox").id("tos").name("tos").required(),
            Element::input("text")
                .id("quiet")
                .name("quiet")
                .required()
                .attr("data-disable-inline-validation", ""),
        ]),
    )
}

// ============================================================================
// Blur
// ============================================================================

#[tokio::test]
async fn test_blur_validates_single_field() {
    let h = Harness::bind(profile_form(), FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;

    assert!(h.is_flagged("mail"));
    assert_eq!(h.aria("mail").as_deref(), Some("true"));
    // other fields untouched
    assert!(!h.is_flagged("name"));
    assert!(h.form.saved_validity("name").is_none());
}

#[tokio::test]
async fn test_blur_tooltip_only_when_newly_invalid() {
    let h = Harness::bind(profile_form(), FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;
    assert!(h.tooltips.is_open("mail"));

    // Still invalid: the tooltip is removed on blur and not shown again.
    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;
    assert!(h.is_flagged("mail"));
    assert!(!h.tooltips.is_open("mail"));
}

#[tokio::test]
async fn test_blur_runs_native_check_for_unvalidated_field() {
    let h = Harness::bind(profile_form(), FormOptions::default());

    h.form.dispatch(Event::blur("name"));
    h.form.settle().await;

    assert!(h.is_flagged("name"));
    let saved = h.form.saved_validity("name").unwrap();
    assert!(saved.validity.value_missing);
    assert_eq!(saved.message, "Please fill out this field.");
}

#[tokio::test]
async fn test_blur_ignores_ineligible_fields() {
    let h = Harness::bind(profile_form(), FormOptions::default());

    h.form.dispatch(Event::blur("tos"));
    h.form.dispatch(Event::blur("quiet"));
    h.form.settle().await;

    assert!(h.form.saved_validity("tos").is_none());
    assert!(h.form.saved_validity("quiet").is_none());
}

#[tokio::test]
async fn test_inline_validation_disabled_by_option() {
    let h = Harness::bind(profile_form(), FormOptions::default().inline_validation(false));
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;

    assert!(!h.is_flagged("mail"));
    assert!(h.form.saved_validity("mail").is_none());
}

#[tokio::test]
async fn test_inline_validation_disabled_by_attribute() {
    let doc = profile_form();
    doc.set_attribute("profile", "data-inline-validation", "false");
    let h = Harness::bind(doc, FormOptions::default());
    assert!(!h.form.options().inline_validation);

    h.form.dispatch(Event::blur("name"));
    h.form.settle().await;
    assert!(h.form.saved_validity("name").is_none());
}

#[tokio::test]
async fn test_blur_while_validator_pending_marks_loading() {
    let doc = Document::new(Element::form().id("f").child(email_field("mail", "slow-email")));
    let h = Harness::bind(doc, FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    assert!(h.doc.has_class("mail", "loading"));

    h.form.settle().await;
    assert!(!h.doc.has_class("mail", "loading"));
    assert!(h.is_flagged("mail"));
}

// ============================================================================
// Focus
// ============================================================================

#[tokio::test]
async fn test_focus_shows_existing_error() {
    let h = Harness::bind(profile_form(), FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;
    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;
    assert!(!h.tooltips.is_open("mail"));

    h.form.dispatch(Event::focus("mail"));
    h.form.settle().await;
    assert!(h.tooltips.is_open("mail"));
}

#[tokio::test]
async fn test_focus_does_not_validate() {
    let h = Harness::bind(profile_form(), FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::focus("mail"));
    h.form.settle().await;

    assert!(!h.is_flagged("mail"));
    assert!(!h.tooltips.is_open("mail"));
}

#[tokio::test]
async fn test_tooltips_not_created_when_disabled() {
    let h = Harness::bind(profile_form(), FormOptions::default().create_tooltips(false));
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.settle().await;

    assert!(h.is_flagged("mail"));
    assert!(!h.form.tooltips_created());
    assert_eq!(h.tooltips.instances(), 0);
}

#[tokio::test]
async fn test_tooltip_widget_created_once() {
    let h = Harness::bind(profile_form(), FormOptions::default());
    h.doc.set_value("mail", "bad").unwrap();

    h.form.dispatch(Event::blur("mail"));
    h.form.dispatch(Event::blur("name"));
    h.form.dispatch(Event::focus("mail"));
    h.form.settle().await;

    assert!(h.form.tooltips_created());
    assert_eq!(h.tooltips.instances(), 1);
    assert!(h.tooltips.is_open("name"));
}

// ============================================================================
// Change
// ============================================================================

fn choice_form() -> Document {
    Document::new(
        Element::form().id("poll").children([
            Element::input("radio")
                .id("r1")
                .name("choice")
                .value("a")
                .attr("data-validate", "picked"),
            Element::input("radio")
                .id("r2")
                .name("choice")
                .value("b")
                .attr("data-validate", "picked"),
            email_field("mail", "email"),
        ]),
    )
}

#[tokio::test]
async fn test_change_validates_only_name_group() {
    let h = Harness::bind(choice_form(), FormOptions::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    h.form.register_validator("picked", move |_field, doc| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            doc.named(&doc.root_id(), "choice")
                .iter()
                .any(|id| doc.is_checked(id))
        }
    });
    h.doc.set_value("mail", "bad").unwrap();

    h.doc.set_checked("r2", true).unwrap();
    h.form.dispatch(Event::change("r2"));
    h.form.settle().await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(h.form.saved_validity("r1").unwrap().is_valid());
    assert!(h.form.saved_validity("r2").unwrap().is_valid());
    assert!(h.form.saved_validity("mail").is_none());
    assert!(!h.is_flagged("mail"));
}

#[tokio::test]
async fn test_change_removes_tooltip_when_valid() {
    let h = Harness::bind(choice_form(), FormOptions::default());
    h.form
        .register_validator("picked", |field, _doc| async move { field.checked });

    // r1 unchecked: its validator fails and it gets a tooltip
    h.form.dispatch(Event::change("r1"));
    h.form.settle().await;
    assert!(h.is_flagged("r1"));
    assert!(h.tooltips.is_open("r1"));

    h.doc.set_checked("r1", true).unwrap();
    h.form.dispatch(Event::change("r1"));
    h.form.settle().await;
    assert!(!h.is_flagged("r1"));
    assert!(!h.tooltips.is_open("r1"));
}

#[tokio::test]
async fn test_change_without_name_is_ignored() {
    let doc = Document::new(
        Element::form()
            .id("f")
            .child(Element::select().id("pick").required()),
    );
    let h = Harness::bind(doc, FormOptions::default());

    h.form.dispatch(Event::change("pick"));
    h.form.settle().await;
    assert!(h.form.saved_validity("pick").is_none());
}
