use formdom::{DomError, Document, Element, Tag};

fn signup() -> Document {
    Document::new(
        Element::form()
            .id("signup")
            .attr("action", "/register")
            .attr("method", "POST")
            .children([
                Element::div().id("row-name").child(
                    Element::input("text").id("name").name("name").required(),
                ),
                Element::fieldset().id("group").children([
                    Element::input("radio").id("r1").name("plan").value("free"),
                    Element::input("radio").id("r2").name("plan").value("pro"),
                ]),
                Element::input("checkbox").id("news").name("news").value("yes"),
                Element::button().id("send").attr("type", "submit"),
            ]),
    )
    .with_url("https://example.com/signup")
}

// ============================================================================
// Markup
// ============================================================================

#[test]
fn test_from_json_markup() {
    let doc = Document::from_json(
        r#"{
            "id": "f",
            "tag": "form",
            "children": [
                { "id": "mail", "tag": "input", "attributes": { "type": "email", "name": "mail" }, "value": "x" }
            ]
        }"#,
    )
    .unwrap();

    assert_eq!(doc.root_id(), "f");
    assert_eq!(doc.tag("mail"), Some(Tag::Input));
    assert_eq!(doc.value("mail").as_deref(), Some("x"));
    assert!(doc.validity("mail").unwrap().type_mismatch);
}

#[test]
fn test_from_json_rejects_garbage() {
    assert!(matches!(
        Document::from_json("{ not json"),
        Err(DomError::Markup(_))
    ));
}

// ============================================================================
// Queries
// ============================================================================

#[test]
fn test_parent_and_closest() {
    let doc = signup();
    assert_eq!(doc.parent_id("name").as_deref(), Some("row-name"));
    assert_eq!(doc.parent_id("signup"), None);
    assert_eq!(
        doc.closest("r1", |el| el.tag == Tag::Form).as_deref(),
        Some("signup")
    );
    assert!(doc.is_within("signup", "r2"));
    assert!(!doc.is_within("row-name", "r2"));
}

#[test]
fn test_named_returns_group_in_order() {
    let doc = signup();
    assert_eq!(doc.named("signup", "plan"), vec!["r1", "r2"]);
    assert!(doc.named("signup", "missing").is_empty());
}

#[test]
fn test_class_mutation() {
    let doc = signup();
    assert!(doc.add_class("name", "invalid"));
    assert!(doc.add_class("name", "invalid"));
    assert_eq!(doc.classes("name"), vec!["invalid"]);

    assert!(!doc.toggle_class("name", "invalid"));
    assert!(!doc.has_class("name", "invalid"));
    assert!(!doc.add_class("ghost", "invalid"));
}

// ============================================================================
// Control state
// ============================================================================

#[test]
fn test_checking_radio_unchecks_siblings() {
    let doc = signup();
    doc.set_checked("r1", true).unwrap();
    doc.set_checked("r2", true).unwrap();
    assert!(!doc.is_checked("r1"));
    assert!(doc.is_checked("r2"));
}

#[test]
fn test_set_value_unknown_element() {
    let doc = signup();
    assert!(matches!(
        doc.set_value("ghost", "x"),
        Err(DomError::NotFound(id)) if id == "ghost"
    ));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_invalid_elements_reports_fieldset_quirk() {
    let doc = Document::new(Element::form().id("f").children([
        Element::fieldset()
            .id("fs")
            .child(Element::input("text").id("inner").required()),
        Element::input("text").id("outer").required(),
    ]));

    assert_eq!(doc.invalid_elements("f"), vec!["fs", "inner", "outer"]);
    assert!(!doc.check_validity("f"));

    doc.set_value("inner", "x").unwrap();
    doc.set_value("outer", "y").unwrap();
    assert!(doc.invalid_elements("f").is_empty());
    assert!(doc.check_validity("f"));
}

// ============================================================================
// Structure and focus
// ============================================================================

#[test]
fn test_append_and_remove() {
    let doc = signup();
    let id = doc
        .append_child("row-name", Element::div().class("form-error").text("oops"))
        .unwrap();
    assert_eq!(doc.parent_id(&id).as_deref(), Some("row-name"));

    let removed = doc.remove_where("signup", |el| el.has_class("form-error"));
    assert_eq!(removed, 1);
    assert!(!doc.contains(&id));
}

#[test]
fn test_focus() {
    let doc = signup();
    assert_eq!(doc.focused(), None);
    doc.focus("name").unwrap();
    assert_eq!(doc.focused().as_deref(), Some("name"));
    assert!(doc.focus("ghost").is_err());
}

// ============================================================================
// Native submission
// ============================================================================

#[test]
fn test_native_submit_records_entries() {
    let doc = signup();
    doc.set_value("name", "Ada").unwrap();
    doc.set_checked("r2", true).unwrap();

    doc.submit("signup").unwrap();
    let submissions = doc.submissions();
    assert_eq!(submissions.len(), 1);

    let sub = &submissions[0];
    assert_eq!(sub.action, "/register");
    assert_eq!(sub.method, "post");
    assert_eq!(
        sub.entries,
        vec![
            ("name".to_string(), "Ada".to_string()),
            ("plan".to_string(), "pro".to_string()),
        ]
    );
}

#[test]
fn test_native_submit_defaults_to_document_url() {
    let doc = Document::new(Element::form().id("f")).with_url("https://example.com/page");
    doc.submit("f").unwrap();
    let sub = &doc.submissions()[0];
    assert_eq!(sub.action, "https://example.com/page");
    assert_eq!(sub.method, "get");
}
