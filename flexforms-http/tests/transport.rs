use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use flexforms::{AjaxOutcome, AjaxRequest, Form, RequestBody, Transport, TransportError};
use flexforms_http::ReqwestTransport;
use formdom::{Document, Element, Event};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn json_request(url: &str, body: serde_json::Value) -> AjaxRequest {
    AjaxRequest {
        url: url.to_string(),
        method: "POST".to_string(),
        headers: BTreeMap::from([(
            "Content-Type".to_string(),
            "application/json; charset=utf-8".to_string(),
        )]),
        body: RequestBody::Json(body),
    }
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_json_body_and_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(body_json(json!({ "mail": "a@b.com" })))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("x-order", "42")
                .set_body_string(r#"{"id":42}"#),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let response = transport
        .send(json_request(
            &format!("{}/orders", mock_server.uri()),
            json!({ "mail": "a@b.com" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status, 201);
    assert_eq!(response.header("X-Order"), Some("42"));
    assert_eq!(response.json().unwrap()["id"], 42);
}

#[tokio::test]
async fn test_json_body_without_content_type_header() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "q": "rust" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut request = json_request(&format!("{}/search", mock_server.uri()), json!({ "q": "rust" }));
    request.headers.clear();
    let response = ReqwestTransport::new().unwrap().send(request).await.unwrap();

    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_relative_url_uses_base() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::builder()
        .base_url(mock_server.uri())
        .build()
        .unwrap();
    let mut request = json_request("/api/orders", json!({}));
    request.method = "put".to_string();

    let response = transport.send(request).await.unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(response.body, "");
}

#[tokio::test]
async fn test_form_data_sent_as_multipart() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::builder()
        .base_url(mock_server.uri())
        .build()
        .unwrap();
    transport
        .send(AjaxRequest {
            url: "/upload".to_string(),
            method: "POST".to_string(),
            headers: BTreeMap::new(),
            body: RequestBody::FormData(vec![
                ("mail".to_string(), "a@b.com".to_string()),
                ("extra".to_string(), "gift".to_string()),
            ]),
        })
        .await
        .unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"mail\""));
    assert!(body.contains("a@b.com"));
    assert!(body.contains("name=\"extra\""));
}

#[tokio::test]
async fn test_default_headers_sent() {
    let mock_server = MockServer::start().await;
    Mock::given(header("x-requested-with", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::builder()
        .base_url(mock_server.uri())
        .default_header("X-Requested-With", "XMLHttpRequest")
        .build()
        .unwrap();
    let response = transport.send(json_request("/", json!({}))).await.unwrap();
    assert_eq!(response.status, 200);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_error_status_is_a_response() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "errors": { "mail": "taken" } })),
        )
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let response = transport
        .send(json_request(&mock_server.uri(), json!({})))
        .await
        .unwrap();

    assert_eq!(response.status, 422);
    assert!(!response.is_success());
    assert_eq!(response.json().unwrap()["errors"]["mail"], "taken");
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&mock_server)
        .await;

    let transport = ReqwestTransport::builder()
        .timeout(Duration::from_millis(50))
        .build()
        .unwrap();
    let result = transport
        .send(json_request(&mock_server.uri(), json!({})))
        .await;

    assert_eq!(result, Err(TransportError::Timeout(Duration::from_millis(50))));
}

#[tokio::test]
async fn test_relative_url_without_base() {
    let transport = ReqwestTransport::new().unwrap();
    let result = transport.send(json_request("/orders", json!({}))).await;
    assert!(matches!(result, Err(TransportError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let transport = ReqwestTransport::new().unwrap();
    let result = transport
        .send(json_request(&format!("http://127.0.0.1:{port}/"), json!({})))
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, TransportError::Network(_)));
    assert!(error.is_retryable());
}

// ============================================================================
// With a bound form
// ============================================================================

#[tokio::test]
async fn test_remote_form_round_trip() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/orders"))
        .and(body_json(json!({ "mail": "a@b.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let doc = Document::new(
        Element::form()
            .id("order")
            .attr("action", "/orders")
            .attr("data-remote", "json")
            .child(Element::input("email").id("mail").name("mail").required()),
    );
    doc.set_value("mail", "a@b.com").unwrap();

    let transport = ReqwestTransport::builder()
        .base_url(mock_server.uri())
        .build()
        .unwrap();
    let form = Form::builder(&doc)
        .registry(flexforms::ValidatorRegistry::new())
        .hooks(flexforms::Hooks::new())
        .transport(transport)
        .bind()
        .unwrap();

    let seen: Arc<Mutex<Option<AjaxOutcome>>> = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    form.register_remote_validation(move |_, outcome| *sink.lock().unwrap() = Some(outcome.clone()));

    form.dispatch(Event::Submit);
    form.settle().await;

    let outcome = seen.lock().unwrap().clone().expect("hook ran");
    let response = outcome.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.json().unwrap()["ok"], true);
    assert!(!form.is_loading());
}
