//! Web API Upload Tests
//!
//! Integration tests for the contact form relay endpoint.

mod common;

use std::sync::Arc;

use axum::body::Bytes;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use common::{create_test_config, create_test_server, create_test_server_with, RecordingTransport};
use serde_json::{json, Value};

const MIB: usize = 1024 * 1024;

fn forwarded_for(ip: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-forwarded-for"),
        HeaderValue::from_str(ip).unwrap(),
    )
}

/// A form that passes validation.
fn valid_form() -> MultipartForm {
    MultipartForm::new()
        .add_text("name", "Jane")
        .add_text("email", "jane@x.com")
        .add_text("message", "hi")
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme")
}

fn file_part(filename: &str, mime: &str, size: usize) -> Part {
    Part::bytes(vec![b'x'; size])
        .file_name(filename)
        .mime_type(mime)
}

async fn post_form(server: &TestServer, ip: &str, form: MultipartForm) -> axum_test::TestResponse {
    let (name, value) = forwarded_for(ip);
    server
        .post("/upload_files")
        .add_header(name, value)
        .multipart(form)
        .await
}

fn error_fields(body: &Value) -> Vec<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_upload_end_to_end_with_attachment() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new()
        .add_text("name", "Jane")
        .add_text("email", "jane@x.com")
        .add_text("message", "hi")
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme")
        .add_part("files", file_part("invoice.pdf", "application/pdf", 10 * 1024));

    let response = post_form(&server, "203.0.113.1", form).await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "message": "Email sent successfully" }));

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let message = &sent[0];
    assert_eq!(message.from, "relay@example.com");
    assert_eq!(message.to, "owner@biz.com");
    assert_eq!(message.reply_to.as_deref(), Some("jane@x.com"));
    assert_eq!(message.subject, "Mail from acme website");
    assert!(message.body.contains("Mail obtained from acme website"));
    assert!(message.body.contains("name : Jane"));
    assert!(message.body.contains("email : jane@x.com"));
    assert!(message.body.contains("message : hi"));

    assert_eq!(message.attachments.len(), 1);
    assert_eq!(message.attachments[0].filename, "invoice.pdf");
    assert_eq!(message.attachments[0].content_type, "application/pdf");
    assert_eq!(message.attachments[0].size(), 10 * 1024);
}

#[tokio::test]
async fn test_upload_without_attachments() {
    let (server, transport) = create_test_server();

    let response = post_form(&server, "203.0.113.2", valid_form()).await;

    response.assert_status_ok();
    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].attachments.is_empty());
    assert_eq!(sent[0].subject, "Mail from acme website");
}

#[tokio::test]
async fn test_upload_with_phone_number() {
    let (server, transport) = create_test_server();

    let form = valid_form().add_text("phoneNum", "555-0100");
    post_form(&server, "203.0.113.3", form).await.assert_status_ok();

    let sent = transport.sent();
    assert!(sent[0].body.contains("Phone Number : 555-0100"));
}

#[tokio::test]
async fn test_upload_multiple_attachments_keep_order() {
    let (server, transport) = create_test_server();

    let form = valid_form()
        .add_part("files", file_part("a.txt", "text/plain", 100))
        .add_part("files", file_part("b.png", "image/png", 200))
        .add_part("files", file_part("c.pdf", "application/pdf", 300));

    post_form(&server, "203.0.113.4", form).await.assert_status_ok();

    let sent = transport.sent();
    let names: Vec<&str> = sent[0]
        .attachments
        .iter()
        .map(|a| a.filename.as_str())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.png", "c.pdf"]);
}

#[tokio::test]
async fn test_upload_missing_fields() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new().add_text("message", "hi");
    let response = post_form(&server, "203.0.113.5", form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    let fields = error_fields(&body);
    assert!(fields.contains(&"name".to_string()));
    assert!(fields.contains(&"email".to_string()));
    assert!(fields.contains(&"dest".to_string()));
    assert!(fields.contains(&"website".to_string()));

    let errors = body["errors"].as_array().unwrap();
    assert!(errors.contains(&json!({ "field": "name", "message": "Name is required" })));
    assert!(errors.contains(&json!({ "field": "website", "message": "Website is required" })));

    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_name_too_long() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new()
        .add_text("name", "a".repeat(31))
        .add_text("email", "jane@x.com")
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme");
    let response = post_form(&server, "203.0.113.6", form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({
            "errors": [
                { "field": "name", "message": "Name must be at most 30 characters" }
            ]
        })
    );
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_invalid_email() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new()
        .add_text("name", "Jane")
        .add_text("email", "not-an-email")
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme");
    let response = post_form(&server, "203.0.113.7", form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(error_fields(&body), vec!["email".to_string()]);
    assert_eq!(body["errors"][0]["message"], "Invalid email address");
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_message_over_twenty_characters() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new()
        .add_text("name", "Jane")
        .add_text("email", "jane@x.com")
        .add_text("message", "a".repeat(21))
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme");
    let response = post_form(&server, "203.0.113.8", form).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["errors"][0]["field"], "message");
    assert_eq!(
        body["errors"][0]["message"],
        "Message must be at most 20 characters"
    );
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_empty_message_is_accepted() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new()
        .add_text("name", "Jane")
        .add_text("email", "jane@x.com")
        .add_text("dest", "owner@biz.com")
        .add_text("website", "acme");
    post_form(&server, "203.0.113.9", form).await.assert_status_ok();

    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn test_upload_attachments_over_limit() {
    let (server, transport) = create_test_server();

    let form = valid_form().add_part(
        "files",
        file_part("big.bin", "application/octet-stream", 5 * MIB + 1),
    );
    let response = post_form(&server, "203.0.113.10", form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Attachments exceed the 5 MiB limit" }));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_combined_attachments_over_limit() {
    let (server, transport) = create_test_server();

    // Each file fits alone, together they do not
    let form = valid_form()
        .add_part("files", file_part("a.bin", "application/octet-stream", 3 * MIB))
        .add_part("files", file_part("b.bin", "application/octet-stream", 3 * MIB));
    let response = post_form(&server, "203.0.113.11", form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_attachments_at_limit() {
    let (server, transport) = create_test_server();

    let form = valid_form().add_part(
        "files",
        file_part("exact.bin", "application/octet-stream", 5 * MIB),
    );
    post_form(&server, "203.0.113.12", form).await.assert_status_ok();

    assert_eq!(transport.sent()[0].attachment_bytes(), 5 * MIB);
}

#[tokio::test]
async fn test_upload_oversized_and_invalid_reports_size() {
    let (server, transport) = create_test_server();

    let form = MultipartForm::new().add_part(
        "files",
        file_part("big.bin", "application/octet-stream", 6 * MIB),
    );
    let response = post_form(&server, "203.0.113.13", form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_text_field_over_body_limit() {
    let (server, transport) = create_test_server();

    let form = valid_form().add_text("message", "a".repeat(6 * MIB));
    let response = post_form(&server, "203.0.113.17", form).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Request body too large" }));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_truncated_multipart_body() {
    let (server, transport) = create_test_server();

    let body = concat!(
        "--XYZ\r\n",
        "Content-Disposition: form-data; name=\"name\"\r\n",
        "\r\n",
        "Jane\r\n",
        "--XYZ\r\n",
        "Content-Disposition: form-data; name=\"files\"; filename=\"invoice.pdf\"\r\n",
        "Content-Type: application/pdf\r\n",
        "\r\n",
        "%PDF-1.4 partial\r\n",
        "--XY"
    );

    let (name, value) = forwarded_for("203.0.113.18");
    let response = server
        .post("/upload_files")
        .add_header(name, value)
        .content_type("multipart/form-data; boundary=XYZ")
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Error processing files" }));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_requires_multipart() {
    let (server, transport) = create_test_server();

    let response = server
        .post("/upload_files")
        .json(&json!({
            "name": "Jane",
            "email": "jane@x.com",
            "dest": "owner@biz.com",
            "website": "acme"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Request must be multipart/form-data" }));
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_upload_transport_failure() {
    let transport = Arc::new(RecordingTransport::failing());
    let server = create_test_server_with(&create_test_config(), transport.clone());

    let response = post_form(&server, "203.0.113.14", valid_form()).await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    assert_eq!(body, json!({ "error": "Error sending email" }));
    // One attempt, no retry
    assert_eq!(transport.count(), 1);
}

#[tokio::test]
async fn test_upload_repeated_request_sends_twice() {
    let (server, transport) = create_test_server();

    post_form(&server, "203.0.113.15", valid_form()).await.assert_status_ok();
    post_form(&server, "203.0.113.15", valid_form()).await.assert_status_ok();

    assert_eq!(transport.count(), 2);
}

#[tokio::test]
async fn test_upload_rate_limit() {
    let (server, transport) = create_test_server();

    for _ in 0..10 {
        post_form(&server, "198.51.100.7", valid_form())
            .await
            .assert_status_ok();
    }

    let response = post_form(&server, "198.51.100.7", valid_form()).await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    let body: Value = response.json();
    assert_eq!(
        body,
        json!({ "error": "Too many requests, please try again later." })
    );
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(transport.count(), 10);

    // Other callers keep their own budget
    post_form(&server, "198.51.100.8", valid_form())
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_upload_rate_limit_headers() {
    let (server, _) = create_test_server();

    let first = post_form(&server, "198.51.100.11", valid_form()).await;
    first.assert_status_ok();
    let headers = first.headers();
    assert_eq!(headers.get("x-ratelimit-limit").unwrap(), "10");
    assert_eq!(headers.get("x-ratelimit-remaining").unwrap(), "9");
    assert!(headers.contains_key("x-ratelimit-reset"));

    let second = post_form(&server, "198.51.100.11", valid_form()).await;
    assert_eq!(second.headers().get("x-ratelimit-remaining").unwrap(), "8");

    // Not sent outside the upload route
    let health = server.get("/health").await;
    assert!(!health.headers().contains_key("x-ratelimit-limit"));
}

#[tokio::test]
async fn test_rejected_requests_count_toward_rate_limit() {
    let (server, transport) = create_test_server();

    for _ in 0..10 {
        post_form(&server, "198.51.100.9", MultipartForm::new().add_text("name", "Jane"))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    post_form(&server, "198.51.100.9", valid_form())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(transport.count(), 0);
}

#[tokio::test]
async fn test_configured_rate_limit_budget() {
    let mut config = create_test_config();
    config.limits.rate_limit_max_requests = 2;
    let transport = Arc::new(RecordingTransport::new());
    let server = create_test_server_with(&config, transport.clone());

    post_form(&server, "198.51.100.10", valid_form()).await.assert_status_ok();
    post_form(&server, "198.51.100.10", valid_form()).await.assert_status_ok();
    post_form(&server, "198.51.100.10", valid_form())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let mut config = create_test_config();
    config.limits.rate_limit_max_requests = 1;
    let server = create_test_server_with(&config, Arc::new(RecordingTransport::new()));

    for _ in 0..5 {
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }
}

#[tokio::test]
async fn test_security_headers_on_responses() {
    let (server, _) = create_test_server();

    let response = post_form(&server, "203.0.113.16", valid_form()).await;
    let headers = response.headers();

    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("cache-control").unwrap(), "no-store");
}

#[tokio::test]
async fn test_openapi_document() {
    let (server, _) = create_test_server();

    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["paths"]["/upload_files"]["post"].is_object());
}
