#![allow(clippy::unwrap_used)]
// Integration tests for `TelegramClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header_regex, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use locus_api::{Error, TelegramClient, TransportConfig};

async fn setup() -> (MockServer, TelegramClient) {
    let server = MockServer::start().await;
    let client = TelegramClient::with_client(
        reqwest::Client::new(),
        &server.uri(),
        "123:ABC".to_string().into(),
        "-10042",
    )
    .unwrap();
    (server, client)
}

fn ok_body() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} }))
}

#[tokio::test]
async fn test_send_message_posts_multipart_form() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"chat_id\""))
        .and(body_string_contains("-10042"))
        .and(body_string_contains("hello *not markdown*"))
        .respond_with(ok_body())
        .expect(1)
        .mount(&server)
        .await;

    client.send_message("hello *not markdown*").await.unwrap();
}

#[tokio::test]
async fn test_send_photo_attaches_file_part() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendPhoto"))
        .and(body_string_contains("filename=\"capture.jpg\""))
        .and(body_string_contains("image/jpeg"))
        .and(body_string_contains("FAKEJPEGBYTES"))
        .respond_with(ok_body())
        .expect(1)
        .mount(&server)
        .await;

    client.send_photo(b"FAKEJPEGBYTES".to_vec()).await.unwrap();
}

#[tokio::test]
async fn test_ok_false_is_provider_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let result = client.send_message("x").await;
    assert!(
        matches!(result, Err(Error::Provider { ref message }) if message.contains("chat not found")),
        "expected Provider error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_http_error_is_api_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendPhoto"))
        .respond_with(ResponseTemplate::new(413).set_body_string("Request Entity Too Large"))
        .mount(&server)
        .await;

    let err = client.send_photo(vec![0xff, 0xd8]).await.unwrap_err();
    assert_eq!(err.status(), Some(413));
}

#[tokio::test]
async fn test_photo_upload_uses_upload_timeout() {
    let server = MockServer::start().await;
    let client = TelegramClient::new(
        &server.uri(),
        "123:ABC".to_string().into(),
        "-10042",
        &TransportConfig::with_timeout(Duration::from_secs(5)),
        Duration::from_millis(100),
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/bot123:ABC/sendPhoto"))
        .respond_with(ok_body().set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = client.send_photo(vec![1, 2, 3]).await.unwrap_err();
    assert!(err.is_timeout(), "expected timeout, got: {err:?}");
}

#[tokio::test]
async fn test_transport_error_does_not_expose_token() {
    // Nothing listens on port 1, so the request fails before any response.
    let client = TelegramClient::with_client(
        reqwest::Client::new(),
        "http://127.0.0.1:1",
        "123456:SUPERSECRETTOKEN".to_string().into(),
        "-10042",
    )
    .unwrap();

    let err = client.send_message("hi").await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got: {err:?}");
    assert!(!err.to_string().contains("SUPERSECRETTOKEN"), "{err}");
    assert!(!format!("{err:?}").contains("SUPERSECRETTOKEN"), "{err:?}");

    let err = client.send_photo(vec![1, 2, 3]).await.unwrap_err();
    assert!(!err.to_string().contains("SUPERSECRETTOKEN"), "{err}");
}
