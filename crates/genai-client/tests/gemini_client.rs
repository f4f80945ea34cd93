//! Mock HTTP tests for GeminiClient.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use genai_client::{
    API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GeminiClient,
    GenAiError, enhance_prompt,
};
use image::{ImageFormat, Rgba, RgbaImage};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMAGE_PATH: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";
const TEXT_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn client(server: &MockServer) -> GeminiClient {
    GeminiClient::new("test-key").unwrap().with_base_url(server.uri())
}

fn png_base64(width: u32, height: u32) -> String {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
    STANDARD.encode(bytes)
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{"content": {"parts": [{"text": text}]}}]
    }))
}

#[test]
fn test_defaults() {
    let client = GeminiClient::new("k").unwrap();
    assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    assert_eq!(client.image_model(), DEFAULT_IMAGE_MODEL);
    assert_eq!(client.text_model(), DEFAULT_TEXT_MODEL);
}

#[test]
fn test_from_env_requires_key() {
    let original = std::env::var(API_KEY_ENV).ok();

    // SAFETY: no other test in this binary reads or writes this variable.
    unsafe { std::env::set_var(API_KEY_ENV, "env-key") };
    assert!(GeminiClient::from_env().is_ok());

    unsafe { std::env::remove_var(API_KEY_ENV) };
    assert!(matches!(GeminiClient::from_env(), Err(GenAiError::MissingApiKey)));

    if let Some(val) = original {
        unsafe { std::env::set_var(API_KEY_ENV, val) };
    }
}

#[tokio::test]
async fn test_generate_image_decodes_inline_png() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text": enhance_prompt("a teapot")}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Here is your image"},
                {"inlineData": {"mimeType": "image/png", "data": png_base64(6, 4)}}
            ]}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let img = client(&server).generate_image("  a teapot ").await.unwrap();
    assert_eq!(img.dimensions(), (6, 4));
    assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
}

#[tokio::test]
async fn test_generate_image_without_image_part() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(text_response("I cannot draw that"))
        .mount(&server)
        .await;

    let err = client(&server).generate_image("x").await.unwrap_err();
    assert!(matches!(err, GenAiError::EmptyResponse(_)));
}

#[tokio::test]
async fn test_generate_image_with_garbage_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "image/png", "data": "!!not base64!!"}}
            ]}}]
        })))
        .mount(&server)
        .await;

    let err = client(&server).generate_image("x").await.unwrap_err();
    assert!(matches!(err, GenAiError::Decode(_)));
}

#[tokio::test]
async fn test_api_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(IMAGE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    match client(&server).generate_image("x").await {
        Err(GenAiError::Api { status, message }) => {
            assert_eq!(status, 403);
            assert_eq!(message, "API key not valid");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_prompt_never_hits_network() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(text_response("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let c = client(&server);
    assert!(matches!(c.generate_image("   ").await, Err(GenAiError::EmptyPrompt)));
    assert!(matches!(c.generate_label_text("").await, Err(GenAiError::EmptyPrompt)));
}

#[tokio::test]
async fn test_label_text_is_trimmed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_json(json!({
            "contents": [{"parts": [{"text":
                "Write a short, witty, industrial-style product label description (max 15 words) for: coffee beans. Return ONLY the text."
            }]}]
        })))
        .respond_with(text_response("  Grade-A caffeine ore. Handle with jitters.\n"))
        .expect(1)
        .mount(&server)
        .await;

    let text = client(&server).generate_label_text("coffee beans").await.unwrap();
    assert_eq!(text, "Grade-A caffeine ore. Handle with jitters.");
}

#[tokio::test]
async fn test_label_text_failures_propagate() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let err = client(&server).generate_label_text("tea").await.unwrap_err();
    assert!(matches!(err, GenAiError::Api { status: 500, .. }));
}

#[tokio::test]
async fn test_label_text_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;
    let err = client(&server).generate_label_text("tea").await.unwrap_err();
    assert!(matches!(err, GenAiError::EmptyResponse(_)));
}

#[tokio::test]
async fn test_malformed_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;
    let err = client(&server).generate_label_text("tea").await.unwrap_err();
    assert!(matches!(err, GenAiError::Json(_)));
}
