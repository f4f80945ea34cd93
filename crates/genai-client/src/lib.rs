//! Remote image and label-text generation for the label designer.
//!
//! Talks to the Gemini `generateContent` REST endpoint. Generated images
//! come back decoded so they can go straight into the render pipeline.

pub mod client;
pub mod models;

pub use client::{GeminiClient, enhance_prompt, validate_prompt};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used for image generation.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Model used for label text.
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";

/// Unified error type for the genai-client crate.
#[derive(Debug, thiserror::Error)]
pub enum GenAiError {
    #[error("API key not configured (set {API_KEY_ENV})")]
    MissingApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gemini API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Empty response: {0}")]
    EmptyResponse(String),

    #[error("Failed to decode generated image: {0}")]
    Decode(String),
}

/// Result type alias for generation requests.
pub type Result<T> = std::result::Result<T, GenAiError>;
