//! Gemini REST client.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{GenerateRequest, GenerateResponse};
use crate::{
    API_KEY_ENV, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_TEXT_MODEL, GenAiError, Result,
};

/// Image generation can take a while.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reject empty or whitespace-only prompts before they hit the network.
pub fn validate_prompt(prompt: &str) -> Result<&str> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(GenAiError::EmptyPrompt);
    }
    Ok(trimmed)
}

/// Steer a subject toward artwork that survives dot-matrix rendering.
pub fn enhance_prompt(prompt: &str) -> String {
    format!(
        "High contrast, black and white line art or stipple illustration of {prompt}. \
         Vector graphic style, clean lines, white background. Minimalist. \
         Suitable for thermal printing."
    )
}

fn label_prompt(context: &str) -> String {
    format!(
        "Write a short, witty, industrial-style product label description (max 15 words) \
         for: {context}. Return ONLY the text."
    )
}

/// Client for the `generateContent` endpoint.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    image_model: String,
    text_model: String,
    http: reqwest::Client,
}

impl GeminiClient {
    /// Build a client from the `API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| GenAiError::MissingApiKey)?;
        Self::new(api_key)
    }

    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenAiError::MissingApiKey);
        }

        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            http,
        })
    }

    /// Point the client at another server (mock servers in tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_image_model(mut self, model: impl Into<String>) -> Self {
        self.image_model = model.into();
        self
    }

    pub fn with_text_model(mut self, model: impl Into<String>) -> Self {
        self.text_model = model.into();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn image_model(&self) -> &str {
        &self.image_model
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    /// Generate artwork for `prompt` and decode it.
    ///
    /// The prompt is wrapped with [`enhance_prompt`] first.
    pub async fn generate_image(&self, prompt: &str) -> Result<RgbaImage> {
        let prompt = validate_prompt(prompt)?;
        let response: GenerateResponse = self
            .generate(&self.image_model, &enhance_prompt(prompt))
            .await?;

        let Some(inline) = response.inline_data() else {
            warn!(model = %self.image_model, "Response carried no image part");
            return Err(GenAiError::EmptyResponse("no image data in response".into()));
        };

        let bytes = STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| GenAiError::Decode(e.to_string()))?;
        let img = image::load_from_memory(&bytes)
            .map_err(|e| GenAiError::Decode(e.to_string()))?
            .to_rgba8();

        debug!(
            mime = %inline.mime_type,
            width = img.width(),
            height = img.height(),
            "Decoded generated image"
        );
        Ok(img)
    }

    /// Ask for a short label line describing `context`.
    pub async fn generate_label_text(&self, context: &str) -> Result<String> {
        let context = validate_prompt(context)?;
        let response: GenerateResponse = self
            .generate(&self.text_model, &label_prompt(context))
            .await?;

        let text = response.text().trim().to_string();
        if text.is_empty() {
            return Err(GenAiError::EmptyResponse("no text in response".into()));
        }
        debug!(words = text.split_whitespace().count(), "Generated label text");
        Ok(text)
    }

    /// POST a single-text-part request to `models/{model}:generateContent`.
    async fn generate<T: DeserializeOwned>(&self, model: &str, prompt: &str) -> Result<T> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        debug!(model, "Sending generateContent request");

        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest::text(prompt))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            warn!(model, status = status.as_u16(), "Gemini request failed");
            return Err(GenAiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_prompt_wraps_subject() {
        let p = enhance_prompt("a lighthouse");
        assert!(p.starts_with("High contrast, black and white line art or stipple illustration of a lighthouse. "));
        assert!(p.ends_with("Suitable for thermal printing."));
    }

    #[test]
    fn test_validate_prompt_trims_and_rejects_blank() {
        assert_eq!(validate_prompt("  cat  ").unwrap(), "cat");
        assert!(matches!(validate_prompt(" \n\t"), Err(GenAiError::EmptyPrompt)));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(GeminiClient::new(""), Err(GenAiError::MissingApiKey)));
        assert!(matches!(GeminiClient::new("   "), Err(GenAiError::MissingApiKey)));
    }

    #[test]
    fn test_builder_overrides() {
        let client = GeminiClient::new("k")
            .unwrap()
            .with_base_url("http://localhost:9/")
            .with_image_model("img")
            .with_text_model("txt");
        assert_eq!(client.base_url(), "http://localhost:9");
        assert_eq!(client.image_model(), "img");
        assert_eq!(client.text_model(), "txt");
    }
}
