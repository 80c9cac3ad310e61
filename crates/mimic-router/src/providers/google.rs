//! Google Generative Language `generateContent`. Text only.

use async_trait::async_trait;
use serde_json::{json, Value};

use mimic_contracts::error::MimicResult;

use crate::provider::{post_json, provider_error, reject_image, CompletionRequest, ModelProvider};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub struct GoogleProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl GoogleProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn build_payload(&self, request: &CompletionRequest<'_>) -> Value {
        json!({
            "systemInstruction": { "parts": [{ "text": request.system_prompt }] },
            "contents": [{ "role": "user", "parts": [{ "text": request.user_message }] }],
            "generationConfig": { "maxOutputTokens": self.max_tokens }
        })
    }

    /// Concatenate the text parts of the first candidate.
    pub fn extract_text(body: &Value) -> MimicResult<String> {
        let parts = body
            .get("candidates")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or_else(|| provider_error("google", "no candidate content in response"))?;

        Ok(parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect())
    }
}

#[async_trait]
impl ModelProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "google"
    }

    fn supports_vision(&self) -> bool {
        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> MimicResult<String> {
        reject_image(self.name(), request)?;
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let http = self.client.post(&url).header("x-goog-api-key", &self.api_key);
        let body = post_json(self.name(), http, &self.build_payload(request)).await?;
        Self::extract_text(&body)
    }
}
