//! Anthropic messages API. Text only.

use async_trait::async_trait;
use serde_json::{json, Value};

use mimic_contracts::error::MimicResult;

use crate::provider::{post_json, provider_error, reject_image, CompletionRequest, ModelProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl AnthropicProvider {
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
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system_prompt,
            "messages": [{ "role": "user", "content": request.user_message }]
        })
    }

    /// The first content block, which must be text.
    pub fn extract_text(body: &Value) -> MimicResult<String> {
        let block = body
            .get("content")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .ok_or_else(|| provider_error("anthropic", "no content in response"))?;

        match (block.get("type").and_then(Value::as_str), block.get("text")) {
            (Some("text"), Some(Value::String(text))) => Ok(text.clone()),
            (kind, _) => Err(provider_error(
                "anthropic",
                format!("unexpected content block type: {}", kind.unwrap_or("missing")),
            )),
        }
    }
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn supports_vision(&self) -> bool {
        false
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> MimicResult<String> {
        reject_image(self.name(), request)?;
        let url = format!("{}/v1/messages", self.base_url);
        let http = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION);
        let body = post_json(self.name(), http, &self.build_payload(request)).await?;
        Self::extract_text(&body)
    }
}
