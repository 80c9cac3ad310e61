//! OpenAI chat completions. The only provider that accepts screenshots.

use async_trait::async_trait;
use serde_json::{json, Value};

use mimic_contracts::error::MimicResult;

use crate::provider::{post_json, provider_error, CompletionRequest, ModelProvider};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_tokens: u32,
    base_url: String,
}

impl OpenAiProvider {
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

    /// The request body for `request`. Images travel as a high-detail data URL.
    pub fn build_payload(&self, request: &CompletionRequest<'_>) -> Value {
        let user_content = match request.image {
            Some(image) if !image.is_empty() => json!([
                { "type": "text", "text": request.user_message },
                {
                    "type": "image_url",
                    "image_url": {
                        "url": format!("data:image/png;base64,{}", image),
                        "detail": "high"
                    }
                }
            ]),
            _ => json!(request.user_message),
        };

        json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": user_content }
            ]
        })
    }

    /// Pull the first choice's text out of a response body.
    ///
    /// A `null` content (refusals, tool-only replies) decodes as empty text.
    pub fn extract_text(body: &Value) -> MimicResult<String> {
        let message = body
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
            .and_then(|c| c.get("message"))
            .ok_or_else(|| provider_error("openai", "no choices in response"))?;

        match message.get("content") {
            Some(Value::String(text)) => Ok(text.clone()),
            Some(Value::Null) | None => Ok(String::new()),
            Some(other) => Err(provider_error(
                "openai",
                format!("unexpected message content: {}", other),
            )),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    fn supports_vision(&self) -> bool {
        true
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest<'_>) -> MimicResult<String> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let http = self.client.post(&url).bearer_auth(&self.api_key);
        let body = post_json(self.name(), http, &self.build_payload(request)).await?;
        Self::extract_text(&body)
    }
}
