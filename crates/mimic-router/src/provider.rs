//! The provider capability trait and the HTTP plumbing its variants share.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use mimic_contracts::error::{MimicError, MimicResult};

/// One completion call.
#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub user_message: &'a str,
    /// Base64 PNG attached to the user message, if any.
    pub image: Option<&'a str>,
}

impl<'a> CompletionRequest<'a> {
    pub fn text(system_prompt: &'a str, user_message: &'a str) -> Self {
        Self {
            system_prompt,
            user_message,
            image: None,
        }
    }

    pub fn with_image(system_prompt: &'a str, user_message: &'a str, image: &'a str) -> Self {
        Self {
            system_prompt,
            user_message,
            image: Some(image),
        }
    }
}

/// A hosted model behind one vendor API.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Stable provider name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Whether `complete` accepts `CompletionRequest::image`.
    fn supports_vision(&self) -> bool;

    /// The model identifier requests are sent to.
    fn model(&self) -> &str;

    async fn complete(&self, request: &CompletionRequest<'_>) -> MimicResult<String>;
}

pub(crate) fn provider_error(provider: &str, reason: impl Into<String>) -> MimicError {
    MimicError::Provider {
        provider: provider.to_string(),
        reason: reason.into(),
    }
}

/// Refuse an image for a text-only provider.
pub(crate) fn reject_image(provider: &str, request: &CompletionRequest<'_>) -> MimicResult<()> {
    match request.image {
        Some(_) => Err(provider_error(provider, "provider does not accept images")),
        None => Ok(()),
    }
}

const MAX_ERROR_BODY: usize = 500;

/// Send `payload` and decode a JSON body, mapping every failure to
/// `MimicError::Provider`.
pub(crate) async fn post_json(
    provider: &str,
    request: reqwest::RequestBuilder,
    payload: &Value,
) -> MimicResult<Value> {
    let response = request
        .json(payload)
        .send()
        .await
        .map_err(|e| provider_error(provider, format!("request failed: {}", e)))?;

    let status = response.status();
    debug!(provider, status = status.as_u16(), "provider responded");

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let body: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(provider_error(provider, format!("HTTP {}: {}", status.as_u16(), body)));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| provider_error(provider, format!("invalid response body: {}", e)))
}
