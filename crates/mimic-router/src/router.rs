//! The task router: one provider for vision, one for reasoning.
//!
//! Providers are chosen once, in `Router::from_config`. Nothing after
//! construction inspects provider names.

use async_trait::async_trait;
use tracing::{debug, info};

use mimic_contracts::{
    error::{MimicError, MimicResult},
    models::{ModelConfig, ModelsConfig, ProviderKind},
};
use mimic_core::traits::ModelRouter;

use crate::{
    credentials::Credentials,
    provider::{CompletionRequest, ModelProvider},
    providers::{AnthropicProvider, GoogleProvider, OpenAiProvider},
};

pub struct Router {
    vision: Box<dyn ModelProvider>,
    reasoning: Box<dyn ModelProvider>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("vision", &format_args!("{}/{}", self.vision.name(), self.vision.model()))
            .field("reasoning", &format_args!("{}/{}", self.reasoning.name(), self.reasoning.model()))
            .finish()
    }
}

impl Router {
    /// Wire explicit providers.
    ///
    /// Returns `MimicError::ConfigError` if `vision` cannot accept images.
    pub fn new(
        vision: Box<dyn ModelProvider>,
        reasoning: Box<dyn ModelProvider>,
    ) -> MimicResult<Self> {
        if !vision.supports_vision() {
            return Err(MimicError::ConfigError {
                reason: format!("vision not supported for provider: {}", vision.name()),
            });
        }
        Ok(Self { vision, reasoning })
    }

    /// Build both providers from `config`, using keys from `credentials`.
    pub fn from_config(config: &ModelsConfig, credentials: &Credentials) -> MimicResult<Self> {
        let vision = build_provider(&config.vision, credentials)?;
        let reasoning = build_provider(&config.reasoning, credentials)?;
        let router = Self::new(vision, reasoning)?;
        info!(router = ?router, "model router configured");
        Ok(router)
    }

    pub fn vision_provider(&self) -> &dyn ModelProvider {
        self.vision.as_ref()
    }

    pub fn reasoning_provider(&self) -> &dyn ModelProvider {
        self.reasoning.as_ref()
    }
}

fn build_provider(
    config: &ModelConfig,
    credentials: &Credentials,
) -> MimicResult<Box<dyn ModelProvider>> {
    let key = credentials
        .key_for(config.provider)
        .ok_or_else(|| MimicError::ConfigError {
            reason: format!(
                "missing API key for provider '{}': set {}",
                config.provider.as_str(),
                Credentials::env_var(config.provider)
            ),
        })?;

    let provider: Box<dyn ModelProvider> = match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(key, &config.model, config.max_tokens)),
        ProviderKind::Anthropic => {
            Box::new(AnthropicProvider::new(key, &config.model, config.max_tokens))
        }
        ProviderKind::Google => Box::new(GoogleProvider::new(key, &config.model, config.max_tokens)),
    };
    Ok(provider)
}

#[async_trait]
impl ModelRouter for Router {
    async fn describe_screen(
        &self,
        system_prompt: &str,
        instruction: &str,
        image: &str,
    ) -> MimicResult<String> {
        debug!(provider = self.vision.name(), model = self.vision.model(), "vision call");
        self.vision
            .complete(&CompletionRequest::with_image(system_prompt, instruction, image))
            .await
    }

    async fn decide_next(&self, system_prompt: &str, user_message: &str) -> MimicResult<String> {
        debug!(provider = self.reasoning.name(), model = self.reasoning.model(), "reasoning call");
        self.reasoning
            .complete(&CompletionRequest::text(system_prompt, user_message))
            .await
    }
}
