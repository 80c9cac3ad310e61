//! Model-routing configuration.
//!
//! Loaded once at process start and passed by reference to the router
//! constructor. Each task type names the provider and model serving it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Google,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Google => "google",
        }
    }
}

fn default_max_tokens() -> u32 {
    4096
}

/// Provider and model for one task type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default = "default_max_tokens", alias = "maxTokens")]
    pub max_tokens: u32,
}

/// Example in TOML:
/// ```toml
/// [vision]
/// provider = "openai"
/// model = "gpt-4o"
///
/// [reasoning]
/// provider = "anthropic"
/// model = "claude-sonnet-4-5"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Describes screenshots. The provider must accept images.
    pub vision: ModelConfig,
    /// Decides the next action.
    pub reasoning: ModelConfig,
}
