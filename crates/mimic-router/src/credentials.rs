//! Provider API keys.

use mimic_contracts::models::ProviderKind;

pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
pub const GOOGLE_AI_API_KEY: &str = "GOOGLE_AI_API_KEY";

/// API keys for each provider. Blank keys count as absent.
#[derive(Clone, Default)]
pub struct Credentials {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub google: Option<String>,
}

impl Credentials {
    /// Read every key from the process environment.
    pub fn from_env() -> Self {
        let read = |var: &str| std::env::var(var).ok();
        Self {
            openai: read(OPENAI_API_KEY),
            anthropic: read(ANTHROPIC_API_KEY),
            google: read(GOOGLE_AI_API_KEY),
        }
    }

    pub fn key_for(&self, provider: ProviderKind) -> Option<&str> {
        let key = match provider {
            ProviderKind::OpenAi => &self.openai,
            ProviderKind::Anthropic => &self.anthropic,
            ProviderKind::Google => &self.google,
        };
        key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    /// The environment variable that holds the key for `provider`.
    pub fn env_var(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::OpenAi => OPENAI_API_KEY,
            ProviderKind::Anthropic => ANTHROPIC_API_KEY,
            ProviderKind::Google => GOOGLE_AI_API_KEY,
        }
    }
}

// Keys never reach logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("openai", &self.openai.as_ref().map(|_| "<redacted>"))
            .field("anthropic", &self.anthropic.as_ref().map(|_| "<redacted>"))
            .field("google", &self.google.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
