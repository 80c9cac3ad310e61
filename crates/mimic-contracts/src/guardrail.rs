//! Guardrail policy, check results, and block events.
//!
//! `GuardrailsConfig` is the process-wide base policy. A flow may extend it
//! through `GuardrailOverrides` but can never remove a base rule.
//! `GuardrailCheck` is transient: it is folded into a `Decision` and, when
//! blocked, into a `GuardrailEvent`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::Action;

/// Base guardrail policy, loaded once per process.
///
/// Example in TOML:
/// ```toml
/// blocked_button_texts = ["delete", "close account"]
/// blocked_selectors = ["#delete-account"]
/// blocked_url_patterns = ["/logout", "/admin"]
/// allowed_domains = ["shop.example.com"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardrailsConfig {
    /// Case-insensitive substrings of element text that block a click.
    #[serde(alias = "blockedButtonTexts")]
    pub blocked_button_texts: Vec<String>,
    /// Selectors that block a click on exact string equality.
    #[serde(alias = "blockedSelectors")]
    pub blocked_selectors: Vec<String>,
    /// Substrings that block a navigation target.
    #[serde(alias = "blockedUrlPatterns")]
    pub blocked_url_patterns: Vec<String>,
    /// Hostnames (and their subdomains) an absolute navigation may target.
    #[serde(alias = "allowedDomains")]
    pub allowed_domains: Vec<String>,
}

/// Flow-level additions to the base policy.
///
/// Unknown keys are rejected so a misspelled list never silently drops a rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardrailOverrides {
    /// Element-text terms that let a click through even if a blocked term
    /// also matches.
    #[serde(alias = "allowedButtonTexts")]
    pub allowed_button_texts: Vec<String>,
    /// Extra blocked text terms, unioned with the base list.
    #[serde(alias = "blockedButtonTexts")]
    pub blocked_button_texts: Vec<String>,
    /// Extra blocked selectors, unioned with the base list.
    #[serde(alias = "blockedSelectors")]
    pub blocked_selectors: Vec<String>,
}

/// Why a guardrail refused an action.
///
/// The `Display` text of each variant is the reason shown to the reasoning
/// model and written into the `GuardrailEvent`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardrailViolation {
    #[error("URL matches blocked pattern: {pattern}")]
    BlockedPattern { pattern: String },

    #[error("Navigation outside allowed domains: {hostname}")]
    OutOfPolicyDomain { hostname: String },

    #[error("Invalid URL: {url}")]
    InvalidNavigationTarget { url: String },

    #[error("Selector matches blocklist: {selector}")]
    BlockedSelector { selector: String },

    #[error("Button text matches blocklist: \"{text}\" contains \"{term}\"")]
    BlockedText { text: String, term: String },
}

/// The outcome of vetting one action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailCheck {
    pub blocked: bool,
    /// Empty when the action is allowed.
    pub reason: String,
}

impl GuardrailCheck {
    /// A passing check.
    pub fn allow() -> Self {
        Self {
            blocked: false,
            reason: String::new(),
        }
    }
}

impl From<GuardrailViolation> for GuardrailCheck {
    fn from(violation: GuardrailViolation) -> Self {
        Self {
            blocked: true,
            reason: violation.to_string(),
        }
    }
}

/// Emitted to the run sink whenever a guardrail blocks an action.
///
/// Serialized with camelCase keys (`intendedAction`, `expectedEndOfFlow`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardrailEvent {
    pub step: u32,
    pub timestamp: DateTime<Utc>,
    /// The action the agent wanted to take.
    pub intended_action: Action,
    pub reason: String,
    /// Screenshot reference of the step that was blocked.
    pub screenshot: String,
    /// True when the blocked action was `done`: the agent believed the flow
    /// was over, which usually marks an over-eager guardrail.
    pub expected_end_of_flow: bool,
}
