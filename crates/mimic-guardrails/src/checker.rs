//! Guardrail checker implementation.
//!
//! `GuardrailChecker` holds the base `GuardrailsConfig` and implements the
//! `Guardrail` trait from mimic-core.
//!
//! Evaluation by action kind:
//!
//! 1. `done`, `blocked`, `wait`, `scroll`, `type` → pass.
//! 2. `navigate(url)`:
//!    a. Any blocked URL pattern contained in `url` → block.
//!    b. Absolute URL whose host is not an allowed domain → block.
//!    c. Unparseable URL → block (fail closed). Relative targets are
//!       resolved against a placeholder origin and only skip (b) when they
//!       stay on it.
//! 3. `click(selector)`:
//!    a. Selector equal to a base or flow-level blocked selector → block.
//!    b. Read the element text. Unreadable → pass (fail open).
//!    c. A flow-level allow term in the text → pass.
//!    d. A base or flow-level blocked term in the text → block.

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};
use url::Url;

use mimic_contracts::{
    action::Action,
    error::{MimicError, MimicResult},
    guardrail::{GuardrailCheck, GuardrailOverrides, GuardrailViolation, GuardrailsConfig},
};
use mimic_core::traits::{ElementTextReader, Guardrail};

/// Placeholder origin that relative navigation targets are resolved against.
const RELATIVE_BASE: &str = "https://relative.invalid/";
const RELATIVE_HOST: &str = "relative.invalid";

/// A `Guardrail` implementation over a fixed base policy.
///
/// Construct via `new`, `from_toml_str` or `from_file`, then pass to the
/// agent loop.
///
/// ```rust,ignore
/// use mimic_guardrails::GuardrailChecker;
///
/// let checker = GuardrailChecker::from_file(Path::new("config/guardrails.toml"))?;
/// ```
#[derive(Debug, Clone)]
pub struct GuardrailChecker {
    config: GuardrailsConfig,
}

impl GuardrailChecker {
    pub fn new(config: GuardrailsConfig) -> Self {
        Self { config }
    }

    /// Parse `s` as TOML and build a `GuardrailChecker`.
    ///
    /// Returns `MimicError::ConfigError` if the TOML is malformed or does
    /// not match `GuardrailsConfig`.
    pub fn from_toml_str(s: &str) -> MimicResult<Self> {
        let config: GuardrailsConfig = toml::from_str(s).map_err(|e| MimicError::ConfigError {
            reason: format!("failed to parse guardrails TOML: {}", e),
        })?;
        Ok(Self::new(config))
    }

    /// Read the file at `path` and parse it as TOML guardrail policy.
    pub fn from_file(path: &Path) -> MimicResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MimicError::ConfigError {
            reason: format!("failed to read guardrails file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn config(&self) -> &GuardrailsConfig {
        &self.config
    }

    /// Vet a navigation target. Pure: needs no page access.
    pub fn check_navigation(&self, target: &str) -> Result<(), GuardrailViolation> {
        if let Some(pattern) = self
            .config
            .blocked_url_patterns
            .iter()
            .find(|p| !p.is_empty() && target.contains(p.as_str()))
        {
            return Err(GuardrailViolation::BlockedPattern {
                pattern: pattern.clone(),
            });
        }

        let invalid = || GuardrailViolation::InvalidNavigationTarget {
            url: target.to_string(),
        };

        match Url::parse(target) {
            Ok(url) => self.check_host(url.host_str(), target),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                // Resolve as a browser would: "//host", "\\host" and "/\host"
                // all leave the current origin.
                let base = Url::parse(RELATIVE_BASE).map_err(|_| invalid())?;
                let resolved = base.join(target).map_err(|_| invalid())?;
                match resolved.host_str() {
                    Some(RELATIVE_HOST) => Ok(()),
                    host => self.check_host(host, target),
                }
            }
            Err(_) => Err(invalid()),
        }
    }

    fn check_host(&self, host: Option<&str>, target: &str) -> Result<(), GuardrailViolation> {
        // mailto:, javascript: and friends have no host to vet.
        let hostname = match host {
            Some(h) if !h.is_empty() => h.to_ascii_lowercase(),
            _ => {
                return Err(GuardrailViolation::OutOfPolicyDomain {
                    hostname: target.to_string(),
                })
            }
        };

        let allowed = self.config.allowed_domains.iter().any(|domain| {
            let domain = domain.trim().to_ascii_lowercase();
            !domain.is_empty()
                && (hostname == domain || hostname.ends_with(&format!(".{}", domain)))
        });

        if allowed {
            Ok(())
        } else {
            Err(GuardrailViolation::OutOfPolicyDomain { hostname })
        }
    }

    /// Vet a click: selector blocklist, then the element's visible text.
    pub async fn check_click(
        &self,
        selector: &str,
        page: &dyn ElementTextReader,
        overrides: Option<&GuardrailOverrides>,
    ) -> Result<(), GuardrailViolation> {
        let extra_selectors = overrides.map(|o| o.blocked_selectors.as_slice()).unwrap_or(&[]);
        if self
            .config
            .blocked_selectors
            .iter()
            .chain(extra_selectors)
            .any(|blocked| blocked == selector)
        {
            return Err(GuardrailViolation::BlockedSelector {
                selector: selector.to_string(),
            });
        }

        let text = match page.read_element_text(selector).await {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                debug!(selector, error = %e, "element text unreadable, allowing click");
                return Ok(());
            }
        };
        let lowered = text.to_lowercase();

        if let Some(overrides) = overrides {
            if let Some(term) = find_term(&lowered, &overrides.allowed_button_texts) {
                debug!(selector, term, "button text explicitly allowed by flow");
                return Ok(());
            }
        }

        let extra_terms = overrides.map(|o| o.blocked_button_texts.as_slice()).unwrap_or(&[]);
        let blocked_terms: Vec<String> = self
            .config
            .blocked_button_texts
            .iter()
            .chain(extra_terms)
            .cloned()
            .collect();
        if let Some(term) = find_term(&lowered, &blocked_terms) {
            return Err(GuardrailViolation::BlockedText {
                text,
                term: term.to_string(),
            });
        }

        Ok(())
    }
}

/// The first non-blank term that is a case-insensitive substring of
/// `lowered_text`.
fn find_term<'a>(lowered_text: &str, terms: &'a [String]) -> Option<&'a str> {
    terms
        .iter()
        .map(String::as_str)
        .filter(|term| !term.trim().is_empty())
        .find(|term| lowered_text.contains(&term.to_lowercase()))
}

#[async_trait]
impl Guardrail for GuardrailChecker {
    async fn check(
        &self,
        action: &Action,
        page: &dyn ElementTextReader,
        overrides: Option<&GuardrailOverrides>,
    ) -> GuardrailCheck {
        let outcome = match action {
            Action::Navigate { url } => self.check_navigation(url),
            Action::Click { selector } => self.check_click(selector, page, overrides).await,
            Action::Done { .. }
            | Action::Blocked { .. }
            | Action::Wait { .. }
            | Action::Scroll { .. }
            | Action::Type { .. } => Ok(()),
        };

        match outcome {
            Ok(()) => GuardrailCheck::allow(),
            Err(violation) => {
                warn!(action = %action, reason = %violation, "guardrail violation");
                violation.into()
            }
        }
    }
}
