//! Decision parser: structured decisions from free-text model output.
//!
//! Reasoning models wrap their JSON in prose or markdown fences often enough
//! that the parser has to dig for it. `parse_decision` finds the first
//! balanced `{...}` span, parses it, and validates the action strictly.
//! Failures are returned as `ParseFailure`; the loop then takes the
//! `ParsedDecision::fallback` branch so every step still yields a decision.

use serde::Deserialize;
use thiserror::Error;

use mimic_contracts::action::Action;

/// Reasoning text used by the fallback decision.
pub const FALLBACK_REASONING: &str = "Failed to parse reasoning";
/// Emotion used by the fallback decision.
pub const FALLBACK_EMOTION: &str = "confused";
/// Reason carried by the fallback `blocked` action.
pub const FALLBACK_BLOCKED_REASON: &str = "Failed to parse LLM response";

/// The fields the loop needs from one reasoning response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDecision {
    pub observation: String,
    pub reasoning: String,
    pub emotion: String,
    pub action: Action,
}

impl ParsedDecision {
    /// The synthetic decision used when a response cannot be parsed.
    ///
    /// Its `blocked` action ends the run unless a guardrail intervenes, which
    /// turns a parser fault into an ordinary terminal step.
    pub fn fallback(screen_description: &str) -> Self {
        Self {
            observation: screen_description.to_string(),
            reasoning: FALLBACK_REASONING.to_string(),
            emotion: FALLBACK_EMOTION.to_string(),
            action: Action::Blocked {
                reason: FALLBACK_BLOCKED_REASON.to_string(),
            },
        }
    }
}

/// Why a response could not be turned into a `ParsedDecision`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("no JSON object found in response")]
    NoJsonSpan,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("response has no action")]
    MissingAction,

    #[error("malformed action: {0}")]
    MalformedAction(String),
}

#[derive(Deserialize)]
struct RawDecision {
    #[serde(default)]
    observation: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    emotion: Option<String>,
    #[serde(default)]
    action: Option<serde_json::Value>,
}

/// Parse a raw reasoning response.
pub fn parse_decision(raw: &str) -> Result<ParsedDecision, ParseFailure> {
    let span = extract_json_span(raw).ok_or(ParseFailure::NoJsonSpan)?;

    let decoded: RawDecision =
        serde_json::from_str(span).map_err(|e| ParseFailure::InvalidJson(e.to_string()))?;

    let action_value = match decoded.action {
        Some(v) if !v.is_null() => v,
        _ => return Err(ParseFailure::MissingAction),
    };
    let action = Action::from_json(&action_value)
        .map_err(|e| ParseFailure::MalformedAction(e.to_string()))?;

    Ok(ParsedDecision {
        observation: decoded.observation.unwrap_or_default(),
        reasoning: decoded.reasoning.unwrap_or_default(),
        emotion: decoded.emotion.unwrap_or_default(),
        action,
    })
}

/// Return the first balanced `{...}` span of `text`.
///
/// Braces inside JSON string literals do not count toward nesting. Returns
/// `None` when there is no `{` or the first object never closes.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}
