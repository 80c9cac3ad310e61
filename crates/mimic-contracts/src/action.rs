//! The closed set of interactions a synthetic user may propose.
//!
//! An `Action` is what the reasoning model asks for at the end of every step.
//! It is the unit the guardrail checker vets and the page driver executes.
//! `Done` and `Blocked` are terminal signals to the agent loop and never
//! reach the page.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{MimicError, MimicResult};

/// Scroll direction for `Action::Scroll`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
}

/// One proposed interaction, tagged by `type` on the wire.
///
/// Example in JSON:
/// ```json
/// { "type": "click", "selector": "button:has-text(\"Checkout\")" }
/// { "type": "done", "reason": "order confirmation is visible" }
/// ```
///
/// The field set of every variant is closed: a `click` carrying `text` is
/// malformed, not a click with an ignored extra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", deny_unknown_fields)]
pub enum Action {
    Click { selector: String },
    Type { selector: String, text: String },
    Scroll { direction: ScrollDirection },
    Navigate { url: String },
    /// Always finite and non-negative when built by `from_json`.
    Wait { seconds: f64 },
    Done { reason: String },
    Blocked { reason: String },
}

impl Action {
    /// Parse an untrusted JSON value into an `Action`.
    ///
    /// Returns `MimicError::MalformedAction` for an unknown `type`, a missing
    /// field, an extra field, a field of the wrong type, or a `wait` whose
    /// `seconds` is negative or not finite.
    pub fn from_json(value: &serde_json::Value) -> MimicResult<Self> {
        if !value.is_object() {
            return Err(MimicError::MalformedAction {
                reason: format!("expected an object, got {}", value),
            });
        }
        let action: Action =
            serde_json::from_value(value.clone()).map_err(|e| MimicError::MalformedAction {
                reason: e.to_string(),
            })?;

        if let Action::Wait { seconds } = action {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(MimicError::MalformedAction {
                    reason: format!("wait seconds must be a non-negative number, got {}", seconds),
                });
            }
        }
        Ok(action)
    }

    /// The lowercase `type` tag of this action.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Click { .. } => "click",
            Action::Type { .. } => "type",
            Action::Scroll { .. } => "scroll",
            Action::Navigate { .. } => "navigate",
            Action::Wait { .. } => "wait",
            Action::Done { .. } => "done",
            Action::Blocked { .. } => "blocked",
        }
    }

    /// True for `Done` and `Blocked`, the only decisions that end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Action::Done { .. } | Action::Blocked { .. })
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Click { selector } => write!(f, "click({selector})"),
            Action::Type { selector, text } => write!(f, "type({selector}, {text:?})"),
            Action::Scroll { direction } => match direction {
                ScrollDirection::Up => write!(f, "scroll(up)"),
                ScrollDirection::Down => write!(f, "scroll(down)"),
            },
            Action::Navigate { url } => write!(f, "navigate({url})"),
            Action::Wait { seconds } => write!(f, "wait({seconds}s)"),
            Action::Done { reason } => write!(f, "done({reason})"),
            Action::Blocked { reason } => write!(f, "blocked({reason})"),
        }
    }
}
