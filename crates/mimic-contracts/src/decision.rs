//! Per-step records: the decision audit trail and the action log.
//!
//! `Decision` is appended once per completed step, blocked or not. The
//! ordered sequence is both the run's audit trail and the history window fed
//! back into the reasoning prompt. `ActionLogEntry` is the slimmer per-step
//! record written alongside it. Both serialize with camelCase keys, the
//! schema downstream report tooling reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::action::Action;

/// One completed observe → decide → validate step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// Step index, starting at 1.
    pub step: u32,
    pub timestamp: DateTime<Utc>,
    /// Page URL when the step began.
    pub url: String,
    /// Screenshot reference (file name) captured for this step.
    pub screenshot: String,
    pub observation: String,
    pub reasoning: String,
    pub emotion: String,
    /// The proposed action, whether or not it was executed.
    pub action: Action,
    pub guardrail_blocked: bool,
}

/// One entry of the action log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub step: u32,
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub url: String,
    pub guardrail_blocked: bool,
}

impl From<&Decision> for ActionLogEntry {
    fn from(decision: &Decision) -> Self {
        Self {
            step: decision.step,
            timestamp: decision.timestamp,
            action: decision.action.clone(),
            url: decision.url.clone(),
            guardrail_blocked: decision.guardrail_blocked,
        }
    }
}
