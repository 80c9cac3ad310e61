//! The exported run log and its on-disk layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mimic_contracts::{
    decision::{ActionLogEntry, Decision},
    guardrail::GuardrailEvent,
};

/// Every decision, in step order.
pub const DECISION_LOG_FILE: &str = "decision-log.json";
/// The condensed action trail.
pub const ACTION_LOG_FILE: &str = "action-log.json";
/// Guardrail blocks; written only when there were any.
pub const GUARDRAIL_EVENTS_FILE: &str = "guardrail-events.json";

/// A snapshot of everything recorded for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunLog {
    pub run_id: String,
    pub decisions: Vec<Decision>,
    pub actions: Vec<ActionLogEntry>,
    pub guardrail_events: Vec<GuardrailEvent>,
    pub exported_at: DateTime<Utc>,
}

impl RunLog {
    /// Number of steps that were blocked by a guardrail.
    pub fn blocked_steps(&self) -> usize {
        self.decisions.iter().filter(|d| d.guardrail_blocked).count()
    }
}
