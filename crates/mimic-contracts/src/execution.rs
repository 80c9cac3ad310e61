//! Run-level types: loop state, exit summary, run identity, screenshots.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The agent declared the task complete.
    Done,
    /// The agent declared it cannot proceed.
    Blocked,
    /// The step budget ran out.
    MaxSteps,
    /// Reserved. No loop path produces it.
    GuardrailCritical,
}

impl ExitReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::Done => "done",
            ExitReason::Blocked => "blocked",
            ExitReason::MaxSteps => "max_steps",
            ExitReason::GuardrailCritical => "guardrail_critical",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal summary returned by the agent loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentLoopResult {
    pub exit_reason: ExitReason,
    /// Steps taken; always equals the number of decisions recorded.
    pub total_steps: u32,
    pub final_message: String,
}

/// States of the agent loop state machine.
///
/// A run starts in `Running { step: 1 }` and ends in exactly one of the
/// three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running { step: u32 },
    Done,
    Blocked,
    MaxStepsReached,
}

impl LoopState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LoopState::Running { .. })
    }

    /// The exit reason for a terminal state, `None` while running.
    pub fn exit_reason(&self) -> Option<ExitReason> {
        match self {
            LoopState::Running { .. } => None,
            LoopState::Done => Some(ExitReason::Done),
            LoopState::Blocked => Some(ExitReason::Blocked),
            LoopState::MaxStepsReached => Some(ExitReason::MaxSteps),
        }
    }
}

/// A captured screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screenshot {
    /// File name the image is stored under, e.g. `step-003.png`.
    pub reference: String,
    /// Base64-encoded image data handed to the vision model.
    pub encoded: String,
}

impl Screenshot {
    /// The canonical file name for a step's screenshot.
    pub fn reference_for(step: u32) -> String {
        format!("step-{:03}.png", step)
    }
}

/// Identifier of one run: `<timestamp>_<persona>_<flow>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new(persona_id: &str, flow_name: &str) -> Self {
        Self::at(Utc::now(), persona_id, flow_name)
    }

    pub fn at(started: DateTime<Utc>, persona_id: &str, flow_name: &str) -> Self {
        Self(format!(
            "{}_{}_{}",
            started.format("%Y-%m-%dT%H-%M-%S"),
            persona_id,
            flow_name
        ))
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
