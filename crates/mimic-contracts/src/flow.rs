//! Flow definitions: the task a persona attempts during one run.

use serde::{Deserialize, Serialize};

use crate::guardrail::GuardrailOverrides;

/// Step budget applied when a flow document does not set `max_steps`.
pub const DEFAULT_MAX_STEPS: u32 = 30;

fn default_max_steps() -> u32 {
    DEFAULT_MAX_STEPS
}

/// A scripted task with a start point, a goal, and a step budget.
///
/// Example in TOML:
/// ```toml
/// name = "checkout"
/// start_url = "/"
/// goal = "Buy the featured product"
/// success = "An order confirmation is shown"
/// max_steps = 12
///
/// [guardrail_overrides]
/// allowed_button_texts = ["place order"]
/// ```
///
/// JSON documents may use the camelCase keys (`startUrl`, `maxSteps`,
/// `guardrailOverrides`). Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flow {
    pub name: String,
    /// Path appended to the application base URL before step 1.
    #[serde(alias = "startUrl")]
    pub start_url: String,
    pub goal: String,
    /// Human-readable success criterion.
    pub success: String,
    #[serde(default, alias = "guardrailOverrides")]
    pub guardrail_overrides: Option<GuardrailOverrides>,
    #[serde(default = "default_max_steps", alias = "maxSteps")]
    pub max_steps: u32,
}
