//! Reference storefront scenarios.
//!
//! Each scenario wires real MIMIC components (guardrail checker, run logger,
//! agent loop) to the simulated storefront and a scripted router, then
//! prints what happened. The shared wiring lives in this module.

pub mod checkout;
pub mod flaky_selector;
pub mod guardrail_recovery;
pub mod step_budget;
pub mod unparseable_response;

use std::sync::{Arc, Mutex};

use mimic_contracts::{
    error::MimicResult,
    execution::{AgentLoopResult, RunId},
    flow::Flow,
    persona::Persona,
};
use mimic_core::{AgentLoop, LoopConfig};
use mimic_guardrails::GuardrailChecker;
use mimic_recording::{RunLog, RunLogger};

use crate::{scripted::ScriptedRouter, storefront::{Storefront, BASE_URL}};

// ── Embedded fixtures ─────────────────────────────────────────────────────────

pub const GUARDRAILS_TOML: &str = include_str!("../../fixtures/config/guardrails.toml");
pub const SHOPPER_PERSONA_TOML: &str = include_str!("../../fixtures/personas/shopper.toml");
pub const CHECKOUT_FLOW_TOML: &str = include_str!("../../fixtures/flows/checkout.toml");
pub const ACCOUNT_CLEANUP_FLOW_TOML: &str = include_str!("../../fixtures/flows/account-cleanup.toml");
pub const BROWSE_FLOW_TOML: &str = include_str!("../../fixtures/flows/browse.toml");

// ── Shared wiring ─────────────────────────────────────────────────────────────

/// Everything a scenario run leaves behind.
#[derive(Debug)]
pub struct ScenarioOutcome {
    pub result: AgentLoopResult,
    pub log: RunLog,
    /// Reasoning prompts, one per step.
    pub prompts: Vec<String>,
}

pub fn shopper() -> MimicResult<Persona> {
    mimic_config::from_toml_str(SHOPPER_PERSONA_TOML, "shopper persona")
}

pub fn flow(toml: &str) -> MimicResult<Flow> {
    mimic_config::from_toml_str(toml, "scenario flow")
}

/// Run the shopper through `flow_toml` on `page`, deciding via `router`.
pub async fn run_flow(
    flow_toml: &str,
    router: ScriptedRouter,
    page: &Storefront,
) -> MimicResult<ScenarioOutcome> {
    let persona = shopper()?;
    let flow = flow(flow_toml)?;
    let guardrails = GuardrailChecker::from_toml_str(GUARDRAILS_TOML)?;

    // Keep handles to the logger and prompts; the loop consumes the boxes.
    let logger = RunLogger::new(RunId::new(&persona.id, &flow.name));
    let prompts: Arc<Mutex<Vec<String>>> = router.prompts();

    let agent = AgentLoop::new(
        Box::new(router),
        Box::new(guardrails),
        Box::new(logger.clone()),
        LoopConfig::with_base_url(BASE_URL),
    );
    let result = agent.run(page, &persona, &flow).await?;

    let prompts = prompts
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    Ok(ScenarioOutcome {
        result,
        log: logger.export_log(),
        prompts,
    })
}

/// Print the per-step trail and the final result.
pub fn print_outcome(outcome: &ScenarioOutcome) {
    for decision in &outcome.log.decisions {
        println!(
            "  Step {:>2}: {:<40} {}",
            decision.step,
            decision.action.to_string(),
            if decision.guardrail_blocked { "BLOCKED" } else { "" }
        );
    }
    for event in &outcome.log.guardrail_events {
        println!("  Guardrail (step {}): {}", event.step, event.reason);
    }
    println!();
    println!("  Exit reason:   {}", outcome.result.exit_reason);
    println!("  Total steps:   {}", outcome.result.total_steps);
    println!("  Final message: {}", outcome.result.final_message);
    println!();
}
