//! Scenario 3: Unparseable Response
//!
//! The reasoning model answers in prose with no JSON object. The parser
//! fails, the loop records the fallback decision (confused, blocked) and the
//! run ends after one step.

use mimic_contracts::error::MimicResult;

use crate::scenarios::{print_outcome, run_flow, ScenarioOutcome, BROWSE_FLOW_TOML};
use crate::scripted::ScriptedRouter;
use crate::storefront::Storefront;

pub const PROSE_RESPONSE: &str =
    "I see the home page. I would probably click the big Shop now button next.";

pub async fn run(page: &Storefront) -> MimicResult<ScenarioOutcome> {
    run_flow(BROWSE_FLOW_TOML, ScriptedRouter::new([PROSE_RESPONSE]), page).await
}

/// Run Scenario 3: Unparseable Response.
pub async fn run_scenario() -> MimicResult<()> {
    println!("=== Scenario 3: Unparseable Response ===");
    println!();

    let page = Storefront::new();
    let outcome = run(&page).await?;
    print_outcome(&outcome);

    if let Some(decision) = outcome.log.decisions.first() {
        println!("  Recorded emotion:   {}", decision.emotion);
        println!("  Recorded reasoning: {}", decision.reasoning);
        println!();
    }
    println!("  Scenario 3 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use mimic_contracts::execution::ExitReason;
    use mimic_core::parser::{FALLBACK_BLOCKED_REASON, FALLBACK_EMOTION, FALLBACK_REASONING};

    use super::*;

    #[tokio::test]
    async fn test_prose_falls_back_to_confused_blocked() {
        let page = Storefront::new();
        let outcome = run(&page).await.unwrap();

        assert_eq!(outcome.result.exit_reason, ExitReason::Blocked);
        assert_eq!(outcome.result.total_steps, 1);
        assert_eq!(outcome.result.final_message, FALLBACK_BLOCKED_REASON);

        let decision = &outcome.log.decisions[0];
        assert_eq!(decision.action.kind(), "blocked");
        assert_eq!(decision.emotion, FALLBACK_EMOTION);
        assert_eq!(decision.reasoning, FALLBACK_REASONING);
        // The observation is the screen description, not the model's prose.
        assert!(decision.observation.contains("Paper & Co. | Home"));
        assert!(!decision.guardrail_blocked);
    }
}
