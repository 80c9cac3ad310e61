//! Scenario 2: Guardrail Recovery
//!
//! The shopper tries to delete their account. The guardrail blocks the
//! delete button by selector, then blocks an off-domain "help" link. Each
//! block reaches the next prompt as feedback, and the shopper finally
//! declares they are stuck. Nothing destructive reaches the page.

use serde_json::json;

use mimic_contracts::error::MimicResult;

use crate::scenarios::{print_outcome, run_flow, ScenarioOutcome, ACCOUNT_CLEANUP_FLOW_TOML};
use crate::scripted::{response, ScriptedRouter};
use crate::storefront::Storefront;

pub fn script() -> Vec<String> {
    vec![
        response(
            "Account settings with a Delete account button",
            "That's exactly what I came for",
            "determined",
            json!({ "type": "click", "selector": "#delete-account" }),
        ),
        response(
            "Same settings page",
            "Maybe the help center explains how to close the account",
            "annoyed",
            json!({ "type": "navigate", "url": "https://evil.example.com/close-account-help" }),
        ),
        response(
            "Same settings page",
            "I have no other way to remove the account",
            "frustrated",
            json!({ "type": "blocked", "reason": "I cannot find a permitted way to delete my account" }),
        ),
    ]
}

pub async fn run(page: &Storefront) -> MimicResult<ScenarioOutcome> {
    run_flow(ACCOUNT_CLEANUP_FLOW_TOML, ScriptedRouter::new(script()), page).await
}

/// Run Scenario 2: Guardrail Recovery.
pub async fn run_scenario() -> MimicResult<()> {
    println!("=== Scenario 2: Guardrail Recovery ===");
    println!();

    let page = Storefront::new();
    let outcome = run(&page).await?;
    print_outcome(&outcome);

    println!("  Page actions executed: {} (start navigation only)", page.executed().len());
    println!();
    println!("  Scenario 2 complete.");
    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use mimic_contracts::execution::ExitReason;

    use super::*;

    #[tokio::test]
    async fn test_blocks_are_fed_back_and_never_executed() {
        let page = Storefront::new();
        let outcome = run(&page).await.unwrap();

        assert_eq!(outcome.result.exit_reason, ExitReason::Blocked);
        assert_eq!(outcome.result.total_steps, 3);
        assert_eq!(
            outcome.result.final_message,
            "I cannot find a permitted way to delete my account"
        );

        // Only the start navigation reached the page.
        assert_eq!(page.executed().len(), 1);
        assert_eq!(page.current_path(), "/account");

        let events = &outcome.log.guardrail_events;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].reason, "Selector matches blocklist: #delete-account");
        assert_eq!(
            events[1].reason,
            "Navigation outside allowed domains: evil.example.com"
        );
        assert!(events.iter().all(|e| !e.expected_end_of_flow));

        assert!(outcome.prompts[1].contains("Selector matches blocklist: #delete-account"));
        assert!(outcome.prompts[2].contains("outside allowed domains: evil.example.com"));
        assert!(!outcome.prompts[2].contains("#delete-account. You cannot"));
    }

    #[tokio::test]
    async fn test_blocked_steps_are_recorded() {
        let page = Storefront::new();
        let outcome = run(&page).await.unwrap();

        let blocked: Vec<bool> = outcome.log.decisions.iter().map(|d| d.guardrail_blocked).collect();
        assert_eq!(blocked, vec![true, true, false]);
        assert_eq!(outcome.log.blocked_steps(), 2);
        assert_eq!(outcome.log.actions.len(), 3);
    }
}
