//! Scenario 5: Step Budget
//!
//! The shopper scrolls forever without deciding. The browse flow allows
//! three steps, after which the run ends with `max_steps`.

use serde_json::json;

use mimic_contracts::error::MimicResult;

use crate::scenarios::{print_outcome, run_flow, ScenarioOutcome, BROWSE_FLOW_TOML};
use crate::scripted::{response, ScriptedRouter};
use crate::storefront::Storefront;

pub fn router() -> ScriptedRouter {
    ScriptedRouter::new(Vec::<String>::new()).repeating(response(
        "A long home page",
        "Keep scrolling, something interesting may be further down",
        "bored",
        json!({ "type": "scroll", "direction": "down" }),
    ))
}

pub async fn run(page: &Storefront) -> MimicResult<ScenarioOutcome> {
    run_flow(BROWSE_FLOW_TOML, router(), page).await
}

/// Run Scenario 5: Step Budget.
pub async fn run_scenario() -> MimicResult<()> {
    println!("=== Scenario 5: Step Budget ===");
    println!();

    let page = Storefront::new();
    let outcome = run(&page).await?;
    print_outcome(&outcome);

    println!("  Scenario 5 complete.");
    println!();
    Ok(())
}
