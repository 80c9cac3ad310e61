//! Scenario 4: Flaky Selector
//!
//! The promo banner detaches whenever it is touched. Its text cannot be
//! read, so the guardrail fails open even though the banner's label
//! contains a blocked term. The click itself then fails, the error is fed
//! back, and the shopper goes to the cart by navigation instead.

use serde_json::json;

use mimic_contracts::error::MimicResult;

use crate::scenarios::{print_outcome, run_flow, ScenarioOutcome, CHECKOUT_FLOW_TOML};
use crate::scripted::{response, ScriptedRouter};
use crate::storefront::Storefront;

pub const FLAKY_SELECTOR: &str = "#promo-banner";

pub fn script() -> Vec<String> {
    vec![
        response(
            "A product page with a sale banner",
            "The sale banner might have a better price",
            "curious",
            json!({ "type": "click", "selector": FLAKY_SELECTOR }),
        ),
        response(
            "Nothing changed after clicking the banner",
            "Forget the sale, go straight to the cart",
            "irritated",
            json!({ "type": "navigate", "url": "/cart" }),
        ),
        response(
            "An empty cart page",
            "I found the cart, which is all I wanted to check",
            "neutral",
            json!({ "type": "done", "reason": "Reached the cart" }),
        ),
    ]
}

pub fn storefront() -> Storefront {
    Storefront::new().with_flaky(FLAKY_SELECTOR)
}

pub async fn run(page: &Storefront) -> MimicResult<ScenarioOutcome> {
    run_flow(CHECKOUT_FLOW_TOML, ScriptedRouter::new(script()), page).await
}

/// Run Scenario 4: Flaky Selector.
pub async fn run_scenario() -> MimicResult<()> {
    println!("=== Scenario 4: Flaky Selector ===");
    println!();

    let page = storefront();
    let outcome = run(&page).await?;
    print_outcome(&outcome);

    println!("  Scenario 4 complete.");
    println!();
    Ok(())
}
