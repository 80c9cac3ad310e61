//! Scenario 1: Checkout
//!
//! The shopper buys a pack of paper end to end. "Place order" is a blocked
//! button text in the base policy; the checkout flow allows it, so the
//! purchase goes through with no guardrail events.
//!
//!   1. add to cart → 2. open cart → 3. proceed to checkout
//!   4-5. fill the form → 6. place order → 7. done

use serde_json::json;

use mimic_contracts::error::MimicResult;

use crate::scenarios::{print_outcome, run_flow, ScenarioOutcome, CHECKOUT_FLOW_TOML};
use crate::scripted::{response, ScriptedRouter};
use crate::storefront::Storefront;

pub fn script() -> Vec<String> {
    vec![
        response(
            "A product page for A4 printer paper with an Add to cart button",
            "This is the paper I need, I'll add it",
            "focused",
            json!({ "type": "click", "selector": "#add-paper" }),
        ),
        response(
            "Still on the product page; the cart link is in the navigation",
            "Go to the cart to pay",
            "confident",
            json!({ "type": "click", "selector": "#nav-cart" }),
        ),
        response(
            "My cart shows one item",
            "Proceed to checkout",
            "confident",
            json!({ "type": "click", "selector": "#checkout" }),
        ),
        response(
            "A checkout form with email and address fields",
            "Fill in my work email first",
            "neutral",
            json!({ "type": "type", "selector": "#email", "text": "sam@office.test" }),
        ),
        response(
            "Email filled in, address still empty",
            "Add the studio address",
            "neutral",
            json!({ "type": "type", "selector": "#address", "text": "12 Harbor Street" }),
        ),
        response(
            "Both fields are filled and the Place order button is visible",
            "Everything looks right, place the order",
            "relieved",
            json!({ "type": "click", "selector": "#place-order" }),
        ),
        response(
            "Thank you page with order #1001",
            "The order went through",
            "satisfied",
            json!({ "type": "done", "reason": "Order #1001 is confirmed" }),
        ),
    ]
}

pub async fn run(page: &Storefront) -> MimicResult<ScenarioOutcome> {
    run_flow(CHECKOUT_FLOW_TOML, ScriptedRouter::new(script()), page).await
}

/// Run Scenario 1: Checkout.
pub async fn run_scenario() -> MimicResult<()> {
    println!("=== Scenario 1: Checkout ===");
    println!();

    let page = Storefront::new();
    let outcome = run(&page).await?;
    print_outcome(&outcome);

    println!("  Order number:  {}", page.order_number().map_or("none".to_string(), |n| format!("#{}", n)));
    println!();
    println!("  Scenario 1 complete.");
    println!();
    Ok(())
}
