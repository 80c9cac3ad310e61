//! # mimic-ref-storefront
//!
//! Reference storefront for the MIMIC synthetic-user runtime.
//!
//! Demonstrates five scenarios against a simulated shop:
//!
//! 1. **Checkout**: a full purchase, allowed through by a flow override.
//! 2. **Guardrail Recovery**: a blocked selector and an off-domain link,
//!    each fed back to the next prompt.
//! 3. **Unparseable Response**: prose instead of JSON, handled by the
//!    fallback decision.
//! 4. **Flaky Selector**: fail-open on unreadable text, then an execution
//!    error fed back.
//! 5. **Step Budget**: a run that never decides, stopped by `max_steps`.
//!
//! All shop content is hardcoded and fictional. No external API calls are
//! made; decisions come from `ScriptedRouter`.

pub mod scenarios;
pub mod scripted;
pub mod site;
pub mod storefront;

pub use scripted::ScriptedRouter;
pub use storefront::{Storefront, BASE_URL};
