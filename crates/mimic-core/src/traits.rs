//! Collaborator traits for the MIMIC agent loop.
//!
//! These traits define every boundary the loop touches:
//!
//! - `PageDriver`: the live application (screen capture, element reads, execution)
//! - `ModelRouter`: untrusted reasoning (vision description, next-action decision)
//! - `Guardrail`: trusted gate (evaluated before any action reaches the page)
//! - `RunSink`: trusted recorder (receives every decision in order)
//!
//! The loop wires them together in a fixed order. Nothing proposed by the
//! router reaches `PageDriver::execute()` unless `Guardrail::check()` passed.

use std::time::Duration;

use async_trait::async_trait;

use mimic_contracts::{
    action::Action,
    decision::{ActionLogEntry, Decision},
    error::MimicResult,
    execution::Screenshot,
    guardrail::{GuardrailCheck, GuardrailEvent, GuardrailOverrides},
};

/// Read-only access to element text on the current page.
///
/// This is the only page capability the guardrail checker needs.
#[async_trait]
pub trait ElementTextReader: Send + Sync {
    /// Return the text content of the element matched by `selector`.
    ///
    /// Fails with `MimicError::ElementUnreadable` when the element is missing,
    /// stale, or cannot be read in time.
    async fn read_element_text(&self, selector: &str) -> MimicResult<String>;
}

/// The live application the synthetic user is driving.
///
/// One page driver is owned by one run; the loop never calls it concurrently.
#[async_trait]
pub trait PageDriver: ElementTextReader {
    /// The URL currently displayed.
    async fn current_url(&self) -> MimicResult<String>;

    /// Capture the screen for `step`.
    async fn capture_screenshot(&self, step: u32) -> MimicResult<Screenshot>;

    /// Perform a non-terminal action.
    ///
    /// Fails with `MimicError::ActionExecution`. `Done` and `Blocked` are
    /// never passed here.
    async fn execute(&self, action: &Action) -> MimicResult<()>;

    /// Wait up to `timeout` for the page to go quiet.
    ///
    /// Never fails: pages with long-lived connections simply time out.
    async fn wait_for_settle(&self, timeout: Duration);
}

/// The reasoning collaborator, already bound to concrete providers.
#[async_trait]
pub trait ModelRouter: Send + Sync {
    /// Describe a screenshot (base64 image) in plain text.
    async fn describe_screen(
        &self,
        system_prompt: &str,
        instruction: &str,
        image: &str,
    ) -> MimicResult<String>;

    /// Return the raw model text for the next-action decision.
    async fn decide_next(&self, system_prompt: &str, user_message: &str) -> MimicResult<String>;
}

/// The guardrail gate applied to every proposed action.
///
/// Implementations are trusted and must never execute anything; they may
/// only read element text through `page`.
#[async_trait]
pub trait Guardrail: Send + Sync {
    /// Decide whether `action` may run, given flow-level `overrides`.
    async fn check(
        &self,
        action: &Action,
        page: &dyn ElementTextReader,
        overrides: Option<&GuardrailOverrides>,
    ) -> GuardrailCheck;
}

/// Append-only recorder for a run's artifacts.
///
/// Calls arrive in step order. From the loop's perspective recording cannot
/// fail; implementations that persist must handle their own errors.
pub trait RunSink: Send + Sync {
    fn record_decision(&self, decision: &Decision);

    fn record_action(&self, entry: &ActionLogEntry);

    fn record_guardrail_event(&self, event: &GuardrailEvent);
}
