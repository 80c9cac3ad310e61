//! The MIMIC agent loop: the observe → decide → validate → act state machine.
//!
//! Each step runs the pipeline:
//!
//!   Screen → Describe → Decide → Parse → Guardrail → Record → [Execute]
//!
//! The safety invariant: `PageDriver::execute()` is NEVER called for an
//! action the guardrail blocked. A blocked step records the decision, turns
//! the block reason into feedback for the next prompt, and moves on.
//!
//! Steps are strictly sequential. Step N+1 starts only after step N's
//! recording and execution have completed, because every decision depends on
//! the page state the previous one left behind.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use mimic_contracts::{
    action::Action,
    decision::{ActionLogEntry, Decision},
    error::MimicResult,
    execution::{AgentLoopResult, ExitReason, LoopState},
    flow::Flow,
    guardrail::GuardrailEvent,
    persona::Persona,
};

use crate::{
    parser::{parse_decision, ParsedDecision},
    prompts::{
        build_reasoning_prompt, build_reasoning_user_message, build_vision_prompt,
        HISTORY_WINDOW, VISION_INSTRUCTION,
    },
    traits::{Guardrail, ModelRouter, PageDriver, RunSink},
};

/// Final message reported when the step budget runs out.
pub const MAX_STEPS_MESSAGE: &str = "Maximum steps reached";

/// Tunables for one agent loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Application origin; the flow's start path is appended to it.
    pub base_url: String,
    /// Upper bound on the post-action settle wait.
    pub settle_timeout: Duration,
    /// Number of recent decisions shown to the reasoning model.
    pub history_window: usize,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            settle_timeout: Duration::from_millis(5000),
            history_window: HISTORY_WINDOW,
        }
    }
}

impl LoopConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

/// What a single step decided about the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep going. `feedback` is shown once, on the next prompt.
    Continue { feedback: Option<String> },
    /// The agent declared the task complete.
    Done { reason: String },
    /// The agent declared it cannot proceed.
    Blocked { reason: String },
}

/// Mutable state owned by one run and dropped when it ends.
struct RunState {
    decisions: Vec<Decision>,
    guardrail_feedback: Option<String>,
    state: LoopState,
}

/// Per-run constants computed once before step 1.
struct RunPrompts {
    vision: String,
    reasoning: String,
}

/// Drives one synthetic user through one flow.
///
/// The loop owns the trusted components (guardrail, sink) and the router,
/// and enforces the step pipeline on every iteration of `run()`.
pub struct AgentLoop {
    router: Box<dyn ModelRouter>,
    guardrails: Box<dyn Guardrail>,
    sink: Box<dyn RunSink>,
    config: LoopConfig,
}

impl AgentLoop {
    pub fn new(
        router: Box<dyn ModelRouter>,
        guardrails: Box<dyn Guardrail>,
        sink: Box<dyn RunSink>,
        config: LoopConfig,
    ) -> Self {
        Self { router, guardrails, sink, config }
    }

    /// Run `persona` through `flow` on `page` until a terminal state.
    ///
    /// # Errors
    ///
    /// Router failures and page driver failures while reading the URL or
    /// capturing the screen abort the run. Guardrail blocks, unparseable
    /// responses and failed actions do not: they become feedback.
    pub async fn run<P: PageDriver>(
        &self,
        page: &P,
        persona: &Persona,
        flow: &Flow,
    ) -> MimicResult<AgentLoopResult> {
        let prompts = RunPrompts {
            vision: build_vision_prompt(),
            reasoning: build_reasoning_prompt(persona, flow),
        };

        let start_url = format!("{}{}", self.config.base_url, flow.start_url);
        info!(
            persona = %persona.id,
            flow = %flow.name,
            start_url = %start_url,
            max_steps = flow.max_steps,
            "agent loop starting"
        );
        page.execute(&Action::Navigate { url: start_url }).await?;
        page.wait_for_settle(self.config.settle_timeout).await;

        let mut run = RunState {
            decisions: Vec::new(),
            guardrail_feedback: None,
            state: LoopState::Running { step: 1 },
        };

        for step in 1..=flow.max_steps {
            run.state = LoopState::Running { step };

            match self.step(page, flow, &prompts, &mut run, step).await? {
                StepOutcome::Continue { feedback } => {
                    run.guardrail_feedback = feedback;
                }
                StepOutcome::Done { reason } => {
                    return Ok(self.finish(&mut run, LoopState::Done, step, reason));
                }
                StepOutcome::Blocked { reason } => {
                    return Ok(self.finish(&mut run, LoopState::Blocked, step, reason));
                }
            }
        }

        Ok(self.finish(
            &mut run,
            LoopState::MaxStepsReached,
            flow.max_steps,
            MAX_STEPS_MESSAGE.to_string(),
        ))
    }

    /// Execute one step of the state machine.
    ///
    /// # Pipeline
    ///
    /// 1. Read the URL and capture the screen
    /// 2. Ask the router to describe the screen
    /// 3. Ask the router for the next decision; pending feedback is consumed here
    /// 4. Parse the response, falling back to a synthetic `blocked` decision
    /// 5. Run the guardrail check
    /// 6. Record the decision (always) and the guardrail event (if blocked)
    /// 7. Blocked → `Continue` with guardrail feedback, nothing executed
    /// 8. `done` / `blocked` → terminal outcome
    /// 9. Otherwise execute and settle; an execution error becomes feedback
    async fn step<P: PageDriver>(
        &self,
        page: &P,
        flow: &Flow,
        prompts: &RunPrompts,
        run: &mut RunState,
        step: u32,
    ) -> MimicResult<StepOutcome> {
        debug!(step, max_steps = flow.max_steps, "step starting");

        // ── Step 1: Observe ──────────────────────────────────────────────────
        let url = page.current_url().await?;
        let screenshot = page.capture_screenshot(step).await?;

        // ── Step 2: Describe ─────────────────────────────────────────────────
        let description = self
            .router
            .describe_screen(&prompts.vision, VISION_INSTRUCTION, &screenshot.encoded)
            .await?;
        debug!(step, url = %url, chars = description.len(), "screen described");

        // ── Step 3: Decide ───────────────────────────────────────────────────
        //
        // Feedback is single-use: take() clears it before the call returns.
        let feedback = run.guardrail_feedback.take();
        let user_message = build_reasoning_user_message(
            &description,
            &run.decisions,
            feedback.as_deref(),
            self.config.history_window,
        );
        let response = self.router.decide_next(&prompts.reasoning, &user_message).await?;

        // ── Step 4: Parse ────────────────────────────────────────────────────
        let parsed = match parse_decision(&response) {
            Ok(parsed) => parsed,
            Err(failure) => {
                warn!(step, error = %failure, "failed to parse reasoning response, using fallback");
                ParsedDecision::fallback(&description)
            }
        };
        info!(step, action = %parsed.action, emotion = %parsed.emotion, "decision");

        // ── Step 5: Guardrail ────────────────────────────────────────────────
        let check = self
            .guardrails
            .check(&parsed.action, page, flow.guardrail_overrides.as_ref())
            .await;

        // ── Step 6: Record ───────────────────────────────────────────────────
        let decision = Decision {
            step,
            timestamp: Utc::now(),
            url,
            screenshot: screenshot.reference,
            observation: parsed.observation,
            reasoning: parsed.reasoning,
            emotion: parsed.emotion,
            action: parsed.action,
            guardrail_blocked: check.blocked,
        };
        self.sink.record_decision(&decision);
        self.sink.record_action(&ActionLogEntry::from(&decision));

        if check.blocked {
            warn!(step, action = %decision.action, reason = %check.reason, "guardrail blocked action");
            self.sink.record_guardrail_event(&GuardrailEvent {
                step,
                timestamp: decision.timestamp,
                intended_action: decision.action.clone(),
                reason: check.reason.clone(),
                screenshot: decision.screenshot.clone(),
                expected_end_of_flow: matches!(decision.action, Action::Done { .. }),
            });
        }

        let action = decision.action.clone();
        run.decisions.push(decision);

        // ── Step 7: Blocked → feedback ───────────────────────────────────────
        if check.blocked {
            return Ok(StepOutcome::Continue {
                feedback: Some(format!(
                    "Your previous action was blocked by a safety guardrail: {}. \
                     You cannot perform this action. Continue with an alternative \
                     approach or declare done/blocked.",
                    check.reason
                )),
            });
        }

        // ── Step 8: Terminal decisions ───────────────────────────────────────
        match action {
            Action::Done { reason } => return Ok(StepOutcome::Done { reason }),
            Action::Blocked { reason } => return Ok(StepOutcome::Blocked { reason }),
            _ => {}
        }

        // ── Step 9: Act ──────────────────────────────────────────────────────
        if let Err(e) = page.execute(&action).await {
            warn!(step, action = %action, error = %e, "action failed");
            return Ok(StepOutcome::Continue {
                feedback: Some(format!(
                    "Your previous action failed with error: {}. Try a different approach.",
                    e
                )),
            });
        }
        page.wait_for_settle(self.config.settle_timeout).await;

        Ok(StepOutcome::Continue { feedback: None })
    }

    /// Move the run into a terminal state and build its summary.
    fn finish(
        &self,
        run: &mut RunState,
        terminal: LoopState,
        total_steps: u32,
        final_message: String,
    ) -> AgentLoopResult {
        run.state = terminal;
        let exit_reason = match terminal {
            LoopState::Done => ExitReason::Done,
            LoopState::Blocked => ExitReason::Blocked,
            LoopState::MaxStepsReached | LoopState::Running { .. } => ExitReason::MaxSteps,
        };
        info!(
            state = ?run.state,
            exit_reason = %exit_reason,
            total_steps,
            decisions = run.decisions.len(),
            final_message = %final_message,
            "agent loop finished"
        );
        AgentLoopResult {
            exit_reason,
            total_steps,
            final_message,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;

    use mimic_contracts::{
        action::Action,
        decision::{ActionLogEntry, Decision},
        error::{MimicError, MimicResult},
        execution::{ExitReason, Screenshot},
        flow::Flow,
        guardrail::{GuardrailCheck, GuardrailEvent, GuardrailOverrides},
        persona::{DomainKnowledge, ExplorationStyle, Level, Persona},
    };

    use crate::traits::{ElementTextReader, Guardrail, ModelRouter, PageDriver, RunSink};

    use super::{AgentLoop, LoopConfig};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    fn make_persona() -> Persona {
        Persona {
            id: "tester".to_string(),
            name: "Tess".to_string(),
            role: "Buyer".to_string(),
            seniority: "junior".to_string(),
            company_context: "small shop".to_string(),
            goal_orientation: "task-focused".to_string(),
            domain_knowledge: DomainKnowledge::default(),
            skill_gaps: vec![],
            behavior_traits: vec![],
            patience_level: Level::Medium,
            exploration_style: ExplorationStyle::Linear,
            trust_in_automation: Level::High,
            frustration_triggers: vec![],
            typical_questions: vec![],
            flow_goals: Default::default(),
        }
    }

    fn make_flow(max_steps: u32) -> Flow {
        Flow {
            name: "test-flow".to_string(),
            start_url: "/start".to_string(),
            goal: "finish".to_string(),
            success: "finished".to_string(),
            guardrail_overrides: None,
            max_steps,
        }
    }

    fn respond(action: &str) -> String {
        format!(
            r#"{{"observation": "a page", "reasoning": "because", "emotion": "calm", "action": {action}}}"#
        )
    }

    /// A page that records executed actions and can fail on one selector.
    #[derive(Default)]
    struct MockPage {
        executed: Arc<Mutex<Vec<Action>>>,
        fail_selector: Option<String>,
    }

    #[async_trait]
    impl ElementTextReader for MockPage {
        async fn read_element_text(&self, selector: &str) -> MimicResult<String> {
            Err(MimicError::ElementUnreadable {
                selector: selector.to_string(),
                reason: "mock page has no text".to_string(),
            })
        }
    }

    #[async_trait]
    impl PageDriver for MockPage {
        async fn current_url(&self) -> MimicResult<String> {
            Ok("https://app.test/start".to_string())
        }

        async fn capture_screenshot(&self, step: u32) -> MimicResult<Screenshot> {
            Ok(Screenshot {
                reference: Screenshot::reference_for(step),
                encoded: "aW1hZ2U=".to_string(),
            })
        }

        async fn execute(&self, action: &Action) -> MimicResult<()> {
            self.executed.lock().unwrap().push(action.clone());
            match (action, &self.fail_selector) {
                (Action::Click { selector }, Some(bad)) if selector == bad => {
                    Err(MimicError::ActionExecution {
                        action: action.to_string(),
                        reason: "element detached".to_string(),
                    })
                }
                _ => Ok(()),
            }
        }

        async fn wait_for_settle(&self, _timeout: Duration) {}
    }

    /// A router that replays queued responses and records every prompt.
    struct MockRouter {
        responses: Mutex<VecDeque<String>>,
        user_messages: Arc<Mutex<Vec<String>>>,
        fail_decide: bool,
    }

    impl MockRouter {
        fn new(responses: Vec<String>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                user_messages: Arc::new(Mutex::new(vec![])),
                fail_decide: false,
            }
        }
    }

    #[async_trait]
    impl ModelRouter for MockRouter {
        async fn describe_screen(&self, _system: &str, _instruction: &str, _image: &str) -> MimicResult<String> {
            Ok("A test screen".to_string())
        }

        async fn decide_next(&self, _system: &str, user_message: &str) -> MimicResult<String> {
            self.user_messages.lock().unwrap().push(user_message.to_string());
            if self.fail_decide {
                return Err(MimicError::Provider {
                    provider: "mock".to_string(),
                    reason: "rate limited".to_string(),
                });
            }
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| respond(r#"{"type": "scroll", "direction": "down"}"#)))
        }
    }

    /// Blocks clicks on listed selectors, and `done` when `block_done` is set.
    #[derive(Default)]
    struct MockGuardrail {
        blocked_selectors: Vec<String>,
        block_done: bool,
    }

    #[async_trait]
    impl Guardrail for MockGuardrail {
        async fn check(
            &self,
            action: &Action,
            _page: &dyn ElementTextReader,
            _overrides: Option<&GuardrailOverrides>,
        ) -> GuardrailCheck {
            match action {
                Action::Click { selector } if self.blocked_selectors.contains(selector) => {
                    GuardrailCheck { blocked: true, reason: format!("{selector} is off limits") }
                }
                Action::Done { .. } if self.block_done => {
                    GuardrailCheck { blocked: true, reason: "not finished yet".to_string() }
                }
                _ => GuardrailCheck::allow(),
            }
        }
    }

    /// A sink that records every call for later inspection.
    #[derive(Clone, Default)]
    struct MockSink {
        decisions: Arc<Mutex<Vec<Decision>>>,
        actions: Arc<Mutex<Vec<ActionLogEntry>>>,
        events: Arc<Mutex<Vec<GuardrailEvent>>>,
    }

    impl RunSink for MockSink {
        fn record_decision(&self, decision: &Decision) {
            self.decisions.lock().unwrap().push(decision.clone());
        }

        fn record_action(&self, entry: &ActionLogEntry) {
            self.actions.lock().unwrap().push(entry.clone());
        }

        fn record_guardrail_event(&self, event: &GuardrailEvent) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn make_loop(router: MockRouter, guardrail: MockGuardrail, sink: &MockSink) -> AgentLoop {
        AgentLoop::new(
            Box::new(router),
            Box::new(guardrail),
            Box::new(sink.clone()),
            LoopConfig::with_base_url("https://app.test"),
        )
    }

    // ── Test cases ────────────────────────────────────────────────────────────

    /// The start URL is opened before step 1 and is not recorded as a step.
    #[tokio::test]
    async fn test_navigates_to_start_before_first_step() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec![respond(r#"{"type": "done", "reason": "nothing to do"}"#)]);

        let result = make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(5))
            .await
            .unwrap();

        let executed = page.executed.lock().unwrap();
        assert_eq!(
            executed.first(),
            Some(&Action::Navigate { url: "https://app.test/start".to_string() })
        );
        assert_eq!(executed.len(), 1, "done must not be executed on the page");
        assert_eq!(result.exit_reason, ExitReason::Done);
        assert_eq!(result.total_steps, 1);
        assert_eq!(result.final_message, "nothing to do");
        assert_eq!(sink.decisions.lock().unwrap().len(), 1);
    }

    /// A blocked action is never executed, and its feedback reaches exactly
    /// the next prompt.
    #[tokio::test]
    async fn test_guardrail_block_skips_execution_and_feeds_back_once() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec![
            respond(r##"{"type": "click", "selector": "#delete"}"##),
            respond(r#"{"type": "scroll", "direction": "down"}"#),
            respond(r#"{"type": "done", "reason": "found it"}"#),
        ]);
        let prompts = router.user_messages.clone();
        let guardrail = MockGuardrail {
            blocked_selectors: vec!["#delete".to_string()],
            ..Default::default()
        };

        let result = make_loop(router, guardrail, &sink)
            .run(&page, &make_persona(), &make_flow(10))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::Done);
        assert_eq!(result.total_steps, 3);

        // Start navigation + the scroll. The blocked click never ran.
        let executed = page.executed.lock().unwrap();
        assert_eq!(executed.len(), 2);
        assert!(!executed.iter().any(|a| matches!(a, Action::Click { .. })));

        let prompts = prompts.lock().unwrap();
        assert!(!prompts[0].contains("Guardrail Feedback"));
        assert!(prompts[1].contains("blocked by a safety guardrail: #delete is off limits"));
        assert!(!prompts[2].contains("Guardrail Feedback"), "feedback is single-use");

        let decisions = sink.decisions.lock().unwrap();
        assert_eq!(decisions.len(), 3);
        assert!(decisions[0].guardrail_blocked);
        assert!(!decisions[1].guardrail_blocked);

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].step, 1);
        assert!(!events[0].expected_end_of_flow);
        assert_eq!(sink.actions.lock().unwrap().len(), 3);
    }

    /// An unparseable response becomes the fallback blocked decision.
    #[tokio::test]
    async fn test_unparseable_response_falls_back_to_blocked() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec!["I would probably click the big button.".to_string()]);

        let result = make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(5))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::Blocked);
        assert_eq!(result.total_steps, 1);
        assert_eq!(result.final_message, "Failed to parse LLM response");

        let decisions = sink.decisions.lock().unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].action.kind(), "blocked");
        assert_eq!(decisions[0].emotion, "confused");
        assert_eq!(decisions[0].observation, "A test screen");
    }

    /// Without a terminal decision the loop stops at the step budget.
    #[tokio::test]
    async fn test_max_steps_reached() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec![]);

        let result = make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(3))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::MaxSteps);
        assert_eq!(result.total_steps, 3);
        assert_eq!(result.final_message, "Maximum steps reached");
        assert_eq!(sink.decisions.lock().unwrap().len(), 3);
        // Start navigation + three scrolls.
        assert_eq!(page.executed.lock().unwrap().len(), 4);
    }

    /// A failed action does not end the run; the error is fed back.
    #[tokio::test]
    async fn test_execution_failure_becomes_feedback() {
        let page = MockPage {
            fail_selector: Some("#flaky".to_string()),
            ..Default::default()
        };
        let sink = MockSink::default();
        let router = MockRouter::new(vec![
            respond(r##"{"type": "click", "selector": "#flaky"}"##),
            respond(r#"{"type": "done", "reason": "worked around it"}"#),
        ]);
        let prompts = router.user_messages.clone();

        let result = make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(5))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::Done);
        assert_eq!(result.total_steps, 2);

        let prompts = prompts.lock().unwrap();
        assert!(prompts[1].contains("Your previous action failed with error"));
        assert!(prompts[1].contains("element detached"));
        assert!(!sink.decisions.lock().unwrap()[0].guardrail_blocked);
    }

    /// A blocked `done` is flagged as an expected end of flow and the loop
    /// keeps going.
    #[tokio::test]
    async fn test_blocked_done_marks_expected_end_of_flow() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec![
            respond(r#"{"type": "done", "reason": "all good"}"#),
            respond(r#"{"type": "blocked", "reason": "cannot finish"}"#),
        ]);
        let guardrail = MockGuardrail { block_done: true, ..Default::default() };

        let result = make_loop(router, guardrail, &sink)
            .run(&page, &make_persona(), &make_flow(5))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::Blocked);
        assert_eq!(result.total_steps, 2);
        assert_eq!(result.final_message, "cannot finish");

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert!(events[0].expected_end_of_flow);
        assert_eq!(events[0].screenshot, "step-001.png");
    }

    /// Provider errors are not recovered inside the loop.
    #[tokio::test]
    async fn test_provider_error_aborts_run() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let mut router = MockRouter::new(vec![]);
        router.fail_decide = true;

        let result = make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(5))
            .await;

        match result {
            Err(MimicError::Provider { reason, .. }) => assert_eq!(reason, "rate limited"),
            other => panic!("expected Provider error, got {:?}", other),
        }
        assert!(sink.decisions.lock().unwrap().is_empty());
    }

    /// A zero-step budget ends immediately with no decisions.
    #[tokio::test]
    async fn test_zero_step_budget() {
        let page = MockPage::default();
        let sink = MockSink::default();

        let result = make_loop(MockRouter::new(vec![]), MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(0))
            .await
            .unwrap();

        assert_eq!(result.exit_reason, ExitReason::MaxSteps);
        assert_eq!(result.total_steps, 0);
        assert!(sink.decisions.lock().unwrap().is_empty());
    }

    /// The history shown to the model never exceeds the configured window.
    #[tokio::test]
    async fn test_history_window_is_bounded() {
        let page = MockPage::default();
        let sink = MockSink::default();
        let router = MockRouter::new(vec![]);
        let prompts = router.user_messages.clone();

        make_loop(router, MockGuardrail::default(), &sink)
            .run(&page, &make_persona(), &make_flow(13))
            .await
            .unwrap();

        let prompts = prompts.lock().unwrap();
        assert!(prompts[12].contains("last 10 steps"));
        assert!(!prompts[12].contains("Step 2: "));
        assert!(prompts[12].contains("Step 3: scroll -> calm"));
    }
}
