//! Prompt builders for the vision and reasoning calls.

use std::fmt::Write as _;

use mimic_contracts::{decision::Decision, flow::Flow, persona::Persona};

/// Instruction sent alongside every screenshot.
pub const VISION_INSTRUCTION: &str = "Describe what you see on this screen.";

/// Number of recent decisions shown to the reasoning model.
pub const HISTORY_WINDOW: usize = 10;

pub fn build_vision_prompt() -> String {
    "You describe application screens for a usability study.\n\
     Cover the page layout, every interactive element with its exact visible \
     text, the data shown, where the user currently is, and any alert, error, \
     loading or empty state.\n\
     Be factual and specific. Answer in plain text without markdown."
        .to_string()
}

fn bullet_list(items: &[String]) -> String {
    items.iter().map(|item| format!("- {item}\n")).collect()
}

/// The system prompt that puts the reasoning model in the persona's shoes.
pub fn build_reasoning_prompt(persona: &Persona, flow: &Flow) -> String {
    let knowledge = &persona.domain_knowledge;
    format!(
        "You are a synthetic user in a usability test. You ARE this person.\n\
         \n\
         ## Identity\n\
         - Name: {name}\n\
         - Role: {role} ({seniority})\n\
         - Context: {context}\n\
         - Goal orientation: {orientation}\n\
         \n\
         ## Knowledge\n\
         - Strong: {strong}\n\
         - Moderate: {moderate}\n\
         - Weak or unknown: {low}\n\
         \n\
         ## Skill gaps\n{gaps}\n\
         ## Behavior\n{traits}\
         - Patience: {patience}\n\
         - Exploration style: {exploration}\n\
         - Trust in automation: {trust}\n\
         \n\
         ## What frustrates you\n{triggers}\n\
         ## Current task\n\
         Flow: {flow}\n\
         Goal: {goal}\n\
         Success: {success}\n\
         Your personal goal: {personal}\n\
         \n\
         ## Instructions\n\
         Given the current screen and your recent steps, decide the single next \
         interaction, thinking with this persona's knowledge gaps, patience and style.\n\
         \n\
         Respond with exactly one JSON object:\n\
         {{\n  \"observation\": \"what you see\",\n  \"reasoning\": \"what you will do and why\",\n  \
         \"emotion\": \"how you feel and why\",\n  \"action\": {{ \"type\": \"...\", ... }}\n}}\n\
         \n\
         Action types:\n\
         - {{ \"type\": \"click\", \"selector\": \"CSS selector\" }}\n\
         - {{ \"type\": \"type\", \"selector\": \"CSS selector\", \"text\": \"text to type\" }}\n\
         - {{ \"type\": \"scroll\", \"direction\": \"up|down\" }}\n\
         - {{ \"type\": \"navigate\", \"url\": \"URL or path\" }}\n\
         - {{ \"type\": \"wait\", \"seconds\": 2 }}\n\
         - {{ \"type\": \"done\", \"reason\": \"why the task is complete\" }}\n\
         - {{ \"type\": \"blocked\", \"reason\": \"why you cannot proceed\" }}\n\
         \n\
         Prefer text-based selectors such as button:has-text(\"Label\"), \
         a:has-text(\"Link\"), [placeholder=\"Search...\"] or text=\"Exact text\".",
        name = persona.name,
        role = persona.role,
        seniority = persona.seniority,
        context = persona.company_context,
        orientation = persona.goal_orientation,
        strong = knowledge.strong.join(", "),
        moderate = knowledge.moderate.join(", "),
        low = knowledge.low.join(", "),
        gaps = bullet_list(&persona.skill_gaps),
        traits = bullet_list(&persona.behavior_traits),
        patience = persona.patience_level.as_str(),
        exploration = persona.exploration_style.as_str(),
        trust = persona.trust_in_automation.as_str(),
        triggers = bullet_list(&persona.frustration_triggers),
        flow = flow.name,
        goal = flow.goal,
        success = flow.success,
        personal = persona.goal_for(flow),
    )
}

/// The per-step user message: screen, recent history, pending feedback.
///
/// `history` is the full decision sequence; only the last `window` entries
/// are rendered. The feedback section appears only when feedback is present.
pub fn build_reasoning_user_message(
    screen_description: &str,
    history: &[Decision],
    guardrail_feedback: Option<&str>,
    window: usize,
) -> String {
    let mut message = format!("## Current Screen\n{screen_description}\n\n");

    if !history.is_empty() {
        let recent = &history[history.len().saturating_sub(window)..];
        let _ = writeln!(message, "## Action History (last {} steps)", recent.len());
        for decision in recent {
            let _ = writeln!(
                message,
                "Step {}: {} -> {}",
                decision.step,
                decision.action.kind(),
                decision.emotion
            );
            let _ = writeln!(message, "  Observation: {}", decision.observation);
        }
        message.push('\n');
    }

    if let Some(feedback) = guardrail_feedback {
        let _ = write!(message, "## Guardrail Feedback\n{feedback}\n\n");
    }

    message.push_str(
        "## What do you do next?\nRespond with the JSON format specified in your instructions.",
    );
    message
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use mimic_contracts::action::Action;

    use super::*;

    fn decision(step: u32, observation: &str) -> Decision {
        Decision {
            step,
            timestamp: Utc::now(),
            url: "https://shop.example.com/".to_string(),
            screenshot: format!("step-{step:03}.png"),
            observation: observation.to_string(),
            reasoning: String::new(),
            emotion: "neutral".to_string(),
            action: Action::Wait { seconds: 1.0 },
            guardrail_blocked: false,
        }
    }

    #[test]
    fn user_message_without_history_or_feedback() {
        let msg = build_reasoning_user_message("A home page", &[], None, HISTORY_WINDOW);
        assert!(msg.starts_with("## Current Screen\nA home page"));
        assert!(!msg.contains("Action History"));
        assert!(!msg.contains("Guardrail Feedback"));
        assert!(msg.ends_with("specified in your instructions."));
    }

    #[test]
    fn user_message_keeps_only_recent_window() {
        let history: Vec<Decision> = (1..=12).map(|i| decision(i, &format!("obs-{i}"))).collect();
        let msg = build_reasoning_user_message("screen", &history, None, HISTORY_WINDOW);

        assert!(msg.contains("last 10 steps"));
        assert!(!msg.contains("obs-1\n"), "step 1 must fall outside the window");
        assert!(!msg.contains("obs-2\n"), "step 2 must fall outside the window");
        assert!(msg.contains("Step 3: wait -> neutral"));
        assert!(msg.contains("obs-12"));
    }

    #[test]
    fn user_message_includes_feedback_when_present() {
        let msg = build_reasoning_user_message(
            "screen",
            &[decision(1, "x")],
            Some("Your previous action was blocked"),
            HISTORY_WINDOW,
        );
        assert!(msg.contains("## Guardrail Feedback\nYour previous action was blocked"));
    }
}
