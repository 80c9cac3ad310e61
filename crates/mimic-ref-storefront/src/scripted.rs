//! `ScriptedRouter`: a `ModelRouter` that replays canned reasoning responses.
//!
//! Screen descriptions come straight from the storefront's text screenshots,
//! so a scenario only scripts the decisions. Every reasoning prompt is kept
//! for inspection after the run.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;

use mimic_contracts::error::{MimicError, MimicResult};
use mimic_core::traits::ModelRouter;

/// Reason given once the script and any repeat response are used up.
pub const SCRIPT_EXHAUSTED: &str = "Script exhausted";

/// Build a well-formed reasoning response around `action`.
pub fn response(observation: &str, reasoning: &str, emotion: &str, action: serde_json::Value) -> String {
    json!({
        "observation": observation,
        "reasoning": reasoning,
        "emotion": emotion,
        "action": action,
    })
    .to_string()
}

pub struct ScriptedRouter {
    script: Mutex<VecDeque<String>>,
    repeat: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedRouter {
    pub fn new<I, S>(script: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(script.into_iter().map(Into::into).collect()),
            repeat: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Answer with `response` forever once the script runs out.
    pub fn repeating(mut self, response: impl Into<String>) -> Self {
        self.repeat = Some(response.into());
        self
    }

    /// Shared handle to the reasoning prompts received so far.
    pub fn prompts(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }

    fn next_response(&self) -> String {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front();
        scripted.or_else(|| self.repeat.clone()).unwrap_or_else(|| {
            response(
                "",
                SCRIPT_EXHAUSTED,
                "neutral",
                json!({ "type": "blocked", "reason": SCRIPT_EXHAUSTED }),
            )
        })
    }
}

#[async_trait]
impl ModelRouter for ScriptedRouter {
    async fn describe_screen(
        &self,
        _system_prompt: &str,
        _instruction: &str,
        image: &str,
    ) -> MimicResult<String> {
        let bytes = STANDARD.decode(image).map_err(|e| MimicError::Provider {
            provider: "scripted".to_string(),
            reason: format!("screenshot is not base64: {}", e),
        })?;
        String::from_utf8(bytes).map_err(|e| MimicError::Provider {
            provider: "scripted".to_string(),
            reason: format!("screenshot is not text: {}", e),
        })
    }

    async fn decide_next(&self, _system_prompt: &str, user_message: &str) -> MimicResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(user_message.to_string());
        Ok(self.next_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_repeat_then_exhausted() {
        let router = ScriptedRouter::new(["first"]).repeating("again");
        assert_eq!(router.decide_next("s", "m1").await.unwrap(), "first");
        assert_eq!(router.decide_next("s", "m2").await.unwrap(), "again");
        assert_eq!(router.decide_next("s", "m3").await.unwrap(), "again");
        assert_eq!(*router.prompts().lock().unwrap(), vec!["m1", "m2", "m3"]);

        let bare = ScriptedRouter::new(Vec::<String>::new());
        let last = bare.decide_next("s", "m").await.unwrap();
        assert!(last.contains(SCRIPT_EXHAUSTED));
    }

    #[tokio::test]
    async fn describes_text_screenshots() {
        let router = ScriptedRouter::new(Vec::<String>::new());
        let encoded = STANDARD.encode("[shop] Home");
        assert_eq!(router.describe_screen("s", "i", &encoded).await.unwrap(), "[shop] Home");
        assert!(router.describe_screen("s", "i", "%%%").await.is_err());
    }
}
