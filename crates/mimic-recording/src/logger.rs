//! In-memory implementation of `RunSink`.
//!
//! `RunLogger` is a cheap clonable handle. The agent loop consumes one clone
//! as its boxed sink; the caller keeps another to export or save the run
//! once the loop returns.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use mimic_contracts::{
    decision::{ActionLogEntry, Decision},
    error::{MimicError, MimicResult},
    execution::RunId,
    guardrail::GuardrailEvent,
};
use mimic_core::traits::RunSink;

use crate::log::{RunLog, ACTION_LOG_FILE, DECISION_LOG_FILE, GUARDRAIL_EVENTS_FILE};

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct RecordedRun {
    decisions: Vec<Decision>,
    actions: Vec<ActionLogEntry>,
    guardrail_events: Vec<GuardrailEvent>,
}

// ── Public logger ─────────────────────────────────────────────────────────────

/// An append-only recorder for one run.
///
/// # Thread safety
///
/// All clones share one `Mutex`-guarded state. A poisoned lock is recovered
/// rather than propagated, since recording is infallible for the loop.
#[derive(Clone)]
pub struct RunLogger {
    run_id: RunId,
    state: Arc<Mutex<RecordedRun>>,
}

impl RunLogger {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            state: Arc::new(Mutex::new(RecordedRun::default())),
        }
    }

    pub fn run_id(&self) -> &RunId {
        &self.run_id
    }

    fn lock(&self) -> MutexGuard<'_, RecordedRun> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn decisions(&self) -> Vec<Decision> {
        self.lock().decisions.clone()
    }

    pub fn actions(&self) -> Vec<ActionLogEntry> {
        self.lock().actions.clone()
    }

    pub fn guardrail_events(&self) -> Vec<GuardrailEvent> {
        self.lock().guardrail_events.clone()
    }

    /// Export a snapshot of everything recorded so far.
    pub fn export_log(&self) -> RunLog {
        let state = self.lock();
        RunLog {
            run_id: self.run_id.to_string(),
            decisions: state.decisions.clone(),
            actions: state.actions.clone(),
            guardrail_events: state.guardrail_events.clone(),
            exported_at: Utc::now(),
        }
    }

    /// Write the run's JSON artifacts into `dir`, creating it if needed.
    ///
    /// Returns `MimicError::RecordingFailed` on any I/O or encoding error.
    pub fn save(&self, dir: &Path) -> MimicResult<()> {
        let log = self.export_log();

        fs::create_dir_all(dir).map_err(|e| MimicError::RecordingFailed {
            reason: format!("failed to create run directory '{}': {}", dir.display(), e),
        })?;

        write_json(&dir.join(DECISION_LOG_FILE), &log.decisions)?;
        write_json(&dir.join(ACTION_LOG_FILE), &log.actions)?;
        if !log.guardrail_events.is_empty() {
            write_json(&dir.join(GUARDRAIL_EVENTS_FILE), &log.guardrail_events)?;
        }

        info!(
            run_id = %self.run_id,
            dir = %dir.display(),
            decisions = log.decisions.len(),
            guardrail_events = log.guardrail_events.len(),
            "run log saved"
        );
        Ok(())
    }

    /// Save the log into `dir` whatever the run's `outcome`, then return it.
    ///
    /// A failed run still leaves its partial log on disk. If the run failed
    /// and saving fails too, the run's error wins and the save error is only
    /// logged.
    pub fn finish<T>(&self, dir: &Path, outcome: MimicResult<T>) -> MimicResult<T> {
        let saved = self.save(dir);
        match outcome {
            Ok(value) => saved.map(|()| value),
            Err(err) => {
                if let Err(save_err) = saved {
                    warn!(run_id = %self.run_id, error = %save_err, "could not save log of failed run");
                }
                Err(err)
            }
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> MimicResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(|e| MimicError::RecordingFailed {
        reason: format!("failed to encode '{}': {}", path.display(), e),
    })?;
    fs::write(path, json).map_err(|e| MimicError::RecordingFailed {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}

// ── RunSink impl ──────────────────────────────────────────────────────────────

impl RunSink for RunLogger {
    fn record_decision(&self, decision: &Decision) {
        debug!(run_id = %self.run_id, step = decision.step, "decision recorded");
        self.lock().decisions.push(decision.clone());
    }

    fn record_action(&self, entry: &ActionLogEntry) {
        self.lock().actions.push(entry.clone());
    }

    fn record_guardrail_event(&self, event: &GuardrailEvent) {
        debug!(run_id = %self.run_id, step = event.step, reason = %event.reason, "guardrail event recorded");
        self.lock().guardrail_events.push(event.clone());
    }
}
