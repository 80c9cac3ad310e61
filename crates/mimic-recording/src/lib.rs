//! # mimic-recording
//!
//! Append-only recording of a MIMIC run.
//!
//! ## Overview
//!
//! [`RunLogger`] implements the [`RunSink`](mimic_core::traits::RunSink)
//! trait. It keeps the decision sequence, the action log and the guardrail
//! events in the order the agent loop emits them, and writes them out as
//! pretty-printed JSON once the run ends.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mimic_recording::RunLogger;
//!
//! let logger = RunLogger::new(RunId::new("shopper", "checkout"));
//! let agent = AgentLoop::new(router, guardrails, Box::new(logger.clone()), config);
//! agent.run(&page, &persona, &flow).await?;
//! logger.save(Path::new("runs/2026-03-04T05-06-07_shopper_checkout"))?;
//! ```

pub mod log;
pub mod logger;

pub use log::RunLog;
pub use logger::RunLogger;

// ── Tests ─────────────────────────────────────────────────────────────────────
