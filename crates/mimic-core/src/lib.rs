//! # mimic-core
//!
//! The synthetic-user runtime for MIMIC.
//!
//! This crate provides:
//! - The collaborator traits (`PageDriver`, `ModelRouter`, `Guardrail`, `RunSink`)
//! - The decision parser that turns model prose into a validated `Action`
//! - The prompt builders for the vision and reasoning calls
//! - The `AgentLoop` that wires them together in the correct trust order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mimic_core::{AgentLoop, LoopConfig, traits::{PageDriver, ModelRouter, Guardrail, RunSink}};
//! ```

pub mod agent_loop;
pub mod parser;
pub mod prompts;
pub mod traits;

pub use agent_loop::{AgentLoop, LoopConfig};
