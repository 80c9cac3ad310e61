//! # mimic-guardrails
//!
//! A fixed-policy guardrail checker for the MIMIC runtime.
//!
//! ## Overview
//!
//! This crate provides [`GuardrailChecker`], which implements the
//! [`Guardrail`](mimic_core::traits::Guardrail) trait. The base policy is
//! declared in TOML and loaded once; a flow can add blocked selectors and
//! terms, or allow specific button texts, but never removes a base rule.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use mimic_guardrails::GuardrailChecker;
//!
//! let checker = GuardrailChecker::from_file(Path::new("config/guardrails.toml"))?;
//! // Pass `checker` to `mimic_core::AgentLoop::new(...)`.
//! ```
//!
//! ## Failure modes
//!
//! Navigation fails closed: a target that cannot be parsed is blocked.
//! Clicks fail open: when the element text cannot be read, only the
//! selector blocklist applies.

pub mod checker;

pub use checker::GuardrailChecker;

// ── Tests ─────────────────────────────────────────────────────────────────────
