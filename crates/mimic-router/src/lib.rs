//! # mimic-router
//!
//! Hosted-model access for the MIMIC runtime.
//!
//! ## Overview
//!
//! [`Router`] implements the [`ModelRouter`](mimic_core::traits::ModelRouter)
//! trait by sending screen descriptions to a vision-capable provider and
//! next-action decisions to a reasoning provider. Each vendor API is one
//! [`ModelProvider`] variant; the variant is picked once from
//! [`ModelsConfig`](mimic_contracts::models::ModelsConfig).
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use mimic_router::{Credentials, Router};
//!
//! let router = Router::from_config(&models_config, &Credentials::from_env())?;
//! // Pass `router` to `mimic_core::AgentLoop::new(...)`.
//! ```

pub mod credentials;
pub mod provider;
pub mod providers;
pub mod router;

pub use credentials::Credentials;
pub use provider::{CompletionRequest, ModelProvider};
pub use router::Router;

// ── Tests ─────────────────────────────────────────────────────────────────────
