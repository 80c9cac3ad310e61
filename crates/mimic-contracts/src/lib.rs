//! # mimic-contracts
//!
//! Shared types and error contracts for the MIMIC synthetic-user runtime.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions, wire validation, and error types.

pub mod action;
pub mod decision;
pub mod error;
pub mod execution;
pub mod flow;
pub mod guardrail;
pub mod models;
pub mod persona;
