//! Runtime error types for the MIMIC runtime.
//!
//! All fallible operations return `MimicResult<T>`. Guardrail blocks are not
//! errors: they are `GuardrailViolation` values folded into the step record.

use thiserror::Error;

/// The unified error type for the MIMIC runtime.
#[derive(Debug, Error)]
pub enum MimicError {
    /// An action's shape does not match its `type` tag.
    #[error("malformed action: {reason}")]
    MalformedAction { reason: String },

    /// The page driver could not read an element's text.
    #[error("element '{selector}' unreadable: {reason}")]
    ElementUnreadable { selector: String, reason: String },

    /// The page driver failed to perform an action.
    #[error("action '{action}' failed: {reason}")]
    ActionExecution { action: String, reason: String },

    /// A model provider call failed. Not recovered inside a run.
    #[error("provider '{provider}' error: {reason}")]
    Provider { provider: String, reason: String },

    /// The page driver could not report its URL or capture the screen.
    #[error("page error: {reason}")]
    Page { reason: String },

    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// The run log could not be written to disk.
    #[error("recording failed: {reason}")]
    RecordingFailed { reason: String },
}

/// Convenience alias used throughout the MIMIC crates.
pub type MimicResult<T> = Result<T, MimicError>;
