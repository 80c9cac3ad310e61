//! The configuration root directory.
//!
//! ```text
//! <root>/
//!   personas/<id>.toml|json
//!   flows/<name>.toml|json
//!   config/guardrails.toml|json
//!   config/models.toml|json
//! ```

use std::path::{Path, PathBuf};

use tracing::debug;

use mimic_contracts::{
    error::{MimicError, MimicResult},
    flow::Flow,
    guardrail::GuardrailsConfig,
    models::ModelsConfig,
    persona::Persona,
};

use crate::document::{from_file, Format};

pub const PERSONAS_DIR: &str = "personas";
pub const FLOWS_DIR: &str = "flows";
pub const CONFIG_DIR: &str = "config";

/// Loads configuration documents from one directory tree.
#[derive(Debug, Clone)]
pub struct ConfigRoot {
    dir: PathBuf,
}

impl ConfigRoot {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn persona(&self, id: &str) -> MimicResult<Persona> {
        let persona: Persona = from_file(&self.locate(PERSONAS_DIR, id)?)?;
        if persona.id != id {
            debug!(requested = id, declared = %persona.id, "persona id differs from file name");
        }
        Ok(persona)
    }

    pub fn flow(&self, name: &str) -> MimicResult<Flow> {
        from_file(&self.locate(FLOWS_DIR, name)?)
    }

    pub fn guardrails(&self) -> MimicResult<GuardrailsConfig> {
        from_file(&self.locate(CONFIG_DIR, "guardrails")?)
    }

    pub fn models(&self) -> MimicResult<ModelsConfig> {
        from_file(&self.locate(CONFIG_DIR, "models")?)
    }

    /// Find `<root>/<subdir>/<stem>.toml`, then `.json`.
    pub fn locate(&self, subdir: &str, stem: &str) -> MimicResult<PathBuf> {
        if stem.is_empty() || stem.contains(['/', '\\']) || stem.starts_with('.') {
            return Err(MimicError::ConfigError {
                reason: format!("invalid document name '{}'", stem),
            });
        }

        let base = self.dir.join(subdir);
        Format::ALL
            .iter()
            .map(|format| base.join(format!("{}.{}", stem, format.extension())))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| MimicError::ConfigError {
                reason: format!(
                    "no '{}' document in '{}' (tried .toml and .json)",
                    stem,
                    base.display()
                ),
            })
    }
}
