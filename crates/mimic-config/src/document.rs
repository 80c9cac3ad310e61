//! Format-agnostic document parsing.

use std::path::Path;

use serde::de::DeserializeOwned;

use mimic_contracts::error::{MimicError, MimicResult};

/// Supported configuration encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
}

impl Format {
    /// Extensions in lookup order.
    pub const ALL: [Format; 2] = [Format::Toml, Format::Json];

    pub fn extension(&self) -> &'static str {
        match self {
            Format::Toml => "toml",
            Format::Json => "json",
        }
    }

    /// `.json` means JSON; anything else is read as TOML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Toml,
        }
    }
}

/// Parse `contents` as `format`. `origin` names the document in errors.
pub fn parse_str<T: DeserializeOwned>(contents: &str, format: Format, origin: &str) -> MimicResult<T> {
    match format {
        Format::Toml => toml::from_str(contents).map_err(|e| MimicError::ConfigError {
            reason: format!("failed to parse TOML '{}': {}", origin, e),
        }),
        Format::Json => serde_json::from_str(contents).map_err(|e| MimicError::ConfigError {
            reason: format!("failed to parse JSON '{}': {}", origin, e),
        }),
    }
}

/// Parse an embedded TOML document.
pub fn from_toml_str<T: DeserializeOwned>(contents: &str, origin: &str) -> MimicResult<T> {
    parse_str(contents, Format::Toml, origin)
}

/// Read and parse the file at `path`, choosing the format by extension.
pub fn from_file<T: DeserializeOwned>(path: &Path) -> MimicResult<T> {
    let contents = std::fs::read_to_string(path).map_err(|e| MimicError::ConfigError {
        reason: format!("failed to read '{}': {}", path.display(), e),
    })?;
    parse_str(&contents, Format::from_path(path), &path.display().to_string())
}
