//! Reading and writing configuration documents
//!
//! Project trees and patch overlays are serde documents in YAML or JSON.
//! The format is picked from the file extension: `.json` is JSON, anything
//! else is YAML.

use crate::patch::PatchOverlay;
use crate::project::{ConfigError, Project, Validate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Serialization format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    /// YAML
    #[default]
    Yaml,
    /// JSON
    Json,
}

impl DocumentFormat {
    /// Picks the format from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yaml => write!(f, "yaml"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Parses a document of any deserializable type
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] when the text is not a valid document.
pub fn parse_document<T: DeserializeOwned>(
    text: &str,
    format: DocumentFormat,
) -> Result<T, ConfigError> {
    let parsed = match format {
        DocumentFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| ConfigError::Parse {
        format: format.to_string(),
        message,
    })
}

/// Renders a document
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if serialization fails.
pub fn render_document<T: Serialize>(
    value: &T,
    format: DocumentFormat,
) -> Result<String, ConfigError> {
    let rendered = match format {
        DocumentFormat::Yaml => serde_yaml::to_string(value).map_err(|e| e.to_string()),
        DocumentFormat::Json => serde_json::to_string_pretty(value).map_err(|e| e.to_string()),
    };
    rendered.map_err(|message| ConfigError::Parse {
        format: format.to_string(),
        message,
    })
}

/// Parses and validates a project tree
///
/// # Errors
///
/// Returns a parse or validation error.
pub fn parse_project(text: &str, format: DocumentFormat) -> Result<Project, ConfigError> {
    let project: Project = parse_document(text, format)?;
    project.validate()?;
    Ok(project)
}

/// Loads and validates a project tree from a file
///
/// # Errors
///
/// Returns an IO, parse or validation error.
pub fn load_project(path: &Path) -> Result<Project, ConfigError> {
    tracing::debug!(path = %path.display(), "loading project");
    let text = fs::read_to_string(path)?;
    parse_project(&text, DocumentFormat::from_path(path))
}

/// Loads a patch overlay from a file
///
/// # Errors
///
/// Returns an IO or parse error.
pub fn load_overlay(path: &Path) -> Result<PatchOverlay, ConfigError> {
    tracing::debug!(path = %path.display(), "loading patch overlay");
    let text = fs::read_to_string(path)?;
    parse_document(&text, DocumentFormat::from_path(path))
}

/// Renders a project tree
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if serialization fails.
pub fn render_project(project: &Project, format: DocumentFormat) -> Result<String, ConfigError> {
    render_document(project, format)
}
