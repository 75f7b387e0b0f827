//! Configuration management

use super::loader::{DocumentFormat, parse_document};
use crate::project::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variable overriding the log level
pub const LOG_ENV: &str = "BUILDTREE_LOG";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level
    pub log_level: String,
    /// Format used when rendering documents
    pub default_format: DocumentFormat,
    /// Treat script references to undeclared parameters as errors
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            default_format: DocumentFormat::Yaml,
            strict: false,
        }
    }
}

impl Config {
    /// Loads configuration from an optional file, then applies the
    /// `BUILDTREE_LOG` override.
    ///
    /// # Errors
    ///
    /// Returns an IO or parse error for an unreadable or malformed file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = fs::read_to_string(path)?;
                parse_document(&text, DocumentFormat::from_path(path))?
            }
            None => Self::default(),
        };
        if let Ok(level) = std::env::var(LOG_ENV)
            && !level.trim().is_empty()
        {
            config.log_level = level;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.default_format, DocumentFormat::Yaml);
        assert!(!config.strict);
    }

    #[test]
    fn test_config_partial_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buildtree.yaml");
        fs::write(&path, "strict: true\ndefault_format: json\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert!(config.strict);
        assert_eq!(config.default_format, DocumentFormat::Json);
    }

    #[test]
    fn test_config_malformed_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("buildtree.yaml");
        fs::write(&path, "strict: [").unwrap();
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Parse { .. })
        ));
    }
}
