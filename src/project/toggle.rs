//! Parameter toggles
//!
//! A toggle reads a boolean-like parameter and derives a named flag that
//! failure conditions can be gated on.

use super::errors::ValidationError;
use super::types::validate_parameter_name;
use serde::{Deserialize, Serialize};

/// Derives the flag `derived` from the parameter `source`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterToggle {
    /// Parameter that is inspected
    pub source: String,
    /// Flag that is derived
    pub derived: String,
}

impl ParameterToggle {
    /// Creates a toggle
    #[must_use]
    pub fn new(source: impl Into<String>, derived: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            derived: derived.into(),
        }
    }

    /// Checks both names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNameChars`] for an invalid name.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_parameter_name(&self.source)?;
        validate_parameter_name(&self.derived)
    }
}

/// Returns true for values that switch a toggle off
#[must_use]
pub fn is_false_like(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_false_like_values() {
        for value in ["false", "FALSE", " False ", "0", "no", "off"] {
            assert!(is_false_like(value), "{value}");
        }
        for value in ["true", "", "1", "yes", "maybe"] {
            assert!(!is_false_like(value), "{value}");
        }
    }

    #[test]
    fn test_toggle_validate() {
        assert!(ParameterToggle::new("TightenCoverage", "coverage.enforced").validate().is_ok());
        assert!(ParameterToggle::new("", "x").validate().is_err());
    }
}
