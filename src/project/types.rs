//! Core types for the project domain
//!
//! This module contains the validation trait and the identifier rules
//! shared by every definition in the tree.

use super::errors::ValidationError;

/// Maximum length of an identifier
pub const MAX_ID_LEN: usize = 225;

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}

/// Checks an identifier of a project, build type, step or VCS root.
///
/// Identifiers start with a letter and contain only ASCII letters,
/// digits and underscores.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyId`], [`ValidationError::IdTooLong`] or
/// [`ValidationError::InvalidNameChars`].
pub fn validate_id(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyId);
    }
    if id.len() > MAX_ID_LEN {
        return Err(ValidationError::IdTooLong {
            max: MAX_ID_LEN,
            len: id.len(),
        });
    }
    let starts_with_letter = id.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_with_letter || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ValidationError::InvalidNameChars {
            name: id.to_string(),
        });
    }
    Ok(())
}

/// Checks a parameter name (`env.`, `system.` and dotted names allowed).
///
/// # Errors
///
/// Returns [`ValidationError::InvalidNameChars`] for empty names or names
/// with characters other than letters, digits, `_`, `-` and `.`.
pub fn validate_parameter_name(name: &str) -> Result<(), ValidationError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.ends_with('.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidNameChars {
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_id_accepts_plain_ids() {
        assert!(validate_id("Build").is_ok());
        assert!(validate_id("Project_UnitTests2").is_ok());
    }

    #[test]
    fn test_validate_id_rejects_bad_ids() {
        assert_eq!(validate_id(""), Err(ValidationError::EmptyId));
        assert!(validate_id("2Build").is_err());
        assert!(validate_id("Unit Tests").is_err());
        assert!(validate_id("a-b").is_err());
        assert!(matches!(
            validate_id(&"a".repeat(MAX_ID_LEN + 1)),
            Err(ValidationError::IdTooLong { .. })
        ));
    }

    #[test]
    fn test_validate_parameter_name() {
        assert!(validate_parameter_name("system.coverage").is_ok());
        assert!(validate_parameter_name("env.BRANCH_NAME").is_ok());
        assert!(validate_parameter_name("TightenCoverage").is_ok());
        assert!(validate_parameter_name("").is_err());
        assert!(validate_parameter_name("has space").is_err());
        assert!(validate_parameter_name(".leading").is_err());
    }
}
