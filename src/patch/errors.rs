//! Error types for patch overlays

use crate::project::ValidationError;
use thiserror::Error;

/// Errors that abort a patch overlay
///
/// Any of these leaves the project tree untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    /// The targeted build type does not exist
    #[error("Build type '{id}' not found")]
    BuildTypeNotFound {
        /// Requested build type id.
        id: String,
    },

    /// A step addressed by id does not exist
    #[error("Step '{id}' not found in build type '{build_type}'")]
    StepNotFound {
        /// Patched build type.
        build_type: String,
        /// Requested step id.
        id: String,
    },

    /// A parameter addressed by name does not exist
    #[error("Parameter '{name}' not found in build type '{build_type}'")]
    ParameterNotFound {
        /// Patched build type.
        build_type: String,
        /// Requested parameter name.
        name: String,
    },

    /// A search predicate matched nothing
    #[error("No {what} in build type '{build_type}' matches the overlay")]
    NoMatch {
        /// Patched build type.
        build_type: String,
        /// Kind of item searched for.
        what: String,
    },

    /// A search predicate matched more than one candidate
    #[error("{count} candidates for {what} in build type '{build_type}', expected exactly one")]
    AmbiguousMatch {
        /// Patched build type.
        build_type: String,
        /// Kind of item searched for.
        what: String,
        /// Number of candidates found.
        count: usize,
    },

    /// Current state differs from what the overlay expects
    #[error("Unexpected {what} in build type '{build_type}': expected {expected}, found {actual}")]
    ExpectationMismatch {
        /// Patched build type.
        build_type: String,
        /// Item whose state was checked.
        what: String,
        /// State the overlay expected.
        expected: String,
        /// State actually found.
        actual: String,
    },

    /// An edit or overlay that would change nothing
    #[error("Overlay for build type '{build_type}' changes no {what}")]
    NothingToChange {
        /// Patched build type.
        build_type: String,
        /// Kind of item the edit targets.
        what: String,
    },

    /// The patched build type is no longer valid
    #[error("Patched definition is invalid: {0}")]
    Validation(#[from] ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_error_messages() {
        let err = PatchError::AmbiguousMatch {
            build_type: "UnitTests".to_string(),
            what: "trigger".to_string(),
            count: 2,
        };
        assert_eq!(
            err.to_string(),
            "2 candidates for trigger in build type 'UnitTests', expected exactly one"
        );

        let err = PatchError::ExpectationMismatch {
            build_type: "UnitTests".to_string(),
            what: "parameter 'system.coverage'".to_string(),
            expected: "true".to_string(),
            actual: "false".to_string(),
        };
        assert!(err.to_string().contains("expected true, found false"));
    }

    #[test]
    fn test_patch_error_from_validation() {
        let err = PatchError::from(ValidationError::EmptyId);
        assert!(matches!(err, PatchError::Validation(ValidationError::EmptyId)));
    }
}
