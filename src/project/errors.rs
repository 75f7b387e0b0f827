//! Error types for the project domain

use crate::patch::PatchError;
use thiserror::Error;

/// Errors surfaced while evaluating a configuration tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Validation failed with specified reason
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A patch overlay could not be applied
    #[error("Patch failed: {0}")]
    Patch(#[from] PatchError),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),

    /// A document could not be parsed
    #[error("Failed to parse {format} document: {message}")]
    Parse {
        /// Document format that was being parsed.
        format: String,
        /// Parser message.
        message: String,
    },
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Validation errors for project components
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier cannot be empty
    #[error("Identifier cannot be empty")]
    EmptyId,

    /// Identifier too long
    #[error("Identifier too long: max {max} characters, got {len}")]
    IdTooLong {
        /// Maximum allowed length.
        max: usize,
        /// Actual length of the identifier.
        len: usize,
    },

    /// Invalid characters in a name or identifier
    #[error("Invalid characters in name: '{name}'")]
    InvalidNameChars {
        /// The invalid name.
        name: String,
    },

    /// Two parameters share a name
    #[error("Duplicate parameter '{name}' in build type '{build_type}'")]
    DuplicateParameter {
        /// Build type holding the parameters.
        build_type: String,
        /// Duplicated parameter name.
        name: String,
    },

    /// Two steps share an id
    #[error("Duplicate step id '{id}' in build type '{build_type}'")]
    DuplicateStep {
        /// Build type holding the steps.
        build_type: String,
        /// Duplicated step id.
        id: String,
    },

    /// Two build types share an id
    #[error("Duplicate build type id '{id}'")]
    DuplicateBuildType {
        /// Duplicated build type id.
        id: String,
    },

    /// Two projects share an id
    #[error("Duplicate project id '{id}'")]
    DuplicateProject {
        /// Duplicated project id.
        id: String,
    },

    /// A script step has no lines
    #[error("Step '{step}' has an empty script")]
    EmptyScript {
        /// Id of the empty step.
        step: String,
    },

    /// A build type references a VCS root that is not visible to it
    #[error("Build type '{build_type}' references unknown VCS root '{root}'")]
    UnknownVcsRoot {
        /// Referencing build type.
        build_type: String,
        /// Missing VCS root id.
        root: String,
    },

    /// A snapshot dependency points at a build type that does not exist
    #[error("Build type '{build_type}' depends on unknown build type '{dependency}'")]
    UnknownDependency {
        /// Dependent build type.
        build_type: String,
        /// Missing dependency id.
        dependency: String,
    },

    /// Snapshot dependencies form a cycle
    #[error("Circular dependency detected involving '{build_type}'")]
    CircularDependency {
        /// A build type on the cycle.
        build_type: String,
    },

    /// A failure condition is gated on a flag no toggle derives
    #[error("Failure condition in '{build_type}' is gated on unknown flag '{gate}'")]
    UnknownGate {
        /// Build type holding the condition.
        build_type: String,
        /// Name of the missing derived flag.
        gate: String,
    },

    /// A text failure condition has an empty pattern
    #[error("Failure condition pattern cannot be empty")]
    EmptyPattern,

    /// A text failure condition pattern is not a valid regular expression
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// A metric threshold is not a finite, non-negative number
    #[error("Invalid metric threshold: {value}")]
    InvalidThreshold {
        /// The rejected threshold, rendered as text.
        value: String,
    },

    /// A custom quiet period of zero seconds
    #[error("Invalid quiet period: custom mode requires a positive value, got {value}")]
    InvalidQuietPeriod {
        /// The rejected quiet period in seconds.
        value: u64,
    },

    /// A VCS root without URL
    #[error("VCS root '{root}' must have a URL")]
    MissingUrl {
        /// The VCS root id.
        root: String,
    },

    /// A template id collides with another template or a build type
    #[error("Duplicate template id '{id}'")]
    DuplicateTemplate {
        /// Duplicated template id.
        id: String,
    },

    /// A build type is based on a template that is not visible to it
    #[error("Build type '{build_type}' is based on unknown template '{template}'")]
    UnknownTemplate {
        /// Referencing build type.
        build_type: String,
        /// Missing template id.
        template: String,
    },

    /// A build number pattern is blank
    #[error("Build type '{build_type}' has an empty build number pattern")]
    EmptyBuildNumberPattern {
        /// Build type holding the settings.
        build_type: String,
    },
}
