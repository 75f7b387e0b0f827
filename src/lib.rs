//! # Buildtree - CI configuration as code
//!
//! Buildtree models the configuration of a CI server as a typed tree of
//! projects and build types, and lets later files modify earlier
//! declarations through patch overlays that check the state they expect
//! before changing anything.
//!
//! ## Quick Start
//!
//! ```
//! use buildtree::prelude::*;
//!
//! let build_type = BuildType::builder("UnitTests")
//!     .param(param!("system.coverage" => "true"))
//!     .step(script!("Test", "cargo test"))
//!     .build()
//!     .unwrap();
//!
//! let overlay = PatchOverlay::new("UnitTests")
//!     .remove_parameter("system.coverage", "true")
//!     .add_parameter(param!("coverage" => "true"));
//!
//! let patched = overlay.patch(&build_type).unwrap();
//! assert_eq!(patched.parameter("coverage"), Some("true"));
//! ```
//!
//! ## Features
//!
//! - **Typed tree**: projects, templates, build types, parameters, steps,
//!   triggers, failure conditions and snapshot dependencies, validated as a
//!   whole with templates merged in
//! - **Patch overlays**: expectation-checked edits applied all-or-nothing
//! - **Parameter toggles**: per-execution derived flags gating failure
//!   conditions, with a local dry run
//! - **Documents**: YAML and JSON via serde

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod macros;

pub mod evaluation;
pub mod infrastructure;
pub mod patch;
pub mod project;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use evaluation::{ConditionOutcome, DryRunInput, Enforcement, ExecutionScope, MetricSample};
pub use infrastructure::{Config, DocumentFormat};
pub use patch::{Edit, PatchError, PatchOverlay, apply_all};
pub use project::{
    BuildType, BuildTypeBuilder, ConfigError, FailureCondition, Parameter, ParameterToggle,
    Parameters, Project, ProjectBuilder, Step, Template, Trigger, Validate, ValidationError,
    VcsRoot,
};

/// Version of the buildtree crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
