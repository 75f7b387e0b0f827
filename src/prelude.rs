//! Prelude module for common imports

// Re-export macros
pub use crate::{checkbox, fail_on_text, param, powershell, script, steps, toggle, vcs_trigger};

// Re-export the project model with full paths
pub use crate::project::build_type::{
    BuildType, BuildTypeBuilder, BuildTypeSettings, DependencyFailureAction, ReuseBuilds,
    SnapshotDependency,
};
pub use crate::project::errors::{ConfigError, ValidationError};
pub use crate::project::failure::{
    BaselineBuild, Comparison, FailureCondition, MetricCondition, MetricKind, MetricUnits,
    TextCondition, TextConditionType,
};
pub use crate::project::parameters::{Parameter, ParameterDisplay, Parameters};
pub use crate::project::project_def::{Project, ProjectBuilder};
pub use crate::project::steps::{ConditionOperator, ExecuteMode, Step, StepCondition, StepKind};
pub use crate::project::template::Template;
pub use crate::project::toggle::ParameterToggle;
pub use crate::project::triggers::{QuietPeriodMode, Trigger};
pub use crate::project::types::Validate;
pub use crate::project::vcs::VcsRoot;

// Re-export overlay and evaluation types
pub use crate::evaluation::{ConditionOutcome, DryRunInput, Enforcement, ExecutionScope};
pub use crate::patch::{
    ExpectedParameter, FailureConditionMatcher, PatchError, PatchOverlay, ParameterOverride,
    VcsTriggerFields, apply_all,
};
