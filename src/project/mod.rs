//! Project domain types and logic

pub mod build_type;
pub mod errors;
pub mod failure;
pub mod parameters;
pub mod project_def;
pub mod steps;
pub mod template;
pub mod toggle;
pub mod triggers;
pub mod types;
pub mod vcs;


pub use build_type::{
    BuildType, BuildTypeBuilder, BuildTypeSettings, DependencyFailureAction, ReuseBuilds,
    SnapshotDependency,
};
pub use errors::{ConfigError, ValidationError};
pub use failure::{
    BaselineBuild, Comparison, FailureCondition, FailureConditionKind, FailureConditionType,
    MetricCondition, MetricKind, MetricUnits, TextCondition, TextConditionType,
};
pub use parameters::{Checkbox, Parameter, ParameterDisplay, Parameters};
pub use project_def::{Project, ProjectBuilder};
pub use steps::{
    ConditionOperator, ExecuteMode, PowerShellEdition, PowerShellPlatform, Step, StepCondition,
    StepKind,
};
pub use template::Template;
pub use toggle::{ParameterToggle, is_false_like};
pub use triggers::{QuietPeriodMode, Trigger, VcsTriggerConfig};
pub use types::Validate;
pub use vcs::VcsRoot;
