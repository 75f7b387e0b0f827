//! Build type definition and builder

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::errors::ValidationError;
use super::failure::FailureCondition;
use super::parameters::{Parameter, Parameters};
use super::steps::Step;
use super::toggle::ParameterToggle;
use super::triggers::Trigger;
use super::types::{Validate, validate_id};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// What happens to a build when one of its dependencies fails or is
/// cancelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyFailureAction {
    /// Run the build and report a build problem
    #[default]
    AddProblem,
    /// Run the build and ignore the dependency result
    Ignore,
    /// Do not run the build and mark it as failed to start
    FailToStart,
    /// Do not run the build and mark it as cancelled
    Cancel,
}

/// Whether a suitable finished build may satisfy a snapshot dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReuseBuilds {
    /// Reuse a successful build with the same revisions
    #[default]
    Successful,
    /// Reuse any finished build with the same revisions
    Any,
    /// Always start a new build
    No,
}

fn default_true() -> bool {
    true
}

/// Snapshot dependency on another build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotDependency {
    /// Id of the build type depended upon
    pub build_type: String,

    /// Reaction to a failed dependency
    #[serde(default)]
    pub on_dependency_failure: DependencyFailureAction,

    /// Reaction to a cancelled dependency
    #[serde(default)]
    pub on_dependency_cancel: DependencyFailureAction,

    /// Build reuse policy
    #[serde(default)]
    pub reuse_builds: ReuseBuilds,

    /// Run the dependency on the same revisions as the dependent build
    #[serde(default = "default_true")]
    pub synchronize_revisions: bool,
}

impl SnapshotDependency {
    /// Creates a dependency with default failure handling
    pub fn new(build_type: impl Into<String>) -> Self {
        Self {
            build_type: build_type.into(),
            on_dependency_failure: DependencyFailureAction::AddProblem,
            on_dependency_cancel: DependencyFailureAction::AddProblem,
            reuse_builds: ReuseBuilds::Successful,
            synchronize_revisions: true,
        }
    }

    /// Sets failure handling
    pub fn on_failure(mut self, action: DependencyFailureAction) -> Self {
        self.on_dependency_failure = action;
        self
    }

    /// Sets cancellation handling
    pub fn on_cancel(mut self, action: DependencyFailureAction) -> Self {
        self.on_dependency_cancel = action;
        self
    }

    /// Sets the build reuse policy
    pub fn reuse(mut self, reuse: ReuseBuilds) -> Self {
        self.reuse_builds = reuse;
        self
    }
}

fn default_build_number_pattern() -> String {
    "%build.counter%".to_string()
}

/// General settings of a build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildTypeSettings {
    /// Allow personal builds
    #[serde(default = "default_true")]
    pub enable_personal_builds: bool,

    /// Maximum number of concurrently running builds; 0 means unlimited
    #[serde(default)]
    pub max_running_builds: u32,

    /// Pattern producing the build number
    #[serde(default = "default_build_number_pattern")]
    pub build_number_pattern: String,
}

impl Default for BuildTypeSettings {
    fn default() -> Self {
        Self {
            enable_personal_builds: true,
            max_running_builds: 0,
            build_number_pattern: default_build_number_pattern(),
        }
    }
}

impl BuildTypeSettings {
    /// Enables or disables personal builds
    pub fn with_personal_builds(mut self, enabled: bool) -> Self {
        self.enable_personal_builds = enabled;
        self
    }

    /// Limits concurrently running builds
    pub fn with_max_running_builds(mut self, max: u32) -> Self {
        self.max_running_builds = max;
        self
    }

    /// Sets the build number pattern
    pub fn with_build_number_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.build_number_pattern = pattern.into();
        self
    }
}

/// A named, independently triggerable unit of CI configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildType {
    /// Identifier, unique across the project tree
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Ids of VCS roots checked out by this build type
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vcs_roots: Vec<String>,

    /// Parameters
    #[serde(skip_serializing_if = "Parameters::is_empty", default)]
    pub parameters: Parameters,

    /// Steps in execution order
    #[serde(default)]
    pub steps: Vec<Step>,

    /// Triggers
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub triggers: Vec<Trigger>,

    /// Failure conditions
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub failure_conditions: Vec<FailureCondition>,

    /// Snapshot dependencies
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub dependencies: Vec<SnapshotDependency>,

    /// Parameter toggles deriving gate flags
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub toggles: Vec<ParameterToggle>,

    /// General settings; unset settings fall back to the templates' or the
    /// defaults
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub settings: Option<BuildTypeSettings>,

    /// Ids of the templates this build type is based on, in merge order
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub templates: Vec<String>,
}

impl BuildType {
    /// Creates a new build type builder
    pub fn builder(id: impl Into<String>) -> BuildTypeBuilder {
        BuildTypeBuilder::new(id)
    }

    /// Finds a step by id
    pub fn step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    /// Returns the position of a step
    pub fn step_position(&self, id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == id)
    }

    /// Returns the value of a parameter
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.value(name)
    }

    /// Returns the names of derived flags declared by toggles
    pub fn derived_flags(&self) -> impl Iterator<Item = &str> {
        self.toggles.iter().map(|t| t.derived.as_str())
    }

    /// Returns the declared settings or the defaults
    pub fn effective_settings(&self) -> BuildTypeSettings {
        self.settings.clone().unwrap_or_default()
    }
}

impl Validate for BuildType {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        validate_id(&self.id)?;
        self.parameters.validate_for(&self.id)?;

        let mut step_ids = HashSet::new();
        for step in &self.steps {
            step.validate()?;
            if !step_ids.insert(step.id.as_str()) {
                return Err(ValidationError::DuplicateStep {
                    build_type: self.id.clone(),
                    id: step.id.clone(),
                });
            }
        }

        for trigger in &self.triggers {
            trigger.validate()?;
        }

        for toggle in &self.toggles {
            toggle.validate()?;
        }

        if let Some(settings) = &self.settings
            && settings.build_number_pattern.trim().is_empty()
        {
            return Err(ValidationError::EmptyBuildNumberPattern {
                build_type: self.id.clone(),
            });
        }

        // Gates may be declared by a template; the project checks the merged result.
        let based_on_template = !self.templates.is_empty();
        let flags: HashSet<&str> = self.derived_flags().collect();
        for condition in &self.failure_conditions {
            condition.validate()?;
            if let Some(gate) = &condition.gate
                && !based_on_template
                && !flags.contains(gate.as_str())
            {
                return Err(ValidationError::UnknownGate {
                    build_type: self.id.clone(),
                    gate: gate.clone(),
                });
            }
        }

        if self.dependencies.iter().any(|d| d.build_type == self.id) {
            return Err(ValidationError::CircularDependency {
                build_type: self.id.clone(),
            });
        }

        Ok(())
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BuildType({}): {} steps, {} parameters",
            self.id,
            self.steps.len(),
            self.parameters.len()
        )
    }
}

/// Builder for creating build types
#[derive(Debug, Clone)]
pub struct BuildTypeBuilder {
    build_type: BuildType,
}

impl BuildTypeBuilder {
    /// Creates a new builder; the name defaults to the id
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            build_type: BuildType {
                name: id.clone(),
                id,
                description: None,
                vcs_roots: Vec::new(),
                parameters: Parameters::new(),
                steps: Vec::new(),
                triggers: Vec::new(),
                failure_conditions: Vec::new(),
                dependencies: Vec::new(),
                toggles: Vec::new(),
                settings: None,
                templates: Vec::new(),
            },
        }
    }

    /// Sets display name
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.build_type.name = name.into();
        self
    }

    /// Sets description
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.build_type.description = Some(description.into());
        self
    }

    /// References a VCS root
    pub fn vcs_root(mut self, id: impl Into<String>) -> Self {
        self.build_type.vcs_roots.push(id.into());
        self
    }

    /// Adds a parameter; duplicates are reported by [`build`](Self::build)
    pub fn param(mut self, parameter: Parameter) -> Self {
        self.build_type.parameters.push(parameter);
        self
    }

    /// Adds a step
    pub fn step(mut self, step: Step) -> Self {
        self.build_type.steps.push(step);
        self
    }

    /// Adds multiple steps
    pub fn steps(mut self, steps: Vec<Step>) -> Self {
        self.build_type.steps.extend(steps);
        self
    }

    /// Adds a trigger
    pub fn trigger(mut self, trigger: Trigger) -> Self {
        self.build_type.triggers.push(trigger);
        self
    }

    /// Adds a failure condition
    pub fn failure_condition(mut self, condition: FailureCondition) -> Self {
        self.build_type.failure_conditions.push(condition);
        self
    }

    /// Adds a snapshot dependency
    pub fn depends_on(mut self, dependency: SnapshotDependency) -> Self {
        self.build_type.dependencies.push(dependency);
        self
    }

    /// Adds a parameter toggle
    pub fn toggle(mut self, toggle: ParameterToggle) -> Self {
        self.build_type.toggles.push(toggle);
        self
    }

    /// Sets general settings
    pub fn settings(mut self, settings: BuildTypeSettings) -> Self {
        self.build_type.settings = Some(settings);
        self
    }

    /// Bases the build type on a template
    pub fn template(mut self, id: impl Into<String>) -> Self {
        self.build_type.templates.push(id.into());
        self
    }

    /// Builds the build type
    #[allow(clippy::missing_errors_doc)]
    pub fn build(self) -> Result<BuildType, ValidationError> {
        self.build_type.validate()?;
        Ok(self.build_type)
    }

    /// Builds the build type without validation
    #[must_use]
    pub fn build_unchecked(self) -> BuildType {
        self.build_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::failure::{TextCondition, TextConditionType};

    fn coverage_text_condition() -> FailureCondition {
        FailureCondition::text(TextCondition::new(
            TextConditionType::Contains,
            "Coverage below threshold",
        ))
    }

    #[test]
    fn test_build_type_builder() {
        let build_type = BuildType::builder("UnitTests")
            .name("Unit tests")
            .vcs_root("MainRepo")
            .param(Parameter::new("system.coverage", "true"))
            .step(Step::script("Test", ["cargo test"]))
            .trigger(Trigger::vcs())
            .build()
            .unwrap();

        assert_eq!(build_type.name, "Unit tests");
        assert_eq!(build_type.parameter("system.coverage"), Some("true"));
        assert_eq!(build_type.step_position("Test"), Some(0));
        assert_eq!(
            build_type.to_string(),
            "BuildType(UnitTests): 1 steps, 1 parameters"
        );
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let result = BuildType::builder("Build")
            .param(Parameter::new("a", "1"))
            .param(Parameter::new("a", "2"))
            .build();
        assert!(matches!(
            result,
            Err(ValidationError::DuplicateParameter { .. })
        ));
    }

    #[test]
    fn test_duplicate_step_rejected() {
        let result = BuildType::builder("Build")
            .step(Step::script("Compile", ["make"]))
            .step(Step::script("Compile", ["make install"]))
            .build();
        assert_eq!(
            result,
            Err(ValidationError::DuplicateStep {
                build_type: "Build".to_string(),
                id: "Compile".to_string(),
            })
        );
    }

    #[test]
    fn test_unknown_gate_rejected() {
        let result = BuildType::builder("Build")
            .failure_condition(coverage_text_condition().gated_by("coverage.enforced"))
            .build();
        assert!(matches!(result, Err(ValidationError::UnknownGate { .. })));

        let result = BuildType::builder("Build")
            .toggle(ParameterToggle::new("TightenCoverage", "coverage.enforced"))
            .failure_condition(coverage_text_condition().gated_by("coverage.enforced"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_gate_from_template_deferred_to_project() {
        let result = BuildType::builder("Build")
            .template("CoverageTemplate")
            .failure_condition(coverage_text_condition().gated_by("coverage.enforced"))
            .build();
        assert!(result.is_ok());
    }

    #[test]
    fn test_settings() {
        let build_type = BuildType::builder("RetrievePluginPath")
            .settings(
                BuildTypeSettings::default()
                    .with_personal_builds(false)
                    .with_max_running_builds(1),
            )
            .build()
            .unwrap();
        let settings = build_type.effective_settings();
        assert!(!settings.enable_personal_builds);
        assert_eq!(settings.max_running_builds, 1);
        assert_eq!(settings.build_number_pattern, "%build.counter%");

        let plain = BuildType::builder("Plain").build().unwrap();
        assert_eq!(plain.effective_settings(), BuildTypeSettings::default());

        let result = BuildType::builder("Blank")
            .settings(BuildTypeSettings::default().with_build_number_pattern("  "))
            .build();
        assert_eq!(
            result,
            Err(ValidationError::EmptyBuildNumberPattern {
                build_type: "Blank".to_string()
            })
        );
    }

    #[test]
    fn test_settings_yaml_defaults() {
        let settings: BuildTypeSettings = serde_yaml::from_str("max_running_builds: 1\n").unwrap();
        assert_eq!(settings.max_running_builds, 1);
        assert!(settings.enable_personal_builds);
        assert_eq!(settings.build_number_pattern, "%build.counter%");
    }

    #[test]
    fn test_dependency_yaml_roundtrip() {
        let yaml = r#"
build_type: AddBuildCounter
on_dependency_failure: fail_to_start
on_dependency_cancel: cancel
reuse_builds: "no"
synchronize_revisions: false
"#;
        let dependency: SnapshotDependency = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            dependency,
            SnapshotDependency {
                build_type: "AddBuildCounter".to_string(),
                on_dependency_failure: DependencyFailureAction::FailToStart,
                on_dependency_cancel: DependencyFailureAction::Cancel,
                reuse_builds: ReuseBuilds::No,
                synchronize_revisions: false,
            }
        );

        let rendered = serde_yaml::to_string(&dependency).unwrap();
        assert!(rendered.contains("on_dependency_failure: fail_to_start"));
        assert!(rendered.contains("on_dependency_cancel: cancel"));
        let reparsed: SnapshotDependency = serde_yaml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, dependency);

        let defaults: SnapshotDependency =
            serde_yaml::from_str("build_type: AddBuildCounter\n").unwrap();
        assert_eq!(defaults, SnapshotDependency::new("AddBuildCounter"));
        assert_eq!(defaults.on_dependency_failure, DependencyFailureAction::AddProblem);
        assert_eq!(defaults.reuse_builds, ReuseBuilds::Successful);
    }

    #[test]
    fn test_dependency_builders() {
        let dependency = SnapshotDependency::new("Compile")
            .on_failure(DependencyFailureAction::Ignore)
            .on_cancel(DependencyFailureAction::FailToStart)
            .reuse(ReuseBuilds::Any);
        assert_eq!(dependency.on_dependency_failure, DependencyFailureAction::Ignore);
        assert_eq!(dependency.on_dependency_cancel, DependencyFailureAction::FailToStart);
        assert_eq!(dependency.reuse_builds, ReuseBuilds::Any);
    }

    #[test]
    fn test_self_dependency_rejected() {
        let result = BuildType::builder("Build")
            .depends_on(SnapshotDependency::new("Build"))
            .build();
        assert!(matches!(
            result,
            Err(ValidationError::CircularDependency { .. })
        ));
    }
}
