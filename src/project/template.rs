//! Build type templates
//!
//! A template carries the same content as a build type but is never run.
//! Build types list the templates they are based on; the effective build
//! type layers each template in order and then the build type's own
//! content on top.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::build_type::{BuildType, BuildTypeSettings, SnapshotDependency};
use super::errors::ValidationError;
use super::failure::FailureCondition;
use super::parameters::Parameters;
use super::steps::Step;
use super::toggle::ParameterToggle;
use super::triggers::Trigger;
use super::types::Validate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reusable build type content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Template {
    /// Identifier, sharing the namespace of build types
    pub id: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    /// Description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,

    /// Ids of VCS roots
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub vcs_roots: Vec<String>,

    /// Parameters
    #[serde(skip_serializing_if = "Parameters::is_empty", default)]
    pub parameters: Parameters,

    /// Steps
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
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

    /// Parameter toggles
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub toggles: Vec<ParameterToggle>,

    /// General settings
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub settings: Option<BuildTypeSettings>,
}

impl Template {
    /// Views the template as a build type without templates of its own
    pub fn as_build_type(&self) -> BuildType {
        BuildType {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            vcs_roots: self.vcs_roots.clone(),
            parameters: self.parameters.clone(),
            steps: self.steps.clone(),
            triggers: self.triggers.clone(),
            failure_conditions: self.failure_conditions.clone(),
            dependencies: self.dependencies.clone(),
            toggles: self.toggles.clone(),
            settings: self.settings.clone(),
            templates: Vec::new(),
        }
    }
}

impl From<BuildType> for Template {
    fn from(build_type: BuildType) -> Self {
        Self {
            id: build_type.id,
            name: build_type.name,
            description: build_type.description,
            vcs_roots: build_type.vcs_roots,
            parameters: build_type.parameters,
            steps: build_type.steps,
            triggers: build_type.triggers,
            failure_conditions: build_type.failure_conditions,
            dependencies: build_type.dependencies,
            toggles: build_type.toggles,
            settings: build_type.settings,
        }
    }
}

impl Validate for Template {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        self.as_build_type().validate()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Template({}): {} steps, {} parameters",
            self.id,
            self.steps.len(),
            self.parameters.len()
        )
    }
}

fn layer(target: &mut BuildType, source: &BuildType) {
    for root in &source.vcs_roots {
        if !target.vcs_roots.contains(root) {
            target.vcs_roots.push(root.clone());
        }
    }
    for parameter in &source.parameters {
        target.parameters.upsert(parameter.clone());
    }
    for step in &source.steps {
        match target.steps.iter_mut().find(|s| s.id == step.id) {
            Some(existing) => *existing = step.clone(),
            None => target.steps.push(step.clone()),
        }
    }
    target.triggers.extend(source.triggers.iter().cloned());
    target
        .failure_conditions
        .extend(source.failure_conditions.iter().cloned());
    for dependency in &source.dependencies {
        match target
            .dependencies
            .iter_mut()
            .find(|d| d.build_type == dependency.build_type)
        {
            Some(existing) => *existing = dependency.clone(),
            None => target.dependencies.push(dependency.clone()),
        }
    }
    for toggle in &source.toggles {
        if !target.toggles.contains(toggle) {
            target.toggles.push(toggle.clone());
        }
    }
    if source.settings.is_some() {
        target.settings.clone_from(&source.settings);
    }
}

/// Merges `templates`, in order, under the content of `build_type`.
///
/// Parameters are overridden by name, steps by id in place, and
/// dependencies by target build type. Triggers and failure conditions are
/// appended. The result lists no templates.
pub fn resolve(build_type: &BuildType, templates: &[&Template]) -> BuildType {
    let mut resolved = BuildType::builder(build_type.id.clone())
        .name(build_type.name.clone())
        .build_unchecked();
    resolved.description.clone_from(&build_type.description);
    for template in templates {
        layer(&mut resolved, &template.as_build_type());
    }
    layer(&mut resolved, build_type);
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::build_type::ReuseBuilds;
    use crate::project::failure::{TextCondition, TextConditionType};
    use crate::project::parameters::Parameter;
    use pretty_assertions::assert_eq;

    fn template() -> Template {
        Template::from(
            BuildType::builder("Template1")
                .param(Parameter::new("dep.AddBuildCounter.build.number", "10"))
                .param(Parameter::new("coverage.threshold", "80"))
                .step(Step::script("FetchPluginPath", ["echo %build.number%"]))
                .step(Step::script("Report", ["echo done"]))
                .depends_on(SnapshotDependency::new("AddBuildCounter").reuse(ReuseBuilds::No))
                .settings(
                    BuildTypeSettings::default()
                        .with_personal_builds(false)
                        .with_max_running_builds(1),
                )
                .toggle(ParameterToggle::new("TightenCoverage", "coverage.enforced"))
                .build_unchecked(),
        )
    }

    #[test]
    fn test_template_validates_like_build_type() {
        assert!(template().validate().is_ok());
        let mut broken = template();
        broken.steps.push(Step::script("Report", ["echo again"]));
        assert!(matches!(
            broken.validate(),
            Err(ValidationError::DuplicateStep { .. })
        ));
    }

    #[test]
    fn test_resolve_layers_own_content_over_template() {
        let build_type = BuildType::builder("CheckTestCoverage")
            .template("Template1")
            .param(Parameter::new("coverage.threshold", "90"))
            .param(Parameter::new("TightenCoverage", "true"))
            .step(Step::script("Report", ["echo done"]).with_enabled(false))
            .step(Step::script("Test", ["cargo test"]))
            .failure_condition(
                FailureCondition::text(TextCondition::new(
                    TextConditionType::Contains,
                    "Coverage below",
                ))
                .gated_by("coverage.enforced"),
            )
            .build_unchecked();

        let resolved = resolve(&build_type, &[&template()]);

        assert!(resolved.templates.is_empty());
        assert_eq!(resolved.parameter("coverage.threshold"), Some("90"));
        assert_eq!(resolved.parameter("dep.AddBuildCounter.build.number"), Some("10"));
        let steps: Vec<_> = resolved.steps.iter().map(|s| (s.id.as_str(), s.enabled)).collect();
        assert_eq!(
            steps,
            vec![("FetchPluginPath", true), ("Report", false), ("Test", true)]
        );
        assert_eq!(resolved.dependencies.len(), 1);
        assert_eq!(resolved.dependencies[0].reuse_builds, ReuseBuilds::No);
        assert_eq!(resolved.effective_settings().max_running_builds, 1);
        assert!(resolved.validate().is_ok());
    }

    #[test]
    fn test_later_layers_win_settings_and_dependencies() {
        let second = Template::from(
            BuildType::builder("Template2")
                .depends_on(SnapshotDependency::new("AddBuildCounter"))
                .settings(BuildTypeSettings::default().with_build_number_pattern("1.0.%build.counter%"))
                .build_unchecked(),
        );
        let build_type = BuildType::builder("Build")
            .template("Template1")
            .template("Template2")
            .build_unchecked();

        let resolved = resolve(&build_type, &[&template(), &second]);
        assert_eq!(resolved.dependencies, vec![SnapshotDependency::new("AddBuildCounter")]);
        assert_eq!(
            resolved.effective_settings().build_number_pattern,
            "1.0.%build.counter%"
        );
        assert!(resolved.effective_settings().enable_personal_builds);
    }

    #[test]
    fn test_template_yaml() {
        let yaml = r#"
id: Template1
name: Template1
settings:
  enable_personal_builds: false
  max_running_builds: 1
steps:
  - id: FetchPluginPath
    type: script
    lines: ["echo %build.counter%"]
dependencies:
  - build_type: AddBuildCounter
    reuse_builds: "no"
"#;
        let parsed: Template = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(parsed.steps.len(), 1);
        assert_eq!(parsed.dependencies[0].reuse_builds, ReuseBuilds::No);
        assert_eq!(parsed.settings.as_ref().map(|s| s.max_running_builds), Some(1));
        assert_eq!(parsed.to_string(), "Template(Template1): 1 steps, 0 parameters");
    }
}
