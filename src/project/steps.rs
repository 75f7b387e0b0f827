//! Step types for build type definitions
//!
//! A step is an opaque script executed by the CI host. Steps carry a
//! stable id so they can be addressed without relying on their position.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::Validate;
use super::errors::ValidationError;
use super::types::{validate_id, validate_parameter_name};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

static PARAMETER_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%([A-Za-z0-9_](?:[A-Za-z0-9_.\-]*[A-Za-z0-9_\-])?)%")
        .expect("parameter reference pattern is valid")
});

/// PowerShell edition used to run a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerShellEdition {
    /// Windows PowerShell
    Desktop,
    /// PowerShell Core
    #[default]
    Core,
}

/// Bitness of the PowerShell host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerShellPlatform {
    /// Whatever the agent provides
    #[default]
    Auto,
    /// 32-bit
    X86,
    /// 64-bit
    X64,
}

/// Kinds of steps available in build types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    /// Shell script runner
    Script {
        /// Script body, one entry per line
        lines: Vec<String>,
    },

    /// PowerShell script runner
    #[serde(rename = "powershell")]
    PowerShell {
        /// Script body, one entry per line
        lines: Vec<String>,
        /// Edition
        #[serde(default)]
        edition: PowerShellEdition,
        /// Platform
        #[serde(default)]
        platform: PowerShellPlatform,
    },
}

impl StepKind {
    /// Returns the script lines
    pub fn lines(&self) -> &[String] {
        match self {
            Self::Script { lines } | Self::PowerShell { lines, .. } => lines,
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Script { lines } => write!(f, "script({} lines)", lines.len()),
            Self::PowerShell { lines, .. } => write!(f, "powershell({} lines)", lines.len()),
        }
    }
}

/// When a step runs relative to the outcome of previous steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMode {
    /// Only if all previous steps succeeded
    #[default]
    Default,
    /// Even if the build was stopped or failed
    Always,
    /// Only if the build has already failed
    RunOnFailure,
}

/// Comparison a step condition applies to a parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Defined and not empty
    Exists,
    /// Undefined or empty
    DoesNotExist,
    /// Equal to the value
    Equals,
    /// Undefined or different from the value
    DoesNotEqual,
    /// Contains the value
    Contains,
    /// Undefined or not containing the value
    DoesNotContain,
    /// Starts with the value
    StartsWith,
    /// Ends with the value
    EndsWith,
}

/// A parameter condition deciding whether a step runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepCondition {
    /// Inspected parameter
    pub parameter: String,
    /// Comparison
    pub operator: ConditionOperator,
    /// Operand; ignored by `exists` and `does_not_exist`
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub value: String,
}

impl StepCondition {
    /// Creates a condition
    pub fn new(
        parameter: impl Into<String>,
        operator: ConditionOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            parameter: parameter.into(),
            operator,
            value: value.into(),
        }
    }

    /// Creates an `equals` condition
    pub fn equals(parameter: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(parameter, ConditionOperator::Equals, value)
    }

    /// Creates an `exists` condition
    pub fn exists(parameter: impl Into<String>) -> Self {
        Self::new(parameter, ConditionOperator::Exists, "")
    }

    /// Evaluates the condition against the parameter's value, if any
    pub fn holds(&self, actual: Option<&str>) -> bool {
        let operand = self.value.as_str();
        match self.operator {
            ConditionOperator::Exists => actual.is_some_and(|v| !v.is_empty()),
            ConditionOperator::DoesNotExist => actual.is_none_or(str::is_empty),
            ConditionOperator::Equals => actual == Some(operand),
            ConditionOperator::DoesNotEqual => actual != Some(operand),
            ConditionOperator::Contains => actual.is_some_and(|v| v.contains(operand)),
            ConditionOperator::DoesNotContain => !actual.is_some_and(|v| v.contains(operand)),
            ConditionOperator::StartsWith => actual.is_some_and(|v| v.starts_with(operand)),
            ConditionOperator::EndsWith => actual.is_some_and(|v| v.ends_with(operand)),
        }
    }
}

impl fmt::Display for StepCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            ConditionOperator::Exists | ConditionOperator::DoesNotExist => {
                write!(f, "{} {:?}", self.parameter, self.operator)
            }
            _ => write!(f, "{} {:?} '{}'", self.parameter, self.operator, self.value),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A single step of a build type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier, unique within the build type
    pub id: String,

    /// Optional display name
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,

    /// Kind of step
    #[serde(flatten)]
    pub kind: StepKind,

    /// Execution policy
    #[serde(default)]
    pub execute_mode: ExecuteMode,

    /// Disabled steps are kept in the definition but never run
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Conditions that must all hold for the step to run
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub conditions: Vec<StepCondition>,
}

impl Step {
    /// Creates a new step
    pub fn new(id: impl Into<String>, kind: StepKind) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind,
            execute_mode: ExecuteMode::Default,
            enabled: true,
            conditions: Vec::new(),
        }
    }

    /// Creates a shell script step
    pub fn script<I, S>(id: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            id,
            StepKind::Script {
                lines: lines.into_iter().map(Into::into).collect(),
            },
        )
    }

    /// Creates a PowerShell step
    pub fn powershell<I, S>(id: impl Into<String>, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            id,
            StepKind::PowerShell {
                lines: lines.into_iter().map(Into::into).collect(),
                edition: PowerShellEdition::default(),
                platform: PowerShellPlatform::default(),
            },
        )
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the execution policy
    pub fn with_execute_mode(mut self, mode: ExecuteMode) -> Self {
        self.execute_mode = mode;
        self
    }

    /// Enables or disables the step
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Adds an execution condition
    pub fn with_condition(mut self, condition: StepCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Removes every execution condition
    pub fn clear_conditions(mut self) -> Self {
        self.conditions.clear();
        self
    }

    /// Returns true if the step is enabled and all its conditions hold for
    /// the resolved execution `parameters`
    pub fn runs_with(&self, parameters: &BTreeMap<String, String>) -> bool {
        self.enabled
            && self
                .conditions
                .iter()
                .all(|c| c.holds(parameters.get(&c.parameter).map(String::as_str)))
    }

    /// Returns the script body joined with newlines
    pub fn script_text(&self) -> String {
        self.kind.lines().join("\n")
    }

    /// Returns the names of `%parameter%` references in the script body and
    /// the parameters inspected by execution conditions
    pub fn referenced_parameters(&self) -> BTreeSet<String> {
        self.kind
            .lines()
            .iter()
            .flat_map(|line| PARAMETER_REFERENCE.captures_iter(line))
            .map(|caps| caps[1].to_string())
            .chain(self.conditions.iter().map(|c| c.parameter.clone()))
            .collect()
    }
}

impl Validate for Step {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        validate_id(&self.id)?;
        if self.kind.lines().iter().all(|line| line.trim().is_empty()) {
            return Err(ValidationError::EmptyScript {
                step: self.id.clone(),
            });
        }
        for condition in &self.conditions {
            validate_parameter_name(&condition.parameter)?;
        }
        Ok(())
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Step({}, {}): {}", self.id, name, self.kind),
            None => write!(f, "Step({}): {}", self.id, self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_step() {
        let step = Step::script("Build", ["cargo build", "cargo test"]);
        assert!(matches!(step.kind, StepKind::Script { .. }));
        assert_eq!(step.script_text(), "cargo build\ncargo test");
        assert_eq!(step.to_string(), "Step(Build): script(2 lines)");
        assert!(step.validate().is_ok());
    }

    #[test]
    fn test_powershell_step_with_name() {
        let step = Step::powershell("Publish", ["Write-Host hi"]).with_name("Publish results");
        assert_eq!(step.to_string(), "Step(Publish, Publish results): powershell(1 lines)");
        assert!(matches!(
            step.kind,
            StepKind::PowerShell {
                edition: PowerShellEdition::Core,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_script_is_invalid() {
        let step = Step::script("Empty", ["", "   "]);
        assert_eq!(
            step.validate(),
            Err(ValidationError::EmptyScript {
                step: "Empty".to_string()
            })
        );
    }

    #[test]
    fn test_referenced_parameters() {
        let step = Step::script(
            "Report",
            [
                "echo %teamcity.build.branch% %build.counter%",
                "curl -u %env.USER%:%env.TOKEN% %teamcity.serverUrl%",
                "printf '100%%'",
            ],
        );
        let refs: Vec<_> = step.referenced_parameters().into_iter().collect();
        assert_eq!(
            refs,
            vec![
                "build.counter",
                "env.TOKEN",
                "env.USER",
                "teamcity.build.branch",
                "teamcity.serverUrl",
            ]
        );
    }

    #[test]
    fn test_nested_reference_reports_inner_name_only() {
        let step = Step::script(
            "Version",
            ["echo ##teamcity[setParameter name='v' value='%autoinc.%teamcity.build.branch%%']"],
        );
        let refs: Vec<_> = step.referenced_parameters().into_iter().collect();
        assert_eq!(refs, vec!["teamcity.build.branch"]);

        let step = Step::script("Trailing", ["echo %version.% %version%"]);
        let refs: Vec<_> = step.referenced_parameters().into_iter().collect();
        assert_eq!(refs, vec!["version"]);
    }

    #[test]
    fn test_step_conditions() {
        let step = Step::script("Publish", ["cargo publish"])
            .with_condition(StepCondition::equals("teamcity.build.branch", "main"))
            .with_condition(StepCondition::exists("env.CARGO_TOKEN"));

        let mut params = BTreeMap::new();
        params.insert("teamcity.build.branch".to_string(), "main".to_string());
        assert!(!step.runs_with(&params));

        params.insert("env.CARGO_TOKEN".to_string(), "secret".to_string());
        assert!(step.runs_with(&params));
        assert!(!step.clone().with_enabled(false).runs_with(&params));

        params.insert("teamcity.build.branch".to_string(), "feature".to_string());
        assert!(!step.runs_with(&params));
        assert!(step.clear_conditions().runs_with(&params));
    }

    #[test]
    fn test_condition_operators_on_missing_value() {
        assert!(StepCondition::new("x", ConditionOperator::DoesNotExist, "").holds(None));
        assert!(StepCondition::new("x", ConditionOperator::DoesNotExist, "").holds(Some("")));
        assert!(StepCondition::new("x", ConditionOperator::DoesNotEqual, "a").holds(None));
        assert!(StepCondition::new("x", ConditionOperator::DoesNotContain, "a").holds(None));
        assert!(!StepCondition::new("x", ConditionOperator::StartsWith, "").holds(None));
        assert!(StepCondition::new("x", ConditionOperator::EndsWith, ".rs").holds(Some("main.rs")));
    }

    #[test]
    fn test_disabled_step_with_conditions_yaml() {
        let yaml = r#"
id: Sign
type: script
lines: ["sign.sh"]
enabled: false
conditions:
  - parameter: env.SIGNING_KEY
    operator: exists
"#;
        let step: Step = serde_yaml::from_str(yaml).unwrap();
        assert!(!step.enabled);
        assert_eq!(step.conditions, vec![StepCondition::exists("env.SIGNING_KEY")]);
        assert!(step.referenced_parameters().contains("env.SIGNING_KEY"));

        let plain: Step = serde_yaml::from_str("id: A\ntype: script\nlines: [make]\n").unwrap();
        assert!(plain.enabled);
        assert!(plain.conditions.is_empty());
    }

    #[test]
    fn test_step_yaml_shape() {
        let yaml = "id: Test\ntype: powershell\nlines:\n  - Invoke-Pester\nedition: desktop\nexecute_mode: always\n";
        let step: Step = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(step.execute_mode, ExecuteMode::Always);
        assert!(matches!(
            step.kind,
            StepKind::PowerShell {
                edition: PowerShellEdition::Desktop,
                platform: PowerShellPlatform::Auto,
                ..
            }
        ));
    }
}
