//! Edits a patch overlay can make
//!
//! Every edit locates its target first and checks the state it expects to
//! find there before changing anything.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::errors::PatchError;
use crate::project::types::validate_parameter_name;
use crate::project::{
    BuildType, Checkbox, FailureCondition, FailureConditionKind, FailureConditionType,
    MetricKind, Parameter, ParameterDisplay, QuietPeriodMode, Step, Trigger, Validate,
    ValidationError,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Optional VCS trigger fields, used both to match and to set
///
/// As a predicate, every present field must equal the trigger's value.
/// As a setting, every present field is written and absent ones are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VcsTriggerFields {
    /// Enabled flag
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enabled: Option<bool>,
    /// Quiet period mode
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quiet_period_mode: Option<QuietPeriodMode>,
    /// Quiet period in seconds
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub quiet_period: Option<u64>,
    /// Per-checkin triggering
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub per_checkin_triggering: Option<bool>,
    /// Queue optimization
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub enable_queue_optimization: Option<bool>,
    /// Branch filter rules
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub branch_filter: Option<Vec<String>>,
}

impl VcsTriggerFields {
    /// Creates an empty field set, which matches every trigger
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `enabled`
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// Sets `quiet_period_mode`
    pub fn quiet_period_mode(mut self, mode: QuietPeriodMode) -> Self {
        self.quiet_period_mode = Some(mode);
        self
    }

    /// Sets `quiet_period`
    pub fn quiet_period(mut self, seconds: u64) -> Self {
        self.quiet_period = Some(seconds);
        self
    }

    /// Sets `per_checkin_triggering`
    pub fn per_checkin_triggering(mut self, per_checkin: bool) -> Self {
        self.per_checkin_triggering = Some(per_checkin);
        self
    }

    /// Sets `enable_queue_optimization`
    pub fn enable_queue_optimization(mut self, enabled: bool) -> Self {
        self.enable_queue_optimization = Some(enabled);
        self
    }

    /// Sets `branch_filter`
    pub fn branch_filter(mut self, rules: Vec<String>) -> Self {
        self.branch_filter = Some(rules);
        self
    }

    /// Returns true if no field is present
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns true if every present field equals the trigger's value
    pub fn matches(&self, trigger: &Trigger) -> bool {
        let config = trigger.config();
        self.enabled.is_none_or(|v| v == config.enabled)
            && self
                .quiet_period_mode
                .is_none_or(|v| v == config.quiet_period_mode)
            && self.quiet_period.is_none_or(|v| v == config.quiet_period)
            && self
                .per_checkin_triggering
                .is_none_or(|v| v == config.per_checkin_triggering)
            && self
                .enable_queue_optimization
                .is_none_or(|v| v == config.enable_queue_optimization)
            && self
                .branch_filter
                .as_ref()
                .is_none_or(|v| *v == config.branch_filter)
    }

    /// Writes every present field into the trigger
    pub fn apply_to(&self, trigger: &mut Trigger) {
        let config = trigger.config_mut();
        if let Some(enabled) = self.enabled {
            config.enabled = enabled;
        }
        if let Some(mode) = self.quiet_period_mode {
            config.quiet_period_mode = mode;
        }
        if let Some(seconds) = self.quiet_period {
            config.quiet_period = seconds;
        }
        if let Some(per_checkin) = self.per_checkin_triggering {
            config.per_checkin_triggering = per_checkin;
        }
        if let Some(optimize) = self.enable_queue_optimization {
            config.enable_queue_optimization = optimize;
        }
        if let Some(rules) = &self.branch_filter {
            config.branch_filter.clone_from(rules);
        }
    }
}

/// Predicate locating a failure condition
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailureConditionMatcher {
    /// Condition id
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,
    /// Variant tag
    #[serde(
        rename = "type",
        skip_serializing_if = "Option::is_none",
        default
    )]
    pub condition_type: Option<FailureConditionType>,
    /// Text pattern, for text conditions
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pattern: Option<String>,
    /// Metric, for metric conditions
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metric: Option<MetricKind>,
    /// Gate flag
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gate: Option<String>,
}

impl FailureConditionMatcher {
    /// Matches conditions with this id
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Matches text conditions with this pattern
    pub fn by_pattern(pattern: impl Into<String>) -> Self {
        Self {
            condition_type: Some(FailureConditionType::Text),
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Matches metric conditions on this metric
    pub fn by_metric(metric: MetricKind) -> Self {
        Self {
            condition_type: Some(FailureConditionType::Metric),
            metric: Some(metric),
            ..Self::default()
        }
    }

    /// Returns true if every present field equals the condition's value
    pub fn matches(&self, condition: &FailureCondition) -> bool {
        let pattern = match &condition.kind {
            FailureConditionKind::Text(text) => Some(text.pattern.as_str()),
            FailureConditionKind::Metric(_) => None,
        };
        let metric = match &condition.kind {
            FailureConditionKind::Metric(m) => Some(m.metric),
            FailureConditionKind::Text(_) => None,
        };
        self.id
            .as_deref()
            .is_none_or(|id| condition.id.as_deref() == Some(id))
            && self
                .condition_type
                .is_none_or(|t| t == condition.condition_type())
            && self.pattern.as_deref().is_none_or(|p| pattern == Some(p))
            && self.metric.is_none_or(|m| metric == Some(m))
            && self
                .gate
                .as_deref()
                .is_none_or(|g| condition.gate.as_deref() == Some(g))
    }
}

/// The state a parameter must be in before it is removed
///
/// `name` and `expected_value` are always checked; every other present
/// field must equal the parameter's as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedParameter {
    /// Parameter name
    pub name: String,
    /// Value the parameter must currently hold
    pub expected_value: String,
    /// Expected display semantics
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub display: Option<ParameterDisplay>,
    /// Expected label
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    /// Expected description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    /// Expected checkbox values
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub checkbox: Option<Checkbox>,
}

impl ExpectedParameter {
    /// Expects `name` to hold `expected_value`
    pub fn new(name: impl Into<String>, expected_value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expected_value: expected_value.into(),
            display: None,
            label: None,
            description: None,
            checkbox: None,
        }
    }

    /// Expects every field of `parameter`
    pub fn exactly(parameter: &Parameter) -> Self {
        Self {
            name: parameter.name.clone(),
            expected_value: parameter.value.clone(),
            display: Some(parameter.display),
            label: parameter.label.clone(),
            description: parameter.description.clone(),
            checkbox: parameter.checkbox.clone(),
        }
    }

    /// Also expects display semantics
    pub fn with_display(mut self, display: ParameterDisplay) -> Self {
        self.display = Some(display);
        self
    }

    /// Also expects a label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Also expects checkbox values
    pub fn with_checkbox(mut self, checked: impl Into<String>, unchecked: impl Into<String>) -> Self {
        self.checkbox = Some(Checkbox {
            checked: checked.into(),
            unchecked: unchecked.into(),
        });
        self
    }

    fn check(&self, build_type: &BuildType) -> Result<(), PatchError> {
        let name = &self.name;
        let actual = build_type
            .parameters
            .get(name)
            .ok_or_else(|| PatchError::ParameterNotFound {
                build_type: build_type.id.clone(),
                name: name.clone(),
            })?;
        let mismatch = |field: &str, expected: String, found: String| PatchError::ExpectationMismatch {
            build_type: build_type.id.clone(),
            what: format!("parameter '{name}' {field}"),
            expected,
            actual: found,
        };

        if actual.value != self.expected_value {
            return Err(mismatch("value", self.expected_value.clone(), actual.value.clone()));
        }
        if let Some(display) = self.display
            && display != actual.display
        {
            return Err(mismatch("display", format!("{display:?}"), format!("{:?}", actual.display)));
        }
        if self.label.is_some() && self.label != actual.label {
            return Err(mismatch("label", format!("{:?}", self.label), format!("{:?}", actual.label)));
        }
        if self.description.is_some() && self.description != actual.description {
            return Err(mismatch(
                "description",
                format!("{:?}", self.description),
                format!("{:?}", actual.description),
            ));
        }
        if self.checkbox.is_some() && self.checkbox != actual.checkbox {
            return Err(mismatch(
                "checkbox",
                format!("{:?}", self.checkbox),
                format!("{:?}", actual.checkbox),
            ));
        }
        Ok(())
    }
}

/// A set of parameter removals and additions
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterOverride {
    /// Parameters to remove
    #[serde(default)]
    pub remove: Vec<ExpectedParameter>,
    /// Parameters to add
    #[serde(default)]
    pub add: Vec<Parameter>,
}

impl ParameterOverride {
    /// Creates an empty override
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes `name`, which must currently equal `expected_value`
    pub fn remove(mut self, name: impl Into<String>, expected_value: impl Into<String>) -> Self {
        self.remove.push(ExpectedParameter::new(name, expected_value));
        self
    }

    /// Removes a parameter that must match every present field of `expected`
    pub fn remove_matching(mut self, expected: ExpectedParameter) -> Self {
        self.remove.push(expected);
        self
    }

    /// Adds a parameter
    pub fn add(mut self, parameter: Parameter) -> Self {
        self.add.push(parameter);
        self
    }

    /// Expands into edits, removals first
    pub fn into_edits(self) -> Vec<Edit> {
        let removals = self.remove.into_iter().map(Edit::RemoveParameter);
        let additions = self
            .add
            .into_iter()
            .map(|parameter| Edit::AddParameter { parameter });
        removals.chain(additions).collect()
    }
}

/// A single targeted modification of a build type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Edit {
    /// Remove a parameter in the expected state
    RemoveParameter(ExpectedParameter),

    /// Add a parameter whose name is not taken
    AddParameter {
        /// New parameter
        parameter: Parameter,
    },

    /// Change the value of a parameter holding the expected value
    UpdateParameter {
        /// Parameter name
        name: String,
        /// Value it must currently hold
        expected_value: String,
        /// New value
        value: String,
    },

    /// Insert a step, at the end or after an existing step
    AddStep {
        /// New step
        step: Step,
        /// Id of the step to insert after
        #[serde(skip_serializing_if = "Option::is_none", default)]
        after: Option<String>,
    },

    /// Remove a step that matches the expected definition
    RemoveStep {
        /// Step id
        id: String,
        /// Full definition it must currently have
        expected: Step,
    },

    /// Replace a step that matches the expected definition
    UpdateStep {
        /// Step id
        id: String,
        /// Full definition it must currently have
        expected: Step,
        /// New definition
        replacement: Step,
    },

    /// Change fields of the single trigger matching a predicate
    UpdateTrigger {
        /// Predicate over the current trigger configuration
        #[serde(default)]
        matching: VcsTriggerFields,
        /// Fields to write; at least one must be present
        set: VcsTriggerFields,
    },

    /// Enable or disable the single failure condition matching a predicate
    UpdateFailureCondition {
        /// Predicate over the current condition
        #[serde(default)]
        matching: FailureConditionMatcher,
        /// New enabled flag
        enabled: bool,
    },
}

impl Edit {
    /// Applies this edit to `build_type`.
    ///
    /// On error the build type may be partially modified; callers work on
    /// a copy.
    pub(crate) fn apply(&self, build_type: &mut BuildType) -> Result<(), PatchError> {
        match self {
            Self::RemoveParameter(expected) => {
                expected.check(build_type)?;
                build_type.parameters.remove(&expected.name);
            }
            Self::AddParameter { parameter } => {
                validate_parameter_name(&parameter.name)?;
                build_type
                    .parameters
                    .insert(&build_type.id, parameter.clone())?;
            }
            Self::UpdateParameter {
                name,
                expected_value,
                value,
            } => {
                ExpectedParameter::new(name.as_str(), expected_value.as_str()).check(build_type)?;
                if let Some(parameter) = build_type.parameters.get_mut(name) {
                    parameter.value.clone_from(value);
                }
            }
            Self::AddStep { step, after } => {
                step.validate()?;
                if build_type.step(&step.id).is_some() {
                    return Err(ValidationError::DuplicateStep {
                        build_type: build_type.id.clone(),
                        id: step.id.clone(),
                    }
                    .into());
                }
                let index = match after {
                    Some(after) => locate_step(build_type, after)? + 1,
                    None => build_type.steps.len(),
                };
                build_type.steps.insert(index, step.clone());
            }
            Self::RemoveStep { id, expected } => {
                let index = locate_step(build_type, id)?;
                expect_step(build_type, index, expected)?;
                build_type.steps.remove(index);
            }
            Self::UpdateStep {
                id,
                expected,
                replacement,
            } => {
                let index = locate_step(build_type, id)?;
                expect_step(build_type, index, expected)?;
                build_type.steps[index] = replacement.clone();
            }
            Self::UpdateTrigger { matching, set } => {
                if set.is_empty() {
                    return Err(PatchError::NothingToChange {
                        build_type: build_type.id.clone(),
                        what: "trigger".to_string(),
                    });
                }
                let index = locate_single(
                    &build_type.id,
                    "trigger",
                    build_type.triggers.iter().map(|t| matching.matches(t)),
                )?;
                set.apply_to(&mut build_type.triggers[index]);
            }
            Self::UpdateFailureCondition { matching, enabled } => {
                let index = locate_single(
                    &build_type.id,
                    "failure condition",
                    build_type
                        .failure_conditions
                        .iter()
                        .map(|c| matching.matches(c)),
                )?;
                build_type.failure_conditions[index].enabled = *enabled;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoveParameter(expected) => write!(f, "remove_parameter({})", expected.name),
            Self::AddParameter { parameter } => write!(f, "add_parameter({parameter})"),
            Self::UpdateParameter { name, value, .. } => {
                write!(f, "update_parameter({name}={value})")
            }
            Self::AddStep { step, .. } => write!(f, "add_step({})", step.id),
            Self::RemoveStep { id, .. } => write!(f, "remove_step({id})"),
            Self::UpdateStep { id, .. } => write!(f, "update_step({id})"),
            Self::UpdateTrigger { .. } => write!(f, "update_trigger"),
            Self::UpdateFailureCondition { enabled, .. } => {
                write!(f, "update_failure_condition(enabled={enabled})")
            }
        }
    }
}

fn locate_step(build_type: &BuildType, id: &str) -> Result<usize, PatchError> {
    let candidates: Vec<usize> = build_type
        .steps
        .iter()
        .enumerate()
        .filter(|(_, s)| s.id == id)
        .map(|(i, _)| i)
        .collect();
    match candidates.as_slice() {
        [] => Err(PatchError::StepNotFound {
            build_type: build_type.id.clone(),
            id: id.to_string(),
        }),
        [index] => Ok(*index),
        many => Err(PatchError::AmbiguousMatch {
            build_type: build_type.id.clone(),
            what: format!("step '{id}'"),
            count: many.len(),
        }),
    }
}

fn expect_step(build_type: &BuildType, index: usize, expected: &Step) -> Result<(), PatchError> {
    let actual = &build_type.steps[index];
    if actual != expected {
        return Err(PatchError::ExpectationMismatch {
            build_type: build_type.id.clone(),
            what: format!("step '{}'", actual.id),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        });
    }
    Ok(())
}

fn locate_single(
    build_type: &str,
    what: &str,
    hits: impl Iterator<Item = bool>,
) -> Result<usize, PatchError> {
    let candidates: Vec<usize> = hits
        .enumerate()
        .filter(|(_, hit)| *hit)
        .map(|(i, _)| i)
        .collect();
    match candidates.as_slice() {
        [] => Err(PatchError::NoMatch {
            build_type: build_type.to_string(),
            what: what.to_string(),
        }),
        [index] => Ok(*index),
        many => Err(PatchError::AmbiguousMatch {
            build_type: build_type.to_string(),
            what: what.to_string(),
            count: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{Comparison, MetricCondition, TextCondition, TextConditionType};

    #[test]
    fn test_trigger_fields_match_and_apply() {
        let mut trigger = Trigger::vcs().with_quiet_period(10).with_enabled(false);
        let matching = VcsTriggerFields::new().quiet_period(10).enabled(false);
        assert!(matching.matches(&trigger));
        assert!(!VcsTriggerFields::new().enabled(true).matches(&trigger));
        assert!(VcsTriggerFields::new().matches(&trigger));

        VcsTriggerFields::new()
            .quiet_period(5)
            .enabled(true)
            .apply_to(&mut trigger);
        assert_eq!(trigger.config().quiet_period, 5);
        assert!(trigger.config().enabled);
        assert_eq!(trigger.config().quiet_period_mode, QuietPeriodMode::UseCustom);
    }

    #[test]
    fn test_failure_condition_matcher() {
        let text = FailureCondition::text(TextCondition::new(TextConditionType::Contains, "FAILED"))
            .with_id("LogFailed");
        let metric = FailureCondition::metric(MetricCondition::new(
            MetricKind::LineCoverage,
            Comparison::Less,
            0.0,
        ));

        assert!(FailureConditionMatcher::by_id("LogFailed").matches(&text));
        assert!(!FailureConditionMatcher::by_id("LogFailed").matches(&metric));
        assert!(FailureConditionMatcher::by_pattern("FAILED").matches(&text));
        assert!(!FailureConditionMatcher::by_pattern("FAILED").matches(&metric));
        assert!(FailureConditionMatcher::by_metric(MetricKind::LineCoverage).matches(&metric));
        assert!(FailureConditionMatcher::default().matches(&text));
    }

    #[test]
    fn test_parameter_override_expands_removals_first() {
        let edits = ParameterOverride::new()
            .add(Parameter::new("coverage", "true"))
            .remove("system.coverage", "true")
            .into_edits();
        assert_eq!(edits.len(), 2);
        assert!(matches!(edits[0], Edit::RemoveParameter(_)));
        assert!(matches!(edits[1], Edit::AddParameter { .. }));
    }

    #[test]
    fn test_edit_yaml_shape() {
        let yaml = "op: update_trigger\nmatching:\n  quiet_period: 10\n  enabled: false\nset:\n  quiet_period: 5\n  enabled: true\n";
        let edit: Edit = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            edit,
            Edit::UpdateTrigger {
                matching: VcsTriggerFields::new().quiet_period(10).enabled(false),
                set: VcsTriggerFields::new().quiet_period(5).enabled(true),
            }
        );
        assert_eq!(edit.to_string(), "update_trigger");
    }

    fn coverage_checkbox() -> BuildType {
        BuildType::builder("UnitTests")
            .param(Parameter::checkbox("system.coverage", "true", "true", "false").with_label("Coverage"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_remove_parameter_checks_every_present_field() {
        let build_type = coverage_checkbox();

        let yaml = "op: remove_parameter\nname: system.coverage\nexpected_value: \"true\"\ndisplay: prompt\n";
        let edit: Edit = serde_yaml::from_str(yaml).unwrap();
        let mut patched = build_type.clone();
        let err = edit.apply(&mut patched).unwrap_err();
        assert_eq!(
            err,
            PatchError::ExpectationMismatch {
                build_type: "UnitTests".to_string(),
                what: "parameter 'system.coverage' display".to_string(),
                expected: "Prompt".to_string(),
                actual: "Normal".to_string(),
            }
        );

        let wrong_checkbox = Edit::RemoveParameter(
            ExpectedParameter::new("system.coverage", "true").with_checkbox("yes", "no"),
        );
        assert!(matches!(
            wrong_checkbox.apply(&mut build_type.clone()),
            Err(PatchError::ExpectationMismatch { .. })
        ));

        let wrong_label = Edit::RemoveParameter(
            ExpectedParameter::new("system.coverage", "true").with_label("Cov"),
        );
        assert!(wrong_label.apply(&mut build_type.clone()).is_err());

        let mut patched = build_type.clone();
        let exact = ExpectedParameter::exactly(build_type.parameters.get("system.coverage").unwrap());
        Edit::RemoveParameter(exact).apply(&mut patched).unwrap();
        assert!(patched.parameters.is_empty());

        let mut patched = build_type.clone();
        Edit::RemoveParameter(
            ExpectedParameter::new("system.coverage", "true")
                .with_display(ParameterDisplay::Normal)
                .with_checkbox("true", "false"),
        )
        .apply(&mut patched)
        .unwrap();
        assert!(patched.parameters.is_empty());
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let camel = "op: update_trigger\nmatching:\n  quietPeriod: 99\nset:\n  quietPeriod: 5\n";
        assert!(serde_yaml::from_str::<Edit>(camel).is_err());

        let typo = "op: remove_parameter\nname: system.coverage\nexpected_valeu: \"true\"\n";
        assert!(serde_yaml::from_str::<Edit>(typo).is_err());

        let extra = "op: update_failure_condition\nmatching:\n  patern: FAILED\nenabled: false\n";
        assert!(serde_yaml::from_str::<Edit>(extra).is_err());

        let stray = "op: add_step\nstep:\n  id: A\n  type: script\n  lines: [make]\nbefore: B\n";
        assert!(serde_yaml::from_str::<Edit>(stray).is_err());

        let overrides = "remove: []\nadd: []\nreplace: []\n";
        assert!(serde_yaml::from_str::<ParameterOverride>(overrides).is_err());
    }

    #[test]
    fn test_update_trigger_requires_fields_to_set() {
        let mut build_type = BuildType::builder("UnitTests")
            .trigger(Trigger::vcs().with_quiet_period(99))
            .build()
            .unwrap();
        let before = build_type.clone();

        let edit: Edit = serde_yaml::from_str("op: update_trigger\nmatching:\n  quiet_period: 99\nset: {}\n").unwrap();
        assert_eq!(
            edit.apply(&mut build_type),
            Err(PatchError::NothingToChange {
                build_type: "UnitTests".to_string(),
                what: "trigger".to_string(),
            })
        );
        assert_eq!(build_type, before);
        assert!(VcsTriggerFields::new().is_empty());
        assert!(!VcsTriggerFields::new().enabled(true).is_empty());
    }

    #[test]
    fn test_locate_single_counts() {
        assert_eq!(locate_single("B", "trigger", [false, true].into_iter()), Ok(1));
        assert!(matches!(
            locate_single("B", "trigger", [false, false].into_iter()),
            Err(PatchError::NoMatch { .. })
        ));
        assert!(matches!(
            locate_single("B", "trigger", [true, true, false].into_iter()),
            Err(PatchError::AmbiguousMatch { count: 2, .. })
        ));
    }
}
