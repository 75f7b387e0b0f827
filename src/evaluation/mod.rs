//! Per-execution evaluation of parameter toggles
//!
//! An [`ExecutionScope`] is built for a single execution of a build type.
//! It resolves every toggle against the execution's parameter values and
//! owns the resulting derived flags, which decide whether gated failure
//! conditions are enforced. Nothing is shared between scopes.

mod dry_run;

pub use dry_run::{ConditionOutcome, DryRunInput, MetricSample};

use crate::project::{BuildType, FailureCondition, ParameterToggle, Step, is_false_like};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// State of a derived flag during one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Enforcement {
    /// Gated conditions are enforced
    #[default]
    Enforcing,
    /// Gated conditions are skipped
    Relaxed,
}

impl Enforcement {
    /// Returns the derived flag value
    #[must_use]
    pub fn as_flag(self) -> bool {
        matches!(self, Self::Enforcing)
    }

    /// Folds one toggle observation into the state.
    ///
    /// Once relaxed, the state stays relaxed for the rest of the execution.
    #[must_use]
    pub fn observe(self, source_value: Option<&str>) -> Self {
        match (self, source_value) {
            (Self::Enforcing, Some(value)) if is_false_like(value) => Self::Relaxed,
            (state, _) => state,
        }
    }
}

impl fmt::Display for Enforcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enforcing => write!(f, "ENFORCING"),
            Self::Relaxed => write!(f, "RELAXED"),
        }
    }
}

/// Derived flags of one execution of a build type
#[derive(Debug, Clone)]
pub struct ExecutionScope<'a> {
    build_type: &'a BuildType,
    parameters: BTreeMap<String, String>,
    flags: BTreeMap<String, Enforcement>,
}

impl<'a> ExecutionScope<'a> {
    /// Evaluates the toggles of `build_type` for one execution.
    ///
    /// `parameters` holds the values supplied for this execution; a toggle
    /// whose source is not supplied falls back to the declared value.
    #[must_use]
    pub fn new(build_type: &'a BuildType, parameters: &BTreeMap<String, String>) -> Self {
        let mut flags = BTreeMap::new();
        for ParameterToggle { source, derived } in &build_type.toggles {
            let value = parameters
                .get(source)
                .map(String::as_str)
                .or_else(|| build_type.parameter(source));
            let state: &mut Enforcement = flags.entry(derived.clone()).or_default();
            *state = state.observe(value);
            if *state == Enforcement::Relaxed {
                tracing::warn!(
                    build_type = %build_type.id,
                    %source,
                    %derived,
                    "gated failure conditions relaxed for this execution"
                );
            }
        }
        let mut resolved: BTreeMap<String, String> = build_type
            .parameters
            .iter()
            .map(|p| (p.name.clone(), p.value.clone()))
            .collect();
        resolved.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            build_type,
            parameters: resolved,
            flags,
        }
    }

    /// Returns the build type this scope evaluates
    #[must_use]
    pub fn build_type(&self) -> &'a BuildType {
        self.build_type
    }

    /// Returns the value of a parameter in this execution: the supplied
    /// value, else the declared one
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }

    /// Returns the steps that run in this execution, in order
    #[must_use]
    pub fn effective_steps(&self) -> Vec<&'a Step> {
        self.build_type
            .steps
            .iter()
            .filter(|s| s.runs_with(&self.parameters))
            .collect()
    }

    /// Returns the state of a derived flag; unknown flags are enforcing
    #[must_use]
    pub fn enforcement(&self, flag: &str) -> Enforcement {
        self.flags.get(flag).copied().unwrap_or_default()
    }

    /// Returns the value of a derived flag, if a toggle derives it
    #[must_use]
    pub fn flag(&self, flag: &str) -> Option<bool> {
        self.flags.get(flag).map(|state| state.as_flag())
    }

    /// Returns every derived flag with its value
    #[must_use]
    pub fn flags(&self) -> BTreeMap<&str, bool> {
        self.flags
            .iter()
            .map(|(name, state)| (name.as_str(), state.as_flag()))
            .collect()
    }

    /// Returns true if `condition` is enforced in this execution
    #[must_use]
    pub fn is_enforced(&self, condition: &FailureCondition) -> bool {
        condition.enabled
            && condition
                .gate
                .as_deref()
                .is_none_or(|gate| self.enforcement(gate).as_flag())
    }

    /// Returns the failure conditions enforced in this execution, in order
    #[must_use]
    pub fn effective_failure_conditions(&self) -> Vec<&'a FailureCondition> {
        self.build_type
            .failure_conditions
            .iter()
            .filter(|c| self.is_enforced(c))
            .collect()
    }
}
