//! Local dry-run of failure conditions against sample build output

use super::ExecutionScope;
use crate::project::{FailureCondition, FailureConditionKind, MetricKind, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Current and baseline values of one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    /// Value in the evaluated build
    pub current: f64,
    /// Value in the baseline build
    pub baseline: f64,
}

/// Sample build output a dry run evaluates against
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DryRunInput {
    /// Build log
    #[serde(default)]
    pub log: Option<String>,
    /// Metric samples
    #[serde(default)]
    pub metrics: BTreeMap<MetricKind, MetricSample>,
}

/// Result of evaluating one failure condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ConditionOutcome {
    /// The condition fails the build
    Failed {
        /// Message the host would report
        message: String,
    },
    /// The condition holds
    Passed,
    /// Disabled or gated off in this execution
    NotEnforced,
    /// The input lacks the data needed to evaluate
    NoData,
}

impl ConditionOutcome {
    /// Returns true if the condition fails the build
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for ConditionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { message } => write!(f, "FAILED: {message}"),
            Self::Passed => write!(f, "PASSED"),
            Self::NotEnforced => write!(f, "NOT ENFORCED"),
            Self::NoData => write!(f, "NO DATA"),
        }
    }
}

impl<'a> ExecutionScope<'a> {
    /// Evaluates every failure condition of the build type against `input`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] if a regex pattern does
    /// not compile.
    pub fn dry_run(
        &self,
        input: &DryRunInput,
    ) -> Result<Vec<(&'a FailureCondition, ConditionOutcome)>, ValidationError> {
        self.build_type()
            .failure_conditions
            .iter()
            .map(|condition| Ok((condition, self.evaluate(condition, input)?)))
            .collect()
    }

    fn evaluate(
        &self,
        condition: &FailureCondition,
        input: &DryRunInput,
    ) -> Result<ConditionOutcome, ValidationError> {
        if !self.is_enforced(condition) {
            return Ok(ConditionOutcome::NotEnforced);
        }
        let outcome = match &condition.kind {
            FailureConditionKind::Text(text) => match &input.log {
                None => ConditionOutcome::NoData,
                Some(log) => {
                    if text.fails_on(log)? {
                        ConditionOutcome::Failed {
                            message: text.message.clone().unwrap_or_else(|| {
                                format!("Build log check failed: '{}'", text.pattern)
                            }),
                        }
                    } else {
                        ConditionOutcome::Passed
                    }
                }
            },
            FailureConditionKind::Metric(metric) => match input.metrics.get(&metric.metric) {
                None => ConditionOutcome::NoData,
                Some(sample) if metric.fails_on(sample.current, sample.baseline) => {
                    ConditionOutcome::Failed {
                        message: format!(
                            "{} changed from {} to {}",
                            metric.metric, sample.baseline, sample.current
                        ),
                    }
                }
                Some(_) => ConditionOutcome::Passed,
            },
        };
        Ok(outcome)
    }
}
