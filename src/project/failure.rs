//! Failure conditions
//!
//! A failure condition is a rule the CI host evaluates after a build to
//! decide whether it failed: either a metric compared against a baseline
//! build, or a text pattern searched in the build log.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use super::Validate;
use super::errors::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metric a condition compares
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Line coverage
    LineCoverage,
    /// Statement coverage
    StatementCoverage,
    /// Method coverage
    MethodCoverage,
    /// Class coverage
    ClassCoverage,
    /// Block coverage
    BlockCoverage,
    /// Number of tests
    TestCount,
    /// Number of failed tests
    FailedTestCount,
    /// Total artifact size
    ArtifactSize,
    /// Build duration
    BuildDuration,
    /// Inspection errors
    InspectionErrors,
    /// Inspection warnings
    InspectionWarnings,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LineCoverage => "line_coverage",
            Self::StatementCoverage => "statement_coverage",
            Self::MethodCoverage => "method_coverage",
            Self::ClassCoverage => "class_coverage",
            Self::BlockCoverage => "block_coverage",
            Self::TestCount => "test_count",
            Self::FailedTestCount => "failed_test_count",
            Self::ArtifactSize => "artifact_size",
            Self::BuildDuration => "build_duration",
            Self::InspectionErrors => "inspection_errors",
            Self::InspectionWarnings => "inspection_warnings",
        };
        f.write_str(name)
    }
}

/// Unit the threshold is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricUnits {
    /// Relative change, in percent of the baseline value
    Percents,
    /// Absolute change in the metric's own unit
    #[default]
    DefaultUnits,
}

/// Direction of change that fails the build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Fails when the value dropped by more than the threshold
    Less,
    /// Fails when the value grew by more than the threshold
    More,
    /// Fails when the value changed by more than the threshold either way
    Diff,
}

/// Build whose metric value is used as the baseline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "build", rename_all = "snake_case")]
pub enum BaselineBuild {
    /// Last successful build
    #[default]
    LastSuccessful,
    /// Last pinned build
    LastPinned,
    /// Last finished build
    LastFinished,
    /// Last build carrying a tag
    Tagged {
        /// Tag name
        tag: String,
    },
    /// A specific build number
    BuildNumber {
        /// Build number
        number: String,
    },
}

/// Metric-threshold condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricCondition {
    /// Compared metric
    pub metric: MetricKind,
    /// Threshold units
    #[serde(default)]
    pub units: MetricUnits,
    /// Failing direction
    pub comparison: Comparison,
    /// Allowed change before failing
    #[serde(default)]
    pub threshold: f64,
    /// Baseline build reference
    #[serde(default)]
    pub compare_to: BaselineBuild,
    /// Stop the build as soon as the condition fails
    #[serde(default)]
    pub stop_build: bool,
}

impl MetricCondition {
    /// Creates a metric condition against the last successful build
    pub fn new(metric: MetricKind, comparison: Comparison, threshold: f64) -> Self {
        Self {
            metric,
            units: MetricUnits::DefaultUnits,
            comparison,
            threshold,
            compare_to: BaselineBuild::LastSuccessful,
            stop_build: false,
        }
    }

    /// Sets threshold units
    pub fn with_units(mut self, units: MetricUnits) -> Self {
        self.units = units;
        self
    }

    /// Sets the baseline build
    pub fn with_baseline(mut self, baseline: BaselineBuild) -> Self {
        self.compare_to = baseline;
        self
    }

    /// Returns true if `current` compared to `baseline` fails this condition.
    ///
    /// With percent units the change is relative to the baseline; a zero
    /// baseline counts any non-zero change as unbounded.
    pub fn fails_on(&self, current: f64, baseline: f64) -> bool {
        let delta = match self.units {
            MetricUnits::DefaultUnits => current - baseline,
            MetricUnits::Percents if baseline == 0.0 => {
                if current == 0.0 {
                    0.0
                } else {
                    f64::INFINITY.copysign(current)
                }
            }
            MetricUnits::Percents => (current - baseline) / baseline.abs() * 100.0,
        };
        match self.comparison {
            Comparison::Less => -delta > self.threshold,
            Comparison::More => delta > self.threshold,
            Comparison::Diff => delta.abs() > self.threshold,
        }
    }
}

/// How a text condition searches the build log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextConditionType {
    /// Log contains the pattern literally
    #[default]
    Contains,
    /// Log does not contain the pattern literally
    DoesNotContain,
    /// Log matches the pattern as a regular expression
    Matches,
    /// Log does not match the pattern as a regular expression
    DoesNotMatch,
}

impl TextConditionType {
    /// Returns true if the pattern is a regular expression
    pub fn is_regex(self) -> bool {
        matches!(self, Self::Matches | Self::DoesNotMatch)
    }
}

/// Text-match condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextCondition {
    /// Search mode
    #[serde(default)]
    pub condition_type: TextConditionType,
    /// Pattern to search for
    pub pattern: String,
    /// Message reported when the condition fails the build
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
    /// Invert polarity: fail when the search does not hit
    #[serde(default)]
    pub reverse: bool,
    /// Stop the build as soon as the condition fails
    #[serde(default)]
    pub stop_build: bool,
}

impl TextCondition {
    /// Creates a text condition
    pub fn new(condition_type: TextConditionType, pattern: impl Into<String>) -> Self {
        Self {
            condition_type,
            pattern: pattern.into(),
            message: None,
            reverse: false,
            stop_build: false,
        }
    }

    /// Sets the failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Inverts polarity
    pub fn reversed(mut self) -> Self {
        self.reverse = !self.reverse;
        self
    }

    /// Stops the build on failure
    pub fn stopping_build(mut self) -> Self {
        self.stop_build = true;
        self
    }

    /// Returns true if `log` fails this condition.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] if a regex pattern does
    /// not compile.
    pub fn fails_on(&self, log: &str) -> Result<bool, ValidationError> {
        let hit = match self.condition_type {
            TextConditionType::Contains => log.contains(&self.pattern),
            TextConditionType::DoesNotContain => !log.contains(&self.pattern),
            TextConditionType::Matches => self.compile()?.is_match(log),
            TextConditionType::DoesNotMatch => !self.compile()?.is_match(log),
        };
        Ok(hit != self.reverse)
    }

    fn compile(&self) -> Result<Regex, ValidationError> {
        Regex::new(&self.pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: self.pattern.clone(),
            reason: e.to_string(),
        })
    }
}

/// Variant of a failure condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureConditionKind {
    /// Metric compared to a baseline build
    Metric(MetricCondition),
    /// Text searched in the build log
    Text(TextCondition),
}

/// Tag of a failure condition variant, used when matching conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureConditionType {
    /// [`FailureConditionKind::Metric`]
    Metric,
    /// [`FailureConditionKind::Text`]
    Text,
}

fn default_true() -> bool {
    true
}

/// A failure condition of a build type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureCondition {
    /// Optional identifier used to address the condition
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<String>,

    /// Whether the condition is declared active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Derived flag that must be true for the condition to be enforced
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub gate: Option<String>,

    /// Condition variant
    #[serde(flatten)]
    pub kind: FailureConditionKind,
}

impl FailureCondition {
    /// Creates a metric condition
    pub fn metric(condition: MetricCondition) -> Self {
        Self {
            id: None,
            enabled: true,
            gate: None,
            kind: FailureConditionKind::Metric(condition),
        }
    }

    /// Creates a text condition
    pub fn text(condition: TextCondition) -> Self {
        Self {
            id: None,
            enabled: true,
            gate: None,
            kind: FailureConditionKind::Text(condition),
        }
    }

    /// Sets the identifier
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Gates the condition on a derived flag
    pub fn gated_by(mut self, flag: impl Into<String>) -> Self {
        self.gate = Some(flag.into());
        self
    }

    /// Sets the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Returns the variant tag
    pub fn condition_type(&self) -> FailureConditionType {
        match self.kind {
            FailureConditionKind::Metric(_) => FailureConditionType::Metric,
            FailureConditionKind::Text(_) => FailureConditionType::Text,
        }
    }
}

impl Validate for FailureCondition {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        match &self.kind {
            FailureConditionKind::Metric(metric) => {
                if !metric.threshold.is_finite() || metric.threshold < 0.0 {
                    return Err(ValidationError::InvalidThreshold {
                        value: metric.threshold.to_string(),
                    });
                }
            }
            FailureConditionKind::Text(text) => {
                if text.pattern.is_empty() {
                    return Err(ValidationError::EmptyPattern);
                }
                if text.condition_type.is_regex() {
                    text.compile()?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for FailureCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FailureConditionKind::Metric(m) => write!(
                f,
                "metric({} {:?} by {} {:?})",
                m.metric, m.comparison, m.threshold, m.units
            ),
            FailureConditionKind::Text(t) => {
                write!(f, "text({:?} '{}')", t.condition_type, t.pattern)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_less_in_percents() {
        let cond = MetricCondition::new(MetricKind::LineCoverage, Comparison::Less, 2.0)
            .with_units(MetricUnits::Percents);
        assert!(!cond.fails_on(80.0, 80.0));
        assert!(!cond.fails_on(79.0, 80.0));
        assert!(cond.fails_on(78.0, 80.0));
        assert!(!cond.fails_on(90.0, 80.0));
    }

    #[test]
    fn test_metric_zero_threshold_fails_on_any_drop() {
        let cond = MetricCondition::new(MetricKind::LineCoverage, Comparison::Less, 0.0);
        assert!(cond.fails_on(79.9, 80.0));
        assert!(!cond.fails_on(80.0, 80.0));
    }

    #[test]
    fn test_metric_more_and_diff() {
        let more = MetricCondition::new(MetricKind::ArtifactSize, Comparison::More, 100.0);
        assert!(more.fails_on(1201.0, 1100.0));
        assert!(!more.fails_on(1150.0, 1100.0));

        let diff = MetricCondition::new(MetricKind::TestCount, Comparison::Diff, 5.0);
        assert!(diff.fails_on(90.0, 100.0));
        assert!(diff.fails_on(110.0, 100.0));
        assert!(!diff.fails_on(104.0, 100.0));
    }

    #[test]
    fn test_metric_percents_zero_baseline() {
        let cond = MetricCondition::new(MetricKind::TestCount, Comparison::More, 50.0)
            .with_units(MetricUnits::Percents);
        assert!(cond.fails_on(1.0, 0.0));
        assert!(!cond.fails_on(0.0, 0.0));
    }

    #[test]
    fn test_text_contains_and_reverse() {
        let cond = TextCondition::new(TextConditionType::Contains, "Coverage dropped");
        assert!(cond.fails_on("warn: Coverage dropped by 2%").unwrap());
        assert!(!cond.fails_on("all good").unwrap());

        let reversed = cond.reversed();
        assert!(!reversed.fails_on("warn: Coverage dropped by 2%").unwrap());
        assert!(reversed.fails_on("all good").unwrap());
    }

    #[test]
    fn test_text_regex_modes() {
        let matches = TextCondition::new(TextConditionType::Matches, r"coverage \d+% < \d+%");
        assert!(matches.fails_on("line coverage 71% < 75%").unwrap());

        let not_matches = TextCondition::new(TextConditionType::DoesNotMatch, r"^BUILD OK$");
        assert!(not_matches.fails_on("BUILD BROKEN").unwrap());
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let cond = FailureCondition::text(TextCondition::new(TextConditionType::Matches, "(unclosed"));
        assert!(matches!(
            cond.validate(),
            Err(ValidationError::InvalidPattern { .. })
        ));

        let literal = FailureCondition::text(TextCondition::new(TextConditionType::Contains, "(unclosed"));
        assert!(literal.validate().is_ok());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let cond = FailureCondition::metric(MetricCondition::new(
            MetricKind::LineCoverage,
            Comparison::Less,
            f64::NAN,
        ));
        assert!(matches!(
            cond.validate(),
            Err(ValidationError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn test_failure_condition_yaml_shape() {
        let yaml = "type: text\ncondition_type: contains\npattern: FAILED\ngate: coverage_enforced\n";
        let cond: FailureCondition = serde_yaml::from_str(yaml).unwrap();
        assert!(cond.enabled);
        assert_eq!(cond.gate.as_deref(), Some("coverage_enforced"));
        assert_eq!(cond.condition_type(), FailureConditionType::Text);

        let yaml = "type: metric\nmetric: line_coverage\ncomparison: less\nunits: percents\nthreshold: 1\ncompare_to:\n  build: tagged\n  tag: release\n";
        let cond: FailureCondition = serde_yaml::from_str(yaml).unwrap();
        match cond.kind {
            FailureConditionKind::Metric(m) => {
                assert_eq!(m.compare_to, BaselineBuild::Tagged { tag: "release".to_string() });
                assert_eq!(m.units, MetricUnits::Percents);
            }
            FailureConditionKind::Text(_) => panic!("expected metric condition"),
        }
    }
}
