//! `buildtree conditions` - Dry-run failure conditions
//!
//! Resolves the parameter toggles of one build type, with its templates
//! merged in, for a simulated execution and evaluates each failure
//! condition against a sample log and metric values.
//!
//! ## Example
//!
//! ```bash
//! buildtree conditions project.yaml -b UnitTests \
//!     --param TightenCoverage=false --log build.log --metric line_coverage=71:80
//! ```

use super::apply::load_patched;
use anyhow::{Context, Result};
use buildtree::evaluation::{ConditionOutcome, DryRunInput, ExecutionScope, MetricSample};
use buildtree::project::MetricKind;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Inputs of a dry run
#[derive(Debug, Clone, Default)]
pub struct ConditionsRequest {
    pub build_type: String,
    pub params: BTreeMap<String, String>,
    pub log: Option<String>,
    pub metrics: BTreeMap<MetricKind, MetricSample>,
}

/// Outcome of a dry run
#[derive(Debug, Clone)]
pub struct ConditionsReport {
    pub build_type: String,
    pub flags: Vec<(String, bool)>,
    pub steps: Vec<String>,
    pub outcomes: Vec<(String, ConditionOutcome)>,
}

impl ConditionsReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_failure()).count()
    }
}

impl fmt::Display for ConditionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Build type '{}'", self.build_type)?;
        for (flag, value) in &self.flags {
            writeln!(f, "  flag {flag} = {value}")?;
        }
        writeln!(f, "  steps: {}", self.steps.join(", "))?;
        for (condition, outcome) in &self.outcomes {
            writeln!(f, "  {condition}: {outcome}")?;
        }
        writeln!(
            f,
            "{} of {} conditions would fail the build",
            self.failures(),
            self.outcomes.len()
        )
    }
}

/// Parses `NAME=VALUE` execution parameters
pub fn parse_params(raw: &[String]) -> Result<BTreeMap<String, String>> {
    raw.iter()
        .map(|entry| {
            let (name, value) = entry
                .split_once('=')
                .with_context(|| format!("Invalid parameter '{entry}', expected NAME=VALUE"))?;
            Ok((name.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parses `METRIC=CURRENT:BASELINE` samples
pub fn parse_metrics(raw: &[String]) -> Result<BTreeMap<MetricKind, MetricSample>> {
    raw.iter()
        .map(|entry| {
            let invalid = || format!("Invalid metric '{entry}', expected METRIC=CURRENT:BASELINE");
            let (name, values) = entry.split_once('=').with_context(invalid)?;
            let (current, baseline) = values.split_once(':').with_context(invalid)?;

            let metric: MetricKind =
                serde_json::from_value(serde_json::Value::String(name.trim().to_string()))
                    .with_context(|| format!("Unknown metric: {name}"))?;
            let sample = MetricSample {
                current: current.trim().parse().with_context(invalid)?,
                baseline: baseline.trim().parse().with_context(invalid)?,
            };
            Ok((metric, sample))
        })
        .collect()
}

/// Runs the dry run for one build type of a project file
pub fn evaluate_conditions(
    file: &Path,
    patches: &[PathBuf],
    request: &ConditionsRequest,
) -> Result<ConditionsReport> {
    let project = load_patched(file, patches)?;
    let build_type = project
        .effective_build_type(&request.build_type)
        .with_context(|| format!("Build type not found: {}", request.build_type))?;

    let scope = ExecutionScope::new(&build_type, &request.params);
    let input = DryRunInput {
        log: request.log.clone(),
        metrics: request.metrics.clone(),
    };
    let outcomes = scope
        .dry_run(&input)
        .context("Failed to evaluate failure conditions")?;

    Ok(ConditionsReport {
        build_type: build_type.id.clone(),
        flags: scope
            .flags()
            .into_iter()
            .map(|(flag, value)| (flag.to_string(), value))
            .collect(),
        steps: scope
            .effective_steps()
            .into_iter()
            .map(|s| s.id.clone())
            .collect(),
        outcomes: outcomes
            .into_iter()
            .map(|(condition, outcome)| (condition.to_string(), outcome))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
id: Root
build_types:
  - id: UnitTests
    parameters:
      - name: TightenCoverage
        value: "true"
    steps:
      - id: Test
        type: script
        lines: ["cargo test"]
    toggles:
      - source: TightenCoverage
        derived: coverage.enforced
    failure_conditions:
      - type: text
        pattern: Coverage below threshold
        gate: coverage.enforced
      - type: metric
        metric: line_coverage
        units: percents
        comparison: less
        threshold: 5
"#;

    const TEMPLATED: &str = r#"
id: Root
templates:
  - id: CoverageTemplate
    toggles:
      - source: TightenCoverage
        derived: coverage.enforced
    steps:
      - id: Upload
        type: script
        lines: ["upload coverage"]
        conditions:
          - parameter: TightenCoverage
            operator: equals
            value: "true"
build_types:
  - id: UnitTests
    templates: [CoverageTemplate]
    steps:
      - id: Test
        type: script
        lines: ["cargo test"]
    failure_conditions:
      - type: text
        pattern: Coverage below threshold
        gate: coverage.enforced
"#;

    fn run(params: &[&str]) -> ConditionsReport {
        run_on(PROJECT, params)
    }

    fn run_on(document: &str, params: &[&str]) -> ConditionsReport {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("project.yaml");
        fs::write(&path, document).unwrap();

        let params: Vec<String> = params.iter().map(ToString::to_string).collect();
        let request = ConditionsRequest {
            build_type: "UnitTests".to_string(),
            params: parse_params(&params).unwrap(),
            log: Some("WARN Coverage below threshold".to_string()),
            metrics: parse_metrics(&["line_coverage=70:80".to_string()]).unwrap(),
        };
        evaluate_conditions(&path, &[], &request).unwrap()
    }

    #[test]
    fn test_conditions_enforced_by_default() {
        let report = run(&[]);
        assert_eq!(report.flags, vec![("coverage.enforced".to_string(), true)]);
        assert_eq!(report.failures(), 2);
    }

    #[test]
    fn test_conditions_relaxed_by_parameter() {
        let report = run(&["TightenCoverage= False "]);
        assert_eq!(report.flags, vec![("coverage.enforced".to_string(), false)]);
        assert_eq!(report.outcomes[0].1, ConditionOutcome::NotEnforced);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn test_conditions_use_template_toggles_and_steps() {
        let report = run_on(TEMPLATED, &["TightenCoverage=true"]);
        assert_eq!(report.flags, vec![("coverage.enforced".to_string(), true)]);
        assert_eq!(report.steps, vec!["Upload".to_string(), "Test".to_string()]);
        assert_eq!(report.failures(), 1);

        let report = run_on(TEMPLATED, &["TightenCoverage=false"]);
        assert_eq!(report.steps, vec!["Test".to_string()]);
        assert_eq!(report.failures(), 0);
        assert!(report.to_string().contains("steps: Test"));
    }

    #[test]
    fn test_parse_metrics_rejects_garbage() {
        assert!(parse_metrics(&["line_coverage=70".to_string()]).is_err());
        assert!(parse_metrics(&["speed=1:2".to_string()]).is_err());
        assert!(parse_params(&["novalue".to_string()]).is_err());
    }
}
