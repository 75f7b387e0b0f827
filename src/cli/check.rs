//! `buildtree check` - Validate a project tree
//!
//! Loads and validates the tree, applies any overlays, then reports `%name%`
//! references in step scripts and step conditions that no parameter of the
//! build type, or of the templates it is based on, declares.
//! Such references are warnings, or errors in strict mode.
//!
//! ## Usage
//!
//! ```bash
//! buildtree check project.yaml --patch coverage.yaml --strict
//! ```

use super::apply::load_patched;
use anyhow::Result;
use buildtree::project::{BuildType, Project};
use std::fmt;
use std::path::{Path, PathBuf};

/// Reference prefixes the CI host provides without a declaration
const HOST_PREFIXES: &[&str] = &["env.", "build.", "teamcity.", "dep."];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckMessage {
    pub build_type: String,
    pub step: String,
    pub parameter: String,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
pub struct CheckReport {
    pub project: String,
    pub build_types: usize,
    pub overlays: usize,
    pub messages: Vec<CheckMessage>,
}

impl CheckReport {
    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == Severity::Error)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.messages {
            writeln!(
                f,
                "{}: {}/{}: undeclared parameter %{}%",
                message.severity, message.build_type, message.step, message.parameter
            )?;
        }
        writeln!(
            f,
            "Project '{}': {} build types, {} overlays applied, {} warnings, {} errors",
            self.project,
            self.build_types,
            self.overlays,
            self.messages.len() - self.error_count(),
            self.error_count()
        )
    }
}

/// Validates a project file and scans its scripts
pub fn check_project(file: &Path, patches: &[PathBuf], strict: bool) -> Result<CheckReport> {
    tracing::debug!("Checking project: {}", file.display());

    let project = load_patched(file, patches)?;
    Ok(scan_project(&project, patches.len(), strict))
}

fn scan_project(project: &Project, overlays: usize, strict: bool) -> CheckReport {
    let severity = if strict {
        Severity::Error
    } else {
        Severity::Warning
    };
    let messages = project
        .all_build_types()
        .into_iter()
        .filter_map(|build_type| project.effective_build_type(&build_type.id))
        .flat_map(|build_type| undeclared_references(&build_type, severity))
        .collect();

    CheckReport {
        project: project.id.clone(),
        build_types: project.build_type_count(),
        overlays,
        messages,
    }
}

fn undeclared_references(build_type: &BuildType, severity: Severity) -> Vec<CheckMessage> {
    let mut messages = Vec::new();
    for step in &build_type.steps {
        for name in step.referenced_parameters() {
            if build_type.parameters.contains(&name)
                || HOST_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
            {
                continue;
            }
            tracing::warn!(build_type = %build_type.id, step = %step.id, %name, "undeclared parameter reference");
            messages.push(CheckMessage {
                build_type: build_type.id.clone(),
                step: step.id.clone(),
                parameter: name,
                severity,
            });
        }
    }
    messages
}
