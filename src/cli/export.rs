//! `buildtree export` - Convert a project tree between formats
//!
//! The tree is loaded and validated first, so an exported document is
//! always a valid tree. With `--build-type` only that build type is
//! rendered; `--resolved` merges in the templates it is based on.

use anyhow::{Context, Result};
use buildtree::infrastructure::{DocumentFormat, load_project, render_document};
use std::path::Path;

/// Renders a project file, or one of its build types, in `format`
pub fn export_project(
    file: &Path,
    build_type: Option<&str>,
    resolved: bool,
    format: DocumentFormat,
) -> Result<String> {
    let project = load_project(file)
        .with_context(|| format!("Failed to load project: {}", file.display()))?;

    tracing::debug!(%format, "exporting project {}", project.id);

    let rendered = match build_type {
        Some(id) if resolved => {
            let build_type = project
                .effective_build_type(id)
                .with_context(|| format!("Build type not found: {id}"))?;
            render_document(&build_type, format)
        }
        Some(id) => {
            let build_type = project
                .build_type(id)
                .with_context(|| format!("Build type not found: {id}"))?;
            render_document(build_type, format)
        }
        None => render_document(&project, format),
    };
    rendered.context("Failed to render document")
}
