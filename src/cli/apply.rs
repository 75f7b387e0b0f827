//! `buildtree apply` - Apply patch overlays to a project tree
//!
//! Overlays are applied in order and all-or-nothing: if any edit of any
//! overlay fails, nothing is printed and the command exits with an error.

use anyhow::{Context, Result};
use buildtree::infrastructure::{DocumentFormat, load_overlay, load_project, render_project};
use buildtree::patch::apply_all;
use buildtree::project::Project;
use std::path::{Path, PathBuf};

/// Loads a project and applies `patches` to it
pub fn load_patched(file: &Path, patches: &[PathBuf]) -> Result<Project> {
    let mut project = load_project(file)
        .with_context(|| format!("Failed to load project: {}", file.display()))?;

    let overlays = patches
        .iter()
        .map(|path| {
            load_overlay(path)
                .with_context(|| format!("Failed to load overlay: {}", path.display()))
        })
        .collect::<Result<Vec<_>>>()?;

    apply_all(&mut project, &overlays).context("Failed to apply patch overlays")?;
    Ok(project)
}

/// Applies overlays and renders the resolved tree
pub fn apply_overlays(file: &Path, patches: &[PathBuf], format: DocumentFormat) -> Result<String> {
    let project = load_patched(file, patches)?;
    render_project(&project, format).context("Failed to render project")
}
