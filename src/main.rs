//! buildtree - CLI for CI configuration trees
//!
//! ## Commands
//!
//! - `buildtree check` - Validate a project tree
//! - `buildtree apply` - Apply patch overlays and print the result
//! - `buildtree export` - Convert a tree between YAML and JSON
//! - `buildtree conditions` - Dry-run failure conditions of a build type
//! - `buildtree completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate a tree with an overlay applied
//! buildtree check project.yaml --patch coverage.yaml
//!
//! # Print the patched tree as JSON
//! buildtree apply project.yaml --patch coverage.yaml --format json
//!
//! # Check which conditions a relaxed run would still enforce
//! buildtree conditions project.yaml -b UnitTests --param TightenCoverage=false --log build.log
//!
//! # Generate shell completions
//! buildtree completions bash > /etc/bash_completion.d/buildtree
//! ```

use buildtree::infrastructure::init_logging;
use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    if std::env::var("BUILDTREE_DEBUG").is_ok() {
        init_logging("debug");
    }

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if std::env::var("BUILDTREE_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
