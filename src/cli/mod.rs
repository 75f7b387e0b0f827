//! CLI tools for buildtree
//!
//! - `check`: Validate a project tree and report script parameter references
//! - `apply`: Apply patch overlays and print the resolved tree
//! - `export`: Convert a tree between YAML and JSON
//! - `conditions`: Dry-run failure conditions for one build type
//! - `completions`: Generate shell completions

pub mod apply;
pub mod check;
pub mod completions;
pub mod conditions;
pub mod export;

use anyhow::{Context, Result};
use buildtree::infrastructure::{Config, DocumentFormat, init_logging};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

/// CLI arguments for buildtree
#[derive(Parser, Debug)]
#[command(name = "buildtree")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a project tree
    Check {
        /// Project file
        file: PathBuf,
        /// Patch overlays to apply before checking
        #[arg(short, long)]
        patch: Vec<PathBuf>,
        /// Treat references to undeclared parameters as errors
        #[arg(long)]
        strict: bool,
    },

    /// Apply patch overlays and print the resolved tree
    Apply {
        /// Project file
        file: PathBuf,
        /// Patch overlays, applied in order
        #[arg(short, long, required = true)]
        patch: Vec<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a project tree to another format
    Export {
        /// Project file
        file: PathBuf,
        /// Export only this build type
        #[arg(short, long)]
        build_type: Option<String>,
        /// Merge the templates the build type is based on
        #[arg(long, requires = "build_type")]
        resolved: bool,
        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Evaluate the failure conditions of a build type
    Conditions {
        /// Project file
        file: PathBuf,
        /// Build type id
        #[arg(short, long)]
        build_type: String,
        /// Execution parameter, `NAME=VALUE`
        #[arg(long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,
        /// Build log to check text conditions against
        #[arg(long)]
        log: Option<PathBuf>,
        /// Metric sample, `METRIC=CURRENT:BASELINE`
        #[arg(long = "metric", value_name = "METRIC=CURRENT:BASELINE")]
        metrics: Vec<String>,
        /// Patch overlays to apply first
        #[arg(short, long)]
        patch: Vec<PathBuf>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    Yaml,
    Json,
}

impl From<FormatArg> for DocumentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Yaml => Self::Yaml,
            FormatArg::Json => Self::Json,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

/// Writes `content` to `output`, or prints it
fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => fs::write(path, content)
            .with_context(|| format!("Failed to write output to: {}", path.display())),
        None => {
            print!("{content}");
            if !content.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("Failed to load config: {}", path.display()),
        None => "Failed to load config".to_string(),
    })?;
    init_logging(&config.log_level);

    match args.command {
        Command::Check {
            file,
            patch,
            strict,
        } => {
            let report = check::check_project(&file, &patch, strict || config.strict)?;
            print!("{report}");
            if report.has_errors() {
                anyhow::bail!("{} error(s) found in {}", report.error_count(), file.display());
            }
        }
        Command::Apply {
            file,
            patch,
            format,
            output,
        } => {
            let format = format.map_or(config.default_format, DocumentFormat::from);
            let rendered = apply::apply_overlays(&file, &patch, format)?;
            emit(&rendered, output.as_deref())?;
        }
        Command::Export {
            file,
            build_type,
            resolved,
            format,
            output,
        } => {
            let format = format.map_or(config.default_format, DocumentFormat::from);
            let rendered =
                export::export_project(&file, build_type.as_deref(), resolved, format)?;
            emit(&rendered, output.as_deref())?;
        }
        Command::Conditions {
            file,
            build_type,
            params,
            log,
            metrics,
            patch,
        } => {
            let request = conditions::ConditionsRequest {
                build_type,
                params: conditions::parse_params(&params)?,
                log: log
                    .map(|path| {
                        fs::read_to_string(&path)
                            .with_context(|| format!("Failed to read log: {}", path.display()))
                    })
                    .transpose()?,
                metrics: conditions::parse_metrics(&metrics)?,
            };
            let report = conditions::evaluate_conditions(&file, &patch, &request)?;
            print!("{report}");
        }
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;
            emit(&completions, output.as_deref())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_parse_conditions_args() {
        let args = Args::try_parse_from([
            "buildtree",
            "conditions",
            "project.yaml",
            "--build-type",
            "UnitTests",
            "--param",
            "TightenCoverage=false",
            "--metric",
            "line_coverage=70:80",
        ])
        .unwrap();
        match args.command {
            Command::Conditions {
                build_type,
                params,
                metrics,
                ..
            } => {
                assert_eq!(build_type, "UnitTests");
                assert_eq!(params, vec!["TightenCoverage=false"]);
                assert_eq!(metrics, vec!["line_coverage=70:80"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_apply_requires_patch() {
        assert!(Args::try_parse_from(["buildtree", "apply", "project.yaml"]).is_err());
    }
}
