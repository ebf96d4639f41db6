//! CLI argument definitions.
//!
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// hostcook - apply host-configuration recipes to computers.
#[derive(Debug, Parser)]
#[command(name = "hostcook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to project root (overrides discovery of .hostcook/)
    #[arg(short, long, global = true)]
    pub project: Option<PathBuf>,

    /// Path to settings file (overrides .hostcook/settings.yml)
    #[arg(long, global = true, env = "HOSTCOOK_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Path to environment file (overrides .hostcook/environment.yml)
    #[arg(long, global = true, env = "HOSTCOOK_ENVIRONMENT")]
    pub environment: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run pre-apply checks, then apply recipes to a computer
    Apply(TargetArgs),

    /// Remove what recipes left behind on a computer
    Cleanup(TargetArgs),

    /// Run pre-apply checks only
    Check(CheckArgs),

    /// List available recipes and configured computers
    List,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for `apply` and `cleanup`.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TargetArgs {
    /// Computer name from the environment
    pub computer: String,

    /// Recipe to run (repeatable; defaults to the computer's `recipes`)
    #[arg(short, long = "recipe", value_name = "RECIPE")]
    pub recipes: Vec<String>,

    /// Run commands on this machine instead of over SSH
    #[arg(long, conflicts_with = "host")]
    pub local: bool,

    /// SSH host (overrides the computer's `host` attribute)
    #[arg(long)]
    pub host: Option<String>,

    /// Log mutating commands without executing them
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Computer name from the environment
    pub computer: String,

    /// Recipe to check (repeatable; defaults to the computer's `recipes`)
    #[arg(short, long = "recipe", value_name = "RECIPE")]
    pub recipes: Vec<String>,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_apply_with_recipes() {
        let cli = Cli::parse_from([
            "hostcook", "apply", "web1", "-r", "example_com", "--dry-run",
        ]);
        match cli.command {
            Commands::Apply(args) => {
                assert_eq!(args.computer, "web1");
                assert_eq!(args.recipes, vec!["example_com"]);
                assert!(args.dry_run);
                assert!(!args.local);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::parse_from(["hostcook", "list", "--debug", "--project", "/srv/infra"]);
        assert!(cli.debug);
        assert_eq!(cli.project, Some(PathBuf::from("/srv/infra")));
    }

    #[test]
    fn local_conflicts_with_host() {
        let result = Cli::try_parse_from([
            "hostcook", "cleanup", "web1", "--local", "--host", "10.0.0.5",
        ]);
        assert!(result.is_err());
    }
}
