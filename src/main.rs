//! hostcook CLI entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use hostcook::cli::{Cli, CommandDispatcher};
use hostcook::config::{find_project_root, ConfigPaths};
use hostcook::ui::{OutputMode, TerminalUI, UserInterface};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("hostcook=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostcook=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// `--project`, else the nearest ancestor holding `.hostcook/`, else the cwd.
fn resolve_project_root(explicit: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path.clone();
    }
    let cwd = std::env::current_dir().unwrap_or_default();
    find_project_root(&cwd).unwrap_or(cwd)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --no-color before anything styles output
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
    }

    init_tracing(cli.debug);
    tracing::debug!("hostcook starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };
    let mut ui = TerminalUI::new(output_mode);

    let project_root = resolve_project_root(cli.project.as_ref());
    let paths = ConfigPaths::discover(&project_root)
        .with_overrides(cli.settings.as_deref(), cli.environment.as_deref());
    let dispatcher = CommandDispatcher::new(project_root).with_paths(paths);

    match dispatcher.dispatch(&cli, &mut ui) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(1)
        }
    }
}
