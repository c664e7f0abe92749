//! Requisite CLI
//!
//! Checks component manifests against a snapshot of the running system.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use cli::{Cli, Commands};
use commands::check::VersionOverrides;
use error::Result;

/// Exit status for errors, usage errors included. 2 and 3 are check outcomes.
const ERROR_EXIT: i32 = 1;

fn main() {
    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(ERROR_EXIT);
        }
    }
}

fn run() -> Result<i32> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // `--help` and `--version` also arrive here, printed to stdout.
            e.print()?;
            return Ok(if e.use_stderr() { ERROR_EXIT } else { 0 });
        }
    };

    // Setup tracing if verbose
    if cli.verbose {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_target(true)
            .with_writer(std::io::stderr)
            .finish();
        if tracing::subscriber::set_global_default(subscriber).is_err() {
            eprintln!("{}: tracing subscriber already set", "warning".yellow());
        }
        tracing::debug!("Verbose mode enabled");
    }

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            // No command provided - show help hint
            println!("{} Component requirement checker", "requisite".green().bold());
            println!();
            println!("Run {} for available commands.", "requisite --help".cyan());
            Ok(0)
        }
    }
}

fn execute_command(cmd: Commands) -> Result<i32> {
    match cmd {
        Commands::Check {
            manifest,
            host,
            platform_version,
            framework_version,
            json,
        } => {
            let overrides = VersionOverrides {
                platform: platform_version.as_deref(),
                framework: framework_version.as_deref(),
            };
            let outcome = commands::run_check(&manifest, host.as_deref(), overrides, json)?;
            Ok(outcome.exit_code())
        }
        Commands::Show { manifest, json } => {
            commands::run_show(&manifest, json)?;
            Ok(0)
        }
        Commands::Compare { a, b } => {
            commands::run_compare(&a, &b)?;
            Ok(0)
        }
    }
}
