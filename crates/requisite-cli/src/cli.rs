//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Requisite - Check component manifests against the running system
#[derive(Parser, Debug)]
#[command(name = "requisite")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check whether a manifest's requirements are met
    ///
    /// Exit status is 0 when met, 2 when permanently blocked by a version
    /// mismatch and 3 when waiting for a missing extension.
    ///
    /// Examples:
    ///   requisite check --host host.toml
    ///   requisite check theme/manifest.toml --platform-version 4.0 --framework-version 2.1
    Check {
        /// Path to the manifest
        #[arg(default_value = requisite_core::MANIFEST_FILENAME)]
        manifest: PathBuf,

        /// Host snapshot with platform, framework and extension versions
        #[arg(long)]
        host: Option<PathBuf>,

        /// Platform version (overrides the snapshot)
        #[arg(long, env = "REQUISITE_PLATFORM_VERSION")]
        platform_version: Option<String>,

        /// Framework version (overrides the snapshot)
        #[arg(long, env = "REQUISITE_FRAMEWORK_VERSION")]
        framework_version: Option<String>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show a manifest with its requirements merged onto the defaults
    Show {
        /// Path to the manifest
        #[arg(default_value = requisite_core::MANIFEST_FILENAME)]
        manifest: PathBuf,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Compare two versions
    Compare {
        /// Left-hand version
        a: String,

        /// Right-hand version
        b: String,
    },
}
