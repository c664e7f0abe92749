//! Check command implementation

use std::path::Path;

use colored::Colorize;
use requisite_core::{BlockingReason, HostSnapshot, Manifest, Status, Version};
use serde::Serialize;

use crate::error::Result;

/// Result of a check, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Met,
    Blocked,
    Waiting,
}

impl CheckOutcome {
    pub fn exit_code(self) -> i32 {
        match self {
            CheckOutcome::Met => 0,
            CheckOutcome::Blocked => 2,
            CheckOutcome::Waiting => 3,
        }
    }
}

/// Version overrides applied on top of the host snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionOverrides<'a> {
    pub platform: Option<&'a str>,
    pub framework: Option<&'a str>,
}

#[derive(Serialize)]
struct CheckReport<'a> {
    name: Option<&'a str>,
    kind: &'static str,
    version: &'a Version,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<&'a BlockingReason>,
}

/// Run the check command
pub fn run_check(
    manifest_path: &Path,
    host_path: Option<&Path>,
    overrides: VersionOverrides<'_>,
    json: bool,
) -> Result<CheckOutcome> {
    let manifest_path = super::manifest_path(manifest_path)?;
    let manifest = Manifest::from_path(&manifest_path)?;

    let mut snapshot = match host_path {
        Some(path) => HostSnapshot::from_path(path)?,
        None => HostSnapshot::default(),
    };
    if let Some(platform) = overrides.platform {
        snapshot.platform_version = Some(Version::parse(platform)?);
    }
    if let Some(framework) = overrides.framework {
        snapshot.framework_version = Some(Version::parse(framework)?);
    }
    let host = snapshot.into_host()?;

    tracing::debug!(
        manifest = %manifest_path.display(),
        extensions = host.extensions().len(),
        "Checking requirements"
    );

    let mut resolver = manifest.resolver(host)?;
    let status = resolver.status();
    let (outcome, reason) = match &status {
        Status::Met => (CheckOutcome::Met, None),
        Status::Blocked(reason) => (CheckOutcome::Blocked, Some(reason)),
        Status::Waiting(reason) => (CheckOutcome::Waiting, Some(reason)),
    };

    if json {
        let report = CheckReport {
            name: manifest.name(),
            kind: manifest.kind().as_str(),
            version: manifest.version(),
            status: match outcome {
                CheckOutcome::Met => "met",
                CheckOutcome::Blocked => "blocked",
                CheckOutcome::Waiting => "waiting",
            },
            reason,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(outcome);
    }

    println!(
        "{} {} ({})",
        manifest.name().unwrap_or("Unnamed component").bold(),
        manifest.version(),
        manifest.kind().to_string().dimmed()
    );
    match (outcome, reason) {
        (CheckOutcome::Met, _) | (_, None) => {
            println!("  {} {}", "+".green(), "All requirements met".green());
        }
        (CheckOutcome::Blocked, Some(reason)) => {
            println!("  {} {}", "x".red(), reason);
            println!(
                "  {}",
                "Version mismatch; this will not change without an upgrade.".dimmed()
            );
        }
        (CheckOutcome::Waiting, Some(reason)) => {
            println!("  {} {}", "~".yellow(), reason);
            println!(
                "  {}",
                "Check again once the extension has been loaded.".dimmed()
            );
        }
    }

    Ok(outcome)
}
