//! Show command implementation

use std::path::Path;

use colored::Colorize;
use requisite_core::{Category, Manifest, ManifestMeta, RequirementSet};
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct ShowReport<'a> {
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
    #[serde(flatten)]
    meta: &'a ManifestMeta,
    requirements: &'a RequirementSet,
}

/// Run the show command
pub fn run_show(manifest_path: &Path, json: bool) -> Result<()> {
    let manifest_path = super::manifest_path(manifest_path)?;
    let manifest = Manifest::from_path(&manifest_path)?;

    if json {
        let report = ShowReport {
            kind: manifest.kind().as_str(),
            id: manifest.id(),
            meta: manifest.meta(),
            requirements: manifest.requirements(),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let meta = manifest.meta();
    println!(
        "{} {}",
        manifest.name().unwrap_or("Unnamed component").bold(),
        meta.version
    );
    println!();
    println!("{}:   {}", "Kind".dimmed(), manifest.kind());
    if let Some(id) = manifest.id() {
        println!("{}:     {}", "Id".dimmed(), id);
    }
    if let Some(author) = &meta.author {
        println!("{}: {}", "Author".dimmed(), author);
    }
    if let Some(description) = &meta.description {
        println!("{}: {}", "About".dimmed(), description);
    }
    println!();

    println!("{}:", "Requirements".bold());
    let requirements = manifest.requirements();
    for category in requirements.categories() {
        match category {
            Category::Platform | Category::Framework => {
                let bounds = match category {
                    Category::Platform => requirements.platform(),
                    _ => requirements.framework(),
                };
                if let Some(bounds) = bounds {
                    println!("  {} {} {}", "+".green(), category.to_string().cyan(), bounds);
                }
            }
            Category::Extensions => {
                let extensions = requirements.extensions().cloned().unwrap_or_default();
                if extensions.is_empty() {
                    println!("  {} {} {}", "+".green(), category.to_string().cyan(), "none".dimmed());
                }
                for (name, bounds) in &extensions {
                    println!("  {} {} {}", "+".green(), format!("extension:{name}").cyan(), bounds);
                }
            }
        }
    }

    Ok(())
}
