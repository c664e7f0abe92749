//! Command implementations for requisite-cli

pub mod check;
pub mod compare;
pub mod show;

use std::path::{Path, PathBuf};

use requisite_core::MANIFEST_FILENAME;

use crate::error::{CliError, Result};

pub use check::run_check;
pub use compare::run_compare;
pub use show::run_show;

/// Accept either a manifest file or a component directory containing one.
fn manifest_path(path: &Path) -> Result<PathBuf> {
    let candidate = if path.is_dir() {
        path.join(MANIFEST_FILENAME)
    } else {
        path.to_path_buf()
    };
    if !candidate.exists() {
        return Err(CliError::user(format!(
            "no manifest at {} (expected a {} file or a directory containing one)",
            candidate.display(),
            MANIFEST_FILENAME
        )));
    }
    Ok(candidate)
}
