use std::path::PathBuf;

use crate::requirement::Category;

/// Errors that can occur while loading manifests and requirement sets.
///
/// Unmet requirements are never reported through this type; see
/// [`BlockingReason`](crate::BlockingReason).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse a manifest or host snapshot TOML document.
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Manifest file not found at the expected path.
    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Host snapshot file not found at the expected path.
    #[error("host snapshot not found: {0}")]
    HostNotFound(PathBuf),

    /// A host snapshot did not provide a required version.
    #[error("host snapshot is missing '{0}'")]
    MissingHostVersion(&'static str),

    /// Invalid dotted version string.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A requirement entry that can never be valid.
    #[error("invalid {category} requirement{}: {reason}", extension_suffix(.extension))]
    InvalidRequirement {
        category: Category,
        extension: Option<String>,
        reason: String,
    },

    /// Unknown manifest kind.
    #[error("unknown manifest kind '{0}' (expected framework, theme or extension)")]
    UnknownKind(String),

    /// Invalid extension name.
    #[error("invalid extension name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Failed to serialize a manifest.
    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error reading manifest or snapshot files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn extension_suffix(extension: &Option<String>) -> String {
    match extension {
        Some(name) => format!(" for extension '{name}'"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
