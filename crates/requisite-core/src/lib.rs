//! Requirement and version compatibility resolution for component manifests.
//!
//! A component (the framework, a theme, or an extension) declares which
//! platform, framework and extension versions it needs. This crate merges
//! those declarations onto per-kind defaults and evaluates them lazily against
//! a [`Host`], telling apart blocks that can never clear (a version mismatch)
//! from blocks that may clear later (an extension that is not loaded yet).

pub mod error;
pub mod host;
pub mod manifest;
pub mod registry;
pub mod requirement;
pub mod resolver;
pub mod version;

/// The canonical filename for component manifest files.
pub const MANIFEST_FILENAME: &str = "manifest.toml";

pub use error::{Error, Result};
pub use host::{Host, HostSnapshot, StaticHost};
pub use manifest::{Manifest, ManifestKind, ManifestMeta};
pub use registry::{ExtensionRegistry, InstalledExtension};
pub use requirement::{Category, RequirementSet, Unmet, VersionBounds};
pub use resolver::{BlockingReason, EvaluationState, Resolver, Status};
pub use version::Version;
