//! Component manifests: metadata plus requirements merged onto the defaults
//! of the component's kind.
//!
//! The canonical filename is [`MANIFEST_FILENAME`](crate::MANIFEST_FILENAME)
//! (`manifest.toml`).
//!
//! # Example TOML
//!
//! ```toml
//! kind = "theme"
//! name = "Scratch"
//! version = "1.4.0"
//! author = "Scratch Team"
//!
//! [requirements.platform]
//! min_version = "4.0"
//!
//! [requirements.extensions.gallery]
//! min_version = "1.0"
//!
//! [settings]
//! sidebar = "left"
//! ```
//!
//! Keys other than the ones modelled here (like `settings` above) are kept as
//! custom fields and can be read back with [`Manifest::get`].

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::host::Host;
use crate::requirement::{RequirementSet, VersionBounds};
use crate::resolver::Resolver;
use crate::version::Version;

/// Minimum platform version every component requires unless overridden.
pub const DEFAULT_MIN_PLATFORM_VERSION: &str = "3.9";

/// Version reported by manifests that do not declare one.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Name given to a framework manifest without one.
pub const DEFAULT_FRAMEWORK_NAME: &str = "Framework";

/// Id given to a theme manifest without one.
pub const DEFAULT_THEME_ID: &str = "default";

/// What kind of component a manifest describes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestKind {
    /// The framework itself.
    Framework,
    /// A theme built on the framework.
    Theme,
    /// An extension loaded by the framework.
    #[default]
    Extension,
}

impl ManifestKind {
    /// Requirement categories and default bounds for this kind.
    ///
    /// The framework can only depend on the platform; themes and extensions
    /// may also depend on the framework and on other extensions.
    pub fn default_requirements(self) -> RequirementSet {
        let platform = VersionBounds::any().with_min(Version::from_segments(&[3, 9]));
        match self {
            ManifestKind::Framework => RequirementSet::new().with_platform(platform),
            ManifestKind::Theme | ManifestKind::Extension => RequirementSet::new()
                .with_platform(platform)
                .with_framework(VersionBounds::any())
                .with_extensions_category(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ManifestKind::Framework => "framework",
            ManifestKind::Theme => "theme",
            ManifestKind::Extension => "extension",
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "framework" => Ok(ManifestKind::Framework),
            "theme" => Ok(ManifestKind::Theme),
            "extension" => Ok(ManifestKind::Extension),
            _ => Err(Error::UnknownKind(s.to_string())),
        }
    }
}

/// Descriptive metadata shared by all manifest kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestMeta {
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_version")]
    pub version: Version,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_uri: Option<String>,
}

impl Default for ManifestMeta {
    fn default() -> Self {
        Self {
            name: None,
            uri: None,
            description: None,
            version: default_version(),
            author: None,
            author_uri: None,
        }
    }
}

fn default_version() -> Version {
    Version::from_segments(&[0, 0, 0])
}

/// On-disk shape of a manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    kind: ManifestKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(flatten)]
    meta: ManifestMeta,
    #[serde(default)]
    requirements: RequirementSet,
    #[serde(flatten)]
    custom: toml::Table,
}

/// A validated component manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    kind: ManifestKind,
    id: Option<String>,
    meta: ManifestMeta,
    requirements: RequirementSet,
    custom: toml::Table,
    document: toml::Table,
}

impl Manifest {
    /// Build a manifest, merging `requirements` onto the kind's defaults.
    pub fn new(kind: ManifestKind, meta: ManifestMeta, requirements: &RequirementSet) -> Result<Self> {
        Self::build(ManifestFile {
            kind,
            id: None,
            meta,
            requirements: requirements.clone(),
            custom: toml::Table::new(),
        })
    }

    /// Parse a manifest from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: ManifestFile = toml::from_str(content)?;
        Self::build(file)
    }

    /// Read and parse a manifest from a file path.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Serialize the manifest, with merged requirements, back to TOML.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_file())?)
    }

    fn build(mut file: ManifestFile) -> Result<Self> {
        let requirements = file.kind.default_requirements().merge(&file.requirements)?;
        file.requirements = requirements.clone();

        match file.kind {
            ManifestKind::Framework => {
                if file.meta.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
                    file.meta.name = Some(DEFAULT_FRAMEWORK_NAME.to_string());
                }
            }
            ManifestKind::Theme => {
                file.id.get_or_insert_with(|| DEFAULT_THEME_ID.to_string());
            }
            ManifestKind::Extension => {
                if file.id.take().is_some() {
                    tracing::debug!("Ignoring 'id' in extension manifest");
                }
            }
        }

        // Custom values go in as parsed so datetimes keep their TOML type.
        let typed = ManifestFile {
            custom: toml::Table::new(),
            ..file.clone()
        };
        let mut document = match toml::Value::try_from(&typed)? {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        };
        document.extend(file.custom.clone());

        tracing::debug!(
            kind = %file.kind,
            name = file.meta.name.as_deref().unwrap_or(""),
            version = %file.meta.version,
            "Loaded manifest"
        );

        Ok(Self {
            kind: file.kind,
            id: file.id,
            meta: file.meta,
            requirements,
            custom: file.custom,
            document,
        })
    }

    fn to_file(&self) -> ManifestFile {
        ManifestFile {
            kind: self.kind,
            id: self.id.clone(),
            meta: self.meta.clone(),
            requirements: self.requirements.clone(),
            custom: self.custom.clone(),
        }
    }

    pub fn kind(&self) -> ManifestKind {
        self.kind
    }

    pub fn meta(&self) -> &ManifestMeta {
        &self.meta
    }

    pub fn name(&self) -> Option<&str> {
        self.meta.name.as_deref()
    }

    pub fn version(&self) -> &Version {
        &self.meta.version
    }

    /// Theme id; `None` for extensions.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Requirements after merging with the kind's defaults.
    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    /// Extensions this component requires, in declaration order.
    pub fn required_extensions(&self) -> IndexMap<String, VersionBounds> {
        self.requirements.extensions().cloned().unwrap_or_default()
    }

    /// Custom top-level fields not modelled by [`ManifestMeta`].
    pub fn custom(&self) -> &toml::Table {
        &self.custom
    }

    /// Look up a value by a `/`-separated key path, e.g.
    /// `"requirements/platform/min_version"` or `"settings/sidebar"`.
    pub fn get(&self, multi_key: &str) -> Option<&toml::Value> {
        let mut keys = multi_key.split('/').filter(|k| !k.is_empty());
        let mut current = self.document.get(keys.next()?)?;
        for key in keys {
            current = current.as_table()?.get(key)?;
        }
        Some(current)
    }

    /// Create a resolver over this manifest's requirements.
    pub fn resolver<H: Host>(&self, host: H) -> Result<Resolver<H>> {
        Resolver::new(self.requirements.clone(), host)
    }

    /// One-shot check of this manifest's requirements against `host`.
    ///
    /// Use [`resolver`](Self::resolver) to keep evaluation state and re-check
    /// after missing extensions have been loaded.
    pub fn requirements_met<H: Host>(&self, host: H) -> Result<bool> {
        Ok(self.resolver(host)?.is_met())
    }
}
