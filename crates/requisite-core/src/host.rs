//! The live system state that requirements are checked against.
//!
//! A [`Host`] answers three questions: which platform version is running,
//! which framework version is running, and whether a named extension is
//! installed. [`StaticHost`] is an in-memory implementation that can be loaded
//! from a TOML snapshot:
//!
//! ```toml
//! platform_version = "4.0"
//! framework_version = "2.1.0"
//!
//! [extensions]
//! gallery = "1.2"
//! slider = { version = "0.9", description = "Image slider" }
//! ```

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::sync::{Arc, Mutex, PoisonError};

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::registry::{ExtensionRegistry, InstalledExtension};
use crate::version::Version;

/// Read-only view of the running system.
///
/// Lookups are expected to be cheap and in-memory; a resolver may call them
/// on every evaluation.
pub trait Host {
    /// Version of the hosting platform.
    fn platform_version(&self) -> Version;

    /// Version of the embedding framework.
    fn framework_version(&self) -> Version;

    /// Look up an installed extension by name. `None` means "not installed
    /// yet", which is a normal outcome.
    fn find_extension(&self, name: &str) -> Option<InstalledExtension>;
}

impl<H: Host + ?Sized> Host for &H {
    fn platform_version(&self) -> Version {
        (**self).platform_version()
    }

    fn framework_version(&self) -> Version {
        (**self).framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        (**self).find_extension(name)
    }
}

impl<H: Host + ?Sized> Host for Box<H> {
    fn platform_version(&self) -> Version {
        (**self).platform_version()
    }

    fn framework_version(&self) -> Version {
        (**self).framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        (**self).find_extension(name)
    }
}

impl<H: Host + ?Sized> Host for Rc<H> {
    fn platform_version(&self) -> Version {
        (**self).platform_version()
    }

    fn framework_version(&self) -> Version {
        (**self).framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        (**self).find_extension(name)
    }
}

impl<H: Host + ?Sized> Host for Arc<H> {
    fn platform_version(&self) -> Version {
        (**self).platform_version()
    }

    fn framework_version(&self) -> Version {
        (**self).framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        (**self).find_extension(name)
    }
}

impl<H: Host> Host for RefCell<H> {
    fn platform_version(&self) -> Version {
        self.borrow().platform_version()
    }

    fn framework_version(&self) -> Version {
        self.borrow().framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        self.borrow().find_extension(name)
    }
}

impl<H: Host> Host for Mutex<H> {
    fn platform_version(&self) -> Version {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .platform_version()
    }

    fn framework_version(&self) -> Version {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .framework_version()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .find_extension(name)
    }
}

/// A host with fixed versions and a mutable extension registry.
#[derive(Debug, Clone)]
pub struct StaticHost {
    platform_version: Version,
    framework_version: Version,
    extensions: ExtensionRegistry,
}

impl StaticHost {
    /// Create a host with no extensions installed.
    pub fn new(platform_version: Version, framework_version: Version) -> Self {
        Self {
            platform_version,
            framework_version,
            extensions: ExtensionRegistry::new(),
        }
    }

    /// Builder-style variant of [`install`](Self::install).
    pub fn with_extension(mut self, name: impl Into<String>, version: Version) -> Self {
        self.install(InstalledExtension::new(name, version));
        self
    }

    /// Install (or upgrade) an extension.
    pub fn install(&mut self, extension: InstalledExtension) {
        self.extensions.register(extension);
    }

    /// Remove an installed extension.
    pub fn uninstall(&mut self, name: &str) -> Option<InstalledExtension> {
        self.extensions.unregister(name)
    }

    pub fn extensions(&self) -> &ExtensionRegistry {
        &self.extensions
    }

    /// Read a host snapshot file.
    pub fn from_path(path: &Path) -> Result<Self> {
        HostSnapshot::from_path(path)?.into_host()
    }

    /// Parse a host snapshot from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        HostSnapshot::from_toml(content)?.into_host()
    }
}

impl Host for StaticHost {
    fn platform_version(&self) -> Version {
        self.platform_version.clone()
    }

    fn framework_version(&self) -> Version {
        self.framework_version.clone()
    }

    fn find_extension(&self, name: &str) -> Option<InstalledExtension> {
        self.extensions.get(name).cloned()
    }
}

/// Raw host snapshot as read from TOML.
///
/// Either version may be left out and supplied later (for example from
/// command-line flags) before calling [`into_host`](Self::into_host).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostSnapshot {
    #[serde(default)]
    pub platform_version: Option<Version>,
    #[serde(default)]
    pub framework_version: Option<Version>,
    #[serde(default)]
    pub extensions: IndexMap<String, SnapshotExtension>,
}

/// An extension entry in a host snapshot: either a bare version or a table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SnapshotExtension {
    Version(Version),
    Detailed {
        version: Version,
        #[serde(default)]
        description: Option<String>,
    },
}

impl HostSnapshot {
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::HostNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Build a [`StaticHost`], failing if either version is still unknown.
    pub fn into_host(self) -> Result<StaticHost> {
        let platform = self
            .platform_version
            .ok_or(Error::MissingHostVersion("platform_version"))?;
        let framework = self
            .framework_version
            .ok_or(Error::MissingHostVersion("framework_version"))?;

        let mut host = StaticHost::new(platform, framework);
        for (name, entry) in self.extensions {
            let extension = match entry {
                SnapshotExtension::Version(version) => InstalledExtension::new(name, version),
                SnapshotExtension::Detailed {
                    version,
                    description,
                } => InstalledExtension {
                    name,
                    version,
                    description,
                },
            };
            host.install(extension);
        }
        Ok(host)
    }
}
