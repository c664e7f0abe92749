//! Registry of installed extensions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::version::Version;

/// An extension that is currently installed, as returned by
/// [`Host::find_extension`](crate::Host::find_extension).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledExtension {
    /// Extension name.
    pub name: String,
    /// Installed version.
    pub version: Version,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl InstalledExtension {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The installed version.
    pub fn version(&self) -> &Version {
        &self.version
    }
}

/// Installed extensions keyed by name, in registration order.
#[derive(Debug, Clone, Default)]
pub struct ExtensionRegistry {
    entries: IndexMap<String, InstalledExtension>,
}

impl ExtensionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an extension, replacing any entry with the same name.
    pub fn register(&mut self, extension: InstalledExtension) {
        tracing::debug!(name = %extension.name, version = %extension.version, "Registering extension");
        self.entries.insert(extension.name.clone(), extension);
    }

    /// Remove an extension, returning it if it was registered.
    pub fn unregister(&mut self, name: &str) -> Option<InstalledExtension> {
        self.entries.shift_remove(name)
    }

    /// Look up an extension by name.
    pub fn get(&self, name: &str) -> Option<&InstalledExtension> {
        self.entries.get(name)
    }

    /// Check if an extension is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterate over registered extensions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &InstalledExtension> {
        self.entries.values()
    }

    /// Number of registered extensions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<InstalledExtension> for ExtensionRegistry {
    fn from_iter<I: IntoIterator<Item = InstalledExtension>>(iter: I) -> Self {
        let mut registry = Self::new();
        for extension in iter {
            registry.register(extension);
        }
        registry
    }
}
