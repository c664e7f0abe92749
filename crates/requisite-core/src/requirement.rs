//! Declarative requirement sets and default merging.
//!
//! A [`RequirementSet`] groups version bounds by [`Category`]. A category that
//! is absent from the set does not exist for the component at all, while a
//! present category with no bounds is trivially satisfied.
//!
//! # Example TOML
//!
//! ```toml
//! [platform]
//! min_version = "3.9"
//!
//! [framework]
//! max_version = "3.0"
//!
//! [extensions.gallery]
//! min_version = "1.0"
//!
//! [extensions.slider]
//! ```

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::Version;

/// A class of requirement.
///
/// Variants are declared in evaluation precedence order: when several
/// categories are unmet at once, the earliest one is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// The hosting platform's version.
    Platform,
    /// The embedding framework's version.
    Framework,
    /// Other extensions, looked up by name.
    Extensions,
}

impl Category {
    /// All categories in evaluation precedence order.
    pub const ALL: [Category; 3] = [Category::Platform, Category::Framework, Category::Extensions];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Platform => "platform",
            Category::Framework => "framework",
            Category::Extensions => "extensions",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a concrete version failed a requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Unmet {
    /// The required extension is not registered (yet).
    Missing,
    /// The found version is older than `min_version`.
    BelowMinimum { found: Version },
    /// The found version is newer than `max_version`.
    AboveMaximum { found: Version },
}

impl Unmet {
    /// Whether this is a version bound mismatch rather than a missing extension.
    pub fn is_version_mismatch(&self) -> bool {
        !matches!(self, Unmet::Missing)
    }
}

/// Optional inclusive lower and upper version bounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionBounds {
    /// Fails when the live version is lower.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<Version>,
    /// Fails when the live version is higher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_version: Option<Version>,
}

impl VersionBounds {
    /// Bounds that accept any version.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_min(mut self, version: Version) -> Self {
        self.min_version = Some(version);
        self
    }

    pub fn with_max(mut self, version: Version) -> Self {
        self.max_version = Some(version);
        self
    }

    /// True when neither bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.min_version.is_none() && self.max_version.is_none()
    }

    /// Check a live version against both bounds, minimum first.
    pub fn check(&self, found: &Version) -> std::result::Result<(), Unmet> {
        if let Some(min) = &self.min_version {
            if found < min {
                return Err(Unmet::BelowMinimum {
                    found: found.clone(),
                });
            }
        }
        if let Some(max) = &self.max_version {
            if found > max {
                return Err(Unmet::AboveMaximum {
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }

    /// Field-by-field overlay: every bound set in `other` wins.
    pub fn overlay(&self, other: &VersionBounds) -> VersionBounds {
        VersionBounds {
            min_version: other.min_version.clone().or_else(|| self.min_version.clone()),
            max_version: other.max_version.clone().or_else(|| self.max_version.clone()),
        }
    }

    fn validate(&self, category: Category, extension: Option<&str>) -> Result<()> {
        if let (Some(min), Some(max)) = (&self.min_version, &self.max_version) {
            if min > max {
                return Err(Error::InvalidRequirement {
                    category,
                    extension: extension.map(str::to_string),
                    reason: format!("min_version {min} is greater than max_version {max}"),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for VersionBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.min_version, &self.max_version) {
            (None, None) => f.write_str("any version"),
            (Some(min), None) => write!(f, ">= {min}"),
            (None, Some(max)) => write!(f, "<= {max}"),
            (Some(min), Some(max)) => write!(f, ">= {min}, <= {max}"),
        }
    }
}

/// Version requirements grouped by category.
///
/// Extension entries keep their declaration order, which is also the order in
/// which they are evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    platform: Option<VersionBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    framework: Option<VersionBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    extensions: Option<IndexMap<String, VersionBounds>>,
}

impl RequirementSet {
    /// A set with no categories.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a requirement set from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let set: Self = toml::from_str(content)?;
        set.validate()?;
        Ok(set)
    }

    pub fn with_platform(mut self, bounds: VersionBounds) -> Self {
        self.platform = Some(bounds);
        self
    }

    pub fn with_framework(mut self, bounds: VersionBounds) -> Self {
        self.framework = Some(bounds);
        self
    }

    /// Declare the Extensions category without any entries.
    pub fn with_extensions_category(mut self) -> Self {
        self.extensions.get_or_insert_with(IndexMap::new);
        self
    }

    /// Add or replace a single extension requirement.
    pub fn with_extension(mut self, name: impl Into<String>, bounds: VersionBounds) -> Self {
        self.extensions
            .get_or_insert_with(IndexMap::new)
            .insert(name.into(), bounds);
        self
    }

    pub fn platform(&self) -> Option<&VersionBounds> {
        self.platform.as_ref()
    }

    pub fn framework(&self) -> Option<&VersionBounds> {
        self.framework.as_ref()
    }

    pub fn extensions(&self) -> Option<&IndexMap<String, VersionBounds>> {
        self.extensions.as_ref()
    }

    /// Whether the category exists in this set.
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Platform => self.platform.is_some(),
            Category::Framework => self.framework.is_some(),
            Category::Extensions => self.extensions.is_some(),
        }
    }

    /// Present categories in precedence order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.has(*c))
    }

    /// True when no category remains.
    pub fn is_empty(&self) -> bool {
        self.categories().next().is_none()
    }

    /// Merge `overrides` onto these defaults.
    ///
    /// Only categories present in `self` survive. Platform and framework bounds
    /// are overlaid field by field; extension entries replace same-named
    /// defaults whole and new names are appended in override order. The result
    /// is validated.
    pub fn merge(&self, overrides: &RequirementSet) -> Result<RequirementSet> {
        let merged = RequirementSet {
            platform: self.platform.as_ref().map(|defaults| match &overrides.platform {
                Some(bounds) => defaults.overlay(bounds),
                None => defaults.clone(),
            }),
            framework: self.framework.as_ref().map(|defaults| match &overrides.framework {
                Some(bounds) => defaults.overlay(bounds),
                None => defaults.clone(),
            }),
            extensions: self.extensions.as_ref().map(|defaults| {
                let mut entries = defaults.clone();
                if let Some(extra) = &overrides.extensions {
                    for (name, bounds) in extra {
                        entries.insert(name.clone(), bounds.clone());
                    }
                }
                entries
            }),
        };

        for category in overrides.categories() {
            if !self.has(category) {
                tracing::warn!(
                    category = %category,
                    "Dropping requirement for a category this component does not support"
                );
            }
        }

        merged.validate()?;
        Ok(merged)
    }

    /// Reject bounds that can never be satisfied and blank extension names.
    pub fn validate(&self) -> Result<()> {
        if let Some(bounds) = &self.platform {
            bounds.validate(Category::Platform, None)?;
        }
        if let Some(bounds) = &self.framework {
            bounds.validate(Category::Framework, None)?;
        }
        if let Some(extensions) = &self.extensions {
            for (name, bounds) in extensions {
                if name.trim().is_empty() {
                    return Err(Error::InvalidName {
                        name: name.clone(),
                        reason: "extension name must not be empty".to_string(),
                    });
                }
                bounds.validate(Category::Extensions, Some(name))?;
            }
        }
        Ok(())
    }

    /// Drop a whole category.
    pub(crate) fn remove(&mut self, category: Category) {
        match category {
            Category::Platform => self.platform = None,
            Category::Framework => self.framework = None,
            Category::Extensions => self.extensions = None,
        }
    }

    /// Drop one extension entry, and the category with it once it is empty.
    pub(crate) fn remove_extension(&mut self, name: &str) {
        if let Some(extensions) = &mut self.extensions {
            extensions.shift_remove(name);
            if extensions.is_empty() {
                self.extensions = None;
            }
        }
    }
}
