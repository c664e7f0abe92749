//! Lazy, incremental evaluation of a requirement set against a [`Host`].
//!
//! Categories are scanned in the fixed precedence order Platform, Framework,
//! Extensions and the scan stops at the first unmet requirement, so when
//! several requirements fail at once the earliest one in that order is the
//! one reported.
//!
//! A version bound mismatch is *final*: platform, framework and installed
//! extension versions do not change during a run, so the resolver stops
//! evaluating for good. A missing extension is *transient*: it may be
//! registered later, and calling [`Resolver::evaluate`] again picks it up.
//!
//! # Examples
//!
//! ```
//! use requisite_core::{Category, RequirementSet, Resolver, StaticHost, Version, VersionBounds};
//!
//! let v = |s: &str| Version::parse(s).unwrap();
//! let requirements = RequirementSet::new()
//!     .with_platform(VersionBounds::any().with_min(v("3.9")))
//!     .with_extension("gallery", VersionBounds::any().with_min(v("1.0")));
//!
//! let mut resolver = Resolver::new(requirements, StaticHost::new(v("4.0"), v("1.0"))).unwrap();
//! assert!(!resolver.is_met());
//! assert!(!resolver.is_final());
//! assert_eq!(resolver.blocking_reason().unwrap().category, Category::Extensions);
//!
//! resolver.host_mut().install(requisite_core::InstalledExtension::new("gallery", v("1.2")));
//! assert!(resolver.evaluate());
//! ```

use std::fmt;

use serde::Serialize;

use crate::error::Result;
use crate::host::Host;
use crate::requirement::{Category, RequirementSet, Unmet, VersionBounds};
use crate::version::Version;

/// The first requirement found unmet in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockingReason {
    pub category: Category,
    /// Set for the Extensions category only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// The bounds that were declared for the blocking requirement.
    #[serde(flatten)]
    pub requirement: VersionBounds,
    pub unmet: Unmet,
}

impl BlockingReason {
    pub fn min_version(&self) -> Option<&Version> {
        self.requirement.min_version.as_ref()
    }

    pub fn max_version(&self) -> Option<&Version> {
        self.requirement.max_version.as_ref()
    }

    /// Whether this block can never clear within the current run.
    pub fn is_final(&self) -> bool {
        self.unmet.is_version_mismatch()
    }
}

impl fmt::Display for BlockingReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subject = match &self.extension {
            Some(name) => format!("extension '{name}'"),
            None => self.category.to_string(),
        };
        match &self.unmet {
            Unmet::Missing => write!(f, "{subject} ({}) is not installed", self.requirement),
            Unmet::BelowMinimum { found } | Unmet::AboveMaximum { found } => {
                write!(f, "{subject} requires {} (found {found})", self.requirement)
            }
        }
    }
}

/// Mutable evaluation progress, owned by one [`Resolver`].
#[derive(Debug, Clone)]
pub struct EvaluationState {
    pending: RequirementSet,
    blocking: Option<BlockingReason>,
    is_final: bool,
    ever_evaluated: bool,
}

impl EvaluationState {
    fn new(requirements: &RequirementSet) -> Self {
        Self {
            pending: requirements.clone(),
            blocking: None,
            is_final: false,
            ever_evaluated: false,
        }
    }

    /// Requirements not yet proven satisfied.
    pub fn pending(&self) -> &RequirementSet {
        &self.pending
    }

    pub fn blocking(&self) -> Option<&BlockingReason> {
        self.blocking.as_ref()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn ever_evaluated(&self) -> bool {
        self.ever_evaluated
    }

    fn satisfied(&self) -> bool {
        self.pending.is_empty() && self.blocking.is_none()
    }
}

/// Snapshot of a resolver's outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Every requirement is satisfied.
    Met,
    /// Blocked by a missing extension; evaluating again later may succeed.
    Waiting(BlockingReason),
    /// Blocked by a version mismatch; no further evaluation will succeed.
    Blocked(BlockingReason),
}

impl Status {
    pub fn is_met(&self) -> bool {
        matches!(self, Status::Met)
    }
}

/// Evaluates a [`RequirementSet`] against a [`Host`].
///
/// Queries take `&mut self` because they advance the evaluation state; share
/// a resolver across threads by wrapping it in a `Mutex`.
#[derive(Debug)]
pub struct Resolver<H> {
    requirements: RequirementSet,
    state: EvaluationState,
    host: H,
}

impl<H: Host> Resolver<H> {
    /// Create a resolver. Nothing is evaluated until the first query.
    pub fn new(requirements: RequirementSet, host: H) -> Result<Self> {
        requirements.validate()?;
        Ok(Self {
            state: EvaluationState::new(&requirements),
            requirements,
            host,
        })
    }

    /// Whether all requirements are met, evaluating once on first call.
    ///
    /// After the first call this only reports the current state; use
    /// [`evaluate`](Self::evaluate) to re-check after the host changed.
    pub fn is_met(&mut self) -> bool {
        if self.state.is_final {
            return false;
        }
        if !self.state.ever_evaluated {
            self.state.ever_evaluated = true;
            self.scan();
        }
        self.state.satisfied()
    }

    /// Re-check the requirements that are still pending.
    ///
    /// Does nothing once the outcome is final or already met.
    pub fn evaluate(&mut self) -> bool {
        if self.state.is_final {
            return false;
        }
        if self.is_met() {
            return true;
        }
        self.scan();
        self.state.satisfied()
    }

    /// The current blocking requirement, if any.
    pub fn blocking_reason(&self) -> Option<&BlockingReason> {
        self.state.blocking.as_ref()
    }

    /// Whether the resolver has permanently given up.
    pub fn is_final(&self) -> bool {
        self.state.is_final
    }

    /// Evaluate lazily and summarize the outcome.
    pub fn status(&mut self) -> Status {
        self.is_met();
        // After a scan, an absent blocking reason means nothing is pending.
        match self.state.blocking.clone() {
            None => Status::Met,
            Some(reason) if self.state.is_final => Status::Blocked(reason),
            Some(reason) => Status::Waiting(reason),
        }
    }

    /// The requirement set this resolver was built from.
    pub fn requirements(&self) -> &RequirementSet {
        &self.requirements
    }

    pub fn state(&self) -> &EvaluationState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, e.g. to register an extension that was
    /// loaded after the first evaluation.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    fn scan(&mut self) {
        self.state.blocking = None;

        for category in Category::ALL {
            let outcome = match category {
                Category::Platform | Category::Framework => self.check_versioned(category),
                Category::Extensions => self.check_extensions(),
            };

            if let Err(reason) = outcome {
                if reason.is_final() {
                    self.state.is_final = true;
                }
                tracing::debug!(
                    category = %reason.category,
                    extension = reason.extension.as_deref().unwrap_or(""),
                    is_final = self.state.is_final,
                    "Requirement not met: {}",
                    reason
                );
                self.state.blocking = Some(reason);
                return;
            }
        }

        tracing::debug!("All requirements met");
    }

    fn check_versioned(&mut self, category: Category) -> std::result::Result<(), BlockingReason> {
        let bounds = match category {
            Category::Platform => self.state.pending.platform(),
            Category::Framework => self.state.pending.framework(),
            Category::Extensions => return Ok(()),
        };
        let Some(bounds) = bounds.cloned() else {
            return Ok(());
        };

        let live = match category {
            Category::Platform => self.host.platform_version(),
            _ => self.host.framework_version(),
        };
        if let Err(unmet) = bounds.check(&live) {
            return Err(BlockingReason {
                category,
                extension: None,
                requirement: bounds,
                unmet,
            });
        }

        tracing::trace!(category = %category, version = %live, "Requirement met");
        self.state.pending.remove(category);
        Ok(())
    }

    fn check_extensions(&mut self) -> std::result::Result<(), BlockingReason> {
        let Some(entries) = self.state.pending.extensions().cloned() else {
            return Ok(());
        };

        for (name, bounds) in entries {
            let Some(installed) = self.host.find_extension(&name) else {
                return Err(BlockingReason {
                    category: Category::Extensions,
                    extension: Some(name),
                    requirement: bounds,
                    unmet: Unmet::Missing,
                });
            };
            if let Err(unmet) = bounds.check(installed.version()) {
                return Err(BlockingReason {
                    category: Category::Extensions,
                    extension: Some(name),
                    requirement: bounds,
                    unmet,
                });
            }

            tracing::trace!(extension = %name, version = %installed.version(), "Requirement met");
            self.state.pending.remove_extension(&name);
        }

        // Also clears a category that was declared without entries.
        self.state.pending.remove(Category::Extensions);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use std::cell::Cell;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    /// Counts host queries so tests can tell whether a scan happened.
    struct CountingHost {
        inner: StaticHost,
        calls: Cell<usize>,
    }

    impl Host for CountingHost {
        fn platform_version(&self) -> Version {
            self.calls.set(self.calls.get() + 1);
            self.inner.platform_version()
        }

        fn framework_version(&self) -> Version {
            self.calls.set(self.calls.get() + 1);
            self.inner.framework_version()
        }

        fn find_extension(&self, name: &str) -> Option<crate::InstalledExtension> {
            self.calls.set(self.calls.get() + 1);
            self.inner.find_extension(name)
        }
    }

    fn counting(platform: &str) -> CountingHost {
        CountingHost {
            inner: StaticHost::new(v(platform), v("1.0")),
            calls: Cell::new(0),
        }
    }

    #[test]
    fn test_nothing_evaluated_before_first_query() {
        let requirements = RequirementSet::new().with_platform(VersionBounds::any().with_min(v("3.9")));
        let resolver = Resolver::new(requirements, counting("4.0")).unwrap();
        assert!(!resolver.state().ever_evaluated());
        assert_eq!(resolver.host().calls.get(), 0);
        assert!(resolver.blocking_reason().is_none());
    }

    #[test]
    fn test_final_block_skips_host() {
        let requirements = RequirementSet::new().with_platform(VersionBounds::any().with_min(v("3.9")));
        let mut resolver = Resolver::new(requirements, counting("3.8")).unwrap();

        assert!(!resolver.is_met());
        assert!(resolver.is_final());
        let calls = resolver.host().calls.get();

        assert!(!resolver.evaluate());
        assert!(!resolver.is_met());
        assert_eq!(resolver.host().calls.get(), calls);
    }

    #[test]
    fn test_met_does_not_rescan() {
        let requirements = RequirementSet::new().with_platform(VersionBounds::any().with_min(v("3.9")));
        let mut resolver = Resolver::new(requirements, counting("4.0")).unwrap();

        assert!(resolver.is_met());
        let calls = resolver.host().calls.get();
        assert!(resolver.evaluate());
        assert!(resolver.evaluate());
        assert_eq!(resolver.host().calls.get(), calls);
    }

    #[test]
    fn test_satisfied_categories_are_not_rechecked() {
        let requirements = RequirementSet::new()
            .with_platform(VersionBounds::any().with_min(v("3.9")))
            .with_extension("gallery", VersionBounds::any());
        let mut resolver = Resolver::new(requirements, counting("4.0")).unwrap();

        assert!(!resolver.is_met());
        assert!(!resolver.state().pending().has(Category::Platform));
        assert!(resolver.state().pending().has(Category::Extensions));

        // Only the extension lookup happens on re-evaluation.
        let calls = resolver.host().calls.get();
        assert!(!resolver.evaluate());
        assert_eq!(resolver.host().calls.get(), calls + 1);
    }

    #[test]
    fn test_final_implies_version_block() {
        let requirements = RequirementSet::new()
            .with_extension("gallery", VersionBounds::any().with_max(v("1.0")));
        let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("gallery", v("1.1"));
        let mut resolver = Resolver::new(requirements, host).unwrap();

        assert!(!resolver.is_met());
        assert!(resolver.is_final());
        let reason = resolver.blocking_reason().unwrap();
        assert!(reason.unmet.is_version_mismatch());
        assert_eq!(reason.extension.as_deref(), Some("gallery"));
    }

    #[test]
    fn test_status_variants() {
        let requirements = RequirementSet::new().with_extension("gallery", VersionBounds::any());
        let mut resolver =
            Resolver::new(requirements, StaticHost::new(v("4.0"), v("1.0"))).unwrap();
        assert!(matches!(resolver.status(), Status::Waiting(_)));

        resolver
            .host_mut()
            .install(crate::InstalledExtension::new("gallery", v("0.1")));
        resolver.evaluate();
        assert_eq!(resolver.status(), Status::Met);
    }

    #[test]
    fn test_reason_display() {
        let reason = BlockingReason {
            category: Category::Platform,
            extension: None,
            requirement: VersionBounds::any().with_min(v("3.9")),
            unmet: Unmet::BelowMinimum { found: v("3.8") },
        };
        assert_eq!(reason.to_string(), "platform requires >= 3.9 (found 3.8)");

        let reason = BlockingReason {
            category: Category::Extensions,
            extension: Some("gallery".to_string()),
            requirement: VersionBounds::any().with_min(v("1.0")),
            unmet: Unmet::Missing,
        };
        assert_eq!(reason.to_string(), "extension 'gallery' (>= 1.0) is not installed");
    }

    #[test]
    fn test_invalid_requirements_rejected_at_construction() {
        let requirements = RequirementSet::new()
            .with_framework(VersionBounds::any().with_min(v("2.0")).with_max(v("1.0")));
        assert!(Resolver::new(requirements, StaticHost::new(v("4.0"), v("1.0"))).is_err());
    }
}
