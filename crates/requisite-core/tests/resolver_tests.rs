//! Tests for requirement resolution against a live host

use std::cell::RefCell;
use std::rc::Rc;

use pretty_assertions::assert_eq;
use requisite_core::{
    BlockingReason, Category, InstalledExtension, RequirementSet, Resolver, StaticHost, Status,
    Unmet, Version, VersionBounds,
};
use rstest::rstest;

fn v(s: &str) -> Version {
    Version::parse(s).unwrap()
}

fn at_least(s: &str) -> VersionBounds {
    VersionBounds::any().with_min(v(s))
}

fn at_most(s: &str) -> VersionBounds {
    VersionBounds::any().with_max(v(s))
}

/// `{Platform: {min_version: "3.9"}, Extensions: {"gallery": {min_version: "1.0"}}}`
fn gallery_requirements() -> RequirementSet {
    RequirementSet::new()
        .with_platform(at_least("3.9"))
        .with_extension("gallery", at_least("1.0"))
}

mod scenarios {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_platform_too_old_is_final() {
        let host = StaticHost::new(v("3.8"), v("1.0")).with_extension("gallery", v("1.2"));
        let mut resolver = Resolver::new(gallery_requirements(), host).unwrap();

        assert!(!resolver.is_met());
        assert!(resolver.is_final());
        assert_eq!(
            resolver.blocking_reason(),
            Some(&BlockingReason {
                category: Category::Platform,
                extension: None,
                requirement: at_least("3.9"),
                unmet: Unmet::BelowMinimum { found: v("3.8") },
            })
        );
        assert_eq!(resolver.blocking_reason().unwrap().min_version(), Some(&v("3.9")));
    }

    #[test]
    fn test_missing_extension_is_not_final() {
        let host = StaticHost::new(v("4.0"), v("1.0"));
        let mut resolver = Resolver::new(gallery_requirements(), host).unwrap();

        assert!(!resolver.is_met());
        assert!(!resolver.is_final());
        let reason = resolver.blocking_reason().unwrap();
        assert_eq!(reason.category, Category::Extensions);
        assert_eq!(reason.extension.as_deref(), Some("gallery"));
        assert_eq!(reason.unmet, Unmet::Missing);
    }

    #[test]
    fn test_all_satisfied() {
        let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("gallery", v("1.2"));
        let mut resolver = Resolver::new(gallery_requirements(), host).unwrap();

        assert!(resolver.is_met());
        assert!(resolver.blocking_reason().is_none());
        assert!(resolver.state().pending().is_empty());
        assert_eq!(resolver.status(), Status::Met);
    }
}

mod laziness_and_finality {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_requirements_met_immediately() {
        let mut resolver =
            Resolver::new(RequirementSet::new(), StaticHost::new(v("1.0"), v("1.0"))).unwrap();
        assert!(resolver.is_met());
    }

    #[test]
    fn test_empty_categories_met_immediately() {
        let requirements = RequirementSet::new()
            .with_platform(VersionBounds::any())
            .with_framework(VersionBounds::any())
            .with_extensions_category();
        let mut resolver =
            Resolver::new(requirements, StaticHost::new(v("1.0"), v("1.0"))).unwrap();

        assert!(resolver.is_met());
        assert!(resolver.state().pending().is_empty());
    }

    #[test]
    fn test_evaluate_before_is_met() {
        let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("gallery", v("1.2"));
        let mut resolver = Resolver::new(gallery_requirements(), host).unwrap();

        assert!(resolver.evaluate());
        assert!(resolver.state().ever_evaluated());
        assert!(resolver.is_met());
    }

    #[test]
    fn test_final_reason_never_changes() {
        let host = Rc::new(RefCell::new(StaticHost::new(v("3.8"), v("1.0"))));
        let mut resolver = Resolver::new(gallery_requirements(), Rc::clone(&host)).unwrap();

        assert!(!resolver.is_met());
        let reason = resolver.blocking_reason().cloned();

        // Even if the gallery extension appears, nothing is re-evaluated.
        host.borrow_mut()
            .install(InstalledExtension::new("gallery", v("1.2")));
        for _ in 0..5 {
            assert!(!resolver.evaluate());
            assert_eq!(resolver.blocking_reason().cloned(), reason);
            assert!(resolver.is_final());
        }
        assert!(matches!(resolver.status(), Status::Blocked(_)));
    }

    #[test]
    fn test_missing_extension_recovers() {
        let host = Rc::new(RefCell::new(StaticHost::new(v("4.0"), v("1.0"))));
        let mut resolver = Resolver::new(gallery_requirements(), Rc::clone(&host)).unwrap();

        assert!(!resolver.is_met());
        assert!(!resolver.is_final());
        assert!(!resolver.evaluate());

        host.borrow_mut()
            .install(InstalledExtension::new("gallery", v("1.2")));
        assert!(resolver.evaluate());
        assert!(resolver.is_met());
        assert!(resolver.blocking_reason().is_none());
    }

    #[test]
    fn test_late_extension_out_of_bounds_becomes_final() {
        let mut resolver =
            Resolver::new(gallery_requirements(), StaticHost::new(v("4.0"), v("1.0"))).unwrap();
        assert!(!resolver.is_met());

        resolver
            .host_mut()
            .install(InstalledExtension::new("gallery", v("0.9")));
        assert!(!resolver.evaluate());
        assert!(resolver.is_final());
        assert_eq!(
            resolver.blocking_reason().unwrap().unmet,
            Unmet::BelowMinimum { found: v("0.9") }
        );
    }

    #[test]
    fn test_is_met_does_not_rescan_after_first_call() {
        let mut resolver =
            Resolver::new(gallery_requirements(), StaticHost::new(v("4.0"), v("1.0"))).unwrap();
        assert!(!resolver.is_met());

        resolver
            .host_mut()
            .install(InstalledExtension::new("gallery", v("1.2")));
        // `is_met` reports state only; `evaluate` re-checks.
        assert!(!resolver.is_met());
        assert!(resolver.evaluate());
    }

    #[test]
    fn test_idempotent_evaluation() {
        let mut resolver =
            Resolver::new(gallery_requirements(), StaticHost::new(v("4.0"), v("1.0"))).unwrap();

        let first = (resolver.evaluate(), resolver.blocking_reason().cloned());
        for _ in 0..10 {
            assert_eq!((resolver.evaluate(), resolver.blocking_reason().cloned()), first);
        }
    }
}

mod precedence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_platform_reported_over_extensions() {
        // Platform too old and gallery missing at the same time.
        let mut resolver =
            Resolver::new(gallery_requirements(), StaticHost::new(v("3.0"), v("1.0"))).unwrap();

        assert!(!resolver.is_met());
        assert_eq!(resolver.blocking_reason().unwrap().category, Category::Platform);
    }

    #[test]
    fn test_framework_reported_over_extensions() {
        let requirements = RequirementSet::new()
            .with_framework(at_most("2.0"))
            .with_extension("gallery", VersionBounds::any());
        let mut resolver =
            Resolver::new(requirements, StaticHost::new(v("4.0"), v("2.5"))).unwrap();

        assert!(!resolver.is_met());
        let reason = resolver.blocking_reason().unwrap();
        assert_eq!(reason.category, Category::Framework);
        assert_eq!(reason.unmet, Unmet::AboveMaximum { found: v("2.5") });
        assert!(resolver.is_final());
    }

    #[test]
    fn test_first_unresolved_extension_only() {
        let requirements = RequirementSet::new()
            .with_extension("alpha", VersionBounds::any())
            .with_extension("beta", VersionBounds::any())
            .with_extension("gamma", at_least("5.0"));
        let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("gamma", v("1.0"));
        let mut resolver = Resolver::new(requirements, host).unwrap();

        assert!(!resolver.is_met());
        assert_eq!(resolver.blocking_reason().unwrap().extension.as_deref(), Some("alpha"));
        // gamma was never checked, so its mismatch has not made the block final.
        assert!(!resolver.is_final());
        assert_eq!(resolver.state().pending().extensions().unwrap().len(), 3);
    }

    #[test]
    fn test_satisfied_extensions_removed_individually() {
        let requirements = RequirementSet::new()
            .with_extension("alpha", VersionBounds::any())
            .with_extension("beta", VersionBounds::any());
        let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("alpha", v("1.0"));
        let mut resolver = Resolver::new(requirements, host).unwrap();

        assert!(!resolver.is_met());
        let pending: Vec<&str> = resolver
            .state()
            .pending()
            .extensions()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(pending, vec!["beta"]);
    }
}

#[rstest]
#[case("3.9", true)]
#[case("3.9.0", true)]
#[case("3.10", true)]
#[case("3.8.9", false)]
#[case("3", false)]
fn test_platform_min_boundaries(#[case] platform: &str, #[case] met: bool) {
    let requirements = RequirementSet::new().with_platform(at_least("3.9"));
    let mut resolver = Resolver::new(requirements, StaticHost::new(v(platform), v("1.0"))).unwrap();
    assert_eq!(resolver.is_met(), met);
    assert_eq!(resolver.is_final(), !met);
}

#[rstest]
#[case("1.9", true)]
#[case("2.0", true)]
#[case("2.0.0.0", true)]
#[case("2.0.1", false)]
fn test_extension_max_boundaries(#[case] installed: &str, #[case] met: bool) {
    let requirements = RequirementSet::new().with_extension("gallery", at_most("2.0"));
    let host = StaticHost::new(v("4.0"), v("1.0")).with_extension("gallery", v(installed));
    let mut resolver = Resolver::new(requirements, host).unwrap();
    assert_eq!(resolver.is_met(), met);
}

#[test]
fn test_shared_behind_mutex() {
    use std::sync::{Arc, Mutex};

    let host = Arc::new(Mutex::new(StaticHost::new(v("4.0"), v("1.0"))));
    let resolver = Arc::new(Mutex::new(
        Resolver::new(gallery_requirements(), Arc::clone(&host)).unwrap(),
    ));

    let worker = {
        let resolver = Arc::clone(&resolver);
        std::thread::spawn(move || resolver.lock().unwrap().is_met())
    };
    assert!(!worker.join().unwrap());

    host.lock()
        .unwrap()
        .install(InstalledExtension::new("gallery", v("1.0")));
    assert!(resolver.lock().unwrap().evaluate());
}
