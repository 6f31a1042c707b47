//! Whole-system properties checked against the built-in catalog and the
//! shared fixtures.

use std::sync::Arc;
use std::thread;

use cppkeys_catalog::{CATALOG_SOURCE, builtin_catalog, profile, profiles};
use cppkeys_core::{Diagnostic, FlagId, Provenance, ResolveError, RuleId, Selection};
use cppkeys_test_utils::fixtures::{CONFLICTING_CATALOG, CYCLIC_CATALOG, catalog};
use pretty_assertions::assert_eq;

fn id(s: &str) -> FlagId {
    FlagId::new(s).unwrap()
}

#[test]
fn test_profiles_resolve_deterministically() {
    let catalog = builtin_catalog().unwrap();
    for profile in profiles().unwrap() {
        let first = catalog.resolve(&profile.selection).unwrap();
        for _ in 0..5 {
            let again = catalog.resolve(&profile.selection).unwrap();
            assert_eq!(again, first, "{}", profile.name);
            assert_eq!(again.fingerprint(), first.fingerprint());
        }
        // A freshly built catalog gives the same answer
        let rebuilt = builtin_catalog().unwrap().resolve(&profile.selection).unwrap();
        assert_eq!(rebuilt.fingerprint(), first.fingerprint());
    }
}

#[test]
fn test_profiles_are_total() {
    let catalog = builtin_catalog().unwrap();
    for profile in profiles().unwrap() {
        let config = catalog.resolve(&profile.selection).unwrap();
        assert_eq!(config.len(), catalog.registry().len(), "{}", profile.name);
        for flag in catalog.registry().flags() {
            assert!(config.get(flag.id.as_str()).is_some(), "{}", flag.id);
        }
    }
}

#[test]
fn test_explicit_subset_reproduces_profiles() {
    let catalog = builtin_catalog().unwrap();
    for profile in profiles().unwrap() {
        let config = catalog.resolve(&profile.selection).unwrap();
        let again = catalog.resolve(&config.explicit_selection()).unwrap();
        assert_eq!(again, config, "{}", profile.name);
    }
}

#[test]
fn test_changing_one_default_changes_one_flag() {
    let before = builtin_catalog().unwrap();
    let patched_source = CATALOG_SOURCE.replace(
        r#"{ id = "WET_DRY", tag = "grid" }"#,
        r#"{ id = "WET_DRY", tag = "grid", default = true }"#,
    );
    assert_ne!(patched_source, CATALOG_SOURCE);
    let after = catalog(&patched_source);

    let selection = Selection::new();
    let changes: Vec<String> = before
        .resolve(&selection)
        .unwrap()
        .diff(&after.resolve(&selection).unwrap())
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(changes, vec!["WET_DRY: off -> on"]);
}

#[test]
fn test_concurrent_profile_resolution() {
    let catalog = Arc::new(builtin_catalog().unwrap());
    let names = ["biology-physics", "hires-biology"];
    let expected: Vec<String> = names
        .iter()
        .map(|n| {
            catalog
                .resolve(&profile(n).unwrap().selection)
                .unwrap()
                .fingerprint()
        })
        .collect();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let catalog = Arc::clone(&catalog);
            let name = names[i % names.len()];
            thread::spawn(move || {
                let selection = profile(name).unwrap().selection;
                catalog.resolve(&selection).unwrap().fingerprint()
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), expected[i % names.len()]);
    }
}

#[test]
fn test_cycle_is_reported_not_looped() {
    let catalog = catalog(CYCLIC_CATALOG);
    let selection = Selection::new().with(id("C"), true);

    let Err(ResolveError::Failed(report)) = catalog.resolve(&selection) else {
        panic!("cyclic catalog must not resolve");
    };
    assert_eq!(
        report.diagnostics,
        vec![Diagnostic::CyclicDependency {
            flags: vec![id("A"), id("B")],
            rules: vec![RuleId::new("a-implies-b"), RuleId::new("b-implies-a")],
        }]
    );
}

#[test]
fn test_conflict_does_not_suppress_other_flags() {
    let catalog = catalog(CONFLICTING_CATALOG);
    let selection = Selection::from_pairs([("GLS_MIXING", true), ("LMD_DDMIX", true)]).unwrap();

    let Err(ResolveError::Failed(report)) = catalog.resolve(&selection) else {
        panic!("opposite hard rules must conflict");
    };
    assert_eq!(report.len(), 1);
    let conflicts = report.conflicts_for("LMD_MIXING");
    let Diagnostic::ConflictingAssignment {
        existing, incoming, ..
    } = conflicts[0]
    else {
        panic!("expected a conflict");
    };
    assert_eq!(existing.source.to_string(), "rule 'gls-excludes-lmd'");
    assert_eq!(incoming.source.to_string(), "rule 'lmd-extensions'");

    // Either rule alone is fine
    let config = catalog
        .resolve(&Selection::new().with(id("LMD_DDMIX"), true))
        .unwrap();
    assert!(config.is_on("LMD_SKPP"));
    assert_eq!(
        config.get("LMD_SKPP").unwrap().provenance,
        Provenance::Forced {
            rule: RuleId::new("lmd-options")
        }
    );
}
