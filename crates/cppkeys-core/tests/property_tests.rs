use cppkeys_core::{
    Assignment, Catalog, Diagnostic, Expr, Flag, FlagId, FlagRegistry, ResolveError, Rule,
    RuleTable, Selection, Strength,
};
use proptest::prelude::*;

/// (antecedent flag, negate antecedent, target flag, value, soft)
type RawRule = (usize, bool, usize, bool, bool);

fn flag_id(i: usize) -> FlagId {
    FlagId::new(format!("F{i}")).unwrap()
}

/// Build a catalog from raw rule tuples.
///
/// With `acyclic` set, every rule reads a lower-numbered flag than the one it
/// writes, so the dependency graph cannot loop.
fn catalog(defaults: &[bool], raw: &[RawRule], acyclic: bool) -> Catalog {
    let n = defaults.len();
    let mut registry = FlagRegistry::new();
    for (i, default) in defaults.iter().enumerate() {
        registry.declare(Flag::new(flag_id(i), *default)).unwrap();
    }

    let mut table = RuleTable::new();
    for (k, &(a, negate, t, value, soft)) in raw.iter().enumerate() {
        let (reads, writes) = if acyclic {
            let reads = a % (n - 1);
            (reads, reads + 1 + t % (n - 1 - reads))
        } else {
            (a % n, t % n)
        };
        let mut when = Expr::flag(flag_id(reads));
        if negate {
            when = Expr::not(when);
        }
        let then = vec![Assignment {
            flag: flag_id(writes),
            value,
        }];
        let mut rule = Rule::new(format!("r{k}"), when, then);
        if soft {
            rule.strength = Strength::Default;
        }
        table.add_rule(rule).unwrap();
    }
    Catalog::new(registry, table).unwrap()
}

fn selection(picks: &[Option<bool>]) -> Selection {
    let mut selection = Selection::new();
    for (i, pick) in picks.iter().enumerate() {
        if let Some(value) = pick {
            selection.set(flag_id(i), *value);
        }
    }
    selection
}

fn outcome(catalog: &Catalog, selection: &Selection) -> String {
    match catalog.resolve(selection) {
        Ok(config) => format!("{config:?}"),
        Err(ResolveError::Failed(report)) => format!("{report:?}"),
        Err(ResolveError::Load(e)) => format!("load: {e}"),
    }
}

fn raw_rules() -> impl Strategy<Value = Vec<RawRule>> {
    prop::collection::vec(
        (0..8usize, any::<bool>(), 0..8usize, any::<bool>(), any::<bool>()),
        0..12,
    )
}

proptest! {
    #[test]
    fn test_resolution_is_deterministic(
        defaults in prop::collection::vec(any::<bool>(), 2..8),
        raw in raw_rules(),
        picks in prop::collection::vec(prop::option::of(any::<bool>()), 8),
    ) {
        let catalog = catalog(&defaults, &raw, false);
        let selection = selection(&picks[..defaults.len()]);
        prop_assert_eq!(outcome(&catalog, &selection), outcome(&catalog, &selection));
    }

    #[test]
    fn test_successful_configuration_is_total(
        defaults in prop::collection::vec(any::<bool>(), 2..8),
        raw in raw_rules(),
        picks in prop::collection::vec(prop::option::of(any::<bool>()), 8),
    ) {
        let catalog = catalog(&defaults, &raw, true);
        let selection = selection(&picks[..defaults.len()]);
        if let Ok(config) = catalog.resolve(&selection) {
            prop_assert_eq!(config.len(), defaults.len());
            for (i, pick) in picks[..defaults.len()].iter().enumerate() {
                if let Some(value) = pick {
                    prop_assert_eq!(config.value(flag_id(i).as_str()), Some(*value));
                }
            }
        }
    }

    #[test]
    fn test_acyclic_tables_never_report_cycles(
        defaults in prop::collection::vec(any::<bool>(), 2..8),
        raw in raw_rules(),
        picks in prop::collection::vec(prop::option::of(any::<bool>()), 8),
    ) {
        let catalog = catalog(&defaults, &raw, true);
        prop_assert!(catalog.plan().cycles().is_empty());
        if let Err(ResolveError::Failed(report)) = catalog.resolve(&selection(&picks[..defaults.len()])) {
            prop_assert!(
                report
                    .iter()
                    .all(|d| !matches!(d, Diagnostic::CyclicDependency { .. })),
                "acyclic table reported a cycle"
            );
        }
    }

    #[test]
    fn test_pinning_every_flag_reproduces_configuration(
        defaults in prop::collection::vec(any::<bool>(), 2..8),
        raw in raw_rules(),
        picks in prop::collection::vec(prop::option::of(any::<bool>()), 8),
    ) {
        let catalog = catalog(&defaults, &raw, true);
        if let Ok(config) = catalog.resolve(&selection(&picks[..defaults.len()])) {
            let mut pinned = Selection::new();
            for (id, flag) in config.iter() {
                pinned.set(id.clone(), flag.value);
            }
            let again = catalog.resolve(&pinned);
            prop_assert!(again.is_ok());
            let again = again.unwrap();
            for (id, flag) in config.iter() {
                prop_assert_eq!(again.value(id.as_str()), Some(flag.value));
            }
        }
    }
}
