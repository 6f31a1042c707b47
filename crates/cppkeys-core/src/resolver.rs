//! The resolver: selection + catalog in, configuration or diagnostics out.
//!
//! Resolution runs in two phases. Rules are first propagated to a fixed point
//! in plan order; only then are exclusivity groups checked, because
//! intermediate states routinely have two candidates on before a forcing rule
//! turns one off.
//!
//! ```text
//! Initialized -> Propagating -> Validated -> Resolved
//!                      \             \
//!                       +-------------+--> Failed
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;
use crate::configuration::{Configuration, Provenance, ResolvedFlag};
use crate::diagnostic::{Claim, Diagnostic, Report, Source};
use crate::error::Error;
use crate::flag::FlagId;
use crate::rule::{Assignment, Strength};
use crate::selection::Selection;

/// Default multiplier for the pass cap.
pub const DEFAULT_PASS_FACTOR: usize = 4;

/// Tuning for a resolve call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Propagation may run at most `max(flags, 1) * max(pass_factor, 1)`
    /// changing passes before it is declared cyclic.
    pub pass_factor: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            pass_factor: DEFAULT_PASS_FACTOR,
        }
    }
}

/// Lifecycle of one resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Initialized,
    Propagating,
    Validated,
    Resolved,
    Failed,
}

/// Errors returned by [`Resolver::resolve`].
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The selection itself is unusable (e.g. names an unknown flag)
    #[error(transparent)]
    Load(#[from] Error),

    /// Resolution ran and found problems; no configuration is produced
    #[error("resolution failed with {count} diagnostic(s):\n{report}", count = .0.len(), report = .0)]
    Failed(Report),
}

impl ResolveError {
    /// The diagnostic report, if resolution ran.
    pub fn report(&self) -> Option<&Report> {
        match self {
            ResolveError::Failed(report) => Some(report),
            ResolveError::Load(_) => None,
        }
    }
}

/// Who set a flag in the working assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Explicit,
    Rule { index: usize, strength: Strength },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Entry {
    value: bool,
    origin: Origin,
}

/// Resolves selections against one catalog.
///
/// A resolver borrows its catalog read-only; each call owns its own working
/// assignment, so resolvers over the same catalog can run on separate threads.
#[derive(Debug)]
pub struct Resolver<'c> {
    catalog: &'c Catalog,
    options: ResolveOptions,
    state: ResolverState,
}

impl<'c> Resolver<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self::with_options(catalog, ResolveOptions::default())
    }

    pub fn with_options(catalog: &'c Catalog, options: ResolveOptions) -> Self {
        Self {
            catalog,
            options,
            state: ResolverState::Initialized,
        }
    }

    /// State reached by the last call to [`Resolver::resolve`].
    pub fn state(&self) -> ResolverState {
        self.state
    }

    fn transition(&mut self, next: ResolverState) {
        tracing::debug!(from = ?self.state, to = ?next, "Resolver state change");
        self.state = next;
    }

    /// Resolve a selection into a complete configuration.
    ///
    /// # Errors
    ///
    /// - `ResolveError::Load` if the selection names an undeclared flag; no
    ///   resolution is attempted.
    /// - `ResolveError::Failed` with every conflict, cycle and exclusivity
    ///   violation found in this call.
    pub fn resolve(&mut self, selection: &Selection) -> Result<Configuration, ResolveError> {
        self.state = ResolverState::Initialized;
        let registry = self.catalog.registry();
        selection.validate(registry)?;

        let mut run = Propagation::seed(self.catalog, selection);
        let mut diagnostics: Vec<Diagnostic> = self
            .catalog
            .plan()
            .cycles()
            .iter()
            .map(|cycle| Diagnostic::CyclicDependency {
                flags: cycle.flags.clone(),
                rules: cycle.rules.clone(),
            })
            .collect();

        self.transition(ResolverState::Propagating);
        let cap = registry
            .len()
            .max(1)
            .saturating_mul(self.options.pass_factor.max(1));
        if let Some(oscillating) = run.run_to_fixed_point(cap) {
            tracing::warn!(
                cap,
                flags = oscillating.len(),
                "Propagation did not reach a fixed point"
            );
            diagnostics.push(Diagnostic::CyclicDependency {
                flags: oscillating,
                rules: Vec::new(),
            });
        }
        diagnostics.extend(run.conflicts.iter().cloned());

        let configuration = run.finish();
        diagnostics.extend(self.check_exclusivity(&configuration));
        self.transition(ResolverState::Validated);

        if diagnostics.is_empty() {
            self.transition(ResolverState::Resolved);
            Ok(configuration)
        } else {
            self.transition(ResolverState::Failed);
            Err(ResolveError::Failed(Report::new(diagnostics)))
        }
    }

    fn check_exclusivity(&self, configuration: &Configuration) -> Vec<Diagnostic> {
        self.catalog
            .registry()
            .groups()
            .iter()
            .filter_map(|group| {
                let on: Vec<FlagId> = group
                    .members
                    .iter()
                    .filter(|m| configuration.is_on(m.as_str()))
                    .cloned()
                    .collect();
                (on.len() > 1).then(|| Diagnostic::MutualExclusivityViolation {
                    group: group.name.clone(),
                    members: on,
                })
            })
            .collect()
    }
}

impl Catalog {
    /// Resolve with default options.
    pub fn resolve(&self, selection: &Selection) -> Result<Configuration, ResolveError> {
        Resolver::new(self).resolve(selection)
    }
}

/// Working assignment of one resolve call, indexed by registry position.
struct Propagation<'c> {
    catalog: &'c Catalog,
    working: Vec<Option<Entry>>,
    conflicts: BTreeSet<Diagnostic>,
}

impl<'c> Propagation<'c> {
    fn seed(catalog: &'c Catalog, selection: &Selection) -> Self {
        let registry = catalog.registry();
        let mut working = vec![None; registry.len()];
        for (flag, value) in selection.iter() {
            if let Some(pos) = registry.position(flag.as_str()) {
                working[pos] = Some(Entry {
                    value,
                    origin: Origin::Explicit,
                });
            }
        }
        Self {
            catalog,
            working,
            conflicts: BTreeSet::new(),
        }
    }

    /// Run full passes until nothing changes.
    ///
    /// Returns the flags changed by the last pass if `cap` changing passes
    /// went by without reaching a fixed point.
    fn run_to_fixed_point(&mut self, cap: usize) -> Option<Vec<FlagId>> {
        let mut passes = 0usize;
        loop {
            let changed = self.pass();
            passes += 1;
            if changed.is_empty() {
                tracing::debug!(passes, "Propagation reached a fixed point");
                return None;
            }
            if passes > cap {
                let registry = self.catalog.registry();
                return Some(
                    changed
                        .into_iter()
                        .map(|pos| registry.flags()[pos].id.clone())
                        .collect(),
                );
            }
        }
    }

    /// One scan of the rule table in plan order; returns changed positions.
    fn pass(&mut self) -> BTreeSet<usize> {
        let catalog = self.catalog;
        let rules = catalog.rules().rules();
        let plan = catalog.plan();
        let mut changed = BTreeSet::new();

        for (position, &index) in plan.order().iter().enumerate() {
            let rule = &rules[index];
            let fires = rule
                .when
                .evaluate(&|flag: &FlagId| self.read(flag, position))
                == Some(true);
            if !fires {
                continue;
            }
            tracing::trace!(rule = %rule.id, "Rule fired");
            for assignment in &rule.then {
                if self.apply(assignment, index, rule.strength) {
                    if let Some(pos) = catalog.registry().position(assignment.flag.as_str()) {
                        changed.insert(pos);
                    }
                }
            }
        }
        changed
    }

    /// Value of a flag as seen by the rule at `position` in the plan.
    ///
    /// Unresolved flags read as their default once no later rule can write
    /// them; otherwise they are unresolvable.
    fn read(&self, flag: &FlagId, position: usize) -> Option<bool> {
        let registry = self.catalog.registry();
        let pos = registry.position(flag.as_str())?;
        match self.working[pos] {
            Some(entry) => Some(entry.value),
            None if self.catalog.plan().is_settled(flag, position) => {
                Some(registry.flags()[pos].default)
            }
            None => None,
        }
    }

    /// Apply one consequent entry; returns whether the working assignment changed.
    fn apply(&mut self, assignment: &Assignment, rule: usize, strength: Strength) -> bool {
        let Some(pos) = self.catalog.registry().position(assignment.flag.as_str()) else {
            return false;
        };
        let incoming = Entry {
            value: assignment.value,
            origin: Origin::Rule {
                index: rule,
                strength,
            },
        };

        let Some(existing) = self.working[pos] else {
            self.working[pos] = Some(incoming);
            return true;
        };

        let existing_is_soft = matches!(
            existing.origin,
            Origin::Rule {
                strength: Strength::Default,
                ..
            }
        );

        if existing.value == assignment.value {
            // A hard rule takes ownership of a value a soft rule proposed
            if existing_is_soft && strength == Strength::Force {
                self.working[pos] = Some(incoming);
                return true;
            }
            return false;
        }

        match strength {
            Strength::Default => false,
            Strength::Force if existing_is_soft => {
                self.working[pos] = Some(incoming);
                true
            }
            Strength::Force => {
                self.conflicts.insert(Diagnostic::ConflictingAssignment {
                    flag: assignment.flag.clone(),
                    existing: self.claim(existing),
                    incoming: self.claim(incoming),
                });
                false
            }
        }
    }

    fn claim(&self, entry: Entry) -> Claim {
        let source = match entry.origin {
            Origin::Explicit => Source::Explicit,
            Origin::Rule { index, .. } => {
                Source::Rule(self.catalog.rules().rules()[index].id.clone())
            }
        };
        Claim {
            value: entry.value,
            source,
        }
    }

    /// Fill defaults and freeze the result.
    fn finish(self) -> Configuration {
        let rules = self.catalog.rules().rules();
        let mut flags = BTreeMap::new();
        for (flag, entry) in self.catalog.registry().flags().iter().zip(&self.working) {
            let resolved = match entry {
                Some(Entry {
                    value,
                    origin: Origin::Explicit,
                }) => ResolvedFlag {
                    value: *value,
                    provenance: Provenance::Explicit,
                },
                Some(Entry {
                    value,
                    origin: Origin::Rule { index, .. },
                }) => ResolvedFlag {
                    value: *value,
                    provenance: Provenance::Forced {
                        rule: rules[*index].id.clone(),
                    },
                },
                None => ResolvedFlag {
                    value: flag.default,
                    provenance: Provenance::Default,
                },
            };
            flags.insert(flag.id.clone(), resolved);
        }
        Configuration::new(flags)
    }
}
