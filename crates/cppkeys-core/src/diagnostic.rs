//! Resolution-time diagnostics.
//!
//! Unlike load-time [`crate::Error`]s these are collected across a whole
//! resolve call and reported together.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::flag::FlagId;
use crate::rule::RuleId;

/// Where a flag value came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rule", rename_all = "lowercase")]
pub enum Source {
    /// The operator's selection
    Explicit,
    /// A rule's consequent
    Rule(RuleId),
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Explicit => f.write_str("selection"),
            Source::Rule(id) => write!(f, "rule '{id}'"),
        }
    }
}

/// A value together with the source asserting it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Claim {
    pub value: bool,
    pub source: Source,
}

impl fmt::Display for Claim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.value { "on" } else { "off" };
        write!(f, "{state} (from {})", self.source)
    }
}

/// A problem found while resolving a selection.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Diagnostic {
    /// Two sources disagree on a flag
    ConflictingAssignment {
        flag: FlagId,
        existing: Claim,
        incoming: Claim,
    },
    /// Rules depend on each other in a loop, or propagation never settled
    CyclicDependency {
        flags: Vec<FlagId>,
        rules: Vec<RuleId>,
    },
    /// More than one member of an exclusivity group is on
    MutualExclusivityViolation { group: String, members: Vec<FlagId> },
}

impl Diagnostic {
    /// Short machine-friendly name of the diagnostic kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::ConflictingAssignment { .. } => "ConflictingAssignment",
            Diagnostic::CyclicDependency { .. } => "CyclicDependency",
            Diagnostic::MutualExclusivityViolation { .. } => "MutualExclusivityViolation",
        }
    }
}

fn join_ids<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ConflictingAssignment {
                flag,
                existing,
                incoming,
            } => write!(
                f,
                "conflicting assignment for {flag}: {existing} vs {incoming}"
            ),
            Diagnostic::CyclicDependency { flags, rules } => {
                write!(f, "cyclic dependency among flags {}", join_ids(flags))?;
                if !rules.is_empty() {
                    write!(f, " (rules {})", join_ids(rules))?;
                }
                Ok(())
            }
            Diagnostic::MutualExclusivityViolation { group, members } => write!(
                f,
                "exclusivity group '{group}' has more than one flag on: {}",
                join_ids(members)
            ),
        }
    }
}

/// Every diagnostic produced by one failed resolve call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    /// Conflicts recorded for one flag.
    pub fn conflicts_for(&self, flag: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| {
                matches!(d, Diagnostic::ConflictingAssignment { flag: f, .. } if f.as_str() == flag)
            })
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.diagnostics.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}
