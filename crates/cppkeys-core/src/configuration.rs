//! Resolved configurations
//!
//! A [`Configuration`] is the total, immutable result of a successful resolve:
//! every registry flag mapped to exactly one value plus the reason it holds
//! that value.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::flag::FlagId;
use crate::rule::RuleId;
use crate::selection::Selection;

/// Prefix for configuration fingerprints
const FINGERPRINT_PREFIX: &str = "sha256:";

/// Why a flag holds its final value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Provenance {
    /// Set in the selection
    Explicit,
    /// Assigned by a rule
    Forced { rule: RuleId },
    /// Registry default
    Default,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Explicit => f.write_str("explicit"),
            Provenance::Forced { rule } => write!(f, "forced by {rule}"),
            Provenance::Default => f.write_str("default"),
        }
    }
}

/// Final value of one flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedFlag {
    pub value: bool,
    #[serde(flatten)]
    pub provenance: Provenance,
}

/// Complete flag assignment produced by a successful resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    flags: BTreeMap<FlagId, ResolvedFlag>,
}

impl Configuration {
    pub(crate) fn new(flags: BTreeMap<FlagId, ResolvedFlag>) -> Self {
        Self { flags }
    }

    /// Resolved entry for a flag.
    pub fn get(&self, flag: &str) -> Option<&ResolvedFlag> {
        self.flags.get(flag)
    }

    /// Final value for a flag; `None` if the flag is unknown.
    pub fn value(&self, flag: &str) -> Option<bool> {
        self.flags.get(flag).map(|f| f.value)
    }

    /// Whether a flag resolved on. Unknown flags are off.
    pub fn is_on(&self, flag: &str) -> bool {
        self.value(flag).unwrap_or(false)
    }

    /// Flags that resolved on, sorted.
    pub fn enabled(&self) -> Vec<&FlagId> {
        self.flags
            .iter()
            .filter(|(_, f)| f.value)
            .map(|(id, _)| id)
            .collect()
    }

    /// The explicit-provenance subset, as a selection that resolves back to
    /// this configuration.
    pub fn explicit_selection(&self) -> Selection {
        let mut selection = Selection::new();
        for (id, flag) in &self.flags {
            if flag.provenance == Provenance::Explicit {
                selection.set(id.clone(), flag.value);
            }
        }
        selection
    }

    /// Iterate in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&FlagId, &ResolvedFlag)> {
        self.flags.iter()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// SHA-256 over the canonical text form, as `sha256:<hex>`.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for (id, flag) in &self.flags {
            let line = format!("{}\t{}\t{}\n", id, u8::from(flag.value), flag.provenance);
            hasher.update(line.as_bytes());
        }
        format!("{}{:x}", FINGERPRINT_PREFIX, hasher.finalize())
    }

    /// Flags whose value differs between `self` and `other`.
    pub fn diff(&self, other: &Configuration) -> Vec<FlagChange> {
        let mut changes = Vec::new();
        for (id, flag) in &self.flags {
            let after = other.value(id.as_str());
            if after != Some(flag.value) {
                changes.push(FlagChange {
                    flag: id.clone(),
                    before: Some(flag.value),
                    after,
                });
            }
        }
        for (id, flag) in &other.flags {
            if !self.flags.contains_key(id) {
                changes.push(FlagChange {
                    flag: id.clone(),
                    before: None,
                    after: Some(flag.value),
                });
            }
        }
        changes.sort_by(|a, b| a.flag.cmp(&b.flag));
        changes
    }
}

/// A value change between two configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagChange {
    pub flag: FlagId,
    pub before: Option<bool>,
    pub after: Option<bool>,
}

impl fmt::Display for FlagChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<bool>| match v {
            Some(true) => "on",
            Some(false) => "off",
            None => "absent",
        };
        write!(f, "{}: {} -> {}", self.flag, show(self.before), show(self.after))
    }
}
