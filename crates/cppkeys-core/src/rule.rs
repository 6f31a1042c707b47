//! Implication rules and the rule table
//!
//! A rule reads "when the antecedent holds, assign these flags". Rules are pure
//! data: evaluating one never has side effects beyond the working assignment
//! the resolver hands it.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::flag::FlagId;
use crate::registry::FlagRegistry;

/// Identifier of a rule, used in provenance and diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id given to the rule at 1-based position `n` when a document omits one.
    pub fn positional(n: usize) -> Self {
        Self(format!("rule-{n}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One consequent entry: `NAME` turns a flag on, `!NAME` turns it off.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Assignment {
    pub flag: FlagId,
    pub value: bool,
}

impl Assignment {
    pub fn on(flag: FlagId) -> Self {
        Self { flag, value: true }
    }

    pub fn off(flag: FlagId) -> Self {
        Self { flag, value: false }
    }

    /// Parse `NAME` or `!NAME`.
    pub fn parse(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let (value, name) = match trimmed.strip_prefix('!') {
            Some(rest) => (false, rest.trim_start()),
            None => (true, trimmed),
        };
        let flag = FlagId::new(name).map_err(|_| Error::InvalidAssignment {
            text: text.to_string(),
        })?;
        Ok(Self { flag, value })
    }
}

impl TryFrom<String> for Assignment {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Assignment> for String {
    fn from(a: Assignment) -> Self {
        a.to_string()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value {
            write!(f, "{}", self.flag)
        } else {
            write!(f, "!{}", self.flag)
        }
    }
}

/// How firmly a rule assigns its consequent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Hard: disagreeing with an explicit or hard-forced value is a conflict.
    #[default]
    Force,
    /// Soft ("unless already set"): only fills flags nobody decided yet.
    Default,
}

/// A single implication rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    /// Antecedent
    pub when: Expr,
    /// Consequent, applied in order
    pub then: Vec<Assignment>,
    #[serde(default)]
    pub strength: Strength,
}

impl Rule {
    /// Create a hard rule.
    pub fn new(id: impl Into<String>, when: Expr, then: Vec<Assignment>) -> Self {
        Self {
            id: RuleId::new(id),
            when,
            then,
            strength: Strength::Force,
        }
    }

    /// Create a soft rule that only fills unset flags.
    pub fn default_rule(id: impl Into<String>, when: Expr, then: Vec<Assignment>) -> Self {
        Self {
            strength: Strength::Default,
            ..Self::new(id, when, then)
        }
    }

    /// Flags written by the consequent.
    pub fn writes(&self) -> impl Iterator<Item = &FlagId> {
        self.then.iter().map(|a| &a.flag)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let then: Vec<String> = self.then.iter().map(|a| a.to_string()).collect();
        let arrow = match self.strength {
            Strength::Force => "=>",
            Strength::Default => "=>?",
        };
        write!(f, "[{}] {} {} {}", self.id, self.when, arrow, then.join(", "))
    }
}

/// Ordered collection of rules.
#[derive(Debug, Clone, Default)]
pub struct RuleTable {
    rules: Vec<Rule>,
}

impl RuleTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRule` if a rule with the same id exists.
    pub fn add_rule(&mut self, rule: Rule) -> Result<&Rule> {
        if self.get(rule.id.as_str()).is_some() {
            return Err(Error::DuplicateRule {
                id: rule.id.to_string(),
            });
        }
        self.rules.push(rule);
        Ok(&self.rules[self.rules.len() - 1])
    }

    /// Check every referenced identifier against the registry.
    pub fn validate(&self, registry: &FlagRegistry) -> Result<()> {
        for rule in &self.rules {
            let mut seen: HashSet<&FlagId> = HashSet::new();
            for id in rule.when.flags().into_iter().chain(rule.writes()) {
                if seen.insert(id) && !registry.contains(id.as_str()) {
                    return Err(Error::unknown_flag(
                        id.as_str(),
                        format!("rule '{}'", rule.id),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Get a rule by id.
    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id.as_str() == id)
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules whose consequent writes the given flag.
    pub fn writers_of(&self, flag: &str) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.writes().any(|w| w.as_str() == flag))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
