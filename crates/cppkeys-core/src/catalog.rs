//! Validated registry + rule table bundle.

use crate::document::{RegistryDocument, RuleTableDocument};
use crate::error::Result;
use crate::plan::EvaluationPlan;
use crate::registry::{DEFAULT_CATEGORY, FlagRegistry};
use crate::rule::{Rule, RuleId, RuleTable};

/// Immutable, load-time validated input to the resolver.
///
/// Holds no interior mutability, so one catalog can be shared (e.g. behind an
/// `Arc`) by any number of concurrent resolutions.
#[derive(Debug, Clone)]
pub struct Catalog {
    registry: FlagRegistry,
    rules: RuleTable,
    plan: EvaluationPlan,
}

impl Catalog {
    /// Validate a registry and rule table and compute the evaluation plan.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFlag` if a rule references an undeclared flag.
    pub fn new(registry: FlagRegistry, rules: RuleTable) -> Result<Self> {
        rules.validate(&registry)?;
        let plan = EvaluationPlan::build(&rules);
        tracing::debug!(
            flags = registry.len(),
            groups = registry.groups().len(),
            rules = rules.len(),
            cycles = plan.cycles().len(),
            "Catalog loaded"
        );
        Ok(Self {
            registry,
            rules,
            plan,
        })
    }

    /// Build a catalog from parsed documents.
    ///
    /// Load-time errors abort at the first problem found.
    pub fn from_documents(
        registry_doc: &RegistryDocument,
        rules_doc: &RuleTableDocument,
    ) -> Result<Self> {
        let mut registry = FlagRegistry::new();
        for flag in &registry_doc.flags {
            registry.declare(flag.clone())?;
        }
        for group in &registry_doc.groups {
            registry.group(
                group.name.clone(),
                group
                    .category
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
                group.members.clone(),
            )?;
        }

        let mut rules = RuleTable::new();
        for (i, rule) in rules_doc.rules.iter().enumerate() {
            let id = rule
                .id
                .clone()
                .map(RuleId::new)
                .unwrap_or_else(|| RuleId::positional(i + 1));
            rules.add_rule(Rule {
                id,
                when: rule.when.clone(),
                then: rule.then.clone(),
                strength: rule.strength,
            })?;
        }

        Self::new(registry, rules)
    }

    pub fn registry(&self) -> &FlagRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    pub fn plan(&self) -> &EvaluationPlan {
        &self.plan
    }
}
