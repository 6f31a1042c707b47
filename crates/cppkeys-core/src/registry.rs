//! Flag registry: the catalogue of every known toggle and its exclusivity groups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flag::{Flag, FlagId};

/// Category used for groups declared without one.
pub const DEFAULT_CATEGORY: &str = "default";

/// A named set of flags of which at most one may be on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusivityGroup {
    /// Unique group name (e.g. "biology-model")
    pub name: String,
    /// Independent choices live in different categories, e.g. horizontal and
    /// vertical tracer advection.
    pub category: String,
    /// Member flags in declaration order
    pub members: Vec<FlagId>,
}

/// Registry of known flags.
///
/// Flags keep their declaration order, which is also the order used when a
/// configuration is rendered.
#[derive(Debug, Clone, Default)]
pub struct FlagRegistry {
    flags: Vec<Flag>,
    index: HashMap<FlagId, usize>,
    groups: Vec<ExclusivityGroup>,
}

impl FlagRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a flag.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateFlag` if the identifier is already declared.
    pub fn declare(&mut self, flag: Flag) -> Result<()> {
        if self.index.contains_key(&flag.id) {
            return Err(Error::DuplicateFlag {
                id: flag.id.to_string(),
            });
        }
        self.index.insert(flag.id.clone(), self.flags.len());
        self.flags.push(flag);
        Ok(())
    }

    /// Declare a mutual-exclusivity group.
    ///
    /// Every member must already be declared, and a flag can belong to at most
    /// one group per category.
    pub fn group(
        &mut self,
        name: impl Into<String>,
        category: impl Into<String>,
        members: Vec<FlagId>,
    ) -> Result<()> {
        let name = name.into();
        let category = category.into();

        if self.groups.iter().any(|g| g.name == name) {
            return Err(Error::DuplicateGroup { name });
        }

        for member in &members {
            if !self.contains(member.as_str()) {
                return Err(Error::unknown_flag(
                    member.as_str(),
                    format!("exclusivity group '{name}'"),
                ));
            }
            if let Some(existing) = self
                .groups
                .iter()
                .find(|g| g.category == category && g.members.contains(member))
            {
                return Err(Error::OverlappingGroup {
                    flag: member.to_string(),
                    category,
                    existing: existing.name.clone(),
                    group: name,
                });
            }
        }

        let mut deduped: Vec<FlagId> = Vec::with_capacity(members.len());
        for member in members {
            if !deduped.contains(&member) {
                deduped.push(member);
            }
        }

        self.groups.push(ExclusivityGroup {
            name,
            category,
            members: deduped,
        });
        Ok(())
    }

    /// Look up a flag by identifier.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFlag` if the flag is not declared.
    pub fn lookup(&self, id: &str) -> Result<&Flag> {
        self.get(id)
            .ok_or_else(|| Error::unknown_flag(id, "registry lookup"))
    }

    /// Look up a flag, returning `None` when it is not declared.
    pub fn get(&self, id: &str) -> Option<&Flag> {
        self.index.get(id).map(|&i| &self.flags[i])
    }

    /// Declaration position of a flag.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Check if a flag is declared.
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All flags in declaration order.
    pub fn flags(&self) -> &[Flag] {
        &self.flags
    }

    /// All exclusivity groups in declaration order.
    pub fn groups(&self) -> &[ExclusivityGroup] {
        &self.groups
    }

    /// Groups containing the given flag.
    pub fn groups_of(&self, id: &str) -> Vec<&ExclusivityGroup> {
        self.groups
            .iter()
            .filter(|g| g.members.iter().any(|m| m.as_str() == id))
            .collect()
    }

    /// Flags carrying the given section tag.
    pub fn flags_with_tag(&self, tag: &str) -> Vec<&Flag> {
        self.flags
            .iter()
            .filter(|f| f.tag.as_deref() == Some(tag))
            .collect()
    }

    /// Distinct tags in first-seen order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for tag in self.flags.iter().filter_map(|f| f.tag.as_deref()) {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Number of declared flags.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> FlagId {
        FlagId::new(s).unwrap()
    }

    fn registry_with(names: &[&str]) -> FlagRegistry {
        let mut registry = FlagRegistry::new();
        for name in names {
            registry.declare(Flag::new(id(name), false)).unwrap();
        }
        registry
    }

    #[test]
    fn test_new_registry_is_empty() {
        let registry = FlagRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut registry = FlagRegistry::new();
        registry
            .declare(Flag::new(id("MPI"), true).with_tag("parallelization"))
            .unwrap();

        let flag = registry.lookup("MPI").unwrap();
        assert!(flag.default);
        assert_eq!(flag.tag.as_deref(), Some("parallelization"));
    }

    #[test]
    fn test_lookup_unknown_flag() {
        let registry = registry_with(&["MPI"]);
        let err = registry.lookup("OPENMP").unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { ref id, .. } if id == "OPENMP"));
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let mut registry = registry_with(&["BIOLOGY"]);
        let err = registry.declare(Flag::new(id("BIOLOGY"), true)).unwrap_err();
        assert_eq!(
            err,
            Error::DuplicateFlag {
                id: "BIOLOGY".to_string()
            }
        );
        // The original declaration is untouched
        assert!(!registry.lookup("BIOLOGY").unwrap().default);
    }

    #[test]
    fn test_flags_keep_declaration_order() {
        let registry = registry_with(&["ZETA", "ALPHA", "MID"]);
        let ids: Vec<&str> = registry.flags().iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["ZETA", "ALPHA", "MID"]);
        assert_eq!(registry.position("ALPHA"), Some(1));
    }

    #[test]
    fn test_group_with_unknown_member() {
        let mut registry = registry_with(&["PISCES"]);
        let err = registry
            .group("biology-model", "biology", vec![id("PISCES"), id("BIO_NChlPZD")])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { ref id, .. } if id == "BIO_NChlPZD"));
    }

    #[test]
    fn test_duplicate_group_rejected() {
        let mut registry = registry_with(&["A", "B"]);
        registry.group("g", "c", vec![id("A")]).unwrap();
        let err = registry.group("g", "other", vec![id("B")]).unwrap_err();
        assert!(matches!(err, Error::DuplicateGroup { .. }));
    }

    #[test]
    fn test_overlapping_group_in_same_category_rejected() {
        let mut registry = registry_with(&["TS_HADV_WENO5", "TS_HADV_UP3", "TS_VADV_WENO5"]);
        registry
            .group(
                "ts-hadv",
                "advection",
                vec![id("TS_HADV_WENO5"), id("TS_HADV_UP3")],
            )
            .unwrap();
        let err = registry
            .group(
                "ts-mixed",
                "advection",
                vec![id("TS_HADV_WENO5"), id("TS_VADV_WENO5")],
            )
            .unwrap_err();
        assert!(matches!(err, Error::OverlappingGroup { ref existing, .. } if existing == "ts-hadv"));
    }

    #[test]
    fn test_same_flag_in_independent_categories() {
        let mut registry = registry_with(&["NBQ", "W_HADV_TVD", "W_VADV_TVD"]);
        registry
            .group("w-hadv", "horizontal", vec![id("W_HADV_TVD"), id("NBQ")])
            .unwrap();
        registry
            .group("w-vadv", "vertical", vec![id("W_VADV_TVD"), id("NBQ")])
            .unwrap();
        assert_eq!(registry.groups_of("NBQ").len(), 2);
    }

    #[test]
    fn test_tags_first_seen_order() {
        let mut registry = FlagRegistry::new();
        registry
            .declare(Flag::new(id("MPI"), false).with_tag("parallel"))
            .unwrap();
        registry
            .declare(Flag::new(id("BIOLOGY"), false).with_tag("applications"))
            .unwrap();
        registry
            .declare(Flag::new(id("OPENMP"), false).with_tag("parallel"))
            .unwrap();
        assert_eq!(registry.tags(), vec!["parallel", "applications"]);
        assert_eq!(registry.flags_with_tag("parallel").len(), 2);
    }
}
