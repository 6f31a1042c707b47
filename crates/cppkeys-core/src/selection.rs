//! Operator selections: the sparse set of explicitly chosen flags.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::flag::FlagId;
use crate::registry::FlagRegistry;

/// Partial assignment supplied per run. Flags not listed are left to rule
/// propagation and registry defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    values: BTreeMap<FlagId, bool>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag explicitly, replacing any earlier choice for it.
    pub fn set(&mut self, flag: FlagId, value: bool) -> &mut Self {
        self.values.insert(flag, value);
        self
    }

    /// Builder form of [`Selection::set`].
    pub fn with(mut self, flag: FlagId, value: bool) -> Self {
        self.values.insert(flag, value);
        self
    }

    /// Build from `(name, value)` pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, bool)>,
    {
        let mut selection = Self::new();
        for (name, value) in pairs {
            selection.set(FlagId::new(name)?, value);
        }
        Ok(selection)
    }

    /// Parse a command-line style entry: `NAME`, `!NAME`, `NAME=on|off|true|false|1|0`.
    pub fn parse_entry(text: &str) -> Result<(FlagId, bool)> {
        let invalid = || Error::InvalidAssignment {
            text: text.to_string(),
        };
        let text = text.trim();
        if let Some((name, value)) = text.split_once('=') {
            let value = match value.trim().to_ascii_lowercase().as_str() {
                "on" | "true" | "1" | "yes" | "define" => true,
                "off" | "false" | "0" | "no" | "undef" => false,
                _ => return Err(invalid()),
            };
            let flag = FlagId::new(name.trim()).map_err(|_| invalid())?;
            return Ok((flag, value));
        }
        match text.strip_prefix('!') {
            Some(name) => Ok((FlagId::new(name.trim()).map_err(|_| invalid())?, false)),
            None => Ok((FlagId::new(text).map_err(|_| invalid())?, true)),
        }
    }

    /// Overlay another selection; its entries win.
    pub fn merge(&mut self, other: &Selection) {
        for (flag, value) in &other.values {
            self.values.insert(flag.clone(), *value);
        }
    }

    pub fn get(&self, flag: &str) -> Option<bool> {
        self.values.get(flag).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FlagId, bool)> {
        self.values.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Check every chosen flag is declared.
    pub fn validate(&self, registry: &FlagRegistry) -> Result<()> {
        for flag in self.values.keys() {
            if !registry.contains(flag.as_str()) {
                return Err(Error::unknown_flag(flag.as_str(), "selection"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;
    use rstest::rstest;

    fn id(s: &str) -> FlagId {
        FlagId::new(s).unwrap()
    }

    #[rstest]
    #[case("BIOLOGY", true)]
    #[case("!PISCES", false)]
    #[case("MPI=on", true)]
    #[case("OPENMP=off", false)]
    #[case("TIDES = true", true)]
    #[case("SPONGE=0", false)]
    #[case("XIOS=undef", false)]
    fn test_parse_entry(#[case] text: &str, #[case] expected: bool) {
        let (_, value) = Selection::parse_entry(text).unwrap();
        assert_eq!(value, expected);
    }

    #[rstest]
    #[case("MPI=maybe")]
    #[case("=on")]
    #[case("BAD NAME")]
    fn test_parse_entry_rejects(#[case] text: &str) {
        assert!(matches!(
            Selection::parse_entry(text).unwrap_err(),
            Error::InvalidAssignment { .. }
        ));
    }

    #[test]
    fn test_merge_overrides() {
        let mut base = Selection::from_pairs([("MPI", true), ("BIOLOGY", false)]).unwrap();
        let top = Selection::from_pairs([("BIOLOGY", true)]).unwrap();
        base.merge(&top);
        assert_eq!(base.get("BIOLOGY"), Some(true));
        assert_eq!(base.get("MPI"), Some(true));
        assert_eq!(base.len(), 2);
    }

    #[test]
    fn test_validate_unknown_flag() {
        let mut registry = FlagRegistry::new();
        registry.declare(Flag::new(id("MPI"), false)).unwrap();
        let selection = Selection::new().with(id("OPENMP"), true);
        let err = selection.validate(&registry).unwrap_err();
        assert!(matches!(err, Error::UnknownFlag { ref id, .. } if id == "OPENMP"));
    }

    #[test]
    fn test_serde_is_a_plain_map() {
        let selection: Selection = toml::from_str("BIOLOGY = true\nPISCES = false\n").unwrap();
        assert_eq!(selection.get("BIOLOGY"), Some(true));
        assert_eq!(selection.get("PISCES"), Some(false));
    }
}
