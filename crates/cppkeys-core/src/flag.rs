//! Flag identifiers and declarations

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Preprocessor identifier grammar shared by every flag name.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Words the condition grammar claims for itself.
const RESERVED: [&str; 3] = ["true", "false", "defined"];

/// A validated flag identifier (e.g. `BIOLOGY`, `TS_HADV_WENO5`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FlagId(String);

impl FlagId {
    /// Validate and wrap an identifier.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if Self::is_valid(&id) {
            Ok(Self(id))
        } else {
            Err(Error::InvalidIdentifier { id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `text` is a valid identifier.
    pub fn is_valid(text: &str) -> bool {
        IDENTIFIER_PATTERN.is_match(text) && !RESERVED.contains(&text)
    }
}

impl TryFrom<String> for FlagId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FlagId {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::new(value)
    }
}

impl From<FlagId> for String {
    fn from(id: FlagId) -> Self {
        id.0
    }
}

impl AsRef<str> for FlagId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for FlagId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FlagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A toggle known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    /// Unique identifier
    pub id: FlagId,
    /// State used when neither the selection nor any rule decides the flag.
    /// Absent means off (`#undef`).
    #[serde(default)]
    pub default: bool,
    /// Section label used for grouping output (e.g. "parallelization")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Flag {
    /// Create a flag with the given default and no tag.
    pub fn new(id: FlagId, default: bool) -> Self {
        Self {
            id,
            default,
            tag: None,
            description: None,
        }
    }

    /// Attach a section tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
