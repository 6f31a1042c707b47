//! Document shapes exchanged with the outside world.
//!
//! Registry, rule table and selection documents are read in; configuration
//! documents are written out. Any of them can be TOML, JSON or YAML; the
//! format is detected from the file extension.
//!
//! # Example TOML
//!
//! ```toml
//! [[flags]]
//! id = "BIOLOGY"
//! tag = "applications"
//!
//! [[flags]]
//! id = "BIO_NChlPZD"
//! tag = "biology"
//!
//! [[groups]]
//! name = "biology-model"
//! category = "biology"
//! members = ["PISCES", "BIO_NChlPZD"]
//!
//! [[rules]]
//! id = "biology-model"
//! when = "BIOLOGY"
//! then = ["BIO_NChlPZD"]
//! strength = "default"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{Error, Result};
use crate::expr::Expr;
use crate::flag::{Flag, FlagId};
use crate::rule::{Assignment, Strength};
use crate::selection::Selection;

/// Declared flags and exclusivity groups.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryDocument {
    #[serde(default)]
    pub flags: Vec<Flag>,
    #[serde(default)]
    pub groups: Vec<GroupDocument>,
}

/// One `[[groups]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupDocument {
    pub name: String,
    /// Defaults to [`crate::registry::DEFAULT_CATEGORY`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub members: Vec<FlagId>,
}

/// Ordered rule records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleTableDocument {
    #[serde(default)]
    pub rules: Vec<RuleDocument>,
}

/// One `[[rules]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    /// Defaults to `rule-<n>` by position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub when: Expr,
    pub then: Vec<Assignment>,
    #[serde(default)]
    pub strength: Strength,
}

/// A named selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub selection: Selection,
}

/// Supported document encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Map a file extension (without the dot) to a format.
    pub fn from_extension(extension: &str) -> Result<Self> {
        match extension.to_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    /// Detect the format of a path from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Self::from_extension(extension)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Parse a document from text.
pub fn parse<T: DeserializeOwned>(content: &str, format: DocumentFormat) -> Result<T> {
    let parse_error = |message: String| Error::DocumentParse {
        format: format.name().into(),
        message,
    };
    match format {
        DocumentFormat::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
        DocumentFormat::Json => {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
        DocumentFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
    }
}

/// Render a document to text.
pub fn render<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String> {
    let serialize_error = |message: String| Error::DocumentSerialize {
        format: format.name().into(),
        message,
    };
    match format {
        DocumentFormat::Toml => {
            toml::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
        }
        DocumentFormat::Json => {
            serde_json::to_string_pretty(value).map_err(|e| serialize_error(e.to_string()))
        }
        DocumentFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| serialize_error(e.to_string()))
        }
    }
}
