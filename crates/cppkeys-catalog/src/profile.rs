//! Named selections reproducing known build configurations.

use cppkeys_core::document::{self, DocumentFormat, SelectionDocument};
use cppkeys_core::Selection;

use crate::error::{Error, Result};

/// Embedded profile sources, in listing order
const PROFILE_SOURCES: &[(&str, &str)] = &[
    (
        "biology-physics",
        include_str!("../catalog/profiles/biology-physics.toml"),
    ),
    (
        "hires-biology",
        include_str!("../catalog/profiles/hires-biology.toml"),
    ),
];

/// A named selection.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub name: String,
    pub description: Option<String>,
    pub selection: Selection,
}

impl Profile {
    fn from_document(key: &str, doc: SelectionDocument) -> Self {
        Self {
            name: doc.name.unwrap_or_else(|| key.to_string()),
            description: doc.description,
            selection: doc.selection,
        }
    }
}

/// Names of the built-in profiles.
pub fn profile_names() -> Vec<&'static str> {
    PROFILE_SOURCES.iter().map(|(name, _)| *name).collect()
}

/// All built-in profiles.
pub fn profiles() -> Result<Vec<Profile>> {
    PROFILE_SOURCES
        .iter()
        .map(|(key, source)| {
            let doc: SelectionDocument = document::parse(source, DocumentFormat::Toml)?;
            Ok(Profile::from_document(key, doc))
        })
        .collect()
}

/// Look up one built-in profile by name.
///
/// # Errors
///
/// Returns `Error::UnknownProfile` listing the available names.
pub fn profile(name: &str) -> Result<Profile> {
    let Some((key, source)) = PROFILE_SOURCES.iter().find(|(key, _)| *key == name) else {
        return Err(Error::UnknownProfile {
            name: name.to_string(),
            available: profile_names().iter().map(|n| n.to_string()).collect(),
        });
    };
    tracing::debug!(profile = name, "Loading built-in profile");
    let doc: SelectionDocument = document::parse(source, DocumentFormat::Toml)?;
    Ok(Profile::from_document(key, doc))
}
