//! Built-in CROCO toggle catalog
//!
//! The catalog re-expresses the toggle blocks of CROCO `cppdefs.h` headers as
//! data: declared flags with their header sections as tags, exclusivity groups
//! for alternative schemes, and rules for the `#ifdef` cascades. It is embedded
//! at compile time so the resolver works without any files on disk.
//!
//! # Example
//!
//! ```
//! let catalog = cppkeys_catalog::builtin_catalog().unwrap();
//! let profile = cppkeys_catalog::profile("biology-physics").unwrap();
//!
//! let config = catalog.resolve(&profile.selection).unwrap();
//! assert!(config.is_on("BIO_HADV_WENO5"));
//! ```

pub mod error;
pub mod profile;

pub use error::{Error, Result};
pub use profile::{Profile, profile, profile_names, profiles};

use cppkeys_core::document::{self, DocumentFormat, RegistryDocument, RuleTableDocument};
use cppkeys_core::Catalog;

/// Source text of the embedded catalog.
pub const CATALOG_SOURCE: &str = include_str!("../catalog/croco.toml");

/// Build the embedded catalog.
///
/// The catalog is validated on every call; callers resolving many selections
/// should build it once and share it.
pub fn builtin_catalog() -> Result<Catalog> {
    let registry: RegistryDocument = document::parse(CATALOG_SOURCE, DocumentFormat::Toml)?;
    let rules: RuleTableDocument = document::parse(CATALOG_SOURCE, DocumentFormat::Toml)?;
    Ok(Catalog::from_documents(&registry, &rules)?)
}
