//! Catalog and selection fixtures stored in `test-fixtures/`.
//!
//! The sources are embedded at compile time so unit tests can parse them
//! without touching the filesystem; [`fixtures_dir`] gives the on-disk copy
//! for tests that drive the binary.

use std::path::PathBuf;

use cppkeys_core::document::{self, DocumentFormat};
use cppkeys_core::{Catalog, RegistryDocument, RuleTableDocument};

/// `BIOLOGY`, `PISCES` and `BIO_NChlPZD` with one group and a soft fallback.
pub const SCENARIO_CATALOG: &str = include_str!("../../../test-fixtures/catalogs/scenario.toml");

/// `A` and `B` imply each other; `C` feeds the loop from outside.
pub const CYCLIC_CATALOG: &str = include_str!("../../../test-fixtures/catalogs/cyclic.toml");

/// `GLS_MIXING` and `LMD_DDMIX` force opposite values onto `LMD_MIXING`.
pub const CONFLICTING_CATALOG: &str =
    include_str!("../../../test-fixtures/catalogs/conflicting.toml");

/// Path to the `test-fixtures` directory at the workspace root.
pub fn fixtures_dir() -> PathBuf {
    // crates/cppkeys-test-utils -> ../../test-fixtures
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures")
}

/// Path to a catalog fixture, e.g. `catalog_fixture("scenario")`.
pub fn catalog_fixture(name: &str) -> PathBuf {
    fixtures_dir().join("catalogs").join(format!("{name}.toml"))
}

/// Path to a selection fixture including its extension.
pub fn selection_fixture(file: &str) -> PathBuf {
    fixtures_dir().join("selections").join(file)
}

/// Parse a TOML catalog source.
///
/// # Panics
/// Panics if the source is not a loadable catalog.
pub fn catalog(source: &str) -> Catalog {
    let registry: RegistryDocument = document::parse(source, DocumentFormat::Toml)
        .unwrap_or_else(|e| panic!("fixture registry does not parse: {e}"));
    let rules: RuleTableDocument = document::parse(source, DocumentFormat::Toml)
        .unwrap_or_else(|e| panic!("fixture rules do not parse: {e}"));
    Catalog::from_documents(&registry, &rules)
        .unwrap_or_else(|e| panic!("fixture catalog does not load: {e}"))
}
