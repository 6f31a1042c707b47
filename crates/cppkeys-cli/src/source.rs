//! Loading catalogs and selections from disk or the built-in catalog.

use std::fs;
use std::path::Path;

use cppkeys_core::document::{self, DocumentFormat};
use cppkeys_core::{Catalog, RegistryDocument, RuleTableDocument, Selection, SelectionDocument};

use crate::cli::SelectionArgs;
use crate::error::{CliError, Result};

fn read(path: &Path) -> Result<(String, DocumentFormat)> {
    let format = DocumentFormat::from_path(path)?;
    let content = fs::read_to_string(path).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok((content, format))
}

/// Load a catalog file, or the built-in catalog when `path` is `None`.
///
/// One file carries both the registry (`flags`, `groups`) and the rule table
/// (`rules`).
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    let Some(path) = path else {
        tracing::debug!("Using built-in catalog");
        return Ok(cppkeys_catalog::builtin_catalog()?);
    };

    tracing::debug!(?path, "Loading catalog");
    let (content, format) = read(path)?;
    let registry: RegistryDocument = document::parse(&content, format)?;
    let rules: RuleTableDocument = document::parse(&content, format)?;
    Ok(Catalog::from_documents(&registry, &rules)?)
}

/// Load a selection document.
pub fn load_selection_file(path: &Path) -> Result<Selection> {
    let (content, format) = read(path)?;
    let doc: SelectionDocument = document::parse(&content, format)?;
    Ok(doc.selection)
}

/// Build the selection described by the command line.
///
/// Layers apply in order: profile, selection file, then `--set` entries.
pub fn build_selection(args: &SelectionArgs) -> Result<Selection> {
    let mut selection = match &args.profile {
        Some(name) => cppkeys_catalog::profile(name)?.selection,
        None => Selection::new(),
    };
    if let Some(path) = &args.selection {
        selection.merge(&load_selection_file(path)?);
    }
    for entry in &args.set {
        let (flag, value) = Selection::parse_entry(entry)?;
        selection.set(flag, value);
    }
    tracing::debug!(flags = selection.len(), "Selection built");
    Ok(selection)
}
