//! Diff command implementation
//!
//! Resolves two selections against the same catalog and shows the flags
//! whose values differ.

use std::path::PathBuf;

use colored::Colorize;
use cppkeys_core::{Catalog, FlagChange, Selection};

use super::{on_off, resolve_or_report};
use crate::error::{CliError, Result};
use crate::source::load_selection_file;

/// A labelled selection to compare.
#[derive(Debug, Clone)]
pub struct DiffSource {
    pub label: String,
    pub selection: Selection,
}

/// Collect the compared selections: profiles first, then files.
///
/// # Errors
///
/// Returns a user error unless exactly two sources are given.
pub fn collect_sources(profiles: &[String], files: &[PathBuf]) -> Result<Vec<DiffSource>> {
    let count = profiles.len() + files.len();
    if count != 2 {
        return Err(CliError::user(format!(
            "diff compares exactly two sources (got {count}); use --profile and/or --selection"
        )));
    }

    let mut sources = Vec::with_capacity(2);
    for name in profiles {
        sources.push(DiffSource {
            label: name.clone(),
            selection: cppkeys_catalog::profile(name)?.selection,
        });
    }
    for path in files {
        sources.push(DiffSource {
            label: path.display().to_string(),
            selection: load_selection_file(path)?,
        });
    }
    Ok(sources)
}

/// Resolve both sides and return the value changes from `before` to `after`.
pub fn diff_selections(
    catalog: &Catalog,
    before: &Selection,
    after: &Selection,
    pass_factor: usize,
) -> Result<Vec<FlagChange>> {
    let before = resolve_or_report(catalog, before, pass_factor)?;
    let after = resolve_or_report(catalog, after, pass_factor)?;
    Ok(before.diff(&after))
}

/// Run the diff command
pub fn run_diff(
    catalog: &Catalog,
    profiles: &[String],
    files: &[PathBuf],
    pass_factor: usize,
) -> Result<()> {
    let sources = collect_sources(profiles, files)?;
    let (before, after) = (&sources[0], &sources[1]);
    let changes = diff_selections(catalog, &before.selection, &after.selection, pass_factor)?;

    if changes.is_empty() {
        println!(
            "{} {} and {} resolve identically.",
            "OK".green().bold(),
            before.label.yellow(),
            after.label.yellow()
        );
        return Ok(());
    }

    println!(
        "{} {} -> {}",
        "Diff".blue().bold(),
        before.label.yellow(),
        after.label.yellow()
    );
    println!();
    for change in &changes {
        let show = |v: Option<bool>| match v {
            Some(value) => on_off(value),
            None => "absent".red(),
        };
        println!(
            "  {:<24} {} -> {}",
            change.flag.as_str(),
            show(change.before),
            show(change.after)
        );
    }
    println!();
    println!("{} {} flag(s) differ.", "Total:".dimmed(), changes.len());
    Ok(())
}
