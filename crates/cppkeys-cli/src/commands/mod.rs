//! Command implementations for cppkeys-cli

pub mod check;
pub mod diff;
pub mod explain;
pub mod list;
pub mod profiles;
pub mod resolve;

pub use check::run_check;
pub use diff::run_diff;
pub use explain::run_explain;
pub use list::run_list;
pub use profiles::run_profiles;
pub use resolve::{ResolveOutput, run_resolve};

use colored::Colorize;
use cppkeys_core::{Catalog, Configuration, Report, ResolveError, ResolveOptions, Resolver, Selection};

use crate::error::{CliError, Result};

/// Resolve `selection`, printing the full report to stderr on failure.
pub(crate) fn resolve_or_report(
    catalog: &Catalog,
    selection: &Selection,
    pass_factor: usize,
) -> Result<Configuration> {
    let mut resolver = Resolver::with_options(catalog, ResolveOptions { pass_factor });
    match resolver.resolve(selection) {
        Ok(config) => Ok(config),
        Err(ResolveError::Failed(report)) => {
            print_report(&report);
            Err(CliError::ResolutionFailed {
                count: report.len(),
            })
        }
        Err(ResolveError::Load(e)) => Err(e.into()),
    }
}

/// Print every diagnostic of a failed resolve.
pub(crate) fn print_report(report: &Report) {
    eprintln!(
        "{} {} diagnostic(s):",
        "Resolution failed".red().bold(),
        report.len()
    );
    for diagnostic in report {
        eprintln!("  {:<28} {}", diagnostic.kind().red(), diagnostic);
    }
}

pub(crate) fn on_off(value: bool) -> colored::ColoredString {
    if value { "on".green() } else { "off".dimmed() }
}
