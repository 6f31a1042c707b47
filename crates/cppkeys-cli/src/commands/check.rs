//! Check command implementation
//!
//! Load-time errors never reach this point: the catalog failed to load and
//! `main` reports the error. What remains are structural problems that only
//! show up once rules are ordered.

use colored::Colorize;
use cppkeys_core::{Catalog, ResolveError, Selection};

use crate::error::{CliError, Result};

/// Run the check command
pub fn run_check(catalog: &Catalog, label: &str) -> Result<()> {
    println!("{} {}", "Check".blue().bold(), label.yellow());
    println!(
        "  {:<8} {}",
        "flags".dimmed(),
        catalog.registry().len()
    );
    println!(
        "  {:<8} {}",
        "groups".dimmed(),
        catalog.registry().groups().len()
    );
    println!("  {:<8} {}", "rules".dimmed(), catalog.rules().len());
    println!();

    let cycles = catalog.plan().cycles();
    if !cycles.is_empty() {
        for cycle in cycles {
            let rules: Vec<&str> = cycle.rules.iter().map(|r| r.as_str()).collect();
            let flags: Vec<&str> = cycle.flags.iter().map(|f| f.as_str()).collect();
            println!(
                "  {} rules {} (flags {})",
                "cycle:".red().bold(),
                rules.join(", "),
                flags.join(", ")
            );
        }
        return Err(CliError::user(format!(
            "{} dependency cycle(s) in rule table",
            cycles.len()
        )));
    }

    // Defaults alone should already form a valid configuration
    if let Err(ResolveError::Failed(report)) = catalog.resolve(&Selection::new()) {
        for diagnostic in &report {
            println!(
                "  {} empty selection: {}",
                "warning:".yellow().bold(),
                diagnostic
            );
        }
    }

    println!("{} Catalog is consistent.", "OK".green().bold());
    Ok(())
}
