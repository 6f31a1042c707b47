//! Explain command implementation
//!
//! Shows the value a flag resolved to, where the value came from, and the
//! other rules and groups that touch it.

use colored::Colorize;
use cppkeys_core::{
    Catalog, Configuration, ExclusivityGroup, Flag, Provenance, ResolvedFlag, Rule, Selection,
};

use super::{on_off, resolve_or_report};
use crate::error::Result;

/// Everything known about one resolved flag.
#[derive(Debug)]
pub struct Explanation<'a> {
    pub flag: &'a Flag,
    pub resolved: &'a ResolvedFlag,
    /// The rule named by the provenance, if any
    pub forced_by: Option<&'a Rule>,
    /// Every other rule that can write the flag
    pub other_writers: Vec<&'a Rule>,
    pub groups: Vec<&'a ExclusivityGroup>,
}

/// Collect the explanation of `name` from a resolved configuration.
pub fn explain<'a>(
    catalog: &'a Catalog,
    config: &'a Configuration,
    name: &str,
) -> Result<Explanation<'a>> {
    let registry = catalog.registry();
    let flag = registry.lookup(name)?;
    let resolved = config.get(name).ok_or_else(|| {
        cppkeys_core::Error::UnknownFlag {
            id: name.to_string(),
            context: "resolved configuration".to_string(),
        }
    })?;

    let forced_by = match &resolved.provenance {
        Provenance::Forced { rule } => catalog.rules().get(rule.as_str()),
        _ => None,
    };
    let other_writers = catalog
        .rules()
        .writers_of(name)
        .into_iter()
        .filter(|r| forced_by.is_none_or(|f| f.id != r.id))
        .collect();

    Ok(Explanation {
        flag,
        resolved,
        forced_by,
        other_writers,
        groups: registry.groups_of(name),
    })
}

/// Run the explain command
pub fn run_explain(
    catalog: &Catalog,
    selection: &Selection,
    flags: &[String],
    pass_factor: usize,
) -> Result<()> {
    // Unknown names fail before resolving
    for name in flags {
        catalog.registry().lookup(name)?;
    }
    let config = resolve_or_report(catalog, selection, pass_factor)?;

    for (i, name) in flags.iter().enumerate() {
        if i > 0 {
            println!();
        }
        print_explanation(&explain(catalog, &config, name)?);
    }
    Ok(())
}

fn print_explanation(explanation: &Explanation<'_>) {
    let flag = explanation.flag;
    println!(
        "{} = {} ({})",
        flag.id.as_str().bold(),
        on_off(explanation.resolved.value),
        explanation.resolved.provenance.to_string().cyan()
    );
    if let Some(description) = &flag.description {
        println!("  {}", description.dimmed());
    }
    if let Some(rule) = explanation.forced_by {
        println!("  {:<10} {}", "rule:".dimmed(), rule);
    }
    if explanation.resolved.provenance == Provenance::Default {
        println!("  {:<10} {}", "default:".dimmed(), on_off(flag.default));
    }
    for rule in &explanation.other_writers {
        println!("  {:<10} {}", "also:".dimmed(), rule.to_string().dimmed());
    }
    for group in &explanation.groups {
        let members: Vec<&str> = group.members.iter().map(|m| m.as_str()).collect();
        println!(
            "  {:<10} {} ({})",
            "group:".dimmed(),
            group.name,
            members.join(" | ")
        );
    }
}
