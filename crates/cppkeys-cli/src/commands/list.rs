//! List command implementation

use colored::Colorize;
use cppkeys_core::{Catalog, Flag};

use super::on_off;
use crate::error::{CliError, Result};

/// Run the list command
pub fn run_list(catalog: &Catalog, tag_filter: Option<&str>) -> Result<()> {
    let registry = catalog.registry();
    let tags = registry.tags();

    if let Some(tag) = tag_filter {
        if !tags.contains(&tag) {
            return Err(CliError::user(format!(
                "Unknown tag '{}'. Valid: {}",
                tag,
                tags.join(", ")
            )));
        }
    }

    println!("{}", "Flags".bold());
    println!();

    for tag in &tags {
        if tag_filter.is_some_and(|f| f != *tag) {
            continue;
        }
        println!("{}:", tag.cyan().bold());
        for flag in registry.flags_with_tag(tag) {
            print_flag(flag);
        }
        println!();
    }

    let untagged: Vec<&Flag> = registry.flags().iter().filter(|f| f.tag.is_none()).collect();
    if tag_filter.is_none() && !untagged.is_empty() {
        println!("{}:", "other".cyan().bold());
        for flag in untagged {
            print_flag(flag);
        }
        println!();
    }

    let groups: Vec<_> = registry
        .groups()
        .iter()
        .filter(|g| match tag_filter {
            Some(tag) => g
                .members
                .iter()
                .any(|m| registry.get(m.as_str()).and_then(|f| f.tag.as_deref()) == Some(tag)),
            None => true,
        })
        .collect();
    if !groups.is_empty() {
        println!("{}", "Exclusivity groups".bold());
        println!();
        for group in &groups {
            let members: Vec<&str> = group.members.iter().map(|m| m.as_str()).collect();
            println!(
                "  {:<28} {} {}",
                group.name.green(),
                format!("[{}]", group.category).dimmed(),
                members.join(" | ")
            );
        }
        println!();
    }

    println!(
        "{} {} flags, {} groups, {} rules.",
        "Total:".dimmed(),
        registry.len(),
        registry.groups().len(),
        catalog.rules().len()
    );
    Ok(())
}

fn print_flag(flag: &Flag) {
    println!(
        "  {:<24} {:<3} {}",
        flag.id.as_str().green(),
        on_off(flag.default),
        flag.description.as_deref().unwrap_or("").dimmed()
    );
}
