//! Profiles command implementation

use colored::Colorize;

use crate::error::Result;

/// Run the profiles command
pub fn run_profiles() -> Result<()> {
    let profiles = cppkeys_catalog::profiles()?;

    println!("{}", "Built-in Profiles".bold());
    println!();

    for profile in &profiles {
        println!(
            "  {:<18} {} ({} flags selected)",
            profile.name.green(),
            profile.description.as_deref().unwrap_or(""),
            profile.selection.len().to_string().dimmed()
        );
    }

    println!();
    println!(
        "{} {} profiles available. Use {} to resolve one.",
        "Total:".dimmed(),
        profiles.len(),
        "cppkeys resolve --profile <name>".cyan()
    );
    Ok(())
}
