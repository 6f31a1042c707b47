//! cppkeys CLI
//!
//! Resolves compile-time toggle selections against a catalog of flags,
//! exclusivity groups and implication rules.

mod cli;
mod commands;
mod error;
mod logging;
mod settings;
mod source;

use std::path::PathBuf;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use cppkeys_core::DEFAULT_PASS_FACTOR;

use cli::{CatalogArgs, Cli, Commands, OutputFormat};
use error::Result;
use settings::{Settings, SettingsLoader};

const CONFIG_DIR_ENV: &str = "CPPKEYS_CONFIG_DIR";

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} toggle resolver", "cppkeys".green().bold());
            println!();
            println!("Run {} for available commands.", "cppkeys --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            catalog,
            selection,
            format,
            output,
            pass_factor,
            provenance,
        } => {
            let settings = load_settings()?;
            let catalog = source::load_catalog(catalog_path(&catalog, &settings).as_deref())?;
            let selection = source::build_selection(&selection)?;
            let out = commands::ResolveOutput {
                format: format.or(settings.format).unwrap_or(OutputFormat::Toml),
                output,
                pass_factor: pass_factor_or(pass_factor, &settings),
                provenance: provenance || settings.provenance_comments.unwrap_or(false),
            };
            commands::run_resolve(&catalog, &selection, &out)
        }
        Commands::Check { catalog } => {
            let settings = load_settings()?;
            let path = catalog_path(&catalog, &settings);
            let label = path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "built-in catalog".to_string());
            let catalog = source::load_catalog(path.as_deref())?;
            commands::run_check(&catalog, &label)
        }
        Commands::List { catalog, tag } => {
            let settings = load_settings()?;
            let catalog = source::load_catalog(catalog_path(&catalog, &settings).as_deref())?;
            commands::run_list(&catalog, tag.as_deref())
        }
        Commands::Explain {
            flags,
            catalog,
            selection,
        } => {
            let settings = load_settings()?;
            let catalog = source::load_catalog(catalog_path(&catalog, &settings).as_deref())?;
            let selection = source::build_selection(&selection)?;
            commands::run_explain(&catalog, &selection, &flags, pass_factor_or(None, &settings))
        }
        Commands::Diff {
            catalog,
            profiles,
            files,
        } => {
            let settings = load_settings()?;
            let catalog = source::load_catalog(catalog_path(&catalog, &settings).as_deref())?;
            commands::run_diff(&catalog, &profiles, &files, pass_factor_or(None, &settings))
        }
        Commands::Profiles => commands::run_profiles(),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "cppkeys", &mut std::io::stdout());
            Ok(())
        }
    }
}

/// `CPPKEYS_CONFIG_DIR` replaces the platform config directory.
fn load_settings() -> Result<Settings> {
    let cwd = std::env::current_dir()?;
    let loader = match std::env::var_os(CONFIG_DIR_ENV) {
        Some(dir) => SettingsLoader::with_global_config_dir(cwd, dir),
        None => SettingsLoader::new(cwd),
    };
    loader.load()
}

/// Command line first, then settings; `None` means the built-in catalog.
fn catalog_path(args: &CatalogArgs, settings: &Settings) -> Option<PathBuf> {
    args.catalog.clone().or_else(|| settings.catalog.clone())
}

fn pass_factor_or(cli: Option<usize>, settings: &Settings) -> usize {
    cli.or(settings.pass_factor).unwrap_or(DEFAULT_PASS_FACTOR)
}
