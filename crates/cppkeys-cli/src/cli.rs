//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Deserialize;

/// cppkeys - Resolve compile-time toggles into a consistent configuration
#[derive(Parser, Debug)]
#[command(name = "cppkeys")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where flags, groups and rules come from
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogArgs {
    /// Catalog file (TOML, JSON or YAML); defaults to the built-in CROCO catalog
    #[arg(short, long, env = "CPPKEYS_CATALOG")]
    pub catalog: Option<PathBuf>,
}

/// What the operator selected
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Start from a built-in profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Selection file layered over the profile
    #[arg(long)]
    pub selection: Option<PathBuf>,

    /// Set a flag: NAME, !NAME or NAME=on|off (repeatable, applied last)
    #[arg(short, long = "set", value_name = "FLAG")]
    pub set: Vec<String>,
}

/// Output encodings for a resolved configuration
#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Toml,
    Json,
    Yaml,
    /// `# define` / `# undef` lines
    Header,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve a selection into a complete configuration
    ///
    /// Examples:
    ///   cppkeys resolve --profile biology-physics
    ///   cppkeys resolve -p biology-physics -s BULK_FLUX --format header
    ///   cppkeys resolve --selection run.toml --output cppdefs.h --format header
    Resolve {
        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        selection: SelectionArgs,

        /// Output format (defaults to settings, then toml)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pass cap multiplier for propagation
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        pass_factor: Option<usize>,

        /// Annotate header lines with provenance
        #[arg(long)]
        provenance: bool,
    },

    /// Validate a catalog
    Check {
        #[command(flatten)]
        catalog: CatalogArgs,
    },

    /// List declared flags and exclusivity groups
    List {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Only flags with this tag
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Show why flags hold their resolved value
    Explain {
        /// Flags to explain
        #[arg(required = true)]
        flags: Vec<String>,

        #[command(flatten)]
        catalog: CatalogArgs,

        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Compare the configurations of two profiles or selection files
    ///
    /// Examples:
    ///   cppkeys diff --profile biology-physics --profile hires-biology
    ///   cppkeys diff --profile biology-physics --selection run.toml
    Diff {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Built-in profile to compare (repeatable)
        #[arg(long = "profile", value_name = "NAME")]
        profiles: Vec<String>,

        /// Selection file to compare (repeatable)
        #[arg(long = "selection", value_name = "PATH")]
        files: Vec<PathBuf>,
    },

    /// List built-in profiles
    Profiles,

    /// Generate shell completions
    ///
    /// Examples:
    ///   cppkeys completions bash > ~/.local/share/bash-completion/completions/cppkeys
    ///   cppkeys completions zsh > ~/.zfunc/_cppkeys
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
