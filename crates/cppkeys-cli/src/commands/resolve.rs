//! Resolve command implementation

use std::fs;
use std::path::{Path, PathBuf};

use colored::Colorize;
use cppkeys_core::document::{self, DocumentFormat};
use cppkeys_core::{Catalog, Configuration, HeaderOptions, Selection, render_header};

use super::resolve_or_report;
use crate::cli::OutputFormat;
use crate::error::{CliError, Result};

/// How and where to emit a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOutput {
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub pass_factor: usize,
    /// Provenance comments on header lines
    pub provenance: bool,
}

/// Run the resolve command
pub fn run_resolve(catalog: &Catalog, selection: &Selection, out: &ResolveOutput) -> Result<()> {
    let config = resolve_or_report(catalog, selection, out.pass_factor)?;
    let text = render_configuration(catalog, &config, out.format, out.provenance)?;

    match &out.output {
        Some(path) => {
            write_output(path, &text)?;
            println!(
                "{} Resolved {} flags ({} on) to {}",
                "OK".green().bold(),
                config.len(),
                config.enabled().len(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

/// Render a configuration in the requested format, newline-terminated.
pub fn render_configuration(
    catalog: &Catalog,
    config: &Configuration,
    format: OutputFormat,
    provenance: bool,
) -> Result<String> {
    let mut text = match format {
        OutputFormat::Header => {
            let options = HeaderOptions {
                provenance_comments: provenance,
                ..HeaderOptions::default()
            };
            render_header(catalog.registry(), config, &options)
        }
        OutputFormat::Toml => document::render(config, DocumentFormat::Toml)?,
        OutputFormat::Json => document::render(config, DocumentFormat::Json)?,
        OutputFormat::Yaml => document::render(config, DocumentFormat::Yaml)?,
    };
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok(text)
}

fn write_output(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text).map_err(|e| CliError::File {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cppkeys_core::{DEFAULT_PASS_FACTOR, FlagId};
    use cppkeys_test_utils::fixtures::{CONFLICTING_CATALOG, SCENARIO_CATALOG, catalog};
    use tempfile::TempDir;

    fn biology() -> Selection {
        Selection::new().with(FlagId::new("BIOLOGY").unwrap(), true)
    }

    #[test]
    fn test_render_json() {
        let catalog = catalog(SCENARIO_CATALOG);
        let config = catalog.resolve(&biology()).unwrap();
        let text = render_configuration(&catalog, &config, OutputFormat::Json, false).unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["flags"]["BIO_NChlPZD"]["value"], true);
        assert_eq!(value["flags"]["BIO_NChlPZD"]["rule"], "biology-model");
        assert_eq!(value["flags"]["PISCES"]["source"], "default");
        assert!(text.ends_with('\n'));
    }

    #[test]
    fn test_render_header_with_provenance() {
        let catalog = catalog(SCENARIO_CATALOG);
        let config = catalog.resolve(&biology()).unwrap();
        let text = render_configuration(&catalog, &config, OutputFormat::Header, true).unwrap();
        assert!(text.contains("# define BIOLOGY /* explicit */"));
        assert!(text.contains("# undef  PISCES"));
    }

    #[test]
    fn test_run_resolve_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("cppdefs.h");
        let out = ResolveOutput {
            format: OutputFormat::Header,
            output: Some(path.clone()),
            pass_factor: DEFAULT_PASS_FACTOR,
            provenance: false,
        };
        run_resolve(&catalog(SCENARIO_CATALOG), &biology(), &out).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# define BIO_NChlPZD"));
    }

    #[test]
    fn test_run_resolve_reports_failure() {
        let selection = Selection::from_pairs([("GLS_MIXING", true), ("LMD_DDMIX", true)]).unwrap();
        let out = ResolveOutput {
            format: OutputFormat::Toml,
            output: None,
            pass_factor: DEFAULT_PASS_FACTOR,
            provenance: false,
        };
        let err = run_resolve(&catalog(CONFLICTING_CATALOG), &selection, &out).unwrap_err();
        assert!(matches!(err, CliError::ResolutionFailed { count: 1 }));
    }
}
