//! Layered CLI settings
//!
//! Settings are read from two optional TOML files, later layers overriding
//! earlier ones:
//!
//! 1. Global: `<config_dir>/cppkeys/config.toml`
//! 2. Project: `./cppkeys.toml`
//!
//! Command-line arguments override both.
//!
//! ```toml
//! catalog = "catalog/croco.toml"
//! format = "header"
//! pass_factor = 8
//! provenance_comments = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::OutputFormat;
use crate::error::{CliError, Result};

/// Project settings file name
pub const PROJECT_SETTINGS_FILE: &str = "cppkeys.toml";

/// One settings layer as written on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Catalog file; relative paths are taken from the settings file's directory
    pub catalog: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub pass_factor: Option<usize>,
    pub provenance_comments: Option<bool>,
}

impl Settings {
    fn parse(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut settings: Settings =
            toml::from_str(&content).map_err(|e| CliError::Settings {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        if settings.pass_factor == Some(0) {
            return Err(CliError::Settings {
                path: path.to_path_buf(),
                message: "pass_factor must be at least 1".to_string(),
            });
        }
        if let Some(catalog) = settings.catalog.take() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            settings.catalog = Some(if catalog.is_absolute() {
                catalog
            } else {
                base.join(catalog)
            });
        }
        Ok(settings)
    }

    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: Settings) {
        if other.catalog.is_some() {
            self.catalog = other.catalog;
        }
        if other.format.is_some() {
            self.format = other.format;
        }
        if other.pass_factor.is_some() {
            self.pass_factor = other.pass_factor;
        }
        if other.provenance_comments.is_some() {
            self.provenance_comments = other.provenance_comments;
        }
    }
}

/// Loads and merges the settings layers.
pub struct SettingsLoader {
    root: PathBuf,
    /// Override for the global config directory (used for testing).
    global_config_dir_override: Option<PathBuf>,
}

impl SettingsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
        }
    }

    /// Use `dir` instead of the platform config directory.
    pub fn with_global_config_dir(root: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: Some(dir.into()),
        }
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("cppkeys"))
    }

    /// Merge every layer that exists. Missing files are skipped; malformed
    /// ones are errors.
    pub fn load(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        if let Some(global_dir) = self.global_config_dir() {
            let global_path = global_dir.join("config.toml");
            if global_path.is_file() {
                tracing::debug!(?global_path, "Loading global settings");
                settings.merge(Settings::parse(&global_path)?);
            } else {
                tracing::debug!(?global_path, "No global settings found");
            }
        }

        let project_path = self.root.join(PROJECT_SETTINGS_FILE);
        if project_path.is_file() {
            tracing::debug!(?project_path, "Loading project settings");
            settings.merge(Settings::parse(&project_path)?);
        }

        Ok(settings)
    }
}
