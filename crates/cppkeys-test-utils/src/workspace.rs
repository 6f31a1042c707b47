//! [`TestWorkspace`] builder for tests that read documents from disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::fixtures::{CONFLICTING_CATALOG, CYCLIC_CATALOG, SCENARIO_CATALOG};

/// File name used by the `with_*_catalog` helpers.
pub const CATALOG_FILE: &str = "catalog.toml";

/// A temporary directory holding catalogs, selections and settings files.
///
/// # Example
///
/// ```rust,no_run
/// use cppkeys_test_utils::TestWorkspace;
///
/// let ws = TestWorkspace::new()
///     .with_scenario_catalog()
///     .with_file("run.toml", "[selection]\nBIOLOGY = true\n");
/// ws.assert_file_contains("catalog.toml", "biology-model");
/// ```
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorkspace {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path of the catalog written by the `with_*_catalog` helpers.
    pub fn catalog_path(&self) -> PathBuf {
        self.root().join(CATALOG_FILE)
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Could not write {}: {e}", full_path.display()));
        self
    }

    pub fn with_scenario_catalog(self) -> Self {
        self.with_file(CATALOG_FILE, SCENARIO_CATALOG)
    }

    pub fn with_cyclic_catalog(self) -> Self {
        self.with_file(CATALOG_FILE, CYCLIC_CATALOG)
    }

    pub fn with_conflicting_catalog(self) -> Self {
        self.with_file(CATALOG_FILE, CONFLICTING_CATALOG)
    }

    /// Read a file relative to the root.
    ///
    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.root().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Assert that `path` (relative to the root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
