//! Error types for cppkeys-cli

use std::path::PathBuf;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Load-time error from cppkeys-core
    #[error(transparent)]
    Core(#[from] cppkeys_core::Error),

    /// Error from the built-in catalog
    #[error(transparent)]
    Catalog(#[from] cppkeys_catalog::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Failed to read or parse a file
    #[error("{}: {message}", path.display())]
    File { path: PathBuf, message: String },

    /// Invalid settings file
    #[error("Invalid settings in {}: {message}", path.display())]
    Settings { path: PathBuf, message: String },

    /// Resolution produced diagnostics (already printed)
    #[error("resolution failed with {count} diagnostic(s)")]
    ResolutionFailed { count: usize },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
