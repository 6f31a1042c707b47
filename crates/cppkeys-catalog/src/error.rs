//! Error types for cppkeys-catalog

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Catalog error: {0}")]
    Core(#[from] cppkeys_core::Error),

    #[error("Unknown profile '{name}' (available: {})", available.join(", "))]
    UnknownProfile {
        name: String,
        available: Vec<String>,
    },
}
