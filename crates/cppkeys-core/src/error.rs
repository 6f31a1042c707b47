//! Error types for cppkeys-core
//!
//! Everything in [`Error`] is a load-time failure: the registry, rule table
//! or selection cannot be used and no resolution is attempted. Problems found
//! while resolving are collected as [`crate::Diagnostic`]s instead.

/// Result type for cppkeys-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a registry, rule table or selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A rule, group or selection references an undeclared flag
    #[error("unknown flag '{id}' referenced by {context}")]
    UnknownFlag { id: String, context: String },

    /// The registry declares the same flag twice
    #[error("flag '{id}' is declared more than once")]
    DuplicateFlag { id: String },

    /// Two exclusivity groups share a name
    #[error("exclusivity group '{name}' is declared more than once")]
    DuplicateGroup { name: String },

    /// A flag joined two exclusivity groups of the same category
    #[error(
        "flag '{flag}' is already in group '{existing}' of category '{category}', cannot join '{group}'"
    )]
    OverlappingGroup {
        flag: String,
        category: String,
        existing: String,
        group: String,
    },

    /// Two rules share an id
    #[error("rule '{id}' is declared more than once")]
    DuplicateRule { id: String },

    /// Not a valid preprocessor identifier
    #[error("invalid flag identifier '{id}'")]
    InvalidIdentifier { id: String },

    /// An antecedent could not be parsed
    #[error("invalid expression '{source_text}' at offset {offset}: {reason}")]
    InvalidExpression {
        source_text: String,
        offset: usize,
        reason: String,
    },

    /// A consequent entry is not `NAME` or `!NAME`
    #[error("invalid assignment '{text}': expected NAME or !NAME")]
    InvalidAssignment { text: String },

    /// A document could not be parsed
    #[error("failed to parse {format} document: {message}")]
    DocumentParse { format: String, message: String },

    /// A document could not be serialized
    #[error("failed to serialize {format} document: {message}")]
    DocumentSerialize { format: String, message: String },

    /// File extension does not map to a known document format
    #[error("unsupported document format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub(crate) fn unknown_flag(id: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnknownFlag {
            id: id.into(),
            context: context.into(),
        }
    }
}
