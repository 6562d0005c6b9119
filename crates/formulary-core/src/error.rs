//! Error types for formulary-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while editing a [`Catalog`](crate::Catalog)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Name does not match `[A-Z_][A-Z0-9_]*` after normalization
    #[error("Invalid name '{0}': use uppercase letters, digits and underscores only")]
    InvalidIdentifier(String),

    /// A variable or formula with this name already exists
    #[error("Name already exists: {0}")]
    DuplicateName(String),

    /// The value or expression of a definition is unusable
    #[error("Invalid definition for {name}: {reason}")]
    InvalidDefinition { name: String, reason: &'static str },

    /// No variable or formula with this name
    #[error("Not found: {0}")]
    NotFound(String),
}
