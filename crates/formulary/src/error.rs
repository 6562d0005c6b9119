//! Error types for the formulary facade

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from catalog editing, evaluation, and definitions files
#[derive(Debug, Error)]
pub enum Error {
    /// Rejected catalog edit
    #[error(transparent)]
    Catalog(#[from] formulary_core::Error),

    /// Tokenizing, resolution or evaluation failure
    #[error(transparent)]
    Formula(#[from] formulary_formula::FormulaError),

    /// No formula with this name in the catalog
    #[error("Unknown formula: {0}")]
    UnknownFormula(String),

    /// Reading or writing a definitions file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed definitions file
    #[error("Invalid definitions file: {0}")]
    Json(#[from] serde_json::Error),
}
