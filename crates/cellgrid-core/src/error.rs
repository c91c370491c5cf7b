//! Error types for cellgrid-core

use thiserror::Error;

use cellgrid_formula::FormulaFormatError;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in cellgrid-core
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Cell name failing the pattern or the caller-supplied validator
    #[error("Invalid cell name: {0}")]
    InvalidName(String),

    /// Applying new content would make a cell depend on itself
    #[error("Circular dependency involving cell {0}")]
    CircularDependency(String),

    /// A content string starting with '=' whose remainder is not a valid
    /// formula
    #[error("Formula parse error: {0}")]
    Format(#[from] FormulaFormatError),
}
