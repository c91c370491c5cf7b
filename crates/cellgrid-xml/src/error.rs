//! XML persistence error types

use thiserror::Error;

/// Result type for XML read/write operations
pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// Errors that can occur while saving or loading a spreadsheet document.
///
/// Everything that can go wrong during persistence surfaces as one of these,
/// so callers never have to know the underlying document format or I/O
/// mechanism.
#[derive(Debug, Error)]
pub enum XmlError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed document: missing, duplicated, nested, or out-of-context
    /// elements
    #[error("Invalid spreadsheet document: {0}")]
    InvalidFormat(String),

    /// The version recorded in the file does not match the requested one
    #[error("Version mismatch: file has '{found}', expected '{expected}'")]
    VersionMismatch { found: String, expected: String },

    /// A cell record that could not be replayed (bad name, bad formula, or
    /// a circular dependency)
    #[error("Cell '{name}': {source}")]
    Cell {
        name: String,
        source: cellgrid_core::Error,
    },
}
