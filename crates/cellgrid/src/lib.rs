//! # cellgrid
//!
//! A small spreadsheet evaluation engine.
//!
//! Cellgrid parses infix algebraic formulas referencing named cells, tracks
//! inter-cell dependencies, rejects circular references atomically, recomputes
//! affected cells in a safe order, and persists spreadsheet state in a
//! versioned XML format.
//!
//! ## Example
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut sheet = Spreadsheet::new("1.0");
//!
//! sheet.set_contents_of_cell("A1", "2").unwrap();
//! sheet.set_contents_of_cell("B1", "=A1*3").unwrap();
//! assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(6.0));
//!
//! // Changing A1 recomputes B1, and reports the order it happened in.
//! let affected = sheet.set_contents_of_cell("A1", "5").unwrap();
//! assert_eq!(affected, ["A1", "B1"]);
//! assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(15.0));
//!
//! // Save to file:
//! // sheet.save("sheet.xml").unwrap();
//! ```

pub mod prelude;

// Re-export core types
pub use cellgrid_core::{CellContents, CellValue, Error, Result, Spreadsheet};

// Re-export formula types
pub use cellgrid_formula::{Formula, FormulaError, FormulaFormatError, LookupError};

// Re-export the dependency graph
pub use cellgrid_graph::DependencyGraph;

// Re-export persistence types
pub use cellgrid_xml::{SpreadsheetReader, SpreadsheetWriter, XmlError, XmlResult};

use std::path::Path;

/// Extension trait adding file I/O to [`Spreadsheet`].
pub trait SpreadsheetFileExt: Sized {
    /// Load a spreadsheet from a file, requiring its recorded version to be
    /// `version`.
    fn open<P: AsRef<Path>>(path: P, version: &str) -> XmlResult<Self>;

    /// Like [`open`](Self::open), with a caller-supplied name normalizer
    /// and validator.
    fn open_with<P, N, V>(path: P, version: &str, normalize: N, is_valid: V) -> XmlResult<Self>
    where
        P: AsRef<Path>,
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static;

    /// Save the spreadsheet to a file and clear its changed flag.
    fn save<P: AsRef<Path>>(&mut self, path: P) -> XmlResult<()>;

    /// Read the version string recorded in a saved file, without loading
    /// any cells.
    fn saved_version<P: AsRef<Path>>(path: P) -> XmlResult<String>;
}

impl SpreadsheetFileExt for Spreadsheet {
    fn open<P: AsRef<Path>>(path: P, version: &str) -> XmlResult<Self> {
        SpreadsheetReader::read_file(path, version)
    }

    fn open_with<P, N, V>(path: P, version: &str, normalize: N, is_valid: V) -> XmlResult<Self>
    where
        P: AsRef<Path>,
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        SpreadsheetReader::read_file_with(path, version, normalize, is_valid)
    }

    fn save<P: AsRef<Path>>(&mut self, path: P) -> XmlResult<()> {
        SpreadsheetWriter::write_file(self, path)?;
        self.mark_saved();
        Ok(())
    }

    fn saved_version<P: AsRef<Path>>(path: P) -> XmlResult<String> {
        SpreadsheetReader::saved_version(path)
    }
}
