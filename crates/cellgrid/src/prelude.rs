//! Convenience re-exports for the common case.
//!
//! ```rust
//! use cellgrid::prelude::*;
//!
//! let mut sheet = Spreadsheet::new("1.0");
//! sheet.set_contents_of_cell("A1", "=2+2").unwrap();
//! assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(4.0));
//! ```

pub use crate::{
    CellContents, CellValue, DependencyGraph, Error, Formula, Spreadsheet, SpreadsheetFileExt,
    XmlError,
};
