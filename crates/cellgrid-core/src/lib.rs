//! # cellgrid-core
//!
//! The spreadsheet engine: cells, dependency tracking, cycle detection,
//! and ordered recalculation.
//!
//! A [`Spreadsheet`] is a sparse map from validated cell names to cells.
//! Each cell holds raw [`CellContents`] (number, text, or formula) and a
//! derived [`CellValue`]. A dependency graph mirrors every formula's
//! variable references, so a single [`Spreadsheet::set_contents_of_cell`]
//! call recomputes exactly the affected cells, in an order where each cell
//! comes before everything that depends on it. Mutations that would create
//! a circular reference are rejected atomically with full rollback.
//!
//! Persistence lives in `cellgrid-xml`; this crate has no I/O.

mod cell;
mod error;
mod spreadsheet;

pub use cell::{CellContents, CellValue};
pub use error::{Error, Result};
pub use spreadsheet::Spreadsheet;
