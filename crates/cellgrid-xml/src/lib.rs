//! # cellgrid-xml
//!
//! Versioned XML persistence for cellgrid spreadsheets.
//!
//! The document format is deliberately small: a single `<spreadsheet>` root
//! carrying a `version` attribute, and one `<cell>` record per occupied cell
//! with a `<name>` and a `<contents>` field. The contents field holds the
//! cell's raw content exactly as `set_contents_of_cell` accepts it, so
//! loading is just a replay of every record into a fresh spreadsheet.
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <spreadsheet version="1.0">
//!   <cell>
//!     <name>A1</name>
//!     <contents>=B1*2</contents>
//!   </cell>
//! </spreadsheet>
//! ```

mod error;
mod reader;
mod writer;

pub use error::{XmlError, XmlResult};
pub use reader::SpreadsheetReader;
pub use writer::SpreadsheetWriter;
