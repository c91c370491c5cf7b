//! Spreadsheet document writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{XmlError, XmlResult};
use cellgrid_core::Spreadsheet;

/// Spreadsheet document writer
pub struct SpreadsheetWriter;

impl SpreadsheetWriter {
    /// Write a spreadsheet to a file path.
    pub fn write_file<P: AsRef<Path>>(sheet: &Spreadsheet, path: P) -> XmlResult<()> {
        let file = File::create(path)?;
        Self::write(sheet, BufWriter::new(file))
    }

    /// Write a spreadsheet document to a writer.
    ///
    /// Each occupied cell becomes one record whose contents field is the
    /// cell's raw content rendered exactly as `set_contents_of_cell` would
    /// re-accept it. Cells are written in name order so output is
    /// deterministic.
    pub fn write<W: Write>(sheet: &Spreadsheet, writer: W) -> XmlResult<()> {
        let mut xml = Writer::new_with_indent(writer, b' ', 2);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

        let mut root = BytesStart::new("spreadsheet");
        root.push_attribute(("version", sheet.version()));
        xml.write_event(Event::Start(root))?;

        let mut names: Vec<&str> = sheet.nonempty_cell_names().collect();
        names.sort_unstable();

        for name in &names {
            // The name came from nonempty_cell_names, so contents cannot
            // fail validation here.
            let contents = Self::cell_error(name, sheet.contents(name))?;

            xml.write_event(Event::Start(BytesStart::new("cell")))?;

            xml.write_event(Event::Start(BytesStart::new("name")))?;
            xml.write_event(Event::Text(BytesText::new(name)))?;
            xml.write_event(Event::End(BytesEnd::new("name")))?;

            xml.write_event(Event::Start(BytesStart::new("contents")))?;
            xml.write_event(Event::Text(BytesText::new(&contents.to_string())))?;
            xml.write_event(Event::End(BytesEnd::new("contents")))?;

            xml.write_event(Event::End(BytesEnd::new("cell")))?;
        }

        xml.write_event(Event::End(BytesEnd::new("spreadsheet")))?;
        xml.into_inner().flush()?;

        debug!("wrote {} cell record(s)", names.len());
        Ok(())
    }

    fn cell_error<T>(name: &str, result: cellgrid_core::Result<T>) -> XmlResult<T> {
        result.map_err(|source| XmlError::Cell {
            name: name.to_string(),
            source,
        })
    }
}
