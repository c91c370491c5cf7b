//! Spreadsheet document reader

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::debug;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{XmlError, XmlResult};
use cellgrid_core::Spreadsheet;

/// Where the cursor is inside the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeRoot,
    InSheet,
    InCell,
    InName,
    InContents,
    Done,
}

/// Spreadsheet document reader
pub struct SpreadsheetReader;

impl SpreadsheetReader {
    /// Load a spreadsheet from a file path, requiring the file's recorded
    /// version to be `expected_version`.
    pub fn read_file<P: AsRef<Path>>(path: P, expected_version: &str) -> XmlResult<Spreadsheet> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file), expected_version)
    }

    /// Like [`read_file`](Self::read_file), but the loaded spreadsheet uses
    /// the given name normalizer and validator.
    pub fn read_file_with<P, N, V>(
        path: P,
        expected_version: &str,
        normalize: N,
        is_valid: V,
    ) -> XmlResult<Spreadsheet>
    where
        P: AsRef<Path>,
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        let file = File::open(path)?;
        Self::read_with(BufReader::new(file), expected_version, normalize, is_valid)
    }

    /// Load a spreadsheet document from a reader.
    pub fn read<R: BufRead>(reader: R, expected_version: &str) -> XmlResult<Spreadsheet> {
        Self::read_with(reader, expected_version, |s| s.to_string(), |_| true)
    }

    /// Load a spreadsheet document, replaying each cell record through
    /// `set_contents_of_cell` in file order.
    ///
    /// Loading is all-or-nothing: the document is built into a fresh
    /// spreadsheet that is only returned on success. Malformed structure,
    /// a version other than `expected_version`, and any record that fails
    /// to replay (bad name, bad formula, circular dependency) all abort
    /// the load with an [`XmlError`].
    ///
    /// Text inside a contents field is taken verbatim, so text cells keep
    /// their surrounding whitespace.
    pub fn read_with<R, N, V>(
        reader: R,
        expected_version: &str,
        normalize: N,
        is_valid: V,
    ) -> XmlResult<Spreadsheet>
    where
        R: BufRead,
        N: Fn(&str) -> String + 'static,
        V: Fn(&str) -> bool + 'static,
    {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();

        let mut sheet = Spreadsheet::with_rules(expected_version, normalize, is_valid);
        let mut state = State::BeforeRoot;
        let mut cell_name: Option<String> = None;
        let mut cell_contents: Option<String> = None;
        let mut text = String::new();
        let mut records = 0usize;

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Decl(_) | Event::DocType(_) | Event::Comment(_) | Event::PI(_) => {}

                Event::Start(e) => match (state, e.name().as_ref()) {
                    (State::BeforeRoot, b"spreadsheet") => {
                        check_version(&e, expected_version)?;
                        state = State::InSheet;
                    }
                    (State::InSheet, b"cell") => {
                        cell_name = None;
                        cell_contents = None;
                        state = State::InCell;
                    }
                    (State::InCell, b"name") => {
                        if cell_name.is_some() {
                            return Err(XmlError::InvalidFormat(
                                "duplicate name field in cell record".into(),
                            ));
                        }
                        text.clear();
                        state = State::InName;
                    }
                    (State::InCell, b"contents") => {
                        if cell_contents.is_some() {
                            return Err(XmlError::InvalidFormat(
                                "duplicate contents field in cell record".into(),
                            ));
                        }
                        text.clear();
                        state = State::InContents;
                    }
                    (State::InCell, b"cell") => {
                        return Err(XmlError::InvalidFormat("nested cell record".into()));
                    }
                    (_, other) => {
                        return Err(XmlError::InvalidFormat(format!(
                            "unexpected element '{}'",
                            String::from_utf8_lossy(other)
                        )));
                    }
                },

                Event::Empty(e) => match (state, e.name().as_ref()) {
                    (State::BeforeRoot, b"spreadsheet") => {
                        check_version(&e, expected_version)?;
                        state = State::Done;
                    }
                    (State::InSheet, b"cell") => {
                        return Err(XmlError::InvalidFormat(
                            "cell record missing name field".into(),
                        ));
                    }
                    (State::InCell, b"name") => {
                        if cell_name.is_some() {
                            return Err(XmlError::InvalidFormat(
                                "duplicate name field in cell record".into(),
                            ));
                        }
                        cell_name = Some(String::new());
                    }
                    (State::InCell, b"contents") => {
                        if cell_contents.is_some() {
                            return Err(XmlError::InvalidFormat(
                                "duplicate contents field in cell record".into(),
                            ));
                        }
                        cell_contents = Some(String::new());
                    }
                    (_, other) => {
                        return Err(XmlError::InvalidFormat(format!(
                            "unexpected element '{}'",
                            String::from_utf8_lossy(other)
                        )));
                    }
                },

                Event::End(e) => match (state, e.name().as_ref()) {
                    (State::InName, b"name") => {
                        cell_name = Some(std::mem::take(&mut text));
                        state = State::InCell;
                    }
                    (State::InContents, b"contents") => {
                        cell_contents = Some(std::mem::take(&mut text));
                        state = State::InCell;
                    }
                    (State::InCell, b"cell") => {
                        let name = cell_name.take().ok_or_else(|| {
                            XmlError::InvalidFormat("cell record missing name field".into())
                        })?;
                        let contents = cell_contents.take().ok_or_else(|| {
                            XmlError::InvalidFormat("cell record missing contents field".into())
                        })?;
                        sheet
                            .set_contents_of_cell(&name, &contents)
                            .map_err(|source| XmlError::Cell { name, source })?;
                        records += 1;
                        state = State::InSheet;
                    }
                    (State::InSheet, b"spreadsheet") => {
                        state = State::Done;
                    }
                    (_, other) => {
                        return Err(XmlError::InvalidFormat(format!(
                            "unexpected closing tag '{}'",
                            String::from_utf8_lossy(other)
                        )));
                    }
                },

                Event::Text(e) => match state {
                    State::InName | State::InContents => text.push_str(&e.unescape()?),
                    // Indentation between elements is fine; anything else
                    // is out of context.
                    _ => {
                        let stray = e.unescape()?;
                        if !stray.trim().is_empty() {
                            return Err(XmlError::InvalidFormat(format!(
                                "unexpected text '{}'",
                                stray.trim()
                            )));
                        }
                    }
                },

                Event::CData(e) => match state {
                    State::InName | State::InContents => {
                        let raw = std::str::from_utf8(&e).map_err(|_| {
                            XmlError::InvalidFormat("CDATA section is not valid UTF-8".into())
                        })?;
                        text.push_str(raw);
                    }
                    _ => {
                        return Err(XmlError::InvalidFormat("unexpected CDATA section".into()));
                    }
                },

                Event::Eof => {
                    if state != State::Done {
                        return Err(XmlError::InvalidFormat(if state == State::BeforeRoot {
                            "document has no root element".into()
                        } else {
                            "unexpected end of document".into()
                        }));
                    }
                    break;
                }
            }
            buf.clear();
        }

        debug!("loaded {records} cell record(s)");
        sheet.mark_saved();
        Ok(sheet)
    }

    /// Read only the version attribute of the root element, without
    /// reconstructing any cell state.
    pub fn saved_version<P: AsRef<Path>>(path: P) -> XmlResult<String> {
        let file = File::open(path)?;
        Self::saved_version_from(BufReader::new(file))
    }

    /// Like [`saved_version`](Self::saved_version), for any reader.
    pub fn saved_version_from<R: BufRead>(reader: R) -> XmlResult<String> {
        let mut xml = Reader::from_reader(reader);
        let mut buf = Vec::new();
        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"spreadsheet" => {
                    return version_attribute(&e);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(XmlError::InvalidFormat(format!(
                        "unexpected root element '{}'",
                        String::from_utf8_lossy(e.name().as_ref())
                    )));
                }
                Event::Eof => {
                    return Err(XmlError::InvalidFormat("document has no root element".into()));
                }
                _ => {}
            }
            buf.clear();
        }
    }
}

fn version_attribute(e: &BytesStart<'_>) -> XmlResult<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"version" {
            return Ok(attr.unescape_value()?.to_string());
        }
    }
    Err(XmlError::InvalidFormat(
        "the root element has no version attribute".into(),
    ))
}

fn check_version(e: &BytesStart<'_>, expected: &str) -> XmlResult<()> {
    let found = version_attribute(e)?;
    if found != expected {
        return Err(XmlError::VersionMismatch {
            found,
            expected: expected.to_string(),
        });
    }
    Ok(())
}
