//! Cell content and value types

use std::fmt;

use cellgrid_formula::{Formula, FormulaError, LookupError};

/// What the user entered into a cell: the raw, editable content.
///
/// `Text("")` means the cell is empty. The spreadsheet's sparse store never
/// retains such a cell; setting empty text removes the entry.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContents {
    /// Numeric content
    Number(f64),

    /// Plain text content
    Text(String),

    /// A parsed formula (entered with a leading '=')
    Formula(Formula),
}

impl CellContents {
    /// True for empty text, the content of a cell that does not exist.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellContents::Text(t) if t.is_empty())
    }
}

/// Renders the content exactly as `set_contents_of_cell` would re-accept it:
/// numbers in canonical `f64` form, text verbatim, formulas with a leading
/// `=`.
impl fmt::Display for CellContents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellContents::Number(n) => write!(f, "{}", n),
            CellContents::Text(t) => write!(f, "{}", t),
            CellContents::Formula(formula) => write!(f, "={}", formula),
        }
    }
}

impl From<f64> for CellContents {
    fn from(n: f64) -> Self {
        CellContents::Number(n)
    }
}

impl From<&str> for CellContents {
    fn from(s: &str) -> Self {
        CellContents::Text(s.to_string())
    }
}

impl From<String> for CellContents {
    fn from(s: String) -> Self {
        CellContents::Text(s)
    }
}

impl From<Formula> for CellContents {
    fn from(formula: Formula) -> Self {
        CellContents::Formula(formula)
    }
}

/// What a cell displays: derived from its contents.
///
/// Number and text contents mirror into the value directly. A formula's
/// value is whatever evaluation produced, including an evaluation failure,
/// which is stored here as an ordinary value so it flows through dependent
/// formulas without any exception machinery.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Numeric value
    Number(f64),

    /// Text value
    Text(String),

    /// A formula that could not produce a number (division by zero, a
    /// reference to an empty or non-numeric cell)
    Error(FormulaError),
}

impl CellValue {
    /// The numeric value, if there is one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(t) => write!(f, "{}", t),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

/// One occupied cell: its raw content and the value derived from it.
///
/// A cell does not know its own name; the spreadsheet's sparse map provides
/// identity. Values are re-derived through [`Cell::recalculate`] whenever the
/// contents or any referenced cell's value changes.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cell {
    contents: CellContents,
    value: CellValue,
}

impl Cell {
    /// Create a cell with `contents`, deriving its initial value through
    /// `lookup`.
    pub(crate) fn new<L>(contents: CellContents, lookup: L) -> Self
    where
        L: FnMut(&str) -> Result<f64, LookupError>,
    {
        let value = derive_value(&contents, lookup);
        Self { contents, value }
    }

    pub(crate) fn contents(&self) -> &CellContents {
        &self.contents
    }

    pub(crate) fn value(&self) -> &CellValue {
        &self.value
    }

    /// Re-derive the value from the current contents.
    pub(crate) fn recalculate<L>(&mut self, lookup: L)
    where
        L: FnMut(&str) -> Result<f64, LookupError>,
    {
        self.value = derive_value(&self.contents, lookup);
    }
}

fn derive_value<L>(contents: &CellContents, lookup: L) -> CellValue
where
    L: FnMut(&str) -> Result<f64, LookupError>,
{
    match contents {
        CellContents::Number(n) => CellValue::Number(*n),
        CellContents::Text(t) => CellValue::Text(t.clone()),
        CellContents::Formula(formula) => match formula.evaluate(lookup) {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_lookup(_: &str) -> Result<f64, LookupError> {
        Err(LookupError::Undefined)
    }

    #[test]
    fn number_and_text_contents_mirror_into_value() {
        let cell = Cell::new(CellContents::Number(2.5), no_lookup);
        assert_eq!(cell.value(), &CellValue::Number(2.5));

        let cell = Cell::new(CellContents::from("hello"), no_lookup);
        assert_eq!(cell.value(), &CellValue::Text("hello".into()));
    }

    #[test]
    fn formula_contents_evaluate() {
        let formula = Formula::parse("2 + 3").unwrap();
        let cell = Cell::new(CellContents::Formula(formula), no_lookup);
        assert_eq!(cell.value(), &CellValue::Number(5.0));
    }

    #[test]
    fn failed_evaluation_is_stored_as_a_value() {
        let formula = Formula::parse("a1 + 1").unwrap();
        let cell = Cell::new(CellContents::Formula(formula), no_lookup);
        assert!(matches!(cell.value(), CellValue::Error(_)));
    }

    #[test]
    fn recalculate_tracks_lookup_changes() {
        let formula = Formula::parse("a1 * 2").unwrap();
        let mut cell = Cell::new(CellContents::Formula(formula), |_| Ok(3.0));
        assert_eq!(cell.value(), &CellValue::Number(6.0));

        cell.recalculate(|_| Ok(10.0));
        assert_eq!(cell.value(), &CellValue::Number(20.0));

        cell.recalculate(no_lookup);
        assert!(matches!(cell.value(), CellValue::Error(_)));
    }

    #[test]
    fn contents_display_is_reacceptable() {
        assert_eq!(CellContents::Number(1.5).to_string(), "1.5");
        assert_eq!(CellContents::Number(3.0).to_string(), "3");
        assert_eq!(CellContents::from("plain").to_string(), "plain");
        let formula = Formula::parse("a1 + 1").unwrap();
        assert_eq!(CellContents::Formula(formula).to_string(), "=a1+1");
    }

    #[test]
    fn only_empty_text_is_empty() {
        assert!(CellContents::Text(String::new()).is_empty());
        assert!(!CellContents::Text(" ".into()).is_empty());
        assert!(!CellContents::Number(0.0).is_empty());
    }
}
