//! # cellgrid-formula
//!
//! Parsing and evaluation of infix arithmetic formulas.
//!
//! A [`Formula`] is built from a string of non-negative float literals,
//! variables, parentheses, and the operators `+ - * /`. All structural
//! validation happens at parse time and reports a precise
//! [`FormulaFormatError`]; evaluation of a parsed formula can only fail by
//! dividing by zero or failing a variable lookup, and both surface as a
//! [`FormulaError`] value rather than a panic.
//!
//! Variables are normalized and validated at parse time through
//! caller-supplied callbacks, so embedders (like a spreadsheet that
//! uppercases cell names) can impose their own naming discipline. The
//! lookup callback passed to [`Formula::evaluate`] reports failures with
//! [`LookupError`].

mod error;
mod formula;
mod token;

pub use error::{FormulaError, FormulaFormatError, LookupError};
pub use formula::Formula;
