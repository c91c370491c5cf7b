//! Formula error types

use std::fmt;
use thiserror::Error;

/// Errors raised while parsing a formula string.
///
/// These are only ever produced at construction time; a `Formula` that parsed
/// successfully can always be evaluated without raising one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaFormatError {
    /// The expression contains no tokens at all
    #[error("the formula is empty; it must contain at least one token")]
    Empty,

    /// A substring that is not a parenthesis, operator, number, or variable
    #[error("unrecognized token '{0}'")]
    UnrecognizedToken(String),

    /// A ')' with no '(' still open to its left
    #[error("a closing parenthesis has no matching opening parenthesis")]
    UnmatchedClosingParen,

    /// One or more '(' never closed by the end of the expression
    #[error("{0} opening parenthesis(es) were never closed")]
    UnclosedParens(usize),

    /// The expression starts with an operator or ')'
    #[error("a formula must begin with a number, a variable, or '('")]
    InvalidStartingToken,

    /// The expression ends with an operator or '('
    #[error("a formula must end with a number, a variable, or ')'")]
    InvalidEndingToken,

    /// An operator or ')' directly after '(' or another operator
    #[error("'{0}' cannot directly follow an opening parenthesis or an operator")]
    ExpectedOperand(String),

    /// A number, variable, or '(' directly after a number, variable, or ')'
    #[error("'{0}' cannot directly follow a number, a variable, or a closing parenthesis")]
    ExpectedOperator(String),

    /// A variable whose normalized form fails the token pattern or the
    /// caller-supplied validator
    #[error("'{0}' is not a valid variable in this context")]
    InvalidVariable(String),
}

/// The result of evaluating a formula that could not produce a number.
///
/// This is a value, not an exception: `Formula::evaluate` returns it through
/// `Result::Err`, and spreadsheet cells store it as an ordinary cell value so
/// it flows through arbitrarily deep formula chains. It carries a
/// human-readable reason (division by zero, unresolved variable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormulaError {
    reason: String,
}

impl FormulaError {
    /// Create a new evaluation error with an explanatory reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The reason this error was produced.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for FormulaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason)
    }
}

/// The typed signal a variable-lookup callback returns when a variable has no
/// usable numeric value. The evaluator converts it into a [`FormulaError`];
/// it never crosses the evaluator boundary as a panic or an unwinding error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The variable names nothing (e.g. an empty spreadsheet cell)
    #[error("the variable is not defined")]
    Undefined,

    /// The variable exists but its value is not a number
    #[error("the variable does not have a numeric value")]
    NotNumeric,
}
