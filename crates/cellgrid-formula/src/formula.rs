//! The `Formula` type: parse-time validation and two-stack evaluation.

use std::fmt;

use lazy_regex::regex_is_match;

use crate::error::{FormulaError, FormulaFormatError, LookupError};
use crate::token::{tokenize, Token};

/// A syntactically valid infix formula over non-negative float literals,
/// variables, parentheses, and the four operators `+ - * /`.
///
/// Every `Formula` value has already passed the full grammar check, and its
/// variable tokens are stored in normalized form, so evaluation can never
/// fail structurally; the only evaluation failures are division by zero and
/// unresolved variables, both reported as a [`FormulaError`] value.
///
/// # Example
///
/// ```rust
/// use cellgrid_formula::Formula;
///
/// let f = Formula::parse("( 2 + 3 ) * 2").unwrap();
/// assert_eq!(f.to_string(), "(2+3)*2");
/// assert_eq!(f.evaluate(|_| unreachable!()), Ok(10.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Formula {
    tokens: Vec<Token>,
    /// Distinct normalized variables, in first-appearance order.
    variables: Vec<String>,
}

impl Formula {
    /// Parse a formula with the identity normalizer and an always-true
    /// validator.
    pub fn parse(text: &str) -> Result<Self, FormulaFormatError> {
        Self::parse_with(text, |s| s.to_string(), |_| true)
    }

    /// Parse a formula, normalizing every variable token with `normalize`
    /// and then requiring it to satisfy both the variable-token pattern and
    /// the caller's `is_valid` predicate.
    ///
    /// Each grammar violation produces its own [`FormulaFormatError`]
    /// variant: the expression must be non-empty, parentheses must balance
    /// and never go net-negative, the first and last tokens must be able to
    /// open/close an operand, an operand must follow every `(` and operator,
    /// and an operator or `)` must follow every number, variable, and `)`.
    pub fn parse_with<N, V>(
        text: &str,
        normalize: N,
        is_valid: V,
    ) -> Result<Self, FormulaFormatError>
    where
        N: Fn(&str) -> String,
        V: Fn(&str) -> bool,
    {
        let mut tokens = tokenize(text)?;

        let first = tokens.first().ok_or(FormulaFormatError::Empty)?;
        if !first.opens_operand() {
            return Err(FormulaFormatError::InvalidStartingToken);
        }
        // The empty check above guarantees a last token exists.
        if let Some(last) = tokens.last() {
            if !last.closes_operand() {
                return Err(FormulaFormatError::InvalidEndingToken);
            }
        }

        let mut open_parens = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::LeftParen => open_parens += 1,
                Token::RightParen => {
                    open_parens = open_parens
                        .checked_sub(1)
                        .ok_or(FormulaFormatError::UnmatchedClosingParen)?;
                }
                _ => {}
            }

            if i > 0 {
                let prev = &tokens[i - 1];
                if (matches!(prev, Token::LeftParen) || prev.is_operator())
                    && !token.opens_operand()
                {
                    return Err(FormulaFormatError::ExpectedOperand(token.to_string()));
                }
                if prev.closes_operand()
                    && !token.is_operator()
                    && !matches!(token, Token::RightParen)
                {
                    return Err(FormulaFormatError::ExpectedOperator(token.to_string()));
                }
            }
        }
        if open_parens > 0 {
            return Err(FormulaFormatError::UnclosedParens(open_parens));
        }

        // Normalize variables in place and collect the distinct set.
        let mut variables: Vec<String> = Vec::new();
        for token in &mut tokens {
            if let Token::Variable(name) = token {
                let normalized = normalize(name);
                if !regex_is_match!(r"^[A-Za-z_][A-Za-z0-9_]*$", &normalized)
                    || !is_valid(&normalized)
                {
                    return Err(FormulaFormatError::InvalidVariable(normalized));
                }
                if !variables.iter().any(|v| v == &normalized) {
                    variables.push(normalized.clone());
                }
                *name = normalized;
            }
        }

        Ok(Self { tokens, variables })
    }

    /// The distinct normalized variables of this formula, in first-appearance
    /// order.
    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.iter().map(String::as_str)
    }

    /// Evaluate the formula, resolving each variable through `lookup`.
    ///
    /// Classic two-stack operator-precedence evaluation: `*` and `/` bind
    /// tighter than `+` and `-`, parenthesized groups are reduced on `)`.
    /// Division by zero and a `lookup` that returns [`LookupError`] produce
    /// an explanatory [`FormulaError`]; nothing panics and no other failure
    /// is possible for a parsed formula.
    pub fn evaluate<L>(&self, mut lookup: L) -> Result<f64, FormulaError>
    where
        L: FnMut(&str) -> Result<f64, LookupError>,
    {
        let mut values: Vec<f64> = Vec::new();
        let mut ops: Vec<Token> = Vec::new();

        for token in &self.tokens {
            match token {
                Token::Number(n) => {
                    values.push(*n);
                    apply_pending_mul_div(&mut values, &mut ops)?;
                }
                Token::Variable(name) => {
                    let value = lookup(name).map_err(|e| {
                        FormulaError::new(format!("unknown variable '{name}': {e}"))
                    })?;
                    values.push(value);
                    apply_pending_mul_div(&mut values, &mut ops)?;
                }
                Token::Plus | Token::Minus => {
                    apply_pending_add_sub(&mut values, &mut ops);
                    ops.push(token.clone());
                }
                Token::Star | Token::Slash | Token::LeftParen => ops.push(token.clone()),
                Token::RightParen => {
                    apply_pending_add_sub(&mut values, &mut ops);
                    ops.pop(); // the matching '('
                    apply_pending_mul_div(&mut values, &mut ops)?;
                }
            }
        }

        apply_pending_add_sub(&mut values, &mut ops);
        values
            .pop()
            .ok_or_else(|| FormulaError::new("the formula evaluated to no value"))
    }
}

/// Canonical rendering: whitespace-free, variables normalized, numeric
/// literals in `f64` round-trip form. Parsing the rendering with the same
/// normalizer yields an equal `Formula`.
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// If `*` or `/` is on top of the operator stack, pop it and the top two
/// values and push the result.
fn apply_pending_mul_div(values: &mut Vec<f64>, ops: &mut Vec<Token>) -> Result<(), FormulaError> {
    if matches!(ops.last(), Some(Token::Star | Token::Slash)) {
        if let (Some(op), Some(rhs), Some(lhs)) = (ops.pop(), values.pop(), values.pop()) {
            let result = if matches!(op, Token::Star) {
                lhs * rhs
            } else {
                if rhs == 0.0 {
                    return Err(FormulaError::new("attempted to divide by zero"));
                }
                lhs / rhs
            };
            values.push(result);
        }
    }
    Ok(())
}

/// If `+` or `-` is on top of the operator stack, pop it and the top two
/// values and push the result.
fn apply_pending_add_sub(values: &mut Vec<f64>, ops: &mut Vec<Token>) {
    if matches!(ops.last(), Some(Token::Plus | Token::Minus)) {
        if let (Some(op), Some(rhs), Some(lhs)) = (ops.pop(), values.pop(), values.pop()) {
            values.push(if matches!(op, Token::Plus) {
                lhs + rhs
            } else {
                lhs - rhs
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn upper(s: &str) -> String {
        s.to_uppercase()
    }

    fn eval(text: &str) -> Result<f64, FormulaError> {
        Formula::parse(text)
            .unwrap()
            .evaluate(|_| Err(LookupError::Undefined))
    }

    // === parsing ===

    #[test]
    fn rejects_empty_formula() {
        assert_eq!(Formula::parse(""), Err(FormulaFormatError::Empty));
        assert_eq!(Formula::parse("   "), Err(FormulaFormatError::Empty));
    }

    #[test]
    fn rejects_invalid_starting_token() {
        assert_eq!(
            Formula::parse("+ 2"),
            Err(FormulaFormatError::InvalidStartingToken)
        );
        assert_eq!(
            Formula::parse(") 2 ("),
            Err(FormulaFormatError::InvalidStartingToken)
        );
    }

    #[test]
    fn rejects_invalid_ending_token() {
        assert_eq!(
            Formula::parse("2 +"),
            Err(FormulaFormatError::InvalidEndingToken)
        );
        assert_eq!(
            Formula::parse("2 + ("),
            Err(FormulaFormatError::InvalidEndingToken)
        );
    }

    #[test]
    fn rejects_unbalanced_parens() {
        assert_eq!(
            Formula::parse("( 2 + 3 ) )"),
            Err(FormulaFormatError::UnmatchedClosingParen)
        );
        // Never net-negative while scanning left to right, even if the
        // totals balance out.
        assert_eq!(
            Formula::parse("2 ) * ( 3"),
            Err(FormulaFormatError::UnmatchedClosingParen)
        );
        assert_eq!(
            Formula::parse("( ( 2 + 3 )"),
            Err(FormulaFormatError::UnclosedParens(1))
        );
    }

    #[test]
    fn rejects_operand_in_operator_position() {
        assert_eq!(
            Formula::parse("2 3"),
            Err(FormulaFormatError::ExpectedOperator("3".into()))
        );
        assert_eq!(
            Formula::parse("2x"),
            Err(FormulaFormatError::ExpectedOperator("x".into()))
        );
        assert_eq!(
            Formula::parse("( 2 ) 3"),
            Err(FormulaFormatError::ExpectedOperator("3".into()))
        );
        assert_eq!(
            Formula::parse("2 ( 3 )"),
            Err(FormulaFormatError::ExpectedOperator("(".into()))
        );
    }

    #[test]
    fn rejects_operator_in_operand_position() {
        assert_eq!(
            Formula::parse("2 + * 3"),
            Err(FormulaFormatError::ExpectedOperand("*".into()))
        );
        assert_eq!(
            Formula::parse("( + 2 )"),
            Err(FormulaFormatError::ExpectedOperand("+".into()))
        );
        assert_eq!(
            Formula::parse("( ) + 2"),
            Err(FormulaFormatError::ExpectedOperand(")".into()))
        );
    }

    #[test]
    fn rejects_unrecognized_tokens() {
        assert_eq!(
            Formula::parse("2 $ 3"),
            Err(FormulaFormatError::UnrecognizedToken("$".into()))
        );
    }

    #[test]
    fn validator_applies_to_normalized_variables() {
        // Validator only accepts one letter followed by one digit.
        let one_letter_one_digit = |s: &str| regex_is_match!(r"^[A-Z][0-9]$", s);

        assert!(Formula::parse_with("x2+y3", upper, one_letter_one_digit).is_ok());
        assert_eq!(
            Formula::parse_with("x+y3", upper, one_letter_one_digit),
            Err(FormulaFormatError::InvalidVariable("X".into()))
        );
        assert_eq!(
            Formula::parse_with("2x+y3", upper, one_letter_one_digit),
            Err(FormulaFormatError::ExpectedOperator("x".into()))
        );
    }

    #[test]
    fn normalizer_output_must_be_a_legal_variable() {
        let emptying = |_: &str| String::new();
        assert_eq!(
            Formula::parse_with("a1", emptying, |_| true),
            Err(FormulaFormatError::InvalidVariable("".into()))
        );
    }

    // === evaluation ===

    #[test]
    fn evaluates_literals_and_operators() {
        assert_eq!(eval("5"), Ok(5.0));
        assert_eq!(eval("2 + 3"), Ok(5.0));
        assert_eq!(eval("7 - 2"), Ok(5.0));
        assert_eq!(eval("4 * 3"), Ok(12.0));
        assert_eq!(eval("10 / 4"), Ok(2.5));
    }

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        assert_eq!(eval("2 + 3 * 4"), Ok(14.0));
        assert_eq!(eval("2 * 3 + 4"), Ok(10.0));
        assert_eq!(eval("20 - 3 * 4"), Ok(8.0));
    }

    #[test]
    fn same_precedence_associates_left() {
        assert_eq!(eval("10 - 2 - 3"), Ok(5.0));
        assert_eq!(eval("16 / 4 / 2"), Ok(2.0));
        assert_eq!(eval("2 + 3 - 4 + 5"), Ok(6.0));
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(eval("( 2 + 3 ) * 2"), Ok(10.0));
        assert_eq!(eval("2 * ( 3 + 4 )"), Ok(14.0));
        assert_eq!(eval("( ( 1 + 2 ) * ( 3 + 4 ) )"), Ok(21.0));
        assert_eq!(eval("((((5))))"), Ok(5.0));
    }

    #[test]
    fn division_by_zero_is_a_value_not_a_panic() {
        let err = eval("1 / 0").unwrap_err();
        assert!(err.reason().contains("divide by zero"));

        let err = eval("5 / ( 3 - 3 )").unwrap_err();
        assert!(err.reason().contains("divide by zero"));
    }

    #[test]
    fn variables_resolve_through_lookup() {
        let f = Formula::parse("x + 7").unwrap();
        assert_eq!(f.evaluate(|_| Ok(2.0)), Ok(9.0));

        let f = Formula::parse_with("x + 7", upper, |_| true).unwrap();
        let result = f.evaluate(|name| if name == "X" { Ok(4.0) } else { Ok(2.0) });
        assert_eq!(result, Ok(11.0));
    }

    #[test]
    fn failed_lookup_becomes_formula_error() {
        let f = Formula::parse("a1 + 1").unwrap();
        let err = f.evaluate(|_| Err(LookupError::Undefined)).unwrap_err();
        assert!(err.reason().contains("a1"));
        assert!(err.reason().contains("not defined"));

        let err = f.evaluate(|_| Err(LookupError::NotNumeric)).unwrap_err();
        assert!(err.reason().contains("numeric"));
    }

    #[test]
    fn lookup_failure_in_longer_expression() {
        let f = Formula::parse("2 * ( a1 + 3 )").unwrap();
        assert!(f.evaluate(|_| Err(LookupError::Undefined)).is_err());
    }

    #[test]
    fn mixed_variables_and_literals() {
        let f = Formula::parse("a1 * b2 + 1").unwrap();
        let result = f.evaluate(|name| match name {
            "a1" => Ok(3.0),
            "b2" => Ok(4.0),
            _ => Err(LookupError::Undefined),
        });
        assert_eq!(result, Ok(13.0));
    }

    // === variables() ===

    #[test]
    fn variables_are_distinct_and_normalized() {
        let f = Formula::parse_with("x + y * z", upper, |_| true).unwrap();
        assert_eq!(f.variables().collect::<Vec<_>>(), ["X", "Y", "Z"]);

        let f = Formula::parse_with("x + X * z", upper, |_| true).unwrap();
        assert_eq!(f.variables().collect::<Vec<_>>(), ["X", "Z"]);

        let f = Formula::parse("x + X * z").unwrap();
        assert_eq!(f.variables().collect::<Vec<_>>(), ["x", "X", "z"]);
    }

    #[test]
    fn literal_only_formula_has_no_variables() {
        let f = Formula::parse("1 + 2 * 3").unwrap();
        assert_eq!(f.variables().count(), 0);
    }

    // === display and equality ===

    #[test]
    fn display_is_canonical_and_reparseable() {
        let f = Formula::parse_with("x + y", upper, |_| true).unwrap();
        assert_eq!(f.to_string(), "X+Y");

        let f = Formula::parse("x + Y").unwrap();
        assert_eq!(f.to_string(), "x+Y");

        let f = Formula::parse("( 2.0 + x7 ) * 1e2").unwrap();
        assert_eq!(f.to_string(), "(2+x7)*100");
        assert_eq!(Formula::parse(&f.to_string()).unwrap(), f);
    }

    #[test]
    fn equality_ignores_whitespace_and_literal_spelling() {
        let a = Formula::parse_with("x1+y2", upper, |_| true).unwrap();
        let b = Formula::parse("X1  +  Y2").unwrap();
        assert_eq!(a, b);

        assert_eq!(
            Formula::parse("2.0 + x7").unwrap(),
            Formula::parse("2.000 + x7").unwrap()
        );
    }

    #[test]
    fn equality_respects_order_and_case() {
        assert_ne!(
            Formula::parse("x1+y2").unwrap(),
            Formula::parse("X1+Y2").unwrap()
        );
        assert_ne!(
            Formula::parse("x1+y2").unwrap(),
            Formula::parse("y2+x1").unwrap()
        );
    }
}
