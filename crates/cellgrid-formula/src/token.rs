//! Formula tokenizer
//!
//! A hand-rolled scanner that splits an infix expression into parentheses,
//! the four binary operators, unsigned floating-point literals, and variable
//! tokens. Whitespace delimits tokens and is otherwise discarded.

use std::fmt;

use crate::error::FormulaFormatError;

/// One lexical token of a formula.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token {
    LeftParen,
    RightParen,
    Plus,
    Minus,
    Star,
    Slash,
    /// An unsigned floating-point literal, stored by value. Rendering goes
    /// through `f64`'s `Display`, which canonicalizes the literal (so
    /// `2.000` and `2.0` both print as `2`).
    Number(f64),
    /// A variable: a letter or underscore followed by letters, digits, or
    /// underscores. Stored in normalized form once parsing completes.
    Variable(String),
}

impl Token {
    /// True for tokens that can begin an operand: a number, a variable,
    /// or '('.
    pub(crate) fn opens_operand(&self) -> bool {
        matches!(
            self,
            Token::Number(_) | Token::Variable(_) | Token::LeftParen
        )
    }

    /// True for tokens that can end an operand: a number, a variable, or ')'.
    pub(crate) fn closes_operand(&self) -> bool {
        matches!(
            self,
            Token::Number(_) | Token::Variable(_) | Token::RightParen
        )
    }

    /// True for the four binary operators.
    pub(crate) fn is_operator(&self) -> bool {
        matches!(
            self,
            Token::Plus | Token::Minus | Token::Star | Token::Slash
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LeftParen => write!(f, "("),
            Token::RightParen => write!(f, ")"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Number(n) => write!(f, "{}", n),
            Token::Variable(v) => write!(f, "{}", v),
        }
    }
}

/// Split `input` into tokens, or fail on the first substring that matches no
/// token pattern.
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, FormulaFormatError> {
    let mut scanner = Scanner::new(input);
    let mut tokens = Vec::new();

    while let Some(c) = scanner.peek_char() {
        if c.is_whitespace() {
            scanner.advance();
            continue;
        }

        let token = match c {
            '(' => {
                scanner.advance();
                Token::LeftParen
            }
            ')' => {
                scanner.advance();
                Token::RightParen
            }
            '+' => {
                scanner.advance();
                Token::Plus
            }
            '-' => {
                scanner.advance();
                Token::Minus
            }
            '*' => {
                scanner.advance();
                Token::Star
            }
            '/' => {
                scanner.advance();
                Token::Slash
            }
            _ if c.is_ascii_digit()
                || (c == '.' && scanner.peek_char_at(1).is_some_and(|d| d.is_ascii_digit())) =>
            {
                scanner.scan_number()?
            }
            _ if c.is_ascii_alphabetic() || c == '_' => scanner.scan_variable(),
            _ => {
                return Err(FormulaFormatError::UnrecognizedToken(c.to_string()));
            }
        };

        tokens.push(token);
    }

    Ok(tokens)
}

/// Character-level scanner over a formula string.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    /// Scan an unsigned float literal: `\d+\.\d*`, `\d*\.\d+`, or `\d+`,
    /// with an optional `[eE][+-]?\d+` exponent. The exponent is consumed
    /// only when at least one digit follows it, so `1e` scans as the number
    /// `1` followed by the variable `e`.
    fn scan_number(&mut self) -> Result<Token, FormulaFormatError> {
        let start = self.pos;

        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek_char() == Some('.') {
            self.advance();
            while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        if self.peek_char().is_some_and(|c| c == 'e' || c == 'E') {
            let sign_offset = usize::from(matches!(self.peek_char_at(1), Some('+') | Some('-')));
            if self
                .peek_char_at(1 + sign_offset)
                .is_some_and(|c| c.is_ascii_digit())
            {
                self.advance(); // e
                if sign_offset == 1 {
                    self.advance(); // sign
                }
                while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let lexeme = &self.input[start..self.pos];
        let value: f64 = lexeme
            .parse()
            .map_err(|_| FormulaFormatError::UnrecognizedToken(lexeme.to_string()))?;
        Ok(Token::Number(value))
    }

    /// Scan a variable token: a letter or underscore followed by letters,
    /// digits, or underscores.
    fn scan_variable(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek_char()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }
        Token::Variable(self.input[start..self.pos].to_string())
    }
}
