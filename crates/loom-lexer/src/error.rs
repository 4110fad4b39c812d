use std::fmt;

use loom_common::Position;
use serde::Serialize;

/// A fatal lexer error. Lexing halts at the first one encountered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

impl LexError {
    pub fn new(kind: LexErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

/// The specific kind of lexer error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LexErrorKind {
    /// A byte did not start any recognized token.
    UnexpectedCharacter(char),
    /// A `"` string literal had no closing quote before end of input.
    UnterminatedString,
    /// A color literal (`#......`) did not contain exactly six hex digits.
    InvalidColorLength(usize),
    /// A non-hex character was found inside a color literal's six-digit window.
    BadColorCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(c) => write!(f, "unexpected character '{c}'"),
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::InvalidColorLength(len) => {
                write!(f, "color code must be 6 hexadecimal characters, got {len}")
            }
            Self::BadColorCharacter(c) => {
                write!(f, "invalid color code character '{c}' in color literal")
            }
        }
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: {}",
            self.position.line, self.position.column, self.kind
        )
    }
}

impl std::error::Error for LexError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position() {
        let err = LexError::new(
            LexErrorKind::UnexpectedCharacter('$'),
            Position { line: 3, column: 5 },
        );
        assert_eq!(err.to_string(), "3:5: unexpected character '$'");
    }

    #[test]
    fn kind_display_variants() {
        assert_eq!(
            LexErrorKind::InvalidColorLength(4).to_string(),
            "color code must be 6 hexadecimal characters, got 4"
        );
        assert_eq!(
            LexErrorKind::BadColorCharacter('g').to_string(),
            "invalid color code character 'g' in color literal"
        );
    }
}
