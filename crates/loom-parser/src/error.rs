use std::fmt;

use loom_common::{Position, TokenKind};
use loom_resolve::ResolveError;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    UnexpectedToken { expected: &'static str, found: TokenKind },
    UnexpectedEof { expected: &'static str },
    UnknownBuiltin(String),
    UnknownMethod(String),
    ArityMismatch { name: String, args_count: usize },
    Resolve(ResolveError),
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: Position) -> Self {
        Self { kind, position }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Position { line, column } = self.position;
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected} but found {found:?} at line {line}, column {column}")
            }
            ParseErrorKind::UnexpectedEof { expected } => {
                write!(f, "expected {expected} but reached end of input")
            }
            ParseErrorKind::UnknownBuiltin(name) => write!(f, "unknown function `{name}` at line {line}, column {column}"),
            ParseErrorKind::UnknownMethod(name) => write!(f, "unknown method `{name}` at line {line}, column {column}"),
            ParseErrorKind::ArityMismatch { name, args_count } => {
                write!(f, "`{name}` called with {args_count} argument(s) at line {line}, column {column}")
            }
            ParseErrorKind::Resolve(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ParseError {}
