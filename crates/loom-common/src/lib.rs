//! Shared types for the loom translator: source spans, tokens, the operator
//! flag lattice, and the static symbol/keyword tables the lexer is built on.

pub mod span;
pub mod token;

pub use span::{LineIndex, Position, Span};
pub use token::{lookup_keyword, lookup_symbol, precedence_of, Flag, StaticToken, Token, TokenKind};
