//! Tokenizer for Surface.
//!
//! Scans a source string into a dense `Vec<Token>`. Lexing halts at the
//! first fatal error (unrecognized character, malformed color literal,
//! unterminated string): Surface lexing has no error-recovery mode, it
//! mirrors the immediate-panic behavior of the original scanner but as a
//! `Result` instead of a panic.

mod cursor;
pub mod error;

use cursor::{is_alpha, is_digit, is_hex_digit, Cursor};
pub use error::{LexError, LexErrorKind};
use loom_common::{lookup_keyword, lookup_symbol, Flag, Span, Token, TokenKind};

pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Tokenize the whole source, stopping at the first fatal error.
    pub fn tokenize(source: &'src str) -> Result<Vec<Token>, LexError> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        while !lexer.cursor.is_eof() {
            if let Some(token) = lexer.scan_one()? {
                tokens.push(token);
            }
        }
        Ok(tokens)
    }

    /// Scan a single token, or `None` for trivia (whitespace, comments,
    /// newlines) that produced no token.
    fn scan_one(&mut self) -> Result<Option<Token>, LexError> {
        let start_pos = self.cursor.pos();
        let position = self.cursor.position();
        let c = self.cursor.bump().expect("checked not eof");

        if c == b'/' && self.cursor.eat(b'/') {
            while let Some(n) = self.cursor.peek() {
                self.cursor.bump();
                if n == b'\n' {
                    break;
                }
            }
            return Ok(None);
        }
        if c == b'\n' || c == b' ' || c == b'\t' || c == b'\r' {
            return Ok(None);
        }

        let token = match c {
            b'+' => self.op("+", start_pos, position)?,
            b'-' => {
                if self.cursor.eat(b'>') {
                    self.op("->", start_pos, position)?
                } else {
                    self.op("-", start_pos, position)?
                }
            }
            b'*' => self.op("*", start_pos, position)?,
            b'/' => self.op("/", start_pos, position)?,
            b'%' => self.op("%", start_pos, position)?,
            b'^' => self.op("^", start_pos, position)?,
            b'|' => {
                if self.cursor.eat(b'|') {
                    self.op("||", start_pos, position)?
                } else {
                    self.op("|", start_pos, position)?
                }
            }
            b'&' => {
                if self.cursor.eat(b'&') {
                    self.op("&&", start_pos, position)?
                } else {
                    self.op("&", start_pos, position)?
                }
            }
            b'~' => self.op("~", start_pos, position)?,
            b'<' => {
                if self.cursor.eat(b'=') {
                    self.op("<=", start_pos, position)?
                } else if self.cursor.eat(b'<') {
                    self.op("<<", start_pos, position)?
                } else {
                    self.op("<", start_pos, position)?
                }
            }
            b'>' => {
                if self.cursor.eat(b'=') {
                    self.op(">=", start_pos, position)?
                } else if self.cursor.eat(b'>') {
                    self.op(">>", start_pos, position)?
                } else {
                    self.op(">", start_pos, position)?
                }
            }
            b'(' => self.op("(", start_pos, position)?,
            b')' => self.op(")", start_pos, position)?,
            b'[' => self.op("[", start_pos, position)?,
            b']' => self.op("]", start_pos, position)?,
            b'{' => self.op("{", start_pos, position)?,
            b'}' => self.op("}", start_pos, position)?,
            b'=' => {
                if self.cursor.eat(b'=') {
                    if self.cursor.eat(b'=') {
                        self.op("===", start_pos, position)?
                    } else {
                        self.op("==", start_pos, position)?
                    }
                } else {
                    self.op("=", start_pos, position)?
                }
            }
            b'.' => {
                if self.cursor.eat(b'.') {
                    self.op("..", start_pos, position)?
                } else {
                    self.op(".", start_pos, position)?
                }
            }
            b',' => self.op(",", start_pos, position)?,
            b'?' => self.op("?", start_pos, position)?,
            b'!' => {
                if self.cursor.eat(b'=') {
                    if self.cursor.eat(b'=') {
                        self.op("!==", start_pos, position)?
                    } else {
                        self.op("!=", start_pos, position)?
                    }
                } else {
                    self.op("!", start_pos, position)?
                }
            }
            b':' => {
                if self.cursor.eat(b':') {
                    self.op("::", start_pos, position)?
                } else {
                    self.op(":", start_pos, position)?
                }
            }
            b'_' => self.op("_", start_pos, position)?,
            b'@' => self.op("@", start_pos, position)?,
            b'"' => self.string(start_pos, position)?,
            b'#' => self.color(start_pos, position)?,
            other if is_alpha(other) => self.identifier(start_pos, position),
            other if is_digit(other) => self.number(start_pos, position),
            other => {
                return Err(LexError::new(
                    LexErrorKind::UnexpectedCharacter(other as char),
                    position,
                ))
            }
        };
        Ok(Some(token))
    }

    fn op(&self, spelling: &str, start: usize, position: loom_common::Position) -> Result<Token, LexError> {
        let st = lookup_symbol(spelling).unwrap_or_else(|| panic!("unregistered operator {spelling}"));
        Ok(Token::new(
            st.kind,
            st.flags.to_vec(),
            spelling,
            position,
            Span::new(start as u32, self.cursor.pos() as u32),
        ))
    }

    fn string(&mut self, start: usize, position: loom_common::Position) -> Result<Token, LexError> {
        let mut content = String::new();
        loop {
            let c = self
                .cursor
                .bump()
                .ok_or_else(|| LexError::new(LexErrorKind::UnterminatedString, position))?;
            if c == b'"' {
                break;
            }
            if c == b'\\' {
                match self.cursor.peek() {
                    Some(b'"') => {
                        content.push('"');
                        self.cursor.bump();
                        continue;
                    }
                    Some(b'\\') => {
                        content.push('\\');
                        self.cursor.bump();
                        continue;
                    }
                    _ => {
                        content.push('\\');
                        continue;
                    }
                }
            }
            content.push(c as char);
        }
        Ok(Token::new(
            TokenKind::Text,
            vec![Flag::Value, Flag::ConstantValue],
            content,
            position,
            Span::new(start as u32, self.cursor.pos() as u32),
        ))
    }

    fn color(&mut self, start: usize, position: loom_common::Position) -> Result<Token, LexError> {
        let digits_start = self.cursor.pos();
        for _ in 0..6 {
            match self.cursor.peek() {
                Some(c) if is_hex_digit(c) => {
                    self.cursor.bump();
                }
                Some(c) => {
                    return Err(LexError::new(
                        LexErrorKind::BadColorCharacter(c as char),
                        position,
                    ))
                }
                None => break,
            }
        }
        let len = self.cursor.pos() - digits_start;
        if len != 6 {
            return Err(LexError::new(LexErrorKind::InvalidColorLength(len), position));
        }
        let content = self.cursor.slice(start, self.cursor.pos());
        Ok(Token::new(
            TokenKind::ColorCode,
            vec![Flag::Value, Flag::ConstantValue],
            content,
            position,
            Span::new(start as u32, self.cursor.pos() as u32),
        ))
    }

    fn identifier(&mut self, start: usize, position: loom_common::Position) -> Token {
        while let Some(c) = self.cursor.peek() {
            if is_alpha(c) || is_digit(c) {
                self.cursor.bump();
            } else {
                break;
            }
        }
        let content = self.cursor.slice(start, self.cursor.pos());
        let span = Span::new(start as u32, self.cursor.pos() as u32);
        if let Some(st) = lookup_keyword(content) {
            Token::new(st.kind, st.flags.to_vec(), content, position, span)
        } else {
            Token::new(TokenKind::Name, vec![Flag::Value], content, position, span)
        }
    }

    fn number(&mut self, start: usize, position: loom_common::Position) -> Token {
        while let Some(c) = self.cursor.peek() {
            if is_digit(c) {
                self.cursor.bump();
            } else {
                break;
            }
        }
        if self.cursor.peek() == Some(b'.') {
            self.cursor.bump();
            while let Some(c) = self.cursor.peek() {
                if is_digit(c) {
                    self.cursor.bump();
                } else {
                    break;
                }
            }
        }
        let content = self.cursor.slice(start, self.cursor.pos());
        Token::new(
            TokenKind::Number,
            vec![Flag::Value, Flag::ConstantValue],
            content,
            position,
            Span::new(start as u32, self.cursor.pos() as u32),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn lex_simple_expression() {
        assert_eq!(
            kinds("1 + 2 * 3"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Times,
                TokenKind::Number
            ]
        );
    }

    #[test]
    fn lex_maximal_munch_operators() {
        assert_eq!(kinds("a === b"), vec![TokenKind::Name, TokenKind::TextEquals, TokenKind::Name]);
        assert_eq!(kinds("a !== b"), vec![TokenKind::Name, TokenKind::TextNotEquals, TokenKind::Name]);
        assert_eq!(kinds("a << b"), vec![TokenKind::Name, TokenKind::TextLessThan, TokenKind::Name]);
        assert_eq!(kinds("a <= b"), vec![TokenKind::Name, TokenKind::LessThanEqual, TokenKind::Name]);
    }

    #[test]
    fn lex_string_escapes_only_quote_and_backslash() {
        let tokens = Lexer::tokenize(r#""a\"b\\c\nd""#).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].content, r#"a"b\c\nd"#);
    }

    #[test]
    fn lex_unterminated_string_is_fatal() {
        let err = Lexer::tokenize("\"abc").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn lex_color_literal_exact_six() {
        let tokens = Lexer::tokenize("#1a2B3c").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::ColorCode);
        assert_eq!(tokens[0].content, "#1a2B3c");
    }

    #[test]
    fn lex_color_literal_bad_character() {
        let err = Lexer::tokenize("#1a2g3c").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::BadColorCharacter('g'));
    }

    #[test]
    fn lex_color_literal_too_short() {
        let err = Lexer::tokenize("#1a2").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::InvalidColorLength(4));
    }

    #[test]
    fn lex_keywords_vs_names() {
        assert_eq!(kinds("while x"), vec![TokenKind::While, TokenKind::Name]);
        assert_eq!(kinds("whilex"), vec![TokenKind::Name]);
    }

    #[test]
    fn lex_line_comment_to_eol() {
        assert_eq!(kinds("1 // ignored\n+ 2"), vec![TokenKind::Number, TokenKind::Plus, TokenKind::Number]);
    }

    #[test]
    fn lex_float_number() {
        let tokens = Lexer::tokenize("3.14").unwrap();
        assert_eq!(tokens[0].content, "3.14");
    }

    #[test]
    fn lex_tracks_line_and_column() {
        let tokens = Lexer::tokenize("a\nb").unwrap();
        assert_eq!(tokens[0].position.line, 1);
        assert_eq!(tokens[1].position.line, 2);
        assert_eq!(tokens[1].position.column, 1);
    }

    #[test]
    fn lex_unexpected_character() {
        let err = Lexer::tokenize("$").unwrap_err();
        assert_eq!(err.kind, LexErrorKind::UnexpectedCharacter('$'));
    }
}
