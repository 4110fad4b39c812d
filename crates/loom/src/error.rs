use std::fmt;

use loom_blocks::BlocksError;
use loom_lexer::LexError;
use loom_parser::ParseError;

/// The facade's unified error type. Each translation direction only ever
/// produces a subset of these variants, but one enum keeps
/// `surface_to_blocks`/`blocks_to_surface` symmetric for callers that
/// handle both.
#[derive(Debug)]
pub enum LoomError {
    Lex(LexError),
    Parse(Vec<ParseError>),
    Serialize(quick_xml::se::SeError),
    Deserialize(quick_xml::de::DeError),
    Reconstruct(BlocksError),
}

impl fmt::Display for LoomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoomError::Lex(e) => write!(f, "{e}"),
            LoomError::Parse(errs) => {
                for (i, e) in errs.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                    }
                    write!(f, "{e}")?;
                }
                Ok(())
            }
            LoomError::Serialize(e) => write!(f, "failed to serialize blocks XML: {e}"),
            LoomError::Deserialize(e) => write!(f, "failed to parse blocks XML: {e}"),
            LoomError::Reconstruct(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for LoomError {}

impl From<LexError> for LoomError {
    fn from(e: LexError) -> Self {
        LoomError::Lex(e)
    }
}

impl From<Vec<ParseError>> for LoomError {
    fn from(e: Vec<ParseError>) -> Self {
        LoomError::Parse(e)
    }
}

impl From<BlocksError> for LoomError {
    fn from(e: BlocksError) -> Self {
        LoomError::Reconstruct(e)
    }
}
