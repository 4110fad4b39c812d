use std::fmt;

/// Errors raised while reconstructing an `Expr` from a `Block`. Lowering
/// from `Expr` to `Block` never fails: the AST is already well-formed by
/// construction, so `to_block` is infallible.
#[derive(Debug, Clone, PartialEq)]
pub struct BlocksError {
    pub kind: BlocksErrorKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlocksErrorKind {
    UnknownBlockType(String),
    MissingField { block_type: String, field: String },
    MissingValue { block_type: String, socket: String },
    MissingStatement { block_type: String, socket: String },
    MissingMutation { block_type: String },
    MissingMutationAttribute { block_type: String, attribute: String },
}

impl BlocksError {
    pub fn new(kind: BlocksErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for BlocksError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            BlocksErrorKind::UnknownBlockType(t) => write!(f, "unknown block type `{t}`"),
            BlocksErrorKind::MissingField { block_type, field } => {
                write!(f, "block `{block_type}` is missing field `{field}`")
            }
            BlocksErrorKind::MissingValue { block_type, socket } => {
                write!(f, "block `{block_type}` is missing value socket `{socket}`")
            }
            BlocksErrorKind::MissingStatement { block_type, socket } => {
                write!(f, "block `{block_type}` is missing statement socket `{socket}`")
            }
            BlocksErrorKind::MissingMutation { block_type } => {
                write!(f, "block `{block_type}` requires a mutation but has none")
            }
            BlocksErrorKind::MissingMutationAttribute { block_type, attribute } => {
                write!(f, "block `{block_type}` mutation is missing `{attribute}`")
            }
        }
    }
}

impl std::error::Error for BlocksError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_block_type_and_field() {
        let err = BlocksError::new(BlocksErrorKind::MissingField {
            block_type: "text".into(),
            field: "TEXT".into(),
        });
        assert_eq!(err.to_string(), "block `text` is missing field `TEXT`");
    }
}
