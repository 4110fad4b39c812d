use serde::Serialize;

/// The coarse type lattice results are classified into. Not a type system:
/// no inference, no subtyping rules beyond what callers need to validate
/// arity and receiver/module consistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signature {
    Bool,
    Number,
    Text,
    List,
    Dict,
    Component,
    Helper,
    Any,
    EventParam,
    Void,
}

/// Merge two observed signatures for the same slot, as the original did when
/// unifying per-branch resolutions of the same variable: identical
/// signatures pass through, anything else degrades to `Any`.
pub fn combine_signatures(a: Signature, b: Signature) -> Signature {
    if a == b {
        a
    } else {
        Signature::Any
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_identical_passes_through() {
        assert_eq!(combine_signatures(Signature::Number, Signature::Number), Signature::Number);
    }

    #[test]
    fn combine_divergent_degrades_to_any() {
        assert_eq!(combine_signatures(Signature::Number, Signature::Text), Signature::Any);
    }
}
