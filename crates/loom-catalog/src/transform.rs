use loom_ast::Signature;

use crate::builtin::arity_ok;

/// An entry in the list-transformer registry: a chained stage dispatched
/// through `ListTransform` rather than the flat method table, because each
/// one lowers to a block carrying its own nested-procedure mutation shape
/// (a sort/filter/map comparator or predicate) instead of plain value
/// sockets.
#[derive(Debug, Clone, Copy)]
pub struct TransformerSignature {
    pub name: &'static str,
    pub block_type: &'static str,
    pub param_count: i32,
    pub result: Signature,
}

const TRANSFORMERS: &[TransformerSignature] = &[
    TransformerSignature { name: "sortBy", block_type: "lists_sort_with_comparator", param_count: 1, result: Signature::List },
    TransformerSignature { name: "filter", block_type: "lists_filter", param_count: 1, result: Signature::List },
    TransformerSignature { name: "map", block_type: "lists_map", param_count: 1, result: Signature::List },
    TransformerSignature { name: "reduce", block_type: "lists_reduce", param_count: 2, result: Signature::Any },
    TransformerSignature { name: "sort", block_type: "lists_sort_comparator", param_count: 2, result: Signature::List },
    TransformerSignature { name: "max", block_type: "lists_max", param_count: 2, result: Signature::Any },
    TransformerSignature { name: "min", block_type: "lists_min", param_count: 2, result: Signature::Any },
    TransformerSignature { name: "sortByKey", block_type: "lists_sort_key", param_count: 1, result: Signature::List },
];

pub fn lookup_transformer(name: &str) -> Option<TransformerSignature> {
    TRANSFORMERS.iter().copied().find(|t| t.name == name)
}

pub fn test_transformer(name: &str, args_count: usize) -> bool {
    match lookup_transformer(name) {
        Some(sig) => arity_ok(sig.param_count, args_count),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_by_takes_one_comparator() {
        let sig = lookup_transformer("sortBy").unwrap();
        assert_eq!(sig.param_count, 1);
        assert!(test_transformer("sortBy", 1));
        assert!(!test_transformer("sortBy", 2));
    }
}
