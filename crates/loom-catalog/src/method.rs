use loom_ast::Signature;

use crate::builtin::arity_ok;

/// The primitive-value module a receiver method belongs to, used both to
/// disambiguate same-named methods across modules and to route lowering to
/// the right block-type family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Text,
    List,
    Dict,
    Matrix,
}

/// An entry in the method-on-receiver table: `receiver.name(args...)`.
#[derive(Debug, Clone, Copy)]
pub struct MethodSignature {
    pub module: Module,
    pub name: &'static str,
    pub block_type: &'static str,
    /// The `OP` dropdown field value distinguishing this entry from a
    /// sibling sharing the same `block_type` (e.g. `text_changeCase`'s
    /// upcase/downcase dropdown). `None` when `block_type` is unique.
    pub op_code: Option<&'static str>,
    pub param_count: i32,
    pub consumable: bool,
    pub result: Signature,
}

const METHODS: &[MethodSignature] = &[
    // text
    MethodSignature { module: Module::Text, name: "textLen", block_type: "text_length", op_code: None, param_count: 0, consumable: true, result: Signature::Number },
    MethodSignature { module: Module::Text, name: "trim", block_type: "text_trim", op_code: None, param_count: 0, consumable: true, result: Signature::Text },
    MethodSignature { module: Module::Text, name: "uppercase", block_type: "text_changeCase", op_code: Some("UPCASE"), param_count: 0, consumable: true, result: Signature::Text },
    MethodSignature { module: Module::Text, name: "lowercase", block_type: "text_changeCase", op_code: Some("DOWNCASE"), param_count: 0, consumable: true, result: Signature::Text },
    MethodSignature { module: Module::Text, name: "startsWith", block_type: "text_starts_at", op_code: None, param_count: 1, consumable: true, result: Signature::Bool },
    MethodSignature { module: Module::Text, name: "contains", block_type: "text_contains", op_code: None, param_count: 1, consumable: true, result: Signature::Bool },
    MethodSignature { module: Module::Text, name: "split", block_type: "text_split", op_code: None, param_count: 1, consumable: true, result: Signature::List },
    MethodSignature { module: Module::Text, name: "replace", block_type: "text_replace_all", op_code: None, param_count: 2, consumable: true, result: Signature::Text },
    // list
    MethodSignature { module: Module::List, name: "listLen", block_type: "lists_length", op_code: None, param_count: 0, consumable: true, result: Signature::Number },
    MethodSignature { module: Module::List, name: "add", block_type: "lists_add_items", op_code: None, param_count: -1, consumable: false, result: Signature::Void },
    MethodSignature { module: Module::List, name: "containsItem", block_type: "lists_is_in", op_code: None, param_count: 1, consumable: true, result: Signature::Bool },
    MethodSignature { module: Module::List, name: "indexOf", block_type: "lists_position_in", op_code: None, param_count: 1, consumable: true, result: Signature::Number },
    MethodSignature { module: Module::List, name: "insert", block_type: "lists_insert_item", op_code: None, param_count: 2, consumable: false, result: Signature::Void },
    MethodSignature { module: Module::List, name: "remove", block_type: "lists_remove_item", op_code: None, param_count: 1, consumable: false, result: Signature::Void },
    // dict
    MethodSignature { module: Module::Dict, name: "dictLen", block_type: "dictionaries_length", op_code: None, param_count: 0, consumable: true, result: Signature::Number },
    MethodSignature { module: Module::Dict, name: "get", block_type: "dictionaries_lookup", op_code: None, param_count: 2, consumable: true, result: Signature::Any },
    MethodSignature { module: Module::Dict, name: "set", block_type: "dictionaries_set_pair", op_code: None, param_count: 2, consumable: false, result: Signature::Void },
    MethodSignature { module: Module::Dict, name: "delete", block_type: "dictionaries_delete_pair", op_code: None, param_count: 1, consumable: false, result: Signature::Void },
    // matrix
    MethodSignature { module: Module::Matrix, name: "row", block_type: "matrices_get_row", op_code: None, param_count: 1, consumable: true, result: Signature::List },
    MethodSignature { module: Module::Matrix, name: "col", block_type: "matrices_get_column", op_code: None, param_count: 1, consumable: true, result: Signature::List },
    MethodSignature { module: Module::Matrix, name: "dimension", block_type: "matrices_get_dims", op_code: None, param_count: 0, consumable: true, result: Signature::List },
];

/// Looks up a receiver method, independent of which module it belongs to.
/// Method names do not collide across modules in this table, so a bare
/// name lookup is unambiguous; callers that already know the receiver's
/// module should additionally check `.module` against the expected one.
pub fn lookup_method(name: &str) -> Option<MethodSignature> {
    METHODS.iter().copied().find(|m| m.name == name)
}

/// Looks up a receiver method by its lowered `block_type` and, for the one
/// pair that shares a block type (`uppercase`/`lowercase`), the block's `OP`
/// field. Mirrors `builtin::lookup_builtin_by_block_type`.
pub fn lookup_method_by_block_type(block_type: &str, op: Option<&str>) -> Option<MethodSignature> {
    let mut matches = METHODS.iter().copied().filter(|m| m.block_type == block_type);
    let first = matches.next()?;
    if matches.next().is_none() {
        return Some(first);
    }
    let op = op?;
    METHODS.iter().copied().find(|m| m.block_type == block_type && m.op_code == Some(op))
}

pub fn test_signature(method_name: &str, args_count: usize) -> bool {
    match lookup_method(method_name) {
        Some(sig) => arity_ok(sig.param_count, args_count),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_dimension_is_present_despite_original_dispatch_gap() {
        // method/call.go registers "dimension" in its signatures table, but
        // method/matrix.go's dispatch switch never handles it - only
        // matrices_get_row/matrices_get_column are wired up there. Shipping
        // `dimension` here closes that gap rather than reproducing it.
        let sig = lookup_method("dimension").unwrap();
        assert_eq!(sig.module, Module::Matrix);
        assert_eq!(sig.block_type, "matrices_get_dims");
    }

    #[test]
    fn block_type_lookup_disambiguates_change_case_by_op() {
        assert_eq!(lookup_method_by_block_type("text_changeCase", Some("UPCASE")).unwrap().name, "uppercase");
        assert_eq!(lookup_method_by_block_type("text_changeCase", Some("DOWNCASE")).unwrap().name, "lowercase");
    }

    #[test]
    fn arity_validation_respects_variadic_add() {
        assert!(test_signature("add", 1));
        assert!(test_signature("add", 4));
        assert!(!test_signature("textLen", 1));
    }
}
