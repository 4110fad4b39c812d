use loom_ast::Signature;

/// Arity for a catalog entry: a non-negative count means an exact match, a
/// negative count `-n` means "at least `n`" (variadic tail).
pub fn arity_ok(param_count: i32, args_count: usize) -> bool {
    if param_count >= 0 {
        args_count as i32 == param_count
    } else {
        args_count as i32 >= -param_count
    }
}

/// A builtin free function resolved through `FuncCall`, independent of any
/// receiver value.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub block_type: &'static str,
    /// The `OP` dropdown field value distinguishing this entry from its
    /// siblings when several builtins share one `block_type` (App
    /// Inventor's `math_single`/`math_trig`/`math_convert_angles`/
    /// `math_convert_number`/`math_on_list` each carry an operator
    /// dropdown rather than a dedicated block per operation). `None` when
    /// `block_type` is unique to this entry.
    pub op_code: Option<&'static str>,
    pub param_count: i32,
    pub result: Signature,
}

const BUILTINS: &[BuiltinSignature] = &[
    // math
    BuiltinSignature { name: "abs", block_type: "math_single", op_code: Some("ABS"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "sqrt", block_type: "math_single", op_code: Some("ROOT"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "log", block_type: "math_single", op_code: Some("LOG"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "exp", block_type: "math_single", op_code: Some("EXP"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "floor", block_type: "math_single", op_code: Some("FLOOR"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "ceiling", block_type: "math_single", op_code: Some("CEILING"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "round", block_type: "math_single", op_code: Some("ROUND"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "sin", block_type: "math_trig", op_code: Some("SIN"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "cos", block_type: "math_trig", op_code: Some("COS"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "tan", block_type: "math_trig", op_code: Some("TAN"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "asin", block_type: "math_trig", op_code: Some("ASIN"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "acos", block_type: "math_trig", op_code: Some("ACOS"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "atan", block_type: "math_trig", op_code: Some("ATAN"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "atan2", block_type: "math_atan2", op_code: None, param_count: 2, result: Signature::Number },
    BuiltinSignature { name: "degreesToRadians", block_type: "math_convert_angles", op_code: Some("DEGREES_TO_RADIANS"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "radiansToDegrees", block_type: "math_convert_angles", op_code: Some("RADIANS_TO_DEGREES"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "decimalToHex", block_type: "math_convert_number", op_code: Some("DEC_TO_HEX"), param_count: 1, result: Signature::Text },
    BuiltinSignature { name: "hexToDecimal", block_type: "math_convert_number", op_code: Some("HEX_TO_DEC"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "decimalToBinary", block_type: "math_convert_number", op_code: Some("DEC_TO_BIN"), param_count: 1, result: Signature::Text },
    BuiltinSignature { name: "binaryToDecimal", block_type: "math_convert_number", op_code: Some("BIN_TO_DEC"), param_count: 1, result: Signature::Number },
    BuiltinSignature { name: "random", block_type: "math_random_int", op_code: None, param_count: 2, result: Signature::Number },
    BuiltinSignature { name: "randomFraction", block_type: "math_random_float", op_code: None, param_count: 0, result: Signature::Number },
    BuiltinSignature { name: "setRandSeed", block_type: "math_random_set_seed", op_code: None, param_count: 1, result: Signature::Void },
    BuiltinSignature { name: "min", block_type: "math_on_list", op_code: Some("MIN"), param_count: -1, result: Signature::Number },
    BuiltinSignature { name: "max", block_type: "math_on_list", op_code: Some("MAX"), param_count: -1, result: Signature::Number },
    BuiltinSignature { name: "sum", block_type: "math_on_list", op_code: Some("SUM"), param_count: -1, result: Signature::Number },
    BuiltinSignature { name: "average", block_type: "math_on_list", op_code: Some("AVERAGE"), param_count: -1, result: Signature::Number },
    // io / screen lifecycle
    BuiltinSignature { name: "println", block_type: "controls_eval_but_ignore", op_code: None, param_count: 1, result: Signature::Void },
    BuiltinSignature { name: "isEmpty", block_type: "control_is_empty", op_code: None, param_count: 1, result: Signature::Bool },
    BuiltinSignature { name: "openScreen", block_type: "control_openAnotherScreen", op_code: None, param_count: 1, result: Signature::Void },
    BuiltinSignature { name: "openScreenWithValue", block_type: "control_openAnotherScreenWithStartValue", op_code: None, param_count: 2, result: Signature::Void },
    BuiltinSignature { name: "closeScreen", block_type: "control_closeScreen", op_code: None, param_count: 0, result: Signature::Void },
    BuiltinSignature { name: "closeScreenWithValue", block_type: "control_closeScreenWithValue", op_code: None, param_count: 1, result: Signature::Void },
    BuiltinSignature { name: "closeApp", block_type: "control_closeApplication", op_code: None, param_count: 0, result: Signature::Void },
    BuiltinSignature { name: "getStartValue", block_type: "control_getStartValue", op_code: None, param_count: 0, result: Signature::Any },
    BuiltinSignature { name: "getPlainStartText", block_type: "control_getPlainStartText", op_code: None, param_count: 0, result: Signature::Text },
    // containers
    BuiltinSignature { name: "copyList", block_type: "lists_copy", op_code: None, param_count: 1, result: Signature::List },
    BuiltinSignature { name: "copyDict", block_type: "dictionaries_copy", op_code: None, param_count: 1, result: Signature::Dict },
    BuiltinSignature { name: "makeColor", block_type: "color_make_color", op_code: None, param_count: 1, result: Signature::Any },
    BuiltinSignature { name: "splitColor", block_type: "color_split_color", op_code: None, param_count: 1, result: Signature::List },
    // generic component reflection
    BuiltinSignature { name: "get", block_type: "component_set_get", op_code: Some("GET"), param_count: 3, result: Signature::Any },
    BuiltinSignature { name: "set", block_type: "component_set_get", op_code: Some("SET"), param_count: 4, result: Signature::Void },
    BuiltinSignature { name: "call", block_type: "component_method", op_code: None, param_count: -3, result: Signature::Any },
    BuiltinSignature { name: "every", block_type: "component_all_component_blocks", op_code: None, param_count: 1, result: Signature::List },
];

/// Looks up a builtin function by name. Returns `None` for anything not
/// registered, which the resolver reports as an unknown-call error rather
/// than falling back to a generic/untyped call node.
pub fn lookup_builtin(name: &str) -> Option<BuiltinSignature> {
    BUILTINS.iter().copied().find(|b| b.name == name)
}

/// Looks up a builtin function by its lowered `block_type` and, when more
/// than one builtin shares that block type (the `OP`-dropdown block
/// families), the block's `OP` field value. Iterates the same table
/// `lookup_builtin` does rather than a hand-kept name list, so it can never
/// drift out of sync as `BUILTINS` grows.
pub fn lookup_builtin_by_block_type(block_type: &str, op: Option<&str>) -> Option<BuiltinSignature> {
    let mut matches = BUILTINS.iter().copied().filter(|b| b.block_type == block_type);
    let first = matches.next()?;
    if matches.next().is_none() {
        return Some(first);
    }
    let op = op?;
    BUILTINS.iter().copied().find(|b| b.block_type == block_type && b.op_code == Some(op))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_arity_rejects_mismatch() {
        assert!(arity_ok(2, 2));
        assert!(!arity_ok(2, 3));
    }

    #[test]
    fn variadic_arity_accepts_minimum_and_above() {
        assert!(arity_ok(-1, 1));
        assert!(arity_ok(-1, 5));
        assert!(!arity_ok(-1, 0));
    }

    #[test]
    fn lookup_known_builtin() {
        let sig = lookup_builtin("abs").unwrap();
        assert_eq!(sig.result, Signature::Number);
    }

    #[test]
    fn lookup_unknown_builtin_is_none() {
        assert!(lookup_builtin("notARealBuiltin").is_none());
    }

    #[test]
    fn block_type_lookup_disambiguates_shared_math_single_by_op() {
        assert_eq!(lookup_builtin_by_block_type("math_single", Some("ROOT")).unwrap().name, "sqrt");
        assert_eq!(lookup_builtin_by_block_type("math_single", Some("ABS")).unwrap().name, "abs");
    }

    #[test]
    fn block_type_lookup_needs_no_op_when_unambiguous() {
        assert_eq!(lookup_builtin_by_block_type("control_is_empty", None).unwrap().name, "isEmpty");
    }
}
