use loom_ast::common::{BinaryExpr, Call, FuncCall, ListTransform, Question, Transform};
use loom_ast::components::{
    Event, EveryComponent, GenericEvent, GenericMethodCall, GenericPropertyGet, GenericPropertySet,
    MethodCall, PropertyGet, PropertySet,
};
use loom_ast::control::{Break, Do, Each, EachPair, For, If, While};
use loom_ast::fundamentals::{
    Boolean, Color, Component, Dictionary, EmptySocket, HelperDropdown, ListLit, Not, Number, Pair,
    SmartBody, Text, WalkAll,
};
use loom_ast::procedures::{ProcCall, RetProcedure, VoidProcedure};
use loom_ast::variables::{GlobalDecl, Get, Set, SimpleVar, Var, VarResult};
use loom_ast::{Expr, Signature};
use loom_catalog::lookup_transformer;
use loom_common::TokenKind;

use crate::error::{BlocksError, BlocksErrorKind};
use crate::model::Block;

type Result<T> = std::result::Result<T, BlocksError>;

fn missing_field(block_type: &str, field: &str) -> BlocksError {
    BlocksError::new(BlocksErrorKind::MissingField { block_type: block_type.into(), field: field.into() })
}

fn missing_value(block_type: &str, socket: &str) -> BlocksError {
    BlocksError::new(BlocksErrorKind::MissingValue { block_type: block_type.into(), socket: socket.into() })
}

fn missing_statement(block_type: &str, socket: &str) -> BlocksError {
    BlocksError::new(BlocksErrorKind::MissingStatement { block_type: block_type.into(), socket: socket.into() })
}

fn missing_mutation(block_type: &str) -> BlocksError {
    BlocksError::new(BlocksErrorKind::MissingMutation { block_type: block_type.into() })
}

fn required_field<'a>(block: &'a Block, field: &str) -> Result<&'a str> {
    block.field(field).ok_or_else(|| missing_field(&block.block_type, field))
}

fn required_value(block: &Block, socket: &str) -> Result<Expr> {
    block.value(socket).map(from_block).transpose()?.ok_or_else(|| missing_value(&block.block_type, socket))
}

fn optional_value(block: &Block, socket: &str) -> Result<Expr> {
    match block.value(socket) {
        Some(b) => from_block(b),
        None => Ok(Expr::EmptySocket(EmptySocket)),
    }
}

fn required_statement(block: &Block, socket: &str) -> Result<Expr> {
    block
        .statement(socket)
        .map(from_block)
        .transpose()?
        .ok_or_else(|| missing_statement(&block.block_type, socket))
}

fn optional_statement(block: &Block, socket: &str) -> Result<Expr> {
    match block.statement(socket) {
        Some(b) => from_block(b),
        None => Ok(Expr::EmptySocket(EmptySocket)),
    }
}

/// Reconstructs an `Expr` from one `Block`, following its `next` chain when
/// present to rebuild a statement sequence. The reverse of [`crate::lower::to_block`];
/// kept as one large match for the same auditability reason.
pub fn from_block(block: &Block) -> Result<Expr> {
    let head = from_single_block(block)?;
    match &block.next {
        Some(next) => {
            let rest = from_block(&next.block)?;
            // Flatten a chained `rest` back into one statement sequence
            // instead of nesting `SmartBody`s, undoing `build_statement_chain`.
            let mut body = vec![head];
            match rest {
                Expr::SmartBody(sb) if !sb.is_all_pairs() => body.extend(sb.body),
                other => body.push(other),
            }
            Ok(Expr::SmartBody(SmartBody { body }))
        }
        None => Ok(head),
    }
}

fn from_single_block(block: &Block) -> Result<Expr> {
    match block.block_type.as_str() {
        "logic_boolean" => {
            let value = required_field(block, "BOOL")?;
            Ok(Expr::Boolean(Boolean { value: value == "TRUE" }))
        }
        "math_number" => Ok(Expr::Number(Number { content: required_field(block, "NUM")?.to_string() })),
        "text" => Ok(Expr::Text(Text { content: required_field(block, "TEXT")?.to_string() })),
        "color_picker" => Ok(Expr::Color(Color { hex: required_field(block, "COLOR")?.to_string() })),
        "lists_create_with" => {
            let items = block.mutation.as_ref().and_then(|m| m.items).unwrap_or(block.values.len());
            let mut out = Vec::with_capacity(items);
            for i in 0..items {
                out.push(optional_value(block, &format!("ADD{i}"))?);
            }
            Ok(Expr::ListLit(ListLit { items: out }))
        }
        "pair" => Ok(Expr::Pair(Pair {
            key: Box::new(optional_value(block, "KEY")?),
            value: Box::new(optional_value(block, "VALUE")?),
        })),
        "dictionaries_create_with" => {
            let items = block.mutation.as_ref().and_then(|m| m.items).unwrap_or(block.values.len());
            let mut pairs = Vec::with_capacity(items);
            for i in 0..items {
                pairs.push(required_value(block, &format!("ADD{i}"))?);
            }
            Ok(Expr::Dictionary(Dictionary { pairs }))
        }
        "component_component_block" => {
            let component_type = block.mutation.as_ref().and_then(|m| m.component_type.clone()).unwrap_or_default();
            Ok(Expr::Component(Component {
                name: required_field(block, "COMPONENT_SELECTOR")?.to_string(),
                component_type,
            }))
        }
        "helpers_dropdown" => {
            let key = block
                .mutation
                .as_ref()
                .and_then(|m| m.key.clone())
                .ok_or_else(|| missing_mutation(&block.block_type))?;
            Ok(Expr::HelperDropdown(HelperDropdown { key, option: required_field(block, "OPTION")?.to_string() }))
        }
        "control_all_component_instances" => Ok(Expr::WalkAll(WalkAll)),
        "logic_negate" => Ok(Expr::Not(Not { expr: Box::new(optional_value(block, "BOOL")?) })),

        "global_declaration" => Ok(Expr::GlobalDecl(GlobalDecl {
            name: required_field(block, "NAME")?.to_string(),
            value: Box::new(optional_value(block, "VALUE")?),
        })),
        "lexical_variable_get" => {
            let raw = required_field(block, "VAR")?;
            let (global, name) = split_var_ref(raw);
            let value_signature = if block.mutation.is_some() { Signature::EventParam } else { Signature::Any };
            Ok(Expr::Get(Get { global, name, value_signature }))
        }
        "lexical_variable_set" => {
            let raw = required_field(block, "VAR")?;
            let (global, name) = split_var_ref(raw);
            Ok(Expr::Set(Set { global, name, value: Box::new(optional_value(block, "VALUE")?) }))
        }
        "local_declaration_statement" | "local_declaration_expression" => from_local_declaration(block),

        "controls_if" => {
            let elseif = block.mutation.as_ref().and_then(|m| m.elseif).unwrap_or(0);
            let has_else = block.mutation.as_ref().and_then(|m| m.has_else).unwrap_or(0) != 0;
            // Rebuilds the `else_branch` nesting `lower_if` flattened: start
            // from the trailing `ELSE` (if any) and fold `IF{i}`/`DO{i}`
            // sockets inward from the last `elseif` index down to 0, each
            // wrapping the previously built `If` as its own else branch.
            let mut tail = if has_else { Some(optional_statement(block, "ELSE")?) } else { None };
            for idx in (0..=elseif).rev() {
                let condition = Box::new(optional_value(block, &format!("IF{idx}"))?);
                let then_branch = Box::new(optional_statement(block, &format!("DO{idx}"))?);
                let else_branch = tail.take().map(Box::new);
                tail = Some(Expr::If(If { condition, then_branch, else_branch }));
            }
            Ok(tail.expect("loop runs at least once for idx == 0"))
        }
        "controls_forRange" => Ok(Expr::For(For {
            index_name: required_field(block, "VAR")?.to_string(),
            from: Box::new(optional_value(block, "START")?),
            to: Box::new(optional_value(block, "END")?),
            by: Box::new(optional_value(block, "STEP")?),
            body: Box::new(optional_statement(block, "DO")?),
        })),
        "controls_forEach" => Ok(Expr::Each(Each {
            item_name: required_field(block, "VAR")?.to_string(),
            iterable: Box::new(optional_value(block, "LIST")?),
            body: Box::new(optional_statement(block, "DO")?),
        })),
        "controls_for_each_dict" => Ok(Expr::EachPair(EachPair {
            key_name: required_field(block, "KEY")?.to_string(),
            value_name: required_field(block, "VALUE")?.to_string(),
            iterable: Box::new(optional_value(block, "DICT")?),
            body: Box::new(optional_statement(block, "DO")?),
        })),
        "controls_while" => Ok(Expr::While(While {
            condition: Box::new(optional_value(block, "TEST")?),
            body: Box::new(optional_statement(block, "DO")?),
        })),
        "controls_do_then_return" => Ok(Expr::Do(Do {
            body: Box::new(optional_statement(block, "STM")?),
            result: Box::new(optional_value(block, "VALUE")?),
        })),
        "controls_break" => Ok(Expr::Break(Break)),

        "logic_operation" | "logic_compare" | "math_compare" | "math_arithmetic" => from_binary(block),
        "text_join" => {
            let items = block.mutation.as_ref().and_then(|m| m.items).unwrap_or(block.values.len());
            let mut operands = Vec::with_capacity(items);
            for i in 0..items {
                operands.push(optional_value(block, &format!("ADD{i}"))?);
            }
            Ok(Expr::BinaryExpr(BinaryExpr { op: TokenKind::Underscore, spelling: "_".into(), operands }))
        }
        "control_ternary" => Ok(Expr::Question(Question {
            condition: Box::new(optional_value(block, "IF")?),
            then_value: Box::new(optional_value(block, "THEN")?),
            else_value: Box::new(optional_value(block, "ELSE")?),
        })),
        "type_transform" => Ok(Expr::Transform(Transform {
            source: Box::new(optional_value(block, "VALUE")?),
            target_type: required_field(block, "TARGET")?.to_string(),
            result_signature: Signature::Any,
        })),

        "component_event" => from_component_event(block),
        "component_method" => from_component_method(block),
        "component_set_get" => from_component_set_get(block),
        "component_all_component_blocks" => Ok(Expr::EveryComponent(EveryComponent {
            component_type: block.mutation.as_ref().and_then(|m| m.component_type.clone()).unwrap_or_default(),
        })),

        "procedures_defnoreturn" => Ok(Expr::VoidProcedure(VoidProcedure {
            name: required_field(block, "NAME")?.to_string(),
            parameters: procedure_params(block),
            body: Box::new(optional_statement(block, "STACK")?),
        })),
        "procedures_defreturn" => Ok(Expr::RetProcedure(RetProcedure {
            name: required_field(block, "NAME")?.to_string(),
            parameters: procedure_params(block),
            body: Box::new(optional_value(block, "RETURN")?),
            result_signature: Signature::Any,
        })),
        "procedures_callnoreturn" | "procedures_callreturn" => {
            let args = call_args(block)?;
            Ok(Expr::ProcCall(ProcCall {
                name: required_field(block, "NAME")?.to_string(),
                args,
                result_signature: if block.block_type == "procedures_callnoreturn" { Signature::Void } else { Signature::Any },
            }))
        }

        other if other.starts_with("helpers_") => {
            // Unknown `helpers_*` block: default to a text literal bearing
            // the block's single field, rather than failing reconstruction.
            let content = block.fields.first().map(|f| f.text.clone()).unwrap_or_default();
            Ok(Expr::Text(Text { content }))
        }
        other => from_catalog_block(block, other),
    }
}

fn split_var_ref(raw: &str) -> (bool, String) {
    match raw.strip_prefix("global ") {
        Some(rest) => (true, rest.to_string()),
        None => (false, raw.to_string()),
    }
}

fn from_local_declaration(block: &Block) -> Result<Expr> {
    let mutation = block.mutation.as_ref().ok_or_else(|| missing_mutation(&block.block_type))?;
    let names: Vec<String> = mutation.local_names.iter().map(|n| n.name.clone()).collect();
    let mut values = Vec::with_capacity(names.len());
    for i in 0..names.len() {
        values.push(optional_value(block, &format!("DECL{i}"))?);
    }
    let is_expression = block.block_type == "local_declaration_expression";
    let trailing = if is_expression { optional_value(block, "RETURN")? } else { optional_statement(block, "STACK")? };

    if names.len() == 1 {
        return Ok(Expr::SimpleVar(SimpleVar {
            name: names.into_iter().next().expect("len == 1"),
            value: Box::new(values.into_iter().next().expect("len == 1")),
            body: Box::new(trailing),
        }));
    }
    if is_expression {
        Ok(Expr::VarResult(VarResult { names, values, result: Box::new(trailing) }))
    } else {
        Ok(Expr::Var(Var { names, values, body: Box::new(trailing) }))
    }
}

fn from_binary(block: &Block) -> Result<Expr> {
    let code = required_field(block, "OP")?.to_string();
    let op = token_kind_for_field_code(&block.block_type, &code);
    let spelling = spelling_for(op);
    let a = optional_value(block, "A")?;
    let b = optional_value(block, "B")?;
    // Nested `A` blocks of the same shape are folded back into one N-ary
    // node, undoing the pairwise fold `to_block` performed.
    if let Expr::BinaryExpr(inner) = a {
        if inner.op == op {
            let mut operands = inner.operands;
            operands.push(b);
            return Ok(Expr::BinaryExpr(BinaryExpr { op, spelling, operands }));
        }
        let mut operands = vec![Expr::BinaryExpr(inner)];
        operands.push(b);
        return Ok(Expr::BinaryExpr(BinaryExpr { op, spelling, operands }));
    }
    Ok(Expr::BinaryExpr(BinaryExpr { op, spelling, operands: vec![a, b] }))
}

fn token_kind_for_field_code(block_type: &str, code: &str) -> TokenKind {
    use TokenKind::*;
    match (block_type, code) {
        ("logic_operation", "OR") => LogicOr,
        ("logic_operation", "AND") => LogicAnd,
        ("logic_compare", "EQ") => Equals,
        ("logic_compare", "NEQ") => NotEquals,
        ("math_compare", "LT") => LessThan,
        ("math_compare", "GT") => GreatThan,
        ("math_compare", "GTE") => GreaterThanEqual,
        ("math_arithmetic", "ADD") => Plus,
        ("math_arithmetic", "MINUS") => Dash,
        ("math_arithmetic", "MULTIPLY") => Times,
        ("math_arithmetic", "DIVIDE") => Slash,
        ("math_arithmetic", "POWER") => Power,
        ("math_arithmetic", "MODULO") => Remainder,
        ("math_arithmetic", "BITWISE_OR") => BitwiseOr,
        ("math_arithmetic", "BITWISE_AND") => BitwiseAnd,
        ("math_arithmetic", "BITWISE_XOR") => BitwiseXor,
        _ => Plus,
    }
}

fn spelling_for(op: TokenKind) -> String {
    use TokenKind::*;
    match op {
        Plus => "+", Dash => "-", Times => "*", Slash => "/", Power => "^", Remainder => "%",
        BitwiseOr => "|", BitwiseAnd => "&", BitwiseXor => "~",
        LogicOr => "||", LogicAnd => "&&",
        Equals => "==", NotEquals => "!=", TextEquals => "===", TextNotEquals => "!==",
        LessThan => "<", LessThanEqual => "<=", GreatThan => ">", GreaterThanEqual => ">=",
        TextLessThan => "<<", TextGreaterThan => ">>",
        Underscore => "_",
        _ => "+",
    }.to_string()
}

fn from_component_event(block: &Block) -> Result<Expr> {
    let mutation = block.mutation.as_ref().ok_or_else(|| missing_mutation(&block.block_type))?;
    let component_type = mutation.component_type.clone().unwrap_or_default();
    let event_name = mutation.event_name.clone().unwrap_or_default();
    let body = Box::new(optional_statement(block, "DO")?);
    if mutation.is_generic == Some(true) {
        Ok(Expr::GenericEvent(GenericEvent { component_type, event_name, body }))
    } else {
        Ok(Expr::Event(Event {
            instance_name: mutation.instance_name.clone().unwrap_or_default(),
            event_name,
            component_type,
            body,
        }))
    }
}

fn call_args(block: &Block) -> Result<Vec<Expr>> {
    let mut args = Vec::new();
    let mut i = 0;
    while let Some(v) = block.value(&format!("ARG{i}")) {
        args.push(from_block(v)?);
        i += 1;
    }
    Ok(args)
}

fn procedure_params(block: &Block) -> Vec<String> {
    block.mutation.as_ref().map(|m| m.args.iter().map(|a| a.name.clone()).collect()).unwrap_or_default()
}

fn from_component_method(block: &Block) -> Result<Expr> {
    let mutation = block.mutation.as_ref().ok_or_else(|| missing_mutation(&block.block_type))?;
    let method_name = mutation.method_name.clone().unwrap_or_default();
    let args = call_args(block)?;
    if mutation.is_generic == Some(true) {
        Ok(Expr::GenericMethodCall(GenericMethodCall {
            component_type: mutation.component_type.clone().unwrap_or_default(),
            component: Box::new(optional_value(block, "COMPONENT")?),
            method_name,
            args,
            result_signature: Signature::Any,
        }))
    } else {
        let receiver = Box::new(Expr::Component(Component {
            name: mutation.instance_name.clone().unwrap_or_default(),
            component_type: mutation.component_type.clone().unwrap_or_default(),
        }));
        Ok(Expr::MethodCall(MethodCall { receiver, method_name, args, result_signature: Signature::Any }))
    }
}

fn from_component_set_get(block: &Block) -> Result<Expr> {
    let mutation = block.mutation.as_ref().ok_or_else(|| missing_mutation(&block.block_type))?;
    let property_name = mutation.property_name.clone().unwrap_or_default();
    let component_type = mutation.component_type.clone().unwrap_or_default();
    let is_set = mutation.set_or_get.as_deref() == Some("set");
    if mutation.is_generic == Some(true) {
        let component = Box::new(optional_value(block, "COMPONENT")?);
        return if is_set {
            Ok(Expr::GenericPropertySet(GenericPropertySet {
                component_type,
                component,
                property_name,
                value: Box::new(optional_value(block, "VALUE")?),
            }))
        } else {
            Ok(Expr::GenericPropertyGet(GenericPropertyGet { component_type, component, property_name, result_signature: Signature::Any }))
        };
    }
    let instance_name = mutation.instance_name.clone().unwrap_or_default();
    let receiver = Box::new(Expr::Component(Component { name: instance_name.clone(), component_type: component_type.clone() }));
    if is_set {
        Ok(Expr::PropertySet(PropertySet { instance_name, receiver, property_name, value: Box::new(optional_value(block, "VALUE")?) }))
    } else {
        Ok(Expr::PropertyGet(PropertyGet { receiver, property_name, result_signature: Signature::Any }))
    }
}

/// Dispatches any block type not handled above through the builtin,
/// method, and transformer catalogs, in that order. Each catalog's own
/// by-block-type lookup is used directly (rather than a locally maintained
/// name list), so a new catalog entry never needs a matching update here.
fn from_catalog_block(block: &Block, block_type: &str) -> Result<Expr> {
    if let Some(sig) = loom_catalog::lookup_builtin_by_block_type(block_type, block.field("OP")) {
        let args = call_args(block)?;
        return Ok(Expr::FuncCall(FuncCall { name: sig.name.to_string(), args, result_signature: sig.result }));
    }
    if let Some(sig) = loom_catalog::lookup_method_by_block_type(block_type, block.field("OP")) {
        let receiver = Box::new(optional_value(block, "VALUE")?);
        let args = call_args(block)?;
        return Ok(Expr::Call(Call { receiver, method: sig.name.to_string(), args, result_signature: sig.result }));
    }
    if let Some(sig) = lookup_transformer_by_block_type(block_type) {
        let list = Box::new(optional_value(block, "LIST")?);
        let args = call_args(block)?;
        return Ok(Expr::ListTransform(ListTransform { list, transformer: sig.name.to_string(), args }));
    }
    Err(BlocksError::new(BlocksErrorKind::UnknownBlockType(block_type.to_string())))
}

fn lookup_transformer_by_block_type(block_type: &str) -> Option<loom_catalog::TransformerSignature> {
    ["sortBy", "filter", "map", "reduce", "sort", "max", "min", "sortByKey"]
        .into_iter()
        .filter_map(lookup_transformer)
        .find(|t| t.block_type == block_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lower::to_block;

    #[test]
    fn number_round_trips() {
        let expr = Expr::Number(Number { content: "7".into() });
        let block = to_block(&expr, false);
        assert_eq!(from_block(&block).unwrap(), expr);
    }

    #[test]
    fn nary_plus_round_trips_through_pairwise_blocks() {
        let expr = Expr::BinaryExpr(BinaryExpr {
            op: TokenKind::Plus,
            spelling: "+".into(),
            operands: vec![
                Expr::Number(Number { content: "1".into() }),
                Expr::Number(Number { content: "2".into() }),
                Expr::Number(Number { content: "3".into() }),
            ],
        });
        let block = to_block(&expr, false);
        let back = from_block(&block).unwrap();
        match back {
            Expr::BinaryExpr(b) => assert_eq!(b.operands.len(), 3),
            other => panic!("expected BinaryExpr, got {other:?}"),
        }
    }

    #[test]
    fn unknown_block_type_is_an_error() {
        let block = Block::new("not_a_real_block");
        assert!(matches!(from_block(&block).unwrap_err().kind, BlocksErrorKind::UnknownBlockType(_)));
    }

    #[test]
    fn unrecognized_helpers_block_falls_back_to_text() {
        let block = Block::new("helpers_unknown_future_block").with_field("WHATEVER", "value");
        assert_eq!(from_block(&block).unwrap(), Expr::Text(Text { content: "value".into() }));
    }

    fn bool_lit(value: bool) -> Expr {
        Expr::Boolean(Boolean { value })
    }

    fn num_lit(content: &str) -> Expr {
        Expr::Number(Number { content: content.into() })
    }

    #[test]
    fn multi_branch_if_chain_round_trips_through_controls_if() {
        // if true { 1 } else if false { 2 } else if true { 3 } else { 4 }
        let expr = Expr::If(If {
            condition: Box::new(bool_lit(true)),
            then_branch: Box::new(num_lit("1")),
            else_branch: Some(Box::new(Expr::If(If {
                condition: Box::new(bool_lit(false)),
                then_branch: Box::new(num_lit("2")),
                else_branch: Some(Box::new(Expr::If(If {
                    condition: Box::new(bool_lit(true)),
                    then_branch: Box::new(num_lit("3")),
                    else_branch: Some(Box::new(num_lit("4"))),
                }))),
            }))),
        });
        let block = to_block(&expr, true);
        let mutation = block.mutation.as_ref().expect("controls_if carries a mutation");
        assert_eq!(mutation.elseif, Some(2));
        assert_eq!(mutation.has_else, Some(1));
        assert!(block.value("IF2").is_some());
        assert!(block.statement("DO2").is_some());
        assert!(block.statement("ELSE").is_some());
        assert_eq!(from_block(&block).unwrap(), expr);
    }

    #[test]
    fn two_way_if_has_no_elseif_sockets() {
        let expr = Expr::If(If {
            condition: Box::new(bool_lit(true)),
            then_branch: Box::new(num_lit("1")),
            else_branch: Some(Box::new(num_lit("2"))),
        });
        let block = to_block(&expr, true);
        let mutation = block.mutation.as_ref().expect("controls_if carries a mutation");
        assert_eq!(mutation.elseif, Some(0));
        assert!(block.value("IF1").is_none());
        assert_eq!(from_block(&block).unwrap(), expr);
    }

    #[test]
    fn multi_statement_if_branch_chains_through_next_not_do_then_return() {
        let expr = Expr::If(If {
            condition: Box::new(bool_lit(true)),
            then_branch: Box::new(Expr::SmartBody(SmartBody { body: vec![num_lit("1"), num_lit("2")] })),
            else_branch: None,
        });
        let block = to_block(&expr, true);
        let do0 = block.statement("DO0").expect("DO0 socket present");
        assert_eq!(do0.block_type, "math_number");
        assert!(do0.next.is_some(), "multi-statement branch should chain via `next`, not hoist into a value");
    }
}
