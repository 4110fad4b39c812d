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
use loom_common::TokenKind;

use crate::model::{Block, Mutation, NamedChild};

/// Lowers one AST node into its Block representation. `is_statement`
/// disambiguates the handful of node kinds that emit a different block
/// shape depending on whether they sit in a statement position (producing
/// a `_statement` block with a `next` chain) or an expression position
/// (producing an `_expression` block that yields a value): `SimpleVar`,
/// `Var`, `If`-as-value is never legal so it is unaffected, etc.
///
/// Kept as a single large match, per the block-dispatch convention this
/// translator follows in both directions: the full mapping is auditable in
/// one place rather than scattered across per-variant methods.
pub fn to_block(expr: &Expr, is_statement: bool) -> Block {
    match expr {
        Expr::Boolean(b) => lower_boolean(b),
        Expr::Number(n) => lower_number(n),
        Expr::Text(t) => lower_text(t),
        Expr::Color(c) => lower_color(c),
        Expr::ListLit(l) => lower_list_lit(l),
        Expr::Pair(p) => lower_pair(p),
        Expr::Dictionary(d) => lower_dictionary(d),
        Expr::Component(c) => lower_component(c),
        Expr::HelperDropdown(h) => lower_helper_dropdown(h),
        Expr::EmptySocket(e) => lower_empty_socket(e),
        Expr::WalkAll(w) => lower_walk_all(w),
        Expr::SmartBody(s) => lower_smart_body(s, is_statement),
        Expr::Not(n) => lower_not(n),

        Expr::GlobalDecl(g) => lower_global_decl(g),
        Expr::Get(g) => lower_get(g),
        Expr::Set(s) => lower_set(s),
        Expr::SimpleVar(v) => lower_simple_var(v, is_statement),
        Expr::Var(v) => lower_var(v, is_statement),
        Expr::VarResult(v) => lower_var_result(v),

        Expr::If(i) => lower_if(i),
        Expr::For(f) => lower_for(f),
        Expr::Each(e) => lower_each(e),
        Expr::EachPair(e) => lower_each_pair(e),
        Expr::While(w) => lower_while(w),
        Expr::Do(d) => lower_do(d),
        Expr::Break(b) => lower_break(b),

        Expr::BinaryExpr(b) => lower_binary(b),
        Expr::Question(q) => lower_question(q),
        Expr::Transform(t) => lower_transform(t),
        Expr::FuncCall(f) => lower_func_call(f),
        Expr::Call(c) => lower_call(c),
        Expr::ListTransform(l) => lower_list_transform(l),

        Expr::Event(e) => lower_event(e),
        Expr::GenericEvent(e) => lower_generic_event(e),
        Expr::MethodCall(m) => lower_method_call(m),
        Expr::GenericMethodCall(m) => lower_generic_method_call(m),
        Expr::PropertyGet(p) => lower_property_get(p),
        Expr::PropertySet(p) => lower_property_set(p),
        Expr::GenericPropertyGet(p) => lower_generic_property_get(p),
        Expr::GenericPropertySet(p) => lower_generic_property_set(p),
        Expr::EveryComponent(e) => lower_every_component(e),

        Expr::VoidProcedure(p) => lower_void_procedure(p),
        Expr::RetProcedure(p) => lower_ret_procedure(p),
        Expr::ProcCall(p) => lower_proc_call(p),
    }
}

/// Lowers a value-socket child, omitting the socket entirely for
/// `EmptySocket` rather than emitting a placeholder block.
fn to_value(expr: &Expr) -> Option<Block> {
    match expr {
        Expr::EmptySocket(_) => None,
        other => Some(to_block(other, false)),
    }
}

/// Lowers a statement-socket child (`DO`/`STACK`/`STM`/`ELSE`, ...). Unlike
/// `to_value`, this passes `is_statement = true` through to `to_block` so a
/// multi-element `SmartBody` lowers as a plain `next`-linked chain instead
/// of the value-position `controls_do_then_return` hoist.
fn to_statement(expr: &Expr) -> Option<Block> {
    match expr {
        Expr::EmptySocket(_) => None,
        other => Some(to_block(other, true)),
    }
}

fn lower_boolean(b: &Boolean) -> Block {
    Block::new("logic_boolean").with_field("BOOL", if b.value { "TRUE" } else { "FALSE" })
}

fn lower_number(n: &Number) -> Block {
    Block::new("math_number").with_field("NUM", n.content.clone())
}

fn lower_text(t: &Text) -> Block {
    Block::new("text").with_field("TEXT", t.content.clone())
}

fn lower_color(c: &Color) -> Block {
    Block::new("color_picker").with_field("COLOR", c.hex.clone())
}

fn lower_list_lit(l: &ListLit) -> Block {
    let mut block = Block::new("lists_create_with")
        .with_mutation(Mutation { items: Some(l.items.len()), ..Mutation::new() });
    for (i, item) in l.items.iter().enumerate() {
        block = block.with_optional_value(format!("ADD{i}"), to_value(item));
    }
    block
}

fn lower_pair(p: &Pair) -> Block {
    Block::new("pair")
        .with_optional_value("KEY", to_value(&p.key))
        .with_optional_value("VALUE", to_value(&p.value))
}

fn lower_dictionary(d: &Dictionary) -> Block {
    let mut block = Block::new("dictionaries_create_with")
        .with_mutation(Mutation { items: Some(d.pairs.len()), ..Mutation::new() });
    for (i, pair) in d.pairs.iter().enumerate() {
        block = block.with_value(format!("ADD{i}"), to_block(pair, false));
    }
    block
}

fn lower_component(c: &Component) -> Block {
    Block::new("component_component_block")
        .with_mutation(Mutation { component_type: Some(c.component_type.clone()), ..Mutation::new() })
        .with_field("COMPONENT_SELECTOR", c.name.clone())
}

fn lower_helper_dropdown(h: &HelperDropdown) -> Block {
    Block::new("helpers_dropdown")
        .with_mutation(Mutation { key: Some(h.key.clone()), ..Mutation::new() })
        .with_field("OPTION", h.option.clone())
}

fn lower_empty_socket(_: &EmptySocket) -> Block {
    // Never reached through `to_value`; only hit if `to_block` is called on
    // an `EmptySocket` directly (a caller bug, not a normal path).
    Block::new("")
}

fn lower_walk_all(_: &WalkAll) -> Block {
    Block::new("control_all_component_instances")
}

fn lower_not(n: &Not) -> Block {
    Block::new("logic_negate").with_optional_value("BOOL", to_value(&n.expr))
}

/// All-`Pair` bodies lower as a dictionary literal; in statement position
/// anything else lowers as a plain `next`-linked statement chain. In
/// expression position, a value socket can't hold a `next` chain, so a body
/// of more than one element is rewritten per the hoisting recipe: the
/// leading elements become a `controls_do_then_return`'s statement slot and
/// the trailing element becomes its value slot. A single element emits
/// inline; a local declaration in value position (`SimpleVar`/`Var`) already
/// recurses through its own nested body via `to_block`'s own dispatch, so no
/// separate case is needed for it.
fn lower_smart_body(s: &SmartBody, is_statement: bool) -> Block {
    if s.is_all_pairs() {
        let pairs = Dictionary { pairs: s.body.clone() };
        return lower_dictionary(&pairs);
    }
    if is_statement {
        return build_statement_chain(&s.body, true);
    }
    match s.body.len() {
        0 => Block::new("control_empty_body"),
        1 => to_block(&s.body[0], false),
        len => {
            let stm = build_statement_chain(&s.body[..len - 1], true);
            let value = to_value(&s.body[len - 1]);
            Block::new("controls_do_then_return").with_optional_statement("STM", Some(stm)).with_optional_value("VALUE", value)
        }
    }
}

/// Links a sequence of statement-position nodes through `next`, returning
/// the first block in the chain.
fn build_statement_chain(body: &[Expr], is_statement: bool) -> Block {
    let mut blocks: Vec<Block> = body.iter().map(|e| to_block(e, is_statement)).collect();
    while blocks.len() > 1 {
        let tail = blocks.pop().expect("len > 1");
        let head = blocks.last_mut().expect("len > 1");
        *head = std::mem::replace(head, Block::new("")).with_next(tail);
    }
    blocks.into_iter().next().unwrap_or_else(|| Block::new("control_empty_body"))
}

fn lower_global_decl(g: &GlobalDecl) -> Block {
    Block::new("global_declaration")
        .with_field("NAME", g.name.clone())
        .with_optional_value("VALUE", to_value(&g.value))
}

fn var_ref_name(global: bool, name: &str) -> String {
    if global {
        format!("global {name}")
    } else {
        name.to_string()
    }
}

fn lower_get(g: &Get) -> Block {
    let mut block = Block::new("lexical_variable_get").with_field("VAR", var_ref_name(g.global, &g.name));
    if g.value_signature == Signature::EventParam {
        block = block.with_mutation(Mutation::new());
    }
    block
}

fn lower_set(s: &Set) -> Block {
    Block::new("lexical_variable_set")
        .with_field("VAR", var_ref_name(s.global, &s.name))
        .with_optional_value("VALUE", to_value(&s.value))
}

fn lower_simple_var(v: &SimpleVar, is_statement: bool) -> Block {
    let block_type = if is_statement { "local_declaration_statement" } else { "local_declaration_expression" };
    let mut block = Block::new(block_type)
        .with_mutation(Mutation { local_names: vec![NamedChild { name: v.name.clone() }], ..Mutation::new() })
        .with_field("VAR0", v.name.clone())
        .with_optional_value("DECL0", to_value(&v.value));
    block = if is_statement {
        block.with_optional_statement("STACK", to_statement(&v.body))
    } else {
        block.with_optional_value("RETURN", to_value(&v.body))
    };
    block
}

fn lower_var(v: &Var, is_statement: bool) -> Block {
    let block_type = if is_statement { "local_declaration_statement" } else { "local_declaration_expression" };
    let mutation = Mutation {
        local_names: v.names.iter().map(|n| NamedChild { name: n.clone() }).collect(),
        ..Mutation::new()
    };
    let mut block = Block::new(block_type).with_mutation(mutation);
    for (i, (name, value)) in v.names.iter().zip(v.values.iter()).enumerate() {
        block = block.with_field(format!("VAR{i}"), name.clone()).with_optional_value(format!("DECL{i}"), to_value(value));
    }
    block = if is_statement {
        block.with_optional_statement("STACK", to_statement(&v.body))
    } else {
        block.with_optional_value("RETURN", to_value(&v.body))
    };
    block
}

fn lower_var_result(v: &VarResult) -> Block {
    let mutation = Mutation {
        local_names: v.names.iter().map(|n| NamedChild { name: n.clone() }).collect(),
        ..Mutation::new()
    };
    let mut block = Block::new("local_declaration_expression").with_mutation(mutation);
    for (i, (name, value)) in v.names.iter().zip(v.values.iter()).enumerate() {
        block = block.with_field(format!("VAR{i}"), name.clone()).with_optional_value(format!("DECL{i}"), to_value(value));
    }
    block.with_optional_value("RETURN", to_value(&v.result))
}

/// `if c0 {..} else if c1 {..} else if c2 {..} else {..}` parses as a chain
/// of nested `If`s (one `else_branch` per `else if`), each carrying only a
/// single condition/then/else slot; `controls_if` instead wants parallel
/// `IF0..IFk`/`DO0..DOk` sockets plus one trailing `ELSE`. This walks the
/// `else_branch` chain to flatten it rather than widening `If` itself.
fn lower_if(i: &If) -> Block {
    let mut conditions = vec![i.condition.as_ref()];
    let mut branches = vec![i.then_branch.as_ref()];
    let mut tail = i.else_branch.as_deref();
    while let Some(Expr::If(next)) = tail {
        conditions.push(next.condition.as_ref());
        branches.push(next.then_branch.as_ref());
        tail = next.else_branch.as_deref();
    }
    let elseif = conditions.len() - 1;
    let mut block = Block::new("controls_if").with_mutation(Mutation {
        elseif: Some(elseif),
        has_else: Some(tail.is_some() as usize),
        ..Mutation::new()
    });
    for (idx, (condition, branch)) in conditions.into_iter().zip(branches).enumerate() {
        block = block
            .with_optional_value(format!("IF{idx}"), to_value(condition))
            .with_optional_statement(format!("DO{idx}"), to_statement(branch));
    }
    block.with_optional_statement("ELSE", tail.and_then(to_statement))
}

fn lower_for(f: &For) -> Block {
    Block::new("controls_forRange")
        .with_field("VAR", f.index_name.clone())
        .with_optional_value("START", to_value(&f.from))
        .with_optional_value("END", to_value(&f.to))
        .with_optional_value("STEP", to_value(&f.by))
        .with_optional_statement("DO", to_statement(&f.body))
}

fn lower_each(e: &Each) -> Block {
    Block::new("controls_forEach")
        .with_field("VAR", e.item_name.clone())
        .with_optional_value("LIST", to_value(&e.iterable))
        .with_optional_statement("DO", to_statement(&e.body))
}

fn lower_each_pair(e: &EachPair) -> Block {
    Block::new("controls_for_each_dict")
        .with_field("KEY", e.key_name.clone())
        .with_field("VALUE", e.value_name.clone())
        .with_optional_value("DICT", to_value(&e.iterable))
        .with_optional_statement("DO", to_statement(&e.body))
}

fn lower_while(w: &While) -> Block {
    Block::new("controls_while")
        .with_optional_value("TEST", to_value(&w.condition))
        .with_optional_statement("DO", to_statement(&w.body))
}

fn lower_do(d: &Do) -> Block {
    Block::new("controls_do_then_return")
        .with_optional_statement("STM", to_statement(&d.body))
        .with_optional_value("VALUE", to_value(&d.result))
}

fn lower_break(_: &Break) -> Block {
    Block::new("controls_break")
}

/// Field-code table for the binary operator families. The relational pair
/// `<`/`<=` intentionally both map to `"LT"`: the original emitted that
/// field code for both, and this translator preserves the quirk exactly
/// rather than silently correcting it.
fn arithmetic_field_code(op: TokenKind) -> &'static str {
    use TokenKind::*;
    match op {
        Plus => "ADD",
        Dash => "MINUS",
        Times => "MULTIPLY",
        Slash => "DIVIDE",
        Power => "POWER",
        Remainder => "MODULO",
        BitwiseOr => "BITWISE_OR",
        BitwiseAnd => "BITWISE_AND",
        BitwiseXor => "BITWISE_XOR",
        _ => "ADD",
    }
}

fn compare_field_code(op: TokenKind) -> &'static str {
    use TokenKind::*;
    match op {
        Equals | TextEquals => "EQ",
        NotEquals | TextNotEquals => "NEQ",
        LessThan | LessThanEqual => "LT",
        GreatThan => "GT",
        GreaterThanEqual => "GTE",
        TextLessThan => "LT",
        TextGreaterThan => "GT",
        _ => "EQ",
    }
}

fn block_type_for_binary(op: TokenKind) -> &'static str {
    use TokenKind::*;
    match op {
        LogicOr | LogicAnd => "logic_operation",
        Equals | NotEquals | TextEquals | TextNotEquals => "logic_compare",
        LessThan | LessThanEqual | GreatThan | GreaterThanEqual | TextLessThan | TextGreaterThan => "math_compare",
        _ => "math_arithmetic",
    }
}

fn field_code_for(op: TokenKind) -> &'static str {
    use TokenKind::*;
    match op {
        LogicOr => "OR",
        LogicAnd => "AND",
        Equals | NotEquals | TextEquals | TextNotEquals | LessThan | LessThanEqual | GreatThan
        | GreaterThanEqual | TextLessThan | TextGreaterThan => compare_field_code(op),
        _ => arithmetic_field_code(op),
    }
}

fn lower_binary(b: &BinaryExpr) -> Block {
    if b.op == TokenKind::Underscore {
        let mut block = Block::new("text_join")
            .with_mutation(Mutation { items: Some(b.operands.len()), ..Mutation::new() });
        for (i, operand) in b.operands.iter().enumerate() {
            block = block.with_optional_value(format!("ADD{i}"), to_value(operand));
        }
        return block;
    }
    let block_type = block_type_for_binary(b.op);
    let code = field_code_for(b.op);
    let mut operands = b.operands.iter();
    let mut acc = to_block(operands.next().expect("binary expr has at least 2 operands"), false);
    for operand in operands {
        acc = Block::new(block_type)
            .with_field("OP", code)
            .with_value("A", acc)
            .with_optional_value("B", to_value(operand));
    }
    acc
}

fn lower_question(q: &Question) -> Block {
    Block::new("control_ternary")
        .with_optional_value("IF", to_value(&q.condition))
        .with_optional_value("THEN", to_value(&q.then_value))
        .with_optional_value("ELSE", to_value(&q.else_value))
}

fn lower_transform(t: &Transform) -> Block {
    Block::new("type_transform")
        .with_field("TARGET", t.target_type.clone())
        .with_optional_value("VALUE", to_value(&t.source))
}

fn lower_func_call(f: &FuncCall) -> Block {
    let sig = loom_catalog::lookup_builtin(&f.name);
    let block_type = sig.map(|b| b.block_type).unwrap_or("unknown_call");
    let mut block = Block::new(block_type);
    if let Some(op) = sig.and_then(|b| b.op_code) {
        block = block.with_field("OP", op);
    }
    for (i, arg) in f.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

fn lower_call(c: &Call) -> Block {
    let sig = loom_catalog::lookup_method(&c.method);
    let block_type = sig.map(|m| m.block_type).unwrap_or("unknown_method");
    let mut block = Block::new(block_type).with_optional_value("VALUE", to_value(&c.receiver));
    if let Some(op) = sig.and_then(|m| m.op_code) {
        block = block.with_field("OP", op);
    }
    for (i, arg) in c.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

fn lower_list_transform(l: &ListTransform) -> Block {
    let block_type = loom_catalog::lookup_transformer(&l.transformer).map(|t| t.block_type).unwrap_or("unknown_transform");
    let mut block = Block::new(block_type).with_optional_value("LIST", to_value(&l.list));
    for (i, arg) in l.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

fn component_type_of(expr: &Expr) -> String {
    match expr {
        Expr::Component(c) => c.component_type.clone(),
        _ => "Component".to_string(),
    }
}

fn instance_name_of(expr: &Expr) -> String {
    match expr {
        Expr::Component(c) => c.name.clone(),
        other => other.render_surface(),
    }
}

fn lower_event(e: &Event) -> Block {
    Block::new("component_event")
        .with_mutation(Mutation {
            component_type: Some(e.component_type.clone()),
            instance_name: Some(e.instance_name.clone()),
            event_name: Some(e.event_name.clone()),
            is_generic: Some(false),
            ..Mutation::new()
        })
        .with_optional_statement("DO", to_statement(&e.body))
}

fn lower_generic_event(e: &GenericEvent) -> Block {
    Block::new("component_event")
        .with_mutation(Mutation {
            component_type: Some(e.component_type.clone()),
            event_name: Some(e.event_name.clone()),
            is_generic: Some(true),
            ..Mutation::new()
        })
        .with_optional_statement("DO", to_statement(&e.body))
}

fn lower_method_call(m: &MethodCall) -> Block {
    let mut block = Block::new("component_method")
        .with_mutation(Mutation {
            component_type: Some(component_type_of(&m.receiver)),
            instance_name: Some(instance_name_of(&m.receiver)),
            method_name: Some(m.method_name.clone()),
            is_generic: Some(false),
            ..Mutation::new()
        });
    for (i, arg) in m.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

fn lower_generic_method_call(m: &GenericMethodCall) -> Block {
    let mut block = Block::new("component_method")
        .with_mutation(Mutation {
            component_type: Some(m.component_type.clone()),
            method_name: Some(m.method_name.clone()),
            is_generic: Some(true),
            ..Mutation::new()
        })
        .with_optional_value("COMPONENT", to_value(&m.component));
    for (i, arg) in m.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

fn lower_property_get(p: &PropertyGet) -> Block {
    Block::new("component_set_get").with_mutation(Mutation {
        component_type: Some(component_type_of(&p.receiver)),
        instance_name: Some(instance_name_of(&p.receiver)),
        property_name: Some(p.property_name.clone()),
        is_generic: Some(false),
        set_or_get: Some("get".into()),
        ..Mutation::new()
    })
}

fn lower_property_set(p: &PropertySet) -> Block {
    Block::new("component_set_get")
        .with_mutation(Mutation {
            component_type: Some(component_type_of(&p.receiver)),
            instance_name: Some(p.instance_name.clone()),
            property_name: Some(p.property_name.clone()),
            is_generic: Some(false),
            set_or_get: Some("set".into()),
            shape: Some("value".into()),
            ..Mutation::new()
        })
        .with_optional_value("VALUE", to_value(&p.value))
}

fn lower_generic_property_get(p: &GenericPropertyGet) -> Block {
    Block::new("component_set_get")
        .with_mutation(Mutation {
            component_type: Some(p.component_type.clone()),
            property_name: Some(p.property_name.clone()),
            is_generic: Some(true),
            set_or_get: Some("get".into()),
            ..Mutation::new()
        })
        .with_optional_value("COMPONENT", to_value(&p.component))
}

fn lower_generic_property_set(p: &GenericPropertySet) -> Block {
    Block::new("component_set_get")
        .with_mutation(Mutation {
            component_type: Some(p.component_type.clone()),
            property_name: Some(p.property_name.clone()),
            is_generic: Some(true),
            set_or_get: Some("set".into()),
            ..Mutation::new()
        })
        .with_optional_value("COMPONENT", to_value(&p.component))
        .with_optional_value("VALUE", to_value(&p.value))
}

fn lower_every_component(e: &EveryComponent) -> Block {
    Block::new("component_all_component_blocks").with_mutation(Mutation {
        component_type: Some(e.component_type.clone()),
        ..Mutation::new()
    })
}

fn lower_void_procedure(p: &VoidProcedure) -> Block {
    let mutation = Mutation {
        args: p.parameters.iter().map(|n| NamedChild { name: n.clone() }).collect(),
        ..Mutation::new()
    };
    let mut block = Block::new("procedures_defnoreturn").with_mutation(mutation).with_field("NAME", p.name.clone());
    for (i, param) in p.parameters.iter().enumerate() {
        block = block.with_field(format!("VAR{i}"), param.clone());
    }
    block.with_optional_statement("STACK", to_statement(&p.body))
}

fn lower_ret_procedure(p: &RetProcedure) -> Block {
    let mutation = Mutation {
        args: p.parameters.iter().map(|n| NamedChild { name: n.clone() }).collect(),
        ..Mutation::new()
    };
    let mut block = Block::new("procedures_defreturn").with_mutation(mutation).with_field("NAME", p.name.clone());
    for (i, param) in p.parameters.iter().enumerate() {
        block = block.with_field(format!("VAR{i}"), param.clone());
    }
    block.with_optional_value("RETURN", to_value(&p.body))
}

fn lower_proc_call(p: &ProcCall) -> Block {
    let block_type = if p.result_signature == Signature::Void { "procedures_callnoreturn" } else { "procedures_callreturn" };
    let mut block = Block::new(block_type)
        .with_mutation(Mutation { args: Vec::new(), ..Mutation::new() })
        .with_field("NAME", p.name.clone());
    for (i, arg) in p.args.iter().enumerate() {
        block = block.with_optional_value(format!("ARG{i}"), to_value(arg));
    }
    block
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_ast::control::{Break, If};
    use loom_ast::fundamentals::{Boolean, Number};

    #[test]
    fn literal_lowering() {
        let b = to_block(&Expr::Number(Number { content: "42".into() }), false);
        assert_eq!(b.block_type, "math_number");
        assert_eq!(b.field("NUM"), Some("42"));
    }

    #[test]
    fn binary_expr_folds_nary_into_pairwise_blocks() {
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
        assert_eq!(block.block_type, "math_arithmetic");
        // outermost block combines (1+2) as A with 3 as B
        assert_eq!(block.value("A").unwrap().block_type, "math_arithmetic");
        assert_eq!(block.value("B").unwrap().block_type, "math_number");
    }

    #[test]
    fn relational_lt_and_lte_share_the_same_field_code() {
        assert_eq!(field_code_for(TokenKind::LessThan), "LT");
        assert_eq!(field_code_for(TokenKind::LessThanEqual), "LT");
    }

    #[test]
    fn smart_body_of_pairs_lowers_as_dictionary() {
        let expr = Expr::SmartBody(SmartBody {
            body: vec![Expr::Pair(Pair {
                key: Box::new(Expr::Text(Text { content: "k".into() })),
                value: Box::new(Expr::Number(Number { content: "1".into() })),
            })],
        });
        let block = to_block(&expr, false);
        assert_eq!(block.block_type, "dictionaries_create_with");
    }
}
