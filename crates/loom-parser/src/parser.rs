use loom_ast::common::{BinaryExpr, Call, FuncCall, ListTransform, Question, Transform};
use loom_ast::components::{
    Event, EveryComponent, GenericEvent, GenericMethodCall, GenericPropertyGet, GenericPropertySet, MethodCall,
    PropertySet,
};
use loom_ast::control::{Break, Do, Each, EachPair, For, If, While};
use loom_ast::fundamentals::{
    Boolean, Color, Component, EmptySocket, HelperDropdown, ListLit, Not, Number, Pair, SmartBody, Text, WalkAll,
};
use loom_ast::procedures::{ProcCall, RetProcedure, VoidProcedure};
use loom_ast::variables::{Get, GlobalDecl, Set, SimpleVar, Var, VarResult};
use loom_ast::{Expr, Signature};
use loom_catalog::{lookup_builtin, lookup_method, lookup_transformer};
use loom_common::{Flag, Position, Token, TokenKind};
use loom_resolve::{ComponentInstance, ErrorAggregator, NameTables, ProcedureSignature, ScopeCursor, ScopeKind};

use crate::error::{ParseError, ParseErrorKind};

type PResult<T> = Result<T, ParseError>;

pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    scopes: ScopeCursor,
    names: NameTables,
    aggregator: ErrorAggregator,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], strict: bool) -> Self {
        Self {
            tokens,
            pos: 0,
            scopes: ScopeCursor::new(),
            names: NameTables::new(),
            aggregator: ErrorAggregator::new(strict),
        }
    }

    /// Pre-registers the component instances supplied alongside the source
    /// (the scheme/screen description, not Surface syntax itself) so `when`
    /// handlers can resolve their receiver's component type.
    pub fn register_components(&mut self, components: &std::collections::HashMap<String, Vec<String>>) {
        for (component_type, instances) in components {
            for instance_name in instances {
                self.names.register_component(instance_name.clone(), ComponentInstance { component_type: component_type.clone() });
            }
        }
    }

    /// Parses a whole translation unit: zero or more leading `@Type{...}`
    /// component declarations, then a flat sequence of top-level
    /// declarations and event handlers.
    pub fn parse_program(mut self) -> Result<Vec<Expr>, Vec<ParseError>> {
        while self.check(TokenKind::At) {
            if let Err(e) = self.parse_component_decl() {
                return Err(vec![e]);
            }
        }
        let mut items = Vec::new();
        while !self.is_eof() {
            match self.parse_statement() {
                Ok(item) => items.push(item),
                Err(e) => return Err(vec![e]),
            }
        }
        if let Err(resolve_errors) = self.aggregator.finish(&self.scopes) {
            return Err(resolve_errors
                .into_iter()
                .map(|e| {
                    let position = e.position;
                    ParseError::new(ParseErrorKind::Resolve(e), position)
                })
                .collect());
        }
        Ok(items)
    }

    /// `@Type { name, name, ... }` - registers each `name` into the
    /// component-instance<->component-type bimap, the same table a
    /// caller-supplied `components` map populates (see `register_components`).
    fn parse_component_decl(&mut self) -> PResult<()> {
        self.expect(TokenKind::At, "'@'")?;
        let component_type = self.expect(TokenKind::Name, "a component type")?.content.clone();
        self.expect(TokenKind::OpenCurly, "'{'")?;
        if !self.check(TokenKind::CloseCurly) {
            loop {
                let name = self.expect(TokenKind::Name, "an instance name")?.content.clone();
                self.names.register_component(name, ComponentInstance { component_type: component_type.clone() });
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseCurly, "'}'")?;
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|t| t.kind)
    }

    fn peek2_kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos + 1).map(|t| t.kind)
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn advance(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn current_position(&self) -> Position {
        self.peek().map(|t| t.position).unwrap_or(Position { line: 0, column: 0 })
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> PResult<&Token> {
        match self.peek_kind() {
            Some(k) if k == kind => Ok(self.advance().expect("just peeked")),
            Some(found) => Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected, found }, self.current_position())),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof { expected }, self.current_position())),
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Global) => self.parse_global_decl(),
            Some(TokenKind::Local) => self.parse_local(),
            Some(TokenKind::If) => self.parse_if(),
            Some(TokenKind::For) => self.parse_for_or_each(),
            Some(TokenKind::While) => self.parse_while(),
            Some(TokenKind::Do) => self.parse_do(),
            Some(TokenKind::Break) => {
                let position = self.current_position();
                self.advance();
                if !self.scopes.is_in(ScopeKind::Loop) {
                    return Err(ParseError::new(
                        ParseErrorKind::UnexpectedToken { expected: "'break' inside a loop", found: TokenKind::Break },
                        position,
                    ));
                }
                Ok(Expr::Break(Break))
            }
            Some(TokenKind::Func) => self.parse_void_procedure(),
            // `compute name(...)` is a procedure declaration statement;
            // `compute(name = expr, ...) -> expr` is an expression term
            // (see `parse_var_result_term`) - disambiguated by whether a
            // name or `(` follows the keyword.
            Some(TokenKind::Compute) if self.peek2_kind() == Some(TokenKind::Name) => self.parse_ret_procedure(),
            Some(TokenKind::When) => self.parse_event(),
            _ => self.parse_expr(0),
        }
    }

    fn parse_event(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        self.advance();
        if !self.scopes.at_root() {
            return Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected: "'when' at top level", found: TokenKind::When }, position));
        }
        if self.eat(TokenKind::Any) {
            let component_type = self.expect(TokenKind::Name, "a component type")?.content.clone();
            self.expect(TokenKind::Dot, "'.'")?;
            let event_name = self.expect(TokenKind::Name, "an event name")?.content.clone();
            let params = if self.check(TokenKind::OpenCurve) { self.parse_params()? } else { Vec::new() };
            self.scopes.enter(ScopeKind::GenericEvent);
            for p in &params {
                self.scopes.define(p, Signature::EventParam);
            }
            let body = Box::new(self.parse_block()?);
            self.scopes.exit();
            return Ok(Expr::GenericEvent(GenericEvent { component_type, event_name, body }));
        }
        let instance_name = self.expect(TokenKind::Name, "a component instance name")?.content.clone();
        self.expect(TokenKind::Dot, "'.'")?;
        let event_name = self.expect(TokenKind::Name, "an event name")?.content.clone();
        let params = if self.check(TokenKind::OpenCurve) { self.parse_params()? } else { Vec::new() };
        let component_type = self.names.component(&instance_name).map(|c| c.component_type.clone()).unwrap_or_default();
        self.scopes.enter(ScopeKind::Event);
        for p in &params {
            self.scopes.define(p, Signature::EventParam);
        }
        let body = Box::new(self.parse_block()?);
        self.scopes.exit();
        Ok(Expr::Event(Event { instance_name, event_name, component_type, body }))
    }

    /// A `{ ... }` body. Statements need no separator; dictionary-literal
    /// pairs (the all-`Pair` reading `SmartBody::is_all_pairs` picks up) are
    /// comma-separated instead, so a trailing comma is eaten where present.
    fn parse_block(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::OpenCurly, "'{'")?;
        let mut body = Vec::new();
        while !self.check(TokenKind::CloseCurly) {
            body.push(self.parse_statement()?);
            self.eat(TokenKind::Comma);
        }
        self.expect(TokenKind::CloseCurly, "'}'")?;
        Ok(Expr::SmartBody(SmartBody { body }))
    }

    fn parse_global_decl(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        self.advance();
        if !self.scopes.at_root() {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedToken { expected: "'global' at top level", found: TokenKind::Global },
                position,
            ));
        }
        let name = self.expect(TokenKind::Name, "a name")?.content.clone();
        self.expect(TokenKind::Assign, "'='")?;
        let value = self.parse_expr(0)?;
        self.scopes.define(&name, value.signature());
        Ok(Expr::GlobalDecl(GlobalDecl { name, value: Box::new(value) }))
    }

    /// `local NAME = expr`, with no trailing block of its own: the body is
    /// whatever follows in the enclosing statement list, per SPEC_FULL.md
    /// §6.1's `local := 'local' NAME '=' expression` grammar. Consecutive
    /// `local` lines whose values don't reference a name bound earlier in
    /// the run collapse into one parallel `Var`/`SimpleVar`; a line that
    /// depends on one of them breaks the group - the parser rewinds to just
    /// before that `local` keyword and leaves it (and everything after) to
    /// `parse_rest_of_block`, which re-enters `parse_local` for it and so
    /// nests a fresh `Var` as the first group's body (SPEC_FULL.md §4.3,
    /// §8 Scenario C). A single `local` keyword may still declare several
    /// comma-separated names at once (the `parse_local`-internal grouping
    /// simplification already in place); the dependency check treats each
    /// such comma-group as one atomic unit against the names collected so
    /// far from earlier groups.
    fn parse_local(&mut self) -> PResult<Expr> {
        let mut names = Vec::new();
        let mut values = Vec::new();
        loop {
            let checkpoint = self.pos;
            if !self.eat(TokenKind::Local) {
                break;
            }
            let mut group_names = Vec::new();
            let mut group_values = Vec::new();
            loop {
                let name = self.expect(TokenKind::Name, "a name")?.content.clone();
                self.expect(TokenKind::Assign, "'='")?;
                let value = self.parse_expr(0)?;
                group_names.push(name);
                group_values.push(value);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            if group_values.iter().any(|v| references_any(v, &names)) {
                self.pos = checkpoint;
                break;
            }
            for (name, value) in group_names.iter().zip(group_values.iter()) {
                self.scopes.define(name, value.signature());
            }
            names.extend(group_names);
            values.extend(group_values);
        }
        let body = Box::new(self.parse_rest_of_block()?);
        if names.len() == 1 {
            Ok(Expr::SimpleVar(SimpleVar {
                name: names.into_iter().next().expect("len == 1"),
                value: Box::new(values.into_iter().next().expect("len == 1")),
                body,
            }))
        } else {
            Ok(Expr::Var(Var { names, values, body }))
        }
    }

    /// The rest of the statement list the caller is already in the middle
    /// of, up to whatever ends it (`}` for a nested block, end of input at
    /// the root) - used for a `local`'s body, which is not a syntactic
    /// child block of its own.
    fn parse_rest_of_block(&mut self) -> PResult<Expr> {
        let mut body = Vec::new();
        while !self.is_eof() && !self.check(TokenKind::CloseCurly) {
            body.push(self.parse_statement()?);
            self.eat(TokenKind::Comma);
        }
        Ok(Expr::SmartBody(SmartBody { body }))
    }

    /// `if cond { } else if cond { } else { }` chains: an `else` immediately
    /// followed by `if` recurses into another `parse_if` rather than a
    /// block, nesting as `If{ else_branch: Some(Box::new(Expr::If(...))) }`
    /// since `If` carries only a single `else_branch` slot.
    fn parse_if(&mut self) -> PResult<Expr> {
        self.advance();
        let condition = Box::new(self.parse_expr(0)?);
        self.scopes.enter(ScopeKind::IfBody);
        let then_branch = Box::new(self.parse_block()?);
        self.scopes.exit();
        let else_branch = if self.eat(TokenKind::Else) {
            if self.check(TokenKind::If) {
                Some(Box::new(self.parse_if()?))
            } else {
                self.scopes.enter(ScopeKind::IfBody);
                let branch = Box::new(self.parse_block()?);
                self.scopes.exit();
                Some(branch)
            }
        } else {
            None
        };
        Ok(Expr::If(If { condition, then_branch, else_branch }))
    }

    fn parse_for_or_each(&mut self) -> PResult<Expr> {
        self.advance();
        let first_name = self.expect(TokenKind::Name, "a loop variable name")?.content.clone();
        if self.eat(TokenKind::Comma) {
            let value_name = self.expect(TokenKind::Name, "a value name")?.content.clone();
            self.expect(TokenKind::In, "'in'")?;
            let iterable = self.parse_expr(0)?;
            self.scopes.enter(ScopeKind::Loop);
            self.scopes.define(&first_name, Signature::Any);
            self.scopes.define(&value_name, Signature::Any);
            let body = Box::new(self.parse_block()?);
            self.scopes.exit();
            return Ok(Expr::EachPair(EachPair { key_name: first_name, value_name, iterable: Box::new(iterable), body }));
        }
        self.expect(TokenKind::In, "'in'")?;
        let iterable_or_from = self.parse_expr(0)?;
        self.scopes.enter(ScopeKind::Loop);
        if self.eat(TokenKind::DoubleDot) {
            let to = self.parse_expr(0)?;
            let by = if self.eat(TokenKind::Step) { self.parse_expr(0)? } else { Expr::Number(Number { content: "1".into() }) };
            self.scopes.define(&first_name, Signature::Number);
            let body = Box::new(self.parse_block()?);
            self.scopes.exit();
            return Ok(Expr::For(For {
                index_name: first_name,
                from: Box::new(iterable_or_from),
                to: Box::new(to),
                by: Box::new(by),
                body,
            }));
        }
        self.scopes.define(&first_name, Signature::Any);
        let body = Box::new(self.parse_block()?);
        self.scopes.exit();
        Ok(Expr::Each(Each { item_name: first_name, iterable: Box::new(iterable_or_from), body }))
    }

    fn parse_while(&mut self) -> PResult<Expr> {
        self.advance();
        let condition = Box::new(self.parse_expr(0)?);
        self.scopes.enter(ScopeKind::Loop);
        let body = Box::new(self.parse_block()?);
        self.scopes.exit();
        Ok(Expr::While(While { condition, body }))
    }

    fn parse_do(&mut self) -> PResult<Expr> {
        self.advance();
        let body = Box::new(self.parse_block()?);
        let result = Box::new(self.parse_expr(0)?);
        Ok(Expr::Do(Do { body, result }))
    }

    fn parse_params(&mut self) -> PResult<Vec<String>> {
        self.expect(TokenKind::OpenCurve, "'('")?;
        let mut params = Vec::new();
        if !self.check(TokenKind::CloseCurve) {
            loop {
                params.push(self.expect(TokenKind::Name, "a parameter name")?.content.clone());
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseCurve, "')'")?;
        Ok(params)
    }

    fn parse_void_procedure(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        self.advance();
        if !self.scopes.at_root() {
            return Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected: "'func' at top level", found: TokenKind::Func }, position));
        }
        let name = self.expect(TokenKind::Name, "a procedure name")?.content.clone();
        let parameters = self.parse_params()?;
        self.names.declare_procedure(&name, ProcedureSignature { param_count: parameters.len(), result: Signature::Void });
        self.scopes.enter(ScopeKind::Proc);
        for p in &parameters {
            self.scopes.define(p, Signature::Any);
        }
        let body = Box::new(self.parse_block()?);
        self.scopes.exit();
        Ok(Expr::VoidProcedure(VoidProcedure { name, parameters, body }))
    }

    fn parse_ret_procedure(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        self.advance();
        if !self.scopes.at_root() {
            return Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected: "'compute' at top level", found: TokenKind::Compute }, position));
        }
        let name = self.expect(TokenKind::Name, "a procedure name")?.content.clone();
        let parameters = self.parse_params()?;
        self.names.declare_procedure(&name, ProcedureSignature { param_count: parameters.len(), result: Signature::Any });
        self.scopes.enter(ScopeKind::RetProc);
        for p in &parameters {
            self.scopes.define(p, Signature::Any);
        }
        let body = Box::new(self.parse_block()?);
        self.scopes.exit();
        Ok(Expr::RetProcedure(RetProcedure { name, parameters, body, result_signature: Signature::Any }))
    }

    // ---- expressions: precedence-climbing over the flag lattice ----

    fn parse_expr(&mut self, min_bp: u8) -> PResult<Expr> {
        let mut lhs = self.parse_unary()?;
        loop {
            // `?` carries no precedence flag (it is not part of the binary
            // operator lattice), so it is checked ahead of the `precedence()`
            // lookup and treated as binding looser than everything else.
            if self.check(TokenKind::Question) && min_bp == 0 {
                self.advance();
                // Bound above `Pair`'s precedence (1) so the `:` that closes
                // the `then` arm is never mistaken for a dict-pair operator.
                let then_value = self.parse_expr(2)?;
                self.expect(TokenKind::Colon, "':'")?;
                let else_value = self.parse_expr(0)?;
                lhs = Expr::Question(Question {
                    condition: Box::new(lhs),
                    then_value: Box::new(then_value),
                    else_value: Box::new(else_value),
                });
                continue;
            }
            // Compound assignment (`+=`, `-=`, ...): the lexer has no
            // dedicated augmented-assign token, so it shows up as a
            // `Compoundable`-flagged operator immediately followed by a
            // bare `=`. Rewritten to `name = name op rhs`.
            if min_bp == 0 {
                if let Some(tok) = self.peek() {
                    if tok.has_flag(Flag::Compoundable) && self.peek2_kind() == Some(TokenKind::Assign) {
                        let op = tok.kind;
                        let spelling = tok.content.clone();
                        let position = tok.position;
                        self.advance();
                        self.advance();
                        let rhs = self.parse_expr(0)?;
                        let combined = Expr::BinaryExpr(BinaryExpr { op, spelling, operands: vec![lhs.clone(), rhs] });
                        lhs = self.build_assignment(lhs, combined, position)?;
                        continue;
                    }
                }
            }
            let Some(tok) = self.peek() else { break };
            let Some(bp) = tok.precedence() else { break };
            if bp < min_bp {
                break;
            }
            if tok.kind == TokenKind::Assign {
                let position = tok.position;
                self.advance();
                let rhs = self.parse_expr(bp + 1)?;
                lhs = self.build_assignment(lhs, rhs, position)?;
                continue;
            }
            if tok.kind == TokenKind::Colon {
                self.advance();
                let rhs = self.parse_expr(bp + 1)?;
                lhs = Expr::Pair(Pair { key: Box::new(lhs), value: Box::new(rhs) });
                continue;
            }
            let op = tok.kind;
            let spelling = tok.content.clone();
            let can_fold = BinaryExpr::can_repeat(op);
            self.advance();
            let rhs = self.parse_expr(bp + 1)?;
            lhs = if can_fold {
                match lhs {
                    Expr::BinaryExpr(mut b) if b.op == op => {
                        b.operands.push(rhs);
                        Expr::BinaryExpr(b)
                    }
                    other => Expr::BinaryExpr(BinaryExpr { op, spelling, operands: vec![other, rhs] }),
                }
            } else {
                Expr::BinaryExpr(BinaryExpr { op, spelling, operands: vec![lhs, rhs] })
            };
        }
        Ok(lhs)
    }

    fn build_assignment(&mut self, lhs: Expr, rhs: Expr, position: Position) -> PResult<Expr> {
        match lhs {
            Expr::Get(g) => {
                self.scopes.define(&g.name, rhs.signature());
                Ok(Expr::Set(Set { global: g.global, name: g.name, value: Box::new(rhs) }))
            }
            Expr::PropertyGet(p) => {
                let instance_name = component_receiver_name(&p.receiver);
                Ok(Expr::PropertySet(PropertySet { instance_name, receiver: p.receiver, property_name: p.property_name, value: Box::new(rhs) }))
            }
            Expr::GenericPropertyGet(p) => Ok(Expr::GenericPropertySet(GenericPropertySet {
                component_type: p.component_type,
                component: p.component,
                property_name: p.property_name,
                value: Box::new(rhs),
            })),
            _ => Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected: "an assignable name", found: TokenKind::Assign }, position)),
        }
    }

    fn parse_unary(&mut self) -> PResult<Expr> {
        match self.peek_kind() {
            Some(TokenKind::Not) => {
                self.advance();
                let expr = self.parse_unary()?;
                Ok(Expr::Not(Not { expr: Box::new(expr) }))
            }
            Some(TokenKind::Dash) => {
                self.advance();
                let expr = self.parse_unary()?;
                // Represented as `0 - x`: Surface has no dedicated unary-minus
                // node, it reuses the binary `-` with an implicit left zero.
                Ok(Expr::BinaryExpr(BinaryExpr {
                    op: TokenKind::Dash,
                    spelling: "-".into(),
                    operands: vec![Expr::Number(Number { content: "0".into() }), expr],
                }))
            }
            _ => self.parse_postfix(),
        }
    }

    fn parse_postfix(&mut self) -> PResult<Expr> {
        let mut expr = self.parse_primary()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::Dot) => {
                    self.advance();
                    let member = self.expect(TokenKind::Name, "a member name")?.content.clone();
                    if self.check(TokenKind::OpenCurve) {
                        let args = self.parse_args()?;
                        if self.check(TokenKind::OpenCurly) {
                            expr = self.build_list_transform(expr, member, args)?;
                        } else {
                            expr = self.build_method_call(expr, member, args)?;
                        }
                    } else if self.check(TokenKind::OpenCurly) {
                        expr = self.build_list_transform(expr, member, Vec::new())?;
                    } else {
                        expr = self.build_property_get(expr, member);
                    }
                }
                Some(TokenKind::At) => {
                    self.advance();
                    let option = self.expect(TokenKind::Name, "an option name")?.content.clone();
                    let key = match &expr {
                        Expr::Get(g) => g.name.clone(),
                        other => other.render_surface(),
                    };
                    expr = Expr::HelperDropdown(HelperDropdown { key, option });
                }
                Some(TokenKind::DoubleColon) => {
                    self.advance();
                    let target_type = self.expect(TokenKind::Name, "a transform target type")?.content.clone();
                    expr = Expr::Transform(Transform { source: Box::new(expr), target_type, result_signature: Signature::Any });
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// `receiver.method(args...)` with a `Component` receiver dispatches to
    /// the component method-call node; anything else resolves through the
    /// primitive-receiver method catalog.
    fn build_method_call(&mut self, receiver: Expr, method: String, args: Vec<Expr>) -> PResult<Expr> {
        if let Expr::Component(_) = receiver {
            return Ok(Expr::MethodCall(MethodCall { receiver: Box::new(receiver), method_name: method, args, result_signature: Signature::Any }));
        }
        if let Some(sig) = lookup_method(&method) {
            return Ok(Expr::Call(Call { receiver: Box::new(receiver), method, args, result_signature: sig.result }));
        }
        Err(ParseError::new(ParseErrorKind::UnknownMethod(method), self.current_position()))
    }

    /// `receiver.transformer { bound-names -> body }`, with any parenthesized
    /// args (e.g. `reduce`'s initial accumulator) prepended. The bound names
    /// are scoped locally (`ScopeKind::Transform`) rather than threaded into
    /// `ListTransform::args`, which carries no slot for them.
    fn build_list_transform(&mut self, list: Expr, transformer: String, mut args: Vec<Expr>) -> PResult<Expr> {
        if lookup_transformer(&transformer).is_none() {
            return Err(ParseError::new(ParseErrorKind::UnknownMethod(transformer), self.current_position()));
        }
        self.expect(TokenKind::OpenCurly, "'{'")?;
        self.scopes.enter(ScopeKind::Transform);
        let bound_names = self.parse_optional_bound_names();
        for n in &bound_names {
            self.scopes.define(n, Signature::Any);
        }
        let body = self.parse_expr(0)?;
        self.scopes.exit();
        self.expect(TokenKind::CloseCurly, "'}'")?;
        args.push(body);
        Ok(Expr::ListTransform(ListTransform { list: Box::new(list), transformer, args }))
    }

    /// `name(, name)* ->`, tried speculatively: if no `->` follows the
    /// candidate name list, the position is rewound and the whole thing is
    /// reparsed as the transform body expression instead.
    fn parse_optional_bound_names(&mut self) -> Vec<String> {
        let save = self.pos;
        if !self.check(TokenKind::Name) {
            return Vec::new();
        }
        let mut names = Vec::new();
        loop {
            if !self.check(TokenKind::Name) {
                self.pos = save;
                return Vec::new();
            }
            names.push(self.advance().expect("peeked").content.clone());
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if self.eat(TokenKind::RightArrow) {
            names
        } else {
            self.pos = save;
            Vec::new()
        }
    }

    fn build_property_get(&self, receiver: Expr, property_name: String) -> Expr {
        Expr::PropertyGet(loom_ast::components::PropertyGet { receiver: Box::new(receiver), property_name, result_signature: Signature::Any })
    }

    fn parse_args(&mut self) -> PResult<Vec<Expr>> {
        self.expect(TokenKind::OpenCurve, "'('")?;
        let mut args = Vec::new();
        if !self.check(TokenKind::CloseCurve) {
            loop {
                args.push(self.parse_expr(0)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseCurve, "')'")?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        match self.peek_kind() {
            Some(TokenKind::Number) => {
                let content = self.advance().expect("peeked").content.clone();
                Ok(Expr::Number(Number { content }))
            }
            Some(TokenKind::Text) => {
                let content = self.advance().expect("peeked").content.clone();
                Ok(Expr::Text(Text { content }))
            }
            Some(TokenKind::ColorCode) => {
                let hex = self.advance().expect("peeked").content.clone();
                Ok(Expr::Color(Color { hex }))
            }
            Some(TokenKind::True) => {
                self.advance();
                Ok(Expr::Boolean(Boolean { value: true }))
            }
            Some(TokenKind::False) => {
                self.advance();
                Ok(Expr::Boolean(Boolean { value: false }))
            }
            Some(TokenKind::Undefined) => {
                self.advance();
                Ok(Expr::EmptySocket(EmptySocket))
            }
            Some(TokenKind::WalkAll) => {
                self.advance();
                Ok(Expr::WalkAll(WalkAll))
            }
            Some(TokenKind::This) => {
                self.advance();
                self.expect(TokenKind::Dot, "'.'")?;
                let name = self.expect(TokenKind::Name, "a name")?.content.clone();
                let signature = self.aggregator.resolve_or_defer(&self.scopes, &name, position).unwrap_or(Signature::Any);
                Ok(Expr::Get(Get { global: true, name, value_signature: signature }))
            }
            Some(TokenKind::Any) => self.parse_generic_component_primary(),
            Some(TokenKind::Compute) => self.parse_var_result_term(),
            Some(TokenKind::OpenCurve) => {
                self.advance();
                let inner = self.parse_expr(0)?;
                self.expect(TokenKind::CloseCurve, "')'")?;
                Ok(inner)
            }
            Some(TokenKind::OpenSquare) => self.parse_list_literal(),
            Some(TokenKind::OpenCurly) => self.parse_block(),
            Some(TokenKind::Name) => self.parse_name_primary(),
            Some(found) => Err(ParseError::new(ParseErrorKind::UnexpectedToken { expected: "an expression", found }, position)),
            None => Err(ParseError::new(ParseErrorKind::UnexpectedEof { expected: "an expression" }, position)),
        }
    }

    /// `any Type(component).Property` / `.Property = value` / `.Method(args)`
    /// - the generic-component forms, dispatched against a computed
    /// component value rather than a statically named instance. `= value`
    /// is handled generically by `build_assignment` once this returns a
    /// `GenericPropertyGet`.
    fn parse_generic_component_primary(&mut self) -> PResult<Expr> {
        self.advance();
        let component_type = self.expect(TokenKind::Name, "a component type")?.content.clone();
        self.expect(TokenKind::OpenCurve, "'('")?;
        let component = self.parse_expr(0)?;
        self.expect(TokenKind::CloseCurve, "')'")?;
        self.expect(TokenKind::Dot, "'.'")?;
        let member = self.expect(TokenKind::Name, "a property or method name")?.content.clone();
        if self.check(TokenKind::OpenCurve) {
            let args = self.parse_args()?;
            return Ok(Expr::GenericMethodCall(GenericMethodCall {
                component_type,
                component: Box::new(component),
                method_name: member,
                args,
                result_signature: Signature::Any,
            }));
        }
        Ok(Expr::GenericPropertyGet(GenericPropertyGet {
            component_type,
            component: Box::new(component),
            property_name: member,
            result_signature: Signature::Any,
        }))
    }

    /// `compute( name = expr, ... ) -> expr`, the expression-term form of
    /// `compute`, distinct from the `compute name(...) { body }` procedure
    /// declaration statement (see `parse_statement`'s lookahead).
    fn parse_var_result_term(&mut self) -> PResult<Expr> {
        self.advance();
        self.expect(TokenKind::OpenCurve, "'('")?;
        let mut names = Vec::new();
        let mut values = Vec::new();
        if !self.check(TokenKind::CloseCurve) {
            loop {
                let name = self.expect(TokenKind::Name, "a name")?.content.clone();
                self.expect(TokenKind::Assign, "'='")?;
                let value = self.parse_expr(0)?;
                names.push(name);
                values.push(value);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseCurve, "')'")?;
        self.expect(TokenKind::RightArrow, "'->'")?;
        self.scopes.enter(ScopeKind::Transform);
        for (name, value) in names.iter().zip(values.iter()) {
            self.scopes.define(name, value.signature());
        }
        let result = Box::new(self.parse_expr(0)?);
        self.scopes.exit();
        Ok(Expr::VarResult(VarResult { names, values, result }))
    }

    fn parse_list_literal(&mut self) -> PResult<Expr> {
        self.expect(TokenKind::OpenSquare, "'['")?;
        let mut items = Vec::new();
        if !self.check(TokenKind::CloseSquare) {
            loop {
                items.push(self.parse_expr(0)?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenKind::CloseSquare, "']'")?;
        Ok(Expr::ListLit(ListLit { items }))
    }

    fn parse_name_primary(&mut self) -> PResult<Expr> {
        let position = self.current_position();
        let name = self.advance().expect("peeked").content.clone();
        // `every(Type)` takes a bare component-type name, not a resolvable
        // expression, so it is special-cased ahead of the generic call path.
        if name == "every" && self.check(TokenKind::OpenCurve) {
            self.advance();
            let component_type = self.expect(TokenKind::Name, "a component type")?.content.clone();
            self.expect(TokenKind::CloseCurve, "')'")?;
            return Ok(Expr::EveryComponent(EveryComponent { component_type }));
        }
        if self.check(TokenKind::OpenCurve) {
            let args = self.parse_args()?;
            return self.build_call(name, args, position);
        }
        if let Some(component) = self.names.component(&name) {
            return Ok(Expr::Component(Component { name, component_type: component.component_type.clone() }));
        }
        let global = false;
        let signature = self.aggregator.resolve_or_defer(&self.scopes, &name, position).unwrap_or(Signature::Any);
        Ok(Expr::Get(Get { global, name, value_signature: signature }))
    }

    fn build_call(&mut self, name: String, args: Vec<Expr>, position: Position) -> PResult<Expr> {
        if let Some(sig) = lookup_builtin(&name) {
            return Ok(Expr::FuncCall(FuncCall { name, args, result_signature: sig.result }));
        }
        if let Some(proc_sig) = self.names.procedure(&name) {
            return Ok(Expr::ProcCall(ProcCall { name, args, result_signature: proc_sig.result }));
        }
        Err(ParseError::new(ParseErrorKind::UnknownBuiltin(name), position))
    }
}

/// The instance name a `PropertySet` records alongside its receiver: the
/// bare instance name for a `Component` receiver, the rendered surface text
/// of anything else (mirrors `loom-blocks`'s own `instance_name_of` helper).
fn component_receiver_name(receiver: &Expr) -> String {
    match receiver {
        Expr::Component(c) => c.name.clone(),
        other => other.render_surface(),
    }
}

/// Whether `expr`'s tree contains an unqualified reference to any name in
/// `names` - used by `parse_local` to decide whether a new `local` line can
/// join the current parallel group or must start a nested one instead.
/// Walks every `Expr`-typed field of every variant directly rather than
/// through a shared visitor trait, matching the "one big match" dispatch
/// convention `to_block`/`from_block` already use in `loom-blocks`.
fn references_any(expr: &Expr, names: &[String]) -> bool {
    let any = |e: &Expr| references_any(e, names);
    let any_vec = |v: &[Expr]| v.iter().any(any);
    match expr {
        Expr::Get(g) => !g.global && names.iter().any(|n| n == &g.name),
        Expr::Boolean(_)
        | Expr::Number(_)
        | Expr::Text(_)
        | Expr::Color(_)
        | Expr::Component(_)
        | Expr::EmptySocket(_)
        | Expr::WalkAll(_)
        | Expr::Break(_)
        | Expr::EveryComponent(_) => false,
        Expr::HelperDropdown(h) => names.iter().any(|n| n == &h.key),
        Expr::ListLit(l) => any_vec(&l.items),
        Expr::Pair(p) => any(&p.key) || any(&p.value),
        Expr::Dictionary(d) => any_vec(&d.pairs),
        Expr::SmartBody(s) => any_vec(&s.body),
        Expr::Not(n) => any(&n.expr),

        Expr::GlobalDecl(g) => any(&g.value),
        Expr::Set(s) => any(&s.value),
        Expr::SimpleVar(v) => any(&v.value) || any(&v.body),
        Expr::Var(v) => v.values.iter().any(any) || any(&v.body),
        Expr::VarResult(v) => v.values.iter().any(any) || any(&v.result),

        Expr::If(i) => any(&i.condition) || any(&i.then_branch) || i.else_branch.as_deref().map_or(false, any),
        Expr::For(f) => any(&f.from) || any(&f.to) || any(&f.by) || any(&f.body),
        Expr::Each(e) => any(&e.iterable) || any(&e.body),
        Expr::EachPair(e) => any(&e.iterable) || any(&e.body),
        Expr::While(w) => any(&w.condition) || any(&w.body),
        Expr::Do(d) => any(&d.body) || any(&d.result),

        Expr::BinaryExpr(b) => any_vec(&b.operands),
        Expr::Question(q) => any(&q.condition) || any(&q.then_value) || any(&q.else_value),
        Expr::Transform(t) => any(&t.source),
        Expr::FuncCall(f) => any_vec(&f.args),
        Expr::Call(c) => any(&c.receiver) || any_vec(&c.args),
        Expr::ListTransform(l) => any(&l.list) || any_vec(&l.args),

        Expr::Event(e) => any(&e.body),
        Expr::GenericEvent(e) => any(&e.body),
        Expr::MethodCall(m) => any(&m.receiver) || any_vec(&m.args),
        Expr::GenericMethodCall(m) => any(&m.component) || any_vec(&m.args),
        Expr::PropertyGet(p) => any(&p.receiver),
        Expr::PropertySet(p) => any(&p.receiver) || any(&p.value),
        Expr::GenericPropertyGet(p) => any(&p.component),
        Expr::GenericPropertySet(p) => any(&p.component) || any(&p.value),

        Expr::VoidProcedure(p) => any(&p.body),
        Expr::RetProcedure(p) => any(&p.body),
        Expr::ProcCall(p) => any_vec(&p.args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_lexer::Lexer;

    fn parse_one(source: &str) -> Expr {
        let tokens = Lexer::tokenize(source).unwrap();
        let mut items = Parser::new(&tokens, true).parse_program().unwrap();
        assert_eq!(items.len(), 1);
        items.pop().unwrap()
    }

    fn parse_one_with_components(source: &str, components: &std::collections::HashMap<String, Vec<String>>) -> Expr {
        let tokens = Lexer::tokenize(source).unwrap();
        let mut parser = Parser::new(&tokens, true);
        parser.register_components(components);
        let mut items = parser.parse_program().unwrap();
        assert_eq!(items.len(), 1);
        items.pop().unwrap()
    }

    #[test]
    fn folds_repeated_plus_into_one_nary_node() {
        let expr = parse_one("1 + 2 + 3");
        match expr {
            Expr::BinaryExpr(b) => assert_eq!(b.operands.len(), 3),
            other => panic!("expected BinaryExpr, got {other:?}"),
        }
    }

    #[test]
    fn minus_never_folds_and_stays_pairwise() {
        let expr = parse_one("1 - 2 - 3");
        match expr {
            Expr::BinaryExpr(outer) => {
                assert_eq!(outer.operands.len(), 2);
                assert!(matches!(outer.operands[0], Expr::BinaryExpr(_)));
            }
            other => panic!("expected BinaryExpr, got {other:?}"),
        }
    }

    #[test]
    fn precedence_binds_times_tighter_than_plus() {
        let expr = parse_one("1 + 2 * 3");
        match expr {
            Expr::BinaryExpr(b) => {
                assert_eq!(b.operands.len(), 2);
                assert!(matches!(b.operands[1], Expr::BinaryExpr(_)));
            }
            other => panic!("expected BinaryExpr, got {other:?}"),
        }
    }

    #[test]
    fn global_declaration_then_assignment() {
        let tokens = Lexer::tokenize("global x = 1\nx = 2").unwrap();
        let items = Parser::new(&tokens, true).parse_program().unwrap();
        assert!(matches!(items[0], Expr::GlobalDecl(_)));
        assert!(matches!(items[1], Expr::Set(_)));
    }

    #[test]
    fn if_else_parses_both_branches() {
        let expr = parse_one("if true { 1 } else { 2 }");
        match expr {
            Expr::If(i) => assert!(i.else_branch.is_some()),
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn else_if_chains_into_nested_if() {
        let expr = parse_one("if x > 0 { 1 } else if x < 0 { 2 } else { 3 }");
        match expr {
            Expr::If(outer) => match outer.else_branch.as_deref() {
                Some(Expr::If(inner)) => assert!(inner.else_branch.is_some()),
                other => panic!("expected nested If in else branch, got {other:?}"),
            },
            other => panic!("expected If, got {other:?}"),
        }
    }

    #[test]
    fn ternary_question_colon() {
        let expr = parse_one("true ? 1 : 2");
        assert!(matches!(expr, Expr::Question(_)));
    }

    #[test]
    fn compound_assignment_rewrites_to_set_of_binary() {
        let tokens = Lexer::tokenize("global x = 1\nx += 2").unwrap();
        let items = Parser::new(&tokens, true).parse_program().unwrap();
        match &items[1] {
            Expr::Set(s) => match s.value.as_ref() {
                Expr::BinaryExpr(b) => {
                    assert_eq!(b.op, TokenKind::Plus);
                    assert_eq!(b.operands.len(), 2);
                }
                other => panic!("expected BinaryExpr, got {other:?}"),
            },
            other => panic!("expected Set, got {other:?}"),
        }
    }

    #[test]
    fn this_dot_name_is_a_global_get() {
        let expr = parse_one("this.Score");
        match expr {
            Expr::Get(g) => assert!(g.global),
            other => panic!("expected Get, got {other:?}"),
        }
    }

    #[test]
    fn each_pair_parses_comma_form() {
        let expr = parse_one("for k, v in d { break }");
        assert!(matches!(expr, Expr::EachPair(_)));
    }

    #[test]
    fn var_result_term_parses_as_compute_expression() {
        let expr = parse_one("local y = compute(a = 1) -> a + 1 { y }");
        match expr {
            Expr::SimpleVar(v) => assert!(matches!(*v.value, Expr::VarResult(_))),
            other => panic!("expected SimpleVar wrapping VarResult, got {other:?}"),
        }
    }

    #[test]
    fn component_dot_property_builds_property_get_and_set() {
        let mut components = std::collections::HashMap::new();
        components.insert("Button".to_string(), vec!["Button1".to_string()]);
        let expr = parse_one_with_components("Button1.Text = \"hi\"", &components);
        match expr {
            Expr::PropertySet(p) => assert_eq!(p.instance_name, "Button1"),
            other => panic!("expected PropertySet, got {other:?}"),
        }
    }

    #[test]
    fn component_dot_call_builds_method_call_not_generic_call() {
        let mut components = std::collections::HashMap::new();
        components.insert("Button".to_string(), vec!["Button1".to_string()]);
        let expr = parse_one_with_components("Button1.Click()", &components);
        assert!(matches!(expr, Expr::MethodCall(_)));
    }

    #[test]
    fn double_colon_transform_builds_transform_node() {
        let expr = parse_one("global x = 1 :: Text");
        match expr {
            Expr::GlobalDecl(g) => assert!(matches!(*g.value, Expr::Transform(_))),
            other => panic!("expected GlobalDecl wrapping Transform, got {other:?}"),
        }
    }

    #[test]
    fn list_transformer_postfix_builds_list_transform() {
        let expr = parse_one("[1, 2, 3].filter { x -> x }");
        assert!(matches!(expr, Expr::ListTransform(_)));
    }

    #[test]
    fn every_of_type_builds_every_component() {
        let expr = parse_one("every(Button)");
        match expr {
            Expr::EveryComponent(e) => assert_eq!(e.component_type, "Button"),
            other => panic!("expected EveryComponent, got {other:?}"),
        }
    }

    #[test]
    fn generic_any_component_property_get() {
        let expr = parse_one("any Button(b).Text");
        assert!(matches!(expr, Expr::GenericPropertyGet(_)));
    }

    #[test]
    fn leading_component_declaration_registers_instance() {
        let tokens = Lexer::tokenize("@Button { Button1 }\nButton1.Click()").unwrap();
        let items = Parser::new(&tokens, true).parse_program().unwrap();
        assert!(matches!(items[0], Expr::MethodCall(_)));
    }

    #[test]
    fn break_outside_loop_is_a_parse_error() {
        let tokens = Lexer::tokenize("break").unwrap();
        assert!(Parser::new(&tokens, true).parse_program().is_err());
    }

    #[test]
    fn local_has_no_block_of_its_own() {
        // `local`'s body is whatever statement follows, not a mandatory
        // trailing `{ ... }` of its own.
        let expr = parse_one("local x = 1\nx + 1");
        match expr {
            Expr::SimpleVar(v) => {
                assert_eq!(v.name, "x");
                match *v.body {
                    Expr::SmartBody(b) => assert_eq!(b.body.len(), 1),
                    other => panic!("expected SmartBody body, got {other:?}"),
                }
            }
            other => panic!("expected SimpleVar, got {other:?}"),
        }
    }

    #[test]
    fn independent_local_lines_chain_into_nested_var_bodies() {
        // A `local` line whose value doesn't reference a name bound by an
        // earlier `local` line starts its own nested scope rather than
        // joining the first line's group (SPEC_FULL.md §8 Scenario C).
        let expr = parse_one("local x = 1\nlocal y = x + 1");
        match expr {
            Expr::SimpleVar(outer) => {
                assert_eq!(outer.name, "x");
                match *outer.body {
                    Expr::SmartBody(b) => {
                        assert_eq!(b.body.len(), 1);
                        match &b.body[0] {
                            Expr::SimpleVar(inner) => assert_eq!(inner.name, "y"),
                            other => panic!("expected nested SimpleVar, got {other:?}"),
                        }
                    }
                    other => panic!("expected SmartBody body, got {other:?}"),
                }
            }
            other => panic!("expected SimpleVar, got {other:?}"),
        }
    }

    #[test]
    fn local_lines_with_no_cross_reference_group_into_one_var() {
        let expr = parse_one("local x = 1\nlocal y = 2\nx + y");
        match expr {
            Expr::Var(v) => assert_eq!(v.names, vec!["x".to_string(), "y".to_string()]),
            other => panic!("expected Var grouping both bindings, got {other:?}"),
        }
    }

    #[test]
    fn global_outside_root_is_a_parse_error() {
        let tokens = Lexer::tokenize("if true { global x = 1 }").unwrap();
        assert!(Parser::new(&tokens, true).parse_program().is_err());
    }
}
