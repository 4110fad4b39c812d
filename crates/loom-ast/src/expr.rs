use crate::common::{BinaryExpr, Call, FuncCall, ListTransform, Question, Transform};
use crate::components::{
    Event, EveryComponent, GenericEvent, GenericMethodCall, GenericPropertyGet, GenericPropertySet,
    MethodCall, PropertyGet, PropertySet,
};
use crate::control::{Break, Do, Each, EachPair, For, If, While};
use crate::fundamentals::{
    Boolean, Color, Component, Dictionary, EmptySocket, HelperDropdown, ListLit, Not, Number, Pair,
    SmartBody, Text, WalkAll,
};
use crate::procedures::{ProcCall, RetProcedure, VoidProcedure};
use crate::signature::Signature;
use crate::variables::{GlobalDecl, Get, Set, SimpleVar, Var, VarResult};

/// The closed universe of Surface expression and statement nodes. A node
/// answers four questions about itself, independent of where it sits in the
/// tree: its surface-syntax rendering, whether it can be written bare inside
/// a larger expression without parenthesization (`continuous`), whether it
/// is a legal standalone unit at the position it appears in
/// (`consumable(is_statement)`), and the coarse type its value carries
/// (`signature`). `to_block`/`from_block` live one crate over, in
/// `loom-blocks`, to avoid a dependency cycle between the AST and the
/// Blocks model.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Boolean(Boolean),
    Number(Number),
    Text(Text),
    Color(Color),
    ListLit(ListLit),
    Pair(Pair),
    Dictionary(Dictionary),
    Component(Component),
    HelperDropdown(HelperDropdown),
    EmptySocket(EmptySocket),
    WalkAll(WalkAll),
    SmartBody(SmartBody),
    Not(Not),

    GlobalDecl(GlobalDecl),
    Get(Get),
    Set(Set),
    SimpleVar(SimpleVar),
    Var(Var),
    VarResult(VarResult),

    If(If),
    For(For),
    Each(Each),
    EachPair(EachPair),
    While(While),
    Do(Do),
    Break(Break),

    BinaryExpr(BinaryExpr),
    Question(Question),
    Transform(Transform),
    FuncCall(FuncCall),
    Call(Call),
    ListTransform(ListTransform),

    Event(Event),
    GenericEvent(GenericEvent),
    MethodCall(MethodCall),
    GenericMethodCall(GenericMethodCall),
    PropertyGet(PropertyGet),
    PropertySet(PropertySet),
    GenericPropertyGet(GenericPropertyGet),
    GenericPropertySet(GenericPropertySet),
    EveryComponent(EveryComponent),

    VoidProcedure(VoidProcedure),
    RetProcedure(RetProcedure),
    ProcCall(ProcCall),
}

macro_rules! dispatch {
    ($self:expr, $method:ident $(, $arg:expr)?) => {
        match $self {
            Expr::Boolean(n) => n.$method($($arg)?),
            Expr::Number(n) => n.$method($($arg)?),
            Expr::Text(n) => n.$method($($arg)?),
            Expr::Color(n) => n.$method($($arg)?),
            Expr::ListLit(n) => n.$method($($arg)?),
            Expr::Pair(n) => n.$method($($arg)?),
            Expr::Dictionary(n) => n.$method($($arg)?),
            Expr::Component(n) => n.$method($($arg)?),
            Expr::HelperDropdown(n) => n.$method($($arg)?),
            Expr::EmptySocket(n) => n.$method($($arg)?),
            Expr::WalkAll(n) => n.$method($($arg)?),
            Expr::SmartBody(n) => n.$method($($arg)?),
            Expr::Not(n) => n.$method($($arg)?),

            Expr::GlobalDecl(n) => n.$method($($arg)?),
            Expr::Get(n) => n.$method($($arg)?),
            Expr::Set(n) => n.$method($($arg)?),
            Expr::SimpleVar(n) => n.$method($($arg)?),
            Expr::Var(n) => n.$method($($arg)?),
            Expr::VarResult(n) => n.$method($($arg)?),

            Expr::If(n) => n.$method($($arg)?),
            Expr::For(n) => n.$method($($arg)?),
            Expr::Each(n) => n.$method($($arg)?),
            Expr::EachPair(n) => n.$method($($arg)?),
            Expr::While(n) => n.$method($($arg)?),
            Expr::Do(n) => n.$method($($arg)?),
            Expr::Break(n) => n.$method($($arg)?),

            Expr::BinaryExpr(n) => n.$method($($arg)?),
            Expr::Question(n) => n.$method($($arg)?),
            Expr::Transform(n) => n.$method($($arg)?),
            Expr::FuncCall(n) => n.$method($($arg)?),
            Expr::Call(n) => n.$method($($arg)?),
            Expr::ListTransform(n) => n.$method($($arg)?),

            Expr::Event(n) => n.$method($($arg)?),
            Expr::GenericEvent(n) => n.$method($($arg)?),
            Expr::MethodCall(n) => n.$method($($arg)?),
            Expr::GenericMethodCall(n) => n.$method($($arg)?),
            Expr::PropertyGet(n) => n.$method($($arg)?),
            Expr::PropertySet(n) => n.$method($($arg)?),
            Expr::GenericPropertyGet(n) => n.$method($($arg)?),
            Expr::GenericPropertySet(n) => n.$method($($arg)?),
            Expr::EveryComponent(n) => n.$method($($arg)?),

            Expr::VoidProcedure(n) => n.$method($($arg)?),
            Expr::RetProcedure(n) => n.$method($($arg)?),
            Expr::ProcCall(n) => n.$method($($arg)?),
        }
    };
}

impl Expr {
    pub fn render_surface(&self) -> String {
        dispatch!(self, render_surface)
    }

    /// Whether this node can be embedded in a larger expression without
    /// wrapping parentheses (e.g. a literal is continuous, a binary
    /// expression is not).
    pub fn continuous(&self) -> bool {
        dispatch!(self, continuous)
    }

    /// Whether this node is a legal standalone unit at the position it sits
    /// in; `is_statement` distinguishes a body/statement-list slot from a
    /// nested-expression slot.
    pub fn consumable(&self, is_statement: bool) -> bool {
        dispatch!(self, consumable, is_statement)
    }

    pub fn signature(&self) -> Signature {
        dispatch!(self, signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_nodes_are_continuous_and_consumable() {
        let n = Expr::Number(Number { content: "42".into() });
        assert!(n.continuous());
        assert!(n.consumable(true));
        assert!(n.consumable(false));
        assert_eq!(n.signature(), Signature::Number);
    }

    #[test]
    fn control_nodes_require_statement_position() {
        let stmt = Expr::Break(Break);
        assert!(stmt.consumable(true));
    }
}
