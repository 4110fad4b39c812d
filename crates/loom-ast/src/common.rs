use loom_common::TokenKind;

use crate::expr::Expr;
use crate::signature::Signature;

/// An N-ary binary expression. Contiguous runs of the same operator are
/// folded into a single node at parse time (`a + b + c` is one `BinaryExpr`
/// with three operands), except for `-`, `/`, `^`, which never fold and
/// always appear with exactly two operands — see `can_repeat`.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: TokenKind,
    pub spelling: String,
    pub operands: Vec<Expr>,
}

impl BinaryExpr {
    /// Whether this operator is allowed to fold a run of itself into one
    /// node. `-`, `/`, `^` are excluded: they lack the `Compoundable`
    /// flag/carry `PreserveOrder`, so the parser keeps them strictly
    /// pairwise left-to-right instead.
    pub fn can_repeat(op: TokenKind) -> bool {
        !matches!(op, TokenKind::Dash | TokenKind::Slash | TokenKind::Power)
    }

    pub fn render_surface(&self) -> String {
        self.operands
            .iter()
            .map(|o| {
                if o.continuous() {
                    o.render_surface()
                } else {
                    format!("({})", o.render_surface())
                }
            })
            .collect::<Vec<_>>()
            .join(&format!(" {} ", self.spelling))
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        use TokenKind::*;
        match self.op {
            LogicOr | LogicAnd | Equals | NotEquals | TextEquals | TextNotEquals | LessThan
            | LessThanEqual | GreatThan | GreaterThanEqual | TextLessThan | TextGreaterThan => {
                Signature::Bool
            }
            Underscore => Signature::Text,
            _ => Signature::Number,
        }
    }
}

/// `condition ? then_value : else_value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub condition: Box<Expr>,
    pub then_value: Box<Expr>,
    pub else_value: Box<Expr>,
}

impl Question {
    pub fn render_surface(&self) -> String {
        format!(
            "{} ? {} : {}",
            self.condition.render_surface(),
            self.then_value.render_surface(),
            self.else_value.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.then_value.signature()
    }
}

/// `source -> TargetType`, a coercion of one signature into another.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    pub source: Box<Expr>,
    pub target_type: String,
    pub result_signature: Signature,
}

impl Transform {
    pub fn render_surface(&self) -> String {
        format!("{} -> {}", self.source.render_surface(), self.target_type)
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// A call to a builtin free function resolved through the catalog's builtin
/// table (the `math_*`/`lists_*`/`control_*`/... block family), as opposed
/// to a method dispatched on a receiver value (see `Call`).
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub result_signature: Signature,
}

impl FuncCall {
    pub fn render_surface(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({})", self.name, args)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// `receiver.method(args...)` — a method dispatched on a primitive receiver
/// (text, list, dict, matrix), resolved through the catalog's
/// method-on-receiver table. Named `Call` (not `MethodCall`) to keep it
/// distinct from the component-instance method call in `components`.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub receiver: Box<Expr>,
    pub method: String,
    pub args: Vec<Expr>,
    pub result_signature: Signature,
}

impl Call {
    pub fn render_surface(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}.{}({})", self.receiver.render_surface(), self.method, args)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result_signature
    }
}

/// A chained list-processing stage dispatched through the catalog's
/// list-transformer registry (`sortBy`, `filter`, ...), kept distinct from
/// `Call` because transformers compose through a dedicated mutation shape
/// rather than a flat value-socket list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListTransform {
    pub list: Box<Expr>,
    pub transformer: String,
    pub args: Vec<Expr>,
}

impl ListTransform {
    pub fn render_surface(&self) -> String {
        let args = self
            .args
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}.{}({})", self.list.render_surface(), self.transformer, args)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::List
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::Number;

    #[test]
    fn minus_never_folds() {
        assert!(!BinaryExpr::can_repeat(TokenKind::Dash));
        assert!(!BinaryExpr::can_repeat(TokenKind::Slash));
        assert!(!BinaryExpr::can_repeat(TokenKind::Power));
        assert!(BinaryExpr::can_repeat(TokenKind::Plus));
    }

    #[test]
    fn binary_expr_signature_by_operator_family() {
        let cmp = BinaryExpr {
            op: TokenKind::LessThan,
            spelling: "<".into(),
            operands: vec![
                Expr::Number(Number { content: "1".into() }),
                Expr::Number(Number { content: "2".into() }),
            ],
        };
        assert_eq!(cmp.signature(), Signature::Bool);
    }
}
