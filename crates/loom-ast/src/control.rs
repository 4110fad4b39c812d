use crate::expr::Expr;
use crate::signature::Signature;

/// `if cond { then } else { otherwise }`. `otherwise` is `None` for a
/// branch-less `if`.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Box<Expr>,
    pub then_branch: Box<Expr>,
    pub else_branch: Option<Box<Expr>>,
}

impl If {
    pub fn render_surface(&self) -> String {
        let mut out = format!(
            "if {} {{\n{}\n}}",
            self.condition.render_surface(),
            self.then_branch.render_surface()
        );
        if let Some(else_branch) = &self.else_branch {
            out.push_str(&format!(" else {{\n{}\n}}", else_branch.render_surface()));
        }
        out
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `for i in from..to step by { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub index_name: String,
    pub from: Box<Expr>,
    pub to: Box<Expr>,
    pub by: Box<Expr>,
    pub body: Box<Expr>,
}

impl For {
    pub fn render_surface(&self) -> String {
        format!(
            "for {} in {}..{} step {} {{\n{}\n}}",
            self.index_name,
            self.from.render_surface(),
            self.to.render_surface(),
            self.by.render_surface(),
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `for name in iterable { body }` — single-binding iteration over a list.
#[derive(Debug, Clone, PartialEq)]
pub struct Each {
    pub item_name: String,
    pub iterable: Box<Expr>,
    pub body: Box<Expr>,
}

impl Each {
    pub fn render_surface(&self) -> String {
        format!(
            "for {} in {} {{\n{}\n}}",
            self.item_name,
            self.iterable.render_surface(),
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `for key, value in iterable { body }` — paired iteration over a dict.
#[derive(Debug, Clone, PartialEq)]
pub struct EachPair {
    pub key_name: String,
    pub value_name: String,
    pub iterable: Box<Expr>,
    pub body: Box<Expr>,
}

impl EachPair {
    pub fn render_surface(&self) -> String {
        format!(
            "for {}, {} in {} {{\n{}\n}}",
            self.key_name,
            self.value_name,
            self.iterable.render_surface(),
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `while condition { body }`, tested before each iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub condition: Box<Expr>,
    pub body: Box<Expr>,
}

impl While {
    pub fn render_surface(&self) -> String {
        format!(
            "while {} {{\n{}\n}}",
            self.condition.render_surface(),
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `do { body } while result` — a body run once, then an expression
/// evaluated and returned alongside it, lowered to
/// `controls_do_then_return`.
#[derive(Debug, Clone, PartialEq)]
pub struct Do {
    pub body: Box<Expr>,
    pub result: Box<Expr>,
}

impl Do {
    pub fn render_surface(&self) -> String {
        format!(
            "do {{\n{}\n}} {}",
            self.body.render_surface(),
            self.result.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.result.signature()
    }
}

/// `break`, exits the innermost enclosing loop.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Break;

impl Break {
    pub fn render_surface(&self) -> String {
        "break".into()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, is_statement: bool) -> bool {
        is_statement
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::{Boolean, Number};

    #[test]
    fn if_without_else_omits_branch() {
        let stmt = If {
            condition: Box::new(Expr::Boolean(Boolean { value: true })),
            then_branch: Box::new(Expr::Number(Number { content: "1".into() })),
            else_branch: None,
        };
        assert!(!stmt.render_surface().contains("else"));
    }

    #[test]
    fn do_signature_follows_result() {
        let d = Do {
            body: Box::new(Expr::Break(Break)),
            result: Box::new(Expr::Number(Number { content: "1".into() })),
        };
        assert_eq!(d.signature(), Signature::Number);
    }
}
