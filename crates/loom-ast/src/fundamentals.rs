use crate::expr::Expr;
use crate::signature::Signature;

#[derive(Debug, Clone, PartialEq)]
pub struct Boolean {
    pub value: bool,
}

impl Boolean {
    pub fn render_surface(&self) -> String {
        if self.value { "true".into() } else { "false".into() }
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Bool
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Number {
    pub content: String,
}

impl Number {
    pub fn render_surface(&self) -> String {
        self.content.clone()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Number
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    pub content: String,
}

impl Text {
    /// Escapes only `\` and `"`, mirroring the lexer's own restricted
    /// escape set: round-tripping never needs to invent `\n`/`\t` escapes
    /// because the lexer does not produce them either.
    pub fn render_surface(&self) -> String {
        let escaped = self.content.replace('\\', "\\\\").replace('"', "\\\"");
        format!("\"{escaped}\"")
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    /// Includes the leading `#`, exactly as lexed.
    pub hex: String,
}

impl Color {
    pub fn render_surface(&self) -> String {
        self.hex.clone()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Any
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLit {
    pub items: Vec<Expr>,
}

impl ListLit {
    pub fn render_surface(&self) -> String {
        let body = self
            .items
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("[{body}]")
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

#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

impl Pair {
    pub fn render_surface(&self) -> String {
        format!("{}: {}", self.key.render_surface(), self.value.render_surface())
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Any
    }
}

/// All-Pair bodies resolve to a dictionary literal; see [`crate::expr::Expr::SmartBody`].
#[derive(Debug, Clone, PartialEq)]
pub struct Dictionary {
    pub pairs: Vec<Expr>,
}

impl Dictionary {
    pub fn render_surface(&self) -> String {
        let body = self
            .pairs
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {body} }}")
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Dict
    }
}

/// A bare reference to a registered component instance (e.g. `Button1` used
/// as a receiver), resolved via the name resolver's component bimap.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub name: String,
    pub component_type: String,
}

impl Component {
    pub fn render_surface(&self) -> String {
        self.name.clone()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Component
    }
}

/// `key@option`, built from a postfix `@name` applied to a non-global `Get`.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperDropdown {
    pub key: String,
    pub option: String,
}

impl HelperDropdown {
    pub fn render_surface(&self) -> String {
        format!("{}@{}", self.key, self.option)
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Helper
    }
}

/// The canonical placeholder for an absent value socket.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EmptySocket;

impl EmptySocket {
    pub fn render_surface(&self) -> String {
        "undefined".into()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WalkAll;

impl WalkAll {
    pub fn render_surface(&self) -> String {
        "walkAll".into()
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Any
    }
}

/// A `{ ... }` body whose dictionary-vs-statement-sequence identity is
/// decided once the whole body has been parsed (see the parser's `term()`).
#[derive(Debug, Clone, PartialEq)]
pub struct SmartBody {
    pub body: Vec<Expr>,
}

impl SmartBody {
    pub fn render_surface(&self) -> String {
        let body = self
            .body
            .iter()
            .map(Expr::render_surface)
            .collect::<Vec<_>>()
            .join("\n");
        format!("{{\n{body}\n}}")
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.body.last().map(Expr::signature).unwrap_or(Signature::Void)
    }
    /// True iff every element is a `Pair` — the dictionary-literal reading.
    pub fn is_all_pairs(&self) -> bool {
        !self.body.is_empty() && self.body.iter().all(|e| matches!(e, Expr::Pair(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Not {
    pub expr: Box<Expr>,
}

impl Not {
    pub fn render_surface(&self) -> String {
        if self.expr.continuous() {
            format!("!{}", self.expr.render_surface())
        } else {
            format!("!({})", self.expr.render_surface())
        }
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Bool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_escapes_quote_and_backslash_only() {
        let t = Text { content: "a\"b\\c".into() };
        assert_eq!(t.render_surface(), r#""a\"b\\c""#);
    }

    #[test]
    fn smart_body_all_pairs_detection() {
        let dict_like = SmartBody {
            body: vec![
                Expr::Pair(Pair {
                    key: Box::new(Expr::Text(Text { content: "k".into() })),
                    value: Box::new(Expr::Number(Number { content: "1".into() })),
                }),
            ],
        };
        assert!(dict_like.is_all_pairs());

        let stmt_like = SmartBody {
            body: vec![Expr::Number(Number { content: "1".into() })],
        };
        assert!(!stmt_like.is_all_pairs());
    }
}
