use crate::expr::Expr;
use crate::signature::Signature;

/// A top-level `global name = value` declaration. Distinct from [`Set`]: this
/// introduces the binding, `Set` only ever assigns to one already in scope.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalDecl {
    pub name: String,
    pub value: Box<Expr>,
}

impl GlobalDecl {
    pub fn render_surface(&self) -> String {
        format!("global {} = {}", self.name, self.value.render_surface())
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

/// A variable reference, `name` or `global name`.
#[derive(Debug, Clone, PartialEq)]
pub struct Get {
    pub global: bool,
    pub name: String,
    pub value_signature: Signature,
}

impl Get {
    pub fn render_surface(&self) -> String {
        if self.global {
            format!("global {}", self.name)
        } else {
            self.name.clone()
        }
    }
    pub fn continuous(&self) -> bool {
        true
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.value_signature
    }
}

/// An assignment to an already-declared variable. The hoisting pass run over
/// `SmartBody` rewrites bare `SimpleVar` elements found mid-body into one of
/// these, so the rewritten form reads as a normal statement on reassembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub global: bool,
    pub name: String,
    pub value: Box<Expr>,
}

impl Set {
    pub fn render_surface(&self) -> String {
        if self.global {
            format!("global {} = {}", self.name, self.value.render_surface())
        } else {
            format!("{} = {}", self.name, self.value.render_surface())
        }
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        Signature::Void
    }
}

/// `local name = value { body }` — single-name local declaration scoping a
/// body. Mirrors `Var` but keeps the original's hardcoded `VAR0`/`DECL0`
/// single-slot field naming instead of the indexed `ToFields`/`ValuesByPrefix`
/// convention `Var` uses for its name list.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleVar {
    pub name: String,
    pub value: Box<Expr>,
    pub body: Box<Expr>,
}

impl SimpleVar {
    pub fn render_surface(&self) -> String {
        format!(
            "local {} = {} {{\n{}\n}}",
            self.name,
            self.value.render_surface(),
            self.body.render_surface()
        )
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.body.signature()
    }
}

/// `local a = 1, b = 2 { body }` — the multi-name local declaration. `names`
/// and `values` are parallel and always the same length.
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub names: Vec<String>,
    pub values: Vec<Expr>,
    pub body: Box<Expr>,
}

impl Var {
    pub fn render_surface(&self) -> String {
        let decls = self
            .names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| format!("{} = {}", n, v.render_surface()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("local {} {{\n{}\n}}", decls, self.body.render_surface())
    }
    pub fn continuous(&self) -> bool {
        false
    }
    pub fn consumable(&self, _is_statement: bool) -> bool {
        true
    }
    pub fn signature(&self) -> Signature {
        self.body.signature()
    }
}

/// The synthesized wrapper `SmartBody` hoisting produces: local declarations
/// gathered from `SimpleVar`s found mid-body, wrapped around the body's
/// trailing result expression rather than a statement sequence. Lowers to
/// `local_declaration_expression`, distinct from `Var`'s
/// `local_declaration_statement`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarResult {
    pub names: Vec<String>,
    pub values: Vec<Expr>,
    pub result: Box<Expr>,
}

impl VarResult {
    pub fn render_surface(&self) -> String {
        let decls = self
            .names
            .iter()
            .zip(self.values.iter())
            .map(|(n, v)| format!("{} = {}", n, v.render_surface()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("local {} {{ {} }}", decls, self.result.render_surface())
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fundamentals::Number;

    #[test]
    fn get_renders_global_prefix() {
        let g = Get {
            global: true,
            name: "Score".into(),
            value_signature: Signature::Number,
        };
        assert_eq!(g.render_surface(), "global Score");
    }

    #[test]
    fn var_zips_names_and_values() {
        let v = Var {
            names: vec!["a".into(), "b".into()],
            values: vec![
                Expr::Number(Number { content: "1".into() }),
                Expr::Number(Number { content: "2".into() }),
            ],
            body: Box::new(Expr::Number(Number { content: "3".into() })),
        };
        assert!(v.render_surface().contains("a = 1, b = 2"));
    }
}
