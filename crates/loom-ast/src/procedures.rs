use crate::expr::Expr;
use crate::signature::Signature;

/// `func name(params...) { body }` — a procedure with no return value,
/// lowered to `procedures_defnoreturn`.
#[derive(Debug, Clone, PartialEq)]
pub struct VoidProcedure {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Box<Expr>,
}

impl VoidProcedure {
    pub fn render_surface(&self) -> String {
        format!(
            "func {}({}) {{\n{}\n}}",
            self.name,
            self.parameters.join(", "),
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

/// `compute name(params...) { body }` — a procedure that yields a value,
/// lowered to `procedures_defreturn`.
#[derive(Debug, Clone, PartialEq)]
pub struct RetProcedure {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Box<Expr>,
    pub result_signature: Signature,
}

impl RetProcedure {
    pub fn render_surface(&self) -> String {
        format!(
            "compute {}({}) {{\n{}\n}}",
            self.name,
            self.parameters.join(", "),
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

/// A call site invoking a previously declared `func`/`compute`. Named
/// `ProcCall` (not `Call`) to avoid colliding with the primitive-receiver
/// `Call` in `common` and the component-instance `MethodCall` in
/// `components`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub result_signature: Signature,
}

impl ProcCall {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn void_procedure_has_void_signature() {
        let p = VoidProcedure {
            name: "doThing".into(),
            parameters: vec!["x".into()],
            body: Box::new(Expr::Break(crate::control::Break)),
        };
        assert_eq!(p.signature(), Signature::Void);
    }

    #[test]
    fn proc_call_renders_args() {
        let call = ProcCall {
            name: "add".into(),
            args: vec![Expr::Number(crate::fundamentals::Number { content: "1".into() })],
            result_signature: Signature::Number,
        };
        assert_eq!(call.render_surface(), "add(1)");
    }
}
