use loom_ast::Signature;
use rustc_hash::FxHashMap;

/// A declared `func`/`compute`, registered before its body is scanned so
/// forward calls (a procedure invoking one declared later in the file)
/// resolve on the first pass.
#[derive(Debug, Clone)]
pub struct ProcedureSignature {
    pub param_count: usize,
    pub result: Signature,
}

/// A registered component instance, keyed by its instance name (`Button1`).
#[derive(Debug, Clone)]
pub struct ComponentInstance {
    pub component_type: String,
}

/// The translation unit's global tables: declared procedures and the
/// component instances supplied alongside the source (the scheme/screen
/// description, not Surface syntax itself).
#[derive(Debug, Default)]
pub struct NameTables {
    procedures: FxHashMap<String, ProcedureSignature>,
    components: FxHashMap<String, ComponentInstance>,
}

impl NameTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare_procedure(&mut self, name: impl Into<String>, sig: ProcedureSignature) {
        self.procedures.insert(name.into(), sig);
    }

    pub fn procedure(&self, name: &str) -> Option<&ProcedureSignature> {
        self.procedures.get(name)
    }

    pub fn register_component(&mut self, name: impl Into<String>, instance: ComponentInstance) {
        self.components.insert(name.into(), instance);
    }

    pub fn component(&self, name: &str) -> Option<&ComponentInstance> {
        self.components.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_declared_procedure_resolves() {
        let mut tables = NameTables::new();
        tables.declare_procedure("sum", ProcedureSignature { param_count: 2, result: Signature::Number });
        assert_eq!(tables.procedure("sum").unwrap().param_count, 2);
        assert!(tables.procedure("missing").is_none());
    }

    #[test]
    fn component_registration_round_trips() {
        let mut tables = NameTables::new();
        tables.register_component("Button1", ComponentInstance { component_type: "Button".into() });
        assert_eq!(tables.component("Button1").unwrap().component_type, "Button");
    }
}
