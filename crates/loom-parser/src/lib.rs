//! The Surface parser: a statement grammar layered over a
//! precedence-climbing expression loop driven by the flag lattice in
//! `loom-common`, plus the scope/name bookkeeping from `loom-resolve` needed
//! to resolve variable, procedure, and component references as they're
//! parsed.

pub mod error;
pub mod parser;

pub use error::{ParseError, ParseErrorKind};
pub use parser::Parser;

use std::collections::HashMap;

use loom_ast::Expr;

/// Parses a whole Surface translation unit. `strict` controls whether names
/// still unresolved after the full unit has been scanned are reported as
/// errors (`true`) or silently left as `Any`-typed references (`false`).
/// `components` maps each component type to its declared instance names, so
/// `when Instance.Event` handlers can resolve their receiver's type.
pub fn parse(
    tokens: &[loom_common::Token],
    strict: bool,
    components: &HashMap<String, Vec<String>>,
) -> Result<Vec<Expr>, Vec<ParseError>> {
    let mut parser = Parser::new(tokens, strict);
    parser.register_components(components);
    parser.parse_program()
}

#[cfg(test)]
mod tests {
    use super::*;
    use loom_lexer::Lexer;

    #[test]
    fn parses_a_small_program() {
        let tokens = Lexer::tokenize("global total = 0\nfunc bump() {\n total = total + 1\n}").unwrap();
        let items = parse(&tokens, true, &HashMap::new()).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn non_strict_mode_tolerates_unresolved_names() {
        let tokens = Lexer::tokenize("println(undeclaredGlobal)").unwrap();
        assert!(parse(&tokens, false, &HashMap::new()).is_ok());
    }

    #[test]
    fn strict_mode_rejects_unresolved_names() {
        let tokens = Lexer::tokenize("println(undeclaredGlobal)").unwrap();
        assert!(parse(&tokens, true, &HashMap::new()).is_err());
    }

    #[test]
    fn event_handler_resolves_registered_component_type() {
        let tokens = Lexer::tokenize("when Button1.Click { println(\"hi\") }").unwrap();
        let mut components = HashMap::new();
        components.insert("Button".to_string(), vec!["Button1".to_string()]);
        let items = parse(&tokens, true, &components).unwrap();
        match &items[0] {
            Expr::Event(e) => assert_eq!(e.component_type, "Button"),
            other => panic!("expected Event, got {other:?}"),
        }
    }
}
