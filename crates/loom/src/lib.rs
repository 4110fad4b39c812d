//! Facade crate: the two pure functions that wire the lexer, parser, AST,
//! and Blocks XML model together in each direction. Everything fallible
//! each stage can produce is folded into [`LoomError`].

pub mod error;

use std::collections::HashMap;

use loom_blocks::{from_block, to_block, Block};
use loom_lexer::Lexer;
use serde::{Deserialize, Serialize};

pub use error::LoomError;

/// The root `<xml>` element: a flat list of top-level blocks, mirroring
/// Blockly's own document shape (one block per top-level statement/handler,
/// chained through `next` only within a single handler's body).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "xml")]
struct Document {
    #[serde(rename = "block", default)]
    blocks: Vec<Block>,
}

/// Translates a Surface source file into its Blocks XML serialization.
/// `components` maps each component type to its declared instance names, so
/// `when Instance.Event` handlers in `source` can resolve their receiver.
pub fn surface_to_blocks(source: &str, components: &HashMap<String, Vec<String>>) -> Result<String, LoomError> {
    let tokens = Lexer::tokenize(source).map_err(LoomError::from)?;
    let items = loom_parser::parse(&tokens, true, components).map_err(LoomError::from)?;
    let blocks = items.iter().map(|item| to_block(item, true)).collect();
    let document = Document { blocks };
    quick_xml::se::to_string(&document).map_err(LoomError::Serialize)
}

/// Translates a Blocks XML document back into Surface source.
pub fn blocks_to_surface(xml: &str) -> Result<String, LoomError> {
    let document: Document = quick_xml::de::from_str(xml).map_err(LoomError::Deserialize)?;
    let items = document
        .blocks
        .iter()
        .map(from_block)
        .collect::<Result<Vec<_>, _>>()
        .map_err(LoomError::from)?;
    Ok(items.iter().map(|e| e.render_surface()).collect::<Vec<_>>().join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_decl_round_trips_through_blocks() {
        let xml = surface_to_blocks("global total = 0", &HashMap::new()).unwrap();
        assert!(xml.contains("global_declaration"));
        let back = blocks_to_surface(&xml).unwrap();
        assert_eq!(back, "global total = 0");
    }

    #[test]
    fn event_handler_round_trips_with_component_registry() {
        let mut components = HashMap::new();
        components.insert("Button".to_string(), vec!["Button1".to_string()]);
        let xml = surface_to_blocks("when Button1.Click { println(\"hi\") }", &components).unwrap();
        assert!(xml.contains("component_event"));
        let back = blocks_to_surface(&xml).unwrap();
        assert!(back.contains("when Button1.Click()"));
    }

    #[test]
    fn malformed_xml_is_a_deserialize_error() {
        assert!(blocks_to_surface("<not-xml").is_err());
    }
}
