use serde::{Deserialize, Serialize};

/// A single Blocks-format block. Mirrors the on-disk XML element shape
/// directly: a type tag, an optional mutation, zero or more fields, value
/// sockets, statement sockets, and an optional trailing sibling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "block")]
pub struct Block {
    #[serde(rename = "@type")]
    pub block_type: String,
    #[serde(rename = "mutation", skip_serializing_if = "Option::is_none")]
    pub mutation: Option<Mutation>,
    #[serde(rename = "field", default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(rename = "value", default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<Value>,
    #[serde(rename = "statement", default, skip_serializing_if = "Vec::is_empty")]
    pub statements: Vec<Statement>,
    #[serde(rename = "next", skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Next>>,
}

impl Block {
    pub fn new(block_type: impl Into<String>) -> Self {
        Self {
            block_type: block_type.into(),
            mutation: None,
            fields: Vec::new(),
            values: Vec::new(),
            statements: Vec::new(),
            next: None,
        }
    }

    pub fn with_mutation(mut self, mutation: Mutation) -> Self {
        self.mutation = Some(mutation);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields.push(Field { name: name.into(), text: text.into() });
        self
    }

    pub fn with_value(mut self, name: impl Into<String>, block: Block) -> Self {
        self.values.push(Value { name: name.into(), block });
        self
    }

    /// Omits the socket entirely when `block` is `None`, matching how an
    /// `EmptySocket` child never produces an actual `<value>` element.
    pub fn with_optional_value(self, name: impl Into<String>, block: Option<Block>) -> Self {
        match block {
            Some(b) => self.with_value(name, b),
            None => self,
        }
    }

    pub fn with_statement(mut self, name: impl Into<String>, block: Block) -> Self {
        self.statements.push(Statement { name: name.into(), block });
        self
    }

    pub fn with_optional_statement(self, name: impl Into<String>, block: Option<Block>) -> Self {
        match block {
            Some(b) => self.with_statement(name, b),
            None => self,
        }
    }

    pub fn with_next(mut self, block: Block) -> Self {
        self.next = Some(Box::new(Next { block }));
        self
    }

    pub fn value(&self, name: &str) -> Option<&Block> {
        self.values.iter().find(|v| v.name == name).map(|v| &v.block)
    }

    pub fn statement(&self, name: &str) -> Option<&Block> {
        self.statements.iter().find(|s| s.name == name).map(|s| &s.block)
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.iter().find(|f| f.name == name).map(|f| f.text.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(rename = "$text")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Value {
    #[serde(rename = "@name")]
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "@name")]
    pub name: String,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Next {
    pub block: Block,
}

/// A procedure/local-declaration parameter name, the `<arg name="x"/>` and
/// `<localname name="x"/>` mutation children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedChild {
    #[serde(rename = "@name")]
    pub name: String,
}

/// The mutation element. Every field is optional: each block type only
/// ever populates the handful relevant to it. Kept as one flat struct
/// (rather than per-block-type mutation types) because quick-xml's serde
/// support has no clean way to pick a variant shape by the parent
/// `<block type="...">` attribute.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Mutation {
    #[serde(rename = "@component_type", skip_serializing_if = "Option::is_none")]
    pub component_type: Option<String>,
    #[serde(rename = "@instance_name", skip_serializing_if = "Option::is_none")]
    pub instance_name: Option<String>,
    #[serde(rename = "@event_name", skip_serializing_if = "Option::is_none")]
    pub event_name: Option<String>,
    #[serde(rename = "@method_name", skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,
    #[serde(rename = "@property_name", skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
    #[serde(rename = "@set_or_get", skip_serializing_if = "Option::is_none")]
    pub set_or_get: Option<String>,
    #[serde(rename = "@is_generic", skip_serializing_if = "Option::is_none")]
    pub is_generic: Option<bool>,
    #[serde(rename = "@items", skip_serializing_if = "Option::is_none")]
    pub items: Option<usize>,
    #[serde(rename = "@elseif", skip_serializing_if = "Option::is_none")]
    pub elseif: Option<usize>,
    #[serde(rename = "@else", skip_serializing_if = "Option::is_none")]
    pub has_else: Option<usize>,
    #[serde(rename = "@shape", skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(rename = "@key", skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "arg", default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<NamedChild>,
    #[serde(rename = "localname", default, skip_serializing_if = "Vec::is_empty")]
    pub local_names: Vec<NamedChild>,
}

impl Mutation {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_omits_empty_socket() {
        let b = Block::new("math_single").with_optional_value("NUM", None);
        assert!(b.value("NUM").is_none());
    }

    #[test]
    fn field_and_value_lookup() {
        let b = Block::new("text")
            .with_field("TEXT", "hi")
            .with_value("X", Block::new("math_number").with_field("NUM", "1"));
        assert_eq!(b.field("TEXT"), Some("hi"));
        assert_eq!(b.value("X").unwrap().block_type, "math_number");
    }
}
