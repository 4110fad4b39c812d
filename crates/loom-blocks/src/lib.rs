//! The Blocks XML model and the two lowerings between it and the Surface
//! AST. `to_block`/`from_block` are free functions here rather than
//! inherent `Expr` methods: `loom-ast` cannot depend on this crate's
//! `Block` type without creating a cycle (this crate already depends on
//! `loom-ast` for `Expr`), so the direction only ever points one way.

pub mod error;
pub mod lower;
pub mod model;
pub mod reconstruct;

pub use error::{BlocksError, BlocksErrorKind};
pub use lower::to_block;
pub use model::{Block, Field, Mutation, NamedChild, Next, Statement, Value};
pub use reconstruct::from_block;
