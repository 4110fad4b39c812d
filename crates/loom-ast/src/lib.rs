//! The Surface AST: a single closed-universe `Expr` enum spanning literals,
//! variables, control flow, common operators/calls, component access, and
//! procedures. Every node answers the same four capability questions
//! (`render_surface`, `continuous`, `consumable`, `signature`); lowering to
//! and reconstructing from the Blocks XML model lives in `loom-blocks`,
//! which depends on this crate rather than the other way around.

pub mod common;
pub mod components;
pub mod control;
pub mod expr;
pub mod fundamentals;
pub mod procedures;
pub mod signature;
pub mod variables;

pub use expr::Expr;
pub use signature::{combine_signatures, Signature};
