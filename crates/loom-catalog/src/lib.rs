//! Static signature tables: builtin free functions (`FuncCall`), methods on
//! primitive receivers (`Call`), and the list-transformer registry
//! (`ListTransform`). All three are plain `const` slices, scanned linearly -
//! small and fixed enough that a lookup table would be pure overhead.

pub mod builtin;
pub mod method;
pub mod transform;

pub use builtin::{lookup_builtin, lookup_builtin_by_block_type, BuiltinSignature};
pub use method::{lookup_method, lookup_method_by_block_type, test_signature, MethodSignature, Module};
pub use transform::{lookup_transformer, test_transformer, TransformerSignature};
