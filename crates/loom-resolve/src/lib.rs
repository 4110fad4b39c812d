//! Lexical scope tracking and deferred name resolution, shared by the
//! parser's statement grammar: a `ScopeCursor` stack of lexical frames, a
//! `NameTables` registry of forward-declarable procedures/components, and
//! an `ErrorAggregator` that defers unresolved names for a second pass
//! before the strict/non-strict translation modes decide whether leftovers
//! are errors or silently dropped.

pub mod aggregator;
pub mod names;
pub mod scope;

pub use aggregator::{ErrorAggregator, PendingSymbol, ResolveError};
pub use names::{ComponentInstance, NameTables, ProcedureSignature};
pub use scope::{ScopeCursor, ScopeKind};
