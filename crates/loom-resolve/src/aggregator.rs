use std::fmt;

use loom_ast::Signature;
use loom_common::Position;

use crate::scope::ScopeCursor;

/// A name that could not be resolved at the point it was used. Surface
/// allows forward reference within a single translation unit (a `func`
/// calling another declared later, a variable set by a later branch), so
/// resolution is attempted again once the whole unit has been scanned
/// before this is reported as an actual error.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSymbol {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolveError {
    pub name: String,
    pub position: Position,
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unresolved name `{}` at line {}, column {}",
            self.name, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for ResolveError {}

/// Collects names that fail to resolve on first sight and re-checks them
/// once the unit is fully scanned. In strict mode every symbol still
/// pending at that point becomes a batched `ResolveError`; in non-strict
/// mode they are dropped silently, mirroring a best-effort translation that
/// tolerates references to names a surrounding tool will supply later.
pub struct ErrorAggregator {
    strict: bool,
    pending: Vec<PendingSymbol>,
}

impl ErrorAggregator {
    pub fn new(strict: bool) -> Self {
        Self { strict, pending: Vec::new() }
    }

    /// Resolves `name` against `cursor`, deferring it for a later retry if
    /// it is not yet in scope.
    pub fn resolve_or_defer(
        &mut self,
        cursor: &ScopeCursor,
        name: &str,
        position: Position,
    ) -> Option<Signature> {
        match cursor.resolve(name) {
            Some(sig) => Some(sig),
            None => {
                self.pending.push(PendingSymbol { name: name.to_string(), position });
                None
            }
        }
    }

    /// Re-resolves every pending symbol against the final scope state.
    /// Returns the symbols that are still unresolved after the retry.
    pub fn recheck(&mut self, cursor: &ScopeCursor) -> Vec<PendingSymbol> {
        let (resolved, unresolved): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.pending).into_iter().partition(|p| cursor.resolve(&p.name).is_some());
        let _ = resolved;
        unresolved
    }

    /// Runs the final recheck and, in strict mode, turns anything still
    /// unresolved into errors. In non-strict mode the leftovers are
    /// dropped and `Ok(())` is always returned.
    pub fn finish(mut self, cursor: &ScopeCursor) -> Result<(), Vec<ResolveError>> {
        let unresolved = self.recheck(cursor);
        if !self.strict || unresolved.is_empty() {
            return Ok(());
        }
        Err(unresolved
            .into_iter()
            .map(|p| ResolveError { name: p.name, position: p.position })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeCursor;

    #[test]
    fn forward_reference_resolves_on_recheck() {
        let mut cursor = ScopeCursor::new();
        let mut agg = ErrorAggregator::new(true);
        let pos = Position { line: 1, column: 1 };
        assert!(agg.resolve_or_defer(&cursor, "later", pos).is_none());
        cursor.define("later", Signature::Number);
        assert!(agg.finish(&cursor).is_ok());
    }

    #[test]
    fn strict_mode_reports_unresolved_after_recheck() {
        let cursor = ScopeCursor::new();
        let mut agg = ErrorAggregator::new(true);
        agg.resolve_or_defer(&cursor, "ghost", Position { line: 2, column: 4 });
        let errs = agg.finish(&cursor).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].name, "ghost");
    }

    #[test]
    fn non_strict_mode_drops_unresolved_silently() {
        let cursor = ScopeCursor::new();
        let mut agg = ErrorAggregator::new(false);
        agg.resolve_or_defer(&cursor, "ghost", Position { line: 2, column: 4 });
        assert!(agg.finish(&cursor).is_ok());
    }
}
