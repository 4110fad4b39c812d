use loom_ast::Signature;
use rustc_hash::FxHashMap;

/// The kind of lexical scope a cursor frame represents. Several parser
/// constructs push a frame purely so `in`/`at_root` queries can answer
/// "am I inside a loop" / "am I inside an event handler" without threading
/// an explicit flag through every recursive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    Root,
    RetProc,
    Proc,
    GenericEvent,
    Event,
    Loop,
    IfBody,
    SmartBody,
    Transform,
}

struct Frame {
    kind: ScopeKind,
    names: FxHashMap<String, Signature>,
}

/// A stack of lexical scopes. Pushed on entry to a body-bearing construct,
/// popped on exit; name resolution walks the stack from the top down so
/// inner declarations shadow outer ones.
pub struct ScopeCursor {
    frames: Vec<Frame>,
}

impl Default for ScopeCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeCursor {
    pub fn new() -> Self {
        Self {
            frames: vec![Frame { kind: ScopeKind::Root, names: FxHashMap::default() }],
        }
    }

    pub fn enter(&mut self, kind: ScopeKind) {
        self.frames.push(Frame { kind, names: FxHashMap::default() });
    }

    /// Pops the innermost frame. Panics if called at the root frame: that
    /// would indicate an unbalanced enter/exit pair in the caller, a parser
    /// bug rather than a recoverable condition.
    pub fn exit(&mut self) {
        assert!(self.frames.len() > 1, "cannot exit the root scope");
        self.frames.pop();
    }

    pub fn define(&mut self, name: impl Into<String>, signature: Signature) {
        self.frames
            .last_mut()
            .expect("at least the root frame always exists")
            .names
            .insert(name.into(), signature);
    }

    /// Resolves a name against the innermost scope that declares it.
    pub fn resolve(&self, name: &str) -> Option<Signature> {
        self.frames.iter().rev().find_map(|f| f.names.get(name).copied())
    }

    /// Whether any frame on the stack (innermost outward) is of the given
    /// kind.
    pub fn is_in(&self, kind: ScopeKind) -> bool {
        self.frames.iter().any(|f| f.kind == kind)
    }

    pub fn at_root(&self) -> bool {
        self.frames.len() == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_scope_shadows_outer() {
        let mut cursor = ScopeCursor::new();
        cursor.define("x", Signature::Number);
        cursor.enter(ScopeKind::Loop);
        cursor.define("x", Signature::Text);
        assert_eq!(cursor.resolve("x"), Some(Signature::Text));
        cursor.exit();
        assert_eq!(cursor.resolve("x"), Some(Signature::Number));
    }

    #[test]
    fn is_in_walks_the_whole_stack() {
        let mut cursor = ScopeCursor::new();
        cursor.enter(ScopeKind::Event);
        cursor.enter(ScopeKind::Loop);
        assert!(cursor.is_in(ScopeKind::Event));
        assert!(cursor.is_in(ScopeKind::Loop));
        assert!(!cursor.is_in(ScopeKind::Proc));
    }

    #[test]
    fn at_root_only_before_any_enter() {
        let mut cursor = ScopeCursor::new();
        assert!(cursor.at_root());
        cursor.enter(ScopeKind::IfBody);
        assert!(!cursor.at_root());
    }

    #[test]
    #[should_panic(expected = "cannot exit the root scope")]
    fn exiting_root_panics() {
        let mut cursor = ScopeCursor::new();
        cursor.exit();
    }
}
