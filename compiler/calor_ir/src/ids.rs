//! Canonical declaration IDs.
//!
//! Every tagged construct carries an ID that must survive formatting and
//! refactoring unchanged: an ID read from source reappears at the closing tag
//! and through any reverse-emitter round trip. Only synthesized scaffolding
//! (nodes built without source text, e.g. by a migration adapter) is allowed
//! to mint fresh IDs, via [`IdAllocator`] scoped to a single compilation.

use rustc_hash::FxHashMap;

use crate::Span;

/// A node's canonical ID.
///
/// `Synthesized` nodes have no user-authored ID; the reverse emitter assigns
/// them a fresh `g<N>` ID when serializing.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum NodeId {
    /// ID read verbatim from source.
    User(String),
    /// Node built without source text.
    Synthesized,
}

impl NodeId {
    pub fn user(id: impl Into<String>) -> NodeId {
        NodeId::User(id.into())
    }

    /// The user-authored ID text, if any.
    pub fn as_user(&self) -> Option<&str> {
        match self {
            NodeId::User(id) => Some(id),
            NodeId::Synthesized => None,
        }
    }
}

/// Per-compilation registry of every declaration ID encountered.
///
/// Used to surface duplicate IDs and to assert the preservation invariant in
/// round-trip tooling. Created fresh per compilation call.
#[derive(Default, Debug)]
pub struct IdRegistry {
    seen: FxHashMap<String, Span>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an ID. Returns the span of a previous occurrence if the ID was
    /// already registered.
    pub fn record(&mut self, id: &str, span: Span) -> Option<Span> {
        match self.seen.get(id) {
            Some(prior) => Some(*prior),
            None => {
                self.seen.insert(id.to_string(), span);
                None
            }
        }
    }

    /// Whether an ID has been registered.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains_key(id)
    }

    /// Number of distinct IDs registered.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Monotonic allocator for synthesized-node IDs.
///
/// One allocator per compilation call, threaded explicitly through the
/// emission context. Never shared across calls.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next fresh ID (`g1`, `g2`, ...).
    pub fn fresh(&mut self) -> String {
        self.next += 1;
        format!("g{}", self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_reports_duplicates() {
        let mut registry = IdRegistry::new();
        let first = Span::new(0, 1, 1, 4);
        assert_eq!(registry.record("f001", first), None);
        assert_eq!(registry.record("f001", Span::new(9, 2, 1, 4)), Some(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn allocator_is_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.fresh(), "g1");
        assert_eq!(alloc.fresh(), "g2");
        assert_eq!(alloc.fresh(), "g3");
    }
}
