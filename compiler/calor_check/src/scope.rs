//! Lexical scope chain.
//!
//! A chain of frames mapping name to declared type. Resolution walks the
//! nearest-enclosing chain; child frames may shadow but never mutate a
//! parent binding.

use rustc_hash::FxHashMap;

use calor_ir::{Span, TypeRef};

/// One lexical frame.
#[derive(Default)]
struct Frame {
    bindings: FxHashMap<String, (TypeRef, Span)>,
}

/// The scope chain for one function (or constructor) body.
pub struct ScopeChain {
    frames: Vec<Frame>,
}

impl ScopeChain {
    /// A chain with a single root frame.
    pub fn new() -> Self {
        ScopeChain {
            frames: vec![Frame::default()],
        }
    }

    /// Enter a child frame.
    pub fn push(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Leave the innermost frame.
    pub fn pop(&mut self) {
        debug_assert!(self.frames.len() > 1, "cannot pop the root frame");
        self.frames.pop();
    }

    /// Declare a name in the innermost frame.
    ///
    /// Returns the span of the existing binding if the name is already
    /// declared in this frame (shadowing an *outer* frame is allowed and is
    /// not an error).
    pub fn declare(&mut self, name: &str, ty: TypeRef, span: Span) -> Result<(), Span> {
        let frame = self
            .frames
            .last_mut()
            .unwrap_or_else(|| unreachable!("scope chain always has a root frame"));
        if let Some((_, prior)) = frame.bindings.get(name) {
            return Err(*prior);
        }
        frame.bindings.insert(name.to_string(), (ty, span));
        Ok(())
    }

    /// Resolve a name through the nearest-enclosing chain.
    pub fn lookup(&self, name: &str) -> Option<&TypeRef> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name).map(|(ty, _)| ty))
    }

    /// All visible names, innermost last (for suggestion candidates).
    pub fn visible_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        for frame in &self.frames {
            names.extend(frame.bindings.keys().map(String::as_str));
        }
        names
    }
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shadowing_does_not_mutate_the_parent() {
        let mut scope = ScopeChain::new();
        scope
            .declare("x", TypeRef::I32, Span::new(0, 1, 1, 1))
            .unwrap();
        scope.push();
        scope
            .declare("x", TypeRef::Str, Span::new(5, 2, 1, 1))
            .unwrap();
        assert_eq!(scope.lookup("x"), Some(&TypeRef::Str));
        scope.pop();
        assert_eq!(scope.lookup("x"), Some(&TypeRef::I32));
    }

    #[test]
    fn redeclaration_in_one_frame_is_rejected() {
        let mut scope = ScopeChain::new();
        let first = Span::new(0, 1, 1, 1);
        scope.declare("x", TypeRef::I32, first).unwrap();
        assert_eq!(
            scope.declare("x", TypeRef::I64, Span::new(4, 1, 5, 1)),
            Err(first)
        );
    }

    #[test]
    fn lookup_walks_outward() {
        let mut scope = ScopeChain::new();
        scope
            .declare("outer", TypeRef::Bool, Span::DUMMY)
            .unwrap();
        scope.push();
        assert_eq!(scope.lookup("outer"), Some(&TypeRef::Bool));
        assert_eq!(scope.lookup("missing"), None);
    }
}
