//! Output emitter.
//!
//! A thin string builder. Formatting state is never ambient: callers pass an
//! explicit indent depth to every write, so the semantic content a node
//! emits stays separate from layout.

/// Spaces per indent level.
const INDENT_WIDTH: usize = 4;

/// String-based emitter for in-memory emission.
#[derive(Default)]
pub struct StringEmitter {
    buffer: String,
}

impl StringEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: String::with_capacity(capacity),
        }
    }

    /// Emit a full line at the given indent depth.
    pub fn line(&mut self, depth: usize, text: &str) {
        for _ in 0..depth * INDENT_WIDTH {
            self.buffer.push(' ');
        }
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    /// Emit a blank line.
    pub fn blank(&mut self) {
        self.buffer.push('\n');
    }

    /// Emit raw text with no indent or newline.
    pub fn raw(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Ensure the output ends with exactly one trailing newline.
    pub fn finish(mut self) -> String {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
        if !self.buffer.is_empty() && !self.buffer.ends_with('\n') {
            self.buffer.push('\n');
        }
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_indents_by_depth() {
        let mut out = StringEmitter::new();
        out.line(0, "a");
        out.line(2, "b");
        assert_eq!(out.as_str(), "a\n        b\n");
    }

    #[test]
    fn finish_normalizes_trailing_newlines() {
        let mut out = StringEmitter::new();
        out.line(0, "x");
        out.blank();
        out.blank();
        assert_eq!(out.finish(), "x\n");
    }
}
