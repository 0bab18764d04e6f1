//! Offset to line/column mapping.
//!
//! Built once per source text; every token's span is resolved through it so
//! line/column tracking stays exact without per-character bookkeeping in the
//! scanner loop.

/// Maps byte offsets to 1-based line/column positions.
pub struct LineMap {
    /// Byte offset of the start of each line.
    line_starts: Vec<u32>,
    /// The source, kept for character-accurate column counting.
    source: String,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (offset, byte) in source.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset as u32 + 1);
            }
        }
        LineMap {
            line_starts,
            source: source.to_string(),
        }
    }

    /// Resolve a byte offset to (1-based line, 1-based character column).
    pub fn position(&self, offset: u32) -> (u32, u32) {
        let line_index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        let line_start = self.line_starts[line_index] as usize;
        let column = self.source[line_start..(offset as usize).min(self.source.len())]
            .chars()
            .count() as u32;
        (line_index as u32 + 1, column + 1)
    }

    /// Byte offset one past the last character of the line containing
    /// `offset` (excluding the newline).
    pub fn line_end(&self, offset: u32) -> u32 {
        let (line, _) = self.position(offset);
        match self.line_starts.get(line as usize) {
            Some(next_start) => next_start - 1,
            None => self.source.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_line_positions() {
        let map = LineMap::new("abc\ndef");
        assert_eq!(map.position(0), (1, 1));
        assert_eq!(map.position(2), (1, 3));
        assert_eq!(map.position(4), (2, 1));
        assert_eq!(map.position(6), (2, 3));
    }

    #[test]
    fn multibyte_columns_count_characters() {
        // '§' is two bytes; the following char is still column 2.
        let map = LineMap::new("\u{00a7}F");
        assert_eq!(map.position(2), (1, 2));
    }

    #[test]
    fn line_end_excludes_newline() {
        let map = LineMap::new("ab\ncdef\n");
        assert_eq!(map.line_end(0), 2);
        assert_eq!(map.line_end(4), 7);
    }
}
