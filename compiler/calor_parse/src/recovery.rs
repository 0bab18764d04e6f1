//! Error recovery for the parser.
//!
//! Provides tag sets and synchronization for continuing parsing after
//! errors. Uses a bitset for O(1) membership testing: `Tag` has fewer than
//! 64 variants, so a `u64` covers the whole table.

use calor_ir::{Tag, TokenKind};

use crate::cursor::Cursor;

/// A set of tags using bitset representation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TagSet(u64);

impl TagSet {
    /// Create an empty tag set.
    #[inline]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Add a tag (builder pattern for const contexts).
    #[inline]
    #[must_use]
    pub const fn with(self, tag: Tag) -> Self {
        Self(self.0 | (1u64 << tag as u64))
    }

    /// Union of two tag sets.
    #[inline]
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// O(1) membership test.
    #[inline]
    pub const fn contains(&self, tag: Tag) -> bool {
        (self.0 & (1u64 << tag as u64)) != 0
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TagSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Tags that begin a statement.
pub const STMT_START: TagSet = TagSet::new()
    .with(Tag::B)
    .with(Tag::A)
    .with(Tag::Ret)
    .with(Tag::Th)
    .with(Tag::Brk)
    .with(Tag::Cont)
    .with(Tag::Prn)
    .with(Tag::Co)
    .with(Tag::If)
    .with(Tag::Wh)
    .with(Tag::Dw)
    .with(Tag::For)
    .with(Tag::Fe)
    .with(Tag::Try)
    .with(Tag::Ma);

/// Tags that begin a declaration.
pub const DECL_START: TagSet = TagSet::new()
    .with(Tag::M)
    .with(Tag::F)
    .with(Tag::C)
    .with(Tag::I)
    .with(Tag::E)
    .with(Tag::Ex)
    .with(Tag::R)
    .with(Tag::U)
    .with(Tag::Fl)
    .with(Tag::Pr)
    .with(Tag::Ct)
    .with(Tag::D)
    .with(Tag::Ev);

/// Separator tags that belong to an enclosing structural tag.
pub const SEPARATORS: TagSet = TagSet::new()
    .with(Tag::El)
    .with(Tag::Catch)
    .with(Tag::Fin);

/// Skip tokens until the next tag at the same or shallower nesting depth.
///
/// An unparseable construct is abandoned: tokens are consumed until the
/// cursor rests on a closing tag (returning control to the enclosing
/// construct) or on an opening tag from `resume`, so a single invocation
/// surfaces many independent errors. Guarantees progress: at least one token
/// is consumed if any remain.
pub fn synchronize(cursor: &mut Cursor<'_>, resume: TagSet) {
    let start = cursor.position();
    while !cursor.is_at_end() {
        match cursor.current_kind() {
            TokenKind::TagClose(_) => break,
            TokenKind::TagOpen(tag)
                if (resume.contains(*tag) || SEPARATORS.contains(*tag))
                    && cursor.position() > start =>
            {
                break;
            }
            _ => {
                cursor.advance();
            }
        }
    }
    if cursor.position() == start && !cursor.is_at_end() {
        cursor.advance();
    }
}

#[cfg(test)]
mod tests {
    use calor_ir::{Span, Token};

    use super::*;

    #[test]
    fn set_membership() {
        assert!(STMT_START.contains(Tag::Ret));
        assert!(!STMT_START.contains(Tag::Fl));
        assert!(DECL_START.contains(Tag::Fl));
        assert!(SEPARATORS.contains(Tag::El));
    }

    #[test]
    fn union_combines() {
        let set = STMT_START.union(DECL_START);
        assert!(set.contains(Tag::Ret));
        assert!(set.contains(Tag::C));
    }

    #[test]
    fn synchronize_stops_at_next_statement_tag() {
        let kinds = vec![
            TokenKind::Ident("junk".to_string()),
            TokenKind::LParen,
            TokenKind::Int(1),
            TokenKind::RParen,
            TokenKind::TagOpen(Tag::Ret),
        ];
        let mut tokens: Vec<Token> = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| Token::new(kind, Span::new(i as u32, 1, i as u32 + 1, 1)))
            .collect();
        tokens.push(Token::new(TokenKind::Eof, Span::new(9, 1, 10, 0)));

        let mut cursor = Cursor::new(&tokens);
        synchronize(&mut cursor, STMT_START);
        assert!(cursor.check_tag_open(Tag::Ret));
    }

    #[test]
    fn synchronize_always_makes_progress() {
        let tokens = vec![
            Token::new(TokenKind::TagOpen(Tag::Ret), Span::new(0, 1, 1, 4)),
            Token::new(TokenKind::Eof, Span::new(4, 1, 5, 0)),
        ];
        let mut cursor = Cursor::new(&tokens);
        synchronize(&mut cursor, STMT_START);
        assert!(cursor.position() > 0);
    }
}
