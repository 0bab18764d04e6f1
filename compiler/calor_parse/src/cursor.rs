//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.
//! The stream invariant — the last token is always `Eof` — means the cursor
//! position is always valid and `current()` never fails.

use calor_ir::{Span, Tag, Token, TokenKind};

/// Cursor over a lexed token stream.
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the start of the token stream.
    ///
    /// The stream must end with an `Eof` token; the lexer guarantees this.
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last().map(|t| &t.kind), Some(TokenKind::Eof)),
            "token stream must end with Eof"
        );
        Cursor { tokens, pos: 0 }
    }

    /// Current position in the token stream.
    ///
    /// Compare positions before and after a production to check for
    /// progress during recovery.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &'a Token {
        // The Eof sentinel keeps this index in bounds.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    #[inline]
    pub fn current_kind(&self) -> &'a TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Peek one token ahead.
    #[inline]
    pub fn peek(&self) -> &'a TokenKind {
        self.peek_nth(1)
    }

    /// Peek `n` tokens ahead, saturating at `Eof`.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> &'a TokenKind {
        let idx = (self.pos + n).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        matches!(self.current_kind(), TokenKind::Eof)
    }

    /// Check the current token kind without consuming.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind() == kind
    }

    /// Check for an opening tag of a specific kind.
    #[inline]
    pub fn check_tag_open(&self, tag: Tag) -> bool {
        matches!(self.current_kind(), TokenKind::TagOpen(t) if *t == tag)
    }

    /// Check for a closing tag of a specific kind.
    #[inline]
    pub fn check_tag_close(&self, tag: Tag) -> bool {
        matches!(self.current_kind(), TokenKind::TagClose(t) if *t == tag)
    }

    /// Advance and return the consumed token.
    #[inline]
    pub fn advance(&mut self) -> &'a Token {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token if it matches.
    #[inline]
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(kinds: Vec<TokenKind>) -> Vec<Token> {
        let mut tokens: Vec<Token> = kinds
            .into_iter()
            .enumerate()
            .map(|(i, kind)| Token::new(kind, Span::new(i as u32, 1, i as u32 + 1, 1)))
            .collect();
        let offset = tokens.len() as u32;
        tokens.push(Token::new(TokenKind::Eof, Span::new(offset, 1, offset + 1, 0)));
        tokens
    }

    #[test]
    fn navigation_and_eof_saturation() {
        let tokens = toks(vec![TokenKind::LParen, TokenKind::RParen]);
        let mut cursor = Cursor::new(&tokens);
        assert!(cursor.check(&TokenKind::LParen));
        cursor.advance();
        cursor.advance();
        assert!(cursor.is_at_end());
        // Advancing past Eof stays at Eof.
        cursor.advance();
        assert!(cursor.is_at_end());
    }

    #[test]
    fn eat_consumes_only_on_match() {
        let tokens = toks(vec![TokenKind::Colon]);
        let mut cursor = Cursor::new(&tokens);
        assert!(!cursor.eat(&TokenKind::Comma));
        assert!(cursor.eat(&TokenKind::Colon));
        assert!(cursor.is_at_end());
    }

    #[test]
    fn tag_checks() {
        let tokens = toks(vec![
            TokenKind::TagOpen(Tag::F),
            TokenKind::TagClose(Tag::F),
        ]);
        let mut cursor = Cursor::new(&tokens);
        assert!(cursor.check_tag_open(Tag::F));
        assert!(!cursor.check_tag_open(Tag::M));
        cursor.advance();
        assert!(cursor.check_tag_close(Tag::F));
    }
}
