//! Recursive descent parser for Calor.
//!
//! One production per declaration/statement/expression/pattern kind.
//! Structural tags are validated for matching IDs between opening and
//! closing; a mismatch produces an `id_mismatch` diagnostic whose fix edits
//! exactly the closing ID text. On an unparseable construct the parser
//! records a diagnostic and skips to the next tag at the same or shallower
//! nesting depth, so one invocation surfaces many independent errors.

mod cursor;
mod grammar;
mod recovery;

pub use cursor::Cursor;
pub use recovery::{synchronize, TagSet, DECL_START, STMT_START};

use tracing::trace;

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{IdRegistry, Module, NodeId, Span, Tag, Token, TokenKind};

/// Result of parsing a token stream.
pub struct ParseResult {
    /// The parsed module, if a module tag was found at all. Present even
    /// when diagnostics were recorded (recovered subtrees are kept).
    pub module: Option<Module>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a lexed token stream into a module.
///
/// The stream must end with an `Eof` token, which the lexer guarantees.
pub fn parse(tokens: &[Token]) -> ParseResult {
    trace!(token_count = tokens.len(), "parse start");
    let mut parser = Parser::new(tokens);
    let module = parser.parse_root();
    ParseResult {
        module,
        diagnostics: parser.diagnostics,
    }
}

/// Marker that a diagnostic has been recorded and the production gave up;
/// the caller synchronizes and continues.
pub(crate) struct Recovered;

pub(crate) type PResult<T> = Result<T, Recovered>;

/// Which bracket dialect opened a tag argument group.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Delim {
    Brace,
    Bracket,
}

/// Parser state.
pub struct Parser<'a> {
    cursor: Cursor<'a>,
    diagnostics: Vec<Diagnostic>,
    registry: IdRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            diagnostics: Vec::new(),
            registry: IdRegistry::new(),
        }
    }

    // Cursor delegation methods.

    #[inline]
    pub(crate) fn current_kind(&self) -> &'a TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    pub(crate) fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    pub(crate) fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    pub(crate) fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    #[inline]
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    pub(crate) fn check_tag_open(&self, tag: Tag) -> bool {
        self.cursor.check_tag_open(tag)
    }

    #[inline]
    pub(crate) fn check_tag_close(&self, tag: Tag) -> bool {
        self.cursor.check_tag_close(tag)
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> &'a Token {
        self.cursor.advance()
    }

    #[inline]
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    /// Record a diagnostic.
    pub(crate) fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record an `unexpected_token` diagnostic at the current token.
    pub(crate) fn unexpected(&mut self, expected: &str) -> Recovered {
        let found = self.current_kind().describe();
        let span = self.current_span();
        self.report(
            Diagnostic::error(ErrorCode::UnexpectedToken)
                .with_message(format!("expected {expected}, found {found}"))
                .with_label(span, format!("expected {expected}")),
        );
        Recovered
    }

    /// Consume a specific token or report `unexpected_token`.
    pub(crate) fn expect(&mut self, kind: &TokenKind, expected: &str) -> PResult<&'a Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Consume an identifier and return its text and span.
    pub(crate) fn expect_ident(&mut self, expected: &str) -> PResult<(String, Span)> {
        match self.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.current_span();
                self.advance();
                Ok((name.clone(), span))
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    /// Open a tag argument group, accepting either bracket dialect.
    pub(crate) fn open_args(&mut self) -> PResult<Delim> {
        if self.eat(&TokenKind::LBrace) {
            Ok(Delim::Brace)
        } else if self.eat(&TokenKind::LBracket) {
            Ok(Delim::Bracket)
        } else {
            Err(self.unexpected("`{`"))
        }
    }

    /// Close a tag argument group with the delimiter that opened it.
    pub(crate) fn close_args(&mut self, delim: Delim) -> PResult<()> {
        let (kind, expected) = match delim {
            Delim::Brace => (TokenKind::RBrace, "`}`"),
            Delim::Bracket => (TokenKind::RBracket, "`]`"),
        };
        self.expect(&kind, expected)?;
        Ok(())
    }

    /// Consume the `:` separating tag arguments.
    pub(crate) fn expect_colon(&mut self) -> PResult<()> {
        self.expect(&TokenKind::Colon, "`:`")?;
        Ok(())
    }

    /// Parse the ID at the head of a tag argument group.
    pub(crate) fn parse_id(&mut self) -> PResult<(String, Span)> {
        self.expect_ident("a tag ID")
    }

    /// Register a declaration ID, reporting duplicates.
    pub(crate) fn register_decl_id(&mut self, id: &str, span: Span) {
        if let Some(prior) = self.registry.record(id, span) {
            self.report(
                Diagnostic::error(ErrorCode::DuplicateId)
                    .with_message(format!("declaration ID `{id}` is already in use"))
                    .with_label(span, "duplicate ID")
                    .with_secondary_label(prior, "first used here"),
            );
        }
    }

    /// Parse a closing tag `§/T{id}`, verifying the ID matches the opener.
    ///
    /// On a mismatch, exactly one `id_mismatch` diagnostic is recorded whose
    /// single machine-applicable edit replaces only the closing ID text with
    /// the opening ID. Parsing continues with the opening ID.
    pub(crate) fn parse_closing(&mut self, tag: Tag, opening_id: &str) -> PResult<()> {
        if !self.check_tag_close(tag) {
            let span = self.current_span();
            let found = self.current_kind().describe();
            self.report(
                Diagnostic::error(ErrorCode::UnclosedTag)
                    .with_message(format!(
                        "expected `\u{00a7}/{}{{{opening_id}}}`, found {found}",
                        tag.name()
                    ))
                    .with_label(span, format!("`{}` tag is not closed here", tag.name())),
            );
            return Err(Recovered);
        }
        self.advance();
        let delim = self.open_args()?;
        let (close_id, close_span) = self.parse_id()?;
        if close_id != opening_id {
            self.report(
                Diagnostic::error(ErrorCode::IdMismatch)
                    .with_message(format!(
                        "closing tag ID `{close_id}` does not match opening tag ID `{opening_id}`"
                    ))
                    .with_label(close_span, format!("expected `{opening_id}`"))
                    .with_suggestion(calor_diagnostic::Suggestion::machine_applicable(
                        format!("replace `{close_id}` with `{opening_id}`"),
                        close_span,
                        opening_id,
                    )),
            );
        }
        self.close_args(delim)?;
        Ok(())
    }

    /// Top-level entry: a single module declaration.
    fn parse_root(&mut self) -> Option<Module> {
        let mut module = None;
        while !self.is_at_end() {
            if self.check_tag_open(Tag::M) {
                match self.parse_module_decl() {
                    Ok(parsed) if module.is_none() => module = Some(parsed),
                    Ok(_) => {
                        let span = self.previous_span();
                        self.report(
                            Diagnostic::error(ErrorCode::UnexpectedToken)
                                .with_message("only one top-level module is allowed")
                                .with_label(span, "second module"),
                        );
                    }
                    Err(Recovered) => {
                        synchronize(&mut self.cursor, DECL_START);
                    }
                }
            } else if matches!(self.current_kind(), TokenKind::TagUnknown(_)) {
                // Lexer already reported unknown_tag; skip it and its args.
                self.skip_unknown_tag();
            } else {
                let _ = self.unexpected("a `\u{00a7}M` module tag");
                synchronize(&mut self.cursor, DECL_START);
            }
        }
        if module.is_none() && self.diagnostics.is_empty() {
            self.report(
                Diagnostic::error(ErrorCode::MissingClause)
                    .with_message("source contains no module declaration")
                    .with_label(self.current_span(), "expected `\u{00a7}M{id:name}`"),
            );
        }
        module
    }

    /// Skip an already-reported unknown tag and its argument group.
    pub(crate) fn skip_unknown_tag(&mut self) {
        self.advance();
        if self.eat(&TokenKind::LBrace) {
            self.skip_until_balanced(&TokenKind::RBrace);
        } else if self.eat(&TokenKind::LBracket) {
            self.skip_until_balanced(&TokenKind::RBracket);
        }
        if self.check(&TokenKind::Arrow) {
            self.advance();
        }
    }

    fn skip_until_balanced(&mut self, close: &TokenKind) {
        while !self.is_at_end() && !self.check(close) {
            self.advance();
        }
        self.eat(close);
    }

    /// The ID text as a [`NodeId`].
    pub(crate) fn node_id(id: String) -> NodeId {
        NodeId::User(id)
    }
}

#[cfg(test)]
mod tests;
