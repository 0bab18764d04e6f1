//! Lexer for Calor.
//!
//! A `logos`-derived raw token layer plus a cooking pass that attaches exact
//! spans, processes escapes, and validates sigil+name pairs against the tag
//! table. The lexer never fails: malformed input becomes diagnostics plus
//! recovery tokens, and the token stream always ends with `Eof`.

mod escape;
mod line_map;

pub use escape::{unescape, Unescaped};
pub use line_map::LineMap;

use logos::Logos;

use calor_diagnostic::suggest::suggest_similar;
use calor_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use calor_ir::{OpKind, Span, Tag, Token, TokenKind};

/// Raw token from logos (before cooking).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
#[logos(skip r";[^\n]*")]
enum RawToken {
    /// Sigil-prefixed tag name, opening (`§F`) or closing (`§/F`).
    #[regex(r"\u{00a7}/?[A-Za-z][A-Za-z0-9]*")]
    Sigil,

    #[token("\u{2192}")]
    #[token("->")]
    Arrow,

    #[token("..")]
    DotDot,
    #[token(".")]
    Dot,

    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,

    #[token("true")]
    True,
    #[token("false")]
    False,

    /// Identifier, possibly dotted and hyphenated: `a`, `s.index-of`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*(\.[A-Za-z_][A-Za-z0-9_]*(-[A-Za-z0-9_]+)*)*")]
    Ident,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r"[0-9][0-9_]*")]
    Int,

    /// Terminated string literal.
    #[regex(r#""([^"\\\n]|\\[^\n])*""#)]
    Str,
    /// String that reaches end of line without a closing quote. Longest-match
    /// rules prefer the terminated form whenever the closing quote exists.
    #[regex(r#""([^"\\\n]|\\[^\n])*"#)]
    UnterminatedStr,

    #[regex(r"'([^'\\\n]|\\[^\n])'")]
    CharLit,
    #[regex(r"'([^'\\\n]|\\[^\n])?")]
    UnterminatedChar,

    // Two-character operators before their one-character prefixes.
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("!")]
    Not,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token("=")]
    Eq,
}

/// Lexer result: the token stream plus any diagnostics.
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Lex source text into a span-tagged token stream.
///
/// Never fails; the stream always ends with an `Eof` token.
pub fn lex(source: &str) -> LexOutput {
    let line_map = LineMap::new(source);
    let mut tokens = Vec::new();
    let mut diagnostics = Vec::new();

    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let range = lexer.span();
        let text = lexer.slice();
        let span = make_span(&line_map, range.start, range.end - range.start);

        let kind = match result {
            Ok(RawToken::Sigil) => cook_sigil(text, span, &mut diagnostics),
            Ok(RawToken::Arrow) => TokenKind::Arrow,
            Ok(RawToken::DotDot) => TokenKind::DotDot,
            Ok(RawToken::Dot) => TokenKind::Dot,
            Ok(RawToken::LBrace) => TokenKind::LBrace,
            Ok(RawToken::RBrace) => TokenKind::RBrace,
            Ok(RawToken::LBracket) => TokenKind::LBracket,
            Ok(RawToken::RBracket) => TokenKind::RBracket,
            Ok(RawToken::LParen) => TokenKind::LParen,
            Ok(RawToken::RParen) => TokenKind::RParen,
            Ok(RawToken::Colon) => TokenKind::Colon,
            Ok(RawToken::Comma) => TokenKind::Comma,
            Ok(RawToken::True) => TokenKind::Bool(true),
            Ok(RawToken::False) => TokenKind::Bool(false),
            Ok(RawToken::Ident) => TokenKind::Ident(text.to_string()),
            Ok(RawToken::Int) => cook_int(text, span, &mut diagnostics),
            Ok(RawToken::Float) => cook_float(text, span, &mut diagnostics),
            Ok(RawToken::Str) => {
                cook_string(&text[1..text.len() - 1], span, &mut diagnostics)
            }
            Ok(RawToken::UnterminatedStr) => {
                diagnostics.push(
                    Diagnostic::error(ErrorCode::UnterminatedString)
                        .with_message("unterminated string literal")
                        .with_label(span, "missing closing `\"`")
                        .with_note("the rest of the line is treated as the literal"),
                );
                cook_string(&text[1..], span, &mut diagnostics)
            }
            Ok(RawToken::CharLit) => cook_char(&text[1..text.len() - 1], span, &mut diagnostics),
            Ok(RawToken::UnterminatedChar) => {
                diagnostics.push(
                    Diagnostic::error(ErrorCode::UnterminatedChar)
                        .with_message("unterminated char literal")
                        .with_label(span, "missing closing `'`"),
                );
                TokenKind::Char(text[1..].chars().next().unwrap_or('\0'))
            }
            Ok(RawToken::EqEq) => TokenKind::Op(OpKind::EqEq),
            Ok(RawToken::NotEq) => TokenKind::Op(OpKind::NotEq),
            Ok(RawToken::LtEq) => TokenKind::Op(OpKind::LtEq),
            Ok(RawToken::GtEq) => TokenKind::Op(OpKind::GtEq),
            Ok(RawToken::AndAnd) => TokenKind::Op(OpKind::AndAnd),
            Ok(RawToken::OrOr) => TokenKind::Op(OpKind::OrOr),
            Ok(RawToken::Shl) => TokenKind::Op(OpKind::Shl),
            Ok(RawToken::Shr) => TokenKind::Op(OpKind::Shr),
            Ok(RawToken::Plus) => TokenKind::Op(OpKind::Plus),
            Ok(RawToken::Minus) => TokenKind::Op(OpKind::Minus),
            Ok(RawToken::Star) => TokenKind::Op(OpKind::Star),
            Ok(RawToken::Slash) => TokenKind::Op(OpKind::Slash),
            Ok(RawToken::Percent) => TokenKind::Op(OpKind::Percent),
            Ok(RawToken::Lt) => TokenKind::Op(OpKind::Lt),
            Ok(RawToken::Gt) => TokenKind::Op(OpKind::Gt),
            Ok(RawToken::Not) => TokenKind::Op(OpKind::Not),
            Ok(RawToken::Amp) => TokenKind::Op(OpKind::Amp),
            Ok(RawToken::Pipe) => TokenKind::Op(OpKind::Pipe),
            Ok(RawToken::Caret) => TokenKind::Op(OpKind::Caret),
            Ok(RawToken::Tilde) => TokenKind::Op(OpKind::Tilde),
            Ok(RawToken::Eq) => TokenKind::Op(OpKind::Eq),
            Err(()) => {
                let found = text.chars().next().unwrap_or('\u{fffd}');
                diagnostics.push(
                    Diagnostic::error(ErrorCode::InvalidCharacter)
                        .with_message(format!("invalid character `{found}`"))
                        .with_label(span, "cannot start a token"),
                );
                continue;
            }
        };
        tokens.push(Token::new(kind, span));
    }

    let eof_offset = source.len() as u32;
    let (line, column) = line_map.position(eof_offset);
    tokens.push(Token::new(
        TokenKind::Eof,
        Span::new(eof_offset, line, column, 0),
    ));

    LexOutput {
        tokens,
        diagnostics,
    }
}

fn make_span(line_map: &LineMap, start: usize, length: usize) -> Span {
    let (line, column) = line_map.position(start as u32);
    Span::new(start as u32, line, column, length as u32)
}

/// Validate a sigil+name pair against the tag table.
fn cook_sigil(text: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) -> TokenKind {
    // Strip the two-byte sigil, then an optional closing slash.
    let after_sigil = &text['\u{00a7}'.len_utf8()..];
    let (closing, name) = match after_sigil.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, after_sigil),
    };

    match Tag::from_name(name) {
        Some(tag) if closing => TokenKind::TagClose(tag),
        Some(tag) => TokenKind::TagOpen(tag),
        None => {
            let mut diagnostic = Diagnostic::error(ErrorCode::UnknownTag)
                .with_message(format!("unknown tag `\u{00a7}{name}`"))
                .with_label(span, "not a known tag name");
            if let Some(candidate) =
                suggest_similar(name, Tag::ALL.iter().map(|tag| tag.name()))
            {
                diagnostic = diagnostic
                    .with_suggestion(Suggestion::did_you_mean(format!("\u{00a7}{candidate}")));
            }
            diagnostics.push(diagnostic);
            TokenKind::TagUnknown(name.to_string())
        }
    }
}

fn cook_int(text: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) -> TokenKind {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    match cleaned.parse::<u64>() {
        Ok(value) => TokenKind::Int(value),
        Err(_) => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::InvalidNumber)
                    .with_message(format!("integer literal `{text}` is out of range"))
                    .with_label(span, "does not fit in 64 bits"),
            );
            TokenKind::Int(0)
        }
    }
}

fn cook_float(text: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) -> TokenKind {
    let cleaned: String = text.chars().filter(|c| *c != '_').collect();
    match cleaned.parse::<f64>() {
        Ok(value) => TokenKind::float(value),
        Err(_) => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::InvalidNumber)
                    .with_message(format!("invalid float literal `{text}`"))
                    .with_label(span, "cannot be parsed"),
            );
            TokenKind::float(0.0)
        }
    }
}

fn cook_string(body: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) -> TokenKind {
    match unescape(body) {
        Unescaped::Ok(value) => TokenKind::Str(value),
        Unescaped::Invalid { offset, found } => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::InvalidEscape)
                    .with_message(format!("invalid escape sequence `\\{found}`"))
                    .with_label(span, format!("at byte {offset} of the literal")),
            );
            TokenKind::Str(body.to_string())
        }
    }
}

fn cook_char(body: &str, span: Span, diagnostics: &mut Vec<Diagnostic>) -> TokenKind {
    match unescape(body) {
        Unescaped::Ok(value) => match value.chars().next() {
            Some(c) if value.chars().count() == 1 => TokenKind::Char(c),
            _ => {
                diagnostics.push(
                    Diagnostic::error(ErrorCode::InvalidNumber)
                        .with_message("char literal must contain exactly one character")
                        .with_label(span, "invalid char literal"),
                );
                TokenKind::Char('\0')
            }
        },
        Unescaped::Invalid { found, .. } => {
            diagnostics.push(
                Diagnostic::error(ErrorCode::InvalidEscape)
                    .with_message(format!("invalid escape sequence `\\{found}`"))
                    .with_label(span, "in char literal"),
            );
            TokenKind::Char('\0')
        }
    }
}

#[cfg(test)]
mod tests;
