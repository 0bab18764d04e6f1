//! Tokens produced by the lexer.

use std::fmt;

use crate::{Span, Tag};

/// Operator tokens.
///
/// Lisp prefix expressions use operators in head position, so each operator
/// lexes as a single independent token (`(+ a b)` is five tokens).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum OpKind {
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    AndAnd,
    OrOr,
    Not,
    Amp,
    Pipe,
    Caret,
    Shl,
    Shr,
    Tilde,
    Eq,
}

impl OpKind {
    /// Source spelling of the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Plus => "+",
            OpKind::Minus => "-",
            OpKind::Star => "*",
            OpKind::Slash => "/",
            OpKind::Percent => "%",
            OpKind::EqEq => "==",
            OpKind::NotEq => "!=",
            OpKind::Lt => "<",
            OpKind::LtEq => "<=",
            OpKind::Gt => ">",
            OpKind::GtEq => ">=",
            OpKind::AndAnd => "&&",
            OpKind::OrOr => "||",
            OpKind::Not => "!",
            OpKind::Amp => "&",
            OpKind::Pipe => "|",
            OpKind::Caret => "^",
            OpKind::Shl => "<<",
            OpKind::Shr => ">>",
            OpKind::Tilde => "~",
            OpKind::Eq => "=",
        }
    }
}

/// Token kinds.
///
/// Float literals keep their raw bits so `TokenKind` stays `Eq + Hash`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    /// Opening tag: `§F`
    TagOpen(Tag),
    /// Closing tag: `§/F`
    TagClose(Tag),
    /// A sigil with an unrecognized name. The lexer has already reported
    /// `unknown_tag`; the parser skips these silently during recovery.
    TagUnknown(String),

    /// Identifier, possibly dotted: `a`, `geometry.shapes`
    Ident(String),
    /// Integer literal (negation is folded in the parser).
    Int(u64),
    /// Float literal, stored as bits for `Eq`/`Hash`.
    Float(u64),
    /// String literal after escape processing.
    Str(String),
    /// Char literal: `'a'`
    Char(char),
    /// `true` / `false`
    Bool(bool),

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Colon,
    Comma,
    /// `→` (or ASCII `->`)
    Arrow,
    /// `.` field-access head
    Dot,
    /// `..` rest marker in list patterns
    DotDot,
    /// A single operator token.
    Op(OpKind),

    Eof,
}

impl TokenKind {
    /// Construct a float token from its value.
    pub fn float(value: f64) -> TokenKind {
        TokenKind::Float(value.to_bits())
    }

    /// Short human-readable description for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            TokenKind::TagOpen(tag) => format!("`{tag}`"),
            TokenKind::TagClose(tag) => format!("`\u{00a7}/{}`", tag.name()),
            TokenKind::TagUnknown(name) => format!("unknown tag `\u{00a7}{name}`"),
            TokenKind::Ident(name) => format!("identifier `{name}`"),
            TokenKind::Int(v) => format!("integer `{v}`"),
            TokenKind::Float(bits) => format!("float `{}`", f64::from_bits(*bits)),
            TokenKind::Str(_) => "string literal".to_string(),
            TokenKind::Char(c) => format!("char literal `'{c}'`"),
            TokenKind::Bool(b) => format!("`{b}`"),
            TokenKind::LBrace => "`{`".to_string(),
            TokenKind::RBrace => "`}`".to_string(),
            TokenKind::LBracket => "`[`".to_string(),
            TokenKind::RBracket => "`]`".to_string(),
            TokenKind::LParen => "`(`".to_string(),
            TokenKind::RParen => "`)`".to_string(),
            TokenKind::Colon => "`:`".to_string(),
            TokenKind::Comma => "`,`".to_string(),
            TokenKind::Arrow => "`\u{2192}`".to_string(),
            TokenKind::Dot => "`.`".to_string(),
            TokenKind::DotDot => "`..`".to_string(),
            TokenKind::Op(op) => format!("`{}`", op.as_str()),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

/// A token with its exact source span.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_bits_round_trip() {
        let kind = TokenKind::float(3.25);
        match kind {
            TokenKind::Float(bits) => assert_eq!(f64::from_bits(bits), 3.25),
            other => panic!("expected float token, got {other:?}"),
        }
    }

    #[test]
    fn describe_is_terse() {
        assert_eq!(TokenKind::LParen.describe(), "`(`");
        assert_eq!(TokenKind::Op(OpKind::AndAnd).describe(), "`&&`");
    }
}
