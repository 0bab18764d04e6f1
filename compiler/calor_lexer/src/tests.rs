use pretty_assertions::assert_eq;

use calor_diagnostic::ErrorCode;
use calor_ir::{OpKind, Tag, TokenKind};

use super::*;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn prefix_expression_is_five_tokens() {
    // `(+ a b)` must lex as five independent tokens (plus Eof).
    let kinds = kinds("(+ a b)");
    assert_eq!(
        kinds,
        vec![
            TokenKind::LParen,
            TokenKind::Op(OpKind::Plus),
            TokenKind::Ident("a".to_string()),
            TokenKind::Ident("b".to_string()),
            TokenKind::RParen,
            TokenKind::Eof,
        ]
    );
}

#[test]
fn short_circuit_operators_lex_whole() {
    let kinds = kinds("(&& a b) (|| c d)");
    assert!(kinds.contains(&TokenKind::Op(OpKind::AndAnd)));
    assert!(kinds.contains(&TokenKind::Op(OpKind::OrOr)));
}

#[test]
fn maximal_munch_on_comparisons() {
    assert_eq!(
        kinds("<= < >= >")[..4],
        [
            TokenKind::Op(OpKind::LtEq),
            TokenKind::Op(OpKind::Lt),
            TokenKind::Op(OpKind::GtEq),
            TokenKind::Op(OpKind::Gt),
        ]
    );
}

#[test]
fn sigil_tags_open_and_close() {
    let kinds = kinds("\u{00a7}F{f1:add:pub:i32}\u{00a7}/F{f1}");
    assert_eq!(kinds[0], TokenKind::TagOpen(Tag::F));
    assert!(kinds.contains(&TokenKind::TagClose(Tag::F)));
}

#[test]
fn token_spans_are_exact() {
    let output = lex("\u{00a7}M{m1:geo}");
    let first = &output.tokens[0];
    assert_eq!(first.span.line, 1);
    assert_eq!(first.span.column, 1);
    // `§M` is three bytes (two for the sigil).
    assert_eq!(first.span.length, 3);
    let brace = &output.tokens[1];
    assert_eq!(brace.span.column, 3);
}

#[test]
fn spans_track_lines() {
    let output = lex("a\n  b");
    assert_eq!(output.tokens[0].span.line, 1);
    assert_eq!(output.tokens[1].span.line, 2);
    assert_eq!(output.tokens[1].span.column, 3);
}

#[test]
fn unknown_tag_offers_nearest_match() {
    let output = lex("\u{00a7}REQQ{q1:(!= b 0)}");
    assert_eq!(
        output.tokens[0].kind,
        TokenKind::TagUnknown("REQQ".to_string())
    );
    let diagnostic = &output.diagnostics[0];
    assert_eq!(diagnostic.code, ErrorCode::UnknownTag);
    assert!(diagnostic
        .suggestions
        .iter()
        .any(|s| s.message.contains("\u{00a7}REQ")));
}

#[test]
fn unterminated_string_recovers_to_line_end() {
    let output = lex("\"abc def\n(+ 1 2)");
    assert_eq!(output.diagnostics[0].code, ErrorCode::UnterminatedString);
    // Rest of the line became the literal, and lexing continued after it.
    assert_eq!(output.tokens[0].kind, TokenKind::Str("abc def".to_string()));
    assert_eq!(output.tokens[1].kind, TokenKind::LParen);
    assert_eq!(output.tokens[1].span.line, 2);
}

#[test]
fn string_escapes_are_processed() {
    let output = lex(r#""a\nb\"c""#);
    assert_eq!(
        output.tokens[0].kind,
        TokenKind::Str("a\nb\"c".to_string())
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn invalid_escape_is_reported() {
    let output = lex(r#""a\qb""#);
    assert_eq!(output.diagnostics[0].code, ErrorCode::InvalidEscape);
}

#[test]
fn both_arrow_spellings_lex_the_same() {
    assert_eq!(kinds("\u{2192}")[0], TokenKind::Arrow);
    assert_eq!(kinds("->")[0], TokenKind::Arrow);
}

#[test]
fn dotted_and_hyphenated_idents() {
    let kinds = kinds("geometry.shapes s.index-of remove-at");
    assert_eq!(kinds[0], TokenKind::Ident("geometry.shapes".to_string()));
    assert_eq!(kinds[1], TokenKind::Ident("s.index-of".to_string()));
    assert_eq!(kinds[2], TokenKind::Ident("remove-at".to_string()));
}

#[test]
fn numeric_literals() {
    let kinds = kinds("42 1_000 3.25 2.5e-3");
    assert_eq!(kinds[0], TokenKind::Int(42));
    assert_eq!(kinds[1], TokenKind::Int(1000));
    assert_eq!(kinds[2], TokenKind::float(3.25));
    assert_eq!(kinds[3], TokenKind::float(2.5e-3));
}

#[test]
fn char_literals_and_recovery() {
    let output = lex(r"'a' '\n'");
    assert_eq!(output.tokens[0].kind, TokenKind::Char('a'));
    assert_eq!(output.tokens[1].kind, TokenKind::Char('\n'));

    let bad = lex("'x");
    assert_eq!(bad.diagnostics[0].code, ErrorCode::UnterminatedChar);
    assert_eq!(bad.tokens[0].kind, TokenKind::Char('x'));
}

#[test]
fn comments_are_skipped() {
    let kinds = kinds("a ; trailing comment\nb");
    assert_eq!(kinds[0], TokenKind::Ident("a".to_string()));
    assert_eq!(kinds[1], TokenKind::Ident("b".to_string()));
}

#[test]
fn invalid_character_is_skipped_with_diagnostic() {
    let output = lex("a @ b");
    assert_eq!(output.diagnostics[0].code, ErrorCode::InvalidCharacter);
    let kinds: Vec<_> = output.tokens.iter().map(|t| &t.kind).collect();
    assert_eq!(kinds.len(), 3); // a, b, Eof
}

#[test]
fn stream_always_ends_with_eof() {
    assert_eq!(kinds("").last(), Some(&TokenKind::Eof));
    assert_eq!(kinds("(((").last(), Some(&TokenKind::Eof));
}
