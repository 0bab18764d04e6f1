//! Pattern parsing for match cases.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{ListRest, Literal, Pattern, RelOp, TokenKind};

use crate::{PResult, Parser, Recovered};

impl Parser<'_> {
    /// Parse one pattern.
    pub(crate) fn parse_pattern(&mut self) -> PResult<Pattern> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Ident(name) if name == "_" => {
                self.advance();
                Ok(Pattern::Wildcard(span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(Pattern::Variable(name, span))
            }
            TokenKind::Int(value) => {
                let value = *value;
                self.advance();
                Ok(Pattern::Literal(Literal::Int(self.int_pattern(value)), span))
            }
            TokenKind::Float(bits) => {
                let value = f64::from_bits(*bits);
                self.advance();
                Ok(Pattern::Literal(Literal::Float(value), span))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(Pattern::Literal(Literal::Str(text), span))
            }
            TokenKind::Char(c) => {
                let c = *c;
                self.advance();
                Ok(Pattern::Literal(Literal::Char(c), span))
            }
            TokenKind::Bool(b) => {
                let b = *b;
                self.advance();
                Ok(Pattern::Literal(Literal::Bool(b), span))
            }
            TokenKind::LParen => self.parse_paren_pattern(),
            _ => {
                let found = self.current_kind().describe();
                self.report(
                    Diagnostic::error(ErrorCode::InvalidPattern)
                        .with_message(format!("expected a pattern, found {found}"))
                        .with_label(span, "expected a pattern"),
                );
                Err(Recovered)
            }
        }
    }

    fn int_pattern(&mut self, value: u64) -> i64 {
        match i64::try_from(value) {
            Ok(value) => value,
            Err(_) => {
                let span = self.previous_span();
                self.report(
                    Diagnostic::error(ErrorCode::InvalidNumber)
                        .with_message(format!("integer literal `{value}` is out of range"))
                        .with_label(span, "does not fit in a 64-bit signed integer"),
                );
                0
            }
        }
    }

    fn parse_paren_pattern(&mut self) -> PResult<Pattern> {
        let open_span = self.current_span();
        self.expect(&TokenKind::LParen, "`(`")?;
        let (head, head_span) = self.expect_ident("a pattern head")?;

        let pattern = if let Some(rel) = RelOp::from_keyword(&head) {
            let bound = self.parse_expr()?;
            let span = open_span.merge(self.current_span());
            Pattern::Relational(rel, bound, span)
        } else {
            match head.as_str() {
                "some" => {
                    let inner = self.parse_pattern()?;
                    let span = open_span.merge(self.current_span());
                    Pattern::Some(Box::new(inner), span)
                }
                "none" => {
                    let span = open_span.merge(self.current_span());
                    Pattern::None(span)
                }
                "ok" => {
                    let inner = self.parse_pattern()?;
                    let span = open_span.merge(self.current_span());
                    Pattern::Ok(Box::new(inner), span)
                }
                "err" => {
                    let inner = self.parse_pattern()?;
                    let span = open_span.merge(self.current_span());
                    Pattern::Err(Box::new(inner), span)
                }
                "prop" => self.parse_property_pattern(open_span)?,
                "pos" => self.parse_positional_pattern(open_span)?,
                "list" => self.parse_list_pattern(open_span)?,
                _ => {
                    self.report(
                        Diagnostic::error(ErrorCode::InvalidPattern)
                            .with_message(format!("unknown pattern head `{head}`"))
                            .with_label(head_span, "expected `some`, `none`, `ok`, `err`, `ge`, `le`, `gt`, `lt`, `prop`, `pos`, or `list`"),
                    );
                    return Err(Recovered);
                }
            }
        };

        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(pattern)
    }

    /// `(prop Type (field pattern)...)`
    fn parse_property_pattern(&mut self, open_span: calor_ir::Span) -> PResult<Pattern> {
        let (type_name, _) = self.expect_ident("a type name")?;
        let mut fields = Vec::new();
        while self.check(&TokenKind::LParen) {
            self.advance();
            let (field, _) = self.expect_ident("a field name")?;
            let pattern = self.parse_pattern()?;
            self.expect(&TokenKind::RParen, "`)`")?;
            fields.push((field, pattern));
        }
        let span = open_span.merge(self.current_span());
        Ok(Pattern::Property(type_name, fields, span))
    }

    /// `(pos Type pattern...)`
    fn parse_positional_pattern(&mut self, open_span: calor_ir::Span) -> PResult<Pattern> {
        let (type_name, _) = self.expect_ident("a type name")?;
        let mut elements = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            elements.push(self.parse_pattern()?);
        }
        let span = open_span.merge(self.current_span());
        Ok(Pattern::Positional(type_name, elements, span))
    }

    /// `(list pattern... [..rest | ..])`
    fn parse_list_pattern(&mut self, open_span: calor_ir::Span) -> PResult<Pattern> {
        let mut elements = Vec::new();
        let mut rest = None;
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.eat(&TokenKind::DotDot) {
                rest = Some(match self.current_kind() {
                    TokenKind::Ident(name) => {
                        let name = name.clone();
                        self.advance();
                        ListRest::Named(name)
                    }
                    _ => ListRest::Anonymous,
                });
                if !self.check(&TokenKind::RParen) {
                    let span = self.current_span();
                    self.report(
                        Diagnostic::error(ErrorCode::InvalidPattern)
                            .with_message("rest element must be last in a list pattern")
                            .with_label(span, "nothing may follow the rest element"),
                    );
                }
                break;
            }
            elements.push(self.parse_pattern()?);
        }
        let span = open_span.merge(self.current_span());
        Ok(Pattern::List(elements, rest, span))
    }
}
