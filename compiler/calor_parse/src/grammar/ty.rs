//! Type reference parsing.
//!
//! Types appear in tag arguments: primitives, the built-in generics
//! (`opt<T>`, `res<T,E>`, `list<T>`, `map<K,V>`, `task<T>`), and user type
//! names. Nested generics can end in `>>`, which the lexer produces as a
//! single shift token; the close helper splits it.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{OpKind, TokenKind, TypeRef};

use crate::{PResult, Parser};

impl Parser<'_> {
    /// Parse a type reference.
    pub(crate) fn parse_type(&mut self) -> PResult<TypeRef> {
        let mut pending_gt = 0u32;
        let ty = self.parse_type_inner(&mut pending_gt)?;
        if pending_gt > 0 {
            let span = self.previous_span();
            self.report(
                Diagnostic::error(ErrorCode::UnexpectedToken)
                    .with_message("unmatched `>` in type")
                    .with_label(span, "no generic to close here"),
            );
        }
        Ok(ty)
    }

    fn parse_type_inner(&mut self, pending_gt: &mut u32) -> PResult<TypeRef> {
        let (name, _) = self.expect_ident("a type")?;
        if let Some(primitive) = TypeRef::primitive(&name) {
            return Ok(primitive);
        }
        match name.as_str() {
            "opt" => {
                self.generic_open()?;
                let inner = self.parse_type_inner(pending_gt)?;
                self.generic_close(pending_gt)?;
                Ok(TypeRef::Opt(Box::new(inner)))
            }
            "res" => {
                self.generic_open()?;
                let ok = self.parse_type_inner(pending_gt)?;
                self.expect(&TokenKind::Comma, "`,`")?;
                let err = self.parse_type_inner(pending_gt)?;
                self.generic_close(pending_gt)?;
                Ok(TypeRef::Res(Box::new(ok), Box::new(err)))
            }
            "list" => {
                self.generic_open()?;
                let inner = self.parse_type_inner(pending_gt)?;
                self.generic_close(pending_gt)?;
                Ok(TypeRef::List(Box::new(inner)))
            }
            "map" => {
                self.generic_open()?;
                let key = self.parse_type_inner(pending_gt)?;
                self.expect(&TokenKind::Comma, "`,`")?;
                let value = self.parse_type_inner(pending_gt)?;
                self.generic_close(pending_gt)?;
                Ok(TypeRef::Map(Box::new(key), Box::new(value)))
            }
            "task" => {
                self.generic_open()?;
                let inner = self.parse_type_inner(pending_gt)?;
                self.generic_close(pending_gt)?;
                Ok(TypeRef::Task(Box::new(inner)))
            }
            _ => Ok(TypeRef::Named(name)),
        }
    }

    fn generic_open(&mut self) -> PResult<()> {
        self.expect(&TokenKind::Op(OpKind::Lt), "`<`")?;
        Ok(())
    }

    /// Close a generic argument list, splitting `>>` into two closes.
    fn generic_close(&mut self, pending_gt: &mut u32) -> PResult<()> {
        if *pending_gt > 0 {
            *pending_gt -= 1;
            return Ok(());
        }
        if self.eat(&TokenKind::Op(OpKind::Gt)) {
            return Ok(());
        }
        if self.check(&TokenKind::Op(OpKind::Shr)) {
            self.advance();
            *pending_gt += 1;
            return Ok(());
        }
        Err(self.unexpected("`>`"))
    }
}
