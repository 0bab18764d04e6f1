//! Expression parsing.
//!
//! Expressions are fully parenthesized Lisp prefix forms plus atoms.
//! The head of a parenthesized form decides the node kind: an operator
//! token, a special keyword (`if`, `new`, `cast`, `fn`, ...), an intrinsic
//! name (`s.*`, `c.*`, `sb.*`), a variant constructor, or a plain reference
//! head that becomes a call.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{
    BinaryOp, BuilderOp, CharOp, CompareMode, Expr, Literal, OpKind, OptionOp, Span, StringOp,
    Tag, TokenKind, UnaryOp, VariantCtor,
};

use crate::{PResult, Parser, Recovered};

impl Parser<'_> {
    /// Parse one expression (atom or parenthesized form).
    pub(crate) fn parse_expr(&mut self) -> PResult<Expr> {
        let span = self.current_span();
        match self.current_kind() {
            TokenKind::Int(value) => {
                let value = *value;
                self.advance();
                Ok(Expr::Literal(Literal::Int(self.int_literal(value)), span))
            }
            TokenKind::Float(bits) => {
                let value = f64::from_bits(*bits);
                self.advance();
                Ok(Expr::Literal(Literal::Float(value), span))
            }
            TokenKind::Str(text) => {
                let text = text.clone();
                self.advance();
                Ok(Expr::Literal(Literal::Str(text), span))
            }
            TokenKind::Char(c) => {
                let c = *c;
                self.advance();
                Ok(Expr::Literal(Literal::Char(c), span))
            }
            TokenKind::Bool(b) => {
                let b = *b;
                self.advance();
                Ok(Expr::Literal(Literal::Bool(b), span))
            }
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(Expr::Reference(name, span))
            }
            TokenKind::LParen => self.parse_paren_expr(),
            TokenKind::TagOpen(Tag::Mx) => {
                let match_expr = self.parse_match_expr()?;
                Ok(Expr::Match(Box::new(match_expr)))
            }
            _ => {
                let found = self.current_kind().describe();
                self.report(
                    Diagnostic::error(ErrorCode::ExpectedExpression)
                        .with_message(format!("expected an expression, found {found}"))
                        .with_label(span, "expected an expression"),
                );
                Err(Recovered)
            }
        }
    }

    /// Clamp a lexed integer into the AST literal range.
    fn int_literal(&mut self, value: u64) -> i64 {
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

    fn parse_paren_expr(&mut self) -> PResult<Expr> {
        let open_span = self.current_span();
        self.expect(&TokenKind::LParen, "`(`")?;

        // `()` is the unit literal.
        if self.eat(&TokenKind::RParen) {
            let span = open_span.merge(self.previous_span());
            return Ok(Expr::Literal(Literal::Unit, span));
        }

        let expr = match self.current_kind() {
            TokenKind::Op(op) => {
                let op = *op;
                self.advance();
                self.parse_operator_form(op, open_span)?
            }
            TokenKind::Dot => {
                self.advance();
                let receiver = self.parse_expr()?;
                let (field, _) = self.expect_ident("a field name")?;
                let span = open_span.merge(self.current_span());
                Expr::FieldAccess(Box::new(receiver), field, span)
            }
            TokenKind::Ident(name) => {
                let head = name.clone();
                let head_span = self.current_span();
                self.advance();
                self.parse_named_form(&head, head_span, open_span)?
            }
            TokenKind::LParen => {
                // Computed callee: `((...) arg...)`.
                let callee = self.parse_expr()?;
                let args = self.parse_args_until_rparen()?;
                let span = open_span.merge(self.current_span());
                Expr::Call(Box::new(callee), args, span)
            }
            _ => return Err(self.unexpected("an operator or form head")),
        };

        self.expect(&TokenKind::RParen, "`)`")?;
        Ok(expr)
    }

    /// `(op ...)` with an operator head.
    fn parse_operator_form(&mut self, op: OpKind, open_span: Span) -> PResult<Expr> {
        // `!` and `~` are unary; `-` is unary with one operand.
        let unary = match op {
            OpKind::Not => Some(UnaryOp::Not),
            OpKind::Tilde => Some(UnaryOp::BitNot),
            _ => None,
        };
        if let Some(unary) = unary {
            let operand = self.parse_expr()?;
            let span = open_span.merge(self.current_span());
            return Ok(Expr::Unary(unary, Box::new(operand), span));
        }

        let first = self.parse_expr()?;
        if op == OpKind::Minus && self.check(&TokenKind::RParen) {
            let span = open_span.merge(self.current_span());
            return Ok(Expr::Unary(UnaryOp::Neg, Box::new(first), span));
        }

        let Some(binary) = binary_op(op) else {
            return Err(self.unexpected("a binary operator"));
        };
        let second = self.parse_expr()?;
        if !self.check(&TokenKind::RParen) {
            let span = self.current_span();
            self.report(
                Diagnostic::error(ErrorCode::UnexpectedToken)
                    .with_message(format!(
                        "operator `{}` takes exactly two operands",
                        binary.symbol()
                    ))
                    .with_label(span, "extra operand"),
            );
            // Skip the extras so the enclosing form still closes.
            while !self.check(&TokenKind::RParen) && !self.is_at_end() {
                self.parse_expr()?;
            }
        }
        let span = open_span.merge(self.current_span());
        Ok(Expr::Binary(binary, Box::new(first), Box::new(second), span))
    }

    /// A parenthesized form with an identifier head.
    fn parse_named_form(
        &mut self,
        head: &str,
        head_span: Span,
        open_span: Span,
    ) -> PResult<Expr> {
        // Special form keywords.
        match head {
            "if" => {
                let cond = self.parse_expr()?;
                let then = self.parse_expr()?;
                let otherwise = self.parse_expr()?;
                let span = open_span.merge(self.current_span());
                return Ok(Expr::Conditional(
                    Box::new(cond),
                    Box::new(then),
                    Box::new(otherwise),
                    span,
                ));
            }
            "new" => {
                let (type_name, _) = self.expect_ident("a type name")?;
                let args = self.parse_args_until_rparen()?;
                let span = open_span.merge(self.current_span());
                return Ok(Expr::New(type_name, args, span));
            }
            "cast" => {
                let ty = self.parse_type()?;
                let value = self.parse_expr()?;
                let span = open_span.merge(self.current_span());
                return Ok(Expr::Cast(ty, Box::new(value), span));
            }
            "unchecked" => {
                let value = self.parse_expr()?;
                let span = open_span.merge(self.current_span());
                return Ok(Expr::Unchecked(Box::new(value), span));
            }
            "await" => {
                let value = self.parse_expr()?;
                let span = open_span.merge(self.current_span());
                return Ok(Expr::Await(Box::new(value), span));
            }
            "fn" => return self.parse_lambda(open_span),
            _ => {}
        }

        if let Some(ctor) = VariantCtor::from_name(head) {
            let payload = if self.check(&TokenKind::RParen) {
                None
            } else {
                Some(Box::new(self.parse_expr()?))
            };
            let span = open_span.merge(self.current_span());
            return Ok(Expr::Variant(ctor, payload, span));
        }

        if let Some(op) = OptionOp::from_name(head) {
            let args = self.parse_args_until_rparen()?;
            let span = open_span.merge(self.current_span());
            return Ok(Expr::OptionOp(op, args, span));
        }

        if let Some(op) = StringOp::from_name(head) {
            let (args, mode) = self.parse_string_op_args(op)?;
            let span = open_span.merge(self.current_span());
            return Ok(Expr::StringOp(op, args, mode, span));
        }

        if let Some(op) = CharOp::from_name(head) {
            let args = self.parse_args_until_rparen()?;
            let span = open_span.merge(self.current_span());
            return Ok(Expr::CharOp(op, args, span));
        }

        if let Some(op) = BuilderOp::from_name(head) {
            let args = self.parse_args_until_rparen()?;
            let span = open_span.merge(self.current_span());
            return Ok(Expr::BuilderOp(op, args, span));
        }

        // Anything else is a call with a reference head.
        let callee = Expr::Reference(head.to_string(), head_span);
        let args = self.parse_args_until_rparen()?;
        let span = open_span.merge(self.current_span());
        Ok(Expr::Call(Box::new(callee), args, span))
    }

    /// `(fn (name:type ...) expr)`
    fn parse_lambda(&mut self, open_span: Span) -> PResult<Expr> {
        self.expect(&TokenKind::LParen, "`(`")?;
        let mut params = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            let (name, _) = self.expect_ident("a parameter name")?;
            self.expect_colon()?;
            let ty = self.parse_type()?;
            params.push((name, ty));
        }
        self.expect(&TokenKind::RParen, "`)`")?;
        let body = self.parse_expr()?;
        let span = open_span.merge(self.current_span());
        Ok(Expr::Lambda(params, Box::new(body), span))
    }

    /// Collect argument expressions up to (not consuming) `)`.
    fn parse_args_until_rparen(&mut self) -> PResult<Vec<Expr>> {
        let mut args = Vec::new();
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            args.push(self.parse_expr()?);
        }
        Ok(args)
    }

    /// String-op arguments with an optional trailing `:mode` keyword.
    fn parse_string_op_args(
        &mut self,
        op: StringOp,
    ) -> PResult<(Vec<Expr>, Option<CompareMode>)> {
        let mut args = Vec::new();
        let mut mode = None;
        while !self.check(&TokenKind::RParen) && !self.is_at_end() {
            if self.eat(&TokenKind::Colon) {
                let (keyword, span) = self.expect_ident("a comparison mode")?;
                match CompareMode::from_keyword(&keyword) {
                    Some(parsed) if op.takes_compare_mode() => mode = Some(parsed),
                    Some(_) => {
                        self.report(
                            Diagnostic::error(ErrorCode::UnexpectedToken)
                                .with_message(format!(
                                    "`{}` does not take a comparison mode",
                                    op.name()
                                ))
                                .with_label(span, "mode not allowed here"),
                        );
                    }
                    None => {
                        self.report(
                            Diagnostic::error(ErrorCode::UnexpectedToken)
                                .with_message(format!("unknown comparison mode `:{keyword}`"))
                                .with_label(span, "expected `ord`, `ic`, `inv`, or `inv-ic`"),
                        );
                    }
                }
            } else {
                args.push(self.parse_expr()?);
            }
        }
        Ok((args, mode))
    }
}

fn binary_op(op: OpKind) -> Option<BinaryOp> {
    match op {
        OpKind::Plus => Some(BinaryOp::Add),
        OpKind::Minus => Some(BinaryOp::Sub),
        OpKind::Star => Some(BinaryOp::Mul),
        OpKind::Slash => Some(BinaryOp::Div),
        OpKind::Percent => Some(BinaryOp::Rem),
        OpKind::EqEq => Some(BinaryOp::Eq),
        OpKind::NotEq => Some(BinaryOp::Ne),
        OpKind::Lt => Some(BinaryOp::Lt),
        OpKind::LtEq => Some(BinaryOp::Le),
        OpKind::Gt => Some(BinaryOp::Gt),
        OpKind::GtEq => Some(BinaryOp::Ge),
        OpKind::AndAnd => Some(BinaryOp::And),
        OpKind::OrOr => Some(BinaryOp::Or),
        OpKind::Amp => Some(BinaryOp::BitAnd),
        OpKind::Pipe => Some(BinaryOp::BitOr),
        OpKind::Caret => Some(BinaryOp::BitXor),
        OpKind::Shl => Some(BinaryOp::Shl),
        OpKind::Shr => Some(BinaryOp::Shr),
        OpKind::Not | OpKind::Tilde | OpKind::Eq => None,
    }
}
