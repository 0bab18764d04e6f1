//! Statement parsing.
//!
//! Leaf statements are a single tag; structural statements carry a
//! matching-ID closing tag in block form, or an arrow (`→ expr`) form with
//! no closer. The chosen form is recorded per node so the reverse emitter
//! can reproduce it.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{
    Assign, Bind, Body, BreakStmt, CatchClause, CollectionOp, CollectionOpStmt, ContinueStmt,
    DoWhileStmt, Expr, ForStmt, ForeachStmt, IfStmt, Literal, MatchCase, MatchExpr, MatchStmt,
    PrintStmt, Return, Stmt, Tag, ThrowStmt, TokenKind, TryStmt, WhileStmt,
};

use crate::recovery::{synchronize, STMT_START};
use crate::{PResult, Parser, Recovered};

impl Parser<'_> {
    /// Parse statements until a closing tag or one of the separator tags in
    /// `stop` is reached. Recovers inside the loop so one bad statement does
    /// not lose its siblings.
    pub(crate) fn parse_stmts_until(&mut self, stop: &[Tag]) -> Vec<Stmt> {
        let mut stmts = Vec::new();
        loop {
            match self.current_kind() {
                TokenKind::Eof | TokenKind::TagClose(_) => break,
                TokenKind::TagOpen(tag) if stop.contains(tag) => break,
                TokenKind::TagUnknown(_) => self.skip_unknown_tag(),
                _ => match self.parse_stmt() {
                    Ok(stmt) => stmts.push(stmt),
                    Err(Recovered) => synchronize(&mut self.cursor, STMT_START),
                },
            }
        }
        stmts
    }

    /// Parse one statement, dispatching on the opening tag.
    pub(crate) fn parse_stmt(&mut self) -> PResult<Stmt> {
        let tag = match self.current_kind() {
            TokenKind::TagOpen(tag) => *tag,
            _ => return Err(self.unexpected("a statement tag")),
        };
        match tag {
            Tag::B => self.parse_bind(),
            Tag::A => self.parse_assign(),
            Tag::Ret => self.parse_return(),
            Tag::Th => self.parse_throw(),
            Tag::Brk => self.parse_break(),
            Tag::Cont => self.parse_continue(),
            Tag::Prn => self.parse_print(),
            Tag::Co => self.parse_collection_op(),
            Tag::If => self.parse_if(),
            Tag::Wh => self.parse_while(),
            Tag::Dw => self.parse_do_while(),
            Tag::For => self.parse_for(),
            Tag::Fe => self.parse_foreach(),
            Tag::Try => self.parse_try(),
            Tag::Ma => self.parse_match_stmt(),
            _ => Err(self.unexpected("a statement tag")),
        }
    }

    /// Arrow body (`→ expr`) or block body closed by the construct's tag.
    ///
    /// Block form consumes the closing tag; arrow form has none.
    fn parse_body(&mut self, tag: Tag, id: &str) -> PResult<Body> {
        if self.eat(&TokenKind::Arrow) {
            let expr = self.parse_expr()?;
            return Ok(Body::Arrow(expr));
        }
        let stmts = self.parse_stmts_until(&[]);
        let _ = self.parse_closing(tag, id);
        Ok(Body::Block(stmts))
    }

    /// `§B{id:name:type:(value)}` or block form with a match expression.
    fn parse_bind(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let (name, _) = self.expect_ident("a binding name")?;
        self.expect_colon()?;
        let ty = self.parse_type()?;

        let value = if self.eat(&TokenKind::Colon) {
            let value = self.parse_expr()?;
            self.close_args(delim)?;
            value
        } else {
            self.close_args(delim)?;
            let value = self.parse_value_block(Tag::B, &id)?;
            value
        };

        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Bind(Bind {
            id: Self::node_id(id),
            name,
            ty,
            value,
            span,
        }))
    }

    /// `§A{id:target:(value)}` or block form with a match expression.
    fn parse_assign(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let (target, _) = self.expect_ident("an assignment target")?;

        let value = if self.eat(&TokenKind::Colon) {
            let value = self.parse_expr()?;
            self.close_args(delim)?;
            value
        } else {
            self.close_args(delim)?;
            self.parse_value_block(Tag::A, &id)?
        };

        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Assign(Assign {
            id: Self::node_id(id),
            target,
            value,
            span,
        }))
    }

    /// `§RET{id:(value)}`, bare `§RET{id}`, or block form with a match
    /// expression.
    fn parse_return(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;

        let value = if self.eat(&TokenKind::Colon) {
            let value = self.parse_expr()?;
            self.close_args(delim)?;
            Some(value)
        } else {
            self.close_args(delim)?;
            if self.check_tag_open(Tag::Mx) {
                Some(self.parse_value_block(Tag::Ret, &id)?)
            } else {
                None
            }
        };

        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Return(Return {
            id: Self::node_id(id),
            value,
            span,
        }))
    }

    /// Block form of a value-carrying leaf: the body is exactly one match
    /// expression, then the closing tag.
    fn parse_value_block(&mut self, tag: Tag, id: &str) -> PResult<Expr> {
        if !self.check_tag_open(Tag::Mx) {
            let span = self.current_span();
            self.report(
                Diagnostic::error(ErrorCode::MissingClause)
                    .with_message(format!(
                        "`\u{00a7}{}` without an inline value must contain a match expression",
                        tag.name()
                    ))
                    .with_label(span, "expected `\u{00a7}MX{...}`"),
            );
            // The cursor already rests on a statement boundary; a recovery
            // value keeps the next statement from being skipped.
            return Ok(Expr::Literal(Literal::Unit, span));
        }
        let match_expr = self.parse_match_expr()?;
        let value = Expr::Match(Box::new(match_expr));
        let _ = self.parse_closing(tag, id);
        Ok(value)
    }

    fn parse_throw(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let value = self.parse_expr()?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Throw(ThrowStmt {
            id: Self::node_id(id),
            value,
            span,
        }))
    }

    fn parse_break(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Break(BreakStmt {
            id: Self::node_id(id),
            span,
        }))
    }

    fn parse_continue(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Continue(ContinueStmt {
            id: Self::node_id(id),
            span,
        }))
    }

    fn parse_print(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let value = self.parse_expr()?;
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Print(PrintStmt {
            id: Self::node_id(id),
            value,
            span,
        }))
    }

    /// `§CO{id:op:target:(arg)...}`
    fn parse_collection_op(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let (op_name, op_span) = self.expect_ident("a collection operation")?;
        let Some(op) = CollectionOp::from_name(&op_name) else {
            self.report(
                Diagnostic::error(ErrorCode::UnexpectedToken)
                    .with_message(format!("unknown collection operation `{op_name}`"))
                    .with_label(
                        op_span,
                        "expected `add`, `remove`, `insert`, `remove-at`, `set`, or `clear`",
                    ),
            );
            return Err(Recovered);
        };
        self.expect_colon()?;
        let (target, _) = self.expect_ident("a collection name")?;
        let mut args = Vec::new();
        while self.eat(&TokenKind::Colon) {
            args.push(self.parse_expr()?);
        }
        self.close_args(delim)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::CollectionOp(CollectionOpStmt {
            id: Self::node_id(id),
            op,
            target,
            args,
            span,
        }))
    }

    /// `§IF{id:(cond)}` with arrow form, or block form with an optional
    /// `§EL{id}` else separator.
    fn parse_if(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let cond = self.parse_expr()?;
        self.close_args(delim)?;

        if self.eat(&TokenKind::Arrow) {
            let expr = self.parse_expr()?;
            // An arrow `then` may still carry an else clause; that form is
            // explicitly closed. The ID lookahead keeps an enclosing
            // block-form if's `§EL` from being captured by a nested arrow if.
            let else_body = if self.check_tag_open(Tag::El) && self.el_belongs_to(&id) {
                self.parse_separator(Tag::El, &id)?;
                let body = if self.eat(&TokenKind::Arrow) {
                    Body::Arrow(self.parse_expr()?)
                } else {
                    Body::Block(self.parse_stmts_until(&[]))
                };
                let _ = self.parse_closing(Tag::If, &id);
                Some(body)
            } else {
                None
            };
            let span = open_span.merge(self.previous_span());
            return Ok(Stmt::If(IfStmt {
                id: Self::node_id(id),
                cond,
                then_body: Body::Arrow(expr),
                else_body,
                span,
            }));
        }

        let then_stmts = self.parse_stmts_until(&[Tag::El]);
        let else_body = if self.check_tag_open(Tag::El) {
            self.parse_separator(Tag::El, &id)?;
            if self.eat(&TokenKind::Arrow) {
                Some(Body::Arrow(self.parse_expr()?))
            } else {
                Some(Body::Block(self.parse_stmts_until(&[])))
            }
        } else {
            None
        };
        let _ = self.parse_closing(Tag::If, &id);

        let span = open_span.merge(self.previous_span());
        Ok(Stmt::If(IfStmt {
            id: Self::node_id(id),
            cond,
            then_body: Body::Block(then_stmts),
            else_body,
            span,
        }))
    }

    /// Whether the `§EL` tag under the cursor carries this construct's ID.
    fn el_belongs_to(&self, id: &str) -> bool {
        matches!(
            self.cursor.peek_nth(1),
            TokenKind::LBrace | TokenKind::LBracket
        ) && matches!(self.cursor.peek_nth(2), TokenKind::Ident(el_id) if el_id == id)
    }

    /// A separator tag (`§EL`, `§CATCH`, `§FIN`) carrying the enclosing
    /// construct's ID. Returns after consuming the argument group head.
    fn parse_separator(&mut self, tag: Tag, opening_id: &str) -> PResult<()> {
        self.advance();
        let delim = self.open_args()?;
        let (sep_id, sep_span) = self.parse_id()?;
        if sep_id != opening_id {
            self.report(
                Diagnostic::error(ErrorCode::IdMismatch)
                    .with_message(format!(
                        "`\u{00a7}{}` ID `{sep_id}` does not match opening tag ID `{opening_id}`",
                        tag.name()
                    ))
                    .with_label(sep_span, format!("expected `{opening_id}`"))
                    .with_suggestion(calor_diagnostic::Suggestion::machine_applicable(
                        format!("replace `{sep_id}` with `{opening_id}`"),
                        sep_span,
                        opening_id,
                    )),
            );
        }
        self.close_args(delim)?;
        Ok(())
    }

    fn parse_while(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let cond = self.parse_expr()?;
        self.close_args(delim)?;
        let body = self.parse_body(Tag::Wh, &id)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::While(WhileStmt {
            id: Self::node_id(id),
            cond,
            body,
            span,
        }))
    }

    fn parse_do_while(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let cond = self.parse_expr()?;
        self.close_args(delim)?;
        let body = self.parse_body(Tag::Dw, &id)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::DoWhile(DoWhileStmt {
            id: Self::node_id(id),
            cond,
            body,
            span,
        }))
    }

    /// `§FOR{id:var:(from):(to)[:(step)]}`
    fn parse_for(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let (var, _) = self.expect_ident("a loop variable")?;
        self.expect_colon()?;
        let from = self.parse_expr()?;
        self.expect_colon()?;
        let to = self.parse_expr()?;
        let step = if self.eat(&TokenKind::Colon) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.close_args(delim)?;
        let body = self.parse_body(Tag::For, &id)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::For(ForStmt {
            id: Self::node_id(id),
            var,
            from,
            to,
            step,
            body,
            span,
        }))
    }

    /// `§FE{id:var:(seq)}`
    fn parse_foreach(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let (var, _) = self.expect_ident("a loop variable")?;
        self.expect_colon()?;
        let seq = self.parse_expr()?;
        self.close_args(delim)?;
        let body = self.parse_body(Tag::Fe, &id)?;
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Foreach(ForeachStmt {
            id: Self::node_id(id),
            var,
            seq,
            body,
            span,
        }))
    }

    /// `§TRY{id}` body `§CATCH{id:var:type}` body `§FIN{id}` body `§/TRY{id}`
    fn parse_try(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.close_args(delim)?;

        let body = self.parse_stmts_until(&[Tag::Catch, Tag::Fin]);

        let catch = if self.check_tag_open(Tag::Catch) {
            let catch_span = self.current_span();
            self.advance();
            let delim = self.open_args()?;
            let (catch_id, catch_id_span) = self.parse_id()?;
            if catch_id != id {
                self.report(
                    Diagnostic::error(ErrorCode::IdMismatch)
                        .with_message(format!(
                            "`\u{00a7}CATCH` ID `{catch_id}` does not match opening tag ID `{id}`"
                        ))
                        .with_label(catch_id_span, format!("expected `{id}`"))
                        .with_suggestion(calor_diagnostic::Suggestion::machine_applicable(
                            format!("replace `{catch_id}` with `{id}`"),
                            catch_id_span,
                            &id,
                        )),
                );
            }
            self.expect_colon()?;
            let (var, _) = self.expect_ident("an exception binding")?;
            self.expect_colon()?;
            let ty = self.parse_type()?;
            self.close_args(delim)?;
            let catch_body = self.parse_stmts_until(&[Tag::Fin]);
            let span = catch_span.merge(self.previous_span());
            Some(CatchClause {
                var,
                ty,
                body: catch_body,
                span,
            })
        } else {
            None
        };

        let finally = if self.check_tag_open(Tag::Fin) {
            self.parse_separator(Tag::Fin, &id)?;
            Some(self.parse_stmts_until(&[]))
        } else {
            None
        };

        if catch.is_none() && finally.is_none() {
            let span = self.current_span();
            self.report(
                Diagnostic::error(ErrorCode::MissingClause)
                    .with_message("`\u{00a7}TRY` requires a `\u{00a7}CATCH` or `\u{00a7}FIN` clause")
                    .with_label(span, "add a catch or finally clause"),
            );
        }

        let _ = self.parse_closing(Tag::Try, &id);
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Try(TryStmt {
            id: Self::node_id(id),
            body,
            catch,
            finally,
            span,
        }))
    }

    /// `§MA{id:(scrutinee)}` cases `§/MA{id}`
    fn parse_match_stmt(&mut self) -> PResult<Stmt> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let scrutinee = self.parse_expr()?;
        self.close_args(delim)?;

        let cases = self.parse_cases(Tag::Ma);
        let _ = self.parse_closing(Tag::Ma, &id);
        let span = open_span.merge(self.previous_span());
        Ok(Stmt::Match(MatchStmt {
            id: Self::node_id(id),
            scrutinee,
            cases,
            span,
        }))
    }

    /// `§MX{id:(scrutinee)}` cases `§/MX{id}` — match in expression position.
    ///
    /// Cases must use arrow form: the construct produces a value.
    pub(crate) fn parse_match_expr(&mut self) -> PResult<MatchExpr> {
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let scrutinee = self.parse_expr()?;
        self.close_args(delim)?;

        let cases = self.parse_cases(Tag::Mx);
        for case in &cases {
            if matches!(case.body, Body::Block(_)) {
                self.report(
                    Diagnostic::error(ErrorCode::ExpectedExpression)
                        .with_message("match-expression cases must use arrow form")
                        .with_label(case.span, "write `\u{2192} expr` instead of a block"),
                );
            }
        }
        let _ = self.parse_closing(Tag::Mx, &id);
        let span = open_span.merge(self.previous_span());
        Ok(MatchExpr {
            id: Self::node_id(id),
            scrutinee,
            cases,
            span,
        })
    }

    /// Parse `§CS` cases until the enclosing match closes.
    fn parse_cases(&mut self, enclosing: Tag) -> Vec<MatchCase> {
        let mut cases = Vec::new();
        while !self.check_tag_close(enclosing) && !self.is_at_end() {
            if matches!(self.current_kind(), TokenKind::TagUnknown(_)) {
                self.skip_unknown_tag();
                continue;
            }
            match self.parse_case() {
                Ok(case) => cases.push(case),
                Err(Recovered) => {
                    synchronize(&mut self.cursor, crate::recovery::TagSet::new().with(Tag::Cs));
                }
            }
        }
        cases
    }

    /// `§CS{id:pattern[:(guard)]}` with arrow or block body.
    fn parse_case(&mut self) -> PResult<MatchCase> {
        if !self.check_tag_open(Tag::Cs) {
            return Err(self.unexpected("a `\u{00a7}CS` case tag"));
        }
        let open_span = self.current_span();
        self.advance();
        let delim = self.open_args()?;
        let (id, _) = self.parse_id()?;
        self.expect_colon()?;
        let pattern = self.parse_pattern()?;
        let guard = if self.eat(&TokenKind::Colon) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        self.close_args(delim)?;

        let body = if self.eat(&TokenKind::Arrow) {
            Body::Arrow(self.parse_expr()?)
        } else {
            let stmts = self.parse_stmts_until(&[]);
            let _ = self.parse_closing(Tag::Cs, &id);
            Body::Block(stmts)
        };

        let span = open_span.merge(self.previous_span());
        Ok(MatchCase {
            id: Self::node_id(id),
            pattern,
            guard,
            body,
            span,
        })
    }
}
