//! Statement emission and contract lowering.
//!
//! A requires clause becomes an entry guard before the first body
//! statement; each ensures clause becomes a guard on every return path,
//! with `result` substituted by the captured return value. Both throw the
//! contract-violation signal carrying the original condition text.

use calor_diagnostic::{Diagnostic, ErrorCode};
use calor_ir::{
    Body, CollectionOp, ContractClause, ContractKind, Expr, Function, ListRest, Pattern, Stmt,
    TypeRef,
};

use crate::expr::{cs_literal, ExprCtx};
use crate::types::{ident, value_type};
use crate::{cs_string, CSharpEmitter};

/// Function-level emission context.
pub(crate) struct FnCtx<'a> {
    /// Ensures (and invariant) clauses guarding every return path.
    pub(crate) ensures: &'a [ContractClause],
}

impl CSharpEmitter {
    /// Contracts, then body, then the fall-through exit guards of a void
    /// function.
    pub(crate) fn emit_function_body(&mut self, f: &Function, depth: usize) {
        for clause in &f.contracts {
            if matches!(clause.kind, ContractKind::Requires | ContractKind::Invariant) {
                self.emit_contract_guard(clause, depth, ExprCtx::default());
            }
        }

        let ensures: Vec<ContractClause> = f
            .contracts
            .iter()
            .filter(|c| matches!(c.kind, ContractKind::Ensures | ContractKind::Invariant))
            .cloned()
            .collect();
        let ctx = FnCtx { ensures: &ensures };

        for stmt in &f.body {
            self.emit_stmt(stmt, depth, &ctx);
        }

        // A void function can fall off the end; its exit guards still run.
        if matches!(f.ret, TypeRef::Unit) && !ensures.is_empty() {
            for clause in &ensures {
                self.emit_contract_guard(clause, depth, ExprCtx::default());
            }
        }
    }

    /// `if (!(cond)) throw new ContractViolationException(...);`
    fn emit_contract_guard(&mut self, clause: &ContractClause, depth: usize, ctx: ExprCtx<'_>) {
        let cond = self.emit_expr(&clause.condition, ctx);
        let kind = clause.kind.keyword();
        let original = cs_string(&clause.condition.pretty());
        let detail = match &clause.message {
            Some(message) => format!(", {}", cs_string(message)),
            None => String::new(),
        };
        self.out.line(
            depth,
            &format!(
                "if (!({cond})) throw new Calor.Runtime.ContractViolationException(\"{kind}\", {original}{detail});"
            ),
        );
    }

    pub(crate) fn emit_stmt(&mut self, stmt: &Stmt, depth: usize, ctx: &FnCtx<'_>) {
        match stmt {
            Stmt::Bind(bind) => {
                let value = self.emit_expr(&bind.value, ExprCtx::default());
                self.out.line(
                    depth,
                    &format!(
                        "{} {} = {value};",
                        value_type(&bind.ty),
                        ident(&bind.name)
                    ),
                );
            }
            Stmt::Assign(assign) => {
                let value = self.emit_expr(&assign.value, ExprCtx::default());
                self.out
                    .line(depth, &format!("{} = {value};", ident(&assign.target)));
            }
            Stmt::Return(ret) => self.emit_return(ret.value.as_ref(), depth, ctx),
            Stmt::If(if_stmt) => {
                let cond = self.emit_expr(&if_stmt.cond, ExprCtx::default());
                self.out.line(depth, &format!("if ({cond})"));
                self.out.line(depth, "{");
                self.emit_body(&if_stmt.then_body, depth + 1, ctx, true);
                self.out.line(depth, "}");
                if let Some(else_body) = &if_stmt.else_body {
                    self.out.line(depth, "else");
                    self.out.line(depth, "{");
                    self.emit_body(else_body, depth + 1, ctx, true);
                    self.out.line(depth, "}");
                }
            }
            Stmt::For(for_stmt) => {
                let var = ident(&for_stmt.var);
                let from = self.emit_expr(&for_stmt.from, ExprCtx::default());
                let to = self.emit_expr(&for_stmt.to, ExprCtx::default());
                let step = match &for_stmt.step {
                    Some(step) => self.emit_expr(step, ExprCtx::default()),
                    None => "1".to_string(),
                };
                self.out.line(
                    depth,
                    &format!("for (var {var} = {from}; {var} < {to}; {var} += {step})"),
                );
                self.out.line(depth, "{");
                self.emit_body(&for_stmt.body, depth + 1, ctx, false);
                self.out.line(depth, "}");
            }
            Stmt::While(while_stmt) => {
                let cond = self.emit_expr(&while_stmt.cond, ExprCtx::default());
                self.out.line(depth, &format!("while ({cond})"));
                self.out.line(depth, "{");
                self.emit_body(&while_stmt.body, depth + 1, ctx, false);
                self.out.line(depth, "}");
            }
            Stmt::DoWhile(do_stmt) => {
                self.out.line(depth, "do");
                self.out.line(depth, "{");
                self.emit_body(&do_stmt.body, depth + 1, ctx, false);
                self.out.line(depth, "}");
                let cond = self.emit_expr(&do_stmt.cond, ExprCtx::default());
                self.out.line(depth, &format!("while ({cond});"));
            }
            Stmt::Foreach(foreach) => {
                let seq = self.emit_expr(&foreach.seq, ExprCtx::default());
                self.out.line(
                    depth,
                    &format!("foreach (var {} in {seq})", ident(&foreach.var)),
                );
                self.out.line(depth, "{");
                self.emit_body(&foreach.body, depth + 1, ctx, false);
                self.out.line(depth, "}");
            }
            Stmt::Try(try_stmt) => {
                self.out.line(depth, "try");
                self.out.line(depth, "{");
                for stmt in &try_stmt.body {
                    self.emit_stmt(stmt, depth + 1, ctx);
                }
                self.out.line(depth, "}");
                if let Some(catch) = &try_stmt.catch {
                    match &catch.ty {
                        TypeRef::Str => {
                            let tmp = self.fresh_tmp("ex");
                            self.out.line(
                                depth,
                                &format!("catch (Calor.Runtime.CalorException {tmp})"),
                            );
                            self.out.line(depth, "{");
                            self.out.line(
                                depth + 1,
                                &format!("string {} = {tmp}.Payload;", ident(&catch.var)),
                            );
                            for stmt in &catch.body {
                                self.emit_stmt(stmt, depth + 1, ctx);
                            }
                            self.out.line(depth, "}");
                        }
                        TypeRef::Named(name) => {
                            self.out.line(
                                depth,
                                &format!("catch ({} {})", ident(name), ident(&catch.var)),
                            );
                            self.out.line(depth, "{");
                            for stmt in &catch.body {
                                self.emit_stmt(stmt, depth + 1, ctx);
                            }
                            self.out.line(depth, "}");
                        }
                        other => {
                            self.report(
                                Diagnostic::error(ErrorCode::UnsupportedConstruct)
                                    .with_message(format!(
                                        "cannot catch a value of type `{other}`"
                                    ))
                                    .with_label(catch.span, "catch a named exception type or `str`"),
                            );
                        }
                    }
                }
                if let Some(finally) = &try_stmt.finally {
                    self.out.line(depth, "finally");
                    self.out.line(depth, "{");
                    for stmt in finally {
                        self.emit_stmt(stmt, depth + 1, ctx);
                    }
                    self.out.line(depth, "}");
                }
            }
            Stmt::Throw(throw) => {
                let value = self.emit_expr(&throw.value, ExprCtx::default());
                // A constructed exception throws directly; any other value
                // is wrapped so the host always throws a real exception.
                if matches!(throw.value, Expr::New(_, _, _)) {
                    self.out.line(depth, &format!("throw {value};"));
                } else {
                    self.out.line(
                        depth,
                        &format!(
                            "throw new Calor.Runtime.CalorException(({value}).ToString());"
                        ),
                    );
                }
            }
            Stmt::Break(_) => self.out.line(depth, "break;"),
            Stmt::Continue(_) => self.out.line(depth, "continue;"),
            Stmt::Print(print) => {
                let value = self.emit_expr(&print.value, ExprCtx::default());
                self.out
                    .line(depth, &format!("System.Console.WriteLine({value});"));
            }
            Stmt::CollectionOp(op_stmt) => {
                let target = ident(&op_stmt.target);
                let args: Vec<String> = op_stmt
                    .args
                    .iter()
                    .map(|arg| self.emit_expr(arg, ExprCtx::default()))
                    .collect();
                let line = match op_stmt.op {
                    CollectionOp::Add => format!("{target}.Add({});", args.join(", ")),
                    CollectionOp::Remove => format!("{target}.Remove({});", args.join(", ")),
                    CollectionOp::Insert => format!("{target}.Insert({});", args.join(", ")),
                    CollectionOp::RemoveAt => {
                        format!("{target}.RemoveAt({});", args.join(", "))
                    }
                    CollectionOp::Set => {
                        let index = args.first().cloned().unwrap_or_default();
                        let value = args.get(1).cloned().unwrap_or_default();
                        format!("{target}[{index}] = {value};")
                    }
                    CollectionOp::Clear => format!("{target}.Clear();"),
                };
                self.out.line(depth, &line);
            }
            Stmt::Match(match_stmt) => {
                let scrutinee = self.emit_expr(&match_stmt.scrutinee, ExprCtx::default());
                self.out.line(depth, &format!("switch ({scrutinee})"));
                self.out.line(depth, "{");
                for case in &match_stmt.cases {
                    let (pattern, extra_guards) =
                        self.emit_pattern(&case.pattern, ExprCtx::default());
                    let mut guards = extra_guards;
                    if let Some(guard) = &case.guard {
                        guards.push(self.emit_expr(guard, ExprCtx::default()));
                    }
                    let when = if guards.is_empty() {
                        String::new()
                    } else {
                        format!(" when {}", guards.join(" && "))
                    };
                    // Wildcards still go through `case _` so that guarded
                    // wildcards and declaration order keep first-match-wins.
                    self.out.line(depth + 1, &format!("case {pattern}{when}:"));
                    self.out.line(depth + 1, "{");
                    match &case.body {
                        Body::Arrow(value) => {
                            // Arrow cases yield the function's result.
                            self.emit_return(Some(value), depth + 2, ctx);
                        }
                        Body::Block(stmts) => {
                            for stmt in stmts {
                                self.emit_stmt(stmt, depth + 2, ctx);
                            }
                            self.out.line(depth + 2, "break;");
                        }
                    }
                    self.out.line(depth + 1, "}");
                }
                self.out.line(depth, "}");
            }
        }
    }

    /// A body in statement position. Arrow bodies in value position yield
    /// the function result; in loops they evaluate for effect, with a
    /// discard assignment keeping non-call expressions legal statements.
    fn emit_body(&mut self, body: &Body, depth: usize, ctx: &FnCtx<'_>, tail_value: bool) {
        match body {
            Body::Arrow(expr) => {
                if tail_value {
                    self.emit_return(Some(expr), depth, ctx);
                } else {
                    let text = self.emit_expr(expr, ExprCtx::default());
                    if expr.is_call_like() {
                        self.out.line(depth, &format!("{text};"));
                    } else {
                        self.out.line(depth, &format!("_ = {text};"));
                    }
                }
            }
            Body::Block(stmts) => {
                for stmt in stmts {
                    self.emit_stmt(stmt, depth, ctx);
                }
            }
        }
    }

    /// A return path. With ensures clauses active, the value is captured
    /// first, every exit guard runs against it, then it is returned.
    fn emit_return(&mut self, value: Option<&Expr>, depth: usize, ctx: &FnCtx<'_>) {
        if ctx.ensures.is_empty() {
            match value {
                Some(value) => {
                    let text = self.emit_expr(value, ExprCtx::default());
                    self.out.line(depth, &format!("return {text};"));
                }
                None => self.out.line(depth, "return;"),
            }
            return;
        }

        self.out.line(depth, "{");
        let result_name = match value {
            Some(value) => {
                let tmp = self.fresh_tmp("result");
                let text = self.emit_expr(value, ExprCtx::default());
                self.out.line(depth + 1, &format!("var {tmp} = {text};"));
                Some(tmp)
            }
            None => None,
        };
        for clause in ctx.ensures {
            let expr_ctx = ExprCtx {
                result_sub: result_name.as_deref(),
                unchecked: false,
            };
            self.emit_contract_guard(clause, depth + 1, expr_ctx);
        }
        match &result_name {
            Some(tmp) => self.out.line(depth + 1, &format!("return {tmp};")),
            None => self.out.line(depth + 1, "return;"),
        }
        self.out.line(depth, "}");
    }

    /// Translate a pattern; non-constant relational bounds come back as
    /// extra `when` guards on a synthesized binding.
    pub(crate) fn emit_pattern(
        &mut self,
        pattern: &Pattern,
        ctx: ExprCtx<'_>,
    ) -> (String, Vec<String>) {
        match pattern {
            Pattern::Wildcard(_) => ("_".to_string(), Vec::new()),
            Pattern::Literal(lit, _) => (cs_literal(lit), Vec::new()),
            Pattern::Variable(name, _) => (format!("var {}", ident(name)), Vec::new()),
            Pattern::Relational(op, bound, _) => {
                if let Expr::Literal(lit, _) = bound {
                    (format!("{} {}", op.symbol(), cs_literal(lit)), Vec::new())
                } else {
                    let tmp = self.fresh_tmp("v");
                    let bound = self.emit_expr(bound, ctx);
                    (
                        format!("var {tmp}"),
                        vec![format!("{tmp} {} {bound}", op.symbol())],
                    )
                }
            }
            Pattern::Some(inner, _) => {
                let (inner, guards) = self.emit_pattern(inner, ctx);
                (format!("{{ IsSome: true, Value: {inner} }}"), guards)
            }
            Pattern::None(_) => ("{ IsSome: false }".to_string(), Vec::new()),
            Pattern::Ok(inner, _) => {
                let (inner, guards) = self.emit_pattern(inner, ctx);
                (format!("{{ IsOk: true, Value: {inner} }}"), guards)
            }
            Pattern::Err(inner, _) => {
                let (inner, guards) = self.emit_pattern(inner, ctx);
                (format!("{{ IsOk: false, Error: {inner} }}"), guards)
            }
            Pattern::Property(type_name, fields, _) => {
                let mut guards = Vec::new();
                let fields = fields
                    .iter()
                    .map(|(field, pattern)| {
                        let (inner, inner_guards) = self.emit_pattern(pattern, ctx);
                        guards.extend(inner_guards);
                        format!("{}: {inner}", ident(field))
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (format!("{} {{ {fields} }}", ident(type_name)), guards)
            }
            Pattern::Positional(type_name, elements, _) => {
                let mut guards = Vec::new();
                let elements = elements
                    .iter()
                    .map(|element| {
                        let (inner, inner_guards) = self.emit_pattern(element, ctx);
                        guards.extend(inner_guards);
                        inner
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                (format!("{}({elements})", ident(type_name)), guards)
            }
            Pattern::List(elements, rest, _) => {
                let mut guards = Vec::new();
                let mut parts: Vec<String> = elements
                    .iter()
                    .map(|element| {
                        let (inner, inner_guards) = self.emit_pattern(element, ctx);
                        guards.extend(inner_guards);
                        inner
                    })
                    .collect();
                match rest {
                    Some(ListRest::Anonymous) => parts.push("..".to_string()),
                    Some(ListRest::Named(name)) => {
                        parts.push(format!(".. var {}", ident(name)));
                    }
                    None => {}
                }
                (format!("[{}]", parts.join(", ")), guards)
            }
        }
    }
}
