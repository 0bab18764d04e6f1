//! Statement checking.

use calor_diagnostic::suggest::suggest_similar;
use calor_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use calor_ir::{Body, CollectionOp, ListRest, Literal, Pattern, Span, Stmt, TypeRef};

use crate::relate::numeric_join;
use crate::scope::ScopeChain;
use crate::Checker;

impl Checker {
    pub(crate) fn check_stmts(&mut self, stmts: &[Stmt], scope: &mut ScopeChain, ret: &TypeRef) {
        for stmt in stmts {
            self.check_stmt(stmt, scope, ret);
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, scope: &mut ScopeChain, ret: &TypeRef) {
        match stmt {
            Stmt::Bind(bind) => {
                let actual = self.type_of(&bind.value, scope);
                self.require_compatible(&actual, &bind.ty, bind.value.span(), "value");
                if let Err(prior) = scope.declare(&bind.name, bind.ty.clone(), bind.span) {
                    self.report(
                        Diagnostic::error(ErrorCode::Redeclaration)
                            .with_message(format!(
                                "`{}` is already bound in this scope",
                                bind.name
                            ))
                            .with_label(bind.span, "second binding")
                            .with_secondary_label(prior, "first bound here"),
                    );
                }
            }
            Stmt::Assign(assign) => {
                let value_ty = self.type_of(&assign.value, scope);
                let head = assign
                    .target
                    .split_once('.')
                    .map_or(assign.target.as_str(), |(head, _)| head);
                match scope.lookup(head).cloned() {
                    Some(target_ty) => {
                        let expected = if assign.target.contains('.') {
                            // Deep field paths are dynamic.
                            TypeRef::Obj
                        } else {
                            target_ty
                        };
                        self.require_compatible(
                            &value_ty,
                            &expected,
                            assign.value.span(),
                            "value",
                        );
                    }
                    None => {
                        let suggestion =
                            suggest_similar(head, scope.visible_names().into_iter())
                                .map(str::to_string);
                        let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
                            .with_message(format!("cannot assign to unknown `{head}`"))
                            .with_label(assign.span, "not found");
                        if let Some(candidate) = suggestion {
                            diagnostic =
                                diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
                        }
                        self.report(diagnostic);
                    }
                }
            }
            Stmt::Return(ret_stmt) => match &ret_stmt.value {
                Some(value) => {
                    let actual = self.type_of(value, scope);
                    self.require_compatible(&actual, ret, value.span(), "return value");
                }
                None => {
                    if !matches!(ret, TypeRef::Unit | TypeRef::Obj) {
                        self.report(
                            Diagnostic::error(ErrorCode::TypeMismatch)
                                .with_message(format!(
                                    "return without a value in a function returning `{ret}`"
                                ))
                                .with_label(ret_stmt.span, "value required"),
                        );
                    }
                }
            },
            Stmt::If(if_stmt) => {
                let cond_ty = self.type_of(&if_stmt.cond, scope);
                self.require_boolean(&cond_ty, if_stmt.cond.span(), "if condition");
                self.check_body(&if_stmt.then_body, scope, ret, true);
                if let Some(else_body) = &if_stmt.else_body {
                    self.check_body(else_body, scope, ret, true);
                }
            }
            Stmt::For(for_stmt) => {
                let from_ty = self.type_of(&for_stmt.from, scope);
                let to_ty = self.type_of(&for_stmt.to, scope);
                self.require_loop_bound(&from_ty, for_stmt.from.span());
                self.require_loop_bound(&to_ty, for_stmt.to.span());
                let mut var_ty = numeric_join(&from_ty, &to_ty);
                if let Some(step) = &for_stmt.step {
                    let step_ty = self.type_of(step, scope);
                    self.require_loop_bound(&step_ty, step.span());
                    var_ty = numeric_join(&var_ty, &step_ty);
                }
                if !var_ty.is_numeric() {
                    var_ty = TypeRef::I32;
                }
                scope.push();
                let _ = scope.declare(&for_stmt.var, var_ty, for_stmt.span);
                self.check_body(&for_stmt.body, scope, ret, false);
                scope.pop();
            }
            Stmt::While(while_stmt) => {
                let cond_ty = self.type_of(&while_stmt.cond, scope);
                self.require_boolean(&cond_ty, while_stmt.cond.span(), "while condition");
                self.check_body(&while_stmt.body, scope, ret, false);
            }
            Stmt::DoWhile(do_stmt) => {
                self.check_body(&do_stmt.body, scope, ret, false);
                let cond_ty = self.type_of(&do_stmt.cond, scope);
                self.require_boolean(&cond_ty, do_stmt.cond.span(), "do-while condition");
            }
            Stmt::Foreach(foreach) => {
                let seq_ty = self.type_of(&foreach.seq, scope);
                let element = match &seq_ty {
                    TypeRef::List(inner) => (**inner).clone(),
                    TypeRef::Obj => TypeRef::Obj,
                    other => {
                        self.report(
                            Diagnostic::error(ErrorCode::TypeMismatch)
                                .with_message(format!(
                                    "foreach requires a list, found `{other}`"
                                ))
                                .with_label(foreach.seq.span(), "not iterable"),
                        );
                        TypeRef::Obj
                    }
                };
                scope.push();
                let _ = scope.declare(&foreach.var, element, foreach.span);
                self.check_body(&foreach.body, scope, ret, false);
                scope.pop();
            }
            Stmt::Try(try_stmt) => {
                scope.push();
                self.check_stmts(&try_stmt.body, scope, ret);
                scope.pop();
                if let Some(catch) = &try_stmt.catch {
                    scope.push();
                    let _ = scope.declare(&catch.var, catch.ty.clone(), catch.span);
                    self.check_stmts(&catch.body, scope, ret);
                    scope.pop();
                }
                if let Some(finally) = &try_stmt.finally {
                    scope.push();
                    self.check_stmts(finally, scope, ret);
                    scope.pop();
                }
            }
            Stmt::Throw(throw) => {
                self.type_of(&throw.value, scope);
            }
            Stmt::Break(_) | Stmt::Continue(_) => {}
            Stmt::Print(print) => {
                self.type_of(&print.value, scope);
            }
            Stmt::CollectionOp(op_stmt) => self.check_collection_op(op_stmt, scope),
            Stmt::Match(match_stmt) => {
                let scrutinee_ty = self.type_of(&match_stmt.scrutinee, scope);
                for case in &match_stmt.cases {
                    scope.push();
                    self.bind_pattern(&case.pattern, &scrutinee_ty, scope);
                    if let Some(guard) = &case.guard {
                        let guard_ty = self.type_of(guard, scope);
                        self.require_boolean(&guard_ty, guard.span(), "match guard");
                    }
                    self.check_body(&case.body, scope, ret, true);
                    scope.pop();
                }
            }
        }
    }

    /// Check a body in a child scope. An arrow body in value position
    /// (`tail_value`) is the implicit return value; in a loop it is
    /// evaluated for effect only.
    fn check_body(&mut self, body: &Body, scope: &mut ScopeChain, ret: &TypeRef, tail_value: bool) {
        match body {
            Body::Arrow(expr) => {
                let actual = self.type_of(expr, scope);
                if tail_value {
                    self.require_compatible(&actual, ret, expr.span(), "arrow body");
                }
            }
            Body::Block(stmts) => {
                scope.push();
                self.check_stmts(stmts, scope, ret);
                scope.pop();
            }
        }
    }

    fn require_loop_bound(&mut self, actual: &TypeRef, span: Span) {
        if !actual.is_numeric() && !matches!(actual, TypeRef::Obj) {
            self.report(
                Diagnostic::error(ErrorCode::TypeMismatch)
                    .with_message(format!("for-loop bounds must be numeric, found `{actual}`"))
                    .with_label(span, "not numeric"),
            );
        }
    }

    fn check_collection_op(
        &mut self,
        op_stmt: &calor_ir::CollectionOpStmt,
        scope: &mut ScopeChain,
    ) {
        let arg_types: Vec<(TypeRef, Span)> = op_stmt
            .args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();

        let arity = match op_stmt.op {
            CollectionOp::Add | CollectionOp::Remove | CollectionOp::RemoveAt => 1,
            CollectionOp::Insert | CollectionOp::Set => 2,
            CollectionOp::Clear => 0,
        };
        if arg_types.len() != arity {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!(
                        "collection `{}` takes {arity} argument{}, found {}",
                        op_stmt.op.name(),
                        if arity == 1 { "" } else { "s" },
                        arg_types.len()
                    ))
                    .with_label(op_stmt.span, "wrong argument count"),
            );
            return;
        }

        let Some(target_ty) = scope.lookup(&op_stmt.target).cloned() else {
            let suggestion = suggest_similar(&op_stmt.target, scope.visible_names().into_iter())
                .map(str::to_string);
            let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
                .with_message(format!("cannot find collection `{}`", op_stmt.target))
                .with_label(op_stmt.span, "not found");
            if let Some(candidate) = suggestion {
                diagnostic = diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
            }
            self.report(diagnostic);
            return;
        };

        match &target_ty {
            TypeRef::List(element) => {
                // Element arguments check against the element type; index
                // arguments against i32.
                match op_stmt.op {
                    CollectionOp::Add | CollectionOp::Remove => {
                        self.require_compatible(
                            &arg_types[0].0,
                            element,
                            arg_types[0].1,
                            "element",
                        );
                    }
                    CollectionOp::RemoveAt => {
                        self.require_compatible(
                            &arg_types[0].0,
                            &TypeRef::I32,
                            arg_types[0].1,
                            "index",
                        );
                    }
                    CollectionOp::Insert | CollectionOp::Set => {
                        self.require_compatible(
                            &arg_types[0].0,
                            &TypeRef::I32,
                            arg_types[0].1,
                            "index",
                        );
                        self.require_compatible(
                            &arg_types[1].0,
                            element,
                            arg_types[1].1,
                            "element",
                        );
                    }
                    CollectionOp::Clear => {}
                }
            }
            TypeRef::Map(key, value) => match op_stmt.op {
                CollectionOp::Set | CollectionOp::Insert => {
                    self.require_compatible(&arg_types[0].0, key, arg_types[0].1, "key");
                    self.require_compatible(&arg_types[1].0, value, arg_types[1].1, "value");
                }
                CollectionOp::Remove => {
                    self.require_compatible(&arg_types[0].0, key, arg_types[0].1, "key");
                }
                CollectionOp::Clear => {}
                CollectionOp::Add | CollectionOp::RemoveAt => {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "`{}` is not a map operation",
                                op_stmt.op.name()
                            ))
                            .with_label(op_stmt.span, "use `insert`, `set`, `remove`, or `clear`"),
                    );
                }
            },
            TypeRef::Obj => {}
            other => {
                self.report(
                    Diagnostic::error(ErrorCode::TypeMismatch)
                        .with_message(format!(
                            "collection operations require a list or map, found `{other}`"
                        ))
                        .with_label(op_stmt.span, "not a collection"),
                );
            }
        }
    }

    /// Declare the names a pattern binds, typed from the scrutinee.
    pub(crate) fn bind_pattern(
        &mut self,
        pattern: &Pattern,
        scrutinee: &TypeRef,
        scope: &mut ScopeChain,
    ) {
        match pattern {
            Pattern::Wildcard(_) => {}
            Pattern::Literal(lit, span) => {
                let lit_ty = match lit {
                    Literal::Int(_) => TypeRef::I32,
                    Literal::Float(_) => TypeRef::F64,
                    Literal::Bool(_) => TypeRef::Bool,
                    Literal::Str(_) => TypeRef::Str,
                    Literal::Char(_) => TypeRef::Char,
                    Literal::Unit => TypeRef::Unit,
                };
                if crate::relate::unify(&lit_ty, scrutinee).is_none() {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "pattern of type `{lit_ty}` cannot match `{scrutinee}`"
                            ))
                            .with_label(*span, "incompatible pattern"),
                    );
                }
            }
            Pattern::Variable(name, span) => {
                let _ = scope.declare(name, scrutinee.clone(), *span);
            }
            Pattern::Relational(_, bound, span) => {
                if !scrutinee.is_numeric() && !matches!(scrutinee, TypeRef::Obj) {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "relational patterns require a numeric scrutinee, found `{scrutinee}`"
                            ))
                            .with_label(*span, "not numeric"),
                    );
                }
                let bound_ty = self.type_of(bound, scope);
                self.require_numeric(&bound_ty, bound.span());
            }
            Pattern::Some(inner, span) => match scrutinee {
                TypeRef::Opt(element) => self.bind_pattern(inner, element, scope),
                TypeRef::Obj => self.bind_pattern(inner, &TypeRef::Obj, scope),
                other => {
                    self.pattern_shape_mismatch("some", other, *span);
                    self.bind_pattern(inner, &TypeRef::Obj, scope);
                }
            },
            Pattern::None(span) => {
                if !matches!(scrutinee, TypeRef::Opt(_) | TypeRef::Obj) {
                    self.pattern_shape_mismatch("none", scrutinee, *span);
                }
            }
            Pattern::Ok(inner, span) => match scrutinee {
                TypeRef::Res(ok, _) => self.bind_pattern(inner, ok, scope),
                TypeRef::Obj => self.bind_pattern(inner, &TypeRef::Obj, scope),
                other => {
                    self.pattern_shape_mismatch("ok", other, *span);
                    self.bind_pattern(inner, &TypeRef::Obj, scope);
                }
            },
            Pattern::Err(inner, span) => match scrutinee {
                TypeRef::Res(_, err) => self.bind_pattern(inner, err, scope),
                TypeRef::Obj => self.bind_pattern(inner, &TypeRef::Obj, scope),
                other => {
                    self.pattern_shape_mismatch("err", other, *span);
                    self.bind_pattern(inner, &TypeRef::Obj, scope);
                }
            },
            Pattern::Property(_, fields, _) => {
                // Field types cross a type boundary this layer does not
                // model; captures are dynamic.
                for (_, field_pattern) in fields {
                    self.bind_pattern(field_pattern, &TypeRef::Obj, scope);
                }
            }
            Pattern::Positional(_, elements, _) => {
                for element in elements {
                    self.bind_pattern(element, &TypeRef::Obj, scope);
                }
            }
            Pattern::List(elements, rest, span) => {
                let element_ty = match scrutinee {
                    TypeRef::List(inner) => (**inner).clone(),
                    TypeRef::Obj => TypeRef::Obj,
                    other => {
                        self.pattern_shape_mismatch("list", other, *span);
                        TypeRef::Obj
                    }
                };
                for element in elements {
                    self.bind_pattern(element, &element_ty, scope);
                }
                if let Some(ListRest::Named(name)) = rest {
                    let _ = scope.declare(
                        name,
                        TypeRef::List(Box::new(element_ty)),
                        *span,
                    );
                }
            }
        }
    }

    fn pattern_shape_mismatch(&mut self, shape: &str, scrutinee: &TypeRef, span: Span) {
        self.report(
            Diagnostic::error(ErrorCode::TypeMismatch)
                .with_message(format!(
                    "`{shape}` pattern cannot match a scrutinee of type `{scrutinee}`"
                ))
                .with_label(span, "pattern shape does not fit"),
        );
    }
}
