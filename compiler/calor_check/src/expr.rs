//! Bottom-up expression typing.

use calor_diagnostic::suggest::suggest_similar;
use calor_diagnostic::{Diagnostic, ErrorCode, Suggestion};
use calor_ir::{
    BinaryOp, BuilderOp, CharOp, Expr, Literal, MatchExpr, OptionOp, Span, StringOp, TypeRef,
    UnaryOp, VariantCtor,
};

use crate::relate::{numeric_join, unify};
use crate::scope::ScopeChain;
use crate::{Checker, ContractCtx};

impl Checker {
    /// Assign a type to an expression, reporting any problems found on the
    /// way up. Returns `obj` (the dynamic recovery type) after an error so
    /// one mistake does not cascade.
    pub(crate) fn type_of(&mut self, expr: &Expr, scope: &mut ScopeChain) -> TypeRef {
        match expr {
            Expr::Literal(lit, _) => literal_type(lit),
            Expr::Reference(name, span) => self.type_of_reference(name, *span, scope),
            Expr::Binary(op, lhs, rhs, span) => self.type_of_binary(*op, lhs, rhs, *span, scope),
            Expr::Unary(op, operand, span) => self.type_of_unary(*op, operand, *span, scope),
            Expr::Call(callee, args, span) => self.type_of_call(callee, args, *span, scope),
            Expr::New(type_name, args, span) => {
                for arg in args {
                    self.type_of(arg, scope);
                }
                if !self.type_names.iter().any(|n| n == type_name) {
                    let suggestion = self.nearest_type(type_name).map(str::to_string);
                    let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
                        .with_message(format!("cannot find type `{type_name}`"))
                        .with_label(*span, "unknown type");
                    if let Some(candidate) = suggestion {
                        diagnostic = diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
                    }
                    self.report(diagnostic);
                }
                TypeRef::Named(type_name.clone())
            }
            Expr::FieldAccess(receiver, _, _) => {
                self.type_of(receiver, scope);
                // Field types are not tracked across type boundaries.
                TypeRef::Obj
            }
            Expr::Conditional(cond, then, otherwise, span) => {
                let cond_ty = self.type_of(cond, scope);
                self.require_boolean(&cond_ty, cond.span(), "conditional condition");
                let then_ty = self.type_of(then, scope);
                let else_ty = self.type_of(otherwise, scope);
                self.unify_branches(&then_ty, &else_ty, *span)
            }
            Expr::Match(m) => self.type_of_match_expr(m, scope),
            Expr::Await(inner, span) => {
                let inner_ty = self.type_of(inner, scope);
                match inner_ty {
                    TypeRef::Task(result) => *result,
                    TypeRef::Obj => TypeRef::Obj,
                    other => {
                        self.report(
                            Diagnostic::error(ErrorCode::TypeMismatch)
                                .with_message(format!("`await` requires a task, found `{other}`"))
                                .with_label(*span, "not awaitable"),
                        );
                        TypeRef::Obj
                    }
                }
            }
            Expr::Lambda(params, body, _) => {
                scope.push();
                for (name, ty) in params {
                    let _ = scope.declare(name, ty.clone(), body.span());
                }
                self.type_of(body, scope);
                scope.pop();
                // Function values are opaque to the structural type layer.
                TypeRef::Obj
            }
            Expr::Cast(target, inner, span) => {
                let source = self.type_of(inner, scope);
                let castable = source.is_numeric() && target.is_numeric()
                    || matches!(source, TypeRef::Obj)
                    || matches!(target, TypeRef::Obj);
                if !castable {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!("cannot cast `{source}` to `{target}`"))
                            .with_label(*span, "invalid cast"),
                    );
                }
                target.clone()
            }
            Expr::Unchecked(inner, _) => self.type_of(inner, scope),
            Expr::StringOp(op, args, _, span) => self.type_of_string_op(*op, args, *span, scope),
            Expr::CharOp(op, args, span) => self.type_of_char_op(*op, args, *span, scope),
            Expr::BuilderOp(op, args, span) => self.type_of_builder_op(*op, args, *span, scope),
            Expr::Variant(ctor, payload, _) => {
                let payload_ty = payload
                    .as_deref()
                    .map(|p| self.type_of(p, scope))
                    .unwrap_or(TypeRef::Obj);
                match ctor {
                    VariantCtor::Some | VariantCtor::None => TypeRef::Opt(Box::new(payload_ty)),
                    VariantCtor::Ok => {
                        TypeRef::Res(Box::new(payload_ty), Box::new(TypeRef::Obj))
                    }
                    VariantCtor::Err => {
                        TypeRef::Res(Box::new(TypeRef::Obj), Box::new(payload_ty))
                    }
                }
            }
            Expr::OptionOp(op, args, span) => self.type_of_option_op(*op, args, *span, scope),
        }
    }

    fn type_of_reference(&mut self, name: &str, span: Span, scope: &ScopeChain) -> TypeRef {
        // Dotted references resolve their head; the rest is dynamic.
        let (head, dotted) = match name.split_once('.') {
            Some((head, _)) => (head, true),
            None => (name, false),
        };
        if let Some(ty) = scope.lookup(head) {
            return if dotted { TypeRef::Obj } else { ty.clone() };
        }
        if !dotted && self.functions.contains_key(head) {
            // A bare function name used as a value (delegate position).
            return TypeRef::Obj;
        }

        if name == "result" && self.contract_ctx == ContractCtx::Requires {
            self.report(
                Diagnostic::error(ErrorCode::ContractScopeViolation)
                    .with_message("`result` may only be referenced in an ensures clause")
                    .with_label(span, "not available in a precondition"),
            );
            return TypeRef::Obj;
        }

        let mut candidates: Vec<&str> = scope.visible_names();
        candidates.extend(self.functions.keys().map(String::as_str));
        let suggestion = suggest_similar(head, candidates.into_iter()).map(str::to_string);
        let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
            .with_message(format!("cannot find `{head}` in this scope"))
            .with_label(span, "not found");
        if let Some(candidate) = suggestion {
            diagnostic = diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
        }
        self.report(diagnostic);
        TypeRef::Obj
    }

    fn type_of_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        // Operands type left to right, same as they evaluate.
        let lhs_ty = self.type_of(lhs, scope);
        let rhs_ty = self.type_of(rhs, scope);

        if op.is_logical() {
            self.require_boolean(&lhs_ty, lhs.span(), "operand of a logical operator");
            self.require_boolean(&rhs_ty, rhs.span(), "operand of a logical operator");
            return TypeRef::Bool;
        }
        if op.is_comparison() {
            if unify(&lhs_ty, &rhs_ty).is_none() {
                self.report(
                    Diagnostic::error(ErrorCode::TypeMismatch)
                        .with_message(format!(
                            "cannot compare `{lhs_ty}` with `{rhs_ty}`"
                        ))
                        .with_label(span, "incomparable operands"),
                );
            }
            return TypeRef::Bool;
        }
        if op.is_arithmetic() {
            // String concatenation goes through `s.concat`, not `+`.
            self.require_numeric(&lhs_ty, lhs.span());
            self.require_numeric(&rhs_ty, rhs.span());
            return join_or_obj(&lhs_ty, &rhs_ty);
        }
        // Bitwise and shifts: integers only.
        self.require_integer(&lhs_ty, lhs.span());
        self.require_integer(&rhs_ty, rhs.span());
        join_or_obj(&lhs_ty, &rhs_ty)
    }

    fn type_of_unary(
        &mut self,
        op: UnaryOp,
        operand: &Expr,
        _span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        let operand_ty = self.type_of(operand, scope);
        match op {
            UnaryOp::Not => {
                self.require_boolean(&operand_ty, operand.span(), "operand of `!`");
                TypeRef::Bool
            }
            UnaryOp::Neg => {
                self.require_numeric(&operand_ty, operand.span());
                if matches!(operand_ty, TypeRef::Obj) {
                    TypeRef::Obj
                } else {
                    operand_ty
                }
            }
            UnaryOp::BitNot => {
                self.require_integer(&operand_ty, operand.span());
                operand_ty
            }
        }
    }

    fn type_of_call(
        &mut self,
        callee: &Expr,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        // Call arguments type left to right, same as they evaluate.
        let arg_types: Vec<(TypeRef, Span)> = args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();

        let Expr::Reference(name, ref_span) = callee else {
            self.type_of(callee, scope);
            return TypeRef::Obj;
        };

        // Dotted heads are method calls on values; those cross a type
        // boundary this layer does not model.
        if name.contains('.') {
            self.type_of_reference(name, *ref_span, scope);
            return TypeRef::Obj;
        }

        let Some(sig) = self.functions.get(name).cloned() else {
            // Locals holding delegates are callable too.
            if scope.lookup(name).is_some() {
                return TypeRef::Obj;
            }
            let mut candidates: Vec<&str> = self.functions.keys().map(String::as_str).collect();
            candidates.extend(scope.visible_names());
            let suggestion = suggest_similar(name, candidates.into_iter()).map(str::to_string);
            let mut diagnostic = Diagnostic::error(ErrorCode::UndefinedReference)
                .with_message(format!("cannot find function `{name}`"))
                .with_label(*ref_span, "not found");
            if let Some(candidate) = suggestion {
                diagnostic = diagnostic.with_suggestion(Suggestion::did_you_mean(candidate));
            }
            self.report(diagnostic);
            return TypeRef::Obj;
        };

        if arg_types.len() != sig.params.len() {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!(
                        "`{name}` takes {} argument{}, found {}",
                        sig.params.len(),
                        if sig.params.len() == 1 { "" } else { "s" },
                        arg_types.len()
                    ))
                    .with_label(span, "wrong argument count"),
            );
        }
        for ((actual, arg_span), expected) in arg_types.iter().zip(&sig.params) {
            self.require_compatible(actual, expected, *arg_span, "argument");
        }

        if sig.is_async {
            TypeRef::Task(Box::new(sig.ret))
        } else {
            sig.ret
        }
    }

    fn type_of_match_expr(&mut self, m: &MatchExpr, scope: &mut ScopeChain) -> TypeRef {
        let scrutinee_ty = self.type_of(&m.scrutinee, scope);
        let mut result: Option<TypeRef> = None;
        for case in &m.cases {
            scope.push();
            self.bind_pattern(&case.pattern, &scrutinee_ty, scope);
            if let Some(guard) = &case.guard {
                let guard_ty = self.type_of(guard, scope);
                self.require_boolean(&guard_ty, guard.span(), "match guard");
            }
            if let calor_ir::Body::Arrow(value) = &case.body {
                let case_ty = self.type_of(value, scope);
                result = Some(match result {
                    Some(prior) => self.unify_branches(&prior, &case_ty, value.span()),
                    None => case_ty,
                });
            }
            scope.pop();
        }
        result.unwrap_or(TypeRef::Obj)
    }

    fn type_of_string_op(
        &mut self,
        op: StringOp,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        let arg_types: Vec<(TypeRef, Span)> = args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();

        let (arity, result) = match op {
            StringOp::Concat => (arg_types.len().max(1), TypeRef::Str),
            StringOp::Len => (1, TypeRef::I32),
            StringOp::Contains | StringOp::StartsWith | StringOp::EndsWith | StringOp::Equals => {
                (2, TypeRef::Bool)
            }
            StringOp::IndexOf => (2, TypeRef::I32),
            StringOp::Substring => (3, TypeRef::Str),
            StringOp::Replace => (3, TypeRef::Str),
            StringOp::Upper | StringOp::Lower | StringOp::Trim => (1, TypeRef::Str),
        };
        if arg_types.len() != arity {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!(
                        "`{}` takes {arity} argument{}, found {}",
                        op.name(),
                        if arity == 1 { "" } else { "s" },
                        arg_types.len()
                    ))
                    .with_label(span, "wrong argument count"),
            );
        }
        // Substring's index arguments are numeric; every other operand is a
        // string.
        for (index, (actual, arg_span)) in arg_types.iter().enumerate() {
            let expected = if op == StringOp::Substring && index > 0 {
                TypeRef::I32
            } else {
                TypeRef::Str
            };
            self.require_compatible(actual, &expected, *arg_span, "argument");
        }
        result
    }

    fn type_of_char_op(
        &mut self,
        op: CharOp,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        let arg_types: Vec<(TypeRef, Span)> = args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();
        if arg_types.len() != 1 {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!("`{}` takes 1 argument", op.name()))
                    .with_label(span, "wrong argument count"),
            );
        }
        for (actual, arg_span) in &arg_types {
            self.require_compatible(actual, &TypeRef::Char, *arg_span, "argument");
        }
        match op {
            CharOp::IsDigit | CharOp::IsLetter | CharOp::IsSpace => TypeRef::Bool,
            CharOp::Upper | CharOp::Lower => TypeRef::Char,
        }
    }

    fn type_of_builder_op(
        &mut self,
        op: BuilderOp,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        let builder = TypeRef::Named("sb".to_string());
        let arg_types: Vec<(TypeRef, Span)> = args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();

        let arity = match op {
            BuilderOp::New => 0,
            BuilderOp::Append | BuilderOp::Clear | BuilderOp::Str => {
                if op == BuilderOp::Append {
                    2
                } else {
                    1
                }
            }
            BuilderOp::Insert => 3,
        };
        if arg_types.len() != arity {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!(
                        "`{}` takes {arity} argument{}, found {}",
                        op.name(),
                        if arity == 1 { "" } else { "s" },
                        arg_types.len()
                    ))
                    .with_label(span, "wrong argument count"),
            );
        }
        if let Some((first_ty, first_span)) = arg_types.first() {
            if op != BuilderOp::New {
                self.require_compatible(first_ty, &builder, *first_span, "builder argument");
            }
        }
        match op {
            BuilderOp::New => builder,
            BuilderOp::Append | BuilderOp::Insert | BuilderOp::Clear => TypeRef::Unit,
            BuilderOp::Str => TypeRef::Str,
        }
    }

    fn type_of_option_op(
        &mut self,
        op: OptionOp,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeChain,
    ) -> TypeRef {
        let arg_types: Vec<(TypeRef, Span)> = args
            .iter()
            .map(|arg| (self.type_of(arg, scope), arg.span()))
            .collect();
        let arity = if op == OptionOp::UnwrapOr { 2 } else { 1 };
        if arg_types.len() != arity {
            self.report(
                Diagnostic::error(ErrorCode::ArgumentCountMismatch)
                    .with_message(format!(
                        "`{}` takes {arity} argument{}, found {}",
                        op.name(),
                        if arity == 1 { "" } else { "s" },
                        arg_types.len()
                    ))
                    .with_label(span, "wrong argument count"),
            );
            return TypeRef::Obj;
        }

        let (subject, subject_span) = &arg_types[0];
        match op {
            OptionOp::Unwrap => match subject {
                TypeRef::Opt(inner) => (**inner).clone(),
                TypeRef::Res(ok, _) => (**ok).clone(),
                TypeRef::Obj => TypeRef::Obj,
                other => {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "`unwrap` requires an option or result, found `{other}`"
                            ))
                            .with_label(*subject_span, "nothing to unwrap"),
                    );
                    TypeRef::Obj
                }
            },
            OptionOp::UnwrapOr => match subject {
                TypeRef::Opt(inner) => {
                    let (default_ty, default_span) = &arg_types[1];
                    self.require_compatible(default_ty, inner, *default_span, "default value");
                    (**inner).clone()
                }
                TypeRef::Obj => TypeRef::Obj,
                other => {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "`unwrap-or` requires an option, found `{other}`"
                            ))
                            .with_label(*subject_span, "nothing to unwrap"),
                    );
                    TypeRef::Obj
                }
            },
            OptionOp::IsSome | OptionOp::IsNone => {
                if !matches!(subject, TypeRef::Opt(_) | TypeRef::Obj) {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "`{}` requires an option, found `{subject}`",
                                op.name()
                            ))
                            .with_label(*subject_span, "not an option"),
                    );
                }
                TypeRef::Bool
            }
            OptionOp::IsOk | OptionOp::IsErr => {
                if !matches!(subject, TypeRef::Res(_, _) | TypeRef::Obj) {
                    self.report(
                        Diagnostic::error(ErrorCode::TypeMismatch)
                            .with_message(format!(
                                "`{}` requires a result, found `{subject}`",
                                op.name()
                            ))
                            .with_label(*subject_span, "not a result"),
                    );
                }
                TypeRef::Bool
            }
        }
    }

    pub(crate) fn unify_branches(
        &mut self,
        a: &TypeRef,
        b: &TypeRef,
        span: Span,
    ) -> TypeRef {
        match unify(a, b) {
            Some(ty) => ty,
            None => {
                self.report(
                    Diagnostic::error(ErrorCode::TypeMismatch)
                        .with_message(format!("branches have incompatible types `{a}` and `{b}`"))
                        .with_label(span, "branch types must agree"),
                );
                TypeRef::Obj
            }
        }
    }

    pub(crate) fn require_numeric(&mut self, actual: &TypeRef, span: Span) {
        if !actual.is_numeric() && !matches!(actual, TypeRef::Obj) {
            self.report(
                Diagnostic::error(ErrorCode::TypeMismatch)
                    .with_message(format!("expected a numeric type, found `{actual}`"))
                    .with_label(span, "not numeric"),
            );
        }
    }

    pub(crate) fn require_integer(&mut self, actual: &TypeRef, span: Span) {
        if !actual.is_integer() && !matches!(actual, TypeRef::Obj) {
            self.report(
                Diagnostic::error(ErrorCode::TypeMismatch)
                    .with_message(format!("expected an integer type, found `{actual}`"))
                    .with_label(span, "not an integer"),
            );
        }
    }
}

fn literal_type(lit: &Literal) -> TypeRef {
    match lit {
        Literal::Int(_) => TypeRef::I32,
        Literal::Float(_) => TypeRef::F64,
        Literal::Bool(_) => TypeRef::Bool,
        Literal::Str(_) => TypeRef::Str,
        Literal::Char(_) => TypeRef::Char,
        Literal::Unit => TypeRef::Unit,
    }
}

fn join_or_obj(a: &TypeRef, b: &TypeRef) -> TypeRef {
    if matches!(a, TypeRef::Obj) || matches!(b, TypeRef::Obj) {
        TypeRef::Obj
    } else {
        numeric_join(a, b)
    }
}
