//! Expression emission.
//!
//! Every form emits its operands in source order, so evaluation is
//! left-to-right by construction. Integer arithmetic is wrapped in
//! `checked(...)` unless inside an `(unchecked ...)` region.

use calor_ir::{
    Body, BuilderOp, CharOp, CompareMode, Expr, Literal, MatchExpr, OptionOp, StringOp, UnaryOp,
    VariantCtor,
};

use crate::types::{ident, value_type};
use crate::{cs_string, CSharpEmitter};

/// Per-expression emission context, threaded explicitly.
#[derive(Copy, Clone, Default)]
pub(crate) struct ExprCtx<'a> {
    /// Active substitution for the `result` contract binding.
    pub(crate) result_sub: Option<&'a str>,
    /// Inside an `(unchecked ...)` region.
    pub(crate) unchecked: bool,
}

impl CSharpEmitter {
    pub(crate) fn emit_expr(&mut self, expr: &Expr, ctx: ExprCtx<'_>) -> String {
        match expr {
            Expr::Literal(lit, _) => cs_literal(lit),
            Expr::Reference(name, _) => {
                if name == "result" {
                    if let Some(substitute) = ctx.result_sub {
                        return substitute.to_string();
                    }
                }
                ident(name)
            }
            Expr::Binary(op, lhs, rhs, _) => {
                let lhs = self.emit_expr(lhs, ctx);
                let rhs = self.emit_expr(rhs, ctx);
                let text = format!("{lhs} {} {rhs}", op.symbol());
                if op.is_arithmetic() {
                    if ctx.unchecked {
                        format!("unchecked({text})")
                    } else {
                        format!("checked({text})")
                    }
                } else {
                    format!("({text})")
                }
            }
            Expr::Unary(op, operand, _) => {
                let operand = self.emit_expr(operand, ctx);
                match op {
                    UnaryOp::Not => format!("!({operand})"),
                    UnaryOp::Neg => {
                        if ctx.unchecked {
                            format!("unchecked(-({operand}))")
                        } else {
                            format!("checked(-({operand}))")
                        }
                    }
                    UnaryOp::BitNot => format!("~({operand})"),
                }
            }
            Expr::Call(callee, args, _) => {
                let callee = self.emit_expr(callee, ctx);
                let args = self.emit_args(args, ctx);
                format!("{callee}({args})")
            }
            Expr::New(type_name, args, _) => {
                let args = self.emit_args(args, ctx);
                format!("new {}({args})", ident(type_name))
            }
            Expr::FieldAccess(receiver, field, _) => {
                let receiver = self.receiver_text(receiver, ctx);
                format!("{receiver}.{}", ident(field))
            }
            Expr::Conditional(cond, then, otherwise, _) => {
                let cond = self.emit_expr(cond, ctx);
                let then = self.emit_expr(then, ctx);
                let otherwise = self.emit_expr(otherwise, ctx);
                format!("({cond} ? {then} : {otherwise})")
            }
            Expr::Match(m) => self.emit_switch_expr(m, ctx),
            Expr::Await(inner, _) => {
                let inner = self.emit_expr(inner, ctx);
                format!("(await {inner})")
            }
            Expr::Lambda(params, body, _) => {
                let params = params
                    .iter()
                    .map(|(name, ty)| format!("{} {}", value_type(ty), ident(name)))
                    .collect::<Vec<_>>()
                    .join(", ");
                let body = self.emit_expr(body, ctx);
                format!("(({params}) => {body})")
            }
            Expr::Cast(ty, inner, _) => {
                let inner = self.emit_expr(inner, ctx);
                format!("(({})({inner}))", value_type(ty))
            }
            Expr::Unchecked(inner, _) => {
                let inner_ctx = ExprCtx {
                    unchecked: true,
                    ..ctx
                };
                self.emit_expr(inner, inner_ctx)
            }
            Expr::StringOp(op, args, mode, _) => self.emit_string_op(*op, args, *mode, ctx),
            Expr::CharOp(op, args, _) => {
                let arg = self.first_arg(args, ctx);
                let function = match op {
                    CharOp::IsDigit => "char.IsDigit",
                    CharOp::IsLetter => "char.IsLetter",
                    CharOp::IsSpace => "char.IsWhiteSpace",
                    CharOp::Upper => "char.ToUpper",
                    CharOp::Lower => "char.ToLower",
                };
                format!("{function}({arg})")
            }
            Expr::BuilderOp(op, args, _) => self.emit_builder_op(*op, args, ctx),
            Expr::Variant(ctor, payload, _) => {
                let payload_text = payload
                    .as_deref()
                    .map(|p| self.emit_expr(p, ctx));
                match (ctor, payload_text) {
                    (VariantCtor::Some, Some(p)) => format!("Calor.Runtime.Option.Some({p})"),
                    (VariantCtor::Some, None) => {
                        "Calor.Runtime.Option.Some(default)".to_string()
                    }
                    (VariantCtor::None, _) => "Calor.Runtime.Option.None".to_string(),
                    (VariantCtor::Ok, Some(p)) => format!("Calor.Runtime.Result.Ok({p})"),
                    (VariantCtor::Ok, None) => "Calor.Runtime.Result.Ok(default)".to_string(),
                    (VariantCtor::Err, Some(p)) => format!("Calor.Runtime.Result.Err({p})"),
                    (VariantCtor::Err, None) => {
                        "Calor.Runtime.Result.Err(default)".to_string()
                    }
                }
            }
            Expr::OptionOp(op, args, _) => {
                let subject = self.receiver_from_args(args, ctx);
                match op {
                    OptionOp::Unwrap => format!("{subject}.Unwrap()"),
                    OptionOp::UnwrapOr => {
                        let fallback = args
                            .get(1)
                            .map(|arg| self.emit_expr(arg, ctx))
                            .unwrap_or_else(|| "default".to_string());
                        format!("{subject}.UnwrapOr({fallback})")
                    }
                    OptionOp::IsSome => format!("{subject}.IsSome"),
                    OptionOp::IsNone => format!("{subject}.IsNone"),
                    OptionOp::IsOk => format!("{subject}.IsOk"),
                    OptionOp::IsErr => format!("{subject}.IsErr"),
                }
            }
        }
    }

    /// A single-line switch expression; case declaration order is the
    /// tie-break and the wildcard is terminal.
    fn emit_switch_expr(&mut self, m: &MatchExpr, ctx: ExprCtx<'_>) -> String {
        let scrutinee = self.emit_expr(&m.scrutinee, ctx);
        let mut arms = Vec::new();
        for case in &m.cases {
            let (pattern, extra_guards) = self.emit_pattern(&case.pattern, ctx);
            let mut guards = extra_guards;
            if let Some(guard) = &case.guard {
                guards.push(self.emit_expr(guard, ctx));
            }
            let when = if guards.is_empty() {
                String::new()
            } else {
                format!(" when {}", guards.join(" && "))
            };
            let value = match &case.body {
                Body::Arrow(value) => self.emit_expr(value, ctx),
                // Block cases are rejected by the parser; `default` keeps
                // recovery output well-formed.
                Body::Block(_) => "default".to_string(),
            };
            arms.push(format!("{pattern}{when} => {value}"));
        }
        format!("({scrutinee} switch {{ {} }})", arms.join(", "))
    }

    fn emit_string_op(
        &mut self,
        op: StringOp,
        args: &[Expr],
        mode: Option<CompareMode>,
        ctx: ExprCtx<'_>,
    ) -> String {
        let comparison = mode.map(comparison_constant);
        match op {
            StringOp::Concat => {
                format!("string.Concat({})", self.emit_args(args, ctx))
            }
            StringOp::Len => format!("{}.Length", self.receiver_from_args(args, ctx)),
            StringOp::Contains | StringOp::StartsWith | StringOp::EndsWith => {
                let receiver = self.receiver_from_args(args, ctx);
                let needle = args
                    .get(1)
                    .map(|arg| self.emit_expr(arg, ctx))
                    .unwrap_or_else(|| "\"\"".to_string());
                let method = match op {
                    StringOp::Contains => "Contains",
                    StringOp::StartsWith => "StartsWith",
                    _ => "EndsWith",
                };
                match comparison {
                    Some(cmp) => format!("{receiver}.{method}({needle}, {cmp})"),
                    None => format!("{receiver}.{method}({needle})"),
                }
            }
            StringOp::IndexOf => {
                let receiver = self.receiver_from_args(args, ctx);
                let needle = args
                    .get(1)
                    .map(|arg| self.emit_expr(arg, ctx))
                    .unwrap_or_else(|| "\"\"".to_string());
                match comparison {
                    Some(cmp) => format!("{receiver}.IndexOf({needle}, {cmp})"),
                    None => format!("{receiver}.IndexOf({needle})"),
                }
            }
            StringOp::Equals => {
                let args_text = self.emit_args(args, ctx);
                match comparison {
                    Some(cmp) => format!("string.Equals({args_text}, {cmp})"),
                    None => format!("string.Equals({args_text})"),
                }
            }
            StringOp::Substring => {
                let receiver = self.receiver_from_args(args, ctx);
                let rest = self.emit_args(&args[1.min(args.len())..], ctx);
                format!("{receiver}.Substring({rest})")
            }
            StringOp::Replace => {
                let receiver = self.receiver_from_args(args, ctx);
                let rest = self.emit_args(&args[1.min(args.len())..], ctx);
                format!("{receiver}.Replace({rest})")
            }
            StringOp::Upper => format!("{}.ToUpper()", self.receiver_from_args(args, ctx)),
            StringOp::Lower => format!("{}.ToLower()", self.receiver_from_args(args, ctx)),
            StringOp::Trim => format!("{}.Trim()", self.receiver_from_args(args, ctx)),
        }
    }

    fn emit_builder_op(&mut self, op: BuilderOp, args: &[Expr], ctx: ExprCtx<'_>) -> String {
        match op {
            BuilderOp::New => "new System.Text.StringBuilder()".to_string(),
            BuilderOp::Append => {
                let receiver = self.receiver_from_args(args, ctx);
                let rest = self.emit_args(&args[1.min(args.len())..], ctx);
                format!("{receiver}.Append({rest})")
            }
            BuilderOp::Insert => {
                let receiver = self.receiver_from_args(args, ctx);
                let rest = self.emit_args(&args[1.min(args.len())..], ctx);
                format!("{receiver}.Insert({rest})")
            }
            BuilderOp::Clear => format!("{}.Clear()", self.receiver_from_args(args, ctx)),
            BuilderOp::Str => format!("{}.ToString()", self.receiver_from_args(args, ctx)),
        }
    }

    pub(crate) fn emit_args(&mut self, args: &[Expr], ctx: ExprCtx<'_>) -> String {
        args.iter()
            .map(|arg| self.emit_expr(arg, ctx))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn first_arg(&mut self, args: &[Expr], ctx: ExprCtx<'_>) -> String {
        args.first()
            .map(|arg| self.emit_expr(arg, ctx))
            .unwrap_or_else(|| "default".to_string())
    }

    /// The first argument as a method receiver, parenthesized when complex.
    fn receiver_from_args(&mut self, args: &[Expr], ctx: ExprCtx<'_>) -> String {
        match args.first() {
            Some(receiver) => self.receiver_text(receiver, ctx),
            None => "default".to_string(),
        }
    }

    pub(crate) fn receiver_text(&mut self, receiver: &Expr, ctx: ExprCtx<'_>) -> String {
        let text = self.emit_expr(receiver, ctx);
        match receiver {
            Expr::Reference(_, _) | Expr::Literal(_, _) | Expr::FieldAccess(_, _, _) => text,
            _ if text.starts_with('(') => text,
            _ => format!("({text})"),
        }
    }
}

/// C# literal text.
pub(crate) fn cs_literal(lit: &Literal) -> String {
    match lit {
        Literal::Int(v) => v.to_string(),
        Literal::Float(v) => {
            let mut s = format!("{v}");
            if !s.contains('.') && !s.contains('e') {
                s.push_str(".0");
            }
            s
        }
        Literal::Bool(b) => b.to_string(),
        Literal::Str(s) => cs_string(s),
        Literal::Char(c) => match c {
            '\n' => "'\\n'".to_string(),
            '\t' => "'\\t'".to_string(),
            '\r' => "'\\r'".to_string(),
            '\0' => "'\\0'".to_string(),
            '\\' => "'\\\\'".to_string(),
            '\'' => "'\\''".to_string(),
            c => format!("'{c}'"),
        },
        Literal::Unit => "Calor.Runtime.Unit.Value".to_string(),
    }
}

/// The native comparison argument for a declared mode.
pub(crate) fn comparison_constant(mode: CompareMode) -> &'static str {
    match mode {
        CompareMode::Ordinal => "System.StringComparison.Ordinal",
        CompareMode::IgnoreCase => "System.StringComparison.OrdinalIgnoreCase",
        CompareMode::Invariant => "System.StringComparison.InvariantCulture",
        CompareMode::InvariantIgnoreCase => "System.StringComparison.InvariantCultureIgnoreCase",
    }
}
