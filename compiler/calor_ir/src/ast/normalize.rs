//! Span normalization for structural comparison.
//!
//! Round-trip tooling compares trees from different parses of equivalent
//! text; spans differ whenever formatting does, so comparisons run on trees
//! with every span reset to `Span::DUMMY`. The walk is one exhaustive match
//! per node family.

use crate::Span;

use super::decl::{
    ClassDecl, Constructor, ContractClause, Decl, Delegate, EffectSet, EnumDecl, EnumExtension,
    EnumVariant, Event, Field, Function, InterfaceDecl, Module, Param, Property, RecordDecl,
    UnionCase, UnionDecl,
};
use super::expr::{Expr, MatchExpr};
use super::pattern::Pattern;
use super::stmt::{Body, CatchClause, MatchCase, Stmt};

/// Reset every span in the module to `Span::DUMMY`, in place.
pub fn strip_spans(module: &mut Module) {
    module.span = Span::DUMMY;
    for decl in &mut module.decls {
        strip_decl(decl);
    }
}

fn strip_decl(decl: &mut Decl) {
    match decl {
        Decl::Module(m) => strip_spans(m),
        Decl::Function(f) => strip_function(f),
        Decl::Class(ClassDecl { members, span, .. }) => {
            *span = Span::DUMMY;
            for member in members {
                strip_decl(member);
            }
        }
        Decl::Interface(InterfaceDecl { members, span, .. }) => {
            *span = Span::DUMMY;
            for member in members {
                strip_function(member);
            }
        }
        Decl::Enum(EnumDecl { variants, span, .. })
        | Decl::EnumExtension(EnumExtension { variants, span, .. }) => {
            *span = Span::DUMMY;
            for EnumVariant { span, .. } in variants {
                *span = Span::DUMMY;
            }
        }
        Decl::Record(RecordDecl {
            components, span, ..
        }) => {
            *span = Span::DUMMY;
            for field in components {
                strip_field(field);
            }
        }
        Decl::Union(UnionDecl { cases, span, .. }) => {
            *span = Span::DUMMY;
            for UnionCase { span, .. } in cases {
                *span = Span::DUMMY;
            }
        }
        Decl::Field(field) => strip_field(field),
        Decl::Property(Property { span, .. }) => *span = Span::DUMMY,
        Decl::Constructor(Constructor {
            params, body, span, ..
        }) => {
            *span = Span::DUMMY;
            for Param { span, .. } in params {
                *span = Span::DUMMY;
            }
            for stmt in body {
                strip_stmt(stmt);
            }
        }
        Decl::Delegate(Delegate { params, span, .. }) => {
            *span = Span::DUMMY;
            for Param { span, .. } in params {
                *span = Span::DUMMY;
            }
        }
        Decl::Event(Event { span, .. }) => *span = Span::DUMMY,
    }
}

fn strip_function(f: &mut Function) {
    f.span = Span::DUMMY;
    for Param { span, .. } in &mut f.params {
        *span = Span::DUMMY;
    }
    for ContractClause {
        condition, span, ..
    } in &mut f.contracts
    {
        *span = Span::DUMMY;
        strip_expr(condition);
    }
    if let Some(EffectSet { span, .. }) = &mut f.effects {
        *span = Span::DUMMY;
    }
    for stmt in &mut f.body {
        strip_stmt(stmt);
    }
}

fn strip_field(field: &mut Field) {
    field.span = Span::DUMMY;
    if let Some(init) = &mut field.init {
        strip_expr(init);
    }
}

fn strip_body(body: &mut Body) {
    match body {
        Body::Arrow(expr) => strip_expr(expr),
        Body::Block(stmts) => {
            for stmt in stmts {
                strip_stmt(stmt);
            }
        }
    }
}

fn strip_stmt(stmt: &mut Stmt) {
    match stmt {
        Stmt::Bind(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.value);
        }
        Stmt::Assign(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.value);
        }
        Stmt::Return(s) => {
            s.span = Span::DUMMY;
            if let Some(value) = &mut s.value {
                strip_expr(value);
            }
        }
        Stmt::If(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.cond);
            strip_body(&mut s.then_body);
            if let Some(else_body) = &mut s.else_body {
                strip_body(else_body);
            }
        }
        Stmt::For(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.from);
            strip_expr(&mut s.to);
            if let Some(step) = &mut s.step {
                strip_expr(step);
            }
            strip_body(&mut s.body);
        }
        Stmt::While(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.cond);
            strip_body(&mut s.body);
        }
        Stmt::DoWhile(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.cond);
            strip_body(&mut s.body);
        }
        Stmt::Foreach(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.seq);
            strip_body(&mut s.body);
        }
        Stmt::Try(s) => {
            s.span = Span::DUMMY;
            for stmt in &mut s.body {
                strip_stmt(stmt);
            }
            if let Some(CatchClause { body, span, .. }) = &mut s.catch {
                *span = Span::DUMMY;
                for stmt in body {
                    strip_stmt(stmt);
                }
            }
            if let Some(finally) = &mut s.finally {
                for stmt in finally {
                    strip_stmt(stmt);
                }
            }
        }
        Stmt::Throw(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.value);
        }
        Stmt::Break(s) => s.span = Span::DUMMY,
        Stmt::Continue(s) => s.span = Span::DUMMY,
        Stmt::Print(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.value);
        }
        Stmt::CollectionOp(s) => {
            s.span = Span::DUMMY;
            for arg in &mut s.args {
                strip_expr(arg);
            }
        }
        Stmt::Match(s) => {
            s.span = Span::DUMMY;
            strip_expr(&mut s.scrutinee);
            for case in &mut s.cases {
                strip_case(case);
            }
        }
    }
}

fn strip_case(case: &mut MatchCase) {
    case.span = Span::DUMMY;
    strip_pattern(&mut case.pattern);
    if let Some(guard) = &mut case.guard {
        strip_expr(guard);
    }
    strip_body(&mut case.body);
}

fn strip_pattern(pattern: &mut Pattern) {
    match pattern {
        Pattern::Wildcard(span)
        | Pattern::Literal(_, span)
        | Pattern::Variable(_, span)
        | Pattern::None(span) => *span = Span::DUMMY,
        Pattern::Relational(_, expr, span) => {
            *span = Span::DUMMY;
            strip_expr(expr);
        }
        Pattern::Some(inner, span) | Pattern::Ok(inner, span) | Pattern::Err(inner, span) => {
            *span = Span::DUMMY;
            strip_pattern(inner);
        }
        Pattern::Property(_, fields, span) => {
            *span = Span::DUMMY;
            for (_, pattern) in fields {
                strip_pattern(pattern);
            }
        }
        Pattern::Positional(_, elems, span) | Pattern::List(elems, _, span) => {
            *span = Span::DUMMY;
            for pattern in elems {
                strip_pattern(pattern);
            }
        }
    }
}

fn strip_expr(expr: &mut Expr) {
    match expr {
        Expr::Literal(_, span) | Expr::Reference(_, span) => *span = Span::DUMMY,
        Expr::Binary(_, lhs, rhs, span) => {
            *span = Span::DUMMY;
            strip_expr(lhs);
            strip_expr(rhs);
        }
        Expr::Unary(_, inner, span)
        | Expr::Await(inner, span)
        | Expr::Cast(_, inner, span)
        | Expr::Unchecked(inner, span)
        | Expr::FieldAccess(inner, _, span)
        | Expr::Lambda(_, inner, span) => {
            *span = Span::DUMMY;
            strip_expr(inner);
        }
        Expr::Call(callee, args, span) => {
            *span = Span::DUMMY;
            strip_expr(callee);
            for arg in args {
                strip_expr(arg);
            }
        }
        Expr::New(_, args, span)
        | Expr::StringOp(_, args, _, span)
        | Expr::CharOp(_, args, span)
        | Expr::BuilderOp(_, args, span)
        | Expr::OptionOp(_, args, span) => {
            *span = Span::DUMMY;
            for arg in args {
                strip_expr(arg);
            }
        }
        Expr::Conditional(cond, then, otherwise, span) => {
            *span = Span::DUMMY;
            strip_expr(cond);
            strip_expr(then);
            strip_expr(otherwise);
        }
        Expr::Variant(_, payload, span) => {
            *span = Span::DUMMY;
            if let Some(payload) = payload {
                strip_expr(payload);
            }
        }
        Expr::Match(m) => {
            let MatchExpr {
                scrutinee,
                cases,
                span,
                ..
            } = m.as_mut();
            *span = Span::DUMMY;
            strip_expr(scrutinee);
            for case in cases {
                strip_case(case);
            }
        }
    }
}
