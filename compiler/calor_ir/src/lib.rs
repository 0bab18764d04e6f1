//! Calor IR - core data model shared by every compiler stage.
//!
//! This crate contains:
//! - Spans for source locations (1-based line/column plus length)
//! - Tokens and token kinds produced by the lexer
//! - The four closed AST node families (declarations, statements,
//!   expressions, patterns)
//! - Contract clauses and advisory effect sets
//! - The per-compilation ID registry and allocator
//!
//! # Ownership
//!
//! The AST is a strict tree: a `Module` owns its declarations, declarations
//! own their statements, statements own their expressions. Nothing is shared
//! or mutated across compilation calls; every pipeline invocation builds its
//! data fresh and drops it at the end.

pub mod ast;
mod ids;
mod span;
mod tag;
mod token;

pub use ast::{
    escape_literal, strip_spans, Assign, BinaryOp, Bind, Body, BreakStmt, BuilderOp, CatchClause, CharOp,
    ClassDecl, CollectionOp, CollectionOpStmt, CompareMode, Constructor, ContinueStmt,
    ContractClause, ContractKind, Decl, Delegate, DoWhileStmt, EffectSet, EnumDecl, EnumExtension,
    EnumVariant, Event, Expr, Field, ForStmt, ForeachStmt, Function, IfStmt, InterfaceDecl,
    ListRest, Literal, MatchCase, MatchExpr, MatchStmt, Module, OptionOp, Param, Pattern,
    PrintStmt, Property, RecordDecl, RelOp, Return, Stmt, StringOp, ThrowStmt, TryStmt, TypeRef,
    UnaryOp, UnionCase, UnionDecl, VariantCtor, Visibility, WhileStmt,
};
pub use ids::{IdAllocator, IdRegistry, NodeId};
pub use span::Span;
pub use tag::Tag;
pub use token::{OpKind, Token, TokenKind};
