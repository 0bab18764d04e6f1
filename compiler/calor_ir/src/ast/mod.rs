//! AST node families.
//!
//! Four closed variant sets — declarations, statements, expressions,
//! patterns — traversed with exhaustive `match` in every pass. No open
//! visitor interfaces: adding a node kind must break every pass at compile
//! time until it is handled.

mod decl;
mod expr;
mod normalize;
mod pattern;
mod pretty;
mod stmt;
mod types;

pub use decl::{
    ClassDecl, Constructor, ContractClause, ContractKind, Decl, Delegate, EffectSet, EnumDecl,
    EnumExtension, EnumVariant, Event, Field, Function, InterfaceDecl, Module, Param, Property,
    RecordDecl, UnionCase, UnionDecl, Visibility,
};
pub use expr::{
    BinaryOp, BuilderOp, CharOp, CompareMode, Expr, Literal, MatchExpr, OptionOp, StringOp,
    UnaryOp, VariantCtor,
};
pub use normalize::strip_spans;
pub use pretty::escape_literal;
pub use pattern::{ListRest, Pattern, RelOp};
pub use stmt::{
    Assign, Bind, Body, BreakStmt, CatchClause, CollectionOp, CollectionOpStmt, ContinueStmt,
    DoWhileStmt, ForStmt, ForeachStmt, IfStmt, MatchCase, MatchStmt, PrintStmt, Return, Stmt,
    ThrowStmt, TryStmt, WhileStmt,
};
pub use types::TypeRef;
