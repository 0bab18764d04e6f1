//! Statement nodes.

use crate::{NodeId, Span};

use super::expr::Expr;
use super::pattern::Pattern;
use super::types::TypeRef;

/// Closed statement family.
#[derive(Clone, PartialEq, Debug)]
pub enum Stmt {
    Bind(Bind),
    Assign(Assign),
    Return(Return),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    DoWhile(DoWhileStmt),
    Foreach(ForeachStmt),
    Try(TryStmt),
    Throw(ThrowStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    Print(PrintStmt),
    CollectionOp(CollectionOpStmt),
    Match(MatchStmt),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Bind(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Return(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::For(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::DoWhile(s) => s.span,
            Stmt::Foreach(s) => s.span,
            Stmt::Try(s) => s.span,
            Stmt::Throw(s) => s.span,
            Stmt::Break(s) => s.span,
            Stmt::Continue(s) => s.span,
            Stmt::Print(s) => s.span,
            Stmt::CollectionOp(s) => s.span,
            Stmt::Match(s) => s.span,
        }
    }
}

/// Arrow vs. block form of a construct body.
///
/// The parser records which form was written; the reverse emitter reproduces
/// it, which is what makes `parse ∘ emit ∘ parse = parse` hold.
#[derive(Clone, PartialEq, Debug)]
pub enum Body {
    /// `→ expr` single-expression form.
    Arrow(Expr),
    /// Multi-line block form.
    Block(Vec<Stmt>),
}

/// `§B{id:name:type:(expr)}` — introduce a new binding.
#[derive(Clone, PartialEq, Debug)]
pub struct Bind {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeRef,
    pub value: Expr,
    pub span: Span,
}

/// `§A{id:target:(expr)}` — assign to an existing binding or field path.
#[derive(Clone, PartialEq, Debug)]
pub struct Assign {
    /// Dotted target path (`x`, `self.count`).
    pub id: NodeId,
    pub target: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Return {
    pub id: NodeId,
    pub value: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct IfStmt {
    pub id: NodeId,
    pub cond: Expr,
    pub then_body: Body,
    pub else_body: Option<Body>,
    pub span: Span,
}

/// `§FOR{id:var:(from):(to)[:(step)]}` — numeric loop, inclusive start,
/// exclusive end.
#[derive(Clone, PartialEq, Debug)]
pub struct ForStmt {
    pub id: NodeId,
    pub var: String,
    pub from: Expr,
    pub to: Expr,
    pub step: Option<Expr>,
    pub body: Body,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct WhileStmt {
    pub id: NodeId,
    pub cond: Expr,
    pub body: Body,
    pub span: Span,
}

/// Condition is tested after each iteration.
#[derive(Clone, PartialEq, Debug)]
pub struct DoWhileStmt {
    pub id: NodeId,
    pub cond: Expr,
    pub body: Body,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ForeachStmt {
    pub id: NodeId,
    pub var: String,
    pub seq: Expr,
    pub body: Body,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TryStmt {
    pub id: NodeId,
    pub body: Vec<Stmt>,
    pub catch: Option<CatchClause>,
    pub finally: Option<Vec<Stmt>>,
    pub span: Span,
}

/// `§CATCH{id:var:type}` separator inside a `TRY`.
#[derive(Clone, PartialEq, Debug)]
pub struct CatchClause {
    pub var: String,
    pub ty: TypeRef,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThrowStmt {
    pub id: NodeId,
    pub value: Expr,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct BreakStmt {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ContinueStmt {
    pub id: NodeId,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PrintStmt {
    pub id: NodeId,
    pub value: Expr,
    pub span: Span,
}

/// Collection mutation operations.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CollectionOp {
    Add,
    Remove,
    Insert,
    RemoveAt,
    Set,
    Clear,
}

impl CollectionOp {
    pub fn from_name(name: &str) -> Option<CollectionOp> {
        match name {
            "add" => Some(CollectionOp::Add),
            "remove" => Some(CollectionOp::Remove),
            "insert" => Some(CollectionOp::Insert),
            "remove-at" => Some(CollectionOp::RemoveAt),
            "set" => Some(CollectionOp::Set),
            "clear" => Some(CollectionOp::Clear),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CollectionOp::Add => "add",
            CollectionOp::Remove => "remove",
            CollectionOp::Insert => "insert",
            CollectionOp::RemoveAt => "remove-at",
            CollectionOp::Set => "set",
            CollectionOp::Clear => "clear",
        }
    }
}

/// `§CO{id:op:target:(arg)...}`
#[derive(Clone, PartialEq, Debug)]
pub struct CollectionOpStmt {
    pub id: NodeId,
    pub op: CollectionOp,
    /// Dotted path to the collection.
    pub target: String,
    pub args: Vec<Expr>,
    pub span: Span,
}

/// `§MA{id:(scrutinee)}` — match in statement position.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchStmt {
    pub id: NodeId,
    pub scrutinee: Expr,
    pub cases: Vec<MatchCase>,
    pub span: Span,
}

/// `§CS{id:pattern[:(guard)]}` with arrow or block body.
#[derive(Clone, PartialEq, Debug)]
pub struct MatchCase {
    pub id: NodeId,
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Body,
    pub span: Span,
}
