//! Declaration nodes.

use crate::{NodeId, Span};

use super::expr::Expr;
use super::stmt::Stmt;
use super::types::TypeRef;

/// Visibility shorthand as written in tag arguments.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Protected,
    Internal,
}

impl Visibility {
    /// Parse the declared shorthand.
    pub fn from_shorthand(text: &str) -> Option<Visibility> {
        match text {
            "pub" => Some(Visibility::Public),
            "pri" => Some(Visibility::Private),
            "pro" => Some(Visibility::Protected),
            "int" => Some(Visibility::Internal),
            _ => None,
        }
    }

    /// The canonical shorthand spelling.
    pub fn shorthand(&self) -> &'static str {
        match self {
            Visibility::Public => "pub",
            Visibility::Private => "pri",
            Visibility::Protected => "pro",
            Visibility::Internal => "int",
        }
    }
}

/// The root of a compilation: a module owning its declarations.
#[derive(Clone, PartialEq, Debug)]
pub struct Module {
    pub id: NodeId,
    /// Dotted module name.
    pub name: String,
    pub decls: Vec<Decl>,
    pub span: Span,
}

/// Closed declaration family.
#[derive(Clone, PartialEq, Debug)]
pub enum Decl {
    Module(Module),
    Function(Function),
    Class(ClassDecl),
    Interface(InterfaceDecl),
    Enum(EnumDecl),
    EnumExtension(EnumExtension),
    Record(RecordDecl),
    Union(UnionDecl),
    Field(Field),
    Property(Property),
    Constructor(Constructor),
    Delegate(Delegate),
    Event(Event),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Module(d) => d.span,
            Decl::Function(d) => d.span,
            Decl::Class(d) => d.span,
            Decl::Interface(d) => d.span,
            Decl::Enum(d) => d.span,
            Decl::EnumExtension(d) => d.span,
            Decl::Record(d) => d.span,
            Decl::Union(d) => d.span,
            Decl::Field(d) => d.span,
            Decl::Property(d) => d.span,
            Decl::Constructor(d) => d.span,
            Decl::Delegate(d) => d.span,
            Decl::Event(d) => d.span,
        }
    }

    pub fn id(&self) -> &NodeId {
        match self {
            Decl::Module(d) => &d.id,
            Decl::Function(d) => &d.id,
            Decl::Class(d) => &d.id,
            Decl::Interface(d) => &d.id,
            Decl::Enum(d) => &d.id,
            Decl::EnumExtension(d) => &d.id,
            Decl::Record(d) => &d.id,
            Decl::Union(d) => &d.id,
            Decl::Field(d) => &d.id,
            Decl::Property(d) => &d.id,
            Decl::Constructor(d) => &d.id,
            Decl::Delegate(d) => &d.id,
            Decl::Event(d) => &d.id,
        }
    }
}

/// Function or method.
///
/// Inside an interface the body is empty and the declaration is a signature.
#[derive(Clone, PartialEq, Debug)]
pub struct Function {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub ret: TypeRef,
    pub is_async: bool,
    pub is_static: bool,
    pub params: Vec<Param>,
    pub contracts: Vec<ContractClause>,
    pub effects: Option<EffectSet>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Function parameter (`§PA{id:name:type}`).
#[derive(Clone, PartialEq, Debug)]
pub struct Param {
    pub id: NodeId,
    pub name: String,
    pub ty: TypeRef,
    pub span: Span,
}

/// requires / ensures / invariant.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ContractKind {
    Requires,
    Ensures,
    Invariant,
}

impl ContractKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            ContractKind::Requires => "requires",
            ContractKind::Ensures => "ensures",
            ContractKind::Invariant => "invariant",
        }
    }
}

/// A contract clause attached to a function or type.
#[derive(Clone, PartialEq, Debug)]
pub struct ContractClause {
    pub id: NodeId,
    pub kind: ContractKind,
    pub condition: Expr,
    pub message: Option<String>,
    pub span: Span,
}

/// Declared side-effect tags. Advisory metadata only: the checker validates
/// the vocabulary but never cross-checks the call graph.
#[derive(Clone, PartialEq, Debug)]
pub struct EffectSet {
    pub id: NodeId,
    /// Effects in source order (set semantics; order is not significant).
    pub effects: Vec<String>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassDecl {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub base: Option<String>,
    pub interfaces: Vec<String>,
    pub members: Vec<Decl>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct InterfaceDecl {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    /// Method signatures (empty bodies).
    pub members: Vec<Function>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct EnumDecl {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

/// `§EC{id:name[:value]}`
#[derive(Clone, PartialEq, Debug)]
pub struct EnumVariant {
    pub id: NodeId,
    pub name: String,
    /// Explicit backing value, where given.
    pub value: Option<i64>,
    pub span: Span,
}

/// `§EX{id:enum-name}` — adds variants to an enum declared elsewhere.
#[derive(Clone, PartialEq, Debug)]
pub struct EnumExtension {
    pub id: NodeId,
    pub enum_name: String,
    pub variants: Vec<EnumVariant>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct RecordDecl {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    /// Positional components.
    pub components: Vec<Field>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct UnionDecl {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub cases: Vec<UnionCase>,
    pub span: Span,
}

/// `§UC{id:name[:type...]}`
#[derive(Clone, PartialEq, Debug)]
pub struct UnionCase {
    pub id: NodeId,
    pub name: String,
    pub payload: Vec<TypeRef>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub ty: TypeRef,
    pub init: Option<Expr>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Property {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub ty: TypeRef,
    pub has_get: bool,
    pub has_set: bool,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Constructor {
    pub id: NodeId,
    pub vis: Visibility,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Delegate {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub ret: TypeRef,
    pub params: Vec<Param>,
    pub span: Span,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Event {
    pub id: NodeId,
    pub name: String,
    pub vis: Visibility,
    pub delegate: String,
    pub span: Span,
}
