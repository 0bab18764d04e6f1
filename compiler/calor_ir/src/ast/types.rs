//! Type references as written in source.

use std::fmt;

/// A type as written in Calor source.
///
/// This is the syntactic form; the checker assigns semantic meaning and
/// decides widening/narrowing relationships.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeRef {
    I32,
    I64,
    F32,
    F64,
    Bool,
    Str,
    Char,
    Unit,
    Obj,
    /// `opt<T>`
    Opt(Box<TypeRef>),
    /// `res<T,E>`
    Res(Box<TypeRef>, Box<TypeRef>),
    /// `list<T>`
    List(Box<TypeRef>),
    /// `map<K,V>`
    Map(Box<TypeRef>, Box<TypeRef>),
    /// `task<T>`
    Task(Box<TypeRef>),
    /// A user-defined (possibly dotted) type name.
    Named(String),
}

impl TypeRef {
    /// Look up a primitive type by its source keyword.
    pub fn primitive(name: &str) -> Option<TypeRef> {
        match name {
            "i32" => Some(TypeRef::I32),
            "i64" => Some(TypeRef::I64),
            "f32" => Some(TypeRef::F32),
            "f64" => Some(TypeRef::F64),
            "bool" => Some(TypeRef::Bool),
            "str" => Some(TypeRef::Str),
            "char" => Some(TypeRef::Char),
            "unit" => Some(TypeRef::Unit),
            "obj" => Some(TypeRef::Obj),
            _ => None,
        }
    }

    /// Whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, TypeRef::I32 | TypeRef::I64)
    }

    /// Whether this is a numeric type.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            TypeRef::I32 | TypeRef::I64 | TypeRef::F32 | TypeRef::F64
        )
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::I32 => write!(f, "i32"),
            TypeRef::I64 => write!(f, "i64"),
            TypeRef::F32 => write!(f, "f32"),
            TypeRef::F64 => write!(f, "f64"),
            TypeRef::Bool => write!(f, "bool"),
            TypeRef::Str => write!(f, "str"),
            TypeRef::Char => write!(f, "char"),
            TypeRef::Unit => write!(f, "unit"),
            TypeRef::Obj => write!(f, "obj"),
            TypeRef::Opt(inner) => write!(f, "opt<{inner}>"),
            TypeRef::Res(ok, err) => write!(f, "res<{ok},{err}>"),
            TypeRef::List(inner) => write!(f, "list<{inner}>"),
            TypeRef::Map(k, v) => write!(f, "map<{k},{v}>"),
            TypeRef::Task(inner) => write!(f, "task<{inner}>"),
            TypeRef::Named(name) => write!(f, "{name}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_generics() {
        let ty = TypeRef::Res(Box::new(TypeRef::I32), Box::new(TypeRef::Str));
        assert_eq!(ty.to_string(), "res<i32,str>");
        let ty = TypeRef::Map(
            Box::new(TypeRef::Str),
            Box::new(TypeRef::List(Box::new(TypeRef::I64))),
        );
        assert_eq!(ty.to_string(), "map<str,list<i64>>");
    }

    #[test]
    fn primitive_lookup() {
        assert_eq!(TypeRef::primitive("i32"), Some(TypeRef::I32));
        assert_eq!(TypeRef::primitive("int"), None);
    }
}
