//! Type and identifier mapping to C#.

use calor_ir::{TypeRef, Visibility};

/// Map a Calor type to its C# spelling in a value position.
pub fn value_type(ty: &TypeRef) -> String {
    match ty {
        TypeRef::I32 => "int".to_string(),
        TypeRef::I64 => "long".to_string(),
        TypeRef::F32 => "float".to_string(),
        TypeRef::F64 => "double".to_string(),
        TypeRef::Bool => "bool".to_string(),
        TypeRef::Str => "string".to_string(),
        TypeRef::Char => "char".to_string(),
        TypeRef::Unit => "Calor.Runtime.Unit".to_string(),
        TypeRef::Obj => "object".to_string(),
        TypeRef::Opt(inner) => format!("Calor.Runtime.Option<{}>", value_type(inner)),
        TypeRef::Res(ok, err) => format!(
            "Calor.Runtime.Result<{}, {}>",
            value_type(ok),
            value_type(err)
        ),
        TypeRef::List(inner) => {
            format!("System.Collections.Generic.List<{}>", value_type(inner))
        }
        TypeRef::Map(key, value) => format!(
            "System.Collections.Generic.Dictionary<{}, {}>",
            value_type(key),
            value_type(value)
        ),
        TypeRef::Task(inner) => {
            format!("System.Threading.Tasks.Task<{}>", value_type(inner))
        }
        TypeRef::Named(name) if name == "sb" => "System.Text.StringBuilder".to_string(),
        TypeRef::Named(name) => ident(name),
    }
}

/// Map a Calor return type to its C# spelling, `unit` becoming `void` and
/// async functions returning a task. The `async` modifier itself is emitted
/// at the signature, not here.
pub fn return_type(ty: &TypeRef, is_async: bool) -> String {
    let base = match ty {
        TypeRef::Unit => "void".to_string(),
        other => value_type(other),
    };
    if is_async {
        if matches!(ty, TypeRef::Unit) {
            "System.Threading.Tasks.Task".to_string()
        } else {
            format!("System.Threading.Tasks.Task<{base}>")
        }
    } else {
        base
    }
}

/// Sanitize a Calor identifier (possibly dotted) for C#.
///
/// Hyphenated names are legal Calor identifiers but not legal C#.
pub fn ident(name: &str) -> String {
    name.replace('-', "_")
}

/// C# visibility modifier for a declared shorthand.
pub fn visibility(vis: Visibility) -> &'static str {
    match vis {
        Visibility::Public => "public",
        Visibility::Private => "private",
        Visibility::Protected => "protected",
        Visibility::Internal => "internal",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_types_nest() {
        let ty = TypeRef::Map(
            Box::new(TypeRef::Str),
            Box::new(TypeRef::List(Box::new(TypeRef::I64))),
        );
        assert_eq!(
            value_type(&ty),
            "System.Collections.Generic.Dictionary<string, System.Collections.Generic.List<long>>"
        );
    }

    #[test]
    fn async_return_is_task_wrapped() {
        assert_eq!(
            return_type(&TypeRef::I32, true),
            "System.Threading.Tasks.Task<int>"
        );
        assert_eq!(return_type(&TypeRef::Unit, false), "void");
    }

    #[test]
    fn hyphens_are_sanitized() {
        assert_eq!(ident("my-var"), "my_var");
        assert_eq!(ident("a.b-c"), "a.b_c");
    }
}
