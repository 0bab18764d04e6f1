//! Type relationships: widening, compatibility, unification.
//!
//! `obj` is the dynamic top type: it is compatible in both directions and
//! doubles as the recovery type after an error, which keeps one mistake from
//! cascading into a wall of follow-on diagnostics.

use calor_ir::TypeRef;

/// How an actual type fits an expected type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compat {
    /// Identical, widening, or dynamic.
    Ok,
    /// Fits only by narrowing; an explicit cast is required.
    Narrowing,
    /// An option/result whose inner type fits; an explicit unwrap is
    /// required.
    ImplicitUnwrap,
    /// Does not fit.
    Mismatch,
}

/// Implicit numeric widening.
pub fn widens_to(from: &TypeRef, to: &TypeRef) -> bool {
    matches!(
        (from, to),
        (TypeRef::I32, TypeRef::I64)
            | (TypeRef::I32, TypeRef::F64)
            | (TypeRef::I32, TypeRef::F32)
            | (TypeRef::I64, TypeRef::F64)
            | (TypeRef::F32, TypeRef::F64)
    )
}

/// The reverse direction: representable only with loss.
fn narrows_to(from: &TypeRef, to: &TypeRef) -> bool {
    widens_to(to, from)
}

/// Check how `actual` fits where `expected` is required.
pub fn compatible(actual: &TypeRef, expected: &TypeRef) -> Compat {
    if actual == expected {
        return Compat::Ok;
    }
    if matches!(actual, TypeRef::Obj) || matches!(expected, TypeRef::Obj) {
        return Compat::Ok;
    }
    if widens_to(actual, expected) {
        return Compat::Ok;
    }
    if narrows_to(actual, expected) {
        return Compat::Narrowing;
    }
    match (actual, expected) {
        // Same-shape generics recurse before the unwrap check, so
        // `opt<obj>` still fits `opt<i32>`.
        (TypeRef::Opt(a), TypeRef::Opt(b)) | (TypeRef::List(a), TypeRef::List(b))
        | (TypeRef::Task(a), TypeRef::Task(b)) => match compatible(a, b) {
            Compat::Ok => Compat::Ok,
            _ => Compat::Mismatch,
        },
        (TypeRef::Res(a1, e1), TypeRef::Res(a2, e2))
        | (TypeRef::Map(a1, e1), TypeRef::Map(a2, e2)) => {
            if compatible(a1, a2) == Compat::Ok && compatible(e1, e2) == Compat::Ok {
                Compat::Ok
            } else {
                Compat::Mismatch
            }
        }
        // Explicit-unwrap discipline: an option/result never coerces to its
        // inner type.
        (TypeRef::Opt(inner), _) if compatible(inner, expected) == Compat::Ok => {
            Compat::ImplicitUnwrap
        }
        (TypeRef::Res(ok, _), _) if compatible(ok, expected) == Compat::Ok => {
            Compat::ImplicitUnwrap
        }
        (TypeRef::Named(a), TypeRef::Named(b)) if a == b => Compat::Ok,
        _ => Compat::Mismatch,
    }
}

/// The common type of two branches, if one exists.
pub fn unify(a: &TypeRef, b: &TypeRef) -> Option<TypeRef> {
    if a == b {
        return Some(a.clone());
    }
    if matches!(a, TypeRef::Obj) {
        return Some(b.clone());
    }
    if matches!(b, TypeRef::Obj) {
        return Some(a.clone());
    }
    if widens_to(a, b) {
        return Some(b.clone());
    }
    if widens_to(b, a) {
        return Some(a.clone());
    }
    match (a, b) {
        (TypeRef::Opt(x), TypeRef::Opt(y)) => {
            unify(x, y).map(|inner| TypeRef::Opt(Box::new(inner)))
        }
        (TypeRef::List(x), TypeRef::List(y)) => {
            unify(x, y).map(|inner| TypeRef::List(Box::new(inner)))
        }
        (TypeRef::Res(x1, y1), TypeRef::Res(x2, y2)) => match (unify(x1, x2), unify(y1, y2)) {
            (Some(ok), Some(err)) => Some(TypeRef::Res(Box::new(ok), Box::new(err))),
            _ => None,
        },
        _ => None,
    }
}

/// The wider of two numeric types.
pub fn numeric_join(a: &TypeRef, b: &TypeRef) -> TypeRef {
    if widens_to(a, b) {
        b.clone()
    } else {
        a.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening_is_ok_narrowing_is_not() {
        assert_eq!(compatible(&TypeRef::I32, &TypeRef::I64), Compat::Ok);
        assert_eq!(compatible(&TypeRef::I64, &TypeRef::I32), Compat::Narrowing);
        assert_eq!(compatible(&TypeRef::F64, &TypeRef::F32), Compat::Narrowing);
    }

    #[test]
    fn option_requires_explicit_unwrap() {
        let opt_i32 = TypeRef::Opt(Box::new(TypeRef::I32));
        assert_eq!(compatible(&opt_i32, &TypeRef::I32), Compat::ImplicitUnwrap);
        assert_eq!(compatible(&opt_i32, &opt_i32), Compat::Ok);
    }

    #[test]
    fn obj_is_dynamic_in_both_directions() {
        assert_eq!(compatible(&TypeRef::Obj, &TypeRef::I32), Compat::Ok);
        assert_eq!(compatible(&TypeRef::Str, &TypeRef::Obj), Compat::Ok);
    }

    #[test]
    fn unify_picks_the_wider_branch() {
        assert_eq!(unify(&TypeRef::I32, &TypeRef::I64), Some(TypeRef::I64));
        assert_eq!(unify(&TypeRef::Str, &TypeRef::I32), None);
        let opt_obj = TypeRef::Opt(Box::new(TypeRef::Obj));
        let opt_i32 = TypeRef::Opt(Box::new(TypeRef::I32));
        assert_eq!(unify(&opt_obj, &opt_i32), Some(opt_i32));
    }
}
