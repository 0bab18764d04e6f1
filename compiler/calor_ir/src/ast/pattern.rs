//! Pattern nodes for match cases.

use crate::Span;

use super::expr::{Expr, Literal};

/// Relational pattern keywords: `(ge e)` `(le e)` `(gt e)` `(lt e)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum RelOp {
    Ge,
    Le,
    Gt,
    Lt,
}

impl RelOp {
    pub fn from_keyword(kw: &str) -> Option<RelOp> {
        match kw {
            "ge" => Some(RelOp::Ge),
            "le" => Some(RelOp::Le),
            "gt" => Some(RelOp::Gt),
            "lt" => Some(RelOp::Lt),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            RelOp::Ge => "ge",
            RelOp::Le => "le",
            RelOp::Gt => "gt",
            RelOp::Lt => "lt",
        }
    }

    /// The host comparison operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Ge => ">=",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Lt => "<",
        }
    }
}

/// Rest element of a list pattern: `..` or `..name`.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum ListRest {
    Anonymous,
    Named(String),
}

/// Closed pattern family.
#[derive(Clone, PartialEq, Debug)]
pub enum Pattern {
    /// `_`
    Wildcard(Span),
    Literal(Literal, Span),
    /// Bare name capture.
    Variable(String, Span),
    /// `(ge 5)` etc.
    Relational(RelOp, Expr, Span),
    /// `(some p)`
    Some(Box<Pattern>, Span),
    /// `(none)`
    None(Span),
    /// `(ok p)`
    Ok(Box<Pattern>, Span),
    /// `(err p)`
    Err(Box<Pattern>, Span),
    /// `(prop Type (field p)...)`
    Property(String, Vec<(String, Pattern)>, Span),
    /// `(pos Type p...)`
    Positional(String, Vec<Pattern>, Span),
    /// `(list p... [..rest])`
    List(Vec<Pattern>, Option<ListRest>, Span),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard(span)
            | Pattern::Literal(_, span)
            | Pattern::Variable(_, span)
            | Pattern::Relational(_, _, span)
            | Pattern::Some(_, span)
            | Pattern::None(span)
            | Pattern::Ok(_, span)
            | Pattern::Err(_, span)
            | Pattern::Property(_, _, span)
            | Pattern::Positional(_, _, span)
            | Pattern::List(_, _, span) => *span,
        }
    }

    /// Whether this pattern matches anything (wildcard or bare capture).
    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Wildcard(_) | Pattern::Variable(_, _))
    }

    /// Names bound by this pattern, in left-to-right order.
    pub fn bindings(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_bindings(&mut names);
        names
    }

    fn collect_bindings<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Pattern::Wildcard(_)
            | Pattern::Literal(_, _)
            | Pattern::Relational(_, _, _)
            | Pattern::None(_) => {}
            Pattern::Variable(name, _) => out.push(name),
            Pattern::Some(inner, _) | Pattern::Ok(inner, _) | Pattern::Err(inner, _) => {
                inner.collect_bindings(out);
            }
            Pattern::Property(_, fields, _) => {
                for (_, pattern) in fields {
                    pattern.collect_bindings(out);
                }
            }
            Pattern::Positional(_, elems, _) => {
                for pattern in elems {
                    pattern.collect_bindings(out);
                }
            }
            Pattern::List(elems, rest, _) => {
                for pattern in elems {
                    pattern.collect_bindings(out);
                }
                if let Some(ListRest::Named(name)) = rest {
                    out.push(name);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bindings_are_left_to_right() {
        let pattern = Pattern::Positional(
            "Point".to_string(),
            vec![
                Pattern::Variable("x".to_string(), Span::DUMMY),
                Pattern::Wildcard(Span::DUMMY),
                Pattern::Variable("y".to_string(), Span::DUMMY),
            ],
            Span::DUMMY,
        );
        assert_eq!(pattern.bindings(), vec!["x", "y"]);
    }

    #[test]
    fn list_rest_binds() {
        let pattern = Pattern::List(
            vec![Pattern::Variable("head".to_string(), Span::DUMMY)],
            Some(ListRest::Named("tail".to_string())),
            Span::DUMMY,
        );
        assert_eq!(pattern.bindings(), vec!["head", "tail"]);
    }
}
