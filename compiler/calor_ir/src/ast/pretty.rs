//! Canonical text rendering for expressions, patterns, and literals.
//!
//! This is the single source of truth for how an expression looks in Calor
//! text: the reverse emitter serializes through it and the checker uses it
//! for contract proposition text, so the two always agree.

use super::expr::{Expr, Literal};
use super::pattern::{ListRest, Pattern};

impl Literal {
    /// Render as canonical Calor literal text.
    pub fn pretty(&self) -> String {
        match self {
            // Negative values cannot be written as bare literals; render the
            // unary-minus form so the text reparses.
            Literal::Int(v) if *v < 0 => format!("(- {})", v.unsigned_abs()),
            Literal::Int(v) => v.to_string(),
            Literal::Float(v) => {
                let mut s = format!("{v}");
                if !s.contains('.') && !s.contains('e') {
                    s.push_str(".0");
                }
                s
            }
            Literal::Bool(b) => b.to_string(),
            Literal::Str(s) => format!("\"{}\"", escape_literal(s)),
            Literal::Char(c) => match c {
                '\n' => "'\\n'".to_string(),
                '\t' => "'\\t'".to_string(),
                '\r' => "'\\r'".to_string(),
                '\0' => "'\\0'".to_string(),
                '\\' => "'\\\\'".to_string(),
                '\'' => "'\\''".to_string(),
                c => format!("'{c}'"),
            },
            Literal::Unit => "()".to_string(),
        }
    }
}

/// Escape a string body for a canonical literal.
pub fn escape_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
    out
}

impl Expr {
    /// Render as canonical Calor expression text.
    ///
    /// A match expression in statement position serializes as a multi-line
    /// `§MX` block; nested inside a larger expression it renders as the same
    /// tag sequence inline, which reparses to the same node.
    pub fn pretty(&self) -> String {
        match self {
            Expr::Literal(lit, _) => lit.pretty(),
            Expr::Reference(name, _) => name.clone(),
            Expr::Binary(op, lhs, rhs, _) => {
                format!("({} {} {})", op.symbol(), lhs.pretty(), rhs.pretty())
            }
            Expr::Unary(op, operand, _) => format!("({} {})", op.symbol(), operand.pretty()),
            Expr::Call(callee, args, _) => pretty_form(&callee.pretty(), args),
            Expr::New(type_name, args, _) => {
                pretty_form(&format!("new {type_name}"), args)
            }
            Expr::FieldAccess(receiver, field, _) => {
                format!("(. {} {field})", receiver.pretty())
            }
            Expr::Conditional(cond, then, otherwise, _) => format!(
                "(if {} {} {})",
                cond.pretty(),
                then.pretty(),
                otherwise.pretty()
            ),
            Expr::Match(m) => pretty_inline_match(m),
            Expr::Await(inner, _) => format!("(await {})", inner.pretty()),
            Expr::Lambda(params, body, _) => {
                let params = params
                    .iter()
                    .map(|(name, ty)| format!("{name}:{ty}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                format!("(fn ({params}) {})", body.pretty())
            }
            Expr::Cast(ty, inner, _) => format!("(cast {ty} {})", inner.pretty()),
            Expr::Unchecked(inner, _) => format!("(unchecked {})", inner.pretty()),
            Expr::StringOp(op, args, mode, _) => {
                let mut text = pretty_form_open(op.name(), args);
                if let Some(mode) = mode {
                    text.push_str(" :");
                    text.push_str(mode.keyword());
                }
                text.push(')');
                text
            }
            Expr::CharOp(op, args, _) => pretty_form(op.name(), args),
            Expr::BuilderOp(op, args, _) => pretty_form(op.name(), args),
            Expr::Variant(ctor, payload, _) => match payload {
                Some(payload) => format!("({} {})", ctor.name(), payload.pretty()),
                None => format!("({})", ctor.name()),
            },
            Expr::OptionOp(op, args, _) => pretty_form(op.name(), args),
        }
    }
}

/// A match expression nested inside a larger expression, rendered as its
/// tag sequence on one line. Case bodies are arrow form by construction.
fn pretty_inline_match(m: &crate::MatchExpr) -> String {
    let id = m.id.as_user().unwrap_or("g0");
    let mut text = format!(
        "\u{00a7}MX{{{id}:{}}}",
        m.scrutinee.pretty()
    );
    for case in &m.cases {
        let case_id = case.id.as_user().unwrap_or("g0");
        text.push_str(&format!(" \u{00a7}CS{{{case_id}:{}", case.pattern.pretty()));
        if let Some(guard) = &case.guard {
            text.push_str(&format!(":{}", guard.pretty()));
        }
        text.push('}');
        let value = match &case.body {
            crate::Body::Arrow(value) => value.pretty(),
            crate::Body::Block(_) => "()".to_string(),
        };
        text.push_str(&format!("\u{2192}{value}"));
    }
    text.push_str(&format!(" \u{00a7}/MX{{{id}}}"));
    text
}

fn pretty_form(head: &str, args: &[Expr]) -> String {
    let mut text = pretty_form_open(head, args);
    text.push(')');
    text
}

fn pretty_form_open(head: &str, args: &[Expr]) -> String {
    let mut text = format!("({head}");
    for arg in args {
        text.push(' ');
        text.push_str(&arg.pretty());
    }
    text
}

impl Pattern {
    /// Render as canonical Calor pattern text.
    pub fn pretty(&self) -> String {
        match self {
            Pattern::Wildcard(_) => "_".to_string(),
            Pattern::Literal(lit, _) => lit.pretty(),
            Pattern::Variable(name, _) => name.clone(),
            Pattern::Relational(op, bound, _) => {
                format!("({} {})", op.keyword(), bound.pretty())
            }
            Pattern::Some(inner, _) => format!("(some {})", inner.pretty()),
            Pattern::None(_) => "(none)".to_string(),
            Pattern::Ok(inner, _) => format!("(ok {})", inner.pretty()),
            Pattern::Err(inner, _) => format!("(err {})", inner.pretty()),
            Pattern::Property(type_name, fields, _) => {
                let mut text = format!("(prop {type_name}");
                for (field, pattern) in fields {
                    text.push_str(&format!(" ({field} {})", pattern.pretty()));
                }
                text.push(')');
                text
            }
            Pattern::Positional(type_name, elements, _) => {
                let mut text = format!("(pos {type_name}");
                for element in elements {
                    text.push(' ');
                    text.push_str(&element.pretty());
                }
                text.push(')');
                text
            }
            Pattern::List(elements, rest, _) => {
                let mut text = "(list".to_string();
                for element in elements {
                    text.push(' ');
                    text.push_str(&element.pretty());
                }
                match rest {
                    Some(ListRest::Anonymous) => text.push_str(" .."),
                    Some(ListRest::Named(name)) => text.push_str(&format!(" ..{name}")),
                    None => {}
                }
                text.push(')');
                text
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BinaryOp, CompareMode, Span, StringOp};

    use super::*;

    #[test]
    fn binary_renders_prefix() {
        let expr = Expr::Binary(
            BinaryOp::Add,
            Box::new(Expr::Reference("a".to_string(), Span::DUMMY)),
            Box::new(Expr::Reference("b".to_string(), Span::DUMMY)),
            Span::DUMMY,
        );
        assert_eq!(expr.pretty(), "(+ a b)");
    }

    #[test]
    fn string_op_mode_suffix() {
        let expr = Expr::StringOp(
            StringOp::Contains,
            vec![
                Expr::Reference("a".to_string(), Span::DUMMY),
                Expr::Reference("b".to_string(), Span::DUMMY),
            ],
            Some(CompareMode::IgnoreCase),
            Span::DUMMY,
        );
        assert_eq!(expr.pretty(), "(s.contains a b :ic)");
    }

    #[test]
    fn literals_round_trip_shape() {
        assert_eq!(Literal::Int(42).pretty(), "42");
        assert_eq!(Literal::Int(-7).pretty(), "(- 7)");
        assert_eq!(Literal::Float(3.0).pretty(), "3.0");
        assert_eq!(Literal::Float(2.5).pretty(), "2.5");
        assert_eq!(Literal::Str("a\"b\n".to_string()).pretty(), "\"a\\\"b\\n\"");
        assert_eq!(Literal::Char('\n').pretty(), "'\\n'");
        assert_eq!(Literal::Unit.pretty(), "()");
    }

    #[test]
    fn list_pattern_with_rest() {
        let pattern = Pattern::List(
            vec![Pattern::Variable("a".to_string(), Span::DUMMY)],
            Some(ListRest::Named("rest".to_string())),
            Span::DUMMY,
        );
        assert_eq!(pattern.pretty(), "(list a ..rest)");
    }
}
