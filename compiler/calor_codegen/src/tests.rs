use pretty_assertions::assert_eq;

use calor_diagnostic::{Diagnostic, ErrorCode};

use super::*;

fn emit_clean(source: &str) -> String {
    emit_with_options(
        source,
        &EmitOptions {
            prelude: false,
        },
    )
}

fn emit_with_options(source: &str, options: &EmitOptions) -> String {
    let lexed = calor_lexer::lex(source);
    assert!(lexed.diagnostics.is_empty(), "{:?}", lexed.diagnostics);
    let parsed = calor_parse::parse(&lexed.tokens);
    assert!(parsed.diagnostics.is_empty(), "{:?}", parsed.diagnostics);
    let module = parsed.module.expect("module");
    let result = emit(&module, &[], options);
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    result.source.expect("emitted source")
}

const ADD_FN: &str = "§M{m1:calc}\n§F{f1:add:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§RET{r1:(+ a b)}\n§/F{f1}\n§/M{m1}\n";

#[test]
fn simple_function_maps_to_a_static_method() {
    let out = emit_clean(ADD_FN);
    assert!(out.contains("namespace calc"));
    assert!(out.contains("public static class Functions"));
    assert!(out.contains("public static int add(int a, int b)"));
    assert!(out.contains("return checked(a + b);"));
}

#[test]
fn identical_ast_emits_byte_identical_output() {
    let first = emit_clean(ADD_FN);
    let second = emit_clean(ADD_FN);
    assert_eq!(first, second);
}

#[test]
fn operands_are_emitted_left_to_right() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§RET{r1:1}\n§/F{f1}\n§F{f2:g:pub:i32}\n§RET{r2:2}\n§/F{f2}\n§F{f3:h:pub:i32}\n§RET{r3:(+ (f) (g))}\n§/F{f3}\n§/M{m1}\n",
    );
    // A call to `f` is placed lexically before the call to `g`.
    assert!(out.contains("return checked(f() + g());"));
}

#[test]
fn requires_guard_runs_before_the_body() {
    let out = emit_clean(
        "§M{m1:calc}\n§F{f1:div:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§REQ{q1:(!= b 0)}\n§RET{r1:(/ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
    let guard = out
        .find("if (!((b != 0))) throw new Calor.Runtime.ContractViolationException(\"requires\", \"(!= b 0)\");")
        .expect("requires guard present");
    let body = out.find("return checked(a / b);").expect("body present");
    assert!(guard < body, "guard must precede the body");
}

#[test]
fn ensures_guard_runs_after_the_result_is_computed() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§ENS{e1:(>= result 0)}\n§RET{r1:a}\n§/F{f1}\n§/M{m1}\n",
    );
    let capture = out.find("var __result0 = a;").expect("result captured");
    let guard = out
        .find("if (!((__result0 >= 0))) throw new Calor.Runtime.ContractViolationException(\"ensures\", \"(>= result 0)\");")
        .expect("ensures guard present");
    let ret = out.find("return __result0;").expect("return present");
    assert!(capture < guard && guard < ret);
}

#[test]
fn unchecked_marker_disables_overflow_checking() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:f:pub:i64}\n§PA{p1:n:i64}\n§RET{r1:(unchecked (+ n 1))}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(out.contains("return unchecked(n + 1);"));
}

#[test]
fn match_expression_lowers_to_a_switch_expression() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:v:pub:i32}\n§PA{p1:o:opt<i32>}\n§RET{r1}\n§MX{x1:o}\n§CS{c1:(some n)}→n\n§CS{c2:(none)}→0\n§/MX{x1}\n§/RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(out.contains(
        "return (o switch { { IsSome: true, Value: var n } => n, { IsSome: false } => 0 });"
    ));
}

#[test]
fn match_statement_preserves_case_order() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:n:i32}\n§MA{m2:n}\n§CS{c1:0}→10\n§CS{c2:(ge 1)}→20\n§CS{c3:_}→30\n§/MA{m2}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let zero = out.find("case 0:").expect("literal case");
    let relational = out.find("case >= 1:").expect("relational case");
    let wildcard = out.find("case _:").expect("wildcard case");
    assert!(zero < relational && relational < wildcard);
}

#[test]
fn ignore_case_mode_appends_the_comparison_constant() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:has:pub:bool}\n§PA{p1:a:str}\n§PA{p2:b:str}\n§RET{r1:(s.contains a b :ic)}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(out.contains("a.Contains(b, System.StringComparison.OrdinalIgnoreCase)"));
}

#[test]
fn emission_refuses_while_errors_are_outstanding() {
    let lexed = calor_lexer::lex(ADD_FN);
    let parsed = calor_parse::parse(&lexed.tokens);
    let module = parsed.module.expect("module");
    let upstream = vec![Diagnostic::error(ErrorCode::TypeMismatch)
        .with_message("expected `bool`, found `i32`")];
    let result = emit(&module, &upstream, &EmitOptions::default());
    assert!(result.source.is_none());
    assert_eq!(result.diagnostics.len(), 1);
    assert_eq!(result.diagnostics[0].code, ErrorCode::EmitBlocked);
}

#[test]
fn warnings_do_not_block_emission() {
    let lexed = calor_lexer::lex(ADD_FN);
    let parsed = calor_parse::parse(&lexed.tokens);
    let module = parsed.module.expect("module");
    let upstream = vec![Diagnostic::warning(ErrorCode::UnknownEffect)
        .with_message("unknown effect `gpu`")];
    let result = emit(&module, &upstream, &EmitOptions::default());
    assert!(result.source.is_some());
}

#[test]
fn prelude_is_prepended_by_default() {
    let lexed = calor_lexer::lex(ADD_FN);
    let parsed = calor_parse::parse(&lexed.tokens);
    let module = parsed.module.expect("module");
    let result = emit(&module, &[], &EmitOptions::default());
    let source = result.source.expect("source");
    assert!(source.contains("class ContractViolationException"));
    assert!(source.starts_with("namespace Calor.Runtime"));
}

#[test]
fn class_and_enum_mapping() {
    let out = emit_clean(
        "§M{m1:geo}\n§E{e1:Color:pub}\n§EC{ec1:red:1}\n§EC{ec2:green}\n§/E{e1}\n§C{c1:Point:pub}\n§FL{fl1:x:pri:i32:0}\n§PR{pr1:Count:pub:i32:get:set}\n§CT{ct1:pub}\n§PA{p1:x0:i32}\n§A{a1:x:x0}\n§/CT{ct1}\n§/C{c1}\n§/M{m1}\n",
    );
    assert!(out.contains("public enum Color"));
    assert!(out.contains("red = 1,"));
    assert!(out.contains("green,"));
    assert!(out.contains("public class Point"));
    assert!(out.contains("private int x = 0;"));
    assert!(out.contains("public int Count { get; set; }"));
    assert!(out.contains("public Point(int x0)"));
}

#[test]
fn async_function_awaits() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:fetch:pub:i32:async}\n§RET{r1:0}\n§/F{f1}\n§F{f2:use:pub:i32:async}\n§B{b1:v:i32:(await (fetch))}\n§RET{r2:v}\n§/F{f2}\n§/M{m1}\n",
    );
    assert!(out.contains("public static async System.Threading.Tasks.Task<int> fetch()"));
    assert!(out.contains("int v = (await fetch());"));
}

#[test]
fn foreach_arrow_body_discards_non_call_values() {
    let out = emit_clean(
        "§M{m1:x}\n§F{f1:f:pub:unit}\n§PA{p1:xs:list<i32>}\n§FE{l1:x:xs}→(+ x 1)\n§RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(out.contains("foreach (var x in xs)"));
    assert!(out.contains("_ = checked(x + 1);"));
}

#[test]
fn union_lowers_to_a_record_hierarchy() {
    let out = emit_clean(
        "§M{m1:x}\n§U{u1:Shape:pub}\n§UC{uc1:circle:f64}\n§UC{uc2:rect:f64:f64}\n§/U{u1}\n§/M{m1}\n",
    );
    assert!(out.contains("public abstract record Shape"));
    assert!(out.contains("public sealed record circle(double v0) : Shape;"));
    assert!(out.contains("public sealed record rect(double v0, double v1) : Shape;"));
}
