use std::time::Duration;

use pretty_assertions::assert_eq;

use calor_diagnostic::ErrorCode;
use calor_ir::ContractKind;

use super::*;

fn check_source(source: &str) -> CheckResult {
    let lexed = calor_lexer::lex(source);
    assert!(lexed.diagnostics.is_empty(), "lex failed: {:?}", lexed.diagnostics);
    let parsed = calor_parse::parse(&lexed.tokens);
    assert!(
        parsed.diagnostics.is_empty(),
        "parse failed: {:?}",
        parsed.diagnostics
    );
    check(&parsed.module.expect("module"))
}

fn codes(result: &CheckResult) -> Vec<ErrorCode> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn clean_function_has_no_diagnostics() {
    let result = check_source(
        "§M{m1:calc}\n§F{f1:add:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§RET{r1:(+ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert!(result.propositions.is_empty());
}

#[test]
fn undefined_reference_gets_a_suggestion() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:area:pub:i32}\n§PA{p1:width:i32}\n§RET{r1:(* widht widht)}\n§/F{f1}\n§/M{m1}\n",
    );
    let undefined: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::UndefinedReference)
        .collect();
    assert!(!undefined.is_empty());
    assert!(undefined[0]
        .suggestions
        .iter()
        .any(|s| s.message.contains("width")));
}

#[test]
fn boolean_context_rejects_non_boolean() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§IF{i1:(+ a 1)}→a\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn narrowing_requires_a_cast() {
    let narrowing = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:n:i64}\n§B{b1:small:i32:n}\n§RET{r1:small}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&narrowing).contains(&ErrorCode::TypeMismatch));

    let cast = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:n:i64}\n§B{b1:small:i32:(cast i32 n)}\n§RET{r1:small}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(cast.diagnostics.is_empty(), "{:?}", cast.diagnostics);
}

#[test]
fn widening_is_implicit() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i64}\n§PA{p1:n:i32}\n§RET{r1:n}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn redeclaration_in_same_scope() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§B{b1:v:i32:1}\n§B{b2:v:i32:2}\n§RET{r1:v}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::Redeclaration));
}

#[test]
fn shadowing_in_child_scope_is_allowed() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§B{b1:v:i32:1}\n§IF{i1:(> v 0)}\n§B{b2:v:i32:2}\n§RET{r1:v}\n§/IF{i1}\n§RET{r2:v}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn result_is_rejected_in_requires() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§REQ{q1:(> result 0)}\n§RET{r1:a}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::ContractScopeViolation));
}

#[test]
fn result_is_bound_in_ensures() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§ENS{e1:(>= result 0)}\n§RET{r1:a}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert_eq!(result.propositions.len(), 1);
    assert_eq!(result.propositions[0].kind, ContractKind::Ensures);
    assert_eq!(result.propositions[0].condition, "(>= result 0)");
}

#[test]
fn contracts_must_be_boolean() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§REQ{q1:(+ a 1)}\n§RET{r1:a}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn option_must_be_unwrapped() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:o:opt<i32>}\n§B{b1:v:i32:o}\n§RET{r1:v}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::ImplicitUnwrap));

    let unwrapped = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:o:opt<i32>}\n§B{b1:v:i32:(unwrap o)}\n§RET{r1:v}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(unwrapped.diagnostics.is_empty(), "{:?}", unwrapped.diagnostics);
}

#[test]
fn for_loop_bounds_must_be_numeric() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:s:str}\n§FOR{l1:i:0:s}\n§PRN{p2:i}\n§/FOR{l1}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn unknown_effect_is_a_warning_with_suggestion() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:i32:static}\n§EFF{x1:oi}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let warning = result
        .diagnostics
        .iter()
        .find(|d| d.code == ErrorCode::UnknownEffect)
        .expect("unknown_effect warning");
    assert!(!warning.is_error());
    assert!(warning.suggestions.iter().any(|s| s.message.contains("io")));
    assert!(!result.has_errors());
}

#[test]
fn call_arity_and_argument_types() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:add:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§RET{r1:(+ a b)}\n§/F{f1}\n§F{f2:use:pub:i32}\n§RET{r2:(add 1)}\n§/F{f2}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::ArgumentCountMismatch));

    let bad_arg = check_source(
        "§M{m1:x}\n§F{f1:add:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§RET{r1:(+ a b)}\n§/F{f1}\n§F{f2:use:pub:i32}\n§RET{r2:(add \"one\" 2)}\n§/F{f2}\n§/M{m1}\n",
    );
    assert!(codes(&bad_arg).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn async_call_requires_await() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:fetch:pub:i32:async}\n§RET{r1:0}\n§/F{f1}\n§F{f2:use:pub:i32:async}\n§B{b1:v:i32:(await (fetch))}\n§RET{r2:v}\n§/F{f2}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);

    let missing_await = check_source(
        "§M{m1:x}\n§F{f1:fetch:pub:i32:async}\n§RET{r1:0}\n§/F{f1}\n§F{f2:use:pub:i32}\n§B{b1:v:i32:(fetch)}\n§RET{r2:v}\n§/F{f2}\n§/M{m1}\n",
    );
    assert!(codes(&missing_await).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn failing_declaration_does_not_stop_siblings() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:bad:pub:i32}\n§RET{r1:missing}\n§/F{f1}\n§F{f2:also:pub:i32}\n§RET{r2:gone}\n§/F{f2}\n§/M{m1}\n",
    );
    let undefined = result
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::UndefinedReference)
        .count();
    assert_eq!(undefined, 2, "both siblings must be checked");
}

#[test]
fn match_patterns_bind_typed_names() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:v:pub:i32}\n§PA{p1:o:opt<i32>}\n§RET{r1}\n§MX{x1:o}\n§CS{c1:(some n)}→(+ n 1)\n§CS{c2:(none)}→0\n§/MX{x1}\n§/RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}

#[test]
fn propositions_reach_the_prover() {
    let result = check_source(
        "§M{m1:calc}\n§F{f1:div:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§REQ{q1:(!= b 0)}\n§RET{r1:(/ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
    assert_eq!(result.propositions.len(), 1);
    assert_eq!(result.propositions[0].condition, "(!= b 0)");
    assert_eq!(result.propositions[0].function, "div");

    let verdicts = prove_contracts(
        &result.propositions,
        &NullProver,
        Duration::from_millis(100),
    );
    assert_eq!(verdicts.len(), 1);
    assert_eq!(verdicts[0].1, ProverVerdict::Skipped);
}

#[test]
fn collection_ops_check_target_and_args() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:f:pub:unit}\n§PA{p1:xs:list<i32>}\n§CO{c1:add:xs:1}\n§CO{c2:remove-at:xs:\"zero\"}\n§RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(codes(&result).contains(&ErrorCode::TypeMismatch));
}

#[test]
fn foreach_element_type_flows_to_the_variable() {
    let result = check_source(
        "§M{m1:x}\n§F{f1:sum:pub:i32}\n§PA{p1:xs:list<i32>}\n§B{b1:total:i32:0}\n§FE{l1:x:xs}\n§A{a1:total:(+ total x)}\n§/FE{l1}\n§RET{r1:total}\n§/F{f1}\n§/M{m1}\n",
    );
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
}
