use pretty_assertions::assert_eq;

use calor_diagnostic::ErrorCode;
use calor_ir::{
    Body, ContractKind, Decl, Expr, ListRest, Literal, Module, Pattern, RelOp, Stmt, TypeRef,
    Visibility,
};

use super::*;

fn parse_source(source: &str) -> ParseResult {
    let lexed = calor_lexer::lex(source);
    assert!(
        lexed.diagnostics.is_empty(),
        "unexpected lex diagnostics: {:?}",
        lexed.diagnostics
    );
    parse(&lexed.tokens)
}

fn parse_clean(source: &str) -> Module {
    let result = parse_source(source);
    assert!(
        result.diagnostics.is_empty(),
        "unexpected diagnostics: {:?}",
        result.diagnostics
    );
    result.module.expect("expected a module")
}

fn only_function(module: &Module) -> &calor_ir::Function {
    match &module.decls[0] {
        Decl::Function(f) => f,
        other => panic!("expected a function, got {other:?}"),
    }
}

const ADD_FN: &str = "\
§M{m1:calc}
§F{f1:add:pub:i32}
§PA{p1:a:i32}
§PA{p2:b:i32}
§RET{r1:(+ a b)}
§/F{f1}
§/M{m1}
";

#[test]
fn two_parameter_function_parses_clean() {
    let module = parse_clean(ADD_FN);
    assert_eq!(module.name, "calc");
    let f = only_function(&module);
    assert_eq!(f.name, "add");
    assert_eq!(f.vis, Visibility::Public);
    assert_eq!(f.ret, TypeRef::I32);
    assert_eq!(f.params.len(), 2);
    assert_eq!(f.body.len(), 1);
    match &f.body[0] {
        Stmt::Return(ret) => assert!(matches!(
            ret.value,
            Some(Expr::Binary(calor_ir::BinaryOp::Add, _, _, _))
        )),
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn id_mismatch_fix_edits_only_the_closing_id() {
    let source = "\
§M{m1:calc}
§F{f001:add:pub:i32}
§RET{r1:(+ 1 2)}
§/F{f002}
§/M{m1}
";
    let result = parse_source(source);
    let mismatches: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|d| d.code == ErrorCode::IdMismatch)
        .collect();
    assert_eq!(mismatches.len(), 1, "exactly one id_mismatch expected");

    let fix = mismatches[0].machine_fix().expect("fix expected");
    assert_eq!(fix.substitutions.len(), 1, "fix must contain a single edit");
    let edit = &fix.substitutions[0];
    assert_eq!(edit.snippet, "f001");
    // The edit covers exactly the closing ID text `f002`.
    assert_eq!(edit.span.length, 4);
    assert_eq!(edit.span.line, 4);

    // The tree is still produced, with the opening ID winning.
    let module = result.module.expect("module survives the mismatch");
    let f = only_function(&module);
    assert_eq!(f.id.as_user(), Some("f001"));
}

#[test]
fn arrow_and_block_forms_are_recorded() {
    let arrow = parse_clean(
        "§M{m1:x}\n§F{f1:pick:pub:i32}\n§PA{p1:a:i32}\n§IF{i1:(> a 0)}→a\n§RET{r1:(- 0 a)}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&arrow);
    match &f.body[0] {
        Stmt::If(s) => assert!(matches!(s.then_body, Body::Arrow(_))),
        other => panic!("expected if, got {other:?}"),
    }

    let block = parse_clean(
        "§M{m1:x}\n§F{f1:pick:pub:i32}\n§PA{p1:a:i32}\n§IF{i1:(> a 0)}\n§RET{r1:a}\n§EL{i1}\n§RET{r2:(- 0 a)}\n§/IF{i1}\n§RET{r3:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&block);
    match &f.body[0] {
        Stmt::If(s) => {
            assert!(matches!(s.then_body, Body::Block(_)));
            assert!(matches!(s.else_body, Some(Body::Block(_))));
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn contracts_and_effects_parse() {
    let module = parse_clean(
        "§M{m1:calc}\n§F{f1:div:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§REQ{q1:(!= b 0):\"b must be nonzero\"}\n§ENS{e1:(>= result 0)}\n§EFF{x1:io,mut}\n§RET{r1:(/ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    assert_eq!(f.contracts.len(), 2);
    assert_eq!(f.contracts[0].kind, ContractKind::Requires);
    assert_eq!(f.contracts[0].message.as_deref(), Some("b must be nonzero"));
    assert_eq!(f.contracts[1].kind, ContractKind::Ensures);
    let effects = f.effects.as_ref().expect("effects expected");
    assert_eq!(effects.effects, vec!["io".to_string(), "mut".to_string()]);
}

#[test]
fn match_statement_patterns() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:describe:pub:str}\n§PA{p1:v:opt<i32>}\n§MA{m2:v}\n§CS{c1:(some n):(> n 0)}→\"positive\"\n§CS{c2:(some n)}→\"other\"\n§CS{c3:(none)}→\"missing\"\n§CS{c4:_}\n§RET{r1:\"unreachable\"}\n§/CS{c4}\n§/MA{m2}\n§RET{r2:\"done\"}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Match(m) => {
            assert_eq!(m.cases.len(), 4);
            assert!(matches!(m.cases[0].pattern, Pattern::Some(_, _)));
            assert!(m.cases[0].guard.is_some());
            assert!(matches!(m.cases[2].pattern, Pattern::None(_)));
            assert!(matches!(m.cases[3].pattern, Pattern::Wildcard(_)));
            assert!(matches!(m.cases[3].body, Body::Block(_)));
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn relational_and_list_patterns() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:bucket:pub:i32}\n§PA{p1:xs:list<i32>}\n§MA{m2:xs}\n§CS{c1:(list a b ..rest)}→a\n§CS{c2:(list)}→0\n§CS{c3:_}→1\n§/MA{m2}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Match(m) => match &m.cases[0].pattern {
            Pattern::List(elems, rest, _) => {
                assert_eq!(elems.len(), 2);
                assert_eq!(rest, &Some(ListRest::Named("rest".to_string())));
            }
            other => panic!("expected list pattern, got {other:?}"),
        },
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn relational_pattern_keywords() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:sign:pub:i32}\n§PA{p1:n:i32}\n§MA{m2:n}\n§CS{c1:(ge 1)}→1\n§CS{c2:(le (- 0 1))}→(- 0 1)\n§CS{c3:_}→0\n§/MA{m2}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Match(m) => {
            assert!(matches!(m.cases[0].pattern, Pattern::Relational(RelOp::Ge, _, _)));
            assert!(matches!(m.cases[1].pattern, Pattern::Relational(RelOp::Le, _, _)));
        }
        other => panic!("expected match, got {other:?}"),
    }
}

#[test]
fn match_expression_as_return_value() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:value:pub:i32}\n§PA{p1:v:opt<i32>}\n§RET{r1}\n§MX{x1:v}\n§CS{c1:(some n)}→n\n§CS{c2:(none)}→0\n§/MX{x1}\n§/RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Return(ret) => match &ret.value {
            Some(Expr::Match(m)) => assert_eq!(m.cases.len(), 2),
            other => panic!("expected match expression, got {other:?}"),
        },
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn match_expression_rejects_block_cases() {
    let source = "§M{m1:x}\n§F{f1:v:pub:i32}\n§PA{p1:o:opt<i32>}\n§RET{r1}\n§MX{x1:o}\n§CS{c1:_}\n§RET{r2:0}\n§/CS{c1}\n§/MX{x1}\n§/RET{r1}\n§/F{f1}\n§/M{m1}\n";
    let result = parse_source(source);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::ExpectedExpression));
}

#[test]
fn recovery_keeps_sibling_statements() {
    // The first statement is malformed; the return after it must survive.
    let source = "§M{m1:x}\n§F{f1:f:pub:i32}\n§B{b1:v:i32}\n§RET{r1:42}\n§/F{f1}\n§/M{m1}\n";
    let result = parse_source(source);
    assert!(!result.diagnostics.is_empty());
    let module = result.module.expect("module survives");
    let f = only_function(&module);
    assert!(f
        .body
        .iter()
        .any(|stmt| matches!(stmt, Stmt::Return(ret) if ret.value.is_some())));
}

#[test]
fn class_members_parse() {
    let module = parse_clean(
        "§M{m1:geo}\n§C{c1:Point:pub:Shape,IPrintable}\n§FL{fl1:x:pri:i32:0}\n§FL{fl2:y:pri:i32}\n§PR{pr1:Count:pub:i32:get:set}\n§CT{ct1:pub}\n§PA{p1:x0:i32}\n§A{a1:x:x0}\n§/CT{ct1}\n§F{f1:norm:pub:i32}\n§RET{r1:(+ (* x x) (* y y))}\n§/F{f1}\n§EV{ev1:moved:pub:MovedHandler}\n§/C{c1}\n§/M{m1}\n",
    );
    match &module.decls[0] {
        Decl::Class(class) => {
            assert_eq!(class.base.as_deref(), Some("Shape"));
            assert_eq!(class.interfaces, vec!["IPrintable".to_string()]);
            assert_eq!(class.members.len(), 6);
            assert!(matches!(class.members[0], Decl::Field(_)));
            assert!(matches!(class.members[2], Decl::Property(_)));
            assert!(matches!(class.members[3], Decl::Constructor(_)));
            assert!(matches!(class.members[5], Decl::Event(_)));
        }
        other => panic!("expected class, got {other:?}"),
    }
}

#[test]
fn enum_union_record_delegate_parse() {
    let module = parse_clean(
        "§M{m1:shapes}\n§E{e1:Color:pub}\n§EC{ec1:red:1}\n§EC{ec2:green}\n§/E{e1}\n§EX{ex1:Color}\n§EC{ec3:blue:-4}\n§/EX{ex1}\n§R{r1:Pair:pub}\n§FL{fl1:a:pub:i32}\n§FL{fl2:b:pub:i32}\n§/R{r1}\n§U{u1:Shape:pub}\n§UC{uc1:circle:f64}\n§UC{uc2:rect:f64:f64}\n§/U{u1}\n§D{d1:MovedHandler:pub:unit}\n§PA{p1:dx:i32}\n§/D{d1}\n§/M{m1}\n",
    );
    assert_eq!(module.decls.len(), 5);
    match &module.decls[0] {
        Decl::Enum(e) => {
            assert_eq!(e.variants[0].value, Some(1));
            assert_eq!(e.variants[1].value, None);
        }
        other => panic!("expected enum, got {other:?}"),
    }
    match &module.decls[1] {
        Decl::EnumExtension(ex) => {
            assert_eq!(ex.enum_name, "Color");
            assert_eq!(ex.variants[0].value, Some(-4));
        }
        other => panic!("expected enum extension, got {other:?}"),
    }
    match &module.decls[3] {
        Decl::Union(u) => {
            assert_eq!(u.cases[1].payload.len(), 2);
        }
        other => panic!("expected union, got {other:?}"),
    }
}

#[test]
fn duplicate_declaration_id_is_reported() {
    let source = "§M{m1:x}\n§F{f1:a:pub:i32}\n§RET{r1:1}\n§/F{f1}\n§F{f1:b:pub:i32}\n§RET{r2:2}\n§/F{f1}\n§/M{m1}\n";
    let result = parse_source(source);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::DuplicateId));
}

#[test]
fn nested_generic_types_split_shift_tokens() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:f:pub:unit}\n§B{b1:table:map<str,list<i64>>:(new Table)}\n§RET{r1}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Bind(bind) => {
            assert_eq!(
                bind.ty,
                TypeRef::Map(
                    Box::new(TypeRef::Str),
                    Box::new(TypeRef::List(Box::new(TypeRef::I64))),
                )
            );
        }
        other => panic!("expected bind, got {other:?}"),
    }
}

#[test]
fn bracket_dialect_is_accepted() {
    let module = parse_clean(
        "§M[m1:calc]\n§F[f1:add:pub:i32]\n§PA[p1:a:i32]\n§PA[p2:b:i32]\n§RET[r1:(+ a b)]\n§/F[f1]\n§/M[m1]\n",
    );
    let f = only_function(&module);
    assert_eq!(f.params.len(), 2);
}

#[test]
fn for_loop_with_step_and_foreach() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:sum:pub:i32}\n§PA{p1:xs:list<i32>}\n§B{b1:total:i32:0}\n§FOR{l1:i:0:10:2}\n§A{a1:total:(+ total i)}\n§/FOR{l1}\n§FE{l2:x:xs}→(consume x)\n§RET{r1:total}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[1] {
        Stmt::For(s) => {
            assert!(s.step.is_some());
            assert!(matches!(s.body, Body::Block(_)));
        }
        other => panic!("expected for, got {other:?}"),
    }
    match &f.body[2] {
        Stmt::Foreach(s) => assert!(matches!(s.body, Body::Arrow(_))),
        other => panic!("expected foreach, got {other:?}"),
    }
}

#[test]
fn try_catch_finally_parses() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:safe:pub:i32}\n§TRY{t1}\n§RET{r1:(risky)}\n§CATCH{t1:e:str}\n§PRN{p1:e}\n§FIN{t1}\n§PRN{p2:\"done\"}\n§/TRY{t1}\n§RET{r2:0}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Try(t) => {
            assert!(t.catch.is_some());
            assert!(t.finally.is_some());
        }
        other => panic!("expected try, got {other:?}"),
    }
}

#[test]
fn unclosed_tag_is_reported() {
    let source = "§M{m1:x}\n§F{f1:f:pub:i32}\n§RET{r1:1}\n§/M{m1}\n";
    let result = parse_source(source);
    assert!(result
        .diagnostics
        .iter()
        .any(|d| d.code == ErrorCode::UnclosedTag));
}

#[test]
fn string_op_compare_mode_parses() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:has:pub:bool}\n§PA{p1:a:str}\n§PA{p2:b:str}\n§RET{r1:(s.contains a b :ic)}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    match &f.body[0] {
        Stmt::Return(ret) => match &ret.value {
            Some(Expr::StringOp(op, args, mode, _)) => {
                assert_eq!(*op, calor_ir::StringOp::Contains);
                assert_eq!(args.len(), 2);
                assert_eq!(*mode, Some(calor_ir::CompareMode::IgnoreCase));
            }
            other => panic!("expected string op, got {other:?}"),
        },
        other => panic!("expected return, got {other:?}"),
    }
}

#[test]
fn lambda_cast_unchecked_await_parse() {
    let module = parse_clean(
        "§M{m1:x}\n§F{f1:f:pub:i64:async}\n§PA{p1:n:i64}\n§B{b1:g:i32:(cast i32 n)}\n§B{b2:h:i64:(unchecked (+ n 1))}\n§B{b3:k:fnty:(fn (a:i32 b:i32) (+ a b))}\n§B{b4:r:i32:(await (fetch))}\n§RET{r1:n}\n§/F{f1}\n§/M{m1}\n",
    );
    let f = only_function(&module);
    assert!(f.is_async);
    assert!(matches!(
        &f.body[0],
        Stmt::Bind(b) if matches!(b.value, Expr::Cast(TypeRef::I32, _, _))
    ));
    assert!(matches!(
        &f.body[1],
        Stmt::Bind(b) if matches!(b.value, Expr::Unchecked(_, _))
    ));
    assert!(matches!(
        &f.body[2],
        Stmt::Bind(b) if matches!(b.value, Expr::Lambda(_, _, _))
    ));
    assert!(matches!(
        &f.body[3],
        Stmt::Bind(b) if matches!(b.value, Expr::Await(_, _))
    ));
}
