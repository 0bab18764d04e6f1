use pretty_assertions::assert_eq;
use proptest::prelude::*;

use calor_ir::{strip_spans, Module};

use super::*;

fn parse_clean(source: &str) -> Module {
    let lexed = calor_lexer::lex(source);
    assert!(lexed.diagnostics.is_empty(), "lex: {:?}", lexed.diagnostics);
    let parsed = calor_parse::parse(&lexed.tokens);
    assert!(
        parsed.diagnostics.is_empty(),
        "parse: {:?}",
        parsed.diagnostics
    );
    parsed.module.expect("module")
}

/// `parse(emit_calor(parse(S)))` is structurally equal to `parse(S)`.
fn assert_round_trip(source: &str) {
    let mut first = parse_clean(source);
    let emitted = emit_calor(&first);
    let mut second = parse_clean(&emitted);
    strip_spans(&mut first);
    strip_spans(&mut second);
    assert_eq!(first, second, "round trip changed the tree for:\n{emitted}");
}

#[test]
fn round_trip_simple_function() {
    assert_round_trip(
        "§M{m1:calc}\n§F{f1:add:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§RET{r1:(+ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_contracts_and_effects() {
    assert_round_trip(
        "§M{m1:calc}\n§F{f1:div:pub:i32}\n§PA{p1:a:i32}\n§PA{p2:b:i32}\n§REQ{q1:(!= b 0):\"b must be nonzero\"}\n§ENS{e1:(>= result 0)}\n§EFF{x1:io,mut}\n§RET{r1:(/ a b)}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_control_flow_forms() {
    assert_round_trip(
        "§M{m1:x}\n§F{f1:pick:pub:i32}\n§PA{p1:a:i32}\n§IF{i1:(> a 0)}→a\n§IF{i2:(< a 0)}\n§RET{r1:(- 0 a)}\n§EL{i2}\n§RET{r2:0}\n§/IF{i2}\n§WH{w1:(> a 10)}\n§A{a1:a:(- a 1)}\n§/WH{w1}\n§DW{d1:(< a 3)}→(advance a)\n§FOR{l1:i:0:10:2}\n§PRN{p2:i}\n§/FOR{l1}\n§FE{l2:x:(items)}→(consume x)\n§RET{r3:a}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_try_and_collections() {
    assert_round_trip(
        "§M{m1:x}\n§F{f1:safe:pub:i32}\n§PA{p1:xs:list<i32>}\n§TRY{t1}\n§CO{c1:add:xs:1}\n§CO{c2:insert:xs:0:2}\n§CATCH{t1:e:str}\n§PRN{p2:e}\n§FIN{t1}\n§CO{c3:clear:xs}\n§/TRY{t1}\n§RET{r1:0}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_match_statement_and_patterns() {
    assert_round_trip(
        "§M{m1:x}\n§F{f1:describe:pub:str}\n§PA{p1:v:opt<i32>}\n§MA{m2:v}\n§CS{c1:(some n):(> n 0)}→\"positive\"\n§CS{c2:(some (ge 100))}→\"big\"\n§CS{c3:(none)}→\"missing\"\n§CS{c4:_}\n§RET{r1:\"other\"}\n§/CS{c4}\n§/MA{m2}\n§RET{r2:\"done\"}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_match_expression_marker() {
    let source = "§M{m1:x}\n§F{f1:v:pub:i32}\n§PA{p1:o:opt<i32>}\n§RET{r1}\n§MX{x1:o}\n§CS{c1:(some n)}→n\n§CS{c2:(none)}→0\n§/MX{x1}\n§/RET{r1}\n§/F{f1}\n§/M{m1}\n";
    assert_round_trip(source);
    // The expression-position marker survives emission.
    let emitted = emit_calor(&parse_clean(source));
    assert!(emitted.contains("§MX{x1:o}"));
    assert!(emitted.contains("§/MX{x1}"));
}

#[test]
fn round_trip_declarations() {
    assert_round_trip(
        "§M{m1:shapes}\n§E{e1:Color:pub}\n§EC{ec1:red:1}\n§EC{ec2:green}\n§/E{e1}\n§EX{ex1:Color}\n§EC{ec3:blue:-4}\n§/EX{ex1}\n§R{r1:Pair:pub}\n§FL{fl1:a:pub:i32}\n§FL{fl2:b:pub:i32}\n§/R{r1}\n§U{u1:Shape:pub}\n§UC{uc1:circle:f64}\n§UC{uc2:rect:f64:f64}\n§/U{u1}\n§D{d1:Moved:pub:unit}\n§PA{p1:dx:i32}\n§/D{d1}\n§C{c1:Point:pub:Base,IPrint}\n§FL{fl3:x:pri:i32:0}\n§PR{pr1:Count:pub:i32:get:set}\n§CT{ct1:pub}\n§PA{p2:x0:i32}\n§A{a1:x:x0}\n§/CT{ct1}\n§EV{ev1:moved:pub:Moved}\n§/C{c1}\n§I{i1:IPrint:pub}\n§F{f1:show:pub:unit}\n§/F{f1}\n§/I{i1}\n§/M{m1}\n",
    );
}

#[test]
fn round_trip_string_ops_and_literals() {
    assert_round_trip(
        "§M{m1:x}\n§F{f1:f:pub:str}\n§PA{p1:a:str}\n§PA{p2:b:str}\n§B{b1:has:bool:(s.contains a b :ic)}\n§B{b2:c:char:'x'}\n§B{b3:t:str:\"tab\\there\"}\n§B{b4:f2:f64:3.5}\n§RET{r1:(s.concat a b)}\n§/F{f1}\n§/M{m1}\n",
    );
}

#[test]
fn user_ids_pass_through_verbatim() {
    let source = "§M{mod77:calc}\n§F{fn42:add:pub:i32}\n§PA{par9:a:i32}\n§RET{ret3:a}\n§/F{fn42}\n§/M{mod77}\n";
    let emitted = emit_calor(&parse_clean(source));
    for id in ["mod77", "fn42", "par9", "ret3"] {
        assert!(emitted.contains(id), "lost id `{id}` in:\n{emitted}");
    }
}

#[test]
fn canonical_output_is_a_fixed_point() {
    let source = "§M{m1:x}\n§F{f1:f:pub:i32}\n§PA{p1:a:i32}\n§IF{i1:(> a 0)}→a\n§RET{r1:(- 0 a)}\n§/F{f1}\n§/M{m1}\n";
    let once = emit_calor(&parse_clean(source));
    let twice = emit_calor(&parse_clean(&once));
    assert_eq!(once, twice);
}

#[test]
fn synthesized_nodes_mint_fresh_ids() {
    use calor_ir::{
        Bind, Expr, Literal, NodeId, Return, Span, Stmt, TypeRef, Visibility,
    };

    // A migrated function with no user-authored IDs.
    let module = Module {
        id: NodeId::Synthesized,
        name: "migrated".to_string(),
        decls: vec![calor_ir::Decl::Function(calor_ir::Function {
            id: NodeId::Synthesized,
            name: "f".to_string(),
            vis: Visibility::Public,
            ret: TypeRef::I32,
            is_async: false,
            is_static: false,
            params: Vec::new(),
            contracts: Vec::new(),
            effects: None,
            body: vec![
                Stmt::Bind(Bind {
                    id: NodeId::Synthesized,
                    name: "v".to_string(),
                    ty: TypeRef::I32,
                    value: Expr::Literal(Literal::Int(1), Span::DUMMY),
                    span: Span::DUMMY,
                }),
                Stmt::Return(Return {
                    id: NodeId::Synthesized,
                    value: Some(Expr::Reference("v".to_string(), Span::DUMMY)),
                    span: Span::DUMMY,
                }),
            ],
            span: Span::DUMMY,
        })],
        span: Span::DUMMY,
    };

    let emitted = emit_calor(&module);
    assert!(emitted.contains("§M{g1:migrated}"));
    assert!(emitted.contains("§F{g2:f:pub:i32}"));
    // The emitted text is valid Calor.
    let reparsed = parse_clean(&emitted);
    assert_eq!(reparsed.name, "migrated");
}

fn arb_arith_expr() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        (0i64..100).prop_map(|v| v.to_string()),
        Just("a".to_string()),
        Just("b".to_string()),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        (
            prop_oneof![Just("+"), Just("-"), Just("*"), Just("/"), Just("%")],
            inner.clone(),
            inner,
        )
            .prop_map(|(op, lhs, rhs)| format!("({op} {lhs} {rhs})"))
    })
}

proptest! {
    /// Property: any parse-clean arithmetic body survives the round trip.
    #[test]
    fn round_trip_generated_arithmetic(expr in arb_arith_expr()) {
        let source = format!(
            "§M{{m1:x}}\n§F{{f1:f:pub:i32}}\n§PA{{p1:a:i32}}\n§PA{{p2:b:i32}}\n§RET{{r1:{expr}}}\n§/F{{f1}}\n§/M{{m1}}\n"
        );
        let mut first = parse_clean(&source);
        let emitted = emit_calor(&first);
        let mut second = parse_clean(&emitted);
        strip_spans(&mut first);
        strip_spans(&mut second);
        prop_assert_eq!(first, second);
    }
}
