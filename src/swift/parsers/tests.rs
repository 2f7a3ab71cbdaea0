use super::Parser;
use crate::swift::error::DemangleError;
use crate::swift::node_kind::NodeKind;
use crate::swift::store::{NodeId, NodeStore, RawPayload};
use std::fmt::Write;

const JET_UI_SYMBOL: &str = "$s5JetUI14LayoutTextViewPAAE22estimatedNumberOfLines4fromSiSo14JUMeasurementsV_tFTf4xn_n";

fn write_tree(store: &NodeStore, node: NodeId, output: &mut String) {
    output.push_str(store.kind(node).name());

    match store.get(node).payload {
        RawPayload::Text(_) => {
            write!(output, ":{:?}", store.text(node).unwrap()).unwrap();
        }
        RawPayload::Index(index) => write!(output, ":{index}").unwrap(),
        RawPayload::Children { .. } => {
            let children = store.children(node);

            if let Some((&first, rest)) = children.split_first() {
                output.push('(');
                write_tree(store, first, output);

                for &child in rest {
                    output.push_str(", ");
                    write_tree(store, child, output);
                }

                output.push(')');
            }
        }
    }
}

fn tree(store: &NodeStore, node: NodeId) -> String {
    let mut output = String::new();

    write_tree(store, node, &mut output);

    output
}

#[track_caller]
fn check_symbol(input: &str, expected: &str) {
    let mut store = NodeStore::default();
    let node = Parser::new(input, &mut store, 768).parse_symbol().unwrap();

    assert_eq!(tree(&store, node), expected);
}

#[track_caller]
fn check_type(input: &str, expected: &str) {
    let mut store = NodeStore::default();
    let node = Parser::new(input, &mut store, 768).parse_type().unwrap();

    assert_eq!(tree(&store, node), expected);
}

#[track_caller]
fn check_failure(input: &str, expected_offset: usize) {
    let mut store = NodeStore::default();
    let error = Parser::new(input, &mut store, 768).parse_symbol().unwrap_err();

    assert!(matches!(error, DemangleError::ParseFailure { .. }), "{error:?}");
    assert_eq!(error.offset(), expected_offset);
}

#[test]
fn test_standard_types() {
    check_symbol(
        "$sSiD",
        r#"Global(TypeMangling(Type(Structure(Module:"Swift", Identifier:"Int"))))"#,
    );

    check_symbol(
        "$sSiD.foo",
        r#"Global(TypeMangling(Type(Structure(Module:"Swift", Identifier:"Int"))), Suffix:".foo")"#,
    );

    check_symbol(
        "$sBi64_D",
        r#"Global(TypeMangling(Type(BuiltinTypeName:"Builtin.Int64")))"#,
    );
}

#[test]
fn test_identifiers() {
    check_symbol(
        "$s4main6FooBarV03BazC0VD",
        r#"Global(TypeMangling(Type(Structure(Structure(Module:"main", Identifier:"FooBar"), Identifier:"BazBar"))))"#,
    );

    check_symbol(
        "$s4main0010mnchen_DyaVD",
        r#"Global(TypeMangling(Type(Structure(Module:"main", Identifier:"münchen"))))"#,
    );
}

#[test]
fn test_bound_generics() {
    check_type(
        "SaySiG",
        r#"Type(BoundGenericStructure(Type(Structure(Module:"Swift", Identifier:"Array")), TypeList(Type(Structure(Module:"Swift", Identifier:"Int")))))"#,
    );

    check_symbol(
        "$s4main3FooV3BarVySi_SSGD",
        concat!(
            "Global(TypeMangling(Type(BoundGenericStructure(Type(Structure(BoundGenericStructure(",
            r#"Type(Structure(Module:"main", Identifier:"Foo")), "#,
            r#"TypeList(Type(Structure(Module:"Swift", Identifier:"Int")))), Identifier:"Bar")), "#,
            r#"TypeList(Type(Structure(Module:"Swift", Identifier:"String")))))))"#,
        ),
    );
}

#[test]
fn test_tuples() {
    let element = r#"TupleElement(Type(Structure(Module:"a", Identifier:"b")))"#;
    let expected = format!("Global(TypeMangling(Type(Tuple({element}, {element}, {element}))))");

    check_symbol("$s1a1bV_ACACtD", &expected);
    check_symbol("$s1a1bV_AcCtD", &expected);
    check_symbol("$s1a1bV_A2CtD", &expected);

    let int = r#"TupleElement(Type(Structure(Module:"Swift", Identifier:"Int")))"#;

    check_symbol(
        "$sSi_S2itD",
        &format!("Global(TypeMangling(Type(Tuple({int}, {int}, {int}))))"),
    );
}

#[test]
fn test_substitutions_are_shared() {
    let mut store = NodeStore::default();
    let global = Parser::new("$s1a1bV_ACACtD", &mut store, 768).parse_symbol().unwrap();
    let tuple = store.first_child(store.first_child(store.first_child(global).unwrap()).unwrap()).unwrap();
    let first_type = store.first_child(store.first_child(tuple).unwrap());

    assert_eq!(store.kind(tuple), NodeKind::Tuple);
    assert_eq!(store.children(tuple).len(), 3);

    for &element in store.children(tuple) {
        assert_eq!(store.first_child(element), first_type);
    }
}

#[test]
fn test_entities() {
    let int = r#"Type(Structure(Module:"Swift", Identifier:"Int"))"#;
    let unit = "Type(Tuple)";

    check_symbol(
        "$s4main3fooSivg",
        &format!(r#"Global(Getter(Variable(Module:"main", Identifier:"foo", {int})))"#),
    );

    check_symbol(
        "$s4main3fooyyF",
        &format!(
            r#"Global(Function(Module:"main", Identifier:"foo", Type(FunctionType(ArgumentTuple({unit}), ReturnType({unit})))))"#
        ),
    );

    check_symbol(
        "$s4main3fooyySiF",
        &format!(
            r#"Global(Function(Module:"main", Identifier:"foo", LabelList, Type(FunctionType(ArgumentTuple({int}), ReturnType({unit})))))"#
        ),
    );

    check_symbol(
        "$s4main3FooVACycfC",
        &format!(
            r#"Global(Allocator(Structure(Module:"main", Identifier:"Foo"), Type(FunctionType(ArgumentTuple({unit}), ReturnType(Type(Structure(Module:"main", Identifier:"Foo")))))))"#
        ),
    );

    let function_type = format!("Type(FunctionType(ArgumentTuple({unit}), ReturnType({unit})))");

    check_symbol(
        "$s4main3fooyyFyycfU_",
        &format!(
            r#"Global(ExplicitClosure(Function(Module:"main", Identifier:"foo", {function_type}), Number:0, {function_type}))"#
        ),
    );
}

#[test]
fn test_generic_signatures() {
    let param = "Type(DependentGenericParamType(Index:0, Index:0))";

    check_symbol(
        "$s4main3fooyyxSQRzlF",
        &format!(
            concat!(
                r#"Global(Function(Module:"main", Identifier:"foo", LabelList, Type(DependentGenericType("#,
                "DependentGenericSignature(DependentGenericParamCount:1, DependentGenericConformanceRequirement({param}, ",
                r#"Type(Protocol(Module:"Swift", Identifier:"Equatable")))), "#,
                "Type(FunctionType(ArgumentTuple({param}), ReturnType(Type(Tuple))))))))",
            ),
            param = param,
        ),
    );
}

#[test]
fn test_specializations() {
    check_symbol(
        "$s4main3fooyyxlFSi_Tg5",
        concat!(
            "Global(GenericSpecialization(SpecializationPassID:5, ",
            r#"GenericSpecializationParam(Type(Structure(Module:"Swift", Identifier:"Int")))), "#,
            r#"Function(Module:"main", Identifier:"foo", LabelList, Type(DependentGenericType("#,
            "DependentGenericSignature(DependentGenericParamCount:1), ",
            "Type(FunctionType(ArgumentTuple(Type(DependentGenericParamType(Index:0, Index:0))), ",
            "ReturnType(Type(Tuple))))))))",
        ),
    );

    check_symbol(
        JET_UI_SYMBOL,
        concat!(
            "Global(FunctionSignatureSpecialization(SpecializationPassID:4, ",
            "FunctionSignatureSpecializationParam(FunctionSignatureSpecializationParamKind:256), ",
            "FunctionSignatureSpecializationParam), ",
            r#"Function(Extension(Module:"JetUI", Protocol(Module:"JetUI", Identifier:"LayoutTextView")), "#,
            r#"Identifier:"estimatedNumberOfLines", LabelList(Identifier:"from"), "#,
            "Type(FunctionType(ArgumentTuple(Type(Tuple(TupleElement(",
            r#"Type(Structure(Module:"__C", Identifier:"JUMeasurements")))))), "#,
            r#"ReturnType(Type(Structure(Module:"Swift", Identifier:"Int")))))))"#,
        ),
    );
}

#[test]
fn test_spans() {
    let mut store = NodeStore::default();
    let global = Parser::new(JET_UI_SYMBOL, &mut store, 768).parse_symbol().unwrap();
    let global_span = store.get(global).span;
    let function = store.child(global, 1).unwrap();
    let function_span = store.get(function).span;
    let extension_span = store.get(store.first_child(function).unwrap()).span;

    assert_eq!((global_span.start, global_span.end), (0, JET_UI_SYMBOL.len()));
    assert_eq!((function_span.start, function_span.end), (2, 81));
    assert_eq!((extension_span.start, extension_span.end), (2, 28));
}

#[test]
fn test_failures() {
    check_failure("", 0);
    check_failure("Si", 0);
    check_failure("$s4main3fooQ", 11);
    check_failure("$sD", 3);
    check_failure(&JET_UI_SYMBOL[..JET_UI_SYMBOL.len() - 3], JET_UI_SYMBOL.len() - 3);
}

#[test]
fn test_failure_leaves_store_untouched() {
    let mut store = NodeStore::default();

    Parser::new("$sSiD", &mut store, 768).parse_symbol().unwrap();

    let len = store.len();

    Parser::new("$s4main3fooQ", &mut store, 768).parse_symbol().unwrap_err();

    assert_eq!(store.len(), len);
}

#[test]
fn test_recursion_limit() {
    let input = format!("$s{}Si{}D", "Say".repeat(1000), "G".repeat(1000));
    let mut store = NodeStore::default();
    let error = Parser::new(&input, &mut store, 768).parse_symbol().unwrap_err();

    assert!(matches!(error, DemangleError::RecursionLimitExceeded { limit: 768, .. }));
    assert_eq!(store.len(), 0);
}
