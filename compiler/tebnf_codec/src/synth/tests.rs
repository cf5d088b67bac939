#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use tebnf_diagnostic::ErrorCode;

const MSG: &str = "\
GRAMMAR @Msg
    type = UNSIGNED INT_8;
    len = UNSIGNED INT_16;
    payload = BYTE{0, len};
END
";

fn try_plans(source: &str) -> Result<PlanSet, Vec<SynthesisError>> {
    let lexed = tebnf_lexer::lex(source);
    assert!(!lexed.has_errors(), "lex errors: {:?}", lexed.errors);
    let output = tebnf_parse::parse(&lexed.tokens);
    assert!(!output.has_errors(), "parse errors: {:?}", output.errors);
    synthesize(&output.tree, &output.elements, &lexed.tokens)
}

fn plans(source: &str) -> PlanSet {
    try_plans(source).unwrap()
}

fn codes(source: &str) -> Vec<ErrorCode> {
    try_plans(source)
        .unwrap_err()
        .iter()
        .map(|e| e.kind.code())
        .collect()
}

fn ops(steps: &[Step]) -> Vec<String> {
    steps
        .iter()
        .map(|s| format!("{}: {}", s.field, s.op))
        .collect()
}

#[test]
fn test_message_plan() {
    let plans = plans(MSG);
    let msg = plans.get("@Msg").unwrap();
    assert_eq!(
        ops(&msg.unmarshal),
        vec!["type: u8", "len: u16", "payload: resize to len", "payload: [u8]"]
    );
    assert_eq!(ops(&msg.marshal), vec!["type: u8", "len: u16", "payload: [u8]"]);
    assert_eq!(
        msg.total_size,
        TotalSize {
            constant: 3,
            dynamic: vec![DynamicTerm::FieldLen {
                field: "payload".into(),
                element_size: 1,
            }],
        }
    );
    assert_eq!(msg.trailing_field.as_deref(), Some("payload"));
    assert_eq!(msg.predicate, MatchExpr::Always);
}

#[test]
fn test_literal_compares_use_static_offsets() {
    let plans = plans(
        "GRAMMAR @Frame\n    tag = 0x7E;\n    len = UNSIGNED INT_8;\n    body = BYTE{0, len};\n    trailer = 0x7E;\nEND\n",
    );
    let frame = plans.get("@Frame").unwrap();
    assert_eq!(
        frame.predicate,
        MatchExpr::And(vec![
            MatchExpr::Compare {
                field: "tag".into(),
                offset: Some(0),
                bytes: vec![0x7E],
            },
            MatchExpr::Compare {
                field: "trailer".into(),
                offset: None,
                bytes: vec![0x7E],
            },
        ])
    );
    let stored: Vec<_> = frame.stored_fields().map(|f| f.name.as_str()).collect();
    assert_eq!(stored, vec!["len", "body"]);
}

#[test]
fn test_alternated_literals_become_a_choice() {
    let plans = plans("GRAMMAR @Line\n    text = BYTE{2}, \"AB\" | \"C\";\nEND\n");
    let line = plans.get("@Line").unwrap();
    let names: Vec<_> = line.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["text_0", "text_1"]);
    assert_eq!(
        line.fields[1].ops,
        vec![Op::Choice {
            alternatives: vec![b"AB".to_vec(), b"C".to_vec()],
        }]
    );
    assert_eq!(line.total_size.constant, 2);
    assert_eq!(
        line.total_size.dynamic,
        vec![DynamicTerm::FieldLen {
            field: "text_1".into(),
            element_size: 1,
        }]
    );
    assert!(matches!(line.predicate, MatchExpr::Or(ref options) if options.len() == 2));
}

#[test]
fn test_alternated_types_rejected() {
    assert_eq!(
        codes("GRAMMAR @A\n    x = INT_8 | INT_16;\nEND\n"),
        vec![ErrorCode::E3002]
    );
}

#[test]
fn test_constant_call_folds_into_total() {
    let plans = plans(
        "GRAMMAR @Outer\n    head = @Inner;\n    flag = BYTE;\nEND\nGRAMMAR @Inner\n    a = INT_32;\nEND\n",
    );
    let outer = plans.get("@Outer").unwrap();
    assert_eq!(ops(&outer.unmarshal), vec!["head: call @Inner", "flag: u8"]);
    assert_eq!(outer.total_size.constant, 5);
    assert!(outer.total_size.is_constant());
    let order: Vec<_> = plans.iter().map(|p| p.element.as_str()).collect();
    assert_eq!(order, vec!["@Outer", "@Inner"]);
}

#[test]
fn test_dynamic_call_adds_a_term() {
    let plans = plans(&format!("GRAMMAR @Pair\n    first = @Msg;\n    code = 1;\nEND\n{MSG}"));
    let pair = plans.get("@Pair").unwrap();
    assert_eq!(pair.total_size.constant, 1);
    assert_eq!(
        pair.total_size.dynamic,
        vec![DynamicTerm::Call {
            field: "first".into(),
            element: "@Msg".into(),
        }]
    );
    assert!(matches!(
        pair.predicate,
        MatchExpr::Compare { offset: None, .. }
    ));
}

#[test]
fn test_sibling_reference_inlined_under_its_name() {
    let plans = plans(
        "GRAMMAR @Rec\n    header = kind, size;\n    kind = BYTE;\n    size = UNSIGNED INT_16;\n    data = BYTE{0, size};\nEND\n",
    );
    let rec = plans.get("@Rec").unwrap();
    let names: Vec<_> = rec.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["kind", "size", "data"]);
}

#[test]
fn test_foreign_member_inlined_under_field_name() {
    let plans = plans(&format!("{MSG}GRAMMAR @Tagged\n    tag = @Msg.type;\nEND\n"));
    let tagged = plans.get("@Tagged").unwrap();
    assert_eq!(ops(&tagged.unmarshal), vec!["tag: u8"]);
}

#[test]
fn test_open_ended_field_must_be_last() {
    let source = "GRAMMAR @A\n    rest = BYTE{0,};\n    crc = INT_16;\nEND\n";
    let errors = try_plans(source).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].kind.code(), ErrorCode::E3002);
    assert_eq!(errors[0].token, "INT_16");
    assert_eq!(errors[0].line, 3);
}

#[test]
fn test_trailing_field_sized_by_grammar_size() {
    let plans = plans(
        "GRAMMAR @Frame = size;\n    size = UNSIGNED INT_16;\n    kind = BYTE;\n    data = BYTE{0,};\nEND\n",
    );
    let frame = plans.get("@Frame").unwrap();
    assert_eq!(frame.trailing_field.as_deref(), Some("data"));
    assert_eq!(
        frame.total_size.dynamic,
        vec![DynamicTerm::SizeSymbol("size".into())]
    );
    assert_eq!(
        ops(&frame.unmarshal)[2..].to_vec(),
        vec!["data: resize to size - offset", "data: [u8]"]
    );
}

#[test]
fn test_grammar_size_must_be_a_field() {
    assert_eq!(
        codes("GRAMMAR @A = size;\n    x = INT_8;\nEND\n"),
        vec![ErrorCode::E3001]
    );
}

#[test]
fn test_bound_must_come_first() {
    assert_eq!(
        codes("GRAMMAR @A\n    data = BYTE{0, len};\n    len = UNSIGNED INT_8;\nEND\n"),
        vec![ErrorCode::E3002]
    );
}

#[test]
fn test_call_to_open_ended_element_is_trailing() {
    let source = "GRAMMAR @Tail\n    rest = BYTE{0,};\nEND\nGRAMMAR @A\n    t = @Tail;\n    x = INT_8;\nEND\n";
    assert_eq!(codes(source), vec![ErrorCode::E3002]);
}

#[test]
fn test_alias_reuses_target_plan() {
    let plans = plans(&format!("{MSG}GRAMMAR @Copy AS @Msg END\n"));
    let copy = plans.get("@Copy").unwrap();
    assert_eq!(copy.alias_of.as_deref(), Some("@Msg"));
    assert!(copy.fields.is_empty());
    assert_eq!(copy.total_size.constant, 3);
    assert_eq!(plans.resolve("@Copy").unwrap().element, "@Msg");
}

#[test]
fn test_numeric_string_literal() {
    let plans = plans("GRAMMAR @Code\n    code = (INT_STR_3) 42;\nEND\n");
    let code = plans.get("@Code").unwrap();
    assert_eq!(
        code.fields[0].ops,
        vec![Op::Literal {
            bytes: b"042".to_vec(),
        }]
    );
}

#[test]
fn test_wide_integer_skips_leading_bytes() {
    let plans = plans("GRAMMAR @Big\n    big = INT_128;\nEND\n");
    let big = plans.get("@Big").unwrap();
    assert_eq!(ops(&big.unmarshal), vec!["big: skip[8]", "big: i64"]);
    assert_eq!(big.total_size.constant, 16);
}

#[test]
fn test_fixed_vectors_and_bitsets() {
    let plans = plans("GRAMMAR @V\n    shorts = INT_16{4};\n    flags = BIT{12};\nEND\n");
    let v = plans.get("@V").unwrap();
    assert_eq!(ops(&v.unmarshal), vec!["shorts: [i16; 4]", "flags: bytes[2]"]);
    assert_eq!(v.total_size.constant, 10);
}

#[test]
fn test_static_lines_become_actions() {
    let plans = plans("GRAMMAR @A\n    $n = $n + 1;\n    x = INT_8;\nEND\n");
    assert_eq!(
        plans.get("@A").unwrap().actions,
        vec![vec!["$n", "=", "$n", "1", "+"]]
    );
}

#[test]
fn test_fixed_total_overflow_is_an_error() {
    let at = Token::new(tebnf_ir::TokenKind::Typed, "BYTE", 4);
    let mut builder = Builder::new("@Huge", None);
    builder
        .push("a", vec![Op::Bytes { len: usize::MAX }], &at)
        .unwrap();
    let err = builder
        .push("b", vec![Op::Bytes { len: 1 }], &at)
        .unwrap_err();
    assert_eq!(err.kind, SynthesisErrorKind::SizeOverflow);
    assert_eq!(err.to_diagnostic().code, ErrorCode::E2008);
    assert_eq!(err.line, 4);
}
