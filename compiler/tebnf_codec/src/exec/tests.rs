#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

const MSG: &str = "\
GRAMMAR @Msg
    type = UNSIGNED INT_8;
    len = UNSIGNED INT_16;
    payload = BYTE{0, len};
END
";

fn plans(source: &str) -> PlanSet {
    let lexed = tebnf_lexer::lex(source);
    let output = tebnf_parse::parse(&lexed.tokens);
    assert!(!output.has_errors(), "parse errors: {:?}", output.errors);
    crate::synthesize(&output.tree, &output.elements, &lexed.tokens).unwrap()
}

fn msg(kind: i128, payload: &[u8]) -> Record {
    Record::new()
        .with("type", kind)
        .with("len", payload.len() as i128)
        .with("payload", payload.to_vec())
}

#[test]
fn test_message_round_trip() {
    let plans = plans(MSG);
    let codec = Codec::new(&plans);
    let record = msg(7, b"abc");
    let bytes = codec.marshal("@Msg", &record).unwrap();
    assert_eq!(bytes, vec![7, 0, 3, b'a', b'b', b'c']);
    assert_eq!(codec.total_size("@Msg", &record).unwrap(), 6);
    assert_eq!(codec.unmarshal("@Msg", &bytes).unwrap(), record);
}

#[test]
fn test_bound_field_must_agree() {
    let plans = plans(MSG);
    let record = msg(1, b"abc").with("len", 4_i128);
    assert_eq!(
        Codec::new(&plans).marshal("@Msg", &record).unwrap_err(),
        ExecError::LengthMismatch {
            field: "payload".into(),
            expected: 4,
            actual: 3,
        }
    );
}

#[test]
fn test_missing_field() {
    let plans = plans(MSG);
    let record = Record::new().with("type", 1_i128);
    assert!(matches!(
        Codec::new(&plans).marshal("@Msg", &record),
        Err(ExecError::MissingField { ref field, .. }) if field == "len"
    ));
}

#[test]
fn test_short_input() {
    let plans = plans(MSG);
    let err = Codec::new(&plans).unmarshal("@Msg", &[1, 0, 5, b'a']).unwrap_err();
    assert!(matches!(err, ExecError::Wire(WireError::ShortRead { needed: 5, remaining: 1 })));
}

#[test]
fn test_literals_and_predicate() {
    let plans = plans(
        "GRAMMAR @Frame\n    tag = 0x7E;\n    len = UNSIGNED INT_8;\n    body = BYTE{0, len};\n    trailer = 0x7E;\nEND\n",
    );
    let codec = Codec::new(&plans);
    let record = Record::new().with("len", 2_i128).with("body", b"hi".to_vec());
    let bytes = codec.marshal("@Frame", &record).unwrap();
    assert_eq!(bytes, vec![0x7E, 2, b'h', b'i', 0x7E]);
    assert!(codec.matches("@Frame", &bytes).unwrap());
    assert!(!codec.matches("@Frame", &[0x00, 0]).unwrap());
    assert_eq!(codec.unmarshal("@Frame", &bytes).unwrap(), record);

    let err = codec.unmarshal("@Frame", &[0x7E, 0, 0x7F]).unwrap_err();
    assert_eq!(
        err,
        ExecError::Wire(WireError::LiteralMismatch {
            expected: vec![0x7E],
            found: vec![0x7F],
        })
    );
}

#[test]
fn test_choice_keeps_matched_alternative() {
    let plans = plans("GRAMMAR @Line\n    text = BYTE{2}, \"AB\" | \"C\";\nEND\n");
    let codec = Codec::new(&plans);
    let record = codec.unmarshal("@Line", b"xyC").unwrap();
    assert_eq!(record.get("text_0"), Some(&Value::Bytes(b"xy".to_vec())));
    assert_eq!(record.get("text_1"), Some(&Value::Bytes(b"C".to_vec())));
    assert_eq!(codec.marshal("@Line", &record).unwrap(), b"xyC".to_vec());

    let unset = Record::new().with("text_0", b"zz".to_vec());
    assert_eq!(codec.marshal("@Line", &unset).unwrap(), b"zzAB".to_vec());
}

#[test]
fn test_nested_element() {
    let plans = plans(&format!("GRAMMAR @Pair\n    first = @Msg;\n    code = 1;\nEND\n{MSG}"));
    let codec = Codec::new(&plans);
    let record = Record::new().with("first", msg(2, b"z"));
    let bytes = codec.marshal("@Pair", &record).unwrap();
    assert_eq!(bytes, vec![2, 0, 1, b'z', 1]);
    assert_eq!(codec.total_size("@Pair", &record).unwrap(), 5);
    assert_eq!(codec.unmarshal("@Pair", &bytes).unwrap(), record);
}

#[test]
fn test_alias_uses_target_codec() {
    let plans = plans(&format!("{MSG}GRAMMAR @Copy AS @Msg END\n"));
    let codec = Codec::new(&plans);
    let record = msg(9, b"");
    assert_eq!(codec.marshal("@Copy", &record).unwrap(), vec![9, 0, 0]);
    assert!(matches!(
        codec.marshal("@Nope", &record),
        Err(ExecError::UnknownElement(_))
    ));
}

#[test]
fn test_trailing_field_bounded_by_grammar_size() {
    let plans = plans(
        "GRAMMAR @Frame = size;\n    size = UNSIGNED INT_16;\n    kind = BYTE;\n    data = BYTE{0,};\nEND\n",
    );
    let codec = Codec::new(&plans);
    let record = codec.unmarshal("@Frame", &[0, 5, 1, b'a', b'b', 0xFF]).unwrap();
    assert_eq!(record.get("data"), Some(&Value::Bytes(b"ab".to_vec())));
    assert_eq!(codec.total_size("@Frame", &record).unwrap(), 5);

    let err = codec.unmarshal("@Frame", &[0, 1, 1]).unwrap_err();
    assert_eq!(err, ExecError::NegativeRemaining("size".into()));
}

#[test]
fn test_trailing_field_takes_the_rest() {
    let plans = plans("GRAMMAR @Tail\n    kind = BYTE;\n    rest = INT_16{0,};\nEND\n");
    let codec = Codec::new(&plans);
    let record = codec.unmarshal("@Tail", &[3, 0xFF, 0xFE, 0, 2]).unwrap();
    assert_eq!(
        record.get("rest"),
        Some(&Value::List(vec![Value::Int(-2), Value::Int(2)]))
    );
    assert_eq!(codec.total_size("@Tail", &record).unwrap(), 5);
}

#[test]
fn test_wide_integer_zero_fills() {
    let plans = plans("GRAMMAR @Big\n    big = INT_128;\nEND\n");
    let codec = Codec::new(&plans);
    let record = Record::new().with("big", -2_i128);
    let bytes = codec.marshal("@Big", &record).unwrap();
    assert_eq!(bytes.len(), 16);
    assert_eq!(&bytes[..8], &[0_u8; 8]);
    assert_eq!(&bytes[8..], &[0xFF_u8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE]);
    assert_eq!(codec.unmarshal("@Big", &bytes).unwrap(), record);
}

#[test]
fn test_numeric_strings_and_floats() {
    let plans = plans("GRAMMAR @N\n    count = INT_STR_4;\n    ratio = FLOAT_64;\nEND\n");
    let codec = Codec::new(&plans);
    let record = Record::new().with("count", 42_i128).with("ratio", 0.5);
    let bytes = codec.marshal("@N", &record).unwrap();
    assert_eq!(&bytes[..4], b"0042");
    assert_eq!(&bytes[4..], &0.5_f64.to_be_bytes());
    assert_eq!(codec.unmarshal("@N", &bytes).unwrap(), record);

    let wide = Record::new().with("count", 12345_i128).with("ratio", 0.0);
    assert!(matches!(
        codec.marshal("@N", &wide),
        Err(ExecError::Wire(WireError::TooWide { .. }))
    ));
}
