// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests over a whole protocol description.
//!
//! Each test runs every stage on one source: lexing, parsing and
//! resolution, codec synthesis, then either source emission or the codec
//! interpreter.

use pretty_assertions::assert_eq;
use tebnf_codec::exec::{Codec, Record, Value};

const PROTOCOL: &str = "\
## Heartbeat protocol ##
GRAMMAR @Header
    magic = 0xCAFE;
    kind = UNSIGNED INT_8;
    len = UNSIGNED INT_16;
END

GRAMMAR @Beat = total;
    total = UNSIGNED INT_16;
    head = @Header;
    seq = UNSIGNED INT_32;
    body = BYTE{0,};
END

GRAMMAR @Echo AS @Beat END

INPUT @Net = TCP_IP; END
OUTPUT @Out = TCP_IP; END

ACTIONS @Bump($n)
    $count = $count + $n;
END

STATES @Main
    Idle | @Beat | @Net | Busy | @Bump(1) | @Out ;
    Busy | $count > 10 | @Net | Idle | | ;
         | | @Net | Busy | @Echo | @Out ;
END
";

fn plans() -> tebnf_codec::PlanSet {
    let lexed = tebnf_lexer::lex(PROTOCOL);
    assert!(!lexed.has_errors(), "{:?}", lexed.errors);
    let parsed = tebnf_parse::parse(&lexed.tokens);
    assert!(!parsed.has_errors(), "{:?}", parsed.errors);
    tebnf_codec::synthesize(&parsed.tree, &parsed.elements, &lexed.tokens).unwrap()
}

#[test]
fn test_protocol_compiles() {
    let compilation = tebnfc::compile_source(PROTOCOL, 0).unwrap();
    let paths: Vec<String> = compilation
        .files
        .iter()
        .map(|f| f.path.display().to_string())
        .collect();
    assert_eq!(
        paths,
        vec!["header.rs", "beat.rs", "echo.rs", "lib.rs", "states.rs"]
    );

    let beat = &compilation.files[1].contents;
    assert!(beat.contains("use crate::Header;"), "{beat}");
    assert!(beat.contains("pub body: Vec<u8>,"), "{beat}");
    let states = &compilation.files[4].contents;
    assert!(states.contains("pub enum MainState {\n    Idle,\n    Busy,\n    BusyElse,\n}"), "{states}");
}

#[test]
fn test_frame_round_trips_through_interpreter() {
    let plans = plans();
    let codec = Codec::new(&plans);
    let header = Record::new().with("kind", 2_i128).with("len", 3_i128);
    let beat = Record::new()
        .with("total", 15_i128)
        .with("head", header)
        .with("seq", 7_i128)
        .with("body", b"abcd".to_vec());

    let bytes = codec.marshal("@Beat", &beat).unwrap();
    assert_eq!(
        bytes,
        vec![0, 15, 0xCA, 0xFE, 2, 0, 3, 0, 0, 0, 7, b'a', b'b', b'c', b'd']
    );
    assert_eq!(codec.unmarshal("@Beat", &bytes).unwrap(), beat);
    assert_eq!(codec.unmarshal("@Echo", &bytes).unwrap(), beat);
}

#[test]
fn test_size_field_bounds_the_trailing_body() {
    let plans = plans();
    let codec = Codec::new(&plans);
    let mut input = vec![0, 12, 0xCA, 0xFE, 1, 0, 0, 0, 0, 0, 1, b'x', b'y'];
    input.extend_from_slice(b"next frame");
    let beat = codec.unmarshal("@Beat", &input).unwrap();
    assert_eq!(beat.get("body"), Some(&Value::Bytes(b"x".to_vec())));
    assert!(codec.matches("@Header", &input[2..]).unwrap());
    assert!(!codec.matches("@Header", &input).unwrap());
}
