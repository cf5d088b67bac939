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

fn render(source: &str, element: &str) -> String {
    render_element(plans(source).get(element).unwrap())
}

#[test]
fn test_message_source() {
    let expected = "\
//! Codec for `@Msg`, generated by tebnfc.

use tebnf_codec::wire::{self, Reader, WireError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Msg {
    pub r#type: u8,
    pub len: u16,
    pub payload: Vec<u8>,
}

impl Msg {
    /// Bytes this value occupies when marshalled.
    pub fn total_size(&self) -> usize {
        3 + self.payload.len()
    }

    pub fn marshal(&self, out: &mut Vec<u8>) -> Result<(), WireError> {
        wire::write_int(out, i128::from(self.r#type), 1);
        wire::write_int(out, i128::from(self.len), 2);
        out.extend_from_slice(&self.payload);
        Ok(())
    }

    pub fn unmarshal(r: &mut Reader<'_>) -> Result<Self, WireError> {
        let r#type = r.int(1, false)? as u8;
        let len = r.int(2, false)? as u16;
        let payload_count = usize::try_from(len).unwrap_or_default();
        let payload = r.bytes(payload_count)?;
        Ok(Self { r#type, len, payload })
    }

    /// Whether `input` holds this element's literals at their fixed offsets.
    pub fn matches(input: &[u8]) -> bool {
        true
    }
}
";
    assert_eq!(render(MSG, "@Msg"), expected);
}

#[test]
fn test_alias_is_a_type_alias() {
    let source = render(&format!("{MSG}GRAMMAR @MsgCopy AS @Msg END\n"), "@MsgCopy");
    assert!(source.ends_with("pub type MsgCopy = crate::Msg;\n"), "{source}");
}

#[test]
fn test_literals_choices_and_predicate() {
    let source = render(
        "GRAMMAR @Frame\n    tag = 0x7E;\n    body = BYTE{4};\n    eol = \"AB\" | \"C\";\nEND\n",
        "@Frame",
    );
    assert!(source.contains("out.extend_from_slice(&[0x7E]);"), "{source}");
    assert!(source.contains("r.expect(&[0x7E])?;"), "{source}");
    assert!(source.contains("let eol = r.choose(&[&[0x41, 0x42][..], &[0x43][..]])?;"), "{source}");
    assert!(
        source.contains(
            "input.get(0..1) == Some(&[0x7E][..]) && (input.get(5..7) == Some(&[0x41, 0x42][..]) || input.get(5..6) == Some(&[0x43][..]))"
        ),
        "{source}"
    );
    assert!(source.contains("pub eol: Vec<u8>,"), "{source}");
    assert!(!source.contains("pub tag"), "{source}");
}

#[test]
fn test_trailing_field_and_actions() {
    let source = render(
        "GRAMMAR @Frame = size;\n    $seen = $seen + 1;\n    size = UNSIGNED INT_16;\n    data = INT_16{0,};\nEND\n",
        "@Frame",
    );
    assert!(source.contains("pub const ACTIONS: &[&str] = &[\"$seen = $seen 1 +\"];"), "{source}");
    assert!(source.contains("let start = r.position();"), "{source}");
    assert!(
        source.contains(
            "let data_count = usize::try_from(size).unwrap_or_default().saturating_sub(r.position() - start) / 2;"
        ),
        "{source}"
    );
    assert!(
        source.contains("let data = (0..data_count).map(|_| r.int(2, true).map(|v| v as i16)).collect::<Result<Vec<_>, _>>()?;"),
        "{source}"
    );
    assert!(source.contains("usize::try_from(self.size).unwrap_or_default()"), "{source}");
    assert!(source.contains("wire::write_int(out, i128::from(*v), 2);"), "{source}");
}

#[test]
fn test_nested_call_imports_callee() {
    let source = render(
        &format!("GRAMMAR @Pair\n    first = @Msg;\n    big = INT_128;\nEND\n{MSG}"),
        "@Pair",
    );
    assert!(source.contains("use crate::Msg;"), "{source}");
    assert!(source.contains("pub first: Msg,"), "{source}");
    assert!(source.contains("let first = Msg::unmarshal(r)?;"), "{source}");
    assert!(source.contains("self.first.marshal(out)?;"), "{source}");
    assert!(source.contains("16 + self.first.total_size()"), "{source}");
    assert!(source.contains("wire::write_zeros(out, 8);"), "{source}");
    assert!(source.contains("r.skip(8)?;"), "{source}");
    assert!(source.contains("pub big: i64,"), "{source}");
}

#[test]
fn test_lib_lists_modules() {
    let plans = plans(&format!("{MSG}GRAMMAR @MsgCopy AS @Msg END\n"));
    assert_eq!(
        render_lib(&plans, &["states"]),
        "//! Codecs generated by tebnfc.\n\npub mod msg;\npub mod msg_copy;\npub mod states;\n\npub use msg::Msg;\npub use msg_copy::MsgCopy;\n"
    );
}
