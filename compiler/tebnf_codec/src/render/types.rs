//! Rust spelling of plan types and names.

use tebnf_ir::{pascal_case, snake_case, Scalar};

use crate::{Elem, Op};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "box", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "try", "type", "unsafe",
    "use", "where", "while", "yield",
];

/// `@MsgHeader` → `MsgHeader`.
pub fn type_name(element: &str) -> String {
    pascal_case(element)
}

/// `@MsgHeader` → `msg_header`, the module holding the element's codec.
pub fn module_name(element: &str) -> String {
    escape(snake_case(element))
}

/// A field name as a Rust identifier.
pub fn field_ident(field: &str) -> String {
    escape(snake_case(field))
}

fn escape(ident: String) -> String {
    if KEYWORDS.contains(&ident.as_str()) {
        format!("r#{ident}")
    } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{ident}")
    } else {
        ident
    }
}

pub(super) fn int_type(bytes: usize, signed: bool) -> Scalar {
    let bits = u32::try_from(bytes * 8).unwrap_or(64);
    Scalar::int(bits, signed)
}

pub(super) fn float_type(bytes: usize) -> Scalar {
    if bytes <= 4 {
        Scalar::F32
    } else {
        Scalar::F64
    }
}

pub(super) fn elem_type(elem: Elem) -> Scalar {
    if elem.float {
        float_type(elem.bytes)
    } else {
        int_type(elem.bytes, elem.signed)
    }
}

/// The Rust type of the value an op stores.
pub(super) fn rust_type(op: &Op) -> Option<String> {
    let ty = match op {
        Op::Int { bytes, signed } => int_type(*bytes, *signed).to_string(),
        Op::Float { bytes } => float_type(*bytes).to_string(),
        Op::Bytes { .. } | Op::Choice { .. } => "Vec<u8>".to_owned(),
        Op::Vector { elem, .. } => format!("Vec<{}>", elem_type(*elem)),
        Op::NumericString { float: true, .. } => "f64".to_owned(),
        Op::NumericString { float: false, .. } => "i64".to_owned(),
        Op::Call { element } => type_name(element),
        Op::Literal { .. }
        | Op::ResizeTo { .. }
        | Op::ResizeRemaining { .. }
        | Op::DiffBytes { .. } => return None,
    };
    Some(ty)
}

/// `&[0x7E, 0x01]`
pub(super) fn byte_slice(bytes: &[u8]) -> String {
    let items: Vec<String> = bytes.iter().map(|b| format!("0x{b:02X}")).collect();
    format!("&[{}]", items.join(", "))
}
