#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use tebnf_ir::{RangeBound, RangeShape, Scalar, TypeKind, TypeRange};

/// Lex a grammar line and return the token with the given text.
fn token(source: &str, text: &str) -> Token {
    let output = tebnf_lexer::lex(source);
    let found = output
        .tokens
        .iter()
        .find(|t| t.text == text)
        .cloned()
        .unwrap();
    found
}

fn typed(text: &str) -> ResolvedType {
    sized_type(&Token::new(TokenKind::Typed, text, 1)).unwrap()
}

#[test]
fn test_infer_token_dispatch() {
    let source = "GRAMMAR @A\nx = UNSIGNED INT_16, y = 200, z = name;\nEND";
    let int = infer_token(&token(source, "INT_16")).unwrap().unwrap();
    assert_eq!(int.scalar(), Some(Scalar::U16));
    let lit = infer_token(&token(source, "200")).unwrap().unwrap();
    assert_eq!(lit.scalar(), Some(Scalar::I16));
    assert!(infer_token(&token(source, "name")).unwrap().is_none());
}

#[test]
fn test_unsigned_literal_from_source() {
    let source = "GRAMMAR @A\nx = UNSIGNED 200;\nEND";
    let ty = infer_token(&token(source, "200")).unwrap().unwrap();
    assert_eq!(ty.scalar(), Some(Scalar::U8));
}

#[test]
fn test_range_bounds_from_tokens() {
    let source = "GRAMMAR @A\npayload = BYTE{2, len}, more = BYTE{$n,};\nEND";
    assert_eq!(range_bound(&token(source, "2")).unwrap(), RangeBound::Literal(2));
    assert_eq!(
        range_bound(&token(source, "len")).unwrap(),
        RangeBound::Symbol("len".into())
    );
    assert_eq!(
        range_bound(&token(source, "$n")).unwrap(),
        RangeBound::StaticVar("$n".into())
    );
}

#[test]
fn test_negative_bound_rejected() {
    let token = Token::new(TokenKind::Dec, "-1", 2);
    assert_eq!(
        range_bound(&token).unwrap_err().kind,
        TypeErrorKind::InvalidRangeBound
    );
}

#[test]
fn test_range_multiplies_element_size() {
    let at = Token::new(TokenKind::RangeRight, "}", 1);
    let bytes = apply_range(&typed("BYTE"), TypeRange::fixed(0, 10), &at).unwrap();
    assert_eq!(bytes.kind, TypeKind::Vector(Scalar::U8));
    assert_eq!(bytes.byte_size, 10);
    assert_eq!(bytes.element_size(), 1);

    let shorts = apply_range(&typed("INT_16"), TypeRange::fixed(2, 4), &at).unwrap();
    assert_eq!(shorts.byte_size, 8);
    assert_eq!(shorts.element_size(), 2);
}

#[test]
fn test_bitset_range_keeps_raw_bits() {
    let at = Token::new(TokenKind::RangeRight, "}", 1);
    let bits = apply_range(&typed("BIT"), TypeRange::fixed(0, 12), &at).unwrap();
    assert_eq!(bits.kind, TypeKind::Bitset);
    assert_eq!(bits.resolved_bits, 12);
    assert_eq!(bits.byte_size, 2);
}

#[test]
fn test_symbolic_range_has_no_fixed_size() {
    let at = Token::new(TokenKind::RangeRight, "}", 1);
    let range = TypeRange::classify(
        Some(RangeBound::Literal(0)),
        Some(RangeBound::Symbol("len".into())),
        4,
    );
    let ty = apply_range(&typed("BYTE"), range, &at).unwrap();
    assert_eq!(ty.byte_size, 0);
    let range = ty.range.as_ref().unwrap();
    assert_eq!(range.shape, RangeShape::MinMax);
    assert!(range.is_open_ended());
    assert_eq!(range.symbolic_max(), Some("len"));
}

#[test]
fn test_inverted_range() {
    let at = Token::new(TokenKind::RangeRight, "}", 6);
    let err = apply_range(&typed("BYTE"), TypeRange::fixed(10, 5), &at).unwrap_err();
    assert_eq!(err.kind, TypeErrorKind::RangeInverted { min: 10, max: 5 });
    assert_eq!(err.line, 6);
    assert_eq!(err.to_diagnostic().code, tebnf_diagnostic::ErrorCode::E2005);
}

#[test]
fn test_range_on_numeric_string_rejected() {
    let at = Token::new(TokenKind::RangeRight, "}", 1);
    let err = apply_range(&typed("INT_STR_4"), TypeRange::fixed(0, 2), &at).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::RangeNotAllowed(_)));
}

#[test]
fn test_largest_literal_bound_fits() {
    let source = "GRAMMAR @A\nx = BYTE{0,18446744073709551615};\nEND";
    assert_eq!(
        range_bound(&token(source, "18446744073709551615")).unwrap(),
        RangeBound::Literal(u64::MAX)
    );
}

#[test]
fn test_range_size_overflow_is_an_error() {
    let at = Token::new(TokenKind::RangeRight, "}", 2);
    let err = apply_range(&typed("INT_32"), TypeRange::fixed(0, 4_611_686_018_427_387_904), &at)
        .unwrap_err();
    assert_eq!(err.kind, TypeErrorKind::SizeOverflow);
    assert_eq!(err.line, 2);
    assert_eq!(err.to_diagnostic().code, tebnf_diagnostic::ErrorCode::E2008);

    // one byte per element cannot overflow
    let bytes = apply_range(&typed("BYTE"), TypeRange::fixed(0, 4_611_686_018_427_387_904), &at).unwrap();
    assert_eq!(bytes.byte_size, 4_611_686_018_427_387_904);
}

#[test]
fn test_bitset_range_beyond_u32_is_an_error() {
    let at = Token::new(TokenKind::RangeRight, "}", 1);
    let err = apply_range(&typed("BIT"), TypeRange::fixed(0, 1 << 40), &at).unwrap_err();
    assert_eq!(err.kind, TypeErrorKind::SizeOverflow);
}
