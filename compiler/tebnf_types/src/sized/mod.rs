//! Sized type keywords.

use tebnf_diagnostic::{Diagnostic, ErrorCode, Location};
use tebnf_ir::{ResolvedType, Scalar, Token, TypeKind};

use crate::{TypeError, TypeErrorKind};

/// Width of `INT` and `FLOAT` without a suffix.
const DEFAULT_WIDTH: u32 = 32;
const MAX_NATIVE_WIDTH: u32 = 64;

/// Split `INT_16` into `("INT", Some(16))`, `INT_STR` into `("INT_STR", None)`.
///
/// A digit suffix too long for `u32` is an error rather than no width.
fn split_width(text: &str) -> Result<(&str, Option<u32>), TypeErrorKind> {
    match text.rsplit_once('_') {
        Some((base, width)) if !width.is_empty() && width.bytes().all(|b| b.is_ascii_digit()) => {
            let width = width.parse().map_err(|_| TypeErrorKind::WidthOverflow)?;
            Ok((base, Some(width)))
        }
        _ => Ok((text, None)),
    }
}

fn dropped_bytes(bits: u32) -> usize {
    if bits > MAX_NATIVE_WIDTH {
        (bits.div_ceil(8) - MAX_NATIVE_WIDTH / 8) as usize
    } else {
        0
    }
}

fn int_type(bits: u32, unsigned: bool) -> ResolvedType {
    let scalar = Scalar::int(bits.min(MAX_NATIVE_WIDTH), !unsigned);
    ResolvedType {
        bit_width: bits,
        byte_size: bits.div_ceil(8) as usize,
        diff_bytes: dropped_bytes(bits),
        ..ResolvedType::primitive(scalar)
    }
}

fn float_type(bits: u32) -> ResolvedType {
    let scalar = Scalar::float(bits.min(MAX_NATIVE_WIDTH));
    let diff_bytes = dropped_bytes(bits);
    let mut ty = ResolvedType::primitive(scalar);
    if diff_bytes > 0 {
        ty.bit_width = bits;
        ty.byte_size = bits.div_ceil(8) as usize;
        ty.diff_bytes = diff_bytes;
    }
    ty
}

/// A value carried as ASCII digits; `width` counts characters.
fn numeric_string(width: u32, float: bool, unsigned: bool) -> ResolvedType {
    let scalar = if float {
        Scalar::F64
    } else {
        Scalar::int(MAX_NATIVE_WIDTH, !unsigned)
    };
    ResolvedType {
        kind: TypeKind::Primitive(scalar),
        bit_width: width,
        byte_size: width as usize,
        numeric_string: true,
        ..ResolvedType::primitive(scalar)
    }
}

/// Resolve a sized type keyword.
///
/// `BYTE` and `CHAR` are one unsigned byte, `BIT` a one-bit bitset. Integer
/// widths that are not a native size keep their declared byte count; widths
/// beyond 64 bits are carried in a 64-bit value with the excess recorded in
/// `diff_bytes`.
pub fn sized_type(token: &Token) -> Result<ResolvedType, TypeError> {
    let unsigned = token.is_unsigned();
    let ty = match token.text.as_str() {
        "BYTE" | "CHAR" => ResolvedType::primitive(Scalar::U8),
        "BIT" => ResolvedType::bitset(1),
        text => {
            let (base, width) = split_width(text).map_err(|kind| TypeError::at(kind, token))?;
            if width == Some(0) {
                return Err(TypeError::at(TypeErrorKind::ZeroWidth, token));
            }
            match base {
                "INT" => int_type(width.unwrap_or(DEFAULT_WIDTH), unsigned),
                "FLOAT" => float_type(width.unwrap_or(DEFAULT_WIDTH)),
                "INT_STR" | "FLOAT_STR" => {
                    let width = width
                        .ok_or_else(|| TypeError::at(TypeErrorKind::MissingStringWidth, token))?;
                    numeric_string(width, base == "FLOAT_STR", unsigned)
                }
                _ => return Err(TypeError::at(TypeErrorKind::UnknownType, token)),
            }
        }
    };
    tracing::trace!(keyword = %token.text, ty = %ty, "sized type");
    Ok(ty)
}

/// Warning for a declared width the generated code cannot hold exactly.
pub fn precision_advisory(token: &Token, ty: &ResolvedType) -> Option<Diagnostic> {
    (ty.diff_bytes > 0).then(|| {
        Diagnostic::warning(ErrorCode::W4001)
            .with_message(format!(
                "conversion from {} bits to {MAX_NATIVE_WIDTH} bits, possible loss of data",
                ty.bit_width
            ))
            .with_label(Location::new(token.line, token.text.clone()), "declared here")
            .with_note(format!(
                "the leading {} byte(s) are skipped when decoding and zeroed when encoding",
                ty.diff_bytes
            ))
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use tebnf_ir::{TokenFlags, TokenKind};

    fn typed(text: &str) -> Token {
        Token::new(TokenKind::Typed, text, 3)
    }

    #[test]
    fn test_split_width() {
        assert_eq!(split_width("INT_16"), Ok(("INT", Some(16))));
        assert_eq!(split_width("INT_STR_4"), Ok(("INT_STR", Some(4))));
        assert_eq!(split_width("INT_STR"), Ok(("INT_STR", None)));
        assert_eq!(split_width("FLOAT"), Ok(("FLOAT", None)));
        assert_eq!(split_width("INT_4294967296"), Err(TypeErrorKind::WidthOverflow));
    }

    #[test]
    fn test_native_integers() {
        let ty = sized_type(&typed("INT_16")).unwrap();
        assert_eq!(ty.kind, TypeKind::Primitive(Scalar::I16));
        assert_eq!(ty.byte_size, 2);

        let mut token = typed("INT_8");
        token.flags |= TokenFlags::UNSIGNED;
        assert_eq!(sized_type(&token).unwrap().scalar(), Some(Scalar::U8));

        assert_eq!(sized_type(&typed("INT")).unwrap().byte_size, 4);
    }

    #[test]
    fn test_odd_width_keeps_byte_count() {
        let ty = sized_type(&typed("INT_12")).unwrap();
        assert_eq!(ty.scalar(), Some(Scalar::I16));
        assert_eq!(ty.bit_width, 12);
        assert_eq!(ty.byte_size, 2);

        let ty = sized_type(&typed("INT_24")).unwrap();
        assert_eq!(ty.scalar(), Some(Scalar::I32));
        assert_eq!(ty.byte_size, 3);
    }

    #[test]
    fn test_wide_integer_is_capped() {
        let token = typed("INT_128");
        let ty = sized_type(&token).unwrap();
        assert_eq!(ty.scalar(), Some(Scalar::I64));
        assert_eq!(ty.byte_size, 16);
        assert_eq!(ty.diff_bytes, 8);

        let warning = precision_advisory(&token, &ty).unwrap();
        assert_eq!(warning.code, ErrorCode::W4001);
        assert!(!warning.is_error());
        assert_eq!(warning.line(), 3);
        assert!(precision_advisory(&typed("INT_64"), &sized_type(&typed("INT_64")).unwrap()).is_none());
    }

    #[test]
    fn test_byte_char_and_bit() {
        assert_eq!(sized_type(&typed("BYTE")).unwrap().scalar(), Some(Scalar::U8));
        assert_eq!(sized_type(&typed("CHAR")).unwrap().byte_size, 1);
        let bit = sized_type(&typed("BIT")).unwrap();
        assert_eq!(bit.kind, TypeKind::Bitset);
        assert_eq!(bit.resolved_bits, 1);
    }

    #[test]
    fn test_floats() {
        assert_eq!(sized_type(&typed("FLOAT_64")).unwrap().scalar(), Some(Scalar::F64));
        assert_eq!(sized_type(&typed("FLOAT_32")).unwrap().byte_size, 4);
        assert_eq!(sized_type(&typed("FLOAT")).unwrap().scalar(), Some(Scalar::F32));
    }

    #[test]
    fn test_numeric_strings() {
        let ty = sized_type(&typed("INT_STR_4")).unwrap();
        assert!(ty.numeric_string);
        assert_eq!(ty.byte_size, 4);
        assert_eq!(ty.bit_width, 4);
        assert!(sized_type(&typed("FLOAT_STR_8")).unwrap().is_float());

        let err = sized_type(&typed("INT_STR")).unwrap_err();
        assert_eq!(err.kind, TypeErrorKind::MissingStringWidth);
    }

    #[test]
    fn test_invalid_keywords() {
        assert_eq!(
            sized_type(&typed("INT_0")).unwrap_err().kind,
            TypeErrorKind::ZeroWidth
        );
        assert_eq!(
            sized_type(&typed("WORD_16")).unwrap_err().kind,
            TypeErrorKind::UnknownType
        );
        let err = sized_type(&typed("INT_99999999999")).unwrap_err();
        assert_eq!(err.kind, TypeErrorKind::WidthOverflow);
        assert_eq!(err.kind.code(), ErrorCode::E1009);
        assert_eq!(
            sized_type(&typed("FLOAT_STR_99999999999")).unwrap_err().kind,
            TypeErrorKind::WidthOverflow
        );
    }
}
