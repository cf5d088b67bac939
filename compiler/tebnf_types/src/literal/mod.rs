//! Literal typing.

use tebnf_ir::{ResolvedType, Scalar, Token, TokenKind, TypeKind};

use crate::{TypeError, TypeErrorKind};

const INT_WIDTHS: [u32; 4] = [8, 16, 32, 64];

/// The value a literal token spells.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    Int(i128),
    Float(f64),
    Bytes(Vec<u8>),
}

impl LiteralValue {
    /// Parse the value of a literal token.
    pub fn parse(token: &Token) -> Result<Self, TypeError> {
        let malformed = || TypeError::at(TypeErrorKind::MalformedLiteral, token);
        let text = token.text.as_str();
        match token.effective_kind() {
            TokenKind::Str => Ok(LiteralValue::Bytes(unquote(text, '"').as_bytes().to_vec())),
            TokenKind::Chr => char_value(unquote(text, '\''))
                .map(|c| LiteralValue::Int(i128::from(u32::from(c))))
                .ok_or_else(malformed),
            TokenKind::Flt => text
                .parse::<f64>()
                .map(LiteralValue::Float)
                .map_err(|_| malformed()),
            kind @ (TokenKind::Dec | TokenKind::Hex | TokenKind::Oct) => {
                let value = parse_integer(text, kind).ok_or_else(malformed)?;
                if value > i128::from(u64::MAX) || value < i128::from(i64::MIN) {
                    return Err(TypeError::at(TypeErrorKind::LiteralOverflow, token));
                }
                Ok(LiteralValue::Int(value))
            }
            _ => Err(malformed()),
        }
    }

    /// Big-endian encoding of the value in the layout of `ty`.
    pub fn to_be_bytes(&self, ty: &ResolvedType) -> Vec<u8> {
        match self {
            LiteralValue::Bytes(bytes) => bytes.clone(),
            LiteralValue::Float(v) => match ty.kind {
                TypeKind::Primitive(Scalar::F32) => (*v as f32).to_be_bytes().to_vec(),
                _ => v.to_be_bytes().to_vec(),
            },
            LiteralValue::Int(v) => {
                let bytes = v.to_be_bytes();
                let width = ty.byte_size.min(bytes.len());
                bytes[bytes.len() - width..].to_vec()
            }
        }
    }
}

fn unquote(text: &str, quote: char) -> &str {
    let inner = text.strip_prefix(quote).unwrap_or(text);
    inner.strip_suffix(quote).unwrap_or(inner)
}

fn char_value(body: &str) -> Option<char> {
    let mut chars = body.chars();
    let c = match chars.next()? {
        '\\' => match chars.next()? {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        },
        c => c,
    };
    chars.next().is_none().then_some(c)
}

fn parse_integer(text: &str, kind: TokenKind) -> Option<i128> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (digits, radix) = match kind {
        TokenKind::Hex => (
            digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))?,
            16,
        ),
        TokenKind::Oct => (digits, 8),
        _ => (digits, 10),
    };
    let value = i128::from_str_radix(digits, radix).ok()?;
    Some(if negative { -value } else { value })
}

/// The narrowest integer scalar holding `value`.
///
/// Values are signed unless the literal was marked unsigned; a negative
/// value is always signed.
pub(crate) fn narrowest_int(value: i128, unsigned: bool) -> Option<Scalar> {
    let unsigned = unsigned && value >= 0;
    INT_WIDTHS
        .iter()
        .find(|&&bits| {
            if unsigned {
                value < 1i128 << bits
            } else {
                let half = 1i128 << (bits - 1);
                (-half..half).contains(&value)
            }
        })
        .map(|&bits| Scalar::int(bits, !unsigned))
}

/// Infer the layout of a literal token.
pub fn infer_literal(token: &Token) -> Result<ResolvedType, TypeError> {
    let mut ty = match LiteralValue::parse(token)? {
        LiteralValue::Bytes(bytes) => ResolvedType::string(bytes.len()),
        LiteralValue::Float(v) => {
            let scalar = if v.abs() <= f64::from(f32::MAX) {
                Scalar::F32
            } else {
                Scalar::F64
            };
            ResolvedType::primitive(scalar)
        }
        LiteralValue::Int(v) => {
            let unsigned = token.is_unsigned() || token.effective_kind() == TokenKind::Chr;
            let scalar = narrowest_int(v, unsigned)
                .ok_or_else(|| TypeError::at(TypeErrorKind::LiteralOverflow, token))?;
            ResolvedType::primitive(scalar)
        }
    };
    ty.literal = true;
    tracing::trace!(literal = %token.text, ty = %ty, "inferred literal");
    Ok(ty)
}
