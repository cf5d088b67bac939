//! Ranges applied to typed fields.

use tebnf_ir::{RangeBound, ResolvedType, Token, TokenKind, TypeKind, TypeRange};

use crate::{LiteralValue, TypeError, TypeErrorKind};

/// Interpret a `RangeValue` token as a bound.
pub fn range_bound(token: &Token) -> Result<RangeBound, TypeError> {
    let invalid = || TypeError::at(TypeErrorKind::InvalidRangeBound, token);
    match token.effective_kind() {
        TokenKind::StaticVar => Ok(RangeBound::StaticVar(token.text.clone())),
        TokenKind::SymbolGrammar => Ok(RangeBound::Symbol(token.text.clone())),
        kind if kind.is_integer_literal() => match LiteralValue::parse(token)? {
            LiteralValue::Int(v) => u64::try_from(v).map(RangeBound::Literal).map_err(|_| invalid()),
            LiteralValue::Float(_) | LiteralValue::Bytes(_) => Err(invalid()),
        },
        _ => Err(invalid()),
    }
}

/// Apply `range` to the type of a field.
///
/// A scalar becomes a vector of `size` elements; a bitset widens to the
/// range's bit count. A symbolic or open upper bound leaves the dynamic part
/// out of `byte_size`.
pub fn apply_range(ty: &ResolvedType, range: TypeRange, at: &Token) -> Result<ResolvedType, TypeError> {
    if let (Some(min), Some(max)) = (range.min_value(), range.max_value()) {
        if min > max {
            return Err(TypeError::at(TypeErrorKind::RangeInverted { min, max }, at));
        }
    }
    let too_large = || TypeError::at(TypeErrorKind::SizeOverflow, at);
    let size = usize::try_from(range.size()).map_err(|_| too_large())?;

    let mut out = match ty.kind {
        TypeKind::Bitset => {
            let bits = u32::try_from(size).map_err(|_| too_large())?;
            ResolvedType::bitset(bits)
        }
        TypeKind::Primitive(scalar) if !ty.numeric_string => ResolvedType {
            kind: TypeKind::Vector(scalar),
            byte_size: size.checked_mul(ty.byte_size).ok_or_else(too_large)?,
            ..ty.clone()
        },
        _ => {
            return Err(TypeError::at(
                TypeErrorKind::RangeNotAllowed(ty.to_string()),
                at,
            ))
        }
    };
    out.literal = false;
    out.range = Some(range);
    Ok(out)
}
