//! Type, size and range inference for TEBNF.
//!
//! Every literal and sized type keyword maps to exactly one
//! [`ResolvedType`](tebnf_ir::ResolvedType):
//!
//! - literals take the narrowest native type that holds their value
//! - sized keywords (`INT_16`, `FLOAT_64`, `INT_STR_4`, `BYTE`, `BIT`) are
//!   split into a base and a width
//! - a `{min,max}` range turns a scalar into a vector, or widens a bitset

mod literal;
mod range;
mod sized;
mod type_error;

pub use literal::{infer_literal, LiteralValue};
pub use range::{apply_range, range_bound};
pub use sized::{precision_advisory, sized_type};
pub use type_error::{TypeError, TypeErrorKind};

use tebnf_ir::{ResolvedType, Token, TokenKind};

/// Infer the type of a literal or sized type token.
///
/// Returns `Ok(None)` for tokens that carry no type of their own
/// (symbols, operators).
pub fn infer_token(token: &Token) -> Result<Option<ResolvedType>, TypeError> {
    let kind = token.effective_kind();
    if kind.is_literal() {
        infer_literal(token).map(Some)
    } else if kind == TokenKind::Typed {
        sized_type(token).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests;
