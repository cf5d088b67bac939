//! Type inference errors.

use tebnf_diagnostic::{Diagnostic, ErrorCode, Location};
use tebnf_ir::Token;

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TypeErrorKind {
    #[error("integer literal does not fit in 64 bits")]
    LiteralOverflow,
    #[error("malformed literal")]
    MalformedLiteral,
    #[error("unrecognized type")]
    UnknownType,
    #[error("numeric string type requires a width")]
    MissingStringWidth,
    #[error("type width must be non-zero")]
    ZeroWidth,
    #[error("range minimum {min} exceeds maximum {max}")]
    RangeInverted { min: u64, max: u64 },
    #[error("range bound must be a non-negative integer, a symbol or a static variable")]
    InvalidRangeBound,
    #[error("a range cannot apply to {0}")]
    RangeNotAllowed(String),
    #[error("type width does not fit in 32 bits")]
    WidthOverflow,
    #[error("field size is too large to represent")]
    SizeOverflow,
}

impl TypeErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            TypeErrorKind::LiteralOverflow | TypeErrorKind::MalformedLiteral => ErrorCode::E0004,
            TypeErrorKind::UnknownType
            | TypeErrorKind::MissingStringWidth
            | TypeErrorKind::ZeroWidth
            | TypeErrorKind::WidthOverflow => ErrorCode::E1009,
            TypeErrorKind::RangeInverted { .. } => ErrorCode::E2005,
            TypeErrorKind::SizeOverflow => ErrorCode::E2008,
            TypeErrorKind::InvalidRangeBound | TypeErrorKind::RangeNotAllowed(_) => {
                ErrorCode::E1005
            }
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} at line {line}: `{token}`")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub line: u32,
    pub token: String,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, line: u32, token: impl Into<String>) -> Self {
        TypeError {
            kind,
            line,
            token: token.into(),
        }
    }

    pub fn at(kind: TypeErrorKind, token: &Token) -> Self {
        Self::new(kind, token.line, token.text.clone())
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.kind.code())
            .with_message(self.kind.to_string())
            .with_label(Location::new(self.line, self.token.clone()), "here");
        match self.kind {
            TypeErrorKind::MissingStringWidth => {
                diag.with_suggestion(format!("give the width in characters, e.g. `{}_4`", self.token))
            }
            TypeErrorKind::RangeInverted { .. } => {
                diag.with_suggestion("swap the bounds so the minimum comes first")
            }
            _ => diag,
        }
    }
}
