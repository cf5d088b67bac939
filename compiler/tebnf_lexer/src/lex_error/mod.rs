//! Lexer error types.

use tebnf_diagnostic::{Diagnostic, ErrorCode, Location};

/// What went wrong while lexing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LexErrorKind {
    #[error("Mismatched brackets")]
    MismatchedBrackets,
    #[error("Mismatched parenthesis")]
    MismatchedParenthesis,
    #[error("Mismatched array subscript bracket")]
    MismatchedSubscript,
    #[error("Malformed numeric literal")]
    MalformedLiteral,
}

impl LexErrorKind {
    pub fn code(self) -> ErrorCode {
        match self {
            LexErrorKind::MismatchedBrackets => ErrorCode::E0001,
            LexErrorKind::MismatchedParenthesis => ErrorCode::E0002,
            LexErrorKind::MismatchedSubscript => ErrorCode::E0003,
            LexErrorKind::MalformedLiteral => ErrorCode::E0004,
        }
    }
}

/// A lexical error at a token.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("{kind} at line {line}: `{token}`")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub line: u32,
    /// Text of the offending token.
    pub token: String,
}

impl LexError {
    pub fn new(kind: LexErrorKind, line: u32, token: impl Into<String>) -> Self {
        LexError {
            kind,
            line,
            token: token.into(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = Location::new(self.line, self.token.clone());
        let diag = Diagnostic::error(self.kind.code()).with_message(self.kind.to_string());
        if self.kind == LexErrorKind::MalformedLiteral {
            diag.with_label(location, "not a valid number")
        } else {
            diag.with_label(location, "unbalanced here")
                .with_note("bracket counts are checked at every `;` and `END`")
        }
    }
}
