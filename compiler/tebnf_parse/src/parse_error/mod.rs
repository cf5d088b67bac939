//! Parse and resolution errors.
//!
//! Syntactic errors (`E1xxx`) come from the sub-parsers; semantic errors
//! (`E2xxx`) from registration and the resolver. Both carry the line and
//! the text of the token they are about.

use tebnf_diagnostic::{Diagnostic, ErrorCode, Location};
use tebnf_ir::Token;
use tebnf_types::{TypeError, TypeErrorKind};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected an element keyword")]
    ExpectedElement,
    #[error("element must have a name")]
    MissingName,
    #[error("element declaration is not closed by END")]
    MissingEnd,
    #[error("expected {0}")]
    Unexpected(&'static str),
    #[error("invalid actions parameter")]
    InvalidParam,
    #[error("invalid range expression")]
    InvalidRange,
    #[error("mismatched parentheses")]
    MismatchedParens,
    #[error("{0}")]
    InvalidIo(&'static str),
    #[error("{0}")]
    InvalidStateRow(&'static str),
    #[error("{0}")]
    Type(TypeErrorKind),
    #[error("unable to resolve `{0}`")]
    Unresolved(String),
    #[error("element redeclaration")]
    DuplicateElement { first_line: u32 },
    #[error("member redeclaration")]
    DuplicateMember { first_line: u32 },
    #[error("element `{element}` has no member named `{member}`")]
    UndefinedMember { element: String, member: String },
    #[error("`{0}` is not {1}")]
    WrongElementKind(String, &'static str),
    #[error("member cannot have the same name as its element")]
    SelfNamedMember,
    #[error("invalid alias target")]
    InvalidAlias,
}

impl ParseErrorKind {
    pub fn code(&self) -> ErrorCode {
        match self {
            ParseErrorKind::ExpectedElement | ParseErrorKind::Unexpected(_) => ErrorCode::E1001,
            ParseErrorKind::MissingEnd => ErrorCode::E1002,
            ParseErrorKind::MissingName => ErrorCode::E1003,
            ParseErrorKind::InvalidParam => ErrorCode::E1004,
            ParseErrorKind::InvalidRange => ErrorCode::E1005,
            ParseErrorKind::MismatchedParens => ErrorCode::E1006,
            ParseErrorKind::InvalidIo(_) => ErrorCode::E1007,
            ParseErrorKind::InvalidStateRow(_) => ErrorCode::E1008,
            ParseErrorKind::Type(kind) => kind.code(),
            ParseErrorKind::Unresolved(_) => ErrorCode::E2001,
            ParseErrorKind::DuplicateElement { .. } => ErrorCode::E2002,
            ParseErrorKind::DuplicateMember { .. } => ErrorCode::E2003,
            ParseErrorKind::UndefinedMember { .. } | ParseErrorKind::WrongElementKind(..) => {
                ErrorCode::E2004
            }
            ParseErrorKind::SelfNamedMember => ErrorCode::E2006,
            ParseErrorKind::InvalidAlias => ErrorCode::E2007,
        }
    }
}

/// A syntactic or semantic error at a token.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{kind} at line {line}: `{token}`")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub token: String,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u32, token: impl Into<String>) -> Self {
        ParseError {
            kind,
            line,
            token: token.into(),
        }
    }

    pub fn at(kind: ParseErrorKind, token: &Token) -> Self {
        Self::new(kind, token.line, token.text.clone())
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let location = Location::new(self.line, self.token.clone());
        let diag = Diagnostic::error(self.kind.code()).with_message(self.kind.to_string());
        match &self.kind {
            ParseErrorKind::Unexpected(_) => diag.with_label(location, "unexpected token"),
            ParseErrorKind::MissingEnd => diag
                .with_label(location, "declaration stops here")
                .with_suggestion("close the element with `END`"),
            ParseErrorKind::DuplicateElement { first_line }
            | ParseErrorKind::DuplicateMember { first_line } => diag
                .with_label(location, "redeclared here")
                .with_secondary_label(
                    Location::new(*first_line, self.token.clone()),
                    "first declared here",
                ),
            ParseErrorKind::Unresolved(_) => diag
                .with_label(location, "referenced here")
                .with_note("no element or member of that name is declared"),
            ParseErrorKind::SelfNamedMember => diag
                .with_label(location, "shares the element's name")
                .with_suggestion("rename the member"),
            _ => diag.with_label(location, "here"),
        }
    }
}

impl From<TypeError> for ParseError {
    fn from(err: TypeError) -> Self {
        ParseError::new(ParseErrorKind::Type(err.kind), err.line, err.token)
    }
}
