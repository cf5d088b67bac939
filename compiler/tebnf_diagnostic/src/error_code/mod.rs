//! Error codes for all compiler diagnostics.
//!
//! The first digit names the stage that raised the diagnostic.

use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where the first digit indicates the stage:
/// - E0xxx: Lexer errors
/// - E1xxx: Parser errors
/// - E2xxx: Resolution and semantic errors
/// - E3xxx: Codec synthesis errors
/// - W4xxx: Advisory warnings
/// - E9xxx: Internal and I/O errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Lexer Errors (E0xxx)
    /// Unbalanced `{`/`}`
    E0001,
    /// Unbalanced `(`/`)`
    E0002,
    /// Unbalanced `[`/`]`
    E0003,
    /// Malformed numeric literal
    E0004,

    // Parser Errors (E1xxx)
    /// Unexpected token
    E1001,
    /// Element not closed by `END`
    E1002,
    /// Expected element name
    E1003,
    /// Malformed actions parameter
    E1004,
    /// Malformed range
    E1005,
    /// Malformed expression
    E1006,
    /// Malformed IO declaration
    E1007,
    /// Malformed state table row
    E1008,
    /// Malformed type
    E1009,

    // Semantic Errors (E2xxx)
    /// Unresolved symbol
    E2001,
    /// Duplicate element
    E2002,
    /// Duplicate member
    E2003,
    /// Undefined element or member
    E2004,
    /// Range minimum exceeds maximum
    E2005,
    /// Member shares its element's name
    E2006,
    /// Invalid alias target
    E2007,
    /// Field or element size overflows
    E2008,

    // Synthesis Errors (E3xxx)
    /// Referenced element or member missing at synthesis
    E3001,
    /// Negative or inconsistent size
    E3002,
    /// Element is not a grammar
    E3003,

    // Warnings (W4xxx)
    /// Declared width exceeds 64 bits
    W4001,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
    /// Reading the source or writing output failed
    E9002,
}

impl ErrorCode {
    /// All error code variants, for iteration and lookup.
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E1004,
        ErrorCode::E1005,
        ErrorCode::E1006,
        ErrorCode::E1007,
        ErrorCode::E1008,
        ErrorCode::E1009,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E2003,
        ErrorCode::E2004,
        ErrorCode::E2005,
        ErrorCode::E2006,
        ErrorCode::E2007,
        ErrorCode::E2008,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::W4001,
        ErrorCode::E9001,
        ErrorCode::E9002,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            ErrorCode::E1004 => "E1004",
            ErrorCode::E1005 => "E1005",
            ErrorCode::E1006 => "E1006",
            ErrorCode::E1007 => "E1007",
            ErrorCode::E1008 => "E1008",
            ErrorCode::E1009 => "E1009",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::W4001 => "W4001",
            ErrorCode::E9001 => "E9001",
            ErrorCode::E9002 => "E9002",
        }
    }

    /// One-line description of the error class.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E0001 => "mismatched brackets",
            ErrorCode::E0002 => "mismatched parenthesis",
            ErrorCode::E0003 => "mismatched array subscript bracket",
            ErrorCode::E0004 => "malformed numeric literal",
            ErrorCode::E1001 => "unexpected token",
            ErrorCode::E1002 => "element is missing `END`",
            ErrorCode::E1003 => "expected element name",
            ErrorCode::E1004 => "invalid actions parameter",
            ErrorCode::E1005 => "malformed range",
            ErrorCode::E1006 => "malformed expression",
            ErrorCode::E1007 => "malformed IO declaration",
            ErrorCode::E1008 => "malformed state table row",
            ErrorCode::E1009 => "malformed type",
            ErrorCode::E2001 => "unresolved symbol",
            ErrorCode::E2002 => "duplicate element",
            ErrorCode::E2003 => "duplicate member",
            ErrorCode::E2004 => "undefined element or member",
            ErrorCode::E2005 => "range minimum exceeds maximum",
            ErrorCode::E2006 => "member has the same name as its element",
            ErrorCode::E2007 => "invalid alias target",
            ErrorCode::E2008 => "size too large to represent",
            ErrorCode::E3001 => "referenced element or member is missing",
            ErrorCode::E3002 => "negative or inconsistent size",
            ErrorCode::E3003 => "element is not a grammar",
            ErrorCode::W4001 => "declared width exceeds 64 bits",
            ErrorCode::E9001 => "internal compiler error",
            ErrorCode::E9002 => "I/O error",
        }
    }

    /// Check if this is a warning code (W-prefix) rather than an error.
    pub fn is_warning(&self) -> bool {
        matches!(self, ErrorCode::W4001)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parse an error code string like `"E2001"`. Case-insensitive.
impl std::str::FromStr for ErrorCode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}
