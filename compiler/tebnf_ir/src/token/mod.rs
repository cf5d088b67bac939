//! Token types for the TEBNF lexer.
//!
//! A token keeps its source text: the grammar language is small enough that
//! the parser and emitters work directly on the text (symbol names, literal
//! spellings, type keywords) rather than through an interner.

mod index;
mod kind;
mod list;

pub use index::{TokenFlags, TokenId};
pub use kind::TokenKind;
pub use list::TokenList;

use std::fmt;

/// Operator associativity for the shunting-yard expression parser.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Associativity {
    Left,
    Right,
}

/// Precedence of an operator that does not appear in the table below.
pub const LOWEST_PRECEDENCE: u8 = 17;

/// A classified token.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    /// Kind before a retroactive reclassification (e.g. the literal kind of
    /// a `RangeValue`).
    pub actual_kind: Option<TokenKind>,
    pub text: String,
    pub line: u32,
    /// Sequence index assigned at creation.
    pub index: u32,
    /// For `@A.field`, the `@A` token that `field` is accessed through.
    pub accessed: Option<TokenId>,
    pub flags: TokenFlags,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32) -> Self {
        Token {
            kind,
            actual_kind: None,
            text: text.into(),
            line,
            index: 0,
            accessed: None,
            flags: TokenFlags::empty(),
        }
    }

    /// Create a token for tests and parser-synthesized rows.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>) -> Self {
        let mut token = Token::new(kind, text, 0);
        token.flags |= TokenFlags::SYNTHETIC;
        token
    }

    /// The kind the token had before any reclassification.
    #[inline]
    pub fn effective_kind(&self) -> TokenKind {
        self.actual_kind.unwrap_or(self.kind)
    }

    /// Change the kind, remembering the first kind the token was given.
    pub fn reclassify(&mut self, kind: TokenKind) {
        if self.actual_kind.is_none() {
            self.actual_kind = Some(self.kind);
        }
        self.kind = kind;
    }

    #[inline]
    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(TokenFlags::UNSIGNED)
    }

    #[inline]
    pub fn is_last_signature(&self) -> bool {
        self.flags.contains(TokenFlags::LAST_SIGNATURE)
    }

    /// Binding strength for expression parsing; lower binds tighter.
    pub fn precedence(&self) -> u8 {
        match self.text.as_str() {
            "++" | "--" | "(" | ")" | "[" | "]" | "{" | "}" | "." => 2,
            "==" | "!=" => 4,
            "+" | "-" => 5,
            "*" | "/" | "%" => 6,
            "<" | "<=" | ">" | ">=" => 8,
            "=" | "+=" | "-=" => 15,
            _ => LOWEST_PRECEDENCE,
        }
    }

    /// Only plain assignment is right-associative.
    pub fn associativity(&self) -> Associativity {
        if self.kind == TokenKind::Assign {
            Associativity::Right
        } else {
            Associativity::Left
        }
    }

    /// Operators that the shunting-yard parser moves through its stack.
    pub fn is_stack_operator(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Math | TokenKind::Comparison | TokenKind::LessGreater
        )
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?}) @ line {}", self.kind, self.text, self.line)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests;
