//! Context-sensitive lexer for TEBNF grammars.
//!
//! The same character can mean different things depending on the element
//! being declared (`|` is alternation in a grammar but a column delimiter
//! in a state table) and on what follows it (`{` opens a range only once a
//! bound or `,` shows up). The lexer therefore tracks the current element
//! kind and rewrites a few recent tokens as context arrives.

mod balance;
mod lex_error;
mod matchers;
mod reader;

pub use lex_error::{LexError, LexErrorKind};
pub use reader::{Segment, StatementReader};

use tebnf_ir::{TokenKind, TokenList};

use matchers::Lexer;

/// A comment collected beside the token stream.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Comment {
    /// `LineComment` or `BlockComment`.
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
}

/// Everything the lexer produces for one source text.
#[derive(Clone, Debug)]
pub struct LexOutput {
    /// The token stream, terminated by an `Eof` sentinel.
    pub tokens: TokenList,
    pub comments: Vec<Comment>,
    /// Lexical errors in line order.
    pub errors: Vec<LexError>,
}

impl LexOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Tokenize a TEBNF source text.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn lex(source: &str) -> LexOutput {
    let mut lexer = Lexer::new();
    for statement in StatementReader::new(source) {
        for segment in statement {
            lexer.lex_line(segment.line, segment.text);
        }
    }
    lexer.finish();

    let mut errors = lexer.errors;
    errors.extend(balance::check_balance(&lexer.tokens));
    errors.sort_by_key(|e| e.line);

    tracing::debug!(
        tokens = lexer.tokens.stream_len(),
        comments = lexer.comments.len(),
        errors = errors.len(),
        "lexed"
    );
    LexOutput {
        tokens: lexer.tokens,
        comments: lexer.comments,
        errors,
    }
}

#[cfg(test)]
mod tests;
