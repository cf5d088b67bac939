//! Bracket, parenthesis and subscript balance.
//!
//! Counts run across the token stream and reset at every statement boundary
//! (`;`, `END`, end of input). An imbalance is reported at the last bracket
//! of its kind, at most once per kind per statement.

use tebnf_ir::{TokenKind, TokenList};

use crate::{LexError, LexErrorKind};

struct Counter {
    open: &'static str,
    close: &'static str,
    kind: LexErrorKind,
    depth: i32,
    /// Line and text of the last bracket of this kind.
    last: Option<(u32, String)>,
    reported: bool,
}

impl Counter {
    const fn new(open: &'static str, close: &'static str, kind: LexErrorKind) -> Self {
        Counter {
            open,
            close,
            kind,
            depth: 0,
            last: None,
            reported: false,
        }
    }

    fn error(&mut self, fallback_line: u32) -> LexError {
        self.reported = true;
        let (line, text) = self
            .last
            .clone()
            .unwrap_or((fallback_line, String::new()));
        LexError::new(self.kind, line, text)
    }

    fn reset(&mut self) {
        self.depth = 0;
        self.last = None;
        self.reported = false;
    }
}

pub(crate) fn check_balance(tokens: &TokenList) -> Vec<LexError> {
    let mut counters = [
        Counter::new("{", "}", LexErrorKind::MismatchedBrackets),
        Counter::new("(", ")", LexErrorKind::MismatchedParenthesis),
        Counter::new("[", "]", LexErrorKind::MismatchedSubscript),
    ];
    let mut errors = Vec::new();

    for token in tokens.iter() {
        let boundary = matches!(
            token.kind,
            TokenKind::Termination | TokenKind::End | TokenKind::Eof
        );
        if boundary {
            for counter in &mut counters {
                if counter.depth != 0 && !counter.reported {
                    errors.push(counter.error(token.line));
                }
                counter.reset();
            }
            continue;
        }
        for counter in &mut counters {
            if token.text == counter.open {
                counter.depth += 1;
            } else if token.text == counter.close {
                counter.depth -= 1;
            } else {
                continue;
            }
            counter.last = Some((token.line, token.text.clone()));
            if counter.depth < 0 && !counter.reported {
                errors.push(counter.error(token.line));
            }
        }
    }
    errors
}
