//! Splits grammar text into logical statements.
//!
//! A statement is one or more physical lines joined until a line containing
//! `;` is read. Lines that open an element, close one with `END`, or start a
//! comment stand alone. Each segment keeps its own physical line number so
//! tokens report where they really came from.

use std::iter::Enumerate;
use std::str::Lines;

use crate::matchers::keyword_len;

const STANDALONE_KEYWORDS: [&str; 6] = ["GRAMMAR", "INPUT", "OUTPUT", "STATES", "ACTIONS", "END"];

/// One physical line of a statement.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Segment<'a> {
    /// 1-based line number.
    pub line: u32,
    pub text: &'a str,
}

/// Iterator over the logical statements of a source text.
pub struct StatementReader<'a> {
    lines: Enumerate<Lines<'a>>,
    /// A standalone line read while a statement was still open.
    held: Option<Segment<'a>>,
}

impl<'a> StatementReader<'a> {
    pub fn new(source: &'a str) -> Self {
        StatementReader {
            lines: source.lines().enumerate(),
            held: None,
        }
    }

    fn next_segment(&mut self) -> Option<Segment<'a>> {
        for (idx, text) in self.lines.by_ref() {
            let text = text.trim();
            if !text.is_empty() {
                return Some(Segment {
                    line: idx as u32 + 1,
                    text,
                });
            }
        }
        None
    }
}

fn is_standalone(text: &str) -> bool {
    text.starts_with('#')
        || STANDALONE_KEYWORDS
            .iter()
            .any(|kw| keyword_len(text, kw).is_some())
}

impl<'a> Iterator for StatementReader<'a> {
    type Item = Vec<Segment<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(held) = self.held.take() {
            return Some(vec![held]);
        }
        let mut statement = Vec::new();
        while let Some(segment) = self.next_segment() {
            if is_standalone(segment.text) {
                if statement.is_empty() {
                    return Some(vec![segment]);
                }
                self.held = Some(segment);
                return Some(statement);
            }
            let terminated = segment.text.contains(';');
            statement.push(segment);
            if terminated {
                return Some(statement);
            }
        }
        (!statement.is_empty()).then_some(statement)
    }
}
