//! Read-only cursor over the lexer's token stream.
//!
//! Lookahead and lookbehind clamp at the ends of the stream instead of
//! failing, so the sub-parsers can peek around freely. The final token is
//! always the lexer's `Eof` sentinel.

use tebnf_ir::{Token, TokenFlags, TokenId, TokenKind, TokenList};

/// Stand-in for `peek` on an empty token list.
static EOF: Token = Token {
    kind: TokenKind::Eof,
    actual_kind: None,
    text: String::new(),
    line: 0,
    index: u32::MAX,
    accessed: None,
    flags: TokenFlags::SYNTHETIC,
};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Direction {
    Forward,
    Backward,
}

pub struct TokenStream<'a> {
    tokens: &'a TokenList,
    pos: usize,
    last: Option<usize>,
}

impl<'a> TokenStream<'a> {
    pub fn new(tokens: &'a TokenList) -> Self {
        TokenStream {
            tokens,
            pos: 0,
            last: None,
        }
    }

    /// The arena, for following `accessed` back-references.
    pub fn tokens(&self) -> &'a TokenList {
        self.tokens
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn clamp(&self, pos: usize) -> usize {
        pos.min(self.tokens.stream_len().saturating_sub(1))
    }

    fn token_at(&self, pos: usize) -> &'a Token {
        self.tokens.at(self.clamp(pos)).unwrap_or(&EOF)
    }

    /// The current token.
    #[inline]
    pub fn peek(&self) -> &'a Token {
        self.token_at(self.pos)
    }

    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    pub fn peek_id(&self) -> TokenId {
        self.tokens
            .id_at(self.clamp(self.pos))
            .unwrap_or(TokenId::INVALID)
    }

    /// The token `n` positions away, clamped to the first or last token.
    pub fn peek_at(&self, n: usize, dir: Direction) -> &'a Token {
        match dir {
            Direction::Forward => self.token_at(self.pos.saturating_add(n)),
            Direction::Backward => self.token_at(self.pos.saturating_sub(n)),
        }
    }

    /// Advance one token and return the new current token. Stays on the
    /// final token once reached.
    pub fn next(&mut self) -> &'a Token {
        self.last = Some(self.clamp(self.pos));
        self.pos = self.clamp(self.pos + 1);
        self.peek()
    }

    /// The token most recently stepped over by `next`.
    pub fn last(&self) -> Option<&'a Token> {
        self.last.and_then(|pos| self.tokens.at(pos))
    }

    /// Move forward to the token with arena index `index`. Never moves back;
    /// returns `false` (leaving the position unchanged) if the token is not
    /// ahead.
    pub fn seek(&mut self, index: u32) -> bool {
        let ahead = (self.pos..self.tokens.stream_len())
            .find(|&pos| self.tokens.at(pos).is_some_and(|t| t.index == index));
        match ahead {
            Some(pos) => {
                if pos > self.pos {
                    self.last = Some(pos - 1);
                }
                self.pos = pos;
                true
            }
            None => false,
        }
    }

    /// Ids of the stream positions `start..end`, clamped to the stream.
    pub fn range(&self, start: usize, end: usize) -> Vec<TokenId> {
        let end = end.min(self.tokens.stream_len());
        let start = start.min(end);
        self.tokens.stream_ids()[start..end].to_vec()
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.peek_kind() == TokenKind::Eof
    }

    /// The current token if it has `kind`, advancing past it.
    pub fn eat(&mut self, kind: TokenKind) -> Option<TokenId> {
        (self.peek_kind() == kind).then(|| {
            let id = self.peek_id();
            self.next();
            id
        })
    }
}
