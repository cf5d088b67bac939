//! Token arena plus the ordered token stream.

use super::{Token, TokenId};

/// All tokens of one compilation.
///
/// The arena owns every token ever created, including tokens that were
/// folded away (the `@A` of `@A.field`) or synthesized by the parser.
/// The stream is the ordered sequence the parser reads.
#[derive(Clone, Default, Debug)]
pub struct TokenList {
    arena: Vec<Token>,
    stream: Vec<TokenId>,
}

impl TokenList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token to both the arena and the stream.
    pub fn push(&mut self, mut token: Token) -> TokenId {
        let id = TokenId::new(self.arena.len() as u32);
        token.index = id.raw();
        self.arena.push(token);
        self.stream.push(id);
        id
    }

    /// Store a token that is not part of the stream.
    pub fn alloc_detached(&mut self, mut token: Token) -> TokenId {
        let id = TokenId::new(self.arena.len() as u32);
        token.index = id.raw();
        self.arena.push(token);
        id
    }

    /// Remove the last token from the stream. It stays addressable.
    pub fn pop(&mut self) -> Option<TokenId> {
        self.stream.pop()
    }

    /// The token `back` positions from the end of the stream (0 = last).
    pub fn last(&self, back: usize) -> Option<&Token> {
        let pos = self.stream.len().checked_sub(back + 1)?;
        self.arena.get(self.stream[pos].index())
    }

    pub fn last_id(&self, back: usize) -> Option<TokenId> {
        let pos = self.stream.len().checked_sub(back + 1)?;
        Some(self.stream[pos])
    }

    pub fn last_mut(&mut self, back: usize) -> Option<&mut Token> {
        let pos = self.stream.len().checked_sub(back + 1)?;
        let id = self.stream[pos];
        self.arena.get_mut(id.index())
    }

    #[inline]
    pub fn get(&self, id: TokenId) -> Option<&Token> {
        self.arena.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut Token> {
        self.arena.get_mut(id.index())
    }

    /// The token at stream position `pos`.
    pub fn at(&self, pos: usize) -> Option<&Token> {
        self.stream.get(pos).and_then(|id| self.arena.get(id.index()))
    }

    pub fn id_at(&self, pos: usize) -> Option<TokenId> {
        self.stream.get(pos).copied()
    }

    #[inline]
    pub fn stream_len(&self) -> usize {
        self.stream.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stream.is_empty()
    }

    /// Tokens in stream order.
    pub fn iter(&self) -> impl Iterator<Item = &Token> + '_ {
        self.stream.iter().filter_map(|id| self.arena.get(id.index()))
    }

    pub fn stream_ids(&self) -> &[TokenId] {
        &self.stream
    }
}

impl std::ops::Index<TokenId> for TokenList {
    type Output = Token;

    fn index(&self, id: TokenId) -> &Token {
        &self.arena[id.index()]
    }
}
