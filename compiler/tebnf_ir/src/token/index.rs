//! Token index and per-token flags.

use std::fmt;

use bitflags::bitflags;

/// Typed index into a `TokenList` arena.
///
/// Uses `u32::MAX` as a sentinel for "no token".
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct TokenId(u32);

impl TokenId {
    /// Sentinel value indicating no token.
    pub const INVALID: TokenId = TokenId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "TokenId({})", self.0)
        } else {
            write!(f, "TokenId::INVALID")
        }
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::INVALID
    }
}

const _: () = assert!(size_of::<TokenId>() == 4);

bitflags! {
    /// Per-token context bits set by the lexer and parser.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TokenFlags: u8 {
        /// A literal or type that was preceded by `UNSIGNED`.
        const UNSIGNED = 1 << 0;
        /// The closing token of an actions signature.
        const LAST_SIGNATURE = 1 << 1;
        /// Created by the parser rather than read from source.
        const SYNTHETIC = 1 << 2;
    }
}
