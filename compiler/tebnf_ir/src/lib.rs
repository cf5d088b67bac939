//! TEBNF IR - shared data structures for the TEBNF compiler.
//!
//! This crate holds everything the pipeline stages hand to each other:
//! - Tokens, token kinds and the `TokenList` arena produced by the lexer
//! - The arena-backed syntax tree (`SyntaxTree`, `NodeId`) built by the parser
//! - Binary layout descriptions (`ResolvedType`, `TypeRange`)
//! - The element-by-name table shared by resolution and codec synthesis
//!
//! # Design
//!
//! - **Flatten Everything**: tokens are addressed by `TokenId(u32)` and nodes by
//!   `NodeId(u32)`. Parent links and dot-access back-references are indices, so
//!   the tree never owns cycles.
//! - **Closed variants**: element kinds and sub-element roles are enums matched
//!   exhaustively, not a class hierarchy.

mod layout;
mod naming;
mod table;
mod token;
mod tree;

pub use layout::{RangeBound, RangeShape, ResolvedType, Scalar, TypeKind, TypeRange};
pub use naming::{pascal_case, snake_case};
pub use table::ElementTable;
pub use token::{
    Associativity, Token, TokenFlags, TokenId, TokenKind, TokenList, LOWEST_PRECEDENCE,
};
pub use tree::{
    Condition, ElementData, ElementKind, IoChannel, Node, NodeId, NodeKind, ParentRelation,
    RowOutput, SiblingRelation, StateRow, SubElementData, SubElementRole, SyntaxTree, Target,
};
