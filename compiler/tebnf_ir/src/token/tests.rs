#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;

fn op(kind: TokenKind, text: &str) -> Token {
    Token::synthetic(kind, text)
}

#[test]
fn test_token_id_valid() {
    let id = TokenId::new(7);
    assert!(id.is_valid());
    assert_eq!(id.index(), 7);
    assert!(!TokenId::INVALID.is_valid());
    assert!(!TokenId::default().is_valid());
}

#[test]
fn test_precedence_table() {
    assert_eq!(op(TokenKind::Comparison, "==").precedence(), 4);
    assert_eq!(op(TokenKind::Math, "+").precedence(), 5);
    assert_eq!(op(TokenKind::Math, "*").precedence(), 6);
    assert_eq!(op(TokenKind::LessGreater, "<=").precedence(), 8);
    assert_eq!(op(TokenKind::Assign, "=").precedence(), 15);
    assert_eq!(op(TokenKind::Concat, ",").precedence(), LOWEST_PRECEDENCE);
}

#[test]
fn test_equality_binds_tighter_than_addition() {
    let eq = op(TokenKind::Comparison, "!=");
    let add = op(TokenKind::Math, "-");
    assert!(eq.precedence() < add.precedence());
}

#[test]
fn test_only_plain_assignment_is_right_associative() {
    assert_eq!(op(TokenKind::Assign, "=").associativity(), Associativity::Right);
    assert_eq!(op(TokenKind::AssignAdd, "+=").associativity(), Associativity::Left);
    assert_eq!(op(TokenKind::Math, "+").associativity(), Associativity::Left);
}

#[test]
fn test_reclassify_keeps_first_kind() {
    let mut token = Token::new(TokenKind::Dec, "10", 3);
    token.reclassify(TokenKind::RangeValue);
    token.reclassify(TokenKind::Unknown);
    assert_eq!(token.kind, TokenKind::Unknown);
    assert_eq!(token.effective_kind(), TokenKind::Dec);
}

#[test]
fn test_list_pop_keeps_token_addressable() {
    let mut list = TokenList::new();
    let a = list.push(Token::new(TokenKind::ElementName, "@A", 1));
    list.push(Token::new(TokenKind::MemberAccess, ".", 1));
    assert_eq!(list.last(0).unwrap().text, ".");
    assert_eq!(list.last(1).unwrap().text, "@A");

    list.pop();
    list.pop();
    assert!(list.is_empty());
    assert_eq!(list[a].text, "@A");
}

#[test]
fn test_list_detached_not_in_stream() {
    let mut list = TokenList::new();
    list.push(Token::new(TokenKind::SymbolGrammar, "a", 1));
    let id = list.alloc_detached(Token::synthetic(TokenKind::StateTableState, "idle_else"));
    assert_eq!(list.stream_len(), 1);
    assert_eq!(list.get(id).unwrap().text, "idle_else");
    assert!(list.get(id).unwrap().flags.contains(TokenFlags::SYNTHETIC));
    let texts: Vec<_> = list.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["a"]);
}

#[test]
fn test_last_out_of_range() {
    let list = TokenList::new();
    assert!(list.last(0).is_none());
    assert!(list.last_id(3).is_none());
}
