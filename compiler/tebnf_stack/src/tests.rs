use super::*;
use pretty_assertions::assert_eq;

/// Nested `(((...)))` terms, the shape that drives grammar recursion.
enum Term {
    Leaf(u32),
    Group(Box<Term>),
}

fn nest(depth: u32) -> Term {
    let mut term = Term::Leaf(depth);
    for _ in 0..depth {
        term = Term::Group(Box::new(term));
    }
    term
}

fn depth_of(term: &Term) -> u32 {
    ensure_sufficient_stack(|| match term {
        Term::Leaf(_) => 0,
        Term::Group(inner) => 1 + depth_of(inner),
    })
}

fn leaf_of(term: &Term) -> u32 {
    ensure_sufficient_stack(|| match term {
        Term::Leaf(v) => *v,
        Term::Group(inner) => leaf_of(inner),
    })
}

#[test]
fn test_shallow_nesting() {
    assert_eq!(depth_of(&nest(3)), 3);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let term = nest(100_000);
    assert_eq!(depth_of(&term), 100_000);
    assert_eq!(leaf_of(&term), 100_000);
    // iterative drop; the recursive Box drop would overflow first
    let mut current = term;
    while let Term::Group(inner) = current {
        current = *inner;
    }
}

#[test]
fn test_result_passthrough() {
    let result: Result<u8, String> = ensure_sufficient_stack(|| Err("unbalanced".to_string()));
    assert_eq!(result, Err("unbalanced".to_string()));
}

#[test]
fn test_remaining_stack_reported() {
    if let Some(remaining) = remaining_stack() {
        assert!(remaining > 0);
    }
}
