#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use pretty_assertions::assert_eq;
use tebnf_lexer::lex;

/// Parse the first line of an actions body.
fn parse_line(line: &str, order: ExprOrder) -> Result<String, ParseError> {
    let output = lex(&format!("ACTIONS @T\n{line};\nEND"));
    let mut stream = TokenStream::new(&output.tokens);
    stream.next();
    stream.next();
    let ids = parse_expr(&mut stream, &[TokenKind::Termination], order)?;
    assert_eq!(stream.peek_kind(), TokenKind::Termination);
    Ok(ids
        .iter()
        .map(|&id| output.tokens[id].text.as_str())
        .collect::<Vec<_>>()
        .join(" "))
}

fn rpn(line: &str) -> String {
    parse_line(line, ExprOrder::Rpn).unwrap()
}

#[test]
fn test_assignment_passes_through() {
    assert_eq!(rpn("$c = $c + 1"), "$c = $c 1 +");
}

#[test]
fn test_left_associative_chain() {
    assert_eq!(rpn("$x = a - b - c"), "$x = a b - c -");
    assert_eq!(rpn("$x = a * b * c"), "$x = a b * c *");
}

#[test]
fn test_precedence_table_order() {
    // `+` (5) binds tighter than `*` (6) in the precedence table
    assert_eq!(rpn("$x = a + b * c"), "$x = a b + c *");
    assert_eq!(rpn("$x = a * b + c"), "$x = a b c + *");
    // equality (4) binds tighter than addition (5)
    assert_eq!(rpn("$x = a == b + c"), "$x = a b == c +");
    assert_eq!(rpn("$x = a + b < c"), "$x = a b + c <");
}

#[test]
fn test_parentheses_group() {
    assert_eq!(rpn("$x = (a * b) + c"), "$x = a b * c +");
    assert_eq!(rpn("$x = a * (b + c)"), "$x = a b c + *");
}

#[test]
fn test_subscript_copied_verbatim() {
    assert_eq!(rpn("$x = buf[i + 1] + 2"), "$x = buf [ i + 1 ] 2 +");
}

#[test]
fn test_source_order() {
    assert_eq!(
        parse_line("$x = (a + b) * c", ExprOrder::Source).unwrap(),
        "$x = ( a + b ) * c"
    );
}

#[test]
fn test_mismatched_parentheses() {
    let err = parse_line("$x = (a + b", ExprOrder::Rpn).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::MismatchedParens);
    assert_eq!(err.token, "(");
}

#[test]
fn test_stops_at_end_marker() {
    let output = lex("STATES @S\nIdle | x == 1 | @In | Busy ;\nEND");
    let mut stream = TokenStream::new(&output.tokens);
    while stream.peek().text != "x" {
        stream.next();
    }
    let ids = parse_expr(
        &mut stream,
        &[TokenKind::StateTableDelim, TokenKind::Termination],
        ExprOrder::Rpn,
    )
    .unwrap();
    assert_eq!(ids.len(), 3);
    assert_eq!(stream.peek_kind(), TokenKind::StateTableDelim);
}
