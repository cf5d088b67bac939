//! Shunting-yard expression parser shared by grammar, actions and state
//! table lines.
//!
//! Only arithmetic, equality and relational operators move through the
//! operator stack; assignment and every other token go straight to the
//! output, so `$c = $c + 1` comes out as `$c = $c 1 +`. A lower
//! [`Token::precedence`] value binds tighter. The contents of `[...]` are
//! copied through as they appear.

use smallvec::SmallVec;
use tebnf_ir::{Associativity, Token, TokenId, TokenKind};

use crate::{ParseError, ParseErrorKind, TokenStream};

/// Which ordering `parse_expr` returns.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ExprOrder {
    /// The tokens as written.
    Source,
    /// Reverse Polish notation.
    Rpn,
}

/// Whether the incoming operator pops `top` off the stack.
fn yields_to(incoming: &Token, top: &Token) -> bool {
    if !top.is_stack_operator() {
        return false;
    }
    let (p_in, p_top) = (incoming.precedence(), top.precedence());
    p_top < p_in || (p_top == p_in && incoming.associativity() == Associativity::Left)
}

/// Parse from the current token up to (not including) the first token whose
/// kind is in `end`. `END` and end of input always stop the scan.
pub fn parse_expr(
    stream: &mut TokenStream<'_>,
    end: &[TokenKind],
    order: ExprOrder,
) -> Result<Vec<TokenId>, ParseError> {
    let tokens = stream.tokens();
    let mut source = Vec::new();
    let mut output = Vec::new();
    let mut stack: SmallVec<[TokenId; 8]> = SmallVec::new();
    let mut subscript_depth = 0usize;

    loop {
        let token = stream.peek();
        let id = stream.peek_id();
        if end.contains(&token.kind) || matches!(token.kind, TokenKind::End | TokenKind::Eof) {
            break;
        }
        if subscript_depth > 0 {
            match token.kind {
                TokenKind::ArrayLeft => subscript_depth += 1,
                TokenKind::ArrayRight => subscript_depth -= 1,
                _ => {}
            }
            output.push(id);
        } else {
            match token.kind {
                TokenKind::ArrayLeft => {
                    subscript_depth = 1;
                    output.push(id);
                }
                TokenKind::LeftParen => stack.push(id),
                TokenKind::RightParen => loop {
                    match stack.pop() {
                        Some(top) if tokens[top].kind == TokenKind::LeftParen => break,
                        Some(top) => output.push(top),
                        None => return Err(ParseError::at(ParseErrorKind::MismatchedParens, token)),
                    }
                },
                _ if token.is_stack_operator() => {
                    while let Some(&top) = stack.last() {
                        if !yields_to(token, &tokens[top]) {
                            break;
                        }
                        output.push(top);
                        stack.pop();
                    }
                    stack.push(id);
                }
                _ => output.push(id),
            }
        }
        source.push(id);
        stream.next();
    }

    while let Some(top) = stack.pop() {
        if tokens[top].kind == TokenKind::LeftParen {
            return Err(ParseError::at(ParseErrorKind::MismatchedParens, &tokens[top]));
        }
        output.push(top);
    }
    tracing::trace!(tokens = source.len(), ?order, "parsed expression");
    Ok(match order {
        ExprOrder::Source => source,
        ExprOrder::Rpn => output,
    })
}

#[cfg(test)]
mod tests;
