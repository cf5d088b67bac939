//! ACTIONS element bodies: an optional parameter list, then one RPN
//! action line per `;`.

use tebnf_ir::{NodeId, SubElementRole, Token, TokenKind};

use crate::{parse_expr, ExprOrder, ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    pub(crate) fn parse_actions(&mut self, element: NodeId) -> Result<(), ParseError> {
        let named_only = self.stream.last().is_some_and(Token::is_last_signature);
        if !named_only && self.stream.peek_kind() == TokenKind::LeftParen {
            self.parse_params(element)?;
        }

        loop {
            match self.stream.peek_kind() {
                TokenKind::End | TokenKind::Eof => return Ok(()),
                kind if kind.is_element_keyword() => return Ok(()),
                TokenKind::Termination => {
                    self.stream.next();
                    continue;
                }
                _ => {}
            }
            let name = self.stream.peek().text.clone();
            let token = self.stream.peek_id();
            let tokens = parse_expr(&mut self.stream, &[TokenKind::Termination], ExprOrder::Rpn)?;
            self.expect(TokenKind::Termination, "`;` after the action")?;
            let line = self
                .tree
                .alloc_sub_element(name, token, SubElementRole::ActionLine { tokens });
            if let Some(data) = self.tree.sub_element_mut(line) {
                data.resolved = true;
            }
            self.tree.add_child(element, line);
        }
    }

    /// `( $a, $b )`
    fn parse_params(&mut self, element: NodeId) -> Result<(), ParseError> {
        self.stream.next();
        let mut expect_param = true;
        loop {
            let token = self.stream.peek();
            match token.kind {
                TokenKind::ActionsParam if expect_param => {
                    let id = self.stream.peek_id();
                    if let Some(data) = self.tree.element_mut(element) {
                        data.params.push(id);
                    }
                    expect_param = false;
                }
                TokenKind::ActionsParamDelim if !expect_param => expect_param = true,
                TokenKind::RightParen if token.is_last_signature() => {
                    let empty_list = self.stream.last().is_some_and(|t| t.kind == TokenKind::LeftParen);
                    if expect_param && !empty_list {
                        return Err(ParseError::at(ParseErrorKind::InvalidParam, token));
                    }
                    self.stream.next();
                    return Ok(());
                }
                _ => return Err(ParseError::at(ParseErrorKind::InvalidParam, token)),
            }
            self.stream.next();
        }
    }
}
