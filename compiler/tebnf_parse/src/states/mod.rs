//! STATES element bodies.
//!
//! Each row has up to six `|`-separated cells and ends with `;`:
//!
//! ```text
//! state | condition | input method | next state | output or action | output method ;
//! ```
//!
//! An empty state cell continues the previous state: with an empty
//! condition the row becomes `<state>_else`, otherwise
//! `<state>_else_if_N`. Cells naming elements are looked up by the
//! resolver once every element has been read.

use tebnf_ir::{
    Condition, NodeId, RowOutput, StateRow, SubElementRole, Token, TokenId, TokenKind,
};

use crate::{
    parse_expr, Deferred, Direction, ExprOrder, ParseError, ParseErrorKind, Parser, RowSlot,
};

/// Tokens that end a cell.
const CELL_END: [TokenKind; 3] = [
    TokenKind::StateTableDelim,
    TokenKind::Termination,
    TokenKind::End,
];

/// A cell naming an element or `@E.member`.
fn is_reference(token: &Token) -> bool {
    token.kind == TokenKind::ElementName || token.accessed.is_some()
}

/// Invocation arguments kept from an output expression.
fn is_argument(token: &Token) -> bool {
    token.kind.is_literal()
        || matches!(
            token.kind,
            TokenKind::SymbolStateTable | TokenKind::StaticVar | TokenKind::SymbolActions
        )
}

#[derive(Copy, Clone, Debug)]
enum Cell {
    Condition,
    InputMethod,
    NextState,
    Output,
    OutputMethod,
}

const CELLS: [Cell; 5] = [
    Cell::Condition,
    Cell::InputMethod,
    Cell::NextState,
    Cell::Output,
    Cell::OutputMethod,
];

/// State carried from row to row.
#[derive(Default)]
struct RowCursor {
    state: Option<String>,
    else_if: usize,
}

impl Parser<'_> {
    pub(crate) fn parse_state_table(&mut self, element: NodeId) -> Result<(), ParseError> {
        let mut cursor = RowCursor::default();
        loop {
            match self.stream.peek_kind() {
                TokenKind::End | TokenKind::Eof => return Ok(()),
                kind if kind.is_element_keyword() => return Ok(()),
                TokenKind::Termination => {
                    self.stream.next();
                }
                _ => self.parse_row(element, &mut cursor)?,
            }
        }
    }

    fn parse_row(&mut self, element: NodeId, cursor: &mut RowCursor) -> Result<(), ParseError> {
        let token = self.stream.peek();
        let row_token = self.stream.peek_id();
        let state = match token.kind {
            TokenKind::SymbolStateTable => {
                self.stream.next();
                cursor.state = Some(token.text.clone());
                cursor.else_if = 1;
                token.text.clone()
            }
            TokenKind::StateTableDelim => {
                let Some(current) = &cursor.state else {
                    return Err(self.row_error("a continuation row needs a preceding state"));
                };
                let empty_condition =
                    self.stream.peek_at(1, Direction::Forward).kind == TokenKind::StateTableDelim;
                if empty_condition {
                    format!("{current}_else")
                } else {
                    let name = format!("{current}_else_if_{}", cursor.else_if);
                    cursor.else_if += 1;
                    name
                }
            }
            _ => return Err(self.row_error("expected a state name")),
        };

        let row = self.tree.alloc_sub_element(
            state.clone(),
            row_token,
            SubElementRole::StateRow(StateRow::new(state)),
        );
        if let Some(data) = self.tree.sub_element_mut(row) {
            data.resolved = true;
        }
        self.tree.add_child(element, row);

        for cell in CELLS {
            if self.stream.eat(TokenKind::StateTableDelim).is_none() {
                break;
            }
            if CELL_END.contains(&self.stream.peek_kind()) {
                continue;
            }
            self.parse_cell(row, cell)?;
        }
        self.stream.eat(TokenKind::StateTableDelim);
        match self.stream.peek_kind() {
            TokenKind::Termination => {
                self.stream.next();
                Ok(())
            }
            TokenKind::End => Ok(()),
            _ => Err(self.row_error("expected `;` after the row")),
        }
    }

    fn parse_cell(&mut self, row: NodeId, cell: Cell) -> Result<(), ParseError> {
        let token = self.stream.peek();
        let id = self.stream.peek_id();
        let single = CELL_END.contains(&self.stream.peek_at(1, Direction::Forward).kind);
        match cell {
            Cell::Condition if single && is_reference(token) => {
                self.defer_row(row, RowSlot::Condition, id, Vec::new());
                self.stream.next();
            }
            Cell::Condition => {
                let tokens = parse_expr(&mut self.stream, &CELL_END, ExprOrder::Rpn)?;
                self.row_mut(row, |r| r.condition = Condition::Expr(tokens));
            }
            Cell::InputMethod if single && is_reference(token) => {
                self.defer_row(row, RowSlot::InputMethod, id, Vec::new());
                self.stream.next();
            }
            Cell::InputMethod => {
                return Err(self.row_error("expected an input element or member"));
            }
            Cell::NextState if single && token.kind == TokenKind::SymbolStateTable => {
                let next = token.text.clone();
                self.row_mut(row, |r| r.next_state = Some(next));
                self.stream.next();
            }
            Cell::NextState => return Err(self.row_error("expected the next state")),
            Cell::Output if single && is_reference(token) => {
                self.defer_row(row, RowSlot::Output, id, Vec::new());
                self.stream.next();
            }
            Cell::Output => {
                let tokens = parse_expr(&mut self.stream, &CELL_END, ExprOrder::Rpn)?;
                let all = self.stream.tokens();
                match tokens.first() {
                    Some(&call) if all[call].kind == TokenKind::ElementName => {
                        let args = tokens
                            .iter()
                            .copied()
                            .filter(|&t| is_argument(&all[t]))
                            .collect();
                        self.defer_row(row, RowSlot::Output, call, args);
                    }
                    _ => self.row_mut(row, |r| r.output = Some(RowOutput::Expr(tokens))),
                }
            }
            Cell::OutputMethod if single && token.kind == TokenKind::ElementName => {
                self.defer_row(row, RowSlot::OutputMethod, id, Vec::new());
                self.stream.next();
            }
            Cell::OutputMethod => return Err(self.row_error("expected an output element")),
        }
        Ok(())
    }

    fn defer_row(&mut self, row: NodeId, slot: RowSlot, token: TokenId, args: Vec<TokenId>) {
        self.ctx.deferred.push(Deferred::Row {
            row,
            slot,
            token,
            args,
        });
    }

    fn row_mut(&mut self, row: NodeId, f: impl FnOnce(&mut StateRow)) {
        if let Some(data) = self.tree.sub_element_mut(row) {
            if let SubElementRole::StateRow(state_row) = &mut data.role {
                f(state_row);
            }
        }
    }

    fn row_error(&self, message: &'static str) -> ParseError {
        ParseError::at(ParseErrorKind::InvalidStateRow(message), self.stream.peek())
    }
}
