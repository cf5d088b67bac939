//! Parser and symbol resolver for TEBNF.
//!
//! The top-level loop reads one element at a time and hands its body to the
//! sub-parser for its kind:
//! - `GRAMMAR`: members built from literals, sized types, references,
//!   ranges and size casts
//! - `ACTIONS`: an optional parameter list and RPN action lines
//! - `INPUT` / `OUTPUT`: a channel, an element to copy, or console bindings
//! - `STATES`: six-column transition rows
//!
//! After every element is read, the resolver links symbol references,
//! aliases and state-table cells, iterating to a fixpoint so members can
//! refer to members declared after them.
//!
//! Errors do not stop the parse: a failing element is skipped up to its
//! `END` and the loop carries on, so one run reports as much as it can.

mod actions;
mod context;
pub mod expr;
mod grammar;
mod io;
mod parse_error;
mod pending;
mod resolve;
mod states;
mod stream;

pub use context::{CompilationContext, Deferred, RowSlot};
pub use expr::{parse_expr, ExprOrder};
pub use parse_error::{ParseError, ParseErrorKind};
pub use pending::PendingTable;
pub use resolve::members;
pub use stream::{Direction, TokenStream};

use tebnf_diagnostic::Diagnostic;
use tebnf_ir::{ElementKind, ElementTable, NodeId, SyntaxTree, TokenKind, TokenList};

/// Result of parsing and resolving one source text.
#[derive(Debug)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    /// Elements that reached `END`, by name.
    pub elements: ElementTable,
    /// Syntactic and semantic errors in the order found.
    pub errors: Vec<ParseError>,
    /// Advisory diagnostics.
    pub warnings: Vec<Diagnostic>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors and warnings as diagnostics.
    pub fn diagnostics(&self) -> impl Iterator<Item = Diagnostic> + '_ {
        self.errors
            .iter()
            .map(ParseError::to_diagnostic)
            .chain(self.warnings.iter().cloned())
    }
}

/// Parser state for one token stream.
pub(crate) struct Parser<'a> {
    stream: TokenStream<'a>,
    tree: SyntaxTree,
    elements: ElementTable,
    ctx: CompilationContext,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a TokenList) -> Self {
        Parser {
            stream: TokenStream::new(tokens),
            tree: SyntaxTree::new(),
            elements: ElementTable::new(),
            ctx: CompilationContext::new(),
        }
    }

    fn parse_elements(&mut self) {
        while !self.stream.at_end() {
            if self.stream.peek_kind().is_element_keyword() {
                self.parse_element();
            } else {
                let err = ParseError::at(ParseErrorKind::ExpectedElement, self.stream.peek());
                self.ctx.error(err);
                self.skip_element();
            }
        }
    }

    /// `KEYWORD @Name body END`
    fn parse_element(&mut self) {
        let keyword = self.stream.peek();
        let Some(kind) = ElementKind::from_keyword(keyword.kind) else {
            return;
        };
        let name_token = self.stream.next();
        if name_token.kind != TokenKind::ElementName {
            self.ctx
                .error(ParseError::at(ParseErrorKind::MissingName, name_token));
            self.skip_element();
            return;
        }
        let element = self
            .tree
            .alloc_element(kind, name_token.text.clone(), self.stream.peek_id());
        self.ctx.element_kind = Some(kind);
        self.stream.next();

        let body = match kind {
            ElementKind::Grammar => self.parse_grammar(element),
            ElementKind::Actions => self.parse_actions(element),
            ElementKind::StateTable => self.parse_state_table(element),
            ElementKind::Input | ElementKind::Output => self.parse_io(element),
        };
        self.ctx.element_kind = None;
        self.ctx.size_cast = None;

        if let Err(err) = body {
            self.ctx.error(err);
            self.skip_element();
            return;
        }
        if self.stream.eat(TokenKind::End).is_none() {
            let err = ParseError::at(ParseErrorKind::MissingEnd, self.stream.peek());
            self.ctx.error(err);
            return;
        }
        if let Some(data) = self.tree.element_mut(element) {
            data.ended = true;
        }
        self.register(element);
    }

    /// Add an ended element to the by-name table.
    fn register(&mut self, element: NodeId) {
        let node = &self.tree[element];
        if let Err(existing) = self.elements.insert(&node.name, element) {
            let tokens = self.stream.tokens();
            let first_line = tokens[self.tree[existing].token].line;
            let err = ParseError::at(
                ParseErrorKind::DuplicateElement { first_line },
                &tokens[node.token],
            );
            self.ctx.error(err);
        } else {
            tracing::debug!(name = %node.name, kind = ?self.tree.element(element).map(|e| e.kind), "element");
        }
    }

    /// `AS @Other`, shared by grammar and IO elements.
    fn parse_alias(&mut self, element: NodeId) -> Result<(), ParseError> {
        self.stream.next();
        let target = self
            .stream
            .eat(TokenKind::ElementName)
            .ok_or_else(|| self.unexpected("an element name after AS"))?;
        self.stream.eat(TokenKind::Termination);
        self.ctx.deferred.push(Deferred::Alias { element, target });
        Ok(())
    }

    /// Skip past the next `END`, or up to the next element keyword.
    fn skip_element(&mut self) {
        loop {
            match self.stream.peek_kind() {
                TokenKind::Eof => return,
                TokenKind::End => {
                    self.stream.next();
                    return;
                }
                kind if kind.is_element_keyword() => return,
                _ => {
                    self.stream.next();
                }
            }
        }
    }

    /// The current token as an "expected ..." error.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::at(ParseErrorKind::Unexpected(expected), self.stream.peek())
    }

    /// Consume a token of `kind` or fail with `expected`.
    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), ParseError> {
        self.stream
            .eat(kind)
            .map(|_| ())
            .ok_or_else(|| self.unexpected(expected))
    }

    fn finish(mut self) -> ParseOutput {
        resolve::resolve(
            &mut self.tree,
            &self.elements,
            self.stream.tokens(),
            &mut self.ctx,
        );
        ParseOutput {
            tree: self.tree,
            elements: self.elements,
            errors: self.ctx.errors,
            warnings: self.ctx.warnings,
        }
    }
}

/// Parse a lexed token stream and resolve its references.
#[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.stream_len()))]
pub fn parse(tokens: &TokenList) -> ParseOutput {
    let mut parser = Parser::new(tokens);
    parser.parse_elements();
    let output = parser.finish();
    tracing::debug!(
        elements = output.elements.len(),
        nodes = output.tree.len(),
        errors = output.errors.len(),
        "parsed"
    );
    output
}
