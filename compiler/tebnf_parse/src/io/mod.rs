//! INPUT and OUTPUT element bodies.
//!
//! ```text
//! INPUT @In = TCP_IP; END
//! INPUT @In = @Other; END
//! INPUT @In AS @Other END
//! INPUT @In = CONSOLE
//!     name = TYPE = "prompt";
//! END
//! ```

use tebnf_ir::{
    IoChannel, NodeId, ParentRelation, SiblingRelation, SubElementRole, TokenKind,
};
use tebnf_types::infer_literal;

use crate::{Deferred, ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    pub(crate) fn parse_io(&mut self, element: NodeId) -> Result<(), ParseError> {
        if self.stream.peek_kind() == TokenKind::As {
            return self.parse_alias(element);
        }
        if self.stream.eat(TokenKind::Assign).is_none() {
            return Err(self.io_error("expected `=` or AS after the element name"));
        }

        let token = self.stream.peek();
        let mut channel = None;
        match token.kind {
            TokenKind::IoType => {
                channel = IoChannel::from_keyword(&token.text);
                if channel.is_none() {
                    return Err(self.io_error("unknown IO type"));
                }
            }
            TokenKind::ElementName => {
                let source = self.stream.peek_id();
                self.ctx.deferred.push(Deferred::IoSource { element, source });
            }
            _ => return Err(self.io_error("expected an IO type or element name")),
        }
        if let Some(data) = self.tree.element_mut(element) {
            data.channel = channel;
        }
        self.stream.next();
        self.stream.eat(TokenKind::Termination);

        if channel == Some(IoChannel::Console) {
            while self.stream.peek_kind() == TokenKind::SymbolConsole {
                self.parse_console_binding(element)?;
            }
        }
        match self.stream.peek_kind() {
            TokenKind::End | TokenKind::Eof => Ok(()),
            kind if kind.is_element_keyword() => Ok(()),
            _ => Err(self.io_error("expected END")),
        }
    }

    /// `name = TYPE = "prompt";`
    fn parse_console_binding(&mut self, element: NodeId) -> Result<(), ParseError> {
        let tokens = self.stream.tokens();
        let name = self.stream.peek();
        let name_id = self.stream.peek_id();
        self.stream.next();
        if self.stream.eat(TokenKind::Assign).is_none() {
            return Err(self.io_error("expected `=` after the binding name"));
        }

        let typed = self.stream.peek();
        let typed_id = self.stream.peek_id();
        if typed.kind != TokenKind::Typed {
            return Err(self.io_error("expected a type"));
        }
        let ty = self.sized(typed)?;
        self.stream.next();
        if self.stream.eat(TokenKind::Assign).is_none() {
            return Err(self.io_error("expected `=` before the prompt"));
        }

        let prompt = self.stream.peek();
        let prompt_id = self.stream.peek_id();
        if prompt.kind != TokenKind::Str {
            return Err(self.io_error("expected a prompt string"));
        }
        let prompt_ty = infer_literal(prompt)?;
        self.stream.next();
        if self.stream.eat(TokenKind::Termination).is_none() {
            return Err(self.io_error("console binding is not terminated"));
        }

        if let Some(existing) = self.tree.find_child(element, &name.text) {
            let first_line = tokens[self.tree[existing].token].line;
            self.ctx.error(ParseError::at(
                ParseErrorKind::DuplicateMember { first_line },
                name,
            ));
        }

        let binding = self
            .tree
            .alloc_sub_element(name.text.clone(), name_id, SubElementRole::Plain);
        let typed_node =
            self.tree
                .alloc_sub_element(typed.text.clone(), typed_id, SubElementRole::Plain);
        let prompt_node =
            self.tree
                .alloc_sub_element(prompt.text.clone(), prompt_id, SubElementRole::Plain);

        self.tree.node_mut(binding).ty = Some(ty.clone());
        self.tree.node_mut(typed_node).ty = Some(ty);
        self.tree.node_mut(prompt_node).ty = Some(prompt_ty);
        for node in [binding, typed_node, prompt_node] {
            if let Some(data) = self.tree.sub_element_mut(node) {
                data.resolved = true;
            }
        }
        if let Some(data) = self.tree.sub_element_mut(binding) {
            data.relation_to_parent = Some(ParentRelation::Assign);
        }
        if let Some(data) = self.tree.sub_element_mut(typed_node) {
            data.relation_to_parent = Some(ParentRelation::Assign);
            data.assign_cast_to = Some(binding);
        }
        if let Some(data) = self.tree.sub_element_mut(prompt_node) {
            data.relation_to_sibling = Some(SiblingRelation::Concat);
        }

        self.tree.add_child(binding, typed_node);
        self.tree.add_child(binding, prompt_node);
        self.tree.add_child(element, binding);
        Ok(())
    }

    fn io_error(&self, message: &'static str) -> ParseError {
        ParseError::at(ParseErrorKind::InvalidIo(message), self.stream.peek())
    }
}
