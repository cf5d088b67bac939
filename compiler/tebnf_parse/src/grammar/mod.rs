//! GRAMMAR element bodies.
//!
//! ```text
//! GRAMMAR @Name [= size_symbol;]
//!     member = term (( , | '|' ) term)* ;
//!     $var = expression ;
//! END
//! term = [ (TYPE[{range}]) ] (literal | TYPE | symbol | @Element | @E.member) [{range}]
//! ```

use tebnf_ir::{
    snake_case, NodeId, ParentRelation, ResolvedType, SiblingRelation, SubElementRole, Token,
    TokenId, TokenKind, TypeRange,
};
use tebnf_types::{apply_range, infer_literal, precision_advisory, range_bound, sized_type};

use crate::{parse_expr, Direction, ExprOrder, ParseError, ParseErrorKind, Parser};

impl Parser<'_> {
    pub(crate) fn parse_grammar(&mut self, element: NodeId) -> Result<(), ParseError> {
        match self.stream.peek_kind() {
            TokenKind::As => return self.parse_alias(element),
            TokenKind::Assign
                if self.stream.peek_at(1, Direction::Forward).kind
                    == TokenKind::SymbolGrammarSize =>
            {
                let size = self.stream.next().text.clone();
                self.stream.next();
                self.expect(TokenKind::Termination, "`;` after the size symbol")?;
                if let Some(data) = self.tree.element_mut(element) {
                    data.grammar_size = Some(size);
                }
            }
            _ => {}
        }

        loop {
            match self.stream.peek_kind() {
                TokenKind::End | TokenKind::Eof => return Ok(()),
                kind if kind.is_element_keyword() => return Ok(()),
                TokenKind::Termination => {
                    self.stream.next();
                }
                TokenKind::StaticVar => self.parse_static_line(element)?,
                TokenKind::SymbolGrammar => self.parse_member(element)?,
                _ => return Err(self.unexpected("a member declaration or END")),
            }
        }
    }

    /// `$var = expression ;`, kept as an action line in RPN.
    fn parse_static_line(&mut self, element: NodeId) -> Result<(), ParseError> {
        let name = self.stream.peek().text.clone();
        let token = self.stream.peek_id();
        let tokens = parse_expr(&mut self.stream, &[TokenKind::Termination], ExprOrder::Rpn)?;
        self.expect(TokenKind::Termination, "`;` after the assignment")?;
        let line = self
            .tree
            .alloc_sub_element(name, token, SubElementRole::ActionLine { tokens });
        if let Some(data) = self.tree.sub_element_mut(line) {
            data.resolved = true;
        }
        self.tree.add_child(element, line);
        Ok(())
    }

    /// `member = term, term | term ;`
    fn parse_member(&mut self, element: NodeId) -> Result<(), ParseError> {
        let tokens = self.stream.tokens();
        let name_token = self.stream.peek();
        let name_id = self.stream.peek_id();
        self.stream.next();
        self.expect(TokenKind::Assign, "`=` after the member name")?;

        if snake_case(&name_token.text) == snake_case(&self.tree[element].name) {
            self.ctx
                .error(ParseError::at(ParseErrorKind::SelfNamedMember, name_token));
        }
        if let Some(existing) = self.tree.find_child(element, &name_token.text) {
            let first_line = tokens[self.tree[existing].token].line;
            self.ctx.error(ParseError::at(
                ParseErrorKind::DuplicateMember { first_line },
                name_token,
            ));
        }

        let member =
            self.tree
                .alloc_sub_element(name_token.text.clone(), name_id, SubElementRole::Plain);
        if let Some(data) = self.tree.sub_element_mut(member) {
            data.relation_to_parent = Some(ParentRelation::Assign);
        }
        self.tree.add_child(element, member);

        let mut relation = None;
        loop {
            let term = self.parse_term(element, member, relation)?;
            if self.stream.peek_kind() == TokenKind::RangeLeft {
                self.parse_term_range(element, member, term)?;
            }
            relation = match self.stream.peek_kind() {
                TokenKind::Concat => Some(SiblingRelation::Concat),
                TokenKind::Or => Some(SiblingRelation::Alternate),
                TokenKind::Termination => {
                    self.stream.next();
                    return Ok(());
                }
                TokenKind::End => return Ok(()),
                _ => return Err(self.unexpected("one of `,`, `|`, `;`, `{` or END")),
            };
            self.stream.next();
        }
    }

    fn parse_term(
        &mut self,
        element: NodeId,
        member: NodeId,
        relation: Option<SiblingRelation>,
    ) -> Result<NodeId, ParseError> {
        if self.stream.peek_kind() == TokenKind::TypeCastLeft {
            self.parse_size_cast()?;
        }
        let token = self.stream.peek();
        let id = self.stream.peek_id();
        let mut ty = match token.kind {
            kind if kind.is_literal() => Some(infer_literal(token)?),
            TokenKind::Typed => Some(self.sized(token)?),
            TokenKind::SymbolGrammar | TokenKind::ElementName => None,
            _ => return Err(self.unexpected("a literal, type, symbol or element name")),
        };
        let cast = self.ctx.size_cast.take();
        if cast.is_some() && ty.is_none() {
            return Err(self.unexpected("a literal or type after the size cast"));
        }
        if let (Some(cast), Some(ty)) = (&cast, &mut ty) {
            *ty = ResolvedType {
                literal: ty.literal,
                ..cast.clone()
            };
        }

        let term = self
            .tree
            .alloc_sub_element(token.text.clone(), id, SubElementRole::Plain);
        self.tree.node_mut(term).ty = ty.clone();
        if let Some(data) = self.tree.sub_element_mut(term) {
            data.resolved = ty.is_some();
            data.size_cast = cast;
            data.relation_to_sibling = relation;
            if relation.is_none() {
                data.relation_to_parent = Some(ParentRelation::Assign);
                data.assign_cast_to = Some(member);
            }
        }
        if token.kind == TokenKind::Typed {
            if let Some(data) = self.tree.element_mut(element) {
                data.last_terminal = None;
            }
        }
        self.tree.add_child(member, term);
        self.stream.next();
        Ok(term)
    }

    /// `(TYPE)` or `(TYPE{range})`; the type waits in the context for the
    /// next term.
    fn parse_size_cast(&mut self) -> Result<(), ParseError> {
        let token = self.stream.next();
        if token.kind != TokenKind::Typed {
            return Err(self.unexpected("a type inside the size cast"));
        }
        let mut ty = self.sized(token)?;
        self.stream.next();
        if self.stream.peek_kind() == TokenKind::RangeLeft {
            let (range, close) = self.parse_range()?;
            ty = apply_range(&ty, range, &self.stream.tokens()[close])?;
        }
        self.expect(TokenKind::TypeCastRight, "`)` closing the size cast")?;
        self.ctx.size_cast = Some(ty);
        Ok(())
    }

    fn parse_term_range(
        &mut self,
        element: NodeId,
        member: NodeId,
        term: NodeId,
    ) -> Result<(), ParseError> {
        let (range, close) = self.parse_range()?;
        let tokens = self.stream.tokens();
        let ty = match &self.tree[term].ty {
            Some(ty) if !ty.literal => ty.clone(),
            _ => {
                return Err(ParseError::at(
                    ParseErrorKind::InvalidRange,
                    &tokens[self.tree[term].token],
                ))
            }
        };
        let open_ended = range.is_open_ended();
        let ranged = apply_range(&ty, range, &tokens[close])?;
        self.tree.node_mut(term).ty = Some(ranged);
        if open_ended {
            if let Some(data) = self.tree.element_mut(element) {
                data.last_terminal = Some(member);
            }
        }
        Ok(())
    }

    /// `{min,max}` and its shorthand forms. Returns the range and the id of
    /// the closing `}`.
    fn parse_range(&mut self) -> Result<(TypeRange, TokenId), ParseError> {
        self.stream.next();
        let mut min = None;
        let mut max = None;
        let mut delimited = false;
        let mut count = 0;
        loop {
            let token = self.stream.peek();
            count += 1;
            match token.kind {
                TokenKind::RangeValue => {
                    let slot = if delimited { &mut max } else { &mut min };
                    if slot.is_some() {
                        return Err(ParseError::at(ParseErrorKind::InvalidRange, token));
                    }
                    *slot = Some(range_bound(token)?);
                }
                TokenKind::RangeDelim if !delimited => delimited = true,
                TokenKind::RangeRight => {
                    let close = self.stream.peek_id();
                    self.stream.next();
                    if !delimited {
                        // `{10}` bounds from above
                        max = min.take();
                    }
                    return Ok((TypeRange::classify(min, max, count), close));
                }
                _ => return Err(ParseError::at(ParseErrorKind::InvalidRange, token)),
            }
            self.stream.next();
        }
    }

    pub(crate) fn sized(&mut self, token: &Token) -> Result<ResolvedType, ParseError> {
        let ty = sized_type(token)?;
        if let Some(warning) = precision_advisory(token, &ty) {
            self.ctx.warnings.push(warning);
        }
        Ok(ty)
    }
}
