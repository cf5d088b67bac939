//! Symbol resolution.
//!
//! Runs once every element has been read:
//! 1. Aliases, IO sources and state-table cells are linked to the elements
//!    they name.
//! 2. Grammar terms that refer to members or elements are tried once; each
//!    one that cannot resolve yet goes into the pending table under the name
//!    it waits on.
//! 3. The pending table is re-scanned until a pass makes no progress. A
//!    member is complete once all its terms are, and an element once all
//!    its members are.
//! 4. Whatever is left is reported in one batch: names with no declaration
//!    if there are any, otherwise the names caught in a reference cycle.

use rustc_hash::FxHashSet;
use tebnf_ir::{
    Condition, ElementKind, ElementTable, NodeId, ParentRelation, RangeBound, ResolvedType,
    RowOutput, SiblingRelation, SubElementRole, SyntaxTree, Target, TokenId, TokenKind, TokenList,
};
use tebnf_types::TypeErrorKind;

use crate::{CompilationContext, Deferred, ParseError, ParseErrorKind, RowSlot};

/// Why a term could not resolve on this pass.
struct Wait {
    name: String,
    /// Nothing of that name is declared.
    missing: bool,
}

impl Wait {
    fn missing(name: impl Into<String>) -> Self {
        Wait {
            name: name.into(),
            missing: true,
        }
    }

    fn unresolved(name: impl Into<String>) -> Self {
        Wait {
            name: name.into(),
            missing: false,
        }
    }
}

/// The members of a grammar element, in declaration order.
pub fn members(tree: &SyntaxTree, element: NodeId) -> Vec<NodeId> {
    tree[element]
        .children
        .iter()
        .copied()
        .filter(|&child| is_member(tree, child))
        .collect()
}

fn is_member(tree: &SyntaxTree, node: NodeId) -> bool {
    tree.sub_element(node).is_some_and(|data| {
        data.relation_to_parent == Some(ParentRelation::Assign)
            && matches!(data.role, SubElementRole::Plain)
            && tree[node].parent.is_some_and(|p| tree[p].is_element())
    })
}

struct Resolver<'a> {
    tree: &'a mut SyntaxTree,
    elements: &'a ElementTable,
    tokens: &'a TokenList,
    ctx: &'a mut CompilationContext,
    /// Undeclared names found outside the grammar fixpoint.
    undeclared: Vec<(String, TokenId)>,
}

#[tracing::instrument(level = "debug", skip_all, fields(elements = elements.len()))]
pub(crate) fn resolve(
    tree: &mut SyntaxTree,
    elements: &ElementTable,
    tokens: &TokenList,
    ctx: &mut CompilationContext,
) {
    let mut resolver = Resolver {
        tree,
        elements,
        tokens,
        ctx,
        undeclared: Vec::new(),
    };
    let deferred = std::mem::take(&mut resolver.ctx.deferred);
    resolver.link_elements(&deferred);
    resolver.seed();
    resolver.fixpoint();
    resolver.check_range_bounds();
    resolver.link_rows(&deferred);
    resolver.report();
}

impl Resolver<'_> {
    /// Follow alias links to the element that owns the layout.
    fn base_of(&self, element: NodeId) -> NodeId {
        let mut current = element;
        for _ in 0..=self.elements.len() {
            match self.tree.element(current).and_then(|e| e.alias_of) {
                Some(next) => current = next,
                None => return current,
            }
        }
        current
    }

    fn element_kind(&self, element: NodeId) -> Option<ElementKind> {
        self.tree.element(element).map(|e| e.kind)
    }

    fn lookup(&mut self, token: TokenId) -> Option<NodeId> {
        let name = &self.tokens[token].text;
        let found = self.elements.get(name);
        if found.is_none() {
            self.undeclared.push((name.clone(), token));
        }
        found
    }

    fn link_elements(&mut self, deferred: &[Deferred]) {
        for link in deferred {
            match *link {
                Deferred::Alias { element, target } => {
                    let Some(found) = self.lookup(target) else {
                        continue;
                    };
                    let same_kind = self.element_kind(found) == self.element_kind(element);
                    if found == element || !same_kind {
                        self.error(ParseErrorKind::InvalidAlias, target);
                        continue;
                    }
                    if let Some(data) = self.tree.element_mut(element) {
                        data.alias_of = Some(found);
                    }
                }
                Deferred::IoSource { element, source } => {
                    let Some(found) = self.lookup(source) else {
                        continue;
                    };
                    if !self.element_kind(found).is_some_and(ElementKind::is_io) {
                        let name = self.tokens[source].text.clone();
                        self.error(
                            ParseErrorKind::WrongElementKind(name, "an INPUT or OUTPUT element"),
                            source,
                        );
                        continue;
                    }
                    if let Some(data) = self.tree.element_mut(element) {
                        data.io_source = Some(found);
                    }
                }
                Deferred::Row { .. } => {}
            }
        }

        let elements = self.elements;
        for element in elements.iter() {
            let aliased = self.tree.element(element).is_some_and(|e| e.alias_of.is_some());
            let base = self.base_of(element);
            let cyclic = self.tree.element(base).is_some_and(|e| e.alias_of.is_some());
            if aliased && cyclic {
                let token = self.tree[element].token;
                self.error(ParseErrorKind::InvalidAlias, token);
                if let Some(data) = self.tree.element_mut(element) {
                    data.alias_of = None;
                }
            }
        }

        for element in elements.iter() {
            let mut source = self.tree.element(element).and_then(|e| e.io_source);
            let mut channel = None;
            for _ in 0..self.elements.len() {
                let Some(from) = source.and_then(|s| self.tree.element(s)) else {
                    break;
                };
                channel = from.channel;
                if channel.is_some() {
                    break;
                }
                source = from.io_source;
            }
            if let (Some(channel), Some(data)) = (channel, self.tree.element_mut(element)) {
                data.channel = Some(channel);
            }
        }
    }

    fn grammar_elements(&self) -> Vec<NodeId> {
        self.elements
            .iter()
            .filter(|&e| self.element_kind(e) == Some(ElementKind::Grammar))
            .collect()
    }

    /// First attempt at every reference term.
    fn seed(&mut self) {
        for element in self.grammar_elements() {
            for member in members(self.tree, element) {
                for term in self.tree[member].children.clone() {
                    if self.tree.sub_element(term).is_some_and(|d| !d.resolved) {
                        self.attempt(term);
                    }
                }
            }
        }
    }

    fn attempt(&mut self, term: NodeId) -> bool {
        match self.try_term(term) {
            Ok(()) => true,
            Err(wait) => {
                self.ctx.pending.insert(&wait.name, term, wait.missing);
                false
            }
        }
    }

    fn fixpoint(&mut self) {
        let mut round = 0usize;
        loop {
            round += 1;
            let mut progress = self.complete_all();
            for (_, nodes) in self.ctx.pending.drain() {
                for term in nodes {
                    progress |= self.attempt(term);
                }
            }
            progress |= self.complete_all();
            tracing::debug!(round, pending = self.ctx.pending.len(), progress, "resolution pass");
            if !progress {
                break;
            }
        }
    }

    fn try_term(&mut self, term: NodeId) -> Result<(), Wait> {
        let (tokens, elements) = (self.tokens, self.elements);
        let token = &tokens[self.tree[term].token];
        let Some(element) = self.tree.containing_element(term) else {
            return Ok(());
        };
        let member = self.tree[term].parent;

        let target = match (token.kind, token.accessed) {
            (TokenKind::ElementName, _) => {
                let found = elements
                    .get(&token.text)
                    .ok_or_else(|| Wait::missing(&token.text))?;
                let found = self.base_of(found);
                if self.element_kind(found) != Some(ElementKind::Grammar) {
                    let name = token.text.clone();
                    self.reject(term, ParseErrorKind::WrongElementKind(name, "a grammar element"));
                    return Ok(());
                }
                if self.tree[found].ty.is_none() {
                    return Err(Wait::unresolved(&token.text));
                }
                Target::Element(found)
            }
            (TokenKind::SymbolGrammar, Some(accessed)) => {
                let owner_name = &tokens[accessed].text;
                let owner = elements
                    .get(owner_name)
                    .ok_or_else(|| Wait::missing(owner_name))?;
                let owner = self.base_of(owner);
                let Some(found) = self
                    .tree
                    .find_child(owner, &token.text)
                    .filter(|&m| is_member(self.tree, m))
                else {
                    let kind = ParseErrorKind::UndefinedMember {
                        element: owner_name.clone(),
                        member: token.text.clone(),
                    };
                    self.reject(term, kind);
                    return Ok(());
                };
                if !self.is_resolved(found) {
                    return Err(Wait::unresolved(format!("{owner_name}.{}", token.text)));
                }
                Target::Member {
                    element: owner,
                    member: found,
                }
            }
            (TokenKind::SymbolGrammar, None) => {
                let found = self
                    .tree
                    .find_child(element, &token.text)
                    .filter(|&m| is_member(self.tree, m))
                    .ok_or_else(|| Wait::missing(&token.text))?;
                if Some(found) == member || !self.is_resolved(found) {
                    return Err(Wait::unresolved(&token.text));
                }
                Target::Member {
                    element,
                    member: found,
                }
            }
            _ => return Ok(()),
        };

        let ty = match target {
            Target::Element(e) => self.tree[e].ty.clone(),
            Target::Member { member, .. } => self.tree[member].ty.clone(),
        };
        tracing::trace!(term = %token.text, ?target, "resolved");
        self.tree.node_mut(term).ty = ty;
        if let Some(data) = self.tree.sub_element_mut(term) {
            data.target = Some(target);
            data.resolved = true;
        }
        Ok(())
    }

    /// Report an error for `term` and stop retrying it.
    fn reject(&mut self, term: NodeId, kind: ParseErrorKind) {
        let token = self.tree[term].token;
        self.error(kind, token);
        if let Some(data) = self.tree.sub_element_mut(term) {
            data.resolved = true;
        }
    }

    fn is_resolved(&self, node: NodeId) -> bool {
        self.tree.sub_element(node).is_some_and(|d| d.resolved)
    }

    /// Complete members whose terms are all resolved, then elements whose
    /// members are. Returns whether anything completed.
    fn complete_all(&mut self) -> bool {
        let mut progress = false;
        for element in self.grammar_elements() {
            if self.tree[element].ty.is_some() {
                continue;
            }
            if self.tree.element(element).is_some_and(|e| e.alias_of.is_some()) {
                let base = self.base_of(element);
                if let Some(ty) = self.tree[base].ty.clone() {
                    self.tree.node_mut(element).ty = Some(ty);
                    progress = true;
                }
                continue;
            }
            let members = members(self.tree, element);
            for &member in &members {
                progress |= self.complete_member(member);
            }
            if members.iter().all(|&m| self.is_resolved(m)) {
                self.complete_element(element, &members);
                progress = true;
            }
        }
        progress
    }

    fn complete_member(&mut self, member: NodeId) -> bool {
        if self.is_resolved(member) {
            return false;
        }
        let terms = self.tree[member].children.clone();
        if !terms.iter().all(|&t| self.is_resolved(t)) {
            return false;
        }
        let ty = match terms.as_slice() {
            [only] => self.tree[*only].ty.clone(),
            _ => {
                let alternates = terms.iter().any(|&t| {
                    self.tree.sub_element(t).and_then(|d| d.relation_to_sibling)
                        == Some(SiblingRelation::Alternate)
                });
                let size = if alternates {
                    terms.iter().map(|&t| self.size_of(t)).max().unwrap_or(0)
                } else {
                    self.sum_sizes(&terms, member)
                };
                Some(ResolvedType::record(size))
            }
        };
        self.tree.node_mut(member).ty = ty;
        if let Some(data) = self.tree.sub_element_mut(member) {
            data.resolved = true;
        }
        true
    }

    /// Give the element its layout and its element-level fields: the members
    /// no sibling member refers to.
    fn complete_element(&mut self, element: NodeId, members: &[NodeId]) {
        let referenced: FxHashSet<NodeId> = members
            .iter()
            .flat_map(|&m| self.tree[m].children.iter())
            .filter_map(|&t| match self.tree.sub_element(t)?.target? {
                Target::Member { element: owner, member } if owner == element => Some(member),
                _ => None,
            })
            .collect();
        let roots: Vec<NodeId> = members
            .iter()
            .copied()
            .filter(|m| !referenced.contains(m))
            .collect();
        let size = self.sum_sizes(&roots, element);
        tracing::debug!(element = %self.tree[element].name, fields = roots.len(), size, "element complete");
        self.tree.node_mut(element).ty = Some(ResolvedType::record(size));
        if let Some(data) = self.tree.element_mut(element) {
            data.unmarshal_fields = roots;
        }
    }

    fn size_of(&self, node: NodeId) -> usize {
        self.tree[node].ty.as_ref().map_or(0, |ty| ty.byte_size)
    }

    /// Total byte size of `nodes`, reported at `owner` when it overflows.
    ///
    /// An overflowing total saturates to `usize::MAX`; a total that includes
    /// an already saturated size is not reported again.
    fn sum_sizes(&mut self, nodes: &[NodeId], owner: NodeId) -> usize {
        let sizes: Vec<usize> = nodes.iter().map(|&n| self.size_of(n)).collect();
        if let Some(total) = sizes.iter().try_fold(0usize, |acc, &n| acc.checked_add(n)) {
            return total;
        }
        if !sizes.contains(&usize::MAX) {
            let token = self.tree[owner].token;
            self.error(ParseErrorKind::Type(TypeErrorKind::SizeOverflow), token);
        }
        usize::MAX
    }

    /// A symbolic range bound must name a member of the same element.
    fn check_range_bounds(&mut self) {
        for element in self.grammar_elements() {
            for member in members(self.tree, element) {
                for &term in &self.tree[member].children {
                    let Some(range) = self.tree[term].ty.as_ref().and_then(|ty| ty.range.as_ref())
                    else {
                        continue;
                    };
                    for bound in [&range.min, &range.max].into_iter().flatten() {
                        if let RangeBound::Symbol(name) = bound {
                            let declared = self
                                .tree
                                .find_child(element, name)
                                .is_some_and(|m| is_member(self.tree, m));
                            if !declared {
                                self.undeclared.push((name.clone(), self.tree[term].token));
                            }
                        }
                    }
                }
            }
        }
    }

    /// Resolve a state-table cell to an element or `@E.member`.
    fn row_target(&mut self, token: TokenId) -> Option<Target> {
        let tokens = self.tokens;
        let tok = &tokens[token];
        match tok.accessed {
            Some(accessed) => {
                let owner = self.lookup(accessed)?;
                let owner = self.base_of(owner);
                match self.tree.find_child(owner, &tok.text) {
                    Some(member) => Some(Target::Member {
                        element: owner,
                        member,
                    }),
                    None => {
                        let kind = ParseErrorKind::UndefinedMember {
                            element: tokens[accessed].text.clone(),
                            member: tok.text.clone(),
                        };
                        self.error(kind, token);
                        None
                    }
                }
            }
            None => self.lookup(token).map(Target::Element),
        }
    }

    fn link_rows(&mut self, deferred: &[Deferred]) {
        for link in deferred {
            let Deferred::Row {
                row,
                slot,
                token,
                args,
            } = link
            else {
                continue;
            };
            let Some(target) = self.row_target(*token) else {
                continue;
            };
            let kind = match target {
                Target::Element(e) => self.element_kind(e),
                Target::Member { .. } => None,
            };
            let name = self.tokens[*token].text.clone();
            let wrong = |expected| ParseErrorKind::WrongElementKind(name.clone(), expected);

            match slot {
                RowSlot::Condition => match kind {
                    None | Some(ElementKind::Grammar | ElementKind::Input) => {
                        self.update_row(*row, |r| r.condition = Condition::Match(target));
                    }
                    Some(_) => self.error(wrong("a grammar or input element"), *token),
                },
                RowSlot::InputMethod => match kind {
                    None | Some(ElementKind::Input) => {
                        self.update_row(*row, |r| r.input_method = Some(target));
                    }
                    Some(_) => self.error(wrong("an INPUT element"), *token),
                },
                RowSlot::Output => match (kind, target) {
                    (Some(ElementKind::Actions), Target::Element(actions)) => {
                        let call = self.tree.deep_copy(actions);
                        if let Some(data) = self.tree.element_mut(actions) {
                            data.used_in_state_table = true;
                        }
                        let args = args.clone();
                        self.update_row(*row, |r| {
                            r.output = Some(RowOutput::Actions { call, args });
                        });
                    }
                    (None | Some(ElementKind::Grammar), _) if args.is_empty() => {
                        self.update_row(*row, |r| r.output = Some(RowOutput::Target(target)));
                    }
                    _ => self.error(wrong("a grammar or actions element"), *token),
                },
                RowSlot::OutputMethod => match (kind, target) {
                    (Some(ElementKind::Output), Target::Element(output)) => {
                        self.update_row(*row, |r| r.output_method = Some(output));
                    }
                    _ => self.error(wrong("an OUTPUT element"), *token),
                },
            }
        }
    }

    fn update_row(&mut self, row: NodeId, f: impl FnOnce(&mut tebnf_ir::StateRow)) {
        if let Some(data) = self.tree.sub_element_mut(row) {
            if let SubElementRole::StateRow(state_row) = &mut data.role {
                f(state_row);
            }
        }
    }

    fn error(&mut self, kind: ParseErrorKind, token: TokenId) {
        let err = ParseError::at(kind, &self.tokens[token]);
        self.ctx.error(err);
    }

    /// One error per unresolved name.
    fn report(&mut self) {
        let mut batch: Vec<(String, TokenId)> = Vec::new();
        let missing: Vec<String> = self.ctx.pending.missing_names().map(str::to_owned).collect();
        let names: Vec<String> = if missing.is_empty() && self.undeclared.is_empty() {
            self.ctx.pending.names().map(str::to_owned).collect()
        } else {
            missing
        };
        for name in names {
            if let Some(&node) = self.ctx.pending.waiting_on(&name).first() {
                batch.push((name, self.tree[node].token));
            }
        }
        batch.append(&mut self.undeclared);

        let mut seen = FxHashSet::default();
        for (name, token) in batch {
            if seen.insert(name.clone()) {
                let line = self.tokens[token].line;
                self.ctx.error(ParseError::new(
                    ParseErrorKind::Unresolved(name.clone()),
                    line,
                    name,
                ));
            }
        }
    }
}
