//! Codec synthesis.
//!
//! Walks the resolved tree once per grammar element and lays its fields out
//! in declaration order:
//!
//! - a literal becomes a `Literal` op and a compare in the match predicate;
//!   a run of `|`-separated literals becomes one `Choice`
//! - a typed term becomes a scalar, vector, bitset or numeric-string op;
//!   a vector bounded by a sibling field gets a `ResizeTo` before it, an
//!   open-ended one a `ResizeRemaining` and must be the last field
//! - a reference to another element becomes a `Call`, synthesized first
//! - a reference to a member of the same element inlines that member under
//!   its own name; a member of another element is inlined under the name of
//!   the referencing field
//!
//! The static offset is tracked while it is known so literal compares can
//! be checked against a buffer before any variable-length field.

use rustc_hash::{FxHashMap, FxHashSet};
use tebnf_ir::{
    ElementKind, ElementTable, NodeId, ResolvedType, SiblingRelation, SubElementRole, SyntaxTree,
    Target, Token, TokenList, TypeKind,
};
use tebnf_stack::ensure_sufficient_stack;
use tebnf_types::LiteralValue;

use crate::wire;
use crate::{
    CodecPlan, Count, DynamicTerm, Elem, FieldPlan, MatchExpr, Op, PlanSet, Step, SynthesisError,
    SynthesisErrorKind, TotalSize,
};

/// Build a codec plan for every grammar element.
///
/// Errors are collected per element; an element whose plan fails does not
/// stop the others from being synthesized.
#[tracing::instrument(level = "debug", skip_all, fields(elements = elements.len()))]
pub fn synthesize(
    tree: &SyntaxTree,
    elements: &ElementTable,
    tokens: &TokenList,
) -> Result<PlanSet, Vec<SynthesisError>> {
    let mut synth = Synthesizer {
        tree,
        tokens,
        plans: FxHashMap::default(),
        failed: FxHashSet::default(),
        active: FxHashSet::default(),
        errors: Vec::new(),
    };
    for element in elements.iter() {
        if tree.element(element).is_some_and(|e| e.kind == ElementKind::Grammar) {
            synth.plan(element);
        }
    }
    if !synth.errors.is_empty() {
        return Err(synth.errors);
    }
    let mut set = PlanSet::new();
    for element in elements.iter() {
        if let Some(plan) = synth.plans.remove(&element) {
            set.insert(plan);
        }
    }
    Ok(set)
}

struct Synthesizer<'a> {
    tree: &'a SyntaxTree,
    tokens: &'a TokenList,
    plans: FxHashMap<NodeId, CodecPlan>,
    failed: FxHashSet<NodeId>,
    /// Elements whose plan is being built; guards against self-containment.
    active: FxHashSet<NodeId>,
    errors: Vec<SynthesisError>,
}

impl<'a> Synthesizer<'a> {
    fn token(&self, node: NodeId) -> &'a Token {
        let tokens = self.tokens;
        &tokens[self.tree[node].token]
    }

    /// The plan's total size, synthesizing the element on first use.
    fn plan(&mut self, element: NodeId) -> Option<TotalSize> {
        if let Some(plan) = self.plans.get(&element) {
            return Some(plan.total_size.clone());
        }
        if self.failed.contains(&element) {
            return None;
        }
        if !self.active.insert(element) {
            let name = &self.tree[element].name;
            let token = self.token(element);
            self.errors.push(SynthesisError::new(
                SynthesisErrorKind::InconsistentSize(format!("`{name}` contains itself")),
                name.clone(),
                token.line,
                token.text.clone(),
            ));
            self.failed.insert(element);
            return None;
        }
        let result = ensure_sufficient_stack(|| self.build(element));
        self.active.remove(&element);
        match result {
            Ok(plan) => {
                tracing::debug!(
                    element = %plan.element,
                    fields = plan.fields.len(),
                    constant = plan.total_size.constant,
                    dynamic = plan.total_size.dynamic.len(),
                    "codec plan"
                );
                let total = plan.total_size.clone();
                self.plans.insert(element, plan);
                Some(total)
            }
            Err(err) => {
                self.errors.push(err);
                self.failed.insert(element);
                None
            }
        }
    }

    fn build(&mut self, element: NodeId) -> Result<CodecPlan, SynthesisError> {
        let tree = self.tree;
        let node = &tree[element];
        let token = self.token(element);
        let data = match tree.element(element) {
            Some(data) if data.kind == ElementKind::Grammar => data,
            _ => {
                return Err(SynthesisError::new(
                    SynthesisErrorKind::NotGrammar(node.name.clone()),
                    node.name.clone(),
                    token.line,
                    token.text.clone(),
                ))
            }
        };

        if let Some(target) = data.alias_of {
            let target_name = &tree[target].name;
            let total = self.plan(target).ok_or_else(|| {
                SynthesisError::new(
                    SynthesisErrorKind::MissingReference(target_name.clone()),
                    node.name.clone(),
                    token.line,
                    token.text.clone(),
                )
            })?;
            let mut plan = CodecPlan::new(node.name.clone());
            plan.alias_of = Some(target_name.clone());
            plan.total_size = total;
            if let Some(base) = self.plans.get(&target) {
                plan.predicate = base.predicate.clone();
            }
            return Ok(plan);
        }

        let mut builder = Builder::new(&node.name, data.grammar_size.clone());
        for &child in &node.children {
            if let Some(SubElementRole::ActionLine { tokens }) =
                tree.sub_element(child).map(|d| &d.role)
            {
                let line = tokens.iter().map(|&t| self.tokens[t].text.clone()).collect();
                builder.actions.push(line);
            }
        }
        for &member in &data.unmarshal_fields {
            self.member(element, member, &tree[member].name, &mut builder)?;
        }
        builder.finish(token)
    }

    /// Lay out the terms of `member`, naming the fields after `name`.
    fn member(
        &mut self,
        owner: NodeId,
        member: NodeId,
        name: &str,
        b: &mut Builder,
    ) -> Result<(), SynthesisError> {
        let tree = self.tree;
        let mut groups: Vec<Vec<NodeId>> = Vec::new();
        for &term in &tree[member].children {
            let alternate = tree.sub_element(term).and_then(|d| d.relation_to_sibling)
                == Some(SiblingRelation::Alternate);
            if let Some(group) = groups.last_mut().filter(|_| alternate) {
                group.push(term);
            } else {
                groups.push(vec![term]);
            }
        }

        let single = groups.len() == 1;
        for (i, group) in groups.iter().enumerate() {
            let field = if single {
                name.to_owned()
            } else {
                format!("{name}_{i}")
            };
            match group.as_slice() {
                [term] => self.term(owner, *term, &field, b)?,
                terms => self.choice(terms, &field, b)?,
            }
        }
        Ok(())
    }

    fn choice(&self, terms: &[NodeId], field: &str, b: &mut Builder) -> Result<(), SynthesisError> {
        let mut alternatives = Vec::with_capacity(terms.len());
        for &term in terms {
            let token = self.token(term);
            match &self.tree[term].ty {
                Some(ty) if ty.literal => {
                    let bytes = literal_bytes(token, ty)
                        .map_err(|msg| b.error(SynthesisErrorKind::InconsistentSize(msg), token))?;
                    alternatives.push(bytes);
                }
                _ => {
                    let msg = format!("alternative `{}` in `{field}` is not a literal", token.text);
                    return Err(b.error(SynthesisErrorKind::InconsistentSize(msg), token));
                }
            }
        }
        b.push(field, vec![Op::Choice { alternatives }], self.token(terms[0]))
    }

    fn term(
        &mut self,
        owner: NodeId,
        term: NodeId,
        field: &str,
        b: &mut Builder,
    ) -> Result<(), SynthesisError> {
        let tree = self.tree;
        let token = self.token(term);
        match tree.sub_element(term).and_then(|d| d.target) {
            Some(Target::Element(callee)) => {
                let callee_name = tree[callee].name.clone();
                let Some(total) = self.plan(callee) else {
                    return Err(b.error(SynthesisErrorKind::MissingReference(callee_name), token));
                };
                let open = self.plans.get(&callee).is_some_and(absorbs_rest);
                return b.push_call(field, callee_name, &total, open, token);
            }
            Some(Target::Member { element, member }) => {
                let name = if element == owner {
                    tree[member].name.as_str()
                } else {
                    field
                };
                return ensure_sufficient_stack(|| self.member(element, member, name, b));
            }
            None => {}
        }

        let Some(ty) = &tree[term].ty else {
            let kind = SynthesisErrorKind::MissingReference(token.text.clone());
            return Err(b.error(kind, token));
        };
        if ty.literal {
            let bytes = literal_bytes(token, ty)
                .map_err(|msg| b.error(SynthesisErrorKind::InconsistentSize(msg), token))?;
            return b.push(field, vec![Op::Literal { bytes }], token);
        }
        let ops = typed_ops(ty, b.size_symbol.as_deref()).map_err(|kind| b.error(kind, token))?;
        b.push(field, ops, token)
    }
}

/// The plan ends in an open-ended field with nothing to bound it but the
/// end of the input.
fn absorbs_rest(plan: &CodecPlan) -> bool {
    let Some(trailing) = &plan.trailing_field else {
        return false;
    };
    let open = plan
        .fields
        .iter()
        .filter(|f| f.name == *trailing)
        .flat_map(|f| &f.ops)
        .any(|op| matches!(op, Op::ResizeRemaining { .. } | Op::Call { .. }));
    open && !matches!(plan.total_size.dynamic.as_slice(), [DynamicTerm::SizeSymbol(_)])
}

/// Encoded bytes of a literal term in the layout of `ty`.
fn literal_bytes(token: &Token, ty: &ResolvedType) -> Result<Vec<u8>, String> {
    let value = LiteralValue::parse(token).map_err(|e| e.to_string())?;
    if !ty.numeric_string {
        return Ok(value.to_be_bytes(ty));
    }
    let mut out = Vec::with_capacity(ty.byte_size);
    match value {
        LiteralValue::Int(v) => wire::write_numeric(&mut out, v, ty.byte_size),
        LiteralValue::Float(v) => wire::write_numeric_float(&mut out, v, ty.byte_size),
        LiteralValue::Bytes(bytes) => {
            out = bytes;
            Ok(())
        }
    }
    .map_err(|e| e.to_string())?;
    Ok(out)
}

/// Ops for a declared (non-literal) type.
fn typed_ops(ty: &ResolvedType, size_symbol: Option<&str>) -> Result<Vec<Op>, SynthesisErrorKind> {
    let value_bytes = ty.byte_size - ty.diff_bytes;
    let mut ops = Vec::with_capacity(2);
    if ty.diff_bytes > 0 && !matches!(ty.kind, TypeKind::Vector(_)) {
        ops.push(Op::DiffBytes { len: ty.diff_bytes });
    }
    match ty.kind {
        TypeKind::Primitive(_) if ty.numeric_string => ops.push(Op::NumericString {
            width: ty.byte_size,
            float: ty.is_float(),
        }),
        TypeKind::Primitive(s) if s.is_float() => ops.push(Op::Float { bytes: value_bytes }),
        TypeKind::Primitive(s) => ops.push(Op::Int {
            bytes: value_bytes,
            signed: s.is_signed(),
        }),
        TypeKind::Bitset | TypeKind::String => ops.push(Op::Bytes { len: ty.byte_size }),
        TypeKind::Vector(s) => {
            if ty.diff_bytes > 0 {
                return Err(SynthesisErrorKind::InconsistentSize(format!(
                    "vectors of {}-bit integers are not supported",
                    ty.bit_width
                )));
            }
            let elem = Elem {
                bytes: ty.element_size(),
                signed: s.is_signed(),
                float: s.is_float(),
            };
            if elem.bytes == 0 {
                return Err(SynthesisErrorKind::InconsistentSize(format!("zero-width elements in {ty}")));
            }
            let range = ty.range.as_ref();
            if let Some(bound) = range.and_then(|r| r.symbolic_max()) {
                ops.push(Op::ResizeTo {
                    bound_field: bound.to_owned(),
                });
                ops.push(Op::Vector {
                    elem,
                    count: Count::Dynamic,
                });
            } else if range.is_some_and(|r| r.is_open_ended()) {
                ops.push(Op::ResizeRemaining {
                    size_symbol: size_symbol.map(str::to_owned),
                });
                ops.push(Op::Vector {
                    elem,
                    count: Count::Dynamic,
                });
            } else {
                ops.push(Op::Vector {
                    elem,
                    count: Count::Fixed(ty.byte_size / elem.bytes),
                });
            }
        }
        TypeKind::Record => return Err(SynthesisErrorKind::MissingReference(ty.to_string())),
    }
    Ok(ops)
}

/// Layout state for the element being synthesized.
struct Builder {
    element: String,
    size_symbol: Option<String>,
    fields: Vec<FieldPlan>,
    /// Byte offset of the next field, while no variable field precedes it.
    offset: Option<usize>,
    compares: Vec<MatchExpr>,
    total: TotalSize,
    trailing: Option<String>,
    actions: Vec<Vec<String>>,
}

impl Builder {
    fn new(element: &str, size_symbol: Option<String>) -> Self {
        Builder {
            element: element.to_owned(),
            size_symbol,
            fields: Vec::new(),
            offset: Some(0),
            compares: Vec::new(),
            total: TotalSize::default(),
            trailing: None,
            actions: Vec::new(),
        }
    }

    fn error(&self, kind: SynthesisErrorKind, at: &Token) -> SynthesisError {
        SynthesisError::new(kind, self.element.clone(), at.line, at.text.clone())
    }

    fn stores(&self, field: &str) -> bool {
        self.fields
            .iter()
            .any(|f| f.name == field && f.value_op().is_some())
    }

    /// `name`, or `name_2`, `name_3`... when a field already has it.
    fn unique(&self, name: &str) -> String {
        if !self.fields.iter().any(|f| f.name == name) {
            return name.to_owned();
        }
        (2..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| !self.fields.iter().any(|f| f.name == *candidate))
            .unwrap_or_else(|| name.to_owned())
    }

    fn check_not_trailing(&self, name: &str, at: &Token) -> Result<(), SynthesisError> {
        match &self.trailing {
            Some(trailing) => Err(self.error(
                SynthesisErrorKind::InconsistentSize(format!(
                    "`{name}` follows the open-ended field `{trailing}`"
                )),
                at,
            )),
            None => Ok(()),
        }
    }

    fn push(&mut self, name: &str, ops: Vec<Op>, at: &Token) -> Result<(), SynthesisError> {
        self.check_not_trailing(name, at)?;
        let name = self.unique(name);
        for op in &ops {
            match op {
                Op::ResizeTo { bound_field } if !self.stores(bound_field) => {
                    let msg = format!("`{name}` is bounded by `{bound_field}`, which is not read before it");
                    return Err(self.error(SynthesisErrorKind::InconsistentSize(msg), at));
                }
                Op::ResizeRemaining { .. } => self.trailing = Some(name.clone()),
                Op::Literal { bytes } => self.compares.push(MatchExpr::Compare {
                    field: name.clone(),
                    offset: self.offset,
                    bytes: bytes.clone(),
                }),
                Op::Choice { alternatives } => {
                    let options = alternatives
                        .iter()
                        .map(|bytes| MatchExpr::Compare {
                            field: name.clone(),
                            offset: self.offset,
                            bytes: bytes.clone(),
                        })
                        .collect();
                    self.compares.push(MatchExpr::Or(options));
                }
                _ => {}
            }
            self.advance(&name, op, at)?;
        }
        self.fields.push(FieldPlan { name, ops });
        Ok(())
    }

    fn push_call(
        &mut self,
        name: &str,
        element: String,
        callee: &TotalSize,
        open: bool,
        at: &Token,
    ) -> Result<(), SynthesisError> {
        self.check_not_trailing(name, at)?;
        let name = self.unique(name);
        if open {
            self.trailing = Some(name.clone());
        }
        if callee.is_constant() {
            self.grow(callee.constant, at)?;
        } else {
            self.offset = None;
            self.total.dynamic.push(DynamicTerm::Call {
                field: name.clone(),
                element: element.clone(),
            });
        }
        self.fields.push(FieldPlan {
            name,
            ops: vec![Op::Call { element }],
        });
        Ok(())
    }

    /// Add `n` fixed bytes to the total and to the running offset.
    fn grow(&mut self, n: usize, at: &Token) -> Result<(), SynthesisError> {
        let Some(total) = self.total.constant.checked_add(n) else {
            return Err(self.error(SynthesisErrorKind::SizeOverflow, at));
        };
        self.total.constant = total;
        self.offset = self.offset.and_then(|o| o.checked_add(n));
        Ok(())
    }

    fn advance(&mut self, field: &str, op: &Op, at: &Token) -> Result<(), SynthesisError> {
        match op.fixed_size() {
            Some(n) => self.grow(n, at)?,
            None => {
                self.offset = None;
                let element_size = match op {
                    Op::Vector { elem, .. } => elem.bytes,
                    _ => 1,
                };
                self.total.dynamic.push(DynamicTerm::FieldLen {
                    field: field.to_owned(),
                    element_size,
                });
            }
        }
        Ok(())
    }

    fn finish(self, at: &Token) -> Result<CodecPlan, SynthesisError> {
        let total_size = match &self.size_symbol {
            Some(symbol) if !self.stores(symbol) => {
                let kind = SynthesisErrorKind::MissingReference(symbol.clone());
                return Err(self.error(kind, at));
            }
            Some(symbol) => TotalSize {
                constant: 0,
                dynamic: vec![DynamicTerm::SizeSymbol(symbol.clone())],
            },
            None => self.total,
        };

        let steps = |keep: fn(&Op) -> bool| -> Vec<Step> {
            self.fields
                .iter()
                .flat_map(|f| {
                    f.ops.iter().filter(|op| keep(op)).map(|op| Step {
                        field: f.name.clone(),
                        op: op.clone(),
                    })
                })
                .collect()
        };
        let unmarshal = steps(|_| true);
        let marshal = steps(|op| !op.is_resize());
        // A bounded field that ends the element is still its variable-length tail.
        let trailing_field = self.trailing.or_else(|| {
            self.fields
                .last()
                .filter(|f| f.ops.iter().any(Op::is_resize))
                .map(|f| f.name.clone())
        });

        Ok(CodecPlan {
            element: self.element,
            alias_of: None,
            fields: self.fields,
            marshal,
            unmarshal,
            predicate: MatchExpr::all(self.compares),
            total_size,
            trailing_field,
            actions: self.actions,
        })
    }
}

#[cfg(test)]
mod tests;
