//! Arena-backed syntax tree.
//!
//! Every node lives in one `Vec<Node>` owned by `SyntaxTree` and is addressed
//! by `NodeId`. Parent links, alias links and reference targets are ids, so a
//! node can reach its containing element in O(depth) without owning cycles.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{ResolvedType, TokenId, TokenKind};

/// Index into the node arena.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const INVALID: NodeId = NodeId(u32::MAX);

    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_valid(self) -> bool {
        self.0 != u32::MAX
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "NodeId({})", self.0)
        } else {
            write!(f, "NodeId::INVALID")
        }
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::INVALID
    }
}

/// The five top-level declaration kinds.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ElementKind {
    Grammar,
    Actions,
    StateTable,
    Input,
    Output,
}

impl ElementKind {
    pub fn from_keyword(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Grammar => Some(ElementKind::Grammar),
            TokenKind::Actions => Some(ElementKind::Actions),
            TokenKind::States => Some(ElementKind::StateTable),
            TokenKind::Input => Some(ElementKind::Input),
            TokenKind::Output => Some(ElementKind::Output),
            _ => None,
        }
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            ElementKind::Grammar => "GRAMMAR",
            ElementKind::Actions => "ACTIONS",
            ElementKind::StateTable => "STATES",
            ElementKind::Input => "INPUT",
            ElementKind::Output => "OUTPUT",
        }
    }

    pub const fn is_io(self) -> bool {
        matches!(self, ElementKind::Input | ElementKind::Output)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Transport an INPUT/OUTPUT element is bound to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum IoChannel {
    TcpIp,
    UdpIp,
    File,
    MySql,
    Gui,
    Console,
}

impl IoChannel {
    pub const ALL: [IoChannel; 6] = [
        IoChannel::TcpIp,
        IoChannel::UdpIp,
        IoChannel::File,
        IoChannel::MySql,
        IoChannel::Gui,
        IoChannel::Console,
    ];

    pub fn from_keyword(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.keyword() == text)
    }

    pub const fn keyword(self) -> &'static str {
        match self {
            IoChannel::TcpIp => "TCP_IP",
            IoChannel::UdpIp => "UDP_IP",
            IoChannel::File => "FILE",
            IoChannel::MySql => "MYSQL",
            IoChannel::Gui => "GUI",
            IoChannel::Console => "CONSOLE",
        }
    }
}

#[derive(Clone, Debug)]
pub struct ElementData {
    pub kind: ElementKind,
    /// The declaration reached `END`.
    pub ended: bool,
    /// Element this one was declared `AS`.
    pub alias_of: Option<NodeId>,
    /// Fields decoded at element level, in declaration order.
    pub unmarshal_fields: Vec<NodeId>,
    /// Grammar symbol naming the overall size (`GRAMMAR @E = total; ...`).
    pub grammar_size: Option<String>,
    /// Trailing open-ended field that absorbs the remaining bytes.
    pub last_terminal: Option<NodeId>,
    pub channel: Option<IoChannel>,
    /// IO element whose channel this one copies (`INPUT @In = @Other;`).
    pub io_source: Option<NodeId>,
    /// Formal parameters of an ACTIONS signature.
    pub params: Vec<TokenId>,
    pub used_in_state_table: bool,
}

impl ElementData {
    pub fn new(kind: ElementKind) -> Self {
        ElementData {
            kind,
            ended: false,
            alias_of: None,
            unmarshal_fields: Vec::new(),
            grammar_size: None,
            last_terminal: None,
            channel: None,
            io_source: None,
            params: Vec::new(),
            used_in_state_table: false,
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParentRelation {
    Assign,
}

/// How a child was joined to its preceding sibling.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SiblingRelation {
    /// `,`
    Concat,
    /// `|`
    Alternate,
}

/// What a symbolic reference points at once resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Target {
    Element(NodeId),
    Member { element: NodeId, member: NodeId },
}

impl Target {
    pub fn element(self) -> NodeId {
        match self {
            Target::Element(e) | Target::Member { element: e, .. } => e,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Condition {
    /// Empty condition cell.
    Always,
    /// A single element or member: "did this match".
    Match(Target),
    /// Boolean expression in RPN.
    Expr(Vec<TokenId>),
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum RowOutput {
    Target(Target),
    /// Value expression in RPN.
    Expr(Vec<TokenId>),
    /// A per-row copy of an Actions element invoked with `args`.
    Actions { call: NodeId, args: Vec<TokenId> },
}

/// One row of a state table.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct StateRow {
    /// State name; `<state>_else` or `<state>_else_if_N` for continuation rows.
    pub state: String,
    pub condition: Condition,
    pub input_method: Option<Target>,
    pub next_state: Option<String>,
    pub output: Option<RowOutput>,
    pub output_method: Option<NodeId>,
}

impl StateRow {
    pub fn new(state: impl Into<String>) -> Self {
        StateRow {
            state: state.into(),
            condition: Condition::Always,
            input_method: None,
            next_state: None,
            output: None,
            output_method: None,
        }
    }
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub enum SubElementRole {
    /// A field, term or console binding.
    Plain,
    /// `$x = expr;` or an actions line, tokens in RPN.
    ActionLine { tokens: Vec<TokenId> },
    StateRow(StateRow),
}

#[derive(Clone, Debug)]
pub struct SubElementData {
    pub relation_to_parent: Option<ParentRelation>,
    pub relation_to_sibling: Option<SiblingRelation>,
    pub resolved: bool,
    /// Field this term was assigned (or cast) into.
    pub assign_cast_to: Option<NodeId>,
    /// Footprint override from a `(TYPE{range})` cast.
    pub size_cast: Option<ResolvedType>,
    pub target: Option<Target>,
    pub role: SubElementRole,
}

impl SubElementData {
    pub fn new(role: SubElementRole) -> Self {
        SubElementData {
            relation_to_parent: None,
            relation_to_sibling: None,
            resolved: false,
            assign_cast_to: None,
            size_cast: None,
            target: None,
            role,
        }
    }
}

#[derive(Clone, Debug)]
pub enum NodeKind {
    Element(ElementData),
    SubElement(SubElementData),
}

#[derive(Clone, Debug)]
pub struct Node {
    /// Token that introduced the node.
    pub token: TokenId,
    pub name: String,
    pub parent: Option<NodeId>,
    /// Ordered children; order is serialization order.
    pub children: Vec<NodeId>,
    child_index: FxHashMap<String, NodeId>,
    pub ty: Option<ResolvedType>,
    pub kind: NodeKind,
}

impl Node {
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::SubElement(_) => None,
        }
    }

    pub fn as_sub_element(&self) -> Option<&SubElementData> {
        match &self.kind {
            NodeKind::SubElement(s) => Some(s),
            NodeKind::Element(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element(_))
    }
}

/// Node arena for one compilation.
#[derive(Clone, Default, Debug)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, name: String, token: TokenId, kind: NodeKind) -> NodeId {
        let id = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(Node {
            token,
            name,
            parent: None,
            children: Vec::new(),
            child_index: FxHashMap::default(),
            ty: None,
            kind,
        });
        id
    }

    pub fn alloc_element(
        &mut self,
        kind: ElementKind,
        name: impl Into<String>,
        token: TokenId,
    ) -> NodeId {
        self.alloc(
            name.into(),
            token,
            NodeKind::Element(ElementData::new(kind)),
        )
    }

    pub fn alloc_sub_element(
        &mut self,
        name: impl Into<String>,
        token: TokenId,
        role: SubElementRole,
    ) -> NodeId {
        self.alloc(
            name.into(),
            token,
            NodeKind::SubElement(SubElementData::new(role)),
        )
    }

    /// Append `child` to `parent`. The name index keeps the first child of
    /// a given name.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        let name = self.nodes[child.index()].name.clone();
        self.nodes[child.index()].parent = Some(parent);
        let node = &mut self.nodes[parent.index()];
        node.children.push(child);
        if !name.is_empty() {
            node.child_index.entry(name).or_insert(child);
        }
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(Node::as_element)
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::Element(e) => Some(e),
            NodeKind::SubElement(_) => None,
        }
    }

    pub fn sub_element(&self, id: NodeId) -> Option<&SubElementData> {
        self.get(id).and_then(Node::as_sub_element)
    }

    pub fn sub_element_mut(&mut self, id: NodeId) -> Option<&mut SubElementData> {
        match &mut self.nodes.get_mut(id.index())?.kind {
            NodeKind::SubElement(s) => Some(s),
            NodeKind::Element(_) => None,
        }
    }

    pub fn find_child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get(parent)?.child_index.get(name).copied()
    }

    /// Walk parent links up to the owning element.
    pub fn containing_element(&self, id: NodeId) -> Option<NodeId> {
        let mut current = id;
        loop {
            let node = self.get(current)?;
            if node.is_element() {
                return Some(current);
            }
            current = node.parent?;
        }
    }

    /// Search the children of `element` and their descendants for `name`.
    pub fn find_member(&self, element: NodeId, name: &str) -> Option<NodeId> {
        if let Some(found) = self.find_child(element, name) {
            return Some(found);
        }
        self.get(element)?
            .children
            .iter()
            .find_map(|&child| self.find_member(child, name))
    }

    /// Copy the subtree rooted at `id`. The copy is detached (no parent).
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let mut source = self.nodes[id.index()].clone();
        let children = std::mem::take(&mut source.children);
        source.child_index.clear();
        source.parent = None;
        let copy = NodeId::new(self.nodes.len() as u32);
        self.nodes.push(source);
        for child in children {
            let child_copy = self.deep_copy(child);
            self.add_child(copy, child_copy);
        }
        copy
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::ops::Index<NodeId> for SyntaxTree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}
