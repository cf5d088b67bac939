//! Symbols waiting on a declaration or on another symbol's resolution.

use rustc_hash::FxHashMap;
use tebnf_ir::NodeId;

#[derive(Clone, Debug, Default)]
struct Entry {
    nodes: Vec<NodeId>,
    /// The last lookup found no declaration at all (as opposed to an
    /// unresolved one).
    missing: bool,
}

/// Maps a symbol name to the nodes that depend on it.
///
/// Iteration follows the order in which names were first added, so the
/// final batch of errors comes out in source order.
#[derive(Clone, Debug, Default)]
pub struct PendingTable {
    entries: FxHashMap<String, Entry>,
    order: Vec<String>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `node` waits on `name`.
    pub fn insert(&mut self, name: &str, node: NodeId, missing: bool) {
        let entry = self.entries.entry(name.to_owned()).or_insert_with(|| {
            self.order.push(name.to_owned());
            Entry::default()
        });
        entry.missing = missing;
        if !entry.nodes.contains(&node) {
            entry.nodes.push(node);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Nodes waiting on `name`.
    pub fn waiting_on(&self, name: &str) -> &[NodeId] {
        self.entries.get(name).map_or(&[], |e| e.nodes.as_slice())
    }

    /// Take every entry, oldest name first, leaving the table empty.
    pub fn drain(&mut self) -> Vec<(String, Vec<NodeId>)> {
        let mut entries = std::mem::take(&mut self.entries);
        std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|name| {
                let entry = entries.remove(&name)?;
                Some((name, entry.nodes))
            })
            .collect()
    }

    /// Names with no declaration, oldest first.
    pub fn missing_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order
            .iter()
            .filter(|name| self.entries.get(*name).is_some_and(|e| e.missing))
            .map(String::as_str)
    }

    /// All names, oldest first.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.order.iter().map(String::as_str)
    }

    /// Number of waiting nodes.
    pub fn len(&self) -> usize {
        self.entries.values().map(|e| e.nodes.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
