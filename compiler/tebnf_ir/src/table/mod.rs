//! Element-by-name table.

use rustc_hash::FxHashMap;

use crate::NodeId;

/// Declared elements, keyed by `@Name`, in declaration order.
///
/// Written only while parsing; resolution and codec synthesis read it.
#[derive(Clone, Default, Debug)]
pub struct ElementTable {
    by_name: FxHashMap<String, NodeId>,
    order: Vec<NodeId>,
}

impl ElementTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an element. Returns the existing id if the name is taken.
    pub fn insert(&mut self, name: &str, id: NodeId) -> Result<(), NodeId> {
        if let Some(&existing) = self.by_name.get(name) {
            return Err(existing);
        }
        self.by_name.insert(name.to_owned(), id);
        self.order.push(id);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Element ids in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_duplicate_name_rejected() {
        let mut table = ElementTable::new();
        assert_eq!(table.insert("@Msg", NodeId::new(0)), Ok(()));
        assert_eq!(table.insert("@Msg", NodeId::new(5)), Err(NodeId::new(0)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_iteration_follows_declaration_order() {
        let mut table = ElementTable::new();
        for (i, name) in ["@B", "@A", "@C"].iter().enumerate() {
            table.insert(name, NodeId::new(i as u32)).ok();
        }
        let ids: Vec<_> = table.iter().map(NodeId::raw).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(table.get("@A"), Some(NodeId::new(1)));
    }
}
