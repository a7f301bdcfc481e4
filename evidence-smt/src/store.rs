//! Node table backing the tree.
//!
//! [`NodeStore`] holds the committed nodes. Every mutation of the tree is
//! first staged in a [`NodeBatch`], an overlay that serves its own writes
//! back on reads. The batch is turned into [`NodeChanges`] and applied in one
//! step once the whole operation succeeded; dropping it instead leaves the
//! store untouched.

use std::collections::{BTreeMap, HashMap};

use crate::{EMPTY_INDEX, Key, Node, NodeIndex};

const EMPTY_NODE: &Node = &Node::Empty;

/// Append-only node table plus a key index for leaf lookup.
///
/// Indices are handed out in increasing order starting at 1 and are never
/// reused, even after the node they named has been deleted.
#[derive(Debug, Default, Clone)]
pub struct NodeStore {
    nodes: BTreeMap<NodeIndex, Node>,
    key_index: HashMap<Key, NodeIndex>,
    last_index: NodeIndex,
}

impl NodeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The node at `index`, or [`Node::Empty`] for index 0 and for indices
    /// that are unused or deleted.
    pub fn node(&self, index: NodeIndex) -> &Node {
        if index == EMPTY_INDEX {
            return EMPTY_NODE;
        }
        self.nodes.get(&index).unwrap_or(EMPTY_NODE)
    }

    /// Index of the leaf holding `key`, if any.
    pub fn index_of(&self, key: &Key) -> Option<NodeIndex> {
        self.key_index.get(key).copied()
    }

    /// Number of live (non-deleted) nodes.
    pub fn nodes_count(&self) -> u64 {
        self.nodes.len() as u64
    }

    /// Highest index ever handed out.
    pub fn last_index(&self) -> NodeIndex {
        self.last_index
    }

    /// Whether the store holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Iterate over live nodes in index order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &Node)> {
        self.nodes.iter().map(|(index, node)| (*index, node))
    }

    pub(crate) fn batch(&self) -> NodeBatch<'_> {
        NodeBatch {
            store: self,
            nodes: BTreeMap::new(),
            keys: HashMap::new(),
            last_index: self.last_index,
        }
    }

    /// Apply staged changes.
    pub(crate) fn commit(&mut self, changes: NodeChanges) {
        for (index, node) in changes.nodes {
            match node {
                Some(node) => {
                    self.nodes.insert(index, node);
                }
                None => {
                    self.nodes.remove(&index);
                }
            }
        }
        for (key, index) in changes.keys {
            match index {
                Some(index) => {
                    self.key_index.insert(key, index);
                }
                None => {
                    self.key_index.remove(&key);
                }
            }
        }
        self.last_index = changes.last_index;
    }
}

/// Write-ahead overlay over a [`NodeStore`].
///
/// `None` entries mark deletions.
pub(crate) struct NodeBatch<'a> {
    store: &'a NodeStore,
    nodes: BTreeMap<NodeIndex, Option<Node>>,
    keys: HashMap<Key, Option<NodeIndex>>,
    last_index: NodeIndex,
}

/// Owned result of a finished [`NodeBatch`].
pub(crate) struct NodeChanges {
    nodes: BTreeMap<NodeIndex, Option<Node>>,
    keys: HashMap<Key, Option<NodeIndex>>,
    last_index: NodeIndex,
}

impl NodeBatch<'_> {
    /// Look up a node, checking staged writes first.
    pub(crate) fn node(&self, index: NodeIndex) -> &Node {
        if index == EMPTY_INDEX {
            return EMPTY_NODE;
        }
        match self.nodes.get(&index) {
            Some(Some(node)) => node,
            Some(None) => EMPTY_NODE,
            None => self.store.node(index),
        }
    }

    /// Stage a new node under a fresh index and return that index.
    pub(crate) fn push(&mut self, node: Node) -> NodeIndex {
        self.last_index += 1;
        let index = self.last_index;
        if let Node::Leaf { key, .. } = &node {
            self.keys.insert(*key, Some(index));
        }
        self.nodes.insert(index, Some(node));
        index
    }

    /// Stage a replacement for an existing node.
    pub(crate) fn put(&mut self, index: NodeIndex, node: Node) {
        debug_assert_ne!(index, EMPTY_INDEX, "the empty sentinel is immutable");
        self.nodes.insert(index, Some(node));
    }

    /// Stage the deletion of a node, dropping its key from the index if it
    /// is a leaf.
    pub(crate) fn delete(&mut self, index: NodeIndex) {
        if index == EMPTY_INDEX {
            return;
        }
        if let Node::Leaf { key, .. } = self.node(index) {
            let key = *key;
            self.keys.insert(key, None);
        }
        self.nodes.insert(index, None);
    }

    pub(crate) fn into_changes(self) -> NodeChanges {
        NodeChanges {
            nodes: self.nodes,
            keys: self.keys,
            last_index: self.last_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Blake3Hasher, u256_from_u64};

    fn leaf(n: u64) -> Node {
        Node::leaf(u256_from_u64(n), u256_from_u64(n), &Blake3Hasher).expect("leaf")
    }

    #[test]
    fn test_empty_sentinel() {
        let store = NodeStore::new();
        assert_eq!(store.node(EMPTY_INDEX), &Node::Empty);
        assert_eq!(store.node(42), &Node::Empty);
        assert!(store.is_empty());
    }

    #[test]
    fn test_batch_overlay_reads_own_writes() {
        let store = NodeStore::new();
        let mut batch = store.batch();
        let index = batch.push(leaf(7));
        assert_eq!(index, 1);
        assert!(batch.node(index).is_leaf());
        // The store itself is untouched until commit.
        assert!(store.node(index).is_empty());
    }

    #[test]
    fn test_commit_applies_nodes_and_keys() {
        let mut store = NodeStore::new();
        let changes = {
            let mut batch = store.batch();
            batch.push(leaf(7));
            batch.push(leaf(1));
            batch.into_changes()
        };
        store.commit(changes);
        assert_eq!(store.nodes_count(), 2);
        assert_eq!(store.index_of(&u256_from_u64(1)), Some(2));

        let changes = {
            let mut batch = store.batch();
            batch.delete(1);
            batch.into_changes()
        };
        store.commit(changes);
        assert_eq!(store.nodes_count(), 1);
        assert_eq!(store.index_of(&u256_from_u64(7)), None);
        assert_eq!(store.last_index(), 2);
    }

    #[test]
    fn test_dropped_batch_changes_nothing() {
        let mut store = NodeStore::new();
        let changes = {
            let mut batch = store.batch();
            batch.push(leaf(7));
            batch.into_changes()
        };
        store.commit(changes);

        {
            let mut batch = store.batch();
            batch.delete(1);
            batch.push(leaf(9));
        }
        assert_eq!(store.nodes_count(), 1);
        assert_eq!(store.last_index(), 1);
        assert!(store.node(1).is_leaf());
    }

    #[test]
    fn test_indices_are_not_reused() {
        let mut store = NodeStore::new();
        for n in 0..3 {
            let changes = {
                let mut batch = store.batch();
                let index = batch.push(leaf(n));
                batch.delete(index);
                batch.into_changes()
            };
            store.commit(changes);
        }
        assert_eq!(store.nodes_count(), 0);
        assert_eq!(store.last_index(), 3);
    }
}
