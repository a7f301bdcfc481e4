//! Tree node variants.

use crate::{
    Hash, HashFunction, Key, Result, Value, ZERO_HASH,
    hash::LEAF_MARKER,
};

/// Index of a node in the [`NodeStore`](crate::NodeStore).
pub type NodeIndex = u64;

/// Index reserved for the empty sentinel. Never stored, never mutated.
pub const EMPTY_INDEX: NodeIndex = 0;

/// A tree node.
///
/// Leaf and middle nodes cache their hash; it always equals what the hash
/// function yields for their contents at the time they were written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// Absence of a subtree. Hashes to zero.
    Empty,
    /// Key/value terminal: `hash3(key, value, 1)`.
    Leaf {
        /// Full 256-bit key.
        key: Key,
        /// Stored value.
        value: Value,
        /// Cached leaf hash.
        hash: Hash,
    },
    /// Inner node: `hash2(left.hash, right.hash)`.
    Middle {
        /// Index of the left child (bit `0`).
        left: NodeIndex,
        /// Index of the right child (bit `1`).
        right: NodeIndex,
        /// Cached node hash.
        hash: Hash,
    },
}

impl Node {
    /// Build a leaf, computing its hash.
    pub fn leaf(key: Key, value: Value, hasher: &dyn HashFunction) -> Result<Self> {
        let hash = leaf_hash(hasher, &key, &value)?;
        Ok(Node::Leaf { key, value, hash })
    }

    /// The node's hash; zero for [`Node::Empty`].
    pub fn hash(&self) -> Hash {
        match self {
            Node::Empty => ZERO_HASH,
            Node::Leaf { hash, .. } | Node::Middle { hash, .. } => *hash,
        }
    }

    /// Whether this is [`Node::Empty`].
    pub fn is_empty(&self) -> bool {
        matches!(self, Node::Empty)
    }

    /// Whether this is a [`Node::Leaf`].
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    /// Whether this is a [`Node::Middle`].
    pub fn is_middle(&self) -> bool {
        matches!(self, Node::Middle { .. })
    }

    /// Leaf key, if this is a leaf.
    pub fn key(&self) -> Option<&Key> {
        match self {
            Node::Leaf { key, .. } => Some(key),
            _ => None,
        }
    }

    /// Leaf value, if this is a leaf.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Node::Leaf { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// `hash3(key, value, 1)`.
pub(crate) fn leaf_hash(hasher: &dyn HashFunction, key: &Key, value: &Value) -> Result<Hash> {
    hasher.hash3(key, value, &LEAF_MARKER)
}
