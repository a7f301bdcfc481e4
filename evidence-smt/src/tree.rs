use std::{fmt, sync::Arc};

use log::{debug, trace};

use crate::{
    Blake3Hasher, EMPTY_INDEX, Error, Hash, HashFunction, Key, Node, NodeIndex, NodeStore, Proof,
    Result, Value, ZERO_HASH,
    hash::{hex_short, key_bit},
    node::leaf_hash,
    store::NodeBatch,
};

const LOG_TARGET: &str = "evidence::smt";

/// Deepest a tree can ever be: one level per key bit.
pub const MAX_DEPTH_HARD_CAP: u32 = 256;

/// Static tree parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeConfig {
    /// Maximum depth a leaf may be pushed down to.
    pub max_depth: u32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig { max_depth: 80 }
    }
}

/// A sparse Merkle tree over 256-bit keys kept in canonical shape.
///
/// Mutations take `&mut self` and are all-or-nothing: the node changes of an
/// operation are staged in a batch and committed only when the operation
/// succeeds.
pub struct SparseMerkleTree {
    max_depth: u32,
    root: NodeIndex,
    store: NodeStore,
    hasher: Arc<dyn HashFunction>,
}

impl Default for SparseMerkleTree {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SparseMerkleTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SparseMerkleTree")
            .field("max_depth", &self.max_depth)
            .field("root", &hex::encode(self.root()))
            .field("nodes_count", &self.nodes_count())
            .field("hasher", &self.hasher.name())
            .finish()
    }
}

impl SparseMerkleTree {
    /// Create an uninitialized tree using [`Blake3Hasher`].
    pub fn new() -> Self {
        Self::with_hasher(Arc::new(Blake3Hasher))
    }

    /// Create an uninitialized tree using the given hash function.
    pub fn with_hasher(hasher: Arc<dyn HashFunction>) -> Self {
        SparseMerkleTree {
            max_depth: 0,
            root: EMPTY_INDEX,
            store: NodeStore::new(),
            hasher,
        }
    }

    /// Create a tree initialized from `config`.
    pub fn from_config(config: &TreeConfig, hasher: Arc<dyn HashFunction>) -> Result<Self> {
        let mut tree = Self::with_hasher(hasher);
        tree.initialize(config.max_depth)?;
        Ok(tree)
    }

    /// One-time initialization with the starting maximum depth.
    pub fn initialize(&mut self, max_depth: u32) -> Result<()> {
        if self.is_initialized() {
            return Err(Error::AlreadyInitialized);
        }
        self.set_max_depth(max_depth)
    }

    /// Whether a non-zero maximum depth has been set.
    pub fn is_initialized(&self) -> bool {
        self.max_depth > 0
    }

    /// Raise the maximum depth.
    ///
    /// The depth never shrinks, so every existing leaf stays reachable and
    /// every proof issued so far stays well-formed.
    pub fn set_max_depth(&mut self, max_depth: u32) -> Result<()> {
        if max_depth == 0 {
            return Err(Error::InvalidDepth);
        }
        if max_depth <= self.max_depth {
            return Err(Error::DepthNotIncreasing {
                current: self.max_depth,
                requested: max_depth,
            });
        }
        if max_depth > MAX_DEPTH_HARD_CAP {
            return Err(Error::DepthExceedsCap(max_depth));
        }
        debug!(target: LOG_TARGET, "max depth {} -> {}", self.max_depth, max_depth);
        self.max_depth = max_depth;
        Ok(())
    }

    /// Swap the hash function. Only allowed while the tree holds no nodes.
    pub fn set_hash_function(&mut self, hasher: Arc<dyn HashFunction>) -> Result<()> {
        if !self.store.is_empty() {
            return Err(Error::TreeNotEmpty);
        }
        debug!(
            target: LOG_TARGET,
            "hash function {} -> {}",
            self.hasher.name(),
            hasher.name()
        );
        self.hasher = hasher;
        Ok(())
    }

    /// The hash function in use.
    pub fn hasher(&self) -> &Arc<dyn HashFunction> {
        &self.hasher
    }

    /// Insert a new key/value pair and return the new root.
    ///
    /// Fails with [`Error::KeyAlreadyExists`] if the key is present and with
    /// [`Error::MaxDepthReached`] if telling the key apart from an existing
    /// one would need a leaf deeper than the maximum depth.
    pub fn add(&mut self, key: Key, value: Value) -> Result<Hash> {
        self.ensure_initialized()?;
        let leaf = Node::leaf(key, value, self.hasher.as_ref())?;
        let (root, changes) = {
            let mut batch = self.store.batch();
            let root = self.insert_at(&mut batch, leaf, self.root, 0)?;
            (root, batch.into_changes())
        };
        self.store.commit(changes);
        self.root = root;
        let root_hash = self.root();
        debug!(
            target: LOG_TARGET,
            "added key {} root {} nodes {}",
            hex::encode(key),
            hex_short(&root_hash),
            self.nodes_count()
        );
        Ok(root_hash)
    }

    /// Remove a key and return the new root.
    ///
    /// Ancestors left with a single leaf below them are collapsed, promoting
    /// that leaf upward until a middle node with two non-empty subtrees or
    /// the root is reached.
    pub fn remove(&mut self, key: &Key) -> Result<Hash> {
        self.ensure_initialized()?;
        let (root, changes) = {
            let mut batch = self.store.batch();
            let root = self.remove_at(&mut batch, key, self.root, 0)?;
            (root, batch.into_changes())
        };
        self.store.commit(changes);
        self.root = root;
        let root_hash = self.root();
        debug!(
            target: LOG_TARGET,
            "removed key {} root {} nodes {}",
            hex::encode(key),
            hex_short(&root_hash),
            self.nodes_count()
        );
        Ok(root_hash)
    }

    /// Replace the value stored under an existing key and return the new
    /// root. The shape of the tree does not change.
    pub fn update(&mut self, key: &Key, value: Value) -> Result<Hash> {
        self.ensure_initialized()?;
        let changes = {
            let mut batch = self.store.batch();
            self.update_at(&mut batch, key, value, self.root, 0)?;
            batch.into_changes()
        };
        self.store.commit(changes);
        let root_hash = self.root();
        debug!(
            target: LOG_TARGET,
            "updated key {} root {}",
            hex::encode(key),
            hex_short(&root_hash)
        );
        Ok(root_hash)
    }

    /// Membership or non-membership proof for `key` against the current
    /// root.
    pub fn get_proof(&self, key: &Key) -> Proof {
        let mut proof = Proof::empty(self.root(), *key);
        let mut index = self.root;

        for depth in 0..=self.max_depth {
            match self.store.node(index) {
                Node::Empty => break,
                Node::Leaf {
                    key: leaf_key,
                    value,
                    ..
                } => {
                    if leaf_key == key {
                        proof.existence = true;
                        proof.value = *value;
                    } else {
                        proof.aux_existence = true;
                        proof.aux_key = *leaf_key;
                        proof.aux_value = *value;
                    }
                    break;
                }
                Node::Middle { left, right, .. } => {
                    let (next, sibling) = if key_bit(key, depth) {
                        (*right, *left)
                    } else {
                        (*left, *right)
                    };
                    proof.siblings.push(self.store.node(sibling).hash());
                    index = next;
                }
            }
        }

        while proof.siblings.last() == Some(&ZERO_HASH) {
            proof.siblings.pop();
        }
        trace!(
            target: LOG_TARGET,
            "proof for {} existence {} siblings {}",
            hex::encode(key),
            proof.existence,
            proof.siblings.len()
        );
        proof
    }

    /// Current root digest; zero for an empty tree.
    pub fn root(&self) -> Hash {
        self.store.node(self.root).hash()
    }

    /// Index of the root node.
    pub fn root_index(&self) -> NodeIndex {
        self.root
    }

    /// Node at `index`; [`Node::Empty`] if there is none.
    pub fn get_node(&self, index: NodeIndex) -> &Node {
        self.store.node(index)
    }

    /// Leaf holding `key`; [`Node::Empty`] if the key is absent.
    pub fn get_node_by_key(&self, key: &Key) -> &Node {
        match self.store.index_of(key) {
            Some(index) => self.store.node(index),
            None => self.store.node(EMPTY_INDEX),
        }
    }

    /// Number of live nodes.
    pub fn nodes_count(&self) -> u64 {
        self.store.nodes_count()
    }

    /// Current maximum depth; zero until initialized.
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Read access to the backing node table.
    pub fn store(&self) -> &NodeStore {
        &self.store
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn middle(&self, batch: &NodeBatch<'_>, left: NodeIndex, right: NodeIndex) -> Result<Node> {
        let hash = self
            .hasher
            .hash2(&batch.node(left).hash(), &batch.node(right).hash())?;
        Ok(Node::Middle { left, right, hash })
    }

    /// Insert `leaf` into the subtree at `index`, returning the index that
    /// now roots that subtree.
    fn insert_at(
        &self,
        batch: &mut NodeBatch<'_>,
        leaf: Node,
        index: NodeIndex,
        depth: u32,
    ) -> Result<NodeIndex> {
        let Some(key) = leaf.key().copied() else {
            return Err(Error::NodeDoesNotExist(index));
        };
        match batch.node(index).clone() {
            Node::Empty => Ok(batch.push(leaf)),
            Node::Leaf {
                key: existing_key, ..
            } => {
                if existing_key == key {
                    return Err(Error::KeyAlreadyExists(key));
                }
                self.push_leaf(batch, leaf, &existing_key, index, depth)
            }
            Node::Middle { left, right, .. } => {
                let (left, right) = if key_bit(&key, depth) {
                    (left, self.insert_at(batch, leaf, right, depth + 1)?)
                } else {
                    (self.insert_at(batch, leaf, left, depth + 1)?, right)
                };
                let middle = self.middle(batch, left, right)?;
                batch.put(index, middle);
                Ok(index)
            }
        }
    }

    /// Push the leaf at `old_index` down next to `leaf`, adding middle nodes
    /// until the two keys take different branches.
    fn push_leaf(
        &self,
        batch: &mut NodeBatch<'_>,
        leaf: Node,
        old_key: &Key,
        old_index: NodeIndex,
        depth: u32,
    ) -> Result<NodeIndex> {
        if depth >= self.max_depth {
            return Err(Error::MaxDepthReached);
        }
        let Some(new_key) = leaf.key().copied() else {
            return Err(Error::NodeDoesNotExist(old_index));
        };
        let new_bit = key_bit(&new_key, depth);

        let (left, right) = if new_bit == key_bit(old_key, depth) {
            let next = self.push_leaf(batch, leaf, old_key, old_index, depth + 1)?;
            if new_bit {
                (EMPTY_INDEX, next)
            } else {
                (next, EMPTY_INDEX)
            }
        } else {
            let new_index = batch.push(leaf);
            if new_bit {
                (old_index, new_index)
            } else {
                (new_index, old_index)
            }
        };
        let middle = self.middle(batch, left, right)?;
        Ok(batch.push(middle))
    }

    /// Remove `key` from the subtree at `index`, returning the index that
    /// now roots that subtree ([`EMPTY_INDEX`] if it became empty).
    fn remove_at(
        &self,
        batch: &mut NodeBatch<'_>,
        key: &Key,
        index: NodeIndex,
        depth: u32,
    ) -> Result<NodeIndex> {
        match batch.node(index).clone() {
            Node::Empty => Err(Error::NodeDoesNotExist(index)),
            Node::Leaf {
                key: existing_key, ..
            } => {
                if existing_key != *key {
                    return Err(Error::LeafDoesNotMatch {
                        existing: existing_key,
                        requested: *key,
                    });
                }
                batch.delete(index);
                Ok(EMPTY_INDEX)
            }
            Node::Middle { left, right, .. } => {
                let (left, right) = if key_bit(key, depth) {
                    (left, self.remove_at(batch, key, right, depth + 1)?)
                } else {
                    (self.remove_at(batch, key, left, depth + 1)?, right)
                };

                let shape = (
                    batch.node(left).is_empty(),
                    batch.node(left).is_leaf(),
                    batch.node(right).is_empty(),
                    batch.node(right).is_leaf(),
                );
                match shape {
                    (true, _, true, _) => {
                        batch.delete(index);
                        Ok(EMPTY_INDEX)
                    }
                    // A lone leaf moves up in place of this node.
                    (true, _, _, true) => {
                        batch.delete(index);
                        Ok(right)
                    }
                    (_, true, true, _) => {
                        batch.delete(index);
                        Ok(left)
                    }
                    _ => {
                        let middle = self.middle(batch, left, right)?;
                        batch.put(index, middle);
                        Ok(index)
                    }
                }
            }
        }
    }

    /// Replace the value of `key` in the subtree at `index` and rehash the
    /// path above it.
    fn update_at(
        &self,
        batch: &mut NodeBatch<'_>,
        key: &Key,
        value: Value,
        index: NodeIndex,
        depth: u32,
    ) -> Result<()> {
        match batch.node(index).clone() {
            Node::Empty => Err(Error::NodeDoesNotExist(index)),
            Node::Leaf {
                key: existing_key, ..
            } => {
                if existing_key != *key {
                    return Err(Error::LeafDoesNotMatch {
                        existing: existing_key,
                        requested: *key,
                    });
                }
                let hash = leaf_hash(self.hasher.as_ref(), key, &value)?;
                batch.put(
                    index,
                    Node::Leaf {
                        key: *key,
                        value,
                        hash,
                    },
                );
                Ok(())
            }
            Node::Middle { left, right, .. } => {
                if key_bit(key, depth) {
                    self.update_at(batch, key, value, right, depth + 1)?;
                } else {
                    self.update_at(batch, key, value, left, depth + 1)?;
                }
                let middle = self.middle(batch, left, right)?;
                batch.put(index, middle);
                Ok(())
            }
        }
    }
}
