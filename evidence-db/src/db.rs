//! Access-controlled key-value store.

use std::sync::Arc;

use evidence_smt::{Hash, HashFunction, Key, Node, Proof, SparseMerkleTree, Value, ZERO_HASH};
use log::{debug, warn};

use crate::{Error, Identity, Result};

const LOG_TARGET: &str = "evidence::db";

/// A sparse Merkle tree that only one identity may mutate.
///
/// Reads are open to everyone. The authorized identity is fixed by
/// [`KeyValueStore::init`] and cannot change afterwards.
#[derive(Debug)]
pub struct KeyValueStore {
    tree: SparseMerkleTree,
    authorized: Option<Identity>,
}

impl Default for KeyValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStore {
    /// Create an uninitialized store hashing with Blake3.
    pub fn new() -> Self {
        KeyValueStore {
            tree: SparseMerkleTree::new(),
            authorized: None,
        }
    }

    /// Create an uninitialized store with the given hash function.
    pub fn with_hasher(hasher: Arc<dyn HashFunction>) -> Self {
        KeyValueStore {
            tree: SparseMerkleTree::with_hasher(hasher),
            authorized: None,
        }
    }

    /// One-time setup of the authorized mutator and the tree depth.
    pub fn init(&mut self, authorized: Identity, max_depth: u32) -> Result<()> {
        if self.authorized.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        self.tree.initialize(max_depth)?;
        self.authorized = Some(authorized);
        debug!(
            target: LOG_TARGET,
            "initialized for {} with max depth {}", authorized, max_depth
        );
        Ok(())
    }

    fn authorize(&self, caller: &Identity) -> Result<()> {
        match &self.authorized {
            None => Err(Error::NotInitialized),
            Some(authorized) if authorized == caller => Ok(()),
            Some(_) => {
                warn!(target: LOG_TARGET, "rejected mutation from {}", caller);
                Err(Error::NotAuthorized(*caller))
            }
        }
    }

    /// Insert `key` on behalf of `caller`; returns the new root.
    pub fn add(&mut self, caller: &Identity, key: Key, value: Value) -> Result<Hash> {
        self.authorize(caller)?;
        Ok(self.tree.add(key, value)?)
    }

    /// Remove `key` on behalf of `caller`; returns the new root.
    pub fn remove(&mut self, caller: &Identity, key: &Key) -> Result<Hash> {
        self.authorize(caller)?;
        Ok(self.tree.remove(key)?)
    }

    /// Overwrite the value of `key` on behalf of `caller`; returns the new
    /// root.
    pub fn update(&mut self, caller: &Identity, key: &Key, value: Value) -> Result<Hash> {
        self.authorize(caller)?;
        Ok(self.tree.update(key, value)?)
    }

    /// Value stored under `key`, or zero if the key is absent.
    pub fn get_value(&self, key: &Key) -> Value {
        match self.tree.get_node_by_key(key) {
            Node::Leaf { value, .. } => *value,
            _ => ZERO_HASH,
        }
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &Key) -> bool {
        self.tree.get_node_by_key(key).is_leaf()
    }

    /// Membership or non-membership proof for `key`.
    pub fn get_proof(&self, key: &Key) -> Proof {
        self.tree.get_proof(key)
    }

    /// Current root; zero while empty.
    pub fn root(&self) -> Hash {
        self.tree.root()
    }

    /// Number of live tree nodes.
    pub fn size(&self) -> u64 {
        self.tree.nodes_count()
    }

    /// Maximum depth of the backing tree.
    pub fn max_depth(&self) -> u32 {
        self.tree.max_depth()
    }

    /// Identity allowed to mutate, once initialized.
    pub fn authorized_caller(&self) -> Option<&Identity> {
        self.authorized.as_ref()
    }

    /// Read access to the backing tree.
    pub fn tree(&self) -> &SparseMerkleTree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use evidence_smt::{ErrorKind, u256_from_u64};

    use super::*;

    const REGISTRY: Identity = Identity([1u8; 32]);
    const USER: Identity = Identity([2u8; 32]);

    fn make_store() -> KeyValueStore {
        let mut store = KeyValueStore::new();
        store.init(REGISTRY, 20).expect("init store");
        store
    }

    #[test]
    fn test_init_once() {
        let mut store = make_store();
        assert_eq!(store.authorized_caller(), Some(&REGISTRY));
        assert_eq!(store.max_depth(), 20);
        assert_matches!(store.init(USER, 30), Err(Error::AlreadyInitialized));
        assert_eq!(store.authorized_caller(), Some(&REGISTRY));
    }

    #[test]
    fn test_init_with_zero_depth_keeps_store_uninitialized() {
        let mut store = KeyValueStore::new();
        assert_matches!(
            store.init(REGISTRY, 0),
            Err(Error::Tree(evidence_smt::Error::InvalidDepth))
        );
        assert_eq!(store.authorized_caller(), None);
        store.init(REGISTRY, 20).expect("init after failure");
    }

    #[test]
    fn test_mutations_before_init() {
        let mut store = KeyValueStore::new();
        assert_matches!(
            store.add(&REGISTRY, u256_from_u64(1), u256_from_u64(1)),
            Err(Error::NotInitialized)
        );
    }

    #[test]
    fn test_add_get_remove() {
        let mut store = make_store();
        let key = u256_from_u64(7);
        assert_eq!(store.root(), ZERO_HASH);

        let root = store
            .add(&REGISTRY, key, u256_from_u64(70))
            .expect("add");
        assert_eq!(root, store.root());
        assert_eq!(store.get_value(&key), u256_from_u64(70));
        assert_eq!(store.size(), 1);
        assert!(store.get_proof(&key).existence);

        store
            .update(&REGISTRY, &key, u256_from_u64(71))
            .expect("update");
        assert_eq!(store.get_value(&key), u256_from_u64(71));

        store.remove(&REGISTRY, &key).expect("remove");
        assert_eq!(store.get_value(&key), ZERO_HASH);
        assert!(!store.contains(&key));
        assert_eq!(store.root(), ZERO_HASH);
    }

    #[test]
    fn test_unauthorized_mutations_are_rejected() {
        let mut store = make_store();
        let zero = ZERO_HASH;
        assert_matches!(store.add(&USER, zero, zero), Err(Error::NotAuthorized(c)) if c == USER);
        assert_matches!(store.remove(&USER, &zero), Err(Error::NotAuthorized(c)) if c == USER);
        assert_matches!(
            store.update(&USER, &zero, zero),
            Err(Error::NotAuthorized(c)) if c == USER
        );
        assert_eq!(
            store.add(&USER, zero, zero).map_err(|e| e.kind()),
            Err(ErrorKind::Authorization)
        );
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_tree_errors_pass_through() {
        let mut store = make_store();
        store
            .add(&REGISTRY, u256_from_u64(1), u256_from_u64(1))
            .expect("add");
        let err = store
            .add(&REGISTRY, u256_from_u64(1), u256_from_u64(2))
            .expect_err("duplicate");
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_matches!(err, Error::Tree(evidence_smt::Error::KeyAlreadyExists(_)));
    }
}
