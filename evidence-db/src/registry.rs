//! Per-identity statements over a shared store.
//!
//! Every caller writes into the same tree, but under keys derived from its
//! own identity, so two callers using the same logical key never touch the
//! same leaf. Each successful mutation stamps the resulting root with the
//! current time, letting verifiers judge how fresh a proof's root is.

use std::{collections::HashMap, sync::Arc};

use evidence_smt::{Hash, HashFunction, Key, Proof, Value, ZERO_HASH, u256_from_u64};
use log::debug;

use crate::{Clock, Error, Identity, KeyValueStore, RegistryConfig, Result, in_field};

const LOG_TARGET: &str = "evidence::registry";

/// Third hash input of an isolated key. Leaves use `1`, so an isolated key
/// can never equal a leaf hash over the same two words.
pub const ISOLATION_DOMAIN: u64 = 2;

/// Tree key under which `caller` stores its logical `key`:
/// `hash3(caller, key, ISOLATION_DOMAIN)`.
pub fn isolated_key(hasher: &dyn HashFunction, caller: &Identity, key: &Key) -> Result<Key> {
    Ok(hasher.hash3(caller.as_bytes(), key, &u256_from_u64(ISOLATION_DOMAIN))?)
}

/// Statement registry owning the store it writes to.
pub struct IdentityRegistry<C: Clock> {
    identity: Identity,
    clock: C,
    field_modulus: [u8; 32],
    store: Option<KeyValueStore>,
    root_history: HashMap<Hash, u64>,
}

impl<C: Clock> std::fmt::Debug for IdentityRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRegistry")
            .field("identity", &self.identity)
            .field("store", &self.store)
            .field("roots", &self.root_history.len())
            .finish()
    }
}

impl<C: Clock> IdentityRegistry<C> {
    /// Create an uninitialized registry that mutates its store as
    /// `identity`.
    pub fn new(identity: Identity, clock: C) -> Self {
        Self::with_config(identity, clock, &RegistryConfig::default())
    }

    /// Like [`IdentityRegistry::new`] with an explicit field modulus.
    pub fn with_config(identity: Identity, clock: C, config: &RegistryConfig) -> Self {
        IdentityRegistry {
            identity,
            clock,
            field_modulus: config.field_modulus,
            store: None,
            root_history: HashMap::new(),
        }
    }

    /// Build a store authorized for `identity`, sized per `config`, and
    /// attach it.
    pub fn bootstrap(
        identity: Identity,
        clock: C,
        config: &RegistryConfig,
        hasher: Arc<dyn HashFunction>,
    ) -> Result<Self> {
        let mut store = KeyValueStore::with_hasher(hasher);
        store.init(identity, config.max_depth)?;
        let mut registry = Self::with_config(identity, clock, config);
        registry.init(store)?;
        Ok(registry)
    }

    /// One-time attachment of the store. The store must authorize this
    /// registry's identity or every mutation fails with
    /// [`Error::NotAuthorized`].
    pub fn init(&mut self, store: KeyValueStore) -> Result<()> {
        if self.store.is_some() {
            return Err(Error::AlreadyInitialized);
        }
        debug!(
            target: LOG_TARGET,
            "attached store with max depth {} to {}",
            store.max_depth(),
            self.identity
        );
        self.store = Some(store);
        Ok(())
    }

    /// The attached store.
    pub fn store(&self) -> Result<&KeyValueStore> {
        self.store.as_ref().ok_or(Error::NotInitialized)
    }

    /// Identity this registry mutates the store as.
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    fn check_field(&self, number: &[u8; 32]) -> Result<()> {
        if in_field(number, &self.field_modulus) {
            Ok(())
        } else {
            Err(Error::NotInPrimeField(*number))
        }
    }

    /// Tree key of `caller`'s logical `key`, using the store's hasher.
    pub fn isolated_key(&self, caller: &Identity, key: &Key) -> Result<Key> {
        let store = self.store()?;
        isolated_key(store.tree().hasher().as_ref(), caller, key)
    }

    fn record_root(&mut self, root: Hash) {
        if root == ZERO_HASH {
            return;
        }
        let now = self.clock.now();
        self.root_history.insert(root, now);
        debug!(
            target: LOG_TARGET,
            "root {} current at {}",
            hex::encode(root),
            now
        );
    }

    /// Store `value` under `caller`'s `key`.
    pub fn add_statement(&mut self, caller: &Identity, key: Key, value: Value) -> Result<Hash> {
        self.check_field(&key)?;
        self.check_field(&value)?;
        let isolated = self.isolated_key(caller, &key)?;
        let identity = self.identity;
        let store = self.store.as_mut().ok_or(Error::NotInitialized)?;
        if store.contains(&isolated) {
            return Err(Error::KeyAlreadyExists(key));
        }
        let root = store.add(&identity, isolated, value)?;
        self.record_root(root);
        Ok(root)
    }

    /// Delete `caller`'s `key`.
    pub fn remove_statement(&mut self, caller: &Identity, key: Key) -> Result<Hash> {
        self.check_field(&key)?;
        let isolated = self.isolated_key(caller, &key)?;
        let identity = self.identity;
        let store = self.store.as_mut().ok_or(Error::NotInitialized)?;
        if !store.contains(&isolated) {
            return Err(Error::KeyDoesNotExist(key));
        }
        let root = store.remove(&identity, &isolated)?;
        self.record_root(root);
        Ok(root)
    }

    /// Replace the value of `caller`'s existing `key`.
    pub fn update_statement(&mut self, caller: &Identity, key: Key, value: Value) -> Result<Hash> {
        self.check_field(&key)?;
        self.check_field(&value)?;
        let isolated = self.isolated_key(caller, &key)?;
        let identity = self.identity;
        let store = self.store.as_mut().ok_or(Error::NotInitialized)?;
        if !store.contains(&isolated) {
            return Err(Error::KeyDoesNotExist(key));
        }
        let root = store.update(&identity, &isolated, value)?;
        self.record_root(root);
        Ok(root)
    }

    /// Value of `caller`'s `key`, zero if absent.
    pub fn statement(&self, caller: &Identity, key: &Key) -> Result<Value> {
        self.check_field(key)?;
        let isolated = self.isolated_key(caller, key)?;
        Ok(self.store()?.get_value(&isolated))
    }

    /// Proof for `caller`'s `key` against the current root.
    pub fn statement_proof(&self, caller: &Identity, key: &Key) -> Result<Proof> {
        self.check_field(key)?;
        let isolated = self.isolated_key(caller, key)?;
        Ok(self.store()?.get_proof(&isolated))
    }

    /// Time at which `root` last became current; zero for the empty root and
    /// for roots never seen.
    ///
    /// This is a plain lookup: the current root reports the time of the
    /// mutation that produced it, not the time of the query.
    pub fn get_root_timestamp(&self, root: &Hash) -> u64 {
        if *root == ZERO_HASH {
            return 0;
        }
        self.root_history.get(root).copied().unwrap_or(0)
    }
}
