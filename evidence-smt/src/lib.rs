//! Canonical sparse Merkle tree.
//!
//! Keys and values are 256-bit unsigned integers stored as big-endian
//! 32-byte arrays. The path of a key is given by its bits, least
//! significant first: bit `i` picks the child taken at depth `i` (`1` goes
//! right). Node hashing follows the iden3 scheme:
//!
//! - empty node: `[0; 32]`
//! - leaf:       `hash3(key, value, 1)`
//! - middle:     `hash2(left_hash, right_hash)`
//!
//! The tree is kept in canonical shape: every middle node has at least two
//! leaves below it, so a leaf always sits at the shallowest depth that tells
//! its key apart from all others. The same key/value set therefore yields the
//! same root and the same proofs no matter in which order it was built.
//!
//! # Core types
//!
//! - [`SparseMerkleTree`]: insert, remove, update and proof generation.
//! - [`Proof`]: membership / non-membership proof with aux witness.
//! - [`NodeStore`]: append-only node table with a key index.
//! - [`HashFunction`]: pluggable two- and three-input hash.

#![warn(missing_docs)]

mod error;
pub(crate) mod hash;
mod node;
#[cfg(feature = "poseidon")]
mod poseidon;
mod proof;
mod store;
mod tree;
mod verify;
#[cfg(feature = "visualize")]
mod visualize;


pub use error::{Error, ErrorKind, Result};
pub use hash::{Blake3Hasher, Hash, HashFunction, Key, Value, ZERO_HASH, key_bit, u256_from_u64};
pub use node::{EMPTY_INDEX, Node, NodeIndex};
#[cfg(feature = "poseidon")]
pub use poseidon::PoseidonHasher;
pub use proof::Proof;
pub use store::NodeStore;
pub use tree::{MAX_DEPTH_HARD_CAP, SparseMerkleTree, TreeConfig};
pub use verify::verify_proof;
