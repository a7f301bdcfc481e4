//! Hash primitive used by the tree.
//!
//! The tree only needs a two-input hash for middle nodes and a three-input
//! hash for leaves, so the primitive is pluggable behind [`HashFunction`].
//! [`Blake3Hasher`] is the default; the circom-compatible Poseidon hasher is
//! available behind the `poseidon` feature.

use crate::Result;

/// A 32-byte digest.
pub type Hash = [u8; 32];
/// A 256-bit key, big-endian.
pub type Key = [u8; 32];
/// A 256-bit value, big-endian.
pub type Value = [u8; 32];

/// The all-zero digest. Hash of the empty node and root of an empty tree.
pub const ZERO_HASH: Hash = [0u8; 32];

/// Domain tag prepended to two-input hashes: `blake3(0x00 || a || b)`.
const HASH2_TAG: u8 = 0x00;
/// Domain tag prepended to three-input hashes: `blake3(0x01 || a || b || c)`.
const HASH3_TAG: u8 = 0x01;

/// Collision-resistant hash consumed by the tree.
///
/// Implementations must be deterministic. Swapping the hash function of a
/// tree is only allowed while the tree holds no nodes, since every stored
/// node hash depends on it.
pub trait HashFunction: Send + Sync {
    /// Two-input hash, used for middle nodes.
    fn hash2(&self, a: &Hash, b: &Hash) -> Result<Hash>;

    /// Three-input hash, used for leaves (`hash3(key, value, 1)`).
    fn hash3(&self, a: &Hash, b: &Hash, c: &Hash) -> Result<Hash>;

    /// Short human-readable name, for logs and dumps.
    fn name(&self) -> &'static str;
}

/// Blake3 with a one-byte arity tag so two- and three-input hashes never
/// share a preimage.
#[derive(Debug, Default, Clone, Copy)]
pub struct Blake3Hasher;

impl HashFunction for Blake3Hasher {
    fn hash2(&self, a: &Hash, b: &Hash) -> Result<Hash> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[HASH2_TAG]);
        hasher.update(a);
        hasher.update(b);
        Ok(*hasher.finalize().as_bytes())
    }

    fn hash3(&self, a: &Hash, b: &Hash, c: &Hash) -> Result<Hash> {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&[HASH3_TAG]);
        hasher.update(a);
        hasher.update(b);
        hasher.update(c);
        Ok(*hasher.finalize().as_bytes())
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

/// Bit `depth` of `key`, least significant bit first.
///
/// Keys are big-endian, so bit 0 lives in the last byte. Depths past the key
/// width read as `false`.
pub fn key_bit(key: &Key, depth: u32) -> bool {
    if depth >= 256 {
        return false;
    }
    let byte = key[31 - (depth / 8) as usize];
    (byte >> (depth % 8)) & 1 == 1
}

/// Encode a `u64` as a big-endian 256-bit integer.
pub fn u256_from_u64(value: u64) -> [u8; 32] {
    let mut out = [0u8; 32];
    out[24..].copy_from_slice(&value.to_be_bytes());
    out
}

/// The integer `1` as a 256-bit word; third input of every leaf hash.
pub(crate) const LEAF_MARKER: Hash = {
    let mut one = [0u8; 32];
    one[31] = 1;
    one
};

/// First four bytes of a digest in hex, for log lines.
pub(crate) fn hex_short(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}
