//! Membership and non-membership proofs.

use bincode::{Decode, Encode};

use crate::{Error, Hash, Key, MAX_DEPTH_HARD_CAP, Result, Value, ZERO_HASH};

/// Proof that a key is, or is not, in the tree with a given root.
///
/// `siblings[i]` is the hash of the sibling met at depth `i` on the path from
/// the root toward `key`; trailing zero siblings are omitted.
///
/// When `existence` is false the proof is a non-membership proof. If the path
/// of `key` ends in a leaf holding another key, that leaf is carried as the
/// aux witness (`aux_existence`, `aux_key`, `aux_value`); otherwise the path
/// ends in an empty subtree.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Proof {
    /// Root the proof was generated against.
    pub root: Hash,
    /// Sibling hashes from the root downward.
    pub siblings: Vec<Hash>,
    /// Whether `key` is present.
    pub existence: bool,
    /// The queried key.
    pub key: Key,
    /// Value of `key` if present, zero otherwise.
    pub value: Value,
    /// Whether another key's leaf terminates the path.
    pub aux_existence: bool,
    /// Key of the terminating leaf, if any.
    pub aux_key: Key,
    /// Value of the terminating leaf, if any.
    pub aux_value: Value,
}

impl Proof {
    /// A proof of absence against `root` with no siblings and no aux leaf.
    pub(crate) fn empty(root: Hash, key: Key) -> Self {
        Proof {
            root,
            siblings: Vec::new(),
            existence: false,
            key,
            value: ZERO_HASH,
            aux_existence: false,
            aux_key: ZERO_HASH,
            aux_value: ZERO_HASH,
        }
    }

    /// Depth at which the proved path terminates.
    pub fn depth(&self) -> usize {
        self.siblings.len()
    }

    /// Serialize this proof to bytes using bincode.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_no_limit();
        bincode::encode_to_vec(self, config)
            .map_err(|e| Error::InvalidProof(format!("failed to encode proof: {}", e)))
    }

    /// Deserialize a proof from bytes.
    ///
    /// The size limit keeps a crafted length header from allocating more than
    /// a full-depth proof needs, and proofs with more siblings than the tree
    /// can ever have levels are rejected.
    pub fn decode_from_slice(bytes: &[u8]) -> Result<Self> {
        let config = bincode::config::standard()
            .with_big_endian()
            .with_limit::<{ 64 * 1024 }>();
        let (proof, _): (Proof, usize) = bincode::decode_from_slice(bytes, config)
            .map_err(|e| Error::InvalidProof(format!("failed to decode proof: {}", e)))?;
        if proof.siblings.len() > MAX_DEPTH_HARD_CAP as usize {
            return Err(Error::InvalidProof(format!(
                "proof has {} siblings, at most {} allowed",
                proof.siblings.len(),
                MAX_DEPTH_HARD_CAP
            )));
        }
        Ok(proof)
    }
}
