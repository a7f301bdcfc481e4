//! Stateless proof checking.

use crate::{
    Error, Hash, HashFunction, MAX_DEPTH_HARD_CAP, Proof, Result, ZERO_HASH, key_bit,
    node::leaf_hash,
};

impl Proof {
    /// Recompute the root implied by this proof.
    ///
    /// The terminal node is the leaf of `key` for membership proofs, the aux
    /// leaf when one is carried, and the empty node otherwise. It is hashed
    /// upward along the path of `key`.
    pub fn compute_root(&self, hasher: &dyn HashFunction) -> Result<Hash> {
        let mut current = if self.existence {
            leaf_hash(hasher, &self.key, &self.value)?
        } else if self.aux_existence {
            leaf_hash(hasher, &self.aux_key, &self.aux_value)?
        } else {
            ZERO_HASH
        };

        for (depth, sibling) in self.siblings.iter().enumerate().rev() {
            current = if key_bit(&self.key, depth as u32) {
                hasher.hash2(sibling, &current)?
            } else {
                hasher.hash2(&current, sibling)?
            };
        }
        Ok(current)
    }

    /// Check this proof against `expected_root`.
    ///
    /// Returns [`Error::InvalidProof`] describing the first check that failed.
    pub fn verify(&self, hasher: &dyn HashFunction, expected_root: &Hash) -> Result<()> {
        if self.siblings.len() > MAX_DEPTH_HARD_CAP as usize {
            return Err(Error::InvalidProof(format!(
                "{} siblings exceed the maximum depth",
                self.siblings.len()
            )));
        }
        if self.existence && self.aux_existence {
            return Err(Error::InvalidProof(
                "membership proof carries an aux leaf".to_string(),
            ));
        }
        if !self.existence && self.value != ZERO_HASH {
            return Err(Error::InvalidProof(
                "non-membership proof carries a value".to_string(),
            ));
        }
        if self.aux_existence {
            if self.aux_key == self.key {
                return Err(Error::InvalidProof(
                    "aux leaf holds the queried key".to_string(),
                ));
            }
            let shares_path = (0..self.siblings.len() as u32)
                .all(|depth| key_bit(&self.aux_key, depth) == key_bit(&self.key, depth));
            if !shares_path {
                return Err(Error::InvalidProof(
                    "aux leaf does not lie on the path of the queried key".to_string(),
                ));
            }
        }
        if &self.root != expected_root {
            return Err(Error::InvalidProof(format!(
                "proof root {} does not match expected root {}",
                hex::encode(self.root),
                hex::encode(expected_root)
            )));
        }
        let computed = self.compute_root(hasher)?;
        if &computed != expected_root {
            return Err(Error::InvalidProof(format!(
                "computed root {} does not match expected root {}",
                hex::encode(computed),
                hex::encode(expected_root)
            )));
        }
        Ok(())
    }
}

/// Check `proof` against `expected_root`; see [`Proof::verify`].
pub fn verify_proof(hasher: &dyn HashFunction, proof: &Proof, expected_root: &Hash) -> Result<()> {
    proof.verify(hasher, expected_root)
}
