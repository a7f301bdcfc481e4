//! Circom-compatible Poseidon over the BN254 scalar field.
//!
//! Matches the `PoseidonUnit2L` / `PoseidonUnit3L` contracts generated by
//! circomlibjs and the iden3 merkletree, so roots and proofs produced with
//! this hasher can be checked inside circom circuits. Inputs are reduced
//! modulo the field before hashing; outputs are big-endian.

use std::sync::Mutex;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use light_poseidon::{Poseidon, PoseidonHasher as _};

use crate::{Error, Hash, HashFunction, Result};

/// Poseidon hasher with pre-built parameters for two and three inputs.
pub struct PoseidonHasher {
    t3: Mutex<Poseidon<Fr>>,
    t4: Mutex<Poseidon<Fr>>,
}

impl PoseidonHasher {
    /// Build the circom parameter sets for widths 3 and 4.
    pub fn new() -> Result<Self> {
        let t3 = Poseidon::<Fr>::new_circom(2).map_err(|e| Error::HashFunction(e.to_string()))?;
        let t4 = Poseidon::<Fr>::new_circom(3).map_err(|e| Error::HashFunction(e.to_string()))?;
        Ok(Self {
            t3: Mutex::new(t3),
            t4: Mutex::new(t4),
        })
    }

    fn hash_with(state: &Mutex<Poseidon<Fr>>, inputs: &[Fr]) -> Result<Hash> {
        let mut poseidon = state
            .lock()
            .map_err(|_| Error::HashFunction("poseidon state poisoned".to_string()))?;
        let digest = poseidon
            .hash(inputs)
            .map_err(|e| Error::HashFunction(e.to_string()))?;
        Ok(fr_to_bytes(&digest))
    }
}

impl std::fmt::Debug for PoseidonHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PoseidonHasher")
    }
}

impl HashFunction for PoseidonHasher {
    fn hash2(&self, a: &Hash, b: &Hash) -> Result<Hash> {
        Self::hash_with(&self.t3, &[fr_from_bytes(a), fr_from_bytes(b)])
    }

    fn hash3(&self, a: &Hash, b: &Hash, c: &Hash) -> Result<Hash> {
        Self::hash_with(
            &self.t4,
            &[fr_from_bytes(a), fr_from_bytes(b), fr_from_bytes(c)],
        )
    }

    fn name(&self) -> &'static str {
        "poseidon"
    }
}

fn fr_from_bytes(bytes: &Hash) -> Fr {
    Fr::from_be_bytes_mod_order(bytes)
}

fn fr_to_bytes(element: &Fr) -> Hash {
    let be = element.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    // BN254 elements serialize to exactly 32 bytes.
    let start = 32usize.saturating_sub(be.len());
    out[start..].copy_from_slice(&be[be.len().saturating_sub(32)..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::u256_from_u64;

    #[test]
    fn test_poseidon_known_vector() {
        // circomlibjs: poseidon([1, 2])
        let hasher = PoseidonHasher::new().expect("poseidon params");
        let digest = hasher
            .hash2(&u256_from_u64(1), &u256_from_u64(2))
            .expect("hash2");
        assert_eq!(
            hex::encode(digest),
            "115cc0f5e7d690413df64c6b9662e9cf2a3617f2743245519e19607a4417189a"
        );
    }

    #[test]
    fn test_poseidon_reduces_inputs() {
        let hasher = PoseidonHasher::new().expect("poseidon params");
        let modulus = hex::decode("30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000001")
            .expect("hex");
        let mut p_plus_one = [0u8; 32];
        p_plus_one.copy_from_slice(&modulus);
        p_plus_one[31] += 1;
        let reduced = hasher
            .hash2(&p_plus_one, &u256_from_u64(2))
            .expect("hash2");
        let direct = hasher
            .hash2(&u256_from_u64(1), &u256_from_u64(2))
            .expect("hash2");
        assert_eq!(reduced, direct);
    }
}
