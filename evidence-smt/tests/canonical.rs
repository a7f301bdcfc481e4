//! Shape-independence properties of the tree.

use std::collections::BTreeMap;

use evidence_smt::{Blake3Hasher, Key, SparseMerkleTree, Value, ZERO_HASH, u256_from_u64};
use proptest::prelude::*;

fn build(pairs: &[(Key, Value)]) -> SparseMerkleTree {
    let mut tree = SparseMerkleTree::new();
    tree.initialize(64).expect("initialize tree");
    for (key, value) in pairs {
        tree.add(*key, *value).expect("add");
    }
    tree
}

fn key_set() -> impl Strategy<Value = BTreeMap<u64, u64>> {
    // Keys below 2^40 never need more than 40 levels.
    prop::collection::btree_map(0u64..(1 << 40), any::<u64>(), 1..40)
}

fn to_pairs(map: &BTreeMap<u64, u64>) -> Vec<(Key, Value)> {
    map.iter()
        .map(|(k, v)| (u256_from_u64(*k), u256_from_u64(*v)))
        .collect()
}

proptest! {
    #[test]
    fn test_root_is_order_independent(map in key_set(), seed in any::<u64>()) {
        let pairs = to_pairs(&map);
        let mut shuffled = pairs.clone();
        // Deterministic rotation plus reversal covers distinct orders.
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        shuffled.reverse();

        let a = build(&pairs);
        let b = build(&shuffled);
        prop_assert_eq!(a.root(), b.root());
        prop_assert_eq!(a.nodes_count(), b.nodes_count());
    }

    #[test]
    fn test_incremental_matches_rebuild(map in key_set(), removed in prop::collection::vec(any::<prop::sample::Index>(), 0..10)) {
        let pairs = to_pairs(&map);
        let mut tree = build(&pairs);

        let mut remaining = map.clone();
        for index in removed {
            if remaining.is_empty() {
                break;
            }
            let key = *index.get(&remaining.keys().copied().collect::<Vec<_>>());
            remaining.remove(&key);
            tree.remove(&u256_from_u64(key)).expect("remove");
        }

        let rebuilt = build(&to_pairs(&remaining));
        prop_assert_eq!(tree.root(), rebuilt.root());
        prop_assert_eq!(tree.nodes_count(), rebuilt.nodes_count());
        if remaining.is_empty() {
            prop_assert_eq!(tree.root(), ZERO_HASH);
        }
    }

    #[test]
    fn test_every_proof_verifies(map in key_set(), probe in 0u64..(1 << 40)) {
        let tree = build(&to_pairs(&map));
        let root = tree.root();
        for key in map.keys().copied().chain(std::iter::once(probe)) {
            let proof = tree.get_proof(&u256_from_u64(key));
            prop_assert_eq!(proof.existence, map.contains_key(&key));
            prop_assert!(proof.verify(&Blake3Hasher, &root).is_ok());
        }
    }
}
