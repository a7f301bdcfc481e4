use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use evidence_smt::{Blake3Hasher, Key, SparseMerkleTree};
use rand::{Rng, SeedableRng, rngs::StdRng, seq::IndexedRandom};

fn random_keys(count: usize) -> Vec<Key> {
    let mut rng = StdRng::seed_from_u64(7);
    (0..count)
        .map(|_| {
            let mut key = [0u8; 32];
            rng.fill(&mut key[4..]);
            key
        })
        .collect()
}

fn prepare_tree(keys: &[Key]) -> SparseMerkleTree {
    let mut tree = SparseMerkleTree::new();
    tree.initialize(80).expect("initialize tree");
    for key in keys {
        tree.add(*key, *key).expect("add");
    }
    tree
}

fn bench(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("SMT insertion");
        for size in [1_000usize, 10_000] {
            let keys = random_keys(size);
            group.bench_with_input(BenchmarkId::new("keys", size), &keys, |b, keys| {
                b.iter(|| prepare_tree(black_box(keys)));
            });
        }
    }

    c.bench_function("SMT gen proof", |b| {
        let keys = random_keys(10_000);
        let tree = prepare_tree(&keys);
        let mut rng = StdRng::seed_from_u64(11);
        b.iter(|| {
            let key = keys.choose(&mut rng).expect("non-empty keys");
            black_box(tree.get_proof(key))
        });
    });

    c.bench_function("SMT verify", |b| {
        let keys = random_keys(10_000);
        let tree = prepare_tree(&keys);
        let root = tree.root();
        let proofs: Vec<_> = keys.iter().take(1_000).map(|k| tree.get_proof(k)).collect();
        let mut rng = StdRng::seed_from_u64(13);
        b.iter(|| {
            let proof = proofs.choose(&mut rng).expect("non-empty proofs");
            proof.verify(&Blake3Hasher, &root).expect("verify");
        });
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench
);
criterion_main!(benches);
