// Signing, verification, and hashing benchmarks for the ledger engine.
//
// Covers ECDSA keypair generation, digest signing and verification on both
// supported curves, header hashing, and transaction finalization.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};

use keystone_ledger::{Block, Curve, DataKey, Digest, Hasher, KeyPair, Tx, TxOutput};

fn bench_keypair_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa/keypair_generate");
    for curve in [Curve::P256, Curve::Secp256k1] {
        group.bench_with_input(BenchmarkId::from_parameter(curve), &curve, |b, &curve| {
            b.iter(|| KeyPair::generate(curve, Hasher::Sha256));
        });
    }
    group.finish();
}

fn bench_sign_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa/sign_digest");
    for curve in [Curve::P256, Curve::Secp256k1] {
        let keypair = KeyPair::generate(curve, Hasher::Sha256);
        let digest = Digest::compute(Hasher::Sha256, b"move pallet 7 to dock 3; seq=42");
        group.bench_with_input(BenchmarkId::from_parameter(curve), &digest, |b, digest| {
            b.iter(|| keypair.sign(digest).unwrap());
        });
    }
    group.finish();
}

fn bench_verify_signature(c: &mut Criterion) {
    let mut group = c.benchmark_group("ecdsa/verify_signature");
    for curve in [Curve::P256, Curve::Secp256k1] {
        let keypair = KeyPair::generate(curve, Hasher::Sha256);
        let digest = Digest::compute(Hasher::Sha256, b"move pallet 7 to dock 3; seq=42");
        let signature = keypair.sign(&digest).unwrap();
        group.bench_with_input(
            BenchmarkId::from_parameter(curve),
            &signature,
            |b, signature| {
                b.iter(|| curve.verify(keypair.public_key(), &digest, signature));
            },
        );
    }
    group.finish();
}

fn bench_header_hash(c: &mut Criterion) {
    let keypair = KeyPair::generate(Curve::P256, Hasher::Sha256);
    let mut block = Block::new();
    block.set_signers(vec![keypair.public_key().clone(); 4]);
    block.header.s = 3;
    block.set_hash(Hasher::Sha256);

    c.bench_function("block/header_hash", |b| {
        b.iter(|| block.header.hash(Hasher::Sha256));
    });
}

fn bench_tx_finalize(c: &mut Criterion) {
    c.bench_function("tx/set_digest", |b| {
        b.iter(|| {
            let mut tx = Tx::base(vec![]);
            for i in 0..4 {
                tx.add_output(TxOutput::new(DataKey::new(b"pallet", i.to_string())));
            }
            tx.set_digest(Hasher::Sha256).unwrap();
            tx
        });
    });
}

criterion_group!(
    benches,
    bench_keypair_generation,
    bench_sign_digest,
    bench_verify_signature,
    bench_header_hash,
    bench_tx_finalize,
);
criterion_main!(benches);
