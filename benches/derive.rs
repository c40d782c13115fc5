use argon2_engine::{derive, Algorithm, Hasher};

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

pub fn bench_derive(c: &mut Criterion) {
    let mut group = c.benchmark_group("derive");
    group.sample_size(10);

    for (lanes, memory_cost_kib) in [(1, 4096), (4, 4096), (1, 32768)] {
        group.bench_with_input(
            BenchmarkId::new(format!("argon2id p={}", lanes), memory_cost_kib),
            &(lanes, memory_cost_kib),
            |b, &(lanes, memory_cost_kib)| {
                let mut out = [0u8; 32];
                b.iter(|| {
                    derive(
                        &mut out,
                        black_box(b"password"),
                        black_box(b"somesalt"),
                        None,
                        None,
                        Algorithm::Argon2id,
                        lanes,
                        memory_cost_kib,
                        2,
                    )
                    .unwrap()
                })
            },
        );
    }

    group.finish();
}

pub fn bench_hash_string(c: &mut Criterion) {
    let hash = Hasher::default()
        .memory_cost_kib(4096)
        .iterations(2)
        .hash(b"password")
        .unwrap()
        .to_string();

    c.bench_function("verify hash string m=4096 t=2", |b| {
        b.iter(|| {
            let parsed: argon2_engine::Hash = black_box(&hash).parse().unwrap();
            parsed.verify(b"password")
        })
    });
}

criterion_group!(benches, bench_derive, bench_hash_string);
criterion_main!(benches);
