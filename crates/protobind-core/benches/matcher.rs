//! Matcher benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use protobind_core::ProtocolMatcher;

fn exact_benchmark(c: &mut Criterion) {
    let matcher = ProtocolMatcher::exact("/ipfs/kad/1.0.0");

    c.bench_function("exact_hit", |b| {
        b.iter(|| black_box(matcher.matches(black_box("/ipfs/kad/1.0.0"))))
    });

    c.bench_function("exact_miss", |b| {
        b.iter(|| black_box(matcher.matches(black_box("/ipfs/bitswap/1.2.0"))))
    });
}

fn major_benchmark(c: &mut Criterion) {
    let matcher = ProtocolMatcher::major("/meshsub/1.0.0").unwrap();

    c.bench_function("major_hit", |b| {
        b.iter(|| black_box(matcher.matches(black_box("/meshsub/1.1.0"))))
    });
}

fn registry_scan_benchmark(c: &mut Criterion) {
    let matchers: Vec<ProtocolMatcher> = (0..32)
        .map(|i| ProtocolMatcher::exact(format!("/proto/{}/1.0.0", i)))
        .collect();

    c.bench_function("scan_32_exact", |b| {
        b.iter(|| {
            black_box(
                matchers
                    .iter()
                    .position(|m| m.matches(black_box("/proto/31/1.0.0"))),
            )
        })
    });
}

criterion_group!(benches, exact_benchmark, major_benchmark, registry_scan_benchmark);
criterion_main!(benches);
