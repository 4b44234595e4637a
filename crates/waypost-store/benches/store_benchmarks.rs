//! Benchmarks for path resolution, range parsing and sniffing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use waypost_store::sniff::{detect, InferSniffer};
use waypost_store::{content_range, PathResolver};

fn bench_resolve(c: &mut Criterion) {
    let resolver = PathResolver::new("/srv/waypost/images");

    let mut group = c.benchmark_group("resolve");
    for (name, input) in [
        ("plain", "0f3a9c2b4d5e6f708192a3b4c5d6e7f8"),
        ("traversal", "../../.../..../etc/passwd"),
        ("prefixed", "/srv/waypost/images/nested/file.png"),
    ] {
        group.bench_function(name, |b| b.iter(|| resolver.resolve(black_box(input))));
    }
    group.finish();
}

fn bench_content_range(c: &mut Criterion) {
    c.bench_function("content_range", |b| {
        b.iter(|| content_range(black_box(Some("bytes=1024-65535")), black_box(1 << 20)))
    });
}

fn bench_sniff(c: &mut Criterion) {
    let mut png = b"\x89PNG\r\n\x1a\n".to_vec();
    png.resize(512, 0);
    let text = vec![b'a'; 512];

    let mut group = c.benchmark_group("sniff");
    group.bench_function("png", |b| b.iter(|| detect(black_box(&png), &InferSniffer)));
    group.bench_function("unknown", |b| b.iter(|| detect(black_box(&text), &InferSniffer)));
    group.finish();
}

criterion_group!(benches, bench_resolve, bench_content_range, bench_sniff);
criterion_main!(benches);
