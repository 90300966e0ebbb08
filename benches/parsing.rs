//! Benchmarks for markdown parsing and outline extraction.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marginalia::document::Document;
use marginalia::outline::build_outline;

fn bench_parse_post(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md");
    c.bench_function("parse_post", |b| {
        b.iter(|| Document::parse_with_layout(black_box(md), 80).unwrap())
    });
}

fn bench_build_outline(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md").repeat(50);
    c.bench_function("build_outline_long", |b| {
        b.iter(|| build_outline(black_box(&md)))
    });
}

criterion_group!(benches, bench_parse_post, bench_build_outline);
criterion_main!(benches);
