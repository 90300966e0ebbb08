//! Benchmarks for content text mapping and comment highlights.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use marginalia::anchor::{AnchorStore, ContentText, DocPoint, Region, Selection, reapply_all};
use marginalia::document::Document;

fn bench_content_text(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md").repeat(20);
    let doc = Document::parse_with_layout(&md, 80).unwrap();

    c.bench_function("content_text", |b| {
        b.iter(|| ContentText::from_document(black_box(&doc)))
    });
}

fn bench_reapply_highlights(c: &mut Criterion) {
    let md = include_str!("../tests/fixtures/post.md").repeat(20);
    let doc = Document::parse_with_layout(&md, 80).unwrap();
    let content = ContentText::from_document(&doc);

    let mut store = AnchorStore::new();
    store.subscribe();
    for line in (0..doc.line_count()).step_by(7) {
        let selection = Selection {
            anchor: DocPoint::new(line, 0),
            focus: DocPoint::new(line + 1, 10),
            region: Region::Content,
        };
        store.capture(&selection, &content);
        store.submit("note");
    }

    c.bench_function("reapply_highlights", |b| {
        b.iter(|| {
            let mut doc = doc.clone();
            reapply_all(&mut doc, &content, black_box(store.anchors()))
        })
    });
}

criterion_group!(benches, bench_content_text, bench_reapply_highlights);
criterion_main!(benches);
