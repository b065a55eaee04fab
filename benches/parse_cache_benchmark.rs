//! Benchmarks for the parse-tree cache
//!
//! - Full parse of a document through the cache
//! - Incremental reparse after a single-character edit
//! - Cache lookup (snapshot clone)
//! - Enclosing-function query at a cursor
//!
//! Run with: cargo bench --bench parse_cache_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use syntax_query::config::EngineConfig;
use syntax_query::document::{ContentChange, SourceDocument, TextDocument};
use syntax_query::SyntaxEngine;
use tokio::runtime::Runtime;
use tree_sitter::Point;

fn generate_source(function_count: usize) -> String {
    let mut code = String::new();
    for i in 0..function_count {
        code.push_str(&format!(
            "function handler{i}(request, response) {{\n  const body = parse(request.body);\n  if (body.id === {i}) {{\n    return response.send(body);\n  }}\n  return null;\n}}\n\n"
        ));
    }
    code
}

fn bench_full_parse(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = SyntaxEngine::new(EngineConfig::default());
    let mut group = c.benchmark_group("full_parse");

    for count in [10, 100, 500] {
        let doc = SourceDocument::new("file:///bench.js", "javascript", &generate_source(count));
        group.bench_with_input(BenchmarkId::from_parameter(count), &doc, |b, doc| {
            b.iter(|| rt.block_on(engine.open(black_box(doc))).unwrap())
        });
    }
    group.finish();
}

fn bench_incremental_edit(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = SyntaxEngine::new(EngineConfig::default());
    let mut group = c.benchmark_group("incremental_edit");

    for count in [10, 100, 500] {
        let mut doc = SourceDocument::new("file:///bench.js", "javascript", &generate_source(count));
        rt.block_on(engine.open(&doc)).unwrap();
        let middle = doc.offset_at(Point::new(count * 4, 10));

        group.bench_function(BenchmarkId::from_parameter(count), |b| {
            let mut toggle = false;
            b.iter(|| {
                // alternate insert and delete so the document does not grow
                let change = if toggle {
                    ContentChange::delete(middle, 1)
                } else {
                    ContentChange::insert(middle, "x")
                };
                toggle = !toggle;
                engine.change(&mut doc, black_box(&[change])).unwrap()
            })
        });
    }
    group.finish();
}

fn bench_cached_lookup_and_query(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let engine = SyntaxEngine::new(EngineConfig::default());
    let doc = SourceDocument::new("file:///bench.js", "javascript", &generate_source(100));
    rt.block_on(engine.open(&doc)).unwrap();

    c.bench_function("cached_lookup", |b| {
        b.iter(|| engine.cache().get_cached_tree(black_box(&doc)).is_some())
    });

    let cursor = Point::new(200, 6);
    c.bench_function("enclosing_function_query", |b| {
        b.iter(|| {
            engine.with_query_sdk(&doc, |sdk| sdk.enclosing_function(black_box(cursor), cursor).is_some())
        })
    });
}

criterion_group!(
    benches,
    bench_full_parse,
    bench_incremental_edit,
    bench_cached_lookup_and_query
);
criterion_main!(benches);
