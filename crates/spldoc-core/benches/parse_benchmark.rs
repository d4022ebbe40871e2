//! Benchmarks for SPLDOC parsing
//!
//! Run with: cargo bench -p spldoc-core

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use spldoc_core::{first_sentence, parse, parse_annotations};

/// Sample SPLDOC comment
const SPLDOC_SAMPLE: &str = r#"Splits a stream of tuples into **batches** of a fixed size.
The operator holds tuples until the batch is full and then submits
them together. See [https://example.com/batch|the batching guide].

# Parameters

The operator has two parameters:
* *size*: the number of tuples per batch
* *timeout*: seconds to wait before a partial batch is flushed
  1. a timeout of zero disables flushing
  2. negative values are rejected

# Example

    stream<Data> Batched = Batch(In) {
        param size: 100;
    }

--- Supported types
|:-----|------:|
| Type | Bytes |
|======|=======|
| int32 | 4 |
| float64 | 8 |
|------|-------|
| rstring | n |
----

! Internal note, not rendered.

+ Details
Batches are never split across punctuation markers.
@param size the number of tuples per batch
@param timeout the flush interval
@return the batched stream
"#;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.throughput(Throughput::Bytes(SPLDOC_SAMPLE.len() as u64));

    group.bench_function("tree", |b| {
        b.iter(|| {
            let tree = parse(black_box(SPLDOC_SAMPLE), 0);
            black_box(tree.len())
        })
    });

    group.bench_function("annotations", |b| {
        b.iter(|| {
            let annotations = parse_annotations(black_box(SPLDOC_SAMPLE));
            black_box(annotations.len())
        })
    });

    group.bench_function("first_sentence", |b| {
        b.iter(|| black_box(first_sentence(black_box(SPLDOC_SAMPLE)).len()))
    });

    group.finish();
}

fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("scaling");

    // Test with different document sizes
    for size in [1, 5, 10, 20].iter() {
        let content: String = SPLDOC_SAMPLE.repeat(*size);

        group.throughput(Throughput::Bytes(content.len() as u64));

        group.bench_with_input(BenchmarkId::new("spldoc", size), &content, |b, content| {
            b.iter(|| {
                let tree = parse(black_box(content), 0);
                black_box(tree.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_parse, bench_scaling);
criterion_main!(benches);
