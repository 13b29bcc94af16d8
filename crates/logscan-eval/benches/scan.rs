//! Detection engine benchmarks for logscan-eval.
//!
//! Measures full-scan throughput at various record counts and the cost of
//! the counter store on its own.


use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logscan_eval::{CounterStore, DetectionEngine, RuleConfig, RuleKind};

// ---------------------------------------------------------------------------
// Benchmark: scan N records through the full catalog
// ---------------------------------------------------------------------------

fn bench_scan_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan_throughput");
    group.sample_size(20);

    for n in [1_000, 10_000, 50_000] {
        let records = datagen::gen_records(n);

        group.bench_with_input(BenchmarkId::new("records", n), &records, |b, records| {
            b.iter(|| {
                let mut engine = DetectionEngine::new(RuleConfig::default());
                let results = engine.analyze_records(records.iter().cloned(), None);
                black_box(results);
            });
        });
    }

    group.finish();
}

// ---------------------------------------------------------------------------
// Benchmark: counter store increments
// ---------------------------------------------------------------------------

fn bench_counter_store(c: &mut Criterion) {
    c.bench_function("counter_store_increment", |b| {
        b.iter(|| {
            let mut store = CounterStore::new();
            for i in 0..1_000u32 {
                let entity = format!("user-{}", i % 50);
                black_box(store.increment(RuleKind::FailedLogin, &entity));
            }
            black_box(store.len());
        });
    });
}

criterion_group!(benches, bench_scan_throughput, bench_counter_store);
criterion_main!(benches);
