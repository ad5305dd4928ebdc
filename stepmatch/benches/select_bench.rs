//! Benchmarks for template selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use giztoy_stepmatch::{distance, noop, Context, Registry};

/// Generate distinct step templates
fn generate_templates(count: usize) -> Vec<String> {
    let nouns = ["cukes", "apples", "boxes", "tickets", "users"];
    (0..count)
        .map(|i| format!(r"I have (\d+) {} in bucket {}", nouns[i % nouns.len()], i))
        .collect()
}

fn build_registry(count: usize) -> Registry {
    let mut registry = Registry::new();
    registry
        .add_steps(generate_templates(count), noop(), Context::new())
        .unwrap();
    registry
}

fn bench_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_select");

    for size in [10, 100, 1000].iter() {
        let registry = build_registry(*size);
        let text = format!("I have 42 cukes in bucket {}", size / 2 - size / 2 % 5);

        group.bench_with_input(BenchmarkId::new("hit", size), size, |b, _| {
            b.iter(|| black_box(registry.select(black_box(&text)).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("miss", size), size, |b, _| {
            b.iter(|| black_box(registry.select(black_box("nothing matches this")).unwrap()));
        });
    }

    group.finish();
}

fn bench_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("distance");

    for len in [16, 64, 256].iter() {
        let a = "given I have cukes ".repeat(*len / 16);
        let b = "when I eat gherkins ".repeat(*len / 16);

        group.bench_with_input(BenchmarkId::new("len", len), len, |bench, _| {
            bench.iter(|| black_box(distance(black_box(&a), black_box(&b))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_select, bench_distance);
criterion_main!(benches);
