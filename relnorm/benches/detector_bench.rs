//! Benchmarks for dependency detection and decomposition planning.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use relnorm::config::{DetectorConfig, EngineConfig};
use relnorm::detector::DependencyDetector;
use relnorm::engine::NormalizationEngine;
use relnorm::model::TableProfile;
use std::hint::black_box;
use std::time::Duration;

/// A table where `emp_id` is the key, `dept_id -> dept_name` holds and the
/// remaining columns are noise derived from the row number.
fn synthetic_table(rows: usize, columns: usize) -> TableProfile {
    let mut names = vec![
        "emp_id".to_string(),
        "dept_id".to_string(),
        "dept_name".to_string(),
    ];
    names.extend((3..columns).map(|i| format!("attr_{}", (b'a' + (i as u8 % 26)) as char)));

    let mut builder = TableProfile::builder("Employee").columns(names);
    for row in 0..rows {
        let dept = row % 7;
        let mut cells = vec![
            row.to_string(),
            format!("D{dept}"),
            format!("Dept {}", dept % 5),
        ];
        cells.extend((3..columns).map(|i| format!("x{}", (row * (i + 1)) % (i + 3))));
        builder = builder.row(cells);
    }
    builder.build().expect("synthetic table")
}

fn bench_detection(c: &mut Criterion) {
    let mut group = c.benchmark_group("dependency_detection");
    group.measurement_time(Duration::from_secs(10));

    for (rows, columns) in [(100, 4), (1_000, 4), (1_000, 8), (10_000, 6)] {
        let profile = synthetic_table(rows, columns);
        let label = format!("{rows}x{columns}");

        group.bench_with_input(BenchmarkId::new("sequential", &label), &profile, |b, profile| {
            let detector = DependencyDetector::new(DetectorConfig::sequential());
            b.iter(|| black_box(detector.detect(black_box(profile))));
        });
        group.bench_with_input(BenchmarkId::new("parallel", &label), &profile, |b, profile| {
            let detector = DependencyDetector::new(DetectorConfig::default());
            b.iter(|| black_box(detector.detect(black_box(profile))));
        });
    }
    group.finish();
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    group.measurement_time(Duration::from_secs(10));

    let engine = NormalizationEngine::new(EngineConfig::default()).expect("default config");
    for rows in [100, 1_000, 5_000] {
        let profile = synthetic_table(rows, 5);
        group.bench_with_input(BenchmarkId::new("analyze", rows), &profile, |b, profile| {
            b.iter(|| black_box(engine.analyze(black_box(profile)).expect("analysis")));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_detection, bench_analysis);
criterion_main!(benches);
