//! # Store Benchmarks
//!
//! Performance benchmarks for streetscout-core upsert and listing.
//!
//! Run with: `cargo bench -p streetscout-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use streetscout_core::{
    EntityKind, SignFields, StreetFields, StreetPatch, UpsertEngine, street_id,
};

fn street(i: usize) -> StreetFields {
    StreetFields {
        zip: Some(format!("{:05}", i % 100_000)),
        name: Some(format!("Street {} St", i)),
        road_type: None,
        details: StreetPatch::default(),
    }
}

/// Create an engine holding N streets.
fn populated_engine(size: usize) -> UpsertEngine {
    let engine = UpsertEngine::new();
    for i in 0..size {
        engine.upsert_street(street(i)).expect("upsert");
    }
    engine
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_street_id(c: &mut Criterion) {
    c.bench_function("street_id", |b| {
        b.iter(|| {
            black_box(street_id(
                black_box("01824"),
                streetscout_core::RoadType::Street,
                black_box("Main St"),
            ))
        });
    });
}

fn bench_street_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("street_insertion");

    for size in [100, 1000, 10000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| black_box(populated_engine(size)));
        });
    }

    group.finish();
}

fn bench_street_merge(c: &mut Criterion) {
    let engine = populated_engine(1000);
    let mut n = 0.0_f64;

    c.bench_function("street_merge", |b| {
        b.iter(|| {
            n += 1.0;
            let fields = StreetFields {
                details: StreetPatch {
                    latitude: Some(n),
                    ..StreetPatch::default()
                },
                ..street(500)
            };
            black_box(engine.upsert_street(fields).expect("merge"))
        });
    });
}

fn bench_sign_creation(c: &mut Criterion) {
    let engine = populated_engine(1);
    let parent = street_id("00000", streetscout_core::RoadType::Street, "Street 0 St");

    c.bench_function("sign_creation", |b| {
        b.iter(|| {
            let fields = SignFields {
                street_id: Some(parent.clone()),
                ..SignFields::default()
            };
            black_box(engine.upsert_sign(None, Some(fields)).expect("sign"))
        });
    });
}

fn bench_list_page(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_page");

    for size in [100, 1000, 10000].iter() {
        let engine = populated_engine(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(engine.list(EntityKind::Street, 2, 50)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_street_id,
    bench_street_insertion,
    bench_street_merge,
    bench_sign_creation,
    bench_list_page,
);

criterion_main!(benches);
