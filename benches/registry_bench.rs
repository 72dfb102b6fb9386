//! Track registry benchmarks: path length over long tracks and field lookups.
//!
//! Run with: `cargo bench`

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use igcinfo::track::{total_distance, Point, Track, TrackRegistry};

/// A slow spiral so every leg has a different bearing.
fn spiral(len: usize) -> Vec<Point> {
    (0..len)
        .map(|i| {
            let t = i as f64 * 0.01;
            Point::at(46.0 + 0.1 * t.sin() * t / 10.0, 7.0 + 0.1 * t.cos() * t / 10.0)
        })
        .collect()
}

fn track(id: String, points: Vec<Point>) -> Track {
    Track {
        id,
        pilot: "Bench Pilot".to_string(),
        glider_type: "LS8".to_string(),
        glider_id: "D-1234".to_string(),
        recorded_at: Utc.with_ymd_and_hms(2020, 7, 1, 0, 0, 0).unwrap(),
        points,
    }
}

fn bench_total_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("total_distance");
    // one fix per second: 1 min, 1 h, 8 h flights
    for len in [60usize, 3_600, 28_800] {
        let points = spiral(len);
        group.throughput(Throughput::Elements(len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(len), &points, |b, points| {
            b.iter(|| black_box(total_distance(points)));
        });
    }
    group.finish();
}

fn bench_registry(c: &mut Criterion) {
    let registry = TrackRegistry::new();
    for i in 0..1_000 {
        registry
            .register(track(format!("T{i:04}"), spiral(3_600)))
            .unwrap();
    }

    let mut group = c.benchmark_group("registry");
    group.bench_function("get_field_pilot", |b| {
        b.iter(|| black_box(registry.get_field("T0500", "pilot").unwrap()));
    });
    group.bench_function("get_field_track_length", |b| {
        b.iter(|| black_box(registry.get_field("T0500", "track_length").unwrap()));
    });
    group.bench_function("list_ids", |b| {
        b.iter(|| black_box(registry.list_ids()));
    });
    group.finish();
}

criterion_group!(benches, bench_total_distance, bench_registry);
criterion_main!(benches);
