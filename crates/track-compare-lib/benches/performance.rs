//! Performance benchmarks for track-compare-lib
//!
//! Run with: cargo bench --package track-compare-lib

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use track_compare_lib::{
    GeoPoint, MatchStrategy, NearestMatcher, SummaryStatistics, TimeWindowMatcher, Track,
};

const START: OffsetDateTime = datetime!(2024-05-01 12:00:00 UTC);

/// Generate a realistic track sampled every `interval` seconds.
fn generate_track(num_points: usize, interval: f64, jitter: f64) -> Track {
    let points = (0..num_points)
        .map(|i| {
            let t = i as f64 / num_points as f64;
            let lat = 51.5 + t * 0.1 + (t * 50.0).sin() * 0.001 + jitter;
            let lon = -0.1 + t * 0.1 + (t * 30.0).cos() * 0.001 - jitter;
            let time = START + Duration::seconds_f64(i as f64 * interval);
            GeoPoint::new(lat, lon, Some(time))
        })
        .collect();
    Track::from_points(points)
}

/// Render a track as GPX text for parser benchmarks
fn generate_gpx(track: &Track) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<gpx version=\"1.1\"><trk><trkseg>\n");
    for (i, point) in track.points().iter().enumerate() {
        out.push_str(&format!(
            "<trkpt lat=\"{:.7}\" lon=\"{:.7}\"><ele>12.5</ele><time>2024-05-01T{:02}:{:02}:{:02}Z</time></trkpt>\n",
            point.lat(),
            point.lon(),
            12 + i / 3600,
            (i / 60) % 60,
            i % 60
        ));
    }
    out.push_str("</trkseg></trk></gpx>\n");
    out
}

// ============================================================================
// Core Benchmarks
// ============================================================================

fn bench_time_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("time_matching");

    for size in [1_000, 10_000, 100_000] {
        let baseline = generate_track(size, 1.0, 0.0);
        let test = generate_track(size, 0.9, 0.00002);
        let matcher = TimeWindowMatcher::new(5.0);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| matcher.match_tracks(&baseline, &test));
        });
    }

    group.finish();
}

fn bench_nearest_matching(c: &mut Criterion) {
    let mut group = c.benchmark_group("nearest_matching");
    group.sample_size(20);

    for size in [500, 2_000, 5_000] {
        let baseline = generate_track(size, 1.0, 0.0);
        let test = generate_track(size, 1.0, 0.00002);

        group.throughput(Throughput::Elements((size * size) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| NearestMatcher.match_tracks(&baseline, &test));
        });
    }

    group.finish();
}

fn bench_summary(c: &mut Criterion) {
    let mut group = c.benchmark_group("summary");

    let distances: Vec<f64> = (0..100_000).map(|i| ((i * 7919) % 10_007) as f64 * 0.01).collect();
    group.throughput(Throughput::Elements(distances.len() as u64));
    group.bench_function("from_distances_100k", |b| {
        b.iter(|| SummaryStatistics::from_distances(&distances));
    });

    group.finish();
}

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(20);

    let content = generate_gpx(&generate_track(20_000, 1.0, 0.0));
    group.throughput(Throughput::Bytes(content.len() as u64));
    group.bench_function("from_reader_20k", |b| {
        b.iter(|| Track::from_reader(content.as_bytes()).unwrap());
    });

    group.finish();
}

// ============================================================================
// Criterion Configuration
// ============================================================================

criterion_group!(
    benches,
    bench_time_matching,
    bench_nearest_matching,
    bench_summary,
    bench_parsing,
);

criterion_main!(benches);
