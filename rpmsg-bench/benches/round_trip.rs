//! Coprocessor/host round trips over file-backed rings.
//!
//! Each iteration: the host posts a message, the firmware receives and
//! echoes it, the host reaps both rings.
//!
//! Run with: cargo bench -p rpmsg-bench --bench round_trip

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rpmsg_bench::latency::LatencyCollector;
use rpmsg_bench::loopback::Loopback;
use rpmsg_bench::throughput::run_round_trips;
use rpmsg_core::RpmsgHeader;
use rpmsg_vring::VringConfig;
use std::hint::black_box;

const PAYLOAD_SIZES: [usize; 4] = [0, 32, 128, RpmsgHeader::MAX_PAYLOAD];

fn benchmark_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("round_trip");
    let mut link = Loopback::new(&VringConfig::default()).expect("loopback");

    for size in PAYLOAD_SIZES {
        let payload = vec![0x5Au8; size];
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| link.round_trip(black_box(payload)).expect("round trip"))
        });
    }
    group.finish();
}

fn benchmark_ring_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_depth");
    let payload = [0u8; 64];

    for depth in [2u16, 16, 256] {
        let mut link = Loopback::new(&VringConfig::default().depth(depth)).expect("loopback");
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| link.round_trip(black_box(&payload)).expect("round trip"))
        });
    }
    group.finish();
}

/// Prints a latency distribution once, outside criterion's sampling.
fn report_latency(_c: &mut Criterion) {
    let mut link = Loopback::new(&VringConfig::default()).expect("loopback");
    let mut latency = LatencyCollector::new().expect("histogram");
    let result =
        run_round_trips(&mut link, 100_000, &[0u8; 64], Some(&mut latency)).expect("round trips");

    if let Some(stats) = latency.stats() {
        println!(
            "round_trip/64: {:.0} msg/s, p50 {:?}, p99 {:?}, p99.9 {:?}, max {:?}",
            result.messages_per_second(),
            stats.median,
            stats.p99,
            stats.p999,
            stats.max
        );
    }
}

criterion_group!(
    benches,
    benchmark_round_trip,
    benchmark_ring_depth,
    report_latency
);
criterion_main!(benches);
