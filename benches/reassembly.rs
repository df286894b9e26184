//! Benchmarks for video frame reassembly
//!
//! Covers the per-fragment hot path:
//! - Completing frames of typical sizes fragment by fragment
//! - Frames superseded by loss before completion
//! - Sequence wraparound bookkeeping
//!
//! Platform: Cross-platform (synthetic fragments, CI-safe)

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use rotorlink::test_utils::split_frame;
use rotorlink::{Fragment, FrameReassembler};
use std::hint::black_box;

/// Payload bytes carried by one video datagram
const CHUNK: usize = 1024;

fn synthetic_frame(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

fn bench_complete_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("complete_frame");

    for frame_len in [4 * 1024, 32 * 1024, 120 * 1024] {
        let data = synthetic_frame(frame_len);
        // Alternate sequence ids so every pass starts a fresh frame.
        let even = split_frame(10, &data, CHUNK);
        let odd = split_frame(11, &data, CHUNK);

        group.throughput(Throughput::Bytes(frame_len as u64));
        group.bench_with_input(BenchmarkId::from_parameter(frame_len), &frame_len, |b, _| {
            let mut reassembler = FrameReassembler::new();
            b.iter(|| {
                let mut last = None;
                for fragment in even.iter().chain(odd.iter()) {
                    if let Some(frame) = reassembler.on_fragment(black_box(fragment)) {
                        last = Some(frame);
                    }
                }
                black_box(last)
            })
        });
    }

    group.finish();
}

fn bench_lossy_stream(c: &mut Criterion) {
    let data = synthetic_frame(32 * 1024);

    // Every other frame loses its second fragment and gets superseded.
    let mut stream: Vec<Fragment> = Vec::new();
    for sequence in 0..16u8 {
        let mut fragments = split_frame(sequence, &data, CHUNK);
        if sequence % 2 == 0 {
            fragments.remove(1);
        }
        stream.extend(fragments);
    }

    c.bench_function("lossy_stream_16_frames", |b| {
        let mut reassembler = FrameReassembler::new();
        b.iter(|| {
            let mut emitted = 0usize;
            for fragment in &stream {
                if reassembler.on_fragment(black_box(fragment)).is_some() {
                    emitted += 1;
                }
            }
            black_box(emitted)
        })
    });
}

fn bench_sequence_wrap(c: &mut Criterion) {
    // One single-fragment frame per sequence id, so each pass wraps once.
    let stream: Vec<Fragment> =
        (0..=255u8).map(|sequence| Fragment::new(sequence, 0, true, vec![sequence])).collect();

    c.bench_function("full_sequence_cycle", |b| {
        let mut reassembler = FrameReassembler::new();
        b.iter(|| {
            for fragment in &stream {
                black_box(reassembler.on_fragment(black_box(fragment)));
            }
            black_box(reassembler.wrap_blocks())
        })
    });
}

fn bench_parse_datagram(c: &mut Criterion) {
    let fragment = Fragment::new(42, 7, false, synthetic_frame(CHUNK));
    let datagram = fragment.to_wire();

    let mut group = c.benchmark_group("parse_datagram");
    group.throughput(Throughput::Bytes(datagram.len() as u64));
    group.bench_function("video_fragment", |b| {
        b.iter(|| black_box(Fragment::parse(black_box(&datagram))))
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_complete_frame,
    bench_lossy_stream,
    bench_sequence_wrap,
    bench_parse_datagram
);
criterion_main!(benches);
