//! Performance benchmarks for CRC-32/BZIP2
//!
//! This benchmark suite evaluates:
//! - Throughput (MB/s) across data sizes around the slicing-by-8 threshold
//! - Byte-at-a-time updates, the way the block decoder feeds output
//! - Stream CRC combination over many block checksums

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxibz_core::crc::Crc32;
use std::hint::black_box;

/// Text-like data
fn text_like(size: usize) -> Vec<u8> {
    let text = b"The quick brown fox jumps over the lazy dog. ";
    text.iter().copied().cycle().take(size).collect()
}

/// Benchmark CRC-32 across different data sizes
fn bench_crc32_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_sizes");

    for (size_name, size) in [
        ("8B", 8),
        ("16B", 16),
        ("256B", 256),
        ("4KB", 4 * 1024),
        ("64KB", 64 * 1024),
        ("900KB", 900_000),
    ] {
        let data = text_like(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size_name), &data, |b, data| {
            b.iter(|| black_box(Crc32::compute(black_box(data))));
        });
    }

    group.finish();
}

/// Benchmark per-byte updates against one bulk update
fn bench_crc32_bytewise(c: &mut Criterion) {
    let mut group = c.benchmark_group("crc32_bytewise");
    let data = text_like(64 * 1024);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("update_byte", |b| {
        b.iter(|| {
            let mut crc = Crc32::new();
            for &byte in black_box(&data) {
                crc.update_byte(byte);
            }
            black_box(crc.finalize())
        });
    });

    group.bench_function("update", |b| {
        b.iter(|| {
            let mut crc = Crc32::new();
            crc.update(black_box(&data));
            black_box(crc.finalize())
        });
    });

    group.finish();
}

/// Benchmark folding block CRCs into a stream CRC
fn bench_crc32_combine(c: &mut Criterion) {
    let block_crcs: Vec<u32> = (0..1024u32)
        .map(|i| i.wrapping_mul(2_654_435_761))
        .collect();

    c.bench_function("crc32_combine_1024_blocks", |b| {
        b.iter(|| {
            let combined = black_box(&block_crcs)
                .iter()
                .fold(0u32, |acc, &crc| Crc32::combine(acc, crc));
            black_box(combined)
        });
    });
}

criterion_group!(
    benches,
    bench_crc32_sizes,
    bench_crc32_bytewise,
    bench_crc32_combine
);
criterion_main!(benches);
