//! Performance benchmarks for oxibz decompression
//!
//! This benchmark suite evaluates:
//! - Decompression speed for streams written at different levels (1-9)
//! - Decompression speed across various data patterns
//! - Read granularity (whole stream, 4 KiB reads, single bytes)
//! - Concatenated members and progress listener overhead
//! - Inverse BWT on its own

use bzip2::Compression;
use bzip2::write::BzEncoder;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxibz::{BzReader, ListenerResult, ProgressEvent, bwt, decompress};
use std::hint::black_box;
use std::io::Write;

/// Type alias for pattern generator functions
type PatternGenerator = fn(usize) -> Vec<u8>;

/// Generate test data patterns for benchmarking
mod test_data {
    /// Uniform data - all bytes are the same (long RUNA/RUNB runs)
    pub fn uniform(size: usize) -> Vec<u8> {
        vec![0xAA; size]
    }

    /// Random data - no patterns (largest Huffman codes)
    pub fn random(size: usize) -> Vec<u8> {
        let mut data = Vec::with_capacity(size);
        let mut seed: u64 = 0x123456789ABCDEF0;
        for _ in 0..size {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            data.push((seed >> 32) as u8);
        }
        data
    }

    /// Repetitive pattern
    pub fn repetitive(size: usize) -> Vec<u8> {
        let pattern = b"TOBEORNOTTOBEORTOBEORNOT";
        pattern.iter().copied().cycle().take(size).collect()
    }

    /// Text-like data - realistic scenario
    pub fn text_like(size: usize) -> Vec<u8> {
        let text = b"The quick brown fox jumps over the lazy dog. \
                     Pack my box with five dozen liquor jugs. \
                     How vexingly quick daft zebras jump! \
                     Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";
        text.iter().copied().cycle().take(size).collect()
    }
}

/// Standard data sizes for benchmarking
mod data_sizes {
    pub const SMALL: usize = 10 * 1024; // 10 KB
    pub const MEDIUM: usize = 256 * 1024; // 256 KB
    pub const LARGE: usize = 2 * 1024 * 1024; // 2 MB (several blocks)
}

fn compress(data: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = BzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(data).expect("in-memory compression");
    encoder.finish().expect("in-memory compression")
}

/// Benchmark decompression of streams written at each level
fn bench_decompression_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_levels");

    let size = data_sizes::MEDIUM;
    let data = test_data::text_like(size);

    for level in [1, 3, 5, 7, 9] {
        let compressed = compress(&data, level);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("level_{}", level)),
            &compressed,
            |b, compressed| {
                b.iter(|| {
                    let out = decompress(black_box(&compressed[..])).unwrap();
                    black_box(out);
                });
            },
        );
    }

    group.finish();
}

/// Benchmark decompression speed for different data types
fn bench_decompression_data_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("decompression_data_types");

    let patterns: [(&str, PatternGenerator); 4] = [
        ("uniform", test_data::uniform as PatternGenerator),
        ("random", test_data::random as PatternGenerator),
        ("repetitive", test_data::repetitive as PatternGenerator),
        ("text_like", test_data::text_like as PatternGenerator),
    ];

    let size = data_sizes::MEDIUM;
    for (name, generator) in patterns {
        let compressed = compress(&generator(size), 9);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), &compressed, |b, compressed| {
            b.iter(|| {
                let out = decompress(black_box(&compressed[..])).unwrap();
                black_box(out);
            });
        });
    }

    group.finish();
}

/// Benchmark read granularity through the pull interface
fn bench_read_granularity(c: &mut Criterion) {
    let mut group = c.benchmark_group("read_granularity");

    let size = data_sizes::MEDIUM;
    let compressed = compress(&test_data::text_like(size), 9);
    group.throughput(Throughput::Bytes(size as u64));

    group.bench_function("read_to_end", |b| {
        b.iter(|| {
            let mut reader = BzReader::new(black_box(&compressed[..])).unwrap();
            let mut out = Vec::with_capacity(size);
            std::io::Read::read_to_end(&mut reader, &mut out).unwrap();
            black_box(out);
        });
    });

    group.bench_function("read_into_4k", |b| {
        b.iter(|| {
            let mut reader = BzReader::new(black_box(&compressed[..])).unwrap();
            let mut buf = [0u8; 4096];
            let mut total = 0;
            loop {
                let n = reader.read_into(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                total += n;
            }
            black_box(total);
        });
    });

    group.bench_function("read_byte", |b| {
        b.iter(|| {
            let mut reader = BzReader::new(black_box(&compressed[..])).unwrap();
            let mut sum = 0u64;
            while let Some(byte) = reader.read_byte().unwrap() {
                sum += byte as u64;
            }
            black_box(sum);
        });
    });

    group.finish();
}

/// Benchmark many small members against one large member
fn bench_concatenated(c: &mut Criterion) {
    let mut group = c.benchmark_group("concatenated");
    group.sample_size(20);

    let size = data_sizes::LARGE;
    let data = test_data::text_like(size);
    let single = compress(&data, 9);
    let mut multi = Vec::new();
    for chunk in data.chunks(64 * 1024) {
        multi.extend(compress(chunk, 9));
    }

    group.throughput(Throughput::Bytes(size as u64));
    group.bench_with_input(BenchmarkId::from_parameter("single_member"), &single, |b, input| {
        b.iter(|| black_box(decompress(black_box(&input[..])).unwrap()));
    });
    group.bench_with_input(BenchmarkId::from_parameter("32_members"), &multi, |b, input| {
        b.iter(|| black_box(decompress(black_box(&input[..])).unwrap()));
    });

    group.finish();
}

/// Benchmark the cost of progress listeners
fn bench_listener_overhead(c: &mut Criterion) {
    let mut group = c.benchmark_group("listener_overhead");
    group.sample_size(20);

    let size = data_sizes::LARGE;
    let compressed = compress(&test_data::random(size), 1);
    group.throughput(Throughput::Bytes(size as u64));

    for listeners in [0usize, 1, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_listeners", listeners)),
            &compressed,
            |b, compressed| {
                b.iter(|| {
                    let mut reader = BzReader::new(&compressed[..]).unwrap();
                    for _ in 0..listeners {
                        reader.add_listener(|event: &ProgressEvent| -> ListenerResult {
                            black_box(event.cumulative_bytes);
                            Ok(())
                        });
                    }
                    std::io::copy(&mut reader, &mut std::io::sink()).unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark inverse BWT with reused buffers
fn bench_bwt_inverse(c: &mut Criterion) {
    let mut group = c.benchmark_group("bwt_inverse");

    for (size_name, size) in [("10KB", data_sizes::SMALL), ("256KB", data_sizes::MEDIUM)] {
        // Walk cost depends only on length
        let transformed = test_data::random(size);

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(size_name),
            &transformed,
            |b, transformed| {
                let mut next = Vec::new();
                let mut output = Vec::new();
                b.iter(|| {
                    bwt::inverse_transform_into(black_box(transformed), 0, &mut next, &mut output)
                        .unwrap();
                    black_box(output.len());
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_decompression_levels,
    bench_decompression_data_types,
    bench_read_granularity,
    bench_concatenated,
    bench_listener_overhead,
    bench_bwt_inverse,
);

criterion_main!(benches);
