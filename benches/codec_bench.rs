// In benches/codec_bench.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use complab::{E8Codec, Lz77Codec, RangeCodec};

// --- Deterministic Mock Dataset Generation ---

/// Generates a vector of highly compressible data.
fn generate_low_entropy_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let pattern = b"abcdefgABCDEFG12345";
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

/// Generates a vector of less compressible, more random-looking data.
fn generate_high_entropy_bytes(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state = 0x2545F4914F6CDD1Du64;
    while data.len() < size {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        data.extend_from_slice(&state.to_le_bytes());
    }
    data.truncate(size);
    data
}

// --- Benchmark Suite ---

const BENCH_DATA_SIZE: usize = 1 << 20; // 1 MB

fn bench_codecs(c: &mut Criterion) {
    let low_entropy_data = generate_low_entropy_bytes(BENCH_DATA_SIZE);
    let high_entropy_data = generate_high_entropy_bytes(BENCH_DATA_SIZE);

    let range = RangeCodec::new();
    let lz77 = Lz77Codec::new();
    let e8 = E8Codec::new();

    let mut group = c.benchmark_group("Codec Comparison");
    group.throughput(criterion::Throughput::Bytes(BENCH_DATA_SIZE as u64));

    group.bench_function("Range Compress (Low Entropy)", |b| {
        b.iter(|| black_box(range.compress(black_box(&low_entropy_data))))
    });
    group.bench_function("Range Compress (High Entropy)", |b| {
        b.iter(|| black_box(range.compress(black_box(&high_entropy_data))))
    });

    group.bench_function("LZ77 Compress (Low Entropy)", |b| {
        b.iter(|| black_box(lz77.compress(black_box(&low_entropy_data))))
    });
    group.bench_function("LZ77 Compress (High Entropy)", |b| {
        b.iter(|| black_box(lz77.compress(black_box(&high_entropy_data))))
    });

    group.bench_function("E8 Lattice Compress (Low Entropy)", |b| {
        b.iter(|| black_box(e8.compress(black_box(&low_entropy_data))))
    });
    group.bench_function("E8 Lattice Compress (High Entropy)", |b| {
        b.iter(|| black_box(e8.compress(black_box(&high_entropy_data))))
    });

    // Decode paths, primed once outside the timed loop.
    let range_stream = range.compress(&low_entropy_data).unwrap().0;
    let lz77_stream = lz77.compress(&low_entropy_data).unwrap().0;

    group.bench_function("Range Decompress (Low Entropy)", |b| {
        b.iter(|| black_box(range.decompress(black_box(&range_stream))))
    });
    group.bench_function("LZ77 Decompress (Low Entropy)", |b| {
        b.iter(|| black_box(lz77.decompress(black_box(&lz77_stream))))
    });

    group.finish();
}

criterion_group!(benches, bench_codecs);
criterion_main!(benches);
