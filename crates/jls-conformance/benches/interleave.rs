//! Planar transform and comparison benchmarks

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use jls_conformance::interleave::{sample_size, triplet_to_planar};
use jls_conformance::verify::{compare_bounded, compare_exact};

/// Square image sides to measure
const SIDES: [usize; 3] = [64, 512, 2048];

fn generate_triplets(side: usize, bits_per_sample: i32) -> Vec<u8> {
    let len = side * side * 3 * sample_size(bits_per_sample);
    (0..len).map(|i| ((i * 37) % 256) as u8).collect()
}

// ============================================================================
// Planar Transform
// ============================================================================

fn bench_triplet_to_planar(c: &mut Criterion) {
    let mut group = c.benchmark_group("triplet_to_planar");

    for bits in [8, 16] {
        for side in SIDES.iter() {
            let input = generate_triplets(*side, bits);
            group.throughput(Throughput::Bytes(input.len() as u64));

            group.bench_with_input(BenchmarkId::new(format!("{bits}bit"), side), side, |b, &side| {
                b.iter_batched(
                    || input.clone(),
                    |mut buffer| {
                        triplet_to_planar(&mut buffer, side, side, bits);
                        black_box(buffer)
                    },
                    criterion::BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

// ============================================================================
// Verification
// ============================================================================

fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare");

    for side in SIDES.iter() {
        let original = generate_triplets(*side, 8);
        let decoded = original.clone();
        group.throughput(Throughput::Bytes(original.len() as u64));

        group.bench_with_input(BenchmarkId::new("exact", side), side, |b, _| {
            b.iter(|| compare_exact(black_box(&original), black_box(&decoded)))
        });

        group.bench_with_input(BenchmarkId::new("bounded_8bit", side), side, |b, _| {
            b.iter(|| compare_bounded(black_box(&original), black_box(&decoded), 8, 2))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_triplet_to_planar, bench_compare);
criterion_main!(benches);
