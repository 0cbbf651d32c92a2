//! Benchmarks for the packed kernels.
//!
//! This benchmark compares:
//! - Packed matrix-vector product vs the dense product over unpacked values
//! - Portable vs runtime-selected microkernel
//! - Tall vs wide loop order of the packed multiply-transpose

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use pir_gemm::core::{matvec_packed_accumulate_inner, PackedMicrokernel, COL_BLOCK};
use pir_gemm::{matmul_transposed_packed, matvec, matvec_packed, pack_word, Elem, Kernel};

fn random_packed(rng: &mut ChaCha20Rng, len: usize) -> Vec<Elem> {
    (0..len)
        .map(|_| pack_word([rng.gen_range(0..1024), rng.gen_range(0..1024), rng.gen_range(0..1024)]))
        .collect()
}

fn random_full(rng: &mut ChaCha20Rng, len: usize) -> Vec<Elem> {
    (0..len).map(|_| rng.gen()).collect()
}

/// Database-times-query, packed vs dense over the same logical entries
fn bench_matvec(c: &mut Criterion) {
    let mut group = c.benchmark_group("Matvec");
    group.sample_size(20);
    let mut rng = ChaCha20Rng::seed_from_u64(0);

    for &rows in [1024usize, 4096, 16384].iter() {
        let words = 512;
        let logical = (rows * words * 3) as u64;

        let packed = random_packed(&mut rng, rows * words);
        let query = random_full(&mut rng, 3 * words);
        let unpacked: Vec<Elem> = (0..rows * words * 3).map(|i| (i % 1024) as Elem).collect();

        group.throughput(Throughput::Elements(logical));

        group.bench_with_input(BenchmarkId::new("packed", rows), &rows, |bench, &rows| {
            bench.iter(|| black_box(matvec_packed(&packed, &query, rows, words).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("dense", rows), &rows, |bench, &rows| {
            bench.iter(|| black_box(matvec(&unpacked, &query, rows, 3 * words).unwrap()));
        });
    }

    group.finish();
}

/// Same packed product through each microkernel
fn bench_microkernel(c: &mut Criterion) {
    let mut group = c.benchmark_group("Microkernel");
    group.sample_size(20);
    let mut rng = ChaCha20Rng::seed_from_u64(1);

    let (rows, words) = (8192, 256);
    let packed = random_packed(&mut rng, rows * words);
    let query = random_full(&mut rng, 3 * words);
    group.throughput(Throughput::Elements((rows * words * 3) as u64));

    for (label, kernel) in [("portable", Kernel::portable()), ("selected", Kernel::select())] {
        group.bench_function(BenchmarkId::new(label, kernel.name()), |bench| {
            let mut out = vec![0; rows];
            bench.iter(|| {
                matvec_packed_accumulate_inner(&kernel, &mut out, &packed, &query, rows, words);
                black_box(&out);
            });
        });
    }

    group.finish();
}

/// Packed multiply-transpose with A shapes on either side of the strategy
/// switch
fn bench_transposed(c: &mut Criterion) {
    let mut group = c.benchmark_group("TransposedPacked");
    group.sample_size(20);
    let mut rng = ChaCha20Rng::seed_from_u64(2);

    let b_rows = 4 * COL_BLOCK;
    for &(a_rows, a_cols, label) in [(2048usize, 64usize, "tall"), (64, 2048, "wide")].iter() {
        let a = random_packed(&mut rng, a_rows * a_cols);
        let b = random_full(&mut rng, b_rows * 3 * a_cols);

        group.throughput(Throughput::Elements((a_rows * a_cols * 3 * b_rows) as u64));

        group.bench_with_input(
            BenchmarkId::new(label, format!("{}x{}", a_rows, a_cols)),
            &(a_rows, a_cols),
            |bench, &(a_rows, a_cols)| {
                bench.iter(|| {
                    black_box(
                        matmul_transposed_packed(&a, &b, a_rows, a_cols, b_rows, 3 * a_cols)
                            .unwrap(),
                    )
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_matvec, bench_microkernel, bench_transposed);
criterion_main!(benches);
