use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use ft_matrix::dense::ColMajorMatrix;
use ft_matrix::tensor::{Axis, Tensor3};
use rand::SeedableRng;
use rand::rngs::SmallRng;

/// The row pass of the triangle transform runs on the transpose of an `n x n` array.
fn triangle_transpose(c: &mut Criterion) {
    let mut g = c.benchmark_group("triangle_transpose");
    let mut rng = SmallRng::seed_from_u64(0);
    for n in [256, 1024, 2048] {
        let m = ColMajorMatrix::<f64>::rand(&mut rng, n, n);
        g.throughput(Throughput::Bytes((n * n * size_of::<f64>()) as u64));
        g.bench_with_input(BenchmarkId::from_parameter(n), &m, |b, m| b.iter(|| m.transpose()));
    }
}

/// Gathering and scattering the strided lines of a tetrahedral array.
fn tensor_lines(c: &mut Criterion) {
    let mut g = c.benchmark_group("tensor_lines");
    g.sample_size(10);
    let mut rng = SmallRng::seed_from_u64(1);
    for n in [32, 64] {
        let t = Tensor3::<f64>::rand(&mut rng, [n; 3]);
        for axis in [Axis::I, Axis::K] {
            g.bench_with_input(BenchmarkId::new(format!("{axis:?}"), n), &t, |b, t| {
                b.iter_batched_ref(
                    || t.clone(),
                    |t| t.par_for_each_line_mut(axis, |line| line.reverse()),
                    criterion::BatchSize::LargeInput,
                );
            });
        }
    }
}

criterion_group!(benches, triangle_transpose, tensor_lines);
criterion_main!(benches);
