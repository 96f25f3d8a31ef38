use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ft_banded::{ConnectionPlan, Normalization, Transpose};

fn connection_benchmark(c: &mut Criterion) {
    const LOG_SIZES: [usize; 3] = [8, 10, 12];

    let mut g = c.benchmark_group("leg2cheb");
    g.sample_size(10);
    for log_n in LOG_SIZES {
        let n = 1 << log_n;
        g.bench_with_input(BenchmarkId::new("plan", n), &n, |b, &n| {
            b.iter(|| {
                ConnectionPlan::<f64>::legendre_to_chebyshev(
                    Normalization::Orthonormal,
                    Normalization::Standard,
                    n,
                )
            });
        });

        let plan = ConnectionPlan::<f64>::legendre_to_chebyshev(
            Normalization::Orthonormal,
            Normalization::Standard,
            n,
        )
        .unwrap();
        let x: Vec<f64> = (0..n).map(|i| 1.0 / (1.0 + i as f64)).collect();
        g.bench_with_input(BenchmarkId::new("mul", n), &x, |b, x| {
            b.iter_batched_ref(
                || x.clone(),
                |y| plan.mul(Transpose::NoTranspose, y),
                criterion::BatchSize::SmallInput,
            );
        });
        g.bench_with_input(BenchmarkId::new("solve", n), &x, |b, x| {
            b.iter_batched_ref(
                || x.clone(),
                |y| plan.solve(Transpose::NoTranspose, y),
                criterion::BatchSize::SmallInput,
            );
        });
    }
}

criterion_group!(benches, connection_benchmark);
criterion_main!(benches);
