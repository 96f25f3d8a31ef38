use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use ft_dft::{DctChebyshevGrid, GridTransform, NaiveChebyshevGrid};
use ft_matrix::dense::ColMajorMatrix;
use rand::SeedableRng;
use rand::rngs::SmallRng;

fn grid_benchmark(c: &mut Criterion) {
    let mut g = c.benchmark_group("naive_chebyshev_grid");
    g.sample_size(10);
    for n in [32, 64, 128] {
        let grid = NaiveChebyshevGrid::<f64>::new(n, n);
        let coeffs = ColMajorMatrix::<f64>::rand(&mut SmallRng::seed_from_u64(0), n, n);
        g.bench_with_input(BenchmarkId::new("synthesize", n), &coeffs, |b, coeffs| {
            b.iter(|| grid.synthesize(coeffs.clone()));
        });
        g.bench_with_input(BenchmarkId::new("analyze", n), &coeffs, |b, coeffs| {
            b.iter(|| grid.analyze(coeffs.clone()));
        });
    }
}

fn dct_benchmark(c: &mut Criterion) {
    let mut g = c.benchmark_group("dct_chebyshev_grid");
    g.sample_size(10);
    for n in [128, 512, 2048] {
        let grid = DctChebyshevGrid::<f64>::new(n, n);
        let coeffs = ColMajorMatrix::<f64>::rand(&mut SmallRng::seed_from_u64(0), n, n);
        g.bench_with_input(BenchmarkId::new("synthesize", n), &coeffs, |b, coeffs| {
            b.iter(|| grid.synthesize(coeffs.clone()));
        });
        g.bench_with_input(BenchmarkId::new("analyze", n), &coeffs, |b, coeffs| {
            b.iter(|| grid.analyze(coeffs.clone()));
        });
    }
}

criterion_group!(benches, grid_benchmark, dct_benchmark);
criterion_main!(benches);
