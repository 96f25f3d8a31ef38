use ft_field::{ExecutionConfig, SimdWidth};
use ft_matrix::dense::ColMajorMatrix;
use ft_matrix::norms::{max_abs_diff, norm2, relative_error};
use ft_matrix::tensor::Tensor3;
use ft_rotation::{
    CascadeDirection, Layout, RotationPlan, SpinRotationPlan, execute_disk, execute_sph,
    execute_sphv, execute_spinsph, execute_tet, execute_tri, tetrahedron_random,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand::rngs::SmallRng;

use CascadeDirection::{Hi2Lo, Lo2Hi};

/// A planar domain together with a runner for its cascade.
enum Planar {
    Sphere(RotationPlan<f64>),
    Vector(RotationPlan<f64>),
    Triangle(RotationPlan<f64>),
    Disk(RotationPlan<f64>),
    Spin(SpinRotationPlan<f64>),
}

impl Planar {
    fn all(n: usize) -> Vec<Self> {
        let mut all = vec![
            Self::Sphere(RotationPlan::sphere(n).unwrap()),
            Self::Vector(RotationPlan::sphere(n).unwrap()),
            Self::Triangle(RotationPlan::triangle(n, 0.5, -0.25, 1.0).unwrap()),
            Self::Disk(RotationPlan::disk(n).unwrap()),
        ];
        if n > 2 {
            all.push(Self::Spin(SpinRotationPlan::new(n, 2).unwrap()));
            all.push(Self::Spin(SpinRotationPlan::new(n, -1).unwrap()));
        }
        all
    }

    fn layout(&self) -> Layout {
        match self {
            Self::Sphere(_) => Layout::Sphere,
            Self::Vector(_) => Layout::VectorSphere,
            Self::Triangle(_) => Layout::Triangle,
            Self::Disk(_) => Layout::Disk,
            Self::Spin(p) => Layout::SpinSphere { spin: p.spin() },
        }
    }

    fn run(&self, data: &mut ColMajorMatrix<f64>, dir: CascadeDirection, cfg: &ExecutionConfig) {
        match self {
            Self::Sphere(p) => execute_sph(p, data, dir, cfg),
            Self::Vector(p) => execute_sphv(p, data, dir, cfg),
            Self::Triangle(p) => execute_tri(p, data, dir, cfg),
            Self::Disk(p) => execute_disk(p, data, dir, cfg),
            Self::Spin(p) => execute_spinsph(p, data, dir, cfg),
        }
    }
}

fn configs() -> Vec<ExecutionConfig> {
    let mut configs: Vec<ExecutionConfig> = SimdWidth::ALL
        .into_iter()
        .map(|w| ExecutionConfig::scalar().with_max_width(w))
        .collect();
    configs.push(ExecutionConfig::default());
    configs.push(ExecutionConfig::default().with_threads(3));
    configs
}

/// Writes every `lo2hi` input in the low-order occupancy.
fn low_random(layout: Layout, n: usize, rng: &mut SmallRng) -> ColMajorMatrix<f64> {
    let mut m = layout.random::<f64, _>(n, rng);
    for col in 0..layout.width(n) {
        for row in layout.column_len(n, col)..layout.low_column_len(n, col) {
            m.set(row, col, rng.random::<f64>() - 0.5);
        }
    }
    m
}

#[test]
fn batching_is_bit_identical() {
    let mut rng = SmallRng::seed_from_u64(1);
    for n in 1..=64 {
        for domain in Planar::all(n) {
            let layout = domain.layout();
            for dir in [Hi2Lo, Lo2Hi] {
                let input = match dir {
                    Hi2Lo => layout.random::<f64, _>(n, &mut rng),
                    Lo2Hi => low_random(layout, n, &mut rng),
                };
                let mut reference = input.clone();
                domain.run(&mut reference, dir, &ExecutionConfig::scalar());
                for cfg in configs() {
                    let mut out = input.clone();
                    domain.run(&mut out, dir, &cfg);
                    assert_eq!(out, reference, "n = {n}, {layout:?}, {dir:?}, {cfg:?}");
                }
            }
        }
    }
}

#[test]
fn round_trip_is_identity() {
    let mut rng = SmallRng::seed_from_u64(2);
    for n in [0, 1, 2, 3, 10, 33, 100, 256] {
        for domain in Planar::all(n) {
            let layout = domain.layout();
            let x = layout.random::<f64, _>(n, &mut rng);
            let mut y = x.clone();
            domain.run(&mut y, Hi2Lo, &ExecutionConfig::default());
            domain.run(&mut y, Lo2Hi, &ExecutionConfig::default());
            let err = relative_error(&y.values, &x.values);
            assert!(err < 1e-13, "n = {n}, {layout:?}: {err:e}");
        }
    }
}

#[test]
fn sphere_round_trip_at_512() {
    let n = 512;
    let plan = RotationPlan::<f64>::sphere(n).unwrap();
    let x = Layout::Sphere.random::<f64, _>(n, &mut SmallRng::seed_from_u64(3));
    let mut y = x.clone();
    execute_sph(&plan, &mut y, Hi2Lo, &ExecutionConfig::default());
    execute_sph(&plan, &mut y, Lo2Hi, &ExecutionConfig::default());
    assert!(relative_error(&y.values, &x.values) < 1e-13);
}

#[test]
fn cascades_are_orthogonal() {
    let mut rng = SmallRng::seed_from_u64(4);
    let n = 40;
    for domain in Planar::all(n) {
        let x = domain.layout().random::<f64, _>(n, &mut rng);
        let mut y = x.clone();
        domain.run(&mut y, Hi2Lo, &ExecutionConfig::default());
        assert!((norm2(&y.values) - norm2(&x.values)).abs() < 1e-12 * norm2(&x.values));
    }
}

#[test]
fn degenerate_sizes_are_identity() {
    for n in [0, 1] {
        for domain in Planar::all(n) {
            let layout = domain.layout();
            let x = layout.ones::<f64>(n);
            for dir in [Hi2Lo, Lo2Hi] {
                let mut y = x.clone();
                domain.run(&mut y, dir, &ExecutionConfig::default());
                assert_eq!(y, x);
            }
        }
    }
}

#[test]
fn lowering_sphere_order_two() {
    // sin²θ-type harmonic P̃_2^2 = sqrt(5/6) P̃_0 - sqrt(1/6) P̃_2.
    let n = 3;
    let plan = RotationPlan::<f64>::sphere(n).unwrap();
    let mut data = ColMajorMatrix::zeros(n, Layout::Sphere.width(n));
    data.set(0, 4, 1.0);
    execute_sph(&plan, &mut data, Hi2Lo, &ExecutionConfig::default());
    let col = data.col(4);
    assert!((col[0] - (5.0f64 / 6.0).sqrt()).abs() < 1e-15);
    assert_eq!(col[1], 0.0);
    assert!((col[2] + (1.0f64 / 6.0).sqrt()).abs() < 1e-15);
}

#[test]
fn vector_cascade_shares_odd_orders_with_the_sphere() {
    let n = 24;
    let plan = RotationPlan::<f64>::sphere(n).unwrap();
    let mut rng = SmallRng::seed_from_u64(8);
    let mut x = Layout::Sphere.random::<f64, _>(n, &mut rng);
    // Keep orders 3 and 5 only.
    for col in 0..x.width() {
        if !matches!(Layout::Sphere.column_order(col), 3 | 5) {
            x.col_mut(col).fill(0.0);
        }
    }
    let (mut a, mut b) = (x.clone(), x);
    execute_sph(&plan, &mut a, Hi2Lo, &ExecutionConfig::default());
    execute_sphv(&plan, &mut b, Hi2Lo, &ExecutionConfig::default());
    assert_eq!(a, b);
}

#[test]
fn vector_even_orders_stop_at_two() {
    // Order 4 lowered to order 2 carries degrees 2..n in rows 0..n - 2.
    let n = 9;
    let plan = RotationPlan::<f64>::sphere(n).unwrap();
    let mut rng = SmallRng::seed_from_u64(9);
    let mut x = ColMajorMatrix::zeros(n, Layout::VectorSphere.width(n));
    for row in 0..n - 4 {
        x.set(row, 8, rng.random::<f64>() - 0.5);
    }
    let mut y = x.clone();
    execute_sphv(&plan, &mut y, Hi2Lo, &ExecutionConfig::default());
    assert!(y.col(8)[n - 2..].iter().all(|&v| v == 0.0));
    assert!((norm2(y.col(8)) - norm2(x.col(8))).abs() < 1e-14);
    execute_sphv(&plan, &mut y, Lo2Hi, &ExecutionConfig::default());
    assert!(max_abs_diff(&y.values, &x.values) < 1e-14);
}

#[test]
fn spin_zero_is_the_sphere() {
    let mut rng = SmallRng::seed_from_u64(5);
    for n in [2, 7, 30] {
        let sph = RotationPlan::<f64>::sphere(n).unwrap();
        let spin = SpinRotationPlan::<f64>::new(n, 0).unwrap();
        let x = Layout::Sphere.random::<f64, _>(n, &mut rng);
        for dir in [Hi2Lo, Lo2Hi] {
            let (mut a, mut b) = (x.clone(), x.clone());
            execute_sph(&sph, &mut a, dir, &ExecutionConfig::default());
            execute_spinsph(&spin, &mut b, dir, &ExecutionConfig::scalar());
            assert_eq!(a, b);
        }
    }
}

/// Swaps the columns of orders `k` and `-k`.
fn reflect_orders(x: &ColMajorMatrix<f64>) -> ColMajorMatrix<f64> {
    let mut y = x.clone();
    for c in (1..x.width()).step_by(2) {
        y.col_mut(c).copy_from_slice(x.col(c + 1));
        y.col_mut(c + 1).copy_from_slice(x.col(c));
    }
    y
}

#[test]
fn spin_sign_reflects_orders() {
    // (m, s) and (-m, -s) share the Jacobi parameters (|m + s|, |m - s|).
    let n = 12;
    let plus = SpinRotationPlan::<f64>::new(n, 3).unwrap();
    let minus = SpinRotationPlan::<f64>::new(n, -3).unwrap();
    let mut rng = SmallRng::seed_from_u64(6);
    let x = Layout::SpinSphere { spin: 3 }.random::<f64, _>(n, &mut rng);
    for dir in [Hi2Lo, Lo2Hi] {
        let mut y = x.clone();
        execute_spinsph(&plus, &mut y, dir, &ExecutionConfig::default());
        let mut z = reflect_orders(&x);
        execute_spinsph(&minus, &mut z, dir, &ExecutionConfig::default());
        assert_eq!(reflect_orders(&z), y);
    }
}

fn tet_plans(n: usize) -> (RotationPlan<f64>, RotationPlan<f64>) {
    let (alpha, beta, gamma, delta) = (0.0, 0.5, -0.5, 1.0);
    (
        RotationPlan::triangle(n, alpha, beta, gamma + delta + 1.0).unwrap(),
        RotationPlan::triangle(n, beta, gamma, delta).unwrap(),
    )
}

#[test]
fn tetrahedron_batching_and_round_trip() {
    let mut rng = SmallRng::seed_from_u64(7);
    for n in [0, 1, 2, 5, 12, 21] {
        let (rp1, rp2) = tet_plans(n);
        let x: Tensor3<f64> = tetrahedron_random(n, &mut rng);
        let mut reference = x.clone();
        execute_tet(&rp1, &rp2, &mut reference, Hi2Lo, &ExecutionConfig::scalar());
        for cfg in configs() {
            let mut y = x.clone();
            execute_tet(&rp1, &rp2, &mut y, Hi2Lo, &cfg);
            assert_eq!(y, reference, "n = {n}, {cfg:?}");
            execute_tet(&rp1, &rp2, &mut y, Lo2Hi, &cfg);
            assert!(max_abs_diff(&y.values, &x.values) < 1e-13, "n = {n}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn cascade_is_linear(n in 1usize..40, a in -3.0f64..3.0, b in -3.0f64..3.0, seed in any::<u64>()) {
        let mut rng = SmallRng::seed_from_u64(seed);
        for domain in Planar::all(n) {
            let layout = domain.layout();
            let x = layout.random::<f64, _>(n, &mut rng);
            let y = layout.random::<f64, _>(n, &mut rng);
            let mut combo = ColMajorMatrix::new(
                x.values.iter().zip(&y.values).map(|(u, v)| a * u + b * v).collect(),
                n,
            );
            let (mut px, mut py) = (x.clone(), y.clone());
            let cfg = ExecutionConfig::default();
            domain.run(&mut combo, Hi2Lo, &cfg);
            domain.run(&mut px, Hi2Lo, &cfg);
            domain.run(&mut py, Hi2Lo, &cfg);
            let expected: Vec<f64> = px.values.iter().zip(&py.values).map(|(u, v)| a * u + b * v).collect();
            let scale = (a.abs() + b.abs()) * (norm2(&x.values) + norm2(&y.values)) + 1e-300;
            prop_assert!(max_abs_diff(&combo.values, &expected) <= 1e-13 * scale);
        }
    }
}
