use core::f64::consts::PI;

use ft_field::Real;
use ft_matrix::dense::ColMajorMatrix;
use ft_maybe_rayon::prelude::*;
use tracing::instrument;

use crate::GridTransform;

/// Tensor-product Chebyshev synthesis and analysis by direct summation.
///
/// Entry `(i, j)` of a coefficient array is the coefficient of `T_i(x) T_j(y)`; sample
/// `(r, s)` is the value at `(x_r, y_s)` with `x_r = cos(π (r + 1/2) / height)` the
/// Chebyshev points of the first kind. Costs `O(n^2)` per axis.
#[derive(Clone, Debug)]
pub struct NaiveChebyshevGrid<F> {
    height: usize,
    width: usize,
    /// `T_k(x_r)` at `r + k * height`.
    rows: Vec<F>,
    cols: Vec<F>,
}

impl<F: Real> NaiveChebyshevGrid<F> {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            rows: chebyshev_table(height),
            cols: chebyshev_table(width),
        }
    }

    /// The grid points `x_r` along one axis of length `n`.
    pub fn points(n: usize) -> Vec<F> {
        (0..n)
            .map(|r| F::cast((PI * (r as f64 + 0.5) / n as f64).cos()))
            .collect()
    }
}

fn chebyshev_table<F: Real>(n: usize) -> Vec<F> {
    let mut table = Vec::with_capacity(n * n);
    for k in 0..n {
        for r in 0..n {
            let theta = PI * (r as f64 + 0.5) / n as f64;
            table.push(F::cast((k as f64 * theta).cos()));
        }
    }
    table
}

/// Column-wise synthesis `y_r = Σ_k T_k(x_r) c_k`.
fn synthesize_columns<F: Real>(table: &[F], mat: &mut ColMajorMatrix<F>) {
    let n = mat.height;
    if n == 0 {
        return;
    }
    mat.par_cols_mut().for_each(|col| {
        let c = col.to_vec();
        for (r, y) in col.iter_mut().enumerate() {
            *y = c
                .iter()
                .enumerate()
                .map(|(k, &ck)| table[r + k * n] * ck)
                .sum();
        }
    });
}

/// Column-wise analysis `c_k = (2 - δ_k0) / n Σ_r T_k(x_r) y_r`.
fn analyze_columns<F: Real>(table: &[F], mat: &mut ColMajorMatrix<F>) {
    let n = mat.height;
    if n == 0 {
        return;
    }
    let scale = F::cast(2.0 / n as f64);
    mat.par_cols_mut().for_each(|col| {
        let y = col.to_vec();
        for (k, c) in col.iter_mut().enumerate() {
            let sum: F = y
                .iter()
                .enumerate()
                .map(|(r, &yr)| table[r + k * n] * yr)
                .sum();
            *c = if k == 0 { sum * scale / F::cast(2.0) } else { sum * scale };
        }
    });
}

impl<F: Real> GridTransform<F> for NaiveChebyshevGrid<F> {
    fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[instrument(skip_all, fields(height = self.height, width = self.width))]
    fn synthesize(&self, mut coeffs: ColMajorMatrix<F>) -> ColMajorMatrix<F> {
        assert_eq!((coeffs.height, coeffs.width()), self.shape());
        synthesize_columns(&self.rows, &mut coeffs);
        if self.width <= 1 {
            return coeffs;
        }
        let mut t = coeffs.transpose();
        synthesize_columns(&self.cols, &mut t);
        t.transpose()
    }

    #[instrument(skip_all, fields(height = self.height, width = self.width))]
    fn analyze(&self, mut samples: ColMajorMatrix<F>) -> ColMajorMatrix<F> {
        assert_eq!((samples.height, samples.width()), self.shape());
        analyze_columns(&self.rows, &mut samples);
        if self.width <= 1 {
            return samples;
        }
        let mut t = samples.transpose();
        analyze_columns(&self.cols, &mut t);
        t.transpose()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn evaluates_products_of_chebyshev_polynomials() {
        let (h, w) = (5, 4);
        let grid = NaiveChebyshevGrid::<f64>::new(h, w);
        let mut c = ColMajorMatrix::zeros(h, w);
        // T_1(x) T_2(y) = x (2 y^2 - 1).
        c.set(1, 2, 1.0);
        let samples = grid.synthesize(c);
        let (xs, ys) = (
            NaiveChebyshevGrid::<f64>::points(h),
            NaiveChebyshevGrid::<f64>::points(w),
        );
        for (s, y) in ys.iter().enumerate() {
            for (r, x) in xs.iter().enumerate() {
                let expected = x * (2.0 * y * y - 1.0);
                assert!((samples.values[r + s * h] - expected).abs() < 1e-14);
            }
        }
    }

    #[test]
    fn analysis_inverts_synthesis() {
        let mut rng = SmallRng::seed_from_u64(1);
        for (h, w) in [(1, 1), (7, 1), (6, 9), (16, 16)] {
            let grid = NaiveChebyshevGrid::<f64>::new(h, w);
            let c = ColMajorMatrix::<f64>::rand(&mut rng, h, w);
            let back = grid.analyze(grid.synthesize(c.clone()));
            for (a, b) in back.values.iter().zip(&c.values) {
                assert!((a - b).abs() < 1e-13);
            }
        }
    }

    #[test]
    fn single_column_helpers() {
        let grid = NaiveChebyshevGrid::<f32>::new(3, 1);
        // T_0 + T_2 = 2 x^2.
        let y = grid.synthesize_vec(vec![1.0, 0.0, 1.0]);
        for (v, x) in y.iter().zip(NaiveChebyshevGrid::<f32>::points(3)) {
            assert!((v - 2.0 * x * x).abs() < 1e-6);
        }
        let c = grid.analyze_vec(y);
        assert!((c[0] - 1.0).abs() < 1e-6 && c[1].abs() < 1e-6 && (c[2] - 1.0).abs() < 1e-6);
    }
}
