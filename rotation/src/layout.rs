use ft_field::Real;
use ft_matrix::dense::ColMajorMatrix;
use ft_matrix::tensor::Tensor3;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Occupancy of an `n x width` harmonic coefficient array, one column per order-slice.
///
/// * `Sphere`: column 0 is order 0, columns `2m - 1` and `2m` are the `sin` and `cos`
///   parts of order `m`; order `m` holds degrees `m..n`.
/// * `SpinSphere`: column 0 is order 0, column `2k - 1` is order `-k` and column `2k`
///   order `k`; order `m` holds degrees `max(|m|, |s|)..n`.
/// * `VectorSphere`: one tangential component of a vector field, columns as in
///   `Sphere`. Order `m > 0` holds the profiles `Y_l^m(θ) / sin θ` for degrees `m..n`;
///   order 0 holds `Y_l^1(θ)` for degrees `1..n`. Lowering takes odd orders to 1 and
///   even orders to 2, so every column ends up a pure `cos` or `sin` series in `θ`.
/// * `Triangle`: column `m` holds `n - m` entries.
/// * `Disk`: column 0 is order 0, columns `2k - 1` and `2k` are order `k`; order `k`
///   holds `n - ceil(k / 2)` radial degrees.
///
/// Valid entries always start at row 0.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    Sphere,
    SpinSphere { spin: i64 },
    VectorSphere,
    Triangle,
    Disk,
}

impl Layout {
    /// Number of columns for size `n`.
    #[must_use]
    pub const fn width(self, n: usize) -> usize {
        match self {
            Self::Sphere | Self::SpinSphere { .. } | Self::VectorSphere => {
                (2 * n).saturating_sub(1)
            }
            Self::Triangle => n,
            Self::Disk => (4 * n).saturating_sub(3),
        }
    }

    /// The order carried by column `col`.
    #[must_use]
    pub const fn column_order(self, col: usize) -> i64 {
        let col = col as i64;
        match self {
            Self::Sphere | Self::VectorSphere | Self::Disk => (col + 1) / 2,
            Self::SpinSphere { .. } => {
                if col % 2 == 1 {
                    -(col + 1) / 2
                } else {
                    col / 2
                }
            }
            Self::Triangle => col,
        }
    }

    /// Valid rows of column `col` in the harmonic representation.
    #[must_use]
    pub const fn column_len(self, n: usize, col: usize) -> usize {
        let m = self.column_order(col).unsigned_abs() as usize;
        match self {
            Self::Sphere | Self::Triangle => n.saturating_sub(m),
            Self::SpinSphere { spin } => {
                let s = spin.unsigned_abs() as usize;
                n.saturating_sub(if m > s { m } else { s })
            }
            Self::VectorSphere => n.saturating_sub(if m > 1 { m } else { 1 }),
            Self::Disk => n.saturating_sub(m.div_ceil(2)),
        }
    }

    /// Valid rows of column `col` once its order has been lowered as far as it goes.
    #[must_use]
    pub const fn low_column_len(self, n: usize, col: usize) -> usize {
        let m = self.column_order(col);
        match self {
            Self::Sphere | Self::Disk => n.saturating_sub((m % 2) as usize),
            Self::SpinSphere { spin } => n.saturating_sub((m + spin).rem_euclid(2) as usize),
            Self::VectorSphere => n.saturating_sub(if m % 2 == 1 || m == 0 { 1 } else { 2 }),
            Self::Triangle => n,
        }
    }

    #[must_use]
    pub const fn contains(self, n: usize, row: usize, col: usize) -> bool {
        col < self.width(n) && row < self.column_len(n, col)
    }

    /// Ones on every valid entry, zeros elsewhere.
    pub fn ones<F: Real>(self, n: usize) -> ColMajorMatrix<F> {
        self.fill(n, |_, _| F::one())
    }

    /// Uniform values in `[-1, 1)` on every valid entry, zeros elsewhere.
    pub fn random<F: Real, R: Rng>(self, n: usize, rng: &mut R) -> ColMajorMatrix<F> {
        self.fill(n, |_, _| F::cast(2.0 * rng.random::<f64>() - 1.0))
    }

    /// Evaluates `f(row, col)` on every valid entry, column by column.
    pub fn fill<F: Real, G: FnMut(usize, usize) -> F>(self, n: usize, mut f: G) -> ColMajorMatrix<F> {
        let mut m = ColMajorMatrix::zeros(n, self.width(n));
        for col in 0..self.width(n) {
            for row in 0..self.column_len(n, col) {
                m.set(row, col, f(row, col));
            }
        }
        m
    }
}

/// Evaluates `f(i, j, k)` on every valid entry `i + j + k < n` of an `n x n x n`
/// tetrahedral coefficient array.
pub fn tetrahedron_fill<F: Real, G: FnMut(usize, usize, usize) -> F>(
    n: usize,
    mut f: G,
) -> Tensor3<F> {
    let mut t = Tensor3::zeros([n, n, n]);
    for k in 0..n {
        for j in 0..n - k {
            for i in 0..n - k - j {
                *t.get_mut(i, j, k) = f(i, j, k);
            }
        }
    }
    t
}

pub fn tetrahedron_ones<F: Real>(n: usize) -> Tensor3<F> {
    tetrahedron_fill(n, |_, _, _| F::one())
}

pub fn tetrahedron_random<F: Real, R: Rng>(n: usize, rng: &mut R) -> Tensor3<F> {
    tetrahedron_fill(n, |_, _, _| F::cast(2.0 * rng.random::<f64>() - 1.0))
}
