use ft_field::Real;
use ft_util::{PlanResult, try_zeroed_vec};

use crate::Matrix;

/// An `n x n` upper-triangular matrix with `b` superdiagonals.
///
/// Column `j` stores the entries of rows `j - b ..= j` contiguously, so entry `(i, j)`
/// lives at `(i + b - j) + (b + 1) * j`. Positions above row 0 are never read.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangularBanded<T> {
    n: usize,
    b: usize,
    data: Vec<T>,
}

impl<T: Real> TriangularBanded<T> {
    pub fn try_new(n: usize, b: usize) -> PlanResult<Self> {
        Ok(Self {
            n,
            b,
            data: try_zeroed_vec((b + 1) * n)?,
        })
    }

    #[inline]
    pub const fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub const fn bandwidth(&self) -> usize {
        self.b
    }

    #[inline]
    fn in_band(&self, i: usize, j: usize) -> bool {
        i <= j && j - i <= self.b && j < self.n
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        (i + self.b - j) + (self.b + 1) * j
    }

    /// Entry `(i, j)`, zero outside the band.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> T {
        if self.in_band(i, j) {
            self.data[self.index(i, j)]
        } else {
            T::zero()
        }
    }

    /// # Panics
    /// Panics if `(i, j)` lies outside the band.
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: T) {
        assert!(self.in_band(i, j), "({i}, {j}) outside bandwidth {}", self.b);
        let idx = self.index(i, j);
        self.data[idx] = value;
    }

    #[inline]
    pub fn add(&mut self, i: usize, j: usize, value: T) {
        assert!(self.in_band(i, j), "({i}, {j}) outside bandwidth {}", self.b);
        let idx = self.index(i, j);
        self.data[idx] += value;
    }

    /// `x <- A^{-1} x` on the block of rows and columns `offset .. offset + x.len()`.
    pub fn tbsv_block(&self, offset: usize, x: &mut [T]) {
        let n = x.len();
        debug_assert!(offset + n <= self.n);
        for i in (0..n).rev() {
            let hi = (i + self.b).min(n - 1);
            let mut acc = x[i];
            for j in i + 1..=hi {
                acc -= self.data[self.index(offset + i, offset + j)] * x[j];
            }
            x[i] = acc / self.data[self.index(offset + i, offset + i)];
        }
    }
}

impl<T: Real> Matrix<T> for TriangularBanded<T> {
    fn width(&self) -> usize {
        self.n
    }

    fn height(&self) -> usize {
        self.n
    }

    fn get(&self, r: usize, c: usize) -> T {
        TriangularBanded::get(self, r, c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::ColMajorMatrix;

    fn to_dense(a: &TriangularBanded<f64>) -> ColMajorMatrix<f64> {
        let mut m = ColMajorMatrix::zeros(a.n(), a.n());
        for j in 0..a.n() {
            for i in j.saturating_sub(a.bandwidth())..=j {
                m.set(i, j, a.get(i, j));
            }
        }
        m
    }

    fn sample() -> TriangularBanded<f64> {
        let mut a = TriangularBanded::try_new(5, 2).unwrap();
        for j in 0usize..5 {
            for i in j.saturating_sub(2)..=j {
                a.set(i, j, 1.0 + i as f64 + 10.0 * j as f64);
            }
        }
        a
    }

    #[test]
    fn band_layout() {
        let a = sample();
        assert_eq!(a.get(0, 0), 1.0);
        assert_eq!(a.get(1, 3), 32.0);
        assert_eq!(a.get(0, 3), 0.0);
        assert_eq!(a.get(3, 1), 0.0);
        assert_eq!(Matrix::get(&to_dense(&a), 2, 4), 43.0);
    }

    #[test]
    fn solve_inverts_dense_product() {
        let a = sample();
        let d = to_dense(&a);
        let x = [0.5, -1.0, 2.0, 0.25, 3.0];
        let mut y: Vec<f64> = (0..5)
            .map(|i| (0..5).map(|j| Matrix::get(&d, i, j) * x[j]).sum())
            .collect();
        a.tbsv_block(0, &mut y);
        for (u, v) in y.iter().zip(x) {
            assert!((u - v).abs() < 1e-12);
        }
    }

    #[test]
    fn block_solve_uses_the_trailing_block() {
        let a = sample();
        // Rows and columns 2..5 only.
        let x = [1.0, -2.0, 0.5];
        let mut y: Vec<f64> = (0..3)
            .map(|i| (0..3).map(|j| a.get(2 + i, 2 + j) * x[j]).sum())
            .collect();
        a.tbsv_block(2, &mut y);
        for (u, v) in y.iter().zip(x) {
            assert!((u - v).abs() < 1e-12);
        }
    }

    #[test]
    #[should_panic]
    fn set_outside_band_panics() {
        let mut a = TriangularBanded::<f64>::try_new(4, 1).unwrap();
        a.set(0, 2, 1.0);
    }
}
