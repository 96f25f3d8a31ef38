use ft_field::Real;
use ft_util::{PlanError, PlanResult, try_zeroed_vec};

use crate::ConnectionPencil;
use crate::fmm::Transpose;

/// A dense upper-triangular `m x m` block of eigenvectors, stored column-major.
#[derive(Clone, Debug)]
pub(crate) struct EigenBlock<F> {
    m: usize,
    v: Vec<F>,
}

impl<F: Real> EigenBlock<F> {
    /// Eigenvectors of the pencil restricted to `lo..hi`, by back substitution of
    /// `(A - λ_k B) v_k = 0` from the prescribed diagonal.
    pub(crate) fn new(pencil: &ConnectionPencil<F>, lo: usize, hi: usize) -> PlanResult<Self> {
        let m = hi - lo;
        let bw = pencil.bandwidth();
        let mut v = try_zeroed_vec(m * m)?;
        for k in 0..m {
            let lk = pencil.lambda[lo + k];
            let col = &mut v[k * m..(k + 1) * m];
            col[k] = pencil.diagonal[lo + k];
            for i in (0..k).rev() {
                let gi = lo + i;
                let mut s = F::zero();
                for t in i + 1..=(i + bw).min(k) {
                    let gt = lo + t;
                    s += (pencil.a.get(gi, gt) - lk * pencil.b.get(gi, gt)) * col[t];
                }
                // A_ii = λ_i B_ii, so the pivot is formed from the eigenvalue gap.
                let pivot = (pencil.lambda[gi] - lk) * pencil.b.get(gi, gi);
                if pivot == F::zero() || !pivot.is_finite() {
                    return Err(PlanError::singular(format!(
                        "zero pivot at ({gi}, {}) while forming eigenvectors",
                        lo + k
                    )));
                }
                col[i] = -s / pivot;
            }
        }
        Ok(Self { m, v })
    }

    #[inline]
    fn at(&self, i: usize, j: usize) -> F {
        self.v[i + j * self.m]
    }

    pub(crate) fn mul(&self, t: Transpose, x: &mut [F]) {
        let m = self.m;
        debug_assert_eq!(x.len(), m);
        match t {
            Transpose::NoTranspose => {
                for i in 0..m {
                    let mut acc = F::zero();
                    for j in i..m {
                        acc += self.at(i, j) * x[j];
                    }
                    x[i] = acc;
                }
            }
            Transpose::Transpose => {
                for j in (0..m).rev() {
                    let col = &self.v[j * m..j * m + j + 1];
                    x[j] = col.iter().zip(&x[..=j]).map(|(&a, &b)| a * b).sum();
                }
            }
        }
    }

    pub(crate) fn solve(&self, t: Transpose, x: &mut [F]) {
        let m = self.m;
        debug_assert_eq!(x.len(), m);
        match t {
            Transpose::NoTranspose => {
                for i in (0..m).rev() {
                    let mut acc = x[i];
                    for j in i + 1..m {
                        acc -= self.at(i, j) * x[j];
                    }
                    x[i] = acc / self.at(i, i);
                }
            }
            Transpose::Transpose => {
                for j in 0..m {
                    let col = &self.v[j * m..j * m + j];
                    let acc: F = col.iter().zip(&x[..j]).map(|(&a, &b)| a * b).sum();
                    x[j] = (x[j] - acc) / self.at(j, j);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Basis, Family};

    #[test]
    fn legendre_to_chebyshev_columns() {
        let p = ConnectionPencil::<f64>::new(
            4,
            &Basis::standard(Family::Legendre),
            &Basis::standard(Family::Jacobi(-0.5, -0.5)),
        )
        .unwrap();
        let e = EigenBlock::new(&p, 0, 4).unwrap();
        // Expressed in P^(-1/2,-1/2), P_2 = 3/4 T_2 + 1/4 T_0 with T_2 = 8/3 P_2^(-1/2,-1/2).
        assert!((e.at(2, 2) - 0.75 * (8.0 / 3.0)).abs() < 1e-14);
        assert!((e.at(0, 2) - 0.25).abs() < 1e-14);
        assert!(e.at(1, 2).abs() < 1e-14);
    }

    #[test]
    fn mul_and_solve_are_inverse() {
        let p = ConnectionPencil::<f64>::new(
            9,
            &Basis::standard(Family::Jacobi(0.3, 1.2)),
            &Basis::standard(Family::Jacobi(-0.2, 0.7)),
        )
        .unwrap();
        let e = EigenBlock::new(&p, 2, 9).unwrap();
        for t in [Transpose::NoTranspose, Transpose::Transpose] {
            let x: Vec<f64> = (0..7).map(|i| (i as f64 * 0.7).sin()).collect();
            let mut y = x.clone();
            e.mul(t, &mut y);
            e.solve(t, &mut y);
            for (a, b) in y.iter().zip(&x) {
                assert!((a - b).abs() < 1e-12);
            }
        }
    }
}
