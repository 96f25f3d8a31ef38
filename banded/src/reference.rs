//! Dense connection matrices for validating the fast plans.
//!
//! These are formed by back substitution on the full pencil and cost `O(n^2 b)`
//! operations and `O(n^2)` memory. They are not used by any fast path.

use ft_field::Real;
use ft_matrix::dense::ColMajorMatrix;
use ft_util::PlanResult;

use crate::eigen::EigenBlock;
use crate::{Basis, ConnectionPencil, Transpose};

/// The `n x n` matrix `C` with `φ^source_j = Σ_i C_ij φ^target_i`.
pub fn dense_connection<F: Real>(
    n: usize,
    source: &Basis,
    target: &Basis,
) -> PlanResult<ColMajorMatrix<F>> {
    let pencil = ConnectionPencil::<F>::new(n, source, target)?;
    let v = EigenBlock::new(&pencil, 0, n)?;
    let s_in = source.scales(n);
    let s_out = target.scales(n);
    let mut m = ColMajorMatrix::zeros(n, n);
    for j in 0..n {
        let col = m.col_mut(j);
        col[j] = F::one();
        v.mul(Transpose::NoTranspose, col);
        for (i, c) in col.iter_mut().enumerate() {
            *c = *c * F::cast(s_in[j] / s_out[i]);
        }
    }
    Ok(m)
}

/// `y = C x` or `y = C^T x` with a dense matrix.
pub fn dense_mul<F: Real>(m: &ColMajorMatrix<F>, t: Transpose, x: &[F]) -> Vec<F> {
    let n = m.height;
    match t {
        Transpose::NoTranspose => (0..n)
            .map(|i| (0..m.width()).map(|j| m.values[i + j * n] * x[j]).sum())
            .collect(),
        Transpose::Transpose => m
            .cols()
            .map(|col| col.iter().zip(x).map(|(&a, &b)| a * b).sum())
            .collect(),
    }
}

/// Evaluates `P^(a,b)_k(x)` for `k < n` by the three-term recurrence.
pub fn jacobi_values(n: usize, a: f64, b: f64, x: f64) -> Vec<f64> {
    let mut p = Vec::with_capacity(n);
    if n == 0 {
        return p;
    }
    p.push(1.0);
    if n == 1 {
        return p;
    }
    p.push(0.5 * (a - b + (a + b + 2.0) * x));
    for k in 1..n - 1 {
        let kf = k as f64;
        let c = 2.0 * kf + a + b;
        let a1 = 2.0 * (kf + 1.0) * (kf + a + b + 1.0) * c;
        let b1 = (c + 1.0) * (a * a - b * b);
        let c1 = c * (c + 1.0) * (c + 2.0);
        let d1 = 2.0 * (kf + a) * (kf + b) * (c + 2.0);
        let next = ((b1 + c1 * x) * p[k] - d1 * p[k - 1]) / a1;
        p.push(next);
    }
    p
}

/// Evaluates `L^(a)_k(x)` for `k < n`.
pub fn laguerre_values(n: usize, a: f64, x: f64) -> Vec<f64> {
    let mut p = Vec::with_capacity(n);
    if n == 0 {
        return p;
    }
    p.push(1.0);
    if n == 1 {
        return p;
    }
    p.push(1.0 + a - x);
    for k in 1..n - 1 {
        let kf = k as f64;
        let next = ((2.0 * kf + 1.0 + a - x) * p[k] - (kf + a) * p[k - 1]) / (kf + 1.0);
        p.push(next);
    }
    p
}

/// Values of every polynomial of `basis` up to degree `n - 1` at `x`.
pub fn basis_values(basis: &Basis, n: usize, x: f64) -> Vec<f64> {
    use crate::family::Kind;
    let raw = match basis.kind() {
        Kind::Jacobi(a, b) => jacobi_values(n, a, b, x),
        Kind::Laguerre(a) => laguerre_values(n, a, x),
    };
    raw.into_iter()
        .zip(basis.scales(n))
        .map(|(p, s)| p * s)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Family, Normalization};

    #[test]
    fn chebyshev_values_are_cosines() {
        let theta: f64 = 0.7;
        let t = basis_values(&Basis::standard(Family::Chebyshev), 6, theta.cos());
        for (k, tk) in t.iter().enumerate() {
            assert!((tk - (k as f64 * theta).cos()).abs() < 1e-14);
        }
    }

    #[test]
    fn dense_connection_reproduces_polynomials() {
        let cases = [
            (Family::Legendre, Family::Chebyshev),
            (Family::Chebyshev, Family::Legendre),
            (Family::Jacobi(0.3, 1.2), Family::Jacobi(-0.2, 0.7)),
            (Family::Ultraspherical(1.5), Family::Ultraspherical(1.0)),
            (Family::Laguerre(1.5), Family::Laguerre(0.0)),
        ];
        let n = 12;
        for (f1, f2) in cases {
            for (n1, n2) in [
                (Normalization::Standard, Normalization::Standard),
                (Normalization::Orthonormal, Normalization::Standard),
                (Normalization::Orthonormal, Normalization::Orthonormal),
            ] {
                let (src, tgt) = (Basis::new(f1, n1), Basis::new(f2, n2));
                let c = dense_connection::<f64>(n, &src, &tgt).unwrap();
                for x in [-0.8, 0.1, 0.6] {
                    let p = basis_values(&src, n, x);
                    let q = basis_values(&tgt, n, x);
                    for j in 0..n {
                        let recon: f64 = (0..n).map(|i| c.values[i + j * n] * q[i]).sum();
                        assert!(
                            (recon - p[j]).abs() < 1e-11 * p[j].abs().max(1.0),
                            "{src} -> {tgt}, j = {j}, x = {x}: {recon} vs {}",
                            p[j]
                        );
                    }
                }
            }
        }
    }
}
