use ft_field::Real;
use ft_matrix::banded::TriangularBanded;
use ft_util::{PlanError, PlanResult, try_collect_vec};
use tracing::instrument;

use crate::Basis;
use crate::family::Kind;

/// The upper-triangular banded pencil whose eigenvectors are connection coefficients.
///
/// Column `j` of the connection matrix `V` expresses the `j`-th source polynomial in the
/// target basis; it satisfies `A v_j = λ_j B v_j` with `v_j` normalised so that its
/// diagonal entry is `diagonal[j]`.
#[derive(Clone, Debug)]
pub struct ConnectionPencil<F> {
    pub a: TriangularBanded<F>,
    pub b: TriangularBanded<F>,
    /// Source eigenvalues, strictly increasing.
    pub lambda: Vec<F>,
    /// Ratio of leading coefficients, i.e. the diagonal of `V`.
    pub diagonal: Vec<F>,
}

impl<F: Real> ConnectionPencil<F> {
    /// Builds the pencil connecting the standard polynomials underlying `source` and
    /// `target`; normalizations are handled by the caller.
    #[instrument(level = "debug", skip_all, fields(n = n, source = %source, target = %target))]
    pub fn new(n: usize, source: &Basis, target: &Basis) -> PlanResult<Self> {
        source.validate()?;
        target.validate()?;
        match (source.kind(), target.kind()) {
            (Kind::Jacobi(alpha, beta), Kind::Jacobi(gamma, delta)) => {
                Self::jacobi(n, alpha, beta, gamma, delta)
            }
            (Kind::Laguerre(alpha), Kind::Laguerre(beta)) => Self::laguerre(n, alpha, beta),
            _ => Err(PlanError::singular(format!(
                "no connection between {source} and {target}"
            ))),
        }
    }

    #[inline]
    pub fn n(&self) -> usize {
        self.lambda.len()
    }

    #[inline]
    pub fn bandwidth(&self) -> usize {
        self.a.bandwidth()
    }

    /// `P^(α,β) -> P^(γ,δ)`, expressed in the range basis `P^(γ+1,δ+1)`.
    ///
    /// `B` is the raising operator `P^(γ,δ) -> P^(γ+1,δ+1)` and `A` the image of the
    /// source Sturm–Liouville operator, so both have bandwidth 2.
    fn jacobi(n: usize, alpha: f64, beta: f64, gamma: f64, delta: f64) -> PlanResult<Self> {
        let mut a = TriangularBanded::try_new(n, 2)?;
        let mut b = TriangularBanded::try_new(n, 2)?;
        let k0 = (alpha - beta) - (gamma - delta);
        let k1 = alpha + beta - gamma - delta;

        for j in 0..n {
            // P^(γ,δ)_j -> P^(γ+1,δ)_{j, j-1} -> P^(γ+1,δ+1)_{j, j-1, j-2}.
            let mut col = [0.0f64; 3];
            let (c0, c1) = raise_first(j, gamma, delta);
            for (k, w) in [(j, c0), (j.wrapping_sub(1), c1)] {
                if k > j || w == 0.0 {
                    continue;
                }
                let (e0, e1) = raise_second(k, gamma + 1.0, delta);
                col[j - k] += w * e0;
                if k >= 1 {
                    col[j - k + 1] += w * e1;
                }
            }

            let mu = j as f64 * (j as f64 + gamma + delta + 1.0);
            for (d, &w) in col.iter().enumerate().take(j + 1) {
                if w != 0.0 {
                    b.set(j - d, j, F::cast(w));
                    a.set(j - d, j, F::cast(mu * w));
                }
            }

            if j > 0 {
                // d/dx P^(γ,δ)_j = (j + γ + δ + 1) / 2 P^(γ+1,δ+1)_{j-1}.
                let dj = (j as f64 + gamma + delta + 1.0) / 2.0;
                let (xa, xb, xc) = multiply_by_x(j - 1, gamma + 1.0, delta + 1.0);
                a.add(j - 1, j, F::cast(dj * k0 + dj * k1 * xb));
                a.add(j, j, F::cast(dj * k1 * xa));
                if j >= 2 {
                    a.add(j - 2, j, F::cast(dj * k1 * xc));
                }
            }
        }

        let lambda = try_collect_vec(
            (0..n).map(|j| F::cast(j as f64 * (j as f64 + alpha + beta + 1.0))),
        )?;
        let diagonal = try_collect_vec(
            leading_coefficients(n, alpha, beta)
                .into_iter()
                .zip(leading_coefficients(n, gamma, delta))
                .map(|(s, t)| F::cast(s / t)),
        )?;
        Ok(Self {
            a,
            b,
            lambda,
            diagonal,
        })
    }

    /// `L^(α) -> L^(β)`, expressed in the basis `L^(β+1)`; bandwidth 1.
    fn laguerre(n: usize, alpha: f64, beta: f64) -> PlanResult<Self> {
        let mut a = TriangularBanded::try_new(n, 1)?;
        let mut b = TriangularBanded::try_new(n, 1)?;
        for j in 0..n {
            a.set(j, j, F::from_usize(j));
            b.set(j, j, F::one());
            if j > 0 {
                a.set(j - 1, j, F::cast(alpha - beta - j as f64));
                b.set(j - 1, j, -F::one());
            }
        }
        let lambda = try_collect_vec((0..n).map(F::from_usize))?;
        let diagonal = try_collect_vec((0..n).map(|_| F::one()))?;
        Ok(Self {
            a,
            b,
            lambda,
            diagonal,
        })
    }
}

/// `P^(a,b)_n = c0 P^(a+1,b)_n + c1 P^(a+1,b)_{n-1}`.
fn raise_first(n: usize, a: f64, b: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let n = n as f64;
    let d = 2.0 * n + a + b + 1.0;
    ((n + a + b + 1.0) / d, -(n + b) / d)
}

/// `P^(a,b)_n = c0 P^(a,b+1)_n + c1 P^(a,b+1)_{n-1}`.
fn raise_second(n: usize, a: f64, b: f64) -> (f64, f64) {
    if n == 0 {
        return (1.0, 0.0);
    }
    let n = n as f64;
    let d = 2.0 * n + a + b + 1.0;
    ((n + a + b + 1.0) / d, (n + a) / d)
}

/// `x P_n = α P_{n+1} + β P_n + γ P_{n-1}` for `P = P^(a,b)`.
fn multiply_by_x(n: usize, a: f64, b: f64) -> (f64, f64, f64) {
    if n == 0 {
        return (2.0 / (a + b + 2.0), (b - a) / (a + b + 2.0), 0.0);
    }
    let n = n as f64;
    let s = 2.0 * n + a + b;
    (
        2.0 * (n + 1.0) * (n + a + b + 1.0) / ((s + 1.0) * (s + 2.0)),
        (b * b - a * a) / (s * (s + 2.0)),
        2.0 * (n + a) * (n + b) / (s * (s + 1.0)),
    )
}

/// Leading coefficients `k_n` of `P^(a,b)_n(x) = k_n x^n + ...` for `n < len`.
fn leading_coefficients(len: usize, a: f64, b: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(len);
    let mut r = 1.0;
    for k in 0..len {
        if k == 1 {
            r *= (a + b + 2.0) / 2.0;
        } else if k >= 2 {
            let k = k as f64;
            r *= (2.0 * k + a + b) * (2.0 * k + a + b - 1.0) / (2.0 * k * (k + a + b));
        }
        out.push(r);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Family;

    #[test]
    fn jacobi_pencil_has_bandwidth_two() {
        let p = ConnectionPencil::<f64>::new(
            8,
            &Basis::standard(Family::Legendre),
            &Basis::standard(Family::Chebyshev),
        )
        .unwrap();
        assert_eq!(p.bandwidth(), 2);
        assert_eq!(p.n(), 8);
        // A_jj = λ_j B_jj for every j.
        for j in 0..8 {
            let r = p.a.get(j, j) - p.lambda[j] * p.b.get(j, j);
            assert!(r.abs() < 1e-12, "j = {j}: {r}");
        }
        assert!(p.lambda.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn leading_coefficients_of_legendre() {
        // P_2 = (3x^2 - 1)/2, P_3 = (5x^3 - 3x)/2.
        let k = leading_coefficients(4, 0.0, 0.0);
        assert_eq!(k[0], 1.0);
        assert_eq!(k[1], 1.0);
        assert!((k[2] - 1.5).abs() < 1e-15);
        assert!((k[3] - 2.5).abs() < 1e-15);
    }

    #[test]
    fn mismatched_kinds_are_singular() {
        let err = ConnectionPencil::<f64>::new(
            4,
            &Basis::standard(Family::Laguerre(0.0)),
            &Basis::standard(Family::Legendre),
        )
        .unwrap_err();
        assert!(matches!(err, PlanError::SingularConnection { .. }));
    }

    #[test]
    fn laguerre_pencil() {
        let p = ConnectionPencil::<f64>::new(
            5,
            &Basis::standard(Family::Laguerre(1.0)),
            &Basis::standard(Family::Laguerre(0.0)),
        )
        .unwrap();
        assert_eq!(p.bandwidth(), 1);
        assert_eq!(p.a.get(1, 2), -1.0);
        assert_eq!(p.b.get(3, 4), -1.0);
    }
}
