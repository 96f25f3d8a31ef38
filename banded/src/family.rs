use core::fmt;

use ft_util::{PlanError, PlanResult};
use serde::{Deserialize, Serialize};

/// Whether polynomials carry their classical normalization or are scaled to unit norm.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Normalization {
    Standard,
    Orthonormal,
}

/// A classical orthogonal polynomial family.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Family {
    Legendre,
    /// Chebyshev polynomials of the first kind, `T_n(cos θ) = cos nθ`.
    Chebyshev,
    /// Gegenbauer polynomials `C^(λ)_n`.
    Ultraspherical(f64),
    /// Jacobi polynomials `P^(α,β)_n`.
    Jacobi(f64, f64),
    /// Generalized Laguerre polynomials `L^(α)_n`.
    Laguerre(f64),
}

/// A family together with its normalization: one side of a connection problem.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Basis {
    pub family: Family,
    pub normalization: Normalization,
}

/// Which kind of pencil connects two bases.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Kind {
    /// Jacobi parameters `(a, b)` of an interval family.
    Jacobi(f64, f64),
    /// Laguerre parameter of a half-line family.
    Laguerre(f64),
}

impl Basis {
    pub const fn new(family: Family, normalization: Normalization) -> Self {
        Self {
            family,
            normalization,
        }
    }

    pub const fn standard(family: Family) -> Self {
        Self::new(family, Normalization::Standard)
    }

    pub const fn orthonormal(family: Family) -> Self {
        Self::new(family, Normalization::Orthonormal)
    }

    /// Checks that the family parameters lie in the domain where the polynomials are
    /// orthogonal with respect to an integrable weight and have non-vanishing scale.
    pub fn validate(&self) -> PlanResult<()> {
        let finite = |x: f64| x.is_finite();
        match self.family {
            Family::Legendre | Family::Chebyshev => Ok(()),
            Family::Ultraspherical(lambda) => {
                if !finite(lambda) || lambda <= -0.5 {
                    return Err(PlanError::singular(format!(
                        "ultraspherical parameter {lambda} must exceed -1/2"
                    )));
                }
                if lambda == 0.0 && self.normalization == Normalization::Standard {
                    return Err(PlanError::singular(
                        "standard ultraspherical polynomials vanish identically for lambda = 0",
                    ));
                }
                Ok(())
            }
            Family::Jacobi(alpha, beta) => {
                if !finite(alpha) || !finite(beta) || alpha <= -1.0 || beta <= -1.0 {
                    return Err(PlanError::singular(format!(
                        "Jacobi parameters ({alpha}, {beta}) must both exceed -1"
                    )));
                }
                Ok(())
            }
            Family::Laguerre(alpha) => {
                if !finite(alpha) || alpha <= -1.0 {
                    return Err(PlanError::singular(format!(
                        "Laguerre parameter {alpha} must exceed -1"
                    )));
                }
                Ok(())
            }
        }
    }

    pub(crate) fn kind(&self) -> Kind {
        match self.family {
            Family::Legendre => Kind::Jacobi(0.0, 0.0),
            Family::Chebyshev => Kind::Jacobi(-0.5, -0.5),
            Family::Ultraspherical(lambda) => Kind::Jacobi(lambda - 0.5, lambda - 0.5),
            Family::Jacobi(alpha, beta) => Kind::Jacobi(alpha, beta),
            Family::Laguerre(alpha) => Kind::Laguerre(alpha),
        }
    }

    /// Factors `σ_k` with `φ_k = σ_k P_k`, where `φ_k` is this basis and `P_k` the
    /// standard Jacobi (or Laguerre) polynomial with the same parameters.
    pub fn scales(&self, n: usize) -> Vec<f64> {
        match self.normalization {
            Normalization::Orthonormal => match self.kind() {
                Kind::Jacobi(a, b) => jacobi_norms_sq(n, a, b)
                    .into_iter()
                    .map(|h| 1.0 / h.sqrt())
                    .collect(),
                Kind::Laguerre(a) => laguerre_norms_sq(n, a)
                    .into_iter()
                    .map(|h| 1.0 / h.sqrt())
                    .collect(),
            },
            Normalization::Standard => match self.family {
                // T_k = k! / (1/2)_k P^(-1/2,-1/2)_k
                Family::Chebyshev => pochhammer_ratios(n, |k| k / (k - 0.5)),
                // C^λ_k = (2λ)_k / (λ + 1/2)_k P^(λ-1/2,λ-1/2)_k
                Family::Ultraspherical(lambda) => {
                    pochhammer_ratios(n, |k| (2.0 * lambda + k - 1.0) / (lambda + k - 0.5))
                }
                _ => vec![1.0; n],
            },
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let norm = match self.normalization {
            Normalization::Standard => "",
            Normalization::Orthonormal => " (orthonormal)",
        };
        match self.family {
            Family::Legendre => write!(f, "Legendre{norm}"),
            Family::Chebyshev => write!(f, "Chebyshev{norm}"),
            Family::Ultraspherical(l) => write!(f, "ultraspherical({l}){norm}"),
            Family::Jacobi(a, b) => write!(f, "Jacobi({a}, {b}){norm}"),
            Family::Laguerre(a) => write!(f, "Laguerre({a}){norm}"),
        }
    }
}

/// `σ_0 = 1`, `σ_k = σ_{k-1} r(k)`.
fn pochhammer_ratios(n: usize, ratio: impl Fn(f64) -> f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(n);
    let mut s = 1.0;
    for k in 0..n {
        if k > 0 {
            s *= ratio(k as f64);
        }
        out.push(s);
    }
    out
}

/// `h_k = ∫ P_k^(a,b)(x)^2 (1-x)^a (1+x)^b dx` for `k < n`.
pub fn jacobi_norms_sq(n: usize, a: f64, b: f64) -> Vec<f64> {
    use libm::lgamma;
    let mut h = Vec::with_capacity(n);
    if n == 0 {
        return h;
    }
    let ln2 = core::f64::consts::LN_2;
    h.push(((a + b + 1.0) * ln2 + lgamma(a + 1.0) + lgamma(b + 1.0) - lgamma(a + b + 2.0)).exp());
    if n == 1 {
        return h;
    }
    // The general ratio has a removable 0/0 at k = 1 when a + b = -1.
    h.push(
        ((a + b + 1.0) * ln2 - (a + b + 3.0).ln() + lgamma(a + 2.0) + lgamma(b + 2.0)
            - lgamma(a + b + 2.0))
        .exp(),
    );
    for k in 2..n {
        let kf = k as f64;
        let prev = h[k - 1];
        h.push(
            prev * (2.0 * kf + a + b - 1.0) / (2.0 * kf + a + b + 1.0) * (kf + a) * (kf + b)
                / (kf * (kf + a + b)),
        );
    }
    h
}

/// `h_k = ∫_0^∞ L_k^(a)(x)^2 x^a e^{-x} dx = Γ(k + a + 1) / k!` for `k < n`.
pub fn laguerre_norms_sq(n: usize, a: f64) -> Vec<f64> {
    let mut h = Vec::with_capacity(n);
    let mut cur = libm::tgamma(a + 1.0);
    for k in 0..n {
        if k > 0 {
            cur *= (k as f64 + a) / k as f64;
        }
        h.push(cur);
    }
    h
}
