use core::fmt::{self, Display, Formatter};

use ft_field::Real;
use ft_util::{PlanError, PlanResult, try_zeroed_vec};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// One sweep of Givens rotations acting on entries `l` and `l + stride`, for `l` in
/// `0..s.len()`.
#[derive(Copy, Clone, Debug)]
pub struct SweepRef<'a, F> {
    pub stride: usize,
    pub s: &'a [F],
    pub c: &'a [F],
}

impl<F> SweepRef<'_, F> {
    #[inline]
    pub const fn len(&self) -> usize {
        self.s.len()
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Length of the slice the sweep writes into.
    #[inline]
    pub const fn span(&self) -> usize {
        if self.s.is_empty() {
            0
        } else {
            self.s.len() + self.stride
        }
    }
}

/// A set of precomputed sweeps, addressed by a dense sweep id.
pub trait Cascade<F>: Sync {
    fn n(&self) -> usize;

    fn num_sweeps(&self) -> usize;

    fn sweep(&self, id: usize) -> SweepRef<'_, F>;
}

/// The domain a [`RotationPlan`] was built for, with its shape parameters.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum RotationDomain {
    Sphere,
    Triangle { alpha: f64, beta: f64, gamma: f64 },
    Disk,
}

impl Display for RotationDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere => write!(f, "sphere"),
            Self::Triangle { alpha, beta, gamma } => {
                write!(f, "triangle({alpha}, {beta}, {gamma})")
            }
            Self::Disk => write!(f, "disk"),
        }
    }
}

/// Rotation angles for every (degree, order) pair of a domain of size `n`.
///
/// Sweep `j` takes the order-`(j + step)` slice, padded with zeros, to the order-`j`
/// slice, where `step` is 2 on the sphere and disk and 1 on the triangle.
#[derive(Clone, Debug)]
pub struct RotationPlan<F> {
    n: usize,
    domain: RotationDomain,
    stride: usize,
    offsets: Vec<usize>,
    s: Vec<F>,
    c: Vec<F>,
}

impl<F: Real> RotationPlan<F> {
    /// Rotations between the orders of the real spherical harmonics `Y_l^m`, `0 <= m < n`.
    #[instrument(skip_all, fields(n = n, precision = F::NAME))]
    pub fn sphere(n: usize) -> PlanResult<Self> {
        let targets = n.saturating_sub(2);
        Self::build(
            n,
            RotationDomain::Sphere,
            2,
            (0..targets).map(|j| n - 2 - j),
            sphere_angle,
        )
    }

    /// Rotations between the orders of the Proriol-Koornwinder-Dubiner polynomials on
    /// the triangle with weight `x^α y^β (1 - x - y)^γ`.
    #[instrument(skip_all, fields(n = n, alpha = alpha, beta = beta, gamma = gamma, precision = F::NAME))]
    pub fn triangle(n: usize, alpha: f64, beta: f64, gamma: f64) -> PlanResult<Self> {
        for (name, p) in [("alpha", alpha), ("beta", beta), ("gamma", gamma)] {
            if !p.is_finite() || p <= -1.0 {
                return Err(PlanError::singular(format!(
                    "triangle parameter {name} = {p} must exceed -1"
                )));
            }
        }
        let targets = n.saturating_sub(1);
        Self::build(
            n,
            RotationDomain::Triangle { alpha, beta, gamma },
            1,
            (0..targets).map(|j| n - 1 - j),
            |l, j| jacobi_angle(l, 2.0 * j as f64 + beta + gamma + 1.0, alpha),
        )
    }

    /// Rotations between the orders of the Zernike polynomials on the unit disk.
    #[instrument(skip_all, fields(n = n, precision = F::NAME))]
    pub fn disk(n: usize) -> PlanResult<Self> {
        // Order k holds n - ceil(k / 2) radial degrees; the last target is 2n - 4.
        let targets = n.saturating_mul(2).saturating_sub(3);
        Self::build(
            n,
            RotationDomain::Disk,
            1,
            (0..targets).map(|k| n - k.div_ceil(2) - 1),
            disk_angle,
        )
    }

    fn build<I, A>(
        n: usize,
        domain: RotationDomain,
        stride: usize,
        counts: I,
        angle: A,
    ) -> PlanResult<Self>
    where
        I: ExactSizeIterator<Item = usize> + Clone,
        A: Fn(usize, usize) -> (f64, f64),
    {
        if n.checked_mul(n).and_then(|nn| nn.checked_mul(2)).is_none() {
            return Err(PlanError::invalid_size("n", n, "plan storage overflows usize"));
        }
        let mut offsets = try_zeroed_vec::<usize>(counts.len() + 1)?;
        for (j, count) in counts.clone().enumerate() {
            offsets[j + 1] = offsets[j] + count;
        }
        let total = offsets[offsets.len() - 1];

        let pairs = counts
            .enumerate()
            .flat_map(|(j, count)| (0..count).map(move |l| (l, j)));
        let (mut s, mut c) = (Vec::new(), Vec::new());
        s.try_reserve_exact(total)
            .and_then(|()| c.try_reserve_exact(total))
            .map_err(|_| PlanError::AllocationFailure { len: total })?;
        for (l, j) in pairs {
            let (sl, cl) = angle(l, j);
            s.push(F::cast(sl));
            c.push(F::cast(cl));
        }
        debug!(%domain, sweeps = offsets.len() - 1, rotations = total, "built rotation plan");

        Ok(Self {
            n,
            domain,
            stride,
            offsets,
            s,
            c,
        })
    }

    #[inline]
    pub const fn domain(&self) -> &RotationDomain {
        &self.domain
    }

    /// Sine of rotation `l` in the sweep that produces order `j`.
    pub fn sin(&self, l: usize, j: usize) -> F {
        self.sweep(j).s[l]
    }

    /// Cosine of rotation `l` in the sweep that produces order `j`.
    pub fn cos(&self, l: usize, j: usize) -> F {
        self.sweep(j).c[l]
    }
}

impl<F: Real> Cascade<F> for RotationPlan<F> {
    #[inline]
    fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn num_sweeps(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    fn sweep(&self, id: usize) -> SweepRef<'_, F> {
        let range = self.offsets[id]..self.offsets[id + 1];
        SweepRef {
            stride: self.stride,
            s: &self.s[range.clone()],
            c: &self.c[range],
        }
    }
}

/// `(1 - x) p̃_l^(a+2,b)` expressed in `p̃_l^(a,b)`, `p̃_{l+1}^(a,b)`.
pub(crate) fn jacobi_angle(l: usize, a: f64, b: f64) -> (f64, f64) {
    let l = l as f64;
    let den = (l + a + 2.0) * (l + a + b + 2.0);
    let s = ((l + 1.0) * (l + b + 1.0) / den).sqrt();
    let c = ((a + 1.0) * (2.0 * l + a + b + 3.0) / den).sqrt();
    (s, c)
}

/// `sin²θ P̃_l^(m+2)` expressed in `P̃_l^m`, `P̃_{l+2}^m`.
pub(crate) fn sphere_angle(l: usize, m: usize) -> (f64, f64) {
    let (l, m) = (l as f64, m as f64);
    let den = (l + 2.0 * m + 3.0) * (l + 2.0 * m + 4.0);
    let s = ((l + 1.0) * (l + 2.0) / den).sqrt();
    let c = ((2.0 * m + 2.0) * (2.0 * l + 2.0 * m + 5.0) / den).sqrt();
    (s, c)
}

/// Radial Zernike factor `r^(k+2)` lowered to `r^k`.
fn disk_angle(l: usize, k: usize) -> (f64, f64) {
    let (l, k) = (l as f64, k as f64);
    let den = l + k + 2.0;
    let s = -(l + 1.0) / den;
    let c = ((k + 1.0) * (2.0 * l + k + 3.0)).sqrt() / den;
    (s, c)
}
