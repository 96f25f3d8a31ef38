use ft_banded::{Basis, ConnectionPlan, Family, FmmConfig, Transpose};
use ft_field::{ExecutionConfig, Real};
use ft_matrix::tensor::{Axis, Tensor3};
use ft_rotation::{CascadeDirection, RotationPlan, execute_tet};
use ft_util::PlanResult;
use tracing::{info_span, instrument};

use crate::HarmonicDirection;

/// Orthonormal polynomials on the tetrahedron with weight parameters `(α, β, γ, δ)` to
/// trivariate Chebyshev series `T_i(x) T_j(y) T_k(z)` in collapsed coordinates.
///
/// Coefficient `(i, j, k)` of a [`Tensor3`] of shape `n x n x n` is valid when
/// `i + j + k < n`; synthesis fills the whole cube.
#[derive(Clone, Debug)]
pub struct TetrahedralHarmonicPlan<F> {
    n: usize,
    parameters: [f64; 4],
    outer: RotationPlan<F>,
    inner: RotationPlan<F>,
    /// Connection plans along the `i`, `j` and `k` axes.
    axes: [ConnectionPlan<F>; 3],
}

impl<F: Real> TetrahedralHarmonicPlan<F> {
    pub fn tet2cheb(n: usize, alpha: f64, beta: f64, gamma: f64, delta: f64) -> PlanResult<Self> {
        Self::new(n, alpha, beta, gamma, delta, &FmmConfig::default())
    }

    #[instrument(
        skip_all,
        fields(n = n, alpha = alpha, beta = beta, gamma = gamma, delta = delta, precision = F::NAME)
    )]
    pub fn new(
        n: usize,
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
        config: &FmmConfig,
    ) -> PlanResult<Self> {
        let outer = RotationPlan::triangle(n, alpha, beta, gamma + delta + 1.0)?;
        let inner = RotationPlan::triangle(n, beta, gamma, delta)?;
        let to_chebyshev = |a: f64, b: f64| {
            ConnectionPlan::new(
                n,
                Basis::orthonormal(Family::Jacobi(a, b)),
                Basis::standard(Family::Chebyshev),
                config,
            )
        };
        let axes = [
            to_chebyshev(beta + gamma + delta + 2.0, alpha)?,
            to_chebyshev(gamma + delta + 1.0, beta)?,
            to_chebyshev(delta, gamma)?,
        ];
        Ok(Self {
            n,
            parameters: [alpha, beta, gamma, delta],
            outer,
            inner,
            axes,
        })
    }

    #[inline]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// `[α, β, γ, δ]`.
    pub const fn parameters(&self) -> [f64; 4] {
        self.parameters
    }

    #[instrument(skip_all, fields(n = self.n, direction = ?direction))]
    pub fn execute(
        &self,
        data: &mut Tensor3<F>,
        direction: HarmonicDirection,
        config: &ExecutionConfig,
    ) {
        assert_eq!(data.dims, [self.n; 3], "tetrahedral array must be n x n x n");
        match direction {
            HarmonicDirection::Synthesis => {
                execute_tet(&self.outer, &self.inner, data, CascadeDirection::Hi2Lo, config);
                info_span!("connect lines").in_scope(|| self.connect(data, direction, config));
            }
            HarmonicDirection::Analysis => {
                info_span!("connect lines").in_scope(|| self.connect(data, direction, config));
                execute_tet(&self.outer, &self.inner, data, CascadeDirection::Lo2Hi, config);
            }
        }
    }

    fn connect(
        &self,
        data: &mut Tensor3<F>,
        direction: HarmonicDirection,
        config: &ExecutionConfig,
    ) {
        if self.n == 0 {
            return;
        }
        ft_maybe_rayon::with_threads(config.threads, || {
            for (axis, plan) in [Axis::I, Axis::J, Axis::K].into_iter().zip(&self.axes) {
                data.par_for_each_line_mut(axis, |line| match direction {
                    HarmonicDirection::Synthesis => plan.mul(Transpose::NoTranspose, line),
                    HarmonicDirection::Analysis => plan.solve(Transpose::NoTranspose, line),
                });
            }
        });
    }
}
