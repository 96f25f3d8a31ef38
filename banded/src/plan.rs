use ft_field::{ExecutionConfig, Real};
use ft_matrix::dense::ColMajorMatrix;
use ft_maybe_rayon::prelude::*;
use ft_util::{PlanResult, try_collect_vec};
use tracing::instrument;

use crate::{
    Basis, ConnectionPencil, Family, FmmConfig, Normalization, TbEigenFmm, Transpose,
};

/// Converts coefficients in a source basis to coefficients in a target basis.
///
/// With `V` the connection matrix between the underlying standard polynomials and
/// `S_P`, `S_Q` the normalization scalings of source and target, the plan applies
/// `C = S_Q^{-1} V S_P`. `mul` computes `C x` or `C^T x`; `solve` computes `C^{-1} x`
/// or `C^{-T} x`.
#[derive(Clone, Debug)]
pub struct ConnectionPlan<F> {
    source: Basis,
    target: Basis,
    fmm: TbEigenFmm<F>,
    scale_in: Vec<F>,
    scale_out: Vec<F>,
}

impl<F: Real> ConnectionPlan<F> {
    #[instrument(skip_all, fields(n = n, source = %source, target = %target, precision = F::NAME))]
    pub fn new(n: usize, source: Basis, target: Basis, config: &FmmConfig) -> PlanResult<Self> {
        let pencil = ConnectionPencil::new(n, &source, &target)?;
        let fmm = TbEigenFmm::new(&pencil, config)?;
        let scale_in = try_collect_vec(source.scales(n).into_iter().map(F::cast))?;
        let scale_out = try_collect_vec(target.scales(n).into_iter().map(F::cast))?;
        Ok(Self {
            source,
            target,
            fmm,
            scale_in,
            scale_out,
        })
    }

    #[inline]
    pub const fn n(&self) -> usize {
        self.fmm.n()
    }

    pub const fn source(&self) -> &Basis {
        &self.source
    }

    pub const fn target(&self) -> &Basis {
        &self.target
    }

    /// `x <- C x` or `x <- C^T x`.
    pub fn mul(&self, t: Transpose, x: &mut [F]) {
        match t {
            Transpose::NoTranspose => {
                scale(x, &self.scale_in);
                self.fmm.mul(t, x);
                unscale(x, &self.scale_out);
            }
            Transpose::Transpose => {
                unscale(x, &self.scale_out);
                self.fmm.mul(t, x);
                scale(x, &self.scale_in);
            }
        }
    }

    /// `x <- C^{-1} x` or `x <- C^{-T} x`.
    pub fn solve(&self, t: Transpose, x: &mut [F]) {
        match t {
            Transpose::NoTranspose => {
                scale(x, &self.scale_out);
                self.fmm.solve(t, x);
                unscale(x, &self.scale_in);
            }
            Transpose::Transpose => {
                unscale(x, &self.scale_in);
                self.fmm.solve(t, x);
                scale(x, &self.scale_out);
            }
        }
    }

    /// Applies [`Self::mul`] to the leading `n` entries of every column.
    #[instrument(level = "debug", skip_all, fields(n = self.n(), cols = matrix.width()))]
    pub fn mul_columns(&self, t: Transpose, matrix: &mut ColMajorMatrix<F>, config: &ExecutionConfig) {
        self.for_each_column(matrix, config, |x| self.mul(t, x));
    }

    /// Applies [`Self::solve`] to the leading `n` entries of every column.
    #[instrument(level = "debug", skip_all, fields(n = self.n(), cols = matrix.width()))]
    pub fn solve_columns(
        &self,
        t: Transpose,
        matrix: &mut ColMajorMatrix<F>,
        config: &ExecutionConfig,
    ) {
        self.for_each_column(matrix, config, |x| self.solve(t, x));
    }

    fn for_each_column<OP>(&self, matrix: &mut ColMajorMatrix<F>, config: &ExecutionConfig, op: OP)
    where
        OP: Fn(&mut [F]) + Sync + Send,
    {
        let n = self.n();
        assert!(
            matrix.height >= n,
            "column height {} is smaller than the plan size {n}",
            matrix.height
        );
        if n == 0 {
            return;
        }
        ft_maybe_rayon::with_threads(config.threads, || {
            matrix.par_cols_mut().for_each(|col| op(&mut col[..n]));
        });
    }
}

#[inline]
fn scale<F: Real>(x: &mut [F], s: &[F]) {
    x.iter_mut().zip(s).for_each(|(v, &s)| *v *= s);
}

#[inline]
fn unscale<F: Real>(x: &mut [F], s: &[F]) {
    x.iter_mut().zip(s).for_each(|(v, &s)| *v /= s);
}

/// Named constructors for the classical family pairs, with default tuning.
impl<F: Real> ConnectionPlan<F> {
    fn pair(
        n: usize,
        (f1, norm1): (Family, Normalization),
        (f2, norm2): (Family, Normalization),
    ) -> PlanResult<Self> {
        Self::new(
            n,
            Basis::new(f1, norm1),
            Basis::new(f2, norm2),
            &FmmConfig::default(),
        )
    }

    pub fn legendre_to_chebyshev(norm1: Normalization, norm2: Normalization, n: usize) -> PlanResult<Self> {
        Self::pair(n, (Family::Legendre, norm1), (Family::Chebyshev, norm2))
    }

    pub fn chebyshev_to_legendre(norm1: Normalization, norm2: Normalization, n: usize) -> PlanResult<Self> {
        Self::pair(n, (Family::Chebyshev, norm1), (Family::Legendre, norm2))
    }

    pub fn ultraspherical_to_ultraspherical(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        lambda: f64,
        mu: f64,
    ) -> PlanResult<Self> {
        Self::pair(
            n,
            (Family::Ultraspherical(lambda), norm1),
            (Family::Ultraspherical(mu), norm2),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub fn jacobi_to_jacobi(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        alpha: f64,
        beta: f64,
        gamma: f64,
        delta: f64,
    ) -> PlanResult<Self> {
        Self::pair(
            n,
            (Family::Jacobi(alpha, beta), norm1),
            (Family::Jacobi(gamma, delta), norm2),
        )
    }

    pub fn laguerre_to_laguerre(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        alpha: f64,
        beta: f64,
    ) -> PlanResult<Self> {
        Self::pair(n, (Family::Laguerre(alpha), norm1), (Family::Laguerre(beta), norm2))
    }

    pub fn jacobi_to_ultraspherical(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        alpha: f64,
        beta: f64,
        lambda: f64,
    ) -> PlanResult<Self> {
        Self::pair(
            n,
            (Family::Jacobi(alpha, beta), norm1),
            (Family::Ultraspherical(lambda), norm2),
        )
    }

    pub fn ultraspherical_to_jacobi(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        lambda: f64,
        alpha: f64,
        beta: f64,
    ) -> PlanResult<Self> {
        Self::pair(
            n,
            (Family::Ultraspherical(lambda), norm1),
            (Family::Jacobi(alpha, beta), norm2),
        )
    }

    pub fn jacobi_to_chebyshev(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        alpha: f64,
        beta: f64,
    ) -> PlanResult<Self> {
        Self::pair(n, (Family::Jacobi(alpha, beta), norm1), (Family::Chebyshev, norm2))
    }

    pub fn chebyshev_to_jacobi(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        alpha: f64,
        beta: f64,
    ) -> PlanResult<Self> {
        Self::pair(n, (Family::Chebyshev, norm1), (Family::Jacobi(alpha, beta), norm2))
    }

    pub fn ultraspherical_to_chebyshev(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        lambda: f64,
    ) -> PlanResult<Self> {
        Self::pair(n, (Family::Ultraspherical(lambda), norm1), (Family::Chebyshev, norm2))
    }

    pub fn chebyshev_to_ultraspherical(
        norm1: Normalization,
        norm2: Normalization,
        n: usize,
        lambda: f64,
    ) -> PlanResult<Self> {
        Self::pair(n, (Family::Chebyshev, norm1), (Family::Ultraspherical(lambda), norm2))
    }
}
