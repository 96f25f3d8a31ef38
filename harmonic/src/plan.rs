use core::fmt::{self, Display, Formatter};

use ft_banded::{Basis, ConnectionPlan, Family, FmmConfig, Transpose};
use ft_dft::GridTransform;
use ft_field::{ExecutionConfig, Real};
use ft_matrix::dense::ColMajorMatrix;
use ft_maybe_rayon::prelude::*;
use ft_rotation::{
    Cascade, CascadeDirection, Layout, RotationPlan, SpinRotationPlan, execute_disk, execute_sph,
    execute_sphv, execute_spinsph, execute_tri,
};
use ft_util::PlanResult;
use serde::{Deserialize, Serialize};
use tracing::{info_span, instrument};

/// Which way a harmonic plan converts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarmonicDirection {
    /// Harmonic coefficients to Chebyshev/Fourier coefficients.
    Synthesis,
    /// Chebyshev/Fourier coefficients back to harmonic coefficients.
    Analysis,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum HarmonicDomain {
    Sphere,
    SpinSphere { spin: i64 },
    /// One tangential component of a vector field on the sphere.
    VectorSphere,
    Triangle { alpha: f64, beta: f64, gamma: f64 },
    Disk,
}

impl HarmonicDomain {
    #[must_use]
    pub const fn layout(&self) -> Layout {
        match *self {
            Self::Sphere => Layout::Sphere,
            Self::SpinSphere { spin } => Layout::SpinSphere { spin },
            Self::VectorSphere => Layout::VectorSphere,
            Self::Triangle { .. } => Layout::Triangle,
            Self::Disk => Layout::Disk,
        }
    }
}

impl Display for HarmonicDomain {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sphere => write!(f, "sphere"),
            Self::SpinSphere { spin } => write!(f, "spin sphere (s = {spin})"),
            Self::VectorSphere => write!(f, "vector sphere"),
            Self::Triangle { alpha, beta, gamma } => {
                write!(f, "triangle({alpha}, {beta}, {gamma})")
            }
            Self::Disk => write!(f, "disk"),
        }
    }
}

#[derive(Clone, Debug)]
enum Rotations<F> {
    Plain(RotationPlan<F>),
    Spin(SpinRotationPlan<F>),
}

/// A complete map between harmonic coefficients on a 2D domain and Chebyshev/Fourier
/// coefficients of the same size.
///
/// Synthesis lowers every order-slice with the rotation cascade and then converts each
/// column with a banded connection plan. The output bases are
/// * sphere and spin sphere: `cos(lθ)` in columns whose lowered order is even and
///   `sin((l + 1)θ)` in the others, with the columns' Fourier dependence unchanged;
/// * vector sphere: `cos(lθ)` in columns of odd order and `sin((l + 1)θ)` in the others;
/// * triangle: `T_i(x) T_j(y)` in collapsed coordinates;
/// * disk: `T_{2l}(r)` for even orders and `T_{2l+1}(r)` for odd ones, orthonormally
///   scaled, with the columns' Fourier dependence unchanged.
#[derive(Clone, Debug)]
pub struct HarmonicPlan<F> {
    n: usize,
    domain: HarmonicDomain,
    rotations: Rotations<F>,
    /// Indexed by [`Self::connection_index`]. On the triangle, the column plan then the
    /// row plan.
    connections: Vec<ConnectionPlan<F>>,
}

impl<F: Real> HarmonicPlan<F> {
    /// Spherical harmonics to bivariate Fourier series.
    pub fn sph2fourier(n: usize) -> PlanResult<Self> {
        Self::new(n, HarmonicDomain::Sphere, &FmmConfig::default())
    }

    /// Spin-weighted spherical harmonics of spin `s` to bivariate Fourier series.
    pub fn spinsph2fourier(n: usize, s: i64) -> PlanResult<Self> {
        Self::new(n, HarmonicDomain::SpinSphere { spin: s }, &FmmConfig::default())
    }

    /// Orthonormal polynomials on the triangle to bivariate Chebyshev series.
    pub fn tri2cheb(n: usize, alpha: f64, beta: f64, gamma: f64) -> PlanResult<Self> {
        Self::new(
            n,
            HarmonicDomain::Triangle { alpha, beta, gamma },
            &FmmConfig::default(),
        )
    }

    /// Vector spherical harmonics to bivariate Fourier series, one tangential component
    /// at a time.
    pub fn sphv2fourier(n: usize) -> PlanResult<Self> {
        Self::new(n, HarmonicDomain::VectorSphere, &FmmConfig::default())
    }

    /// Zernike polynomials to Chebyshev-Fourier series on the disk.
    pub fn disk2cxf(n: usize) -> PlanResult<Self> {
        Self::new(n, HarmonicDomain::Disk, &FmmConfig::default())
    }

    #[instrument(skip_all, fields(n = n, domain = %domain, precision = F::NAME))]
    pub fn new(n: usize, domain: HarmonicDomain, config: &FmmConfig) -> PlanResult<Self> {
        let connect = |len: usize, source: Family, target: Basis| {
            ConnectionPlan::<F>::new(len, Basis::orthonormal(source), target, config)
        };
        let m = n.saturating_sub(1);
        let (rotations, connections) = match domain {
            HarmonicDomain::Sphere | HarmonicDomain::SpinSphere { .. } => {
                let rotations = match domain {
                    HarmonicDomain::SpinSphere { spin } => {
                        Rotations::Spin(SpinRotationPlan::new(n, spin)?)
                    }
                    _ => Rotations::Plain(RotationPlan::sphere(n)?),
                };
                let even = connect(n, Family::Legendre, Basis::standard(Family::Chebyshev))?;
                let odd = connect(
                    m,
                    Family::Ultraspherical(1.5),
                    Basis::standard(Family::Ultraspherical(1.0)),
                )?;
                (rotations, vec![even, odd])
            }
            HarmonicDomain::VectorSphere => {
                let rotations = Rotations::Plain(RotationPlan::sphere(n)?);
                // Order 0 carries sin θ p̃^(1,1), odd orders p̃^(1,1) and even orders
                // sin θ p̃^(2,2).
                let zonal = connect(
                    m,
                    Family::Ultraspherical(1.5),
                    Basis::standard(Family::Ultraspherical(1.0)),
                )?;
                let odd = connect(
                    m,
                    Family::Ultraspherical(1.5),
                    Basis::standard(Family::Chebyshev),
                )?;
                let even = connect(
                    n.saturating_sub(2),
                    Family::Ultraspherical(2.5),
                    Basis::standard(Family::Ultraspherical(1.0)),
                )?;
                (rotations, vec![zonal, odd, even])
            }
            HarmonicDomain::Triangle { alpha, beta, gamma } => {
                let rotations = Rotations::Plain(RotationPlan::triangle(n, alpha, beta, gamma)?);
                let columns = connect(
                    n,
                    Family::Jacobi(beta + gamma + 1.0, alpha),
                    Basis::standard(Family::Chebyshev),
                )?;
                let rows = connect(
                    n,
                    Family::Jacobi(gamma, beta),
                    Basis::standard(Family::Chebyshev),
                )?;
                (rotations, vec![columns, rows])
            }
            HarmonicDomain::Disk => {
                let rotations = Rotations::Plain(RotationPlan::disk(n)?);
                let even = connect(
                    n,
                    Family::Jacobi(0.0, 0.0),
                    Basis::orthonormal(Family::Jacobi(-0.5, -0.5)),
                )?;
                let odd = connect(
                    m,
                    Family::Jacobi(0.0, 1.0),
                    Basis::orthonormal(Family::Jacobi(-0.5, 0.5)),
                )?;
                (rotations, vec![even, odd])
            }
        };
        Ok(Self {
            n,
            domain,
            rotations,
            connections,
        })
    }

    #[inline]
    pub const fn n(&self) -> usize {
        self.n
    }

    #[inline]
    pub const fn domain(&self) -> &HarmonicDomain {
        &self.domain
    }

    #[inline]
    pub const fn layout(&self) -> Layout {
        self.domain.layout()
    }

    /// Number of stored rotation sweeps.
    pub fn num_sweeps(&self) -> usize {
        match &self.rotations {
            Rotations::Plain(plan) => plan.num_sweeps(),
            Rotations::Spin(plan) => plan.num_sweeps(),
        }
    }

    /// Converts `data`, laid out as [`Self::layout`], in place.
    #[instrument(skip_all, fields(n = self.n, domain = %self.domain, direction = ?direction))]
    pub fn execute(
        &self,
        data: &mut ColMajorMatrix<F>,
        direction: HarmonicDirection,
        config: &ExecutionConfig,
    ) {
        match direction {
            HarmonicDirection::Synthesis => {
                self.rotate(data, CascadeDirection::Hi2Lo, config);
                info_span!("connect columns").in_scope(|| self.connect(data, direction, config));
            }
            HarmonicDirection::Analysis => {
                info_span!("connect columns").in_scope(|| self.connect(data, direction, config));
                self.rotate(data, CascadeDirection::Lo2Hi, config);
            }
        }
    }

    /// Synthesis followed by evaluation on the grid of `grid`.
    pub fn synthesize_to_grid<G: GridTransform<F>>(
        &self,
        coeffs: &ColMajorMatrix<F>,
        grid: &G,
        config: &ExecutionConfig,
    ) -> ColMajorMatrix<F> {
        assert_eq!(grid.shape(), (self.n, self.layout().width(self.n)));
        let mut data = coeffs.clone();
        self.execute(&mut data, HarmonicDirection::Synthesis, config);
        grid.synthesize(data)
    }

    /// Analysis on the grid of `grid` followed by [`HarmonicDirection::Analysis`].
    pub fn analyze_from_grid<G: GridTransform<F>>(
        &self,
        samples: ColMajorMatrix<F>,
        grid: &G,
        config: &ExecutionConfig,
    ) -> ColMajorMatrix<F> {
        assert_eq!(grid.shape(), (self.n, self.layout().width(self.n)));
        let mut data = grid.analyze(samples);
        self.execute(&mut data, HarmonicDirection::Analysis, config);
        data
    }

    fn rotate(
        &self,
        data: &mut ColMajorMatrix<F>,
        direction: CascadeDirection,
        config: &ExecutionConfig,
    ) {
        match (&self.rotations, self.domain) {
            (Rotations::Spin(plan), _) => execute_spinsph(plan, data, direction, config),
            (Rotations::Plain(plan), HarmonicDomain::Triangle { .. }) => {
                execute_tri(plan, data, direction, config);
            }
            (Rotations::Plain(plan), HarmonicDomain::Disk) => {
                execute_disk(plan, data, direction, config);
            }
            (Rotations::Plain(plan), HarmonicDomain::VectorSphere) => {
                execute_sphv(plan, data, direction, config);
            }
            (Rotations::Plain(plan), _) => execute_sph(plan, data, direction, config),
        }
    }

    fn connect(
        &self,
        data: &mut ColMajorMatrix<F>,
        direction: HarmonicDirection,
        config: &ExecutionConfig,
    ) {
        let apply = |plan: &ConnectionPlan<F>, x: &mut [F]| match direction {
            HarmonicDirection::Synthesis => plan.mul(Transpose::NoTranspose, x),
            HarmonicDirection::Analysis => plan.solve(Transpose::NoTranspose, x),
        };
        let n = self.n;
        if n == 0 {
            return;
        }

        if let HarmonicDomain::Triangle { .. } = self.domain {
            let columns = |plan: &ConnectionPlan<F>, m: &mut ColMajorMatrix<F>| match direction {
                HarmonicDirection::Synthesis => plan.mul_columns(Transpose::NoTranspose, m, config),
                HarmonicDirection::Analysis => plan.solve_columns(Transpose::NoTranspose, m, config),
            };
            // The row plan runs on the transpose; the two passes commute.
            let mut rows = data.transpose();
            columns(&self.connections[1], &mut rows);
            *data = rows.transpose();
            columns(&self.connections[0], data);
            return;
        }

        ft_maybe_rayon::with_threads(config.threads, || {
            data.par_cols_mut().enumerate().for_each(|(col, values)| {
                let plan = &self.connections[self.connection_index(col)];
                apply(plan, &mut values[..plan.n()]);
            });
        });
    }

    /// Which connection plan converts column `col` once lowered.
    fn connection_index(&self, col: usize) -> usize {
        let layout = self.layout();
        match self.domain {
            HarmonicDomain::VectorSphere => match layout.column_order(col) {
                0 => 0,
                m if m % 2 == 1 => 1,
                _ => 2,
            },
            _ => usize::from(layout.low_column_len(self.n, col) != self.n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_for_every_domain() {
        let n = 9;
        for domain in [
            HarmonicDomain::Sphere,
            HarmonicDomain::SpinSphere { spin: -2 },
            HarmonicDomain::VectorSphere,
            HarmonicDomain::Triangle {
                alpha: 0.0,
                beta: -0.5,
                gamma: -0.5,
            },
            HarmonicDomain::Disk,
        ] {
            let plan = HarmonicPlan::<f64>::new(n, domain, &FmmConfig::default()).unwrap();
            assert_eq!(plan.n(), n);
            assert!(plan.num_sweeps() > 0, "{domain}");
        }
    }

    #[test]
    fn invalid_parameters_fail_before_any_work() {
        assert!(HarmonicPlan::<f64>::spinsph2fourier(4, 4).is_err());
        assert!(HarmonicPlan::<f64>::tri2cheb(4, -1.5, 0.0, 0.0).is_err());
    }

    #[test]
    fn domain_serde() {
        let d = HarmonicDomain::Triangle {
            alpha: 0.5,
            beta: 0.0,
            gamma: -0.5,
        };
        let json = serde_json::to_string(&d).unwrap();
        assert_eq!(serde_json::from_str::<HarmonicDomain>(&json).unwrap(), d);
    }
}
