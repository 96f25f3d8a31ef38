//! Hierarchical application of the Cauchy kernel `K_ij = 1 / (x_i - y_j)`.
//!
//! The two point sets are sorted and separated (every `x_i` lies below every `y_j`).
//! Blocks whose interpolation rank at the requested tolerance is small compared to
//! their size are replaced by Chebyshev interpolation in the variable whose interval
//! is shorter; others are split into four children or stored densely.

use core::f64::consts::PI;

use ft_field::Real;
use ft_util::PlanResult;

use crate::FmmConfig;

#[derive(Clone, Debug)]
pub(crate) enum CauchyBlock<F> {
    Dense {
        r0: usize,
        c0: usize,
        rows: usize,
        cols: usize,
        /// Row-major.
        k: Vec<F>,
    },
    LowRank {
        r0: usize,
        c0: usize,
        rank: usize,
        /// `rows x rank`, row-major.
        u: Vec<F>,
        /// `cols x rank`, row-major.
        v: Vec<F>,
    },
    Split(Box<[CauchyBlock<F>; 4]>),
}

/// Counts of each block type, for logging.
#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct CauchyStats {
    pub dense: usize,
    pub low_rank: usize,
    pub max_rank: usize,
}

/// Interpolation rank that resolves `1 / (x - y)` on an interval of half-width `h`
/// whose centre lies a distance `d` from the singularity, to relative accuracy `eps`.
fn needed_rank(h: f64, d: f64, eps: f64) -> Option<usize> {
    if h == 0.0 {
        return Some(1);
    }
    let q = d / h;
    if q <= 1.0 {
        return None;
    }
    let rho = q + (q * q - 1.0).sqrt();
    let r = ((4.0 / (eps * (1.0 - 1.0 / rho))).ln() / rho.ln()).ceil() + 1.0;
    Some((r as usize).max(1))
}

/// Chebyshev points of the first kind on `[lo, hi]` and their barycentric weights.
fn chebyshev_nodes(lo: f64, hi: f64, r: usize) -> (Vec<f64>, Vec<f64>) {
    let (c, h) = ((lo + hi) / 2.0, (hi - lo) / 2.0);
    (0..r)
        .map(|p| {
            let theta = (2 * p + 1) as f64 * PI / (2 * r) as f64;
            let sign = if p % 2 == 0 { 1.0 } else { -1.0 };
            (c + h * theta.cos(), sign * theta.sin())
        })
        .unzip()
}

/// Values at `x` of the Lagrange basis through `nodes`.
fn lagrange_row(nodes: &[f64], weights: &[f64], x: f64, out: &mut [f64]) {
    if let Some(p) = nodes.iter().position(|&t| t == x) {
        out.fill(0.0);
        out[p] = 1.0;
        return;
    }
    let mut total = 0.0;
    for ((o, &t), &w) in out.iter_mut().zip(nodes).zip(weights) {
        *o = w / (x - t);
        total += *o;
    }
    out.iter_mut().for_each(|o| *o /= total);
}

impl<F: Real> CauchyBlock<F> {
    /// Kernel between `x[r0..r1]` and `y[c0..c1]`.
    pub(crate) fn new(
        x: &[F],
        y: &[F],
        (r0, r1): (usize, usize),
        (c0, c1): (usize, usize),
        config: &FmmConfig,
        stats: &mut CauchyStats,
    ) -> PlanResult<Self> {
        let (m, n) = (r1 - r0, c1 - c0);
        if m <= config.cauchy_leaf_size || n <= config.cauchy_leaf_size {
            stats.dense += 1;
            let mut k = Vec::new();
            k.try_reserve_exact(m * n)
                .map_err(|_| ft_util::PlanError::AllocationFailure { len: m * n })?;
            for xi in &x[r0..r1] {
                k.extend(y[c0..c1].iter().map(|&yj| F::one() / (*xi - yj)));
            }
            return Ok(Self::Dense {
                r0,
                c0,
                rows: m,
                cols: n,
                k,
            });
        }

        let eps = config.tolerance_factor * F::epsilon().as_f64();
        let (xlo, xhi) = (x[r0].as_f64(), x[r1 - 1].as_f64());
        let (ylo, yhi) = (y[c0].as_f64(), y[c1 - 1].as_f64());
        let (hx, hy) = ((xhi - xlo) / 2.0, (yhi - ylo) / 2.0);
        let interpolate_cols = hy <= hx;
        let rank = if interpolate_cols {
            needed_rank(hy, (ylo + yhi) / 2.0 - xhi, eps)
        } else {
            needed_rank(hx, ylo - (xlo + xhi) / 2.0, eps)
        };

        match rank {
            Some(rank) if rank <= config.max_rank && 2 * rank < m.min(n) => {
                stats.low_rank += 1;
                stats.max_rank = stats.max_rank.max(rank);
                let mut u = Vec::with_capacity(m * rank);
                let mut v = Vec::with_capacity(n * rank);
                let mut row = vec![0.0; rank];
                if interpolate_cols {
                    let (t, w) = chebyshev_nodes(ylo, yhi, rank);
                    for xi in &x[r0..r1] {
                        let xi = xi.as_f64();
                        u.extend(t.iter().map(|&tp| F::cast(1.0 / (xi - tp))));
                    }
                    for yj in &y[c0..c1] {
                        lagrange_row(&t, &w, yj.as_f64(), &mut row);
                        v.extend(row.iter().map(|&l| F::cast(l)));
                    }
                } else {
                    let (t, w) = chebyshev_nodes(xlo, xhi, rank);
                    for xi in &x[r0..r1] {
                        lagrange_row(&t, &w, xi.as_f64(), &mut row);
                        u.extend(row.iter().map(|&l| F::cast(l)));
                    }
                    for yj in &y[c0..c1] {
                        let yj = yj.as_f64();
                        v.extend(t.iter().map(|&tp| F::cast(1.0 / (tp - yj))));
                    }
                }
                Ok(Self::LowRank {
                    r0,
                    c0,
                    rank,
                    u,
                    v,
                })
            }
            _ => {
                let (rm, cm) = ((r0 + r1) / 2, (c0 + c1) / 2);
                Ok(Self::Split(Box::new([
                    Self::new(x, y, (r0, rm), (c0, cm), config, stats)?,
                    Self::new(x, y, (r0, rm), (cm, c1), config, stats)?,
                    Self::new(x, y, (rm, r1), (c0, cm), config, stats)?,
                    Self::new(x, y, (rm, r1), (cm, c1), config, stats)?,
                ])))
            }
        }
    }

    /// `out += K z`, with `z` indexed by columns and `out` by rows.
    pub(crate) fn apply(&self, z: &[F], out: &mut [F]) {
        match self {
            Self::Dense {
                r0,
                c0,
                rows,
                cols,
                k,
            } => {
                let zs = &z[*c0..c0 + cols];
                for (o, krow) in out[*r0..r0 + rows].iter_mut().zip(k.chunks_exact(*cols)) {
                    *o += krow.iter().zip(zs).map(|(&a, &b)| a * b).sum::<F>();
                }
            }
            Self::LowRank {
                r0,
                c0,
                rank,
                u,
                v,
            } => {
                let mut t = vec![F::zero(); *rank];
                for (vrow, &zj) in v.chunks_exact(*rank).zip(&z[*c0..]) {
                    for (tp, &vp) in t.iter_mut().zip(vrow) {
                        *tp += vp * zj;
                    }
                }
                for (urow, o) in u.chunks_exact(*rank).zip(&mut out[*r0..]) {
                    *o += urow.iter().zip(&t).map(|(&a, &b)| a * b).sum::<F>();
                }
            }
            Self::Split(children) => children.iter().for_each(|c| c.apply(z, out)),
        }
    }

    /// `out += K^T z`, with `z` indexed by rows and `out` by columns.
    pub(crate) fn apply_transpose(&self, z: &[F], out: &mut [F]) {
        match self {
            Self::Dense {
                r0,
                c0,
                rows,
                cols,
                k,
            } => {
                let os = &mut out[*c0..c0 + cols];
                for (&zi, krow) in z[*r0..r0 + rows].iter().zip(k.chunks_exact(*cols)) {
                    for (o, &kij) in os.iter_mut().zip(krow) {
                        *o += kij * zi;
                    }
                }
            }
            Self::LowRank {
                r0,
                c0,
                rank,
                u,
                v,
            } => {
                let mut t = vec![F::zero(); *rank];
                for (urow, &zi) in u.chunks_exact(*rank).zip(&z[*r0..]) {
                    for (tp, &up) in t.iter_mut().zip(urow) {
                        *tp += up * zi;
                    }
                }
                for (vrow, o) in v.chunks_exact(*rank).zip(&mut out[*c0..]) {
                    *o += vrow.iter().zip(&t).map(|(&a, &b)| a * b).sum::<F>();
                }
            }
            Self::Split(children) => children.iter().for_each(|c| c.apply_transpose(z, out)),
        }
    }
}
