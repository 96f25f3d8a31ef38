use ft_field::Real;
use ft_util::{PlanResult, log2_ceil_usize, try_zeroed_vec};
use tracing::{debug, instrument};

use crate::cauchy::{CauchyBlock, CauchyStats};
use crate::eigen::EigenBlock;
use crate::{ConnectionPencil, FmmConfig};

/// Selects `V` or `V^T` in an apply.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Transpose {
    NoTranspose,
    Transpose,
}

/// Hierarchical factorization of the eigenvector matrix `V` of a triangular banded
/// pencil.
///
/// Splitting the index range at `n1` gives
///
/// ```text
/// V = [ V1  V1 X ]      X_ij = Σ_k U_ik G_kj / (λ_i - λ_{n1+j})
///     [ 0   V2   ]
/// ```
///
/// where the `b` columns of `U = V1^{-1} B1^{-1} E` and rows of `G` (the coupling rows
/// of `B V2 Λ2 - A V2`) are stored explicitly and the Cauchy kernel is applied through
/// a [`CauchyBlock`] tree. Leaves hold dense blocks.
#[derive(Clone, Debug)]
pub struct TbEigenFmm<F> {
    n: usize,
    root: Node<F>,
}

#[derive(Clone, Debug)]
enum Node<F> {
    Leaf(EigenBlock<F>),
    Split(Box<SplitNode<F>>),
}

#[derive(Clone, Debug)]
struct SplitNode<F> {
    n1: usize,
    left: Node<F>,
    right: Node<F>,
    /// Columns of `U`, each of length `n1`.
    u: Vec<Vec<F>>,
    /// Rows of `G`, each of length `n2`.
    g: Vec<Vec<F>>,
    kernel: CauchyBlock<F>,
}

#[derive(Default)]
struct BuildStats {
    leaves: usize,
    depth: usize,
    cauchy: CauchyStats,
}

impl<F: Real> TbEigenFmm<F> {
    #[instrument(skip_all, fields(n = pencil.n(), b = pencil.bandwidth()))]
    pub fn new(pencil: &ConnectionPencil<F>, config: &FmmConfig) -> PlanResult<Self> {
        config.validate()?;
        let n = pencil.n();
        let mut stats = BuildStats::default();
        let root = Node::build(pencil, 0, n, 0, config, &mut stats)?;
        debug!(
            leaves = stats.leaves,
            depth = stats.depth,
            expected_depth = log2_ceil_usize(n.div_ceil(config.leaf_size)),
            dense_kernels = stats.cauchy.dense,
            low_rank_kernels = stats.cauchy.low_rank,
            max_rank = stats.cauchy.max_rank,
            "built tb-eigen-FMM"
        );
        Ok(Self { n, root })
    }

    #[inline]
    pub const fn n(&self) -> usize {
        self.n
    }

    /// `x <- V x` or `x <- V^T x`.
    pub fn mul(&self, t: Transpose, x: &mut [F]) {
        assert_eq!(x.len(), self.n, "vector length does not match the plan size");
        self.root.mul(t, x);
    }

    /// `x <- V^{-1} x` or `x <- V^{-T} x`.
    pub fn solve(&self, t: Transpose, x: &mut [F]) {
        assert_eq!(x.len(), self.n, "vector length does not match the plan size");
        self.root.solve(t, x);
    }
}

impl<F: Real> Node<F> {
    fn build(
        pencil: &ConnectionPencil<F>,
        lo: usize,
        hi: usize,
        depth: usize,
        config: &FmmConfig,
        stats: &mut BuildStats,
    ) -> PlanResult<Self> {
        stats.depth = stats.depth.max(depth);
        let n = hi - lo;
        if n <= config.leaf_size {
            stats.leaves += 1;
            return Ok(Self::Leaf(EigenBlock::new(pencil, lo, hi)?));
        }

        let n1 = n / 2;
        let n2 = n - n1;
        let mid = lo + n1;
        let left = Self::build(pencil, lo, mid, depth + 1, config, stats)?;
        let right = Self::build(pencil, mid, hi, depth + 1, config, stats)?;
        let bb = pencil.bandwidth().min(n1).min(n2);

        // Leading rows of V2, as rows: V2^T e_t.
        let mut rows_v2 = Vec::with_capacity(bb);
        for t in 0..bb {
            let mut e = try_zeroed_vec(n2)?;
            e[t] = F::one();
            right.mul(Transpose::Transpose, &mut e);
            rows_v2.push(e);
        }

        let mut g = Vec::with_capacity(bb);
        for r in 0..bb {
            let i = mid - bb + r;
            let mut row = try_zeroed_vec(n2)?;
            for (t, v2t) in rows_v2.iter().enumerate() {
                let (bit, ait) = (pencil.b.get(i, mid + t), pencil.a.get(i, mid + t));
                if bit == F::zero() && ait == F::zero() {
                    continue;
                }
                for (j, gj) in row.iter_mut().enumerate() {
                    *gj += (bit * pencil.lambda[mid + j] - ait) * v2t[j];
                }
            }
            g.push(row);
        }

        let mut u = Vec::with_capacity(bb);
        for r in 0..bb {
            let mut col = try_zeroed_vec(n1)?;
            col[n1 - bb + r] = F::one();
            pencil.b.tbsv_block(lo, &mut col);
            left.solve(Transpose::NoTranspose, &mut col);
            u.push(col);
        }

        let kernel = CauchyBlock::new(
            &pencil.lambda[lo..mid],
            &pencil.lambda[mid..hi],
            (0, n1),
            (0, n2),
            config,
            &mut stats.cauchy,
        )?;

        Ok(Self::Split(Box::new(SplitNode {
            n1,
            left,
            right,
            u,
            g,
            kernel,
        })))
    }

    fn mul(&self, t: Transpose, x: &mut [F]) {
        match self {
            Self::Leaf(block) => block.mul(t, x),
            Self::Split(node) => {
                let (x1, x2) = x.split_at_mut(node.n1);
                match t {
                    Transpose::NoTranspose => {
                        node.couple(x2, x1, F::one());
                        node.left.mul(t, x1);
                        node.right.mul(t, x2);
                    }
                    Transpose::Transpose => {
                        node.left.mul(t, x1);
                        node.right.mul(t, x2);
                        node.couple_transpose(x1, x2, F::one());
                    }
                }
            }
        }
    }

    fn solve(&self, t: Transpose, x: &mut [F]) {
        match self {
            Self::Leaf(block) => block.solve(t, x),
            Self::Split(node) => {
                let (x1, x2) = x.split_at_mut(node.n1);
                match t {
                    Transpose::NoTranspose => {
                        node.right.solve(t, x2);
                        node.left.solve(t, x1);
                        node.couple(x2, x1, -F::one());
                    }
                    Transpose::Transpose => {
                        node.couple_transpose(x1, x2, -F::one());
                        node.left.solve(t, x1);
                        node.right.solve(t, x2);
                    }
                }
            }
        }
    }
}

impl<F: Real> SplitNode<F> {
    /// `y1 += sign * X x2`.
    fn couple(&self, x2: &[F], y1: &mut [F], sign: F) {
        let mut z = vec![F::zero(); x2.len()];
        let mut w = vec![F::zero(); y1.len()];
        for (uk, gk) in self.u.iter().zip(&self.g) {
            for ((zj, &gj), &xj) in z.iter_mut().zip(gk).zip(x2) {
                *zj = gj * xj;
            }
            w.fill(F::zero());
            self.kernel.apply(&z, &mut w);
            for ((yi, &ui), &wi) in y1.iter_mut().zip(uk).zip(&w) {
                *yi += sign * ui * wi;
            }
        }
    }

    /// `y2 += sign * X^T x1`.
    fn couple_transpose(&self, x1: &[F], y2: &mut [F], sign: F) {
        let mut z = vec![F::zero(); x1.len()];
        let mut w = vec![F::zero(); y2.len()];
        for (uk, gk) in self.u.iter().zip(&self.g) {
            for ((zi, &ui), &xi) in z.iter_mut().zip(uk).zip(x1) {
                *zi = ui * xi;
            }
            w.fill(F::zero());
            self.kernel.apply_transpose(&z, &mut w);
            for ((yj, &gj), &wj) in y2.iter_mut().zip(gk).zip(&w) {
                *yj += sign * gj * wj;
            }
        }
    }
}
