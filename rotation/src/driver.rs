use ft_field::{ExecutionConfig, PackedReal, Real, SimdWidth, WidthVisitor};
use ft_matrix::dense::ColMajorMatrix;
use ft_matrix::tensor::Tensor3;
use ft_maybe_rayon::prelude::*;
use itertools::Itertools;
use tracing::{instrument, trace};

use crate::{
    Cascade, CascadeDirection, Layout, RotationDomain, RotationPlan, SpinRotationPlan,
    apply_sweep,
};

/// One order-slice as seen by the cascade: where it lives and which sweeps lower it.
#[derive(Clone, Debug)]
struct Lane {
    offset: usize,
    stride: usize,
    /// Valid entries in the harmonic representation.
    hi_len: usize,
    /// Valid entries once lowered.
    lo_len: usize,
    /// Sweep ids in `hi2lo` order.
    chain: Vec<usize>,
}

struct Batch<'a> {
    width: SimdWidth,
    lanes: Vec<&'a Lane>,
}

/// Converts a spherical harmonic array between its order-`m` columns and the
/// order-0/1 representation. See [`Layout::Sphere`].
#[instrument(skip_all, fields(n = plan.n(), direction = ?direction))]
pub fn execute_sph<F: Real>(
    plan: &RotationPlan<F>,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    assert!(matches!(plan.domain(), RotationDomain::Sphere));
    execute_layout(plan, Layout::Sphere, data, direction, config, |m| {
        parity_chain(m as usize)
    });
}

/// Converts one tangential component of a vector field between its order-`m` columns
/// and the representation where odd orders sit at 1 and even orders at 2. Uses the
/// sphere rotations unchanged. See [`Layout::VectorSphere`].
#[instrument(skip_all, fields(n = plan.n(), direction = ?direction))]
pub fn execute_sphv<F: Real>(
    plan: &RotationPlan<F>,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    assert!(matches!(plan.domain(), RotationDomain::Sphere));
    execute_layout(plan, Layout::VectorSphere, data, direction, config, |m| {
        vector_chain(m as usize)
    });
}

/// Triangle counterpart of [`execute_sph`]. See [`Layout::Triangle`].
#[instrument(skip_all, fields(n = plan.n(), direction = ?direction))]
pub fn execute_tri<F: Real>(
    plan: &RotationPlan<F>,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    assert!(matches!(plan.domain(), RotationDomain::Triangle { .. }));
    execute_layout(plan, Layout::Triangle, data, direction, config, |m| {
        (0..m as usize).rev().collect()
    });
}

/// Disk counterpart of [`execute_sph`]. See [`Layout::Disk`].
#[instrument(skip_all, fields(n = plan.n(), direction = ?direction))]
pub fn execute_disk<F: Real>(
    plan: &RotationPlan<F>,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    assert!(matches!(plan.domain(), RotationDomain::Disk));
    execute_layout(plan, Layout::Disk, data, direction, config, |k| {
        parity_chain(k as usize)
    });
}

/// Spin-weighted counterpart of [`execute_sph`]. See [`Layout::SpinSphere`].
#[instrument(skip_all, fields(n = plan.n(), spin = plan.spin(), direction = ?direction))]
pub fn execute_spinsph<F: Real>(
    plan: &SpinRotationPlan<F>,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    let layout = Layout::SpinSphere { spin: plan.spin() };
    execute_layout(plan, layout, data, direction, config, |m| plan.chain(m));
}

/// Converts a tetrahedral harmonic array, `i + n (j + n k)` holding degree `i` in `x`,
/// `j` in `y` and `k` in `z`, to the representation where the `x` and `y` factors no
/// longer depend on the outer degrees.
///
/// `rp1` must be `RotationPlan::triangle(n, α, β, γ + δ + 1)` and `rp2`
/// `RotationPlan::triangle(n, β, γ, δ)`.
#[instrument(skip_all, fields(n = rp1.n(), direction = ?direction))]
pub fn execute_tet<F: Real>(
    rp1: &RotationPlan<F>,
    rp2: &RotationPlan<F>,
    data: &mut Tensor3<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    assert!(matches!(rp1.domain(), RotationDomain::Triangle { .. }));
    assert!(matches!(rp2.domain(), RotationDomain::Triangle { .. }));
    let n = rp1.n();
    assert_eq!(rp2.n(), n, "rotation plans of different sizes");
    assert_eq!(data.dims, [n, n, n], "tetrahedral array must be n x n x n");

    // Lower the x factor of every (j, k) line from order j + k.
    let outer: Vec<Lane> = (0..n)
        .flat_map(|k| (0..n - k).map(move |j| (j, k)))
        .filter(|&(j, k)| j + k > 0)
        .map(|(j, k)| Lane {
            offset: n * (j + n * k),
            stride: 1,
            hi_len: n - j - k,
            lo_len: n,
            chain: (0..j + k).rev().collect(),
        })
        .collect();
    // Then the y factor of every (i, k) line from order k.
    let inner: Vec<Lane> = (1..n)
        .flat_map(|k| (0..n).map(move |i| (i, k)))
        .map(|(i, k)| Lane {
            offset: i + n * n * k,
            stride: n,
            hi_len: n - k,
            lo_len: n,
            chain: (0..k).rev().collect(),
        })
        .collect();

    match direction {
        CascadeDirection::Hi2Lo => {
            run_cascade(rp1, &outer, &mut data.values, direction, config);
            run_cascade(rp2, &inner, &mut data.values, direction, config);
        }
        CascadeDirection::Lo2Hi => {
            run_cascade(rp2, &inner, &mut data.values, direction, config);
            run_cascade(rp1, &outer, &mut data.values, direction, config);
        }
    }
}

/// `m - 2, m - 4, ...` down to the parity of `m`.
fn parity_chain(m: usize) -> Vec<usize> {
    (m % 2..m.saturating_sub(1)).step_by(2).rev().collect()
}

/// `m - 2, m - 4, ...` down to 1 for odd `m` and 2 for even `m`.
fn vector_chain(m: usize) -> Vec<usize> {
    (2 - m % 2..m.saturating_sub(1)).step_by(2).rev().collect()
}

fn execute_layout<F, C, G>(
    cascade: &C,
    layout: Layout,
    data: &mut ColMajorMatrix<F>,
    direction: CascadeDirection,
    config: &ExecutionConfig,
    chain: G,
) where
    F: Real,
    C: Cascade<F>,
    G: Fn(i64) -> Vec<usize>,
{
    let n = cascade.n();
    assert_eq!(data.height, n, "coefficient array must have n rows");
    assert_eq!(
        data.width(),
        layout.width(n),
        "coefficient array has the wrong number of order-slices"
    );
    let lanes: Vec<Lane> = (0..layout.width(n))
        .filter_map(|col| {
            let chain = chain(layout.column_order(col));
            (!chain.is_empty()).then(|| Lane {
                offset: col * n,
                stride: 1,
                hi_len: layout.column_len(n, col),
                lo_len: layout.low_column_len(n, col),
                chain,
            })
        })
        .collect();
    run_cascade(cascade, &lanes, &mut data.values, direction, config);
}

/// Groups lanes by their final sweep and packs each group into batches of the widest
/// width that still fits, narrowing for the remainder.
fn schedule(lanes: &[Lane], width: SimdWidth) -> Vec<Batch<'_>> {
    let mut batches = Vec::new();
    let classes = lanes
        .iter()
        .sorted_by_key(|lane| (lane.chain.last().copied(), lane.chain.len()))
        .chunk_by(|lane| lane.chain.last().copied());
    for (_, class) in &classes {
        let mut class = class.collect::<Vec<_>>().into_iter().peekable();
        while class.peek().is_some() {
            let w = width.fit(class.len());
            batches.push(Batch {
                width: w,
                lanes: class.by_ref().take(w.lanes()).collect(),
            });
        }
    }
    batches
}

fn run_cascade<F: Real, C: Cascade<F>>(
    cascade: &C,
    lanes: &[Lane],
    data: &mut [F],
    direction: CascadeDirection,
    config: &ExecutionConfig,
) {
    if lanes.is_empty() {
        return;
    }
    let batches = schedule(lanes, config.width::<F>());
    let view: &[F] = data;
    let results: Vec<Vec<Vec<F>>> = ft_maybe_rayon::with_threads(config.threads, || {
        batches
            .par_iter()
            .map(|batch| {
                batch.width.dispatch::<F, _>(BatchRun {
                    cascade,
                    lanes: &batch.lanes,
                    data: view,
                    direction,
                })
            })
            .collect()
    });

    for (batch, cols) in batches.iter().zip(results) {
        for (lane, col) in batch.lanes.iter().zip(cols) {
            for (r, v) in col.into_iter().enumerate() {
                data[lane.offset + r * lane.stride] = v;
            }
        }
    }
}

struct BatchRun<'a, F, C> {
    cascade: &'a C,
    lanes: &'a [&'a Lane],
    data: &'a [F],
    direction: CascadeDirection,
}

impl<F: Real, C: Cascade<F>> WidthVisitor<F> for BatchRun<'_, F, C> {
    type Output = Vec<Vec<F>>;

    fn visit<P: PackedReal<Scalar = F>>(self) -> Vec<Vec<F>> {
        run_batch::<F, P, C>(self.cascade, self.lanes, self.data, self.direction)
    }
}

/// Runs the sweeps of up to `P::WIDTH` lanes.
///
/// Sweeps shared by every lane (a common tail of their chains) run packed; the rest run
/// lane by lane with the scalar kernel. Since packed arithmetic is lane-wise, the result
/// does not depend on how lanes were batched. Returns the first `lo_len` entries of
/// every lane.
fn run_batch<F: Real, P: PackedReal<Scalar = F>, C: Cascade<F>>(
    cascade: &C,
    lanes: &[&Lane],
    data: &[F],
    direction: CascadeDirection,
) -> Vec<Vec<F>> {
    debug_assert!(lanes.len() <= P::WIDTH);
    let len = lanes.iter().map(|lane| lane.lo_len).max().unwrap_or(0);
    let shared = shared_suffix(lanes);
    trace!(width = P::WIDTH, lanes = lanes.len(), shared, "rotation batch");

    let mut cols: Vec<Vec<F>> = lanes
        .iter()
        .map(|lane| {
            let mut col = vec![F::zero(); len];
            let read = match direction {
                CascadeDirection::Hi2Lo => lane.hi_len,
                CascadeDirection::Lo2Hi => lane.lo_len,
            };
            for (r, v) in col[..read].iter_mut().enumerate() {
                *v = data[lane.offset + r * lane.stride];
            }
            col
        })
        .collect();

    match direction {
        CascadeDirection::Hi2Lo => {
            for (lane, col) in lanes.iter().zip(&mut cols) {
                for &id in &lane.chain[..lane.chain.len() - shared] {
                    apply_sweep::<F>(cascade.sweep(id), col, direction);
                }
            }
            run_shared::<F, P, C>(cascade, lanes, &mut cols, shared, direction);
        }
        CascadeDirection::Lo2Hi => {
            run_shared::<F, P, C>(cascade, lanes, &mut cols, shared, direction);
            for (lane, col) in lanes.iter().zip(&mut cols) {
                for &id in lane.chain[..lane.chain.len() - shared].iter().rev() {
                    apply_sweep::<F>(cascade.sweep(id), col, direction);
                }
                col[lane.hi_len..].fill(F::zero());
            }
        }
    }

    for (lane, col) in lanes.iter().zip(&mut cols) {
        col.truncate(lane.lo_len);
    }
    cols
}

/// Length of the longest common tail of the lanes' chains.
fn shared_suffix(lanes: &[&Lane]) -> usize {
    let Some((first, rest)) = lanes.split_first() else {
        return 0;
    };
    let mut shared = first.chain.len();
    for lane in rest {
        shared = first
            .chain
            .iter()
            .rev()
            .zip(lane.chain.iter().rev())
            .take(shared)
            .take_while(|(a, b)| a == b)
            .count();
    }
    shared
}

fn run_shared<F: Real, P: PackedReal<Scalar = F>, C: Cascade<F>>(
    cascade: &C,
    lanes: &[&Lane],
    cols: &mut [Vec<F>],
    shared: usize,
    direction: CascadeDirection,
) {
    if shared == 0 {
        return;
    }
    let chain = &lanes[0].chain;
    let tail = &chain[chain.len() - shared..];
    let len = cols.first().map_or(0, Vec::len);
    let mut packed: Vec<P> = (0..len)
        .map(|r| P::from_fn(|q| cols.get(q).map_or(F::zero(), |col| col[r])))
        .collect();
    match direction {
        CascadeDirection::Hi2Lo => {
            for &id in tail {
                apply_sweep(cascade.sweep(id), &mut packed, direction);
            }
        }
        CascadeDirection::Lo2Hi => {
            for &id in tail.iter().rev() {
                apply_sweep(cascade.sweep(id), &mut packed, direction);
            }
        }
    }
    for (r, p) in packed.iter().enumerate() {
        for (col, &v) in cols.iter_mut().zip(p.as_slice()) {
            col[r] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(chain: Vec<usize>) -> Lane {
        Lane {
            offset: 0,
            stride: 1,
            hi_len: 1,
            lo_len: 1,
            chain,
        }
    }

    #[test]
    fn parity_chains() {
        assert_eq!(parity_chain(0), Vec::<usize>::new());
        assert_eq!(parity_chain(1), Vec::<usize>::new());
        assert_eq!(parity_chain(2), [0]);
        assert_eq!(parity_chain(5), [3, 1]);
        assert_eq!(parity_chain(6), [4, 2, 0]);
    }

    #[test]
    fn vector_chains_stop_above_zero() {
        for m in 0..3 {
            assert!(vector_chain(m).is_empty());
        }
        assert_eq!(vector_chain(3), [1]);
        assert_eq!(vector_chain(5), [3, 1]);
        assert_eq!(vector_chain(6), [4, 2]);
    }

    #[test]
    fn shared_suffix_is_common_tail() {
        let (a, b, c) = (lane(vec![4, 2, 0]), lane(vec![2, 0]), lane(vec![6, 4, 2, 0]));
        assert_eq!(shared_suffix(&[&a, &b, &c]), 2);
        assert_eq!(shared_suffix(&[&a, &c]), 3);
        let d = lane(vec![3, 1]);
        assert_eq!(shared_suffix(&[&a, &d]), 0);
        assert_eq!(shared_suffix(&[]), 0);
    }

    #[test]
    fn schedule_covers_every_lane_once() {
        let lanes: Vec<Lane> = (2..21).map(parity_chain).map(lane).collect();
        for width in SimdWidth::ALL {
            let batches = schedule(&lanes, width);
            let total: usize = batches.iter().map(|b| b.lanes.len()).sum();
            assert_eq!(total, lanes.len());
            for batch in &batches {
                assert_eq!(batch.lanes.len(), batch.width.lanes());
                assert!(batch.width <= width);
                let last = batch.lanes[0].chain.last();
                assert!(batch.lanes.iter().all(|l| l.chain.last() == last));
            }
        }
    }
}
