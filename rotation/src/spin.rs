use std::collections::BTreeMap;

use ft_field::Real;
use ft_util::{PlanError, PlanResult, as_i64, try_zeroed_vec};
use tracing::{debug, instrument};

use crate::plan::{jacobi_angle, sphere_angle};
use crate::{Cascade, SweepRef};

/// A single lowering step of a spin-weighted order-slice.
///
/// A slice of order `m` and spin `s` is spanned by
/// `(1 - x)^(a/2) (1 + x)^(b/2) p̃_l^(a,b)(x)` with `a = |m + s|` and `b = |m - s|`.
/// Steps lower `a` or `b` by two until they agree, then lower both together.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SpinStep {
    /// `(to + 2, beta) -> (to, beta)`.
    Alpha { beta: usize, to: usize },
    /// `(alpha, to + 2) -> (alpha, to)`.
    Beta { alpha: usize, to: usize },
    /// `(to + 2, to + 2) -> (to, to)`; identical to the spherical sweep.
    Symmetric { to: usize },
}

impl SpinStep {
    fn stride(self) -> usize {
        match self {
            Self::Alpha { .. } | Self::Beta { .. } => 1,
            Self::Symmetric { .. } => 2,
        }
    }

    fn count(self, n: usize) -> usize {
        match self {
            Self::Alpha { beta: b, to: a } | Self::Beta { alpha: a, to: b } => {
                n - (a + b) / 2 - 1
            }
            Self::Symmetric { to } => n - to - 2,
        }
    }

    fn angle(self, l: usize) -> (f64, f64) {
        match self {
            Self::Alpha { beta, to } => jacobi_angle(l, to as f64, beta as f64),
            Self::Beta { alpha, to } => {
                let (s, c) = jacobi_angle(l, to as f64, alpha as f64);
                (-s, c)
            }
            Self::Symmetric { to } => sphere_angle(l, to),
        }
    }
}

/// The Jacobi parameters `(a, b)` of a spin-weighted order-slice.
#[must_use]
pub const fn spin_parameters(m: i64, s: i64) -> (usize, usize) {
    ((m + s).unsigned_abs() as usize, (m - s).unsigned_abs() as usize)
}

/// The lowering steps of order `m` under spin `s`, in the order `hi2lo` applies them.
pub fn spin_steps(m: i64, s: i64) -> Vec<SpinStep> {
    let (mut a, mut b) = spin_parameters(m, s);
    let mut steps = Vec::with_capacity((a.max(b)) / 2);
    while a > b {
        a -= 2;
        steps.push(SpinStep::Alpha { beta: b, to: a });
    }
    while b > a {
        b -= 2;
        steps.push(SpinStep::Beta { alpha: a, to: b });
    }
    while a >= 2 {
        a -= 2;
        steps.push(SpinStep::Symmetric { to: a });
    }
    steps
}

/// Rotations for spin-weighted spherical harmonics of spin `s`, orders `|m| < n`.
///
/// Every distinct [`SpinStep`] needed by some order is stored once; its sweep id is the
/// rank of the step in the key map.
#[derive(Clone, Debug)]
pub struct SpinRotationPlan<F> {
    n: usize,
    spin: i64,
    ids: BTreeMap<SpinStep, usize>,
    strides: Vec<usize>,
    offsets: Vec<usize>,
    s: Vec<F>,
    c: Vec<F>,
}

impl<F: Real> SpinRotationPlan<F> {
    #[instrument(skip_all, fields(n = n, spin = spin, precision = F::NAME))]
    pub fn new(n: usize, spin: i64) -> PlanResult<Self> {
        if n > 0 && spin.unsigned_abs() >= n as u64 {
            return Err(PlanError::invalid_size(
                "spin",
                spin,
                "spin weight must satisfy |s| < n",
            ));
        }
        if n == 0 && spin != 0 {
            return Err(PlanError::invalid_size(
                "spin",
                spin,
                "an empty plan only carries spin 0",
            ));
        }
        let max_order = as_i64(n) - 1;

        let mut ids = BTreeMap::new();
        for m in -max_order..=max_order {
            for step in spin_steps(m, spin) {
                ids.insert(step, 0);
            }
        }
        for (id, slot) in ids.values_mut().enumerate() {
            *slot = id;
        }

        let mut strides = try_zeroed_vec::<usize>(ids.len())?;
        let mut offsets = try_zeroed_vec::<usize>(ids.len() + 1)?;
        for (&step, &id) in &ids {
            strides[id] = step.stride();
            offsets[id + 1] = offsets[id] + step.count(n);
        }
        let total = offsets[ids.len()];
        let mut s = try_zeroed_vec::<F>(total)?;
        let mut c = try_zeroed_vec::<F>(total)?;
        for (&step, &id) in &ids {
            for (l, t) in (offsets[id]..offsets[id + 1]).enumerate() {
                let (sl, cl) = step.angle(l);
                s[t] = F::cast(sl);
                c[t] = F::cast(cl);
            }
        }
        debug!(sweeps = ids.len(), rotations = total, "built spin rotation plan");

        Ok(Self {
            n,
            spin,
            ids,
            strides,
            offsets,
            s,
            c,
        })
    }

    #[inline]
    pub const fn spin(&self) -> i64 {
        self.spin
    }

    pub fn sweep_id(&self, step: SpinStep) -> Option<usize> {
        self.ids.get(&step).copied()
    }

    pub fn sweep_for(&self, step: SpinStep) -> Option<SweepRef<'_, F>> {
        self.sweep_id(step).map(|id| self.sweep(id))
    }

    /// Sweep ids of order `m`, in `hi2lo` order.
    pub(crate) fn chain(&self, m: i64) -> Vec<usize> {
        spin_steps(m, self.spin)
            .into_iter()
            .filter_map(|step| self.sweep_id(step))
            .collect()
    }
}

impl<F: Real> Cascade<F> for SpinRotationPlan<F> {
    #[inline]
    fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn num_sweeps(&self) -> usize {
        self.strides.len()
    }

    #[inline]
    fn sweep(&self, id: usize) -> SweepRef<'_, F> {
        let range = self.offsets[id]..self.offsets[id + 1];
        SweepRef {
            stride: self.strides[id],
            s: &self.s[range.clone()],
            c: &self.c[range],
        }
    }
}
