use ft_field::PackedReal;
use serde::{Deserialize, Serialize};

use crate::SweepRef;

/// Which way a rotation cascade runs.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CascadeDirection {
    /// Lower every order-slice to the order-0/1 representation.
    Hi2Lo,
    /// The transpose (and inverse) of [`CascadeDirection::Hi2Lo`].
    Lo2Hi,
}

/// Applies one sweep to `P::WIDTH` order-slices stored lane-wise in `v`.
///
/// `hi2lo` runs the rotations from the highest degree down; `lo2hi` undoes them in the
/// opposite order. Only `v[..sweep.span()]` is touched.
#[inline]
pub fn apply_sweep<P: PackedReal>(
    sweep: SweepRef<'_, P::Scalar>,
    v: &mut [P],
    direction: CascadeDirection,
) {
    match direction {
        CascadeDirection::Hi2Lo => hi2lo(sweep, v),
        CascadeDirection::Lo2Hi => lo2hi(sweep, v),
    }
}

#[inline]
fn hi2lo<P: PackedReal>(sweep: SweepRef<'_, P::Scalar>, v: &mut [P]) {
    let d = sweep.stride;
    assert!(v.len() >= sweep.span());
    for l in (0..sweep.len()).rev() {
        let (s, c) = (sweep.s[l], sweep.c[l]);
        let (a1, a2) = (v[l], v[l + d]);
        v[l] = a1 * c + a2 * s;
        v[l + d] = a2 * c - a1 * s;
    }
}

#[inline]
fn lo2hi<P: PackedReal>(sweep: SweepRef<'_, P::Scalar>, v: &mut [P]) {
    let d = sweep.stride;
    assert!(v.len() >= sweep.span());
    for l in 0..sweep.len() {
        let (s, c) = (sweep.s[l], sweep.c[l]);
        let (a1, a2) = (v[l], v[l + d]);
        v[l] = a1 * c - a2 * s;
        v[l + d] = a2 * c + a1 * s;
    }
}
