use core::array;
use core::fmt::Debug;
use core::ops::{Add, Mul, Neg, Sub};

use crate::Real;

/// A fixed number of independent scalar lanes processed together.
///
/// Every operation acts lane-wise with the scalar arithmetic of `Self::Scalar`, so a
/// computation carried out on packed lanes is bit-identical to the same computation
/// carried out lane by lane.
pub trait PackedReal:
    'static
    + Copy
    + Send
    + Sync
    + Default
    + Debug
    + From<Self::Scalar>
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Neg<Output = Self>
    + Mul<Self::Scalar, Output = Self>
{
    type Scalar: Real;

    const WIDTH: usize;

    /// Similar to `core:array::from_fn`.
    fn from_fn<G>(f: G) -> Self
    where
        G: FnMut(usize) -> Self::Scalar;

    fn as_slice(&self) -> &[Self::Scalar];
    fn as_slice_mut(&mut self) -> &mut [Self::Scalar];
}

macro_rules! impl_scalar_packing {
    ($t:ty) => {
        impl PackedReal for $t {
            type Scalar = $t;

            const WIDTH: usize = 1;

            #[inline(always)]
            fn from_fn<G>(mut f: G) -> Self
            where
                G: FnMut(usize) -> Self::Scalar,
            {
                f(0)
            }

            #[inline(always)]
            fn as_slice(&self) -> &[Self::Scalar] {
                core::slice::from_ref(self)
            }

            #[inline(always)]
            fn as_slice_mut(&mut self) -> &mut [Self::Scalar] {
                core::slice::from_mut(self)
            }
        }
    };
}

impl_scalar_packing!(f32);
impl_scalar_packing!(f64);

/// `W` scalars operated on in lock step.
///
/// The lane loops below are straight-line array code which the compiler lowers to
/// the vector registers of the target (two `f64` lanes per SSE2/NEON register, four
/// per AVX register, eight per AVX-512 register).
#[derive(Copy, Clone, Debug, PartialEq)]
#[repr(transparent)]
pub struct PackedLanes<F, const W: usize>(pub [F; W]);

impl<F: Real, const W: usize> Default for PackedLanes<F, W> {
    #[inline(always)]
    fn default() -> Self {
        Self([F::zero(); W])
    }
}

impl<F: Real, const W: usize> From<F> for PackedLanes<F, W> {
    #[inline(always)]
    fn from(value: F) -> Self {
        Self([value; W])
    }
}

impl<F: Real, const W: usize> Add for PackedLanes<F, W> {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] + rhs.0[i]))
    }
}

impl<F: Real, const W: usize> Sub for PackedLanes<F, W> {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] - rhs.0[i]))
    }
}

impl<F: Real, const W: usize> Mul for PackedLanes<F, W> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        Self(array::from_fn(|i| self.0[i] * rhs.0[i]))
    }
}

impl<F: Real, const W: usize> Mul<F> for PackedLanes<F, W> {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: F) -> Self {
        Self(array::from_fn(|i| self.0[i] * rhs))
    }
}

impl<F: Real, const W: usize> Neg for PackedLanes<F, W> {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self(array::from_fn(|i| -self.0[i]))
    }
}

impl<F: Real, const W: usize> PackedReal for PackedLanes<F, W> {
    type Scalar = F;

    const WIDTH: usize = W;

    #[inline(always)]
    fn from_fn<G>(f: G) -> Self
    where
        G: FnMut(usize) -> F,
    {
        Self(array::from_fn(f))
    }

    #[inline(always)]
    fn as_slice(&self) -> &[F] {
        &self.0
    }

    #[inline(always)]
    fn as_slice_mut(&mut self) -> &mut [F] {
        &mut self.0
    }
}
