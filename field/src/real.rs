use core::fmt::{Debug, Display};
use core::iter::Sum;

use num_traits::{Float, FloatConst, NumAssign};

use crate::PackedReal;

/// A real floating-point scalar in which plans are built and executed.
///
/// All algorithms are written once against this trait and instantiated for
/// `f32` and `f64`. Every scalar is also its own width-one packing.
pub trait Real:
    Float
    + FloatConst
    + NumAssign
    + Sum
    + Default
    + Debug
    + Display
    + Send
    + Sync
    + PackedReal<Scalar = Self>
    + 'static
{
    /// Short name used in log fields.
    const NAME: &'static str;

    /// Rounds an `f64` to this precision.
    fn cast(x: f64) -> Self;

    /// Widens to `f64`.
    fn as_f64(self) -> f64;

    #[inline]
    fn from_usize(n: usize) -> Self {
        Self::cast(n as f64)
    }
}

macro_rules! impl_real {
    ($t:ty) => {
        impl Real for $t {
            const NAME: &'static str = stringify!($t);

            #[inline(always)]
            fn cast(x: f64) -> Self {
                x as $t
            }

            #[inline(always)]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_real!(f32);
impl_real!(f64);
