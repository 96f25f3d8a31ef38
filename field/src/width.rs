use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{PackedLanes, PackedReal, Real};

/// Number of order-slices a rotation kernel processes at once.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SimdWidth {
    X1,
    X2,
    X4,
    X8,
}

/// A computation that is generic over the packing it runs on.
///
/// [`SimdWidth::dispatch`] picks the concrete packing at runtime and monomorphises the
/// visitor for it.
pub trait WidthVisitor<F: Real> {
    type Output;

    fn visit<P: PackedReal<Scalar = F>>(self) -> Self::Output;
}

impl SimdWidth {
    pub const ALL: [Self; 4] = [Self::X1, Self::X2, Self::X4, Self::X8];

    #[must_use]
    pub const fn lanes(self) -> usize {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X4 => 4,
            Self::X8 => 8,
        }
    }

    /// The width with exactly `lanes` lanes, if there is one.
    #[must_use]
    pub const fn from_lanes(lanes: usize) -> Option<Self> {
        match lanes {
            1 => Some(Self::X1),
            2 => Some(Self::X2),
            4 => Some(Self::X4),
            8 => Some(Self::X8),
            _ => None,
        }
    }

    /// The widest width with at most `lanes` lanes that does not exceed `self`.
    #[must_use]
    pub fn fit(self, lanes: usize) -> Self {
        Self::ALL
            .into_iter()
            .rev()
            .find(|w| *w <= self && w.lanes() <= lanes)
            .unwrap_or(Self::X1)
    }

    /// The widest kernel the running CPU executes natively for scalars of type `F`.
    ///
    /// The vector register size is detected once per process; the lane count is that
    /// size divided by the scalar size, so `f32` runs twice as many lanes as `f64`.
    pub fn detect<F: Real>() -> Self {
        Self::for_register(register_bytes(), size_of::<F>())
    }

    /// The widest width whose lanes of `scalar_bytes` fit in a `register_bytes` register.
    #[must_use]
    pub fn for_register(register_bytes: usize, scalar_bytes: usize) -> Self {
        Self::X8.fit(register_bytes / scalar_bytes.max(1))
    }

    /// Runs `visitor` on the packing that matches this width.
    pub fn dispatch<F: Real, V: WidthVisitor<F>>(self, visitor: V) -> V::Output {
        match self {
            Self::X1 => visitor.visit::<F>(),
            Self::X2 => visitor.visit::<PackedLanes<F, 2>>(),
            Self::X4 => visitor.visit::<PackedLanes<F, 4>>(),
            Self::X8 => visitor.visit::<PackedLanes<F, 8>>(),
        }
    }
}

fn register_bytes() -> usize {
    static DETECTED: OnceLock<usize> = OnceLock::new();
    *DETECTED.get_or_init(|| {
        let bytes = register_bytes_uncached();
        debug!(bytes, "detected SIMD register size");
        bytes
    })
}

#[cfg(target_arch = "x86_64")]
fn register_bytes_uncached() -> usize {
    if std::arch::is_x86_feature_detected!("avx512f") {
        64
    } else if std::arch::is_x86_feature_detected!("avx") {
        32
    } else if std::arch::is_x86_feature_detected!("sse2") {
        16
    } else {
        8
    }
}

#[cfg(target_arch = "aarch64")]
fn register_bytes_uncached() -> usize {
    if std::arch::is_aarch64_feature_detected!("neon") {
        16
    } else {
        8
    }
}

#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
fn register_bytes_uncached() -> usize {
    8
}
