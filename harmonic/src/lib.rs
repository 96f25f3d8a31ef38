//! Harmonic transforms on the sphere, triangle, disk and tetrahedron.
//!
//! Each plan composes a rotation cascade, which lowers every order-slice to a common
//! low order, with banded connection plans that convert the lowered slices to
//! Chebyshev or Fourier coefficients. Both stages are orthogonal or triangular, so
//! analysis is the exact inverse of synthesis up to rounding.

mod plan;
mod tetrahedron;

pub use plan::*;
pub use tetrahedron::*;
