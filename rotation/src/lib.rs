//! Givens rotation cascades for multivariate orthogonal polynomial bases.
//!
//! A harmonic of order `m` on the sphere, triangle, disk or tetrahedron factors into a
//! univariate Jacobi polynomial whose parameters grow with `m`. Each rotation sweep
//! lowers the order by one step while keeping the basis orthonormal, so a cascade of
//! sweeps takes every order-slice down to the order-0/1 representation (`hi2lo`) and
//! the transposed cascade takes it back (`lo2hi`).

mod driver;
mod kernel;
mod layout;
mod plan;
mod spin;

pub use driver::*;
pub use kernel::*;
pub use layout::*;
pub use plan::*;
pub use spin::*;
