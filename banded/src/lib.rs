//! Fast connection-coefficient transforms between 1D orthogonal polynomial families.
//!
//! The connection matrix `V` whose columns express the source polynomials in the target
//! basis is upper triangular and, for the classical families, is the eigenvector matrix
//! of an upper-triangular banded pencil `A V = B V Λ`. [`TbEigenFmm`] factors `V` by
//! divide and conquer: the off-diagonal block of every split is a low-rank product
//! through a Cauchy kernel `1 / (λ_i - λ_j)`, which is itself applied hierarchically.
//! [`ConnectionPlan`] wraps the factorization with the diagonal scalings that select
//! standard or orthonormal polynomials.

mod cauchy;
mod config;
mod eigen;
mod family;
mod fmm;
mod pencil;
mod plan;

// Activate the `test-utils` feature to use the dense oracles outside this crate's tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod reference;

pub use config::*;
pub use family::*;
pub use fmm::*;
pub use pencil::*;
pub use plan::*;
