//! Scalar and packed floating-point types used by every transform in the workspace.

mod config;
mod packed;
mod real;
mod width;

pub use config::*;
pub use packed::*;
pub use real::*;
pub use width::*;
