//! The grid transform adapter: moves between coefficient arrays and samples on a fixed
//! physical grid.

mod dct;
mod naive;
mod traits;

pub use dct::*;
pub use naive::*;
pub use traits::*;
