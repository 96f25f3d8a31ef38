//! Matrix library.

pub mod banded;
pub mod dense;
pub mod norms;
pub mod tensor;

pub trait Matrix<T> {
    fn width(&self) -> usize;
    fn height(&self) -> usize;

    fn get(&self, r: usize, c: usize) -> T;
}
