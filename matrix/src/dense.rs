use ft_maybe_rayon::prelude::*;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};

use crate::Matrix;

/// A dense matrix stored in column-major form.
///
/// Harmonic coefficient arrays use this layout: one column per order-slice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColMajorMatrix<T> {
    /// All values, stored in column-major order.
    pub values: Vec<T>,
    pub height: usize,
}

impl<T> ColMajorMatrix<T> {
    #[must_use]
    pub fn new(values: Vec<T>, height: usize) -> Self {
        debug_assert!((height == 0 && values.is_empty()) || values.len() % height == 0);
        Self { values, height }
    }

    #[must_use]
    pub fn zeros(height: usize, width: usize) -> Self
    where
        T: Default + Clone,
    {
        Self {
            values: vec![T::default(); height * width],
            height,
        }
    }

    #[inline]
    pub fn col(&self, c: usize) -> &[T] {
        debug_assert!(c < self.width());
        &self.values[c * self.height..(c + 1) * self.height]
    }

    #[inline]
    pub fn col_mut(&mut self, c: usize) -> &mut [T] {
        debug_assert!(c < self.width());
        &mut self.values[c * self.height..(c + 1) * self.height]
    }

    pub fn cols(&self) -> impl Iterator<Item = &[T]> {
        self.values.chunks_exact(self.height.max(1))
    }

    /// Mutable columns for the parallel-for over order-slices.
    pub fn par_cols_mut(&mut self) -> impl IndexedParallelIterator<Item = &mut [T]>
    where
        T: Send,
    {
        self.values.par_chunks_exact_mut(self.height.max(1))
    }

    /// Returns the transpose, still in column-major form.
    #[must_use]
    pub fn transpose(&self) -> Self
    where
        T: Copy + Default,
    {
        let (h, w) = (self.height, self.width());
        let mut values = vec![T::default(); self.values.len()];
        // Column-major `h x w` is row-major `w x h`.
        transpose::transpose(&self.values, &mut values, h, w);
        Self { values, height: w }
    }

    pub fn rand<R: Rng>(rng: &mut R, height: usize, width: usize) -> Self
    where
        StandardUniform: Distribution<T>,
    {
        let values = rng
            .sample_iter(StandardUniform)
            .take(height * width)
            .collect();
        Self { values, height }
    }
}

impl<T: Clone> Matrix<T> for ColMajorMatrix<T> {
    #[inline]
    fn width(&self) -> usize {
        ColMajorMatrix::width(self)
    }

    #[inline]
    fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn get(&self, r: usize, c: usize) -> T {
        self.values[r + c * self.height].clone()
    }
}

impl<T> ColMajorMatrix<T> {
    /// Number of columns; same as [`Matrix::width`] without requiring `Clone`.
    #[inline]
    pub fn width(&self) -> usize {
        if self.height == 0 {
            0
        } else {
            self.values.len() / self.height
        }
    }

    #[inline]
    pub fn set(&mut self, r: usize, c: usize, value: T) {
        self.values[r + c * self.height] = value;
    }
}
