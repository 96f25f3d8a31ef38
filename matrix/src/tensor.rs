use ft_maybe_rayon::prelude::*;
use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};

/// One of the three index directions of a [`Tensor3`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
    K,
}

/// A dense `n0 x n1 x n2` array with entry `(i, j, k)` at `i + n0 * (j + n1 * k)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tensor3<T> {
    pub values: Vec<T>,
    pub dims: [usize; 3],
}

impl<T> Tensor3<T> {
    #[must_use]
    pub fn new(values: Vec<T>, dims: [usize; 3]) -> Self {
        assert_eq!(values.len(), dims.iter().product::<usize>());
        Self { values, dims }
    }

    #[must_use]
    pub fn zeros(dims: [usize; 3]) -> Self
    where
        T: Default + Clone,
    {
        Self {
            values: vec![T::default(); dims.iter().product()],
            dims,
        }
    }

    pub fn rand<R: Rng>(rng: &mut R, dims: [usize; 3]) -> Self
    where
        StandardUniform: Distribution<T>,
    {
        let values = rng
            .sample_iter(StandardUniform)
            .take(dims.iter().product())
            .collect();
        Self { values, dims }
    }

    #[inline]
    pub const fn index(&self, i: usize, j: usize, k: usize) -> usize {
        i + self.dims[0] * (j + self.dims[1] * k)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> &T {
        &self.values[self.index(i, j, k)]
    }

    #[inline]
    pub fn get_mut(&mut self, i: usize, j: usize, k: usize) -> &mut T {
        let idx = self.index(i, j, k);
        &mut self.values[idx]
    }

    /// Distance between consecutive entries along `axis`.
    pub const fn stride(&self, axis: Axis) -> usize {
        match axis {
            Axis::I => 1,
            Axis::J => self.dims[0],
            Axis::K => self.dims[0] * self.dims[1],
        }
    }

    /// Offsets of the first entry of every line running along `axis`.
    pub fn line_starts(&self, axis: Axis) -> Vec<usize> {
        let [n0, n1, n2] = self.dims;
        let (a, b) = match axis {
            Axis::I => (n1, n2),
            Axis::J => (n0, n2),
            Axis::K => (n0, n1),
        };
        let mut starts = Vec::with_capacity(a * b);
        for q in 0..b {
            for p in 0..a {
                starts.push(match axis {
                    Axis::I => self.index(0, p, q),
                    Axis::J => self.index(p, 0, q),
                    Axis::K => self.index(p, q, 0),
                });
            }
        }
        starts
    }

    /// Calls `f` on a contiguous copy of every line along `axis` and writes the result
    /// back. Lines are independent, so they run in parallel under the `parallel` feature.
    pub fn par_for_each_line_mut<F>(&mut self, axis: Axis, f: F)
    where
        T: Copy + Default + Send + Sync,
        F: Fn(&mut [T]) + Sync,
    {
        let len = self.dims[axis as usize];
        if len == 0 {
            return;
        }
        let stride = self.stride(axis);
        let starts = self.line_starts(axis);
        let mut lines = vec![T::default(); len * starts.len()];
        for (line, &start) in lines.chunks_exact_mut(len).zip(&starts) {
            for (t, v) in line.iter_mut().enumerate() {
                *v = self.values[start + t * stride];
            }
        }
        lines.par_chunks_exact_mut(len).for_each(|line| f(line));
        for (line, &start) in lines.chunks_exact(len).zip(&starts) {
            for (t, v) in line.iter().enumerate() {
                self.values[start + t * stride] = *v;
            }
        }
    }
}
