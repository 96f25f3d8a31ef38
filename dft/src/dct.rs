use core::fmt;
use std::sync::Arc;

use ft_field::Real;
use ft_matrix::dense::ColMajorMatrix;
use ft_maybe_rayon::prelude::*;
use rustdct::{Dct2, Dct3, DctPlanner, TransformType2And3};
use tracing::{debug, instrument};

use crate::GridTransform;

/// Tensor-product Chebyshev synthesis and analysis through `O(n log n)` cosine transforms.
///
/// Same grid and coefficient conventions as [`NaiveChebyshevGrid`](crate::NaiveChebyshevGrid):
/// synthesis is a DCT-III and analysis a DCT-II, both planned once per axis length. The
/// transforms run in `f64` whatever the precision of the data.
#[derive(Clone)]
pub struct DctChebyshevGrid<F> {
    height: usize,
    width: usize,
    rows: Option<Arc<dyn TransformType2And3<f64>>>,
    cols: Option<Arc<dyn TransformType2And3<f64>>>,
    _marker: core::marker::PhantomData<F>,
}

impl<F> fmt::Debug for DctChebyshevGrid<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DctChebyshevGrid")
            .field("height", &self.height)
            .field("width", &self.width)
            .finish_non_exhaustive()
    }
}

impl<F: Real> DctChebyshevGrid<F> {
    #[instrument(name = "plan cosine transforms", level = "debug")]
    pub fn new(height: usize, width: usize) -> Self {
        let mut planner = DctPlanner::new();
        let mut plan = |n: usize| (n > 0).then(|| planner.plan_dct2(n));
        let rows = plan(height);
        let cols = if width == height { rows.clone() } else { plan(width) };
        debug!(shared = width == height, "planned");
        Self {
            height,
            width,
            rows,
            cols,
            _marker: core::marker::PhantomData,
        }
    }
}

/// `y_r = Σ_k c_k cos(k θ_r)`, which is a DCT-III once `c_0` is doubled.
fn synthesize_columns<F: Real>(dct: &dyn TransformType2And3<f64>, mat: &mut ColMajorMatrix<F>) {
    mat.par_cols_mut().for_each(|col| {
        let mut buf: Vec<f64> = col.iter().map(|c| c.as_f64()).collect();
        buf[0] *= 2.0;
        dct.process_dct3(&mut buf);
        for (y, b) in col.iter_mut().zip(buf) {
            *y = F::cast(b);
        }
    });
}

/// `c_k = (2 - δ_k0) / n Σ_r y_r cos(k θ_r)` from an unnormalized DCT-II.
fn analyze_columns<F: Real>(dct: &dyn TransformType2And3<f64>, mat: &mut ColMajorMatrix<F>) {
    let scale = 2.0 / mat.height as f64;
    mat.par_cols_mut().for_each(|col| {
        let mut buf: Vec<f64> = col.iter().map(|y| y.as_f64()).collect();
        dct.process_dct2(&mut buf);
        buf[0] *= 0.5;
        for (c, b) in col.iter_mut().zip(buf) {
            *c = F::cast(b * scale);
        }
    });
}

impl<F: Real> GridTransform<F> for DctChebyshevGrid<F> {
    fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    #[instrument(skip_all, fields(height = self.height, width = self.width))]
    fn synthesize(&self, mut coeffs: ColMajorMatrix<F>) -> ColMajorMatrix<F> {
        assert_eq!((coeffs.height, coeffs.width()), self.shape());
        let (Some(rows), Some(cols)) = (&self.rows, &self.cols) else {
            return coeffs;
        };
        synthesize_columns(rows.as_ref(), &mut coeffs);
        if self.width == 1 {
            return coeffs;
        }
        let mut t = coeffs.transpose();
        synthesize_columns(cols.as_ref(), &mut t);
        t.transpose()
    }

    #[instrument(skip_all, fields(height = self.height, width = self.width))]
    fn analyze(&self, mut samples: ColMajorMatrix<F>) -> ColMajorMatrix<F> {
        assert_eq!((samples.height, samples.width()), self.shape());
        let (Some(rows), Some(cols)) = (&self.rows, &self.cols) else {
            return samples;
        };
        analyze_columns(rows.as_ref(), &mut samples);
        if self.width == 1 {
            return samples;
        }
        let mut t = samples.transpose();
        analyze_columns(cols.as_ref(), &mut t);
        t.transpose()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::NaiveChebyshevGrid;

    #[test]
    fn agrees_with_direct_summation() {
        let mut rng = SmallRng::seed_from_u64(3);
        for (h, w) in [(1, 1), (2, 3), (7, 1), (12, 5), (33, 33), (64, 17)] {
            let fast = DctChebyshevGrid::<f64>::new(h, w);
            let naive = NaiveChebyshevGrid::<f64>::new(h, w);
            let c = ColMajorMatrix::<f64>::rand(&mut rng, h, w);
            let (a, b) = (fast.synthesize(c.clone()), naive.synthesize(c.clone()));
            for (x, y) in a.values.iter().zip(&b.values) {
                assert!((x - y).abs() < 1e-12, "synthesis {h}x{w}: {x} vs {y}");
            }
            let (a, b) = (fast.analyze(c.clone()), naive.analyze(c));
            for (x, y) in a.values.iter().zip(&b.values) {
                assert!((x - y).abs() < 1e-13, "analysis {h}x{w}: {x} vs {y}");
            }
        }
    }

    #[test]
    fn round_trip_in_single_precision() {
        let grid = DctChebyshevGrid::<f32>::new(40, 8);
        let c = ColMajorMatrix::<f32>::rand(&mut SmallRng::seed_from_u64(4), 40, 8);
        let back = grid.analyze(grid.synthesize(c.clone()));
        for (a, b) in back.values.iter().zip(&c.values) {
            assert!((a - b).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_grids_pass_through() {
        let grid = DctChebyshevGrid::<f64>::new(0, 0);
        let out = grid.analyze(ColMajorMatrix::zeros(0, 0));
        assert!(out.values.is_empty());
    }
}
