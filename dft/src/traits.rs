use ft_field::Real;
use ft_matrix::dense::ColMajorMatrix;

/// A transform between coefficients and samples on a grid whose size is fixed when the
/// transform is built.
///
/// Callers only see `synthesize` and `analyze`; how the transform plans its work is
/// its own business.
pub trait GridTransform<F: Real> {
    /// Shape `(height, width)` of the coefficient and sample arrays.
    fn shape(&self) -> (usize, usize);

    /// Evaluates the expansion with coefficients `coeffs` on the grid.
    fn synthesize(&self, coeffs: ColMajorMatrix<F>) -> ColMajorMatrix<F>;

    /// Recovers the coefficients from samples on the grid. Inverts [`Self::synthesize`].
    fn analyze(&self, samples: ColMajorMatrix<F>) -> ColMajorMatrix<F>;

    /// [`Self::synthesize`] for a single column.
    fn synthesize_vec(&self, coeffs: Vec<F>) -> Vec<F> {
        let height = coeffs.len();
        self.synthesize(ColMajorMatrix::new(coeffs, height)).values
    }

    /// [`Self::analyze`] for a single column.
    fn analyze_vec(&self, samples: Vec<F>) -> Vec<F> {
        let height = samples.len();
        self.analyze(ColMajorMatrix::new(samples, height)).values
    }
}
