use serde::{Deserialize, Serialize};

use crate::{Real, SimdWidth};

/// Per-call execution settings.
///
/// Passed explicitly to every execute call; there is no process-wide state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Upper bound on the kernel width. The width actually used is the smaller of this
    /// and what the CPU supports.
    pub max_width: SimdWidth,
    /// Number of worker threads for the parallel-for over order-slices and columns.
    /// `None` uses the ambient rayon pool; ignored without the `parallel` feature.
    pub threads: Option<usize>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_width: SimdWidth::X8,
            threads: None,
        }
    }
}

impl ExecutionConfig {
    /// Width-1 kernels on the calling thread only.
    #[must_use]
    pub const fn scalar() -> Self {
        Self {
            max_width: SimdWidth::X1,
            threads: Some(1),
        }
    }

    #[must_use]
    pub const fn with_max_width(mut self, max_width: SimdWidth) -> Self {
        self.max_width = max_width;
        self
    }

    #[must_use]
    pub const fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// The widest kernel allowed both by this configuration and by the CPU for `F`.
    pub fn width<F: Real>(&self) -> SimdWidth {
        self.max_width.min(SimdWidth::detect::<F>())
    }
}
