#[cfg(feature = "parallel")]
pub mod prelude {
    pub use rayon::prelude::*;
}

#[cfg(not(feature = "parallel"))]
mod serial;

#[cfg(not(feature = "parallel"))]
pub mod prelude {
    pub use core::iter::{
        ExactSizeIterator as IndexedParallelIterator, Iterator as ParallelIterator,
    };

    pub use super::serial::*;
}

/// Runs `op` with at most `threads` worker threads.
///
/// `None` runs on the ambient pool. With the `parallel` feature disabled `op` always runs
/// on the calling thread.
#[cfg(feature = "parallel")]
pub fn with_threads<R, OP>(threads: Option<usize>, op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    match threads {
        Some(n) if n != rayon::current_num_threads() => {
            match rayon::ThreadPoolBuilder::new().num_threads(n).build() {
                Ok(pool) => pool.install(op),
                Err(err) => {
                    tracing::warn!(%err, threads = n, "falling back to the global thread pool");
                    op()
                }
            }
        }
        _ => op(),
    }
}

#[cfg(not(feature = "parallel"))]
pub fn with_threads<R, OP>(_threads: Option<usize>, op: OP) -> R
where
    OP: FnOnce() -> R + Send,
    R: Send,
{
    op()
}
