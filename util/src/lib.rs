//! Various simple utilities shared by the plan builders.

mod error;

pub use error::*;

/// Computes `ceil(log_2(n))`.
#[must_use]
pub const fn log2_ceil_usize(n: usize) -> usize {
    (usize::BITS - n.saturating_sub(1).leading_zeros()) as usize
}

/// Allocates a zero-initialised vector, reporting allocation failure instead of aborting.
pub fn try_zeroed_vec<T: Clone + Default>(len: usize) -> PlanResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| PlanError::AllocationFailure { len })?;
    v.resize(len, T::default());
    Ok(v)
}

/// Collects an exact-size iterator into a vector whose storage is obtained fallibly.
pub fn try_collect_vec<T, I>(iter: I) -> PlanResult<Vec<T>>
where
    I: IntoIterator<Item = T>,
    I::IntoIter: ExactSizeIterator,
{
    let iter = iter.into_iter();
    let len = iter.len();
    let mut v = Vec::new();
    v.try_reserve_exact(len)
        .map_err(|_| PlanError::AllocationFailure { len })?;
    v.extend(iter);
    Ok(v)
}

/// Converts a `usize` to `i64` for error reporting without overflow.
#[must_use]
pub fn as_i64(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log2_ceil_usize() {
        assert_eq!(log2_ceil_usize(0), 0);
        assert_eq!(log2_ceil_usize(1), 0);
        assert_eq!(log2_ceil_usize(2), 1);
        assert_eq!(log2_ceil_usize(3), 2);
        assert_eq!(log2_ceil_usize(512), 9);
        assert_eq!(log2_ceil_usize(513), 10);
    }

    #[test]
    fn zeroed_vec_is_zero() {
        let v: Vec<f64> = try_zeroed_vec(17).unwrap();
        assert_eq!(v.len(), 17);
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn huge_allocation_is_reported() {
        let err = try_zeroed_vec::<f64>(usize::MAX / 4).unwrap_err();
        assert_eq!(err, PlanError::AllocationFailure { len: usize::MAX / 4 });
    }

    #[test]
    fn error_messages() {
        let err = PlanError::invalid_size("spin", 5usize, "must be less than n");
        assert_eq!(err.to_string(), "invalid spin = 5: must be less than n");
        let err = PlanError::singular("alpha <= -1");
        assert_eq!(err.to_string(), "singular connection problem: alpha <= -1");
    }
}
