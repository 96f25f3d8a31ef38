//! Norms and error measures used when validating transforms.

use ft_field::Real;

/// Euclidean norm, accumulated in `f64`.
pub fn norm2<F: Real>(x: &[F]) -> f64 {
    x.iter()
        .map(|v| {
            let v = v.as_f64();
            v * v
        })
        .sum::<f64>()
        .sqrt()
}

/// `||x - y|| / ||y||`, or the absolute error when `y` is zero.
pub fn relative_error<F: Real>(x: &[F], y: &[F]) -> f64 {
    assert_eq!(x.len(), y.len());
    let diff = x
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let d = a.as_f64() - b.as_f64();
            d * d
        })
        .sum::<f64>()
        .sqrt();
    let scale = norm2(y);
    if scale == 0.0 { diff } else { diff / scale }
}

/// Largest absolute entrywise difference.
pub fn max_abs_diff<F: Real>(x: &[F], y: &[F]) -> f64 {
    assert_eq!(x.len(), y.len());
    x.iter()
        .zip(y)
        .map(|(a, b)| (a.as_f64() - b.as_f64()).abs())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_norms() {
        assert_eq!(norm2(&[3.0f64, 4.0]), 5.0);
        assert_eq!(relative_error(&[3.0f64, 4.0], &[3.0, 4.0]), 0.0);
        assert!((relative_error(&[3.0f32, 5.0], &[3.0, 4.0]) - 0.2).abs() < 1e-7);
        assert_eq!(max_abs_diff(&[1.0f64, -2.0], &[0.5, 1.0]), 3.0);
        assert_eq!(relative_error::<f64>(&[], &[]), 0.0);
    }
}
