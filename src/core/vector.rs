//! Complex vector kernels shared by operators and solvers.
//!
//! Inner products and norms over `Complex64` slices, with Rayon-parallel
//! reductions when the `rayon` feature is enabled and plain folds otherwise.
//! The dot product is conjugated in the first argument, so `dot(x, x)` is
//! real and non-negative.

use num_complex::Complex64;
use num_traits::Zero;

/// Conjugated dot product `Σ conj(x_i) · y_i`.
pub fn dot(x: &[Complex64], y: &[Complex64]) -> Complex64 {
    assert_eq!(x.len(), y.len(), "vectors must have the same length");
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter()
            .zip(y.par_iter())
            .map(|(xi, yi)| xi.conj() * yi)
            .reduce(|| Complex64::new(0.0, 0.0), |a, b| a + b)
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter()
            .zip(y.iter())
            .map(|(xi, yi)| xi.conj() * yi)
            .fold(Complex64::new(0.0, 0.0), |a, b| a + b)
    }
}

/// Squared 2-norm `Σ |x_i|²`.
pub fn norm_sq(x: &[Complex64]) -> f64 {
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        x.par_iter().map(|xi| xi.norm_sqr()).sum()
    }
    #[cfg(not(feature = "rayon"))]
    {
        x.iter().map(|xi| xi.norm_sqr()).sum()
    }
}

/// 2-norm `‖x‖₂`.
pub fn norm(x: &[Complex64]) -> f64 {
    norm_sq(x).sqrt()
}

/// `y += α · x`.
pub fn axpy(alpha: Complex64, x: &[Complex64], y: &mut [Complex64]) {
    assert_eq!(x.len(), y.len(), "vectors must have the same length");
    for (yi, xi) in y.iter_mut().zip(x) {
        *yi += alpha * xi;
    }
}

/// Elementwise difference `a − b`.
pub fn sub(a: &[Complex64], b: &[Complex64]) -> Vec<Complex64> {
    assert_eq!(a.len(), b.len(), "vectors must have the same length");
    a.iter().zip(b).map(|(ai, bi)| ai - bi).collect()
}

/// A zero vector of length `n`.
pub fn zeros(n: usize) -> Vec<Complex64> {
    vec![Complex64::zero(); n]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_is_conjugated() {
        let x = vec![Complex64::new(0.0, 1.0), Complex64::new(2.0, 0.0)];
        let d = dot(&x, &x);
        assert!((d.re - 5.0).abs() < 1e-14);
        assert!(d.im.abs() < 1e-14);
    }

    #[test]
    fn norm_matches_norm_sq() {
        let x = vec![Complex64::new(3.0, 0.0), Complex64::new(0.0, 4.0)];
        assert!((norm_sq(&x) - 25.0).abs() < 1e-14);
        assert!((norm(&x) - 5.0).abs() < 1e-14);
    }

    #[test]
    fn axpy_accumulates() {
        let x = vec![Complex64::new(1.0, 1.0); 3];
        let mut y = zeros(3);
        axpy(Complex64::new(2.0, 0.0), &x, &mut y);
        for yi in &y {
            assert!((yi - Complex64::new(2.0, 2.0)).norm() < 1e-14);
        }
    }
}
