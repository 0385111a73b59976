//! Arnoldi iteration with modified Gram-Schmidt.

use num_complex::Complex64;

use crate::core::vector::{dot, norm};
use crate::operator::LinearOperator;

/// Breakdown threshold for the subdiagonal norm.
pub const HAPPY_BREAKDOWN_EPS: f64 = 1e-14;

/// One Arnoldi step: extend the orthonormal basis `v_basis` by one vector
/// and fill column `j` of the Hessenberg matrix `h` (stored column-wise,
/// `h[j]` holding rows `0..=j+1`).
///
/// Returns `false` on happy breakdown, when `A v_j` already lies in the
/// span of the basis and the Krylov space is invariant.
pub fn arnoldi_step(
    op: &dyn LinearOperator,
    v_basis: &mut Vec<Vec<Complex64>>,
    h: &mut [Vec<Complex64>],
    j: usize,
) -> bool {
    let mut w = op.apply(&v_basis[j]);

    for i in 0..=j {
        let hij = dot(&v_basis[i], &w);
        for (wk, &vk) in w.iter_mut().zip(&v_basis[i]) {
            *wk -= vk * hij;
        }
        h[j][i] = hij;
    }
    // Second orthogonalization pass recovers the precision lost when
    // w is nearly parallel to the basis.
    for i in 0..=j {
        let corr = dot(&v_basis[i], &w);
        for (wk, &vk) in w.iter_mut().zip(&v_basis[i]) {
            *wk -= vk * corr;
        }
        h[j][i] += corr;
    }

    let h_next = norm(&w);
    h[j][j + 1] = Complex64 { re: h_next, im: 0.0 };
    if h_next < HAPPY_BREAKDOWN_EPS {
        return false;
    }

    let inv = 1.0 / h_next;
    for wk in &mut w {
        *wk *= inv;
    }
    v_basis.push(w);
    true
}

/// Full `m`-step Arnoldi decomposition starting from `start`, returning
/// the orthonormal basis and the Hessenberg columns. Truncates early on
/// happy breakdown.
pub fn arnoldi_decomposition(
    op: &dyn LinearOperator,
    start: &[Complex64],
    m: usize,
) -> (Vec<Vec<Complex64>>, Vec<Vec<Complex64>>) {
    let beta = norm(start);
    assert!(beta > 0.0, "Arnoldi start vector must be non-zero");

    let v0: Vec<_> = start.iter().map(|&v| v / beta).collect();
    let mut v_basis = vec![v0];
    let mut h: Vec<Vec<Complex64>> =
        (0..m).map(|j| vec![Complex64 { re: 0.0, im: 0.0 }; j + 2]).collect();

    let mut steps = 0;
    for j in 0..m {
        steps = j + 1;
        if !arnoldi_step(op, &mut v_basis, &mut h, j) {
            break;
        }
    }
    h.truncate(steps);
    (v_basis, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Diag(Vec<Complex64>);

    impl LinearOperator for Diag {
        fn size(&self) -> usize {
            self.0.len()
        }
        fn apply(&self, x: &[Complex64]) -> Vec<Complex64> {
            self.0.iter().zip(x).map(|(&d, &v)| d * v).collect()
        }
        fn apply_adjoint(&self, x: &[Complex64]) -> Vec<Complex64> {
            self.0.iter().zip(x).map(|(&d, &v)| d.conj() * v).collect()
        }
    }

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64 { re, im }
    }

    #[test]
    fn basis_is_orthonormal() {
        let op = Diag((1..=6).map(|i| c(i as f64, 0.3 * i as f64)).collect());
        let start: Vec<_> = (0..6).map(|i| c(1.0 + i as f64, -0.5)).collect();
        let (v, _h) = arnoldi_decomposition(&op, &start, 4);

        for (i, vi) in v.iter().enumerate() {
            for (j, vj) in v.iter().enumerate() {
                let d = dot(vi, vj);
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!((d.re - expected).abs() < 1e-10, "({i},{j}) re");
                assert!(d.im.abs() < 1e-10, "({i},{j}) im");
            }
        }
    }

    #[test]
    fn identity_operator_breaks_down_after_one_step() {
        let op = Diag(vec![c(1.0, 0.0); 5]);
        let start = vec![c(2.0, 1.0); 5];
        let (v, h) = arnoldi_decomposition(&op, &start, 4);
        assert_eq!(v.len(), 1);
        assert_eq!(h.len(), 1);
        assert!((h[0][0] - c(1.0, 0.0)).norm() < 1e-12);
        assert!(h[0][1].norm() < HAPPY_BREAKDOWN_EPS);
    }

    #[test]
    fn hessenberg_reproduces_the_operator_action() {
        // A V_m = V_{m+1} H_m column by column.
        let op = Diag((1..=5).map(|i| c(0.5 * i as f64, 1.0)).collect());
        let start: Vec<_> = (0..5).map(|i| c(1.0, i as f64)).collect();
        let (v, h) = arnoldi_decomposition(&op, &start, 3);

        for (j, hj) in h.iter().enumerate() {
            let av = op.apply(&v[j]);
            let mut recon = vec![c(0.0, 0.0); av.len()];
            for (i, &hij) in hj.iter().enumerate() {
                if i < v.len() {
                    for (r, &vk) in recon.iter_mut().zip(&v[i]) {
                        *r += vk * hij;
                    }
                }
            }
            for (a, r) in av.iter().zip(recon) {
                assert!((a - r).norm() < 1e-10);
            }
        }
    }
}
