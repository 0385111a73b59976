//! Restarted GMRES with complex Givens rotations.

use std::time::Instant;

use num_complex::Complex64;

use crate::core::vector::{norm, sub, zeros};
use crate::error::LatError;
use crate::operator::LinearOperator;
use crate::solver::LinearSolver;
use crate::solver::arnoldi::arnoldi_step;
use crate::utils::{Convergence, SolveStats};

const ZERO: Complex64 = Complex64 { re: 0.0, im: 0.0 };

/// GMRES(m): minimizes the residual over a Krylov subspace of dimension
/// `restart`, then restarts from the true residual.
#[derive(Debug)]
pub struct GmresSolver {
    pub restart: usize,
    pub conv: Convergence,
}

impl Default for GmresSolver {
    fn default() -> Self {
        Self { restart: 20, conv: Convergence::default() }
    }
}

impl GmresSolver {
    pub fn new(tol: f64, max_iters: usize, restart: usize) -> Self {
        assert!(restart > 0, "restart length must be positive");
        Self { restart, conv: Convergence { tol, max_iters } }
    }
}

impl LinearSolver for GmresSolver {
    fn solve(
        &mut self,
        op: &dyn LinearOperator,
        b: &[Complex64],
        x: &mut Vec<Complex64>,
    ) -> Result<SolveStats, LatError> {
        assert_eq!(b.len(), op.size(), "rhs length mismatch");
        if x.len() != b.len() {
            *x = zeros(b.len());
        }
        let start = Instant::now();
        let m = self.restart;

        let mut r = sub(b, &op.apply(x));
        let res0 = norm(&r);

        let (stop, mut stats) = self.conv.check(res0, res0, 0);
        if stop {
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        let mut total_iters = 0;
        'outer: while total_iters < self.conv.max_iters {
            let beta = norm(&r);
            let (stop, st) = self.conv.check(beta, res0, total_iters);
            stats = st;
            if stop {
                break;
            }

            let v0: Vec<_> = r.iter().map(|&v| v / beta).collect();
            let mut v_basis = vec![v0];
            let mut h: Vec<Vec<Complex64>> = (0..m).map(|j| vec![ZERO; j + 2]).collect();

            // Rotated right-hand side of the least-squares problem.
            let mut g = vec![ZERO; m + 1];
            g[0] = Complex64 { re: beta, im: 0.0 };
            let mut cs = vec![0.0f64; m];
            let mut sn = vec![ZERO; m];

            let mut k = 0;
            for j in 0..m {
                let extended = arnoldi_step(op, &mut v_basis, &mut h, j);

                // Apply the accumulated rotations to the new column, then
                // compute the rotation that zeroes its subdiagonal.
                for i in 0..j {
                    let temp = h[j][i] * cs[i] + h[j][i + 1] * sn[i];
                    h[j][i + 1] = h[j][i + 1] * cs[i] - h[j][i] * sn[i].conj();
                    h[j][i] = temp;
                }
                let (c, s) = givens_rotation(h[j][j], h[j][j + 1]);
                cs[j] = c;
                sn[j] = s;
                h[j][j] = h[j][j] * c + h[j][j + 1] * s;
                h[j][j + 1] = ZERO;

                g[j + 1] = g[j] * (-s.conj());
                g[j] = g[j] * c;

                k = j + 1;
                total_iters += 1;

                let res = g[j + 1].norm();
                let (stop, st) = self.conv.check(res, res0, total_iters);
                stats = st;
                if stop || !extended {
                    break;
                }
            }

            let y = back_substitution(&h, &g, k);
            for (i, &yi) in y.iter().enumerate() {
                for (xj, &vj) in x.iter_mut().zip(&v_basis[i]) {
                    *xj += vj * yi;
                }
            }

            // Restart from the true residual rather than the rotated
            // estimate, which drifts once rounding accumulates.
            r = sub(b, &op.apply(x));

            let res = norm(&r);
            let (stop, st) = self.conv.check(res, res0, total_iters);
            stats = st;
            if stop {
                break 'outer;
            }
        }

        stats.elapsed = start.elapsed();
        Ok(stats)
    }
}

/// Rotation `(c, s)` with real `c` zeroing `b` in `[a, b]`:
/// `c a + s b = sqrt(|a|^2 + |b|^2) * phase(a)`, `-conj(s) a + c b = 0`.
fn givens_rotation(a: Complex64, b: Complex64) -> (f64, Complex64) {
    let denom = (a.norm_sqr() + b.norm_sqr()).sqrt();
    if denom < f64::EPSILON {
        return (1.0, ZERO);
    }
    if a == ZERO {
        return (0.0, b.conj() / b.norm());
    }
    let c = a.norm() / denom;
    let s = (a / a.norm()) * b.conj() / denom;
    (c, s)
}

/// Solve the upper-triangular system left by the rotations, columns
/// `0..k` of `h` against `g[0..k]`.
fn back_substitution(h: &[Vec<Complex64>], g: &[Complex64], k: usize) -> Vec<Complex64> {
    let mut y = vec![ZERO; k];
    for i in (0..k).rev() {
        let mut sum = g[i];
        for j in (i + 1)..k {
            sum -= h[j][i] * y[j];
        }
        // A zero pivot means the subspace solution is degenerate in that
        // direction; contribute nothing rather than blow up.
        if h[i][i].norm() > f64::EPSILON {
            y[i] = sum / h[i][i];
        }
    }
    y
}
