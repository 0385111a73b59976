//! Conjugate gradient for Hermitian positive definite operators.

use std::time::Instant;

use num_complex::Complex64;

use crate::core::vector::{axpy, dot, norm_sq, sub, zeros};
use crate::error::LatError;
use crate::operator::LinearOperator;
use crate::solver::LinearSolver;
use crate::utils::{Convergence, SolveStats};

/// Standard CG. The operator must be Hermitian positive definite; for the
/// Dirac operator that means wrapping it in
/// [`NormalOperator`](crate::operator::NormalOperator) first.
#[derive(Debug, Default)]
pub struct CgSolver {
    pub conv: Convergence,
}

impl CgSolver {
    pub fn new(tol: f64, max_iters: usize) -> Self {
        Self { conv: Convergence { tol, max_iters } }
    }
}

impl LinearSolver for CgSolver {
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

        let mut r = sub(b, &op.apply(x));
        let mut p = r.clone();
        let mut rsq = norm_sq(&r);
        let res0 = rsq.sqrt();

        let (stop, mut stats) = self.conv.check(res0, res0, 0);
        if stop {
            stats.elapsed = start.elapsed();
            return Ok(stats);
        }

        for i in 1..=self.conv.max_iters {
            let ap = op.apply(&p);
            // p† A p is real for a Hermitian A; the imaginary part is
            // rounding noise.
            let alpha = rsq / dot(&p, &ap).re;

            for (xj, &pj) in x.iter_mut().zip(&p) {
                *xj += pj * alpha;
            }
            axpy(Complex64 { re: -alpha, im: 0.0 }, &ap, &mut r);

            let rsq_new = norm_sq(&r);
            let (stop, s) = self.conv.check(rsq_new.sqrt(), res0, i);
            stats = s;
            if stop {
                break;
            }

            let beta = rsq_new / rsq;
            for (pj, &rj) in p.iter_mut().zip(&r) {
                *pj = rj + *pj * beta;
            }
            rsq = rsq_new;
        }

        stats.elapsed = start.elapsed();
        Ok(stats)
    }
}
