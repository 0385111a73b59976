//! Convergence criteria and solve diagnostics.

use std::time::Duration;

/// Relative residual tolerance and an iteration cap.
#[derive(Clone, Copy, Debug)]
pub struct Convergence {
    pub tol: f64,
    pub max_iters: usize,
}

impl Default for Convergence {
    fn default() -> Self {
        Self { tol: 1e-8, max_iters: 1000 }
    }
}

/// What a solver actually did, reported even on non-convergence.
#[derive(Clone, Copy, Debug)]
pub struct SolveStats {
    pub iterations: usize,
    pub final_residual: f64,
    pub converged: bool,
    pub elapsed: Duration,
}

impl Convergence {
    /// Returns `(stop, stats)` for the residual norm at iteration `i`.
    ///
    /// Convergence is relative to the initial residual `res0`; a zero
    /// initial residual counts as converged immediately.
    pub fn check(&self, res_norm: f64, res0: f64, i: usize) -> (bool, SolveStats) {
        let rel = if res0 > 0.0 { res_norm / res0 } else { 0.0 };
        let converged = rel <= self.tol;
        let stop = converged || i >= self.max_iters;
        (
            stop,
            SolveStats {
                iterations: i,
                final_residual: res_norm,
                converged,
                elapsed: Duration::ZERO,
            },
        )
    }
}
