//! Unified error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LatError {
    #[error("Krylov subspace breakdown after {iterations} iterations (residual {residual:.3e})")]
    Breakdown { iterations: usize, residual: f64 },
    #[error("unknown solver method {0} (expected 0 = BiCGSTAB, 1 = CG)")]
    UnknownSolverMethod(i32),
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),
}
