//! Krylov solvers and the Dirac-inversion driver.

pub mod arnoldi;
pub mod bicgstab;
pub mod cg;
pub mod gmres;

use num_complex::Complex64;

use crate::config::{SolverMethod, SolverOptions};
use crate::error::LatError;
use crate::operator::{LinearOperator, NormalOperator, SchurOperator};
use crate::utils::SolveStats;

pub use arnoldi::{arnoldi_decomposition, arnoldi_step};
pub use bicgstab::BiCgStabSolver;
pub use cg::CgSolver;
pub use gmres::GmresSolver;

/// Iteratively solve `A x = b`, refining `x` in place from its current
/// value (usually zero). Returns diagnostics even when the iteration cap
/// is hit without convergence; errors are reserved for breakdown and
/// unsupported requests.
pub trait LinearSolver {
    fn solve(
        &mut self,
        op: &dyn LinearOperator,
        b: &[Complex64],
        x: &mut Vec<Complex64>,
    ) -> Result<SolveStats, LatError>;
}

/// Invert the Dirac operator against one source vector.
///
/// BiCGSTAB works on the operator directly. CG needs a Hermitian positive
/// definite system, so it runs on the normal equations `D D† z = b` and
/// recovers `x = D† z`; with `even_odd` set it does the same on the odd-site
/// Schur complement and reconstructs the even sites afterwards.
pub fn solve_dirac(
    op: &dyn LinearOperator,
    source: &[Complex64],
    opts: &SolverOptions,
) -> Result<(Vec<Complex64>, SolveStats), LatError> {
    match opts.method {
        SolverMethod::BiCgStab => {
            let mut solver = BiCgStabSolver::new(opts.tol, opts.max_iters);
            let mut x = Vec::new();
            let stats = solver.solve(op, source, &mut x)?;
            Ok((x, stats))
        }
        SolverMethod::ConjugateGradient if opts.even_odd => {
            let b_odd = op.make_even_odd_source(source)?;
            let schur = SchurOperator::new(op, b_odd.len());
            let normal = NormalOperator::new(&schur);

            let mut solver = CgSolver::new(opts.tol, opts.max_iters);
            let mut z = Vec::new();
            let stats = solver.solve(&normal, &b_odd, &mut z)?;

            let x_odd = normal.adjoint_solution(&z);
            let x = op.make_even_odd_solution(&x_odd, source)?;
            Ok((x, stats))
        }
        SolverMethod::ConjugateGradient => {
            let normal = NormalOperator::new(op);
            let mut solver = CgSolver::new(opts.tol, opts.max_iters);
            let mut z = Vec::new();
            let stats = solver.solve(&normal, source, &mut z)?;
            Ok((normal.adjoint_solution(&z), stats))
        }
    }
}
