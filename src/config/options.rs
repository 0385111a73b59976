//! Solver and smearing option types.

use crate::error::LatError;

/// Which Krylov method inverts the Dirac operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverMethod {
    /// BiCGSTAB on the operator directly.
    BiCgStab,
    /// CG on the normal equations `D D†`.
    ConjugateGradient,
}

impl TryFrom<i32> for SolverMethod {
    type Error = LatError;

    /// Numeric codes kept for configuration files: 0 = BiCGSTAB, 1 = CG.
    fn try_from(code: i32) -> Result<Self, LatError> {
        match code {
            0 => Ok(Self::BiCgStab),
            1 => Ok(Self::ConjugateGradient),
            other => Err(LatError::UnknownSolverMethod(other)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SolverOptions {
    pub method: SolverMethod,
    /// Solve the even-odd Schur system instead of the full one.
    /// Only honoured by the CG path.
    pub even_odd: bool,
    pub tol: f64,
    pub max_iters: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            method: SolverMethod::BiCgStab,
            even_odd: false,
            tol: 1e-8,
            max_iters: 1000,
        }
    }
}

/// Smearing applied during a propagator computation.
///
/// Field smearing smooths the gauge links before the Dirac operator is
/// assembled; source and sink smearing wrap the solves.
#[derive(Clone, Copy, Debug)]
pub struct SmearingOptions {
    pub n_field_smears: usize,
    pub field_param: f64,
    pub n_source_smears: usize,
    pub source_param: f64,
    pub n_sink_smears: usize,
    pub sink_param: f64,
}

impl Default for SmearingOptions {
    fn default() -> Self {
        Self {
            n_field_smears: 0,
            field_param: 1.0,
            n_source_smears: 0,
            source_param: 1.0,
            n_sink_smears: 0,
            sink_param: 1.0,
        }
    }
}
