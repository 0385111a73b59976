//! Linear operator abstraction consumed by the Krylov solvers.
//!
//! Solvers see only the [`LinearOperator`] capability trait; the concrete
//! representation may be an assembled sparse matrix ([`DiracMatrix`]) or a
//! matrix-free stencil ([`WilsonOperator`]).

pub mod dirac;
pub mod even_odd;
pub mod smearing;

use num_complex::Complex64;

use crate::core::gamma::multiply_gamma5;
use crate::error::LatError;

pub use dirac::{DiracMatrix, WilsonOperator, build_dirac};
pub use even_odd::EvenOdd;
pub use smearing::build_smearing;

/// A complex linear operator over lattice spin-colour vectors.
///
/// The defaults for the Hermitian and adjoint variants assume the
/// gamma5-hermiticity of the Wilson-Dirac operator, `g5 D g5 = D†`, which
/// holds for any gauge field with our Hermitian Euclidean gamma basis.
/// Operators without that symmetry must override [`apply_adjoint`].
///
/// [`apply_adjoint`]: LinearOperator::apply_adjoint
pub trait LinearOperator: Sync {
    /// Vector length this operator acts on.
    fn size(&self) -> usize;

    /// `y = A x`.
    fn apply(&self, x: &[Complex64]) -> Vec<Complex64>;

    /// `A† x`.
    fn apply_adjoint(&self, x: &[Complex64]) -> Vec<Complex64> {
        multiply_gamma5(&self.apply(&multiply_gamma5(x)))
    }

    /// `g5 A x`, the Hermitian form of a gamma5-Hermitian operator.
    fn apply_hermitian(&self, x: &[Complex64]) -> Vec<Complex64> {
        multiply_gamma5(&self.apply(x))
    }

    /// Transform a right-hand side to match [`apply_hermitian`].
    ///
    /// [`apply_hermitian`]: LinearOperator::apply_hermitian
    fn make_hermitian(&self, b: &[Complex64]) -> Vec<Complex64> {
        multiply_gamma5(b)
    }

    /// Undo [`make_hermitian`] on a solution vector.
    ///
    /// [`make_hermitian`]: LinearOperator::make_hermitian
    fn undo_hermiticity(&self, x: &[Complex64]) -> Vec<Complex64> {
        multiply_gamma5(x)
    }

    /// `D_ee^{-1} x` on the even-site subspace.
    fn apply_even_even_inv(&self, _x_even: &[Complex64]) -> Result<Vec<Complex64>, LatError> {
        Err(LatError::Unsupported("even-odd decomposition"))
    }

    /// Schur complement `(D_oo - D_oe D_ee^{-1} D_eo) x` on the odd sites.
    fn apply_preconditioned(&self, _x_odd: &[Complex64]) -> Result<Vec<Complex64>, LatError> {
        Err(LatError::Unsupported("even-odd decomposition"))
    }

    /// Hermitian form of the Schur complement.
    fn apply_preconditioned_hermitian(
        &self,
        x_odd: &[Complex64],
    ) -> Result<Vec<Complex64>, LatError> {
        Ok(multiply_gamma5(&self.apply_preconditioned(x_odd)?))
    }

    /// Reduce a full source to the odd-site Schur source
    /// `b_o - D_oe D_ee^{-1} b_e`.
    fn make_even_odd_source(&self, _b: &[Complex64]) -> Result<Vec<Complex64>, LatError> {
        Err(LatError::Unsupported("even-odd decomposition"))
    }

    /// Reconstruct the full solution from the odd-site Schur solution.
    fn make_even_odd_solution(
        &self,
        _x_odd: &[Complex64],
        _b: &[Complex64],
    ) -> Result<Vec<Complex64>, LatError> {
        Err(LatError::Unsupported("even-odd decomposition"))
    }
}

/// The normal equations `A A†` of a wrapped operator.
///
/// Applying CG to `A A† z = b` and setting `x = A† z` solves `A x = b`
/// for any invertible `A`; the product is Hermitian positive definite.
pub struct NormalOperator<'a> {
    inner: &'a dyn LinearOperator,
}

impl<'a> NormalOperator<'a> {
    pub fn new(inner: &'a dyn LinearOperator) -> Self {
        Self { inner }
    }

    /// `A† x`, for recovering the solution of the original system.
    pub fn adjoint_solution(&self, z: &[Complex64]) -> Vec<Complex64> {
        self.inner.apply_adjoint(z)
    }
}

impl LinearOperator for NormalOperator<'_> {
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn apply(&self, x: &[Complex64]) -> Vec<Complex64> {
        self.inner.apply(&self.inner.apply_adjoint(x))
    }

    // A A† is Hermitian; all three variants coincide with apply.
    fn apply_adjoint(&self, x: &[Complex64]) -> Vec<Complex64> {
        self.apply(x)
    }

    fn apply_hermitian(&self, x: &[Complex64]) -> Vec<Complex64> {
        self.apply(x)
    }

    fn make_hermitian(&self, b: &[Complex64]) -> Vec<Complex64> {
        b.to_vec()
    }

    fn undo_hermiticity(&self, x: &[Complex64]) -> Vec<Complex64> {
        x.to_vec()
    }
}

/// Presents the odd-site Schur complement of a wrapped operator as a
/// standalone operator over the odd subspace.
pub struct SchurOperator<'a> {
    inner: &'a dyn LinearOperator,
    size: usize,
}

impl<'a> SchurOperator<'a> {
    /// `size` is the odd-subspace dimension, half the full operator size.
    pub fn new(inner: &'a dyn LinearOperator, size: usize) -> Self {
        Self { inner, size }
    }
}

impl LinearOperator for SchurOperator<'_> {
    fn size(&self) -> usize {
        self.size
    }

    fn apply(&self, x: &[Complex64]) -> Vec<Complex64> {
        self.inner
            .apply_preconditioned(x)
            .expect("wrapped operator must support even-odd decomposition")
    }
}
