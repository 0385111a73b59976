//! Even-odd (red-black) decomposition of an assembled Dirac matrix.
//!
//! Wilson hopping only connects sites of opposite parity, so ordering the
//! degrees of freedom even-first block-partitions the matrix as
//!
//! ```text
//! D = [ D_ee  D_eo ]
//!     [ D_oe  D_oo ]
//! ```
//!
//! with `D_ee` and `D_oo` diagonal. Solving the Schur system
//! `(D_oo - D_oe D_ee^{-1} D_eo) x_o = b_o - D_oe D_ee^{-1} b_e`
//! halves the Krylov space dimension.

use num_complex::Complex64;

use crate::lattice::{DOF_PER_SITE, LatticeShape};
use crate::matrix::SparseOperator;

/// Precomputed even-odd blocks of a Dirac matrix.
pub struct EvenOdd {
    even_dofs: Vec<usize>,
    odd_dofs: Vec<usize>,
    ee_inv: Vec<Complex64>,
    oo: SparseOperator,
    oe: SparseOperator,
    eo: SparseOperator,
}

impl EvenOdd {
    pub fn new(d: &SparseOperator, shape: LatticeShape) -> Self {
        let (even_dofs, odd_dofs) = parity_dofs(shape);

        let ee = d.submatrix(&even_dofs, &even_dofs);
        assert!(ee.is_diagonal(), "even-even block must be diagonal");
        let ee_inv = ee
            .diagonal()
            .into_iter()
            .map(|v| Complex64 { re: 1.0, im: 0.0 } / v)
            .collect();

        Self {
            oo: d.submatrix(&odd_dofs, &odd_dofs),
            oe: d.submatrix(&odd_dofs, &even_dofs),
            eo: d.submatrix(&even_dofs, &odd_dofs),
            even_dofs,
            odd_dofs,
            ee_inv,
        }
    }

    /// Dimension of the odd subspace.
    pub fn odd_size(&self) -> usize {
        self.odd_dofs.len()
    }

    /// `D_ee^{-1} x` on the even subspace.
    pub fn even_even_inv(&self, x_even: &[Complex64]) -> Vec<Complex64> {
        assert_eq!(x_even.len(), self.ee_inv.len());
        x_even
            .iter()
            .zip(&self.ee_inv)
            .map(|(&x, &inv)| x * inv)
            .collect()
    }

    /// Schur complement product `(D_oo - D_oe D_ee^{-1} D_eo) x`.
    pub fn schur_apply(&self, x_odd: &[Complex64]) -> Vec<Complex64> {
        let mut out = self.oo.apply_vec(x_odd);
        let tmp = self.oe.apply_vec(&self.even_even_inv(&self.eo.apply_vec(x_odd)));
        for (o, t) in out.iter_mut().zip(tmp) {
            *o -= t;
        }
        out
    }

    /// Odd-site Schur source `b_o - D_oe D_ee^{-1} b_e`.
    pub fn source(&self, b: &[Complex64]) -> Vec<Complex64> {
        let b_even: Vec<_> = self.even_dofs.iter().map(|&i| b[i]).collect();
        let corr = self.oe.apply_vec(&self.even_even_inv(&b_even));
        self.odd_dofs
            .iter()
            .zip(corr)
            .map(|(&i, c)| b[i] - c)
            .collect()
    }

    /// Full-lattice solution from the odd-site Schur solution:
    /// `x_e = D_ee^{-1} (b_e - D_eo x_o)`.
    pub fn solution(&self, x_odd: &[Complex64], b: &[Complex64]) -> Vec<Complex64> {
        let hop = self.eo.apply_vec(x_odd);
        let x_even: Vec<_> = self
            .even_dofs
            .iter()
            .zip(&hop)
            .zip(&self.ee_inv)
            .map(|((&i, &h), &inv)| (b[i] - h) * inv)
            .collect();

        let mut full = vec![Complex64 { re: 0.0, im: 0.0 }; b.len()];
        for (&i, &v) in self.even_dofs.iter().zip(&x_even) {
            full[i] = v;
        }
        for (&i, &v) in self.odd_dofs.iter().zip(x_odd) {
            full[i] = v;
        }
        full
    }
}

/// Degree-of-freedom indices split by site parity, sites ascending
/// within each half.
pub fn parity_dofs(shape: LatticeShape) -> (Vec<usize>, Vec<usize>) {
    let half = shape.n_dofs() / 2;
    let mut even = Vec::with_capacity(half);
    let mut odd = Vec::with_capacity(half);
    for site in 0..shape.n_sites() {
        let target = if shape.parity(site) == 0 { &mut even } else { &mut odd };
        for k in 0..DOF_PER_SITE {
            target.push(DOF_PER_SITE * site + k);
        }
    }
    (even, odd)
}
