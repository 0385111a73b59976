//! Jacobi source/sink smearing operator.
//!
//! The smearing kernel `H` hops across the six spatial neighbours with the
//! gauge link as colour weight and the identity in spin; the operator is
//! the truncated geometric series `sum_{i=0}^{n} alpha^i H^i`, which
//! spreads a point source into a gauge-covariant cloud.

use num_complex::Complex64;
use num_traits::Zero;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

use crate::lattice::{DOF_PER_SITE, LinkField};
use crate::matrix::SparseOperator;

/// Spatial hopping kernel `H`, identity in spin.
fn build_kernel(field: &LinkField) -> SparseOperator {
    let shape = field.shape();
    let n = shape.n_dofs();

    let site_entries = |site: usize| -> Vec<(usize, usize, Complex64)> {
        let mut local = Vec::with_capacity(6 * 36);
        for nb in shape.neighbours(site) {
            if nb.dim == 0 {
                continue;
            }
            let colour = if nb.forward {
                field.link(site, nb.dim)
            } else {
                field.link(nb.site, nb.dim).adjoint()
            };
            for k in 0..4 {
                for m in 0..3 {
                    for c in 0..3 {
                        let v = colour.m[m][c];
                        if v.is_zero() {
                            continue;
                        }
                        local.push((
                            DOF_PER_SITE * site + 3 * k + m,
                            DOF_PER_SITE * nb.site + 3 * k + c,
                            v,
                        ));
                    }
                }
            }
        }
        local
    };

    #[cfg(feature = "rayon")]
    let triplets: Vec<_> = (0..shape.n_sites())
        .into_par_iter()
        .map(site_entries)
        .reduce(Vec::new, |mut a, mut b| {
            a.append(&mut b);
            a
        });
    #[cfg(not(feature = "rayon"))]
    let triplets: Vec<_> = (0..shape.n_sites()).flat_map(site_entries).collect();

    SparseOperator::from_triplets(n, n, triplets)
}

/// Truncated series `sum_{i=0}^{n_smears} param^i H^i`.
///
/// `n_smears = 0` yields the identity exactly, for any gauge field.
pub fn build_smearing(field: &LinkField, param: f64, n_smears: usize) -> SparseOperator {
    let n = field.shape().n_dofs();
    if n_smears == 0 {
        return SparseOperator::identity(n);
    }

    let h = build_kernel(field);
    let mut out = SparseOperator::identity(n);
    let mut power = SparseOperator::identity(n);
    for i in 1..=n_smears {
        power = power.matmul(&h);
        out = out.add(&power.scaled(Complex64 { re: param.powi(i as i32), im: 0.0 }));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::norm;
    use crate::lattice::LatticeShape;

    #[test]
    fn zero_smears_is_the_identity() {
        let field = LinkField::hot_start(LatticeShape::new(2, 2), 1);
        let s = build_smearing(&field, 0.9, 0);
        let n = field.shape().n_dofs();
        assert_eq!(s.nnz(), n);
        let x: Vec<_> = (0..n)
            .map(|i| Complex64 { re: i as f64, im: 1.0 })
            .collect();
        assert_eq!(s.apply_vec(&x), x);
    }

    #[test]
    fn identity_links_give_the_scalar_series() {
        // With identity links, H applied to a constant vector multiplies
        // it by 6 (six spatial neighbours), so the series acts as the
        // scalar sum of (6 alpha)^i.
        let field = LinkField::cold_start(LatticeShape::new(2, 2));
        let alpha = 0.1;
        let n_smears = 3;
        let s = build_smearing(&field, alpha, n_smears);

        let n = field.shape().n_dofs();
        let x = vec![Complex64 { re: 1.0, im: 0.0 }; n];
        let y = s.apply_vec(&x);

        let expected: f64 = (0..=n_smears).map(|i| (6.0 * alpha).powi(i as i32)).sum();
        let diff: Vec<_> = y
            .iter()
            .map(|v| v - Complex64 { re: expected, im: 0.0 })
            .collect();
        assert!(norm(&diff) < 1e-10);
    }

    #[test]
    fn kernel_never_couples_spins_or_time() {
        let field = LinkField::hot_start(LatticeShape::new(2, 3), 12);
        let shape = field.shape();
        let h = build_kernel(&field);

        // A source in spin 2 stays in spin 2 and on its time slice.
        let mut x = vec![Complex64 { re: 0.0, im: 0.0 }; shape.n_dofs()];
        let site = shape.site_index([1, 0, 1, 0]);
        x[DOF_PER_SITE * site + 3 * 2] = Complex64 { re: 1.0, im: 0.0 };
        let y = h.apply_vec(&x);

        for (i, v) in y.iter().enumerate() {
            if v.is_zero() {
                continue;
            }
            let spin = (i % DOF_PER_SITE) / 3;
            let t = shape.site_coords(i / DOF_PER_SITE)[0];
            assert_eq!(spin, 2);
            assert_eq!(t, 1);
        }
    }
}
