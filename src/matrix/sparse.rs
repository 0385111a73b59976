//! Compressed sparse row storage over complex entries.
//!
//! Operators are assembled as (row, col, value) triplets and compressed
//! once; after compression the matrix is immutable. Matrix-vector products
//! parallelize across rows.

use num_complex::Complex64;
use num_traits::{One, Zero};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Square-or-rectangular CSR matrix of complex entries.
#[derive(Clone, Debug)]
pub struct SparseOperator {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<Complex64>,
}

impl SparseOperator {
    /// Build from triplets; duplicate (row, col) entries are summed.
    pub fn from_triplets(
        nrows: usize,
        ncols: usize,
        triplets: Vec<(usize, usize, Complex64)>,
    ) -> Self {
        let mut entries = triplets;
        for &(r, c, _) in &entries {
            assert!(r < nrows && c < ncols, "triplet ({r}, {c}) out of bounds");
        }
        entries.sort_unstable_by_key(|&(r, c, _)| (r, c));

        let mut row_ptr = vec![0usize; nrows + 1];
        let mut col_idx = Vec::with_capacity(entries.len());
        let mut values: Vec<Complex64> = Vec::with_capacity(entries.len());

        let mut prev: Option<(usize, usize)> = None;
        for (r, c, v) in entries {
            if prev == Some((r, c)) {
                *values.last_mut().unwrap() += v;
            } else {
                col_idx.push(c);
                values.push(v);
                row_ptr[r + 1] += 1;
                prev = Some((r, c));
            }
        }
        for r in 0..nrows {
            row_ptr[r + 1] += row_ptr[r];
        }

        Self { nrows, ncols, row_ptr, col_idx, values }
    }

    pub fn identity(n: usize) -> Self {
        let triplets = (0..n)
            .map(|i| (i, i, Complex64::one()))
            .collect();
        Self::from_triplets(n, n, triplets)
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    fn row(&self, r: usize) -> (&[usize], &[Complex64]) {
        let lo = self.row_ptr[r];
        let hi = self.row_ptr[r + 1];
        (&self.col_idx[lo..hi], &self.values[lo..hi])
    }

    /// `y = A x`, row-parallel.
    pub fn apply(&self, x: &[Complex64], y: &mut [Complex64]) {
        assert_eq!(x.len(), self.ncols, "input length mismatch");
        assert_eq!(y.len(), self.nrows, "output length mismatch");

        #[cfg(feature = "rayon")]
        {
            y.par_iter_mut().enumerate().for_each(|(r, out)| {
                *out = self.row_product(r, x);
            });
        }
        #[cfg(not(feature = "rayon"))]
        {
            for (r, out) in y.iter_mut().enumerate() {
                *out = self.row_product(r, x);
            }
        }
    }

    fn row_product(&self, r: usize, x: &[Complex64]) -> Complex64 {
        let (cols, vals) = self.row(r);
        let mut s = Complex64::zero();
        for (&c, &v) in cols.iter().zip(vals) {
            s += v * x[c];
        }
        s
    }

    /// `A x` into a fresh vector.
    pub fn apply_vec(&self, x: &[Complex64]) -> Vec<Complex64> {
        let mut y = vec![Complex64::zero(); self.nrows];
        self.apply(x, &mut y);
        y
    }

    /// Conjugate transpose.
    pub fn adjoint(&self) -> Self {
        let mut triplets = Vec::with_capacity(self.nnz());
        for r in 0..self.nrows {
            let (cols, vals) = self.row(r);
            for (&c, &v) in cols.iter().zip(vals) {
                triplets.push((c, r, v.conj()));
            }
        }
        Self::from_triplets(self.ncols, self.nrows, triplets)
    }

    /// `A B` via a sparse accumulator per row.
    pub fn matmul(&self, rhs: &Self) -> Self {
        assert_eq!(self.ncols, rhs.nrows, "matmul dimension mismatch");
        let n = rhs.ncols;

        let build_row = |r: usize| -> Vec<(usize, usize, Complex64)> {
            let mut scratch = vec![Complex64::zero(); n];
            let mut touched = Vec::new();
            let (cols, vals) = self.row(r);
            for (&k, &a) in cols.iter().zip(vals) {
                let (rcols, rvals) = rhs.row(k);
                for (&c, &b) in rcols.iter().zip(rvals) {
                    if scratch[c].is_zero() {
                        touched.push(c);
                    }
                    scratch[c] += a * b;
                }
            }
            touched
                .into_iter()
                .map(|c| (r, c, scratch[c]))
                .collect()
        };

        #[cfg(feature = "rayon")]
        let triplets: Vec<_> = (0..self.nrows)
            .into_par_iter()
            .map(build_row)
            .reduce(Vec::new, |mut a, mut b| {
                a.append(&mut b);
                a
            });
        #[cfg(not(feature = "rayon"))]
        let triplets: Vec<_> = (0..self.nrows).flat_map(build_row).collect();

        Self::from_triplets(self.nrows, n, triplets)
    }

    /// `s A`.
    pub fn scaled(&self, s: Complex64) -> Self {
        let mut out = self.clone();
        for v in &mut out.values {
            *v *= s;
        }
        out
    }

    /// `A + B`.
    pub fn add(&self, rhs: &Self) -> Self {
        assert_eq!(self.nrows, rhs.nrows);
        assert_eq!(self.ncols, rhs.ncols);
        let mut triplets = Vec::with_capacity(self.nnz() + rhs.nnz());
        for m in [self, rhs] {
            for r in 0..m.nrows {
                let (cols, vals) = m.row(r);
                for (&c, &v) in cols.iter().zip(vals) {
                    triplets.push((r, c, v));
                }
            }
        }
        Self::from_triplets(self.nrows, self.ncols, triplets)
    }

    /// Main diagonal as a dense vector.
    pub fn diagonal(&self) -> Vec<Complex64> {
        let n = self.nrows.min(self.ncols);
        let mut diag = vec![Complex64::zero(); n];
        for (r, d) in diag.iter_mut().enumerate() {
            let (cols, vals) = self.row(r);
            if let Some(pos) = cols.iter().position(|&c| c == r) {
                *d = vals[pos];
            }
        }
        diag
    }

    /// True when every stored entry sits on the main diagonal.
    pub fn is_diagonal(&self) -> bool {
        (0..self.nrows).all(|r| {
            let (cols, _) = self.row(r);
            cols.iter().all(|&c| c == r)
        })
    }

    /// Extract the block with the given row and column index sets, in the
    /// order given. Index sets must be duplicate-free.
    pub fn submatrix(&self, rows: &[usize], cols: &[usize]) -> Self {
        let mut col_map = vec![None; self.ncols];
        for (new, &old) in cols.iter().enumerate() {
            col_map[old] = Some(new);
        }

        let mut triplets = Vec::new();
        for (new_r, &old_r) in rows.iter().enumerate() {
            let (rcols, rvals) = self.row(old_r);
            for (&c, &v) in rcols.iter().zip(rvals) {
                if let Some(new_c) = col_map[c] {
                    triplets.push((new_r, new_c, v));
                }
            }
        }
        Self::from_triplets(rows.len(), cols.len(), triplets)
    }
}
