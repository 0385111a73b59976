//! SU(3) link matrices.
//!
//! A gauge link is a 3×3 complex unitary matrix attached to a directed
//! lattice edge. Storage is row-major, `m[row][col]`.

use std::ops::{Add, Mul, Sub};

use num_complex::Complex64;

const fn c(re: f64, im: f64) -> Complex64 {
    Complex64 { re, im }
}

/// 3×3 complex matrix acting on the colour index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Su3 {
    pub m: [[Complex64; 3]; 3],
}

impl Mul for Su3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                let mut s = c(0.0, 0.0);
                for k in 0..3 {
                    s += self.m[i][k] * rhs.m[k][j];
                }
                r.m[i][j] = s;
            }
        }
        r
    }
}

impl Add for Su3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[i][j] + rhs.m[i][j];
            }
        }
        r
    }
}

impl Sub for Su3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[i][j] - rhs.m[i][j];
            }
        }
        r
    }
}

impl Su3 {
    pub const IDENTITY: Self = Self {
        m: [
            [c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)],
        ],
    };

    pub const ZERO: Self = Self {
        m: [[c(0.0, 0.0); 3]; 3],
    };

    /// Conjugate transpose.
    pub fn adjoint(self) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[j][i].conj();
            }
        }
        r
    }

    /// Scale every element by a real factor.
    pub fn scale(self, s: f64) -> Self {
        let mut r = Self::ZERO;
        for i in 0..3 {
            for j in 0..3 {
                r.m[i][j] = self.m[i][j] * s;
            }
        }
        r
    }

    /// Frobenius norm squared.
    pub fn norm_sq(self) -> f64 {
        let mut s = 0.0;
        for i in 0..3 {
            for j in 0..3 {
                s += self.m[i][j].norm_sqr();
            }
        }
        s
    }

    /// Apply to a colour 3-vector: `out[i] = Σ_j m[i][j] v[j]`.
    pub fn mul_vec(&self, v: &[Complex64; 3]) -> [Complex64; 3] {
        let mut out = [c(0.0, 0.0); 3];
        for i in 0..3 {
            for j in 0..3 {
                out[i] += self.m[i][j] * v[j];
            }
        }
        out
    }

    /// Project back onto SU(3) via modified Gram-Schmidt on the rows.
    ///
    /// Smearing sums of unitary matrices drift off the group manifold; this
    /// orthonormalizes rows 0 and 1 and rebuilds row 2 so det = 1.
    pub fn reunitarize(self) -> Self {
        let mut u = self;

        let n0 = row_norm(&u, 0);
        if n0 > DIVISION_GUARD {
            let inv = 1.0 / n0;
            for j in 0..3 {
                u.m[0][j] *= inv;
            }
        }

        let dot01 = row_dot(&u, 0, 1);
        for j in 0..3 {
            u.m[1][j] -= u.m[0][j] * dot01;
        }
        let n1 = row_norm(&u, 1);
        if n1 > DIVISION_GUARD {
            let inv = 1.0 / n1;
            for j in 0..3 {
                u.m[1][j] *= inv;
            }
        }

        // Row 2 = conj(row 0 × row 1) fixes the determinant
        u.m[2][0] = (u.m[0][1] * u.m[1][2] - u.m[0][2] * u.m[1][1]).conj();
        u.m[2][1] = (u.m[0][2] * u.m[1][0] - u.m[0][0] * u.m[1][2]).conj();
        u.m[2][2] = (u.m[0][0] * u.m[1][1] - u.m[0][1] * u.m[1][0]).conj();

        u
    }

    /// A random SU(3) matrix near the identity, `exp(i ε H)` for a random
    /// traceless Hermitian `H`, expanded to second order and reunitarized.
    pub fn random_near_identity(seed: &mut u64, epsilon: f64) -> Self {
        let mut h = [[c(0.0, 0.0); 3]; 3];

        let a3 = lcg_gaussian(seed) * epsilon;
        let a8 = lcg_gaussian(seed) * epsilon;
        let r3 = 3.0_f64.sqrt();
        h[0][0] = c(a3 + a8 / r3, 0.0);
        h[1][1] = c(-a3 + a8 / r3, 0.0);
        h[2][2] = c(-2.0 * a8 / r3, 0.0);

        for (i, j) in [(0, 1), (0, 2), (1, 2)] {
            let re = lcg_gaussian(seed) * epsilon;
            let im = lcg_gaussian(seed) * epsilon;
            h[i][j] = c(re, im);
            h[j][i] = c(re, -im);
        }

        let mut result = Self::IDENTITY;
        for i in 0..3 {
            for j in 0..3 {
                result.m[i][j] += c(0.0, 1.0) * h[i][j];
                let h2_ij = (0..3).fold(c(0.0, 0.0), |acc, k| acc + h[i][k] * h[k][j]);
                result.m[i][j] -= h2_ij * 0.5;
            }
        }

        result.reunitarize()
    }
}

const DIVISION_GUARD: f64 = 1e-300;

fn row_norm(u: &Su3, row: usize) -> f64 {
    let mut s = 0.0;
    for j in 0..3 {
        s += u.m[row][j].norm_sqr();
    }
    s.sqrt()
}

fn row_dot(u: &Su3, r1: usize, r2: usize) -> Complex64 {
    let mut s = c(0.0, 0.0);
    for j in 0..3 {
        s += u.m[r1][j].conj() * u.m[r2][j];
    }
    s
}

fn lcg_next(seed: &mut u64) -> f64 {
    *seed = seed
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1442695040888963407);
    (*seed >> 11) as f64 / (1u64 << 53) as f64
}

/// Box-Muller gaussian over a 64-bit LCG; deterministic from the seed.
pub(crate) fn lcg_gaussian(seed: &mut u64) -> f64 {
    let u1 = lcg_next(seed).max(1e-12);
    let u2 = lcg_next(seed);
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}
