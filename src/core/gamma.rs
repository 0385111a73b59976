//! Euclidean Dirac γ matrices and γ5 algebra.
//!
//! Fixed physics constants of the Wilson discretization: the four Hermitian
//! Euclidean γ matrices in the Dirac-Pauli basis, indexed by lattice
//! dimension (0 = time, 1..3 = space), plus γ5 = γ0 γ1 γ2 γ3. They satisfy
//! {γ_μ, γ_ν} = 2 δ_μν and γ5 γ_μ γ5 = −γ_μ, which gives the Wilson-Dirac
//! operator its γ5-hermiticity: γ5 D γ5 = D†.
//!
//! These are process-wide immutable tables; builders and operators take them
//! by reference and never mutate them.

use num_complex::Complex64;

/// 4×4 complex matrix acting on the spin index, `m[row][col]`.
pub type SpinMatrix = [[Complex64; 4]; 4];

const fn c(re: f64, im: f64) -> Complex64 {
    Complex64 { re, im }
}

const O: Complex64 = c(0.0, 0.0);
const P: Complex64 = c(1.0, 0.0);
const N: Complex64 = c(-1.0, 0.0);
const I: Complex64 = c(0.0, 1.0);
const MI: Complex64 = c(0.0, -1.0);

/// 4×4 identity in spin space.
pub const SPIN_IDENTITY: SpinMatrix = [
    [P, O, O, O],
    [O, P, O, O],
    [O, O, P, O],
    [O, O, O, P],
];

/// γ matrices indexed by lattice dimension: `GAMMAS[0]` is temporal.
pub static GAMMAS: [SpinMatrix; 4] = [
    // γ_t = diag(1, 1, -1, -1)
    [
        [P, O, O, O],
        [O, P, O, O],
        [O, O, N, O],
        [O, O, O, N],
    ],
    // γ_x
    [
        [O, O, O, MI],
        [O, O, MI, O],
        [O, I, O, O],
        [I, O, O, O],
    ],
    // γ_y
    [
        [O, O, O, N],
        [O, O, P, O],
        [O, P, O, O],
        [N, O, O, O],
    ],
    // γ_z
    [
        [O, O, MI, O],
        [O, O, O, I],
        [I, O, O, O],
        [O, MI, O, O],
    ],
];

/// γ5: antidiagonal identity in this basis (swaps the spin doublets).
pub static GAMMA5: SpinMatrix = [
    [O, O, P, O],
    [O, O, O, P],
    [P, O, O, O],
    [O, P, O, O],
];

/// The Wilson hopping spin block `I + γ_d` (forward) or `I − γ_d` (backward).
pub fn wilson_projector(dim: usize, forward: bool) -> SpinMatrix {
    let g = &GAMMAS[dim];
    let mut out = SPIN_IDENTITY;
    for k in 0..4 {
        for l in 0..4 {
            if forward {
                out[k][l] += g[k][l];
            } else {
                out[k][l] -= g[k][l];
            }
        }
    }
    out
}

/// Multiply a spin-colour vector by γ5 blockwise.
///
/// The vector is site-major with 12 entries per site (`3·spin + colour`);
/// γ5 in this basis swaps spins 0↔2 and 1↔3, colour untouched.
pub fn multiply_gamma5(v: &[Complex64]) -> Vec<Complex64> {
    assert_eq!(v.len() % 12, 0, "vector length must be a multiple of 12");
    let mut out = vec![Complex64::new(0.0, 0.0); v.len()];
    for (ob, vb) in out.chunks_exact_mut(12).zip(v.chunks_exact(12)) {
        ob[0..6].copy_from_slice(&vb[6..12]);
        ob[6..12].copy_from_slice(&vb[0..6]);
    }
    out
}
