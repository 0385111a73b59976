//! latprop: Wilson-Dirac operators and Krylov solvers for lattice QCD
//! quark propagators.
//!
//! The crate assembles the Wilson-Dirac operator from a gauge link field,
//! optionally smears links and sources, and inverts the operator with CG
//! (plain or even-odd preconditioned), BiCGSTAB, or restarted GMRES to
//! build full point-source propagators.
//!
//! ```no_run
//! use latprop::config::{SmearingOptions, SolverOptions};
//! use latprop::lattice::{LatticeShape, LinkField};
//! use latprop::propagator::{PropagatorOptions, compute_propagator};
//!
//! let mut field = LinkField::hot_start(LatticeShape::new(4, 8), 42);
//! let opts = PropagatorOptions {
//!     mass: 0.4,
//!     spacing: 1.0,
//!     source_site: [0, 0, 0, 0],
//!     smearing: SmearingOptions::default(),
//!     solver: SolverOptions::default(),
//! };
//! let prop = compute_propagator(&mut field, &opts).unwrap();
//! println!("first solve took {} iterations", prop.stats[0].iterations);
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod lattice;
pub mod matrix;
pub mod operator;
pub mod propagator;
pub mod solver;
pub mod utils;

pub use config::{SmearingOptions, SolverMethod, SolverOptions};
pub use error::LatError;
pub use lattice::{LatticeShape, LinkField};
pub use matrix::SparseOperator;
pub use operator::{DiracMatrix, LinearOperator, NormalOperator, WilsonOperator};
pub use propagator::{Propagator, PropagatorOptions, compute_propagator};
pub use solver::{BiCgStabSolver, CgSolver, GmresSolver, LinearSolver, solve_dirac};
pub use utils::{Convergence, SolveStats};
