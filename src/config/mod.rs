//! Run-time options for solvers and smearing.

pub mod options;

pub use options::{SmearingOptions, SolverMethod, SolverOptions};
