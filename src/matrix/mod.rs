//! Sparse matrix storage for assembled operators.

pub mod sparse;

pub use sparse::SparseOperator;
