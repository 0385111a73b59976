//! Core numeric building blocks: γ-matrix constants and vector kernels.

pub mod gamma;
pub mod vector;
