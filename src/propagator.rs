//! Quark propagator assembly.
//!
//! A propagator is the Dirac-operator inverse restricted to one source
//! site: twelve solves, one per source spin-colour component, gathered
//! into a 12x12 block per lattice site.

use num_complex::Complex64;

use crate::config::{SmearingOptions, SolverOptions};
use crate::error::LatError;
use crate::lattice::{DOF_PER_SITE, LatticeShape, LinkField, NDIM};
use crate::matrix::SparseOperator;
use crate::operator::{DiracMatrix, build_smearing};
use crate::solver::solve_dirac;
use crate::utils::SolveStats;

/// Per-site 12x12 propagator blocks. Column `3 * spin + colour` holds the
/// solution for that source component.
pub struct Propagator {
    shape: LatticeShape,
    blocks: Vec<[[Complex64; DOF_PER_SITE]; DOF_PER_SITE]>,
    /// Diagnostics of the twelve solves, in source-component order.
    pub stats: Vec<SolveStats>,
}

impl Propagator {
    pub fn shape(&self) -> LatticeShape {
        self.shape
    }

    pub fn block(&self, site: usize) -> &[[Complex64; DOF_PER_SITE]; DOF_PER_SITE] {
        &self.blocks[site]
    }

    /// Entry for sink (spin, colour) row and source (spin, colour) column.
    pub fn entry(
        &self,
        site: usize,
        sink_spin: usize,
        sink_colour: usize,
        src_spin: usize,
        src_colour: usize,
    ) -> Complex64 {
        self.blocks[site][3 * sink_spin + sink_colour][3 * src_spin + src_colour]
    }
}

/// Everything a propagator computation needs besides the gauge field.
#[derive(Clone, Copy, Debug)]
pub struct PropagatorOptions {
    pub mass: f64,
    pub spacing: f64,
    pub source_site: [usize; NDIM],
    pub smearing: SmearingOptions,
    pub solver: SolverOptions,
}

/// A unit source at (site, spin, colour), pushed through the source
/// smearing operator.
pub fn point_source(
    shape: LatticeShape,
    site: usize,
    spin: usize,
    colour: usize,
    smearing: &SparseOperator,
) -> Vec<Complex64> {
    let mut source = vec![Complex64 { re: 0.0, im: 0.0 }; shape.n_dofs()];
    source[DOF_PER_SITE * site + 3 * spin + colour] = Complex64 { re: 1.0, im: 0.0 };
    smearing.apply_vec(&source)
}

/// Compute the full propagator from the given source site.
///
/// Field smearing is applied slice by slice before the Dirac operator is
/// assembled and undone afterwards, so the caller's links are bit-identical
/// on return. Source and sink smearing operators are built from the
/// unsmeared field. Any solver failure aborts the whole computation; no
/// partially filled propagator is ever returned.
pub fn compute_propagator(
    field: &mut LinkField,
    opts: &PropagatorOptions,
) -> Result<Propagator, LatError> {
    let shape = field.shape();
    let smear = &opts.smearing;

    let dirac = if smear.n_field_smears > 0 {
        let saved = field.snapshot();
        for t in 0..shape.temporal {
            field.smear_time_slice(t, smear.n_field_smears, smear.field_param);
        }
        let dirac = DiracMatrix::new(field, opts.mass, opts.spacing);
        field.restore(saved);
        dirac
    } else {
        DiracMatrix::new(field, opts.mass, opts.spacing)
    };

    let source_smearing = build_smearing(field, smear.source_param, smear.n_source_smears);
    let sink_smearing = build_smearing(field, smear.sink_param, smear.n_sink_smears);

    let site = shape.site_index(opts.source_site);
    let mut blocks = vec![[[Complex64 { re: 0.0, im: 0.0 }; DOF_PER_SITE]; DOF_PER_SITE];
        shape.n_sites()];
    let mut stats = Vec::with_capacity(DOF_PER_SITE);

    for spin in 0..4 {
        for colour in 0..3 {
            let source = point_source(shape, site, spin, colour, &source_smearing);
            let (solution, solve_stats) = solve_dirac(&dirac, &source, &opts.solver)?;
            let solution = sink_smearing.apply_vec(&solution);
            stats.push(solve_stats);

            let col = 3 * spin + colour;
            for (s, block) in blocks.iter_mut().enumerate() {
                for row in 0..DOF_PER_SITE {
                    block[row][col] = solution[DOF_PER_SITE * s + row];
                }
            }
        }
    }

    Ok(Propagator { shape, blocks, stats })
}
