//! Gauge link storage and APE link smearing.

use crate::lattice::su3::Su3;
use crate::lattice::{LatticeShape, NDIM};

/// The gauge field: one SU(3) matrix per directed lattice link.
///
/// Links are stored per site in dimension order, so the link leaving
/// `site` along `dim` lives at `4 * site + dim`.
#[derive(Clone, Debug)]
pub struct LinkField {
    shape: LatticeShape,
    links: Vec<Su3>,
}

impl LinkField {
    /// All links set to the identity (zero-temperature start).
    pub fn cold_start(shape: LatticeShape) -> Self {
        Self {
            shape,
            links: vec![Su3::IDENTITY; shape.n_links()],
        }
    }

    /// Random links near the identity, deterministic from the seed.
    pub fn hot_start(shape: LatticeShape, mut seed: u64) -> Self {
        let links = (0..shape.n_links())
            .map(|_| Su3::random_near_identity(&mut seed, 0.5))
            .collect();
        Self { shape, links }
    }

    pub fn shape(&self) -> LatticeShape {
        self.shape
    }

    pub fn link(&self, site: usize, dim: usize) -> Su3 {
        self.links[self.shape.link_index(site, dim)]
    }

    pub fn link_at(&self, coords: [usize; NDIM], dim: usize) -> Su3 {
        self.link(self.shape.site_index(coords), dim)
    }

    pub fn set_link(&mut self, site: usize, dim: usize, value: Su3) {
        let idx = self.shape.link_index(site, dim);
        self.links[idx] = value;
    }

    /// Copy of the full link array, for save/restore around smearing.
    pub fn snapshot(&self) -> Vec<Su3> {
        self.links.clone()
    }

    pub fn restore(&mut self, snapshot: Vec<Su3>) {
        assert_eq!(snapshot.len(), self.links.len(), "snapshot size mismatch");
        self.links = snapshot;
    }

    /// APE-smear the spatial links on one time slice, `n_smears` times.
    ///
    /// Each sweep replaces every spatial link with
    /// `(1 - alpha) U + (alpha / 4) * (sum of the four spatial staples)`,
    /// projected back onto SU(3). Temporal links are untouched. All new
    /// links within a sweep are computed from the pre-sweep field.
    pub fn smear_time_slice(&mut self, time: usize, n_smears: usize, alpha: f64) {
        for _ in 0..n_smears {
            let old = self.clone();
            let l = self.shape.spatial;
            for x in 0..l {
                for y in 0..l {
                    for z in 0..l {
                        let coords = [time, x, y, z];
                        let site = self.shape.site_index(coords);
                        for dim in 1..NDIM {
                            let staples = old.spatial_staples(coords, dim);
                            let smeared = old.link(site, dim).scale(1.0 - alpha)
                                + staples.scale(alpha / 4.0);
                            self.set_link(site, dim, smeared.reunitarize());
                        }
                    }
                }
            }
        }
    }

    /// Sum of the spatial staples around the link at `coords` along `dim`.
    ///
    /// For each spatial direction `nu != dim` this adds the upper staple
    /// `U_nu(x+dim) U_dim(x+nu)† U_nu(x)†` and the lower staple
    /// `U_nu(x+dim-nu)† U_dim(x-nu)† U_nu(x-nu)`.
    fn spatial_staples(&self, coords: [usize; NDIM], dim: usize) -> Su3 {
        let shape = self.shape;
        let mut sum = Su3::ZERO;
        for nu in 1..NDIM {
            if nu == dim {
                continue;
            }
            let fwd = shape.shift(coords, dim, 1);
            let up = shape.shift(coords, nu, 1);
            let down = shape.shift(coords, nu, -1);
            let fwd_down = shape.shift(fwd, nu, -1);

            sum = sum
                + self.link_at(fwd, nu)
                    * self.link_at(up, dim).adjoint()
                    * self.link_at(coords, nu).adjoint();
            sum = sum
                + self.link_at(fwd_down, nu).adjoint()
                    * self.link_at(down, dim).adjoint()
                    * self.link_at(down, nu);
        }
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cold_start_is_identity_everywhere() {
        let field = LinkField::cold_start(LatticeShape::new(2, 2));
        for site in 0..field.shape().n_sites() {
            for dim in 0..NDIM {
                assert_eq!(field.link(site, dim), Su3::IDENTITY);
            }
        }
    }

    #[test]
    fn smearing_identity_field_is_a_fixed_point() {
        // Identity links: the four staples sum to 4 I, so
        // (1-a) I + (a/4) 4 I = I.
        let mut field = LinkField::cold_start(LatticeShape::new(2, 4));
        field.smear_time_slice(1, 3, 0.5);
        for site in 0..field.shape().n_sites() {
            for dim in 0..NDIM {
                assert!((field.link(site, dim) - Su3::IDENTITY).norm_sq() < 1e-20);
            }
        }
    }

    #[test]
    fn smearing_leaves_other_slices_and_temporal_links_alone() {
        let shape = LatticeShape::new(2, 4);
        let mut field = LinkField::hot_start(shape, 77);
        let before = field.snapshot();
        field.smear_time_slice(2, 1, 0.4);
        for site in 0..shape.n_sites() {
            let t = shape.site_coords(site)[0];
            for dim in 0..NDIM {
                let idx = shape.link_index(site, dim);
                if t != 2 || dim == 0 {
                    assert_eq!(field.link(site, dim), before[idx]);
                }
            }
        }
    }

    #[test]
    fn snapshot_restore_round_trips_exactly() {
        let shape = LatticeShape::new(2, 2);
        let mut field = LinkField::hot_start(shape, 5);
        let saved = field.snapshot();
        for t in 0..shape.temporal {
            field.smear_time_slice(t, 2, 0.5);
        }
        field.restore(saved.clone());
        assert_eq!(field.snapshot(), saved);
    }

    #[test]
    fn smeared_links_stay_unitary() {
        let shape = LatticeShape::new(2, 2);
        let mut field = LinkField::hot_start(shape, 31);
        field.smear_time_slice(0, 2, 0.5);
        for site in 0..shape.n_sites() {
            for dim in 0..NDIM {
                let u = field.link(site, dim);
                let prod = u * u.adjoint();
                assert!((prod - Su3::IDENTITY).norm_sq() < 1e-18);
            }
        }
    }
}
