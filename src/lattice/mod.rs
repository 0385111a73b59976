//! Hypercubic lattice geometry and gauge link storage.
//!
//! Sites live on a periodic `T × L³` grid with coordinates ordered
//! `[t, x, y, z]`; dimension 0 is time. Each site carries four outgoing
//! links, one per positive direction.

pub mod field;
pub mod su3;

pub use field::LinkField;
pub use su3::Su3;

/// Number of lattice dimensions.
pub const NDIM: usize = 4;

/// Spin-colour degrees of freedom per site (4 spin × 3 colour).
pub const DOF_PER_SITE: usize = 12;

/// Dimensions of a periodic hypercubic lattice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatticeShape {
    /// Spatial extent `L` (same in x, y, z).
    pub spatial: usize,
    /// Temporal extent `T`.
    pub temporal: usize,
}

/// One of the eight nearest neighbours of a site.
#[derive(Clone, Copy, Debug)]
pub struct Neighbour {
    /// Lexicographic index of the neighbouring site.
    pub site: usize,
    /// Hop dimension, 0..4.
    pub dim: usize,
    /// True for the +dim neighbour, false for -dim.
    pub forward: bool,
}

impl LatticeShape {
    pub fn new(spatial: usize, temporal: usize) -> Self {
        assert!(spatial > 0 && temporal > 0, "lattice extents must be positive");
        Self { spatial, temporal }
    }

    pub fn n_sites(&self) -> usize {
        self.temporal * self.spatial * self.spatial * self.spatial
    }

    pub fn n_links(&self) -> usize {
        NDIM * self.n_sites()
    }

    /// Total spin-colour degrees of freedom, the Dirac operator dimension.
    pub fn n_dofs(&self) -> usize {
        DOF_PER_SITE * self.n_sites()
    }

    pub fn extent(&self, dim: usize) -> usize {
        if dim == 0 { self.temporal } else { self.spatial }
    }

    /// Lexicographic site index with t slowest and z fastest.
    pub fn site_index(&self, coords: [usize; NDIM]) -> usize {
        let l = self.spatial;
        ((coords[0] * l + coords[1]) * l + coords[2]) * l + coords[3]
    }

    pub fn site_coords(&self, site: usize) -> [usize; NDIM] {
        let l = self.spatial;
        let z = site % l;
        let y = (site / l) % l;
        let x = (site / (l * l)) % l;
        let t = site / (l * l * l);
        [t, x, y, z]
    }

    pub fn link_index(&self, site: usize, dim: usize) -> usize {
        debug_assert!(dim < NDIM);
        NDIM * site + dim
    }

    /// Coordinates shifted by `offset` steps along `dim`, with periodic wrap.
    pub fn shift(&self, coords: [usize; NDIM], dim: usize, offset: isize) -> [usize; NDIM] {
        let ext = self.extent(dim) as isize;
        let mut out = coords;
        out[dim] = (coords[dim] as isize + offset).rem_euclid(ext) as usize;
        out
    }

    /// The eight nearest neighbours of a site, forward then backward per
    /// dimension, in dimension order.
    pub fn neighbours(&self, site: usize) -> [Neighbour; 2 * NDIM] {
        let coords = self.site_coords(site);
        let mut out = [Neighbour { site: 0, dim: 0, forward: true }; 2 * NDIM];
        for dim in 0..NDIM {
            out[2 * dim] = Neighbour {
                site: self.site_index(self.shift(coords, dim, 1)),
                dim,
                forward: true,
            };
            out[2 * dim + 1] = Neighbour {
                site: self.site_index(self.shift(coords, dim, -1)),
                dim,
                forward: false,
            };
        }
        out
    }

    /// Site parity: 0 for even (coordinate sum even), 1 for odd.
    pub fn parity(&self, site: usize) -> usize {
        let c = self.site_coords(site);
        (c[0] + c[1] + c[2] + c[3]) % 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_index_round_trips() {
        let shape = LatticeShape::new(3, 4);
        for site in 0..shape.n_sites() {
            assert_eq!(shape.site_index(shape.site_coords(site)), site);
        }
    }

    #[test]
    fn shift_wraps_periodically() {
        let shape = LatticeShape::new(4, 8);
        assert_eq!(shape.shift([0, 0, 0, 0], 0, -1), [7, 0, 0, 0]);
        assert_eq!(shape.shift([7, 3, 0, 0], 0, 1), [0, 3, 0, 0]);
        assert_eq!(shape.shift([0, 3, 0, 0], 1, 1), [0, 0, 0, 0]);
        assert_eq!(shape.shift([0, 0, 2, 3], 3, 2), [0, 0, 2, 1]);
    }

    #[test]
    fn neighbours_are_mutual() {
        let shape = LatticeShape::new(2, 4);
        for site in 0..shape.n_sites() {
            for nb in shape.neighbours(site) {
                let back = shape.neighbours(nb.site);
                let found = back
                    .iter()
                    .any(|b| b.site == site && b.dim == nb.dim && b.forward != nb.forward);
                assert!(found, "neighbour relation not symmetric at site {site}");
            }
        }
    }

    #[test]
    fn parity_alternates_across_links() {
        let shape = LatticeShape::new(4, 4);
        for site in 0..shape.n_sites() {
            for nb in shape.neighbours(site) {
                assert_ne!(shape.parity(site), shape.parity(nb.site));
            }
        }
    }

    #[test]
    fn counts() {
        let shape = LatticeShape::new(4, 8);
        assert_eq!(shape.n_sites(), 512);
        assert_eq!(shape.n_links(), 2048);
        assert_eq!(shape.n_dofs(), 6144);
    }
}
