// Periodic neighbor search over the 3×3×3 block of cell images

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use log::debug;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::CrystalError;
use crate::lattice::lattice3d::Lattice;
use crate::Result;

/// One contact event between two atoms (or periodic images of them).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeighborPair {
    /// Atom index of the first partner; always `i <= j`.
    pub i: usize,
    /// Atom index of the second partner. Equal to `i` for a contact with its own image.
    pub j: usize,
    /// Euclidean distance between the two specific images.
    pub distance: f64,
    /// Lattice translation of the `j` image relative to the `i` image.
    pub image: Vector3<i32>,
}

/// A pooled candidate point: which image of which atom it is.
#[derive(Debug, Clone, Copy)]
struct ImagePoint {
    shift: Vector3<i32>,
    atom: usize,
}

/// The 27 integer shifts in {-1,0,1}³, i-major.
pub(crate) fn neighbor_shifts() -> Vec<Vector3<i32>> {
    let mut shifts = Vec::with_capacity(27);
    for i in -1..=1 {
        for j in -1..=1 {
            for k in -1..=1 {
                shifts.push(Vector3::new(i, j, k));
            }
        }
    }
    shifts
}

impl Lattice {
    /// Find all atom pairs closer than `cutoff`, periodic images included.
    ///
    /// The cell is replicated over the 27 shifts in {-1,0,1}³ and every pooled image pair
    /// within the cutoff is reported: the same atom pair may appear several times (once per
    /// image contact) and an atom may pair with its own image. Distances are between the
    /// specific images, not minimum-image distances. Results are sorted by `(i, j, distance)`.
    pub fn find_neighbors(&self, cutoff: f64) -> Result<Vec<NeighborPair>> {
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(CrystalError::InvalidArgument(format!(
                "neighbor cutoff must be a positive finite distance, got {}",
                cutoff
            )));
        }
        if self.positions_frac.is_empty() {
            return Ok(Vec::new());
        }

        // 1) Pool all images with an explicit (shift, atom) tag per point
        let shifts = neighbor_shifts();
        let mut tags = Vec::with_capacity(shifts.len() * self.num_atoms());
        let mut points: Vec<[f64; 3]> = Vec::with_capacity(tags.capacity());
        for shift in &shifts {
            let shift_f = shift.cast::<f64>();
            for (atom, frac) in self.positions_frac.iter().enumerate() {
                let cart = self.frac_to_cart(frac + shift_f);
                tags.push(ImagePoint { shift: *shift, atom });
                points.push([cart.x, cart.y, cart.z]);
            }
        }

        // 2) Index the pool and query every point, keeping each unordered pair once
        let tree: ImmutableKdTree<f64, 3> = ImmutableKdTree::new_from_slice(&points);
        // The tree's radius test is strict; widen it and keep `<= cutoff` below
        let query_radius_sq = cutoff * cutoff * (1.0 + 1e-12);
        let mut neighbors = Vec::new();

        for (p, query) in points.iter().enumerate() {
            for found in tree.within_unsorted::<SquaredEuclidean>(query, query_radius_sq) {
                let q = found.item as usize;
                if q <= p {
                    continue;
                }
                let distance = pooled_distance(&points[p], &points[q]);
                if distance > cutoff {
                    continue;
                }
                neighbors.push(make_pair(tags[p], tags[q], distance));
            }
        }

        neighbors.sort_by(|a, b| {
            (a.i, a.j)
                .cmp(&(b.i, b.j))
                .then(a.distance.total_cmp(&b.distance))
        });

        debug!(
            "neighbor search: {} atoms, {} pooled images, cutoff {} -> {} contacts",
            self.num_atoms(),
            points.len(),
            cutoff,
            neighbors.len()
        );

        Ok(neighbors)
    }
}

fn pooled_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

// Order the partners so that i <= j; the image offset follows the swap.
fn make_pair(first: ImagePoint, second: ImagePoint, distance: f64) -> NeighborPair {
    if first.atom <= second.atom {
        NeighborPair {
            i: first.atom,
            j: second.atom,
            distance,
            image: second.shift - first.shift,
        }
    } else {
        NeighborPair {
            i: second.atom,
            j: first.atom,
            distance,
            image: first.shift - second.shift,
        }
    }
}
