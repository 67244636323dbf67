use std::f64::consts::PI;

use log::debug;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::BASE_VECTOR_TOLERANCE;
use crate::error::CrystalError;
use crate::lattice::Lattice;
use crate::lattice::polyhedron::Polyhedron;
use crate::reciprocal::brillouin_zone::first_brillouin_zone;
use crate::Result;

/// Reciprocal lattice of a real-space [`Lattice`].
///
/// Rows of `basis` are b1, b2, b3 with `a_i · b_j = 2π δ_ij`. The basis is fixed at
/// construction and depends only on the real-space basis vectors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalLattice {
    basis: Matrix3<f64>,
}

impl ReciprocalLattice {
    /// Derive the reciprocal basis of `real_lattice`.
    pub fn new(real_lattice: &Lattice) -> Result<Self> {
        Self::from_real_basis(real_lattice.basis(), BASE_VECTOR_TOLERANCE)
    }

    /// Derive the reciprocal basis from real-space basis rows.
    ///
    /// `V = a1 · (a2 × a3)`, `b1 = 2π (a2 × a3) / V`, `b2 = 2π (a3 × a1) / V`,
    /// `b3 = 2π (a1 × a2) / V`. Fails with `DegenerateGeometry` when `|V|` is below
    /// `tolerance` times `|a1| |a2| |a3|` (coplanar or vanishing vectors).
    pub fn from_real_basis(real_basis: &Matrix3<f64>, tolerance: f64) -> Result<Self> {
        let basis = dual_basis(real_basis, tolerance)?;
        debug!("reciprocal basis volume {:.6}", basis.determinant());
        Ok(ReciprocalLattice { basis })
    }

    /// Reciprocal basis, one vector per row.
    pub fn basis(&self) -> &Matrix3<f64> {
        &self.basis
    }

    pub fn basis_vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.basis.row(0).transpose(),
            self.basis.row(1).transpose(),
            self.basis.row(2).transpose(),
        ]
    }

    /// Real-space basis recovered from the reciprocal one (the same construction applied
    /// in reverse).
    pub fn real_basis(&self) -> Result<Matrix3<f64>> {
        dual_basis(&self.basis, BASE_VECTOR_TOLERANCE)
    }

    /// Reciprocal cell volume `b1 · (b2 × b3) = (2π)³ / V`.
    pub fn volume(&self) -> f64 {
        let [b1, b2, b3] = self.basis_vectors();
        b1.dot(&b2.cross(&b3))
    }

    /// Fractional k-point (in units of b1, b2, b3) → Cartesian.
    pub fn frac_to_cart(&self, k_frac: Vector3<f64>) -> Vector3<f64> {
        self.basis.tr_mul(&k_frac)
    }

    /// Cartesian k-point → fractional.
    pub fn cart_to_frac(&self, k_cart: Vector3<f64>) -> Result<Vector3<f64>> {
        let inverse = self.basis.transpose().try_inverse().ok_or_else(|| {
            CrystalError::DegenerateGeometry("reciprocal basis is not invertible".to_string())
        })?;
        Ok(inverse * k_cart)
    }

    /// Reciprocal points `(i, j, k) · basis` for every index in `[-shell, shell]`.
    ///
    /// Returns `(2·shell + 1)³` points, iterated i-major; `shell = 0` gives the origin only.
    pub fn enumerate_points(&self, shell: usize) -> Vec<Vector3<f64>> {
        let limit = shell as i64;
        let side = 2 * shell + 1;
        let mut points = Vec::with_capacity(side * side * side);
        for i in -limit..=limit {
            for j in -limit..=limit {
                for k in -limit..=limit {
                    let index = Vector3::new(i as f64, j as f64, k as f64);
                    points.push(self.frac_to_cart(index));
                }
            }
        }
        points
    }

    /// Approximate first Brillouin zone: the convex hull of the shell-1 point cloud.
    ///
    /// This is the hull of nearby reciprocal points, not a Voronoi construction. The
    /// polyhedron's vertices are the hull corners in enumeration order.
    pub fn first_brillouin_zone(&self) -> Result<Polyhedron> {
        first_brillouin_zone(&self.enumerate_points(1))
    }

    /// Vertex coordinates of [`ReciprocalLattice::first_brillouin_zone`].
    pub fn first_brillouin_zone_vertices(&self) -> Result<Vec<Vector3<f64>>> {
        Ok(self.first_brillouin_zone()?.vertices)
    }
}

// b_i = 2π (a_j × a_k) / V for rows a_i; the map is its own inverse
fn dual_basis(basis: &Matrix3<f64>, tolerance: f64) -> Result<Matrix3<f64>> {
    let a1: Vector3<f64> = basis.row(0).transpose();
    let a2: Vector3<f64> = basis.row(1).transpose();
    let a3: Vector3<f64> = basis.row(2).transpose();

    let volume = a1.dot(&a2.cross(&a3));
    let scale = a1.norm() * a2.norm() * a3.norm();
    if !volume.is_finite() || volume.abs() <= tolerance * scale || scale == 0.0 {
        return Err(CrystalError::DegenerateGeometry(format!(
            "basis vectors are coplanar or vanishing (cell volume {:e})",
            volume
        )));
    }

    let factor = 2.0 * PI / volume;
    let b1 = a2.cross(&a3) * factor;
    let b2 = a3.cross(&a1) * factor;
    let b3 = a1.cross(&a2) * factor;

    Ok(Matrix3::from_rows(&[
        b1.transpose(),
        b2.transpose(),
        b3.transpose(),
    ]))
}
