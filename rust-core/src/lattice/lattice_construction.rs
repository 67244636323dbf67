use log::debug;
use nalgebra::{Matrix3, Vector3};

use crate::error::CrystalError;
use crate::lattice::lattice3d::Lattice;
use crate::Result;

/// Standard lattice construction utilities for common 3D bases (rows are lattice vectors)

/// Simple cubic basis with lattice parameter `a`
pub fn simple_cubic_basis(a: f64) -> Matrix3<f64> {
    Matrix3::new(
        a, 0.0, 0.0,
        0.0, a, 0.0,
        0.0, 0.0, a,
    )
}

/// Primitive body-centred cubic basis for conventional parameter `a`
pub fn body_centered_cubic_basis(a: f64) -> Matrix3<f64> {
    let h = a / 2.0;
    Matrix3::new(
        -h, h, h,
        h, -h, h,
        h, h, -h,
    )
}

/// Primitive face-centred cubic basis for conventional parameter `a`
pub fn face_centered_cubic_basis(a: f64) -> Matrix3<f64> {
    let h = a / 2.0;
    Matrix3::new(
        0.0, h, h,
        h, 0.0, h,
        h, h, 0.0,
    )
}

pub fn tetragonal_basis(a: f64, c: f64) -> Matrix3<f64> {
    orthorhombic_basis(a, a, c)
}

pub fn orthorhombic_basis(a: f64, b: f64, c: f64) -> Matrix3<f64> {
    Matrix3::new(
        a, 0.0, 0.0,
        0.0, b, 0.0,
        0.0, 0.0, c,
    )
}

/// Hexagonal basis with a1 along x and γ = 120°
pub fn hexagonal_basis(a: f64, c: f64) -> Matrix3<f64> {
    Matrix3::new(
        a, 0.0, 0.0,
        -a / 2.0, a * 3.0_f64.sqrt() / 2.0, 0.0,
        0.0, 0.0, c,
    )
}

impl Lattice {
    /// Build an `na × nb × nc` supercell.
    ///
    /// Replicas are visited i-major over `(i, j, k) ∈ [0,na)×[0,nb)×[0,nc)`; for each replica
    /// every atom is appended with fractional coordinates `(frac + shift) / (na, nb, nc)` and
    /// its species label, so species and positions stay aligned. Basis rows are scaled by the
    /// multipliers.
    pub fn make_supercell(&self, na: usize, nb: usize, nc: usize) -> Result<Lattice> {
        if na == 0 || nb == 0 || nc == 0 {
            return Err(CrystalError::InvalidArgument(format!(
                "supercell multipliers must be positive, got ({}, {}, {})",
                na, nb, nc
            )));
        }

        let scale = Vector3::new(na as f64, nb as f64, nc as f64);
        let replicas = na * nb * nc;
        let mut positions = Vec::with_capacity(replicas * self.num_atoms());
        let mut species = Vec::with_capacity(replicas * self.num_atoms());

        for i in 0..na {
            for j in 0..nb {
                for k in 0..nc {
                    let shift = Vector3::new(i as f64, j as f64, k as f64);
                    for (frac, label) in self.positions_frac.iter().zip(&self.species) {
                        positions.push((frac + shift).component_div(&scale));
                        species.push(label.clone());
                    }
                }
            }
        }

        let mut basis = self.basis;
        for (row, factor) in scale.iter().enumerate() {
            basis.row_mut(row).scale_mut(*factor);
        }

        debug!(
            "supercell {}x{}x{}: {} -> {} atoms",
            na,
            nb,
            nc,
            self.num_atoms(),
            positions.len()
        );

        Lattice::new(basis, species, positions)
    }
}
