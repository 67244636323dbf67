use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::LATTICE_TOLERANCE;

/// Highest order of a crystallographic rotation.
const MAX_ORDER: usize = 6;

/// A single symmetry operation: rotation (integer matrix) + translation, both in
/// fractional coordinates of the cell it was detected in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymmetryOperation {
    /// Integer rotation matrix with determinant ±1
    pub rotation: Matrix3<i32>,
    /// Fractional translation shift
    pub translation: Vector3<f64>,
}

impl SymmetryOperation {
    /// Create a new symmetry operation
    pub fn new(rotation: Matrix3<i32>, translation: Vector3<f64>) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create identity operation
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Apply symmetry operation to a point
    pub fn apply(&self, point: Vector3<f64>) -> Vector3<f64> {
        self.rotation_f64() * point + self.translation
    }

    /// `self ∘ other`: apply `other` first, then `self`.
    pub fn compose(&self, other: &SymmetryOperation) -> SymmetryOperation {
        SymmetryOperation {
            rotation: self.rotation * other.rotation,
            translation: self.rotation_f64() * other.translation + self.translation,
        }
    }

    /// Inverse operation; `None` when the rotation is not unimodular.
    pub fn inverse(&self) -> Option<SymmetryOperation> {
        let rotation = unimodular_inverse(&self.rotation)?;
        let translation = -(rotation.map(|x| x as f64) * self.translation);
        Some(SymmetryOperation {
            rotation,
            translation,
        })
    }

    /// Number of applications needed to return to the identity, up to lattice
    /// translations. `None` for operations that are not crystallographic.
    pub fn order(&self) -> Option<usize> {
        let mut power = self.clone();
        for n in 1..=MAX_ORDER {
            if power.rotation == Matrix3::identity() && is_lattice_vector(&power.translation) {
                return Some(n);
            }
            power = self.compose(&power);
        }
        None
    }

    /// Check if this is the identity operation
    pub fn is_identity(&self) -> bool {
        self.rotation == Matrix3::identity() && self.translation.norm() < LATTICE_TOLERANCE
    }

    /// `true` for rotations, `false` for roto-inversions and mirrors.
    pub fn is_proper(&self) -> bool {
        determinant(&self.rotation) == 1
    }

    pub fn rotation_f64(&self) -> Matrix3<f64> {
        self.rotation.map(|x| x as f64)
    }
}

impl Default for SymmetryOperation {
    fn default() -> Self {
        Self::identity()
    }
}

fn is_lattice_vector(v: &Vector3<f64>) -> bool {
    v.iter().all(|c| (c - c.round()).abs() < LATTICE_TOLERANCE)
}

fn determinant(m: &Matrix3<i32>) -> i32 {
    m[(0, 0)] * (m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)])
        - m[(0, 1)] * (m[(1, 0)] * m[(2, 2)] - m[(1, 2)] * m[(2, 0)])
        + m[(0, 2)] * (m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)])
}

// Adjugate over the determinant; exact in integers when det = ±1
fn unimodular_inverse(m: &Matrix3<i32>) -> Option<Matrix3<i32>> {
    let det = determinant(m);
    if det.abs() != 1 {
        return None;
    }
    let cofactor = |r0: usize, r1: usize, c0: usize, c1: usize| {
        m[(r0, c0)] * m[(r1, c1)] - m[(r0, c1)] * m[(r1, c0)]
    };
    let adjugate = Matrix3::new(
        cofactor(1, 2, 1, 2),
        -cofactor(0, 2, 1, 2),
        cofactor(0, 1, 1, 2),
        -cofactor(1, 2, 0, 2),
        cofactor(0, 2, 0, 2),
        -cofactor(0, 1, 0, 2),
        cofactor(1, 2, 0, 1),
        -cofactor(0, 2, 0, 1),
        cofactor(0, 1, 0, 1),
    );
    Some(adjugate * det)
}
