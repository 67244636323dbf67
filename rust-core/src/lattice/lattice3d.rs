use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::config::BASE_VECTOR_TOLERANCE;
use crate::error::CrystalError;
use crate::Result;

/// A periodic crystal: three basis vectors plus a decorated unit cell.
///
/// The basis is stored with the lattice vectors as *rows*, so Cartesian positions are
/// `frac · basis`. A `Lattice` is immutable once built; operations such as
/// [`Lattice::make_supercell`] return new, independent values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LatticeRecord", into = "LatticeRecord")]
pub struct Lattice {
    pub(super) basis: Matrix3<f64>,
    pub(super) species: Vec<String>,
    pub(super) positions_frac: Vec<Vector3<f64>>,
}

/// Plain-array form of a [`Lattice`] used for (de)serialization.
///
/// ```toml
/// basis = [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]]
/// species = ["Na", "Cl"]
/// positions = [[0.0, 0.0, 0.0], [0.5, 0.5, 0.5]]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatticeRecord {
    pub basis: [[f64; 3]; 3],
    pub species: Vec<String>,
    pub positions: Vec<[f64; 3]>,
}

impl Lattice {
    /// Construct a lattice from a row-vector basis, species labels and fractional positions.
    ///
    /// Fractional coordinates outside `[0, 1)` are accepted as given.
    pub fn new(
        basis: Matrix3<f64>,
        species: Vec<String>,
        positions_frac: Vec<Vector3<f64>>,
    ) -> Result<Self> {
        if species.len() != positions_frac.len() {
            return Err(CrystalError::shape(
                "species labels",
                positions_frac.len(),
                species.len(),
            ));
        }

        Ok(Lattice {
            basis,
            species,
            positions_frac,
        })
    }

    /// Construct from a flat row-major `N×3` coordinate buffer.
    pub fn from_flat(basis: Matrix3<f64>, species: Vec<String>, positions: &[f64]) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(CrystalError::shape(
                "fractional position rows",
                3,
                positions.len() % 3,
            ));
        }

        let positions_frac = positions
            .chunks_exact(3)
            .map(|row| Vector3::new(row[0], row[1], row[2]))
            .collect();
        Self::new(basis, species, positions_frac)
    }

    /// Construct from basis vectors given separately (`a1`, `a2`, `a3`).
    pub fn from_vectors(
        a1: Vector3<f64>,
        a2: Vector3<f64>,
        a3: Vector3<f64>,
        species: Vec<String>,
        positions_frac: Vec<Vector3<f64>>,
    ) -> Result<Self> {
        let basis = Matrix3::from_rows(&[a1.transpose(), a2.transpose(), a3.transpose()]);
        Self::new(basis, species, positions_frac)
    }

    // ======================== ACCESSORS ========================

    /// Basis matrix, one lattice vector per row.
    pub fn basis(&self) -> &Matrix3<f64> {
        &self.basis
    }

    /// Lattice vectors a1, a2, a3.
    pub fn lattice_vectors(&self) -> [Vector3<f64>; 3] {
        [
            self.basis.row(0).transpose(),
            self.basis.row(1).transpose(),
            self.basis.row(2).transpose(),
        ]
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn positions_frac(&self) -> &[Vector3<f64>] {
        &self.positions_frac
    }

    pub fn num_atoms(&self) -> usize {
        self.positions_frac.len()
    }

    // ======================== COORDINATE TRANSFORMS ========================

    /// Convert fractional (u,v,w) coords → cartesian.
    pub fn frac_to_cart(&self, v_frac: Vector3<f64>) -> Vector3<f64> {
        self.basis.tr_mul(&v_frac)
    }

    /// Convert cartesian coords → fractional (u,v,w).
    pub fn cart_to_frac(&self, v_cart: Vector3<f64>) -> Result<Vector3<f64>> {
        Ok(self.inverse_transpose()? * v_cart)
    }

    /// Cartesian positions of all atoms (`positions_frac · basis`).
    pub fn cartesian_positions(&self) -> Vec<Vector3<f64>> {
        self.positions_frac
            .iter()
            .map(|frac| self.frac_to_cart(*frac))
            .collect()
    }

    /// Map a batch of Cartesian positions back to fractional coordinates.
    pub fn fractional_positions_from_cartesian(
        &self,
        cartesian: &[Vector3<f64>],
    ) -> Result<Vec<Vector3<f64>>> {
        let inverse = self.inverse_transpose()?;
        Ok(cartesian.iter().map(|cart| inverse * cart).collect())
    }

    fn inverse_transpose(&self) -> Result<Matrix3<f64>> {
        if self.volume().abs() < BASE_VECTOR_TOLERANCE {
            return Err(CrystalError::DegenerateGeometry(
                "lattice vectors are coplanar; fractional coordinates are undefined".to_string(),
            ));
        }
        self.basis.transpose().try_inverse().ok_or_else(|| {
            CrystalError::DegenerateGeometry("basis matrix is not invertible".to_string())
        })
    }

    // ======================== CELL METRICS ========================

    /// Signed cell volume `a1 · (a2 × a3)`.
    pub fn volume(&self) -> f64 {
        let [a1, a2, a3] = self.lattice_vectors();
        a1.dot(&a2.cross(&a3))
    }

    /// Metric tensor G_ij = a_i · a_j.
    pub fn metric_tensor(&self) -> Matrix3<f64> {
        self.basis * self.basis.transpose()
    }

    /// Get lattice parameters: a, b, c (lengths)
    pub fn lattice_parameters(&self) -> (f64, f64, f64) {
        let metric = self.metric_tensor();
        (
            metric[(0, 0)].sqrt(),
            metric[(1, 1)].sqrt(),
            metric[(2, 2)].sqrt(),
        )
    }

    /// Get lattice angles: α, β, γ (in radians)
    pub fn lattice_angles(&self) -> (f64, f64, f64) {
        let metric = self.metric_tensor();
        let (a, b, c) = self.lattice_parameters();

        // α = angle between b and c, β = between a and c, γ = between a and b
        let alpha = (metric[(1, 2)] / (b * c)).clamp(-1.0, 1.0).acos();
        let beta = (metric[(0, 2)] / (a * c)).clamp(-1.0, 1.0).acos();
        let gamma = (metric[(0, 1)] / (a * b)).clamp(-1.0, 1.0).acos();

        (alpha, beta, gamma)
    }

    /// Copy of the lattice with every fractional coordinate wrapped into `[0, 1)`.
    pub fn wrapped(&self) -> Lattice {
        let positions_frac = self
            .positions_frac
            .iter()
            .map(|frac| frac.map(|u| u - u.floor()))
            .collect();

        Lattice {
            basis: self.basis,
            species: self.species.clone(),
            positions_frac,
        }
    }

    // ======================== UNIT CELL OUTLINE ========================

    /// The 8 corners of the unit cell parallelepiped.
    ///
    /// Ordered: origin, a1, a2, a3, a1+a2, a1+a3, a2+a3, a1+a2+a3.
    pub fn cell_corners(&self) -> [Vector3<f64>; 8] {
        let [a1, a2, a3] = self.lattice_vectors();
        [
            Vector3::zeros(),
            a1,
            a2,
            a3,
            a1 + a2,
            a1 + a3,
            a2 + a3,
            a1 + a2 + a3,
        ]
    }

    /// The 12 cell edges as index pairs into [`Lattice::cell_corners`].
    pub fn cell_edges() -> [(usize, usize); 12] {
        [
            (0, 1),
            (0, 2),
            (0, 3),
            (1, 4),
            (1, 5),
            (2, 4),
            (2, 6),
            (3, 5),
            (3, 6),
            (4, 7),
            (5, 7),
            (6, 7),
        ]
    }
}

impl TryFrom<LatticeRecord> for Lattice {
    type Error = CrystalError;

    fn try_from(record: LatticeRecord) -> Result<Self> {
        let basis = Matrix3::from_fn(|i, j| record.basis[i][j]);
        let positions = record.positions.iter().map(|p| Vector3::from(*p)).collect();
        Lattice::new(basis, record.species, positions)
    }
}

impl From<Lattice> for LatticeRecord {
    fn from(lattice: Lattice) -> Self {
        let b = lattice.basis;
        LatticeRecord {
            basis: [
                [b[(0, 0)], b[(0, 1)], b[(0, 2)]],
                [b[(1, 0)], b[(1, 1)], b[(1, 2)]],
                [b[(2, 0)], b[(2, 1)], b[(2, 2)]],
            ],
            species: lattice.species,
            positions: lattice
                .positions_frac
                .iter()
                .map(|p| [p.x, p.y, p.z])
                .collect(),
        }
    }
}
