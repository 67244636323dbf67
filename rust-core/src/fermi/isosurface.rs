use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::geometries::TriangleMesh;

/// Constant-energy surface in Cartesian k-space.
///
/// Faces index into `vertices`; `normals` has one unit vector per vertex pointing
/// towards higher energy. `face_bands[f]` names the band whose sheet face `f` belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IsoSurface {
    pub vertices: Vec<Vector3<f64>>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Vec<Vector3<f64>>,
    pub face_bands: Vec<usize>,
}

impl IsoSurface {
    /// Map a grid-index mesh into k-space.
    ///
    /// Vertices are divided by `resolution - 1` (grid index → fractional) and multiplied
    /// by the reciprocal basis rows. Normals transform with the inverse basis so they stay
    /// perpendicular to the mapped surface.
    pub(crate) fn from_grid_mesh(
        mesh: TriangleMesh,
        resolution: usize,
        reciprocal_basis: &Matrix3<f64>,
        normal_map: &Matrix3<f64>,
        band: usize,
    ) -> Self {
        let step = (resolution.max(2) - 1) as f64;

        let vertices = mesh
            .vertices
            .iter()
            .map(|v| reciprocal_basis.tr_mul(&(v / step)))
            .collect();
        let normals = mesh
            .normals
            .iter()
            .map(|n| {
                (normal_map * n)
                    .try_normalize(f64::EPSILON)
                    .unwrap_or_else(Vector3::zeros)
            })
            .collect();
        let face_bands = vec![band; mesh.faces.len()];

        IsoSurface {
            vertices,
            faces: mesh.faces,
            normals,
            face_bands,
        }
    }

    /// Append another sheet, offsetting its face indices.
    pub fn merge(&mut self, other: IsoSurface) {
        let offset = self.vertices.len();
        self.vertices.extend(other.vertices);
        self.normals.extend(other.normals);
        self.faces.extend(
            other
                .faces
                .into_iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
        self.face_bands.extend(other.face_bands);
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Total surface area in k-space units.
    pub fn area(&self) -> f64 {
        self.faces
            .iter()
            .map(|f| {
                let a = self.vertices[f[0]];
                (self.vertices[f[1]] - a)
                    .cross(&(self.vertices[f[2]] - a))
                    .norm()
                    / 2.0
            })
            .sum()
    }

    /// Sorted, deduplicated list of bands that contributed faces.
    pub fn bands(&self) -> Vec<usize> {
        let mut bands = self.face_bands.clone();
        bands.sort_unstable();
        bands.dedup();
        bands
    }
}
