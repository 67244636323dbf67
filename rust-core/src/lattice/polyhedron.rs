use std::collections::BTreeSet;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// ε that controls the numerical tolerance (works for unit–cell sized data;
/// scale if the polyhedron spans many orders of magnitude).
/// Boundary slack relative to the polyhedron's extent.
const EPS: f64 = 1.0e-10;

/// A convex polyhedron such as a Brillouin zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyhedron {
    /// Corner points (Cartesian)
    pub vertices: Vec<Vector3<f64>>,
    /// Edges as pairs of vertex indices, smaller index first
    pub edges: Vec<(usize, usize)>,
    /// Planar faces as cyclically ordered vertex indices
    pub faces: Vec<Vec<usize>>,
    /// Enclosed volume
    pub measure: f64,
}

impl Polyhedron {
    /// Create a new empty polyhedron
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            measure: 0.0,
        }
    }

    /// Assemble a polyhedron from vertices and faces; edges and volume are derived.
    pub fn from_faces(vertices: Vec<Vector3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        let edges = extract_edges_from_faces(&faces);
        let mut polyhedron = Self {
            vertices,
            edges,
            faces,
            measure: 0.0,
        };
        polyhedron.measure = polyhedron.compute_volume();
        polyhedron
    }

    /// Return `true` if `point` lies inside – or on the boundary of – the
    /// convex polyhedron.  Works for any face ordering/orientation.
    pub fn contains_3d(&self, point: Vector3<f64>) -> bool {
        // A polyhedron must have at least one face with ≥3 vertices
        if self.faces.is_empty() {
            return false;
        }

        let centroid = self.centroid();
        let extent = self
            .vertices
            .iter()
            .map(|v| (v - centroid).norm())
            .fold(0.0, f64::max);
        let tolerance = EPS * extent.max(f64::MIN_POSITIVE);

        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }

            let v0 = self.vertices[face[0]];
            let Some(mut normal) = face_normal(&self.vertices, face).try_normalize(0.0) else {
                continue;
            };

            // Ensure the normal points *outward*.
            if normal.dot(&(centroid - v0)) > 0.0 {
                normal = -normal;
            }

            // One plane says "outside" ⇒ entire test fails.
            if normal.dot(&(point - v0)) > tolerance {
                return false;
            }
        }
        true
    }

    /// Arithmetic mean of the vertices.
    pub fn centroid(&self) -> Vector3<f64> {
        if self.vertices.is_empty() {
            return Vector3::zeros();
        }
        self.vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v)
            / self.vertices.len() as f64
    }

    /// Largest vertex distance from the origin.
    pub fn bounding_radius(&self) -> f64 {
        self.vertices.iter().map(|v| v.norm()).fold(0.0, f64::max)
    }

    /// Get the enclosed volume
    pub fn measure(&self) -> f64 {
        self.measure
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    // Sum of tetrahedra from the centroid to a fan triangulation of each face
    fn compute_volume(&self) -> f64 {
        let centroid = self.centroid();
        let mut volume = 0.0;
        for face in &self.faces {
            if face.len() < 3 {
                continue;
            }
            let v0 = self.vertices[face[0]] - centroid;
            for pair in face[1..].windows(2) {
                let v1 = self.vertices[pair[0]] - centroid;
                let v2 = self.vertices[pair[1]] - centroid;
                volume += v0.dot(&v1.cross(&v2)).abs() / 6.0;
            }
        }
        volume
    }
}

impl Default for Polyhedron {
    fn default() -> Self {
        Self::new()
    }
}

// Newell's method: robust normal for a planar polygon with any number of vertices
fn face_normal(vertices: &[Vector3<f64>], face: &[usize]) -> Vector3<f64> {
    let mut normal = Vector3::zeros();
    for (idx, &current) in face.iter().enumerate() {
        let a = vertices[current];
        let b = vertices[face[(idx + 1) % face.len()]];
        normal.x += (a.y - b.y) * (a.z + b.z);
        normal.y += (a.z - b.z) * (a.x + b.x);
        normal.z += (a.x - b.x) * (a.y + b.y);
    }
    normal
}

// Extract unique edges from face definitions
pub(crate) fn extract_edges_from_faces(faces: &[Vec<usize>]) -> Vec<(usize, usize)> {
    let mut unique_edges: BTreeSet<(usize, usize)> = BTreeSet::new();

    for face in faces {
        for (idx, &current) in face.iter().enumerate() {
            let next = face[(idx + 1) % face.len()];
            if current != next {
                unique_edges.insert((current.min(next), current.max(next)));
            }
        }
    }

    unique_edges.into_iter().collect()
}
