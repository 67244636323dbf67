// Isosurface extraction on a regular scalar grid (marching tetrahedra)
//
// Every grid cube is split into six tetrahedra around its main diagonal; the split is the
// same for all cubes, so shared cube faces are cut along the same diagonal and the surface
// is watertight across cells. Within a tetrahedron the level set is a triangle (one corner
// separated from the other three) or a quad (two against two).

use std::collections::HashMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Corner offsets of a unit cube, indexed 0..8.
const CUBE_CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Six tetrahedra sharing the 0–6 diagonal.
const CUBE_TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Triangle mesh with per-vertex normals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Vector3<f64>>,
    pub faces: Vec<[usize; 3]>,
    /// Unit normals pointing towards increasing field values
    pub normals: Vec<Vector3<f64>>,
}

impl TriangleMesh {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Total triangle area.
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
}

/// Extract the `level` isosurface of a scalar field sampled on a `dims` grid.
///
/// `values` is indexed `(i * dims[1] + j) * dims[2] + k`. Vertices are returned in
/// grid-index coordinates. Any tetrahedron with a `NaN` corner is skipped, so regions
/// without data never produce geometry.
pub fn marching_tetrahedra(values: &[f64], dims: [usize; 3], level: f64) -> TriangleMesh {
    let mut extractor = Extractor {
        values,
        dims,
        level,
        mesh: TriangleMesh::default(),
        edge_vertices: HashMap::new(),
    };

    if dims.iter().any(|&d| d < 2) || values.len() != dims[0] * dims[1] * dims[2] {
        return extractor.mesh;
    }

    for i in 0..dims[0] - 1 {
        for j in 0..dims[1] - 1 {
            for k in 0..dims[2] - 1 {
                let corners = CUBE_CORNERS.map(|[di, dj, dk]| [i + di, j + dj, k + dk]);
                for tet in CUBE_TETRAHEDRA {
                    extractor.polygonise(tet.map(|c| corners[c]));
                }
            }
        }
    }

    extractor.finish()
}

struct Extractor<'a> {
    values: &'a [f64],
    dims: [usize; 3],
    level: f64,
    mesh: TriangleMesh,
    /// Grid edge (lower, upper flat index) -> mesh vertex
    edge_vertices: HashMap<(usize, usize), usize>,
}

impl Extractor<'_> {
    fn flat(&self, p: [usize; 3]) -> usize {
        (p[0] * self.dims[1] + p[1]) * self.dims[2] + p[2]
    }

    fn polygonise(&mut self, tet: [[usize; 3]; 4]) {
        let values = tet.map(|p| self.values[self.flat(p)]);
        if values.iter().any(|v| v.is_nan()) {
            return;
        }

        let (below, above): (Vec<usize>, Vec<usize>) =
            (0..4).partition(|&c| values[c] < self.level);

        // Direction of increasing value, used to orient the triangles
        let uphill = centroid(&above, &tet) - centroid(&below, &tet);

        match (below.len(), above.len()) {
            (1, 3) | (3, 1) => {
                let (lone, others) = if below.len() == 1 {
                    (below[0], above)
                } else {
                    (above[0], below)
                };
                let a = self.edge_vertex(tet[lone], tet[others[0]]);
                let b = self.edge_vertex(tet[lone], tet[others[1]]);
                let c = self.edge_vertex(tet[lone], tet[others[2]]);
                self.push_triangle([a, b, c], &uphill);
            }
            (2, 2) => {
                // Quad cycle: b0-a0, b0-a1, b1-a1, b1-a0
                let q0 = self.edge_vertex(tet[below[0]], tet[above[0]]);
                let q1 = self.edge_vertex(tet[below[0]], tet[above[1]]);
                let q2 = self.edge_vertex(tet[below[1]], tet[above[1]]);
                let q3 = self.edge_vertex(tet[below[1]], tet[above[0]]);
                self.push_triangle([q0, q1, q2], &uphill);
                self.push_triangle([q0, q2, q3], &uphill);
            }
            _ => {}
        }
    }

    fn edge_vertex(&mut self, p: [usize; 3], q: [usize; 3]) -> usize {
        let (fp, fq) = (self.flat(p), self.flat(q));
        let key = (fp.min(fq), fp.max(fq));
        if let Some(&idx) = self.edge_vertices.get(&key) {
            return idx;
        }

        let (vp, vq) = (self.values[fp], self.values[fq]);
        let t = ((self.level - vp) / (vq - vp)).clamp(0.0, 1.0);
        let p_f = Vector3::new(p[0] as f64, p[1] as f64, p[2] as f64);
        let q_f = Vector3::new(q[0] as f64, q[1] as f64, q[2] as f64);

        let idx = self.mesh.vertices.len();
        self.mesh.vertices.push(p_f + (q_f - p_f) * t);
        self.edge_vertices.insert(key, idx);
        idx
    }

    fn push_triangle(&mut self, mut face: [usize; 3], uphill: &Vector3<f64>) {
        let v = &self.mesh.vertices;
        let normal = (v[face[1]] - v[face[0]]).cross(&(v[face[2]] - v[face[0]]));
        // Zero-area triangles appear when the level passes exactly through grid points
        if normal.norm_squared() <= f64::EPSILON * f64::EPSILON {
            return;
        }
        if normal.dot(uphill) < 0.0 {
            face.swap(1, 2);
        }
        self.mesh.faces.push(face);
    }

    // Area-weighted vertex normals from the oriented faces
    fn finish(mut self) -> TriangleMesh {
        let mut normals = vec![Vector3::zeros(); self.mesh.vertices.len()];
        for face in &self.mesh.faces {
            let v = &self.mesh.vertices;
            let n = (v[face[1]] - v[face[0]]).cross(&(v[face[2]] - v[face[0]]));
            for &idx in face {
                normals[idx] += n;
            }
        }
        self.mesh.normals = normals
            .into_iter()
            .map(|n| n.try_normalize(f64::EPSILON).unwrap_or_else(Vector3::zeros))
            .collect();
        self.mesh
    }
}

fn centroid(corners: &[usize], tet: &[[usize; 3]; 4]) -> Vector3<f64> {
    if corners.is_empty() {
        return Vector3::zeros();
    }
    corners
        .iter()
        .map(|&c| Vector3::new(tet[c][0] as f64, tet[c][1] as f64, tet[c][2] as f64))
        .sum::<Vector3<f64>>()
        / corners.len() as f64
}
