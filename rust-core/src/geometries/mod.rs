// Geometries module: Computational-geometry kernels behind the lattice and k-space tools
// This module provides convex hulls, Delaunay tetrahedralisation and isosurface extraction

// ======================== MODULE DECLARATIONS ========================
pub mod convex_hull;
pub mod delaunay;
pub mod marching_tetrahedra;


// ======================== CONVEX HULL ========================
pub use convex_hull::{
    ConvexHull, // struct - hull of a 3D point cloud (vertices in input order, merged planar facets)
    HullFacet,  // struct - supporting plane with its ordered hull vertices
};
// ConvexHull impl methods:
//   new(points: &[Vector3<f64>]) -> Result<Self>          - builds hull; DegenerateGeometry below 3D rank
//   vertices(&self) -> &[usize]                            - input indices of hull corners
//   vertex_points(&self) -> Vec<Vector3<f64>>              - coordinates of hull corners
//   facets(&self) -> &[HullFacet]                          - facet planes with ordered corners
//   contains(&self, point: &Vector3<f64>) -> bool          - inside-or-on test
//   to_polyhedron(&self) -> Polyhedron                     - hull as a Polyhedron (edges, volume)

// ======================== SCATTERED INTERPOLATION ========================
pub use delaunay::Tetrahedralization; // struct - Bowyer-Watson Delaunay tetrahedralisation
// Tetrahedralization impl methods:
//   new(points: &[Vector3<f64>]) -> Result<Self>          - triangulates; DegenerateGeometry below 3D rank
//   tetrahedra(&self) -> &[[usize; 4]]                     - cells as input indices
//   volume(&self) -> f64                                   - covered volume (= hull volume)
//   locate(&self, point) -> Option<(usize, [f64; 4])>      - containing cell and barycentric weights
//   interpolate(&self, values: &[f64], point) -> f64       - linear interpolation, NaN outside the hull

// ======================== ISOSURFACES ========================
pub use marching_tetrahedra::{
    TriangleMesh,        // struct - vertices, triangle faces and unit vertex normals
    marching_tetrahedra, // fn(values: &[f64], dims: [usize; 3], level: f64) -> TriangleMesh - grid-index space mesh
};
