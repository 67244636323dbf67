// Lattice module: Periodic crystal cells and the operations defined on them
// This module provides cell construction, coordinate transforms, periodic neighbor search and supercells

// ======================== MODULE DECLARATIONS ========================
pub mod lattice3d;
pub mod lattice_construction;
pub mod neighbors;
pub mod polyhedron;

// Test modules
mod _tests_lattice3d;

// ======================== CRYSTAL CELLS ========================
pub use lattice3d::{
    Lattice,       // struct - row-vector basis, species labels and fractional positions
    LatticeRecord, // struct - plain serde form of a Lattice (TOML / JSON files)
};
// Lattice impl methods:
//   new(basis: Matrix3<f64>, species: Vec<String>, positions_frac: Vec<Vector3<f64>>) -> Result<Self> - Shape error on count mismatch
//   from_flat(basis, species, positions: &[f64]) -> Result<Self>    - N×3 row-major buffer
//   from_vectors(a1, a2, a3, species, positions_frac) -> Result<Self>
//   basis(&self) -> &Matrix3<f64>                                    - lattice vectors as rows
//   lattice_vectors(&self) -> [Vector3<f64>; 3]
//   species(&self) / positions_frac(&self) / num_atoms(&self)
//   frac_to_cart(&self, v_frac) -> Vector3<f64>                      - basisᵀ · frac
//   cart_to_frac(&self, v_cart) -> Result<Vector3<f64>>              - DegenerateGeometry for coplanar cells
//   cartesian_positions(&self) -> Vec<Vector3<f64>>                  - positions_frac · basis
//   fractional_positions_from_cartesian(&self, &[Vector3<f64>]) -> Result<Vec<Vector3<f64>>>
//   volume(&self) -> f64                                             - signed triple product
//   metric_tensor(&self) -> Matrix3<f64>                             - G = B Bᵀ
//   lattice_parameters(&self) -> (f64, f64, f64)                     - a, b, c
//   lattice_angles(&self) -> (f64, f64, f64)                         - α, β, γ in radians
//   wrapped(&self) -> Lattice                                        - fractional coords folded into [0, 1)
//   cell_corners(&self) -> [Vector3<f64>; 8] / cell_edges() -> [(usize, usize); 12]

// ======================== NEIGHBOR SEARCH ========================
pub use neighbors::NeighborPair; // struct - (i, j, distance, image) contact between atom images
// Lattice impl methods (neighbors.rs):
//   find_neighbors(&self, cutoff: f64) -> Result<Vec<NeighborPair>> - every image contact within cutoff over 3×3×3 replicas

// ======================== CONSTRUCTION ========================
pub use lattice_construction::{
    body_centered_cubic_basis, // fn(a: f64) -> Matrix3<f64> - primitive BCC vectors
    face_centered_cubic_basis, // fn(a: f64) -> Matrix3<f64> - primitive FCC vectors
    hexagonal_basis,           // fn(a: f64, c: f64) -> Matrix3<f64> - γ = 120°
    orthorhombic_basis,        // fn(a: f64, b: f64, c: f64) -> Matrix3<f64>
    simple_cubic_basis,        // fn(a: f64) -> Matrix3<f64>
    tetragonal_basis,          // fn(a: f64, c: f64) -> Matrix3<f64>
};
// Lattice impl methods (lattice_construction.rs):
//   make_supercell(&self, na: usize, nb: usize, nc: usize) -> Result<Lattice> - replicas i-major, basis rows scaled

// ======================== GEOMETRIC POLYHEDRA ========================
pub use polyhedron::Polyhedron; // struct - convex polyhedron (Brillouin zones, hulls)
// Polyhedron impl methods:
//   new() -> Self                                        - empty polyhedron
//   from_faces(vertices, faces) -> Self                  - derives edges and volume
//   contains_3d(&self, point: Vector3<f64>) -> bool      - inside-or-on test
//   centroid(&self) -> Vector3<f64>
//   bounding_radius(&self) -> f64
//   measure(&self) -> f64                                - enclosed volume
