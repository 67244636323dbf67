// Reciprocal module: Reciprocal lattice bases, reciprocal point clouds and Brillouin zones

// ======================== MODULE DECLARATIONS ========================
pub mod brillouin_zone;
pub mod reciprocal_lattice;

mod _tests_reciprocal_lattice;

// ======================== RECIPROCAL LATTICE ========================
pub use reciprocal_lattice::ReciprocalLattice; // struct - reciprocal basis derived from a real lattice
// ReciprocalLattice impl methods:
//   new(real_lattice: &Lattice) -> Result<Self>                     - b_i = 2π (a_j × a_k) / V; DegenerateGeometry if V ≈ 0
//   from_real_basis(real_basis: &Matrix3<f64>, tolerance: f64) -> Result<Self> - same from a bare basis
//   basis(&self) -> &Matrix3<f64>                                   - reciprocal vectors as rows
//   real_basis(&self) -> Result<Matrix3<f64>>                       - inverse construction
//   volume(&self) -> f64                                            - (2π)³ / V
//   frac_to_cart / cart_to_frac                                     - k-point coordinate transforms
//   enumerate_points(&self, shell: usize) -> Vec<Vector3<f64>>      - (2·shell+1)³ points, i-major
//   first_brillouin_zone(&self) -> Result<Polyhedron>               - hull of the shell-1 cloud
//   first_brillouin_zone_vertices(&self) -> Result<Vec<Vector3<f64>>> - hull corners only

// ======================== BRILLOUIN ZONE ========================
pub use brillouin_zone::first_brillouin_zone; // fn(reciprocal_points: &[Vector3<f64>]) -> Result<Polyhedron>
