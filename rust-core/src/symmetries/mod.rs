// Symmetries module: Space-group detection and crystallographic symmetry operations

// ======================== MODULE DECLARATIONS ========================
pub mod space_group;
pub mod symmetry_operations;

// Test modules
mod _tests_space_group;
mod _tests_symmetry_operations;

// ======================== SPACE GROUPS ========================
pub use space_group::SpaceGroup; // struct - space group detected once from a Lattice
// SpaceGroup impl methods:
//   new(lattice: &Lattice, symprec: f64) -> Result<Self>           - runs detection; Symmetry error on failure
//   number(&self) -> i32                                            - international number 1-230
//   hall_number(&self) -> i32
//   spacegroup_symbol(&self) -> &str                                - Hermann-Mauguin symbol
//   symmetry_operations(&self) -> &[SymmetryOperation]              - operations in the input cell
//   species_kinds(&self) -> &[String]                               - labels by first appearance

// ======================== SYMMETRY OPERATIONS ========================
pub use symmetry_operations::SymmetryOperation; // struct - integer rotation + fractional translation
// SymmetryOperation impl methods:
//   new(rotation: Matrix3<i32>, translation: Vector3<f64>) -> Self
//   identity() -> Self
//   apply(&self, point: Vector3<f64>) -> Vector3<f64>               - R·x + t
//   compose(&self, other: &Self) -> Self                            - self ∘ other
//   inverse(&self) -> Option<Self>                                  - None for non-unimodular rotations
//   order(&self) -> Option<usize>                                   - powers until identity modulo lattice
//   is_identity(&self) -> bool
//   is_proper(&self) -> bool                                        - det R = +1
