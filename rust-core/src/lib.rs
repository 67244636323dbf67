//! Crystal lattice toolkit
//!
//! Periodic crystal cells with neighbor search and supercells, reciprocal lattices with
//! their Brillouin zones, Fermi-surface reconstruction from scattered band energies and
//! space-group detection.

pub mod config;
pub mod error;
pub mod fermi;
pub mod geometries;
pub mod lattice;
pub mod reciprocal;
pub mod symmetries;

pub use error::CrystalError;
pub use fermi::{EnergyGrid, FermiSurface, IsoSurface};
pub use lattice::{Lattice, NeighborPair, Polyhedron};
pub use reciprocal::ReciprocalLattice;
pub use symmetries::{SpaceGroup, SymmetryOperation};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, CrystalError>;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
