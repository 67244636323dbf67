// Error types shared by every module of the toolkit

use thiserror::Error;

/// Errors raised by lattice, reciprocal-space, Fermi-surface and symmetry operations.
///
/// Missing interpolation values are not errors: they travel through energy grids as `NaN`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CrystalError {
    #[error("Shape mismatch in {context}: expected {expected}, found {found}")]
    Shape {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("No isosurface at level {level}: sampled energies span [{min}, {max}]")]
    NoIsosurface { level: f64, min: f64, max: f64 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Symmetry detection failed: {0}")]
    Symmetry(String),
}

impl CrystalError {
    pub(crate) fn shape(context: &'static str, expected: usize, found: usize) -> Self {
        CrystalError::Shape {
            context,
            expected,
            found,
        }
    }
}
