// Constants and run-time defaults

use serde::{Deserialize, Serialize};

use crate::error::CrystalError;
use crate::Result;

// Tolerances
pub const BASE_VECTOR_TOLERANCE: f64 = 1e-10; // Smallest accepted |det| of a basis matrix
pub const LATTICE_TOLERANCE: f64 = 1e-10; // For most lattice operations
pub const HULL_TOLERANCE: f64 = 1e-9; // Relative plane-distance tolerance for hulls

// Defaults mirrored by `ToolkitConfig::default`
pub const DEFAULT_GRID_RESOLUTION: usize = 50;
pub const DEFAULT_SYMPREC: f64 = 1e-5;
pub const DEFAULT_RECIPROCAL_SHELL: usize = 1;

/// Tunable settings for the command-line tool.
///
/// Library calls take their parameters explicitly; this struct only collects defaults
/// that can be overridden from a TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolkitConfig {
    /// Tolerance used when rejecting coplanar bases.
    pub basis_tolerance: f64,
    /// Symmetry precision passed to space-group detection.
    pub symprec: f64,
    /// Points per axis of Fermi-surface interpolation grids.
    pub grid_resolution: usize,
    /// Shell used when listing reciprocal points.
    pub reciprocal_shell: usize,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        Self {
            basis_tolerance: BASE_VECTOR_TOLERANCE,
            symprec: DEFAULT_SYMPREC,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            reciprocal_shell: DEFAULT_RECIPROCAL_SHELL,
        }
    }
}

impl ToolkitConfig {
    /// Parse a configuration from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ToolkitConfig = toml::from_str(text)
            .map_err(|e| CrystalError::InvalidArgument(format!("config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no operation can work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.basis_tolerance > 0.0) {
            return Err(CrystalError::InvalidArgument(
                "basis_tolerance must be positive".to_string(),
            ));
        }
        if !(self.symprec > 0.0) {
            return Err(CrystalError::InvalidArgument(
                "symprec must be positive".to_string(),
            ));
        }
        if self.grid_resolution < 2 {
            return Err(CrystalError::InvalidArgument(
                "grid_resolution must be at least 2".to_string(),
            ));
        }
        Ok(())
    }
}
