use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Band energies sampled on a regular `resolution³` grid spanning the reciprocal cell.
///
/// Grid point `(i, j, k)` sits at fractional k-point `(axis[i], axis[j], axis[k])`, with
/// `axis = linspace(0, 1, resolution)`. Values are stored i-major
/// (`(i * resolution + j) * resolution + k`). Points outside the convex hull of the
/// samples hold `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyGrid {
    resolution: usize,
    axis: Vec<f64>,
    cartesian: Vec<Vector3<f64>>,
    bands: Vec<Vec<f64>>,
}

impl EnergyGrid {
    pub(crate) fn new(
        resolution: usize,
        axis: Vec<f64>,
        cartesian: Vec<Vector3<f64>>,
        bands: Vec<Vec<f64>>,
    ) -> Self {
        EnergyGrid {
            resolution,
            axis,
            cartesian,
            bands,
        }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn dims(&self) -> [usize; 3] {
        [self.resolution; 3]
    }

    /// The fractional coordinate of each grid plane along any axis.
    pub fn axis(&self) -> &[f64] {
        &self.axis
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn len(&self) -> usize {
        self.cartesian.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cartesian.is_empty()
    }

    pub fn flat_index(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.resolution + j) * self.resolution + k
    }

    /// Fractional coordinates of every grid point, i-major.
    pub fn fractional_points(&self) -> Vec<Vector3<f64>> {
        let mut points = Vec::with_capacity(self.len());
        for &u in &self.axis {
            for &v in &self.axis {
                for &w in &self.axis {
                    points.push(Vector3::new(u, v, w));
                }
            }
        }
        points
    }

    /// Cartesian k-points of every grid point, i-major.
    pub fn cartesian_points(&self) -> &[Vector3<f64>] {
        &self.cartesian
    }

    /// Interpolated energies of one band, or `None` for an unknown band.
    pub fn band(&self, band: usize) -> Option<&[f64]> {
        self.bands.get(band).map(Vec::as_slice)
    }

    pub fn value(&self, band: usize, i: usize, j: usize, k: usize) -> Option<f64> {
        self.band(band)?.get(self.flat_index(i, j, k)).copied()
    }

    /// Share of grid points without an interpolated value (outside the sample hull).
    pub fn missing_fraction(&self) -> f64 {
        match self.bands.first() {
            Some(values) if !values.is_empty() => {
                values.iter().filter(|v| v.is_nan()).count() as f64 / values.len() as f64
            }
            _ => 0.0,
        }
    }
}
