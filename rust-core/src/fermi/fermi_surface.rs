use log::{debug, info, warn};
use nalgebra::{DMatrix, Matrix3, Vector3};

use crate::error::CrystalError;
use crate::fermi::energy_grid::EnergyGrid;
use crate::fermi::isosurface::IsoSurface;
use crate::geometries::{marching_tetrahedra, Tetrahedralization};
use crate::reciprocal::ReciprocalLattice;
use crate::Result;

/// Band energies sampled at scattered k-points of one reciprocal lattice.
///
/// `energies` has one row per k-point and one column per band. Sample counts are not
/// checked at construction; a mismatch surfaces as a `Shape` error when interpolating.
#[derive(Debug, Clone)]
pub struct FermiSurface {
    reciprocal: ReciprocalLattice,
    kpoints: Vec<Vector3<f64>>,
    energies: DMatrix<f64>,
}

impl FermiSurface {
    pub fn new(
        reciprocal: ReciprocalLattice,
        kpoints: Vec<Vector3<f64>>,
        energies: DMatrix<f64>,
    ) -> Self {
        FermiSurface {
            reciprocal,
            kpoints,
            energies,
        }
    }

    /// Single-band convenience constructor.
    pub fn from_single_band(
        reciprocal: ReciprocalLattice,
        kpoints: Vec<Vector3<f64>>,
        energies: Vec<f64>,
    ) -> Self {
        let rows = energies.len();
        Self::new(reciprocal, kpoints, DMatrix::from_vec(rows, 1, energies))
    }

    pub fn reciprocal(&self) -> &ReciprocalLattice {
        &self.reciprocal
    }

    pub fn kpoints(&self) -> &[Vector3<f64>] {
        &self.kpoints
    }

    pub fn energies(&self) -> &DMatrix<f64> {
        &self.energies
    }

    pub fn num_bands(&self) -> usize {
        self.energies.ncols()
    }

    /// Minimum and maximum finite sample energy over all bands.
    pub fn energy_range(&self) -> Option<(f64, f64)> {
        finite_range(self.energies.iter().copied())
    }

    /// Resample every band onto a `resolution³` grid spanning the reciprocal cell.
    ///
    /// The fractional axis is `linspace(0, 1, resolution)` in each direction, mapped to
    /// Cartesian through the reciprocal basis. Values come from piecewise-linear
    /// interpolation over a Delaunay tetrahedralisation of the Cartesian k-points; grid
    /// points outside their convex hull are `NaN`.
    pub fn interpolate_on_grid(&self, resolution: usize) -> Result<EnergyGrid> {
        self.check_samples()?;
        if resolution < 2 {
            return Err(CrystalError::InvalidArgument(format!(
                "grid resolution must be at least 2, got {}",
                resolution
            )));
        }

        let triangulation = Tetrahedralization::new(&self.kpoints)?;

        let step = 1.0 / (resolution - 1) as f64;
        let axis: Vec<f64> = (0..resolution).map(|i| i as f64 * step).collect();

        let total = resolution * resolution * resolution;
        let mut cartesian = Vec::with_capacity(total);
        for &u in &axis {
            for &v in &axis {
                for &w in &axis {
                    cartesian.push(self.reciprocal.frac_to_cart(Vector3::new(u, v, w)));
                }
            }
        }

        let band_count = self.num_bands();
        let mut bands = vec![Vec::with_capacity(total); band_count];
        let mut missing = 0usize;

        // Locate once per grid point, then weight every band with the same cell
        for point in &cartesian {
            match triangulation.locate(point) {
                Some((tet, weights)) => {
                    let cell = triangulation.tetrahedra()[tet];
                    for (band, values) in bands.iter_mut().enumerate() {
                        let energy = cell
                            .iter()
                            .zip(weights)
                            .map(|(&vertex, weight)| weight * self.energies[(vertex, band)])
                            .sum();
                        values.push(energy);
                    }
                }
                None => {
                    missing += 1;
                    for values in bands.iter_mut() {
                        values.push(f64::NAN);
                    }
                }
            }
        }

        if missing > 0 {
            warn!(
                "{} of {} grid points lie outside the sampled k-point hull",
                missing, total
            );
        }
        debug!(
            "interpolated {} band(s) onto a {}^3 grid",
            band_count, resolution
        );

        Ok(EnergyGrid::new(resolution, axis, cartesian, bands))
    }

    /// Isosurface of all bands at `fermi_level`.
    ///
    /// Sheets of every band whose sampled range brackets the level are merged; each face
    /// records its band. Fails with `NoIsosurface` when the level lies outside the sampled
    /// energies or no band crosses it on the grid.
    pub fn mesh_isosurface(&self, fermi_level: f64, resolution: usize) -> Result<IsoSurface> {
        let grid = self.interpolate_on_grid(resolution)?;
        let normal_map = self.normal_map()?;

        let mut surface = IsoSurface::default();
        let mut overall: Option<(f64, f64)> = None;

        for band in 0..grid.num_bands() {
            let values = grid.band(band).unwrap_or(&[]);
            let Some((min, max)) = finite_range(values.iter().copied()) else {
                continue;
            };
            overall = Some(match overall {
                Some((lo, hi)) => (lo.min(min), hi.max(max)),
                None => (min, max),
            });
            if fermi_level < min || fermi_level > max {
                continue;
            }

            let mesh = marching_tetrahedra(values, grid.dims(), fermi_level);
            surface.merge(IsoSurface::from_grid_mesh(
                mesh,
                resolution,
                self.reciprocal.basis(),
                &normal_map,
                band,
            ));
        }

        self.finish(surface, fermi_level, overall)
    }

    /// Isosurface of a single band at `fermi_level`.
    pub fn mesh_band_isosurface(
        &self,
        band: usize,
        fermi_level: f64,
        resolution: usize,
    ) -> Result<IsoSurface> {
        if band >= self.num_bands() {
            return Err(CrystalError::InvalidArgument(format!(
                "band {} out of range ({} bands)",
                band,
                self.num_bands()
            )));
        }

        let grid = self.interpolate_on_grid(resolution)?;
        let values = grid.band(band).unwrap_or(&[]);
        let range = finite_range(values.iter().copied());

        let surface = match range {
            Some((min, max)) if fermi_level >= min && fermi_level <= max => {
                let mesh = marching_tetrahedra(values, grid.dims(), fermi_level);
                IsoSurface::from_grid_mesh(
                    mesh,
                    resolution,
                    self.reciprocal.basis(),
                    &self.normal_map()?,
                    band,
                )
            }
            _ => IsoSurface::default(),
        };

        self.finish(surface, fermi_level, range)
    }

    fn finish(
        &self,
        surface: IsoSurface,
        fermi_level: f64,
        range: Option<(f64, f64)>,
    ) -> Result<IsoSurface> {
        if surface.is_empty() {
            let (min, max) = range.unwrap_or((f64::NAN, f64::NAN));
            return Err(CrystalError::NoIsosurface {
                level: fermi_level,
                min,
                max,
            });
        }

        info!(
            "fermi surface at {:.6}: {} vertices, {} faces over band(s) {:?}",
            fermi_level,
            surface.num_vertices(),
            surface.num_faces(),
            surface.bands()
        );
        Ok(surface)
    }

    fn check_samples(&self) -> Result<()> {
        if self.energies.nrows() != self.kpoints.len() {
            return Err(CrystalError::shape(
                "energies per k-point",
                self.kpoints.len(),
                self.energies.nrows(),
            ));
        }
        if self.num_bands() == 0 {
            return Err(CrystalError::InvalidArgument(
                "energy table has no bands".to_string(),
            ));
        }
        Ok(())
    }

    // Grid-index normals map to Cartesian through the inverse reciprocal basis
    fn normal_map(&self) -> Result<Matrix3<f64>> {
        self.reciprocal.basis().try_inverse().ok_or_else(|| {
            CrystalError::DegenerateGeometry("reciprocal basis is not invertible".to_string())
        })
    }
}

fn finite_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.filter(|v| v.is_finite()).fold(None, |acc, v| match acc {
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        None => Some((v, v)),
    })
}
