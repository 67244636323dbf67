// Fermi module: Band energies on regular k-grids and constant-energy surfaces
// This module resamples scattered band data over the reciprocal cell and meshes Fermi surfaces

// ======================== MODULE DECLARATIONS ========================
pub mod energy_grid;
pub mod fermi_surface;
pub mod isosurface;


// ======================== FERMI SURFACE RECONSTRUCTION ========================
pub use fermi_surface::FermiSurface; // struct - scattered k-point samples (M×B energies) of one reciprocal lattice
// FermiSurface impl methods:
//   new(reciprocal: ReciprocalLattice, kpoints: Vec<Vector3<f64>>, energies: DMatrix<f64>) -> Self
//   from_single_band(reciprocal, kpoints, energies: Vec<f64>) -> Self    - one column of energies
//   num_bands(&self) -> usize                                            - columns of the energy table
//   energy_range(&self) -> Option<(f64, f64)>                            - finite min / max over all samples
//   interpolate_on_grid(&self, resolution: usize) -> Result<EnergyGrid>  - Delaunay-linear resampling, NaN outside hull
//   mesh_isosurface(&self, fermi_level: f64, resolution: usize) -> Result<IsoSurface> - union of band sheets
//   mesh_band_isosurface(&self, band, fermi_level, resolution) -> Result<IsoSurface>  - one band's sheet

// ======================== GRIDS & MESHES ========================
pub use energy_grid::EnergyGrid; // struct - resolution³ grid over fractional [0,1]³ with per-band values
// EnergyGrid impl methods:
//   axis(&self) -> &[f64]                                 - linspace(0, 1, resolution)
//   fractional_points(&self) / cartesian_points(&self)   - grid k-points, i-major
//   band(&self, band: usize) -> Option<&[f64]>            - flat values of one band
//   value(&self, band, i, j, k) -> Option<f64>            - single grid value
//   missing_fraction(&self) -> f64                        - share of NaN points

pub use isosurface::IsoSurface; // struct - Cartesian vertices, faces, unit normals (uphill) and per-face band
// IsoSurface impl methods:
//   merge(&mut self, other: IsoSurface)                  - append a sheet
//   area(&self) -> f64                                   - total k-space area
//   bands(&self) -> Vec<usize>                           - bands contributing faces
