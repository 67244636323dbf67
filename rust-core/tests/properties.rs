use std::f64::consts::PI;
use std::fs;

use approx::assert_relative_eq;
use crystal_lattice_toolkit::config::ToolkitConfig;
use crystal_lattice_toolkit::lattice::{body_centered_cubic_basis, hexagonal_basis, simple_cubic_basis};
use crystal_lattice_toolkit::{CrystalError, FermiSurface, Lattice, ReciprocalLattice, SpaceGroup};
use nalgebra::{Matrix3, Vector3};

fn cesium_chloride(a: f64) -> Lattice {
    Lattice::new(
        simple_cubic_basis(a),
        vec!["Cs".to_string(), "Cl".to_string()],
        vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
    )
    .unwrap()
}

#[test]
fn body_diagonal_contacts_only() {
    let lattice = cesium_chloride(1.0);

    let pairs = lattice.find_neighbors(0.87).unwrap();
    assert!(!pairs.is_empty());
    for pair in &pairs {
        assert_eq!((pair.i, pair.j), (0, 1));
        assert_relative_eq!(pair.distance, 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);
    }

    assert!(lattice.find_neighbors(0.85).unwrap().is_empty());
}

#[test]
fn supercell_scales_atoms_and_volume() {
    let lattice = Lattice::new(
        hexagonal_basis(3.2, 5.2),
        vec!["Zn".to_string(), "O".to_string()],
        vec![Vector3::new(1.0 / 3.0, 2.0 / 3.0, 0.0), Vector3::new(1.0 / 3.0, 2.0 / 3.0, 0.38)],
    )
    .unwrap();

    for (na, nb, nc) in [(1, 1, 1), (2, 2, 1), (3, 1, 2)] {
        let supercell = lattice.make_supercell(na, nb, nc).unwrap();
        let factor = (na * nb * nc) as f64;
        assert_eq!(supercell.num_atoms(), na * nb * nc * lattice.num_atoms());
        assert_relative_eq!(supercell.volume(), factor * lattice.volume(), epsilon = 1e-8);
    }
}

#[test]
fn cartesian_positions_map_back() {
    let lattice = Lattice::new(
        body_centered_cubic_basis(2.87),
        vec!["Fe".to_string(), "C".to_string()],
        vec![Vector3::zeros(), Vector3::new(0.3, 0.1, 0.6)],
    )
    .unwrap();
    let back = lattice
        .fractional_positions_from_cartesian(&lattice.cartesian_positions())
        .unwrap();
    for (a, b) in lattice.positions_frac().iter().zip(&back) {
        assert_relative_eq!(a, b, epsilon = 1e-12);
    }
}

#[test]
fn reciprocal_duality_and_zone() {
    let a = 3.0;
    let lattice = cesium_chloride(a);
    let reciprocal = ReciprocalLattice::new(&lattice).unwrap();

    let product = lattice.basis() * reciprocal.basis().transpose();
    assert_relative_eq!(product, Matrix3::identity() * 2.0 * PI, epsilon = 1e-10);
    assert_eq!(reciprocal.enumerate_points(0), vec![Vector3::zeros()]);

    let zone = reciprocal.first_brillouin_zone().unwrap();
    let g = 2.0 * PI / a;
    assert_eq!(zone.vertices().len(), 8);
    assert!(zone.contains_3d(Vector3::zeros()));
    assert!(zone.bounding_radius() <= 3.0_f64.sqrt() * g + 1e-9);
}

#[test]
fn coplanar_basis_is_rejected_everywhere() {
    let basis = Matrix3::new(
        1.0, 0.0, 0.0,
        0.0, 1.0, 0.0,
        2.0, 3.0, 0.0,
    );
    let lattice = Lattice::new(basis, vec!["X".to_string()], vec![Vector3::zeros()]).unwrap();
    assert!(matches!(ReciprocalLattice::new(&lattice), Err(CrystalError::DegenerateGeometry(_))));
    assert!(matches!(
        lattice.cart_to_frac(Vector3::new(1.0, 1.0, 1.0)),
        Err(CrystalError::DegenerateGeometry(_))
    ));
}

#[test]
fn fermi_level_outside_samples() {
    let lattice = cesium_chloride(2.0 * PI);
    let reciprocal = ReciprocalLattice::new(&lattice).unwrap();

    let mut kpoints = Vec::new();
    for i in 0..5 {
        for j in 0..5 {
            for k in 0..5 {
                let frac = Vector3::new(i as f64, j as f64, k as f64) * 0.3 - Vector3::repeat(0.1);
                kpoints.push(reciprocal.frac_to_cart(frac));
            }
        }
    }
    let energies: Vec<f64> = kpoints.iter().map(|k| k.norm()).collect();
    let max = energies.iter().cloned().fold(f64::MIN, f64::max);
    let surface = FermiSurface::from_single_band(reciprocal, kpoints, energies);

    for level in [max + 1.0, -0.5] {
        assert!(matches!(
            surface.mesh_isosurface(level, 6),
            Err(CrystalError::NoIsosurface { .. })
        ));
    }
    let mesh = surface.mesh_isosurface(0.7, 8).unwrap();
    assert!(mesh.area() > 0.0);
}

#[test]
fn cell_and_config_files() {
    let dir = tempfile::tempdir().unwrap();

    let cell_path = dir.path().join("cscl.toml");
    let lattice = cesium_chloride(4.1);
    fs::write(&cell_path, toml::to_string(&lattice).unwrap()).unwrap();
    let read: Lattice = toml::from_str(&fs::read_to_string(&cell_path).unwrap()).unwrap();
    assert_eq!(read, lattice);

    let config_path = dir.path().join("cltk.toml");
    fs::write(&config_path, "symprec = 1e-3\ngrid_resolution = 24\n").unwrap();
    let config = ToolkitConfig::from_toml_str(&fs::read_to_string(&config_path).unwrap()).unwrap();
    assert_eq!(config.grid_resolution, 24);

    let group = SpaceGroup::new(&read, config.symprec).unwrap();
    assert_eq!(group.number(), 221);
}
