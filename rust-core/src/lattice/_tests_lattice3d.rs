#[cfg(test)]
mod _tests_lattice3d {
    use super::super::lattice3d::*;
    use super::super::lattice_construction::{face_centered_cubic_basis, hexagonal_basis, simple_cubic_basis};
    use crate::error::CrystalError;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn rock_salt() -> Lattice {
        Lattice::new(
            simple_cubic_basis(5.64),
            labels(&["Na", "Cl"]),
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        )
        .unwrap()
    }

    // ======================== CONSTRUCTION ========================

    #[test]
    fn test_new_checks_species_count() {
        let result = Lattice::new(
            simple_cubic_basis(1.0),
            labels(&["Na"]),
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        );
        assert_eq!(
            result.unwrap_err(),
            CrystalError::Shape {
                context: "species labels",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_from_flat() {
        let lattice = Lattice::from_flat(
            simple_cubic_basis(2.0),
            labels(&["A", "B"]),
            &[0.0, 0.0, 0.0, 0.25, 0.5, 0.75],
        )
        .unwrap();
        assert_eq!(lattice.num_atoms(), 2);
        assert_eq!(lattice.positions_frac()[1], Vector3::new(0.25, 0.5, 0.75));

        let ragged = Lattice::from_flat(simple_cubic_basis(2.0), labels(&["A"]), &[0.0, 0.0]);
        assert!(matches!(ragged, Err(CrystalError::Shape { .. })));
    }

    #[test]
    fn test_from_vectors_matches_rows() {
        let a1 = Vector3::new(1.0, 0.0, 0.0);
        let a2 = Vector3::new(0.5, 1.0, 0.0);
        let a3 = Vector3::new(0.0, 0.2, 2.0);
        let lattice = Lattice::from_vectors(a1, a2, a3, Vec::new(), Vec::new()).unwrap();
        assert_eq!(lattice.lattice_vectors(), [a1, a2, a3]);
        assert_eq!(lattice.num_atoms(), 0);
    }

    // ======================== COORDINATE TRANSFORMS ========================

    #[test]
    fn test_cartesian_positions_use_row_basis() {
        let lattice = Lattice::new(
            hexagonal_basis(2.0, 3.0),
            labels(&["C"]),
            vec![Vector3::new(1.0, 1.0, 0.5)],
        )
        .unwrap();
        let cart = lattice.cartesian_positions()[0];
        // a1 + a2 + a3 / 2
        assert_relative_eq!(cart, Vector3::new(1.0, 3.0_f64.sqrt(), 1.5), epsilon = TOL);
    }

    #[test]
    fn test_frac_cart_roundtrip() {
        let basis = Matrix3::new(
            3.0, 0.1, 0.0,
            -1.2, 2.5, 0.3,
            0.4, 0.0, 4.0,
        );
        let positions = vec![
            Vector3::new(0.1, 0.2, 0.3),
            Vector3::new(0.9, -0.4, 1.7),
            Vector3::new(0.5, 0.5, 0.5),
        ];
        let lattice = Lattice::new(basis, labels(&["A", "B", "C"]), positions.clone()).unwrap();

        let cart = lattice.cartesian_positions();
        let back = lattice.fractional_positions_from_cartesian(&cart).unwrap();
        for (original, recovered) in positions.iter().zip(&back) {
            assert_relative_eq!(original, recovered, epsilon = 1e-12);
        }
        assert_relative_eq!(lattice.cart_to_frac(cart[1]).unwrap(), positions[1], epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_basis_has_no_fractional_coordinates() {
        let basis = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            1.0, 1.0, 0.0,
        );
        let lattice = Lattice::new(basis, Vec::new(), Vec::new()).unwrap();
        assert!(matches!(
            lattice.cart_to_frac(Vector3::new(1.0, 0.0, 0.0)),
            Err(CrystalError::DegenerateGeometry(_))
        ));
    }

    // ======================== CELL METRICS ========================

    #[test]
    fn test_volume() {
        assert_relative_eq!(rock_salt().volume(), 5.64_f64.powi(3), epsilon = 1e-9);

        let fcc = Lattice::new(face_centered_cubic_basis(4.0), Vec::new(), Vec::new()).unwrap();
        assert_relative_eq!(fcc.volume(), 16.0, epsilon = TOL);
    }

    #[test]
    fn test_parameters_and_angles() {
        let hex = Lattice::new(hexagonal_basis(2.5, 4.0), Vec::new(), Vec::new()).unwrap();
        let (a, b, c) = hex.lattice_parameters();
        assert_relative_eq!(a, 2.5, epsilon = TOL);
        assert_relative_eq!(b, 2.5, epsilon = TOL);
        assert_relative_eq!(c, 4.0, epsilon = TOL);

        let (alpha, beta, gamma) = hex.lattice_angles();
        assert_relative_eq!(alpha, PI / 2.0, epsilon = TOL);
        assert_relative_eq!(beta, PI / 2.0, epsilon = TOL);
        assert_relative_eq!(gamma, 2.0 * PI / 3.0, epsilon = TOL);

        let metric = hex.metric_tensor();
        assert_relative_eq!(metric[(0, 1)], -2.5 * 2.5 / 2.0, epsilon = TOL);
        assert_relative_eq!(metric, metric.transpose(), epsilon = TOL);
    }

    #[test]
    fn test_wrapped() {
        let lattice = Lattice::new(
            simple_cubic_basis(1.0),
            labels(&["A"]),
            vec![Vector3::new(1.25, -0.25, 0.5)],
        )
        .unwrap();
        let wrapped = lattice.wrapped();
        assert_relative_eq!(wrapped.positions_frac()[0], Vector3::new(0.25, 0.75, 0.5), epsilon = TOL);
        assert_eq!(wrapped.species(), lattice.species());
    }

    #[test]
    fn test_cell_outline() {
        let lattice = rock_salt();
        let corners = lattice.cell_corners();
        assert_eq!(corners[0], Vector3::zeros());
        assert_relative_eq!(corners[7], Vector3::new(5.64, 5.64, 5.64), epsilon = TOL);

        // Every edge is parallel to one lattice vector
        for (from, to) in Lattice::cell_edges() {
            let edge = corners[to] - corners[from];
            assert_relative_eq!(edge.norm(), 5.64, epsilon = TOL);
        }
    }

    // ======================== SERIALIZATION ========================

    #[test]
    fn test_toml_roundtrip() {
        let lattice = rock_salt();
        let text = toml::to_string(&lattice).unwrap();
        assert!(text.contains("species"));

        let parsed: Lattice = toml::from_str(&text).unwrap();
        assert_eq!(parsed, lattice);
    }

    #[test]
    fn test_record_with_mismatched_species_is_rejected() {
        let text = r#"
            basis = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
            species = ["A", "B"]
            positions = [[0.0, 0.0, 0.0]]
        "#;
        assert!(toml::from_str::<Lattice>(text).is_err());
    }
}
