#[cfg(test)]
mod _tests_reciprocal_lattice {
    use super::super::reciprocal_lattice::*;
    use crate::error::CrystalError;
    use crate::lattice::{
        body_centered_cubic_basis, face_centered_cubic_basis, hexagonal_basis, simple_cubic_basis, Lattice,
    };
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};
    use std::f64::consts::PI;

    const TOL: f64 = 1e-10;

    fn bare(basis: Matrix3<f64>) -> Lattice {
        Lattice::new(basis, Vec::new(), Vec::new()).unwrap()
    }

    #[test]
    fn test_duality() {
        for basis in [
            simple_cubic_basis(3.0),
            face_centered_cubic_basis(4.05),
            body_centered_cubic_basis(2.87),
            hexagonal_basis(2.46, 6.7),
            Matrix3::new(
                3.0, 0.2, 0.1,
                -0.4, 2.5, 0.0,
                0.3, 0.6, 4.0,
            ),
        ] {
            let reciprocal = ReciprocalLattice::new(&bare(basis)).unwrap();
            // a_i · b_j = 2π δ_ij
            let product = basis * reciprocal.basis().transpose();
            assert_relative_eq!(product, Matrix3::identity() * 2.0 * PI, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_simple_cubic_vectors() {
        let reciprocal = ReciprocalLattice::new(&bare(simple_cubic_basis(2.0))).unwrap();
        let [b1, b2, b3] = reciprocal.basis_vectors();
        assert_relative_eq!(b1, Vector3::new(PI, 0.0, 0.0), epsilon = TOL);
        assert_relative_eq!(b2, Vector3::new(0.0, PI, 0.0), epsilon = TOL);
        assert_relative_eq!(b3, Vector3::new(0.0, 0.0, PI), epsilon = TOL);
    }

    #[test]
    fn test_fcc_reciprocal_is_bcc() {
        let a = 4.0;
        let reciprocal = ReciprocalLattice::new(&bare(face_centered_cubic_basis(a))).unwrap();
        let expected = body_centered_cubic_basis(4.0 * PI / a);
        assert_relative_eq!(*reciprocal.basis(), expected, epsilon = TOL);
    }

    #[test]
    fn test_volume_and_real_basis() {
        let basis = hexagonal_basis(2.0, 5.0);
        let lattice = bare(basis);
        let reciprocal = ReciprocalLattice::new(&lattice).unwrap();

        assert_relative_eq!(
            reciprocal.volume(),
            (2.0 * PI).powi(3) / lattice.volume(),
            epsilon = 1e-9
        );
        assert_relative_eq!(reciprocal.real_basis().unwrap(), basis, epsilon = 1e-9);
    }

    #[test]
    fn test_frac_cart_roundtrip() {
        let reciprocal = ReciprocalLattice::new(&bare(hexagonal_basis(3.1, 4.9))).unwrap();
        let k_frac = Vector3::new(1.0 / 3.0, 1.0 / 3.0, 0.5);
        let k_cart = reciprocal.frac_to_cart(k_frac);
        assert_relative_eq!(reciprocal.cart_to_frac(k_cart).unwrap(), k_frac, epsilon = 1e-12);
    }

    #[test]
    fn test_enumerate_points() {
        let reciprocal = ReciprocalLattice::new(&bare(simple_cubic_basis(2.0 * PI))).unwrap();

        assert_eq!(reciprocal.enumerate_points(0), vec![Vector3::zeros()]);

        let shell = reciprocal.enumerate_points(1);
        assert_eq!(shell.len(), 27);
        assert_relative_eq!(shell[0], Vector3::new(-1.0, -1.0, -1.0), epsilon = TOL);
        assert_relative_eq!(shell[1], Vector3::new(-1.0, -1.0, 0.0), epsilon = TOL);
        assert_relative_eq!(shell[13], Vector3::zeros(), epsilon = TOL);

        assert_eq!(reciprocal.enumerate_points(2).len(), 125);
    }

    #[test]
    fn test_coplanar_basis_is_degenerate() {
        let basis = Matrix3::new(
            1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            1.0, 1.0, 0.0,
        );
        assert!(matches!(
            ReciprocalLattice::new(&bare(basis)),
            Err(CrystalError::DegenerateGeometry(_))
        ));
        assert!(matches!(
            ReciprocalLattice::from_real_basis(&Matrix3::zeros(), TOL),
            Err(CrystalError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn test_depends_only_on_basis() {
        let basis = simple_cubic_basis(3.0);
        let empty = ReciprocalLattice::new(&bare(basis)).unwrap();
        let decorated = Lattice::new(
            basis,
            vec!["Fe".to_string(), "Fe".to_string()],
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        )
        .unwrap();
        assert_eq!(ReciprocalLattice::new(&decorated).unwrap(), empty);
    }
}
