#[cfg(test)]
mod _tests_symmetry_operations {
    use super::super::symmetry_operations::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix3, Vector3};

    // Four-fold rotation about z
    fn c4z() -> SymmetryOperation {
        SymmetryOperation::new(
            Matrix3::new(
                0, -1, 0,
                1, 0, 0,
                0, 0, 1,
            ),
            Vector3::zeros(),
        )
    }

    fn screw_21z(shift: f64) -> SymmetryOperation {
        SymmetryOperation::new(
            Matrix3::new(
                -1, 0, 0,
                0, -1, 0,
                0, 0, 1,
            ),
            Vector3::new(0.0, 0.0, shift),
        )
    }

    #[test]
    fn test_identity() {
        let identity = SymmetryOperation::identity();
        assert!(identity.is_identity());
        assert!(identity.is_proper());
        assert_eq!(identity.order(), Some(1));
        assert_eq!(SymmetryOperation::default(), identity);

        let p = Vector3::new(0.1, 0.2, 0.3);
        assert_eq!(identity.apply(p), p);
    }

    #[test]
    fn test_apply() {
        let op = c4z();
        assert_relative_eq!(op.apply(Vector3::new(1.0, 0.0, 0.5)), Vector3::new(0.0, 1.0, 0.5));

        let screw = screw_21z(0.5);
        assert_relative_eq!(
            screw.apply(Vector3::new(0.1, 0.2, 0.3)),
            Vector3::new(-0.1, -0.2, 0.8)
        );
    }

    #[test]
    fn test_compose_applies_right_operand_first() {
        let a = c4z();
        let b = screw_21z(0.5);
        let p = Vector3::new(0.3, -0.7, 0.2);
        assert_relative_eq!(a.compose(&b).apply(p), a.apply(b.apply(p)), epsilon = 1e-12);
        assert_relative_eq!(b.compose(&a).apply(p), b.apply(a.apply(p)), epsilon = 1e-12);
    }

    #[test]
    fn test_inverse() {
        let op = SymmetryOperation::new(
            Matrix3::new(
                0, 1, 0,
                -1, 1, 0,
                0, 0, -1,
            ),
            Vector3::new(0.25, 0.5, 1.0 / 3.0),
        );
        let inverse = op.inverse().unwrap();
        assert!(op.compose(&inverse).is_identity());
        assert!(inverse.compose(&op).is_identity());

        let singular = SymmetryOperation::new(Matrix3::new(1, 0, 0, 0, 1, 0, 0, 0, 0), Vector3::zeros());
        assert!(singular.inverse().is_none());
    }

    #[test]
    fn test_order() {
        assert_eq!(c4z().order(), Some(4));
        assert_eq!(screw_21z(0.5).order(), Some(2));
        assert_eq!(screw_21z(0.0).order(), Some(2));

        let inversion = SymmetryOperation::new(-Matrix3::identity(), Vector3::zeros());
        assert_eq!(inversion.order(), Some(2));
        assert!(!inversion.is_proper());

        // A pure translation by a lattice vector is the identity modulo the lattice
        let lattice_shift = SymmetryOperation::new(Matrix3::identity(), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(lattice_shift.order(), Some(1));
        assert!(!lattice_shift.is_identity());

        // Not a crystallographic screw
        assert_eq!(screw_21z(0.3).order(), None);
    }

    #[test]
    fn test_hexagonal_sixfold() {
        let c6 = SymmetryOperation::new(
            Matrix3::new(
                1, -1, 0,
                1, 0, 0,
                0, 0, 1,
            ),
            Vector3::zeros(),
        );
        assert_eq!(c6.order(), Some(6));
        assert!(c6.compose(&c6).compose(&c6).order() == Some(2));
    }
}
