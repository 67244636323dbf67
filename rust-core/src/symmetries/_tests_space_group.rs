#[cfg(test)]
mod _tests_space_group {
    use super::super::space_group::*;
    use crate::error::CrystalError;
    use crate::lattice::{face_centered_cubic_basis, hexagonal_basis, simple_cubic_basis, Lattice};
    use nalgebra::Vector3;

    const SYMPREC: f64 = 1e-5;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // Every operation maps the decorated cell onto itself, modulo lattice translations
    fn assert_invariant(lattice: &Lattice, group: &SpaceGroup) {
        for op in group.symmetry_operations() {
            for (frac, label) in lattice.positions_frac().iter().zip(lattice.species()) {
                let image = op.apply(*frac);
                let matched = lattice
                    .positions_frac()
                    .iter()
                    .zip(lattice.species())
                    .any(|(other, other_label)| {
                        let d = image - other;
                        other_label == label && d.iter().all(|c| (c - c.round()).abs() < 1e-6)
                    });
                assert!(matched, "operation {:?} moves {:?} off the structure", op, frac);
            }
        }
    }

    #[test]
    fn test_simple_cubic() {
        let lattice = Lattice::new(simple_cubic_basis(3.0), labels(&["Po"]), vec![Vector3::zeros()]).unwrap();
        let group = SpaceGroup::new(&lattice, SYMPREC).unwrap();

        assert_eq!(group.number(), 221);
        assert_eq!(group.num_operations(), 48);
        assert!(!group.spacegroup_symbol().is_empty());
        assert!(group.symmetry_operations().iter().any(|op| op.is_identity()));
        assert_invariant(&lattice, &group);
    }

    #[test]
    fn test_primitive_fcc() {
        let lattice =
            Lattice::new(face_centered_cubic_basis(4.05), labels(&["Al"]), vec![Vector3::zeros()]).unwrap();
        let group = SpaceGroup::new(&lattice, SYMPREC).unwrap();
        assert_eq!(group.number(), 225);
        assert_eq!(group.num_operations(), 48);
        assert_invariant(&lattice, &group);
    }

    #[test]
    fn test_cesium_chloride() {
        let lattice = Lattice::new(
            simple_cubic_basis(4.1),
            labels(&["Cs", "Cl"]),
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        )
        .unwrap();
        let group = SpaceGroup::new(&lattice, SYMPREC).unwrap();
        assert_eq!(group.number(), 221);
        assert_eq!(group.species_kinds(), &["Cs".to_string(), "Cl".to_string()]);
        assert_invariant(&lattice, &group);
    }

    #[test]
    fn test_identical_species_raise_symmetry() {
        // Same geometry as CsCl but one element: body-centred cubic
        let lattice = Lattice::new(
            simple_cubic_basis(2.87),
            labels(&["Fe", "Fe"]),
            vec![Vector3::zeros(), Vector3::new(0.5, 0.5, 0.5)],
        )
        .unwrap();
        let group = SpaceGroup::new(&lattice, SYMPREC).unwrap();
        assert_eq!(group.number(), 229);
    }

    #[test]
    fn test_hexagonal_operations_have_crystallographic_order() {
        let lattice = Lattice::new(hexagonal_basis(2.5, 4.0), labels(&["Mg"]), vec![Vector3::zeros()]).unwrap();
        let group = SpaceGroup::new(&lattice, SYMPREC).unwrap();
        assert_eq!(group.number(), 191);
        assert_eq!(group.num_operations(), 24);
        for op in group.symmetry_operations() {
            assert!(op.order().is_some());
        }
    }

    #[test]
    fn test_species_kinds_by_first_appearance() {
        let (numbers, kinds) = species_kinds(&labels(&["O", "Ti", "O", "Sr", "Ti"]));
        assert_eq!(numbers, vec![0, 1, 0, 2, 1]);
        assert_eq!(kinds, labels(&["O", "Ti", "Sr"]));
    }

    #[test]
    fn test_invalid_inputs() {
        let empty = Lattice::new(simple_cubic_basis(1.0), Vec::new(), Vec::new()).unwrap();
        assert!(matches!(SpaceGroup::new(&empty, SYMPREC), Err(CrystalError::Symmetry(_))));

        let lattice = Lattice::new(simple_cubic_basis(1.0), labels(&["X"]), vec![Vector3::zeros()]).unwrap();
        assert!(matches!(
            SpaceGroup::new(&lattice, 0.0),
            Err(CrystalError::InvalidArgument(_))
        ));
    }
}
