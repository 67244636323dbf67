// Space-group detection for a decorated cell

use log::{debug, info};
use moyo::base::{AngleTolerance, Cell, Lattice as MoyoLattice};
use moyo::data::Setting;
use moyo::MoyoDataset;
use serde::{Deserialize, Serialize};

use crate::error::CrystalError;
use crate::lattice::Lattice;
use crate::symmetries::symmetry_operations::SymmetryOperation;
use crate::Result;

/// Space group of a [`Lattice`], detected once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceGroup {
    number: i32,
    hall_number: i32,
    symbol: String,
    operations: Vec<SymmetryOperation>,
    kinds: Vec<String>,
}

impl SpaceGroup {
    /// Detect the space group of `lattice` with position tolerance `symprec`.
    ///
    /// Species labels are mapped to integer kinds in order of first appearance. Any failure
    /// of the detector is returned as a `Symmetry` error.
    pub fn new(lattice: &Lattice, symprec: f64) -> Result<Self> {
        if !symprec.is_finite() || symprec <= 0.0 {
            return Err(CrystalError::InvalidArgument(format!(
                "symprec must be a positive finite tolerance, got {}",
                symprec
            )));
        }
        if lattice.num_atoms() == 0 {
            return Err(CrystalError::Symmetry(
                "cell has no atoms to detect symmetry from".to_string(),
            ));
        }

        let (numbers, kinds) = species_kinds(lattice.species());
        let cell = Cell::new(
            MoyoLattice::new(*lattice.basis()),
            lattice.positions_frac().to_vec(),
            numbers,
        );

        let dataset = MoyoDataset::new(&cell, symprec, AngleTolerance::Default, Setting::Spglib, true)
            .map_err(|e| CrystalError::Symmetry(e.to_string()))?;

        let operations: Vec<SymmetryOperation> = dataset
            .operations
            .iter()
            .map(|op| SymmetryOperation::new(op.rotation, op.translation))
            .collect();

        info!(
            "space group {} ({}) with {} operations",
            dataset.number,
            dataset.hm_symbol,
            operations.len()
        );
        debug!("species kinds: {:?}", kinds);

        Ok(SpaceGroup {
            number: dataset.number,
            hall_number: dataset.hall_number,
            symbol: dataset.hm_symbol.clone(),
            operations,
            kinds,
        })
    }

    /// International space-group number (1-230).
    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn hall_number(&self) -> i32 {
        self.hall_number
    }

    /// Hermann-Mauguin symbol.
    pub fn spacegroup_symbol(&self) -> &str {
        &self.symbol
    }

    /// Operations in fractional coordinates of the input cell.
    pub fn symmetry_operations(&self) -> &[SymmetryOperation] {
        &self.operations
    }

    pub fn num_operations(&self) -> usize {
        self.operations.len()
    }

    /// Distinct species labels; kind `n` is `species_kinds()[n]`.
    pub fn species_kinds(&self) -> &[String] {
        &self.kinds
    }
}

// Integer kind per atom, numbered by first appearance of its label
pub(crate) fn species_kinds(species: &[String]) -> (Vec<i32>, Vec<String>) {
    let mut kinds: Vec<String> = Vec::new();
    let numbers = species
        .iter()
        .map(|label| {
            let kind = match kinds.iter().position(|k| k == label) {
                Some(idx) => idx,
                None => {
                    kinds.push(label.clone());
                    kinds.len() - 1
                }
            };
            kind as i32
        })
        .collect();
    (numbers, kinds)
}
