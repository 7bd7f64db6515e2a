//! Molecular weight, formula and simple counts.

use std::collections::BTreeMap;

use addzyme_core::Summarizable;

use crate::element::{element_by_number, HYDROGEN_WEIGHT};
use crate::molecule::{BondOrder, Molecule};
use crate::ring;

/// Computed molecular properties.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MolecularProperties {
    pub molecular_weight: f64,
    pub formula: String,
    pub heavy_atom_count: usize,
    pub hydrogen_bond_donors: usize,
    pub hydrogen_bond_acceptors: usize,
    pub rotatable_bonds: usize,
    pub ring_count: usize,
}

impl Summarizable for MolecularProperties {
    fn summary(&self) -> String {
        format!(
            "MW={:.3} Formula={} HBD={} HBA={} RotBonds={} Rings={}",
            self.molecular_weight,
            self.formula,
            self.hydrogen_bond_donors,
            self.hydrogen_bond_acceptors,
            self.rotatable_bonds,
            self.ring_count,
        )
    }
}

/// Compute all molecular properties at once.
pub fn compute_properties(mol: &Molecule) -> MolecularProperties {
    let rings = ring::find_sssr(mol);
    MolecularProperties {
        molecular_weight: molecular_weight(mol),
        formula: molecular_formula(mol),
        heavy_atom_count: mol.heavy_atom_count(),
        hydrogen_bond_donors: hbd_count(mol),
        hydrogen_bond_acceptors: hba_count(mol),
        rotatable_bonds: rotatable_bond_count(mol, &rings),
        ring_count: rings.len(),
    }
}

/// Average molecular weight: atomic weights of all atoms plus their hydrogens.
pub fn molecular_weight(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .map(|atom| {
            let heavy = element_by_number(atom.atomic_number).map_or(0.0, |e| e.atomic_weight);
            heavy + atom.implicit_hydrogens as f64 * HYDROGEN_WEIGHT
        })
        .sum()
}

/// Molecular weight ignoring hydrogens.
pub fn heavy_atom_molecular_weight(mol: &Molecule) -> f64 {
    mol.atoms
        .iter()
        .filter(|a| a.atomic_number != 1)
        .filter_map(|a| element_by_number(a.atomic_number))
        .map(|e| e.atomic_weight)
        .sum()
}

/// Molecular formula in Hill order (C, H, then alphabetical); net charge appended.
pub fn molecular_formula(mol: &Molecule) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for atom in &mol.atoms {
        if let Some(elem) = element_by_number(atom.atomic_number) {
            *counts.entry(elem.symbol).or_insert(0) += 1;
        }
        if atom.implicit_hydrogens > 0 {
            *counts.entry("H").or_insert(0) += atom.implicit_hydrogens as usize;
        }
    }

    let mut formula = String::new();
    let mut push = |symbol: &str, count: usize| {
        formula.push_str(symbol);
        if count > 1 {
            formula.push_str(&count.to_string());
        }
    };

    if let Some(c) = counts.remove("C") {
        push("C", c);
        if let Some(h) = counts.remove("H") {
            push("H", h);
        }
    }
    for (symbol, count) in &counts {
        push(symbol, *count);
    }

    match mol.net_charge() {
        0 => {}
        1 => formula.push('+'),
        -1 => formula.push('-'),
        q if q > 0 => formula.push_str(&format!("+{q}")),
        q => formula.push_str(&q.to_string()),
    }
    formula
}

/// Count hydrogen bond donors (N or O atoms with at least one attached H).
pub fn hbd_count(mol: &Molecule) -> usize {
    mol.atoms
        .iter()
        .filter(|a| matches!(a.atomic_number, 7 | 8) && a.implicit_hydrogens > 0)
        .count()
}

/// Count hydrogen bond acceptors (N or O atoms).
pub fn hba_count(mol: &Molecule) -> usize {
    mol.atoms.iter().filter(|a| matches!(a.atomic_number, 7 | 8)).count()
}

/// Count rotatable bonds: acyclic single bonds between non-terminal atoms, excluding amide C–N.
pub fn rotatable_bond_count(mol: &Molecule, rings: &[Vec<usize>]) -> usize {
    let in_ring = ring::ring_bond_mask(mol, rings);

    mol.bonds
        .iter()
        .enumerate()
        .filter(|&(bi, bond)| {
            bond.order == BondOrder::Single
                && !in_ring[bi]
                && mol.degree(bond.atom1) > 1
                && mol.degree(bond.atom2) > 1
                && !is_amide_bond(mol, bond.atom1, bond.atom2)
        })
        .count()
}

/// C(=O)–N
fn is_amide_bond(mol: &Molecule, a1: usize, a2: usize) -> bool {
    let (c_idx, n_idx) = match (mol.atoms[a1].atomic_number, mol.atoms[a2].atomic_number) {
        (6, 7) => (a1, a2),
        (7, 6) => (a2, a1),
        _ => return false,
    };

    mol.adjacency[c_idx].iter().any(|&(neighbor, bond_idx)| {
        neighbor != n_idx
            && mol.atoms[neighbor].atomic_number == 8
            && mol.bonds[bond_idx].order == BondOrder::Double
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    #[test]
    fn mw_of_water() {
        let mol = parse_smiles("[OH2]").unwrap();
        assert!((molecular_weight(&mol) - 18.015).abs() < 0.01);
    }

    #[test]
    fn mw_of_benzaldehyde() {
        // C7H6O, 106.124
        let mol = parse_smiles("C1=CC=C(C=C1)C=O").unwrap();
        assert!((molecular_weight(&mol) - 106.124).abs() < 0.01);
        assert_eq!(molecular_formula(&mol), "C7H6O");
    }

    #[test]
    fn mw_of_carbon_monoxide() {
        // The lightest additive in the training data, 28.010
        let mol = parse_smiles("[C-]#[O+]").unwrap();
        assert!((molecular_weight(&mol) - 28.010).abs() < 0.001);
    }

    #[test]
    fn formula_of_glucose() {
        let mol = parse_smiles("OC(CO)C(O)C(O)C(O)C=O").unwrap();
        assert_eq!(molecular_formula(&mol), "C6H12O6");
    }

    #[test]
    fn formula_carries_charge() {
        let mol = parse_smiles("[NH4+]").unwrap();
        assert_eq!(molecular_formula(&mol), "H4N+");
    }

    #[test]
    fn heavy_atom_weight_excludes_hydrogen() {
        let mol = parse_smiles("C").unwrap();
        assert!((heavy_atom_molecular_weight(&mol) - 12.011).abs() < 1e-9);
    }

    #[test]
    fn hbd_hba_of_ethanol() {
        let mol = parse_smiles("CCO").unwrap();
        assert_eq!(hbd_count(&mol), 1);
        assert_eq!(hba_count(&mol), 1);
    }

    #[test]
    fn rotatable_bonds() {
        let butane = parse_smiles("CCCC").unwrap();
        assert_eq!(rotatable_bond_count(&butane, &ring::find_sssr(&butane)), 1);

        let amide = parse_smiles("CC(=O)NC").unwrap();
        assert_eq!(rotatable_bond_count(&amide, &ring::find_sssr(&amide)), 0);
    }

    #[test]
    fn properties_of_aspirin() {
        let mol = parse_smiles("CC(=O)Oc1ccccc1C(=O)O").unwrap();
        let props = compute_properties(&mol);
        assert!((props.molecular_weight - 180.16).abs() < 0.1, "MW={}", props.molecular_weight);
        assert_eq!(props.formula, "C9H8O4");
        assert_eq!(props.ring_count, 1);
        assert_eq!(props.hydrogen_bond_donors, 1);
        assert!(props.summary().starts_with("MW=180.1"));
    }
}
