//! Structure standardization.
//!
//! Brings user-entered structures to one consistent representation before
//! molecular weight and descriptors are computed. By default only explicit
//! hydrogens are folded into their heavy atoms, so charge states and counterions
//! are kept as entered. Neutralization, salt stripping, largest-fragment
//! selection and tautomer canonicalization are opt-in steps.

use addzyme_core::Result;

use crate::canon::canonical_smiles;
use crate::molecule::{BondOrder, MolAtom, Molecule};
use crate::properties::molecular_weight;
use crate::smiles::parse_smiles;

/// A step in the standardization pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StandardizeStep {
    FoldHydrogens,
    StripSalts,
    LargestFragment,
    Neutralize,
    CanonicalTautomer,
}

/// Configuration for the standardization pipeline.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StandardizeConfig {
    pub steps: Vec<StandardizeStep>,
}

impl Default for StandardizeConfig {
    /// Hydrogen folding only: fragments and charges count toward molecular weight.
    fn default() -> Self {
        StandardizeConfig {
            steps: vec![StandardizeStep::FoldHydrogens],
        }
    }
}

/// A standardized structure and its canonical SMILES.
#[derive(Debug, Clone)]
pub struct Standardized {
    pub canonical: String,
    pub molecule: Molecule,
}

/// Parse, standardize and canonicalize a SMILES string.
pub fn standardize_smiles(smiles: &str, config: &StandardizeConfig) -> Result<Standardized> {
    let parsed = parse_smiles(smiles)?;
    let molecule = standardize(&parsed, config)?;
    Ok(Standardized {
        canonical: canonical_smiles(&molecule),
        molecule,
    })
}

/// Apply the configured steps in order.
pub fn standardize(mol: &Molecule, config: &StandardizeConfig) -> Result<Molecule> {
    let mut result = mol.clone();
    for step in &config.steps {
        result = match step {
            StandardizeStep::FoldHydrogens => fold_hydrogens(&result),
            StandardizeStep::StripSalts => strip_salts(&result),
            StandardizeStep::LargestFragment => largest_fragment(&result),
            StandardizeStep::Neutralize => neutralize(&result),
            StandardizeStep::CanonicalTautomer => canonical_tautomer(&result),
        };
    }
    Ok(result)
}

/// Fold explicit, plain hydrogen atoms bonded to one heavy atom into that atom's H count.
///
/// Isotopic or charged hydrogens and H₂ are left as graph atoms.
pub fn fold_hydrogens(mol: &Molecule) -> Molecule {
    let foldable: Vec<bool> = (0..mol.atom_count())
        .map(|i| {
            let a = &mol.atoms[i];
            a.atomic_number == 1
                && a.isotope.is_none()
                && a.formal_charge == 0
                && mol.degree(i) == 1
                && mol.neighbors(i).all(|n| mol.atoms[n].atomic_number != 1)
        })
        .collect();

    if !foldable.iter().any(|&f| f) {
        return mol.clone();
    }

    let mut atoms = mol.atoms.clone();
    for (i, _) in foldable.iter().enumerate().filter(|(_, &f)| f) {
        for heavy in mol.neighbors(i) {
            atoms[heavy].implicit_hydrogens = atoms[heavy].implicit_hydrogens.saturating_add(1);
        }
    }

    let keep: Vec<usize> = (0..mol.atom_count()).filter(|&i| !foldable[i]).collect();
    Molecule::new(mol.name.clone(), atoms, mol.bonds.clone()).extract(&keep)
}

/// Keep only the largest connected fragment (by heavy atom count, then MW).
pub fn largest_fragment(mol: &Molecule) -> Molecule {
    let components = mol.connected_components();
    if components.len() <= 1 {
        return mol.clone();
    }

    let heavy = |comp: &[usize]| comp.iter().filter(|&&i| mol.atoms[i].atomic_number != 1).count();
    let best = components.iter().max_by(|a, b| {
        heavy(a).cmp(&heavy(b)).then_with(|| {
            molecular_weight(&mol.extract(a))
                .partial_cmp(&molecular_weight(&mol.extract(b)))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    });

    match best {
        Some(comp) => mol.extract(comp),
        None => mol.clone(),
    }
}

/// Single-atom counterions: (atomic number, charge).
const SALT_IONS: &[(u8, i8)] = &[
    (11, 1),  // Na+
    (19, 1),  // K+
    (3, 1),   // Li+
    (17, -1), // Cl-
    (35, -1), // Br-
    (53, -1), // I-
    (9, -1),  // F-
    (20, 2),  // Ca2+
    (12, 2),  // Mg2+
];

/// Remove counterions and small inorganic fragments.
///
/// If every fragment looks like a salt, the largest fragment is kept.
pub fn strip_salts(mol: &Molecule) -> Molecule {
    let components = mol.connected_components();
    if components.len() <= 1 {
        return mol.clone();
    }

    let organic: Vec<usize> = components
        .iter()
        .filter(|comp| !is_salt_fragment(mol, comp))
        .flatten()
        .copied()
        .collect();

    if organic.is_empty() {
        largest_fragment(mol)
    } else {
        mol.extract(&organic)
    }
}

fn is_salt_fragment(mol: &Molecule, component: &[usize]) -> bool {
    if let [only] = component {
        let atom = &mol.atoms[*only];
        return SALT_IONS
            .iter()
            .any(|&(an, ch)| atom.atomic_number == an && atom.formal_charge == ch);
    }

    // Small fragments without an organic backbone (no C or Si)
    component.len() <= 3
        && component
            .iter()
            .all(|&i| !matches!(mol.atoms[i].atomic_number, 6 | 14))
}

/// Neutralize common charged groups.
///
/// Protonated nitrogens lose a proton, and isolated O⁻/S⁻ gain one. Carboxylates
/// paired with a cation in the same molecule and charge-separated groups such
/// as nitro stay charged.
pub fn neutralize(mol: &Molecule) -> Molecule {
    let has_cation = mol
        .atoms
        .iter()
        .any(|a| a.formal_charge > 0 && !(a.atomic_number == 7 && a.implicit_hydrogens > 0));

    let atoms: Vec<MolAtom> = mol
        .atoms
        .iter()
        .enumerate()
        .map(|(i, atom)| {
            let mut atom = atom.clone();
            match (atom.atomic_number, atom.formal_charge) {
                (7, q) if q > 0 && atom.implicit_hydrogens > 0 => {
                    atom.formal_charge -= 1;
                    atom.implicit_hydrogens -= 1;
                }
                (8, -1) if !(has_cation && is_carboxylate_oxygen(mol, i)) && !next_to_cation(mol, i) => {
                    atom.formal_charge = 0;
                    atom.implicit_hydrogens += 1;
                }
                (16, -1) if !next_to_cation(mol, i) => {
                    atom.formal_charge = 0;
                    atom.implicit_hydrogens += 1;
                }
                _ => {}
            }
            atom
        })
        .collect();

    Molecule::new(mol.name.clone(), atoms, mol.bonds.clone())
}

/// Part of a charge-separated group such as nitro or N-oxide.
fn next_to_cation(mol: &Molecule, idx: usize) -> bool {
    mol.neighbors(idx).any(|n| mol.atoms[n].formal_charge > 0)
}

/// O⁻ on a carbon that also carries C=O.
fn is_carboxylate_oxygen(mol: &Molecule, o_idx: usize) -> bool {
    mol.neighbors(o_idx).any(|c| {
        mol.atoms[c].atomic_number == 6
            && mol.adjacency[c].iter().any(|&(n2, bi)| {
                n2 != o_idx && mol.atoms[n2].atomic_number == 8 && mol.bonds[bi].order == BondOrder::Double
            })
    })
}

/// Canonical tautomer selection.
///
/// Applies 1,3 proton shifts and keeps the form with the best score: fewer
/// charges, more aromatic atoms, more carbonyls.
pub fn canonical_tautomer(mol: &Molecule) -> Molecule {
    let mut best = mol.clone();
    let mut best_score = tautomer_score(&best);

    for _ in 0..10 {
        let improved = TAUTOMER_SHIFTS
            .iter()
            .filter_map(|shift| apply_shift(&best, shift))
            .map(|candidate| (tautomer_score(&candidate), candidate))
            .filter(|(score, _)| *score > best_score)
            .max_by_key(|(score, _)| *score);

        match improved {
            Some((score, candidate)) => {
                best = candidate;
                best_score = score;
            }
            None => break,
        }
    }

    best
}

/// A 1,3 proton shift: H moves from `donor` to `acceptor` across a middle atom,
/// swapping the single and double bonds.
struct ProtonShift {
    donor: u8,
    acceptor: u8,
}

const TAUTOMER_SHIFTS: &[ProtonShift] = &[
    // enol → keto
    ProtonShift { donor: 8, acceptor: 6 },
    // imidic acid → amide
    ProtonShift { donor: 8, acceptor: 7 },
    // amidine
    ProtonShift { donor: 7, acceptor: 7 },
];

fn apply_shift(mol: &Molecule, shift: &ProtonShift) -> Option<Molecule> {
    for (d, atom) in mol.atoms.iter().enumerate() {
        if atom.atomic_number != shift.donor || atom.implicit_hydrogens == 0 || atom.is_aromatic {
            continue;
        }
        for &(middle, bi) in &mol.adjacency[d] {
            if mol.bonds[bi].order != BondOrder::Single {
                continue;
            }
            for &(a, bj) in &mol.adjacency[middle] {
                if a == d
                    || mol.atoms[a].atomic_number != shift.acceptor
                    || mol.atoms[a].is_aromatic
                    || mol.bonds[bj].order != BondOrder::Double
                {
                    continue;
                }
                let mut atoms = mol.atoms.clone();
                let mut bonds = mol.bonds.clone();
                atoms[d].implicit_hydrogens -= 1;
                atoms[a].implicit_hydrogens += 1;
                bonds[bi].order = BondOrder::Double;
                bonds[bj].order = BondOrder::Single;
                return Some(Molecule::new(mol.name.clone(), atoms, bonds));
            }
        }
    }
    None
}

fn tautomer_score(mol: &Molecule) -> i64 {
    let charges: i64 = mol.atoms.iter().map(|a| a.formal_charge.unsigned_abs() as i64).sum();
    let aromatic = mol.atoms.iter().filter(|a| a.is_aromatic).count() as i64;
    let carbonyls = mol
        .bonds
        .iter()
        .filter(|b| {
            b.order == BondOrder::Double
                && (mol.atoms[b.atom1].atomic_number == 8 || mol.atoms[b.atom2].atomic_number == 8)
        })
        .count() as i64;
    aromatic * 5 + carbonyls * 3 - charges * 10
}
