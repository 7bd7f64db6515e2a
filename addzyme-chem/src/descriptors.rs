//! Graph-based molecular descriptors and a named descriptor calculator.
//!
//! Descriptors are computed on the heavy-atom graph with hydrogens held as
//! per-atom counts. Each one is registered under an RDKit-style name so a
//! model's feature list can be written as plain text and resolved here.
//!
//! ```
//! use addzyme_chem::{parse_smiles, DescriptorCalculator};
//!
//! let calc = DescriptorCalculator::from_list("MolWt, HeavyAtomCount, TPSA").unwrap();
//! let values = calc.calculate(&parse_smiles("CCO").unwrap());
//! assert_eq!(values.len(), 3);
//! assert_eq!(values[1], 3.0);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use addzyme_core::{AddzymeError, Result};

use crate::element::element_by_number;
use crate::molecule::{BondOrder, Molecule};
use crate::properties::{
    hba_count, hbd_count, heavy_atom_molecular_weight, molecular_weight, rotatable_bond_count,
};
use crate::ring;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Ring counts by kind.
#[derive(Debug, Clone, PartialEq)]
pub struct RingDetails {
    pub total: usize,
    pub aromatic: usize,
    pub aliphatic: usize,
    pub saturated: usize,
    pub aromatic_heterocycles: usize,
    pub aliphatic_heterocycles: usize,
    pub spiro_atoms: usize,
    pub fused_pairs: usize,
}

/// Shared per-molecule state for one descriptor pass.
pub struct DescriptorInput<'a> {
    pub mol: &'a Molecule,
    pub rings: Vec<Vec<usize>>,
    dist: Vec<Vec<usize>>,
}

impl<'a> DescriptorInput<'a> {
    pub fn new(mol: &'a Molecule) -> Self {
        DescriptorInput {
            mol,
            rings: ring::find_sssr(mol),
            dist: shortest_path_matrix(mol),
        }
    }
}

/// A registered descriptor.
#[derive(Clone, Copy)]
pub struct DescriptorDef {
    pub name: &'static str,
    pub description: &'static str,
    compute: fn(&DescriptorInput<'_>) -> f64,
}

impl std::fmt::Debug for DescriptorDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DescriptorDef").field("name", &self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

macro_rules! def {
    ($name:literal, $desc:literal, $f:expr) => {
        DescriptorDef { name: $name, description: $desc, compute: $f }
    };
}

static REGISTRY: &[DescriptorDef] = &[
    def!("MolWt", "average molecular weight", |d| molecular_weight(d.mol)),
    def!("HeavyAtomMolWt", "molecular weight ignoring hydrogens", |d| heavy_atom_molecular_weight(d.mol)),
    def!("HeavyAtomCount", "number of non-hydrogen atoms", |d| d.mol.heavy_atom_count() as f64),
    def!("NumHeteroatoms", "number of atoms other than C and H", |d| {
        d.mol.atoms.iter().filter(|a| !matches!(a.atomic_number, 1 | 6)).count() as f64
    }),
    def!("NumValenceElectrons", "valence electrons including hydrogens", |d| num_valence_electrons(d.mol)),
    def!("NumHDonors", "hydrogen bond donors", |d| hbd_count(d.mol) as f64),
    def!("NumHAcceptors", "hydrogen bond acceptors", |d| hba_count(d.mol) as f64),
    def!("NHOHCount", "hydrogens on N and O", |d| {
        d.mol
            .atoms
            .iter()
            .filter(|a| matches!(a.atomic_number, 7 | 8))
            .map(|a| a.implicit_hydrogens as f64)
            .sum()
    }),
    def!("NOCount", "number of N and O atoms", |d| {
        d.mol.atoms.iter().filter(|a| matches!(a.atomic_number, 7 | 8)).count() as f64
    }),
    def!("NumRotatableBonds", "rotatable bonds", |d| rotatable_bond_count(d.mol, &d.rings) as f64),
    def!("RingCount", "rings in the smallest set of smallest rings", |d| d.rings.len() as f64),
    def!("NumAromaticRings", "fully aromatic rings", |d| ring_details(d).aromatic as f64),
    def!("NumAliphaticRings", "rings with a non-aromatic atom", |d| ring_details(d).aliphatic as f64),
    def!("NumSaturatedRings", "aliphatic rings with only single bonds", |d| ring_details(d).saturated as f64),
    def!("NumAromaticHeterocycles", "aromatic rings with a heteroatom", |d| {
        ring_details(d).aromatic_heterocycles as f64
    }),
    def!("NumAliphaticHeterocycles", "aliphatic rings with a heteroatom", |d| {
        ring_details(d).aliphatic_heterocycles as f64
    }),
    def!("NumSpiroAtoms", "atoms shared by two rings and nothing else", |d| ring_details(d).spiro_atoms as f64),
    def!("FractionCSP3", "fraction of sp3 carbons", |d| fraction_sp3(d.mol)),
    def!("TPSA", "topological polar surface area", |d| tpsa(d.mol)),
    def!("MolLogP", "Wildman-Crippen logP", |d| wildman_crippen(d).0),
    def!("MolMR", "Wildman-Crippen molar refractivity", |d| wildman_crippen(d).1),
    def!("BertzCT", "Bertz complexity", |d| bertz_ct(d.mol)),
    def!("BalabanJ", "Balaban J index", |d| balaban_j(d)),
    def!("WienerIndex", "sum of topological distances", |d| wiener_index(d)),
    def!("ZagrebM1", "first Zagreb index", |d| zagreb_indices(d.mol).0),
    def!("ZagrebM2", "second Zagreb index", |d| zagreb_indices(d.mol).1),
    def!("Chi0", "zero-order connectivity index", |d| chi_connectivity(d.mol)[0]),
    def!("Chi1", "first-order connectivity index", |d| chi_connectivity(d.mol)[1]),
    def!("Chi2", "second-order connectivity index", |d| chi_connectivity(d.mol)[2]),
    def!("Chi3", "third-order path connectivity index", |d| chi_connectivity(d.mol)[3]),
    def!("Kappa1", "first kappa shape index", |d| kappa_shape_indices(d.mol).0),
    def!("Kappa2", "second kappa shape index", |d| kappa_shape_indices(d.mol).1),
    def!("Kappa3", "third kappa shape index", |d| kappa_shape_indices(d.mol).2),
    def!("MaxEStateIndex", "largest atom E-state", |d| fold_estate(d, f64::max, f64::NEG_INFINITY)),
    def!("MinEStateIndex", "smallest atom E-state", |d| fold_estate(d, f64::min, f64::INFINITY)),
    def!("MaxAbsEStateIndex", "largest absolute atom E-state", |d| {
        estate_indices(d).iter().map(|v| v.abs()).fold(0.0, f64::max)
    }),
    def!("MinAbsEStateIndex", "smallest absolute atom E-state", |d| {
        let values = estate_indices(d);
        if values.is_empty() {
            0.0
        } else {
            values.iter().map(|v| v.abs()).fold(f64::INFINITY, f64::min)
        }
    }),
];

fn fold_estate(d: &DescriptorInput<'_>, f: fn(f64, f64) -> f64, init: f64) -> f64 {
    let values = estate_indices(d);
    if values.is_empty() {
        0.0
    } else {
        values.into_iter().fold(init, f)
    }
}

/// All registered descriptors in registry order.
pub fn registry() -> &'static [DescriptorDef] {
    REGISTRY
}

/// Look up a descriptor by its exact name.
pub fn descriptor_by_name(name: &str) -> Option<&'static DescriptorDef> {
    REGISTRY.iter().find(|d| d.name == name)
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// An ordered selection of descriptors producing a fixed-length vector.
#[derive(Debug, Clone)]
pub struct DescriptorCalculator {
    defs: Vec<&'static DescriptorDef>,
}

impl DescriptorCalculator {
    /// Resolve descriptor names in order.
    ///
    /// Unknown or repeated names and an empty list are rejected.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(AddzymeError::InvalidInput("descriptor list is empty".into()));
        }
        let mut seen = HashSet::new();
        let defs = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                if !seen.insert(name.to_string()) {
                    return Err(AddzymeError::InvalidInput(format!("duplicate descriptor '{name}'")));
                }
                descriptor_by_name(name)
                    .ok_or_else(|| AddzymeError::InvalidInput(format!("unknown descriptor '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DescriptorCalculator { defs })
    }

    /// Parse a comma- or newline-separated list of names.
    pub fn from_list(text: &str) -> Result<Self> {
        let names: Vec<&str> = text
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        Self::new(&names)
    }

    /// Every registered descriptor.
    pub fn all() -> Self {
        DescriptorCalculator { defs: REGISTRY.iter().collect() }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.defs.iter().map(|d| d.name).collect()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Descriptor values in list order.
    pub fn calculate(&self, mol: &Molecule) -> Vec<f64> {
        let input = DescriptorInput::new(mol);
        self.defs.iter().map(|d| (d.compute)(&input)).collect()
    }

    /// Descriptor values paired with their names.
    pub fn calculate_named(&self, mol: &Molecule) -> Vec<(&'static str, f64)> {
        self.names().into_iter().zip(self.calculate(mol)).collect()
    }
}

// ---------------------------------------------------------------------------
// Graph helpers
// ---------------------------------------------------------------------------

fn shortest_path_matrix(mol: &Molecule) -> Vec<Vec<usize>> {
    let n = mol.atom_count();
    let mut dist = vec![vec![usize::MAX; n]; n];

    for start in 0..n {
        dist[start][start] = 0;
        let mut queue = VecDeque::from([start]);
        while let Some(curr) = queue.pop_front() {
            for nb in mol.neighbors(curr) {
                if dist[start][nb] == usize::MAX {
                    dist[start][nb] = dist[start][curr] + 1;
                    queue.push_back(nb);
                }
            }
        }
    }
    dist
}

/// Number of simple paths with `length` bonds.
fn count_paths(mol: &Molecule, length: usize) -> usize {
    fn walk(mol: &Molecule, at: usize, left: usize, visited: &mut [bool]) -> usize {
        if left == 0 {
            return 1;
        }
        let mut total = 0;
        for nb in mol.neighbors(at) {
            if !visited[nb] {
                visited[nb] = true;
                total += walk(mol, nb, left - 1, visited);
                visited[nb] = false;
            }
        }
        total
    }

    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut count = 0;
    for start in 0..n {
        visited[start] = true;
        count += walk(mol, start, length, &mut visited);
        visited[start] = false;
    }
    // each path is found from both ends
    if length > 0 {
        count / 2
    } else {
        count
    }
}

fn principal_quantum_number(atomic_number: u8) -> f64 {
    match atomic_number {
        0..=2 => 1.0,
        3..=10 => 2.0,
        11..=18 => 3.0,
        19..=36 => 4.0,
        37..=54 => 5.0,
        55..=86 => 6.0,
        _ => 7.0,
    }
}

fn valence_electrons(atomic_number: u8) -> u8 {
    element_by_number(atomic_number).map_or(0, |e| e.valence_electrons)
}

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

/// Valence electrons of all atoms and hydrogens, corrected for net charge.
pub fn num_valence_electrons(mol: &Molecule) -> f64 {
    let heavy: i64 = mol.atoms.iter().map(|a| valence_electrons(a.atomic_number) as i64).sum();
    let implicit: i64 = mol.atoms.iter().map(|a| a.implicit_hydrogens as i64).sum();
    (heavy + implicit - mol.net_charge() as i64) as f64
}

/// Wiener index: sum of shortest-path distances over connected atom pairs.
pub fn wiener_index(input: &DescriptorInput<'_>) -> f64 {
    let n = input.mol.atom_count();
    let mut sum = 0u64;
    for i in 0..n {
        for j in (i + 1)..n {
            if input.dist[i][j] != usize::MAX {
                sum += input.dist[i][j] as u64;
            }
        }
    }
    sum as f64
}

/// Zagreb indices: M1 = Σ d(i)², M2 = Σ d(i)·d(j) over bonds.
pub fn zagreb_indices(mol: &Molecule) -> (f64, f64) {
    let m1 = (0..mol.atom_count())
        .map(|i| (mol.degree(i) * mol.degree(i)) as f64)
        .sum();
    let m2 = mol
        .bonds
        .iter()
        .map(|b| (mol.degree(b.atom1) * mol.degree(b.atom2)) as f64)
        .sum();
    (m1, m2)
}

/// Balaban J = m/(μ+1) · Σ (sᵢ·sⱼ)^(-1/2) over bonds, s being distance sums.
pub fn balaban_j(input: &DescriptorInput<'_>) -> f64 {
    let mol = input.mol;
    let n = mol.atom_count();
    let m = mol.bond_count();
    if n < 2 || m == 0 {
        return 0.0;
    }

    let s: Vec<f64> = input
        .dist
        .iter()
        .map(|row| row.iter().filter(|&&d| d != usize::MAX).map(|&d| d as f64).sum())
        .collect();

    let mu = ring::cyclomatic_number(mol) as f64;
    let edge_sum: f64 = mol
        .bonds
        .iter()
        .map(|b| (s[b.atom1], s[b.atom2]))
        .filter(|&(si, sj)| si > 0.0 && sj > 0.0)
        .map(|(si, sj)| (si * sj).powf(-0.5))
        .sum();

    m as f64 / (mu + 1.0) * edge_sum
}

/// Topological polar surface area from N, O, S and P fragment contributions (Ertl 2000).
pub fn tpsa(mol: &Molecule) -> f64 {
    (0..mol.atom_count()).map(|i| tpsa_contribution(mol, i)).sum()
}

fn tpsa_contribution(mol: &Molecule, idx: usize) -> f64 {
    let atom = &mol.atoms[idx];
    let h = atom.implicit_hydrogens;
    let degree = mol.degree(idx);
    let double = mol.adjacency[idx]
        .iter()
        .any(|&(_, bi)| mol.bonds[bi].order == BondOrder::Double);
    let triple = mol.adjacency[idx]
        .iter()
        .any(|&(_, bi)| mol.bonds[bi].order == BondOrder::Triple);

    match atom.atomic_number {
        7 if atom.formal_charge > 0 => match h {
            0 => 0.0,
            1 => 4.44,
            2 => 16.61,
            _ => 27.64,
        },
        7 if atom.is_aromatic => {
            if h > 0 {
                15.79
            } else {
                12.89
            }
        }
        7 => match (degree, h, double, triple) {
            (1, 0, _, true) => 23.79,
            (1, 2, _, _) => 26.02,
            (1, 1, true, _) => 23.85,
            (2, 1, false, _) => 12.03,
            (2, 0, true, _) => 12.36,
            (3, 0, false, _) => 3.24,
            (3, 0, true, _) => 11.68,
            (0, 3, _, _) => 23.79,
            _ => 3.01 + 9.0 * h as f64,
        },
        8 if atom.formal_charge < 0 => 23.06,
        8 if atom.is_aromatic => 13.14,
        8 => match (degree, h, double) {
            (1, 1, _) => 20.23,
            (1, 0, true) => 17.07,
            (2, 0, _) => 9.23,
            (0, 2, _) => 20.23,
            _ => 17.07,
        },
        _ => 0.0,
    }
}

/// Wildman-Crippen logP and molar refractivity from simplified atom types.
pub fn wildman_crippen(input: &DescriptorInput<'_>) -> (f64, f64) {
    let mol = input.mol;
    let in_ring = ring::ring_atom_mask(mol);
    let mut logp = 0.0;
    let mut mr = 0.0;

    for i in 0..mol.atom_count() {
        let (lp, m) = crippen_atom(mol, i, in_ring[i]);
        logp += lp;
        mr += m;

        let h = mol.atoms[i].implicit_hydrogens as f64;
        if mol.atoms[i].atomic_number == 6 {
            logp += h * 0.1230;
        } else {
            logp += h * -0.2677;
        }
        mr += h * 1.057;
    }
    (logp, mr)
}

fn crippen_atom(mol: &Molecule, idx: usize, in_ring: bool) -> (f64, f64) {
    let atom = &mol.atoms[idx];
    let double = mol.adjacency[idx]
        .iter()
        .any(|&(_, bi)| mol.bonds[bi].order == BondOrder::Double);
    let hetero_neighbor = mol
        .neighbors(idx)
        .any(|n| !matches!(mol.atoms[n].atomic_number, 1 | 6));

    match atom.atomic_number {
        6 if atom.is_aromatic && hetero_neighbor => (-0.14, 3.509),
        6 if atom.is_aromatic => (0.296, 3.509),
        6 if double && hetero_neighbor => (-0.03, 3.509),
        6 if double => (0.08, 3.509),
        6 if in_ring || mol.degree(idx) <= 2 => (0.1441, 3.509),
        6 if mol.degree(idx) == 3 => (0.0, 3.509),
        6 => (-0.04, 3.509),
        7 if atom.is_aromatic => (-0.3187, 2.188),
        7 if atom.formal_charge > 0 => (-1.019, 2.188),
        7 if double => (-0.5262, 2.188),
        7 => (-0.4458, 2.262),
        8 if atom.formal_charge < 0 => (-1.189, 1.476),
        8 if double => (-0.3339, 1.476),
        8 if mol.degree(idx) >= 2 => (-0.2893, 1.476),
        8 => (-0.3567, 1.476),
        9 => (0.4118, 1.108),
        15 => (0.2836, 6.920),
        16 if double => (-0.1084, 7.365),
        16 if atom.formal_charge != 0 => (-0.5188, 7.365),
        16 => (0.6237, 7.365),
        17 => (0.6895, 5.853),
        35 => (0.8813, 8.927),
        53 => (1.050, 13.940),
        _ => (0.0, 0.0),
    }
}

/// Bertz complexity: information content of the bond-type and atom-environment distributions.
pub fn bertz_ct(mol: &Molecule) -> f64 {
    if mol.bond_count() == 0 {
        return 0.0;
    }

    let mut bond_counts = [0usize; 4];
    for bond in &mol.bonds {
        bond_counts[match bond.order {
            BondOrder::Single => 0,
            BondOrder::Double => 1,
            BondOrder::Triple => 2,
            BondOrder::Aromatic => 3,
        }] += 1;
    }

    let mut environments: HashMap<(u8, usize, bool), usize> = HashMap::new();
    for (i, atom) in mol.atoms.iter().enumerate() {
        *environments
            .entry((atom.atomic_number, mol.degree(i), atom.is_aromatic))
            .or_default() += 1;
    }
    let env_counts: Vec<usize> = environments.into_values().collect();

    2.0 * (information_content(&bond_counts) + information_content(&env_counts))
}

fn information_content(counts: &[usize]) -> f64 {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    let entropy: f64 = counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            -p * p.log2()
        })
        .sum();
    entropy * n
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Hybridization {
    Sp,
    Sp2,
    Sp3,
}

fn hybridization(mol: &Molecule, atom: usize) -> Hybridization {
    if mol.atoms[atom].is_aromatic {
        return Hybridization::Sp2;
    }
    let (mut doubles, mut triples) = (0, 0);
    for bond in mol.bonds.iter().filter(|b| b.atom1 == atom || b.atom2 == atom) {
        match bond.order {
            BondOrder::Double => doubles += 1,
            BondOrder::Triple => triples += 1,
            BondOrder::Aromatic => return Hybridization::Sp2,
            BondOrder::Single => {}
        }
    }
    match (doubles, triples) {
        (_, t) if t > 0 => Hybridization::Sp,
        (d, _) if d > 1 => Hybridization::Sp,
        (1, _) => Hybridization::Sp2,
        _ => Hybridization::Sp3,
    }
}

/// Covalent radius relative to sp3 carbon, minus one; the per-atom α term.
fn hall_kier_contribution(atomic_number: u8, hyb: Hybridization) -> f64 {
    use Hybridization::*;
    match (atomic_number, hyb) {
        (1, _) => 0.0,
        (6, Sp) => -0.22,
        (6, Sp2) => -0.13,
        (6, Sp3) => 0.0,
        (7, Sp) => -0.29,
        (7, Sp2) => -0.20,
        (7, Sp3) => -0.04,
        (8, Sp2 | Sp) => -0.20,
        (8, Sp3) => -0.04,
        (9, _) => -0.07,
        (15, Sp2 | Sp) => 0.30,
        (15, Sp3) => 0.43,
        (16, Sp2 | Sp) => 0.22,
        (16, Sp3) => 0.35,
        (17, _) => 0.29,
        (35, _) => 0.48,
        (53, _) => 0.73,
        (z, _) => covalent_radius(z).map_or(0.0, |r| r / CARBON_SP3_RADIUS - 1.0),
    }
}

const CARBON_SP3_RADIUS: f64 = 0.77;

fn covalent_radius(atomic_number: u8) -> Option<f64> {
    Some(match atomic_number {
        3 => 1.23,
        5 => 0.88,
        11 => 1.54,
        12 => 1.36,
        13 => 1.25,
        14 => 1.17,
        19 => 2.03,
        20 => 1.74,
        26 => 1.17,
        29 => 1.17,
        30 => 1.25,
        33 => 1.21,
        34 => 1.17,
        80 => 1.44,
        _ => return None,
    })
}

/// Hall-Kier α: summed size and hybridization correction over all atoms.
pub fn hall_kier_alpha(mol: &Molecule) -> f64 {
    (0..mol.atom_count())
        .map(|i| hall_kier_contribution(mol.atoms[i].atomic_number, hybridization(mol, i)))
        .sum()
}

/// Kappa shape indices κ1, κ2, κ3 from path counts, with the Hall-Kier α
/// added to both the atom count and each path count.
pub fn kappa_shape_indices(mol: &Molecule) -> (f64, f64, f64) {
    let n = mol.atom_count();
    let alpha = hall_kier_alpha(mol);
    let a = n as f64 + alpha;

    let kappa = |paths: usize, numerator: f64| {
        let denom = paths as f64 + alpha;
        if paths == 0 || denom == 0.0 {
            0.0
        } else {
            numerator / (denom * denom)
        }
    };

    let k1 = if n >= 1 { kappa(count_paths(mol, 1), a * (a - 1.0).powi(2)) } else { 0.0 };
    let k2 = if n >= 2 {
        kappa(count_paths(mol, 2), (a - 1.0) * (a - 2.0).powi(2))
    } else {
        0.0
    };
    let k3 = if n >= 3 {
        let numerator = if n % 2 == 1 {
            (a - 1.0) * (a - 3.0).powi(2)
        } else {
            (a - 3.0) * (a - 2.0).powi(2)
        };
        kappa(count_paths(mol, 3), numerator)
    } else {
        0.0
    };

    (k1, k2, k3)
}

/// Randić/Kier-Hall connectivity indices χ0 through χ3 (path type).
pub fn chi_connectivity(mol: &Molecule) -> [f64; 4] {
    let n = mol.atom_count();
    let degree: Vec<f64> = (0..n).map(|i| mol.degree(i) as f64).collect();
    let weight = |atoms: &[usize]| -> f64 {
        let product: f64 = atoms.iter().map(|&i| degree[i]).product();
        if product > 0.0 {
            1.0 / product.sqrt()
        } else {
            0.0
        }
    };

    let chi0 = (0..n).map(|i| weight(&[i])).sum();
    let chi1 = mol.bonds.iter().map(|b| weight(&[b.atom1, b.atom2])).sum();

    let mut chi2 = 0.0;
    for center in 0..n {
        let around: Vec<usize> = mol.neighbors(center).collect();
        for (x, &i) in around.iter().enumerate() {
            for &k in &around[x + 1..] {
                chi2 += weight(&[i, center, k]);
            }
        }
    }

    // every 3-path is met once from each end
    let mut chi3 = 0.0;
    for i in 0..n {
        for j in mol.neighbors(i) {
            for k in mol.neighbors(j).filter(|&k| k != i) {
                for l in mol.neighbors(k).filter(|&l| l != j && l != i) {
                    chi3 += weight(&[i, j, k, l]);
                }
            }
        }
    }

    [chi0, chi1, chi2, chi3 / 2.0]
}

/// Fraction of carbons that are sp3 (no multiple or aromatic bonds).
pub fn fraction_sp3(mol: &Molecule) -> f64 {
    let carbons = mol.atoms.iter().filter(|a| a.atomic_number == 6).count();
    if carbons == 0 {
        return 0.0;
    }
    let sp3 = (0..mol.atom_count())
        .filter(|&i| {
            mol.atoms[i].atomic_number == 6 && !mol.atoms[i].is_aromatic && !mol.has_multiple_bond(i)
        })
        .count();
    sp3 as f64 / carbons as f64
}

/// Ring counts by kind over the SSSR.
pub fn ring_details(input: &DescriptorInput<'_>) -> RingDetails {
    let mol = input.mol;
    let rings = &input.rings;

    let is_aromatic = |r: &[usize]| r.iter().all(|&i| mol.atoms[i].is_aromatic);
    let has_hetero = |r: &[usize]| r.iter().any(|&i| mol.atoms[i].atomic_number != 6);
    let is_saturated = |r: &[usize]| {
        r.iter().enumerate().all(|(k, &a)| {
            let b = r[(k + 1) % r.len()];
            mol.get_bond(a, b).map_or(true, |bond| bond.order == BondOrder::Single)
        })
    };

    let aromatic = rings.iter().filter(|r| is_aromatic(r)).count();
    let aromatic_heterocycles = rings.iter().filter(|r| is_aromatic(r) && has_hetero(r)).count();
    let aliphatic_heterocycles = rings.iter().filter(|r| !is_aromatic(r) && has_hetero(r)).count();
    let saturated = rings.iter().filter(|r| !is_aromatic(r) && is_saturated(r)).count();

    let mut fused_pairs = 0;
    let mut shared_pairs: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..rings.len() {
        for j in (i + 1)..rings.len() {
            let shared: Vec<usize> = rings[i].iter().filter(|a| rings[j].contains(a)).copied().collect();
            if shared.len() >= 2 {
                fused_pairs += 1;
            }
            for &a in &shared {
                shared_pairs.entry(a).or_default().push(shared.len());
            }
        }
    }
    let spiro_atoms = shared_pairs
        .values()
        .filter(|sizes| sizes.iter().all(|&s| s == 1))
        .count();

    RingDetails {
        total: rings.len(),
        aromatic,
        aliphatic: rings.len() - aromatic,
        saturated,
        aromatic_heterocycles,
        aliphatic_heterocycles,
        spiro_atoms,
        fused_pairs,
    }
}

/// Kier-Hall electrotopological state of each atom.
///
/// Intrinsic state `I = ((2/N)²·δv + 1)/δ`, perturbed by `Σ (Iᵢ − Iⱼ)/(dᵢⱼ + 1)²`.
pub fn estate_indices(input: &DescriptorInput<'_>) -> Vec<f64> {
    let mol = input.mol;
    let n = mol.atom_count();

    let intrinsic: Vec<f64> = (0..n)
        .map(|i| {
            let atom = &mol.atoms[i];
            let delta_v = valence_electrons(atom.atomic_number) as f64 - atom.implicit_hydrogens as f64;
            let pqn = principal_quantum_number(atom.atomic_number);
            let delta = mol.degree(i).max(1) as f64;
            ((2.0 / pqn).powi(2) * delta_v + 1.0) / delta
        })
        .collect();

    (0..n)
        .map(|i| {
            let perturbation: f64 = (0..n)
                .filter(|&j| j != i && input.dist[i][j] != usize::MAX)
                .map(|j| {
                    let r = (input.dist[i][j] + 1) as f64;
                    (intrinsic[i] - intrinsic[j]) / (r * r)
                })
                .sum();
            intrinsic[i] + perturbation
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smiles::parse_smiles;

    fn input_for(smiles: &str) -> Molecule {
        parse_smiles(smiles).unwrap()
    }

    fn value(name: &str, smiles: &str) -> f64 {
        DescriptorCalculator::new(&[name]).unwrap().calculate(&input_for(smiles))[0]
    }

    #[test]
    fn wiener_index_hexane() {
        // 15 + 10 + 6 + 3 + 1
        assert!((value("WienerIndex", "CCCCCC") - 35.0).abs() < 1e-10);
    }

    #[test]
    fn zagreb_benzene() {
        let (m1, m2) = zagreb_indices(&input_for("c1ccccc1"));
        assert_eq!(m1, 24.0);
        assert_eq!(m2, 24.0);
    }

    #[test]
    fn tpsa_matches_ertl_values() {
        assert!((tpsa(&input_for("CCO")) - 20.23).abs() < 1e-9);
        assert!((tpsa(&input_for("CC(=O)Oc1ccccc1C(=O)O")) - 63.60).abs() < 1e-9);
        assert_eq!(tpsa(&input_for("CCCC")), 0.0);
    }

    #[test]
    fn logp_orders_by_polarity() {
        let hexane = value("MolLogP", "CCCCCC");
        let ethanol = value("MolLogP", "CCO");
        assert!(hexane > ethanol, "hexane={hexane} ethanol={ethanol}");
        assert!(value("MolMR", "CCCCCC") > value("MolMR", "CC"));
    }

    #[test]
    fn fraction_sp3_extremes() {
        assert_eq!(fraction_sp3(&input_for("C1CCCCC1")), 1.0);
        assert_eq!(fraction_sp3(&input_for("c1ccccc1")), 0.0);
        assert_eq!(fraction_sp3(&input_for("O")), 0.0);
    }

    #[test]
    fn ring_kinds() {
        let mol = input_for("c1ccc2ccccc2c1");
        let rd = ring_details(&DescriptorInput::new(&mol));
        assert_eq!(rd.total, 2);
        assert_eq!(rd.aromatic, 2);
        assert_eq!(rd.fused_pairs, 1);
        assert_eq!(rd.spiro_atoms, 0);

        let mol = input_for("C1CCC2(CC1)CCCC2");
        let rd = ring_details(&DescriptorInput::new(&mol));
        assert_eq!(rd.saturated, 2);
        assert_eq!(rd.spiro_atoms, 1);

        assert_eq!(value("NumAromaticHeterocycles", "c1ccncc1"), 1.0);
        assert_eq!(value("NumAliphaticHeterocycles", "C1CCOC1"), 1.0);
    }

    #[test]
    fn chi_indices_ethanol() {
        let chi = chi_connectivity(&input_for("CCO"));
        assert!((chi[0] - (2.0 + 1.0 / 2f64.sqrt())).abs() < 1e-10);
        assert!((chi[1] - 2.0 / 2f64.sqrt()).abs() < 1e-10);
        assert!((chi[2] - 1.0 / 2f64.sqrt()).abs() < 1e-10);
        assert_eq!(chi[3], 0.0);
    }

    #[test]
    fn chi3_counts_each_path_once() {
        // butane has one 3-path through degrees 1,2,2,1
        let chi = chi_connectivity(&input_for("CCCC"));
        assert!((chi[3] - 0.5).abs() < 1e-10);
    }

    #[test]
    fn kappa_butane() {
        let (k1, k2, k3) = kappa_shape_indices(&input_for("CCCC"));
        assert!((k1 - 4.0).abs() < 1e-10);
        assert!((k2 - 3.0).abs() < 1e-10);
        assert!((k3 - 4.0).abs() < 1e-10);
    }

    #[test]
    fn kappa_includes_hall_kier_alpha() {
        let ethanol = input_for("CCO");
        assert!((hall_kier_alpha(&ethanol) + 0.04).abs() < 1e-12);
        let (k1, k2, _) = kappa_shape_indices(&ethanol);
        assert!((k1 - 2.96).abs() < 1e-10, "k1={k1}");
        assert!((k2 - 1.96).abs() < 1e-10, "k2={k2}");

        let benzene = input_for("c1ccccc1");
        assert!((hall_kier_alpha(&benzene) + 0.78).abs() < 1e-12);
        assert!((value("Kappa1", "c1ccccc1") - 3.411570881).abs() < 1e-6);
    }

    #[test]
    fn estate_ethanol() {
        let mol = input_for("CCO");
        let es = estate_indices(&DescriptorInput::new(&mol));
        assert!((es[2] - 7.569).abs() < 1e-3, "O={}", es[2]);
        assert!((es[1] - 0.25).abs() < 1e-9, "CH2={}", es[1]);
        assert!((value("MaxEStateIndex", "CCO") - es[2]).abs() < 1e-12);
        assert!((value("MinEStateIndex", "CCO") - 0.25).abs() < 1e-9);
    }

    #[test]
    fn valence_electrons_counts_hydrogens_and_charge() {
        assert_eq!(value("NumValenceElectrons", "c1ccccc1"), 30.0);
        assert_eq!(value("NumValenceElectrons", "[NH4+]"), 8.0);
    }

    #[test]
    fn balaban_and_bertz_positive() {
        assert!(value("BalabanJ", "CCCC") > 0.0);
        assert!(value("BertzCT", "CC(=O)Oc1ccccc1C(=O)O") > 0.0);
        assert_eq!(value("BertzCT", "C"), 0.0);
    }

    #[test]
    fn single_atoms_do_not_produce_nan() {
        let calc = DescriptorCalculator::all();
        for smi in ["C", "[Na+]", "O", "[H][H]"] {
            let values = calc.calculate(&input_for(smi));
            for (name, v) in calc.names().iter().zip(&values) {
                assert!(v.is_finite(), "{name} for {smi} = {v}");
            }
        }
    }

    #[test]
    fn calculator_keeps_list_order() {
        let calc = DescriptorCalculator::from_list("TPSA, MolWt\nHeavyAtomCount").unwrap();
        assert_eq!(calc.names(), vec!["TPSA", "MolWt", "HeavyAtomCount"]);
        let values = calc.calculate(&input_for("CCO"));
        assert_eq!(values.len(), calc.len());
        assert!((values[1] - 46.069).abs() < 1e-3);
        assert_eq!(values[2], 3.0);
    }

    #[test]
    fn calculator_rejects_bad_lists() {
        assert!(matches!(
            DescriptorCalculator::from_list("MolWt, NotADescriptor"),
            Err(AddzymeError::InvalidInput(_))
        ));
        assert!(DescriptorCalculator::from_list(" , \n").is_err());
        assert!(DescriptorCalculator::from_list("MolWt, MolWt").is_err());
    }

    #[test]
    fn registry_names_are_unique() {
        let names: HashSet<&str> = registry().iter().map(|d| d.name).collect();
        assert_eq!(names.len(), registry().len());
        assert_eq!(DescriptorCalculator::all().len(), registry().len());
    }

    #[test]
    fn hydrogen_counts() {
        assert_eq!(value("NHOHCount", "NCCO"), 3.0);
        assert_eq!(value("NOCount", "NCCO"), 2.0);
        assert_eq!(value("NumHeteroatoms", "ClCCO"), 2.0);
    }
}
