//! Molecular graph representation.

use std::collections::VecDeque;

use addzyme_core::{Annotated, Summarizable};

/// Bond order classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Numeric bond order for valence calculations.
    pub fn as_f64(self) -> f64 {
        match self {
            BondOrder::Single => 1.0,
            BondOrder::Double => 2.0,
            BondOrder::Triple => 3.0,
            BondOrder::Aromatic => 1.5,
        }
    }
}

/// An atom in a molecular graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MolAtom {
    pub atomic_number: u8,
    pub formal_charge: i8,
    pub isotope: Option<u16>,
    pub is_aromatic: bool,
    /// Hydrogens carried by this atom (inferred or written in a bracket).
    pub implicit_hydrogens: u8,
}

impl MolAtom {
    /// A neutral, non-aromatic atom with no hydrogens.
    pub fn new(atomic_number: u8) -> Self {
        MolAtom {
            atomic_number,
            formal_charge: 0,
            isotope: None,
            is_aromatic: false,
            implicit_hydrogens: 0,
        }
    }
}

/// A bond between two atoms.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    pub atom1: usize,
    pub atom2: usize,
    pub order: BondOrder,
    pub is_aromatic: bool,
}

/// A molecular graph with atoms, bonds, and adjacency information.
#[derive(Debug, Clone)]
pub struct Molecule {
    pub name: String,
    pub atoms: Vec<MolAtom>,
    pub bonds: Vec<Bond>,
    /// adjacency[atom_idx] = Vec<(neighbor_atom_idx, bond_idx)>
    pub adjacency: Vec<Vec<(usize, usize)>>,
}

impl Molecule {
    /// Create a new molecule, building the adjacency list from atoms and bonds.
    pub fn new(name: String, atoms: Vec<MolAtom>, bonds: Vec<Bond>) -> Self {
        let mut adjacency = vec![Vec::new(); atoms.len()];
        for (bi, bond) in bonds.iter().enumerate() {
            adjacency[bond.atom1].push((bond.atom2, bi));
            adjacency[bond.atom2].push((bond.atom1, bi));
        }
        Molecule { name, atoms, bonds, adjacency }
    }

    /// Number of graph nodes (hydrogens folded into their heavy atom are not counted).
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    /// Number of non-hydrogen atoms.
    pub fn heavy_atom_count(&self) -> usize {
        self.atoms.iter().filter(|a| a.atomic_number != 1).count()
    }

    /// Neighbor atom indices for a given atom.
    pub fn neighbors(&self, atom_idx: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[atom_idx].iter().map(|&(n, _)| n)
    }

    /// Graph degree of an atom (number of explicit bonds).
    pub fn degree(&self, atom_idx: usize) -> usize {
        self.adjacency[atom_idx].len()
    }

    /// Find the bond between two atoms, if any.
    pub fn get_bond(&self, a1: usize, a2: usize) -> Option<&Bond> {
        self.adjacency[a1]
            .iter()
            .find(|&&(n, _)| n == a2)
            .map(|&(_, bi)| &self.bonds[bi])
    }

    /// Whether the atom carries a double or triple bond.
    pub fn has_multiple_bond(&self, atom_idx: usize) -> bool {
        self.adjacency[atom_idx]
            .iter()
            .any(|&(_, bi)| matches!(self.bonds[bi].order, BondOrder::Double | BondOrder::Triple))
    }

    /// Total hydrogen count (implicit + explicit H atoms).
    pub fn total_hydrogen_count(&self) -> usize {
        let explicit = self.atoms.iter().filter(|a| a.atomic_number == 1).count();
        let implicit: usize = self.atoms.iter().map(|a| a.implicit_hydrogens as usize).sum();
        explicit + implicit
    }

    /// Sum of formal charges.
    pub fn net_charge(&self) -> i32 {
        self.atoms.iter().map(|a| a.formal_charge as i32).sum()
    }

    /// Atom indices grouped by connected component, in discovery order.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let n = self.atom_count();
        let mut visited = vec![false; n];
        let mut components = Vec::new();

        for start in 0..n {
            if visited[start] {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::new();
            queue.push_back(start);
            visited[start] = true;
            while let Some(curr) = queue.pop_front() {
                component.push(curr);
                for &(neighbor, _) in &self.adjacency[curr] {
                    if !visited[neighbor] {
                        visited[neighbor] = true;
                        queue.push_back(neighbor);
                    }
                }
            }
            components.push(component);
        }

        components
    }

    /// Build a sub-molecule from a subset of atom indices.
    ///
    /// Bonds with an endpoint outside `atoms` are dropped.
    pub fn extract(&self, atoms: &[usize]) -> Molecule {
        let mut index_map = vec![usize::MAX; self.atom_count()];
        let mut kept = Vec::with_capacity(atoms.len());

        for (new_idx, &old_idx) in atoms.iter().enumerate() {
            index_map[old_idx] = new_idx;
            kept.push(self.atoms[old_idx].clone());
        }

        let bonds = self
            .bonds
            .iter()
            .filter_map(|bond| {
                let a1 = index_map[bond.atom1];
                let a2 = index_map[bond.atom2];
                (a1 != usize::MAX && a2 != usize::MAX).then(|| Bond {
                    atom1: a1,
                    atom2: a2,
                    order: bond.order,
                    is_aromatic: bond.is_aromatic,
                })
            })
            .collect();

        Molecule::new(self.name.clone(), kept, bonds)
    }
}

impl Annotated for Molecule {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Summarizable for Molecule {
    fn summary(&self) -> String {
        format!(
            "{}: {} heavy atoms, {} bonds",
            if self.name.is_empty() { "Molecule" } else { &self.name },
            self.heavy_atom_count(),
            self.bond_count()
        )
    }
}
