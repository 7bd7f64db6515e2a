//! Canonical SMILES writer.
//!
//! Atoms are ranked by iterative neighbourhood refinement of their local
//! invariants, and the graph is written by a depth-first walk that always
//! visits the lowest-ranked neighbour first. Two inputs describing the same
//! structure produce the same string.
//!
//! ```
//! use addzyme_chem::{canonical_smiles, parse_smiles};
//!
//! let a = parse_smiles("OCC").unwrap();
//! let b = parse_smiles("CCO").unwrap();
//! assert_eq!(canonical_smiles(&a), canonical_smiles(&b));
//! ```

use crate::element::{default_valence, element_by_number};
use crate::molecule::{BondOrder, Molecule};

/// Write a canonical SMILES string for `mol`.
pub fn canonical_smiles(mol: &Molecule) -> String {
    let n = mol.atom_count();
    if n == 0 {
        return String::new();
    }

    let ranks = canonical_ranks(mol);
    let closures = assign_ring_closures(mol, &ranks);

    let mut visited = vec![false; n];
    let mut out = String::new();
    while let Some(start) = (0..n).filter(|&i| !visited[i]).min_by_key(|&i| ranks[i]) {
        if !out.is_empty() {
            out.push('.');
        }
        write_branch(mol, start, None, &ranks, &closures, &mut visited, &mut out);
    }
    out
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

fn canonical_ranks(mol: &Molecule) -> Vec<u64> {
    let n = mol.atom_count();

    let mut invariants: Vec<u64> = (0..n)
        .map(|i| {
            let atom = &mol.atoms[i];
            (atom.atomic_number as u64) << 40
                | (mol.degree(i) as u64) << 32
                | (atom.implicit_hydrogens as u64) << 24
                | ((atom.formal_charge as i64 + 128) as u64) << 16
                | (atom.isotope.unwrap_or(0) as u64 & 0xff) << 8
                | atom.is_aromatic as u64
        })
        .collect();

    let mut distinct = count_distinct(&invariants);
    for _ in 0..n {
        let refined: Vec<u64> = (0..n)
            .map(|i| {
                let mut around: Vec<u64> = mol.adjacency[i]
                    .iter()
                    .map(|&(nb, bi)| {
                        invariants[nb]
                            .wrapping_mul(31)
                            .wrapping_add(mol.bonds[bi].order as u64)
                    })
                    .collect();
                around.sort_unstable();
                around.iter().fold(invariants[i].wrapping_mul(1_000_003), |acc, v| {
                    acc.wrapping_mul(1_000_003).wrapping_add(*v)
                })
            })
            .collect();

        let refined_distinct = count_distinct(&refined);
        if refined_distinct <= distinct {
            break;
        }
        invariants = refined;
        distinct = refined_distinct;
    }

    let mut order: Vec<(u64, usize)> = invariants.iter().copied().zip(0..n).collect();
    order.sort_unstable();

    let mut ranks = vec![0u64; n];
    let mut rank = 0u64;
    for w in 0..order.len() {
        if w > 0 && order[w].0 != order[w - 1].0 {
            rank += 1;
        }
        ranks[order[w].1] = rank;
    }
    ranks
}

fn count_distinct(values: &[u64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.len()
}

fn sorted_neighbors(mol: &Molecule, atom: usize, from: Option<usize>, ranks: &[u64]) -> Vec<(usize, usize)> {
    let mut neighbors: Vec<(usize, usize)> = mol.adjacency[atom]
        .iter()
        .copied()
        .filter(|&(nb, _)| Some(nb) != from)
        .collect();
    neighbors.sort_by_key(|&(nb, _)| ranks[nb]);
    neighbors
}

// ---------------------------------------------------------------------------
// Ring closures
// ---------------------------------------------------------------------------

/// Per atom: (ring digit, bond index, opens here).
type Closures = Vec<Vec<(usize, usize, bool)>>;

/// Walk the graph in writing order and number every back edge.
fn assign_ring_closures(mol: &Molecule, ranks: &[u64]) -> Closures {
    let n = mol.atom_count();
    let mut closures: Closures = vec![Vec::new(); n];
    let mut visited = vec![false; n];
    let mut used = vec![false; mol.bond_count()];
    let mut next = 1usize;

    while let Some(start) = (0..n).filter(|&i| !visited[i]).min_by_key(|&i| ranks[i]) {
        closure_dfs(mol, start, None, ranks, &mut visited, &mut used, &mut closures, &mut next);
    }
    closures
}

#[allow(clippy::too_many_arguments)]
fn closure_dfs(
    mol: &Molecule,
    atom: usize,
    from: Option<usize>,
    ranks: &[u64],
    visited: &mut [bool],
    used: &mut [bool],
    closures: &mut Closures,
    next: &mut usize,
) {
    visited[atom] = true;
    for (nb, bi) in sorted_neighbors(mol, atom, from, ranks) {
        if visited[nb] {
            if !used[bi] {
                used[bi] = true;
                closures[nb].push((*next, bi, true));
                closures[atom].push((*next, bi, false));
                *next += 1;
            }
        } else {
            used[bi] = true;
            closure_dfs(mol, nb, Some(atom), ranks, visited, used, closures, next);
        }
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn write_branch(
    mol: &Molecule,
    atom: usize,
    from: Option<usize>,
    ranks: &[u64],
    closures: &Closures,
    visited: &mut [bool],
    out: &mut String,
) {
    visited[atom] = true;
    write_atom(mol, atom, out);

    let mut digits = closures[atom].clone();
    digits.sort_by_key(|&(digit, _, _)| digit);
    for (digit, bi, opens) in digits {
        if opens {
            write_bond(mol, bi, out);
        }
        write_ring_digit(digit, out);
    }

    let mut children = tree_children(mol, atom, from, ranks, closures);
    children.sort_by_cached_key(|&(nb, _)| (subtree_size(mol, nb, atom, ranks, closures), ranks[nb]));
    let last = children.len().saturating_sub(1);
    for (k, &(nb, bi)) in children.iter().enumerate() {
        if visited[nb] {
            continue;
        }
        let branch = k < last;
        if branch {
            out.push('(');
        }
        write_bond(mol, bi, out);
        write_branch(mol, nb, Some(atom), ranks, closures, visited, out);
        if branch {
            out.push(')');
        }
    }
}

/// Neighbours reached through spanning-tree bonds, i.e. not ring closures.
fn tree_children(
    mol: &Molecule,
    atom: usize,
    from: Option<usize>,
    ranks: &[u64],
    closures: &Closures,
) -> Vec<(usize, usize)> {
    sorted_neighbors(mol, atom, from, ranks)
        .into_iter()
        .filter(|&(_, bi)| !closures[atom].iter().any(|&(_, cb, _)| cb == bi))
        .collect()
}

/// Atoms written in the branch rooted at `atom`.
fn subtree_size(mol: &Molecule, atom: usize, from: usize, ranks: &[u64], closures: &Closures) -> usize {
    1 + tree_children(mol, atom, Some(from), ranks, closures)
        .into_iter()
        .map(|(nb, _)| subtree_size(mol, nb, atom, ranks, closures))
        .sum::<usize>()
}

fn write_ring_digit(digit: usize, out: &mut String) {
    if digit < 10 {
        out.push(char::from(b'0' + digit as u8));
    } else {
        out.push('%');
        out.push_str(&digit.to_string());
    }
}

fn write_bond(mol: &Molecule, bond_idx: usize, out: &mut String) {
    let bond = &mol.bonds[bond_idx];
    let both_aromatic = mol.atoms[bond.atom1].is_aromatic && mol.atoms[bond.atom2].is_aromatic;
    match bond.order {
        BondOrder::Single if both_aromatic => out.push('-'),
        BondOrder::Single => {}
        BondOrder::Double => out.push('='),
        BondOrder::Triple => out.push('#'),
        BondOrder::Aromatic if !both_aromatic => out.push(':'),
        BondOrder::Aromatic => {}
    }
}

fn write_atom(mol: &Molecule, idx: usize, out: &mut String) {
    let atom = &mol.atoms[idx];
    let Some(elem) = element_by_number(atom.atomic_number) else {
        out.push('*');
        return;
    };
    let symbol = if atom.is_aromatic {
        elem.symbol.to_ascii_lowercase()
    } else {
        elem.symbol.to_string()
    };

    let plain = atom.formal_charge == 0
        && atom.isotope.is_none()
        && is_organic_subset(atom.atomic_number, atom.is_aromatic)
        && inferred_hydrogens(mol, idx) == Some(atom.implicit_hydrogens);
    if plain {
        out.push_str(&symbol);
        return;
    }

    out.push('[');
    if let Some(iso) = atom.isotope {
        out.push_str(&iso.to_string());
    }
    out.push_str(&symbol);
    match atom.implicit_hydrogens {
        0 => {}
        1 => out.push('H'),
        h => {
            out.push('H');
            out.push_str(&h.to_string());
        }
    }
    match atom.formal_charge {
        0 => {}
        1 => out.push('+'),
        -1 => out.push('-'),
        q if q > 0 => {
            out.push('+');
            out.push_str(&q.to_string());
        }
        q => {
            out.push('-');
            out.push_str(&q.unsigned_abs().to_string());
        }
    }
    out.push(']');
}

/// Hydrogen count a reader would infer for this atom written without brackets.
fn inferred_hydrogens(mol: &Molecule, idx: usize) -> Option<u8> {
    let valence = default_valence(mol.atoms[idx].atomic_number)? as usize;
    let bonds = mol.adjacency[idx].iter().map(|&(_, bi)| &mol.bonds[bi]);
    let (available, used) = if mol.atoms[idx].is_aromatic {
        let used: usize = bonds
            .map(|b| match b.order {
                BondOrder::Aromatic | BondOrder::Single => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
            })
            .sum();
        (valence.saturating_sub(1), used)
    } else {
        let used: f64 = bonds.map(|b| b.order.as_f64()).sum();
        (valence, used.round() as usize)
    };
    Some(available.saturating_sub(used) as u8)
}

fn is_organic_subset(atomic_number: u8, is_aromatic: bool) -> bool {
    if is_aromatic {
        matches!(atomic_number, 5 | 6 | 7 | 8 | 15 | 16)
    } else {
        matches!(atomic_number, 5 | 6 | 7 | 8 | 9 | 15 | 16 | 17 | 35 | 53)
    }
}
