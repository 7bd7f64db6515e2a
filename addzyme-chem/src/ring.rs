//! Ring perception: smallest set of smallest rings (SSSR).

use std::collections::VecDeque;

use crate::molecule::Molecule;

/// Find the smallest set of smallest rings in a molecule.
///
/// Each ring is a vector of atom indices in traversal order, starting with
/// the smallest index. Rings are sorted by size.
pub fn find_sssr(mol: &Molecule) -> Vec<Vec<usize>> {
    if mol.atom_count() == 0 || mol.bond_count() == 0 {
        return Vec::new();
    }

    let expected = cyclomatic_number(mol);
    if expected == 0 {
        return Vec::new();
    }

    let ring_atoms = ring_atom_mask(mol);
    let mut rings: Vec<Vec<usize>> = Vec::new();

    // Shortest cycle through each ring bond
    for (bond_idx, bond) in mol.bonds.iter().enumerate() {
        if !ring_atoms[bond.atom1] || !ring_atoms[bond.atom2] {
            continue;
        }
        if let Some(mut ring) = bfs_shortest_path(mol, bond.atom1, bond.atom2, bond_idx, &ring_atoms) {
            normalize_ring(&mut ring);
            if !rings.contains(&ring) {
                rings.push(ring);
            }
        }
    }

    rings.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
    rings.truncate(expected);
    rings
}

/// Bonds − atoms + connected components.
pub fn cyclomatic_number(mol: &Molecule) -> usize {
    let components = mol.connected_components().len();
    (mol.bond_count() + components).saturating_sub(mol.atom_count())
}

/// Per-atom flag: true when the atom lies on at least one cycle.
///
/// Found by repeatedly pruning atoms of degree ≤ 1.
pub fn ring_atom_mask(mol: &Molecule) -> Vec<bool> {
    let n = mol.atom_count();
    let mut degree: Vec<usize> = (0..n).map(|i| mol.degree(i)).collect();
    let mut queue: VecDeque<usize> = (0..n).filter(|&i| degree[i] <= 1).collect();
    let mut removed = vec![false; n];

    while let Some(atom) = queue.pop_front() {
        if removed[atom] {
            continue;
        }
        removed[atom] = true;
        for &(neighbor, _) in &mol.adjacency[atom] {
            if !removed[neighbor] {
                degree[neighbor] -= 1;
                if degree[neighbor] <= 1 {
                    queue.push_back(neighbor);
                }
            }
        }
    }

    removed.iter().map(|&r| !r).collect()
}

/// Per-bond flag: true when the bond is part of one of the given rings.
pub fn ring_bond_mask(mol: &Molecule, rings: &[Vec<usize>]) -> Vec<bool> {
    let mut mask = vec![false; mol.bond_count()];
    for ring in rings {
        for i in 0..ring.len() {
            let a1 = ring[i];
            let a2 = ring[(i + 1) % ring.len()];
            if let Some(&(_, bi)) = mol.adjacency[a1].iter().find(|&&(n, _)| n == a2) {
                mask[bi] = true;
            }
        }
    }
    mask
}

/// BFS from `start` to `end` avoiding one bond, restricted to ring atoms.
fn bfs_shortest_path(
    mol: &Molecule,
    start: usize,
    end: usize,
    excluded_bond: usize,
    ring_atoms: &[bool],
) -> Option<Vec<usize>> {
    let n = mol.atom_count();
    let mut visited = vec![false; n];
    let mut parent = vec![usize::MAX; n];
    let mut queue = VecDeque::new();

    visited[start] = true;
    queue.push_back(start);

    while let Some(curr) = queue.pop_front() {
        if curr == end {
            let mut path = vec![end];
            let mut node = end;
            while node != start {
                node = parent[node];
                path.push(node);
            }
            path.reverse();
            return Some(path);
        }

        for &(neighbor, bond_idx) in &mol.adjacency[curr] {
            if bond_idx != excluded_bond && !visited[neighbor] && ring_atoms[neighbor] {
                visited[neighbor] = true;
                parent[neighbor] = curr;
                queue.push_back(neighbor);
            }
        }
    }

    None
}

/// Rotate a ring to start at its smallest index and walk toward the smaller neighbor.
fn normalize_ring(ring: &mut [usize]) {
    let Some(min_pos) = ring.iter().enumerate().min_by_key(|&(_, &v)| v).map(|(i, _)| i) else {
        return;
    };
    ring.rotate_left(min_pos);
    let n = ring.len();
    if n > 2 && ring[n - 1] < ring[1] {
        ring[1..].reverse();
    }
}
