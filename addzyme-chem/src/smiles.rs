//! SMILES string parser.
//!
//! Supports the organic subset, bracket atoms (isotope, hydrogen count,
//! charge; chirality markers are accepted and dropped), branches, ring
//! closures including `%nn`, explicit bond symbols and `.`-separated
//! fragments. Cis/trans markers (`/`, `\`) are ignored.

use std::collections::BTreeMap;

use addzyme_core::{AddzymeError, Result};

use crate::element::{default_valence, element_by_symbol};
use crate::molecule::{Bond, BondOrder, MolAtom, Molecule};

/// Parse a SMILES string into a `Molecule`.
pub fn parse_smiles(smiles: &str) -> Result<Molecule> {
    parse_smiles_named(smiles, "")
}

/// Parse a SMILES string into a `Molecule` with a given name.
pub fn parse_smiles_named(smiles: &str, name: &str) -> Result<Molecule> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(AddzymeError::Parse("empty SMILES".into()));
    }
    let mut parser = SmilesParser::new(trimmed);
    parser.parse()?;
    parser.check_closed()?;
    parser.compute_implicit_hydrogens();
    Ok(Molecule::new(name.to_string(), parser.atoms, parser.bonds))
}

struct SmilesParser<'a> {
    input: &'a [u8],
    pos: usize,
    atoms: Vec<MolAtom>,
    /// Whether each atom was written in brackets (its H count is explicit).
    bracketed: Vec<bool>,
    bonds: Vec<Bond>,
    /// ring_closures[digit] = (atom_idx, bond written at the opening)
    ring_closures: BTreeMap<u16, (usize, Option<BondOrder>)>,
    branch_stack: Vec<usize>,
    prev_atom: Option<usize>,
    pending_bond: Option<BondOrder>,
}

impl<'a> SmilesParser<'a> {
    fn new(input: &'a str) -> Self {
        SmilesParser {
            input: input.as_bytes(),
            pos: 0,
            atoms: Vec::new(),
            bracketed: Vec::new(),
            bonds: Vec::new(),
            ring_closures: BTreeMap::new(),
            branch_stack: Vec::new(),
            prev_atom: None,
            pending_bond: None,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.peek();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    fn error(&self, msg: impl std::fmt::Display) -> AddzymeError {
        AddzymeError::Parse(format!("{msg} at position {}", self.pos))
    }

    fn parse(&mut self) -> Result<()> {
        while let Some(ch) = self.peek() {
            match ch {
                b'(' => {
                    self.advance();
                    let prev = self.prev_atom.ok_or_else(|| self.error("branch without preceding atom"))?;
                    self.branch_stack.push(prev);
                }
                b')' => {
                    self.advance();
                    self.prev_atom = Some(
                        self.branch_stack
                            .pop()
                            .ok_or_else(|| self.error("unmatched ')'"))?,
                    );
                    self.pending_bond = None;
                }
                b'-' => self.set_bond(BondOrder::Single),
                b'=' => self.set_bond(BondOrder::Double),
                b'#' => self.set_bond(BondOrder::Triple),
                b':' => self.set_bond(BondOrder::Aromatic),
                b'/' | b'\\' => {
                    self.advance();
                }
                b'%' => {
                    self.advance();
                    let ring_num = self.parse_two_digit_ring()?;
                    self.handle_ring_closure(ring_num)?;
                }
                b'[' => self.parse_bracket_atom()?,
                b'0'..=b'9' => {
                    self.advance();
                    self.handle_ring_closure((ch - b'0') as u16)?;
                }
                b'.' => {
                    self.advance();
                    if self.pending_bond.is_some() {
                        return Err(self.error("bond symbol before '.'"));
                    }
                    self.prev_atom = None;
                }
                _ if is_organic_atom_start(ch) => self.parse_organic_atom()?,
                _ => {
                    return Err(self.error(format!("unexpected character '{}'", ch as char)));
                }
            }
        }
        Ok(())
    }

    fn set_bond(&mut self, order: BondOrder) {
        self.advance();
        self.pending_bond = Some(order);
    }

    fn parse_organic_atom(&mut self) -> Result<()> {
        let Some(ch) = self.advance() else {
            return Err(self.error("unexpected end of SMILES"));
        };
        let is_aromatic = ch.is_ascii_lowercase();

        let symbol = match (ch, self.peek()) {
            (b'B', Some(b'r')) => {
                self.advance();
                "Br"
            }
            (b'C', Some(b'l')) => {
                self.advance();
                "Cl"
            }
            (b'B' | b'b', _) => "B",
            (b'C' | b'c', _) => "C",
            (b'N' | b'n', _) => "N",
            (b'O' | b'o', _) => "O",
            (b'P' | b'p', _) => "P",
            (b'S' | b's', _) => "S",
            (b'F', _) => "F",
            (b'I', _) => "I",
            _ => return Err(self.error(format!("unknown organic atom '{}'", ch as char))),
        };

        let elem = element_by_symbol(symbol)
            .ok_or_else(|| self.error(format!("unknown element '{symbol}'")))?;

        let mut atom = MolAtom::new(elem.atomic_number);
        atom.is_aromatic = is_aromatic;
        self.push_atom(atom, false)
    }

    fn parse_bracket_atom(&mut self) -> Result<()> {
        self.advance(); // '['

        let isotope = self.parse_optional_number();

        let ch = self
            .advance()
            .ok_or_else(|| self.error("unexpected end of SMILES in bracket atom"))?;
        if !ch.is_ascii_alphabetic() {
            return Err(self.error(format!("expected element symbol, found '{}'", ch as char)));
        }
        let is_aromatic = ch.is_ascii_lowercase();
        let upper = ch.to_ascii_uppercase() as char;

        let symbol = match self.peek() {
            Some(next) if next.is_ascii_lowercase() => {
                let two_letter = format!("{upper}{}", next as char);
                self.advance();
                if element_by_symbol(&two_letter).is_none() {
                    return Err(self.error(format!("unknown element '{two_letter}'")));
                }
                two_letter
            }
            _ => upper.to_string(),
        };

        let elem = element_by_symbol(&symbol)
            .ok_or_else(|| self.error(format!("unknown element '{symbol}'")))?;

        // Chirality is not used by any descriptor.
        while self.peek() == Some(b'@') {
            self.advance();
        }

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.advance();
            hydrogens = match self.peek() {
                Some(d) if d.is_ascii_digit() => {
                    self.advance();
                    d - b'0'
                }
                _ => 1,
            };
        }

        let charge = self.parse_charge()?;

        if self.advance() != Some(b']') {
            return Err(self.error("expected ']' in bracket atom"));
        }

        let atom = MolAtom {
            atomic_number: elem.atomic_number,
            formal_charge: charge,
            isotope: isotope.map(|n| n as u16),
            is_aromatic,
            implicit_hydrogens: hydrogens,
        };
        self.push_atom(atom, true)
    }

    fn parse_charge(&mut self) -> Result<i8> {
        let sign: i8 = match self.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(0),
        };
        let symbol = self.input[self.pos];
        self.advance();

        if let Some(d) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            return Ok(sign * (d - b'0') as i8);
        }
        // "++" and "--" repeat the sign
        let mut magnitude = 1i8;
        while self.peek() == Some(symbol) {
            self.advance();
            magnitude = magnitude
                .checked_add(1)
                .ok_or_else(|| self.error("charge out of range"))?;
        }
        Ok(sign * magnitude)
    }

    fn parse_optional_number(&mut self) -> Option<u32> {
        let mut n: u32 = 0;
        let mut found = false;
        while let Some(ch) = self.peek().filter(u8::is_ascii_digit) {
            self.advance();
            n = n.saturating_mul(10).saturating_add((ch - b'0') as u32);
            found = true;
        }
        found.then_some(n)
    }

    fn parse_two_digit_ring(&mut self) -> Result<u16> {
        let d1 = self.advance().ok_or_else(|| self.error("expected digit after '%'"))?;
        let d2 = self.advance().ok_or_else(|| self.error("expected second digit after '%'"))?;
        if !d1.is_ascii_digit() || !d2.is_ascii_digit() {
            return Err(self.error("invalid ring closure number after '%'"));
        }
        Ok((d1 - b'0') as u16 * 10 + (d2 - b'0') as u16)
    }

    fn push_atom(&mut self, atom: MolAtom, bracketed: bool) -> Result<()> {
        let atom_idx = self.atoms.len();
        self.atoms.push(atom);
        self.bracketed.push(bracketed);
        if let Some(prev) = self.prev_atom {
            let order = self.pending_bond.take();
            self.add_bond(prev, atom_idx, order)?;
        }
        self.pending_bond = None;
        self.prev_atom = Some(atom_idx);
        Ok(())
    }

    fn handle_ring_closure(&mut self, ring_num: u16) -> Result<()> {
        let current = self
            .prev_atom
            .ok_or_else(|| self.error("ring closure without preceding atom"))?;

        match self.ring_closures.remove(&ring_num) {
            Some((open_atom, open_bond)) => {
                if open_atom == current {
                    return Err(self.error(format!("ring closure {ring_num} bonds an atom to itself")));
                }
                let order = self.pending_bond.take().or(open_bond);
                self.add_bond(open_atom, current, order)?;
            }
            None => {
                let order = self.pending_bond.take();
                self.ring_closures.insert(ring_num, (current, order));
            }
        }
        Ok(())
    }

    /// Add a bond; an unspecified order is aromatic between two aromatic atoms, single otherwise.
    fn add_bond(&mut self, a1: usize, a2: usize, order: Option<BondOrder>) -> Result<()> {
        if self
            .bonds
            .iter()
            .any(|b| (b.atom1 == a1 && b.atom2 == a2) || (b.atom1 == a2 && b.atom2 == a1))
        {
            return Err(self.error(format!("duplicate bond between atoms {a1} and {a2}")));
        }
        let both_aromatic = self.atoms[a1].is_aromatic && self.atoms[a2].is_aromatic;
        let order = order.unwrap_or(if both_aromatic {
            BondOrder::Aromatic
        } else {
            BondOrder::Single
        });
        self.bonds.push(Bond {
            atom1: a1,
            atom2: a2,
            order,
            is_aromatic: both_aromatic && order == BondOrder::Aromatic,
        });
        Ok(())
    }

    fn check_closed(&self) -> Result<()> {
        if !self.ring_closures.is_empty() {
            let open: Vec<_> = self.ring_closures.keys().collect();
            return Err(AddzymeError::Parse(format!("unmatched ring closure(s): {open:?}")));
        }
        if !self.branch_stack.is_empty() {
            return Err(AddzymeError::Parse(format!(
                "{} unmatched '(' in SMILES",
                self.branch_stack.len()
            )));
        }
        if self.pending_bond.is_some() {
            return Err(AddzymeError::Parse("SMILES ends with a bond symbol".into()));
        }
        Ok(())
    }

    /// Fill in hydrogens for organic-subset atoms from their default valence.
    fn compute_implicit_hydrogens(&mut self) {
        for i in 0..self.atoms.len() {
            if self.bracketed[i] {
                continue;
            }
            let atom = &self.atoms[i];
            let Some(valence) = default_valence(atom.atomic_number) else {
                continue;
            };
            let valence = valence as usize;

            // An aromatic atom donates one electron to the pi system; each
            // aromatic bond then counts once toward its sigma capacity.
            let (available, used) = if atom.is_aromatic {
                (valence.saturating_sub(1), self.aromatic_valence_used(i))
            } else {
                (valence, self.bond_order_sum(i))
            };
            self.atoms[i].implicit_hydrogens = available.saturating_sub(used) as u8;
        }
    }

    fn aromatic_valence_used(&self, atom_idx: usize) -> usize {
        self.bonds
            .iter()
            .filter(|b| b.atom1 == atom_idx || b.atom2 == atom_idx)
            .map(|b| match b.order {
                BondOrder::Aromatic | BondOrder::Single => 1,
                BondOrder::Double => 2,
                BondOrder::Triple => 3,
            })
            .sum()
    }

    fn bond_order_sum(&self, atom_idx: usize) -> usize {
        let v: f64 = self
            .bonds
            .iter()
            .filter(|b| b.atom1 == atom_idx || b.atom2 == atom_idx)
            .map(|b| b.order.as_f64())
            .sum();
        v.round() as usize
    }
}

fn is_organic_atom_start(ch: u8) -> bool {
    matches!(
        ch,
        b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I'
            | b'b' | b'c' | b'n' | b'o' | b'p' | b's'
    )
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::properties::molecular_formula;
    use proptest::prelude::*;

    fn simple_smiles() -> impl Strategy<Value = String> {
        let atoms = prop_oneof![Just("C"), Just("N"), Just("O"), Just("S"), Just("Cl")];
        proptest::collection::vec(atoms, 1..=20).prop_map(|parts| parts.join(""))
    }

    proptest! {
        #[test]
        fn parse_smiles_does_not_panic(s in "\\PC{0,100}") {
            let _ = parse_smiles(&s);
        }

        #[test]
        fn chains_always_parse(smi in simple_smiles()) {
            let mol = parse_smiles(&smi).unwrap();
            prop_assert!(mol.atom_count() > 0);
            prop_assert_eq!(mol.bond_count(), mol.atom_count() - 1);
            prop_assert_eq!(molecular_formula(&mol), molecular_formula(&mol));
        }
    }
}
