//! Periodic table data (H through U) with average atomic weights.

/// A chemical element from the periodic table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element {
    pub atomic_number: u8,
    pub symbol: &'static str,
    /// Standard atomic weight (g/mol), as used for average molecular weight.
    pub atomic_weight: f64,
    /// Valence electrons in the neutral atom.
    pub valence_electrons: u8,
}

const fn el(atomic_number: u8, symbol: &'static str, atomic_weight: f64, valence_electrons: u8) -> Element {
    Element { atomic_number, symbol, atomic_weight, valence_electrons }
}

/// Hydrogen's standard atomic weight, used for implicit hydrogens.
pub const HYDROGEN_WEIGHT: f64 = 1.008;

static ELEMENTS: [Element; 92] = [
    el(1, "H", 1.008, 1),
    el(2, "He", 4.003, 2),
    el(3, "Li", 6.941, 1),
    el(4, "Be", 9.012, 2),
    el(5, "B", 10.812, 3),
    el(6, "C", 12.011, 4),
    el(7, "N", 14.007, 5),
    el(8, "O", 15.999, 6),
    el(9, "F", 18.998, 7),
    el(10, "Ne", 20.18, 8),
    el(11, "Na", 22.99, 1),
    el(12, "Mg", 24.305, 2),
    el(13, "Al", 26.982, 3),
    el(14, "Si", 28.086, 4),
    el(15, "P", 30.974, 5),
    el(16, "S", 32.067, 6),
    el(17, "Cl", 35.453, 7),
    el(18, "Ar", 39.948, 8),
    el(19, "K", 39.098, 1),
    el(20, "Ca", 40.078, 2),
    el(21, "Sc", 44.956, 3),
    el(22, "Ti", 47.867, 4),
    el(23, "V", 50.942, 5),
    el(24, "Cr", 51.996, 6),
    el(25, "Mn", 54.938, 7),
    el(26, "Fe", 55.845, 8),
    el(27, "Co", 58.933, 9),
    el(28, "Ni", 58.693, 10),
    el(29, "Cu", 63.546, 11),
    el(30, "Zn", 65.39, 12),
    el(31, "Ga", 69.723, 3),
    el(32, "Ge", 72.61, 4),
    el(33, "As", 74.922, 5),
    el(34, "Se", 78.96, 6),
    el(35, "Br", 79.904, 7),
    el(36, "Kr", 83.8, 8),
    el(37, "Rb", 85.468, 1),
    el(38, "Sr", 87.62, 2),
    el(39, "Y", 88.906, 3),
    el(40, "Zr", 91.224, 4),
    el(41, "Nb", 92.906, 5),
    el(42, "Mo", 95.94, 6),
    el(43, "Tc", 98.0, 7),
    el(44, "Ru", 101.07, 8),
    el(45, "Rh", 102.906, 9),
    el(46, "Pd", 106.42, 10),
    el(47, "Ag", 107.868, 11),
    el(48, "Cd", 112.411, 12),
    el(49, "In", 114.818, 3),
    el(50, "Sn", 118.711, 4),
    el(51, "Sb", 121.76, 5),
    el(52, "Te", 127.6, 6),
    el(53, "I", 126.904, 7),
    el(54, "Xe", 131.29, 8),
    el(55, "Cs", 132.905, 1),
    el(56, "Ba", 137.328, 2),
    el(57, "La", 138.906, 3),
    el(58, "Ce", 140.116, 3),
    el(59, "Pr", 140.908, 3),
    el(60, "Nd", 144.24, 3),
    el(61, "Pm", 145.0, 3),
    el(62, "Sm", 150.36, 3),
    el(63, "Eu", 151.964, 3),
    el(64, "Gd", 157.25, 3),
    el(65, "Tb", 158.925, 3),
    el(66, "Dy", 162.5, 3),
    el(67, "Ho", 164.93, 3),
    el(68, "Er", 167.26, 3),
    el(69, "Tm", 168.934, 3),
    el(70, "Yb", 173.04, 3),
    el(71, "Lu", 174.967, 3),
    el(72, "Hf", 178.49, 4),
    el(73, "Ta", 180.948, 5),
    el(74, "W", 183.84, 6),
    el(75, "Re", 186.207, 7),
    el(76, "Os", 190.23, 8),
    el(77, "Ir", 192.217, 9),
    el(78, "Pt", 195.078, 10),
    el(79, "Au", 196.967, 11),
    el(80, "Hg", 200.59, 12),
    el(81, "Tl", 204.383, 3),
    el(82, "Pb", 207.2, 4),
    el(83, "Bi", 208.98, 5),
    el(84, "Po", 209.0, 6),
    el(85, "At", 210.0, 7),
    el(86, "Rn", 222.0, 8),
    el(87, "Fr", 223.0, 1),
    el(88, "Ra", 226.0, 2),
    el(89, "Ac", 227.0, 3),
    el(90, "Th", 232.038, 4),
    el(91, "Pa", 231.036, 5),
    el(92, "U", 238.029, 6),
];

/// Look up an element by its symbol (e.g. "C", "Fe").
pub fn element_by_symbol(symbol: &str) -> Option<&'static Element> {
    ELEMENTS.iter().find(|e| e.symbol == symbol)
}

/// Look up an element by its atomic number (1-based).
pub fn element_by_number(n: u8) -> Option<&'static Element> {
    if (1..=ELEMENTS.len() as u8).contains(&n) {
        Some(&ELEMENTS[(n - 1) as usize])
    } else {
        None
    }
}

/// Default valence of organic-subset atoms, used to infer implicit hydrogens.
///
/// Returns `None` for elements outside the SMILES organic subset.
pub fn default_valence(atomic_number: u8) -> Option<u8> {
    match atomic_number {
        5 => Some(3),
        6 => Some(4),
        7 | 15 => Some(3),
        8 | 16 => Some(2),
        9 | 17 | 35 | 53 => Some(1),
        _ => None,
    }
}

/// Whether the element is a heteroatom (neither carbon nor hydrogen).
pub fn is_heteroatom(atomic_number: u8) -> bool {
    atomic_number != 6 && atomic_number != 1
}
