//! Small-molecule handling for ADDZYME.
//!
//! Parses SMILES into a molecular graph, standardizes it, writes canonical
//! SMILES and computes molecular weight plus a named set of graph descriptors.
//!
//! # Example
//!
//! ```
//! use addzyme_chem::{molecular_weight, standardize_smiles, StandardizeConfig};
//!
//! let std = standardize_smiles("OCC", &StandardizeConfig::default()).unwrap();
//! assert_eq!(std.canonical, "CCO");
//! assert!((molecular_weight(&std.molecule) - 46.069).abs() < 1e-3);
//! ```

pub mod canon;
pub mod descriptors;
pub mod element;
pub mod molecule;
pub mod properties;
pub mod ring;
pub mod smiles;
pub mod standardize;

pub use canon::canonical_smiles;
pub use descriptors::{registry, DescriptorCalculator, DescriptorDef};
pub use element::{element_by_number, element_by_symbol, Element};
pub use molecule::{Bond, BondOrder, MolAtom, Molecule};
pub use properties::{compute_properties, molecular_formula, molecular_weight, MolecularProperties};
pub use smiles::{parse_smiles, parse_smiles_named};
pub use standardize::{standardize, standardize_smiles, StandardizeConfig, StandardizeStep, Standardized};
