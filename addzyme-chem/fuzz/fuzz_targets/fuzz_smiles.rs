#![no_main]
use libfuzzer_sys::fuzz_target;

use addzyme_chem::{canonical_smiles, parse_smiles, DescriptorCalculator};

fuzz_target!(|data: &str| {
    if let Ok(mol) = parse_smiles(data) {
        let _ = canonical_smiles(&mol);
        let _ = DescriptorCalculator::all().calculate(&mol);
    }
});
