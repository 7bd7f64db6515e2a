use criterion::{black_box, criterion_group, criterion_main, Criterion};
use addzyme_chem::{parse_smiles, standardize_smiles, DescriptorCalculator, StandardizeConfig};

/// Substrates and additives of the sizes the models were trained on
const SMILES_SET: &[&str] = &[
    "CCCCCCCC(=O)Oc1ccc([N+](=O)[O-])cc1", // p-nitrophenyl octanoate
    "CC(=O)Oc1ccc([N+](=O)[O-])cc1",       // p-nitrophenyl acetate
    "CCCCC(=O)OCC",                        // ethyl pentanoate
    "OP(=O)(O)Oc1ccc([N+](=O)[O-])cc1",    // p-nitrophenyl phosphate
    "CC(=O)Oc1ccccc1C(=O)O",               // aspirin
    "OCC(O)CO",                            // glycerol
    "CCO",                                 // ethanol
    "CS(C)=O",                             // DMSO
    "[Ca+2]",                              // calcium
    "[Na+].[Cl-]",                         // sodium chloride
    "OCC(O)C(O)C(O)C(O)CO",                // sorbitol
    "C(C(=O)O)N",                          // glycine
    "CC(C)O",                              // isopropanol
    "CN(C)C=O",                            // DMF
    "C1CCOC1",                             // THF
    "OC(=O)CC(O)(CC(=O)O)C(=O)O",          // citric acid
    "NC(CO)(CO)CO",                        // tris
    "[Mg+2].[O-]S([O-])(=O)=O",            // magnesium sulfate
    "CC#N",                                // acetonitrile
    "c1cc[nH]c1",                          // pyrrole
];

fn bench_smiles_parse(c: &mut Criterion) {
    let smiles_1k: Vec<&str> = SMILES_SET.iter().copied().cycle().take(1000).collect();

    c.bench_function("smiles_parse_1k", |b| {
        b.iter(|| {
            for &smi in black_box(&smiles_1k) {
                let _ = parse_smiles(smi);
            }
        })
    });
}

fn bench_standardize(c: &mut Criterion) {
    let config = StandardizeConfig::default();

    c.bench_function("standardize_set", |b| {
        b.iter(|| {
            for &smi in black_box(SMILES_SET) {
                let _ = standardize_smiles(smi, &config);
            }
        })
    });
}

fn bench_descriptors(c: &mut Criterion) {
    let calc = DescriptorCalculator::all();
    let mols: Vec<_> = SMILES_SET.iter().filter_map(|s| parse_smiles(s).ok()).collect();

    c.bench_function("descriptors_all", |b| {
        b.iter(|| {
            for mol in black_box(&mols) {
                let _ = calc.calculate(mol);
            }
        })
    });
}

criterion_group!(benches, bench_smiles_parse, bench_standardize, bench_descriptors);
criterion_main!(benches);
