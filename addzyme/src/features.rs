//! Model input assembly.
//!
//! Layout: `[substrate descriptors | additive descriptors | pH | temperature | EC one-hot]`.

use addzyme_chem::{DescriptorCalculator, Molecule};
use addzyme_core::{AddzymeError, Result};

use crate::conditions::Conditions;
use crate::config::ConditionsConfig;
use crate::enzyme::{EcNumber, EC_NUMBERS};

/// Builds fixed-length feature vectors from a validated request.
#[derive(Debug, Clone)]
pub struct FeatureAssembler {
    calculator: DescriptorCalculator,
    conditions: ConditionsConfig,
}

impl FeatureAssembler {
    pub fn new(calculator: DescriptorCalculator, conditions: ConditionsConfig) -> Self {
        Self { calculator, conditions }
    }

    pub fn calculator(&self) -> &DescriptorCalculator {
        &self.calculator
    }

    /// `2·D + 2 + 18` for `D` descriptors.
    pub fn expected_len(&self) -> usize {
        2 * self.calculator.len() + 2 + EC_NUMBERS.len()
    }

    /// Column names in feature order.
    pub fn feature_names(&self) -> Vec<String> {
        let names = self.calculator.names();
        let mut out = Vec::with_capacity(self.expected_len());
        out.extend(names.iter().map(|n| format!("substrate_{n}")));
        out.extend(names.iter().map(|n| format!("additive_{n}")));
        out.push("ph".into());
        out.push("temperature".into());
        out.extend(EC_NUMBERS.iter().map(|ec| format!("ec_{ec}")));
        out
    }

    pub fn assemble(
        &self,
        substrate: &Molecule,
        additive: &Molecule,
        conditions: &Conditions,
        ec: EcNumber,
    ) -> Result<Vec<f64>> {
        let mut features = Vec::with_capacity(self.expected_len());
        features.extend(self.calculator.calculate(substrate));
        features.extend(self.calculator.calculate(additive));

        let (ph, temperature) = conditions.rescaled(&self.conditions)?;
        features.push(ph);
        features.push(temperature);
        features.extend(ec.one_hot()?);

        if features.len() != self.expected_len() {
            return Err(AddzymeError::Other(format!(
                "assembled {} features, expected {}",
                features.len(),
                self.expected_len()
            )));
        }
        Ok(features)
    }
}
