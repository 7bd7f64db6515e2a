//! One prediction request from raw inputs to a verdict.

use std::fs;

use addzyme_chem::DescriptorCalculator;
use addzyme_core::{AddzymeError, Result, Summarizable};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conditions::Conditions;
use crate::config::{AppConfig, ConditionTransform};
use crate::domain::{check_structure, DomainReport, Role};
use crate::enzyme::EcNumber;
use crate::ensemble::Ensemble;
use crate::features::FeatureAssembler;
use crate::verdict::{Outcome, Verdict};

/// The form fields of a prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub substrate: String,
    pub additive: String,
    pub ec_number: String,
    pub temperature: f64,
    pub ph: f64,
}

/// Condition inputs as entered and as fed to the models.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConditionReport {
    pub temperature: f64,
    pub ph: f64,
    pub transform: ConditionTransform,
    pub temperature_feature: f64,
    pub ph_feature: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictionReport {
    pub substrate: DomainReport,
    pub additive: DomainReport,
    pub ec_number: EcNumber,
    pub conditions: ConditionReport,
    pub n_features: usize,
    pub n_models: usize,
    pub verdict: Verdict,
    pub majority: Option<Outcome>,
}

impl PredictionReport {
    /// Domain advisories followed by the verdict lines.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.substrate.message(), self.additive.message()];
        lines.extend(self.verdict.lines());
        lines
    }
}

/// Descriptor list, assembler and ensemble, built once per process.
#[derive(Debug)]
pub struct Predictor {
    config: AppConfig,
    assembler: FeatureAssembler,
    ensemble: Ensemble,
}

/// The configured descriptor list, or the full registry.
pub fn load_calculator(config: &AppConfig) -> Result<DescriptorCalculator> {
    match &config.descriptors.file {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            let calc = DescriptorCalculator::from_list(&text)
                .map_err(|e| AddzymeError::Config(format!("{}: {e}", path.display())))?;
            debug!(path = %path.display(), descriptors = calc.len(), "descriptor list loaded");
            Ok(calc)
        }
        None => Ok(DescriptorCalculator::all()),
    }
}

impl Predictor {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let models = &config.models;
        let ensemble = Ensemble::load(&models.dir, &models.pattern, models.expected_count)?;
        Self::with_ensemble(config, ensemble)
    }

    /// Pair an already built ensemble with `config`.
    pub fn with_ensemble(config: &AppConfig, ensemble: Ensemble) -> Result<Self> {
        config.validate()?;
        let calculator = load_calculator(config)?;
        let assembler = FeatureAssembler::new(calculator, config.conditions.clone());

        if ensemble.n_features() != assembler.expected_len() {
            return Err(AddzymeError::Model(format!(
                "models expect {} features but {} descriptors give {}",
                ensemble.n_features(),
                assembler.calculator().len(),
                assembler.expected_len()
            )));
        }
        if config.models.output_index >= ensemble.n_outputs() {
            return Err(AddzymeError::Config(format!(
                "models.output_index {} out of range for models with {} outputs",
                config.models.output_index,
                ensemble.n_outputs()
            )));
        }

        Ok(Self { config: config.clone(), assembler, ensemble })
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn run(&self, request: &PredictionRequest) -> Result<PredictionReport> {
        let cfg = &self.config;
        let substrate = check_structure(Role::Substrate, &request.substrate, cfg.domain.substrate, &cfg.standardize)?;
        let additive = check_structure(Role::Additive, &request.additive, cfg.domain.additive, &cfg.standardize)?;
        let ec = EcNumber::parse(&request.ec_number)?;
        let conditions = Conditions::new(request.temperature, request.ph, &cfg.conditions)?;

        let features = self
            .assembler
            .assemble(&substrate.molecule, &additive.molecule, &conditions, ec)?;
        let raw = self.ensemble.predict(&features, cfg.models.output_index)?;
        let verdict = Verdict::from_predictions(&raw, &cfg.activity)?;

        let (ph_feature, temperature_feature) = conditions.rescaled(&cfg.conditions)?;
        let majority = verdict.majority();
        info!(
            substrate = %substrate.canonical_smiles,
            additive = %additive.canonical_smiles,
            ec = %ec,
            verdict = %verdict.summary(),
            "prediction complete"
        );

        Ok(PredictionReport {
            substrate,
            additive,
            ec_number: ec,
            conditions: ConditionReport {
                temperature: conditions.temperature,
                ph: conditions.ph,
                transform: cfg.conditions.transform,
                temperature_feature,
                ph_feature,
            },
            n_features: features.len(),
            n_models: self.ensemble.len(),
            verdict,
            majority,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addzyme_ml::Regressor;

    struct Constant {
        n_features: usize,
        value: f64,
    }

    impl Regressor for Constant {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn n_outputs(&self) -> usize {
            2
        }

        fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
            assert_eq!(features.len(), self.n_features);
            Ok(vec![self.value, 0.0])
        }
    }

    fn predictor(values: &[f64]) -> Predictor {
        let config = AppConfig::default();
        let n = 2 * DescriptorCalculator::all().len() + 2 + 18;
        let models = values
            .iter()
            .map(|&value| Box::new(Constant { n_features: n, value }) as Box<dyn Regressor>)
            .collect();
        Predictor::with_ensemble(&config, Ensemble::from_regressors(models).unwrap()).unwrap()
    }

    fn request() -> PredictionRequest {
        PredictionRequest {
            substrate: "CC(=O)Oc1ccc([N+](=O)[O-])cc1".into(),
            additive: "CCO".into(),
            ec_number: "3.1.1.3".into(),
            temperature: 35.0,
            ph: 7.5,
        }
    }

    #[test]
    fn counts_follow_model_outputs() {
        // raw 1.0 → 54.2, raw -1.0 → -88.9, raw 0.3 → 4.1
        let p = predictor(&[1.0, 1.0, -1.0, 0.3, f64::NAN]);
        let report = p.run(&request()).unwrap();
        assert_eq!(report.n_models, 5);
        assert_eq!(report.verdict.increase, 2);
        assert_eq!(report.verdict.decrease, 1);
        assert_eq!(report.verdict.no_change, 1);
        assert_eq!(report.verdict.non_finite, 1);
        assert_eq!(report.majority, Some(Outcome::Increase));
        assert!(report.substrate.in_domain());
        assert_eq!(report.lines()[0], "Substrate is in domain.");
        assert_eq!(report.lines()[2], "2 cases of 5 model predict increase in activity.");
    }

    #[test]
    fn out_of_domain_is_advisory() {
        let p = predictor(&[1.0]);
        let mut req = request();
        req.substrate = "C1=CC=C(C=C1)C=O".into();
        let report = p.run(&req).unwrap();
        assert!(!report.substrate.in_domain());
        assert_eq!(report.verdict.total, 1);
    }

    #[test]
    fn bad_inputs_are_rejected() {
        let p = predictor(&[1.0]);

        let mut req = request();
        req.additive = "C1CC(".into();
        assert!(matches!(p.run(&req), Err(AddzymeError::Parse(_))));

        let mut req = request();
        req.ec_number = "9.9.9.9".into();
        assert!(matches!(p.run(&req), Err(AddzymeError::InvalidInput(_))));

        let mut req = request();
        req.ph = 7.3;
        assert!(matches!(p.run(&req), Err(AddzymeError::InvalidInput(_))));
    }

    #[test]
    fn feature_width_mismatch_is_a_model_error() {
        let models: Vec<Box<dyn Regressor>> = vec![Box::new(Constant { n_features: 5, value: 0.0 })];
        let err = Predictor::with_ensemble(&AppConfig::default(), Ensemble::from_regressors(models).unwrap())
            .unwrap_err();
        assert!(matches!(err, AddzymeError::Model(_)));
    }

    #[test]
    fn output_index_is_checked() {
        let mut config = AppConfig::default();
        config.models.output_index = 2;
        let n = 2 * DescriptorCalculator::all().len() + 2 + 18;
        let models: Vec<Box<dyn Regressor>> = vec![Box::new(Constant { n_features: n, value: 0.0 })];
        let err = Predictor::with_ensemble(&config, Ensemble::from_regressors(models).unwrap()).unwrap_err();
        assert!(matches!(err, AddzymeError::Config(_)));
    }

    #[test]
    fn report_serializes() {
        let report = predictor(&[1.0]).run(&request()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ec_number"], "3.1.1.3");
        assert_eq!(json["conditions"]["transform"], "destandardize");
        let temp = json["conditions"]["temperature_feature"].as_f64().unwrap();
        assert!((temp - (35.0 * 14.533 + 37.769)).abs() < 1e-9);
        assert_eq!(json["verdict"]["increase"], 1);
        assert_eq!(json["majority"], "increase");
    }
}
