//! Configuration loading for ADDZYME.
//!
//! Reads a TOML file given by `--config` or `ADDZYME_CONFIG`. Every field
//! falls back to the constants the shipped models were trained with, so an
//! empty file (or no file at all) reproduces the published tool.

use std::path::{Path, PathBuf};

use addzyme_chem::StandardizeConfig;
use addzyme_core::{AddzymeError, Result};
use addzyme_ml::Standardizer;
use serde::{Deserialize, Serialize};

use crate::conditions::Slider;
use crate::domain::DomainRange;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub descriptors: DescriptorsConfig,
    #[serde(default)]
    pub domain: DomainConfig,
    #[serde(default)]
    pub conditions: ConditionsConfig,
    #[serde(default)]
    pub activity: ActivityConfig,
    #[serde(default)]
    pub standardize: StandardizeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_models_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_models_pattern")]
    pub pattern: String,
    /// Number of artifacts the glob must match; 0 accepts any non-zero count.
    #[serde(default = "default_expected_count")]
    pub expected_count: usize,
    /// Which model output is the relative activity.
    #[serde(default)]
    pub output_index: usize,
}

fn default_models_dir() -> PathBuf { PathBuf::from("models") }
fn default_models_pattern() -> String { "ERT_Baseline_*.json".to_string() }
fn default_expected_count() -> usize { 30 }

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            dir: default_models_dir(),
            pattern: default_models_pattern(),
            expected_count: default_expected_count(),
            output_index: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DescriptorsConfig {
    /// Comma-separated descriptor names; the built-in registry when absent.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_substrate_range")]
    pub substrate: DomainRange,
    #[serde(default = "default_additive_range")]
    pub additive: DomainRange,
}

fn default_substrate_range() -> DomainRange { DomainRange { min: 120.063, max: 399.092 } }
fn default_additive_range()  -> DomainRange { DomainRange { min: 28.010, max: 276.116 } }

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            substrate: default_substrate_range(),
            additive: default_additive_range(),
        }
    }
}

/// Bounds, grid step and training statistics of one condition input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConditionScale {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub mean: f64,
    pub std: f64,
}

impl ConditionScale {
    pub fn slider(&self) -> Slider {
        Slider { min: self.min, max: self.max, step: self.step }
    }

    pub fn standardizer(&self) -> Result<Standardizer> {
        Standardizer::new(self.mean, self.std)
    }
}

/// Direction in which condition inputs are rescaled before they enter the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionTransform {
    /// `(x − mean) / std`
    Standardize,
    /// `x · std + mean`, as the released form computes it.
    #[default]
    Destandardize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionsConfig {
    #[serde(default = "default_temperature")]
    pub temperature: ConditionScale,
    #[serde(default = "default_ph")]
    pub ph: ConditionScale,
    #[serde(default)]
    pub transform: ConditionTransform,
}

fn default_temperature() -> ConditionScale {
    ConditionScale { min: 20.0, max: 75.0, step: 5.0, mean: 37.769, std: 14.533 }
}

fn default_ph() -> ConditionScale {
    ConditionScale { min: 5.0, max: 9.0, step: 0.5, mean: 7.519, std: 0.903 }
}

impl Default for ConditionsConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            ph: default_ph(),
            transform: ConditionTransform::default(),
        }
    }
}

/// Rescaling of model outputs to relative activity and the verdict thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    #[serde(default = "default_activity_mean")]
    pub mean: f64,
    #[serde(default = "default_activity_std")]
    pub std: f64,
    #[serde(default = "default_increase")]
    pub increase_threshold: f64,
    #[serde(default = "default_decrease")]
    pub decrease_threshold: f64,
}

fn default_activity_mean() -> f64 { -17.321 }
fn default_activity_std()  -> f64 { 71.558 }
fn default_increase()      -> f64 { 5.0 }
fn default_decrease()      -> f64 { -5.0 }

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            mean: default_activity_mean(),
            std: default_activity_std(),
            increase_threshold: default_increase(),
            decrease_threshold: default_decrease(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or return the defaults when no path is given.
    ///
    /// Relative `models.dir` and `descriptors.file` are resolved against the
    /// directory holding the config file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            let config = Self::default();
            config.validate()?;
            return Ok(config);
        };

        let content = std::fs::read_to_string(path)
            .map_err(|e| AddzymeError::Config(format!("cannot read {}: {e}", path.display())))?;
        let mut config: AppConfig = toml::from_str(&content)
            .map_err(|e| AddzymeError::Config(format!("{}: {e}", path.display())))?;

        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        config.validate()?;
        Ok(config)
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.models.dir.is_relative() {
            self.models.dir = base.join(&self.models.dir);
        }
        if let Some(file) = self.descriptors.file.as_mut() {
            if file.is_relative() {
                *file = base.join(&*file);
            }
        }
    }

    /// Reject settings that would make a prediction meaningless.
    pub fn validate(&self) -> Result<()> {
        let bad = |msg: String| Err(AddzymeError::Config(msg));

        if self.models.pattern.trim().is_empty() {
            return bad("models.pattern is empty".into());
        }
        for (name, range) in [("substrate", &self.domain.substrate), ("additive", &self.domain.additive)] {
            if !(range.min.is_finite() && range.max.is_finite()) || range.min > range.max {
                return bad(format!("domain.{name}: invalid range [{}, {}]", range.min, range.max));
            }
        }
        for (name, scale) in [("temperature", &self.conditions.temperature), ("ph", &self.conditions.ph)] {
            if !(scale.min.is_finite() && scale.max.is_finite()) || scale.min > scale.max {
                return bad(format!("conditions.{name}: invalid range [{}, {}]", scale.min, scale.max));
            }
            if !(scale.step.is_finite() && scale.step > 0.0) {
                return bad(format!("conditions.{name}.step must be positive, got {}", scale.step));
            }
            if !(scale.std.is_finite() && scale.std > 0.0) || !scale.mean.is_finite() {
                return bad(format!(
                    "conditions.{name}: mean/std must be finite with std > 0, got {}/{}",
                    scale.mean, scale.std
                ));
            }
        }
        let activity = &self.activity;
        if !(activity.std.is_finite() && activity.std > 0.0) || !activity.mean.is_finite() {
            return bad(format!(
                "activity: mean/std must be finite with std > 0, got {}/{}",
                activity.mean, activity.std
            ));
        }
        if !(activity.increase_threshold.is_finite() && activity.decrease_threshold.is_finite()) {
            return bad("activity thresholds must be finite".into());
        }
        if activity.decrease_threshold > activity.increase_threshold {
            return bad(format!(
                "activity.decrease_threshold {} exceeds increase_threshold {}",
                activity.decrease_threshold, activity.increase_threshold
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addzyme_chem::StandardizeStep;

    #[test]
    fn defaults_match_published_constants() {
        let c = AppConfig::default();
        c.validate().unwrap();
        assert_eq!(c.models.pattern, "ERT_Baseline_*.json");
        assert_eq!(c.models.expected_count, 30);
        assert_eq!(c.domain.substrate, DomainRange { min: 120.063, max: 399.092 });
        assert_eq!(c.domain.additive, DomainRange { min: 28.010, max: 276.116 });
        assert_eq!(c.conditions.temperature.mean, 37.769);
        assert_eq!(c.conditions.ph.std, 0.903);
        assert_eq!(c.conditions.transform, ConditionTransform::Destandardize);
        assert_eq!(c.activity.mean, -17.321);
        assert_eq!(c.activity.std, 71.558);
        assert_eq!(c.standardize.steps, vec![StandardizeStep::FoldHydrogens]);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let c: AppConfig = toml::from_str("").unwrap();
        assert_eq!(c.models.expected_count, 30);
        assert_eq!(c.activity, ActivityConfig::default());
        assert_eq!(c.standardize.steps.len(), 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c: AppConfig = toml::from_str(
            r#"
            [models]
            expected_count = 3

            [conditions]
            transform = "standardize"

            [conditions.ph]
            min = 4.0
            max = 10.0
            step = 1.0
            mean = 7.0
            std = 1.0

            [standardize]
            steps = ["strip_salts", "largest_fragment", "neutralize"]
            "#,
        )
        .unwrap();
        assert_eq!(c.models.expected_count, 3);
        assert_eq!(c.models.pattern, "ERT_Baseline_*.json");
        assert_eq!(c.conditions.transform, ConditionTransform::Standardize);
        assert_eq!(c.conditions.ph.max, 10.0);
        assert_eq!(c.conditions.temperature.max, 75.0);
        assert_eq!(c.standardize.steps[1], StandardizeStep::LargestFragment);
        c.validate().unwrap();
    }

    #[test]
    fn shipped_example_matches_defaults() {
        let c: AppConfig = toml::from_str(include_str!("../addzyme.example.toml")).unwrap();
        c.validate().unwrap();
        assert_eq!(c.domain.substrate, DomainConfig::default().substrate);
        assert_eq!(c.conditions.ph, ConditionsConfig::default().ph);
        assert_eq!(c.conditions.transform, ConditionTransform::Destandardize);
        assert_eq!(c.activity, ActivityConfig::default());
        assert_eq!(c.standardize.steps, StandardizeConfig::default().steps);
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut c = AppConfig::default();
        c.domain.substrate = DomainRange { min: 400.0, max: 100.0 };
        assert!(matches!(c.validate(), Err(AddzymeError::Config(_))));

        let mut c = AppConfig::default();
        c.conditions.temperature.step = 0.0;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.conditions.ph.std = 0.0;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.activity.decrease_threshold = 10.0;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.activity.std = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addzyme.toml");
        std::fs::write(
            &path,
            "[models]\ndir = \"ert\"\n\n[descriptors]\nfile = \"names.txt\"\n",
        )
        .unwrap();

        let c = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(c.models.dir, dir.path().join("ert"));
        assert_eq!(c.descriptors.file, Some(dir.path().join("names.txt")));
    }

    #[test]
    fn load_reports_file_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[models\n").unwrap();
        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("broken.toml"), "{err}");

        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert!(AppConfig::load(None).is_ok());
    }
}
