//! Reaction condition inputs: temperature and pH.

use addzyme_core::{AddzymeError, Result};
use serde::Serialize;

use crate::config::{ConditionTransform, ConditionsConfig};

const GRID_TOLERANCE: f64 = 1e-9;

/// A bounded input restricted to a regular grid, like a form slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Slider {
    /// Accept `value` if it lies in `[min, max]` and on the step grid.
    pub fn validate(&self, name: &str, value: f64) -> Result<f64> {
        if !value.is_finite() || value < self.min - GRID_TOLERANCE || value > self.max + GRID_TOLERANCE {
            return Err(AddzymeError::InvalidInput(format!(
                "{name} {value} outside [{}, {}]",
                self.min, self.max
            )));
        }
        let steps = (value - self.min) / self.step;
        if (steps - steps.round()).abs() > GRID_TOLERANCE {
            return Err(AddzymeError::InvalidInput(format!(
                "{name} {value} is not a multiple of {} from {}",
                self.step, self.min
            )));
        }
        Ok(value)
    }

    /// Every selectable value, from `min` to `max`.
    pub fn values(&self) -> Vec<f64> {
        let n = ((self.max - self.min) / self.step + GRID_TOLERANCE).floor() as usize;
        (0..=n).map(|k| self.min + k as f64 * self.step).collect()
    }
}

/// Validated reaction conditions in original units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Conditions {
    pub temperature: f64,
    pub ph: f64,
}

impl Conditions {
    pub fn new(temperature: f64, ph: f64, config: &ConditionsConfig) -> Result<Self> {
        Ok(Self {
            temperature: config.temperature.slider().validate("temperature", temperature)?,
            ph: config.ph.slider().validate("pH", ph)?,
        })
    }

    /// Model inputs `(ph, temperature)`, in feature-vector order.
    pub fn rescaled(&self, config: &ConditionsConfig) -> Result<(f64, f64)> {
        let ph = config.ph.standardizer()?;
        let temp = config.temperature.standardizer()?;
        Ok(match config.transform {
            ConditionTransform::Standardize => (ph.normalize(self.ph), temp.normalize(self.temperature)),
            ConditionTransform::Destandardize => (ph.denormalize(self.ph), temp.denormalize(self.temperature)),
        })
    }
}
