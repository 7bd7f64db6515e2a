//! Rescaling with stored mean and standard deviation.

use addzyme_core::{AddzymeError, Result};
use serde::{Deserialize, Serialize};

/// A fixed z-score transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Standardizer {
    pub mean: f64,
    pub std: f64,
}

impl Standardizer {
    /// `std` must be finite and non-zero; `mean` must be finite.
    pub fn new(mean: f64, std: f64) -> Result<Self> {
        if !mean.is_finite() {
            return Err(AddzymeError::InvalidInput(format!("mean must be finite, got {mean}")));
        }
        if !std.is_finite() || std == 0.0 {
            return Err(AddzymeError::InvalidInput(format!(
                "std must be finite and non-zero, got {std}"
            )));
        }
        Ok(Self { mean, std })
    }

    /// `(x − mean) / std`
    pub fn normalize(&self, x: f64) -> f64 {
        (x - self.mean) / self.std
    }

    /// `z · std + mean`
    pub fn denormalize(&self, z: f64) -> f64 {
        z * self.std + self.mean
    }
}
