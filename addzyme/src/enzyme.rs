//! Enzyme classes the models were trained on.

use std::fmt;
use std::str::FromStr;

use addzyme_core::{AddzymeError, Result};
use addzyme_ml::one_hot;
use serde::{Serialize, Serializer};

/// Selectable EC numbers, in the column order of the one-hot block.
pub const EC_NUMBERS: [&str; 18] = [
    "3.1.1.1",
    "3.1.1.13",
    "3.1.1.2",
    "3.1.1.20",
    "3.1.1.25",
    "3.1.1.3",
    "3.1.1.43",
    "3.1.1.5",
    "3.1.1.59",
    "3.1.1.6",
    "3.1.1.60",
    "3.1.1.74",
    "3.1.1.79",
    "3.1.1.81",
    "3.1.3.12",
    "3.1.3.2",
    "3.1.4.46",
    "3.1.8.1",
];

/// One of the [`EC_NUMBERS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EcNumber(usize);

impl EcNumber {
    /// Accepts the bare number or an `EC ` prefix.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let bare = trimmed
            .strip_prefix("EC")
            .or_else(|| trimmed.strip_prefix("ec"))
            .map_or(trimmed, str::trim_start);
        EC_NUMBERS
            .iter()
            .position(|&ec| ec == bare)
            .map(EcNumber)
            .ok_or_else(|| {
                AddzymeError::InvalidInput(format!(
                    "unsupported EC number '{s}' (run `addzyme ec-numbers` for the list)"
                ))
            })
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn as_str(self) -> &'static str {
        EC_NUMBERS[self.0]
    }

    /// Indicator vector over [`EC_NUMBERS`].
    pub fn one_hot(self) -> Result<Vec<f64>> {
        one_hot(self.0, EC_NUMBERS.len())
    }

    pub fn all() -> impl Iterator<Item = EcNumber> {
        (0..EC_NUMBERS.len()).map(EcNumber)
    }
}

impl FromStr for EcNumber {
    type Err = AddzymeError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for EcNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EcNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
