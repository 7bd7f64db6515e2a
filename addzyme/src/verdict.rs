//! Turning per-model outputs into a vote count.

use addzyme_core::{Result, Summarizable};
use addzyme_ml::Standardizer;
use serde::Serialize;
use tracing::warn;

use crate::config::ActivityConfig;

/// Direction of the predicted activity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Increase,
    Decrease,
    NoChange,
}

impl Outcome {
    fn phrase(self) -> &'static str {
        match self {
            Outcome::Increase => "increase in activity",
            Outcome::Decrease => "decrease in activity",
            Outcome::NoChange => "no change in activity",
        }
    }
}

/// Relative-activity cut-offs in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub increase: f64,
    pub decrease: f64,
}

impl From<&ActivityConfig> for Thresholds {
    fn from(c: &ActivityConfig) -> Self {
        Self { increase: c.increase_threshold, decrease: c.decrease_threshold }
    }
}

/// Strictly above `increase` or strictly below `decrease`; otherwise no change.
pub fn classify(value: f64, thresholds: Thresholds) -> Outcome {
    if value > thresholds.increase {
        Outcome::Increase
    } else if value < thresholds.decrease {
        Outcome::Decrease
    } else {
        Outcome::NoChange
    }
}

/// Bucket counts over the ensemble.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub increase: usize,
    pub decrease: usize,
    pub no_change: usize,
    /// Models whose output was NaN or infinite.
    pub non_finite: usize,
    pub total: usize,
    /// Relative activity per model, in ensemble order.
    pub activities: Vec<f64>,
}

impl Verdict {
    /// Rescale each raw output to relative activity and count the buckets.
    pub fn from_predictions(raw: &[f64], activity: &ActivityConfig) -> Result<Self> {
        let scale = Standardizer::new(activity.mean, activity.std)?;
        let thresholds = Thresholds::from(activity);

        let mut verdict = Verdict {
            increase: 0,
            decrease: 0,
            no_change: 0,
            non_finite: 0,
            total: raw.len(),
            activities: Vec::with_capacity(raw.len()),
        };
        for &z in raw {
            let value = scale.denormalize(z);
            verdict.activities.push(value);
            if !value.is_finite() {
                verdict.non_finite += 1;
                continue;
            }
            match classify(value, thresholds) {
                Outcome::Increase => verdict.increase += 1,
                Outcome::Decrease => verdict.decrease += 1,
                Outcome::NoChange => verdict.no_change += 1,
            }
        }
        if verdict.non_finite > 0 {
            warn!(non_finite = verdict.non_finite, total = verdict.total, "models returned non-finite output");
        }
        Ok(verdict)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        match outcome {
            Outcome::Increase => self.increase,
            Outcome::Decrease => self.decrease,
            Outcome::NoChange => self.no_change,
        }
    }

    /// The bucket with the most votes, or `None` on a tie or no finite vote.
    pub fn majority(&self) -> Option<Outcome> {
        let mut ranked = [Outcome::Increase, Outcome::Decrease, Outcome::NoChange];
        ranked.sort_by_key(|&o| std::cmp::Reverse(self.count(o)));
        let top = self.count(ranked[0]);
        (top > 0 && top > self.count(ranked[1])).then_some(ranked[0])
    }

    /// Report lines in the fixed order increase, decrease, no change.
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = [Outcome::Increase, Outcome::Decrease, Outcome::NoChange]
            .into_iter()
            .map(|o| format!("{} cases of {} model predict {}.", self.count(o), self.total, o.phrase()))
            .collect();
        if self.non_finite > 0 {
            lines.push(format!(
                "{} cases of {} model returned no usable prediction.",
                self.non_finite, self.total
            ));
        }
        lines
    }
}

impl Summarizable for Verdict {
    fn summary(&self) -> String {
        format!(
            "{} increase, {} decrease, {} no change of {} models",
            self.increase, self.decrease, self.no_change, self.total
        )
    }
}
