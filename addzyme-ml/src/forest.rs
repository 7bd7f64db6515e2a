//! Extremely randomized trees regressor.
//!
//! Every tree sees the full training set (no bootstrap) and the randomness
//! comes from the split thresholds and the per-node feature draw. Predictions
//! average the trees' leaf vectors output by output.
//!
//! Data is flat row-major `&[f64]` with an `n_features` parameter.

use addzyme_core::{AddzymeError, Result};
use serde::{Deserialize, Serialize};

use crate::tree::{LcgRng, RegressionTree, TreeParams};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for extra-trees training.
#[derive(Debug, Clone)]
pub struct ExtraTreesConfig {
    /// Number of trees in the ensemble.
    pub n_trees: usize,
    /// Maximum depth per tree.
    pub max_depth: usize,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    /// Features drawn at each split. `None` uses all features.
    pub max_features: Option<usize>,
    /// Random seed for reproducibility.
    pub seed: u64,
}

impl Default for ExtraTreesConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 32,
            min_samples_split: 2,
            max_features: None,
            seed: 42,
        }
    }
}

// ---------------------------------------------------------------------------
// ExtraTreesRegressor
// ---------------------------------------------------------------------------

/// An ensemble of multi-output regression trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraTreesRegressor {
    pub n_features: usize,
    pub n_outputs: usize,
    pub trees: Vec<RegressionTree>,
}

impl ExtraTreesRegressor {
    /// Fit on flat row-major data.
    ///
    /// * `data` — `n_samples x n_features`
    /// * `targets` — `n_samples x n_outputs`
    ///
    /// # Errors
    ///
    /// Returns an error if the data is empty, dimensions are inconsistent,
    /// or `n_trees` is 0.
    pub fn fit(
        data: &[f64],
        n_features: usize,
        targets: &[f64],
        n_outputs: usize,
        config: &ExtraTreesConfig,
    ) -> Result<Self> {
        if data.is_empty() {
            return Err(AddzymeError::InvalidInput("empty data".into()));
        }
        if n_features == 0 || n_outputs == 0 {
            return Err(AddzymeError::InvalidInput("n_features and n_outputs must be > 0".into()));
        }
        if data.len() % n_features != 0 {
            return Err(AddzymeError::InvalidInput(format!(
                "data length {} not divisible by n_features {}",
                data.len(),
                n_features
            )));
        }
        let n_samples = data.len() / n_features;
        if targets.len() != n_samples * n_outputs {
            return Err(AddzymeError::InvalidInput(format!(
                "targets length {} != n_samples {} x n_outputs {}",
                targets.len(),
                n_samples,
                n_outputs
            )));
        }
        if config.n_trees == 0 {
            return Err(AddzymeError::InvalidInput("n_trees must be > 0".into()));
        }

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features.unwrap_or(n_features),
        };
        let indices: Vec<usize> = (0..n_samples).collect();
        let mut seeds = LcgRng::new(config.seed);

        let trees = (0..config.n_trees)
            .map(|_| {
                let mut rng = LcgRng::new(seeds.next_u64());
                RegressionTree::fit(data, n_features, targets, n_outputs, &indices, &params, &mut rng)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            n_features,
            n_outputs,
            trees,
        })
    }

    /// Mean of the trees' leaf vectors for one sample.
    pub fn predict(&self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.n_features {
            return Err(AddzymeError::InvalidInput(format!(
                "sample has {} features, model expects {}",
                sample.len(),
                self.n_features
            )));
        }
        if self.trees.is_empty() {
            return Err(AddzymeError::Model("forest has no trees".into()));
        }

        let mut out = vec![0.0; self.n_outputs];
        for tree in &self.trees {
            for (acc, v) in out.iter_mut().zip(tree.predict(sample)) {
                *acc += v;
            }
        }
        let n = self.trees.len() as f64;
        out.iter_mut().for_each(|v| *v /= n);
        Ok(out)
    }

    /// Predict every row of a flat row-major matrix.
    pub fn predict_batch(&self, data: &[f64]) -> Result<Vec<Vec<f64>>> {
        if self.n_features == 0 || data.len() % self.n_features != 0 {
            return Err(AddzymeError::InvalidInput(format!(
                "data length {} not divisible by n_features {}",
                data.len(),
                self.n_features
            )));
        }
        data.chunks(self.n_features).map(|row| self.predict(row)).collect()
    }

    /// Check every tree against the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(AddzymeError::Model("forest has no trees".into()));
        }
        if self.n_features == 0 || self.n_outputs == 0 {
            return Err(AddzymeError::Model("n_features and n_outputs must be > 0".into()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.n_outputs)
                .map_err(|e| AddzymeError::Model(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
