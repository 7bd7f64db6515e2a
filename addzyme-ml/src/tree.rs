//! Multi-output regression tree with extremely randomized splits.
//!
//! At every node each candidate feature gets one threshold drawn uniformly
//! between the node's minimum and maximum for that feature; the candidate with
//! the largest summed MSE decrease across outputs wins.
//!
//! Data is flat row-major `&[f64]` with an `n_features` parameter; targets are
//! flat row-major with `n_outputs` columns.

use addzyme_core::{AddzymeError, Result};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Node representation (arena-allocated)
// ---------------------------------------------------------------------------

/// A single node of a regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal split: `sample[feature_idx] <= threshold` goes left.
    Split {
        feature_idx: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node holding the mean target of its training samples.
    Leaf { values: Vec<f64> },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Features tried per node; `n_features` when larger.
    pub max_features: usize,
}

// ---------------------------------------------------------------------------
// RegressionTree
// ---------------------------------------------------------------------------

/// A regression tree stored as a flat arena with the root at index 0.
///
/// Children always sit at larger indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// Grow a tree over the samples in `indices`.
    pub(crate) fn fit(
        data: &[f64],
        n_features: usize,
        targets: &[f64],
        n_outputs: usize,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut LcgRng,
    ) -> Result<Self> {
        if indices.is_empty() {
            return Err(AddzymeError::InvalidInput("empty sample set".into()));
        }
        let mut builder = Builder {
            data,
            n_features,
            targets,
            n_outputs,
            params,
            rng,
            nodes: Vec::new(),
        };
        builder.grow(indices, 0);
        Ok(Self { nodes: builder.nodes })
    }

    /// Build a tree directly from its node arena.
    pub fn from_nodes(nodes: Vec<TreeNode>) -> Self {
        Self { nodes }
    }

    /// Leaf values reached by `sample`.
    ///
    /// The tree must have passed [`validate`](Self::validate) for the sample width.
    pub fn predict(&self, sample: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                TreeNode::Leaf { values } => return values,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if sample[*feature_idx] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Check the arena is a well-formed tree for the given dimensions.
    pub fn validate(&self, n_features: usize, n_outputs: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(AddzymeError::Model("tree has no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature_idx >= n_features {
                        return Err(AddzymeError::Model(format!(
                            "node {i} splits on feature {feature_idx}, model has {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(AddzymeError::Model(format!("node {i} has a non-finite threshold")));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= self.nodes.len() {
                            return Err(AddzymeError::Model(format!(
                                "node {i} points to invalid child {child}"
                            )));
                        }
                    }
                }
                TreeNode::Leaf { values } => {
                    if values.len() != n_outputs {
                        return Err(AddzymeError::Model(format!(
                            "leaf {i} has {} values, expected {n_outputs}",
                            values.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], idx: usize) -> usize {
            match &nodes[idx] {
                TreeNode::Leaf { .. } => 0,
                TreeNode::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

// ---------------------------------------------------------------------------
// Tree building
// ---------------------------------------------------------------------------

struct Builder<'a> {
    data: &'a [f64],
    n_features: usize,
    targets: &'a [f64],
    n_outputs: usize,
    params: &'a TreeParams,
    rng: &'a mut LcgRng,
    nodes: Vec<TreeNode>,
}

impl Builder<'_> {
    fn feature(&self, sample: usize, feat: usize) -> f64 {
        self.data[sample * self.n_features + feat]
    }

    fn target_row(&self, sample: usize) -> &[f64] {
        &self.targets[sample * self.n_outputs..(sample + 1) * self.n_outputs]
    }

    fn leaf(&mut self, indices: &[usize]) -> usize {
        let mut values = vec![0.0; self.n_outputs];
        for &i in indices {
            for (v, t) in values.iter_mut().zip(self.target_row(i)) {
                *v += t;
            }
        }
        let n = indices.len() as f64;
        values.iter_mut().for_each(|v| *v /= n);

        let idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { values });
        idx
    }

    /// Sum over outputs of the within-node squared error.
    fn sse(&self, indices: &[usize]) -> f64 {
        let n = indices.len() as f64;
        (0..self.n_outputs)
            .map(|o| {
                let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
                    let t = self.targets[i * self.n_outputs + o];
                    (s + t, sq + t * t)
                });
                (sum_sq - sum * sum / n).max(0.0)
            })
            .sum()
    }

    fn grow(&mut self, indices: &[usize], depth: usize) -> usize {
        if depth >= self.params.max_depth
            || indices.len() < self.params.min_samples_split.max(2)
            || self.sse(indices) <= f64::EPSILON
        {
            return self.leaf(indices);
        }

        let Some((feat, threshold)) = self.random_split(indices) else {
            return self.leaf(indices);
        };
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| self.feature(i, feat) <= threshold);
        if left.is_empty() || right.is_empty() {
            return self.leaf(indices);
        }

        let node_idx = self.nodes.len();
        self.nodes.push(TreeNode::Leaf { values: Vec::new() }); // placeholder
        let left_child = self.grow(&left, depth + 1);
        let right_child = self.grow(&right, depth + 1);
        self.nodes[node_idx] = TreeNode::Split {
            feature_idx: feat,
            threshold,
            left: left_child,
            right: right_child,
        };
        node_idx
    }

    /// Draw one threshold per candidate feature and keep the best.
    fn random_split(&mut self, indices: &[usize]) -> Option<(usize, f64)> {
        let parent = self.sse(indices);

        // features that are not constant in this node
        let mut ranges: Vec<(usize, f64, f64)> = (0..self.n_features)
            .filter_map(|f| {
                let (lo, hi) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
                    let v = self.feature(i, f);
                    (lo.min(v), hi.max(v))
                });
                (lo.is_finite() && hi.is_finite() && hi > lo).then_some((f, lo, hi))
            })
            .collect();
        if ranges.is_empty() {
            return None;
        }

        let k = self.params.max_features.clamp(1, ranges.len());
        for i in 0..k {
            let j = i + self.rng.next_bounded((ranges.len() - i) as u64) as usize;
            ranges.swap(i, j);
        }

        let mut best: Option<(f64, usize, f64)> = None;
        for &(f, lo, hi) in &ranges[..k] {
            let threshold = lo + self.rng.next_f64() * (hi - lo);
            let (left, right): (Vec<usize>, Vec<usize>) =
                indices.iter().partition(|&&i| self.feature(i, f) <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let gain = parent - self.sse(&left) - self.sse(&right);
            if best.map_or(true, |(g, _, _)| gain > g) {
                best = Some((gain, f, threshold));
            }
        }
        best.map(|(_, f, t)| (f, t))
    }
}

// ---------------------------------------------------------------------------
// PRNG
// ---------------------------------------------------------------------------

/// Linear congruential generator (Knuth MMIX constants).
#[derive(Debug, Clone)]
pub(crate) struct LcgRng {
    state: u64,
}

impl LcgRng {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            state: seed.wrapping_add(1), // avoid zero state
        }
    }

    pub(crate) fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    pub(crate) fn next_bounded(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    /// Uniform in `[0, 1)` from the high 53 bits.
    pub(crate) fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 16,
            min_samples_split: 2,
            max_features: usize::MAX,
        }
    }

    fn fit(data: &[f64], n_features: usize, targets: &[f64], n_outputs: usize) -> RegressionTree {
        let n = data.len() / n_features;
        let indices: Vec<usize> = (0..n).collect();
        let mut rng = LcgRng::new(7);
        RegressionTree::fit(data, n_features, targets, n_outputs, &indices, &params(), &mut rng).unwrap()
    }

    #[test]
    fn step_function_is_learned() {
        let data: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let targets: Vec<f64> = (0..20).map(|i| if i < 10 { -1.0 } else { 1.0 }).collect();
        let tree = fit(&data, 1, &targets, 1);
        assert_eq!(tree.predict(&[2.0]), &[-1.0]);
        assert_eq!(tree.predict(&[17.0]), &[1.0]);
        tree.validate(1, 1).unwrap();
    }

    #[test]
    fn leaves_carry_every_output() {
        let data = vec![0.0, 1.0, 2.0, 3.0];
        let targets = vec![0.0, 10.0, 0.0, 10.0, 5.0, -10.0, 5.0, -10.0];
        let tree = fit(&data, 1, &targets, 2);
        assert_eq!(tree.predict(&[0.5]), &[0.0, 10.0]);
        assert_eq!(tree.predict(&[2.5]), &[5.0, -10.0]);
    }

    #[test]
    fn constant_targets_give_single_leaf() {
        let data = vec![1.0, 2.0, 3.0];
        let targets = vec![4.0, 4.0, 4.0];
        let tree = fit(&data, 1, &targets, 1);
        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.depth(), 0);
    }

    #[test]
    fn constant_features_give_mean_leaf() {
        let data = vec![1.0, 1.0, 1.0, 1.0];
        let targets = vec![1.0, 2.0, 3.0, 4.0];
        let tree = fit(&data, 1, &targets, 1);
        assert_eq!(tree.predict(&[1.0]), &[2.5]);
    }

    #[test]
    fn depth_limit_respected() {
        let data: Vec<f64> = (0..64).map(|i| i as f64).collect();
        let indices: Vec<usize> = (0..64).collect();
        let limited = TreeParams { max_depth: 2, ..params() };
        let mut rng = LcgRng::new(1);
        let tree = RegressionTree::fit(&data, 1, &data, 1, &indices, &limited, &mut rng).unwrap();
        assert!(tree.depth() <= 2);
    }

    #[test]
    fn validate_rejects_bad_arenas() {
        let leaf = |v: f64| TreeNode::Leaf { values: vec![v] };
        let split = |f, t, l, r| TreeNode::Split { feature_idx: f, threshold: t, left: l, right: r };

        assert!(RegressionTree::from_nodes(vec![]).validate(1, 1).is_err());
        // child pointing back to the root
        assert!(RegressionTree::from_nodes(vec![split(0, 0.5, 0, 1), leaf(1.0)]).validate(1, 1).is_err());
        // child out of range
        assert!(RegressionTree::from_nodes(vec![split(0, 0.5, 1, 5), leaf(1.0)]).validate(1, 1).is_err());
        // feature out of range
        let t = RegressionTree::from_nodes(vec![split(3, 0.5, 1, 2), leaf(1.0), leaf(2.0)]);
        assert!(t.validate(2, 1).is_err());
        // non-finite threshold
        let t = RegressionTree::from_nodes(vec![split(0, f64::NAN, 1, 2), leaf(1.0), leaf(2.0)]);
        assert!(t.validate(1, 1).is_err());
        // wrong leaf width
        assert!(RegressionTree::from_nodes(vec![leaf(1.0)]).validate(1, 2).is_err());

        let ok = RegressionTree::from_nodes(vec![split(0, 0.5, 1, 2), leaf(1.0), leaf(2.0)]);
        ok.validate(1, 1).unwrap();
        assert_eq!(ok.predict(&[0.0]), &[1.0]);
        assert_eq!(ok.predict(&[0.9]), &[2.0]);
    }

    #[test]
    fn serde_layout_is_tagged() {
        let tree = RegressionTree::from_nodes(vec![TreeNode::Leaf { values: vec![1.5] }]);
        let json = serde_json::to_string(&tree).unwrap();
        assert_eq!(json, r#"{"nodes":[{"kind":"leaf","values":[1.5]}]}"#);
    }

    #[test]
    fn rng_uniform_in_unit_interval() {
        let mut rng = LcgRng::new(0);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }
}
