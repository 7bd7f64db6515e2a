//! The fixed collection of trained regressors queried for every request.

use std::path::{Path, PathBuf};

use addzyme_core::hash::{sha256_file, short_digest};
use addzyme_core::{AddzymeError, Result};
use addzyme_ml::{load_model, Regressor};
use tracing::{debug, info};

/// Where a member model came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub path: PathBuf,
    pub sha256: String,
}

struct Member {
    model: Box<dyn Regressor>,
    artifact: Option<ArtifactInfo>,
}

/// Models that all accept the same feature vector.
pub struct Ensemble {
    members: Vec<Member>,
    n_features: usize,
}

impl std::fmt::Debug for Ensemble {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ensemble")
            .field("len", &self.members.len())
            .field("n_features", &self.n_features)
            .finish()
    }
}

impl Ensemble {
    /// Load every artifact in `dir` matching `pattern`, in path order.
    ///
    /// `expected_count` of 0 accepts any non-zero number of artifacts.
    pub fn load(dir: &Path, pattern: &str, expected_count: usize) -> Result<Self> {
        let full = format!("{}/{}", glob::Pattern::escape(&dir.to_string_lossy()), pattern);
        let mut paths = glob::glob(&full)
            .map_err(|e| AddzymeError::Config(format!("bad model pattern '{pattern}': {e}")))?
            .collect::<std::result::Result<Vec<PathBuf>, _>>()
            .map_err(|e| AddzymeError::Io(e.into()))?;
        paths.sort();

        if paths.is_empty() {
            return Err(AddzymeError::Model(format!(
                "no model artifacts match '{pattern}' in {}",
                dir.display()
            )));
        }
        if expected_count != 0 && paths.len() != expected_count {
            return Err(AddzymeError::Model(format!(
                "found {} model artifacts in {}, expected {expected_count}",
                paths.len(),
                dir.display()
            )));
        }

        let mut members = Vec::with_capacity(paths.len());
        for path in paths {
            let model = load_model(&path)?;
            let sha256 = sha256_file(&path)?;
            debug!(
                path = %path.display(),
                sha256 = short_digest(&sha256),
                trees = model.n_trees(),
                n_features = model.n_features,
                "loaded model"
            );
            members.push(Member {
                model: Box::new(model),
                artifact: Some(ArtifactInfo { path, sha256 }),
            });
        }

        let ensemble = Self::from_members(members)?;
        info!(models = ensemble.len(), n_features = ensemble.n_features, dir = %dir.display(), "ensemble ready");
        Ok(ensemble)
    }

    /// Build from in-memory models.
    pub fn from_regressors(models: Vec<Box<dyn Regressor>>) -> Result<Self> {
        Self::from_members(
            models
                .into_iter()
                .map(|model| Member { model, artifact: None })
                .collect(),
        )
    }

    fn from_members(members: Vec<Member>) -> Result<Self> {
        let first = members
            .first()
            .ok_or_else(|| AddzymeError::Model("ensemble has no models".into()))?;
        let n_features = first.model.n_features();

        for (i, m) in members.iter().enumerate() {
            if m.model.n_features() != n_features {
                let origin = m
                    .artifact
                    .as_ref()
                    .map_or_else(|| format!("model {i}"), |a| a.path.display().to_string());
                return Err(AddzymeError::Model(format!(
                    "{origin} expects {} features, first model expects {n_features}",
                    m.model.n_features()
                )));
            }
        }
        Ok(Self { members, n_features })
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Smallest output count over all members.
    pub fn n_outputs(&self) -> usize {
        self.members.iter().map(|m| m.model.n_outputs()).min().unwrap_or(0)
    }

    /// Artifacts in load order; empty for in-memory ensembles.
    pub fn artifacts(&self) -> impl Iterator<Item = &ArtifactInfo> {
        self.members.iter().filter_map(|m| m.artifact.as_ref())
    }

    /// One value per model: output `output_index` for `features`.
    pub fn predict(&self, features: &[f64], output_index: usize) -> Result<Vec<f64>> {
        if features.len() != self.n_features {
            return Err(AddzymeError::InvalidInput(format!(
                "feature vector has {} values, models expect {}",
                features.len(),
                self.n_features
            )));
        }
        self.members
            .iter()
            .map(|m| {
                let out = m.model.predict(features)?;
                out.get(output_index).copied().ok_or_else(|| {
                    AddzymeError::Model(format!(
                        "output index {output_index} out of range for model with {} outputs",
                        out.len()
                    ))
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use addzyme_ml::{save_model, ExtraTreesConfig, ExtraTreesRegressor};

    struct Fixed {
        n_features: usize,
        outputs: Vec<f64>,
    }

    impl Regressor for Fixed {
        fn n_features(&self) -> usize {
            self.n_features
        }

        fn n_outputs(&self) -> usize {
            self.outputs.len()
        }

        fn predict(&self, _features: &[f64]) -> Result<Vec<f64>> {
            Ok(self.outputs.clone())
        }
    }

    fn fixed(n_features: usize, outputs: &[f64]) -> Box<dyn Regressor> {
        Box::new(Fixed { n_features, outputs: outputs.to_vec() })
    }

    fn tiny_forest(seed: u64) -> ExtraTreesRegressor {
        let data = vec![0.0, 0.0, 1.0, 1.0, 2.0, 0.5, 3.0, 2.0];
        let targets = vec![0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 4.0];
        let config = ExtraTreesConfig { n_trees: 3, seed, ..ExtraTreesConfig::default() };
        ExtraTreesRegressor::fit(&data, 2, &targets, 2, &config).unwrap()
    }

    #[test]
    fn picks_requested_output() {
        let e = Ensemble::from_regressors(vec![fixed(3, &[1.0, 9.0]), fixed(3, &[2.0, 8.0])]).unwrap();
        assert_eq!(e.len(), 2);
        assert_eq!(e.n_outputs(), 2);
        assert_eq!(e.predict(&[0.0; 3], 0).unwrap(), vec![1.0, 2.0]);
        assert_eq!(e.predict(&[0.0; 3], 1).unwrap(), vec![9.0, 8.0]);
        assert!(e.predict(&[0.0; 3], 2).is_err());
        assert!(matches!(e.predict(&[0.0; 2], 0), Err(AddzymeError::InvalidInput(_))));
    }

    #[test]
    fn feature_count_must_agree() {
        let err = Ensemble::from_regressors(vec![fixed(3, &[1.0]), fixed(4, &[1.0])]).unwrap_err();
        assert!(matches!(err, AddzymeError::Model(_)));
        assert!(Ensemble::from_regressors(Vec::new()).is_err());
    }

    #[test]
    fn load_sorts_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        for i in [2u64, 0, 1] {
            save_model(&tiny_forest(i), &dir.path().join(format!("ERT_Baseline_{i}.json"))).unwrap();
        }
        std::fs::write(dir.path().join("notes.txt"), "not a model").unwrap();

        let e = Ensemble::load(dir.path(), "ERT_Baseline_*.json", 3).unwrap();
        assert_eq!(e.len(), 3);
        assert_eq!(e.n_features(), 2);
        let names: Vec<_> = e
            .artifacts()
            .map(|a| a.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["ERT_Baseline_0.json", "ERT_Baseline_1.json", "ERT_Baseline_2.json"]);
        assert!(e.artifacts().all(|a| a.sha256.len() == 64));

        assert_eq!(Ensemble::load(dir.path(), "ERT_Baseline_*.json", 0).unwrap().len(), 3);
        let err = Ensemble::load(dir.path(), "ERT_Baseline_*.json", 30).unwrap_err();
        assert!(err.to_string().contains("expected 30"), "{err}");
    }

    #[test]
    fn load_fails_without_matches_or_on_bad_artifact() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Ensemble::load(dir.path(), "ERT_Baseline_*.json", 0),
            Err(AddzymeError::Model(_))
        ));

        std::fs::write(dir.path().join("ERT_Baseline_0.json"), "{\"format_version\": 1}").unwrap();
        assert!(Ensemble::load(dir.path(), "ERT_Baseline_*.json", 0).is_err());
    }
}
