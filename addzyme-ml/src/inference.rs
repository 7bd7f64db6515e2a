//! Model artifacts and inference.
//!
//! Artifacts are JSON documents wrapping an [`ExtraTreesRegressor`] with a
//! format version. Loading always validates the forest structure so a
//! prediction can never index outside a tree or a sample.

use std::fs;
use std::path::Path;

use addzyme_core::{AddzymeError, Result};
use serde::{Deserialize, Serialize};

use crate::forest::ExtraTreesRegressor;

/// Current artifact format version.
pub const FORMAT_VERSION: u32 = 1;

/// A trained model that maps a feature vector to one or more outputs.
pub trait Regressor {
    fn n_features(&self) -> usize;

    fn n_outputs(&self) -> usize;

    /// Predict the outputs for one feature vector.
    ///
    /// A feature vector of the wrong length is an `InvalidInput` error.
    fn predict(&self, features: &[f64]) -> Result<Vec<f64>>;
}

impl Regressor for ExtraTreesRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    fn predict(&self, features: &[f64]) -> Result<Vec<f64>> {
        ExtraTreesRegressor::predict(self, features)
    }
}

#[derive(Serialize)]
struct ArtifactRef<'a> {
    format_version: u32,
    model: &'a ExtraTreesRegressor,
}

#[derive(Deserialize)]
struct Artifact {
    format_version: u32,
    model: ExtraTreesRegressor,
}

/// Write a model artifact as JSON.
pub fn save_model(model: &ExtraTreesRegressor, path: &Path) -> Result<()> {
    let json = serde_json::to_string(&ArtifactRef {
        format_version: FORMAT_VERSION,
        model,
    })
    .map_err(|e| AddzymeError::Model(format!("{}: {e}", path.display())))?;
    fs::write(path, json)?;
    Ok(())
}

/// Read and validate a model artifact.
///
/// Malformed JSON, an unknown format version or an inconsistent forest are
/// reported as `Model` errors naming the file.
pub fn load_model(path: &Path) -> Result<ExtraTreesRegressor> {
    let text = fs::read_to_string(path)?;
    let model_err = |msg: String| AddzymeError::Model(format!("{}: {msg}", path.display()));

    let artifact: Artifact = serde_json::from_str(&text).map_err(|e| model_err(e.to_string()))?;
    if artifact.format_version != FORMAT_VERSION {
        return Err(model_err(format!(
            "unsupported format version {} (expected {FORMAT_VERSION})",
            artifact.format_version
        )));
    }
    artifact.model.validate().map_err(|e| model_err(e.to_string()))?;
    Ok(artifact.model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::ExtraTreesConfig;
    use crate::tree::{RegressionTree, TreeNode};

    fn tiny_model() -> ExtraTreesRegressor {
        let data = vec![0.0, 0.0, 1.0, 1.0, 2.0, 0.0, 3.0, 1.0];
        let targets = vec![0.0, 1.0, 1.0, 0.0, 2.0, 1.0, 3.0, 0.0];
        let config = ExtraTreesConfig { n_trees: 3, ..Default::default() };
        ExtraTreesRegressor::fit(&data, 2, &targets, 2, &config).unwrap()
    }

    #[test]
    fn save_then_load_predicts_the_same() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.json");
        let model = tiny_model();
        save_model(&model, &path).unwrap();

        let loaded = load_model(&path).unwrap();
        let via_trait: &dyn Regressor = &loaded;
        assert_eq!(via_trait.n_features(), 2);
        assert_eq!(via_trait.n_outputs(), 2);
        assert_eq!(via_trait.predict(&[1.0, 1.0]).unwrap(), model.predict(&[1.0, 1.0]).unwrap());
    }

    #[test]
    fn trait_rejects_wrong_width() {
        let model = tiny_model();
        let r: &dyn Regressor = &model;
        assert!(matches!(r.predict(&[1.0, 2.0, 3.0]), Err(AddzymeError::InvalidInput(_))));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        match load_model(&path) {
            Err(AddzymeError::Model(msg)) => assert!(msg.contains("broken.json"), "{msg}"),
            other => panic!("expected model error, got {other:?}"),
        }
    }

    #[test]
    fn structurally_invalid_forest_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let model = ExtraTreesRegressor {
            n_features: 1,
            n_outputs: 1,
            trees: vec![RegressionTree::from_nodes(vec![TreeNode::Split {
                feature_idx: 4,
                threshold: 0.0,
                left: 1,
                right: 2,
            }])],
        };
        save_model(&model, &path).unwrap();
        assert!(matches!(load_model(&path), Err(AddzymeError::Model(_))));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v9.json");
        let model = serde_json::to_value(tiny_model()).unwrap();
        let doc = serde_json::json!({ "format_version": 9, "model": model });
        fs::write(&path, doc.to_string()).unwrap();
        let err = load_model(&path).unwrap_err();
        assert!(err.to_string().contains("format version 9"), "{err}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_model(&dir.path().join("absent.json")),
            Err(AddzymeError::Io(_))
        ));
    }
}
