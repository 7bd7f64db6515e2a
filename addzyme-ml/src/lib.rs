//! Model primitives for ADDZYME.
//!
//! - **Trees** — multi-output regression trees with extremely randomized splits
//! - **Forest** — [`ExtraTreesRegressor`] training and averaged prediction
//! - **Inference** — the [`Regressor`] trait and JSON model artifacts
//! - **Rescaling** — [`Standardizer`] for stored mean/std transforms
//! - **Encoding** — one-hot vectors for categorical inputs

pub mod encoding;
pub mod forest;
pub mod inference;
pub mod normalize;
pub mod tree;

pub use encoding::one_hot;
pub use forest::{ExtraTreesConfig, ExtraTreesRegressor};
pub use inference::{load_model, save_model, Regressor};
pub use normalize::Standardizer;
pub use tree::{RegressionTree, TreeNode};
