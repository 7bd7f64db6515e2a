//! ADDZYME: predict how an additive changes enzyme activity.
//!
//! A request names a substrate and an additive (SMILES), an EC number, a
//! temperature and a pH. Both structures are standardized and checked against
//! the molecular-weight range of the training data. Their descriptors, the
//! rescaled conditions and a one-hot EC block form one feature vector, which
//! every model of the ensemble scores. Each score is rescaled to relative
//! activity and counted as an increase, a decrease or no change.
//!
//! - [`config`]: TOML configuration with the published constants as defaults
//! - [`domain`]: applicability-domain checks
//! - [`enzyme`], [`conditions`]: the categorical and numeric form inputs
//! - [`features`]: feature vector layout
//! - [`ensemble`]: model loading and scoring
//! - [`verdict`]: bucket counting and report lines
//! - [`pipeline`]: the request/response entry point

pub mod conditions;
pub mod config;
pub mod domain;
pub mod ensemble;
pub mod enzyme;
pub mod features;
pub mod pipeline;
pub mod verdict;

pub use conditions::{Conditions, Slider};
pub use config::AppConfig;
pub use domain::{check_roles, check_structure, DomainRange, DomainReport, DomainStatus, Role, RoleCheck};
pub use ensemble::Ensemble;
pub use enzyme::{EcNumber, EC_NUMBERS};
pub use features::FeatureAssembler;
pub use pipeline::{PredictionReport, PredictionRequest, Predictor};
pub use verdict::{classify, Outcome, Thresholds, Verdict};
