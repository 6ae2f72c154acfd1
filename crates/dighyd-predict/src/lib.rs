//! DigHyd Predict - material property prediction from a chemical formula.
//!
//! Pipeline stages:
//! 1. Parse the formula into a `Composition`
//! 2. Element-property statistics from the external featurizer
//! 3. `frac_<El>` mole-fraction features
//! 4. Column selection against the training-time feature schema
//! 5. One call into the pretrained boosted-tree regressor

pub mod composition;
pub mod elements;
pub mod error;
pub mod featurize;
pub mod model;
pub mod pipeline;
pub mod schema;

pub use composition::{Composition, CompositionError};
pub use error::{PredictError, Result};
pub use featurize::{CommandFeaturizer, ElementPropertyFeaturizer, FeatureRow};
pub use model::{GbdtRegressor, Regressor};
pub use pipeline::{Prediction, PredictionPipeline};
pub use schema::FeatureSchema;
