//! Error types for the prediction pipeline, one variant per stage.

use dighyd_common::ApiError;
use thiserror::Error;

use crate::composition::CompositionError;

pub type Result<T> = std::result::Result<T, PredictError>;

#[derive(Error, Debug)]
pub enum PredictError {
    /// The formula could not be parsed. Carries the formula as received.
    #[error("Invalid formula: {formula}")]
    InvalidFormula {
        formula: String,
        #[source]
        source: CompositionError,
    },

    #[error("Featurization failed: {0}")]
    Featurize(String),

    #[error("Feature mismatch: {0}")]
    FeatureMismatch(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        match e {
            PredictError::InvalidFormula { .. } => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}
