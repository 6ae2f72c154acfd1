//! Error types for the plot service.

use dighyd_common::ApiError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Unsupported figure_type")]
    UnsupportedFigureType(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("Image store error: {0}")]
    Store(#[from] std::io::Error),
}

impl From<PlotError> for ApiError {
    fn from(e: PlotError) -> Self {
        match e {
            PlotError::UnsupportedFigureType(_) | PlotError::InvalidParameter(_) => {
                ApiError::BadRequest(e.to_string())
            }
            PlotError::Render(_) | PlotError::Store(_) => ApiError::Internal(e.to_string()),
        }
    }
}
