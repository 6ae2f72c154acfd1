//! Property prediction endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use dighyd_common::ApiError;
use dighyd_predict::Prediction;

use crate::state::SharedPredictState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictRequest {
    pub formula: String,
}

/// POST /predict - Predict the target property for a chemical formula
pub async fn predict(
    State(state): State<SharedPredictState>,
    Json(req): Json<PredictRequest>,
) -> Result<Json<Prediction>, ApiError> {
    info!(formula = %req.formula, "predict request");
    let prediction = state.pipeline.predict(&req.formula).await?;
    Ok(Json(prediction))
}
