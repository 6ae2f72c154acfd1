//! Chart rendering endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use dighyd_common::ApiError;
use dighyd_plot::PlotRequest;

use crate::state::SharedPlotState;

#[derive(Debug, Serialize, Deserialize)]
pub struct PlotResponse {
    /// `![Plot](<image url>)`
    pub markdown: String,
}

/// POST /plot - Render one chart and return a markdown link to it
pub async fn plot(
    State(state): State<SharedPlotState>,
    Json(req): Json<PlotRequest>,
) -> Result<Json<PlotResponse>, ApiError> {
    info!(figure_type = %req.figure_type, "plot request");
    let outcome = state.dispatcher.dispatch(&req).await?;
    info!(url = %outcome.url, "plot ready");
    Ok(Json(PlotResponse { markdown: outcome.markdown }))
}
