//! Shared application state for the two services.

use std::sync::Arc;

use dighyd_plot::PlotDispatcher;
use dighyd_predict::PredictionPipeline;

/// State injected into plot-service handlers.
pub struct PlotState {
    pub dispatcher: PlotDispatcher,
}

impl PlotState {
    pub fn new(dispatcher: PlotDispatcher) -> Self {
        Self { dispatcher }
    }
}

/// State injected into predict-service handlers. Loaded once at startup.
pub struct PredictState {
    pub pipeline: PredictionPipeline,
}

impl PredictState {
    pub fn new(pipeline: PredictionPipeline) -> Self {
        Self { pipeline }
    }
}

pub type SharedPlotState = Arc<PlotState>;
pub type SharedPredictState = Arc<PredictState>;
