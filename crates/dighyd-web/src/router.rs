//! Axum routers: one per service.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    plot::plot,
    predict::predict,
    privacy::privacy_policy,
};
use crate::state::{PlotState, PredictState, SharedPlotState, SharedPredictState};

/// Plot service: `/plot`, `/privacy`, and the `/images` static mount over the image store.
pub fn build_plot_router(state: PlotState) -> Router {
    let image_dir = state.dispatcher.store().dir().to_path_buf();
    let shared: SharedPlotState = Arc::new(state);

    Router::new()
        .route("/privacy", get(privacy_policy))
        .route("/plot",    post(plot))

        // Generated images
        .nest_service("/images", ServeDir::new(image_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Predict service: `/predict`.
pub fn build_predict_router(state: PredictState) -> Router {
    let shared: SharedPredictState = Arc::new(state);

    Router::new()
        .route("/predict", post(predict))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
