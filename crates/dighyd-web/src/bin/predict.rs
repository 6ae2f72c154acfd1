//! DigHyd predict service
//!
//! Run with: cargo run -p dighyd-web --bin dighyd-predict

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use dighyd_common::Config;
use dighyd_predict::{CommandFeaturizer, FeatureSchema, GbdtRegressor, PredictionPipeline};
use dighyd_web::{router::build_predict_router, state::PredictState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dighyd_common::logging::init();
    info!("Starting DigHyd predict service...");

    let config = Config::load()?;

    // Model artifacts are read once and shared read-only by every request.
    let schema = FeatureSchema::load(&config.model.feature_names_path)
        .await
        .with_context(|| format!("loading {:?}", config.model.feature_names_path))?;
    let regressor = GbdtRegressor::load(&config.model.model_path, &config.model.objective)
        .with_context(|| format!("loading {:?}", config.model.model_path))?;
    let featurizer = CommandFeaturizer::from_config(&config.featurizer);
    info!(
        "Model ready: {} features, featurizer preset {}",
        schema.len(),
        config.featurizer.preset
    );

    let pipeline = PredictionPipeline::new(Arc::new(featurizer), Arc::new(regressor), schema);
    let app = build_predict_router(PredictState::new(pipeline));

    let listener = tokio::net::TcpListener::bind(&config.server.predict_addr)
        .await
        .with_context(|| format!("binding {}", config.server.predict_addr))?;
    info!("Predict service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
