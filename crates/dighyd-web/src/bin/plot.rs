//! DigHyd plot service
//!
//! Run with: cargo run -p dighyd-web --bin dighyd-plot

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use dighyd_common::Config;
use dighyd_plot::{CommandRenderer, ImageStore, PlotDispatcher};
use dighyd_web::{router::build_plot_router, state::PlotState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dighyd_common::logging::init();
    info!("Starting DigHyd plot service...");

    let config = Config::load()?;

    let store = ImageStore::from_config(&config.images)
        .await
        .with_context(|| format!("opening image store {:?}", config.images.dir))?;
    info!(
        "Image store ready at {:?} (max {}, evict {})",
        store.dir(),
        store.max_images(),
        store.delete_count()
    );

    let renderer = Arc::new(CommandRenderer::from_config(&config.renderer));
    let dispatcher = PlotDispatcher::new(
        store,
        renderer,
        &config.dataset.csv_path,
        &config.server.public_base_url,
    );

    let app = build_plot_router(PlotState::new(dispatcher));

    let listener = tokio::net::TcpListener::bind(&config.server.plot_addr)
        .await
        .with_context(|| format!("binding {}", config.server.plot_addr))?;
    info!("Plot service listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
