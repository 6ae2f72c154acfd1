//! Plot dispatch: one request in, one freshly named image out.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{PlotError, Result};
use crate::figure::FigureType;
use crate::renderer::{ChartRenderer, RenderRequest};
use crate::request::PlotRequest;
use crate::store::ImageStore;

/// A rendered chart and where clients can fetch it.
#[derive(Debug, Clone, Serialize)]
pub struct PlotOutcome {
    pub figure: FigureType,
    pub file_name: String,
    pub url: String,
    pub markdown: String,
}

pub struct PlotDispatcher {
    store: ImageStore,
    renderer: Arc<dyn ChartRenderer>,
    csv_path: PathBuf,
    public_base_url: String,
}

impl PlotDispatcher {
    pub fn new(
        store: ImageStore,
        renderer: Arc<dyn ChartRenderer>,
        csv_path: impl Into<PathBuf>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            renderer,
            csv_path: csv_path.into(),
            public_base_url: public_base_url.into(),
        }
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    /// External URL of an image under the `/images` mount.
    pub fn image_url(&self, file_name: &str) -> String {
        format!("{}/images/{}", self.public_base_url.trim_end_matches('/'), file_name)
    }

    pub async fn dispatch(&self, req: &PlotRequest) -> Result<PlotOutcome> {
        // Housekeeping comes first and never fails the request.
        match self.store.cleanup().await {
            Ok(report) if report.removed + report.failed > 0 => {
                debug!("Image cleanup: {:?}", report);
            }
            Ok(_) => {}
            Err(e) => warn!("Image cleanup skipped: {}", e),
        }

        let figure: FigureType = req.figure_type.parse()?;
        let job = figure.job(req)?;
        let slot = self.store.allocate();

        info!("Dispatching {} -> {}", figure, slot.file_name);
        let request = RenderRequest::new(&self.csv_path, &slot.path, &job);
        if let Err(e) = self.renderer.render(&request).await {
            if let Err(rm) = tokio::fs::remove_file(&slot.path).await {
                if rm.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove partial image {:?}: {}", slot.path, rm);
                }
            }
            return Err(e);
        }

        let url = self.image_url(&slot.file_name);
        let markdown = format!("![Plot]({})", url);
        Ok(PlotOutcome {
            figure,
            file_name: slot.file_name,
            url,
            markdown,
        })
    }
}

impl std::fmt::Debug for PlotDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlotDispatcher")
            .field("store", &self.store)
            .field("csv_path", &self.csv_path)
            .field("public_base_url", &self.public_base_url)
            .field("renderer", &"<dyn ChartRenderer>")
            .finish()
    }
}
