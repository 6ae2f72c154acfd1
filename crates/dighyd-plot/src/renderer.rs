//! Chart rendering collaborator.
//!
//! Drawing happens outside this crate. A renderer receives the dataset path,
//! the output path, and the figure's parameters, and must leave a PNG at the
//! output path.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use dighyd_common::config::CommandConfig;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{PlotError, Result};
use crate::figure::FigureType;

/// Figure-specific parameters, one variant per figure type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "figure", rename_all = "snake_case")]
pub enum RenderJob {
    PublicationTrend {
        year_range: (i32, i32),
        material_type: Vec<String>,
        color_list: Vec<String>,
    },
    MaterialTypeBasedTrend {
        year_range: (i32, i32),
        material_type: Vec<String>,
        number_of_interested_elements: String,
        interested_performance: Vec<String>,
        color_list: Vec<String>,
    },
    MaterialTypeRatio {
        year_range: (i32, i32),
        material_type: Vec<String>,
        color_list: Vec<String>,
    },
    TypicalMaterialAnalyses {
        material_type_targets: Vec<String>,
        element_targets: Vec<String>,
        interested_col: String,
        top_n: usize,
        color_list: Vec<String>,
    },
}

impl RenderJob {
    pub fn figure(&self) -> FigureType {
        match self {
            RenderJob::PublicationTrend { .. } => FigureType::PublicationTrend,
            RenderJob::MaterialTypeBasedTrend { .. } => FigureType::MaterialTypeBasedTrend,
            RenderJob::MaterialTypeRatio { .. } => FigureType::MaterialTypeRatio,
            RenderJob::TypicalMaterialAnalyses { .. } => FigureType::TypicalMaterialAnalyses,
        }
    }
}

/// Everything a renderer needs for one image.
#[derive(Debug, Serialize)]
pub struct RenderRequest<'a> {
    pub renderer: &'static str,
    pub csv_path: &'a Path,
    pub image_path: &'a Path,
    #[serde(flatten)]
    pub job: &'a RenderJob,
}

impl<'a> RenderRequest<'a> {
    pub fn new(csv_path: &'a Path, image_path: &'a Path, job: &'a RenderJob) -> Self {
        Self {
            renderer: job.figure().spec().renderer,
            csv_path,
            image_path,
            job,
        }
    }
}

#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// Draw one chart to `request.image_path`.
    async fn render(&self, request: &RenderRequest<'_>) -> Result<()>;
}

/// Renders by running an external plotting program.
///
/// The request is written to the child's stdin as JSON; `DIGHYD_FIGURE` and
/// `DIGHYD_IMAGE_PATH` are also set in its environment. A non-zero exit, or a
/// clean exit that leaves no file behind, is a render failure.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn from_config(config: &CommandConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
    }
}

#[async_trait]
impl ChartRenderer for CommandRenderer {
    async fn render(&self, request: &RenderRequest<'_>) -> Result<()> {
        let figure = request.job.figure();
        info!("Rendering {} to {:?}", figure, request.image_path);

        let payload = serde_json::to_vec(request)
            .map_err(|e| PlotError::Render(format!("could not encode request: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env("DIGHYD_FIGURE", figure.tag())
            .env("DIGHYD_IMAGE_PATH", request.image_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PlotError::Render(format!("failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A renderer that ignores stdin may exit before we finish writing.
            if let Err(e) = stdin.write_all(&payload).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(PlotError::Render(format!("failed to send request: {}", e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PlotError::Render(format!("renderer did not finish: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlotError::Render(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if !tokio::fs::try_exists(request.image_path).await.unwrap_or(false) {
            return Err(PlotError::Render(format!(
                "{} exited cleanly but wrote no image",
                self.program
            )));
        }

        debug!("Rendered {} successfully", figure);
        Ok(())
    }
}
