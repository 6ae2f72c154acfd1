//! Configuration loading for DigHyd.
//! Reads dighyd.toml from the current directory or the path in the DIGHYD_CONFIG env var.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{DighydError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub images: ImageStoreConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub renderer: CommandConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub featurizer: FeaturizerConfig,
}

// ── Server ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_plot_addr")]
    pub plot_addr: String,
    #[serde(default = "default_predict_addr")]
    pub predict_addr: String,
    /// External origin that image URLs are built from.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_plot_addr()       -> String { "0.0.0.0:8000".to_string() }
fn default_predict_addr()    -> String { "0.0.0.0:8001".to_string() }
fn default_public_base_url() -> String { "https://plot.dighyd.org".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            plot_addr: default_plot_addr(),
            predict_addr: default_predict_addr(),
            public_base_url: default_public_base_url(),
        }
    }
}

// ── Image store ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageStoreConfig {
    #[serde(default = "default_image_dir")]
    pub dir: PathBuf,
    /// Cleanup only acts once the store holds more than this many images.
    #[serde(default = "default_max_images")]
    pub max_images: usize,
    /// Number of oldest images removed per cleanup pass.
    #[serde(default = "default_delete_count")]
    pub delete_count: usize,
}

fn default_image_dir()    -> PathBuf { PathBuf::from("static/images") }
fn default_max_images()   -> usize   { 100 }
fn default_delete_count() -> usize   { 50 }

impl Default for ImageStoreConfig {
    fn default() -> Self {
        Self {
            dir: default_image_dir(),
            max_images: default_max_images(),
            delete_count: default_delete_count(),
        }
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_csv_path")]
    pub csv_path: PathBuf,
}

fn default_csv_path() -> PathBuf { PathBuf::from("data/Total_Data.csv") }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self { csv_path: default_csv_path() }
    }
}

// ── External collaborators ────────────────────────────────────────────────────

/// An external program invoked once per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_renderer_args")]
    pub args: Vec<String>,
}

fn default_program()       -> String      { "python3".to_string() }
fn default_renderer_args() -> Vec<String> { vec!["plot_figures_cli.py".to_string()] }

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_renderer_args(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
    #[serde(default = "default_feature_names_path")]
    pub feature_names_path: PathBuf,
    #[serde(default = "default_objective")]
    pub objective: String,
}

fn default_model_path()         -> PathBuf { PathBuf::from("xgb_model.dump") }
fn default_feature_names_path() -> PathBuf { PathBuf::from("feature_names.txt") }
fn default_objective()          -> String  { "reg:linear".to_string() }

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            feature_names_path: default_feature_names_path(),
            objective: default_objective(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturizerConfig {
    #[serde(default = "default_program")]
    pub program: String,
    #[serde(default = "default_featurizer_args")]
    pub args: Vec<String>,
    #[serde(default = "default_preset")]
    pub preset: String,
    #[serde(default = "bool_true")]
    pub impute_nan: bool,
}

fn default_featurizer_args() -> Vec<String> { vec!["featurize_cli.py".to_string()] }
fn default_preset()          -> String      { "magpie".to_string() }
fn bool_true()               -> bool        { true }

impl Default for FeaturizerConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_featurizer_args(),
            preset: default_preset(),
            impute_nan: true,
        }
    }
}

impl Config {
    /// Load configuration from dighyd.toml.
    /// Checks DIGHYD_CONFIG env var first, then current directory.
    /// A missing file yields the built-in defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DIGHYD_CONFIG")
            .unwrap_or_else(|_| "dighyd.toml".to_string());
        Self::load_from(Path::new(&path))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!("Config file not found: {}, using defaults", path.display());
            let config = Config::default();
            config.validate()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.images.delete_count == 0 {
            return Err(DighydError::Config(
                "images.delete_count must be at least 1".to_string(),
            ));
        }
        if self.server.public_base_url.trim().is_empty() {
            return Err(DighydError::Config(
                "server.public_base_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
