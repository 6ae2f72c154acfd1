//! Composition featurization.
//!
//! Two feature groups feed the model: element-property statistics computed by
//! an external featurizer, and `frac_<El>` mole fractions computed here.

use std::collections::{BTreeMap, HashMap};
use std::process::Stdio;

use async_trait::async_trait;
use dighyd_common::config::FeaturizerConfig;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::composition::Composition;
use crate::error::{PredictError, Result};

/// Feature name -> value for a single composition.
pub type FeatureRow = HashMap<String, f64>;

/// Prefix of the mole-fraction feature columns.
pub const FRACTION_PREFIX: &str = "frac_";

#[async_trait]
pub trait ElementPropertyFeaturizer: Send + Sync {
    /// Element-property statistics for `composition`.
    async fn featurize(&self, composition: &Composition) -> Result<FeatureRow>;
}

/// `frac_<El>` for every element in `elements`; absent elements get 0.0.
pub fn fraction_features<'a>(
    composition: &Composition,
    elements: impl IntoIterator<Item = &'a str>,
) -> FeatureRow {
    let fractions = composition.fractions();
    elements
        .into_iter()
        .map(|el| {
            let value = fractions.get(el).copied().unwrap_or(0.0);
            (format!("{}{}", FRACTION_PREFIX, el), value)
        })
        .collect()
}

#[derive(Serialize)]
struct FeaturizeRequest<'a> {
    composition: &'a Composition,
    preset: &'a str,
    impute_nan: bool,
}

/// Featurizes by running an external program.
///
/// Sends `{"composition": {El: amount}, "preset": .., "impute_nan": ..}` on
/// stdin and expects a JSON object of feature name -> number on stdout.
/// `null` values are read as NaN.
#[derive(Debug, Clone)]
pub struct CommandFeaturizer {
    program: String,
    args: Vec<String>,
    preset: String,
    impute_nan: bool,
}

impl CommandFeaturizer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            preset: "magpie".to_string(),
            impute_nan: true,
        }
    }

    pub fn with_preset(mut self, preset: impl Into<String>) -> Self {
        self.preset = preset.into();
        self
    }

    pub fn with_impute_nan(mut self, impute_nan: bool) -> Self {
        self.impute_nan = impute_nan;
        self
    }

    pub fn from_config(config: &FeaturizerConfig) -> Self {
        Self::new(config.program.clone(), config.args.clone())
            .with_preset(config.preset.clone())
            .with_impute_nan(config.impute_nan)
    }
}

#[async_trait]
impl ElementPropertyFeaturizer for CommandFeaturizer {
    async fn featurize(&self, composition: &Composition) -> Result<FeatureRow> {
        let payload = serde_json::to_vec(&FeaturizeRequest {
            composition,
            preset: &self.preset,
            impute_nan: self.impute_nan,
        })
        .map_err(|e| PredictError::Featurize(e.to_string()))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PredictError::Featurize(format!("failed to start {}: {}", self.program, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(&payload).await {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(PredictError::Featurize(e.to_string()));
                }
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PredictError::Featurize(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PredictError::Featurize(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let raw: BTreeMap<String, Option<f64>> = serde_json::from_slice(&output.stdout)
            .map_err(|e| PredictError::Featurize(format!("unreadable featurizer output: {}", e)))?;

        debug!("Featurizer returned {} features for {}", raw.len(), composition);
        Ok(raw
            .into_iter()
            .map(|(name, value)| (name, value.unwrap_or(f64::NAN)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_features_zero_fill_absent_elements() {
        let comp = Composition::parse("LiH").unwrap();
        let row = fraction_features(&comp, ["H", "Li", "Mg"]);
        assert_eq!(row.len(), 3);
        assert_eq!(row["frac_H"], 0.5);
        assert_eq!(row["frac_Li"], 0.5);
        assert_eq!(row["frac_Mg"], 0.0);
    }

    #[cfg(unix)]
    fn sh(script: &str, extra: &[&str]) -> CommandFeaturizer {
        let mut args = vec!["-c".to_string(), script.to_string(), "sh".to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        CommandFeaturizer::new("sh", args)
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_featurizer_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let sent = dir.path().join("request.json");
        let featurizer = sh(
            r#"cat > "$1"; printf '{"MagpieData mean Number": 2.0, "MagpieData range Number": null}'"#,
            &[sent.to_str().unwrap()],
        );

        let comp = Composition::parse("LiH").unwrap();
        let row = featurizer.featurize(&comp).await.unwrap();
        assert_eq!(row["MagpieData mean Number"], 2.0);
        assert!(row["MagpieData range Number"].is_nan());

        let request: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&sent).unwrap()).unwrap();
        assert_eq!(request["composition"], serde_json::json!({"H": 1.0, "Li": 1.0}));
        assert_eq!(request["preset"], "magpie");
        assert_eq!(request["impute_nan"], true);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_command_featurizer_failure_and_garbage() {
        let comp = Composition::parse("MgH2").unwrap();

        let err = sh("cat >/dev/null; echo 'no module named matminer' >&2; exit 1", &[])
            .featurize(&comp)
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Featurize(ref m) if m.contains("matminer")));

        let err = sh("cat >/dev/null; echo not-json", &[])
            .featurize(&comp)
            .await
            .unwrap_err();
        assert!(matches!(err, PredictError::Featurize(_)));
    }
}
